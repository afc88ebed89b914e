//! View definitions.

use crate::error::{BuildError, BuildResult};
use crate::schema::{Column, ColumnSpec, RowSet};

/// A derived rowset backed by a query instead of physical storage.
///
/// A view carries the same column contract as a table. Whether record writes
/// are permitted is controlled by the updateable flag; most views are
/// read-only and the statement builder rejects writes against them.
#[derive(Debug)]
pub struct View {
    name: String,
    columns: Vec<Column>,
    primary_key: Vec<Column>,
    query: String,
    updateable: bool,
}

impl View {
    /// Starts a new view definition.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ViewBuilder {
        ViewBuilder {
            name: name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
            query: String::new(),
            updateable: false,
        }
    }

    /// Returns the underlying select text used by CREATE VIEW.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }
}

impl RowSet for View {
    fn name(&self) -> &str {
        &self.name
    }

    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn primary_key(&self) -> &[Column] {
        &self.primary_key
    }

    fn updateable(&self) -> bool {
        self.updateable
    }
}

/// Builder for [`View`].
pub struct ViewBuilder {
    name: String,
    columns: Vec<ColumnSpec>,
    primary_key: Vec<String>,
    query: String,
    updateable: bool,
}

impl ViewBuilder {
    /// Adds a column.
    #[must_use]
    pub fn column(mut self, spec: ColumnSpec) -> Self {
        self.columns.push(spec);
        self
    }

    /// Sets the key columns used for single-row reads through the view.
    #[must_use]
    pub fn key(mut self, names: &[&str]) -> Self {
        self.primary_key = names.iter().map(|n| String::from(*n)).collect();
        self
    }

    /// Sets the underlying select statement text.
    #[must_use]
    pub fn query(mut self, sql: impl Into<String>) -> Self {
        self.query = sql.into();
        self
    }

    /// Permits record writes through the view.
    #[must_use]
    pub const fn updateable(mut self) -> Self {
        self.updateable = true;
        self
    }

    /// Completes the definition.
    ///
    /// # Errors
    ///
    /// Fails on duplicate column names or an unknown key column.
    pub fn build(self) -> BuildResult<std::sync::Arc<View>> {
        let mut columns: Vec<Column> = Vec::with_capacity(self.columns.len());
        for spec in self.columns {
            if columns.iter().any(|c| c.name() == spec.name) {
                return Err(BuildError::DuplicateColumn(spec.name));
            }
            columns.push(Column::new(&self.name, spec));
        }
        let mut primary_key = Vec::with_capacity(self.primary_key.len());
        for name in &self.primary_key {
            primary_key.push(
                columns
                    .iter()
                    .find(|c| c.name() == *name)
                    .cloned()
                    .ok_or_else(|| BuildError::UnknownColumn(name.clone()))?,
            );
        }
        Ok(std::sync::Arc::new(View {
            name: self.name,
            columns,
            primary_key,
            query: self.query,
            updateable: self.updateable,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DataType;

    #[test]
    fn test_view_defaults_to_read_only() {
        let v = View::builder("employee_info")
            .column(ColumnSpec::new("employee_id", DataType::Integer))
            .column(ColumnSpec::new("full_name", DataType::Text { size: 80 }))
            .key(&["employee_id"])
            .query("SELECT employee_id, firstname || ' ' || lastname FROM employees")
            .build()
            .unwrap();

        assert!(!v.updateable());
        assert_eq!(v.primary_key().len(), 1);
        assert!(v.query().starts_with("SELECT"));
    }
}
