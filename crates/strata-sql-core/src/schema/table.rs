//! Physical table definitions.

use crate::error::{BuildError, BuildResult};
use crate::schema::{Column, ColumnSpec, DataType, RowSet};

/// An index over one or more table columns.
#[derive(Debug, Clone)]
pub struct TableIndex {
    name: String,
    columns: Vec<Column>,
    unique: bool,
}

impl TableIndex {
    /// Returns the index name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the indexed columns.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns whether the index enforces uniqueness.
    #[must_use]
    pub const fn unique(&self) -> bool {
        self.unique
    }
}

/// A physical table.
///
/// Column order is definition order and also DDL order. Tables are built once
/// via [`Table::builder`] and shared behind `Arc`; they never change after
/// construction, which is what makes concurrent statement building safe.
#[derive(Debug)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    primary_key: Vec<Column>,
    indexes: Vec<TableIndex>,
    timestamp: Option<Column>,
}

impl Table {
    /// Starts a new table definition.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> TableBuilder {
        TableBuilder {
            name: name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
            indexes: Vec::new(),
            timestamp: None,
        }
    }

    /// Returns the indexes defined on this table.
    #[must_use]
    pub fn indexes(&self) -> &[TableIndex] {
        &self.indexes
    }
}

impl RowSet for Table {
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
        true
    }

    fn timestamp_column(&self) -> Option<&Column> {
        self.timestamp.as_ref()
    }
}

/// Builder for [`Table`].
pub struct TableBuilder {
    name: String,
    columns: Vec<ColumnSpec>,
    primary_key: Vec<String>,
    indexes: Vec<(String, Vec<String>, bool)>,
    timestamp: Option<String>,
}

impl TableBuilder {
    /// Adds a column.
    #[must_use]
    pub fn column(mut self, spec: ColumnSpec) -> Self {
        self.columns.push(spec);
        self
    }

    /// Sets the primary key as an ordered list of column names.
    #[must_use]
    pub fn primary_key(mut self, names: &[&str]) -> Self {
        self.primary_key = names.iter().map(|n| String::from(*n)).collect();
        self
    }

    /// Adds an index over the named columns.
    #[must_use]
    pub fn index(mut self, name: &str, columns: &[&str], unique: bool) -> Self {
        self.indexes.push((
            String::from(name),
            columns.iter().map(|n| String::from(*n)).collect(),
            unique,
        ));
        self
    }

    /// Designates an existing timestamp column for optimistic concurrency.
    ///
    /// The column is compared in the WHERE clause of every keyed UPDATE and
    /// refreshed in its SET clause.
    #[must_use]
    pub fn timestamp_column(mut self, name: &str) -> Self {
        self.timestamp = Some(String::from(name));
        self
    }

    /// Completes the definition.
    ///
    /// # Errors
    ///
    /// Fails on duplicate column names or when the primary key, an index or
    /// the timestamp column names a column that was not defined.
    pub fn build(self) -> BuildResult<std::sync::Arc<Table>> {
        let mut columns: Vec<Column> = Vec::with_capacity(self.columns.len());
        for spec in self.columns {
            if columns.iter().any(|c| c.name() == spec.name) {
                return Err(BuildError::DuplicateColumn(spec.name));
            }
            columns.push(Column::new(&self.name, spec));
        }

        let find = |name: &str| -> BuildResult<Column> {
            columns
                .iter()
                .find(|c| c.name() == name)
                .cloned()
                .ok_or_else(|| BuildError::UnknownColumn(String::from(name)))
        };

        let mut primary_key = Vec::with_capacity(self.primary_key.len());
        for name in &self.primary_key {
            primary_key.push(find(name)?);
        }

        let mut indexes = Vec::with_capacity(self.indexes.len());
        for (name, cols, unique) in self.indexes {
            let mut index_columns = Vec::with_capacity(cols.len());
            for col in &cols {
                index_columns.push(find(col)?);
            }
            indexes.push(TableIndex {
                name,
                columns: index_columns,
                unique,
            });
        }

        let timestamp = match self.timestamp {
            Some(name) => Some(find(&name)?),
            None => None,
        };

        Ok(std::sync::Arc::new(Table {
            name: self.name,
            columns,
            primary_key,
            indexes,
            timestamp,
        }))
    }
}

/// Shorthand for an auto-increment key column.
#[must_use]
pub fn autoinc(name: &str) -> ColumnSpec {
    ColumnSpec::new(name, DataType::AutoInc).required()
}

/// Shorthand for a sized text column.
#[must_use]
pub fn text(name: &str, size: u32) -> ColumnSpec {
    ColumnSpec::new(name, DataType::Text { size })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_builder() {
        let t = Table::builder("employees")
            .column(autoinc("employee_id"))
            .column(text("firstname", 40).required())
            .column(text("lastname", 40).required())
            .column(ColumnSpec::new("salary", DataType::Decimal { precision: 10, scale: 2 }))
            .column(ColumnSpec::new("update_ts", DataType::Timestamp))
            .primary_key(&["employee_id"])
            .index("ix_employees_name", &["lastname", "firstname"], false)
            .timestamp_column("update_ts")
            .build()
            .unwrap();

        assert_eq!(t.name(), "employees");
        assert_eq!(t.columns().len(), 5);
        assert_eq!(t.primary_key().len(), 1);
        assert_eq!(t.indexes()[0].columns().len(), 2);
        assert_eq!(t.timestamp_column().unwrap().name(), "update_ts");
        assert!(t.updateable());
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let err = Table::builder("t")
            .column(text("name", 20))
            .column(text("name", 30))
            .build()
            .unwrap_err();
        assert!(matches!(err, BuildError::DuplicateColumn(n) if n == "name"));
    }

    #[test]
    fn test_unknown_primary_key_rejected() {
        let err = Table::builder("t")
            .column(text("name", 20))
            .primary_key(&["id"])
            .build()
            .unwrap_err();
        assert!(matches!(err, BuildError::UnknownColumn(n) if n == "id"));
    }
}
