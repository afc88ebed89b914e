//! Column metadata.

use std::fmt;
use std::sync::Arc;

use crate::schema::DataType;
use crate::value::Value;

struct ColumnInner {
    table: String,
    name: String,
    data_type: DataType,
    required: bool,
    read_only: bool,
    default: Option<Value>,
}

/// A logical column.
///
/// Columns are created through a [`TableBuilder`](crate::schema::TableBuilder)
/// or [`ViewBuilder`](crate::schema::ViewBuilder) and are immutable once the
/// owning rowset definition completes. Handles are cheap to clone; equality is
/// pointer identity, so a column compares equal only to itself and never to
/// a same-named column of another table.
#[derive(Clone)]
pub struct Column {
    inner: Arc<ColumnInner>,
}

impl Column {
    pub(crate) fn new(table: &str, spec: ColumnSpec) -> Self {
        Self {
            inner: Arc::new(ColumnInner {
                table: String::from(table),
                name: spec.name,
                data_type: spec.data_type,
                required: spec.required,
                read_only: spec.read_only,
                default: spec.default,
            }),
        }
    }

    /// Returns the column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns the name of the owning rowset.
    #[must_use]
    pub fn rowset_name(&self) -> &str {
        &self.inner.table
    }

    /// Returns the declared data type.
    #[must_use]
    pub fn data_type(&self) -> &DataType {
        &self.inner.data_type
    }

    /// Returns the maximum size for sized text types, 0 otherwise.
    #[must_use]
    pub fn size(&self) -> u32 {
        match self.inner.data_type {
            DataType::Text { size } | DataType::Char { size } => size,
            _ => 0,
        }
    }

    /// Returns whether a value is required (NOT NULL).
    #[must_use]
    pub fn required(&self) -> bool {
        self.inner.required
    }

    /// Returns whether the column may not be written by record operations.
    ///
    /// Auto-increment columns are implicitly read-only.
    #[must_use]
    pub fn read_only(&self) -> bool {
        self.inner.read_only || self.inner.data_type == DataType::AutoInc
    }

    /// Returns the declared default value, if any.
    #[must_use]
    pub fn default_value(&self) -> Option<&Value> {
        self.inner.default.as_ref()
    }
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Column {}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Column({}.{})", self.inner.table, self.inner.name)
    }
}

/// Specification of a column, consumed by the table and view builders.
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    pub(crate) name: String,
    pub(crate) data_type: DataType,
    pub(crate) required: bool,
    pub(crate) read_only: bool,
    pub(crate) default: Option<Value>,
}

impl ColumnSpec {
    /// Creates a new column specification.
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            required: false,
            read_only: false,
            default: None,
        }
    }

    /// Marks the column as required (NOT NULL).
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Marks the column as read-only for record operations.
    #[must_use]
    pub const fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{RowSet, Table};

    #[test]
    fn test_column_identity() {
        let a = Table::builder("a")
            .column(ColumnSpec::new("id", DataType::Integer))
            .build()
            .unwrap();
        let b = Table::builder("b")
            .column(ColumnSpec::new("id", DataType::Integer))
            .build()
            .unwrap();

        let a_id = a.column("id").unwrap().clone();
        let b_id = b.column("id").unwrap().clone();

        assert_eq!(&a_id, a.column("id").unwrap());
        assert_ne!(a_id, b_id);
        assert_eq!(a_id.name(), b_id.name());
    }

    #[test]
    fn test_autoinc_is_read_only() {
        let t = Table::builder("t")
            .column(ColumnSpec::new("id", DataType::AutoInc))
            .column(ColumnSpec::new("name", DataType::Text { size: 40 }).required())
            .build()
            .unwrap();

        assert!(t.column("id").unwrap().read_only());
        assert!(!t.column("name").unwrap().read_only());
        assert!(t.column("name").unwrap().required());
    }
}
