//! Logical schema model: data types, columns, tables, views and databases.
//!
//! The schema model is purely logical. It knows nothing about any particular
//! database product; physical type names, quoting and DDL syntax are supplied
//! by a [`Dialect`](crate::dialect::Dialect) at render time.

mod column;
mod database;
mod table;
mod view;

pub use column::{Column, ColumnSpec};
pub use database::{Database, Relation};
pub use table::{autoinc, text, Table, TableBuilder, TableIndex};
pub use view::{View, ViewBuilder};

/// Logical column data types.
///
/// `AutoInc` is an integer key generated by the database; how that is
/// expressed (SERIAL, AUTO_INCREMENT, IDENTITY) is up to the dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// 64-bit integer.
    Integer,
    /// Auto-incrementing integer key.
    AutoInc,
    /// Double precision floating point.
    Float,
    /// Fixed-point decimal.
    Decimal {
        /// Total number of digits.
        precision: u8,
        /// Digits after the decimal point.
        scale: u8,
    },
    /// Boolean.
    Bool,
    /// Variable length text. A size of 0 means unbounded.
    Text {
        /// Maximum length in characters.
        size: u32,
    },
    /// Fixed length text.
    Char {
        /// Length in characters.
        size: u32,
    },
    /// Large character object.
    Clob,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Date and time.
    Timestamp,
    /// Binary large object.
    Blob,
    /// No declared type.
    Unknown,
}

impl DataType {
    /// Returns whether the type holds character data.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text { .. } | Self::Char { .. } | Self::Clob)
    }

    /// Returns whether the type holds numeric data.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Integer | Self::AutoInc | Self::Float | Self::Decimal { .. }
        )
    }
}

/// A set of columns that rows can be read from.
///
/// The closed set of implementors is [`Table`] (physical storage) and
/// [`View`] (derived, with an underlying query). Statement building and the
/// record layer work against this trait so both kinds are interchangeable
/// wherever their capabilities allow.
pub trait RowSet {
    /// Returns the rowset name.
    fn name(&self) -> &str;

    /// Returns the columns in definition order.
    fn columns(&self) -> &[Column];

    /// Returns the primary key columns, empty when no key is defined.
    fn primary_key(&self) -> &[Column];

    /// Returns whether records may be inserted, updated or deleted.
    fn updateable(&self) -> bool;

    /// Returns the optimistic-concurrency timestamp column, if one is set.
    fn timestamp_column(&self) -> Option<&Column> {
        None
    }

    /// Looks a column up by name.
    fn column(&self, name: &str) -> Option<&Column> {
        self.columns().iter().find(|c| c.name() == name)
    }

    /// Returns whether the given column belongs to this rowset.
    ///
    /// Membership is identity, not name equality: two tables may both define
    /// an `id` column without those columns being interchangeable.
    fn contains(&self, column: &Column) -> bool {
        self.columns().iter().any(|c| c == column)
    }
}
