//! Error types for SQL model construction and statement building.

use thiserror::Error;

use crate::schema::DataType;

/// Errors raised while assembling the logical model or building a statement.
///
/// These are all *structural* errors: they are reported before any SQL text
/// is produced and never depend on a database round trip.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A join condition does not reference any column of the joined rowset.
    #[error("join condition does not reference a column of {table}")]
    InvalidJoin {
        /// Name of the joined rowset.
        table: String,
    },

    /// An INSERT, UPDATE or DELETE was built against a read-only rowset.
    #[error("rowset {0} is not updateable")]
    RowSetReadOnly(String),

    /// An INSERT or UPDATE was built without any set assignment.
    #[error("statement has no set assignments")]
    NoAssignments,

    /// An operation requires a primary key but the rowset defines none.
    #[error("no primary key defined for {0}")]
    NoPrimaryKey(String),

    /// The dialect has no physical mapping for a logical data type.
    #[error("dialect {dialect} cannot map data type {data_type:?}")]
    UnsupportedType {
        /// Dialect name.
        dialect: &'static str,
        /// The logical type that could not be mapped.
        data_type: DataType,
    },

    /// A column name was not found on the rowset it was looked up on.
    #[error("unknown column {0}")]
    UnknownColumn(String),

    /// A table definition contains the same column name twice.
    #[error("duplicate column {0}")]
    DuplicateColumn(String),
}

/// Result type alias for model and statement building.
pub type BuildResult<T> = std::result::Result<T, BuildError>;
