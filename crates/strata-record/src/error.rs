//! Error types for record operations and statement execution.

use thiserror::Error;

use strata_sql_core::BuildError;

use crate::record::RecordState;

/// Errors raised by the record layer and the execution boundary.
///
/// The variants follow the failure taxonomy: constraint violations are
/// rejected before any SQL is generated, execution failures carry the
/// offending statement text, and a concurrency conflict is distinct from a
/// generic execution failure so callers can retry or merge.
#[derive(Debug, Error)]
pub enum DbError {
    /// Structural error from statement building.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// A read-only column was assigned.
    #[error("field {field} is read only")]
    FieldReadOnly {
        /// Column name.
        field: String,
    },

    /// A required column was assigned NULL.
    #[error("field {field} is required and cannot be null")]
    FieldRequired {
        /// Column name.
        field: String,
    },

    /// A value is not compatible with the column's declared type.
    #[error("value {value} is not valid for field {field}")]
    FieldTypeMismatch {
        /// Column name.
        field: String,
        /// Debug rendering of the rejected value.
        value: String,
    },

    /// A text value exceeds the column's maximum size.
    #[error("value for field {field} exceeds the maximum size of {size}")]
    FieldTooLong {
        /// Column name.
        field: String,
        /// Maximum size in characters.
        size: u32,
    },

    /// The record is in the wrong state for the requested operation.
    #[error("record is {state:?}, cannot {operation}")]
    InvalidState {
        /// The attempted operation.
        operation: &'static str,
        /// The record's current state.
        state: RecordState,
    },

    /// A key value list does not match the primary key column count.
    #[error("key has {given} values but the primary key has {expected} columns")]
    InvalidKey {
        /// Number of primary key columns.
        expected: usize,
        /// Number of values supplied.
        given: usize,
    },

    /// A keyed single-row read matched no row.
    #[error("record not found")]
    NotFound,

    /// A keyed single-row read matched more than one row.
    #[error("query for a single record returned multiple rows")]
    IntegrityViolation,

    /// A keyed UPDATE or DELETE affected no rows: the row vanished or its
    /// timestamp changed underneath this record.
    #[error("record of {rowset} was changed or deleted by another transaction")]
    ConcurrencyConflict {
        /// Name of the affected rowset.
        rowset: String,
    },

    /// The database rejected a statement.
    #[error("statement failed: {message} (sql: {sql})")]
    Execution {
        /// The statement text, attached for diagnosis.
        sql: String,
        /// Driver error message.
        message: String,
    },

    /// The connection itself failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// A driver value could not be converted to the column's declared type.
    #[error("cannot convert {value} for column {column}")]
    Conversion {
        /// Column name.
        column: String,
        /// Debug rendering of the raw value.
        value: String,
    },

    /// A column does not belong to the rowset it was used with.
    #[error("unknown column {0}")]
    UnknownColumn(String),

    /// A reader getter was called before the first row or after the last.
    #[error("reader has no current row")]
    NoCurrentRow,
}

/// Result type alias for record operations.
pub type Result<T> = std::result::Result<T, DbError>;
