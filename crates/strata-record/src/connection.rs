//! The execution boundary.
//!
//! The core asks very little of its collaborator: execute a statement, run a
//! query, control the transaction, release the connection. Pooling, timeouts
//! and retries all live on the other side of this trait.

use strata_sql_core::{Statement, Value};

use crate::error::Result;

/// A finite, forward-only row producer.
///
/// Cursors are never restartable. Dropping a cursor releases the underlying
/// statement and result resources, whether or not iteration reached the end.
pub trait RowCursor {
    /// Returns the next row of raw driver values, or `None` when exhausted.
    ///
    /// # Errors
    ///
    /// Fails when the driver reports an error while stepping.
    fn next_row(&mut self) -> Result<Option<Vec<Value>>>;
}

/// One database connection, owned by exactly one unit of work.
///
/// Implementations wrap a concrete driver. All calls are synchronous and
/// blocking; a statement-level timeout, if any, is the driver's business and
/// surfaces as an [`Execution`](crate::DbError::Execution) failure.
pub trait Connection {
    /// Executes a write statement and returns the number of affected rows.
    ///
    /// # Errors
    ///
    /// Fails when the database rejects the statement.
    fn execute(&mut self, statement: &Statement) -> Result<u64>;

    /// Executes a query and returns a forward-only cursor over its rows.
    ///
    /// # Errors
    ///
    /// Fails when the database rejects the statement.
    fn query(&mut self, statement: &Statement) -> Result<Box<dyn RowCursor + '_>>;

    /// Returns the key generated by the most recent insert.
    ///
    /// # Errors
    ///
    /// Fails when the driver cannot report generated keys.
    fn last_insert_id(&mut self) -> Result<i64>;

    /// Begins a transaction.
    ///
    /// # Errors
    ///
    /// Fails when the driver rejects the transaction control statement.
    fn begin(&mut self) -> Result<()>;

    /// Commits the current transaction.
    ///
    /// # Errors
    ///
    /// Fails when the commit is rejected.
    fn commit(&mut self) -> Result<()>;

    /// Rolls the current transaction back.
    ///
    /// # Errors
    ///
    /// Fails when the rollback is rejected.
    fn rollback(&mut self) -> Result<()>;
}
