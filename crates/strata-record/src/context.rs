//! Transactional context.
//!
//! A [`Context`] is one unit of work: one connection, one dialect, one
//! rollback checkpoint registry. Contexts are single-threaded by design:
//! records hand `Rc`-based checkpoints to the registry, so a unit of work is
//! moved between threads as a whole or not at all.

use tracing::{debug, info};

use strata_sql_core::dialect::Dialect;
use strata_sql_core::expr::ColumnExpr;
use strata_sql_core::schema::RowSet;
use strata_sql_core::{Command, ParamMode, SqlScript, Statement, Value};

use crate::connection::Connection;
use crate::error::Result;
use crate::reader::Reader;
use crate::rollback::RollbackManager;

/// One unit of work against one database connection.
pub struct Context<C: Connection> {
    conn: C,
    dialect: Box<dyn Dialect>,
    rollback: RollbackManager,
}

impl<C: Connection> Context<C> {
    /// Creates a context over a connection and its dialect.
    pub fn new(conn: C, dialect: impl Dialect + 'static) -> Self {
        Self {
            conn,
            dialect: Box::new(dialect),
            rollback: RollbackManager::new(),
        }
    }

    /// Returns the dialect statements are compiled for.
    #[must_use]
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Returns the rollback checkpoint registry.
    #[must_use]
    pub fn rollback_manager(&self) -> &RollbackManager {
        &self.rollback
    }

    pub(crate) fn rollback_manager_mut(&mut self) -> &mut RollbackManager {
        &mut self.rollback
    }

    /// Executes a write statement and returns the affected row count.
    ///
    /// # Errors
    ///
    /// Fails when the database rejects the statement.
    pub fn execute(&mut self, statement: &Statement) -> Result<u64> {
        debug!(sql = statement.sql(), "execute");
        self.conn.execute(statement)
    }

    /// Executes every statement of a script in order.
    ///
    /// # Errors
    ///
    /// Fails on the first rejected statement.
    pub fn execute_script(&mut self, script: &SqlScript) -> Result<()> {
        for statement in script {
            self.execute(statement)?;
        }
        info!(statements = script.len(), "script executed");
        Ok(())
    }

    /// Compiles and runs a select command, returning a typed reader.
    ///
    /// # Errors
    ///
    /// Fails when the statement cannot be built or is rejected.
    pub fn open_reader(&mut self, command: &Command) -> Result<Reader<'_>> {
        let statement = command.select_statement(self.dialect.as_ref(), ParamMode::Prepared)?;
        let columns = if command.selects().is_empty() {
            command
                .rowset()
                .columns()
                .iter()
                .map(|c| Some(c.clone()))
                .collect()
        } else {
            command
                .selects()
                .iter()
                .map(|e| match e {
                    ColumnExpr::Column(c) => Some(c.clone()),
                    _ => None,
                })
                .collect()
        };
        debug!(sql = statement.sql(), "query");
        let cursor = self.conn.query(&statement)?;
        Ok(Reader::new(cursor, columns))
    }

    /// Runs a select command and returns the first column of its first row,
    /// or `None` when the result is empty.
    ///
    /// # Errors
    ///
    /// Fails when the statement cannot be built or is rejected.
    pub fn query_single_value(&mut self, command: &Command) -> Result<Option<Value>> {
        let statement = command.select_statement(self.dialect.as_ref(), ParamMode::Prepared)?;
        debug!(sql = statement.sql(), "query single value");
        let mut cursor = self.conn.query(&statement)?;
        match cursor.next_row()? {
            Some(row) => Ok(row.into_iter().next()),
            None => Ok(None),
        }
    }

    /// Returns the key generated by the most recent insert.
    ///
    /// # Errors
    ///
    /// Fails when the driver cannot report generated keys.
    pub fn last_insert_id(&mut self) -> Result<i64> {
        self.conn.last_insert_id()
    }

    /// Begins a transaction.
    ///
    /// # Errors
    ///
    /// Fails when the driver rejects the transaction control statement.
    pub fn begin(&mut self) -> Result<()> {
        debug!("begin transaction");
        self.conn.begin()
    }

    /// Commits the current transaction and discards all checkpoints.
    ///
    /// # Errors
    ///
    /// Fails when the commit is rejected; checkpoints are kept in that case
    /// so a following rollback still reconciles.
    pub fn commit(&mut self) -> Result<()> {
        self.conn.commit()?;
        self.rollback.discard_all();
        debug!("transaction committed");
        Ok(())
    }

    /// Rolls the current transaction back and restores every checkpointed
    /// record to its pre-mutation snapshot.
    ///
    /// Reconciliation runs even when the driver-level rollback reports an
    /// error: in-memory state must never claim changes the database
    /// discarded.
    ///
    /// # Errors
    ///
    /// Returns the driver error, if any, after reconciliation.
    pub fn rollback(&mut self) -> Result<()> {
        let result = self.conn.rollback();
        self.rollback.restore_all();
        debug!("transaction rolled back");
        result
    }

    /// Releases the context and hands the connection back to the caller.
    #[must_use]
    pub fn release(self) -> C {
        self.conn
    }
}
