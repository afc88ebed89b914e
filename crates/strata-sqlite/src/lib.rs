//! # strata-sqlite
//!
//! SQLite binding for the strata-record execution boundary, backed by
//! `rusqlite`. One [`SqliteConnection`] is one unit of work; pair it with
//! [`SqliteDialect`](strata_sql_core::dialect::SqliteDialect) in a
//! [`Context`](strata_record::Context).

use std::collections::VecDeque;
use std::path::Path;

use rusqlite::types::ValueRef;
use tracing::trace;

use strata_record::{Connection, DbError, Result, RowCursor};
use strata_sql_core::{Statement, Value};

/// Converts a model value to the SQLite storage value.
///
/// SQLite has no boolean or temporal types: booleans become 0/1 integers and
/// temporal values ISO text, matching what the reader normalizes back.
fn bind_value(value: &Value) -> rusqlite::types::Value {
    use rusqlite::types::Value as Sq;
    match value {
        Value::Null => Sq::Null,
        Value::Bool(b) => Sq::Integer(i64::from(*b)),
        Value::Int(n) => Sq::Integer(*n),
        Value::Float(f) => Sq::Real(*f),
        Value::Text(s) => Sq::Text(s.clone()),
        Value::Blob(b) => Sq::Blob(b.clone()),
        Value::Date(d) => Sq::Text(d.format("%Y-%m-%d").to_string()),
        Value::Time(t) => Sq::Text(t.format("%H:%M:%S").to_string()),
        Value::DateTime(ts) => Sq::Text(ts.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
    }
}

fn read_value(raw: ValueRef<'_>) -> Value {
    match raw {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(n) => Value::Int(n),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    }
}

/// Rows drained from a finished statement.
///
/// `rusqlite` ties row streaming to the statement borrow, so the rows of a
/// query are collected up front; the cursor contract stays forward-only and
/// dropping it releases everything either way.
struct BufferedRows {
    rows: VecDeque<Vec<Value>>,
}

impl RowCursor for BufferedRows {
    fn next_row(&mut self) -> Result<Option<Vec<Value>>> {
        Ok(self.rows.pop_front())
    }
}

/// A SQLite database connection.
pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl SqliteConnection {
    /// Opens a database file, creating it when missing.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = rusqlite::Connection::open(path)
            .map_err(|e| DbError::Connection(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Fails when SQLite cannot allocate the database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = rusqlite::Connection::open_in_memory()
            .map_err(|e| DbError::Connection(e.to_string()))?;
        Ok(Self { conn })
    }

    fn control(&mut self, sql: &'static str) -> Result<()> {
        trace!(sql, "transaction control");
        self.conn
            .execute_batch(sql)
            .map_err(|e| DbError::Connection(e.to_string()))
    }
}

impl Connection for SqliteConnection {
    fn execute(&mut self, statement: &Statement) -> Result<u64> {
        let fail = |e: rusqlite::Error| DbError::Execution {
            sql: String::from(statement.sql()),
            message: e.to_string(),
        };
        let mut stmt = self.conn.prepare(statement.sql()).map_err(fail)?;
        let affected = stmt
            .execute(rusqlite::params_from_iter(
                statement.params().iter().map(bind_value),
            ))
            .map_err(fail)?;
        Ok(affected as u64)
    }

    fn query(&mut self, statement: &Statement) -> Result<Box<dyn RowCursor + '_>> {
        let fail = |e: rusqlite::Error| DbError::Execution {
            sql: String::from(statement.sql()),
            message: e.to_string(),
        };
        let mut stmt = self.conn.prepare(statement.sql()).map_err(fail)?;
        let column_count = stmt.column_count();
        let mut rows = stmt
            .query(rusqlite::params_from_iter(
                statement.params().iter().map(bind_value),
            ))
            .map_err(fail)?;
        let mut buffered = VecDeque::new();
        while let Some(row) = rows.next().map_err(fail)? {
            let mut out = Vec::with_capacity(column_count);
            for i in 0..column_count {
                out.push(read_value(row.get_ref(i).map_err(fail)?));
            }
            buffered.push_back(out);
        }
        Ok(Box::new(BufferedRows { rows: buffered }))
    }

    fn last_insert_id(&mut self) -> Result<i64> {
        Ok(self.conn.last_insert_rowid())
    }

    fn begin(&mut self) -> Result<()> {
        self.control("BEGIN")
    }

    fn commit(&mut self) -> Result<()> {
        self.control("COMMIT")
    }

    fn rollback(&mut self) -> Result<()> {
        self.control("ROLLBACK")
    }
}
