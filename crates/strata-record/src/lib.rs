//! # strata-record
//!
//! Entity records over the strata-sql model: per-field change tracking,
//! keyed reads and minimal partial updates, plus transaction-outcome
//! reconciliation that keeps in-memory records consistent with the database
//! after a rollback.
//!
//! The execution boundary is the [`Connection`] trait: acquire a
//! connection, hand it to a [`Context`], commit or roll back, release. The
//! core never pools connections; one context owns one connection for one
//! unit of work.
//!
//! ```ignore
//! use strata_record::{Context, Record};
//!
//! let mut ctx = Context::new(conn, SqliteDialect::new());
//! ctx.begin()?;
//!
//! let mut employee = Record::new(employees.clone());
//! employee.create()?;
//! employee.set(&firstname, "Jane")?;
//! employee.set(&lastname, "Doe")?;
//! employee.update(&mut ctx)?;
//!
//! ctx.commit()?;
//! ```
//!
//! If the transaction rolls back instead, every record that wrote within it
//! is restored to its pre-mutation snapshot: values, modified flags and
//! state.

mod connection;
mod context;
mod error;
mod reader;
mod record;
mod rollback;

pub use connection::{Connection, RowCursor};
pub use context::Context;
pub use error::{DbError, Result};
pub use reader::Reader;
pub use record::{Record, RecordState};
pub use rollback::RollbackManager;
