//! # strata-sql-core
//!
//! A database-agnostic SQL model: tables and columns are described once, as
//! logical metadata, and compiled to dialect-correct SQL text on demand.
//!
//! This crate provides:
//! - a logical schema model (tables, views, columns, relations),
//! - a composable expression tree that renders under context flags,
//! - stateless dialect drivers (HSQLDB, H2, MySQL, PostgreSQL, SQLite),
//! - a statement builder producing immutable statements with ordered
//!   parameters,
//! - a DDL generator emitting dependency-ordered creation scripts.
//!
//! ## Building a statement
//!
//! ```rust
//! use strata_sql_core::dialect::PostgresDialect;
//! use strata_sql_core::render::ParamMode;
//! use strata_sql_core::schema::{autoinc, text, RowSet, Table};
//! use strata_sql_core::Command;
//!
//! let employees = Table::builder("employees")
//!     .column(autoinc("employee_id"))
//!     .column(text("lastname", 40).required())
//!     .primary_key(&["employee_id"])
//!     .build()
//!     .unwrap();
//!
//! let cmd = Command::new(employees.clone())
//!     .select(employees.column("lastname").unwrap())
//!     .where_and(employees.column("employee_id").unwrap().eq(5_i64));
//!
//! let stmt = cmd
//!     .select_statement(&PostgresDialect::new(), ParamMode::Prepared)
//!     .unwrap();
//! assert_eq!(
//!     stmt.sql(),
//!     "SELECT employees.lastname FROM employees WHERE employees.employee_id = ?"
//! );
//! ```
//!
//! ## Injection safety
//!
//! Caller-supplied values never reach the SQL text by concatenation: in
//! prepared mode every literal becomes a placeholder plus an ordered
//! parameter, and in inline mode the dialect escapes it. This holds for all
//! inputs, on every path.

pub mod command;
pub mod ddl;
pub mod dialect;
pub mod error;
pub mod expr;
pub mod render;
pub mod schema;
pub mod value;

pub use command::Command;
pub use ddl::{DdlGenerator, SqlScript};
pub use error::{BuildError, BuildResult};
pub use render::{ParamMode, RenderFlags, SqlBuilder, Statement};
pub use value::{ToValue, Value};
