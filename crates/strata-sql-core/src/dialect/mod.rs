//! SQL dialect drivers.
//!
//! One driver per database product. Drivers are stateless unit structs: a
//! single instance may serve any number of concurrent statement renders.
//! [`AnsiDialect`] supplies standard-SQL defaults; vendor drivers override
//! only where their product deviates.

mod ansi;
mod h2;
mod hsqldb;
mod mysql;
mod postgres;
mod sqlite;

pub use ansi::AnsiDialect;
pub use h2::H2Dialect;
pub use hsqldb::HsqlDialect;
pub use mysql::MySqlDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;

use crate::error::BuildResult;
use crate::expr::SqlFunc;
use crate::render::SqlBuilder;
use crate::schema::{Column, DataType, Relation, RowSet, Table, TableIndex, View};

/// Reserved words shared by the dialect implementations.
///
/// Identifiers matching an entry (case-insensitive) are quoted; everything
/// else is written bare, which keeps generated SQL readable.
const ANSI_RESERVED: &[&str] = &[
    "ALL", "AND", "AS", "ASC", "BETWEEN", "BY", "CASE", "CHECK", "COLUMN", "CONSTRAINT", "CREATE",
    "CROSS", "CURRENT_DATE", "CURRENT_TIME", "CURRENT_TIMESTAMP", "DEFAULT", "DELETE", "DESC",
    "DISTINCT", "DROP", "ELSE", "EXISTS", "FOREIGN", "FROM", "FULL", "GROUP", "HAVING", "IN",
    "INDEX", "INNER", "INSERT", "INTO", "IS", "JOIN", "KEY", "LEFT", "LIKE", "LIMIT", "NOT",
    "NULL", "ON", "OR", "ORDER", "OUTER", "PRIMARY", "REFERENCES", "RIGHT", "SELECT", "SET",
    "TABLE", "THEN", "UNION", "UNIQUE", "UPDATE", "VALUES", "VIEW", "WHEN", "WHERE",
];

/// The standard function templates, shared by the trait default and the
/// vendor drivers that override only a few entries.
pub(crate) fn ansi_function_phrase(func: SqlFunc) -> &'static str {
    match func {
        SqlFunc::Upper => "upper(?)",
        SqlFunc::Lower => "lower(?)",
        SqlFunc::Trim => "trim(?)",
        SqlFunc::Length => "length(?)",
        SqlFunc::Substring => "substring(?, {0}, {1})",
        SqlFunc::Coalesce => "coalesce(?, {0})",
        SqlFunc::Concat => "? || {0}",
        SqlFunc::Abs => "abs(?)",
        SqlFunc::Round => "round(?, {0})",
        SqlFunc::Floor => "floor(?)",
        SqlFunc::Ceiling => "ceiling(?)",
        SqlFunc::Modulo => "((?) % {0})",
    }
}

/// Trait for dialect-specific SQL generation.
///
/// Every method has an ANSI default except [`Dialect::name`] and
/// [`Dialect::map_data_type`]; a driver overrides exactly the points where
/// its product differs. All methods take `&self` only; drivers hold no
/// per-statement state.
pub trait Dialect {
    /// Returns the dialect name.
    fn name(&self) -> &'static str;

    /// Returns the identifier quote character.
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Returns whether the identifier is a reserved word of this dialect.
    fn is_reserved(&self, ident: &str) -> bool {
        let upper = ident.to_ascii_uppercase();
        ANSI_RESERVED.contains(&upper.as_str())
    }

    /// Quotes an identifier when the dialect requires it.
    ///
    /// Plain identifiers (letter or underscore start, alphanumeric rest) that
    /// are not reserved words are written bare.
    fn quote_identifier(&self, name: &str) -> String {
        let plain = !name.is_empty()
            && name
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            && !self.is_reserved(name);
        if plain {
            String::from(name)
        } else {
            let q = self.identifier_quote();
            format!("{q}{name}{q}")
        }
    }

    /// Escapes a string literal body into `out`.
    ///
    /// The ANSI rule doubles single quotes and leaves every other character
    /// alone. MySQL additionally doubles backslashes; that asymmetry is
    /// deliberate per-dialect behavior.
    fn escape_string(&self, text: &str, out: &mut String) {
        for c in text.chars() {
            if c == '\'' {
                out.push_str("''");
            } else {
                out.push(c);
            }
        }
    }

    /// Returns the parameter placeholder.
    fn parameter_placeholder(&self) -> &'static str {
        "?"
    }

    /// Renders a boolean literal.
    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "TRUE"
        } else {
            "FALSE"
        }
    }

    /// Maps a logical data type to the physical type name.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedType`](crate::error::BuildError::UnsupportedType)
    /// when the dialect has no physical representation for the type. This
    /// surfaces at DDL generation time, never at query time.
    fn map_data_type(&self, data_type: &DataType) -> BuildResult<String>;

    /// Returns the cast template for converting to `target`.
    ///
    /// `?` marks the spot of the inner expression. `source` and `format` let
    /// a driver pick a more specific phrase; the default ignores both.
    ///
    /// # Errors
    ///
    /// Fails when the target type has no physical mapping.
    fn convert_phrase(
        &self,
        target: &DataType,
        _source: &DataType,
        _format: Option<&str>,
    ) -> BuildResult<String> {
        Ok(format!("CAST(? AS {})", self.map_data_type(target)?))
    }

    /// Returns the template for a scalar function call.
    ///
    /// `?` marks the first argument, `{0}`, `{1}` the following ones.
    fn function_phrase(&self, func: SqlFunc) -> &'static str {
        ansi_function_phrase(func)
    }

    /// Returns whether LIMIT/OFFSET clauses are supported.
    fn supports_limit_offset(&self) -> bool {
        true
    }

    /// Returns whether constraints can be added with ALTER TABLE.
    ///
    /// When false, foreign keys are emitted inside CREATE TABLE instead and
    /// the ALTER-based script phase degrades to a logged no-op.
    fn supports_add_constraint(&self) -> bool {
        true
    }

    /// Returns whether CREATE VIEW is supported.
    fn supports_create_view(&self) -> bool {
        true
    }

    /// Appends the LIMIT/OFFSET clause.
    fn append_limit(&self, builder: &mut SqlBuilder<'_>, limit: Option<u64>, offset: Option<u64>) {
        if let Some(n) = limit {
            builder.append(&format!(" LIMIT {n}"));
        }
        if let Some(n) = offset {
            builder.append(&format!(" OFFSET {n}"));
        }
    }

    /// Appends a column definition for CREATE TABLE.
    ///
    /// # Errors
    ///
    /// Fails when the column type cannot be mapped.
    fn ddl_column(
        &self,
        table: &Table,
        column: &Column,
        builder: &mut SqlBuilder<'_>,
    ) -> BuildResult<()> {
        let _ = table;
        builder.append_identifier(column.name());
        builder.append_char(' ');
        builder.append(&self.map_data_type(column.data_type())?);
        if column.required() {
            builder.append(" NOT NULL");
        }
        if let Some(default) = column.default_value() {
            builder.append(" DEFAULT ");
            builder.append_value(default);
        }
        Ok(())
    }

    /// Returns whether CREATE TABLE needs an explicit PRIMARY KEY clause.
    fn ddl_needs_primary_key_clause(&self, table: &Table) -> bool {
        !table.primary_key().is_empty()
    }

    /// Appends a CREATE TABLE statement.
    ///
    /// # Errors
    ///
    /// Fails when any column type cannot be mapped.
    fn ddl_create_table(&self, table: &Table, builder: &mut SqlBuilder<'_>) -> BuildResult<()> {
        builder.append("CREATE TABLE ");
        builder.append_identifier(table.name());
        builder.append(" (");
        for (i, column) in table.columns().iter().enumerate() {
            if i > 0 {
                builder.append_char(',');
            }
            builder.append("\n    ");
            self.ddl_column(table, column, builder)?;
        }
        if self.ddl_needs_primary_key_clause(table) {
            builder.append(",\n    PRIMARY KEY (");
            for (i, column) in table.primary_key().iter().enumerate() {
                if i > 0 {
                    builder.append(", ");
                }
                builder.append_identifier(column.name());
            }
            builder.append_char(')');
        }
        builder.append("\n)");
        Ok(())
    }

    /// Appends a CREATE INDEX statement.
    fn ddl_create_index(&self, table: &Table, index: &TableIndex, builder: &mut SqlBuilder<'_>) {
        builder.append("CREATE ");
        if index.unique() {
            builder.append("UNIQUE ");
        }
        builder.append("INDEX ");
        builder.append_identifier(index.name());
        builder.append(" ON ");
        builder.append_identifier(table.name());
        builder.append(" (");
        for (i, column) in index.columns().iter().enumerate() {
            if i > 0 {
                builder.append(", ");
            }
            builder.append_identifier(column.name());
        }
        builder.append_char(')');
    }

    /// Appends an ALTER TABLE ... ADD CONSTRAINT ... FOREIGN KEY statement.
    fn ddl_add_relation(&self, relation: &Relation, builder: &mut SqlBuilder<'_>) {
        builder.append("ALTER TABLE ");
        builder.append_identifier(relation.source_table());
        builder.append(" ADD CONSTRAINT ");
        builder.append_identifier(relation.name());
        builder.append(" FOREIGN KEY (");
        for (i, (source, _)) in relation.pairs().iter().enumerate() {
            if i > 0 {
                builder.append(", ");
            }
            builder.append_identifier(source.name());
        }
        builder.append(") REFERENCES ");
        builder.append_identifier(relation.target_table());
        builder.append(" (");
        for (i, (_, target)) in relation.pairs().iter().enumerate() {
            if i > 0 {
                builder.append(", ");
            }
            builder.append_identifier(target.name());
        }
        builder.append_char(')');
    }

    /// Appends a CREATE VIEW statement.
    fn ddl_create_view(&self, view: &View, builder: &mut SqlBuilder<'_>) {
        builder.append("CREATE VIEW ");
        builder.append_identifier(view.name());
        builder.append(" (");
        for (i, column) in view.columns().iter().enumerate() {
            if i > 0 {
                builder.append(", ");
            }
            builder.append_identifier(column.name());
        }
        builder.append(")\nAS\n");
        builder.append(view.query());
    }

    /// Appends a DROP statement for the named object.
    fn ddl_drop(&self, kind: &str, name: &str, builder: &mut SqlBuilder<'_>) {
        builder.append("DROP ");
        builder.append(kind);
        builder.append_char(' ');
        builder.append_identifier(name);
    }
}
