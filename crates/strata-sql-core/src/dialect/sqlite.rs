//! SQLite dialect.

use super::Dialect;
use crate::error::{BuildError, BuildResult};
use crate::expr::SqlFunc;
use crate::render::SqlBuilder;
use crate::schema::{Column, DataType, RowSet, Table};

/// SQLite dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns whether the table's key is a single auto-increment column,
    /// which SQLite requires to be declared inline as
    /// `INTEGER PRIMARY KEY AUTOINCREMENT`.
    fn has_inline_rowid_key(table: &Table) -> bool {
        table.primary_key().len() == 1
            && *table.primary_key()[0].data_type() == DataType::AutoInc
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    /// SQLite has no boolean type; booleans are stored as 0/1 integers.
    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "1"
        } else {
            "0"
        }
    }

    fn map_data_type(&self, data_type: &DataType) -> BuildResult<String> {
        Ok(match data_type {
            DataType::Integer | DataType::AutoInc | DataType::Bool => String::from("INTEGER"),
            DataType::Float => String::from("REAL"),
            DataType::Decimal { precision, scale } => format!("NUMERIC({precision},{scale})"),
            DataType::Text { .. } | DataType::Char { .. } | DataType::Clob => String::from("TEXT"),
            DataType::Date => String::from("DATE"),
            DataType::Time => String::from("TIME"),
            DataType::Timestamp => String::from("DATETIME"),
            DataType::Blob => String::from("BLOB"),
            DataType::Unknown => {
                return Err(BuildError::UnsupportedType {
                    dialect: self.name(),
                    data_type: *data_type,
                })
            }
        })
    }

    fn function_phrase(&self, func: SqlFunc) -> &'static str {
        match func {
            SqlFunc::Substring => "substr(?, {0}, {1})",
            other => super::ansi_function_phrase(other),
        }
    }

    /// SQLite cannot add constraints to an existing table; the script phase
    /// that would emit ALTER TABLE ... ADD CONSTRAINT degrades to a no-op.
    fn supports_add_constraint(&self) -> bool {
        false
    }

    fn ddl_column(
        &self,
        table: &Table,
        column: &Column,
        builder: &mut SqlBuilder<'_>,
    ) -> BuildResult<()> {
        builder.append_identifier(column.name());
        builder.append_char(' ');
        builder.append(&self.map_data_type(column.data_type())?);
        if Self::has_inline_rowid_key(table) && table.primary_key()[0] == *column {
            builder.append(" PRIMARY KEY AUTOINCREMENT");
            return Ok(());
        }
        if column.required() {
            builder.append(" NOT NULL");
        }
        if let Some(default) = column.default_value() {
            builder.append(" DEFAULT ");
            builder.append_value(default);
        }
        Ok(())
    }

    fn ddl_needs_primary_key_clause(&self, table: &Table) -> bool {
        !table.primary_key().is_empty() && !Self::has_inline_rowid_key(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{ParamMode, SqlBuilder};
    use crate::schema::{autoinc, text};

    #[test]
    fn test_boolean_as_integer() {
        let d = SqliteDialect::new();
        assert_eq!(d.boolean_literal(true), "1");
        assert_eq!(d.boolean_literal(false), "0");
    }

    #[test]
    fn test_rowid_key_is_inline() {
        let table = Table::builder("employees")
            .column(autoinc("employee_id"))
            .column(text("lastname", 40).required())
            .primary_key(&["employee_id"])
            .build()
            .unwrap();

        let d = SqliteDialect::new();
        let mut b = SqlBuilder::with_mode(&d, ParamMode::Inline);
        d.ddl_create_table(&table, &mut b).unwrap();
        let sql = b.finish().sql().to_string();

        assert!(sql.contains("employee_id INTEGER PRIMARY KEY AUTOINCREMENT"));
        assert!(!sql.contains(",\n    PRIMARY KEY"));
    }
}
