//! MySQL dialect.

use super::Dialect;
use crate::error::{BuildError, BuildResult};
use crate::expr::SqlFunc;
use crate::render::SqlBuilder;
use crate::schema::{Column, DataType, Table};

/// MySQL dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlDialect;

impl MySqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn identifier_quote(&self) -> char {
        '`'
    }

    /// MySQL treats `\` as an escape character inside string literals, so
    /// backslashes are doubled in addition to the ANSI quote doubling.
    fn escape_string(&self, text: &str, out: &mut String) {
        for c in text.chars() {
            match c {
                '\'' => out.push_str("''"),
                '\\' => out.push_str("\\\\"),
                _ => out.push(c),
            }
        }
    }

    fn map_data_type(&self, data_type: &DataType) -> BuildResult<String> {
        Ok(match data_type {
            DataType::Integer | DataType::AutoInc => String::from("BIGINT"),
            DataType::Float => String::from("DOUBLE"),
            DataType::Decimal { precision, scale } => format!("DECIMAL({precision},{scale})"),
            DataType::Bool => String::from("BOOLEAN"),
            DataType::Text { size } if *size > 0 => format!("VARCHAR({size})"),
            DataType::Text { .. } | DataType::Clob => String::from("TEXT"),
            DataType::Char { size } => format!("CHAR({size})"),
            DataType::Date => String::from("DATE"),
            DataType::Time => String::from("TIME"),
            // DATETIME, not TIMESTAMP: MySQL TIMESTAMP columns auto-update
            // and are range-limited.
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

    fn convert_phrase(
        &self,
        target: &DataType,
        _source: &DataType,
        format: Option<&str>,
    ) -> BuildResult<String> {
        Ok(match target {
            DataType::Bool => String::from("CAST(? AS UNSIGNED)"),
            DataType::Integer | DataType::AutoInc => String::from("CAST(? AS SIGNED)"),
            DataType::Decimal { precision, scale } => {
                format!("CAST(? AS DECIMAL({precision},{scale}))")
            }
            DataType::Float => String::from("CAST(? AS DECIMAL)"),
            DataType::Date => String::from("CAST(? AS DATE)"),
            DataType::Time => String::from("CAST(? AS TIME)"),
            DataType::Timestamp => String::from("CAST(? AS DATETIME)"),
            DataType::Text { .. } | DataType::Char { .. } | DataType::Clob => match format {
                Some(fmt) => format!("CAST(? AS CHAR {fmt})"),
                None => String::from("CAST(? AS CHAR)"),
            },
            DataType::Blob => String::from("CAST(? AS BINARY)"),
            DataType::Unknown => {
                return Err(BuildError::UnsupportedType {
                    dialect: self.name(),
                    data_type: *target,
                })
            }
        })
    }

    fn function_phrase(&self, func: SqlFunc) -> &'static str {
        match func {
            SqlFunc::Concat => "concat(?, {0})",
            SqlFunc::Modulo => "mod(?, {0})",
            other => super::ansi_function_phrase(other),
        }
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
        if column.required() {
            builder.append(" NOT NULL");
        }
        if *column.data_type() == DataType::AutoInc {
            builder.append(" AUTO_INCREMENT");
        }
        if let Some(default) = column.default_value() {
            builder.append(" DEFAULT ");
            builder.append_value(default);
        }
        let _ = table;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backslash_doubling() {
        let dialect = MySqlDialect::new();
        let mut out = String::new();
        dialect.escape_string("Tarkk\\'ampujankatu", &mut out);
        assert_eq!(out, "Tarkk\\\\''ampujankatu");
    }

    #[test]
    fn test_concat_phrase() {
        let dialect = MySqlDialect::new();
        assert_eq!(dialect.function_phrase(SqlFunc::Concat), "concat(?, {0})");
        assert_eq!(dialect.function_phrase(SqlFunc::Upper), "upper(?)");
    }

    #[test]
    fn test_identifier_quote() {
        let dialect = MySqlDialect::new();
        assert_eq!(dialect.quote_identifier("order"), "`order`");
        assert_eq!(dialect.quote_identifier("employees"), "employees");
    }
}
