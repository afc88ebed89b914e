//! PostgreSQL dialect.

use super::Dialect;
use crate::error::{BuildError, BuildResult};
use crate::schema::DataType;

/// PostgreSQL dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn map_data_type(&self, data_type: &DataType) -> BuildResult<String> {
        Ok(match data_type {
            DataType::Integer => String::from("BIGINT"),
            // SERIAL types instead of an AUTOINCREMENT keyword.
            DataType::AutoInc => String::from("BIGSERIAL"),
            DataType::Float => String::from("DOUBLE PRECISION"),
            DataType::Decimal { precision, scale } => format!("NUMERIC({precision},{scale})"),
            DataType::Bool => String::from("BOOLEAN"),
            DataType::Text { size } if *size > 0 => format!("VARCHAR({size})"),
            DataType::Text { .. } | DataType::Clob => String::from("TEXT"),
            DataType::Char { size } => format!("CHAR({size})"),
            DataType::Date => String::from("DATE"),
            DataType::Time => String::from("TIME"),
            DataType::Timestamp => String::from("TIMESTAMP"),
            DataType::Blob => String::from("BYTEA"),
            DataType::Unknown => {
                return Err(BuildError::UnsupportedType {
                    dialect: self.name(),
                    data_type: *data_type,
                })
            }
        })
    }
}
