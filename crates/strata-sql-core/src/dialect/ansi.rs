//! Generic ANSI SQL dialect.

use super::Dialect;
use crate::error::{BuildError, BuildResult};
use crate::schema::DataType;

/// A generic dialect following the SQL standard.
///
/// Useful as a rendering baseline and for tests; real deployments pick a
/// vendor driver.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnsiDialect;

impl AnsiDialect {
    /// Creates a new ANSI dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for AnsiDialect {
    fn name(&self) -> &'static str {
        "ansi"
    }

    fn map_data_type(&self, data_type: &DataType) -> BuildResult<String> {
        Ok(match data_type {
            DataType::Integer => String::from("BIGINT"),
            DataType::AutoInc => String::from("BIGINT GENERATED BY DEFAULT AS IDENTITY"),
            DataType::Float => String::from("DOUBLE PRECISION"),
            DataType::Decimal { precision, scale } => format!("DECIMAL({precision},{scale})"),
            DataType::Bool => String::from("BOOLEAN"),
            DataType::Text { size } if *size > 0 => format!("VARCHAR({size})"),
            DataType::Text { .. } | DataType::Clob => String::from("CLOB"),
            DataType::Char { size } => format!("CHAR({size})"),
            DataType::Date => String::from("DATE"),
            DataType::Time => String::from("TIME"),
            DataType::Timestamp => String::from("TIMESTAMP"),
            DataType::Blob => String::from("BLOB"),
            DataType::Unknown => {
                return Err(BuildError::UnsupportedType {
                    dialect: self.name(),
                    data_type: *data_type,
                })
            }
        })
    }
}
