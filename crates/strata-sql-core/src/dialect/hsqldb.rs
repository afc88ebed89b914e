//! HSQLDB dialect.

use super::Dialect;
use crate::error::{BuildError, BuildResult};
use crate::schema::DataType;

/// HSQLDB dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct HsqlDialect;

impl HsqlDialect {
    /// Creates a new HSQLDB dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for HsqlDialect {
    fn name(&self) -> &'static str {
        "hsqldb"
    }

    fn map_data_type(&self, data_type: &DataType) -> BuildResult<String> {
        Ok(match data_type {
            DataType::Integer => String::from("BIGINT"),
            DataType::AutoInc => {
                String::from("BIGINT GENERATED BY DEFAULT AS IDENTITY (START WITH 1)")
            }
            DataType::Float => String::from("DOUBLE"),
            DataType::Decimal { precision, scale } => format!("DECIMAL({precision},{scale})"),
            DataType::Bool => String::from("BOOLEAN"),
            DataType::Text { size } if *size > 0 => format!("VARCHAR({size})"),
            DataType::Text { .. } | DataType::Clob => String::from("LONGVARCHAR"),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_mapping() {
        let d = HsqlDialect::new();
        assert!(d
            .map_data_type(&DataType::AutoInc)
            .unwrap()
            .contains("GENERATED BY DEFAULT AS IDENTITY"));
        assert_eq!(
            d.map_data_type(&DataType::Text { size: 0 }).unwrap(),
            "LONGVARCHAR"
        );
    }
}
