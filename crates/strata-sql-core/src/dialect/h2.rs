//! H2 dialect.

use super::Dialect;
use crate::error::{BuildError, BuildResult};
use crate::schema::DataType;

/// H2 dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct H2Dialect;

impl H2Dialect {
    /// Creates a new H2 dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for H2Dialect {
    fn name(&self) -> &'static str {
        "h2"
    }

    fn map_data_type(&self, data_type: &DataType) -> BuildResult<String> {
        Ok(match data_type {
            DataType::Integer => String::from("BIGINT"),
            DataType::AutoInc => String::from("BIGINT GENERATED BY DEFAULT AS IDENTITY"),
            DataType::Float => String::from("DOUBLE PRECISION"),
            DataType::Decimal { precision, scale } => format!("NUMERIC({precision},{scale})"),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_mapping() {
        let d = H2Dialect::new();
        assert_eq!(
            d.map_data_type(&DataType::AutoInc).unwrap(),
            "BIGINT GENERATED BY DEFAULT AS IDENTITY"
        );
        assert_eq!(d.map_data_type(&DataType::Clob).unwrap(), "CLOB");
    }
}
