//! Runtime SQL values.
//!
//! `Value` is the dynamic payload carried by literals, bound parameters and
//! record fields. Values are logical; how a value is written into SQL text is
//! the dialect's business.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::schema::DataType;

/// A dynamically typed SQL value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
    /// Calendar date.
    Date(NaiveDate),
    /// Time of day.
    Time(NaiveTime),
    /// Date and time without timezone.
    DateTime(NaiveDateTime),
}

impl Value {
    /// Returns whether this value is NULL.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the logical data type this value naturally carries.
    ///
    /// NULL reports [`DataType::Unknown`] since it carries no type of its own.
    #[must_use]
    pub const fn data_type(&self) -> DataType {
        match self {
            Self::Null => DataType::Unknown,
            Self::Bool(_) => DataType::Bool,
            Self::Int(_) => DataType::Integer,
            Self::Float(_) => DataType::Float,
            Self::Text(_) => DataType::Text { size: 0 },
            Self::Blob(_) => DataType::Blob,
            Self::Date(_) => DataType::Date,
            Self::Time(_) => DataType::Time,
            Self::DateTime(_) => DataType::Timestamp,
        }
    }

    /// Returns whether this value may be stored in a column of the given
    /// declared type.
    ///
    /// NULL is compatible with every type; the required-field check is a
    /// separate concern. Integers are accepted by float, decimal and boolean
    /// columns (boolean-as-integer normalization), text is accepted by
    /// temporal columns so ISO strings can round-trip through drivers that
    /// have no native temporal type.
    #[must_use]
    pub fn is_compatible_with(&self, data_type: &DataType) -> bool {
        match (self, data_type) {
            (Self::Null, _) | (_, DataType::Unknown) => true,
            (Self::Int(_), DataType::Integer | DataType::AutoInc) => true,
            (Self::Int(_) | Self::Float(_), DataType::Float | DataType::Decimal { .. }) => true,
            (Self::Int(n), DataType::Bool) => *n == 0 || *n == 1,
            (Self::Bool(_), DataType::Bool) => true,
            (
                Self::Text(_),
                DataType::Text { .. }
                | DataType::Char { .. }
                | DataType::Clob
                | DataType::Date
                | DataType::Time
                | DataType::Timestamp,
            ) => true,
            (Self::Blob(_), DataType::Blob) => true,
            (Self::Date(_), DataType::Date | DataType::Timestamp) => true,
            (Self::Time(_), DataType::Time) => true,
            (Self::DateTime(_), DataType::Timestamp | DataType::Date) => true,
            _ => false,
        }
    }
}

/// Trait for types that convert into a [`Value`].
pub trait ToValue {
    /// Converts the value into a [`Value`].
    fn to_value(self) -> Value;
}

impl ToValue for Value {
    fn to_value(self) -> Value {
        self
    }
}

impl ToValue for &Value {
    fn to_value(self) -> Value {
        self.clone()
    }
}

impl ToValue for bool {
    fn to_value(self) -> Value {
        Value::Bool(self)
    }
}

impl ToValue for i64 {
    fn to_value(self) -> Value {
        Value::Int(self)
    }
}

impl ToValue for i32 {
    fn to_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl ToValue for i16 {
    fn to_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl ToValue for u32 {
    fn to_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl ToValue for f64 {
    fn to_value(self) -> Value {
        Value::Float(self)
    }
}

impl ToValue for f32 {
    fn to_value(self) -> Value {
        Value::Float(f64::from(self))
    }
}

impl ToValue for String {
    fn to_value(self) -> Value {
        Value::Text(self)
    }
}

impl ToValue for &str {
    fn to_value(self) -> Value {
        Value::Text(String::from(self))
    }
}

impl ToValue for Vec<u8> {
    fn to_value(self) -> Value {
        Value::Blob(self)
    }
}

impl ToValue for &[u8] {
    fn to_value(self) -> Value {
        Value::Blob(self.to_vec())
    }
}

impl ToValue for NaiveDate {
    fn to_value(self) -> Value {
        Value::Date(self)
    }
}

impl ToValue for NaiveTime {
    fn to_value(self) -> Value {
        Value::Time(self)
    }
}

impl ToValue for NaiveDateTime {
    fn to_value(self) -> Value {
        Value::DateTime(self)
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_value_conversions() {
        assert_eq!(true.to_value(), Value::Bool(true));
        assert_eq!(42_i32.to_value(), Value::Int(42));
        assert_eq!(2.5_f64.to_value(), Value::Float(2.5));
        assert_eq!("hello".to_value(), Value::Text(String::from("hello")));
        assert_eq!(None::<i32>.to_value(), Value::Null);
        assert_eq!(Some(7_i64).to_value(), Value::Int(7));
    }

    #[test]
    fn test_null_compatible_with_everything() {
        for dt in [DataType::Integer, DataType::Bool, DataType::Blob] {
            assert!(Value::Null.is_compatible_with(&dt));
        }
    }

    #[test]
    fn test_boolean_as_integer() {
        assert!(Value::Int(1).is_compatible_with(&DataType::Bool));
        assert!(Value::Int(0).is_compatible_with(&DataType::Bool));
        assert!(!Value::Int(2).is_compatible_with(&DataType::Bool));
    }

    #[test]
    fn test_text_incompatible_with_numeric() {
        assert!(!Value::Text(String::from("x")).is_compatible_with(&DataType::Integer));
    }
}
