//! Typed row reading.
//!
//! A [`Reader`] wraps a driver cursor and the selected columns. Rows advance
//! with [`Reader::move_next`]; values are converted lazily, per access, from
//! the raw driver value to the column's declared data type. Dropping the
//! reader releases the cursor no matter how far iteration got.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use strata_sql_core::schema::{Column, DataType};
use strata_sql_core::Value;

use crate::connection::RowCursor;
use crate::error::{DbError, Result};

/// Converts a raw driver value to a column's declared type.
///
/// Drivers without native temporal or boolean types hand back integers and
/// ISO text; this is where those are normalized.
pub(crate) fn convert_value(raw: Value, column: &Column) -> Result<Value> {
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let mismatch = |value: &Value| DbError::Conversion {
        column: String::from(column.name()),
        value: format!("{value:?}"),
    };
    Ok(match (column.data_type(), raw) {
        (DataType::Integer | DataType::AutoInc, Value::Int(n)) => Value::Int(n),
        (DataType::Bool, Value::Bool(b)) => Value::Bool(b),
        // Boolean-as-integer normalization.
        (DataType::Bool, Value::Int(n)) if n == 0 || n == 1 => Value::Bool(n == 1),
        (DataType::Float | DataType::Decimal { .. }, Value::Float(f)) => Value::Float(f),
        (DataType::Float, Value::Int(n)) => Value::Float(n as f64),
        (DataType::Decimal { .. }, Value::Int(n)) => Value::Int(n),
        (DataType::Decimal { .. }, Value::Text(s)) => match s.parse::<f64>() {
            Ok(f) => Value::Float(f),
            Err(_) => return Err(mismatch(&Value::Text(s))),
        },
        (
            DataType::Text { .. } | DataType::Char { .. } | DataType::Clob | DataType::Unknown,
            Value::Text(s),
        ) => Value::Text(s),
        (DataType::Date, Value::Date(d)) => Value::Date(d),
        (DataType::Date, Value::DateTime(ts)) => Value::Date(ts.date()),
        (DataType::Date, Value::Text(s)) => match NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
            Ok(d) => Value::Date(d),
            Err(_) => return Err(mismatch(&Value::Text(s))),
        },
        (DataType::Time, Value::Time(t)) => Value::Time(t),
        (DataType::Time, Value::Text(s)) => {
            match NaiveTime::parse_from_str(&s, "%H:%M:%S%.f")
                .or_else(|_| NaiveTime::parse_from_str(&s, "%H:%M:%S"))
            {
                Ok(t) => Value::Time(t),
                Err(_) => return Err(mismatch(&Value::Text(s))),
            }
        }
        (DataType::Timestamp, Value::DateTime(ts)) => Value::DateTime(ts),
        (DataType::Timestamp, Value::Date(d)) => {
            Value::DateTime(d.and_hms_opt(0, 0, 0).unwrap_or_default())
        }
        (DataType::Timestamp, Value::Text(s)) => {
            match NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S%.f")
                .or_else(|_| NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%.f"))
            {
                Ok(ts) => Value::DateTime(ts),
                Err(_) => return Err(mismatch(&Value::Text(s))),
            }
        }
        (DataType::Blob, Value::Blob(b)) => Value::Blob(b),
        (DataType::Unknown, raw) => raw,
        (_, raw) => return Err(mismatch(&raw)),
    })
}

/// A forward-only reader over the rows of one query.
pub struct Reader<'c> {
    cursor: Box<dyn RowCursor + 'c>,
    columns: Vec<Option<Column>>,
    row: Option<Vec<Value>>,
}

impl<'c> Reader<'c> {
    pub(crate) fn new(cursor: Box<dyn RowCursor + 'c>, columns: Vec<Option<Column>>) -> Self {
        Self {
            cursor,
            columns,
            row: None,
        }
    }

    /// Advances to the next row. Returns false when the result is exhausted.
    ///
    /// # Errors
    ///
    /// Fails when the driver reports an error while stepping.
    pub fn move_next(&mut self) -> Result<bool> {
        self.row = self.cursor.next_row()?;
        Ok(self.row.is_some())
    }

    fn current_row(&self) -> Result<&[Value]> {
        self.row.as_deref().ok_or(DbError::NoCurrentRow)
    }

    fn index_of(&self, column: &Column) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.as_ref() == Some(column))
            .ok_or_else(|| DbError::UnknownColumn(String::from(column.name())))
    }

    /// Returns the current row's value for a column, converted to the
    /// column's declared type.
    ///
    /// # Errors
    ///
    /// Fails when there is no current row, the column was not selected, or
    /// the raw value cannot be converted.
    pub fn value(&self, column: &Column) -> Result<Value> {
        let index = self.index_of(column)?;
        let row = self.current_row()?;
        convert_value(row[index].clone(), column)
    }

    /// Returns whether the column's value in the current row is NULL.
    ///
    /// # Errors
    ///
    /// Fails when there is no current row or the column was not selected.
    pub fn is_null(&self, column: &Column) -> Result<bool> {
        let index = self.index_of(column)?;
        Ok(self.current_row()?[index].is_null())
    }

    /// Returns an integer value.
    ///
    /// # Errors
    ///
    /// Fails when the value is NULL or not an integer.
    pub fn get_int(&self, column: &Column) -> Result<i64> {
        match self.value(column)? {
            Value::Int(n) => Ok(n),
            other => Err(self.type_error(column, &other)),
        }
    }

    /// Returns a floating point value; integers widen.
    ///
    /// # Errors
    ///
    /// Fails when the value is NULL or not numeric.
    pub fn get_float(&self, column: &Column) -> Result<f64> {
        match self.value(column)? {
            Value::Float(f) => Ok(f),
            Value::Int(n) => Ok(n as f64),
            other => Err(self.type_error(column, &other)),
        }
    }

    /// Returns a text value.
    ///
    /// # Errors
    ///
    /// Fails when the value is NULL or not text.
    pub fn get_text(&self, column: &Column) -> Result<String> {
        match self.value(column)? {
            Value::Text(s) => Ok(s),
            other => Err(self.type_error(column, &other)),
        }
    }

    /// Returns a boolean value.
    ///
    /// # Errors
    ///
    /// Fails when the value is NULL or not a (normalized) boolean.
    pub fn get_bool(&self, column: &Column) -> Result<bool> {
        match self.value(column)? {
            Value::Bool(b) => Ok(b),
            other => Err(self.type_error(column, &other)),
        }
    }

    /// Returns a date value.
    ///
    /// # Errors
    ///
    /// Fails when the value is NULL or not a date.
    pub fn get_date(&self, column: &Column) -> Result<NaiveDate> {
        match self.value(column)? {
            Value::Date(d) => Ok(d),
            other => Err(self.type_error(column, &other)),
        }
    }

    /// Returns a timestamp value.
    ///
    /// # Errors
    ///
    /// Fails when the value is NULL or not a timestamp.
    pub fn get_datetime(&self, column: &Column) -> Result<NaiveDateTime> {
        match self.value(column)? {
            Value::DateTime(ts) => Ok(ts),
            other => Err(self.type_error(column, &other)),
        }
    }

    /// Returns a blob value.
    ///
    /// # Errors
    ///
    /// Fails when the value is NULL or not binary.
    pub fn get_blob(&self, column: &Column) -> Result<Vec<u8>> {
        match self.value(column)? {
            Value::Blob(b) => Ok(b),
            other => Err(self.type_error(column, &other)),
        }
    }

    /// Releases the reader and its cursor.
    pub fn close(self) {
        drop(self);
    }

    fn type_error(&self, column: &Column, value: &Value) -> DbError {
        DbError::Conversion {
            column: String::from(column.name()),
            value: format!("{value:?}"),
        }
    }
}
