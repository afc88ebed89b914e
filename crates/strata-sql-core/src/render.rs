//! SQL text assembly.
//!
//! [`SqlBuilder`] is the single sink every expression node renders into, for
//! DML and DDL alike. It owns the output buffer, the ordered parameter list
//! and the dialect consulted for quoting and escaping.

use crate::dialect::Dialect;
use crate::value::Value;

/// How literal values reach the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamMode {
    /// Literals become `?` placeholders with an ordered parameter entry.
    Prepared,
    /// Literals are escaped by the dialect and written into the SQL text.
    Inline,
}

/// Render context flags.
///
/// A bit set selecting which aspects of an expression are rendered: the bare
/// name, the fully qualified name, the value, and alias decoration. Composite
/// nodes thread the same flags down to their children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderFlags(u8);

impl RenderFlags {
    /// Unqualified name.
    pub const NAME: Self = Self(1);
    /// Fully qualified name.
    pub const FULL_NAME: Self = Self(2);
    /// Value only.
    pub const VALUE: Self = Self(4);
    /// Alias decoration.
    pub const ALIAS: Self = Self(8);
    /// Default rendering: fully qualified name plus value.
    pub const DEFAULT: Self = Self(1 | 2 | 4);
    /// All flags set.
    pub const ALL: Self = Self(15);

    /// Returns whether every bit of `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the union of the two flag sets.
    #[must_use]
    pub const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns `self` with the bits of `other` cleared.
    #[must_use]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

/// A compiled, immutable statement: SQL text plus ordered parameters.
///
/// Parameter order matches the left-to-right order of placeholders in the
/// text, which is what prepared-statement binding requires.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    params: Vec<Value>,
}

impl Statement {
    /// Creates a statement from raw parts.
    ///
    /// Intended for DDL and driver-internal text; statement assembly normally
    /// goes through [`SqlBuilder::finish`].
    #[must_use]
    pub fn from_parts(sql: String, params: Vec<Value>) -> Self {
        Self { sql, params }
    }

    /// Returns the SQL text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns the bound parameters in placeholder order.
    #[must_use]
    pub fn params(&self) -> &[Value] {
        &self.params
    }
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.sql)
    }
}

/// The rendering sink.
pub struct SqlBuilder<'a> {
    dialect: &'a dyn Dialect,
    mode: ParamMode,
    sql: String,
    params: Vec<Value>,
}

impl<'a> SqlBuilder<'a> {
    /// Creates a builder in prepared-statement mode.
    #[must_use]
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self::with_mode(dialect, ParamMode::Prepared)
    }

    /// Creates a builder with an explicit parameter mode.
    #[must_use]
    pub fn with_mode(dialect: &'a dyn Dialect, mode: ParamMode) -> Self {
        Self {
            dialect,
            mode,
            sql: String::new(),
            params: Vec::new(),
        }
    }

    /// Returns the dialect being rendered for.
    #[must_use]
    pub fn dialect(&self) -> &'a dyn Dialect {
        self.dialect
    }

    /// Appends raw SQL text.
    pub fn append(&mut self, text: &str) {
        self.sql.push_str(text);
    }

    /// Appends a single character.
    pub fn append_char(&mut self, c: char) {
        self.sql.push(c);
    }

    /// Appends an identifier, quoted when the dialect requires it.
    pub fn append_identifier(&mut self, name: &str) {
        let quoted = self.dialect.quote_identifier(name);
        self.sql.push_str(&quoted);
    }

    /// Appends a qualified `table.column` identifier pair.
    pub fn append_qualified(&mut self, table: &str, name: &str) {
        self.append_identifier(table);
        self.sql.push('.');
        self.append_identifier(name);
    }

    /// Appends a literal value.
    ///
    /// In prepared mode this emits a placeholder and records the value in the
    /// parameter list; in inline mode the dialect escapes the value into the
    /// text. Caller input never reaches the SQL text unescaped through either
    /// path.
    pub fn append_value(&mut self, value: &Value) {
        match self.mode {
            ParamMode::Prepared => {
                self.sql.push_str(self.dialect.parameter_placeholder());
                self.params.push(value.clone());
            }
            ParamMode::Inline => self.append_inline(value),
        }
    }

    fn append_inline(&mut self, value: &Value) {
        match value {
            Value::Null => self.sql.push_str("NULL"),
            Value::Bool(b) => self.sql.push_str(self.dialect.boolean_literal(*b)),
            Value::Int(n) => self.sql.push_str(&n.to_string()),
            Value::Float(f) => self.sql.push_str(&f.to_string()),
            Value::Text(s) => self.append_text_literal(s),
            Value::Blob(bytes) => {
                self.sql.push_str("X'");
                for byte in bytes {
                    self.sql.push_str(&format!("{byte:02X}"));
                }
                self.sql.push('\'');
            }
            Value::Date(d) => self.append_text_literal(&d.format("%Y-%m-%d").to_string()),
            Value::Time(t) => self.append_text_literal(&t.format("%H:%M:%S").to_string()),
            Value::DateTime(ts) => {
                self.append_text_literal(&ts.format("%Y-%m-%d %H:%M:%S").to_string());
            }
        }
    }

    fn append_text_literal(&mut self, text: &str) {
        self.sql.push('\'');
        self.dialect.escape_string(text, &mut self.sql);
        self.sql.push('\'');
    }

    /// Completes rendering and returns the immutable statement.
    #[must_use]
    pub fn finish(self) -> Statement {
        Statement {
            sql: self.sql,
            params: self.params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::AnsiDialect;

    #[test]
    fn test_flags() {
        assert!(RenderFlags::DEFAULT.contains(RenderFlags::VALUE));
        assert!(!RenderFlags::DEFAULT.contains(RenderFlags::ALIAS));
        assert!(RenderFlags::ALL.contains(RenderFlags::DEFAULT));
        assert!(RenderFlags::DEFAULT
            .without(RenderFlags::VALUE)
            .contains(RenderFlags::NAME));
    }

    #[test]
    fn test_prepared_value_becomes_placeholder() {
        let dialect = AnsiDialect::new();
        let mut b = SqlBuilder::new(&dialect);
        b.append("name = ");
        b.append_value(&Value::Text(String::from("O'Brien")));
        let stmt = b.finish();
        assert_eq!(stmt.sql(), "name = ?");
        assert_eq!(stmt.params(), &[Value::Text(String::from("O'Brien"))]);
    }

    #[test]
    fn test_inline_value_is_escaped() {
        let dialect = AnsiDialect::new();
        let mut b = SqlBuilder::with_mode(&dialect, ParamMode::Inline);
        b.append_value(&Value::Text(String::from("O'Brien")));
        let stmt = b.finish();
        assert_eq!(stmt.sql(), "'O''Brien'");
        assert!(stmt.params().is_empty());
    }

    #[test]
    fn test_inline_blob() {
        let dialect = AnsiDialect::new();
        let mut b = SqlBuilder::with_mode(&dialect, ParamMode::Inline);
        b.append_value(&Value::Blob(vec![0x48, 0x49]));
        assert_eq!(b.finish().sql(), "X'4849'");
    }
}
