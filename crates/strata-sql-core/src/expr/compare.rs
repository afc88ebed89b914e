//! Comparison and boolean composition nodes.

use crate::error::BuildResult;
use crate::expr::ColumnExpr;
use crate::render::{RenderFlags, SqlBuilder};
use crate::schema::Column;
use crate::value::{ToValue, Value};

/// Binary comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Equality.
    Eq,
    /// Inequality.
    NotEq,
    /// Less than.
    Lt,
    /// Less than or equal.
    LtEq,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    GtEq,
    /// Pattern match.
    Like,
    /// Negated pattern match.
    NotLike,
}

impl CompareOp {
    /// Returns the SQL operator text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
        }
    }
}

/// Boolean composition operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    /// Conjunction.
    And,
    /// Disjunction.
    Or,
}

impl LogicalOp {
    /// Returns the SQL operator text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// A boolean expression tree: comparisons composed with AND/OR/NOT.
#[derive(Debug, Clone)]
pub enum CompareExpr {
    /// A binary comparison.
    Cmp {
        /// Left operand.
        left: ColumnExpr,
        /// Operator.
        op: CompareOp,
        /// Right operand.
        right: ColumnExpr,
    },
    /// NULL test.
    IsNull {
        /// Tested expression.
        expr: ColumnExpr,
        /// Whether this is IS NOT NULL.
        negated: bool,
    },
    /// Range test.
    Between {
        /// Tested expression.
        expr: ColumnExpr,
        /// Lower bound.
        low: ColumnExpr,
        /// Upper bound.
        high: ColumnExpr,
        /// Whether this is NOT BETWEEN.
        negated: bool,
    },
    /// Membership test.
    InList {
        /// Tested expression.
        expr: ColumnExpr,
        /// Candidate values.
        values: Vec<ColumnExpr>,
        /// Whether this is NOT IN.
        negated: bool,
    },
    /// AND/OR composition. Composite children are parenthesized when
    /// rendered, so operator precedence never depends on the dialect.
    AndOr {
        /// Left side.
        left: Box<CompareExpr>,
        /// Composition operator.
        op: LogicalOp,
        /// Right side.
        right: Box<CompareExpr>,
    },
    /// Negation.
    Not(Box<CompareExpr>),
}

impl CompareExpr {
    /// Combines with another condition using AND.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::AndOr {
            left: Box::new(self),
            op: LogicalOp::And,
            right: Box::new(other),
        }
    }

    /// Combines with another condition using OR.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::AndOr {
            left: Box::new(self),
            op: LogicalOp::Or,
            right: Box::new(other),
        }
    }

    /// Negates this condition.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Returns whether this node is an AND/OR composition.
    #[must_use]
    pub const fn is_composite(&self) -> bool {
        matches!(self, Self::AndOr { .. })
    }

    /// Appends every referenced column to `out`.
    pub fn collect_columns(&self, out: &mut Vec<Column>) {
        match self {
            Self::Cmp { left, right, .. } => {
                left.collect_columns(out);
                right.collect_columns(out);
            }
            Self::IsNull { expr, .. } => expr.collect_columns(out),
            Self::Between {
                expr, low, high, ..
            } => {
                expr.collect_columns(out);
                low.collect_columns(out);
                high.collect_columns(out);
            }
            Self::InList { expr, values, .. } => {
                expr.collect_columns(out);
                for v in values {
                    v.collect_columns(out);
                }
            }
            Self::AndOr { left, right, .. } => {
                left.collect_columns(out);
                right.collect_columns(out);
            }
            Self::Not(inner) => inner.collect_columns(out),
        }
    }

    /// Renders this condition.
    ///
    /// # Errors
    ///
    /// Fails when a nested expression cannot be rendered for the dialect.
    pub fn render_into(&self, builder: &mut SqlBuilder<'_>, flags: RenderFlags) -> BuildResult<()> {
        match self {
            Self::Cmp { left, op, right } => {
                // Comparing against a NULL literal folds into a NULL test.
                if let ColumnExpr::Literal { value: Value::Null, .. } = right {
                    if matches!(op, CompareOp::Eq | CompareOp::NotEq) {
                        left.render_into(builder, flags)?;
                        builder.append(if *op == CompareOp::Eq {
                            " IS NULL"
                        } else {
                            " IS NOT NULL"
                        });
                        return Ok(());
                    }
                }
                left.render_into(builder, flags)?;
                builder.append_char(' ');
                builder.append(op.as_str());
                builder.append_char(' ');
                right.render_into(builder, flags)
            }
            Self::IsNull { expr, negated } => {
                expr.render_into(builder, flags)?;
                builder.append(if *negated { " IS NOT NULL" } else { " IS NULL" });
                Ok(())
            }
            Self::Between {
                expr,
                low,
                high,
                negated,
            } => {
                expr.render_into(builder, flags)?;
                builder.append(if *negated { " NOT BETWEEN " } else { " BETWEEN " });
                low.render_into(builder, flags)?;
                builder.append(" AND ");
                high.render_into(builder, flags)
            }
            Self::InList {
                expr,
                values,
                negated,
            } => {
                expr.render_into(builder, flags)?;
                builder.append(if *negated { " NOT IN (" } else { " IN (" });
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        builder.append(", ");
                    }
                    value.render_into(builder, flags)?;
                }
                builder.append_char(')');
                Ok(())
            }
            Self::AndOr { left, op, right } => {
                Self::render_child(left, builder, flags)?;
                builder.append_char(' ');
                builder.append(op.as_str());
                builder.append_char(' ');
                Self::render_child(right, builder, flags)
            }
            Self::Not(inner) => {
                builder.append("NOT (");
                inner.render_into(builder, flags)?;
                builder.append_char(')');
                Ok(())
            }
        }
    }

    fn render_child(
        child: &Self,
        builder: &mut SqlBuilder<'_>,
        flags: RenderFlags,
    ) -> BuildResult<()> {
        if child.is_composite() {
            builder.append_char('(');
            child.render_into(builder, flags)?;
            builder.append_char(')');
            Ok(())
        } else {
            child.render_into(builder, flags)
        }
    }
}

impl ColumnExpr {
    fn cmp_value(self, op: CompareOp, value: impl ToValue) -> CompareExpr {
        let data_type = self.data_type();
        CompareExpr::Cmp {
            left: self,
            op,
            right: Self::typed_value(value, data_type),
        }
    }

    /// Equality against a value.
    #[must_use]
    pub fn eq(self, value: impl ToValue) -> CompareExpr {
        self.cmp_value(CompareOp::Eq, value)
    }

    /// Inequality against a value.
    #[must_use]
    pub fn not_eq(self, value: impl ToValue) -> CompareExpr {
        self.cmp_value(CompareOp::NotEq, value)
    }

    /// Less-than against a value.
    #[must_use]
    pub fn lt(self, value: impl ToValue) -> CompareExpr {
        self.cmp_value(CompareOp::Lt, value)
    }

    /// Less-than-or-equal against a value.
    #[must_use]
    pub fn lt_eq(self, value: impl ToValue) -> CompareExpr {
        self.cmp_value(CompareOp::LtEq, value)
    }

    /// Greater-than against a value.
    #[must_use]
    pub fn gt(self, value: impl ToValue) -> CompareExpr {
        self.cmp_value(CompareOp::Gt, value)
    }

    /// Greater-than-or-equal against a value.
    #[must_use]
    pub fn gt_eq(self, value: impl ToValue) -> CompareExpr {
        self.cmp_value(CompareOp::GtEq, value)
    }

    /// Pattern match against a value.
    #[must_use]
    pub fn like(self, pattern: impl ToValue) -> CompareExpr {
        self.cmp_value(CompareOp::Like, pattern)
    }

    /// Negated pattern match.
    #[must_use]
    pub fn not_like(self, pattern: impl ToValue) -> CompareExpr {
        self.cmp_value(CompareOp::NotLike, pattern)
    }

    /// Comparison against another expression.
    #[must_use]
    pub fn cmp_expr(self, op: CompareOp, right: impl Into<ColumnExpr>) -> CompareExpr {
        CompareExpr::Cmp {
            left: self,
            op,
            right: right.into(),
        }
    }

    /// Equality against another expression.
    #[must_use]
    pub fn eq_expr(self, right: impl Into<ColumnExpr>) -> CompareExpr {
        self.cmp_expr(CompareOp::Eq, right)
    }

    /// NULL test.
    #[must_use]
    pub fn is_null(self) -> CompareExpr {
        CompareExpr::IsNull {
            expr: self,
            negated: false,
        }
    }

    /// NOT NULL test.
    #[must_use]
    pub fn is_not_null(self) -> CompareExpr {
        CompareExpr::IsNull {
            expr: self,
            negated: true,
        }
    }

    /// Range test.
    #[must_use]
    pub fn between(self, low: impl ToValue, high: impl ToValue) -> CompareExpr {
        let data_type = self.data_type();
        CompareExpr::Between {
            expr: self,
            low: Self::typed_value(low, data_type),
            high: Self::typed_value(high, data_type),
            negated: false,
        }
    }

    /// Membership test.
    #[must_use]
    pub fn in_list<T: ToValue>(self, values: Vec<T>) -> CompareExpr {
        let data_type = self.data_type();
        CompareExpr::InList {
            expr: self,
            values: values
                .into_iter()
                .map(|v| Self::typed_value(v, data_type))
                .collect(),
            negated: false,
        }
    }

    /// Negated membership test.
    #[must_use]
    pub fn not_in_list<T: ToValue>(self, values: Vec<T>) -> CompareExpr {
        let data_type = self.data_type();
        CompareExpr::InList {
            expr: self,
            values: values
                .into_iter()
                .map(|v| Self::typed_value(v, data_type))
                .collect(),
            negated: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::AnsiDialect;
    use crate::render::{ParamMode, RenderFlags, SqlBuilder};
    use crate::schema::{text, RowSet, Table};

    fn columns() -> (ColumnExpr, ColumnExpr) {
        let t = Table::builder("employees")
            .column(text("firstname", 40))
            .column(text("lastname", 40))
            .build()
            .unwrap();
        (
            ColumnExpr::from(t.column("firstname").unwrap()),
            ColumnExpr::from(t.column("lastname").unwrap()),
        )
    }

    fn render(expr: &CompareExpr) -> String {
        let dialect = AnsiDialect::new();
        let mut b = SqlBuilder::with_mode(&dialect, ParamMode::Inline);
        expr.render_into(&mut b, RenderFlags::NAME).unwrap();
        b.finish().sql().to_string()
    }

    #[test]
    fn test_composite_children_are_parenthesized() {
        let (first, last) = columns();
        let expr = first
            .eq("Jane")
            .or(last.clone().eq("Doe").and(last.eq("Smith")));
        assert_eq!(
            render(&expr),
            "firstname = 'Jane' OR (lastname = 'Doe' AND lastname = 'Smith')"
        );
    }

    #[test]
    fn test_null_comparison_folds_to_is_null() {
        let (first, _) = columns();
        assert_eq!(render(&first.clone().eq(Value::Null)), "firstname IS NULL");
        assert_eq!(
            render(&first.not_eq(Value::Null)),
            "firstname IS NOT NULL"
        );
    }

    #[test]
    fn test_between_and_in() {
        let (first, _) = columns();
        assert_eq!(
            render(&first.clone().between("A", "M")),
            "firstname BETWEEN 'A' AND 'M'"
        );
        assert_eq!(
            render(&first.in_list(vec!["Ann", "Ben"])),
            "firstname IN ('Ann', 'Ben')"
        );
    }

    #[test]
    fn test_not_wraps_in_parens() {
        let (first, _) = columns();
        assert_eq!(render(&first.eq("X").not()), "NOT (firstname = 'X')");
    }
}
