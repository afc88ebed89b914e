//! Expression tree nodes.
//!
//! Expressions are composable, immutable values. Composite nodes delegate
//! rendering to their children, threading the same context flags down, and
//! insert only dialect-independent punctuation themselves; everything
//! vendor-specific goes through the [`SqlBuilder`]'s dialect.

mod column;
mod compare;
mod func;
mod join;
mod order;
mod set;

pub use column::{count_all, ColumnExpr};
pub use compare::{CompareExpr, CompareOp, LogicalOp};
pub use func::{AggFunc, SqlFunc};
pub use join::{JoinExpr, JoinKind};
pub use order::OrderTerm;
pub use set::SetExpr;

use crate::error::BuildResult;
use crate::render::{RenderFlags, SqlBuilder};
use crate::schema::Column;
use crate::value::ToValue;

/// Renders a phrase template: `?` is replaced by the first argument,
/// `{0}`, `{1}`, ... by the following ones. Everything else is copied
/// verbatim.
pub(crate) fn render_template(
    builder: &mut SqlBuilder<'_>,
    template: &str,
    args: &[ColumnExpr],
    flags: RenderFlags,
) -> BuildResult<()> {
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '?' => {
                if let Some(arg) = args.first() {
                    arg.render_into(builder, flags)?;
                }
            }
            '{' => {
                let mut index = 0_usize;
                while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
                    index = index * 10 + d as usize;
                    chars.next();
                }
                if chars.peek() == Some(&'}') {
                    chars.next();
                }
                if let Some(arg) = args.get(index + 1) {
                    arg.render_into(builder, flags)?;
                }
            }
            other => builder.append_char(other),
        }
    }
    Ok(())
}

/// Comparison and expression shorthand on [`Column`].
///
/// These mirror the [`ColumnExpr`] combinators so the common case does not
/// need an explicit wrap.
impl Column {
    /// Returns this column as an expression node.
    #[must_use]
    pub fn expr(&self) -> ColumnExpr {
        ColumnExpr::from(self)
    }

    /// Equality against a value.
    #[must_use]
    pub fn eq(&self, value: impl ToValue) -> CompareExpr {
        self.expr().eq(value)
    }

    /// Inequality against a value.
    #[must_use]
    pub fn not_eq(&self, value: impl ToValue) -> CompareExpr {
        self.expr().not_eq(value)
    }

    /// Less-than against a value.
    #[must_use]
    pub fn lt(&self, value: impl ToValue) -> CompareExpr {
        self.expr().lt(value)
    }

    /// Less-than-or-equal against a value.
    #[must_use]
    pub fn lt_eq(&self, value: impl ToValue) -> CompareExpr {
        self.expr().lt_eq(value)
    }

    /// Greater-than against a value.
    #[must_use]
    pub fn gt(&self, value: impl ToValue) -> CompareExpr {
        self.expr().gt(value)
    }

    /// Greater-than-or-equal against a value.
    #[must_use]
    pub fn gt_eq(&self, value: impl ToValue) -> CompareExpr {
        self.expr().gt_eq(value)
    }

    /// Pattern match against a value.
    #[must_use]
    pub fn like(&self, pattern: impl ToValue) -> CompareExpr {
        self.expr().like(pattern)
    }

    /// NULL test.
    #[must_use]
    pub fn is_null(&self) -> CompareExpr {
        self.expr().is_null()
    }

    /// NOT NULL test.
    #[must_use]
    pub fn is_not_null(&self) -> CompareExpr {
        self.expr().is_not_null()
    }

    /// Range test.
    #[must_use]
    pub fn between(&self, low: impl ToValue, high: impl ToValue) -> CompareExpr {
        self.expr().between(low, high)
    }

    /// Membership test.
    #[must_use]
    pub fn in_list<T: ToValue>(&self, values: Vec<T>) -> CompareExpr {
        self.expr().in_list(values)
    }

    /// Equality against another expression, typically a column of a joined
    /// table.
    #[must_use]
    pub fn eq_expr(&self, right: impl Into<ColumnExpr>) -> CompareExpr {
        self.expr().eq_expr(right)
    }

    /// Upper-case expression over this column.
    #[must_use]
    pub fn upper(&self) -> ColumnExpr {
        self.expr().upper()
    }

    /// Lower-case expression over this column.
    #[must_use]
    pub fn lower(&self) -> ColumnExpr {
        self.expr().lower()
    }

    /// Sum aggregate over this column.
    #[must_use]
    pub fn sum(&self) -> ColumnExpr {
        self.expr().sum()
    }

    /// Minimum aggregate over this column.
    #[must_use]
    pub fn min(&self) -> ColumnExpr {
        self.expr().min()
    }

    /// Maximum aggregate over this column.
    #[must_use]
    pub fn max(&self) -> ColumnExpr {
        self.expr().max()
    }

    /// Average aggregate over this column.
    #[must_use]
    pub fn avg(&self) -> ColumnExpr {
        self.expr().avg()
    }

    /// Count aggregate over this column.
    #[must_use]
    pub fn count(&self) -> ColumnExpr {
        self.expr().count()
    }
}
