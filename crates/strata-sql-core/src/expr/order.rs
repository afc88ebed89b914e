//! Order-by terms.

use crate::error::BuildResult;
use crate::expr::ColumnExpr;
use crate::render::{RenderFlags, SqlBuilder};
use crate::schema::Column;

/// A single ORDER BY term: expression plus direction.
#[derive(Debug, Clone)]
pub struct OrderTerm {
    expr: ColumnExpr,
    descending: bool,
}

impl OrderTerm {
    /// Ascending order over an expression.
    #[must_use]
    pub fn asc(expr: impl Into<ColumnExpr>) -> Self {
        Self {
            expr: expr.into(),
            descending: false,
        }
    }

    /// Descending order over an expression.
    #[must_use]
    pub fn desc(expr: impl Into<ColumnExpr>) -> Self {
        Self {
            expr: expr.into(),
            descending: true,
        }
    }

    /// Returns the ordered expression.
    #[must_use]
    pub fn expr(&self) -> &ColumnExpr {
        &self.expr
    }

    /// Renders this term.
    ///
    /// # Errors
    ///
    /// Fails when the expression cannot be rendered for the dialect.
    pub fn render_into(&self, builder: &mut SqlBuilder<'_>, flags: RenderFlags) -> BuildResult<()> {
        self.expr
            .render_into(builder, flags.without(RenderFlags::ALIAS))?;
        if self.descending {
            builder.append(" DESC");
        }
        Ok(())
    }
}

impl Column {
    /// Ascending order term over this column.
    #[must_use]
    pub fn asc(&self) -> OrderTerm {
        OrderTerm::asc(self)
    }

    /// Descending order term over this column.
    #[must_use]
    pub fn desc(&self) -> OrderTerm {
        OrderTerm::desc(self)
    }
}

impl From<Column> for OrderTerm {
    fn from(column: Column) -> Self {
        Self::asc(column)
    }
}

impl From<&Column> for OrderTerm {
    fn from(column: &Column) -> Self {
        Self::asc(column)
    }
}
