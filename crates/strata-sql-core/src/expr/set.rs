//! Set-assignment nodes for UPDATE and INSERT.

use crate::error::BuildResult;
use crate::expr::ColumnExpr;
use crate::render::{RenderFlags, SqlBuilder};
use crate::schema::Column;

/// An assignment of a value to a column.
///
/// The render context decides the shape: NAME alone yields the column name
/// (INSERT column list), VALUE alone the value (INSERT values list), both
/// yield `name = value` (UPDATE set clause).
#[derive(Debug, Clone)]
pub struct SetExpr {
    column: Column,
    value: ColumnExpr,
}

impl SetExpr {
    /// Creates an assignment.
    #[must_use]
    pub fn new(column: Column, value: ColumnExpr) -> Self {
        Self { column, value }
    }

    /// Returns the assigned column.
    #[must_use]
    pub fn column(&self) -> &Column {
        &self.column
    }

    /// Returns the assigned value expression.
    #[must_use]
    pub fn value(&self) -> &ColumnExpr {
        &self.value
    }

    /// Renders this assignment.
    ///
    /// # Errors
    ///
    /// Fails when the value expression cannot be rendered for the dialect.
    pub fn render_into(&self, builder: &mut SqlBuilder<'_>, flags: RenderFlags) -> BuildResult<()> {
        let name = flags.contains(RenderFlags::NAME) || flags.contains(RenderFlags::FULL_NAME);
        let value = flags.contains(RenderFlags::VALUE);
        if name {
            // Set targets are always unqualified; UPDATE t SET t.c is not
            // portable SQL.
            builder.append_identifier(self.column.name());
        }
        if name && value {
            builder.append(" = ");
        }
        if value {
            self.value
                .render_into(builder, RenderFlags::VALUE.with(RenderFlags::FULL_NAME))?;
        }
        Ok(())
    }
}

impl Column {
    /// Creates an assignment of a plain value to this column.
    #[must_use]
    pub fn to(&self, value: impl crate::value::ToValue) -> SetExpr {
        SetExpr::new(
            self.clone(),
            ColumnExpr::typed_value(value, *self.data_type()),
        )
    }

    /// Creates an assignment of an arbitrary expression to this column.
    #[must_use]
    pub fn to_expr(&self, value: impl Into<ColumnExpr>) -> SetExpr {
        SetExpr::new(self.clone(), value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::AnsiDialect;
    use crate::render::{ParamMode, SqlBuilder};
    use crate::schema::{text, RowSet, Table};

    #[test]
    fn test_render_shapes() {
        let t = Table::builder("employees")
            .column(text("lastname", 40))
            .build()
            .unwrap();
        let set = t.column("lastname").unwrap().to("Doe");
        let dialect = AnsiDialect::new();

        let mut b = SqlBuilder::with_mode(&dialect, ParamMode::Inline);
        set.render_into(&mut b, RenderFlags::NAME).unwrap();
        assert_eq!(b.finish().sql(), "lastname");

        let mut b = SqlBuilder::with_mode(&dialect, ParamMode::Inline);
        set.render_into(&mut b, RenderFlags::VALUE).unwrap();
        assert_eq!(b.finish().sql(), "'Doe'");

        let mut b = SqlBuilder::with_mode(&dialect, ParamMode::Inline);
        set.render_into(&mut b, RenderFlags::NAME.with(RenderFlags::VALUE))
            .unwrap();
        assert_eq!(b.finish().sql(), "lastname = 'Doe'");
    }
}
