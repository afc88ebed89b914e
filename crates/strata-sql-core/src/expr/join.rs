//! Join nodes.

use std::sync::Arc;

use crate::error::{BuildError, BuildResult};
use crate::expr::CompareExpr;
use crate::render::{RenderFlags, SqlBuilder};
use crate::schema::{Column, RowSet};

/// The supported join kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// Inner join.
    Inner,
    /// Left outer join.
    Left,
    /// Right outer join.
    Right,
}

impl JoinKind {
    /// Returns the SQL join phrase.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
        }
    }
}

/// A join of an additional rowset onto a statement.
#[derive(Clone)]
pub struct JoinExpr {
    kind: JoinKind,
    rowset: Arc<dyn RowSet>,
    on: CompareExpr,
}

impl JoinExpr {
    /// Creates a join.
    ///
    /// # Errors
    ///
    /// A join condition that references no column of the joined rowset is a
    /// structural error, reported here rather than at render time.
    pub fn new(kind: JoinKind, rowset: Arc<dyn RowSet>, on: CompareExpr) -> BuildResult<Self> {
        let mut referenced = Vec::new();
        on.collect_columns(&mut referenced);
        if !referenced.iter().any(|c| rowset.contains(c)) {
            return Err(BuildError::InvalidJoin {
                table: String::from(rowset.name()),
            });
        }
        Ok(Self { kind, rowset, on })
    }

    /// Returns the joined rowset.
    #[must_use]
    pub fn rowset(&self) -> &Arc<dyn RowSet> {
        &self.rowset
    }

    /// Returns the join condition.
    #[must_use]
    pub fn condition(&self) -> &CompareExpr {
        &self.on
    }

    /// Appends every column referenced by the join condition to `out`.
    pub fn collect_columns(&self, out: &mut Vec<Column>) {
        self.on.collect_columns(out);
    }

    /// Renders this join clause.
    ///
    /// # Errors
    ///
    /// Fails when the condition cannot be rendered for the dialect.
    pub fn render_into(&self, builder: &mut SqlBuilder<'_>, flags: RenderFlags) -> BuildResult<()> {
        builder.append(self.kind.as_str());
        builder.append_char(' ');
        builder.append_identifier(self.rowset.name());
        builder.append(" ON ");
        self.on
            .render_into(builder, flags.without(RenderFlags::ALIAS))
    }
}

impl std::fmt::Debug for JoinExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JoinExpr")
            .field("kind", &self.kind)
            .field("rowset", &self.rowset.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::ColumnExpr;
    use crate::schema::{autoinc, ColumnSpec, DataType, Table};

    #[test]
    fn test_join_must_reference_joined_table() {
        let employees = Table::builder("employees")
            .column(autoinc("employee_id"))
            .column(ColumnSpec::new("department_id", DataType::Integer))
            .primary_key(&["employee_id"])
            .build()
            .unwrap();
        let departments = Table::builder("departments")
            .column(autoinc("department_id"))
            .primary_key(&["department_id"])
            .build()
            .unwrap();

        let good = ColumnExpr::from(employees.column("department_id").unwrap())
            .eq_expr(departments.column("department_id").unwrap());
        assert!(JoinExpr::new(JoinKind::Inner, departments.clone(), good).is_ok());

        // References only the employees table.
        let bad = ColumnExpr::from(employees.column("department_id").unwrap()).eq(1_i64);
        let err = JoinExpr::new(JoinKind::Inner, departments, bad).unwrap_err();
        assert!(matches!(err, BuildError::InvalidJoin { table } if table == "departments"));
    }
}
