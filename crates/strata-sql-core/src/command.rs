//! Statement assembly.
//!
//! A [`Command`] accumulates expression nodes and renders them into a
//! complete SELECT, INSERT, UPDATE or DELETE [`Statement`] for a given
//! dialect. Commands are plain values: rendering borrows them immutably, so
//! the same command can be rendered repeatedly (and concurrently) with
//! identical results.

use std::sync::Arc;

use tracing::warn;

use crate::dialect::Dialect;
use crate::error::{BuildError, BuildResult};
use crate::expr::{ColumnExpr, CompareExpr, JoinExpr, JoinKind, OrderTerm, SetExpr};
use crate::render::{ParamMode, RenderFlags, SqlBuilder, Statement};
use crate::schema::{Column, RowSet};

/// Builder for a single SQL statement over one primary rowset.
#[derive(Clone)]
pub struct Command {
    rowset: Arc<dyn RowSet>,
    selects: Vec<ColumnExpr>,
    joins: Vec<JoinExpr>,
    where_clause: Option<CompareExpr>,
    having_clause: Option<CompareExpr>,
    group_by: Vec<ColumnExpr>,
    order_by: Vec<OrderTerm>,
    sets: Vec<SetExpr>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl Command {
    /// Creates a command over the given rowset.
    #[must_use]
    pub fn new(rowset: Arc<dyn RowSet>) -> Self {
        Self {
            rowset,
            selects: Vec::new(),
            joins: Vec::new(),
            where_clause: None,
            having_clause: None,
            group_by: Vec::new(),
            order_by: Vec::new(),
            sets: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Returns the primary rowset.
    #[must_use]
    pub fn rowset(&self) -> &Arc<dyn RowSet> {
        &self.rowset
    }

    /// Adds an expression to the select list.
    ///
    /// Selecting the same column twice is de-duplicated by column identity;
    /// the first-seen position wins.
    #[must_use]
    pub fn select(mut self, expr: impl Into<ColumnExpr>) -> Self {
        let expr = expr.into();
        if let ColumnExpr::Column(c) = &expr {
            let dup = self
                .selects
                .iter()
                .any(|e| matches!(e, ColumnExpr::Column(seen) if seen == c));
            if dup {
                return self;
            }
        }
        self.selects.push(expr);
        self
    }

    /// Adds every given column to the select list.
    #[must_use]
    pub fn select_columns(mut self, columns: &[Column]) -> Self {
        for column in columns {
            self = self.select(column);
        }
        self
    }

    /// Joins another rowset.
    ///
    /// # Errors
    ///
    /// Fails when the condition references no column of the joined rowset.
    pub fn join(
        mut self,
        kind: JoinKind,
        rowset: Arc<dyn RowSet>,
        on: CompareExpr,
    ) -> BuildResult<Self> {
        self.joins.push(JoinExpr::new(kind, rowset, on)?);
        Ok(self)
    }

    /// Adds a condition to the WHERE clause.
    ///
    /// Repeated calls compose conjunctively: each new condition is AND-ed
    /// onto what is already there.
    #[must_use]
    pub fn where_and(mut self, condition: CompareExpr) -> Self {
        self.where_clause = Some(match self.where_clause.take() {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }

    /// Adds a condition to the HAVING clause, composing conjunctively.
    #[must_use]
    pub fn having(mut self, condition: CompareExpr) -> Self {
        self.having_clause = Some(match self.having_clause.take() {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }

    /// Adds a GROUP BY expression.
    #[must_use]
    pub fn group_by(mut self, expr: impl Into<ColumnExpr>) -> Self {
        self.group_by.push(expr.into());
        self
    }

    /// Groups by every selected expression that is not an aggregate.
    ///
    /// Aggregates report themselves non-groupable, which is what makes this
    /// safe without any query analysis.
    #[must_use]
    pub fn group_by_all(mut self) -> Self {
        let groupable: Vec<ColumnExpr> = self
            .selects
            .iter()
            .filter(|e| !e.is_aggregate())
            .cloned()
            .collect();
        self.group_by.extend(groupable);
        self
    }

    /// Adds an ORDER BY term.
    #[must_use]
    pub fn order_by(mut self, term: impl Into<OrderTerm>) -> Self {
        self.order_by.push(term.into());
        self
    }

    /// Adds or replaces a set assignment.
    ///
    /// A later assignment to the same column replaces the earlier one, so a
    /// command never emits the same column twice in a SET or VALUES clause.
    #[must_use]
    pub fn set(mut self, assignment: SetExpr) -> Self {
        match self
            .sets
            .iter_mut()
            .find(|s| s.column() == assignment.column())
        {
            Some(existing) => *existing = assignment,
            None => self.sets.push(assignment),
        }
        self
    }

    /// Limits the number of returned rows.
    #[must_use]
    pub const fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Skips the first `n` rows.
    #[must_use]
    pub const fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    /// Returns the accumulated select expressions.
    #[must_use]
    pub fn selects(&self) -> &[ColumnExpr] {
        &self.selects
    }

    /// Returns the accumulated set assignments.
    #[must_use]
    pub fn sets(&self) -> &[SetExpr] {
        &self.sets
    }

    /// Builds a SELECT statement.
    ///
    /// # Errors
    ///
    /// Fails when any expression cannot be rendered for the dialect.
    pub fn select_statement(
        &self,
        dialect: &dyn Dialect,
        mode: ParamMode,
    ) -> BuildResult<Statement> {
        let mut b = SqlBuilder::with_mode(dialect, mode);
        b.append("SELECT ");
        if self.selects.is_empty() {
            b.append_char('*');
        }
        for (i, expr) in self.selects.iter().enumerate() {
            if i > 0 {
                b.append(", ");
            }
            expr.render_into(&mut b, RenderFlags::ALL)?;
        }
        b.append(" FROM ");
        b.append_identifier(self.rowset.name());
        for join in &self.joins {
            b.append_char(' ');
            join.render_into(&mut b, RenderFlags::DEFAULT)?;
        }
        if let Some(cond) = &self.where_clause {
            b.append(" WHERE ");
            cond.render_into(&mut b, RenderFlags::DEFAULT)?;
        }
        if !self.group_by.is_empty() {
            b.append(" GROUP BY ");
            for (i, expr) in self.group_by.iter().enumerate() {
                if i > 0 {
                    b.append(", ");
                }
                expr.render_into(&mut b, RenderFlags::DEFAULT)?;
            }
        }
        if let Some(cond) = &self.having_clause {
            b.append(" HAVING ");
            cond.render_into(&mut b, RenderFlags::DEFAULT)?;
        }
        if !self.order_by.is_empty() {
            b.append(" ORDER BY ");
            for (i, term) in self.order_by.iter().enumerate() {
                if i > 0 {
                    b.append(", ");
                }
                term.render_into(&mut b, RenderFlags::DEFAULT)?;
            }
        }
        if self.limit.is_some() || self.offset.is_some() {
            if dialect.supports_limit_offset() {
                dialect.append_limit(&mut b, self.limit, self.offset);
            } else {
                // Degraded capability: the full result is returned and the
                // caller's row limit applies instead.
                warn!(
                    dialect = dialect.name(),
                    "dialect does not support LIMIT/OFFSET, clause skipped"
                );
            }
        }
        Ok(b.finish())
    }

    /// Builds an INSERT statement from the set assignments.
    ///
    /// Only explicitly assigned columns appear in the column and values
    /// lists; everything else is left to the database defaults.
    ///
    /// # Errors
    ///
    /// Fails on a read-only rowset or when no assignment was made.
    pub fn insert_statement(
        &self,
        dialect: &dyn Dialect,
        mode: ParamMode,
    ) -> BuildResult<Statement> {
        self.check_updateable()?;
        self.check_assignments()?;
        let mut b = SqlBuilder::with_mode(dialect, mode);
        b.append("INSERT INTO ");
        b.append_identifier(self.rowset.name());
        b.append(" (");
        for (i, set) in self.sets.iter().enumerate() {
            if i > 0 {
                b.append(", ");
            }
            set.render_into(&mut b, RenderFlags::NAME)?;
        }
        b.append(") VALUES (");
        for (i, set) in self.sets.iter().enumerate() {
            if i > 0 {
                b.append(", ");
            }
            set.render_into(&mut b, RenderFlags::VALUE)?;
        }
        b.append_char(')');
        Ok(b.finish())
    }

    /// Builds an UPDATE statement from the set assignments and WHERE clause.
    ///
    /// # Errors
    ///
    /// Fails on a read-only rowset or when no assignment was made.
    pub fn update_statement(
        &self,
        dialect: &dyn Dialect,
        mode: ParamMode,
    ) -> BuildResult<Statement> {
        self.check_updateable()?;
        self.check_assignments()?;
        let mut b = SqlBuilder::with_mode(dialect, mode);
        b.append("UPDATE ");
        b.append_identifier(self.rowset.name());
        b.append(" SET ");
        for (i, set) in self.sets.iter().enumerate() {
            if i > 0 {
                b.append(", ");
            }
            set.render_into(&mut b, RenderFlags::NAME.with(RenderFlags::VALUE))?;
        }
        if let Some(cond) = &self.where_clause {
            b.append(" WHERE ");
            cond.render_into(&mut b, RenderFlags::NAME.with(RenderFlags::VALUE))?;
        }
        Ok(b.finish())
    }

    /// Builds a DELETE statement.
    ///
    /// # Errors
    ///
    /// Fails on a read-only rowset.
    pub fn delete_statement(
        &self,
        dialect: &dyn Dialect,
        mode: ParamMode,
    ) -> BuildResult<Statement> {
        self.check_updateable()?;
        let mut b = SqlBuilder::with_mode(dialect, mode);
        b.append("DELETE FROM ");
        b.append_identifier(self.rowset.name());
        if let Some(cond) = &self.where_clause {
            b.append(" WHERE ");
            cond.render_into(&mut b, RenderFlags::NAME.with(RenderFlags::VALUE))?;
        }
        Ok(b.finish())
    }

    fn check_updateable(&self) -> BuildResult<()> {
        if self.rowset.updateable() {
            Ok(())
        } else {
            Err(BuildError::RowSetReadOnly(String::from(self.rowset.name())))
        }
    }

    fn check_assignments(&self) -> BuildResult<()> {
        if self.sets.is_empty() {
            Err(BuildError::NoAssignments)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::AnsiDialect;
    use crate::schema::{autoinc, text, ColumnSpec, DataType, Table, View};
    use crate::value::Value;

    fn employees() -> Arc<Table> {
        Table::builder("employees")
            .column(autoinc("employee_id"))
            .column(text("firstname", 40).required())
            .column(text("lastname", 40).required())
            .column(ColumnSpec::new("department_id", DataType::Integer).required())
            .column(ColumnSpec::new(
                "salary",
                DataType::Decimal {
                    precision: 10,
                    scale: 2,
                },
            ))
            .primary_key(&["employee_id"])
            .build()
            .unwrap()
    }

    #[test]
    fn test_select_with_where_and_order() {
        let t = employees();
        let cmd = Command::new(t.clone())
            .select(t.column("employee_id").unwrap())
            .select(t.column("lastname").unwrap())
            .where_and(t.column("department_id").unwrap().eq(4_i64))
            .order_by(t.column("lastname").unwrap());

        let stmt = cmd
            .select_statement(&AnsiDialect::new(), ParamMode::Prepared)
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "SELECT employees.employee_id, employees.lastname FROM employees \
             WHERE employees.department_id = ? ORDER BY employees.lastname"
        );
        assert_eq!(stmt.params(), &[Value::Int(4)]);
    }

    #[test]
    fn test_duplicate_select_is_deduplicated() {
        let t = employees();
        let lastname = t.column("lastname").unwrap().clone();
        let cmd = Command::new(t.clone())
            .select(&lastname)
            .select(t.column("firstname").unwrap())
            .select(&lastname);

        let stmt = cmd
            .select_statement(&AnsiDialect::new(), ParamMode::Prepared)
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "SELECT employees.lastname, employees.firstname FROM employees"
        );
    }

    #[test]
    fn test_where_composes_conjunctively() {
        let t = employees();
        let cmd = Command::new(t.clone())
            .select(t.column("employee_id").unwrap())
            .where_and(t.column("department_id").unwrap().eq(4_i64))
            .where_and(t.column("salary").unwrap().gt(1000_i64));

        let stmt = cmd
            .select_statement(&AnsiDialect::new(), ParamMode::Prepared)
            .unwrap();
        assert!(stmt.sql().contains(
            "WHERE employees.department_id = ? AND employees.salary > ?"
        ));
        assert_eq!(stmt.params().len(), 2);
    }

    #[test]
    fn test_partial_update_contains_only_set_columns() {
        let t = employees();
        let cmd = Command::new(t.clone())
            .set(t.column("salary").unwrap().to(2500_i64))
            .where_and(t.column("employee_id").unwrap().eq(7_i64));

        let stmt = cmd
            .update_statement(&AnsiDialect::new(), ParamMode::Prepared)
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "UPDATE employees SET salary = ? WHERE employee_id = ?"
        );
        assert_eq!(stmt.params(), &[Value::Int(2500), Value::Int(7)]);
    }

    #[test]
    fn test_set_replaces_earlier_assignment() {
        let t = employees();
        let cmd = Command::new(t.clone())
            .set(t.column("salary").unwrap().to(100_i64))
            .set(t.column("salary").unwrap().to(200_i64));

        let stmt = cmd
            .update_statement(&AnsiDialect::new(), ParamMode::Prepared)
            .unwrap();
        assert_eq!(stmt.sql(), "UPDATE employees SET salary = ?");
        assert_eq!(stmt.params(), &[Value::Int(200)]);
    }

    #[test]
    fn test_insert_lists_only_assigned_columns() {
        let t = employees();
        let cmd = Command::new(t.clone())
            .set(t.column("firstname").unwrap().to("Jane"))
            .set(t.column("lastname").unwrap().to("Doe"));

        let stmt = cmd
            .insert_statement(&AnsiDialect::new(), ParamMode::Prepared)
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "INSERT INTO employees (firstname, lastname) VALUES (?, ?)"
        );
        assert_eq!(
            stmt.params(),
            &[
                Value::Text(String::from("Jane")),
                Value::Text(String::from("Doe"))
            ]
        );
    }

    #[test]
    fn test_writes_rejected_on_read_only_view() {
        let v = View::builder("employee_info")
            .column(ColumnSpec::new("employee_id", DataType::Integer))
            .query("SELECT employee_id FROM employees")
            .build()
            .unwrap();
        let id = v.column("employee_id").unwrap().clone();

        let err = Command::new(v)
            .set(id.to(1_i64))
            .insert_statement(&AnsiDialect::new(), ParamMode::Prepared)
            .unwrap_err();
        assert!(matches!(err, BuildError::RowSetReadOnly(name) if name == "employee_info"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let t = employees();
        let cmd = Command::new(t.clone())
            .select(t.column("lastname").unwrap())
            .where_and(t.column("salary").unwrap().between(1000_i64, 2000_i64))
            .order_by(t.column("lastname").unwrap().desc());

        let a = cmd
            .select_statement(&AnsiDialect::new(), ParamMode::Prepared)
            .unwrap();
        let b = cmd
            .select_statement(&AnsiDialect::new(), ParamMode::Prepared)
            .unwrap();
        assert_eq!(a.sql(), b.sql());
        assert_eq!(a.params(), b.params());
    }

    #[test]
    fn test_group_by_all_skips_aggregates() {
        let t = employees();
        let dep = t.column("department_id").unwrap().clone();
        let cmd = Command::new(t.clone())
            .select(&dep)
            .select(t.column("salary").unwrap().sum().alias("total"))
            .group_by_all();

        let stmt = cmd
            .select_statement(&AnsiDialect::new(), ParamMode::Prepared)
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "SELECT employees.department_id, sum(employees.salary) AS total \
             FROM employees GROUP BY employees.department_id"
        );
    }

    #[test]
    fn test_join_and_limit() {
        let t = employees();
        let departments = Table::builder("departments")
            .column(autoinc("department_id"))
            .column(text("name", 80).required())
            .primary_key(&["department_id"])
            .build()
            .unwrap();

        let on = t
            .column("department_id")
            .unwrap()
            .eq_expr(departments.column("department_id").unwrap());
        let cmd = Command::new(t.clone())
            .select(t.column("lastname").unwrap())
            .select(departments.column("name").unwrap())
            .join(JoinKind::Left, departments.clone(), on)
            .unwrap()
            .limit(10)
            .offset(20);

        let stmt = cmd
            .select_statement(&AnsiDialect::new(), ParamMode::Prepared)
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "SELECT employees.lastname, departments.name FROM employees \
             LEFT JOIN departments ON employees.department_id = departments.department_id \
             LIMIT 10 OFFSET 20"
        );
    }
}
