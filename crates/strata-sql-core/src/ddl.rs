//! DDL generation.
//!
//! DDL statements render through the same [`SqlBuilder`] path as DML, with
//! literals inlined (DDL cannot be parameterized). The generator walks a
//! [`Database`] and emits an ordered script: tables first, then indexes,
//! then foreign keys, so every object exists before something references it.

use tracing::{debug, warn};

use crate::dialect::Dialect;
use crate::error::BuildResult;
use crate::render::{ParamMode, SqlBuilder, Statement};
use crate::schema::{Database, Relation, RowSet, Table, TableIndex, View};

/// An ordered list of statements, executed front to back.
#[derive(Debug, Default, Clone)]
pub struct SqlScript {
    statements: Vec<Statement>,
}

impl SqlScript {
    /// Creates an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a statement.
    pub fn add(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    /// Returns the statements in execution order.
    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Returns the number of statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Returns whether the script is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl<'a> IntoIterator for &'a SqlScript {
    type Item = &'a Statement;
    type IntoIter = std::slice::Iter<'a, Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.iter()
    }
}

/// Generates DDL for one dialect.
pub struct DdlGenerator<'a> {
    dialect: &'a dyn Dialect,
}

impl<'a> DdlGenerator<'a> {
    /// Creates a generator for the given dialect.
    #[must_use]
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self { dialect }
    }

    fn builder(&self) -> SqlBuilder<'a> {
        SqlBuilder::with_mode(self.dialect, ParamMode::Inline)
    }

    /// Generates CREATE TABLE for a single table.
    ///
    /// # Errors
    ///
    /// Fails when a column type has no mapping in this dialect.
    pub fn create_table(&self, table: &Table) -> BuildResult<Statement> {
        let mut b = self.builder();
        self.dialect.ddl_create_table(table, &mut b)?;
        Ok(b.finish())
    }

    /// Generates CREATE INDEX for a single index.
    #[must_use]
    pub fn create_index(&self, table: &Table, index: &TableIndex) -> Statement {
        let mut b = self.builder();
        self.dialect.ddl_create_index(table, index, &mut b);
        b.finish()
    }

    /// Generates ALTER TABLE ... ADD CONSTRAINT for a foreign key.
    ///
    /// Returns `None` when the dialect cannot add constraints after table
    /// creation; the degradation is logged and the script simply omits the
    /// statement.
    #[must_use]
    pub fn add_relation(&self, relation: &Relation) -> Option<Statement> {
        if !self.dialect.supports_add_constraint() {
            warn!(
                dialect = self.dialect.name(),
                relation = relation.name(),
                "dialect cannot add constraints after table creation, skipped"
            );
            return None;
        }
        let mut b = self.builder();
        self.dialect.ddl_add_relation(relation, &mut b);
        Some(b.finish())
    }

    /// Generates CREATE VIEW.
    ///
    /// Returns `None` when the dialect does not support views.
    #[must_use]
    pub fn create_view(&self, view: &View) -> Option<Statement> {
        if !self.dialect.supports_create_view() {
            warn!(
                dialect = self.dialect.name(),
                view = view.name(),
                "dialect does not support views, skipped"
            );
            return None;
        }
        let mut b = self.builder();
        self.dialect.ddl_create_view(view, &mut b);
        Some(b.finish())
    }

    /// Generates DROP TABLE.
    #[must_use]
    pub fn drop_table(&self, table: &Table) -> Statement {
        let mut b = self.builder();
        self.dialect.ddl_drop("TABLE", table.name(), &mut b);
        b.finish()
    }

    /// Generates DROP VIEW.
    #[must_use]
    pub fn drop_view(&self, view: &View) -> Statement {
        let mut b = self.builder();
        self.dialect.ddl_drop("VIEW", view.name(), &mut b);
        b.finish()
    }

    /// Generates the complete creation script for a database.
    ///
    /// Statement order satisfies dependencies: all tables, then all indexes,
    /// then all foreign keys, then views.
    ///
    /// # Errors
    ///
    /// Fails when any column type has no mapping in this dialect; the
    /// failure happens here, not when the script is executed.
    pub fn create_database_script(&self, database: &Database) -> BuildResult<SqlScript> {
        let mut script = SqlScript::new();
        for table in database.tables() {
            script.add(self.create_table(table)?);
        }
        for table in database.tables() {
            for index in table.indexes() {
                script.add(self.create_index(table, index));
            }
        }
        for relation in database.relations() {
            if let Some(stmt) = self.add_relation(relation) {
                script.add(stmt);
            }
        }
        for view in database.views() {
            if let Some(stmt) = self.create_view(view) {
                script.add(stmt);
            }
        }
        debug!(
            database = database.name(),
            dialect = self.dialect.name(),
            statements = script.len(),
            "generated creation script"
        );
        Ok(script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{MySqlDialect, PostgresDialect, SqliteDialect};
    use crate::schema::{autoinc, text, ColumnSpec, DataType, Table};

    fn company() -> Database {
        let departments = Table::builder("departments")
            .column(autoinc("department_id"))
            .column(text("name", 80).required())
            .primary_key(&["department_id"])
            .build()
            .unwrap();
        let employees = Table::builder("employees")
            .column(autoinc("employee_id"))
            .column(text("lastname", 40).required())
            .column(ColumnSpec::new("department_id", DataType::Integer).required())
            .primary_key(&["employee_id"])
            .index("ix_employees_lastname", &["lastname"], false)
            .build()
            .unwrap();

        let mut db = Database::new("company");
        db.add_relation(crate::schema::Relation::new(
            "fk_employees_department",
            vec![(
                employees.column("department_id").unwrap().clone(),
                departments.column("department_id").unwrap().clone(),
            )],
        ));
        db.add_table(departments);
        db.add_table(employees);
        db
    }

    #[test]
    fn test_script_order_tables_indexes_relations() {
        let db = company();
        let dialect = PostgresDialect::new();
        let script = DdlGenerator::new(&dialect)
            .create_database_script(&db)
            .unwrap();

        let sql: Vec<&str> = script.statements().iter().map(Statement::sql).collect();
        assert_eq!(sql.len(), 4);
        assert!(sql[0].starts_with("CREATE TABLE departments"));
        assert!(sql[1].starts_with("CREATE TABLE employees"));
        assert!(sql[2].starts_with("CREATE INDEX ix_employees_lastname"));
        assert!(sql[3].starts_with("ALTER TABLE employees ADD CONSTRAINT fk_employees_department"));
    }

    #[test]
    fn test_postgres_serial_key() {
        let db = company();
        let dialect = PostgresDialect::new();
        let stmt = DdlGenerator::new(&dialect)
            .create_table(db.table("departments").unwrap())
            .unwrap();
        assert!(stmt.sql().contains("department_id BIGSERIAL NOT NULL"));
        assert!(stmt.sql().contains("PRIMARY KEY (department_id)"));
    }

    #[test]
    fn test_mysql_auto_increment_key() {
        let db = company();
        let dialect = MySqlDialect::new();
        let stmt = DdlGenerator::new(&dialect)
            .create_table(db.table("departments").unwrap())
            .unwrap();
        assert!(stmt
            .sql()
            .contains("department_id BIGINT NOT NULL AUTO_INCREMENT"));
    }

    #[test]
    fn test_create_view_and_drop() {
        let dialect = PostgresDialect::new();
        let generator = DdlGenerator::new(&dialect);

        let view = crate::schema::View::builder("employee_names")
            .column(ColumnSpec::new("employee_id", DataType::Integer))
            .column(ColumnSpec::new("lastname", DataType::Text { size: 40 }))
            .query("SELECT employee_id, lastname FROM employees")
            .build()
            .unwrap();

        let stmt = generator.create_view(&view).unwrap();
        assert_eq!(
            stmt.sql(),
            "CREATE VIEW employee_names (employee_id, lastname)\nAS\n\
             SELECT employee_id, lastname FROM employees"
        );
        assert_eq!(generator.drop_view(&view).sql(), "DROP VIEW employee_names");

        let db = company();
        assert_eq!(
            generator.drop_table(db.table("employees").unwrap()).sql(),
            "DROP TABLE employees"
        );
    }

    #[test]
    fn test_sqlite_relation_degrades_to_noop() {
        let db = company();
        let dialect = SqliteDialect::new();
        let script = DdlGenerator::new(&dialect)
            .create_database_script(&db)
            .unwrap();

        // Two tables and one index; the ALTER-based foreign key is skipped.
        assert_eq!(script.len(), 3);
        assert!(!script
            .statements()
            .iter()
            .any(|s| s.sql().contains("ADD CONSTRAINT")));
    }
}
