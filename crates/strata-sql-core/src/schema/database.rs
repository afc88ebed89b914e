//! Database container and relations.

use std::sync::Arc;

use crate::schema::{Column, RowSet, Table, View};

/// A foreign-key relation between two tables.
///
/// Each pair maps a column of the source table to a column of the referenced
/// table, in key order.
#[derive(Debug, Clone)]
pub struct Relation {
    name: String,
    pairs: Vec<(Column, Column)>,
}

impl Relation {
    /// Creates a named relation from (source, referenced) column pairs.
    #[must_use]
    pub fn new(name: impl Into<String>, pairs: Vec<(Column, Column)>) -> Self {
        Self {
            name: name.into(),
            pairs,
        }
    }

    /// Returns the constraint name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the (source, referenced) column pairs.
    #[must_use]
    pub fn pairs(&self) -> &[(Column, Column)] {
        &self.pairs
    }

    /// Returns the name of the table the relation is defined on.
    #[must_use]
    pub fn source_table(&self) -> &str {
        self.pairs
            .first()
            .map_or("", |(source, _)| source.rowset_name())
    }

    /// Returns the name of the referenced table.
    #[must_use]
    pub fn target_table(&self) -> &str {
        self.pairs
            .first()
            .map_or("", |(_, target)| target.rowset_name())
    }
}

/// A named collection of tables, views and relations.
///
/// The database is the registry that DDL script generation walks, and the
/// lookup a detached record uses to re-resolve its rowset by name.
#[derive(Debug, Default)]
pub struct Database {
    name: String,
    tables: Vec<Arc<Table>>,
    views: Vec<Arc<View>>,
    relations: Vec<Relation>,
}

impl Database {
    /// Creates an empty database.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: Vec::new(),
            views: Vec::new(),
            relations: Vec::new(),
        }
    }

    /// Returns the database name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers a table.
    pub fn add_table(&mut self, table: Arc<Table>) {
        self.tables.push(table);
    }

    /// Registers a view.
    pub fn add_view(&mut self, view: Arc<View>) {
        self.views.push(view);
    }

    /// Registers a foreign-key relation.
    pub fn add_relation(&mut self, relation: Relation) {
        self.relations.push(relation);
    }

    /// Returns the registered tables in registration order.
    #[must_use]
    pub fn tables(&self) -> &[Arc<Table>] {
        &self.tables
    }

    /// Returns the registered views.
    #[must_use]
    pub fn views(&self) -> &[Arc<View>] {
        &self.views
    }

    /// Returns the registered relations.
    #[must_use]
    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// Looks a table up by name.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&Arc<Table>> {
        self.tables.iter().find(|t| t.name() == name)
    }

    /// Looks a view up by name.
    #[must_use]
    pub fn view(&self, name: &str) -> Option<&Arc<View>> {
        self.views.iter().find(|v| v.name() == name)
    }

    /// Resolves a rowset by name, table or view.
    ///
    /// This is the re-association hook: a record that was detached from its
    /// rowset stores only the name and resolves it here.
    #[must_use]
    pub fn rowset(&self, name: &str) -> Option<Arc<dyn RowSet>> {
        if let Some(t) = self.table(name) {
            return Some(t.clone() as Arc<dyn RowSet>);
        }
        self.view(name).map(|v| v.clone() as Arc<dyn RowSet>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::table::{autoinc, text};
    use crate::schema::{ColumnSpec, DataType, Table};

    #[test]
    fn test_rowset_lookup() {
        let departments = Table::builder("departments")
            .column(autoinc("department_id"))
            .column(text("name", 80).required())
            .primary_key(&["department_id"])
            .build()
            .unwrap();
        let employees = Table::builder("employees")
            .column(autoinc("employee_id"))
            .column(ColumnSpec::new("department_id", DataType::Integer).required())
            .primary_key(&["employee_id"])
            .build()
            .unwrap();

        let mut db = Database::new("company");
        db.add_table(departments.clone());
        db.add_table(employees.clone());
        db.add_relation(Relation::new(
            "fk_employees_department",
            vec![(
                employees.column("department_id").unwrap().clone(),
                departments.column("department_id").unwrap().clone(),
            )],
        ));

        assert!(db.rowset("employees").is_some());
        assert!(db.rowset("missing").is_none());
        assert_eq!(db.relations()[0].source_table(), "employees");
        assert_eq!(db.relations()[0].target_table(), "departments");
    }
}
