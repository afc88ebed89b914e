//! Record lifecycle and rollback reconciliation against a scripted
//! connection.

use std::collections::VecDeque;
use std::sync::Arc;

use strata_record::{Connection, Context, DbError, Record, RecordState, Result, RowCursor};
use strata_sql_core::dialect::AnsiDialect;
use strata_sql_core::schema::{autoinc, text, ColumnSpec, DataType, RowSet, Table};
use strata_sql_core::{Statement, Value};

/// A connection that replays scripted results and records every statement.
#[derive(Default)]
struct MockConnection {
    executed: Vec<Statement>,
    execute_results: VecDeque<std::result::Result<u64, String>>,
    query_rows: VecDeque<Vec<Vec<Value>>>,
    last_id: i64,
    rollbacks: usize,
}

impl MockConnection {
    fn expect_execute(&mut self, affected: u64) {
        self.execute_results.push_back(Ok(affected));
    }

    fn fail_next_execute(&mut self) {
        self.execute_results
            .push_back(Err(String::from("forced failure")));
    }

    fn expect_rows(&mut self, rows: Vec<Vec<Value>>) {
        self.query_rows.push_back(rows);
    }
}

struct MockCursor {
    rows: VecDeque<Vec<Value>>,
}

impl RowCursor for MockCursor {
    fn next_row(&mut self) -> Result<Option<Vec<Value>>> {
        Ok(self.rows.pop_front())
    }
}

impl Connection for MockConnection {
    fn execute(&mut self, statement: &Statement) -> Result<u64> {
        self.executed.push(statement.clone());
        match self.execute_results.pop_front() {
            Some(Ok(affected)) => Ok(affected),
            Some(Err(message)) => Err(DbError::Execution {
                sql: String::from(statement.sql()),
                message,
            }),
            None => Ok(1),
        }
    }

    fn query(&mut self, _statement: &Statement) -> Result<Box<dyn RowCursor + '_>> {
        let rows = self.query_rows.pop_front().unwrap_or_default();
        Ok(Box::new(MockCursor { rows: rows.into() }))
    }

    fn last_insert_id(&mut self) -> Result<i64> {
        Ok(self.last_id)
    }

    fn begin(&mut self) -> Result<()> {
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.rollbacks += 1;
        Ok(())
    }
}

fn employees() -> Arc<Table> {
    Table::builder("employees")
        .column(autoinc("employee_id"))
        .column(text("firstname", 40).required())
        .column(text("lastname", 40).required())
        .column(ColumnSpec::new("retired", DataType::Bool).default_value(Value::Bool(false)))
        .primary_key(&["employee_id"])
        .build()
        .unwrap()
}

fn loaded_row() -> Vec<Vec<Value>> {
    vec![vec![
        Value::Int(7),
        Value::Text(String::from("Jane")),
        Value::Text(String::from("Doe")),
        Value::Int(0),
    ]]
}

#[test]
fn insert_uses_only_explicit_values_and_reads_back_the_key() {
    let t = employees();
    let mut conn = MockConnection::default();
    conn.last_id = 42;
    let mut ctx = Context::new(conn, AnsiDialect::new());

    let mut rec = Record::new(t.clone());
    rec.create().unwrap();
    rec.set(t.column("firstname").unwrap(), "Jane").unwrap();
    rec.set(t.column("lastname").unwrap(), "Doe").unwrap();
    rec.update(&mut ctx).unwrap();

    assert_eq!(rec.state(), RecordState::Valid);
    assert_eq!(
        rec.get(t.column("employee_id").unwrap()).unwrap(),
        Value::Int(42)
    );

    let conn = ctx.release();
    assert_eq!(conn.executed.len(), 1);
    // The untouched "retired" column keeps its database default.
    assert_eq!(
        conn.executed[0].sql(),
        "INSERT INTO employees (firstname, lastname) VALUES (?, ?)"
    );
    assert_eq!(
        conn.executed[0].params(),
        &[
            Value::Text(String::from("Jane")),
            Value::Text(String::from("Doe"))
        ]
    );
}

#[test]
fn update_emits_exactly_the_changed_columns() {
    let t = employees();
    let mut conn = MockConnection::default();
    conn.expect_rows(loaded_row());
    conn.expect_execute(1);
    let mut ctx = Context::new(conn, AnsiDialect::new());

    let mut rec = Record::new(t.clone());
    rec.read(&mut ctx, &[Value::Int(7)]).unwrap();
    rec.set(t.column("lastname").unwrap(), "Smith").unwrap();
    rec.update(&mut ctx).unwrap();

    let conn = ctx.release();
    assert_eq!(
        conn.executed[0].sql(),
        "UPDATE employees SET lastname = ? WHERE employee_id = ?"
    );
    assert_eq!(
        conn.executed[0].params(),
        &[Value::Text(String::from("Smith")), Value::Int(7)]
    );
}

#[test]
fn setting_the_current_value_does_not_dirty_the_record() {
    let t = employees();
    let mut conn = MockConnection::default();
    conn.expect_rows(loaded_row());
    let mut ctx = Context::new(conn, AnsiDialect::new());

    let mut rec = Record::new(t.clone());
    rec.read(&mut ctx, &[Value::Int(7)]).unwrap();
    rec.set(t.column("lastname").unwrap(), "Doe").unwrap();

    assert_eq!(rec.state(), RecordState::Valid);
    assert!(!rec.was_modified(t.column("lastname").unwrap()).unwrap());

    // A record that is not modified sends nothing.
    rec.update(&mut ctx).unwrap();
    assert!(ctx.release().executed.is_empty());
}

#[test]
fn rollback_restores_a_loaded_record_after_a_successful_update() {
    let t = employees();
    let mut conn = MockConnection::default();
    conn.expect_rows(loaded_row());
    conn.expect_execute(1);
    let mut ctx = Context::new(conn, AnsiDialect::new());

    let mut rec = Record::new(t.clone());
    rec.read(&mut ctx, &[Value::Int(7)]).unwrap();
    rec.set(t.column("firstname").unwrap(), "Janet").unwrap();
    rec.set(t.column("lastname").unwrap(), "Smith").unwrap();
    rec.update(&mut ctx).unwrap();
    assert_eq!(rec.state(), RecordState::Valid);

    ctx.rollback().unwrap();

    // Restored to the pre-mutation snapshot: loaded values, clean state.
    assert_eq!(rec.state(), RecordState::Valid);
    assert_eq!(
        rec.get(t.column("firstname").unwrap()).unwrap(),
        Value::Text(String::from("Jane"))
    );
    assert_eq!(
        rec.get(t.column("lastname").unwrap()).unwrap(),
        Value::Text(String::from("Doe"))
    );
    assert!(!rec.was_modified(t.column("firstname").unwrap()).unwrap());
}

#[test]
fn rollback_after_a_failed_insert_restores_the_pre_creation_state() {
    let t = employees();
    let mut conn = MockConnection::default();
    conn.fail_next_execute();
    let mut ctx = Context::new(conn, AnsiDialect::new());

    let mut rec = Record::new(t.clone());
    rec.create().unwrap();
    rec.set(t.column("firstname").unwrap(), "Jane").unwrap();
    rec.set(t.column("lastname").unwrap(), "Doe").unwrap();

    let err = rec.update(&mut ctx).unwrap_err();
    assert!(matches!(err, DbError::Execution { .. }));

    ctx.rollback().unwrap();
    assert_eq!(rec.state(), RecordState::Nonexistent);
}

#[test]
fn commit_discards_checkpoints() {
    let t = employees();
    let mut conn = MockConnection::default();
    conn.expect_rows(loaded_row());
    conn.expect_execute(1);
    let mut ctx = Context::new(conn, AnsiDialect::new());

    let mut rec = Record::new(t.clone());
    rec.read(&mut ctx, &[Value::Int(7)]).unwrap();
    rec.set(t.column("lastname").unwrap(), "Smith").unwrap();
    rec.update(&mut ctx).unwrap();
    assert_eq!(ctx.rollback_manager().len(), 1);

    ctx.commit().unwrap();
    assert!(ctx.rollback_manager().is_empty());
    assert_eq!(
        rec.get(t.column("lastname").unwrap()).unwrap(),
        Value::Text(String::from("Smith"))
    );
}

#[test]
fn stale_update_surfaces_as_a_concurrency_conflict() {
    let t = employees();
    let mut conn = MockConnection::default();
    conn.expect_rows(loaded_row());
    conn.expect_execute(0);
    let mut ctx = Context::new(conn, AnsiDialect::new());

    let mut rec = Record::new(t.clone());
    rec.read(&mut ctx, &[Value::Int(7)]).unwrap();
    rec.set(t.column("lastname").unwrap(), "Smith").unwrap();

    let err = rec.update(&mut ctx).unwrap_err();
    assert!(matches!(err, DbError::ConcurrencyConflict { rowset } if rowset == "employees"));
    assert_eq!(rec.state(), RecordState::Modified);
}

#[test]
fn read_not_found_leaves_the_record_untouched() {
    let t = employees();
    let mut conn = MockConnection::default();
    conn.expect_rows(vec![]);
    let mut ctx = Context::new(conn, AnsiDialect::new());

    let mut rec = Record::new(t.clone());
    let err = rec.read(&mut ctx, &[Value::Int(99)]).unwrap_err();
    assert!(matches!(err, DbError::NotFound));
    assert_eq!(rec.state(), RecordState::Nonexistent);
}

#[test]
fn multi_row_read_is_an_integrity_error() {
    let t = employees();
    let mut conn = MockConnection::default();
    let mut rows = loaded_row();
    rows.extend(loaded_row());
    conn.expect_rows(rows);
    let mut ctx = Context::new(conn, AnsiDialect::new());

    let mut rec = Record::new(t.clone());
    let err = rec.read(&mut ctx, &[Value::Int(7)]).unwrap_err();
    assert!(matches!(err, DbError::IntegrityViolation));
    assert_eq!(rec.state(), RecordState::Invalid);
}

#[test]
fn optimistic_concurrency_uses_the_timestamp_column() {
    let t = Table::builder("invoices")
        .column(autoinc("invoice_id"))
        .column(text("reference", 40).required())
        .column(ColumnSpec::new("update_ts", DataType::Timestamp))
        .primary_key(&["invoice_id"])
        .timestamp_column("update_ts")
        .build()
        .unwrap();

    let mut conn = MockConnection::default();
    conn.expect_rows(vec![vec![
        Value::Int(3),
        Value::Text(String::from("INV-3")),
        Value::Text(String::from("2024-05-01 10:00:00")),
    ]]);
    conn.expect_execute(1);
    let mut ctx = Context::new(conn, AnsiDialect::new());

    let mut rec = Record::new(t.clone());
    rec.read(&mut ctx, &[Value::Int(3)]).unwrap();
    rec.set(t.column("reference").unwrap(), "INV-3b").unwrap();
    rec.update(&mut ctx).unwrap();

    let conn = ctx.release();
    let sql = conn.executed[0].sql();
    assert!(sql.starts_with("UPDATE invoices SET reference = ?, update_ts = ?"));
    assert!(sql.contains("WHERE invoice_id = ? AND update_ts = ?"));
    assert_eq!(conn.executed[0].params().len(), 4);
}

#[test]
fn delete_then_rollback_resurrects_the_record() {
    let t = employees();
    let mut conn = MockConnection::default();
    conn.expect_rows(loaded_row());
    conn.expect_execute(1);
    let mut ctx = Context::new(conn, AnsiDialect::new());

    let mut rec = Record::new(t.clone());
    rec.read(&mut ctx, &[Value::Int(7)]).unwrap();
    rec.delete(&mut ctx).unwrap();
    assert_eq!(rec.state(), RecordState::Deleted);

    ctx.rollback().unwrap();
    assert_eq!(rec.state(), RecordState::Valid);
    assert_eq!(
        rec.get(t.column("lastname").unwrap()).unwrap(),
        Value::Text(String::from("Doe"))
    );
}

#[test]
fn delete_of_a_vanished_row_is_a_conflict() {
    let t = employees();
    let mut conn = MockConnection::default();
    conn.expect_rows(loaded_row());
    conn.expect_execute(0);
    let mut ctx = Context::new(conn, AnsiDialect::new());

    let mut rec = Record::new(t.clone());
    rec.read(&mut ctx, &[Value::Int(7)]).unwrap();
    let err = rec.delete(&mut ctx).unwrap_err();
    assert!(matches!(err, DbError::ConcurrencyConflict { .. }));
}
