//! Records: one row's working copy with per-field change tracking.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use strata_sql_core::schema::{Column, DataType, RowSet};
use strata_sql_core::{BuildError, Command, ParamMode, ToValue, Value};

use crate::connection::Connection;
use crate::context::Context;
use crate::error::{DbError, Result};
use crate::rollback::{RecordData, RecordHandle};

static NEXT_RECORD_ID: AtomicU64 = AtomicU64::new(1);

/// The lifecycle state of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    /// Never loaded and never created; the initial state.
    Nonexistent,
    /// Created in memory, not yet inserted.
    New,
    /// Loaded or written; current values match the originals.
    Valid,
    /// At least one field differs from its original value.
    Modified,
    /// Explicitly invalidated, e.g. after an integrity failure.
    Invalid,
    /// Deleted from the database; terminal for this instance.
    Deleted,
}

/// One row's working copy over a rowset.
///
/// A record tracks, per column, the current value, the original (as-loaded)
/// value and a modified flag. It is owned by exactly one unit of work and is
/// deliberately not `Send`: its checkpoint handles are `Rc`-shared with the
/// owning [`Context`]'s rollback registry.
pub struct Record {
    rowset: Arc<dyn RowSet>,
    id: u64,
    data: RecordHandle,
    // Pre-mutation snapshot, stashed on the first effective change and
    // handed to the rollback registry when a write is sent.
    pending_snapshot: Option<RecordData>,
}

impl Record {
    /// Creates a record over a rowset, in state `Nonexistent`.
    #[must_use]
    pub fn new(rowset: Arc<dyn RowSet>) -> Self {
        let len = rowset.columns().len();
        let data: RecordHandle = Rc::new(RefCell::new(RecordData::empty(len)));
        Self {
            rowset,
            id: NEXT_RECORD_ID.fetch_add(1, Ordering::Relaxed),
            data,
            pending_snapshot: None,
        }
    }

    /// Returns the rowset this record belongs to.
    #[must_use]
    pub fn rowset(&self) -> &Arc<dyn RowSet> {
        &self.rowset
    }

    /// Returns the rowset name, the key for re-association through a
    /// [`Database`](strata_sql_core::schema::Database) registry.
    #[must_use]
    pub fn rowset_name(&self) -> &str {
        self.rowset.name()
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> RecordState {
        self.data.borrow().state
    }

    /// Returns whether the record holds usable row data.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(
            self.state(),
            RecordState::New | RecordState::Valid | RecordState::Modified
        )
    }

    /// Returns whether any field has been modified.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        matches!(self.state(), RecordState::Modified)
            || (self.state() == RecordState::New && self.data.borrow().modified.contains(&true))
    }

    fn index_of(&self, column: &Column) -> Result<usize> {
        self.rowset
            .columns()
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| DbError::UnknownColumn(String::from(column.name())))
    }

    /// Stashes the current state as the pre-mutation snapshot, once per
    /// mutation cycle. The snapshot becomes the rollback checkpoint when a
    /// write is sent.
    fn stash_snapshot(&mut self) {
        if self.pending_snapshot.is_none() {
            self.pending_snapshot = Some(self.data.borrow().clone());
        }
    }

    fn take_snapshot(&mut self) -> RecordData {
        self.pending_snapshot
            .take()
            .unwrap_or_else(|| self.data.borrow().clone())
    }

    fn check_readable(&self, operation: &'static str) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(DbError::InvalidState {
                operation,
                state: self.state(),
            })
        }
    }

    /// Initializes the record with column defaults and state `New`.
    ///
    /// Nothing is sent to the database until [`Record::update`].
    ///
    /// # Errors
    ///
    /// Fails when the rowset does not permit writes.
    pub fn create(&mut self) -> Result<()> {
        if !self.rowset.updateable() {
            return Err(BuildError::RowSetReadOnly(String::from(self.rowset.name())).into());
        }
        self.stash_snapshot();
        let mut d = self.data.borrow_mut();
        for (i, column) in self.rowset.columns().iter().enumerate() {
            let default = column.default_value().cloned().unwrap_or(Value::Null);
            d.fields[i] = default.clone();
            d.original[i] = default;
            d.modified[i] = false;
        }
        d.state = RecordState::New;
        Ok(())
    }

    /// Returns the current value of a column.
    ///
    /// # Errors
    ///
    /// Fails when the column is foreign to this rowset or the record holds
    /// no data.
    pub fn get(&self, column: &Column) -> Result<Value> {
        self.check_readable("get")?;
        let index = self.index_of(column)?;
        Ok(self.data.borrow().fields[index].clone())
    }

    /// Sets a field value.
    ///
    /// The value is validated before anything is touched: read-only columns
    /// reject every assignment, required columns reject NULL, and the value
    /// must be compatible with the declared type. Setting a field to its
    /// already-current value is a silent no-op and does not mark the record
    /// modified. That suppression is what keeps partial updates minimal.
    ///
    /// # Errors
    ///
    /// Fails on a constraint violation or when the record holds no data.
    pub fn set(&mut self, column: &Column, value: impl ToValue) -> Result<()> {
        self.check_readable("set")?;
        let index = self.index_of(column)?;
        let value = value.to_value();
        if column.read_only() {
            return Err(DbError::FieldReadOnly {
                field: String::from(column.name()),
            });
        }
        if value.is_null() && column.required() {
            return Err(DbError::FieldRequired {
                field: String::from(column.name()),
            });
        }
        if !value.is_compatible_with(column.data_type()) {
            return Err(DbError::FieldTypeMismatch {
                field: String::from(column.name()),
                value: format!("{value:?}"),
            });
        }
        if let Value::Text(s) = &value {
            let size = column.size();
            if size > 0 && s.chars().count() as u32 > size {
                return Err(DbError::FieldTooLong {
                    field: String::from(column.name()),
                    size,
                });
            }
        }
        if self.data.borrow().fields[index] == value {
            return Ok(());
        }
        self.stash_snapshot();
        let mut d = self.data.borrow_mut();
        d.fields[index] = value;
        d.modified[index] = true;
        if d.state == RecordState::Valid {
            d.state = RecordState::Modified;
        }
        Ok(())
    }

    /// Returns whether a specific field has been modified.
    ///
    /// # Errors
    ///
    /// Fails when the column is foreign to this rowset.
    pub fn was_modified(&self, column: &Column) -> Result<bool> {
        let index = self.index_of(column)?;
        Ok(self.data.borrow().modified[index])
    }

    /// Returns the current primary key values.
    ///
    /// # Errors
    ///
    /// Fails when the rowset has no primary key.
    pub fn key(&self) -> Result<Vec<Value>> {
        let pk = self.rowset.primary_key();
        if pk.is_empty() {
            return Err(BuildError::NoPrimaryKey(String::from(self.rowset.name())).into());
        }
        let d = self.data.borrow();
        let mut key = Vec::with_capacity(pk.len());
        for column in pk {
            key.push(d.fields[self.index_of(column)?].clone());
        }
        Ok(key)
    }

    /// Loads the record by primary key.
    ///
    /// Zero rows leaves the state untouched and reports
    /// [`DbError::NotFound`]; more than one row is an integrity failure and
    /// invalidates the record.
    ///
    /// # Errors
    ///
    /// Fails on a missing row, an integrity violation, or execution failure.
    pub fn read<C: Connection>(&mut self, ctx: &mut Context<C>, key: &[Value]) -> Result<()> {
        let pk = self.rowset.primary_key();
        if pk.is_empty() {
            return Err(BuildError::NoPrimaryKey(String::from(self.rowset.name())).into());
        }
        if key.len() != pk.len() {
            return Err(DbError::InvalidKey {
                expected: pk.len(),
                given: key.len(),
            });
        }
        let mut cmd = Command::new(self.rowset.clone());
        for column in self.rowset.columns() {
            cmd = cmd.select(column);
        }
        for (column, value) in pk.iter().zip(key) {
            cmd = cmd.where_and(column.eq(value.clone()));
        }

        let mut reader = ctx.open_reader(&cmd)?;
        if !reader.move_next()? {
            return Err(DbError::NotFound);
        }
        let mut row = Vec::with_capacity(self.rowset.columns().len());
        for column in self.rowset.columns() {
            row.push(reader.value(column)?);
        }
        if reader.move_next()? {
            drop(reader);
            self.data.borrow_mut().state = RecordState::Invalid;
            return Err(DbError::IntegrityViolation);
        }
        drop(reader);

        // A fresh load is a new baseline for change tracking.
        self.pending_snapshot = None;
        let mut d = self.data.borrow_mut();
        d.fields.clone_from(&row);
        d.original = row;
        d.modified.iter_mut().for_each(|m| *m = false);
        d.state = RecordState::Valid;
        debug!(rowset = self.rowset.name(), "record read");
        Ok(())
    }

    /// Writes the record to the database.
    ///
    /// A `New` record is inserted from its explicitly set (non-default)
    /// values; a `Modified` record is updated with exactly its changed
    /// columns, keyed by primary key and, when the rowset defines one, the
    /// optimistic-concurrency timestamp. A rollback checkpoint is registered
    /// with the owning context before anything is sent.
    ///
    /// # Errors
    ///
    /// Fails on execution failure or on a concurrency conflict (a keyed
    /// UPDATE that affected no rows).
    pub fn update<C: Connection>(&mut self, ctx: &mut Context<C>) -> Result<()> {
        match self.state() {
            RecordState::New => self.insert_record(ctx),
            RecordState::Modified => self.update_record(ctx),
            RecordState::Valid => {
                debug!(rowset = self.rowset.name(), "record not modified");
                Ok(())
            }
            state => Err(DbError::InvalidState {
                operation: "update",
                state,
            }),
        }
    }

    fn insert_record<C: Connection>(&mut self, ctx: &mut Context<C>) -> Result<()> {
        if let Some(ts) = self.rowset.timestamp_column() {
            let index = self.index_of(ts)?;
            let mut d = self.data.borrow_mut();
            d.fields[index] = Value::DateTime(Utc::now().naive_utc());
            d.modified[index] = true;
        }
        let mut cmd = Command::new(self.rowset.clone());
        {
            let d = self.data.borrow();
            for (i, column) in self.rowset.columns().iter().enumerate() {
                let value = &d.fields[i];
                let non_default =
                    !value.is_null() && column.default_value() != Some(value);
                if d.modified[i] || non_default {
                    cmd = cmd.set(column.to(value.clone()));
                }
            }
        }
        let statement = cmd.insert_statement(ctx.dialect(), ParamMode::Prepared)?;
        let snapshot = self.take_snapshot();
        ctx.rollback_manager_mut()
            .register(self.id, self.rowset.name(), &self.data, snapshot);
        ctx.execute(&statement)?;

        let pk = self.rowset.primary_key();
        if pk.len() == 1 && *pk[0].data_type() == DataType::AutoInc {
            let index = self.index_of(&pk[0])?;
            if self.data.borrow().fields[index].is_null() {
                let generated = ctx.last_insert_id()?;
                self.data.borrow_mut().fields[index] = Value::Int(generated);
            }
        }

        let mut d = self.data.borrow_mut();
        let snapshot = d.fields.clone();
        d.original = snapshot;
        d.modified.iter_mut().for_each(|m| *m = false);
        d.state = RecordState::Valid;
        info!(rowset = self.rowset.name(), "record inserted");
        Ok(())
    }

    fn update_record<C: Connection>(&mut self, ctx: &mut Context<C>) -> Result<()> {
        if self.rowset.primary_key().is_empty() {
            return Err(BuildError::NoPrimaryKey(String::from(self.rowset.name())).into());
        }
        let now = Value::DateTime(Utc::now().naive_utc());
        let mut cmd = Command::new(self.rowset.clone());
        let mut ts_index = None;
        let mut set_count = 0_usize;
        {
            let d = self.data.borrow();
            for (i, column) in self.rowset.columns().iter().enumerate() {
                let value = d.fields[i].clone();
                if self.rowset.primary_key().iter().any(|p| p == column) {
                    if d.modified[i] {
                        warn!(
                            rowset = self.rowset.name(),
                            field = column.name(),
                            "primary key was modified"
                        );
                    }
                    cmd = cmd.where_and(column.eq(value));
                } else if self.rowset.timestamp_column() == Some(column) {
                    if value.is_null() {
                        debug!(
                            rowset = self.rowset.name(),
                            "record has no timestamp value, concurrent changes are not detected"
                        );
                    } else {
                        cmd = cmd.where_and(column.eq(value));
                    }
                    cmd = cmd.set(column.to(now.clone()));
                    ts_index = Some(i);
                } else if d.modified[i] {
                    cmd = cmd.set(column.to(value));
                    set_count += 1;
                }
            }
        }
        if set_count == 0 {
            info!(rowset = self.rowset.name(), "no changed fields, update skipped");
            return Ok(());
        }
        let statement = cmd.update_statement(ctx.dialect(), ParamMode::Prepared)?;
        let snapshot = self.take_snapshot();
        ctx.rollback_manager_mut()
            .register(self.id, self.rowset.name(), &self.data, snapshot);
        let affected = ctx.execute(&statement)?;
        if affected == 0 {
            info!(
                rowset = self.rowset.name(),
                "keyed update affected no rows, record is stale"
            );
            return Err(DbError::ConcurrencyConflict {
                rowset: String::from(self.rowset.name()),
            });
        }

        let mut d = self.data.borrow_mut();
        if let Some(index) = ts_index {
            d.fields[index] = now;
        }
        let snapshot = d.fields.clone();
        d.original = snapshot;
        d.modified.iter_mut().for_each(|m| *m = false);
        d.state = RecordState::Valid;
        info!(rowset = self.rowset.name(), "record updated");
        Ok(())
    }

    /// Deletes the record's row, keyed by primary key.
    ///
    /// # Errors
    ///
    /// Fails when the record holds no persisted row, on execution failure,
    /// or when the keyed DELETE affected no rows (concurrency conflict).
    pub fn delete<C: Connection>(&mut self, ctx: &mut Context<C>) -> Result<()> {
        match self.state() {
            RecordState::Valid | RecordState::Modified => {}
            state => {
                return Err(DbError::InvalidState {
                    operation: "delete",
                    state,
                })
            }
        }
        let pk = self.rowset.primary_key();
        if pk.is_empty() {
            return Err(BuildError::NoPrimaryKey(String::from(self.rowset.name())).into());
        }
        let mut cmd = Command::new(self.rowset.clone());
        {
            let d = self.data.borrow();
            for column in pk {
                let index = self.index_of(column)?;
                cmd = cmd.where_and(column.eq(d.fields[index].clone()));
            }
        }
        let statement = cmd.delete_statement(ctx.dialect(), ParamMode::Prepared)?;
        let snapshot = self.take_snapshot();
        ctx.rollback_manager_mut()
            .register(self.id, self.rowset.name(), &self.data, snapshot);
        let affected = ctx.execute(&statement)?;
        if affected == 0 {
            return Err(DbError::ConcurrencyConflict {
                rowset: String::from(self.rowset.name()),
            });
        }
        self.data.borrow_mut().state = RecordState::Deleted;
        info!(rowset = self.rowset.name(), "record deleted");
        Ok(())
    }

    /// Explicitly invalidates the record.
    pub fn invalidate(&mut self) {
        self.data.borrow_mut().state = RecordState::Invalid;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_sql_core::schema::{autoinc, text, ColumnSpec, Table};

    fn employees() -> Arc<Table> {
        Table::builder("employees")
            .column(autoinc("employee_id"))
            .column(text("firstname", 10).required())
            .column(text("lastname", 40).required())
            .column(ColumnSpec::new("retired", DataType::Bool).default_value(Value::Bool(false)))
            .primary_key(&["employee_id"])
            .build()
            .unwrap()
    }

    #[test]
    fn test_create_applies_defaults() {
        let t = employees();
        let mut rec = Record::new(t.clone());
        assert_eq!(rec.state(), RecordState::Nonexistent);
        rec.create().unwrap();
        assert_eq!(rec.state(), RecordState::New);
        assert_eq!(
            rec.get(t.column("retired").unwrap()).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_set_validations() {
        let t = employees();
        let mut rec = Record::new(t.clone());
        rec.create().unwrap();

        let id = t.column("employee_id").unwrap().clone();
        assert!(matches!(
            rec.set(&id, 9_i64),
            Err(DbError::FieldReadOnly { .. })
        ));

        let first = t.column("firstname").unwrap().clone();
        assert!(matches!(
            rec.set(&first, Value::Null),
            Err(DbError::FieldRequired { .. })
        ));
        assert!(matches!(
            rec.set(&first, 12_i64),
            Err(DbError::FieldTypeMismatch { .. })
        ));
        assert!(matches!(
            rec.set(&first, "name-that-is-too-long"),
            Err(DbError::FieldTooLong { .. })
        ));
        rec.set(&first, "Jane").unwrap();
    }

    #[test]
    fn test_set_to_current_value_is_a_noop() {
        let t = employees();
        let mut rec = Record::new(t.clone());
        rec.create().unwrap();
        let retired = t.column("retired").unwrap().clone();

        // Same as the default: no modification recorded.
        rec.set(&retired, false).unwrap();
        assert!(!rec.was_modified(&retired).unwrap());

        rec.set(&retired, true).unwrap();
        assert!(rec.was_modified(&retired).unwrap());
    }

    #[test]
    fn test_get_on_nonexistent_fails() {
        let t = employees();
        let rec = Record::new(t.clone());
        assert!(matches!(
            rec.get(t.column("lastname").unwrap()),
            Err(DbError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_create_on_view_is_rejected() {
        let v = strata_sql_core::schema::View::builder("employee_info")
            .column(ColumnSpec::new("employee_id", DataType::Integer))
            .query("SELECT employee_id FROM employees")
            .build()
            .unwrap();
        let mut rec = Record::new(v);
        assert!(matches!(
            rec.create(),
            Err(DbError::Build(BuildError::RowSetReadOnly(_)))
        ));
    }
}
