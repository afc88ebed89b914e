//! Rollback checkpoints.
//!
//! Before a record sends a write to the database it registers a checkpoint
//! with the owning context: a snapshot of its full (current, original,
//! modified, state) tuple. Commit discards the checkpoints; rollback replays
//! them, restoring every live record to its pre-mutation snapshot so that no
//! in-memory record ever claims a change the database discarded.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::debug;

use strata_sql_core::Value;

use crate::record::RecordState;

/// The mutable core of a record, shared between the record handle and its
/// checkpoints within one single-threaded unit of work.
#[derive(Debug, Clone)]
pub(crate) struct RecordData {
    pub(crate) fields: Vec<Value>,
    pub(crate) original: Vec<Value>,
    pub(crate) modified: Vec<bool>,
    pub(crate) state: RecordState,
}

impl RecordData {
    pub(crate) fn empty(len: usize) -> Self {
        Self {
            fields: vec![Value::Null; len],
            original: vec![Value::Null; len],
            modified: vec![false; len],
            state: RecordState::Nonexistent,
        }
    }
}

pub(crate) type RecordHandle = Rc<RefCell<RecordData>>;

struct Checkpoint {
    record_id: u64,
    rowset: String,
    handle: Weak<RefCell<RecordData>>,
    snapshot: RecordData,
}

/// The per-context checkpoint registry.
///
/// Scoped to exactly one transactional context; checkpoints never leak
/// across contexts.
#[derive(Default)]
pub struct RollbackManager {
    checkpoints: Vec<Checkpoint>,
}

impl RollbackManager {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers a checkpoint for a record.
    ///
    /// `snapshot` is the record's pre-mutation state. A record that writes
    /// several times in one transaction keeps its first checkpoint: rollback
    /// restores the state from before the first mutation, not an
    /// intermediate one.
    pub(crate) fn register(
        &mut self,
        record_id: u64,
        rowset: &str,
        handle: &RecordHandle,
        snapshot: RecordData,
    ) {
        if self.checkpoints.iter().any(|c| c.record_id == record_id) {
            debug!(rowset, "rollback checkpoint already registered, kept");
            return;
        }
        self.checkpoints.push(Checkpoint {
            record_id,
            rowset: String::from(rowset),
            handle: Rc::downgrade(handle),
            snapshot,
        });
        debug!(rowset, "rollback checkpoint registered");
    }

    /// Returns the number of registered checkpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    /// Returns whether no checkpoints are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    /// Discards all checkpoints (commit path).
    pub(crate) fn discard_all(&mut self) {
        if !self.checkpoints.is_empty() {
            debug!(count = self.checkpoints.len(), "checkpoints discarded");
        }
        self.checkpoints.clear();
    }

    /// Replays all checkpoints (rollback path).
    ///
    /// Records that were dropped in the meantime are skipped; there is no
    /// in-memory state left to reconcile for them.
    pub(crate) fn restore_all(&mut self) {
        for checkpoint in self.checkpoints.drain(..) {
            match checkpoint.handle.upgrade() {
                Some(data) => {
                    *data.borrow_mut() = checkpoint.snapshot;
                    debug!(
                        rowset = checkpoint.rowset.as_str(),
                        "record restored from checkpoint"
                    );
                }
                None => {
                    debug!(
                        rowset = checkpoint.rowset.as_str(),
                        "record dropped before rollback, checkpoint skipped"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_checkpoint_wins() {
        let handle: RecordHandle = Rc::new(RefCell::new(RecordData::empty(1)));
        handle.borrow_mut().fields[0] = Value::Int(1);

        let mut mgr = RollbackManager::new();
        mgr.register(7, "t", &handle, handle.borrow().clone());

        handle.borrow_mut().fields[0] = Value::Int(2);
        mgr.register(7, "t", &handle, handle.borrow().clone());
        assert_eq!(mgr.len(), 1);

        handle.borrow_mut().fields[0] = Value::Int(3);
        mgr.restore_all();
        assert_eq!(handle.borrow().fields[0], Value::Int(1));
        assert!(mgr.is_empty());
    }

    #[test]
    fn test_dropped_record_is_skipped() {
        let handle: RecordHandle = Rc::new(RefCell::new(RecordData::empty(1)));
        let mut mgr = RollbackManager::new();
        let snapshot = handle.borrow().clone();
        mgr.register(1, "t", &handle, snapshot);
        drop(handle);
        mgr.restore_all();
        assert!(mgr.is_empty());
    }
}
