//! Ordered, de-duplicated list of staged mutations.

use tracing::debug;

use super::ops::{OperationKind, PendingOperation};

/// In-memory pending-operation queue.
///
/// Insertion order is replay order. An operation structurally equal to one
/// already queued is dropped on enqueue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingQueue {
    ops: Vec<PendingOperation>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `op` unless an identical operation is already queued.
    /// Returns whether the queue grew.
    pub fn enqueue(&mut self, op: PendingOperation) -> bool {
        if self.ops.contains(&op) {
            debug!(op = %op.describe(), "duplicate pending operation ignored");
            return false;
        }
        debug!(op = %op.describe(), pending = self.ops.len() + 1, "operation queued");
        self.ops.push(op);
        true
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingOperation> {
        self.ops.iter()
    }

    /// Copy of the queue in replay order
    pub fn to_vec(&self) -> Vec<PendingOperation> {
        self.ops.clone()
    }

    /// Remove and return every operation of `kind`, keeping the relative
    /// order of both the drained and the remaining operations.
    pub fn drain_kind(&mut self, kind: OperationKind) -> Vec<PendingOperation> {
        let (drained, kept): (Vec<_>, Vec<_>) =
            self.ops.drain(..).partition(|op| op.kind() == kind);
        self.ops = kept;
        drained
    }

    /// Text of the save banner for the current queue length
    pub fn banner_text(&self) -> String {
        match self.ops.len() {
            0 => "Save changes?".to_string(),
            1 => "Save changes? (1 pending change)".to_string(),
            n => format!("Save changes? ({n} pending changes)"),
        }
    }
}
