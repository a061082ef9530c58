//! Pre-edit catalog copy backing Cancel.

use super::data::Group;

/// Holds at most one deep copy of the catalog.
///
/// The copy is taken on the first edit of a batch and kept until the batch
/// is saved or cancelled, so Cancel always returns to the pre-batch state.
#[derive(Debug, Clone, Default)]
pub struct SnapshotManager {
    held: Option<Vec<Group>>,
}

impl SnapshotManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy `current` unless a snapshot is already held.
    /// Returns whether a copy was taken.
    pub fn capture_if_absent(&mut self, current: &[Group]) -> bool {
        if self.held.is_some() {
            return false;
        }
        self.held = Some(current.to_vec());
        true
    }

    /// Take the held snapshot, leaving none behind
    pub fn restore(&mut self) -> Option<Vec<Group>> {
        self.held.take()
    }

    pub fn discard(&mut self) {
        self.held = None;
    }

    /// Replace a held snapshot with a fresher server copy.
    /// Does nothing when no batch is open.
    pub fn rebase(&mut self, fresh: &[Group]) {
        if let Some(held) = self.held.as_mut() {
            *held = fresh.to_vec();
        }
    }

    pub fn is_held(&self) -> bool {
        self.held.is_some()
    }

    #[cfg(test)]
    pub fn peek(&self) -> Option<&[Group]> {
        self.held.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::fixtures;
    use proptest::prelude::*;

    #[test]
    fn restore_without_snapshot_returns_nothing() {
        let mut snapshot = SnapshotManager::new();
        assert!(snapshot.restore().is_none());
        assert!(!snapshot.is_held());
    }

    #[test]
    fn restore_clears_held_copy() {
        let mut snapshot = SnapshotManager::new();
        let catalog = fixtures::catalog();
        assert!(snapshot.capture_if_absent(&catalog));
        assert_eq!(snapshot.restore(), Some(catalog));
        assert!(snapshot.restore().is_none());
    }

    #[test]
    fn rebase_only_applies_to_open_batch() {
        let mut snapshot = SnapshotManager::new();
        let fresh = fixtures::catalog();
        snapshot.rebase(&fresh);
        assert!(!snapshot.is_held());

        snapshot.capture_if_absent(&fresh[..1]);
        snapshot.rebase(&fresh);
        assert_eq!(snapshot.peek(), Some(fresh.as_slice()));
    }

    proptest! {
        #[test]
        fn first_capture_wins(names in proptest::collection::vec("[a-z]{1,6}", 1..8)) {
            let mut snapshot = SnapshotManager::new();
            let mut catalog = fixtures::catalog();
            let first = catalog.clone();
            for (i, name) in names.iter().enumerate() {
                snapshot.capture_if_absent(&catalog);
                catalog[i % 2].name = name.clone();
            }
            prop_assert_eq!(snapshot.peek(), Some(first.as_slice()));
        }
    }
}
