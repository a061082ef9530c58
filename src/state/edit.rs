//! Optimistic edit session over the catalog
//!
//! The session owns the catalog currently displayed, the queue of staged
//! operations and the pre-edit snapshot. Every edit is applied locally
//! right away; queued ones are replayed on Save and reverted on Cancel.
use tracing::{debug, info};

use super::data::{Group, Section};
use super::ops::{EditPolicy, MutationPolicy, OperationKind, PendingOperation};
use super::queue::PendingQueue;
use super::snapshot::SnapshotManager;
use crate::error::EditError;

/// What the caller must do after a rename request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameAction {
    /// Empty or unchanged name: show the original text again
    Revert,
    /// Send this operation to the server now, then reload
    Remote(PendingOperation),
    /// Applied locally and queued for Save
    Queued,
}

/// Banner state derived from the queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveBanner {
    pub visible: bool,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct EditSession {
    section: Section,
    groups: Vec<Group>,
    queue: PendingQueue,
    snapshot: SnapshotManager,
    policy: EditPolicy,
    banner_visible: bool,
}

impl EditSession {
    /// Create an empty session for `section`
    pub fn new(section: Section, policy: EditPolicy) -> Self {
        Self {
            section,
            groups: Vec::new(),
            queue: PendingQueue::new(),
            snapshot: SnapshotManager::new(),
            policy,
            banner_visible: false,
        }
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn queue(&self) -> &PendingQueue {
        &self.queue
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> &SnapshotManager {
        &self.snapshot
    }

    /// Check if there is nothing staged (the equivalent of an unedited image)
    pub fn is_clean(&self) -> bool {
        self.queue.is_empty() && !self.snapshot.is_held()
    }

    pub fn banner(&self) -> SaveBanner {
        SaveBanner {
            visible: self.banner_visible,
            text: self.queue.banner_text(),
        }
    }

    /// Switch to another section. Refused while edits are staged, since the
    /// snapshot and queue belong to the section they were made in.
    pub fn switch_section(&mut self, section: Section) -> Result<(), EditError> {
        if section == self.section {
            return Ok(());
        }
        if !self.is_clean() {
            return Err(EditError::PendingChanges);
        }
        self.section = section;
        self.groups.clear();
        Ok(())
    }

    /// Install a catalog fetched from the server.
    ///
    /// With a batch open, the fresh copy becomes the snapshot and the
    /// queued operations are re-applied on top of it so the display keeps
    /// matching the queue.
    pub fn load(&mut self, fresh: Vec<Group>) {
        if self.queue.is_empty() {
            self.snapshot.discard();
            self.groups = fresh;
            return;
        }
        self.snapshot.rebase(&fresh);
        let mut groups = fresh;
        for op in self.queue.iter() {
            op.apply_local(&mut groups);
        }
        debug!(pending = self.queue.len(), "reloaded catalog with staged edits re-applied");
        self.groups = groups;
    }

    /// Stage a deferred operation: snapshot first, then local effect, queue
    /// and banner.
    fn stage(&mut self, op: PendingOperation) {
        self.snapshot.capture_if_absent(&self.groups);
        op.apply_local(&mut self.groups);
        self.queue.enqueue(op);
        self.banner_visible = true;
    }

    pub fn delete_group(&mut self, slug: &str) -> Result<(), EditError> {
        if !self.groups.iter().any(|g| g.slug == slug) {
            return Err(EditError::UnknownGroup(slug.to_string()));
        }
        self.stage(PendingOperation::GroupDelete { group_slug: slug.to_string() });
        Ok(())
    }

    pub fn delete_color(&mut self, color_id: i64) -> Result<(), EditError> {
        if super::data::find_color(&self.groups, color_id).is_none() {
            return Err(EditError::UnknownColor(color_id));
        }
        self.stage(PendingOperation::ColorDelete { color_id });
        Ok(())
    }

    /// Stage a new group order reported by a reorder gesture
    pub fn reorder_groups(&mut self, slugs: Vec<String>) {
        self.stage(PendingOperation::GroupReorder { slugs });
    }

    pub fn reorder_colors(&mut self, group_slug: &str, ids: Vec<i64>) -> Result<(), EditError> {
        if !self.groups.iter().any(|g| g.slug == group_slug) {
            return Err(EditError::UnknownGroup(group_slug.to_string()));
        }
        self.stage(PendingOperation::ColorsReorder { group_slug: group_slug.to_string(), ids });
        Ok(())
    }

    /// Gallery order is not part of the group list, but the gesture still
    /// opens a batch so Cancel and Save cover it.
    pub fn reorder_gallery(&mut self, color_id: i64, ids: Vec<i64>) {
        self.stage(PendingOperation::GalleryReorder { color_id, ids });
    }

    pub fn rename_group(&mut self, slug: &str, name: &str) -> Result<RenameAction, EditError> {
        let group = self
            .groups
            .iter()
            .find(|g| g.slug == slug)
            .ok_or_else(|| EditError::UnknownGroup(slug.to_string()))?;
        let name = name.trim();
        if name.is_empty() || name == group.name {
            return Ok(RenameAction::Revert);
        }
        let op = PendingOperation::GroupRename {
            group_slug: slug.to_string(),
            name: name.to_string(),
        };
        Ok(self.route_rename(OperationKind::GroupRename, op))
    }

    pub fn rename_color(&mut self, color_id: i64, name: &str) -> Result<RenameAction, EditError> {
        let (_, color) = super::data::find_color(&self.groups, color_id)
            .ok_or(EditError::UnknownColor(color_id))?;
        let name = name.trim();
        if name.is_empty() || name == color.name {
            return Ok(RenameAction::Revert);
        }
        let op = PendingOperation::ColorRename { color_id, name: name.to_string() };
        Ok(self.route_rename(OperationKind::ColorRename, op))
    }

    fn route_rename(&mut self, kind: OperationKind, op: PendingOperation) -> RenameAction {
        match self.policy.policy(kind) {
            MutationPolicy::Immediate => RenameAction::Remote(op),
            MutationPolicy::Queued => {
                self.stage(op);
                RenameAction::Queued
            }
        }
    }

    /// Revert every staged edit. Returns whether a snapshot was restored.
    pub fn cancel(&mut self) -> bool {
        let restored = match self.snapshot.restore() {
            Some(groups) => {
                self.groups = groups;
                true
            }
            None => false,
        };
        info!(dropped = self.queue.len(), "pending changes cancelled");
        self.queue.clear();
        self.banner_visible = false;
        restored
    }

    /// Operations to replay, in insertion order
    pub fn pending_ops(&self) -> Vec<PendingOperation> {
        self.queue.to_vec()
    }

    /// Remove every staged color deletion so it can run ahead of a save.
    /// Hides the banner if nothing else is pending.
    pub fn take_color_deletes(&mut self) -> Vec<PendingOperation> {
        let deletes = self.queue.drain_kind(OperationKind::ColorDelete);
        if self.queue.is_empty() {
            // The server is about to hold every staged change, so the batch
            // is over
            self.snapshot.discard();
            self.banner_visible = false;
        }
        deletes
    }

    /// Close the batch after the server accepted every operation
    pub(crate) fn finish_commit(&mut self, fresh: Option<Vec<Group>>) {
        self.queue.clear();
        self.snapshot.discard();
        self.banner_visible = false;
        if let Some(groups) = fresh {
            self.groups = groups;
        }
    }
}
