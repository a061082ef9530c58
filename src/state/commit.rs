//! Batch save: sequential replay of the pending queue.
//!
//! Replay runs as one task, awaiting each request before the next. The
//! edit session stays in `update` and is settled with the outcome once the
//! task returns.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::data::{Group, Section};
use super::edit::EditSession;
use super::ops::PendingOperation;
use crate::api::{CatalogApi, GroupPatch};
use crate::error::{ApiResult, CommitError};

/// Issue the remote call(s) for one operation
async fn replay(api: &dyn CatalogApi, op: &PendingOperation) -> ApiResult<()> {
    match op {
        PendingOperation::GroupDelete { group_slug } => api.delete_group(group_slug).await,
        PendingOperation::GroupRename { group_slug, name } => {
            api.patch_group(group_slug, &GroupPatch::name(name.clone())).await?;
            Ok(())
        }
        PendingOperation::GroupReorder { slugs } => {
            for (position, slug) in slugs.iter().enumerate() {
                api.patch_group(slug, &GroupPatch::position(position as i64)).await?;
            }
            Ok(())
        }
        PendingOperation::ColorsReorder { group_slug, ids } => {
            api.reorder_colors(group_slug, ids).await
        }
        PendingOperation::ColorDelete { color_id } => api.delete_color(*color_id).await,
        PendingOperation::ColorRename { color_id, name } => {
            api.rename_color(*color_id, name).await?;
            Ok(())
        }
        PendingOperation::GalleryReorder { color_id, ids } => {
            api.reorder_gallery(*color_id, ids).await
        }
    }
}

/// Replay `ops` in order and fetch the canonical catalog afterwards.
///
/// Stops at the first failure; operations already replayed stay applied
/// on the server.
pub async fn commit(
    api: Arc<dyn CatalogApi>,
    ops: Vec<PendingOperation>,
    section: Section,
) -> Result<Vec<Group>, CommitError> {
    info!(count = ops.len(), section = section.slug(), "saving pending changes");
    for (index, op) in ops.iter().enumerate() {
        if let Err(source) = replay(api.as_ref(), op).await {
            error!(step = index + 1, op = %op.describe(), "save failed: {source}");
            return Err(CommitError::Replay { index, action: op.describe(), source });
        }
    }
    api.list_groups(section).await.map_err(|e| {
        warn!("changes saved but refresh failed: {e}");
        CommitError::Refresh(e)
    })
}

/// Run staged color deletions right away. Failures are logged and ignored.
pub async fn apply_deletes_only(api: Arc<dyn CatalogApi>, deletes: Vec<PendingOperation>) {
    for op in deletes {
        if let Err(e) = replay(api.as_ref(), &op).await {
            warn!(op = %op.describe(), "early delete failed: {e}");
        }
    }
}

/// Send one operation that is not deferred, then fetch the catalog
pub async fn apply_immediate(
    api: Arc<dyn CatalogApi>,
    op: PendingOperation,
    section: Section,
) -> ApiResult<Vec<Group>> {
    replay(api.as_ref(), &op).await?;
    info!(op = %op.describe(), "applied");
    api.list_groups(section).await
}

pub async fn create_group(
    api: Arc<dyn CatalogApi>,
    name: String,
    section: Section,
) -> ApiResult<Vec<Group>> {
    let group = api.create_group(&name, section).await?;
    info!(slug = %group.slug, "group created");
    api.list_groups(section).await
}

pub async fn load(api: Arc<dyn CatalogApi>, section: Section) -> ApiResult<Vec<Group>> {
    api.list_groups(section).await
}

impl EditSession {
    /// Apply the outcome of `commit` to the session. Returns the error to
    /// show, if any.
    ///
    /// A replay failure leaves queue and snapshot as they were so the user
    /// can retry. A refresh failure still closes the batch since the server
    /// already holds the edits.
    pub fn settle_commit(
        &mut self,
        outcome: Result<Vec<Group>, CommitError>,
    ) -> Option<CommitError> {
        match outcome {
            Ok(groups) => {
                self.finish_commit(Some(groups));
                None
            }
            Err(err @ CommitError::Refresh(_)) => {
                self.finish_commit(None);
                Some(err)
            }
            Err(err @ CommitError::Replay { .. }) => Some(err),
        }
    }
}
