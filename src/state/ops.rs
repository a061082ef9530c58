//! Staged catalog mutations and the per-kind mutation policy.

use serde::{Deserialize, Serialize};

use super::data::Group;

/// A staged, not-yet-committed mutation awaiting batch replay.
///
/// Equality is structural: two values with the same kind and the same
/// fields are the same operation as far as the queue is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PendingOperation {
    GroupDelete { group_slug: String },
    GroupRename { group_slug: String, name: String },
    GroupReorder { slugs: Vec<String> },
    ColorsReorder { group_slug: String, ids: Vec<i64> },
    ColorDelete { color_id: i64 },
    ColorRename { color_id: i64, name: String },
    GalleryReorder { color_id: i64, ids: Vec<i64> },
}

/// Every kind of catalog mutation the dashboard can perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    GroupCreate,
    GroupDelete,
    GroupRename,
    GroupReorder,
    ColorCreate,
    ColorsReorder,
    ColorDelete,
    ColorRename,
    GalleryReorder,
    GalleryUpload,
    ImageDelete,
    PresentationReplace,
    PresentationPromote,
}

/// Whether a mutation hits the server right away or waits for Save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationPolicy {
    Immediate,
    Queued,
}

/// Default policy per kind.
///
/// Renames apply eagerly; deletes and reorders wait in the queue.
/// Creations and image operations involve uploads or new ids and are
/// always immediate.
const POLICY_TABLE: [(OperationKind, MutationPolicy); 13] = [
    (OperationKind::GroupCreate, MutationPolicy::Immediate),
    (OperationKind::GroupDelete, MutationPolicy::Queued),
    (OperationKind::GroupRename, MutationPolicy::Immediate),
    (OperationKind::GroupReorder, MutationPolicy::Queued),
    (OperationKind::ColorCreate, MutationPolicy::Immediate),
    (OperationKind::ColorsReorder, MutationPolicy::Queued),
    (OperationKind::ColorDelete, MutationPolicy::Queued),
    (OperationKind::ColorRename, MutationPolicy::Immediate),
    (OperationKind::GalleryReorder, MutationPolicy::Queued),
    (OperationKind::GalleryUpload, MutationPolicy::Immediate),
    (OperationKind::ImageDelete, MutationPolicy::Immediate),
    (OperationKind::PresentationReplace, MutationPolicy::Immediate),
    (OperationKind::PresentationPromote, MutationPolicy::Immediate),
];

/// Resolved policy table for one edit session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditPolicy {
    /// Queue renames with deletes and reorders instead of applying them
    pub defer_renames: bool,
}

impl EditPolicy {
    pub fn policy(&self, kind: OperationKind) -> MutationPolicy {
        if self.defer_renames
            && matches!(kind, OperationKind::GroupRename | OperationKind::ColorRename)
        {
            return MutationPolicy::Queued;
        }
        POLICY_TABLE
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, p)| *p)
            .unwrap_or(MutationPolicy::Immediate)
    }
}

impl PendingOperation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::GroupDelete { .. } => OperationKind::GroupDelete,
            Self::GroupRename { .. } => OperationKind::GroupRename,
            Self::GroupReorder { .. } => OperationKind::GroupReorder,
            Self::ColorsReorder { .. } => OperationKind::ColorsReorder,
            Self::ColorDelete { .. } => OperationKind::ColorDelete,
            Self::ColorRename { .. } => OperationKind::ColorRename,
            Self::GalleryReorder { .. } => OperationKind::GalleryReorder,
        }
    }

    /// Short human label used in logs and error messages
    pub fn describe(&self) -> String {
        match self {
            Self::GroupDelete { group_slug } => format!("delete group {group_slug}"),
            Self::GroupRename { group_slug, name } => {
                format!("rename group {group_slug} to \"{name}\"")
            }
            Self::GroupReorder { slugs } => format!("reorder {} groups", slugs.len()),
            Self::ColorsReorder { group_slug, ids } => {
                format!("reorder {} colors in {group_slug}", ids.len())
            }
            Self::ColorDelete { color_id } => format!("delete color #{color_id}"),
            Self::ColorRename { color_id, name } => {
                format!("rename color #{color_id} to \"{name}\"")
            }
            Self::GalleryReorder { color_id, ids } => {
                format!("reorder {} images of color #{color_id}", ids.len())
            }
        }
    }

    /// Apply the operation's effect to a local catalog copy.
    ///
    /// Unknown slugs and ids are skipped; gallery order lives outside the
    /// group list so `GalleryReorder` leaves it untouched.
    pub fn apply_local(&self, groups: &mut Vec<Group>) {
        match self {
            Self::GroupDelete { group_slug } => groups.retain(|g| &g.slug != group_slug),
            Self::GroupRename { group_slug, name } => {
                if let Some(group) = groups.iter_mut().find(|g| &g.slug == group_slug) {
                    group.name = name.clone();
                }
            }
            Self::GroupReorder { slugs } => {
                for (position, slug) in slugs.iter().enumerate() {
                    if let Some(group) = groups.iter_mut().find(|g| &g.slug == slug) {
                        group.position = position as i64;
                    }
                }
            }
            Self::ColorsReorder { group_slug, ids } => {
                if let Some(group) = groups.iter_mut().find(|g| &g.slug == group_slug) {
                    for (position, id) in ids.iter().enumerate() {
                        if let Some(color) = group.colors.iter_mut().find(|c| c.id == *id) {
                            color.position = position as i64;
                        }
                    }
                }
            }
            Self::ColorDelete { color_id } => {
                for group in groups.iter_mut() {
                    group.colors.retain(|c| c.id != *color_id);
                }
            }
            Self::ColorRename { color_id, name } => {
                let color = groups
                    .iter_mut()
                    .flat_map(|g| g.colors.iter_mut())
                    .find(|c| c.id == *color_id);
                if let Some(color) = color {
                    color.name = name.clone();
                }
            }
            Self::GalleryReorder { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::fixtures;

    #[test]
    fn default_policy_keeps_rename_asymmetry() {
        let policy = EditPolicy::default();
        assert_eq!(policy.policy(OperationKind::GroupRename), MutationPolicy::Immediate);
        assert_eq!(policy.policy(OperationKind::ColorRename), MutationPolicy::Immediate);
        assert_eq!(policy.policy(OperationKind::GroupDelete), MutationPolicy::Queued);
        assert_eq!(policy.policy(OperationKind::ColorDelete), MutationPolicy::Queued);
        assert_eq!(policy.policy(OperationKind::GroupReorder), MutationPolicy::Queued);
        assert_eq!(policy.policy(OperationKind::ColorsReorder), MutationPolicy::Queued);
        assert_eq!(policy.policy(OperationKind::GalleryReorder), MutationPolicy::Queued);
        assert_eq!(
            policy.policy(OperationKind::PresentationReplace),
            MutationPolicy::Immediate
        );
        assert_eq!(
            policy.policy(OperationKind::PresentationPromote),
            MutationPolicy::Immediate
        );
    }

    #[test]
    fn deferred_renames_queue_every_pending_kind() {
        let policy = EditPolicy { defer_renames: true };
        let ops = [
            PendingOperation::GroupRename { group_slug: "a".into(), name: "x".into() },
            PendingOperation::ColorRename { color_id: 1, name: "x".into() },
            PendingOperation::GroupDelete { group_slug: "a".into() },
            PendingOperation::GalleryReorder { color_id: 1, ids: vec![] },
        ];
        for op in ops {
            assert_eq!(policy.policy(op.kind()), MutationPolicy::Queued, "{op:?}");
        }
        // Uploads never become deferrable
        assert_eq!(policy.policy(OperationKind::GalleryUpload), MutationPolicy::Immediate);
    }

    #[test]
    fn kind_tag_matches_dashboard_names() {
        let op = PendingOperation::ColorsReorder { group_slug: "bois".into(), ids: vec![2, 1] };
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["kind"], "colors_reorder");
        assert_eq!(json["ids"], serde_json::json!([2, 1]));
    }

    #[test]
    fn apply_local_handles_each_catalog_kind() {
        let mut groups = fixtures::catalog();

        PendingOperation::GroupReorder { slugs: vec!["uni".into(), "bois".into()] }
            .apply_local(&mut groups);
        assert_eq!(groups[0].position, 1);
        assert_eq!(groups[1].position, 0);

        PendingOperation::ColorsReorder { group_slug: "bois".into(), ids: vec![2, 1] }
            .apply_local(&mut groups);
        assert_eq!(groups[0].colors[0].position, 1);
        assert_eq!(groups[0].colors[1].position, 0);

        PendingOperation::ColorRename { color_id: 4, name: "Carmin".into() }
            .apply_local(&mut groups);
        assert_eq!(groups[1].colors[1].name, "Carmin");

        PendingOperation::ColorDelete { color_id: 3 }.apply_local(&mut groups);
        assert_eq!(groups[1].colors.len(), 1);

        PendingOperation::GroupRename { group_slug: "bois".into(), name: "Bois massif".into() }
            .apply_local(&mut groups);
        assert_eq!(groups[0].name, "Bois massif");

        PendingOperation::GroupDelete { group_slug: "uni".into() }.apply_local(&mut groups);
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn apply_local_ignores_unknown_targets() {
        let mut groups = fixtures::catalog();
        let before = groups.clone();
        PendingOperation::GroupDelete { group_slug: "missing".into() }.apply_local(&mut groups);
        PendingOperation::ColorRename { color_id: 99, name: "x".into() }.apply_local(&mut groups);
        PendingOperation::GalleryReorder { color_id: 1, ids: vec![5, 6] }.apply_local(&mut groups);
        assert_eq!(groups, before);
    }
}
