//! Sorted view model of the catalog, reorder permutations and the inline
//! rename editor.
//!
//! Views render a `CatalogTree`, never the raw group list, so the order on
//! screen and the order used to derive reorder operations are the same.

use std::cmp::Ordering;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::state::data::Group;

/// Case- and accent-insensitive form of a name
pub fn fold_name(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Position first, folded name second
fn display_order(pos_a: i64, name_a: &str, pos_b: i64, name_b: &str) -> Ordering {
    pos_a
        .cmp(&pos_b)
        .then_with(|| fold_name(name_a).cmp(&fold_name(name_b)))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorNode {
    pub id: i64,
    pub name: String,
    pub thumbnail_url: Option<String>,
    pub gallery_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupNode {
    pub slug: String,
    pub name: String,
    pub colors: Vec<ColorNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogTree {
    pub groups: Vec<GroupNode>,
}

impl CatalogTree {
    pub fn build(groups: &[Group]) -> Self {
        let mut sorted: Vec<&Group> = groups.iter().collect();
        sorted.sort_by(|a, b| display_order(a.position, &a.name, b.position, &b.name));

        let groups = sorted
            .into_iter()
            .map(|group| {
                let mut colors: Vec<_> = group.colors.iter().collect();
                colors.sort_by(|a, b| display_order(a.position, &a.name, b.position, &b.name));
                GroupNode {
                    slug: group.slug.clone(),
                    name: group.name.clone(),
                    colors: colors
                        .into_iter()
                        .map(|color| ColorNode {
                            id: color.id,
                            name: color.name.clone(),
                            thumbnail_url: color.presentation.as_ref().map(|p| p.url.clone()),
                            gallery_count: color.gallery_count,
                        })
                        .collect(),
                }
            })
            .collect();
        Self { groups }
    }

    pub fn group(&self, slug: &str) -> Option<&GroupNode> {
        self.groups.iter().find(|g| g.slug == slug)
    }

    /// Group slugs after dragging the group at `from` to `to`
    pub fn group_order_after_move(&self, from: usize, to: usize) -> Option<Vec<String>> {
        let slugs: Vec<String> = self.groups.iter().map(|g| g.slug.clone()).collect();
        move_item(&slugs, from, to)
    }

    /// Color ids of `group_slug` after dragging the color at `from` to `to`
    pub fn color_order_after_move(
        &self,
        group_slug: &str,
        from: usize,
        to: usize,
    ) -> Option<Vec<i64>> {
        let ids: Vec<i64> = self.group(group_slug)?.colors.iter().map(|c| c.id).collect();
        move_item(&ids, from, to)
    }
}

/// `items` with the element at `from` moved to `to`. `None` when either
/// index is out of range or nothing moves.
pub fn move_item<T: Clone>(items: &[T], from: usize, to: usize) -> Option<Vec<T>> {
    if from == to || from >= items.len() || to >= items.len() {
        return None;
    }
    let mut moved = items.to_vec();
    let item = moved.remove(from);
    moved.insert(to, item);
    Some(moved)
}

/// Entity an inline editor is attached to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    Group(String),
    Color(i64),
    NewGroup,
}

/// How an edit ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorExit {
    Enter,
    Escape,
    Blur,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorOutcome {
    Revert,
    Submit(String),
}

/// Text field swapped in for a name while it is being edited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineEditor {
    pub target: EditTarget,
    original: String,
    pub draft: String,
}

impl InlineEditor {
    pub fn start(target: EditTarget, original: &str) -> Self {
        Self {
            target,
            original: original.to_string(),
            draft: original.to_string(),
        }
    }

    pub fn set_draft(&mut self, draft: String) {
        self.draft = draft;
    }

    pub fn finish(&self, exit: EditorExit) -> EditorOutcome {
        if exit == EditorExit::Escape {
            return EditorOutcome::Revert;
        }
        let name = self.draft.trim();
        if name.is_empty() || name == self.original {
            EditorOutcome::Revert
        } else {
            EditorOutcome::Submit(name.to_string())
        }
    }
}
