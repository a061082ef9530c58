//! Add-color form: name, optional cover file and gallery files with local
//! previews.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use iced::widget::{button, column, container, image, row, scrollable, text, text_input};
use iced::{Alignment, Element, Length};
use iced_aw::Wrap;
use tracing::info;

use super::thumbnail;
use crate::api::CatalogApi;
use crate::error::{ApiResult, EditError};
use crate::state::commit::apply_deletes_only;
use crate::state::data::{Group, Section};
use crate::state::ops::PendingOperation;
use crate::uploads::preview::{PreviewImage, PreviewSet};
use crate::Message;

const PREVIEW_TILE: f32 = 96.0;

/// Which file input of the form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewTarget {
    Presentation,
    Gallery,
}

/// Validated form contents, ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub group_slug: String,
    pub name: String,
    pub presentation: Option<PathBuf>,
    pub gallery: Vec<PathBuf>,
}

#[derive(Debug)]
pub struct AddColorForm {
    pub group_slug: String,
    pub name: String,
    presentation: PreviewSet,
    gallery: PreviewSet,
    handles: HashMap<PathBuf, image::Handle>,
    submitting: bool,
}

impl AddColorForm {
    pub fn new(group_slug: String) -> Self {
        Self {
            group_slug,
            name: String::new(),
            presentation: PreviewSet::single(),
            gallery: PreviewSet::multiple(),
            handles: HashMap::new(),
            submitting: false,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    fn set(&self, target: PreviewTarget) -> &PreviewSet {
        match target {
            PreviewTarget::Presentation => &self.presentation,
            PreviewTarget::Gallery => &self.gallery,
        }
    }

    fn set_mut(&mut self, target: PreviewTarget) -> &mut PreviewSet {
        match target {
            PreviewTarget::Presentation => &mut self.presentation,
            PreviewTarget::Gallery => &mut self.gallery,
        }
    }

    /// Add picked files. Returns those whose preview must be rendered.
    pub fn add_files(&mut self, target: PreviewTarget, paths: Vec<PathBuf>) -> Vec<PathBuf> {
        let set = self.set_mut(target);
        let added = paths.into_iter().filter(|path| set.add(path.clone())).collect();
        self.prune_handles();
        added
    }

    /// Attach a rendered preview to whichever input still holds `path`
    pub fn set_preview(&mut self, path: &Path, preview: Option<PreviewImage>) {
        let held = self.presentation.paths().iter().chain(self.gallery.paths().iter()).any(|p| p == path);
        if !held {
            return;
        }
        if let Some(preview) = &preview {
            let handle = image::Handle::from_rgba(preview.width, preview.height, preview.rgba.clone());
            self.handles.insert(path.to_path_buf(), handle);
        }
        self.presentation.set_image(path, preview.clone());
        self.gallery.set_image(path, preview);
    }

    pub fn remove(&mut self, target: PreviewTarget, index: usize) {
        if self.set_mut(target).remove(index).is_some() {
            self.prune_handles();
        }
    }

    /// Drop handles of files no longer chosen
    fn prune_handles(&mut self) {
        let mut kept = self.presentation.paths();
        kept.extend(self.gallery.paths());
        self.handles.retain(|path, _| kept.contains(path));
    }

    /// Validate and lock the form. `Ok(None)` means a submission is
    /// already running.
    pub fn begin_submit(&mut self, groups: &[Group]) -> Result<Option<Submission>, EditError> {
        if self.submitting {
            return Ok(None);
        }
        let name = self.name.trim();
        if name.is_empty() {
            return Err(EditError::EmptyName);
        }
        if !groups.iter().any(|g| g.slug == self.group_slug) {
            return Err(EditError::UnknownGroup(self.group_slug.clone()));
        }
        self.submitting = true;
        Ok(Some(Submission {
            group_slug: self.group_slug.clone(),
            name: name.to_string(),
            presentation: self.presentation.paths().into_iter().next(),
            gallery: self.gallery.paths(),
        }))
    }

    pub fn submit_failed(&mut self) {
        self.submitting = false;
    }

    pub fn view(&self) -> Element<'_, Message> {
        let name = text_input("Color name", &self.name)
            .on_input(Message::AddColorName)
            .on_submit(Message::SubmitAddColor)
            .width(Length::Fixed(320.0));

        let cover = column![
            row![
                text("Presentation image").size(14),
                button(text("Choose...").size(13))
                    .style(button::secondary)
                    .on_press(Message::PickFiles(PreviewTarget::Presentation)),
            ]
            .spacing(10)
            .align_y(Alignment::Center),
            self.previews(PreviewTarget::Presentation),
        ]
        .spacing(8);

        let gallery = column![
            row![
                text(format!("Gallery ({})", self.gallery.len())).size(14),
                button(text("Add files...").size(13))
                    .style(button::secondary)
                    .on_press(Message::PickFiles(PreviewTarget::Gallery)),
                button(text("Add folder...").size(13))
                    .style(button::secondary)
                    .on_press(Message::PickFolder),
            ]
            .spacing(10)
            .align_y(Alignment::Center),
            self.previews(PreviewTarget::Gallery),
        ]
        .spacing(8);

        let busy = self.submitting;
        let actions = row![
            button(text(if busy { "Creating..." } else { "Create" }))
                .style(button::primary)
                .on_press_maybe((!busy).then_some(Message::SubmitAddColor)),
            button(text("Close"))
                .style(button::secondary)
                .on_press_maybe((!busy).then_some(Message::CloseAddColor)),
        ]
        .spacing(10);

        container(
            column![
                text(format!("New color in {}", self.group_slug)).size(20),
                name,
                cover,
                gallery,
                actions
            ]
            .spacing(16)
            .max_width(640),
        )
        .padding(24)
        .style(container::rounded_box)
        .into()
    }

    fn previews(&self, target: PreviewTarget) -> Element<'_, Message> {
        let tiles = self
            .set(target)
            .slots()
            .iter()
            .enumerate()
            .map(|(index, slot)| {
                column![
                    thumbnail(self.handles.get(&slot.path), PREVIEW_TILE),
                    row![
                        text(&slot.key.name).size(11).width(Length::Fixed(PREVIEW_TILE - 20.0)),
                        button(text("✕").size(11))
                            .style(button::text)
                            .on_press(Message::RemovePreview(target, index)),
                    ]
                    .align_y(Alignment::Center),
                ]
                .spacing(4)
                .into()
            })
            .collect();
        scrollable(Wrap::with_elements(tiles).spacing(8.0).line_spacing(8.0))
            .height(Length::Shrink)
            .into()
    }
}

/// Send a validated form: queued color deletes first, then the color, its
/// cover and its gallery. Returns the reloaded catalog.
pub async fn submit(
    api: Arc<dyn CatalogApi>,
    deletes: Vec<PendingOperation>,
    submission: Submission,
    section: Section,
) -> ApiResult<Vec<Group>> {
    apply_deletes_only(api.clone(), deletes).await;
    let color = api.create_color(&submission.group_slug, &submission.name).await?;
    info!(color_id = color.id, group = %submission.group_slug, "color created");
    if let Some(cover) = submission.presentation {
        api.upload_images(color.id, &[cover], true).await?;
    }
    if !submission.gallery.is_empty() {
        api.upload_images(color.id, &submission.gallery, false).await?;
    }
    api.list_groups(section).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{Call, FakeBackend};
    use crate::state::data::{find_color, fixtures};

    fn touch(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    fn preview() -> PreviewImage {
        PreviewImage { width: 1, height: 1, rgba: vec![0, 0, 0, 255] }
    }

    #[test]
    fn empty_name_is_rejected_without_locking() {
        let mut form = AddColorForm::new("bois".into());
        form.name = "   ".into();
        assert!(matches!(form.begin_submit(&fixtures::catalog()), Err(EditError::EmptyName)));
        assert!(!form.is_submitting());
    }

    #[test]
    fn unknown_group_is_rejected() {
        let mut form = AddColorForm::new("gone".into());
        form.name = "Gris".into();
        assert!(matches!(
            form.begin_submit(&fixtures::catalog()),
            Err(EditError::UnknownGroup(slug)) if slug == "gone"
        ));
    }

    #[test]
    fn second_submit_is_ignored_while_running() {
        let mut form = AddColorForm::new("bois".into());
        form.name = " Gris ".into();
        let first = form.begin_submit(&fixtures::catalog()).unwrap().unwrap();
        assert_eq!(first.name, "Gris");
        assert_eq!(form.begin_submit(&fixtures::catalog()).unwrap(), None);

        form.submit_failed();
        assert!(form.begin_submit(&fixtures::catalog()).unwrap().is_some());
    }

    #[test]
    fn picking_and_removing_files_releases_previews() {
        let dir = tempfile::tempdir().unwrap();
        let a = touch(dir.path(), "a.jpg", b"a");
        let b = touch(dir.path(), "b.jpg", b"bb");
        let mut form = AddColorForm::new("bois".into());

        let to_render = form.add_files(PreviewTarget::Gallery, vec![a.clone(), b.clone(), a.clone()]);
        assert_eq!(to_render, vec![a.clone(), b.clone()]);
        form.set_preview(&a, Some(preview()));
        form.set_preview(&b, Some(preview()));
        assert_eq!(form.handles.len(), 2);

        form.remove(PreviewTarget::Gallery, 0);
        assert_eq!(form.gallery.paths(), vec![b]);
        assert_eq!(form.handles.len(), 1);
        assert!(!form.handles.contains_key(&a));
    }

    #[test]
    fn cover_input_keeps_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let a = touch(dir.path(), "a.jpg", b"a");
        let b = touch(dir.path(), "b.jpg", b"bb");
        let mut form = AddColorForm::new("bois".into());

        form.add_files(PreviewTarget::Presentation, vec![a.clone()]);
        form.set_preview(&a, Some(preview()));
        form.add_files(PreviewTarget::Presentation, vec![b.clone()]);

        assert_eq!(form.presentation.paths(), vec![b]);
        assert!(form.handles.is_empty());
    }

    #[test]
    fn late_preview_for_removed_file_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let a = touch(dir.path(), "a.jpg", b"a");
        let mut form = AddColorForm::new("bois".into());
        form.add_files(PreviewTarget::Gallery, vec![a.clone()]);
        form.remove(PreviewTarget::Gallery, 0);

        form.set_preview(&a, Some(preview()));

        assert!(form.handles.is_empty());
    }

    #[tokio::test]
    async fn submit_creates_color_then_uploads() {
        let api = Arc::new(FakeBackend::with_groups(fixtures::catalog()));
        let submission = Submission {
            group_slug: "uni".into(),
            name: "Gris".into(),
            presentation: Some(PathBuf::from("cover.jpg")),
            gallery: vec![PathBuf::from("1.jpg"), PathBuf::from("2.jpg")],
        };
        let deletes = vec![PendingOperation::ColorDelete { color_id: 1 }];

        let groups = submit(api.clone(), deletes, submission, Section::Facades).await.unwrap();

        let writes = api.writes();
        assert_eq!(writes[0], Call::DeleteColor(1));
        assert_eq!(writes[1], Call::CreateColor("uni".into(), "Gris".into()));
        assert!(matches!(writes[2], Call::Upload { files: 1, is_presentation: true, .. }));
        assert!(matches!(writes[3], Call::Upload { files: 2, is_presentation: false, .. }));
        assert!(groups[1].colors.iter().any(|c| c.name == "Gris"));
        assert!(find_color(&groups, 1).is_none());
    }

    #[tokio::test]
    async fn failed_creation_uploads_nothing() {
        let api = Arc::new(FakeBackend::with_groups(fixtures::catalog()));
        api.fail_when(|call| matches!(call, Call::CreateColor(..)));
        let submission = Submission {
            group_slug: "uni".into(),
            name: "Gris".into(),
            presentation: Some(PathBuf::from("cover.jpg")),
            gallery: Vec::new(),
        };

        assert!(submit(api.clone(), Vec::new(), submission, Section::Facades).await.is_err());
        assert!(!api.writes().iter().any(|c| matches!(c, Call::Upload { .. })));
    }
}
