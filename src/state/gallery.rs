//! Images of one color: presentation state machine and gallery order.
//!
//! Presentation changes hit the server right away and always create or
//! promote the new cover before deleting the old one, so a color is never
//! left without a cover by a half-finished change.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::data::{ColorImages, Image};
use super::ops::PendingOperation;
use super::queue::PendingQueue;
use crate::api::CatalogApi;
use crate::error::ApiResult;

/// Cover state of a color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationState {
    Missing,
    Present(i64),
}

impl PresentationState {
    pub fn of(images: &ColorImages) -> Self {
        match &images.presentation {
            Some(image) => Self::Present(image.id),
            None => Self::Missing,
        }
    }

    pub fn id(self) -> Option<i64> {
        match self {
            Self::Present(id) => Some(id),
            Self::Missing => None,
        }
    }
}

/// Gallery as shown to the user: never contains the cover
pub fn visible_gallery(images: &ColorImages) -> Vec<Image> {
    let cover = PresentationState::of(images).id();
    images
        .gallery
        .iter()
        .filter(|image| !image.is_presentation && Some(image.id) != cover)
        .cloned()
        .collect()
}

/// Images of the color open in the edit modal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorGallery {
    pub color_id: i64,
    images: ColorImages,
}

impl ColorGallery {
    pub fn new(color_id: i64, images: ColorImages) -> Self {
        Self { color_id, images }
    }

    pub fn presentation(&self) -> Option<&Image> {
        self.images.presentation.as_ref()
    }

    pub fn state(&self) -> PresentationState {
        PresentationState::of(&self.images)
    }

    pub fn visible(&self) -> Vec<Image> {
        visible_gallery(&self.images)
    }

    /// Replace the images after a reload, then put back any gallery order
    /// still waiting in `queue`
    pub fn refresh(&mut self, images: ColorImages, queue: &PendingQueue) {
        self.images = images;
        for op in queue.iter() {
            if let PendingOperation::GalleryReorder { color_id, ids } = op {
                if *color_id == self.color_id {
                    self.apply_order(ids);
                }
            }
        }
    }

    fn apply_order(&mut self, ids: &[i64]) {
        self.images
            .gallery
            .sort_by_key(|image| ids.iter().position(|id| *id == image.id).unwrap_or(usize::MAX));
    }

    /// Move a visible thumbnail from `from` to `to` and return the new
    /// visible order, or `None` if nothing moved
    pub fn move_image(&mut self, from: usize, to: usize) -> Option<Vec<i64>> {
        let mut ids: Vec<i64> = self.visible().iter().map(|image| image.id).collect();
        if from >= ids.len() || to >= ids.len() || from == to {
            return None;
        }
        let id = ids.remove(from);
        ids.insert(to, id);
        self.apply_order(&ids);
        Some(ids)
    }

    /// `i / n` label of the visible thumbnail at `index`
    pub fn counter(&self, index: usize) -> String {
        format!("{} / {}", index + 1, self.visible().len())
    }
}

pub async fn load(api: Arc<dyn CatalogApi>, color_id: i64) -> ApiResult<ColorImages> {
    api.color_images(color_id).await
}

/// Upload `file` as the new cover, then delete the previous one
pub async fn replace_presentation(
    api: Arc<dyn CatalogApi>,
    color_id: i64,
    file: PathBuf,
    previous: Option<i64>,
) -> ApiResult<ColorImages> {
    let created = api.upload_images(color_id, &[file], true).await?;
    let new_id = created.first().map(|image| image.id);
    info!(color_id, ?new_id, ?previous, "presentation image uploaded");
    if let Some(old) = previous.filter(|old| Some(*old) != new_id) {
        drop_superseded(api.as_ref(), color_id, old).await;
    }
    api.color_images(color_id).await
}

/// Make a gallery image the cover, then delete the previous cover
pub async fn promote(
    api: Arc<dyn CatalogApi>,
    color_id: i64,
    image_id: i64,
    previous: Option<i64>,
) -> ApiResult<ColorImages> {
    api.set_presentation(color_id, image_id).await?;
    info!(color_id, image_id, ?previous, "gallery image promoted");
    if let Some(old) = previous.filter(|old| *old != image_id) {
        drop_superseded(api.as_ref(), color_id, old).await;
    }
    api.color_images(color_id).await
}

async fn drop_superseded(api: &dyn CatalogApi, color_id: i64, image_id: i64) {
    match api.delete_image(color_id, image_id).await {
        Ok(()) => debug!(color_id, image_id, "previous presentation deleted"),
        Err(e) => warn!(color_id, image_id, "could not delete previous presentation: {e}"),
    }
}

pub async fn upload_gallery(
    api: Arc<dyn CatalogApi>,
    color_id: i64,
    files: Vec<PathBuf>,
) -> ApiResult<ColorImages> {
    if !files.is_empty() {
        let created = api.upload_images(color_id, &files, false).await?;
        info!(color_id, count = created.len(), "gallery images uploaded");
    }
    api.color_images(color_id).await
}

pub async fn delete_image(
    api: Arc<dyn CatalogApi>,
    color_id: i64,
    image_id: i64,
) -> ApiResult<ColorImages> {
    api.delete_image(color_id, image_id).await?;
    info!(color_id, image_id, "gallery image deleted");
    api.color_images(color_id).await
}
