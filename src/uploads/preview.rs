use image::imageops::FilterType;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

/// Size of generated previews (square bound)
const PREVIEW_SIZE: u32 = 160;

/// Decoded preview pixels, ready for `image::Handle::from_rgba`
#[derive(Clone, PartialEq, Eq)]
pub struct PreviewImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl std::fmt::Debug for PreviewImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// Decode a local image and shrink it to preview size
/// Returns None if the file cannot be read or decoded
pub fn render_preview(path: &Path) -> Option<PreviewImage> {
    let img = match image::open(path) {
        Ok(img) => img,
        Err(e) => {
            warn!(path = %path.display(), "cannot decode preview: {e}");
            return None;
        }
    };
    let thumbnail = img.resize(PREVIEW_SIZE, PREVIEW_SIZE, FilterType::Lanczos3).to_rgba8();
    debug!(path = %path.display(), "preview rendered");
    Some(PreviewImage {
        width: thumbnail.width(),
        height: thumbnail.height(),
        rgba: thumbnail.into_raw(),
    })
}

/// Render a preview off the UI thread
pub async fn load_preview(path: PathBuf) -> (PathBuf, Option<PreviewImage>) {
    let task_path = path.clone();
    match tokio::task::spawn_blocking(move || render_preview(&task_path)).await {
        Ok(preview) => (path, preview),
        Err(e) => {
            warn!("preview task failed: {e}");
            (path, None)
        }
    }
}

/// Identity of a picked file: name, size and modification time
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileKey {
    pub name: String,
    pub size: u64,
    pub modified: Option<SystemTime>,
}

impl FileKey {
    pub fn of(path: &Path) -> Self {
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let meta = std::fs::metadata(path).ok();
        Self {
            name,
            size: meta.as_ref().map(|m| m.len()).unwrap_or_default(),
            modified: meta.and_then(|m| m.modified().ok()),
        }
    }
}

/// One chosen file and its preview, `None` until decoded
#[derive(Debug, Clone)]
pub struct PreviewSlot {
    pub key: FileKey,
    pub path: PathBuf,
    pub image: Option<PreviewImage>,
}

/// Chosen files of one input of the add-color form
#[derive(Debug, Clone, Default)]
pub struct PreviewSet {
    slots: Vec<PreviewSlot>,
    /// A single-file input replaces its file instead of adding one
    single: bool,
}

impl PreviewSet {
    pub fn multiple() -> Self {
        Self::default()
    }

    pub fn single() -> Self {
        Self { slots: Vec::new(), single: true }
    }

    /// Add `path` unless an identical file is already chosen.
    /// Returns whether a preview needs rendering.
    pub fn add(&mut self, path: PathBuf) -> bool {
        let key = FileKey::of(&path);
        if self.slots.iter().any(|slot| slot.key == key) {
            debug!(name = %key.name, "file already chosen");
            return false;
        }
        if self.single {
            self.clear();
        }
        self.slots.push(PreviewSlot { key, path, image: None });
        true
    }

    /// Attach a decoded preview. Ignored if the file was removed meanwhile.
    pub fn set_image(&mut self, path: &Path, image: Option<PreviewImage>) {
        if let Some(slot) = self.slots.iter_mut().find(|slot| slot.path == path) {
            slot.image = image;
        }
    }

    /// Remove the file at `index` and release its preview
    pub fn remove(&mut self, index: usize) -> Option<PathBuf> {
        (index < self.slots.len()).then(|| self.slots.remove(index).path)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn slots(&self) -> &[PreviewSlot] {
        &self.slots
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.slots.iter().map(|slot| slot.path.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[cfg(test)]
    /// Number of decoded previews currently held in memory
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.image.is_some()).count()
    }
}
