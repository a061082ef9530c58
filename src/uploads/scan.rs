use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

/// Extensions accepted as uploadable images
pub const IMAGE_EXTENSIONS: [&str; 8] = ["jpg", "jpeg", "png", "webp", "gif", "bmp", "tif", "tiff"];

pub fn is_image(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Collect every image file under `folder`, sorted by path
pub fn scan_folder(folder: &Path) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = WalkDir::new(folder)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && is_image(path))
        .collect();
    found.sort();
    info!(folder = %folder.display(), count = found.len(), "folder scanned for images");
    found
}

/// Scan on a blocking thread so large trees do not stall the UI
pub async fn scan_folder_async(folder: PathBuf) -> Vec<PathBuf> {
    match tokio::task::spawn_blocking(move || scan_folder(&folder)).await {
        Ok(found) => found,
        Err(e) => {
            warn!("folder scan failed: {e}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_images_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("plans").join("2024");
        std::fs::create_dir_all(&nested).unwrap();
        for path in [
            dir.path().join("a.JPG"),
            dir.path().join("notes.txt"),
            nested.join("b.png"),
            nested.join("c.webp"),
            nested.join("no_extension"),
        ] {
            std::fs::write(path, b"x").unwrap();
        }

        let found = scan_folder(dir.path());
        let names: Vec<String> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.JPG", "b.png", "c.webp"]);
    }

    #[test]
    fn missing_folder_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(scan_folder(&dir.path().join("gone")).is_empty());
    }
}
