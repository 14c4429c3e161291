use glob::{glob_with, MatchOptions, Pattern};
use log::warn;
use std::path::{Path, PathBuf};

use crate::error::ConvertError;
use crate::types::{DOCUMENT_EXTENSION, IMAGE_EXTENSION, LABEL_EXTENSION};

/// List the non-hidden `*.jpg` files directly inside `images_dir`, sorted by
/// file name.
pub fn discover_images(images_dir: &Path) -> Result<Vec<PathBuf>, ConvertError> {
    let pattern = format!(
        "{}/*.{}",
        Pattern::escape(&images_dir.to_string_lossy()),
        IMAGE_EXTENSION
    );
    // Hidden files such as macOS "._name.jpg" resource forks are not images
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };
    let mut images: Vec<PathBuf> = glob_with(&pattern, options)?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Skipping unreadable directory entry: {}", e);
                None
            }
        })
        .filter(|path| path.is_file())
        .collect();
    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(images)
}

fn sibling_path(image_path: &Path, dir: &Path, extension: &str) -> PathBuf {
    // Only the last extension is replaced: "a.b.jpg" maps to "a.b.txt"
    let mut name = image_path.file_stem().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(extension);
    dir.join(name)
}

/// `<labels_dir>/<stem>.txt` for an image.
pub fn label_path_for(image_path: &Path, labels_dir: &Path) -> PathBuf {
    sibling_path(image_path, labels_dir, LABEL_EXTENSION)
}

/// `<documents_dir>/<stem>.json` for an image.
pub fn document_path_for(image_path: &Path, documents_dir: &Path) -> PathBuf {
    sibling_path(image_path, documents_dir, DOCUMENT_EXTENSION)
}
