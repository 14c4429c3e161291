use image::ImageReader;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::ConvertError;
use crate::types::ImageRecord;

/// Read the dimensions, size and container format of an image.
///
/// Only the header is decoded.
pub fn read_image_record(path: &Path) -> Result<ImageRecord, ConvertError> {
    let file_size = fs::metadata(path)
        .map_err(|e| ConvertError::io(path, e))?
        .len();

    let reader = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| ConvertError::io(path, e))?;
    let format = reader.format();
    let (width, height) = reader
        .into_dimensions()
        .map_err(|source| ConvertError::Image {
            path: path.to_path_buf(),
            source,
        })?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(ImageRecord {
        path: path.to_path_buf(),
        file_name,
        width,
        height,
        file_size,
        format,
    })
}

/// Serialize `value` as two-space indented JSON into `path`.
pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<(), ConvertError> {
    let file = File::create(path).map_err(|e| ConvertError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|source| ConvertError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(|e| ConvertError::io(path, e))
}

/// Fail with [`ConvertError::MissingDirectory`] unless `path` is a directory.
pub fn require_directory(path: &Path, kind: &'static str) -> Result<(), ConvertError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(ConvertError::MissingDirectory {
            kind,
            path: path.to_path_buf(),
        })
    }
}

/// Create the parent directory of `path` if it has one and it is missing.
pub fn ensure_parent_directory(path: &Path) -> Result<(), ConvertError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            fs::create_dir_all(parent).map_err(|e| ConvertError::io(parent, e))
        }
        _ => Ok(()),
    }
}

/// Create a progress bar with the given length and label
pub fn create_progress_bar(len: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template(&format!(
            "{{spinner:.green}} [{}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
            label
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}
