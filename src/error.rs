//! Error types shared by the conversion tools.

use std::num::ParseFloatError;
use std::path::PathBuf;
use thiserror::Error;

/// A single YOLO label line that could not be turned into a box.
#[derive(Debug, Error)]
pub enum LabelError {
    #[error("expected 5 fields, found {0}")]
    FieldCount(usize),
    #[error("field {field} is not a number: {value:?}")]
    InvalidNumber {
        field: &'static str,
        value: String,
        #[source]
        source: ParseFloatError,
    },
    #[error("class id is not a representable integer: {0}")]
    InvalidClassId(f64),
}

/// Errors that abort a conversion run.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("{kind} directory '{}' does not exist", .path.display())]
    MissingDirectory { kind: &'static str, path: PathBuf },
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read image {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to write JSON to {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed label in {} at line {line}: {source}", .path.display())]
    Label {
        path: PathBuf,
        line: usize,
        #[source]
        source: LabelError,
    },
    #[error("invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

impl ConvertError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
