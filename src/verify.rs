//! Consistency checks for per-image documents.
//!
//! Every document is checked against its source image and label file by
//! recomputing the expected boxes with the same transform the generator used.
//! Checks run in a fixed order and stop at the first mismatch in a file; the
//! run itself always continues with the next file.

use log::{error, info};
use rayon::prelude::*;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::coco::{INDIVIDUAL_CATEGORY_NAME, INDIVIDUAL_REQUIRED_KEYS, INDIVIDUAL_SUPERCATEGORY};
use crate::error::ConvertError;
use crate::ids::is_valid_id;
use crate::io::{discover_images, document_path_for, label_path_for};
use crate::labels::read_labels_lenient;
use crate::types::AbsoluteBox;
use crate::utils::{read_image_record, require_directory};

/// Largest accepted absolute difference for bbox components and areas.
pub const BBOX_TOLERANCE: f64 = 0.01;

/// Why a single document failed verification.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("image file not found: {}", .0.display())]
    MissingImage(PathBuf),
    #[error("JSON annotation file not found: {}", .0.display())]
    MissingDocument(PathBuf),
    #[error("failed to read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse JSON: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("document is not a JSON object")]
    NotAnObject,
    #[error("missing required key '{0}'")]
    MissingKey(&'static str),
    #[error("malformed '{field}' section: {source}")]
    Structure {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("expected exactly 1 image, found {0}")]
    ImageCount(usize),
    #[error("filename mismatch. Expected: {expected}, Got: {found}")]
    FileNameMismatch { expected: String, found: String },
    #[error("failed to read source image: {0}")]
    ImageRead(#[source] ConvertError),
    #[error(
        "image dimensions mismatch. Expected: {expected_width}x{expected_height}, Got: {found_width}x{found_height}"
    )]
    DimensionMismatch {
        expected_width: u32,
        expected_height: u32,
        found_width: f64,
        found_height: f64,
    },
    #[error("invalid image ID format. Expected 10-digit number, got: {0}")]
    InvalidImageId(Value),
    #[error("expected exactly 1 category, found {0}")]
    CategoryCount(usize),
    #[error("invalid category. Expected: AppleBBCH81/apple, Got: {name}/{supercategory}")]
    CategoryMismatch { name: String, supercategory: String },
    #[error("failed to read label file: {0}")]
    Label(#[source] ConvertError),
    #[error("annotation count mismatch. Expected: {expected}, Got: {found}")]
    AnnotationCount { expected: usize, found: usize },
    #[error("invalid annotation ID format in annotation {index}. Expected 10-digit number, got: {id}")]
    InvalidAnnotationId { index: usize, id: Value },
    #[error("invalid bbox format in annotation {index}. Expected 4 values, got: {len}")]
    BboxFormat { index: usize, len: usize },
    #[error("bbox mismatch in annotation {index}. Expected: {expected:?}, Got: {found:?}")]
    BboxMismatch {
        index: usize,
        expected: [f64; 4],
        found: Vec<f64>,
    },
    #[error("area mismatch in annotation {index}. Expected: {expected}, Got: {found}")]
    AreaMismatch {
        index: usize,
        expected: f64,
        found: f64,
    },
    #[error("no label file found but {0} annotations exist")]
    UnexpectedAnnotations(usize),
}

#[derive(Debug, Deserialize)]
struct RecordedImage {
    id: Value,
    file_name: String,
    width: f64,
    height: f64,
}

#[derive(Debug, Deserialize)]
struct RecordedCategory {
    name: String,
    supercategory: String,
}

#[derive(Debug, Deserialize)]
struct RecordedAnnotation {
    id: Value,
    bbox: Vec<f64>,
    area: f64,
}

fn section<T: DeserializeOwned>(
    document: &Map<String, Value>,
    field: &'static str,
) -> Result<T, VerifyError> {
    // Presence was checked up front
    let value = document.get(field).cloned().unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|source| VerifyError::Structure { field, source })
}

fn has_valid_id(id: &Value) -> bool {
    id.as_u64().is_some_and(is_valid_id)
}

fn within_tolerance(a: f64, b: f64) -> bool {
    (a - b).abs() <= BBOX_TOLERANCE
}

/// Check one per-image document against its image and label file.
pub fn verify_annotation_file(
    image_path: &Path,
    label_path: &Path,
    document_path: &Path,
) -> Result<(), VerifyError> {
    if !image_path.is_file() {
        return Err(VerifyError::MissingImage(image_path.to_path_buf()));
    }
    if !document_path.is_file() {
        return Err(VerifyError::MissingDocument(document_path.to_path_buf()));
    }

    let content = fs::read_to_string(document_path).map_err(|source| VerifyError::Unreadable {
        path: document_path.to_path_buf(),
        source,
    })?;
    let document = match serde_json::from_str::<Value>(&content).map_err(VerifyError::Parse)? {
        Value::Object(map) => map,
        _ => return Err(VerifyError::NotAnObject),
    };
    if let Some(key) = INDIVIDUAL_REQUIRED_KEYS
        .iter()
        .copied()
        .find(|key| !document.contains_key(*key))
    {
        return Err(VerifyError::MissingKey(key));
    }

    // Image entry
    let images: Vec<RecordedImage> = section(&document, "images")?;
    let image = match images.as_slice() {
        [image] => image,
        _ => return Err(VerifyError::ImageCount(images.len())),
    };
    let expected_name = image_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    if image.file_name != expected_name {
        return Err(VerifyError::FileNameMismatch {
            expected: expected_name,
            found: image.file_name.clone(),
        });
    }

    let record = read_image_record(image_path).map_err(VerifyError::ImageRead)?;
    if image.width != record.width as f64 || image.height != record.height as f64 {
        return Err(VerifyError::DimensionMismatch {
            expected_width: record.width,
            expected_height: record.height,
            found_width: image.width,
            found_height: image.height,
        });
    }

    if !has_valid_id(&image.id) {
        return Err(VerifyError::InvalidImageId(image.id.clone()));
    }

    // Category
    let categories: Vec<RecordedCategory> = section(&document, "categories")?;
    let category = match categories.as_slice() {
        [category] => category,
        _ => return Err(VerifyError::CategoryCount(categories.len())),
    };
    if category.name != INDIVIDUAL_CATEGORY_NAME
        || category.supercategory != INDIVIDUAL_SUPERCATEGORY
    {
        return Err(VerifyError::CategoryMismatch {
            name: category.name.clone(),
            supercategory: category.supercategory.clone(),
        });
    }

    // Annotations
    if !label_path.is_file() {
        let annotations: Vec<Value> = section(&document, "annotations")?;
        if !annotations.is_empty() {
            return Err(VerifyError::UnexpectedAnnotations(annotations.len()));
        }
        return Ok(());
    }

    let expected: Vec<AbsoluteBox> = read_labels_lenient(label_path)
        .map_err(VerifyError::Label)?
        .iter()
        .map(|label| label.to_absolute(record.width, record.height))
        .collect();
    let annotations: Vec<RecordedAnnotation> = section(&document, "annotations")?;
    if annotations.len() != expected.len() {
        return Err(VerifyError::AnnotationCount {
            expected: expected.len(),
            found: annotations.len(),
        });
    }

    for (index, (expected_box, annotation)) in expected.iter().zip(&annotations).enumerate() {
        verify_annotation(index, expected_box, annotation)?;
    }

    Ok(())
}

fn verify_annotation(
    index: usize,
    expected: &AbsoluteBox,
    annotation: &RecordedAnnotation,
) -> Result<(), VerifyError> {
    if !has_valid_id(&annotation.id) {
        return Err(VerifyError::InvalidAnnotationId {
            index,
            id: annotation.id.clone(),
        });
    }

    if annotation.bbox.len() != 4 {
        return Err(VerifyError::BboxFormat {
            index,
            len: annotation.bbox.len(),
        });
    }

    let expected_bbox = expected.to_array();
    if !expected_bbox
        .iter()
        .zip(&annotation.bbox)
        .all(|(e, a)| within_tolerance(*e, *a))
    {
        return Err(VerifyError::BboxMismatch {
            index,
            expected: expected_bbox,
            found: annotation.bbox.clone(),
        });
    }

    let expected_area = expected.area();
    if !within_tolerance(expected_area, annotation.area) {
        return Err(VerifyError::AreaMismatch {
            index,
            expected: expected_area,
            found: annotation.area,
        });
    }

    Ok(())
}

/// A document that failed verification.
#[derive(Debug)]
pub struct FileFailure {
    pub file_name: String,
    pub document_path: PathBuf,
    pub error: VerifyError,
}

/// Outcome of a verification run.
#[derive(Debug, Default)]
pub struct VerificationReport {
    pub total: usize,
    pub verified: usize,
    pub failed: usize,
    pub failures: Vec<FileFailure>,
}

impl VerificationReport {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    pub fn print_summary(&self) {
        info!("Verification completed:");
        info!("Total files: {}", self.total);
        info!("Verified: {}", self.verified);
        info!("Failed: {}", self.failed);
        if self.is_success() {
            info!("SUCCESS: All annotation files are correct!");
        } else {
            error!("ERROR: Some annotation files have issues!");
        }
    }
}

/// Verify the document of every image in `images_dir`.
///
/// Documents are looked up as `<documents_dir>/<stem>.json` and labels as
/// `<labels_dir>/<stem>.txt`. Files are checked in parallel and reported in
/// sorted order.
pub fn verify_all_annotations(
    images_dir: &Path,
    labels_dir: &Path,
    documents_dir: &Path,
) -> Result<VerificationReport, ConvertError> {
    require_directory(images_dir, "Images")?;
    require_directory(labels_dir, "Labels")?;

    let image_paths = discover_images(images_dir)?;
    info!(
        "Starting verification of {} annotation files...",
        image_paths.len()
    );

    let outcomes: Vec<_> = image_paths
        .par_iter()
        .map(|image_path| {
            let document_path = document_path_for(image_path, documents_dir);
            let result = verify_annotation_file(
                image_path,
                &label_path_for(image_path, labels_dir),
                &document_path,
            );
            (image_path, document_path, result)
        })
        .collect();

    let mut report = VerificationReport {
        total: image_paths.len(),
        ..Default::default()
    };
    for (image_path, document_path, result) in outcomes {
        let file_name = image_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        match result {
            Ok(()) => report.verified += 1,
            Err(e) => {
                error!("ERROR: {} in {}", e, document_path.display());
                error!("FAILED: {}", file_name);
                report.failed += 1;
                report.failures.push(FileFailure {
                    file_name,
                    document_path,
                    error: e,
                });
            }
        }
    }

    Ok(report)
}
