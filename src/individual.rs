//! Per-image conversion
//!
//! Writes one COCO document next to every image. Ids are synthetic ten-digit
//! numbers from [`IdGenerator`], so documents from different runs never share
//! a numbering scheme.

use log::{error, info};
use rand::Rng;
use std::fs;
use std::path::Path;

use crate::coco::{Annotation, Category, Image, IndividualFile};
use crate::error::ConvertError;
use crate::ids::{Clock, IdGenerator};
use crate::io::{discover_images, document_path_for, label_path_for};
use crate::labels::read_labels_lenient;
use crate::types::{ImageRecord, ProcessingStats};
use crate::utils::{read_image_record, require_directory, write_json_pretty};

/// Build the document for one image.
///
/// `label_path` need not exist; the document then has no annotations.
pub fn build_individual_file<R: Rng, C: Clock>(
    record: &ImageRecord,
    label_path: &Path,
    ids: &mut IdGenerator<R, C>,
) -> Result<IndividualFile, ConvertError> {
    let image_id = ids.next_id();
    // Generated ids never exceed MAX_ID, which fits in i64
    let category_id = ids.next_id() as i64;
    let mut document = IndividualFile::new(
        Image::for_individual(image_id, record),
        Category::individual(category_id),
    );

    if label_path.is_file() {
        for label in read_labels_lenient(label_path)? {
            let bbox = label.to_absolute(record.width, record.height);
            document
                .annotations
                .push(Annotation::new(ids.next_id(), image_id, category_id, &bbox));
        }
    }

    Ok(document)
}

/// Read one image and its labels and write its document into `output_dir`.
///
/// Returns the number of annotations written.
pub fn generate_annotation_file<R: Rng, C: Clock>(
    image_path: &Path,
    labels_dir: &Path,
    output_dir: &Path,
    ids: &mut IdGenerator<R, C>,
) -> Result<usize, ConvertError> {
    let record = read_image_record(image_path)?;
    let label_path = label_path_for(image_path, labels_dir);
    let document = build_individual_file(&record, &label_path, ids)?;

    let output_path = document_path_for(image_path, output_dir);
    write_json_pretty(&output_path, &document)?;

    info!(
        "Generated annotation for {}: {} annotations",
        record.file_name,
        document.annotations.len()
    );
    Ok(document.annotations.len())
}

/// Generate a document for every image in `images_dir`.
///
/// Per-image failures are logged and counted; only missing input
/// directories and an uncreatable output directory abort the run.
pub fn process_all_images<R: Rng, C: Clock>(
    images_dir: &Path,
    labels_dir: &Path,
    output_dir: &Path,
    ids: &mut IdGenerator<R, C>,
) -> Result<ProcessingStats, ConvertError> {
    require_directory(images_dir, "Images")?;
    require_directory(labels_dir, "Labels")?;
    fs::create_dir_all(output_dir).map_err(|e| ConvertError::io(output_dir, e))?;

    let image_paths = discover_images(images_dir)?;
    info!("Found {} images to process...", image_paths.len());

    let mut stats = ProcessingStats::new();
    stats.total_images = image_paths.len();

    for image_path in &image_paths {
        let has_labels = label_path_for(image_path, labels_dir).is_file();
        match generate_annotation_file(image_path, labels_dir, output_dir, ids) {
            Ok(count) => {
                if !has_labels {
                    stats.missing_labels += 1;
                }
                stats.processed_images += 1;
                stats.annotations += count;
            }
            Err(e) => {
                error!("Failed to generate annotation for {}: {}", image_path.display(), e);
                stats.failed_images += 1;
            }
        }
    }

    Ok(stats)
}
