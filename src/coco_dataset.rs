//! Dataset-level conversion
//!
//! Builds one COCO document covering every image in a directory. Image ids
//! follow the sorted file-name order and annotation ids run sequentially
//! across the whole dataset, so the output is identical between runs.

use log::{info, warn};
use rayon::prelude::*;
use std::path::Path;

use crate::coco::{Annotation, CocoFile, Image};
use crate::config::CocoConfig;
use crate::error::ConvertError;
use crate::io::{discover_images, label_path_for};
use crate::labels::read_labels_strict;
use crate::types::{ImageRecord, ProcessingStats};
use crate::utils::{
    create_progress_bar, ensure_parent_directory, read_image_record, require_directory,
    write_json_pretty,
};

/// Build the dataset document from an images directory and a labels directory.
///
/// Images that cannot be decoded are skipped without consuming an id. A
/// missing label file leaves the image without annotations. A malformed label
/// line aborts the whole build.
pub fn build_coco_dataset(
    images_dir: &Path,
    labels_dir: &Path,
    config: &CocoConfig,
) -> Result<(CocoFile, ProcessingStats), ConvertError> {
    require_directory(images_dir, "Images")?;
    require_directory(labels_dir, "Labels")?;

    let image_paths = discover_images(images_dir)?;
    let mut stats = ProcessingStats::new();
    stats.total_images = image_paths.len();
    info!("Found {} images to convert", image_paths.len());

    // Headers are read in parallel; collect keeps the sorted order
    let records: Vec<_> = image_paths
        .par_iter()
        .map(|path| read_image_record(path))
        .collect();

    let mut coco = CocoFile::default();
    let mut next_image_id = config.start_image_id;
    let mut next_annotation_id = config.start_annotation_id;

    let pb = create_progress_bar(records.len() as u64, "Convert");
    for record in records {
        pb.inc(1);
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                pb.suspend(|| warn!("Skipping image: {}", e));
                stats.failed_images += 1;
                continue;
            }
        };

        let image_id = next_image_id;
        next_image_id += 1;

        let annotations =
            annotations_for_image(&record, image_id, labels_dir, &mut next_annotation_id)?;
        match annotations {
            Some(annotations) => {
                stats.annotations += annotations.len();
                coco.annotations.extend(annotations);
            }
            None => {
                pb.suspend(|| warn!("No label file found for {}", record.file_name));
                stats.missing_labels += 1;
            }
        }

        coco.images
            .push(Image::for_dataset(image_id, &record, &config.date_captured));
        stats.processed_images += 1;
    }
    pb.finish_and_clear();

    Ok((coco, stats))
}

/// Convert the label file of one image, drawing ids from `next_annotation_id`.
///
/// Returns `None` when the image has no label file.
fn annotations_for_image(
    record: &ImageRecord,
    image_id: u64,
    labels_dir: &Path,
    next_annotation_id: &mut u64,
) -> Result<Option<Vec<Annotation>>, ConvertError> {
    let label_path = label_path_for(&record.path, labels_dir);
    if !label_path.is_file() {
        return Ok(None);
    }

    let annotations = read_labels_strict(&label_path)?
        .into_iter()
        .map(|(category_id, label)| {
            let bbox = label.to_absolute(record.width, record.height);
            let id = *next_annotation_id;
            *next_annotation_id += 1;
            // The YOLO class id is carried over as the category id
            Annotation::new(id, image_id, category_id, &bbox).with_iscrowd(0)
        })
        .collect();
    Ok(Some(annotations))
}

/// Build the dataset document and write it to `output`.
pub fn process_coco_dataset(
    images_dir: &Path,
    labels_dir: &Path,
    output: &Path,
    config: &CocoConfig,
) -> Result<ProcessingStats, ConvertError> {
    let (coco, stats) = build_coco_dataset(images_dir, labels_dir, config)?;

    ensure_parent_directory(output)?;
    write_json_pretty(output, &coco)?;
    info!(
        "Wrote {} images and {} annotations to {}",
        coco.images.len(),
        coco.annotations.len(),
        output.display()
    );
    Ok(stats)
}
