//! YOLO to COCO annotation converter
//!
//! This library converts YOLO detection labels (normalized center boxes) into
//! COCO documents (absolute corner boxes), either as one dataset-wide file or
//! as one file per image, and verifies per-image files against their sources.

pub mod coco;
pub mod coco_dataset;
pub mod config;
pub mod conversion;
pub mod error;
pub mod ids;
pub mod individual;
pub mod io;
pub mod labels;
pub mod types;
pub mod utils;
pub mod verify;

// Re-export commonly used types and functions
pub use config::{CocoConfig, ConvertArgs, GenerateArgs, VerifyArgs};
pub use conversion::yolo_to_coco_bbox;
pub use error::{ConvertError, LabelError};
pub use ids::{generate_unique_id, IdGenerator};
pub use types::{AbsoluteBox, ImageRecord, NormalizedBox, ProcessingStats};

pub use coco::{CocoFile, IndividualFile};
pub use coco_dataset::{build_coco_dataset, process_coco_dataset};
pub use individual::{build_individual_file, generate_annotation_file, process_all_images};
pub use verify::{verify_all_annotations, verify_annotation_file, VerificationReport, VerifyError};

/// Route log output to stdout with `info` as the default level.
pub fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .init();
}
