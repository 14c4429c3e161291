use image::ImageFormat;
use std::path::PathBuf;

use crate::error::LabelError;

// Extension of the image files picked up from the images directory
pub const IMAGE_EXTENSION: &str = "jpg";

// Extension of the YOLO label files
pub const LABEL_EXTENSION: &str = "txt";

// Extension of the per-image COCO documents
pub const DOCUMENT_EXTENSION: &str = "json";

/// One YOLO label line: class id plus a box normalized to the image size.
///
/// The class id is kept as written; see [`NormalizedBox::category_id`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedBox {
    pub class_id: f64,
    pub x_center: f64,
    pub y_center: f64,
    pub width: f64,
    pub height: f64,
}

/// A COCO box in pixels, anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbsoluteBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl NormalizedBox {
    /// The class id as an integer category id.
    ///
    /// Fractions are truncated toward zero, so `"1.0"` gives 1 and `"-1"`
    /// gives -1. Values that are not finite or fall outside `i64` are errors.
    pub fn category_id(&self) -> Result<i64, LabelError> {
        let class_id = self.class_id.trunc();
        // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound
        if class_id >= i64::MIN as f64 && class_id < i64::MAX as f64 {
            Ok(class_id as i64)
        } else {
            Err(LabelError::InvalidClassId(self.class_id))
        }
    }
}

impl AbsoluteBox {
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// COCO `[x, y, width, height]` ordering.
    pub fn to_array(&self) -> [f64; 4] {
        [self.x, self.y, self.width, self.height]
    }
}

/// What we know about an image file after reading its header.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    pub path: PathBuf,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub file_size: u64,
    pub format: Option<ImageFormat>,
}

impl ImageRecord {
    /// Upper-case container name such as `JPEG` or `PNG`.
    pub fn format_name(&self) -> String {
        match self.format {
            Some(format) => format!("{:?}", format).to_uppercase(),
            None => "UNKNOWN".to_string(),
        }
    }
}

// Struct to hold processing statistics
#[derive(Debug, Default, Clone)]
pub struct ProcessingStats {
    pub total_images: usize,
    pub processed_images: usize,
    pub missing_labels: usize,
    pub failed_images: usize,
    pub annotations: usize,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn print_summary(&self) {
        log::info!("=== Processing Summary ===");
        log::info!("Total images found: {}", self.total_images);
        log::info!("Images processed: {}", self.processed_images);
        log::info!("Annotations written: {}", self.annotations);
        log::info!("Images without label file: {}", self.missing_labels);
        if self.failed_images > 0 {
            log::warn!("Images skipped due to errors: {}", self.failed_images);
        }
    }
}
