use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_IMAGES_DIR: &str = "data/images";
pub const DEFAULT_LABELS_DIR: &str = "data/labels";
pub const DEFAULT_DATASET_OUTPUT: &str = "data/data.json";

/// Convert YOLO format annotations to a single COCO format JSON file.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct ConvertArgs {
    /// Directory containing the image files
    #[arg(long = "images", default_value = DEFAULT_IMAGES_DIR)]
    pub images: PathBuf,

    /// Directory containing the YOLO format label files
    #[arg(long = "labels", default_value = DEFAULT_LABELS_DIR)]
    pub labels: PathBuf,

    /// Path to save the COCO format JSON file
    #[arg(long = "output", default_value = DEFAULT_DATASET_OUTPUT)]
    pub output: PathBuf,
}

/// Generate one COCO annotation JSON file per image.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct GenerateArgs {
    /// Directory containing the image files
    #[arg(long = "images", default_value = DEFAULT_IMAGES_DIR)]
    pub images: PathBuf,

    /// Directory containing the YOLO format label files
    #[arg(long = "labels", default_value = DEFAULT_LABELS_DIR)]
    pub labels: PathBuf,

    /// Output directory (defaults to the images directory)
    #[arg(long = "output")]
    pub output: Option<PathBuf>,

    /// Seed for the id generator; ids are random per run when omitted
    #[arg(long = "seed")]
    pub seed: Option<u64>,
}

impl GenerateArgs {
    pub fn output_dir(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| self.images.clone())
    }
}

/// Verify generated per-image annotation JSON files.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct VerifyArgs {
    /// Directory containing the image files
    #[arg(long = "images", default_value = DEFAULT_IMAGES_DIR)]
    pub images: PathBuf,

    /// Directory containing the YOLO format label files
    #[arg(long = "labels", default_value = DEFAULT_LABELS_DIR)]
    pub labels: PathBuf,

    /// Directory containing the generated JSON files (defaults to the images directory)
    #[arg(long = "documents")]
    pub documents: Option<PathBuf>,
}

impl VerifyArgs {
    pub fn documents_dir(&self) -> PathBuf {
        self.documents.clone().unwrap_or_else(|| self.images.clone())
    }
}

/// Settings for the dataset-level COCO document.
#[derive(Debug, Clone)]
pub struct CocoConfig {
    pub start_image_id: u64,
    pub start_annotation_id: u64,
    pub date_captured: String,
}

impl Default for CocoConfig {
    fn default() -> Self {
        Self {
            start_image_id: 1,
            start_annotation_id: 1,
            date_captured: "2024-04-12".to_string(),
        }
    }
}
