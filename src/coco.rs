//! COCO format data structures
//!
//! Two document shapes are produced: [`CocoFile`], one document covering a
//! whole dataset, and [`IndividualFile`], one document per image with
//! synthetic ids and extra file metadata.

use serde::{Deserialize, Serialize};

use crate::types::{AbsoluteBox, ImageRecord};

/// Name of the single category written to per-image documents.
pub const INDIVIDUAL_CATEGORY_NAME: &str = "AppleBBCH81";
/// Supercategory of the single category written to per-image documents.
pub const INDIVIDUAL_SUPERCATEGORY: &str = "apple";

/// Keys every per-image document must have.
pub const INDIVIDUAL_REQUIRED_KEYS: [&str; 4] = ["info", "images", "annotations", "categories"];

/// COCO dataset information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    pub description: String,
    pub version: String,
    pub year: u32,
    pub contributor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbch_stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<InfoLicense>,
}

impl Info {
    /// Metadata of the dataset-level document.
    pub fn dataset() -> Self {
        Self {
            description: "CherryBBCH81 Dataset - Cherry fruit images captured during the beginning of fruit coloration (BBCH stage 81) in the LatHort orchard in Dobele, Latvia".to_string(),
            version: "1.0".to_string(),
            year: 2024,
            contributor: "Apeināns, I., Sondors, M., Litavniece, L., Kodors, S., Zarembo, I., Feldmane, D.".to_string(),
            date_created: Some("2024/06/27".to_string()),
            url: Some("https://www.kaggle.com/datasets/projectlzp201910094/cfruitlets81-640".to_string()),
            image_size: Some("640x640".to_string()),
            bbch_stage: Some(
                "81 - beginning of ripening: berries begin to develop variety-specific colour"
                    .to_string(),
            ),
            source: None,
            license: None,
        }
    }

    /// Metadata of each per-image document.
    pub fn individual() -> Self {
        Self {
            description: "data".to_string(),
            version: "1.0".to_string(),
            year: 2025,
            contributor: "search engine".to_string(),
            date_created: None,
            url: None,
            image_size: None,
            bbch_stage: None,
            source: Some("augmented".to_string()),
            license: Some(InfoLicense {
                name: "Creative Commons Attribution 4.0 International".to_string(),
                url: "https://creativecommons.org/licenses/by/4.0/".to_string(),
            }),
        }
    }
}

/// License embedded in the `info` block of per-image documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoLicense {
    pub name: String,
    pub url: String,
}

/// COCO license information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct License {
    pub id: u32,
    pub name: String,
    pub url: String,
}

impl Default for License {
    fn default() -> Self {
        Self {
            id: 1,
            name: "CC BY 4.0".to_string(),
            url: "https://creativecommons.org/licenses/by/4.0/".to_string(),
        }
    }
}

/// COCO category information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub supercategory: String,
}

impl Category {
    /// The fixed category of the dataset-level document.
    pub fn dataset() -> Self {
        Self {
            id: 0,
            name: "cherry".to_string(),
            supercategory: "fruit".to_string(),
        }
    }

    /// The category of a per-image document, under a freshly generated id.
    pub fn individual(id: i64) -> Self {
        Self {
            id,
            name: INDIVIDUAL_CATEGORY_NAME.to_string(),
            supercategory: INDIVIDUAL_SUPERCATEGORY.to_string(),
        }
    }
}

/// COCO image information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<u32>,
    pub file_name: String,
    pub height: u32,
    pub width: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_captured: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Image {
    /// Image entry of the dataset-level document.
    pub fn for_dataset(id: u64, record: &ImageRecord, date_captured: &str) -> Self {
        Self {
            id,
            license: Some(1),
            file_name: record.file_name.clone(),
            height: record.height,
            width: record.width,
            date_captured: Some(date_captured.to_string()),
            size: None,
            format: None,
            url: None,
            hash: None,
            status: None,
        }
    }

    /// Image entry of a per-image document, with file metadata.
    pub fn for_individual(id: u64, record: &ImageRecord) -> Self {
        Self {
            id,
            license: None,
            file_name: record.file_name.clone(),
            height: record.height,
            width: record.width,
            date_captured: None,
            size: Some(record.file_size),
            format: Some(record.format_name()),
            url: Some(String::new()),
            hash: Some(String::new()),
            status: Some("success".to_string()),
        }
    }
}

/// COCO annotation information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    pub id: u64,
    pub image_id: u64,
    pub category_id: i64,
    pub bbox: [f64; 4], // [x, y, width, height]
    pub area: f64,
    pub segmentation: Vec<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iscrowd: Option<u32>,
}

impl Annotation {
    /// Build an annotation whose area is derived from the box.
    pub fn new(id: u64, image_id: u64, category_id: i64, bbox: &AbsoluteBox) -> Self {
        Self {
            id,
            image_id,
            category_id,
            bbox: bbox.to_array(),
            area: bbox.area(),
            segmentation: Vec::new(),
            iscrowd: None,
        }
    }

    pub fn with_iscrowd(mut self, iscrowd: u32) -> Self {
        self.iscrowd = Some(iscrowd);
        self
    }
}

/// Complete COCO dataset structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CocoFile {
    pub info: Info,
    pub licenses: Vec<License>,
    pub images: Vec<Image>,
    pub annotations: Vec<Annotation>,
    pub categories: Vec<Category>,
}

impl Default for CocoFile {
    fn default() -> Self {
        Self {
            info: Info::dataset(),
            licenses: vec![License::default()],
            images: Vec::new(),
            annotations: Vec::new(),
            categories: vec![Category::dataset()],
        }
    }
}

/// Per-image COCO document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndividualFile {
    pub info: Info,
    pub images: Vec<Image>,
    pub annotations: Vec<Annotation>,
    pub categories: Vec<Category>,
}

impl IndividualFile {
    pub fn new(image: Image, category: Category) -> Self {
        Self {
            info: Info::individual(),
            images: vec![image],
            annotations: Vec::new(),
            categories: vec![category],
        }
    }
}
