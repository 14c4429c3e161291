use image::RgbImage;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use yolo2coco::ids::{FixedClock, MAX_ID, MIN_ID};
use yolo2coco::{
    build_coco_dataset, process_all_images, process_coco_dataset, verify_all_annotations,
    verify_annotation_file, CocoConfig, ConvertError, IdGenerator, VerifyError,
};

struct Fixture {
    _root: TempDir,
    images: PathBuf,
    labels: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let images = root.path().join("images");
        let labels = root.path().join("labels");
        fs::create_dir_all(&images).unwrap();
        fs::create_dir_all(&labels).unwrap();
        Self {
            _root: root,
            images,
            labels,
        }
    }

    fn image(&self, name: &str, width: u32, height: u32) -> PathBuf {
        let path = self.images.join(name);
        RgbImage::new(width, height).save(&path).unwrap();
        path
    }

    fn label(&self, stem: &str, content: &str) {
        fs::write(self.labels.join(format!("{}.txt", stem)), content).unwrap();
    }

    fn document(&self, stem: &str) -> PathBuf {
        self.images.join(format!("{}.json", stem))
    }

    fn generate(&self, seed: u64) {
        let mut ids = IdGenerator::with_parts(StdRng::seed_from_u64(seed), FixedClock(1_720_000_042));
        let stats = process_all_images(&self.images, &self.labels, &self.images, &mut ids).unwrap();
        assert_eq!(stats.failed_images, 0);
    }
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn write_json(path: &Path, value: &Value) {
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

#[test]
fn dataset_with_missing_label_file() {
    let fixture = Fixture::new();
    fixture.image("a.jpg", 640, 640);
    fixture.image("b.jpg", 640, 640);
    fixture.label("a", "0 0.5 0.5 0.2 0.4\n0 0.25 0.25 0.1 0.1\n");

    let (coco, stats) =
        build_coco_dataset(&fixture.images, &fixture.labels, &CocoConfig::default()).unwrap();

    assert_eq!(coco.images.len(), 2);
    assert_eq!(coco.annotations.len(), 2);
    assert!(coco.annotations.iter().all(|a| a.image_id == 1));
    assert_eq!(coco.images[0].file_name, "a.jpg");
    assert_eq!(coco.images[1].file_name, "b.jpg");
    assert_eq!(coco.images[1].id, 2);
    assert_eq!(stats.missing_labels, 1);

    let first = &coco.annotations[0];
    assert_eq!(first.id, 1);
    assert_eq!(first.bbox, [256.0, 192.0, 128.0, 256.0]);
    assert_eq!(first.area, 32768.0);
    assert_eq!(first.iscrowd, Some(0));
}

#[test]
fn dataset_ids_follow_sorted_names_and_run_across_images() {
    let fixture = Fixture::new();
    fixture.image("c.jpg", 64, 32);
    fixture.image("a.jpg", 64, 32);
    fixture.image("b.jpg", 64, 32);
    fixture.label("a", "2 0.5 0.5 0.5 0.5\n");
    fixture.label("b", "1 0.5 0.5 0.5 0.5\n3 0.5 0.5 0.25 0.25\n");
    fixture.label("c", "0 0.5 0.5 1.0 1.0\n");

    let (coco, _) =
        build_coco_dataset(&fixture.images, &fixture.labels, &CocoConfig::default()).unwrap();

    let names: Vec<_> = coco.images.iter().map(|i| i.file_name.as_str()).collect();
    assert_eq!(names, ["a.jpg", "b.jpg", "c.jpg"]);
    assert_eq!(
        coco.images.iter().map(|i| i.id).collect::<Vec<_>>(),
        [1, 2, 3]
    );

    let annotation_ids: Vec<_> = coco.annotations.iter().map(|a| a.id).collect();
    assert_eq!(annotation_ids, [1, 2, 3, 4]);
    let image_ids: Vec<_> = coco.annotations.iter().map(|a| a.image_id).collect();
    assert_eq!(image_ids, [1, 2, 2, 3]);
    // Class ids pass straight through while the category list stays fixed
    let category_ids: Vec<_> = coco.annotations.iter().map(|a| a.category_id).collect();
    assert_eq!(category_ids, [2, 1, 3, 0]);
    assert_eq!(coco.categories.len(), 1);
    assert_eq!(coco.categories[0].id, 0);

    for annotation in &coco.annotations {
        assert_eq!(annotation.area, annotation.bbox[2] * annotation.bbox[3]);
    }
}

#[test]
fn dataset_written_with_expected_layout() {
    let fixture = Fixture::new();
    fixture.image("a.jpg", 40, 20);
    fixture.label("a", "0 0.5 0.5 0.5 0.5\n");
    let output = fixture.images.parent().unwrap().join("out/data.json");

    process_coco_dataset(&fixture.images, &fixture.labels, &output, &CocoConfig::default())
        .unwrap();

    let text = fs::read_to_string(&output).unwrap();
    let positions: Vec<usize> = ["\"info\"", "\"licenses\"", "\"images\"", "\"annotations\"", "\"categories\""]
        .iter()
        .map(|key| text.find(key).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));

    let value = read_json(&output);
    assert_eq!(value["images"][0]["license"], 1);
    assert_eq!(value["images"][0]["width"], 40);
    assert_eq!(value["annotations"][0]["segmentation"], Value::Array(vec![]));
    assert_eq!(value["categories"][0]["name"], "cherry");
    assert_eq!(value["licenses"][0]["name"], "CC BY 4.0");
}

#[test]
fn dataset_stops_on_malformed_label_line() {
    let fixture = Fixture::new();
    fixture.image("a.jpg", 16, 16);
    fixture.label("a", "0 0.5 0.5 0.2 0.4\n0 0.5 0.5\n");
    let output = fixture.images.join("data.json");

    let err = process_coco_dataset(&fixture.images, &fixture.labels, &output, &CocoConfig::default())
        .unwrap_err();
    match err {
        ConvertError::Label { line, .. } => assert_eq!(line, 2),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!output.exists());
}

#[test]
fn dataset_skips_undecodable_images() {
    let fixture = Fixture::new();
    fs::write(fixture.images.join("a.jpg"), b"not an image").unwrap();
    fixture.image("b.jpg", 16, 16);
    fixture.label("b", "0 0.5 0.5 0.5 0.5\n");

    let (coco, stats) =
        build_coco_dataset(&fixture.images, &fixture.labels, &CocoConfig::default()).unwrap();
    assert_eq!(stats.failed_images, 1);
    assert_eq!(coco.images.len(), 1);
    assert_eq!(coco.images[0].file_name, "b.jpg");
    assert_eq!(coco.images[0].id, 1);
    assert_eq!(coco.annotations[0].image_id, 1);
}

#[test]
fn missing_input_directory_is_reported() {
    let fixture = Fixture::new();
    let missing = fixture.images.join("missing");

    assert!(matches!(
        build_coco_dataset(&missing, &fixture.labels, &CocoConfig::default()),
        Err(ConvertError::MissingDirectory { kind: "Images", .. })
    ));

    let mut ids = IdGenerator::seeded(1);
    assert!(matches!(
        process_all_images(&fixture.images, &missing, &fixture.images, &mut ids),
        Err(ConvertError::MissingDirectory { kind: "Labels", .. })
    ));

    assert!(matches!(
        verify_all_annotations(&fixture.images, &missing, &fixture.images),
        Err(ConvertError::MissingDirectory { .. })
    ));
}

#[test]
fn generated_documents_verify() {
    let fixture = Fixture::new();
    fixture.image("a.jpg", 640, 640);
    fixture.image("b.jpg", 320, 240);
    fixture.label("a", "0 0.5 0.5 0.2 0.4\n0 0.1 0.9 0.3 0.3\n");

    fixture.generate(11);

    let a = read_json(&fixture.document("a"));
    assert_eq!(a["annotations"].as_array().unwrap().len(), 2);
    assert_eq!(a["annotations"][0]["bbox"][0], 256.0);
    assert_eq!(a["annotations"][0]["area"], 32768.0);
    for annotation in a["annotations"].as_array().unwrap() {
        let id = annotation["id"].as_u64().unwrap();
        assert!((MIN_ID..=MAX_ID).contains(&id));
        assert_eq!(annotation["image_id"], a["images"][0]["id"]);
        let bbox = annotation["bbox"].as_array().unwrap();
        let area = bbox[2].as_f64().unwrap() * bbox[3].as_f64().unwrap();
        assert_eq!(annotation["area"].as_f64().unwrap(), area);
    }

    let b = read_json(&fixture.document("b"));
    assert!(b["annotations"].as_array().unwrap().is_empty());
    assert_eq!(b["images"][0]["width"], 320);
    assert_eq!(b["images"][0]["height"], 240);

    let report = verify_all_annotations(&fixture.images, &fixture.labels, &fixture.images).unwrap();
    assert!(report.is_success(), "{:?}", report.failures);
    assert_eq!(report.total, 2);
    assert_eq!(report.verified, 2);
    assert_eq!(report.failed, 0);
}

#[test]
fn generator_writes_to_separate_output_directory() {
    let fixture = Fixture::new();
    fixture.image("a.jpg", 20, 20);
    fixture.label("a", "0 0.5 0.5 0.5 0.5\n");
    let output = fixture.images.parent().unwrap().join("json");

    let mut ids = IdGenerator::seeded(5);
    let stats = process_all_images(&fixture.images, &fixture.labels, &output, &mut ids).unwrap();
    assert_eq!(stats.processed_images, 1);
    assert_eq!(stats.annotations, 1);
    assert!(output.join("a.json").is_file());
    assert!(!fixture.document("a").exists());

    let report = verify_all_annotations(&fixture.images, &fixture.labels, &output).unwrap();
    assert!(report.is_success());
}

#[test]
fn verifier_flags_dimension_mismatch() {
    let fixture = Fixture::new();
    let image = fixture.image("a.jpg", 64, 48);
    fixture.label("a", "0 0.5 0.5 0.5 0.5\n");
    fixture.generate(2);

    let document_path = fixture.document("a");
    let mut document = read_json(&document_path);
    document["images"][0]["width"] = Value::from(65);
    write_json(&document_path, &document);

    let result = verify_annotation_file(&image, &fixture.labels.join("a.txt"), &document_path);
    assert!(matches!(
        result,
        Err(VerifyError::DimensionMismatch {
            expected_width: 64,
            expected_height: 48,
            ..
        })
    ));

    let report = verify_all_annotations(&fixture.images, &fixture.labels, &fixture.images).unwrap();
    assert!(!report.is_success());
    assert_eq!(report.failed, 1);
    assert_eq!(report.failures[0].file_name, "a.jpg");
}

#[test]
fn verifier_flags_tampered_annotations() {
    let fixture = Fixture::new();
    let image = fixture.image("a.jpg", 100, 100);
    let labels = fixture.labels.join("a.txt");
    fixture.label("a", "0 0.5 0.5 0.2 0.2\n");
    fixture.generate(4);
    let document_path = fixture.document("a");
    let original = read_json(&document_path);

    // A shift below the tolerance still passes
    let mut document = original.clone();
    document["annotations"][0]["bbox"][0] = Value::from(40.005);
    write_json(&document_path, &document);
    assert!(verify_annotation_file(&image, &labels, &document_path).is_ok());

    let mut document = original.clone();
    document["annotations"][0]["bbox"][1] = Value::from(41.0);
    write_json(&document_path, &document);
    assert!(matches!(
        verify_annotation_file(&image, &labels, &document_path),
        Err(VerifyError::BboxMismatch { index: 0, .. })
    ));

    let mut document = original.clone();
    document["annotations"][0]["area"] = Value::from(401.0);
    write_json(&document_path, &document);
    assert!(matches!(
        verify_annotation_file(&image, &labels, &document_path),
        Err(VerifyError::AreaMismatch { index: 0, .. })
    ));

    let mut document = original.clone();
    document["annotations"][0]["id"] = Value::from(12345);
    write_json(&document_path, &document);
    assert!(matches!(
        verify_annotation_file(&image, &labels, &document_path),
        Err(VerifyError::InvalidAnnotationId { index: 0, .. })
    ));

    let mut document = original.clone();
    document["annotations"][0]["bbox"] = serde_json::json!([40.0, 40.0, 20.0]);
    write_json(&document_path, &document);
    assert!(matches!(
        verify_annotation_file(&image, &labels, &document_path),
        Err(VerifyError::BboxFormat { index: 0, len: 3 })
    ));

    let mut document = original.clone();
    document["annotations"] = Value::Array(vec![]);
    write_json(&document_path, &document);
    assert!(matches!(
        verify_annotation_file(&image, &labels, &document_path),
        Err(VerifyError::AnnotationCount {
            expected: 1,
            found: 0
        })
    ));
}

#[test]
fn verifier_flags_document_level_problems() {
    let fixture = Fixture::new();
    let image = fixture.image("a.jpg", 30, 30);
    let labels = fixture.labels.join("a.txt");
    fixture.generate(6);
    let document_path = fixture.document("a");
    let original = read_json(&document_path);

    let mut document = original.clone();
    document.as_object_mut().unwrap().remove("categories");
    write_json(&document_path, &document);
    assert!(matches!(
        verify_annotation_file(&image, &labels, &document_path),
        Err(VerifyError::MissingKey("categories"))
    ));

    let mut document = original.clone();
    document["images"][0]["file_name"] = Value::from("other.jpg");
    write_json(&document_path, &document);
    assert!(matches!(
        verify_annotation_file(&image, &labels, &document_path),
        Err(VerifyError::FileNameMismatch { .. })
    ));

    let mut document = original.clone();
    document["images"][0]["id"] = Value::from(10_000_000_000u64);
    write_json(&document_path, &document);
    assert!(matches!(
        verify_annotation_file(&image, &labels, &document_path),
        Err(VerifyError::InvalidImageId(_))
    ));

    let mut document = original.clone();
    document["categories"][0]["name"] = Value::from("cherry");
    write_json(&document_path, &document);
    assert!(matches!(
        verify_annotation_file(&image, &labels, &document_path),
        Err(VerifyError::CategoryMismatch { .. })
    ));

    let mut document = original.clone();
    document["annotations"] = serde_json::json!([{"id": 1234567890u64, "bbox": [0.0, 0.0, 1.0, 1.0], "area": 1.0}]);
    write_json(&document_path, &document);
    assert!(matches!(
        verify_annotation_file(&image, &labels, &document_path),
        Err(VerifyError::UnexpectedAnnotations(1))
    ));

    fs::write(&document_path, "{ not json").unwrap();
    assert!(matches!(
        verify_annotation_file(&image, &labels, &document_path),
        Err(VerifyError::Parse(_))
    ));

    fs::remove_file(&document_path).unwrap();
    assert!(matches!(
        verify_annotation_file(&image, &labels, &document_path),
        Err(VerifyError::MissingDocument(_))
    ));
}

#[test]
fn hidden_resource_forks_are_not_images() {
    let fixture = Fixture::new();
    fixture.image("a.jpg", 16, 16);
    fs::write(fixture.images.join("._a.jpg"), b"\x00\x05\x16\x07 resource fork").unwrap();
    fixture.label("a", "0 0.5 0.5 0.5 0.5\n");

    let (coco, stats) =
        build_coco_dataset(&fixture.images, &fixture.labels, &CocoConfig::default()).unwrap();
    assert_eq!(stats.total_images, 1);
    assert_eq!(stats.failed_images, 0);
    assert_eq!(coco.images.len(), 1);

    let mut ids = IdGenerator::with_parts(StdRng::seed_from_u64(8), FixedClock(1_720_000_042));
    let stats = process_all_images(&fixture.images, &fixture.labels, &fixture.images, &mut ids).unwrap();
    assert_eq!(stats.total_images, 1);
    assert_eq!(stats.failed_images, 0);
    assert!(!fixture.document("._a").exists());

    let report = verify_all_annotations(&fixture.images, &fixture.labels, &fixture.images).unwrap();
    assert_eq!(report.total, 1);
    assert!(report.is_success(), "{:?}", report.failures);
}

#[test]
fn negative_class_ids_still_produce_boxes() {
    let fixture = Fixture::new();
    let image = fixture.image("a.jpg", 16, 16);
    fixture.label("a", "-1 0.5 0.5 0.5 0.5\n");

    let (coco, _) =
        build_coco_dataset(&fixture.images, &fixture.labels, &CocoConfig::default()).unwrap();
    assert_eq!(coco.annotations.len(), 1);
    assert_eq!(coco.annotations[0].category_id, -1);
    assert_eq!(coco.annotations[0].bbox, [4.0, 4.0, 8.0, 8.0]);

    fixture.generate(12);
    let document = read_json(&fixture.document("a"));
    assert_eq!(document["annotations"].as_array().unwrap().len(), 1);
    assert_eq!(document["annotations"][0]["bbox"], serde_json::json!([4.0, 4.0, 8.0, 8.0]));

    assert!(verify_annotation_file(&image, &fixture.labels.join("a.txt"), &fixture.document("a")).is_ok());
}

#[test]
fn dataset_stops_on_unrepresentable_class_id() {
    let fixture = Fixture::new();
    fixture.image("a.jpg", 16, 16);
    fixture.label("a", "0 0.5 0.5 0.5 0.5\n1e30 0.5 0.5 0.5 0.5\n");

    match build_coco_dataset(&fixture.images, &fixture.labels, &CocoConfig::default()) {
        Err(ConvertError::Label { line, .. }) => assert_eq!(line, 2),
        other => panic!("unexpected result: {:?}", other.map(|(_, stats)| stats.annotations)),
    }
}

#[test]
fn undecodable_image_without_labels_counts_only_as_failed() {
    let fixture = Fixture::new();
    fs::write(fixture.images.join("a.jpg"), b"not an image").unwrap();
    fixture.image("b.jpg", 16, 16);

    let mut ids = IdGenerator::seeded(13);
    let stats = process_all_images(&fixture.images, &fixture.labels, &fixture.images, &mut ids).unwrap();
    assert_eq!(stats.total_images, 2);
    assert_eq!(stats.failed_images, 1);
    assert_eq!(stats.processed_images, 1);
    assert_eq!(stats.missing_labels, 1);
    assert!(!fixture.document("a").exists());
}
