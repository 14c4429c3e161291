//! Reading YOLO label files.
//!
//! Two flavours exist. The dataset converter is strict and stops on the first
//! malformed line. The per-image generator and the verifier are lenient and
//! skip lines they cannot use; both must agree on which lines count.

use log::debug;
use std::fs;
use std::path::Path;

use crate::error::{ConvertError, LabelError};
use crate::types::NormalizedBox;

const FIELD_NAMES: [&str; 5] = ["class_id", "x_center", "y_center", "width", "height"];

/// Parse one `class_id x_center y_center width height` line.
pub fn parse_label_line(line: &str) -> Result<NormalizedBox, LabelError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != FIELD_NAMES.len() {
        return Err(LabelError::FieldCount(fields.len()));
    }

    let mut values = [0.0f64; 5];
    for (slot, (field, name)) in values.iter_mut().zip(fields.iter().zip(FIELD_NAMES)) {
        *slot = field.parse().map_err(|source| LabelError::InvalidNumber {
            field: name,
            value: field.to_string(),
            source,
        })?;
    }

    Ok(NormalizedBox {
        class_id: values[0],
        x_center: values[1],
        y_center: values[2],
        width: values[3],
        height: values[4],
    })
}

/// Parse label text, failing on the first malformed non-blank line.
///
/// Besides the field checks, every class id must convert to an integer
/// category id, returned alongside the box. The error carries the 1-based
/// line number.
pub fn parse_labels_strict(
    content: &str,
) -> Result<Vec<(i64, NormalizedBox)>, (usize, LabelError)> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            parse_label_line(line)
                .and_then(|label| label.category_id().map(|id| (id, label)))
                .map_err(|e| (idx + 1, e))
        })
        .collect()
}

/// Parse label text, silently dropping lines that are not exactly five numbers.
///
/// The class id is not inspected; callers of this parser never use it.
pub fn parse_labels_lenient(content: &str) -> Vec<NormalizedBox> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(idx, line)| match parse_label_line(line) {
            Ok(label) => Some(label),
            Err(e) => {
                debug!("Skipping label line {}: {}", idx + 1, e);
                None
            }
        })
        .collect()
}

/// Read a label file with the strict parser.
pub fn read_labels_strict(path: &Path) -> Result<Vec<(i64, NormalizedBox)>, ConvertError> {
    let content = fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))?;
    parse_labels_strict(&content).map_err(|(line, source)| ConvertError::Label {
        path: path.to_path_buf(),
        line,
        source,
    })
}

/// Read a label file with the lenient parser.
pub fn read_labels_lenient(path: &Path) -> Result<Vec<NormalizedBox>, ConvertError> {
    let content = fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))?;
    Ok(parse_labels_lenient(&content))
}
