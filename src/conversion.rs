//! YOLO to COCO bounding-box transform.
//!
//! Every tool in the crate goes through [`yolo_to_coco_bbox`] so that the
//! verifier recomputes boxes with exactly the same floating-point operations
//! the generators used.

use crate::types::{AbsoluteBox, NormalizedBox};

/// Convert a YOLO box `(x_center, y_center, w, h)` normalized to `[0, 1]`
/// into a COCO box `(x, y, w, h)` in pixels.
///
/// No clamping is applied. A box whose center plus or minus half its size
/// leaves `[0, 1]` yields a negative corner or a right/bottom edge past the
/// image border, and is returned as is.
pub fn yolo_to_coco_bbox(
    x_center: f64,
    y_center: f64,
    w: f64,
    h: f64,
    image_width: u32,
    image_height: u32,
) -> AbsoluteBox {
    let image_width = image_width as f64;
    let image_height = image_height as f64;
    AbsoluteBox {
        x: (x_center - w / 2.0) * image_width,
        y: (y_center - h / 2.0) * image_height,
        width: w * image_width,
        height: h * image_height,
    }
}

impl NormalizedBox {
    pub fn to_absolute(&self, image_width: u32, image_height: u32) -> AbsoluteBox {
        yolo_to_coco_bbox(
            self.x_center,
            self.y_center,
            self.width,
            self.height,
            image_width,
            image_height,
        )
    }
}
