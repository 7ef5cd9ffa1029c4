//! Box geometry: min/max and center/size forms, coordinate spaces and
//! rotation correction.
//!
//! # Example
//!
//! ```
//! use oidlabel::geom::{rotate_box, BBoxXYXY, Normalized, Rotation};
//!
//! let bbox = BBoxXYXY::<Normalized>::from_min_max(0.2, 0.6, 0.1, 0.3);
//! let (x, y, w, h) = bbox.to_cxcywh();
//! let (x, y, w, h) = rotate_box(x, y, w, h, Rotation::R180);
//! assert!((x - 0.6).abs() < 1e-12 && (y - 0.8).abs() < 1e-12);
//! # let _ = (w, h);
//! ```

mod bbox;
mod rotation;
mod space;

pub use bbox::BBoxXYXY;
pub use rotation::{rotate_box, Rotation};
pub use space::{Normalized, Pixel, Space};

/// One box ready for export: class name plus center/size in image
/// fractions.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedAnnotation {
    pub class_name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl NormalizedAnnotation {
    pub fn new(class_name: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            class_name: class_name.into(),
            x,
            y,
            width,
            height,
        }
    }

    /// Returns a copy corrected for `rotation`.
    pub fn rotated(&self, rotation: Rotation) -> Self {
        let (x, y, width, height) = rotate_box(self.x, self.y, self.width, self.height, rotation);
        Self {
            class_name: self.class_name.clone(),
            x,
            y,
            width,
            height,
        }
    }

    pub fn bbox(&self) -> BBoxXYXY<Normalized> {
        BBoxXYXY::from_cxcywh(self.x, self.y, self.width, self.height)
    }
}
