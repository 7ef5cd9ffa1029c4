//! Axis-aligned boxes in min/max form.

use std::fmt;
use std::marker::PhantomData;

use super::{Normalized, Pixel, Space};

/// An axis-aligned bounding box stored as min/max corners.
///
/// The constructor does not enforce min <= max; the dataset may contain
/// malformed rows and the store reports them as they are.
#[derive(Clone, Copy, PartialEq)]
pub struct BBoxXYXY<TSpace> {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    _space: PhantomData<TSpace>,
}

impl<TSpace> BBoxXYXY<TSpace> {
    /// Creates a box from its corners, in the dataset's column order
    /// (x_min, x_max, y_min, y_max).
    #[inline]
    pub fn from_min_max(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
            _space: PhantomData,
        }
    }

    /// Creates a box from its center and size.
    #[inline]
    pub fn from_cxcywh(cx: f64, cy: f64, width: f64, height: f64) -> Self {
        Self::from_min_max(
            cx - width / 2.0,
            cx + width / 2.0,
            cy - height / 2.0,
            cy + height / 2.0,
        )
    }

    /// Returns (center x, center y, width, height).
    ///
    /// The center is computed as `min + (max - min) / 2`, the same
    /// expression the label query evaluates inside the store.
    #[inline]
    pub fn to_cxcywh(&self) -> (f64, f64, f64, f64) {
        (
            self.x_min + self.width() / 2.0,
            self.y_min + self.height() / 2.0,
            self.width(),
            self.height(),
        )
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Returns true if min <= max on both axes.
    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.x_min <= self.x_max && self.y_min <= self.y_max
    }
}

impl<TSpace: Space> fmt::Debug for BBoxXYXY<TSpace> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BBoxXYXY<{}>[{}..{}, {}..{}]",
            TSpace::NAME,
            self.x_min,
            self.x_max,
            self.y_min,
            self.y_max
        )
    }
}

impl BBoxXYXY<Normalized> {
    /// Scales to pixel coordinates for an image of the given size.
    pub fn to_pixel(&self, image_width: f64, image_height: f64) -> BBoxXYXY<Pixel> {
        BBoxXYXY::from_min_max(
            self.x_min * image_width,
            self.x_max * image_width,
            self.y_min * image_height,
            self.y_max * image_height,
        )
    }
}
