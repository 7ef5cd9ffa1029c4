//! Which coordinate system a [`BBoxXYXY`](super::BBoxXYXY) lives in.
//!
//! Boxes read from the dataset CSVs are image fractions; drawing needs
//! pixels. The marker parameter keeps the two apart at compile time.

/// A coordinate system a box can be expressed in.
pub trait Space {
    /// Short name shown in `Debug` output.
    const NAME: &'static str;
}

/// Absolute pixel positions in a decoded image, origin top-left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pixel {}

/// Image-fraction positions in [0, 1], as stored in the dataset CSVs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Normalized {}

impl Space for Pixel {
    const NAME: &'static str = "pixel";
}

impl Space for Normalized {
    const NAME: &'static str = "normalized";
}
