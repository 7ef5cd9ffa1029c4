//! Rotation correction for boxes on images the provider has rotated.
//!
//! Boxes are stored against the original pixel orientation, while the
//! served image may have been rotated according to the `rotation` column.
//! [`rotate_box`] maps a center/size box onto the rotated image.

use std::fmt;

use crate::error::OidError;
use crate::logging::LogSink;

/// A clockwise image rotation in degrees.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    /// Parses a stored rotation value. Anything other than 0, 90, 180 or
    /// 270 is an [`OidError::InvalidRotation`].
    pub fn from_degrees(degrees: f64) -> Result<Self, OidError> {
        if degrees == 0.0 {
            Ok(Rotation::R0)
        } else if degrees == 90.0 {
            Ok(Rotation::R90)
        } else if degrees == 180.0 {
            Ok(Rotation::R180)
        } else if degrees == 270.0 {
            Ok(Rotation::R270)
        } else {
            Err(OidError::InvalidRotation(degrees))
        }
    }

    /// Parses a nullable stored rotation, treating NULL as 0 and any
    /// unrecognized value as identity after logging a warning.
    pub fn from_degrees_lenient(degrees: Option<f64>, log: &LogSink) -> Self {
        match degrees {
            None => Rotation::R0,
            Some(value) => Self::from_degrees(value).unwrap_or_else(|err| {
                log.warn(format_args!("{err}; drawing without rotation correction"));
                Rotation::R0
            }),
        }
    }

    pub fn degrees(self) -> u16 {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 90,
            Rotation::R180 => 180,
            Rotation::R270 => 270,
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.degrees())
    }
}

/// Corrects a normalized center/size box for `rotation`.
///
/// Returns (x, y, width, height).
pub fn rotate_box(
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    rotation: Rotation,
) -> (f64, f64, f64, f64) {
    match rotation {
        Rotation::R0 => (x, y, width, height),
        Rotation::R90 => (y, 1.0 - x, height, width),
        Rotation::R180 => (1.0 - x, 1.0 - y, width, height),
        Rotation::R270 => (1.0 - y, x, height, width),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn close(a: (f64, f64, f64, f64), b: (f64, f64, f64, f64)) -> bool {
        (a.0 - b.0).abs() < EPS
            && (a.1 - b.1).abs() < EPS
            && (a.2 - b.2).abs() < EPS
            && (a.3 - b.3).abs() < EPS
    }

    #[test]
    fn quarter_turns() {
        assert!(close(
            rotate_box(0.2, 0.3, 0.1, 0.4, Rotation::R90),
            (0.3, 0.8, 0.4, 0.1)
        ));
        assert!(close(
            rotate_box(0.2, 0.3, 0.1, 0.4, Rotation::R180),
            (0.8, 0.7, 0.1, 0.4)
        ));
        assert!(close(
            rotate_box(0.2, 0.3, 0.1, 0.4, Rotation::R270),
            (0.7, 0.2, 0.4, 0.1)
        ));
    }

    #[test]
    fn zero_is_identity() {
        assert_eq!(
            rotate_box(0.2, 0.3, 0.1, 0.4, Rotation::R0),
            (0.2, 0.3, 0.1, 0.4)
        );
    }

    #[test]
    fn ninety_then_two_seventy_cancel() {
        let (x, y, w, h) = rotate_box(0.2, 0.3, 0.1, 0.4, Rotation::R90);
        assert!(close(
            rotate_box(x, y, w, h, Rotation::R270),
            (0.2, 0.3, 0.1, 0.4)
        ));
    }

    #[test]
    fn strict_parse_rejects_unknown_values() {
        assert_eq!(Rotation::from_degrees(180.0).unwrap(), Rotation::R180);
        assert!(matches!(
            Rotation::from_degrees(45.0),
            Err(OidError::InvalidRotation(v)) if v == 45.0
        ));
    }

    #[test]
    fn lenient_parse_falls_back_to_identity() {
        let log = LogSink::silent();
        assert_eq!(Rotation::from_degrees_lenient(None, &log), Rotation::R0);
        assert_eq!(Rotation::from_degrees_lenient(Some(45.0), &log), Rotation::R0);
        assert_eq!(
            Rotation::from_degrees_lenient(Some(270.0), &log),
            Rotation::R270
        );
    }
}
