//! Draws annotation outlines on images.
//!
//! Captions are not rendered; class names go to the debug log instead.

use std::path::Path;

use image::{DynamicImage, ImageDecoder, ImageReader, Rgb, RgbImage};

use crate::error::OidError;
use crate::export::ClassIndex;
use crate::geom::NormalizedAnnotation;
use crate::logging::LogSink;

/// Outline colors, picked by `class_index % len`.
pub const BBOX_COLORS: [[u8; 3]; 6] = [
    [0, 255, 255],
    [255, 0, 255],
    [255, 255, 0],
    [255, 0, 0],
    [0, 255, 0],
    [0, 0, 255],
];

/// Decodes the image at `path`, sniffing the format from its content, and
/// applies any EXIF orientation so boxes line up with the displayed image.
///
/// Any decode failure is reported as [`OidError::CorruptInput`].
pub fn decode_image(path: &Path) -> Result<DynamicImage, OidError> {
    let corrupt = |err: &dyn std::fmt::Display| OidError::CorruptInput {
        path: path.to_path_buf(),
        message: err.to_string(),
    };
    let mut decoder = ImageReader::open(path)
        .map_err(OidError::Io)?
        .with_guessed_format()
        .map_err(|e| corrupt(&e))?
        .into_decoder()
        .map_err(|e| corrupt(&e))?;
    let orientation = decoder.orientation().map_err(|e| corrupt(&e))?;
    let mut image = DynamicImage::from_decoder(decoder).map_err(|e| corrupt(&e))?;
    image.apply_orientation(orientation);
    Ok(image)
}

pub fn color_for(class_index: usize) -> Rgb<u8> {
    Rgb(BBOX_COLORS[class_index % BBOX_COLORS.len()])
}

/// Pixel rectangle (left, top, right, bottom) for an annotation. Edges are
/// truncated toward zero.
pub fn pixel_rect(ann: &NormalizedAnnotation, width: u32, height: u32) -> (i64, i64, i64, i64) {
    let px = ann.bbox().to_pixel(width as f64, height as f64);
    (
        px.x_min as i64,
        px.y_min as i64,
        px.x_max as i64,
        px.y_max as i64,
    )
}

/// Draws a 1-pixel outline for each annotation. Annotations must already
/// be rotation-corrected. Classes missing from `classes` get color 0.
pub fn draw_annotations(
    image: &mut RgbImage,
    annotations: &[NormalizedAnnotation],
    classes: &ClassIndex,
    log: &LogSink,
) {
    let (width, height) = image.dimensions();
    for ann in annotations {
        let idx = classes.index_of(&ann.class_name).unwrap_or(0);
        let rect = pixel_rect(ann, width, height);
        log.debug(format_args!(
            "{} {} {} {} {} -> {:?}",
            ann.class_name, ann.x, ann.y, ann.width, ann.height, rect
        ));
        draw_rect_outline(image, rect, color_for(idx));
    }
}

/// Draws an outline, clipping each edge to the image.
pub fn draw_rect_outline(image: &mut RgbImage, rect: (i64, i64, i64, i64), color: Rgb<u8>) {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return;
    }
    let max_x = width as i64 - 1;
    let max_y = height as i64 - 1;
    let (left, top, right, bottom) = rect;
    let (left, right) = (left.min(right), left.max(right));
    let (top, bottom) = (top.min(bottom), top.max(bottom));

    let x0 = left.clamp(0, max_x);
    let x1 = right.clamp(0, max_x);
    let y0 = top.clamp(0, max_y);
    let y1 = bottom.clamp(0, max_y);

    for x in x0..=x1 {
        if (0..=max_y).contains(&top) {
            image.put_pixel(x as u32, top as u32, color);
        }
        if (0..=max_y).contains(&bottom) {
            image.put_pixel(x as u32, bottom as u32, color);
        }
    }
    for y in y0..=y1 {
        if (0..=max_x).contains(&left) {
            image.put_pixel(left as u32, y as u32, color);
        }
        if (0..=max_x).contains(&right) {
            image.put_pixel(right as u32, y as u32, color);
        }
    }
}

/// Decodes `source`, draws `annotations` and saves to `output`. The output
/// format follows `output`'s extension.
pub fn render_preview(
    source: &Path,
    output: &Path,
    annotations: &[NormalizedAnnotation],
    classes: &ClassIndex,
    log: &LogSink,
) -> Result<(), OidError> {
    let mut image = decode_image(source)?.to_rgb8();
    draw_annotations(&mut image, annotations, classes, log);
    image.save(output)?;
    Ok(())
}
