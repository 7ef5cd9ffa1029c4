//! Download images for a partition and write their labels and previews.

use std::fs;
use std::path::Path;

use image::DynamicImage;

use super::{ensure_writable, preview_file_name};
use super::report::HarvestReport;
use crate::config::{DatasetLayout, Partition, Table};
use crate::error::OidError;
use crate::export::{write_label_file, ClassIndex};
use crate::fetch::{image_file_name, Availability, Remote};
use crate::geom::{NormalizedAnnotation, Rotation};
use crate::logging::LogSink;
use crate::preview::{decode_image, draw_annotations};
use crate::store::{build_image_list_query, build_label_query, ImageListOptions, ImageRecord, Store};

/// Options for [`download_images`].
#[derive(Clone, Debug)]
pub struct HarvestOptions {
    pub partition: Partition,
    /// Class names to keep. Empty means all classes.
    pub classes: Vec<String>,
    pub overwrite: bool,
    pub without_preview: bool,
    pub limit: Option<u64>,
    pub offset: u64,
}

impl HarvestOptions {
    pub fn new(partition: Partition) -> Self {
        Self {
            partition,
            classes: Vec::new(),
            overwrite: false,
            without_preview: false,
            limit: None,
            offset: 0,
        }
    }
}

/// Downloads every matching image of a partition, writing one label file
/// per image and (unless disabled) one preview.
///
/// Unavailable, undecodable or URL-less images are logged and skipped.
/// Existing outputs are kept unless `overwrite` is set.
pub fn download_images(
    layout: &DatasetLayout,
    store: &Store,
    remote: &dyn Remote,
    opts: &HarvestOptions,
    log: &LogSink,
) -> Result<HarvestReport, OidError> {
    let partition = opts.partition;
    let images_dir = layout.images_dir(partition);
    let labels_dir = layout.labels_dir(partition);
    let previews_dir = layout.previews_dir(partition);
    fs::create_dir_all(&images_dir).map_err(OidError::Io)?;
    fs::create_dir_all(&labels_dir).map_err(OidError::Io)?;
    if !opts.without_preview {
        fs::create_dir_all(&previews_dir).map_err(OidError::Io)?;
    }

    let classes = ClassIndex::from_filter_or_taxonomy(&opts.classes, store.class_names()?);

    let query = build_image_list_query(
        Table::Bboxes(partition),
        Table::Labels(partition),
        Table::Images(partition),
        &ImageListOptions {
            image_id: None,
            class_names: opts.classes.clone(),
            limit: opts.limit,
            offset: opts.offset,
        },
    )?;
    let records = store.select_images(&query)?;

    let mut report = HarvestReport {
        listed: records.len(),
        ..Default::default()
    };
    let log = log.scoped(partition);

    for record in &records {
        let image_log = log.scoped(&record.image_id);
        let dirs = OutputDirs {
            images: &images_dir,
            labels: &labels_dir,
            previews: (!opts.without_preview).then_some(previews_dir.as_path()),
        };
        match harvest_one(record, store, remote, &classes, opts, &dirs, &mut report, &image_log) {
            Ok(()) => {}
            Err(err) if err.is_recoverable() => {
                image_log.warn(format_args!("{err}"));
                report.record_skip(&err);
            }
            Err(err) => {
                image_log.error(format_args!("{err}"));
                return Err(err);
            }
        }
    }

    log.info(format_args!(
        "Done: {} listed, {} downloaded, {} skipped",
        report.listed,
        report.downloaded,
        report.skipped_images()
    ));
    Ok(report)
}

struct OutputDirs<'a> {
    images: &'a Path,
    labels: &'a Path,
    previews: Option<&'a Path>,
}

#[allow(clippy::too_many_arguments)]
fn harvest_one(
    record: &ImageRecord,
    store: &Store,
    remote: &dyn Remote,
    classes: &ClassIndex,
    opts: &HarvestOptions,
    dirs: &OutputDirs<'_>,
    report: &mut HarvestReport,
    log: &LogSink,
) -> Result<(), OidError> {
    let (url, kind) = pick_source(record, remote, log)?;
    let log = log.scoped(kind);

    let image_path = dirs.images.join(image_file_name(&record.image_id, &url));
    match ensure_writable(&image_path, opts.overwrite) {
        Ok(()) => {
            log.info(format_args!(
                "Downloading image {url} -> {}",
                image_path.display()
            ));
            remote.download_to(&url, &image_path)?;
            report.downloaded += 1;
        }
        Err(err @ OidError::AlreadyExists { .. }) => {
            log.info(format_args!("{err}"));
            report.record_skip(&err);
        }
        Err(err) => return Err(err),
    }

    let image = match decode_image(&image_path) {
        Ok(image) => image,
        Err(err @ OidError::CorruptInput { .. }) => {
            fs::remove_file(&image_path).map_err(OidError::Io)?;
            return Err(err);
        }
        Err(err) => return Err(err),
    };

    let rotation = Rotation::from_degrees_lenient(record.rotation, &log);
    let labels_path = dirs.labels.join(format!("{}.txt", record.image_id));
    let preview_path = dirs.previews.map(|dir| dir.join(preview_file_name(&image_path)));

    let write_labels = check_output(&labels_path, opts.overwrite, report, &log.scoped("label"));
    let write_preview = preview_path
        .as_deref()
        .map(|p| check_output(p, opts.overwrite, report, &log.scoped("preview")))
        .unwrap_or(false);
    if !write_labels && !write_preview {
        return Ok(());
    }

    let annotations = corrected_labels(store, opts.partition, &record.image_id, &opts.classes, rotation)?;

    if write_labels {
        log.scoped("label").info(format_args!(
            "Writing labels -> {}",
            labels_path.display()
        ));
        write_label_file(&labels_path, &annotations, classes)?;
        report.labels_written += 1;
    }

    if let (true, Some(preview_path)) = (write_preview, preview_path) {
        log.scoped("preview").info(format_args!(
            "Drawing preview -> {}",
            preview_path.display()
        ));
        save_preview(image, &preview_path, &annotations, classes, &log)?;
        report.previews_written += 1;
    }

    Ok(())
}

/// Returns whether `path` should be (re)written, logging and counting the
/// skip otherwise.
fn check_output(path: &Path, overwrite: bool, report: &mut HarvestReport, log: &LogSink) -> bool {
    match ensure_writable(path, overwrite) {
        Ok(()) => true,
        Err(err) => {
            log.info(format_args!("{err}"));
            report.record_skip(&err);
            false
        }
    }
}

/// Chooses the thumbnail URL, falling back to the original, and probes it.
///
/// An empty URL field is logged and the other one tried. Returns the URL
/// and its kind (`thumb` or `org`).
pub(crate) fn pick_source(
    record: &ImageRecord,
    remote: &dyn Remote,
    log: &LogSink,
) -> Result<(String, &'static str), OidError> {
    let mut last_tried = None;
    for (url, kind) in [
        (&record.thumbnail_url, "thumb"),
        (&record.original_url, "org"),
    ] {
        match url {
            None => log.warn(format_args!("No {kind} URL")),
            Some(url) => {
                if remote.probe(url) == Availability::Available {
                    return Ok((url.clone(), kind));
                }
                last_tried = Some(url.clone());
            }
        }
    }

    match last_tried {
        Some(url) => Err(OidError::ResourceUnavailable { url }),
        None => Err(OidError::MissingData(format!(
            "image {} has no URL",
            record.image_id
        ))),
    }
}

/// Queries one image's labels and corrects them for `rotation`.
pub(crate) fn corrected_labels(
    store: &Store,
    partition: Partition,
    image_id: &str,
    classes: &[String],
    rotation: Rotation,
) -> Result<Vec<NormalizedAnnotation>, OidError> {
    let query = build_label_query(
        Table::Bboxes(partition),
        Table::Labels(partition),
        image_id,
        classes,
        1.0,
    )?;
    Ok(store
        .select_labels(&query)?
        .iter()
        .map(|ann| ann.rotated(rotation))
        .collect())
}

pub(crate) fn save_preview(
    image: DynamicImage,
    path: &Path,
    annotations: &[NormalizedAnnotation],
    classes: &ClassIndex,
    log: &LogSink,
) -> Result<(), OidError> {
    let mut canvas = image.to_rgb8();
    draw_annotations(&mut canvas, annotations, classes, log);
    canvas.save(path)?;
    Ok(())
}
