//! Single-image preview.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::harvest::{corrected_labels, pick_source, save_preview};
use super::preview_file_name;
use crate::config::{DatasetLayout, Partition, Table};
use crate::error::OidError;
use crate::export::ClassIndex;
use crate::fetch::{image_file_name, Remote};
use crate::geom::Rotation;
use crate::logging::LogSink;
use crate::preview::decode_image;
use crate::store::{build_image_list_query, ImageListOptions, Store};

/// Options for [`preview_image`].
#[derive(Clone, Debug)]
pub struct PreviewOptions {
    pub partition: Partition,
    pub image_id: String,
    pub classes: Vec<String>,
    /// Where to save the preview. Defaults to `previews/<partition>/`.
    pub output: Option<PathBuf>,
}

/// Downloads one image to a temporary file and saves a preview with its
/// rotation-corrected boxes.
///
/// Returns the preview path, or `None` when the image is not in the store
/// or could not be fetched or decoded (those cases are logged).
pub fn preview_image(
    layout: &DatasetLayout,
    store: &Store,
    remote: &dyn Remote,
    opts: &PreviewOptions,
    log: &LogSink,
) -> Result<Option<PathBuf>, OidError> {
    let partition = opts.partition;
    let log = log.scoped(partition).scoped(&opts.image_id);

    let query = build_image_list_query(
        Table::Bboxes(partition),
        Table::Labels(partition),
        Table::Images(partition),
        &ImageListOptions {
            image_id: Some(opts.image_id.clone()),
            ..Default::default()
        },
    )?;
    let Some(record) = store.select_images(&query)?.into_iter().next() else {
        log.warn(format_args!("Image not found"));
        return Ok(None);
    };

    let rotation = Rotation::from_degrees_lenient(record.rotation, &log);
    let annotations = corrected_labels(store, partition, &opts.image_id, &opts.classes, rotation)?;

    let (url, kind) = match pick_source(&record, remote, &log) {
        Ok(source) => source,
        Err(err) if err.is_recoverable() => {
            log.warn(format_args!("{err}"));
            return Ok(None);
        }
        Err(err) => return Err(err),
    };
    let log = log.scoped(kind);

    log.info(format_args!("Downloading image {url}"));
    let temp = tempfile::NamedTempFile::new().map_err(OidError::Io)?;
    remote.download_to(&url, temp.path())?;

    let image = match decode_image(temp.path()) {
        Ok(image) => image,
        Err(err @ OidError::CorruptInput { .. }) => {
            log.warn(format_args!("{err}"));
            return Ok(None);
        }
        Err(err) => return Err(err),
    };

    let classes = if opts.classes.is_empty() {
        let present: BTreeSet<&str> = annotations.iter().map(|a| a.class_name.as_str()).collect();
        ClassIndex::new(present)
    } else {
        ClassIndex::new(opts.classes.iter().cloned())
    };

    let output = match &opts.output {
        Some(path) => path.clone(),
        None => layout
            .previews_dir(partition)
            .join(preview_file_name(Path::new(&image_file_name(&opts.image_id, &url)))),
    };
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(OidError::Io)?;
        }
    }

    log.info(format_args!("Drawing preview -> {}", output.display()));
    save_preview(image, &output, &annotations, &classes, &log)?;
    Ok(Some(output))
}
