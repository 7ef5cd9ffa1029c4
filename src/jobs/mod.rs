//! Batch jobs behind the CLI subcommands.
//!
//! Each job is a straight-line loop over its inputs. Per-item problems
//! that [`OidError::is_recoverable`](crate::OidError::is_recoverable)
//! accepts are logged and skipped; anything else ends the job.

mod dataset;
mod extract_classes;
mod harvest;
mod preview;
mod report;
mod verify;

pub use dataset::{download_dataset, import_dataset};
pub use extract_classes::{extract_classes, label_path_for_image, ExtractOptions, ExtractSummary};
pub use harvest::{download_images, HarvestOptions};
pub use preview::{preview_image, PreviewOptions};
pub use report::HarvestReport;
pub use verify::{verify_images, VerifyReport};

use std::path::{Path, PathBuf};

use crate::error::OidError;

/// Fails with [`OidError::AlreadyExists`] when `path` exists and the caller
/// did not ask to overwrite it.
pub(crate) fn ensure_writable(path: &Path, overwrite: bool) -> Result<(), OidError> {
    if path.exists() && !overwrite {
        Err(OidError::AlreadyExists {
            path: path.to_path_buf(),
        })
    } else {
        Ok(())
    }
}


/// Preview file name: the image's own name, with `.png` added when it has
/// no extension to pick an encoder from.
pub(crate) fn preview_file_name(image_path: &Path) -> PathBuf {
    let name = image_path.file_name().map(PathBuf::from).unwrap_or_default();
    if name.extension().is_some() {
        name
    } else {
        name.with_extension("png")
    }
}
