//! Check that image files decode.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::OidError;
use crate::logging::LogSink;
use crate::preview::decode_image;

const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "png", "jpeg", "bmp", "webp"];

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VerifyReport {
    pub checked: Vec<PathBuf>,
    pub bad: Vec<PathBuf>,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.bad.is_empty()
    }
}

/// Decodes each file. Directories are walked for files with an image
/// extension; explicitly named files are checked regardless of extension.
/// A named path that does not exist is reported as bad.
pub fn verify_images(paths: &[PathBuf], log: &LogSink) -> Result<VerifyReport, OidError> {
    let mut report = VerifyReport::default();

    for path in paths {
        if !path.exists() {
            log.warn(format_args!("{} does not exist", path.display()));
            report.bad.push(path.clone());
            report.checked.push(path.clone());
            continue;
        }
        for file in expand(path)? {
            match decode_image(&file) {
                Ok(_) => {}
                Err(err @ OidError::CorruptInput { .. }) => {
                    log.warn(format_args!("{err}"));
                    report.bad.push(file.clone());
                }
                Err(err) => return Err(err),
            }
            report.checked.push(file);
        }
    }

    Ok(report)
}

fn expand(path: &Path) -> Result<Vec<PathBuf>, OidError> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).follow_links(true) {
        let entry = entry.map_err(|e| OidError::Io(e.into()))?;
        if entry.file_type().is_file() && has_image_extension(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.iter().any(|a| a.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}
