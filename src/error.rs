use std::path::PathBuf;
use thiserror::Error;

/// The main error type for oidlabel operations.
///
/// The first four variants describe per-item problems that batch jobs log
/// and skip. Everything else terminates the run.
#[derive(Debug, Error)]
pub enum OidError {
    #[error("Resource unavailable: {url}")]
    ResourceUnavailable { url: String },

    #[error("Corrupt input {path}: {message}")]
    CorruptInput { path: PathBuf, message: String },

    #[error("{path} already exists")]
    AlreadyExists { path: PathBuf },

    #[error("Missing data: {0}")]
    MissingData(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to parse CSV {path} at line {line}, column '{column}': {message}")]
    CsvField {
        path: PathBuf,
        line: u64,
        column: &'static str,
        message: String,
    },

    #[error("HTTP request to {url} failed: {message}")]
    Http { url: String, message: String },

    #[error("Image error: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("Invalid rotation {0} (expected 0, 90, 180 or 270)")]
    InvalidRotation(f64),

    #[error("Invalid table: {0}")]
    InvalidTable(String),

    #[error("Class '{0}' is not in the class index")]
    UnknownClass(String),

    #[error("Failed to parse label file {path} at line {line}: {message}")]
    LabelParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("{bad_count} of {total} image(s) failed to decode")]
    VerifyFailed { bad_count: usize, total: usize },

    #[error("Unsupported partition: {0}")]
    UnsupportedPartition(String),
}

impl OidError {
    /// Returns true for errors a batch loop should log and skip past.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            OidError::ResourceUnavailable { .. }
                | OidError::CorruptInput { .. }
                | OidError::AlreadyExists { .. }
                | OidError::MissingData(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_variants_are_recoverable() {
        assert!(OidError::MissingData("thumbnail url".into()).is_recoverable());
        assert!(OidError::AlreadyExists {
            path: PathBuf::from("a.jpg")
        }
        .is_recoverable());
        assert!(!OidError::InvalidRotation(45.0).is_recoverable());
        assert!(!OidError::UnknownClass("Dog".into()).is_recoverable());
    }
}
