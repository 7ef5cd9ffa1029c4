//! Summary of an image download run.

use std::fmt;

use crate::error::OidError;

/// Counters collected by [`download_images`](super::download_images).
///
/// The log stream stays the detailed audit trail; this is the tally.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HarvestReport {
    pub listed: usize,
    pub downloaded: usize,
    pub labels_written: usize,
    pub previews_written: usize,
    pub already_exists: usize,
    pub unavailable: usize,
    pub corrupt: usize,
    pub missing_data: usize,
}

impl HarvestReport {
    /// Counts a recoverable error. Returns false for errors this report
    /// does not track.
    pub fn record_skip(&mut self, err: &OidError) -> bool {
        match err {
            OidError::AlreadyExists { .. } => self.already_exists += 1,
            OidError::ResourceUnavailable { .. } => self.unavailable += 1,
            OidError::CorruptInput { .. } => self.corrupt += 1,
            OidError::MissingData(_) => self.missing_data += 1,
            _ => return false,
        }
        true
    }

    /// Images dropped entirely (unavailable, undecodable, or without URLs).
    pub fn skipped_images(&self) -> usize {
        self.unavailable + self.corrupt + self.missing_data
    }
}

impl fmt::Display for HarvestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Images listed:     {}", self.listed)?;
        writeln!(f, "Images downloaded: {}", self.downloaded)?;
        writeln!(f, "Label files:       {}", self.labels_written)?;
        writeln!(f, "Previews:          {}", self.previews_written)?;
        writeln!(f, "Already present:   {}", self.already_exists)?;
        write!(
            f,
            "Skipped images:    {} (unavailable {}, corrupt {}, missing data {})",
            self.skipped_images(),
            self.unavailable,
            self.corrupt,
            self.missing_data
        )
    }
}
