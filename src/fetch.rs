//! Blocking HTTP retrieval of dataset CSVs and images.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use ureq::http::StatusCode;

use crate::error::OidError;

/// Flickr redirects removed photos to an image with this name.
const REMOVED_MARKER: &str = "photo_unavailable";

/// Outcome of probing a URL before downloading it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Availability {
    Available,
    Unavailable,
}

/// Where images and CSVs come from. [`Fetcher`] is the HTTP
/// implementation; tests substitute a local one.
pub trait Remote {
    fn probe(&self, url: &str) -> Availability;
    fn download_to(&self, url: &str, path: &Path) -> Result<u64, OidError>;
}

/// HTTP client used by the jobs. No retries, no backoff.
pub struct Fetcher {
    agent: ureq::Agent,
    probe_agent: ureq::Agent,
}

impl Fetcher {
    /// A fetcher without a timeout: a hung request blocks until the
    /// process is killed.
    pub fn new() -> Self {
        Self::build(None)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::build(Some(timeout))
    }

    fn build(timeout: Option<Duration>) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(timeout)
            .build()
            .into();
        let probe_agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(timeout)
            .max_redirects(0)
            .max_redirects_will_error(false)
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent, probe_agent }
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Remote for Fetcher {
    fn probe(&self, url: &str) -> Availability {
        match self.probe_agent.head(url).call() {
            Ok(response) => {
                let location = response
                    .headers()
                    .get("location")
                    .and_then(|v| v.to_str().ok());
                classify(response.status(), location)
            }
            Err(_) => Availability::Unavailable,
        }
    }

    fn download_to(&self, url: &str, path: &Path) -> Result<u64, OidError> {
        let mut response = self.agent.get(url).call().map_err(|source| OidError::Http {
            url: url.to_string(),
            message: source.to_string(),
        })?;

        let file = File::create(path).map_err(OidError::Io)?;
        let mut writer = BufWriter::new(file);
        let mut reader = response.body_mut().as_reader();
        let written = io::copy(&mut reader, &mut writer).map_err(OidError::Io)?;
        writer.flush().map_err(OidError::Io)?;
        Ok(written)
    }
}

/// Sorts a probe response. Error statuses and redirects to Flickr's
/// removed-photo image are unavailable; anything else is available.
fn classify(status: StatusCode, location: Option<&str>) -> Availability {
    if status.is_client_error() || status.is_server_error() {
        return Availability::Unavailable;
    }
    if status.is_redirection() && location.is_some_and(|l| l.contains(REMOVED_MARKER)) {
        return Availability::Unavailable;
    }
    Availability::Available
}

/// Local file name for an image: the image id plus the extension of the
/// URL's path, e.g. `000a1249af2bc5f0.jpg`.
pub fn image_file_name(image_id: &str, url: &str) -> String {
    let ext = url::Url::parse(url)
        .ok()
        .and_then(|parsed| {
            Path::new(parsed.path())
                .extension()
                .map(|e| e.to_string_lossy().into_owned())
        })
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    format!("{image_id}{ext}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_name_takes_extension_from_url_path() {
        assert_eq!(
            image_file_name("abc", "https://c1.staticflickr.com/5/1/123_z.jpg?zz=1"),
            "abc.jpg"
        );
        assert_eq!(image_file_name("abc", "https://example.com/photo"), "abc");
        assert_eq!(image_file_name("abc", "not a url"), "abc");
    }

    #[test]
    fn removed_photo_redirect_is_unavailable() {
        assert_eq!(
            classify(
                StatusCode::FOUND,
                Some("https://s.yimg.com/pw/images/en-us/photo_unavailable.png")
            ),
            Availability::Unavailable
        );
    }

    #[test]
    fn other_redirects_are_available() {
        assert_eq!(
            classify(
                StatusCode::MOVED_PERMANENTLY,
                Some("https://farm1.staticflickr.com/1/2_z.jpg")
            ),
            Availability::Available
        );
        assert_eq!(classify(StatusCode::FOUND, None), Availability::Available);
        assert_eq!(classify(StatusCode::OK, None), Availability::Available);
    }

    #[test]
    fn error_statuses_are_unavailable() {
        assert_eq!(classify(StatusCode::NOT_FOUND, None), Availability::Unavailable);
        assert_eq!(classify(StatusCode::GONE, None), Availability::Unavailable);
        assert_eq!(
            classify(StatusCode::SERVICE_UNAVAILABLE, None),
            Availability::Unavailable
        );
    }

    #[test]
    fn transport_errors_are_unavailable() {
        let fetcher = Fetcher::with_timeout(Duration::from_secs(2));
        assert_eq!(fetcher.probe("not a url"), Availability::Unavailable);
        // Nothing listens on port 1, so the connection is refused.
        assert_eq!(
            fetcher.probe("http://127.0.0.1:1/photo.jpg"),
            Availability::Unavailable
        );
    }
}
