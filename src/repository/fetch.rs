//! Artifact transport.
//!
//! Provides an HTTP client for fetching artifacts with support for
//! ETag-based conditional requests, and a `file://` transport for
//! repositories laid out on disk.

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::path::PathBuf;
use std::time::Duration;

/// Outcome of fetching a single URL.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The resource was downloaded.
    Fetched(FetchResponse),
    /// The cached copy is still current (304 Not Modified).
    NotModified,
    /// The repository does not have the resource.
    NotFound,
}

/// Response from fetching a resource.
#[derive(Debug)]
pub struct FetchResponse {
    /// The resource content.
    pub bytes: Vec<u8>,
    /// ETag header if present.
    pub etag: Option<String>,
}

/// Fetches artifacts over HTTP/HTTPS or from `file://` URLs.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Create a new fetcher with default 30-second timeout.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create a new fetcher with custom timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("conduit-deps/", env!("CARGO_PKG_VERSION")))
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            timeout,
        }
    }

    /// Get the configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch a URL, sending `If-None-Match` when an ETag is known.
    pub fn fetch(&self, url: &str, etag: Option<&str>) -> Result<FetchOutcome> {
        if let Some(path) = url.strip_prefix("file://") {
            return fetch_file(PathBuf::from(path));
        }

        let mut request = self.client.get(url);
        if let Some(etag) = etag {
            request = request.header("If-None-Match", etag);
        }

        let response = request
            .send()
            .with_context(|| format!("Failed to fetch {}", url))?;

        match response.status() {
            StatusCode::NOT_MODIFIED => return Ok(FetchOutcome::NotModified),
            StatusCode::NOT_FOUND | StatusCode::GONE => return Ok(FetchOutcome::NotFound),
            status if !status.is_success() => bail!("HTTP {} fetching {}", status, url),
            _ => {}
        }

        let etag = response
            .headers()
            .get("etag")
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let bytes = response
            .bytes()
            .with_context(|| format!("Failed to read response from {}", url))?
            .to_vec();

        Ok(FetchOutcome::Fetched(FetchResponse { bytes, etag }))
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

fn fetch_file(path: PathBuf) -> Result<FetchOutcome> {
    match std::fs::read(&path) {
        Ok(bytes) => Ok(FetchOutcome::Fetched(FetchResponse { bytes, etag: None })),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FetchOutcome::NotFound),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use tempfile::TempDir;

    #[test]
    fn default_timeout_is_30_seconds() {
        let fetcher = HttpFetcher::new();
        assert_eq!(fetcher.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn custom_timeout() {
        let fetcher = HttpFetcher::with_timeout(Duration::from_secs(60));
        assert_eq!(fetcher.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn fetches_body_and_etag() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/a.jar");
            then.status(200).header("ETag", "\"v1\"").body("artifact");
        });

        let outcome = HttpFetcher::new().fetch(&server.url("/a.jar"), None).unwrap();
        match outcome {
            FetchOutcome::Fetched(response) => {
                assert_eq!(response.bytes, b"artifact");
                assert_eq!(response.etag.as_deref(), Some("\"v1\""));
            }
            other => panic!("expected Fetched, got {:?}", other),
        }
    }

    #[test]
    fn missing_resource_is_not_found() {
        let server = MockServer::start();
        let outcome = HttpFetcher::new()
            .fetch(&server.url("/missing.jar"), None)
            .unwrap();
        assert!(matches!(outcome, FetchOutcome::NotFound));
    }

    #[test]
    fn conditional_request_not_modified() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/a.jar")
                .header("If-None-Match", "\"v1\"");
            then.status(304);
        });

        let outcome = HttpFetcher::new()
            .fetch(&server.url("/a.jar"), Some("\"v1\""))
            .unwrap();
        assert!(matches!(outcome, FetchOutcome::NotModified));
    }

    #[test]
    fn server_error_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/broken.jar");
            then.status(500);
        });

        let result = HttpFetcher::new().fetch(&server.url("/broken.jar"), None);
        assert!(result.unwrap_err().to_string().contains("500"));
    }

    #[test]
    fn file_urls_read_from_disk() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.jar");
        std::fs::write(&file, "local").unwrap();

        let fetcher = HttpFetcher::new();
        let url = format!("file://{}", file.display());
        match fetcher.fetch(&url, None).unwrap() {
            FetchOutcome::Fetched(response) => assert_eq!(response.bytes, b"local"),
            other => panic!("expected Fetched, got {:?}", other),
        }

        let missing = format!("file://{}", temp.path().join("b.jar").display());
        assert!(matches!(
            fetcher.fetch(&missing, None).unwrap(),
            FetchOutcome::NotFound
        ));
    }
}
