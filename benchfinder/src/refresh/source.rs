//! Dataset sources: where the raw bench feed comes from.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;

/// Default open-data feed with every bench in Barcelona.
pub const DEFAULT_DATASET_URL: &str = "https://opendata-ajuntament.barcelona.cat/resources/bcn/Mobiliari_Urba/Infraestruc_Mobiliari_Urba_Bancs.json";

/// Default HTTP timeout for a dataset download, in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 60;

/// User-Agent sent with dataset downloads.
const USER_AGENT: &str = concat!("benchfinder/", env!("CARGO_PKG_VERSION"));

/// Errors fetching the raw dataset.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Transport-level HTTP failure.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// Reading a local dataset file failed.
    #[error("Failed to read {path}: {error}")]
    Io {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },
}

/// Produces the raw feed payload.
///
/// Implementations must be cheap to call repeatedly; the scheduler fetches
/// on every refresh.
pub trait DatasetSource: Send + Sync {
    /// Fetch the full payload.
    fn fetch(&self) -> impl Future<Output = Result<Bytes, SourceError>> + Send;

    /// Human-readable origin for logs.
    fn describe(&self) -> String;
}

/// Downloads the feed over HTTP(S) using reqwest.
#[derive(Clone)]
pub struct HttpDatasetSource {
    client: reqwest::Client,
    url: String,
}

impl HttpDatasetSource {
    /// Creates a source for `url` with the default timeout.
    pub fn new(url: impl Into<String>) -> Result<Self, SourceError> {
        Self::with_timeout(url, Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS))
    }

    /// Creates a source for `url` with a custom request timeout.
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SourceError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl DatasetSource for HttpDatasetSource {
    async fn fetch(&self) -> Result<Bytes, SourceError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| SourceError::Http(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        response
            .bytes()
            .await
            .map_err(|e| SourceError::Http(format!("Failed to read response: {}", e)))
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Reads the feed from a local file.
#[derive(Clone, Debug)]
pub struct FileDatasetSource {
    path: PathBuf,
}

impl FileDatasetSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DatasetSource for FileDatasetSource {
    async fn fetch(&self) -> Result<Bytes, SourceError> {
        tokio::fs::read(&self.path)
            .await
            .map(Bytes::from)
            .map_err(|error| SourceError::Io {
                path: self.path.clone(),
                error,
            })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Source returning queued payloads, repeating the last one.
    pub struct MockDatasetSource {
        responses: Mutex<Vec<Result<Bytes, String>>>,
        pub fetches: AtomicUsize,
    }

    impl MockDatasetSource {
        pub fn new(responses: Vec<Result<&'static str, &'static str>>) -> Self {
            Self {
                responses: Mutex::new(
                    responses
                        .into_iter()
                        .map(|r| {
                            r.map(|s| Bytes::from_static(s.as_bytes()))
                                .map_err(str::to_string)
                        })
                        .collect(),
                ),
                fetches: AtomicUsize::new(0),
            }
        }
    }

    impl DatasetSource for MockDatasetSource {
        async fn fetch(&self) -> Result<Bytes, SourceError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let mut responses = self.responses.lock();
            let next = if responses.len() > 1 {
                responses.remove(0)
            } else {
                responses
                    .first()
                    .cloned()
                    .unwrap_or_else(|| Err("no response queued".to_string()))
            };
            next.map_err(SourceError::Http)
        }

        fn describe(&self) -> String {
            "mock".to_string()
        }
    }

    #[tokio::test]
    async fn test_file_source_reads_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("benches.json");
        std::fs::write(&path, b"[]").unwrap();

        let source = FileDatasetSource::new(&path);
        assert_eq!(source.fetch().await.unwrap(), Bytes::from_static(b"[]"));
        assert!(source.describe().ends_with("benches.json"));
    }

    #[tokio::test]
    async fn test_file_source_missing_file() {
        let source = FileDatasetSource::new("/nonexistent/benches.json");
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/benches.json"));
    }

    #[tokio::test]
    async fn test_mock_source_sequence() {
        let source = MockDatasetSource::new(vec![Err("boom"), Ok("[]")]);
        assert!(source.fetch().await.is_err());
        assert_eq!(source.fetch().await.unwrap(), Bytes::from_static(b"[]"));
        assert_eq!(source.fetch().await.unwrap(), Bytes::from_static(b"[]"));
        assert_eq!(source.fetches.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_http_source_construction() {
        let source = HttpDatasetSource::new(DEFAULT_DATASET_URL).unwrap();
        assert_eq!(source.url(), DEFAULT_DATASET_URL);
        assert_eq!(source.describe(), DEFAULT_DATASET_URL);
    }

    #[test]
    fn test_status_error_display() {
        let err = SourceError::Status {
            status: 503,
            url: "http://example.com".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 503 from http://example.com");
    }
}
