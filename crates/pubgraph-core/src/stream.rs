//! Blocking HTTP text fetch over a shared async client.
//!
//! Uses async reqwest internally with a per-request timeout,
//! but presents a sync interface for the sequential batch loop.

use std::sync::LazyLock;
use std::time::Duration;

/// Connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Failure to reach the server or to read its response.
#[derive(Debug)]
pub enum StreamError {
    Http {
        status: Option<u16>,
        message: String,
    },
}

impl std::fmt::Display for StreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Self::Http { status, message } = self;
        match status {
            Some(code) => write!(f, "HTTP {code}: {message}"),
            None => write!(f, "HTTP error: {message}"),
        }
    }
}

impl std::error::Error for StreamError {}

impl From<reqwest::Error> for StreamError {
    fn from(e: reqwest::Error) -> Self {
        let message = if e.is_timeout() {
            "request timed out".to_owned()
        } else {
            e.to_string()
        };
        Self::Http {
            status: e.status().map(|s| s.as_u16()),
            message,
        }
    }
}

/// Shared async HTTP client with connection pooling.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .pool_max_idle_per_host(2)
        .build()
        .expect("failed to build HTTP client")
});

/// Shared tokio runtime for HTTP operations.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// HTTP GET → response body as text.
///
/// The status code is not checked: whatever body the server sends back is
/// returned. Only transport failures are errors.
pub fn fetch_text(url: &str, timeout: Duration) -> Result<String, StreamError> {
    SHARED_RUNTIME.handle().block_on(async {
        let response = SHARED_CLIENT
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(StreamError::from)?;

        let status = response.status();
        if !status.is_success() {
            log::debug!("{url}: HTTP {status}, keeping body");
        }

        response.text().await.map_err(StreamError::from)
    })
}

/// Source of raw documents, keyed by URL.
pub trait Transport {
    fn get_text(&mut self, url: &str) -> Result<String, StreamError>;
}

/// [`Transport`] backed by the shared HTTP client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Transport for HttpTransport {
    fn get_text(&mut self, url: &str) -> Result<String, StreamError> {
        fetch_text(url, self.timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http_err(status: u16) -> StreamError {
        StreamError::Http {
            status: Some(status),
            message: "test".to_string(),
        }
    }

    #[test]
    fn display_http_with_status() {
        let err = http_err(404);
        assert_eq!(format!("{err}"), "HTTP 404: test");
    }

    #[test]
    fn display_http_without_status() {
        let err = StreamError::Http {
            status: None,
            message: "timeout".to_string(),
        };
        assert_eq!(format!("{err}"), "HTTP error: timeout");
    }

    #[test]
    fn body_returned_for_success() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/efetch?id=7")
            .with_status(200)
            .with_body("<PubmedArticleSet/>")
            .create();

        let url = format!("{}/efetch?id=7", server.url());
        let body = fetch_text(&url, Duration::from_secs(5)).unwrap();

        assert_eq!(body, "<PubmedArticleSet/>");
        mock.assert();
    }

    #[test]
    fn body_returned_regardless_of_status() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/missing")
            .with_status(404)
            .with_body("<eFetchResult><ERROR>not found</ERROR></eFetchResult>")
            .create();

        let mut transport = HttpTransport::new(Duration::from_secs(5));
        let body = transport
            .get_text(&format!("{}/missing", server.url()))
            .unwrap();

        assert!(body.contains("ERROR"));
    }

    #[test]
    fn connection_refused_is_http_error_without_status() {
        let err = fetch_text("http://127.0.0.1:1/", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, StreamError::Http { status: None, .. }));
    }
}
