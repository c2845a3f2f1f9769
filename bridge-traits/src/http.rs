//! HTTP Client Abstraction
//!
//! Network transfers reach the host's networking stack through [`HttpClient`].
//! Three shapes of request are supported, matching how platform download APIs
//! behave:
//!
//! - [`HttpClient::execute`]: whole-buffer request, body materialized in memory
//! - [`HttpClient::open_stream`]: streamed GET, body pulled chunk by chunk
//! - [`HttpClient::download_to`]: platform download facility that writes the
//!   file itself and pushes progress notifications to a [`DownloadObserver`]

use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;

use crate::error::Result;
use crate::platform::DynAsyncRead;

/// A GET request for one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Fully buffered HTTP response
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

/// Streamed HTTP response; the body is read incrementally.
pub struct HttpStream {
    pub status: u16,
    /// Declared body length. `None` when the server omitted `Content-Length`.
    pub content_length: Option<u64>,
    pub body: Box<DynAsyncRead>,
}

impl std::fmt::Debug for HttpStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpStream")
            .field("status", &self.status)
            .field("content_length", &self.content_length)
            .finish()
    }
}

/// Returns true for 2xx status codes.
pub fn is_success_status(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Returns true for statuses that by definition carry no body (204, 205).
pub fn is_bodyless_status(status: u16) -> bool {
    status == 204 || status == 205
}

/// Progress notification pushed by a platform download facility.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DownloadProgress {
    /// Byte counters, as reported by streaming downloaders.
    Bytes {
        received: u64,
        /// `None` when the response declared no length.
        expected: Option<u64>,
    },
    /// Completion fraction in `0.0..=1.0`, as reported by native download
    /// tasks that only expose a fraction.
    Fraction(f64),
}

/// Receiver for push-based download progress.
///
/// Implementations must be cheap; they are called from the download's
/// execution context for every notification.
pub trait DownloadObserver: Send + Sync {
    fn on_progress(&self, progress: DownloadProgress);
}

/// Async HTTP client trait
///
/// # Example
///
/// ```ignore
/// use bridge_traits::http::{HttpClient, HttpRequest};
///
/// async fn fetch_manifest(client: &dyn HttpClient) -> Result<Vec<u8>> {
///     let response = client.execute(HttpRequest::get("https://example.com/manifest.json")).await?;
///     Ok(response.body.to_vec())
/// }
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Execute a request and buffer the whole body in memory.
    ///
    /// Any HTTP status is returned as-is; only transport failures are errors.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::InvalidUrl`](crate::BridgeError::InvalidUrl) if the URL is rejected
    /// - [`BridgeError::Transport`](crate::BridgeError::Transport) on connection, TLS or timeout failures
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;

    /// Start a request and return its body as a readable stream.
    ///
    /// Any HTTP status is returned as-is; only transport failures are errors.
    async fn open_stream(&self, request: HttpRequest) -> Result<HttpStream>;

    /// Download the response body into `destination` using the platform's
    /// incremental download facility, pushing progress to `observer`.
    ///
    /// Implementations must check the status before touching `destination`:
    /// non-2xx responses fail with
    /// [`BridgeError::HttpStatus`](crate::BridgeError::HttpStatus) and
    /// bodyless responses with
    /// [`BridgeError::EmptyBody`](crate::BridgeError::EmptyBody). On failure
    /// the destination must be left as it was. Returns the number of bytes
    /// written.
    async fn download_to(
        &self,
        request: HttpRequest,
        destination: &Path,
        observer: &dyn DownloadObserver,
    ) -> Result<u64>;
}
