//! HTTP Client Implementation using Reqwest

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{
        is_bodyless_status, is_success_status, DownloadObserver, DownloadProgress, HttpClient,
        HttpRequest, HttpResponse, HttpStream,
    },
};
use futures_util::{StreamExt, TryStreamExt};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Connection settings for [`ReqwestHttpClient`].
#[derive(Debug, Clone)]
pub struct HttpClientOptions {
    /// Idle limit between reads; a body that keeps arriving never hits it
    pub read_timeout: Duration,
    /// Optional cap on a whole request, body included
    pub request_timeout: Option<Duration>,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpClientOptions {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(60),
            request_timeout: None,
            connect_timeout: Duration::from_secs(10),
            user_agent: concat!("large-file-handler/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Reqwest-based HTTP client implementation
///
/// Provides HTTP operations with:
/// - Connection pooling via reqwest
/// - TLS via rustls
/// - Streamed bodies for large downloads
///
/// Requests are never retried; a failure is reported to the caller as-is.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    /// Create a new HTTP client from explicit options
    pub fn with_options(options: &HttpClientOptions) -> Result<Self> {
        let mut builder = Client::builder()
            .read_timeout(options.read_timeout)
            .connect_timeout(options.connect_timeout)
            .pool_max_idle_per_host(10)
            .user_agent(options.user_agent.clone());
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| BridgeError::NotAvailable(format!("HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Wrap an existing reqwest client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn send(&self, request: &HttpRequest) -> Result<reqwest::Response> {
        debug!("Sending HTTP request");
        self.client
            .get(&request.url)
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, &request.url))
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

fn map_reqwest_error(error: reqwest::Error, url: &str) -> BridgeError {
    if error.is_builder() {
        BridgeError::InvalidUrl(url.to_string())
    } else if error.is_timeout() {
        BridgeError::Transport("request timed out".to_string())
    } else if error.is_connect() {
        BridgeError::Transport(format!("connection failed: {error}"))
    } else {
        BridgeError::Transport(error.to_string())
    }
}

/// Sibling path a download is staged in before it replaces `destination`.
fn staging_path(destination: &Path) -> PathBuf {
    let name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "download".to_string());
    destination.with_file_name(format!(".{name}.{}.part", uuid::Uuid::new_v4().simple()))
}

async fn write_body(
    response: reqwest::Response,
    staging: &Path,
    url: &str,
    observer: &dyn DownloadObserver,
) -> Result<u64> {
    let expected = response.content_length();
    let mut file = fs::File::create(staging).await?;
    let mut received = 0u64;
    let mut body = response.bytes_stream();

    observer.on_progress(DownloadProgress::Bytes { received, expected });
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| map_reqwest_error(e, url))?;
        file.write_all(&chunk).await?;
        received += chunk.len() as u64;
        observer.on_progress(DownloadProgress::Bytes { received, expected });
    }
    file.flush().await?;
    file.sync_all().await?;

    Ok(received)
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let response = self.send(&request).await?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| map_reqwest_error(e, &request.url))?;

        debug!(status, size = body.len(), "HTTP response buffered");
        Ok(HttpResponse { status, body })
    }

    async fn open_stream(&self, request: HttpRequest) -> Result<HttpStream> {
        let response = self.send(&request).await?;
        let status = response.status().as_u16();
        let content_length = response.content_length();

        let stream = response.bytes_stream().map_err(std::io::Error::other);
        let reader = tokio_util::io::StreamReader::new(stream);

        Ok(HttpStream {
            status,
            content_length,
            body: Box::new(reader),
        })
    }

    async fn download_to(
        &self,
        request: HttpRequest,
        destination: &Path,
        observer: &dyn DownloadObserver,
    ) -> Result<u64> {
        let response = self.send(&request).await?;
        let status = response.status().as_u16();
        if !is_success_status(status) {
            return Err(BridgeError::HttpStatus {
                status,
                url: request.url,
            });
        }
        if is_bodyless_status(status) {
            return Err(BridgeError::EmptyBody(request.url));
        }

        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let staging = staging_path(destination);
        match write_body(response, &staging, &request.url, observer).await {
            Ok(written) => {
                if let Err(e) = fs::rename(&staging, destination).await {
                    let _ = fs::remove_file(&staging).await;
                    return Err(e.into());
                }
                debug!(bytes = written, "Download persisted");
                Ok(written)
            }
            Err(e) => {
                warn!(error = %e, "Download failed, discarding staged file");
                let _ = fs::remove_file(&staging).await;
                Err(e)
            }
        }
    }
}
