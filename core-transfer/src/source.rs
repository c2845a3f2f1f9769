//! Source adapters.
//!
//! Each adapter resolves a locator through a host bridge and hands the engine
//! a readable stream plus the total size, before anything touches the
//! destination.

use crate::error::{Result, TransferError};
use crate::request::SourceKind;
use async_trait::async_trait;
use bridge_traits::http::{
    is_bodyless_status, is_success_status, DownloadObserver, HttpClient, HttpRequest,
};
use bridge_traits::platform::DynAsyncRead;
use bridge_traits::{AssetBundle, BridgeError};
use bytes::Bytes;
use core_runtime::logging::redact_url;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// An opened source, ready to be read chunk by chunk.
pub struct OpenedSource {
    pub reader: Box<DynAsyncRead>,
    /// `None` when the size is not known up front.
    pub total_bytes: Option<u64>,
}

impl std::fmt::Debug for OpenedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenedSource")
            .field("total_bytes", &self.total_bytes)
            .finish()
    }
}

/// A place the pull loop can read from.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Resolve `locator` and open it for reading.
    async fn open(&self, locator: &str) -> Result<OpenedSource>;

    /// Classify an error raised while reading an opened stream.
    fn read_error(&self, error: std::io::Error) -> TransferError {
        TransferError::from(error)
    }
}

/// Opens assets bundled with the host application.
#[derive(Clone)]
pub struct AssetSource {
    bundle: Arc<dyn AssetBundle>,
}

impl AssetSource {
    pub fn new(bundle: Arc<dyn AssetBundle>) -> Self {
        Self { bundle }
    }
}

#[async_trait]
impl SourceAdapter for AssetSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Asset
    }

    async fn open(&self, locator: &str) -> Result<OpenedSource> {
        let stream = self.bundle.open(locator).await.map_err(|e| match e {
            BridgeError::NotFound(_) => {
                TransferError::NotFound(format!("asset '{locator}' is not bundled"))
            }
            other => TransferError::from(other),
        })?;
        debug!(asset = locator, size = stream.length, "Asset opened");

        Ok(OpenedSource {
            reader: stream.reader,
            total_bytes: Some(stream.length),
        })
    }
}

/// Fetches HTTP(S) resources through the host's HTTP client.
#[derive(Clone)]
pub struct NetworkSource {
    client: Arc<dyn HttpClient>,
}

impl NetworkSource {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self { client }
    }

    /// Parse and vet a URL. Only `http` and `https` are accepted.
    pub fn parse_locator(raw: &str) -> Result<Url> {
        let url = Url::parse(raw.trim())
            .map_err(|e| TransferError::InvalidLocator(format!("invalid URL: {e}")))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(TransferError::InvalidLocator(format!(
                "unsupported scheme '{scheme}'"
            ))),
        }
    }

    fn check_status(status: u16, url: &Url) -> Result<()> {
        if !is_success_status(status) {
            return Err(TransferError::Network(format!(
                "HTTP {status} returned by {}",
                redact_url(url.as_str())
            )));
        }
        if is_bodyless_status(status) {
            return Err(TransferError::EmptyResponse(format!(
                "HTTP {status} from {} carries no body",
                redact_url(url.as_str())
            )));
        }
        Ok(())
    }

    /// Fetch the whole body into memory.
    pub async fn fetch(&self, url: &Url) -> Result<Bytes> {
        let response = self.client.execute(HttpRequest::get(url.as_str())).await?;
        Self::check_status(response.status, url)?;
        debug!(size = response.body.len(), "Response body buffered");
        Ok(response.body)
    }

    /// Let the platform download `url` into `destination`, reporting
    /// progress to `observer`. Returns the number of bytes written.
    pub async fn download_to(
        &self,
        url: &Url,
        destination: &Path,
        observer: &dyn DownloadObserver,
    ) -> Result<u64> {
        Ok(self
            .client
            .download_to(HttpRequest::get(url.as_str()), destination, observer)
            .await?)
    }
}

#[async_trait]
impl SourceAdapter for NetworkSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Url
    }

    async fn open(&self, locator: &str) -> Result<OpenedSource> {
        let url = Self::parse_locator(locator)?;
        let stream = self.client.open_stream(HttpRequest::get(url.as_str())).await?;
        Self::check_status(stream.status, &url)?;
        debug!(status = stream.status, size = ?stream.content_length, "Response stream opened");

        Ok(OpenedSource {
            reader: stream.body,
            total_bytes: stream.content_length,
        })
    }

    fn read_error(&self, error: std::io::Error) -> TransferError {
        TransferError::Network(format!("response body interrupted: {error}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::http::{HttpResponse, HttpStream};
    use bridge_traits::AssetStream;
    use core_async::io::AsyncReadExt;
    use mockall::mock;
    use mockall::predicate::eq;
    
    mock! {
        pub AssetBundle {}

        #[async_trait]
        impl AssetBundle for AssetBundle {
            async fn open(&self, name: &str) -> BridgeResult<AssetStream>;
        }
    }

    /// HTTP client answering every request with one fixed status and body.
    struct FixedHttpClient {
        status: u16,
        body: &'static [u8],
        declare_length: bool,
    }

    #[async_trait]
    impl HttpClient for FixedHttpClient {
        async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
            Ok(HttpResponse {
                status: self.status,
                body: Bytes::from_static(self.body),
            })
        }

        async fn open_stream(&self, _request: HttpRequest) -> BridgeResult<HttpStream> {
            Ok(HttpStream {
                status: self.status,
                content_length: self.declare_length.then_some(self.body.len() as u64),
                body: Box::new(self.body),
            })
        }

        async fn download_to(
            &self,
            request: HttpRequest,
            _destination: &Path,
            _observer: &dyn DownloadObserver,
        ) -> BridgeResult<u64> {
            Err(BridgeError::HttpStatus {
                status: self.status,
                url: request.url,
            })
        }
    }

    fn network(status: u16, body: &'static [u8], declare_length: bool) -> NetworkSource {
        NetworkSource::new(Arc::new(FixedHttpClient {
            status,
            body,
            declare_length,
        }))
    }

    #[tokio::test]
    async fn test_asset_source_reports_length() {
        let mut bundle = MockAssetBundle::new();
        bundle
            .expect_open()
            .with(eq("assets/db.sqlite"))
            .times(1)
            .returning(|_| {
                Ok(AssetStream {
                    reader: Box::new(&b"sqlite"[..]),
                    length: 6,
                })
            });

        let source = AssetSource::new(Arc::new(bundle));
        let mut opened = source.open("assets/db.sqlite").await.unwrap();
        assert_eq!(opened.total_bytes, Some(6));

        let mut contents = Vec::new();
        opened.reader.read_to_end(&mut contents).await.unwrap();
        assert_eq!(contents, b"sqlite");
    }

    #[tokio::test]
    async fn test_asset_source_not_found() {
        let mut bundle = MockAssetBundle::new();
        bundle
            .expect_open()
            .returning(|name| Err(BridgeError::NotFound(name.to_string())));

        let source = AssetSource::new(Arc::new(bundle));
        let err = source.open("missing.bin").await.unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
        assert!(err.message().contains("missing.bin"));
    }

    #[test]
    fn test_parse_locator() {
        assert!(NetworkSource::parse_locator("https://cdn.example.com/a.bin").is_ok());
        assert!(NetworkSource::parse_locator(" http://127.0.0.1:8080/a ").is_ok());

        for bad in ["not a url", "ftp://host/file", "file:///etc/passwd", ""] {
            let err = NetworkSource::parse_locator(bad).unwrap_err();
            assert_eq!(err.code(), "INVALID_LOCATOR", "{bad}");
        }
    }

    #[tokio::test]
    async fn test_open_stream_without_length() {
        let source = network(200, b"hello", false);
        let opened = source.open("https://h.example/f").await.unwrap();
        assert_eq!(opened.total_bytes, None);
    }

    #[tokio::test]
    async fn test_non_success_status_is_network_error() {
        let source = network(404, b"", true);

        let err = source.open("https://h.example/missing?sig=1").await.unwrap_err();
        assert_eq!(
            err,
            TransferError::Network("HTTP 404 returned by https://h.example/missing".into())
        );

        let url = NetworkSource::parse_locator("https://h.example/missing").unwrap();
        assert_eq!(source.fetch(&url).await.unwrap_err().code(), "NETWORK_ERROR");
    }

    #[tokio::test]
    async fn test_no_content_is_empty_response() {
        let source = network(204, b"", false);
        let url = NetworkSource::parse_locator("https://h.example/empty").unwrap();

        assert_eq!(source.fetch(&url).await.unwrap_err().code(), "EMPTY_RESPONSE");
        assert_eq!(
            source.open(url.as_str()).await.unwrap_err().code(),
            "EMPTY_RESPONSE"
        );
    }

    #[tokio::test]
    async fn test_download_to_maps_bridge_errors() {
        let source = network(500, b"", false);
        let url = NetworkSource::parse_locator("https://h.example/f").unwrap();

        let err = source
            .download_to(
                &url,
                Path::new("/tmp/unused"),
                &crate::progress::ProgressTracker::new(&crate::progress::NoProgress, false),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "NETWORK_ERROR");
    }

    #[test]
    fn test_network_read_errors_are_network_errors() {
        let source = network(200, b"", false);
        let err = source.read_error(std::io::Error::other("connection reset"));
        assert_eq!(err.code(), "NETWORK_ERROR");

        let bundle = MockAssetBundle::new();
        let err = AssetSource::new(Arc::new(bundle)).read_error(std::io::Error::other("eio"));
        assert_eq!(err.code(), "IO_ERROR");
    }
}
