//! End-to-end transfers against the desktop bridges: real files in a
//! temporary directory and a local HTTP server.

use async_trait::async_trait;
use bridge_desktop::{
    DirectoryAssetBundle, HttpClientOptions, InlineDispatcher, ReqwestHttpClient, TokioFileSystem,
};
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{AssetBundle, AssetStream, DynAsyncRead, HttpClient};
use core_runtime::config::{CoreConfig, NetworkProgressMode, TransferSettings};
use core_runtime::events::{CoreEvent, EventBus, TransferEvent};
use core_transfer::{progress_channel, NoProgress, TransferEngine, TransferRequest};
use std::io;
use std::path::Path;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt, ReadBuf};
use tokio::net::{TcpListener, TcpStream};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn engine(asset_root: &Path, mode: NetworkProgressMode) -> TransferEngine {
    engine_over(
        Arc::new(DirectoryAssetBundle::new(asset_root)),
        Arc::new(ReqwestHttpClient::new()),
        mode,
    )
}

fn engine_over(
    assets: Arc<dyn AssetBundle>,
    http: Arc<dyn HttpClient>,
    mode: NetworkProgressMode,
) -> TransferEngine {
    let config = CoreConfig::builder()
        .asset_bundle(assets)
        .http_client(http)
        .file_system(Arc::new(TokioFileSystem::new()))
        .dispatcher(Arc::new(InlineDispatcher))
        .transfer_settings(TransferSettings::default().with_network_progress(mode))
        .build()
        .unwrap();
    TransferEngine::new(&config)
}

fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

fn assert_progress_shape(values: &[u8]) {
    assert!(!values.is_empty(), "no progress reported");
    assert!(
        values.windows(2).all(|w| w[0] <= w[1]),
        "progress went backwards: {values:?}"
    );
    assert!(values.iter().all(|v| *v <= 100));
    assert_eq!(values.last(), Some(&100));
}

async fn read_request_head(socket: &mut TcpStream) {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        request.extend_from_slice(&buf[..n]);
    }
}

/// Serves `body` once without a Content-Length header.
async fn serve_without_length(body: &'static [u8]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request_head(&mut socket).await;
        socket
            .write_all(b"HTTP/1.1 200 OK\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        socket.write_all(body).await.unwrap();
        socket.shutdown().await.unwrap();
    });

    format!("http://{addr}/stream")
}

/// Declares `declared` bytes, sends `sent`, then hangs up. Serves every
/// connection it gets.
async fn serve_truncated(declared: usize, sent: &'static [u8]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                read_request_head(&mut socket).await;
                let header = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {declared}\r\nConnection: close\r\n\r\n"
                );
                socket.write_all(header.as_bytes()).await.unwrap();
                socket.write_all(sent).await.unwrap();
                socket.flush().await.unwrap();
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{addr}/truncated")
}

/// Sends a 10 KiB body as 1 KiB blocks, one every 300 ms.
async fn serve_slowly() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                read_request_head(&mut socket).await;
                socket
                    .write_all(
                        b"HTTP/1.1 200 OK\r\nContent-Length: 10240\r\nConnection: close\r\n\r\n",
                    )
                    .await
                    .unwrap();
                for block in 0..10u8 {
                    tokio::time::sleep(Duration::from_millis(300)).await;
                    socket.write_all(&[block; 1024]).await.unwrap();
                }
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{addr}/slow")
}

/// Yields its bytes, then fails the next read. Flags `released` on drop.
struct BrokenReader {
    data: Vec<u8>,
    pos: usize,
    released: Arc<AtomicBool>,
}

impl AsyncRead for BrokenReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if this.pos == this.data.len() {
            return Poll::Ready(Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "asset storage went away",
            )));
        }
        let n = buf.remaining().min(this.data.len() - this.pos);
        buf.put_slice(&this.data[this.pos..this.pos + n]);
        this.pos += n;
        Poll::Ready(Ok(()))
    }
}

impl Drop for BrokenReader {
    fn drop(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

/// Asset bundle whose first open breaks after `fail_after` bytes; later
/// opens serve the whole asset.
struct FlakyAssets {
    data: Vec<u8>,
    fail_after: usize,
    opens: AtomicUsize,
    released: Arc<AtomicBool>,
}

#[async_trait]
impl AssetBundle for FlakyAssets {
    async fn open(&self, _name: &str) -> BridgeResult<AssetStream> {
        let first = self.opens.fetch_add(1, Ordering::SeqCst) == 0;
        let reader: Box<DynAsyncRead> = if first {
            Box::new(BrokenReader {
                data: self.data[..self.fail_after].to_vec(),
                pos: 0,
                released: self.released.clone(),
            })
        } else {
            Box::new(io::Cursor::new(self.data.clone()))
        };
        Ok(AssetStream {
            reader,
            length: self.data.len() as u64,
        })
    }
}

#[tokio::test]
async fn test_asset_copy_matches_source_and_overwrites() {
    let assets = TempDir::new().unwrap();
    let data = payload(10_000);
    std::fs::create_dir_all(assets.path().join("assets")).unwrap();
    std::fs::write(assets.path().join("assets/model.bin"), &data).unwrap();

    let out = TempDir::new().unwrap();
    let dest = out.path().join("nested/dir/model.bin");
    let engine = engine(assets.path(), NetworkProgressMode::default());
    let request = TransferRequest::copy_asset("assets/model.bin", &dest);

    let first = engine.execute(&request, &NoProgress).await.unwrap();
    assert_eq!(first.bytes_written, data.len() as u64);
    assert_eq!(std::fs::read(&dest).unwrap(), data);

    std::fs::write(&dest, vec![0xFFu8; 50_000]).unwrap();
    let second = engine.execute(&request, &NoProgress).await.unwrap();
    assert_eq!(second.bytes_written, data.len() as u64);
    assert_eq!(std::fs::read(&dest).unwrap(), data);
}

#[tokio::test]
async fn test_asset_progress_is_monotonic() {
    let assets = TempDir::new().unwrap();
    std::fs::write(assets.path().join("big.bin"), payload(64 * 1024)).unwrap();

    let out = TempDir::new().unwrap();
    let engine = engine(assets.path(), NetworkProgressMode::default());
    let request = TransferRequest::copy_asset("big.bin", out.path().join("big.bin")).with_progress();

    let (sender, mut stream) = progress_channel();
    engine.execute(&request, &sender).await.unwrap();

    let values = stream.drain();
    assert_progress_shape(&values);
    assert!(values.len() > 2, "expected intermediate values: {values:?}");
}

#[tokio::test]
async fn test_empty_asset_reports_zero_then_hundred() {
    let assets = TempDir::new().unwrap();
    std::fs::write(assets.path().join("empty.bin"), b"").unwrap();

    let out = TempDir::new().unwrap();
    let dest = out.path().join("empty.bin");
    let engine = engine(assets.path(), NetworkProgressMode::default());
    let request = TransferRequest::copy_asset("empty.bin", &dest).with_progress();

    let (sender, mut stream) = progress_channel();
    let outcome = engine.execute(&request, &sender).await.unwrap();

    assert_eq!(outcome.bytes_written, 0);
    assert_eq!(stream.drain(), vec![0, 100]);
    assert_eq!(std::fs::metadata(&dest).unwrap().len(), 0);
}

#[tokio::test]
async fn test_missing_asset_is_not_found() {
    let assets = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let dest = out.path().join("missing.bin");
    let engine = engine(assets.path(), NetworkProgressMode::default());

    let err = engine
        .execute(&TransferRequest::copy_asset("nope.bin", &dest), &NoProgress)
        .await
        .unwrap_err();

    assert_eq!(err.code(), "NOT_FOUND");
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_url_download_in_every_mode() {
    let server = MockServer::start().await;
    let body = payload(200_000);
    Mock::given(method("GET"))
        .and(path("/files/data.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .mount(&server)
        .await;
    let url = format!("{}/files/data.bin", server.uri());

    let assets = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    for mode in [NetworkProgressMode::NativeCallback, NetworkProgressMode::ChunkLoop] {
        let engine = engine(assets.path(), mode);

        let plain = out.path().join(format!("{mode:?}-plain.bin"));
        let outcome = engine
            .execute(&TransferRequest::download_url(&url, &plain), &NoProgress)
            .await
            .unwrap();
        assert_eq!(outcome.bytes_written, body.len() as u64);
        assert_eq!(std::fs::read(&plain).unwrap(), body);

        let tracked = out.path().join(format!("{mode:?}-tracked.bin"));
        let (sender, mut stream) = progress_channel();
        engine
            .execute(
                &TransferRequest::download_url(&url, &tracked).with_progress(),
                &sender,
            )
            .await
            .unwrap();
        assert_eq!(std::fs::read(&tracked).unwrap(), body);
        assert_progress_shape(&stream.drain());
    }
}

#[tokio::test]
async fn test_repeated_download_is_idempotent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"same bytes".to_vec()))
        .mount(&server)
        .await;

    let assets = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let dest = out.path().join("same.txt");
    let engine = engine(assets.path(), NetworkProgressMode::default());
    let request = TransferRequest::download_url(format!("{}/same", server.uri()), &dest);

    engine.execute(&request, &NoProgress).await.unwrap();
    engine.execute(&request, &NoProgress).await.unwrap();

    assert_eq!(std::fs::read(&dest).unwrap(), b"same bytes");
}

#[tokio::test]
async fn test_http_error_leaves_destination_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let url = format!("{}/missing?token=secret", server.uri());

    let assets = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let dest = out.path().join("keep.txt");
    std::fs::write(&dest, b"previous").unwrap();

    for mode in [NetworkProgressMode::NativeCallback, NetworkProgressMode::ChunkLoop] {
        let engine = engine(assets.path(), mode);
        for request in [
            TransferRequest::download_url(&url, &dest),
            TransferRequest::download_url(&url, &dest).with_progress(),
        ] {
            let err = engine.execute(&request, &NoProgress).await.unwrap_err();
            assert_eq!(err.code(), "NETWORK_ERROR");
            assert!(err.message().contains("404"));
            assert!(!err.message().contains("secret"));
            assert_eq!(std::fs::read(&dest).unwrap(), b"previous");
        }
    }
}

#[tokio::test]
async fn test_unknown_length_reports_zero_then_hundred() {
    let assets = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    for mode in [NetworkProgressMode::NativeCallback, NetworkProgressMode::ChunkLoop] {
        let url = serve_without_length(b"streamed without a length header").await;
        let dest = out.path().join(format!("{mode:?}.txt"));
        let engine = engine(assets.path(), mode);

        let (sender, mut stream) = progress_channel();
        engine
            .execute(
                &TransferRequest::download_url(&url, &dest).with_progress(),
                &sender,
            )
            .await
            .unwrap();

        assert_eq!(stream.drain(), vec![0, 100], "mode {mode:?}");
        assert_eq!(
            std::fs::read(&dest).unwrap(),
            b"streamed without a length header"
        );
    }
}

#[tokio::test]
async fn test_malformed_url_is_invalid_locator() {
    let assets = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let engine = engine(assets.path(), NetworkProgressMode::default());

    for url in ["not a url", "ftp://example.com/file"] {
        let err = engine
            .execute(
                &TransferRequest::download_url(url, out.path().join("x")).with_progress(),
                &NoProgress,
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_LOCATOR", "url {url}");
    }
}

#[tokio::test]
async fn test_events_follow_transfer_lifecycle() {
    let assets = TempDir::new().unwrap();
    std::fs::write(assets.path().join("a.bin"), payload(4096)).unwrap();
    let out = TempDir::new().unwrap();

    let bus = EventBus::new(256);
    let mut receiver = bus.subscribe();
    let engine = engine(assets.path(), NetworkProgressMode::default()).with_event_bus(bus);

    engine
        .execute(
            &TransferRequest::copy_asset("a.bin", out.path().join("a.bin")).with_progress(),
            &NoProgress,
        )
        .await
        .unwrap();
    engine
        .execute(
            &TransferRequest::copy_asset("b.bin", out.path().join("b.bin")),
            &NoProgress,
        )
        .await
        .unwrap_err();

    let mut events = Vec::new();
    while let Ok(CoreEvent::Transfer(event)) = receiver.try_recv() {
        events.push(event);
    }

    assert!(matches!(events.first(), Some(TransferEvent::Started { .. })));
    let completed = events
        .iter()
        .position(|e| matches!(e, TransferEvent::Completed { bytes_written: 4096, .. }))
        .unwrap();
    assert!(events[..completed]
        .iter()
        .any(|e| matches!(e, TransferEvent::Progress { percent: 100, .. })));
    assert!(matches!(
        events.last(),
        Some(TransferEvent::Failed { code, .. }) if code == "NOT_FOUND"
    ));
    assert_ne!(
        events.first().map(|e| e.transfer_id().to_string()),
        events.last().map(|e| e.transfer_id().to_string())
    );
}

#[tokio::test]
async fn test_broken_asset_stream_leaves_partial_file_and_rerun_recovers() {
    let data = payload(30_000);
    let released = Arc::new(AtomicBool::new(false));
    let assets = Arc::new(FlakyAssets {
        data: data.clone(),
        fail_after: 10_000,
        opens: AtomicUsize::new(0),
        released: released.clone(),
    });
    let engine = engine_over(
        assets,
        Arc::new(ReqwestHttpClient::new()),
        NetworkProgressMode::default(),
    );

    let out = TempDir::new().unwrap();
    let dest = out.path().join("model.bin");
    let request = TransferRequest::copy_asset("model.bin", &dest).with_progress();

    let (sender, mut stream) = progress_channel();
    let err = engine.execute(&request, &sender).await.unwrap_err();

    assert_eq!(err.code(), "IO_ERROR");
    assert!(released.load(Ordering::SeqCst), "source handle still open");
    assert_eq!(std::fs::metadata(&dest).unwrap().len(), 10_000);
    assert_eq!(std::fs::read(&dest).unwrap(), &data[..10_000]);
    assert!(!stream.drain().contains(&100));

    let outcome = engine.execute(&request, &NoProgress).await.unwrap();
    assert_eq!(outcome.bytes_written, data.len() as u64);
    assert_eq!(std::fs::read(&dest).unwrap(), data);
}

#[tokio::test]
async fn test_truncated_response_is_network_error() {
    static SENT: [u8; 4096] = [5u8; 4096];
    let url = serve_truncated(10_000, &SENT).await;
    let assets = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    // Streamed into the destination: the bytes that arrived stay on disk.
    let chunked = out.path().join("chunked.bin");
    let err = engine(assets.path(), NetworkProgressMode::ChunkLoop)
        .execute(
            &TransferRequest::download_url(&url, &chunked).with_progress(),
            &NoProgress,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "NETWORK_ERROR");
    assert_eq!(std::fs::read(&chunked).unwrap(), SENT);

    // Buffered and staged downloads never reach the destination.
    let native = engine(assets.path(), NetworkProgressMode::NativeCallback);
    for request in [
        TransferRequest::download_url(&url, out.path().join("kept.bin")),
        TransferRequest::download_url(&url, out.path().join("kept.bin")).with_progress(),
    ] {
        std::fs::write(out.path().join("kept.bin"), b"previous").unwrap();
        let err = native.execute(&request, &NoProgress).await.unwrap_err();
        assert_eq!(err.code(), "NETWORK_ERROR");
        assert_eq!(std::fs::read(out.path().join("kept.bin")).unwrap(), b"previous");
    }

    let leftovers: Vec<_> = std::fs::read_dir(out.path()).unwrap().collect();
    assert_eq!(leftovers.len(), 2, "staging file left behind");
}

#[tokio::test]
async fn test_slow_steady_body_outlasts_read_timeout() {
    let url = serve_slowly().await;
    let expected: Vec<u8> = (0..10u8).flat_map(|block| [block; 1024]).collect();
    let http = Arc::new(
        ReqwestHttpClient::with_options(&HttpClientOptions {
            read_timeout: Duration::from_secs(1),
            ..HttpClientOptions::default()
        })
        .unwrap(),
    );
    let assets: Arc<dyn AssetBundle> = Arc::new(DirectoryAssetBundle::new(std::env::temp_dir()));
    let out = TempDir::new().unwrap();

    let native = engine_over(assets.clone(), http.clone(), NetworkProgressMode::NativeCallback);
    let chunked = engine_over(assets, http, NetworkProgressMode::ChunkLoop);

    let plain_dest = out.path().join("plain.bin");
    let native_dest = out.path().join("native.bin");
    let chunked_dest = out.path().join("chunked.bin");
    let (native_tx, mut native_rx) = progress_channel();
    let (chunked_tx, mut chunked_rx) = progress_channel();

    let plain_request = TransferRequest::download_url(&url, &plain_dest);
    let native_request = TransferRequest::download_url(&url, &native_dest).with_progress();
    let chunked_request = TransferRequest::download_url(&url, &chunked_dest).with_progress();

    let (plain, tracked_native, tracked_chunked) = tokio::join!(
        native.execute(&plain_request, &NoProgress),
        native.execute(&native_request, &native_tx),
        chunked.execute(&chunked_request, &chunked_tx),
    );

    for outcome in [plain, tracked_native, tracked_chunked] {
        assert_eq!(outcome.unwrap().bytes_written, 10_240);
    }
    for dest in [&plain_dest, &native_dest, &chunked_dest] {
        assert_eq!(std::fs::read(dest).unwrap(), expected);
    }
    assert_progress_shape(&native_rx.drain());
    assert_progress_shape(&chunked_rx.drain());
}
