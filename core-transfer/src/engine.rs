//! The transfer engine.
//!
//! One call to [`TransferEngine::execute`] performs one transfer:
//!
//! 1. validate the request
//! 2. open the source (asset bundle, streamed response or platform download)
//! 3. replace the destination and copy bytes across in fixed-size chunks
//! 4. report progress and publish lifecycle events
//!
//! The source is always opened before the destination is touched, so a
//! missing asset, bad URL or HTTP error leaves an existing file intact.

use crate::error::{Result, TransferError};
use crate::progress::{ProgressReporter, ProgressTracker};
use crate::request::{SourceKind, TransferOutcome, TransferRequest};
use crate::source::{AssetSource, NetworkSource, OpenedSource, SourceAdapter};
use bridge_traits::platform::{DynAsyncRead, DynAsyncWrite};
use bridge_traits::{Clock, FileSystemAccess};
use core_async::io::{AsyncReadExt, AsyncWriteExt};
use core_async::Instant;
use core_runtime::config::{CoreConfig, NetworkProgressMode, TransferSettings};
use core_runtime::events::{CoreEvent, EventBus, TransferEvent};
use core_runtime::logging::{redact_url, strip_path};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Drives transfers against the configured host bridges.
///
/// Cheap to clone; clones share bridges and the event bus.
#[derive(Clone)]
pub struct TransferEngine {
    assets: AssetSource,
    network: NetworkSource,
    file_system: Arc<dyn FileSystemAccess>,
    clock: Arc<dyn Clock>,
    settings: TransferSettings,
    events: Option<EventBus>,
}

/// Forwards to the caller's reporter and mirrors values onto the event bus.
struct Reporting<'a> {
    inner: &'a dyn ProgressReporter,
    events: Option<&'a EventBus>,
    transfer_id: &'a str,
}

impl ProgressReporter for Reporting<'_> {
    fn report(&self, percent: u8) {
        self.inner.report(percent);
        if let Some(bus) = self.events {
            let _ = bus.emit(CoreEvent::Transfer(TransferEvent::Progress {
                transfer_id: self.transfer_id.to_string(),
                percent,
            }));
        }
    }
}

impl TransferEngine {
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            assets: AssetSource::new(Arc::clone(&config.asset_bundle)),
            network: NetworkSource::new(Arc::clone(&config.http_client)),
            file_system: Arc::clone(&config.file_system),
            clock: Arc::clone(&config.clock),
            settings: config.transfer.clone(),
            events: None,
        }
    }

    /// Publish lifecycle events on `bus`.
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn settings(&self) -> &TransferSettings {
        &self.settings
    }

    /// Perform one transfer, reporting progress to `reporter` when the
    /// request asked for it.
    pub async fn execute(
        &self,
        request: &TransferRequest,
        reporter: &dyn ProgressReporter,
    ) -> Result<TransferOutcome> {
        let transfer_id = Uuid::new_v4().to_string();
        let span = info_span!(
            "transfer",
            transfer_id = %transfer_id,
            kind = ?request.source_kind(),
            progress = request.report_progress()
        );

        self.run(&transfer_id, request, reporter)
            .instrument(span)
            .await
    }

    async fn run(
        &self,
        transfer_id: &str,
        request: &TransferRequest,
        reporter: &dyn ProgressReporter,
    ) -> Result<TransferOutcome> {
        request.validate()?;

        let destination = request.destination_path();
        let display_name = strip_path(&destination.to_string_lossy()).to_string();
        info!(
            source = %self.describe_source(request),
            destination = %display_name,
            "Transfer started"
        );
        self.publish(TransferEvent::Started {
            transfer_id: transfer_id.to_string(),
            kind: request.source_kind().into(),
            destination: display_name,
            with_progress: request.report_progress(),
            started_at_ms: self.clock.unix_timestamp_millis(),
        });

        let started = Instant::now();
        let reporting = Reporting {
            inner: reporter,
            events: self.events.as_ref(),
            transfer_id,
        };
        let tracker = ProgressTracker::new(&reporting, request.report_progress());

        let result = match (request.source_kind(), request.report_progress()) {
            (SourceKind::Asset, _) => self.pull(&self.assets, request, &tracker).await,
            (SourceKind::Url, false) => self.buffered(request).await,
            (SourceKind::Url, true) => match self.settings.network_progress {
                NetworkProgressMode::NativeCallback => self.push(request, &tracker).await,
                NetworkProgressMode::ChunkLoop => {
                    self.pull(&self.network, request, &tracker).await
                }
            },
        };

        match result {
            Ok(bytes_written) => {
                tracker.finish();
                let elapsed = started.elapsed();
                info!(
                    bytes = bytes_written,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Transfer completed"
                );
                self.publish(TransferEvent::Completed {
                    transfer_id: transfer_id.to_string(),
                    bytes_written,
                    duration_ms: elapsed.as_millis() as u64,
                });

                Ok(TransferOutcome {
                    destination: destination.to_path_buf(),
                    bytes_written,
                    elapsed,
                })
            }
            Err(error) => {
                warn!(code = error.code(), error = %error, "Transfer failed");
                self.publish(TransferEvent::Failed {
                    transfer_id: transfer_id.to_string(),
                    code: error.code().to_string(),
                    message: error.message().to_string(),
                });
                Err(error)
            }
        }
    }

    /// Chunked copy from an opened source into a fresh destination file.
    async fn pull(
        &self,
        source: &dyn SourceAdapter,
        request: &TransferRequest,
        tracker: &ProgressTracker<'_>,
    ) -> Result<u64> {
        let OpenedSource {
            mut reader,
            total_bytes,
        } = source.open(request.source_locator()).await?;
        tracker.begin(total_bytes);

        let mut writer = self.prepare_destination(request.destination_path()).await?;

        match self.copy_chunks(source, &mut reader, &mut writer, tracker).await {
            Ok(written) => {
                writer.flush().await?;
                writer.shutdown().await?;
                debug!(bytes = written, "Source exhausted");
                Ok(written)
            }
            Err(error) => {
                // Settle what was written so the partial file is complete on disk.
                if let Err(close) = writer.shutdown().await {
                    debug!(error = %close, "Failed to close partial destination");
                }
                Err(error)
            }
        }
    }

    async fn copy_chunks(
        &self,
        source: &dyn SourceAdapter,
        reader: &mut Box<DynAsyncRead>,
        writer: &mut Box<DynAsyncWrite>,
        tracker: &ProgressTracker<'_>,
    ) -> Result<u64> {
        let mut buffer = vec![0u8; self.settings.chunk_size];
        let mut written = 0u64;

        loop {
            let read = reader
                .read(&mut buffer)
                .await
                .map_err(|e| source.read_error(e))?;
            if read == 0 {
                return Ok(written);
            }
            writer.write_all(&buffer[..read]).await?;
            written += read as u64;
            tracker.advance(written);
        }
    }

    /// Whole-body download, written once the response is complete.
    async fn buffered(&self, request: &TransferRequest) -> Result<u64> {
        let url = NetworkSource::parse_locator(request.source_locator())?;
        let body = self.network.fetch(&url).await?;

        let mut writer = self.prepare_destination(request.destination_path()).await?;
        writer.write_all(&body).await?;
        writer.flush().await?;
        writer.shutdown().await?;
        Ok(body.len() as u64)
    }

    /// Platform-driven download; the tracker observes its notifications.
    async fn push(&self, request: &TransferRequest, tracker: &ProgressTracker<'_>) -> Result<u64> {
        let url = NetworkSource::parse_locator(request.source_locator())?;
        self.network
            .download_to(&url, request.destination_path(), tracker)
            .await
    }

    /// Create missing parents, remove any existing file, open a fresh one.
    async fn prepare_destination(&self, path: &Path) -> Result<Box<DynAsyncWrite>> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.file_system.create_dir_all(parent).await?;
        }
        if self.file_system.exists(path).await? {
            debug!("Removing existing destination");
            self.file_system.remove_file(path).await?;
        }
        Ok(self.file_system.create_file(path).await?)
    }

    fn describe_source(&self, request: &TransferRequest) -> String {
        match request.source_kind() {
            SourceKind::Asset => request.source_locator().to_string(),
            SourceKind::Url => redact_url(request.source_locator()),
        }
    }

    fn publish(&self, event: TransferEvent) {
        if let Some(bus) = &self.events {
            let _ = bus.emit(CoreEvent::Transfer(event));
        }
    }
}
