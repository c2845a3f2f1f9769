//! # Core Configuration Module
//!
//! Provides configuration management for the large file handler core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! [`CoreConfig`] that holds every host bridge the transfer engine needs plus
//! the [`TransferSettings`] that tune it. Validation is fail-fast: a missing
//! bridge is reported by name before any transfer runs.
//!
//! ## Required Bridges
//!
//! - `AssetBundle` - Source of bundled assets (desktop default: directory bundle)
//! - `HttpClient` - Network source (desktop default: reqwest)
//! - `FileSystemAccess` - Destination files (desktop default: tokio fs)
//! - `MainDispatcher` - Primary-context delivery (desktop default: dispatch thread)
//!
//! ## Optional Bridges
//!
//! - `LoggerSink` - Mirrors core logs into the host's logging pipeline
//! - `Clock` - Time source for lifecycle timestamps (default: system clock)
//!
//! When the `desktop-shims` feature is enabled, desktop-ready defaults for
//! the required bridges are injected automatically if not provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{CoreConfig, TransferSettings};
//!
//! let config = CoreConfig::builder()
//!     .asset_root("/opt/app/data")
//!     .transfer_settings(TransferSettings::default().with_chunk_size(64 * 1024))
//!     .build()?;
//! ```
//!
//! Without `desktop-shims`, omitting a bridge fails:
//!
//! ```ignore
//! let err = CoreConfig::builder().build().unwrap_err();
//! // Error::CapabilityMissing { capability: "AssetBundle", .. }
//! ```

use crate::error::{Error, Result};
use bridge_traits::{
    AssetBundle, Clock, FileSystemAccess, HttpClient, LoggerSink, MainDispatcher, SystemClock,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Default read/write chunk size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Largest accepted chunk size (16 MiB).
pub const MAX_CHUNK_SIZE: usize = 16 * 1024 * 1024;

/// Default idle limit while waiting for response bytes.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Default number of transfers allowed to run at once.
pub const DEFAULT_MAX_CONCURRENT_TRANSFERS: usize = 4;

/// How a progress-reporting URL download is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkProgressMode {
    /// Hand the download to the platform facility and translate its
    /// progress notifications.
    #[default]
    NativeCallback,
    /// Pull the response body through the same chunk loop used for assets.
    ChunkLoop,
}

/// Tuning knobs for the transfer engine and its HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSettings {
    /// Bytes read per loop iteration
    pub chunk_size: usize,
    /// Upper bound on transfers running at the same time
    pub max_concurrent_transfers: usize,
    /// Longest wait for the next bytes of a response before giving up
    pub read_timeout: Duration,
    /// Optional cap on a whole request, body included. `None` lets a
    /// download run as long as data keeps arriving.
    pub request_timeout: Option<Duration>,
    pub connect_timeout: Duration,
    pub user_agent: String,
    /// Capacity of the lifecycle event channel
    pub event_buffer_size: usize,
    pub network_progress: NetworkProgressMode,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_concurrent_transfers: DEFAULT_MAX_CONCURRENT_TRANSFERS,
            read_timeout: DEFAULT_READ_TIMEOUT,
            request_timeout: None,
            connect_timeout: Duration::from_secs(10),
            user_agent: concat!("large-file-handler/", env!("CARGO_PKG_VERSION")).to_string(),
            event_buffer_size: crate::events::DEFAULT_EVENT_BUFFER_SIZE,
            network_progress: NetworkProgressMode::default(),
        }
    }
}

impl TransferSettings {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_max_concurrent_transfers(mut self, max: usize) -> Self {
        self.max_concurrent_transfers = max;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Cap every request, body included, at `timeout`.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = size;
        self
    }

    pub fn with_network_progress(mut self, mode: NetworkProgressMode) -> Self {
        self.network_progress = mode;
        self
    }

    /// Validates every setting and reports the first one out of range.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 || self.chunk_size > MAX_CHUNK_SIZE {
            return Err(Error::InvalidSetting {
                field: "chunk_size",
                message: format!(
                    "must be between 1 and {MAX_CHUNK_SIZE} bytes, got {}",
                    self.chunk_size
                ),
            });
        }

        if self.max_concurrent_transfers == 0 {
            return Err(Error::InvalidSetting {
                field: "max_concurrent_transfers",
                message: "at least one transfer must be allowed".to_string(),
            });
        }

        if self.read_timeout.is_zero() {
            return Err(Error::InvalidSetting {
                field: "read_timeout",
                message: "must be greater than zero".to_string(),
            });
        }

        if self.request_timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::InvalidSetting {
                field: "request_timeout",
                message: "must be greater than zero when set".to_string(),
            });
        }

        if self.connect_timeout.is_zero() {
            return Err(Error::InvalidSetting {
                field: "connect_timeout",
                message: "must be greater than zero".to_string(),
            });
        }

        if self.user_agent.trim().is_empty() {
            return Err(Error::InvalidSetting {
                field: "user_agent",
                message: "cannot be empty".to_string(),
            });
        }

        if self.event_buffer_size == 0 {
            return Err(Error::InvalidSetting {
                field: "event_buffer_size",
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

/// Core configuration for the large file handler.
///
/// Holds all bridges and settings required to run transfers. Use
/// [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    pub asset_bundle: Arc<dyn AssetBundle>,
    pub http_client: Arc<dyn HttpClient>,
    pub file_system: Arc<dyn FileSystemAccess>,
    /// Runs result and progress callbacks on the host's primary context
    pub dispatcher: Arc<dyn MainDispatcher>,
    pub logger_sink: Option<Arc<dyn LoggerSink>>,
    pub clock: Arc<dyn Clock>,
    pub transfer: TransferSettings,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("asset_bundle", &"AssetBundle { ... }")
            .field("http_client", &"HttpClient { ... }")
            .field("file_system", &"FileSystemAccess { ... }")
            .field("dispatcher", &"MainDispatcher { ... }")
            .field(
                "logger_sink",
                &self.logger_sink.as_ref().map(|_| "LoggerSink { ... }"),
            )
            .field("transfer", &self.transfer)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        self.transfer.validate()
    }
}

#[cfg(feature = "desktop-shims")]
mod defaults {
    use super::*;
    use bridge_desktop::{
        DirectoryAssetBundle, HttpClientOptions, QueueDispatcher, ReqwestHttpClient,
        TokioFileSystem,
    };

    pub(super) fn asset_bundle(root: Option<PathBuf>) -> Result<Arc<dyn AssetBundle>> {
        let root = match root {
            Some(root) => root,
            None => std::env::current_dir().map_err(|e| {
                Error::Internal(format!("Cannot resolve default asset root: {e}"))
            })?,
        };
        Ok(Arc::new(DirectoryAssetBundle::new(root)))
    }

    pub(super) fn http_client(settings: &TransferSettings) -> Result<Arc<dyn HttpClient>> {
        let options = HttpClientOptions {
            read_timeout: settings.read_timeout,
            request_timeout: settings.request_timeout,
            connect_timeout: settings.connect_timeout,
            user_agent: settings.user_agent.clone(),
        };
        let client = ReqwestHttpClient::with_options(&options)
            .map_err(|e| Error::Internal(format!("Failed to build default HttpClient: {e}")))?;
        Ok(Arc::new(client))
    }

    pub(super) fn file_system() -> Result<Arc<dyn FileSystemAccess>> {
        Ok(Arc::new(TokioFileSystem::new()))
    }

    pub(super) fn dispatcher() -> Result<Arc<dyn MainDispatcher>> {
        let dispatcher = QueueDispatcher::spawn_thread("lfh-main").map_err(|e| {
            Error::Internal(format!("Failed to start default dispatch thread: {e}"))
        })?;
        Ok(Arc::new(dispatcher))
    }
}

#[cfg(not(feature = "desktop-shims"))]
mod defaults {
    use super::*;

fn capability_missing(capability: &str, desktop_default: &str, mobile: &str) -> Error {
    Error::CapabilityMissing {
        capability: capability.to_string(),
        message: format!(
            "{capability} implementation is required. \
             Desktop: enable the 'desktop-shims' feature to use the default {desktop_default}. \
             Mobile: inject {mobile}."
        ),
    }
}


    pub(super) fn asset_bundle(_root: Option<PathBuf>) -> Result<Arc<dyn AssetBundle>> {
        Err(capability_missing(
            "AssetBundle",
            "DirectoryAssetBundle",
            "a bundle backed by the platform asset APIs",
        ))
    }

    pub(super) fn http_client(_settings: &TransferSettings) -> Result<Arc<dyn HttpClient>> {
        Err(capability_missing(
            "HttpClient",
            "ReqwestHttpClient",
            "the platform networking stack (URLSession/OkHttp)",
        ))
    }

    pub(super) fn file_system() -> Result<Arc<dyn FileSystemAccess>> {
        Err(capability_missing(
            "FileSystemAccess",
            "TokioFileSystem",
            "sandbox-aware file access",
        ))
    }

    pub(super) fn dispatcher() -> Result<Arc<dyn MainDispatcher>> {
        Err(capability_missing(
            "MainDispatcher",
            "QueueDispatcher",
            "a dispatcher that posts to the UI thread",
        ))
    }
}

/// Builder for constructing [`CoreConfig`] instances.
///
/// Set bridges and settings incrementally, then call
/// [`build()`](CoreConfigBuilder::build).
#[derive(Default)]
pub struct CoreConfigBuilder {
    asset_bundle: Option<Arc<dyn AssetBundle>>,
    asset_root: Option<PathBuf>,
    http_client: Option<Arc<dyn HttpClient>>,
    file_system: Option<Arc<dyn FileSystemAccess>>,
    dispatcher: Option<Arc<dyn MainDispatcher>>,
    logger_sink: Option<Arc<dyn LoggerSink>>,
    clock: Option<Arc<dyn Clock>>,
    transfer: Option<TransferSettings>,
}

impl CoreConfigBuilder {
    /// Sets the asset bundle implementation.
    pub fn asset_bundle(mut self, bundle: Arc<dyn AssetBundle>) -> Self {
        self.asset_bundle = Some(bundle);
        self
    }

    /// Root directory for the desktop asset bundle.
    ///
    /// Ignored when an explicit [`asset_bundle`](Self::asset_bundle) is set.
    /// Defaults to the current directory.
    pub fn asset_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.asset_root = Some(root.into());
        self
    }

    /// Sets the HTTP client implementation.
    ///
    /// If not provided, the desktop default (reqwest-based, configured from
    /// [`TransferSettings`]) is used when `desktop-shims` is enabled.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the file system access implementation.
    pub fn file_system(mut self, fs: Arc<dyn FileSystemAccess>) -> Self {
        self.file_system = Some(fs);
        self
    }

    /// Sets the primary-context dispatcher.
    ///
    /// The desktop default is a `QueueDispatcher` drained by a dedicated
    /// thread named `lfh-main`.
    pub fn dispatcher(mut self, dispatcher: Arc<dyn MainDispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn logger_sink(mut self, sink: Arc<dyn LoggerSink>) -> Self {
        self.logger_sink = Some(sink);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn transfer_settings(mut self, settings: TransferSettings) -> Self {
        self.transfer = Some(settings);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// Settings are validated before any default bridge is constructed, so an
    /// invalid value never spawns a dispatch thread or HTTP client.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidSetting`] when a transfer setting is out of range
    /// - [`Error::CapabilityMissing`] when a required bridge is absent and no
    ///   desktop default is available
    pub fn build(self) -> Result<CoreConfig> {
        let transfer = self.transfer.unwrap_or_default();
        transfer.validate()?;

        let asset_bundle = match self.asset_bundle {
            Some(bundle) => bundle,
            None => defaults::asset_bundle(self.asset_root)?,
        };

        let http_client = match self.http_client {
            Some(client) => client,
            None => defaults::http_client(&transfer)?,
        };

        let file_system = match self.file_system {
            Some(fs) => fs,
            None => defaults::file_system()?,
        };

        let dispatcher = match self.dispatcher {
            Some(dispatcher) => dispatcher,
            None => defaults::dispatcher()?,
        };

        let config = CoreConfig {
            asset_bundle,
            http_client,
            file_system,
            dispatcher,
            logger_sink: self.logger_sink,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            transfer,
        };

        config.validate()?;
        Ok(config)
    }
}
