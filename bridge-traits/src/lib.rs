//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the transfer core and
//! platform-specific implementations. Each trait represents a capability the
//! core requires but that the host provides differently per platform
//! (desktop, iOS, Android).
//!
//! ## Traits
//!
//! ### Sources & Destinations
//! - [`AssetBundle`](assets::AssetBundle) - Resolve and open assets bundled with the app
//! - [`HttpClient`](http::HttpClient) - Buffered, streamed and push-progress downloads
//! - [`FileSystemAccess`](storage::FileSystemAccess) - Destination file management
//!
//! ### Platform Integration
//! - [`MainDispatcher`](dispatch::MainDispatcher) - Run callbacks on the host's primary context
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate |
//! |----------|---------------------|
//! | Desktop  | `bridge-desktop`    |
//! | iOS      | host plugin         |
//! | Android  | host plugin         |
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Platform
//! implementations should convert native errors into the closest variant,
//! keeping the path or URL in the message so the core can classify it.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so adapters can be shared across
//! transfer tasks.

pub mod assets;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod platform;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use assets::{AssetBundle, AssetStream};
pub use dispatch::{MainDispatcher, MainTask};
pub use http::{
    DownloadObserver, DownloadProgress, HttpClient, HttpRequest, HttpResponse, HttpStream,
};
pub use platform::{DynAsyncRead, DynAsyncWrite};
pub use storage::FileSystemAccess;
pub use time::{Clock, ConsoleLogger, LogEntry, LogLevel, LoggerSink, SystemClock};
