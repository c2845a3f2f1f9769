//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `AssetBundle` over an asset directory ([`DirectoryAssetBundle`])
//! - `HttpClient` using `reqwest` ([`ReqwestHttpClient`])
//! - `FileSystemAccess` using `tokio::fs` ([`TokioFileSystem`])
//! - `MainDispatcher` as a FIFO queue drained by one thread or task
//!   ([`QueueDispatcher`]), or inline on the caller ([`InlineDispatcher`])
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{DirectoryAssetBundle, ReqwestHttpClient, TokioFileSystem};
//!
//! #[tokio::main]
//! async fn main() {
//!     let assets = DirectoryAssetBundle::new("./build/flutter_assets/..");
//!     let http_client = ReqwestHttpClient::new();
//!     let fs = TokioFileSystem::new();
//!
//!     // Use in core configuration
//! }
//! ```

mod assets;
mod dispatch;
mod filesystem;
mod http;

pub use assets::DirectoryAssetBundle;
pub use dispatch::{InlineDispatcher, MainLoop, QueueDispatcher};
pub use filesystem::TokioFileSystem;
pub use http::{HttpClientOptions, ReqwestHttpClient};
