//! # Transfer Engine
//!
//! Moves bytes from a source (bundled asset or HTTP response) into a
//! destination file while reporting monotonically increasing completion
//! percentages.
//!
//! ## Components
//!
//! - [`TransferEngine`](engine::TransferEngine) - drives the read/write/progress loop
//! - [`AssetSource`](source::AssetSource) / [`NetworkSource`](source::NetworkSource) -
//!   open sources through the host bridges and report their size
//! - [`ProgressReporter`](progress::ProgressReporter) - where percentages go:
//!   the shared [`ProgressSink`](progress::ProgressSink), a per-request
//!   [`ProgressSender`](progress::ProgressSender), or [`NoProgress`](progress::NoProgress)
//!
//! ## Example
//!
//! ```ignore
//! use core_transfer::{progress_channel, TransferEngine, TransferRequest};
//!
//! let engine = TransferEngine::new(&config);
//! let (sender, mut progress) = progress_channel();
//! let request = TransferRequest::download_url(url, "/tmp/big.bin").with_progress();
//!
//! let outcome = engine.execute(&request, &sender).await?;
//! assert_eq!(progress.drain().last(), Some(&100));
//! ```

pub mod engine;
pub mod error;
pub mod progress;
pub mod request;
pub mod source;

pub use engine::TransferEngine;
pub use error::{Result, TransferError};
pub use progress::{
    progress_channel, NoProgress, ProgressReporter, ProgressSender, ProgressSink, ProgressStream,
    ProgressTracker, SubscriptionHandle,
};
pub use request::{SourceKind, TransferOutcome, TransferRequest};
pub use source::{AssetSource, NetworkSource, OpenedSource, SourceAdapter};
