//! Runtime abstraction layer for the large file handler core.
//!
//! Core crates (`core-transfer`, `core-service`, `core-runtime`) depend on this
//! crate instead of naming Tokio directly. Every host the handler currently
//! targets (desktop, and mobile hosts that embed a Tokio runtime) runs on
//! Tokio, so the modules below are thin re-exports. Keeping them behind one
//! crate means a different executor only has to be wired in here.
//!
//! # Modules
//!
//! - `task`: spawning transfer tasks
//! - `io`: async read/write traits used by source and destination streams
//! - `sync`: semaphores and channels
//! - `runtime`: `block_on` for synchronous entry points
//! - `time`: durations and instants
//!
//! # Examples
//!
//! ```rust
//! use core_async::task;
//!
//! # async fn example() {
//! let handle = task::spawn(async { 1024u64 });
//! assert_eq!(handle.await.unwrap(), 1024);
//! # }
//! ```

pub mod io;
pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

pub use task::spawn;
pub use time::{Duration, Instant};
