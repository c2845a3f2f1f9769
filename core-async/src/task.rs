//! Task spawning.
//!
//! Each transfer request runs as its own task so the caller's primary context
//! is never blocked by stream reads, writes or network I/O.
//!
//! # Examples
//!
//! ```rust
//! use core_async::task;
//!
//! # async fn example() {
//! let handle = task::spawn(async { "done" });
//! assert_eq!(handle.await.unwrap(), "done");
//! # }
//! ```

pub use tokio::task::{JoinError, JoinHandle};

/// Spawns a new asynchronous task on the current runtime.
///
/// The task may run on a different worker thread than the caller.
///
/// # Panics
///
/// Panics when called outside of a runtime context, like `tokio::spawn`.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::task::spawn(future)
}
