//! Synchronization primitives.
//!
//! Async-aware primitives are re-exported from `tokio::sync`. The transfer
//! service uses `Semaphore` to bound concurrent transfers, `mpsc` channels
//! for per-request progress streams and `broadcast` for the event bus.
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::Semaphore;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let slots = Arc::new(Semaphore::new(2));
//! let permit = slots.clone().acquire_owned().await.unwrap();
//! assert_eq!(slots.available_permits(), 1);
//! drop(permit);
//! # }
//! ```

pub use tokio::sync::{broadcast, mpsc, Semaphore};
