//! Time-related re-exports.
//!
//! ```rust
//! use core_async::time::{Duration, Instant};
//!
//! let started = Instant::now();
//! assert!(started.elapsed() < Duration::from_secs(60));
//! ```

pub use std::time::{Duration, Instant};
