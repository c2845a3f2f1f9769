//! Async I/O traits used for source and destination streams.

pub use tokio::io::{sink, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
