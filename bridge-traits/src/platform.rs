//! Trait-object aliases shared by every bridge.
//!
//! Source and destination streams cross task boundaries, so both directions
//! are boxed with `Send + Unpin`.

/// Boxed readable byte stream handed out by asset bundles and HTTP clients.
pub type DynAsyncRead = dyn core_async::io::AsyncRead + Send + Unpin;

/// Boxed writable byte stream handed out by filesystem bridges.
pub type DynAsyncWrite = dyn core_async::io::AsyncWrite + Send + Unpin;
