//! Bundled Asset Abstraction
//!
//! Assets shipped inside the host application (Flutter `flutter_assets`,
//! iOS bundle resources, Android `AssetManager` entries) are opened through
//! [`AssetBundle`]. The identifier is opaque to the core; only the platform
//! adapter knows how to resolve it.

use async_trait::async_trait;

use crate::error::Result;
use crate::platform::DynAsyncRead;

/// An opened asset: a readable stream plus its byte length.
pub struct AssetStream {
    pub reader: Box<DynAsyncRead>,
    /// Total length in bytes. `0` when the platform cannot report a size.
    pub length: u64,
}

impl std::fmt::Debug for AssetStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetStream")
            .field("length", &self.length)
            .finish()
    }
}

/// Read access to assets bundled with the host application.
#[async_trait]
pub trait AssetBundle: Send + Sync {
    /// Open an asset for streaming reads.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BridgeError::NotFound`] if `name` does not resolve to an asset.
    async fn open(&self, name: &str) -> Result<AssetStream>;
}
