//! File System Abstraction
//!
//! Destination files are always written through [`FileSystemAccess`] so hosts
//! with sandboxed storage (iOS containers, Android scoped storage) can route
//! writes through their own APIs.

use async_trait::async_trait;
use std::path::Path;

use crate::error::Result;
use crate::platform::DynAsyncWrite;

/// File system access trait
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::FileSystemAccess;
///
/// async fn replace(fs: &dyn FileSystemAccess, path: &Path) -> Result<()> {
///     if fs.exists(path).await? {
///         fs.remove_file(path).await?;
///     }
///     let _writer = fs.create_file(path).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait FileSystemAccess: Send + Sync {
    /// Check if a file or directory exists
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Create a directory and all parent directories if they don't exist
    async fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Delete a file
    async fn remove_file(&self, path: &Path) -> Result<()>;

    /// Create (or truncate) a file and open it for streaming writes.
    ///
    /// Never appends to existing content.
    async fn create_file(&self, path: &Path) -> Result<Box<DynAsyncWrite>>;
}
