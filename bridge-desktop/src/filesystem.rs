//! File System Access Implementation using Tokio

use async_trait::async_trait;
use bridge_traits::{
    error::Result,
    platform::DynAsyncWrite,
    storage::FileSystemAccess,
};
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Tokio-based file system implementation
///
/// Paths are used as given; the host decides where destinations live.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileSystem;

impl TokioFileSystem {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileSystemAccess for TokioFileSystem {
    async fn exists(&self, path: &Path) -> Result<bool> {
        Ok(fs::try_exists(path).await?)
    }

    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).await?;
        debug!(path = ?path, "Created directory");
        Ok(())
    }

    async fn remove_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).await?;
        debug!(path = ?path, "Deleted file");
        Ok(())
    }

    async fn create_file(&self, path: &Path) -> Result<Box<DynAsyncWrite>> {
        let file = fs::File::create(path).await?;
        debug!(path = ?path, "Opened file for writing");
        Ok(Box::new(file))
    }
}
