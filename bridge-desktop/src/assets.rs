//! Asset bundle backed by a directory on disk.

use async_trait::async_trait;
use bridge_traits::{
    assets::{AssetBundle, AssetStream},
    error::{BridgeError, Result},
};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Subdirectory Flutter uses for bundled assets.
const FLUTTER_ASSETS_DIR: &str = "flutter_assets";

/// Resolves asset names against a root directory.
///
/// A name is looked up as `<root>/flutter_assets/<name>` first (the lookup
/// key Flutter assigns to bundled assets), then as `<root>/<name>`. Names that
/// are absolute or climb out of the root never resolve.
#[derive(Debug, Clone)]
pub struct DirectoryAssetBundle {
    root: PathBuf,
}

impl DirectoryAssetBundle {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn candidates(&self, name: &str) -> Option<[PathBuf; 2]> {
        let relative = Path::new(name);
        if name.is_empty() || !is_contained(relative) {
            return None;
        }
        Some([
            self.root.join(FLUTTER_ASSETS_DIR).join(relative),
            self.root.join(relative),
        ])
    }

    async fn resolve(&self, name: &str) -> Result<(PathBuf, u64)> {
        let candidates = self
            .candidates(name)
            .ok_or_else(|| BridgeError::NotFound(format!("asset '{name}'")))?;

        for candidate in candidates {
            match fs::metadata(&candidate).await {
                Ok(metadata) if metadata.is_file() => return Ok((candidate, metadata.len())),
                Ok(_) => continue,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(BridgeError::NotFound(format!("asset '{name}'")))
    }
}

fn is_contained(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[async_trait]
impl AssetBundle for DirectoryAssetBundle {
    async fn open(&self, name: &str) -> Result<AssetStream> {
        let (path, length) = self.resolve(name).await?;
        let file = fs::File::open(&path).await?;
        debug!(asset = name, size = length, "Opened bundled asset");

        Ok(AssetStream {
            reader: Box::new(file),
            length,
        })
    }
}
