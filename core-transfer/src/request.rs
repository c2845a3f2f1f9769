use crate::error::{Result, TransferError};
use core_runtime::events::TransferKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where a transfer reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// A resource bundled with the host application
    Asset,
    /// An HTTP(S) URL
    Url,
}

impl From<SourceKind> for TransferKind {
    fn from(kind: SourceKind) -> Self {
        match kind {
            SourceKind::Asset => TransferKind::Asset,
            SourceKind::Url => TransferKind::Url,
        }
    }
}

/// One transfer to perform. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    source_kind: SourceKind,
    source_locator: String,
    destination_path: PathBuf,
    report_progress: bool,
}

impl TransferRequest {
    /// Copy a bundled asset to `destination`.
    pub fn copy_asset(asset_name: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source_kind: SourceKind::Asset,
            source_locator: asset_name.into(),
            destination_path: destination.into(),
            report_progress: false,
        }
    }

    /// Download `url` to `destination`.
    pub fn download_url(url: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source_kind: SourceKind::Url,
            source_locator: url.into(),
            destination_path: destination.into(),
            report_progress: false,
        }
    }

    /// Request percentage notifications for this transfer.
    pub fn with_progress(mut self) -> Self {
        self.report_progress = true;
        self
    }

    pub fn source_kind(&self) -> SourceKind {
        self.source_kind
    }

    pub fn source_locator(&self) -> &str {
        &self.source_locator
    }

    pub fn destination_path(&self) -> &Path {
        &self.destination_path
    }

    pub fn report_progress(&self) -> bool {
        self.report_progress
    }

    /// Rejects empty locators and destinations.
    pub fn validate(&self) -> Result<()> {
        if self.source_locator.trim().is_empty() {
            let what = match self.source_kind {
                SourceKind::Asset => "asset name",
                SourceKind::Url => "url",
            };
            return Err(TransferError::InvalidArgument(format!("{what} is empty")));
        }
        if self.destination_path.as_os_str().is_empty() {
            return Err(TransferError::InvalidArgument(
                "target path is empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Result of a successful transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    pub destination: PathBuf,
    pub bytes_written: u64,
    pub elapsed: Duration,
}
