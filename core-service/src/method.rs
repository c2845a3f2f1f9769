//! The method-channel surface: typed method names, argument validation and
//! serializable results.

use core_transfer::{TransferError, TransferRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Name of the channel carrying method calls.
pub const METHOD_CHANNEL: &str = "large_file_handler";

/// Name of the channel carrying shared progress events.
pub const PROGRESS_CHANNEL: &str = "file_download_progress";

/// Operations the host can invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BridgeMethod {
    CopyAsset,
    CopyAssetProgress,
    DownloadUrl,
    DownloadUrlProgress,
    FileExists,
}

impl BridgeMethod {
    pub const ALL: [BridgeMethod; 5] = [
        BridgeMethod::CopyAsset,
        BridgeMethod::CopyAssetProgress,
        BridgeMethod::DownloadUrl,
        BridgeMethod::DownloadUrlProgress,
        BridgeMethod::FileExists,
    ];

    /// Wire name used on the method channel.
    pub fn name(self) -> &'static str {
        match self {
            BridgeMethod::CopyAsset => "copyAssetToLocal",
            BridgeMethod::CopyAssetProgress => "copyAssetToLocalWithProgress",
            BridgeMethod::DownloadUrl => "copyUrlToLocal",
            BridgeMethod::DownloadUrlProgress => "copyUrlToLocalWithProgress",
            BridgeMethod::FileExists => "fileExists",
        }
    }

    pub fn reports_progress(self) -> bool {
        matches!(
            self,
            BridgeMethod::CopyAssetProgress | BridgeMethod::DownloadUrlProgress
        )
    }

    /// Validate `arguments` and turn them into something the service can run.
    ///
    /// Every required argument must be a non-empty string; anything else is
    /// rejected with `INVALID_ARGUMENT` before any I/O happens.
    pub fn invocation(self, arguments: &Value) -> Result<Invocation, TransferError> {
        let invocation = match self {
            BridgeMethod::CopyAsset | BridgeMethod::CopyAssetProgress => {
                let asset = required_string(arguments, "assetName")?;
                let target = required_string(arguments, "targetPath")?;
                Invocation::Transfer(TransferRequest::copy_asset(asset, target))
            }
            BridgeMethod::DownloadUrl | BridgeMethod::DownloadUrlProgress => {
                let url = required_string(arguments, "url")?;
                let target = required_string(arguments, "targetPath")?;
                Invocation::Transfer(TransferRequest::download_url(url, target))
            }
            BridgeMethod::FileExists => {
                Invocation::FileExists(required_string(arguments, "targetPath")?.into())
            }
        };

        Ok(match invocation {
            Invocation::Transfer(request) if self.reports_progress() => {
                Invocation::Transfer(request.with_progress())
            }
            other => other,
        })
    }
}

impl fmt::Display for BridgeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A method name no handler is registered for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMethod(pub String);

impl fmt::Display for UnknownMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown method '{}'", self.0)
    }
}

impl std::error::Error for UnknownMethod {}

impl FromStr for BridgeMethod {
    type Err = UnknownMethod;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        BridgeMethod::ALL
            .into_iter()
            .find(|method| method.name() == name)
            .ok_or_else(|| UnknownMethod(name.to_string()))
    }
}

/// Validated work for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Transfer(TransferRequest),
    FileExists(PathBuf),
}

fn required_string(arguments: &Value, key: &str) -> Result<String, TransferError> {
    match arguments.get(key).and_then(Value::as_str) {
        Some(value) if !value.trim().is_empty() => Ok(value.to_string()),
        Some(_) => Err(TransferError::InvalidArgument(format!(
            "argument '{key}' must not be empty"
        ))),
        None => Err(TransferError::InvalidArgument(format!(
            "missing string argument '{key}'"
        ))),
    }
}

/// An incoming call: method name plus argument map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }
}

/// The reply delivered for a [`MethodCall`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "result", rename_all = "snake_case")]
pub enum MethodResult {
    /// `null` for transfers, a boolean for `fileExists`.
    Success(Value),
    Error {
        code: String,
        message: String,
        details: Option<Value>,
    },
    NotImplemented,
}

impl MethodResult {
    pub fn is_success(&self) -> bool {
        matches!(self, MethodResult::Success(_))
    }

    /// Wire code of an error result.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            MethodResult::Error { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl From<TransferError> for MethodResult {
    fn from(error: TransferError) -> Self {
        MethodResult::Error {
            code: error.code().to_string(),
            message: error.message().to_string(),
            details: None,
        }
    }
}
