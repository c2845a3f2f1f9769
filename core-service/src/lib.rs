//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (asset bundle, HTTP,
//! filesystem, primary-context dispatcher) into the transfer engine and
//! exposes the method-channel surface hosts talk to. Desktop apps typically
//! enable the `desktop-shims` feature, which lets [`bootstrap_desktop`] fill
//! every bridge with a `bridge-desktop` default.
//!
//! ```ignore
//! use core_service::{CoreService, MethodCall};
//! use serde_json::json;
//!
//! let service = core_service::bootstrap_desktop("/opt/app/assets")?;
//! let result = service
//!     .invoke(MethodCall::new(
//!         "copyUrlToLocalWithProgress",
//!         json!({ "url": "https://example.com/model.bin", "targetPath": "/tmp/model.bin" }),
//!     ))
//!     .await;
//! assert!(result.is_success());
//! ```

pub mod error;
pub mod method;
pub mod service;

pub use error::{CoreError, Result};
pub use method::{
    BridgeMethod, Invocation, MethodCall, MethodResult, UnknownMethod, METHOD_CHANNEL,
    PROGRESS_CHANNEL,
};
pub use service::{CoreService, TransferHandle};

/// Build a service with desktop defaults for every bridge, resolving assets
/// under `asset_root`.
#[cfg(feature = "desktop-shims")]
pub fn bootstrap_desktop(asset_root: impl Into<std::path::PathBuf>) -> Result<CoreService> {
    CoreService::from_builder(core_runtime::config::CoreConfig::builder().asset_root(asset_root))
}
