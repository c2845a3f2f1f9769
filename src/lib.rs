//! Large file handler.
//!
//! Umbrella crate re-exporting the workspace crates behind one dependency.
//! Host applications depend on `large-file-handler` and pick features here
//! instead of wiring each crate individually:
//!
//! - `desktop-shims` (default): fill unset bridges with the desktop adapters.

pub use bridge_traits;
pub use core_runtime;
pub use core_service;
pub use core_transfer;

pub use core_service::{
    BridgeMethod, CoreError, CoreService, MethodCall, MethodResult, TransferHandle,
    METHOD_CHANNEL, PROGRESS_CHANNEL,
};
pub use core_transfer::{TransferError, TransferOutcome, TransferRequest};

#[cfg(feature = "desktop-shims")]
pub use core_service::bootstrap_desktop;
