//! # Core Runtime Module
//!
//! Foundational runtime infrastructure shared by the transfer engine and the
//! service façade:
//! - Logging and tracing infrastructure
//! - Configuration management and bridge wiring
//! - Transfer lifecycle event bus
//!
//! ## Overview
//!
//! Nothing in this crate moves bytes. It decides which host bridges the core
//! talks to, how transfers are tuned, and where diagnostics go.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
