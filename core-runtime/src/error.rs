use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    /// A tuning value is out of range.
    #[error("Invalid setting '{field}': {message}")]
    InvalidSetting { field: &'static str, message: String },

    /// A required host bridge was not injected and no default exists.
    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
