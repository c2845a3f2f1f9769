use bridge_traits::BridgeError;
use core_runtime::logging::redact_url;
use thiserror::Error;

/// Failure of a single transfer.
///
/// Every variant carries a human-readable message and maps to a stable wire
/// code via [`code`](TransferError::code).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid locator: {0}")]
    InvalidLocator(String),

    #[error("Network error: {0}")]
    Network(String),

    /// The server answered successfully but with no body.
    #[error("Empty response: {0}")]
    EmptyResponse(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl TransferError {
    pub fn code(&self) -> &'static str {
        match self {
            TransferError::InvalidArgument(_) => "INVALID_ARGUMENT",
            TransferError::NotFound(_) => "NOT_FOUND",
            TransferError::InvalidLocator(_) => "INVALID_LOCATOR",
            TransferError::Network(_) => "NETWORK_ERROR",
            TransferError::EmptyResponse(_) => "EMPTY_RESPONSE",
            TransferError::Io(_) => "IO_ERROR",
            TransferError::Unknown(_) => "UNKNOWN_ERROR",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            TransferError::InvalidArgument(m)
            | TransferError::NotFound(m)
            | TransferError::InvalidLocator(m)
            | TransferError::Network(m)
            | TransferError::EmptyResponse(m)
            | TransferError::Io(m)
            | TransferError::Unknown(m) => m,
        }
    }
}

impl From<BridgeError> for TransferError {
    fn from(error: BridgeError) -> Self {
        match error {
            BridgeError::NotFound(what) => TransferError::NotFound(what),
            BridgeError::InvalidUrl(url) => TransferError::InvalidLocator(redact_url(&url)),
            BridgeError::HttpStatus { status, url } => {
                TransferError::Network(format!("HTTP {status} returned by {}", redact_url(&url)))
            }
            BridgeError::Transport(message) => TransferError::Network(message),
            BridgeError::EmptyBody(url) => {
                TransferError::EmptyResponse(format!("no body in response from {}", redact_url(&url)))
            }
            BridgeError::Io(e) => TransferError::from(e),
            BridgeError::NotAvailable(message) | BridgeError::OperationFailed(message) => {
                TransferError::Unknown(message)
            }
        }
    }
}

impl From<std::io::Error> for TransferError {
    fn from(error: std::io::Error) -> Self {
        TransferError::Io(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TransferError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        let cases = [
            (TransferError::InvalidArgument(String::new()), "INVALID_ARGUMENT"),
            (TransferError::NotFound(String::new()), "NOT_FOUND"),
            (TransferError::InvalidLocator(String::new()), "INVALID_LOCATOR"),
            (TransferError::Network(String::new()), "NETWORK_ERROR"),
            (TransferError::EmptyResponse(String::new()), "EMPTY_RESPONSE"),
            (TransferError::Io(String::new()), "IO_ERROR"),
            (TransferError::Unknown(String::new()), "UNKNOWN_ERROR"),
        ];
        for (error, code) in cases {
            assert_eq!(error.code(), code);
        }
    }

    #[test]
    fn test_http_status_becomes_network_error_without_query() {
        let error = TransferError::from(BridgeError::HttpStatus {
            status: 404,
            url: "https://cdn.example.com/big.bin?sig=abc".to_string(),
        });

        assert_eq!(error.code(), "NETWORK_ERROR");
        assert_eq!(
            error.message(),
            "HTTP 404 returned by https://cdn.example.com/big.bin"
        );
    }

    #[test]
    fn test_bridge_error_mapping() {
        assert!(matches!(
            TransferError::from(BridgeError::NotFound("asset 'a'".into())),
            TransferError::NotFound(_)
        ));
        assert!(matches!(
            TransferError::from(BridgeError::EmptyBody("https://h/p".into())),
            TransferError::EmptyResponse(_)
        ));
        assert!(matches!(
            TransferError::from(BridgeError::Transport("reset".into())),
            TransferError::Network(_)
        ));
        assert!(matches!(
            TransferError::from(BridgeError::Io(std::io::Error::other("disk full"))),
            TransferError::Io(_)
        ));
        assert!(matches!(
            TransferError::from(BridgeError::NotAvailable("fs".into())),
            TransferError::Unknown(_)
        ));
    }
}
