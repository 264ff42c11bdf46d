use std::time::Duration;
use thiserror::Error;

/// Result type alias for remote calls.
pub type RpcResult<T> = Result<T, RpcError>;

/// Classified failure of a single remote call.
///
/// Callers decide per call site how to recover; the client never retries on
/// its own.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RpcError {
    /// The request never produced a readable response (connection refused,
    /// reset, TLS failure, non-JSON error page).
    #[error("HTTP error: {0}")]
    Transport(String),

    /// No response within the client timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The node answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Server { code: i32, message: String },

    /// The node answered, but not with what the method promises.
    #[error("invalid response to {method}: {reason}")]
    InvalidResponse { method: String, reason: String },

    /// The endpoint URL cannot be used.
    #[error("invalid RPC url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl RpcError {
    /// Creates an [`RpcError::InvalidResponse`]
    pub fn invalid_response(method: &str, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            method: method.to_string(),
            reason: reason.into(),
        }
    }

    /// JSON-RPC error code, when the node sent one
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Server { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
