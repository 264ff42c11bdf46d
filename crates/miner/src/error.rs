//! Error types for the pacing loop

use pacer_rpc_client::RpcError;
use thiserror::Error;

/// Result type alias for controller operations.
pub type MinerResult<T> = Result<T, MinerError>;

/// Failures that end a run.
///
/// Per-cycle failures (production, inspection, payments) are absorbed by the
/// controller and never surface here.
#[derive(Error, Debug)]
pub enum MinerError {
    /// The settings cannot describe a run.
    #[error("invalid mining settings: {0}")]
    InvalidSettings(String),

    /// A remote call outside the per-cycle recovery scopes failed.
    #[error("failed to {context}: {source}")]
    Rpc {
        context: &'static str,
        #[source]
        source: RpcError,
    },
}

/// Every attempt allowed by a [`RetryPolicy`](crate::RetryPolicy) failed.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("gave up after {attempts} attempts: {last_error}")]
pub struct RetryExhausted {
    pub attempts: u32,
    pub last_error: RpcError,
}
