//! Pacer RPC Client Library
//!
//! This crate provides the JSON-RPC client used to drive a ledger node: chain
//! height, block production, block inspection and wallet payments. The
//! [`LedgerClient`] trait is the seam the pacing loop is written against;
//! [`RpcClient`] is its HTTP implementation.

pub mod models;
mod ledger_client;
mod rpc_client;
mod rpc_error;

pub use ledger_client::LedgerClient;
pub use rpc_client::{parse_endpoint, RpcClient, RpcCredentials};
pub use rpc_error::{RpcError, RpcResult};

// Re-export commonly used types
pub use models::{BlockInfo, RpcRequest, RpcResponse};
