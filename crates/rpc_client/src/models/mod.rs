//! RPC Models
//!
//! This module contains data models for RPC requests and responses.

mod block_info;
mod rpc_request;
mod rpc_response;

pub use block_info::BlockInfo;
pub use rpc_request::RpcRequest;
pub use rpc_response::{JsonRpcError, RpcResponse};
