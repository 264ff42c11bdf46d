use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC request envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    /// JSON-RPC version
    pub jsonrpc: String,

    /// Method name
    pub method: String,

    /// Positional parameters
    pub params: Vec<Value>,

    /// Request ID, echoed back by the node
    pub id: u64,
}

impl RpcRequest {
    /// Creates a new RPC request
    pub fn new(id: u64, method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.into(),
            params,
            id,
        }
    }
}
