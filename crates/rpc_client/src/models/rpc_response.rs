use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// JSON-RPC response envelope.
///
/// Nodes speaking JSON-RPC 1.0 omit `jsonrpc` and always send both `result`
/// and `error`, one of them `null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
    #[serde(default)]
    pub id: Option<Value>,
}

/// JSON-RPC error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RPC Error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for JsonRpcError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_legacy_success() {
        let resp: RpcResponse =
            serde_json::from_str(r#"{"result": 120, "error": null, "id": 1}"#).unwrap();
        assert_eq!(resp.result, Some(Value::from(120)));
        assert!(resp.error.is_none());
        assert!(resp.jsonrpc.is_none());
    }

    #[test]
    fn parses_error_object() {
        let resp: RpcResponse = serde_json::from_str(
            r#"{"jsonrpc": "2.0", "result": null, "error": {"code": -28, "message": "Loading block index..."}, "id": 3}"#,
        )
        .unwrap();
        assert!(resp.result.is_none());
        let error = resp.error.unwrap();
        assert_eq!(error.code, -28);
        assert_eq!(error.to_string(), "RPC Error -28: Loading block index...");
    }
}
