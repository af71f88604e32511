use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoutError};

/// JSON-RPC 2.0 response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse<T> {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    /// Result data (if successful).
    #[serde(default = "Option::default")]
    pub result: Option<T>,
    /// Error information (if failed).
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

impl<T: DeserializeOwned> RpcResponse<T> {
    /// Decode a response body.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Extract the result, turning an RPC error object into an error.
    ///
    /// A response with neither `result` nor `error` is treated as a
    /// malformed payload.
    pub fn into_result(self) -> Result<T> {
        if let Some(error) = self.error {
            return Err(ScoutError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        self.result
            .ok_or_else(|| ScoutError::Serialization("response has no result".to_string()))
    }
}

/// RPC error object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcErrorObject {
    /// Error code.
    pub code: i64,
    /// Human-readable error message.
    #[serde(default)]
    pub message: String,
    /// Additional error details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}
