use serde::{Deserialize, Serialize};

/// Methods scout calls on cluster peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RpcMethod {
    /// Ask a peer for its view of cluster membership.
    #[serde(rename = "getClusterNodes")]
    GetClusterNodes,
    /// Cheap liveness query.
    #[serde(rename = "getSlot")]
    GetSlot,
}

impl RpcMethod {
    /// Convert to the wire method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetClusterNodes => "getClusterNodes",
            Self::GetSlot => "getSlot",
        }
    }
}

/// JSON-RPC 2.0 request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Protocol version, always `"2.0"`.
    pub jsonrpc: String,
    /// Request id.
    pub id: u64,
    /// Method to invoke.
    pub method: RpcMethod,
}

impl RpcRequest {
    /// Create a new RPC request.
    pub fn new(method: RpcMethod) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: 1,
            method,
        }
    }

    /// Serialize into a JSON value ready to POST.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "jsonrpc": self.jsonrpc,
            "id": self.id,
            "method": self.method.as_str(),
        })
    }
}
