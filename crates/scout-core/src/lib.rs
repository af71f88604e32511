pub mod cluster;
pub mod config;
pub mod error;
pub mod rpc;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use cluster::{EndpointKind, Endpoints, NodeIdentity, NodeRecord, NodeSet};
pub use config::ScoutConfig;
pub use error::{Result, ScoutError};
pub use rpc::{RpcMethod, RpcRequest, RpcResponse, RpcTransport, TransportResponse};
