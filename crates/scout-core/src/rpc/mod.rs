//! JSON-RPC 2.0 wire types and the transport seam used to reach peers.

mod request;
mod response;
mod transport;

pub use request::{RpcMethod, RpcRequest};
pub use response::{RpcErrorObject, RpcResponse};
pub use transport::{BoxFuture, RpcTransport, TransportResponse};
