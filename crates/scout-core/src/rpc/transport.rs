use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::error::Result;

/// Boxed future returned by transport implementations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Raw HTTP response as seen by the discovery pipeline.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body bytes.
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Whether the peer answered with `200 OK`.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Sends JSON-RPC request bodies to a peer over HTTP POST.
///
/// This trait lets the fetcher and probe run against a real HTTP client or
/// an in-memory mock without depending on either.
pub trait RpcTransport: Send + Sync {
    /// POST `body` to `url`, giving up after `timeout`.
    ///
    /// Connection failures and timeouts are returned as errors; any HTTP
    /// status, including non-2xx, is a successful transport outcome.
    fn post_json<'a>(
        &'a self,
        url: &'a str,
        body: &'a serde_json::Value,
        timeout: Duration,
    ) -> BoxFuture<'a, Result<TransportResponse>>;
}
