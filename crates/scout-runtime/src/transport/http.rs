use std::time::Duration;

use scout_core::rpc::{BoxFuture, RpcTransport, TransportResponse};
use scout_core::{Result, ScoutError};

/// reqwest-backed transport used against real peers.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with a fresh connection pool.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("scout/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ScoutError::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl RpcTransport for HttpTransport {
    fn post_json<'a>(
        &'a self,
        url: &'a str,
        body: &'a serde_json::Value,
        timeout: Duration,
    ) -> BoxFuture<'a, Result<TransportResponse>> {
        Box::pin(async move {
            let response = self
                .client
                .post(url)
                .json(body)
                .timeout(timeout)
                .send()
                .await
                .map_err(|e| map_error(url, e))?;

            let status = response.status().as_u16();
            let body = response.bytes().await.map_err(|e| map_error(url, e))?;

            Ok(TransportResponse {
                status,
                body: body.to_vec(),
            })
        })
    }
}

fn map_error(url: &str, e: reqwest::Error) -> ScoutError {
    if e.is_timeout() {
        ScoutError::Timeout(format!("{}: {}", url, e))
    } else {
        ScoutError::Transport(format!("{}: {}", url, e))
    }
}
