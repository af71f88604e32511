use std::sync::Arc;
use std::time::{Duration, Instant};

use scout_core::rpc::{RpcMethod, RpcRequest, RpcTransport};

/// Outcome of probing one address.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    pub ip: String,
    pub port: u16,
    /// Round-trip time in milliseconds, set only when active.
    pub latency_ms: Option<f64>,
    pub is_active: bool,
}

impl ProbeResult {
    fn inactive(ip: &str, port: u16) -> Self {
        Self {
            ip: ip.to_string(),
            port,
            latency_ms: None,
            is_active: false,
        }
    }
}

/// URL a probe is sent to.
pub fn probe_url(ip: &str, port: u16) -> String {
    format!("http://{}:{}", ip, port)
}

/// Checks whether a peer answers RPC and how fast.
#[derive(Clone)]
pub struct LivenessProbe {
    transport: Arc<dyn RpcTransport>,
    timeout: Duration,
}

impl LivenessProbe {
    /// Create a new probe.
    pub fn new(transport: Arc<dyn RpcTransport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// Send `getSlot` to `ip:port`.
    ///
    /// The peer is active only if it answers `200 OK` within the timeout.
    /// Errors never escape: every failure yields an inactive result.
    pub async fn probe(&self, ip: &str, port: u16) -> ProbeResult {
        let url = probe_url(ip, port);
        let body = RpcRequest::new(RpcMethod::GetSlot).to_value();

        let start = Instant::now();
        let outcome = tokio::time::timeout(
            self.timeout,
            self.transport.post_json(&url, &body, self.timeout),
        )
        .await;
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        match outcome {
            Ok(Ok(response)) if response.is_ok() => {
                tracing::debug!(peer = %url, latency_ms, "Peer is active");
                ProbeResult {
                    ip: ip.to_string(),
                    port,
                    latency_ms: Some(latency_ms),
                    is_active: true,
                }
            }
            Ok(Ok(response)) => {
                tracing::debug!(peer = %url, status = response.status, "Peer answered with error status");
                ProbeResult::inactive(ip, port)
            }
            Ok(Err(e)) => {
                tracing::debug!(peer = %url, error = %e, "Probe failed");
                ProbeResult::inactive(ip, port)
            }
            Err(_) => {
                tracing::debug!(peer = %url, timeout = ?self.timeout, "Probe timed out");
                ProbeResult::inactive(ip, port)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_core::testing::{MockHttp, MockResponse};

    fn probe_with(mock: &MockHttp) -> LivenessProbe {
        LivenessProbe::new(Arc::new(mock.clone()), Duration::from_millis(100))
    }

    #[tokio::test]
    async fn test_responsive_peer_is_active() {
        let mock = MockHttp::builder().alive("http://10.0.0.1:8899").build();

        let result = probe_with(&mock).probe("10.0.0.1", 8899).await;

        assert!(result.is_active);
        assert!(result.latency_ms.unwrap() >= 0.0);
        assert_eq!(result.ip, "10.0.0.1");
        assert_eq!(result.port, 8899);
        mock.assert_method_called_times("http://10.0.0.1:8899", "getSlot", 1);
    }

    #[tokio::test]
    async fn test_latency_reflects_response_time() {
        let mock = MockHttp::builder()
            .mock("*", |_| MockResponse::ok().with_delay(Duration::from_millis(20)))
            .build();

        let result = probe_with(&mock).probe("10.0.0.1", 8899).await;

        assert!(result.is_active);
        assert!(result.latency_ms.unwrap() >= 20.0);
    }

    #[tokio::test]
    async fn test_unreachable_peer_is_inactive() {
        let mock = MockHttp::builder().unreachable("*").build();

        let result = probe_with(&mock).probe("10.0.0.1", 8899).await;

        assert_eq!(result, ProbeResult::inactive("10.0.0.1", 8899));
    }

    #[tokio::test]
    async fn test_slow_peer_is_inactive() {
        let mock = MockHttp::builder()
            .mock("*", |_| MockResponse::ok().with_delay(Duration::from_secs(3)))
            .build();

        let result = probe_with(&mock).probe("10.0.0.1", 8899).await;

        assert!(!result.is_active);
        assert!(result.latency_ms.is_none());
    }

    #[tokio::test]
    async fn test_error_status_is_inactive() {
        let mock = MockHttp::builder()
            .mock("*", |_| MockResponse::error(503, "unavailable"))
            .build();

        let result = probe_with(&mock).probe("10.0.0.1", 9000).await;

        assert!(!result.is_active);
        assert_eq!(result.port, 9000);
    }

    #[tokio::test]
    async fn test_non_json_200_is_active() {
        let mock = MockHttp::builder()
            .mock("*", |_| MockResponse::text(200, "ok"))
            .build();

        assert!(probe_with(&mock).probe("10.0.0.1", 8899).await.is_active);
    }

    #[test]
    fn test_probe_url() {
        assert_eq!(probe_url("1.2.3.4", 8899), "http://1.2.3.4:8899");
    }
}
