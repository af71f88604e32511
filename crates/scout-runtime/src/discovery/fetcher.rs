use std::sync::Arc;
use std::time::Duration;

use scout_core::config::DiscoveryConfig;
use scout_core::rpc::{RpcMethod, RpcRequest, RpcResponse, RpcTransport};
use scout_core::{NodeRecord, Result, ScoutError};

/// Retry and timeout settings for membership queries.
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    /// Additional attempts after the first failure.
    pub retry_count: u32,
    /// Fixed delay between attempts.
    pub retry_delay: Duration,
    /// Timeout for a single attempt.
    pub timeout: Duration,
}

impl FetchPolicy {
    /// Policy for querying seeds.
    pub fn seeds(config: &DiscoveryConfig) -> Self {
        Self {
            retry_count: config.retry_count,
            retry_delay: config.retry_delay(),
            timeout: config.fetch_timeout(),
        }
    }

    /// Policy for querying active peers during expansion.
    pub fn expansion(config: &DiscoveryConfig) -> Self {
        Self {
            retry_count: config.expansion_retry_count,
            retry_delay: config.retry_delay(),
            timeout: config.expansion_timeout(),
        }
    }

    /// Total attempts made before giving up.
    pub fn attempts(&self) -> u32 {
        self.retry_count + 1
    }
}

/// Queries one peer for its view of cluster membership.
#[derive(Clone)]
pub struct MembershipFetcher {
    transport: Arc<dyn RpcTransport>,
    policy: FetchPolicy,
}

impl MembershipFetcher {
    /// Create a new fetcher.
    pub fn new(transport: Arc<dyn RpcTransport>, policy: FetchPolicy) -> Self {
        Self { transport, policy }
    }

    /// Fetch membership from `url`, retrying per policy.
    ///
    /// Never fails: once every attempt is spent the peer counts as having
    /// reported no nodes.
    pub async fn fetch(&self, url: &str) -> Vec<NodeRecord> {
        let attempts = self.policy.attempts();

        for attempt in 1..=attempts {
            match self.fetch_once(url).await {
                Ok(nodes) => {
                    tracing::debug!(peer = %url, attempt, nodes = nodes.len(), "Fetched cluster nodes");
                    return nodes;
                }
                Err(e) => {
                    tracing::warn!(
                        peer = %url,
                        attempt,
                        attempts,
                        error = %e,
                        "getClusterNodes failed"
                    );
                    if attempt < attempts {
                        tokio::time::sleep(self.policy.retry_delay).await;
                    }
                }
            }
        }

        tracing::warn!(peer = %url, attempts, "Giving up on peer");
        Vec::new()
    }

    /// Make a single membership query.
    pub async fn fetch_once(&self, url: &str) -> Result<Vec<NodeRecord>> {
        let body = RpcRequest::new(RpcMethod::GetClusterNodes).to_value();
        let timeout = self.policy.timeout;

        let response = tokio::time::timeout(timeout, self.transport.post_json(url, &body, timeout))
            .await
            .map_err(|_| ScoutError::Timeout(format!("{} did not answer within {:?}", url, timeout)))??;

        if !(200..300).contains(&response.status) {
            return Err(ScoutError::Status(response.status));
        }

        let entries = RpcResponse::<Vec<serde_json::Value>>::from_slice(&response.body)?
            .into_result()?;

        Ok(decode_nodes(url, entries))
    }
}

/// Decode node objects one by one so a single malformed entry doesn't
/// discard the whole response.
fn decode_nodes(url: &str, entries: Vec<serde_json::Value>) -> Vec<NodeRecord> {
    entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<NodeRecord>(entry) {
            Ok(node) => Some(node),
            Err(e) => {
                tracing::debug!(peer = %url, error = %e, "Skipping malformed node entry");
                None
            }
        })
        .collect()
}
