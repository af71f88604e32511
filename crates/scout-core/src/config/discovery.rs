use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Membership discovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Bootstrap endpoints queried on every run.
    #[serde(default = "default_bootstrap")]
    pub bootstrap: Vec<String>,

    /// Maximum concurrent membership queries against seeds.
    #[serde(default = "default_fetch_workers")]
    pub fetch_workers: usize,

    /// Maximum concurrent membership queries during expansion.
    #[serde(default = "default_expansion_workers")]
    pub expansion_workers: usize,

    /// Additional attempts after a failed membership query.
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Delay between membership query attempts, in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,

    /// Timeout for a membership query against a seed, in milliseconds.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_ms: u64,

    /// Timeout for a membership query against an active peer, in milliseconds.
    #[serde(default = "default_expansion_timeout")]
    pub expansion_timeout_ms: u64,

    /// Attempts made per peer during expansion (no retry by default).
    #[serde(default)]
    pub expansion_retry_count: u32,

    /// Whether peers without an advertised `rpc` endpoint are probed.
    #[serde(default = "default_scan_null_rpc")]
    pub scan_null_rpc: bool,

    /// Upper bound on expansion rounds. One round reproduces the classic
    /// single-pass crawl.
    #[serde(default = "default_max_expansion_rounds")]
    pub max_expansion_rounds: u32,
}

impl DiscoveryConfig {
    /// Delay between membership query attempts.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Timeout for seed membership queries.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Timeout for expansion membership queries.
    pub fn expansion_timeout(&self) -> Duration {
        Duration::from_millis(self.expansion_timeout_ms)
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            bootstrap: default_bootstrap(),
            fetch_workers: default_fetch_workers(),
            expansion_workers: default_expansion_workers(),
            retry_count: default_retry_count(),
            retry_delay_ms: default_retry_delay(),
            fetch_timeout_ms: default_fetch_timeout(),
            expansion_timeout_ms: default_expansion_timeout(),
            expansion_retry_count: 0,
            scan_null_rpc: default_scan_null_rpc(),
            max_expansion_rounds: default_max_expansion_rounds(),
        }
    }
}

fn default_bootstrap() -> Vec<String> {
    vec!["https://api.mainnet-beta.solana.com".to_string()]
}

fn default_fetch_workers() -> usize {
    15
}

fn default_expansion_workers() -> usize {
    15
}

fn default_retry_count() -> u32 {
    2
}

fn default_retry_delay() -> u64 {
    2000
}

fn default_fetch_timeout() -> u64 {
    10_000
}

fn default_expansion_timeout() -> u64 {
    5000
}

fn default_scan_null_rpc() -> bool {
    true
}

fn default_max_expansion_rounds() -> u32 {
    1
}
