use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Liveness probe configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Port probed when a node advertises no `rpc` endpoint.
    #[serde(default = "default_port")]
    pub default_port: u16,

    /// Probe timeout in milliseconds.
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,

    /// Maximum concurrent probes.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl ProbeConfig {
    /// Probe timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            default_port: default_port(),
            timeout_ms: default_timeout(),
            workers: default_workers(),
        }
    }
}

fn default_port() -> u16 {
    8899
}

fn default_timeout() -> u64 {
    2000
}

fn default_workers() -> usize {
    100
}
