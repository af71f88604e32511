mod discovery;
mod probe;
mod storage;

pub use discovery::DiscoveryConfig;
pub use probe::ProbeConfig;
pub use storage::StorageConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, ScoutError};

/// Root configuration for scout.
///
/// Built once at startup and handed to each component; nothing reads
/// settings from global state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoutConfig {
    /// Seed and membership-fetch settings.
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Liveness probe settings.
    #[serde(default)]
    pub probe: ProbeConfig,

    /// Where snapshots are written.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl ScoutConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ScoutError::Config(format!("Failed to read config file: {}", e)))?;

        Self::parse_toml(&content)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn from_file_or_default(path: impl AsRef<Path>) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from a TOML string.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let content = substitute_env_vars(content);

        let config: Self = toml::from_str(&content)
            .map_err(|e| ScoutError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.discovery.fetch_workers == 0 {
            return Err(ScoutError::Config(
                "discovery.fetch_workers must be at least 1".to_string(),
            ));
        }
        if self.discovery.expansion_workers == 0 {
            return Err(ScoutError::Config(
                "discovery.expansion_workers must be at least 1".to_string(),
            ));
        }
        if self.probe.workers == 0 {
            return Err(ScoutError::Config(
                "probe.workers must be at least 1".to_string(),
            ));
        }
        if self.probe.default_port == 0 {
            return Err(ScoutError::Config(
                "probe.default_port must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Substitute environment variables in the format ${VAR_NAME}.
fn substitute_env_vars(content: &str) -> String {
    let mut result = content.to_string();
    let Ok(re) = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}") else {
        return result;
    };

    for cap in re.captures_iter(content) {
        let var_name = &cap[1];
        if let Ok(value) = std::env::var(var_name) {
            result = result.replace(&cap[0], &value);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScoutConfig::default();
        assert_eq!(config.probe.default_port, 8899);
        assert_eq!(config.discovery.fetch_workers, 15);
        assert_eq!(config.probe.workers, 100);
        assert!(config.discovery.scan_null_rpc);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_empty_config() {
        let config = ScoutConfig::parse_toml("").unwrap();
        assert_eq!(config.discovery.retry_count, 2);
        assert_eq!(config.storage.active_nodes_path, "active_nodes.json");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [discovery]
            bootstrap = ["http://10.0.0.1:8899", "http://10.0.0.2:8899"]
            fetch_workers = 4
            retry_count = 1
            retry_delay_ms = 500
            scan_null_rpc = false
            max_expansion_rounds = 3

            [probe]
            default_port = 9000
            timeout_ms = 750
            workers = 32

            [storage]
            full_cluster_path = "out/full.json"
            active_nodes_path = "out/active.json"
        "#;

        let config = ScoutConfig::parse_toml(toml).unwrap();
        assert_eq!(config.discovery.bootstrap.len(), 2);
        assert_eq!(config.discovery.fetch_workers, 4);
        assert_eq!(config.discovery.retry_count, 1);
        assert!(!config.discovery.scan_null_rpc);
        assert_eq!(config.discovery.max_expansion_rounds, 3);
        assert_eq!(config.probe.default_port, 9000);
        assert_eq!(config.probe.timeout().as_millis(), 750);
        assert_eq!(config.storage.full_cluster_path, "out/full.json");
    }

    #[test]
    fn test_zero_workers_rejected() {
        let toml = r#"
            [probe]
            workers = 0
        "#;
        assert!(matches!(
            ScoutConfig::parse_toml(toml),
            Err(ScoutError::Config(_))
        ));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SCOUT_TEST_SEED", "http://seed.example:8899");

        let toml = r#"
            [discovery]
            bootstrap = ["${SCOUT_TEST_SEED}"]
        "#;

        let config = ScoutConfig::parse_toml(toml).unwrap();
        assert_eq!(config.discovery.bootstrap, vec!["http://seed.example:8899"]);

        std::env::remove_var("SCOUT_TEST_SEED");
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = ScoutConfig::from_file_or_default("/nonexistent/scout.toml").unwrap();
        assert_eq!(config.probe.default_port, 8899);
        assert!(ScoutConfig::from_file("/nonexistent/scout.toml").is_err());
    }
}
