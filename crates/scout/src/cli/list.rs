use std::cmp::Ordering;

use anyhow::Result;
use clap::Parser;
use console::style;

use scout_core::{NodeRecord, ScoutConfig};
use scout_runtime::NodeStore;

/// Show the saved active-node registry, fastest first.
#[derive(Parser)]
pub struct ListCommand {
    /// Configuration file path.
    #[arg(short, long, default_value = "scout.toml")]
    pub config: String,

    /// Show at most this many nodes.
    #[arg(short, long)]
    pub limit: Option<usize>,
}

impl ListCommand {
    /// Execute the list command.
    pub async fn execute(self) -> Result<()> {
        super::init_tracing(false);

        let config = ScoutConfig::from_file_or_default(&self.config)?;
        let store = NodeStore::from_config(&config.storage);
        let nodes = store.load_active_nodes().await?;

        if nodes.is_empty() {
            println!(
                "  {} No active nodes in {}. Run `scout discover` first.",
                style("ℹ").blue(),
                style(store.active_nodes_path().display()).cyan()
            );
            return Ok(());
        }

        let total = nodes.len();
        let nodes = fastest_first(nodes, self.limit);

        println!();
        println!(
            "  {} {} of {} active nodes",
            style("✓").green(),
            nodes.len(),
            total
        );
        println!();
        for node in &nodes {
            let latency = node
                .latency_ms
                .map(|ms| format!("{:>8.1} ms", ms))
                .unwrap_or_else(|| format!("{:>11}", "-"));
            println!(
                "  {} {:<22} {}",
                style(latency).yellow(),
                node.rpc().unwrap_or("-"),
                style(&node.identity).dim()
            );
        }
        println!();

        Ok(())
    }
}

/// Sort by latency (unknown last, ties by identity) and truncate to `limit`.
fn fastest_first(mut nodes: Vec<NodeRecord>, limit: Option<usize>) -> Vec<NodeRecord> {
    nodes.sort_by(|a, b| {
        let by_latency = match (a.latency_ms, b.latency_ms) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_latency.then_with(|| a.identity.cmp(&b.identity))
    });
    if let Some(limit) = limit {
        nodes.truncate(limit);
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, latency_ms: Option<f64>) -> NodeRecord {
        let mut node = NodeRecord::new(id);
        node.latency_ms = latency_ms;
        node
    }

    fn ids(nodes: &[NodeRecord]) -> Vec<&str> {
        nodes.iter().map(|n| n.identity.as_str()).collect()
    }

    #[test]
    fn test_fastest_first() {
        let nodes = vec![
            node("slow", Some(250.0)),
            node("unknown", None),
            node("fast", Some(12.5)),
            node("also-fast", Some(12.5)),
        ];

        let sorted = fastest_first(nodes, None);

        assert_eq!(ids(&sorted), vec!["also-fast", "fast", "slow", "unknown"]);
    }

    #[test]
    fn test_limit_truncates() {
        let nodes = vec![node("a", Some(3.0)), node("b", Some(1.0)), node("c", Some(2.0))];

        let sorted = fastest_first(nodes, Some(2));

        assert_eq!(ids(&sorted), vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_list_with_missing_registry_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("scout.toml");
        let active = dir.path().join("active.json");
        std::fs::write(
            &config_path,
            format!("[storage]\nactive_nodes_path = {:?}\n", active.display().to_string()),
        )
        .unwrap();

        let cmd = ListCommand {
            config: config_path.display().to_string(),
            limit: None,
        };
        assert!(cmd.execute().await.is_ok());
    }
}
