use std::path::{Path, PathBuf};

use serde::Serialize;

use scout_core::config::StorageConfig;
use scout_core::{NodeRecord, Result};

/// JSON snapshot files for discovered and active nodes.
#[derive(Debug, Clone)]
pub struct NodeStore {
    full_cluster_path: PathBuf,
    active_nodes_path: PathBuf,
}

impl NodeStore {
    /// Create a store over explicit paths.
    pub fn new(full_cluster_path: impl Into<PathBuf>, active_nodes_path: impl Into<PathBuf>) -> Self {
        Self {
            full_cluster_path: full_cluster_path.into(),
            active_nodes_path: active_nodes_path.into(),
        }
    }

    /// Create a store from configuration.
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.full_cluster_path, &config.active_nodes_path)
    }

    /// Path of the raw discovery snapshot.
    pub fn full_cluster_path(&self) -> &Path {
        &self.full_cluster_path
    }

    /// Path of the active-node registry.
    pub fn active_nodes_path(&self) -> &Path {
        &self.active_nodes_path
    }

    /// Read the active-node registry. A missing file is an empty registry.
    pub async fn load_active_nodes(&self) -> Result<Vec<NodeRecord>> {
        read_nodes(&self.active_nodes_path).await
    }

    /// Read the raw discovery snapshot. A missing file is an empty snapshot.
    pub async fn load_full_cluster(&self) -> Result<Vec<NodeRecord>> {
        read_nodes(&self.full_cluster_path).await
    }

    /// Seed URLs recovered from the previous run's active registry.
    ///
    /// Only entries with an `rpc` endpoint contribute. A registry that can't
    /// be read yields no seeds rather than an error.
    pub async fn load_seed_endpoints(&self) -> Vec<String> {
        match self.load_active_nodes().await {
            Ok(nodes) => {
                let mut seeds: Vec<String> =
                    nodes.iter().filter_map(|n| n.rpc()).map(seed_url).collect();
                seeds.sort();
                seeds.dedup();
                if !seeds.is_empty() {
                    tracing::info!(
                        path = %self.active_nodes_path.display(),
                        seeds = seeds.len(),
                        "Loaded seeds from previous run"
                    );
                }
                seeds
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.active_nodes_path.display(),
                    error = %e,
                    "Failed to load previous active nodes, continuing without them"
                );
                Vec::new()
            }
        }
    }

    /// Write the raw discovery snapshot.
    pub async fn save_full_cluster(&self, nodes: &[NodeRecord]) -> Result<()> {
        write_nodes(&self.full_cluster_path, nodes).await
    }

    /// Write the active-node registry.
    pub async fn save_active_nodes(&self, nodes: &[NodeRecord]) -> Result<()> {
        write_nodes(&self.active_nodes_path, nodes).await
    }
}

/// URL used to query a node through its `rpc` endpoint.
pub fn seed_url(rpc: &str) -> String {
    if rpc.starts_with("http://") || rpc.starts_with("https://") {
        rpc.to_string()
    } else {
        format!("http://{}", rpc)
    }
}

/// Encode nodes as a JSON array indented with four spaces.
pub fn encode_nodes(nodes: &[NodeRecord]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    nodes.serialize(&mut serializer)?;
    Ok(buf)
}

async fn read_nodes(path: &Path) -> Result<Vec<NodeRecord>> {
    let content = match tokio::fs::read(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    Ok(serde_json::from_slice(&content)?)
}

/// Write through a sibling temp file so readers never see a partial file.
async fn write_nodes(path: &Path, nodes: &[NodeRecord]) -> Result<()> {
    let encoded = encode_nodes(nodes)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, &encoded).await?;
    tokio::fs::rename(&tmp, path).await?;

    tracing::debug!(path = %path.display(), nodes = nodes.len(), "Saved node snapshot");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_core::{EndpointKind, ScoutError};

    fn store_in(dir: &Path) -> NodeStore {
        NodeStore::new(dir.join("full_cluster.json"), dir.join("active_nodes.json"))
    }

    #[tokio::test]
    async fn test_missing_files_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        assert!(store.load_active_nodes().await.unwrap().is_empty());
        assert!(store.load_full_cluster().await.unwrap().is_empty());
        assert!(store.load_seed_endpoints().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_and_reload_active_nodes() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        let mut node = NodeRecord::new("a").with_endpoint(EndpointKind::Gossip, "1.1.1.1:8001");
        node.mark_active("1.1.1.1", 8899, 42.0);
        store.save_active_nodes(&[node.clone()]).await.unwrap();

        let loaded = store.load_active_nodes().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].identity, node.identity);
        assert_eq!(loaded[0].rpc(), Some("1.1.1.1:8899"));
        assert_eq!(loaded[0].latency_ms, Some(42.0));
    }

    #[tokio::test]
    async fn test_seed_endpoints_only_from_rpc() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        let nodes = vec![
            NodeRecord::new("a").with_endpoint(EndpointKind::Rpc, "1.1.1.1:8899"),
            NodeRecord::new("b").with_endpoint(EndpointKind::Gossip, "2.2.2.2:8001"),
            NodeRecord::new("c").with_endpoint(EndpointKind::Rpc, "1.1.1.1:8899"),
        ];
        store.save_active_nodes(&nodes).await.unwrap();

        assert_eq!(
            store.load_seed_endpoints().await,
            vec!["http://1.1.1.1:8899".to_string()]
        );
    }

    #[tokio::test]
    async fn test_corrupt_registry_degrades_to_no_seeds() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        tokio::fs::write(store.active_nodes_path(), b"{ not json")
            .await
            .unwrap();

        assert!(matches!(
            store.load_active_nodes().await,
            Err(ScoutError::Serialization(_))
        ));
        assert!(store.load_seed_endpoints().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = NodeStore::new(
            dir.path().join("out/full.json"),
            dir.path().join("out/active.json"),
        );

        store.save_full_cluster(&[NodeRecord::new("x")]).await.unwrap();

        assert!(store.full_cluster_path().exists());
        assert!(!dir.path().join("out/full.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_unwritable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        tokio::fs::write(&blocker, b"").await.unwrap();
        let store = NodeStore::new(blocker.join("full.json"), blocker.join("active.json"));

        let result = store.save_full_cluster(&[]).await;
        assert!(matches!(result, Err(ScoutError::Io(_))));
    }

    #[test]
    fn test_four_space_indent() {
        let encoded = encode_nodes(&[NodeRecord::new("a")]).unwrap();
        let text = String::from_utf8(encoded).unwrap();
        assert!(text.contains("\n    {\n        \"pubkey\": \"a\""));
    }

    #[test]
    fn test_seed_url() {
        assert_eq!(seed_url("1.2.3.4:8899"), "http://1.2.3.4:8899");
        assert_eq!(seed_url("https://rpc.example"), "https://rpc.example");
    }
}
