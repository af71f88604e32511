use serde::{Deserialize, Serialize};

/// Snapshot file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Every node discovered from seeds, before filtering.
    #[serde(default = "default_full_cluster_path")]
    pub full_cluster_path: String,

    /// Nodes that answered a probe. Also read back as seeds on the next run.
    #[serde(default = "default_active_nodes_path")]
    pub active_nodes_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            full_cluster_path: default_full_cluster_path(),
            active_nodes_path: default_active_nodes_path(),
        }
    }
}

fn default_full_cluster_path() -> String {
    "full_cluster.json".to_string()
}

fn default_active_nodes_path() -> String {
    "active_nodes.json".to_string()
}
