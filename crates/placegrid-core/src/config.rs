//! placegrid.toml configuration parser.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::bail;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacegridConfig {
    pub cluster: ClusterConfig,
    pub state: StateConfig,
    pub deploy: DeployConfig,
    pub server: ServerConfig,
}

/// Static cluster topology.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    pub nodes: Vec<String>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            nodes: vec!["node1".to_string(), "node2".to_string()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateBackend {
    /// Line-delimited append-only file.
    #[default]
    Log,
    /// Transactional redb database.
    Redb,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    pub backend: StateBackend,
    pub path: PathBuf,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            backend: StateBackend::Log,
            path: PathBuf::from("deployed_apps.csv"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Program and leading arguments; the manifest path is appended.
    pub command: Vec<String>,
    pub manifest_dir: PathBuf,
    pub timeout_secs: Option<u64>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            command: vec!["kubectl".to_string(), "apply".to_string(), "-f".to_string()],
            manifest_dir: PathBuf::from("."),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 5000 }
    }
}

impl PlacegridConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PlacegridConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject topologies and deploy settings the engine cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.cluster.nodes.is_empty() {
            bail!("cluster.nodes must list at least one node");
        }
        let mut seen = HashSet::new();
        for node in &self.cluster.nodes {
            if node.trim().is_empty() {
                bail!("cluster.nodes contains an empty node id");
            }
            if node.contains([crate::RECORD_DELIMITER, '\n', '\r']) {
                bail!("node id {node:?} contains a delimiter or line break");
            }
            if !seen.insert(node.as_str()) {
                bail!("duplicate node id in cluster.nodes: {node}");
            }
        }
        if self.deploy.command.is_empty() {
            bail!("deploy.command must name a program");
        }
        if self.deploy.timeout_secs == Some(0) {
            bail!("deploy.timeout_secs must be positive when set");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_two_node_cluster() {
        let config = PlacegridConfig::default();
        assert_eq!(config.cluster.nodes, vec!["node1", "node2"]);
        assert_eq!(config.state.backend, StateBackend::Log);
        assert_eq!(config.deploy.command, vec!["kubectl", "apply", "-f"]);
        assert_eq!(config.server.port, 5000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full() {
        let toml_str = r#"
[cluster]
nodes = ["a", "b", "c"]

[state]
backend = "redb"
path = "/var/lib/placegrid/state.redb"

[deploy]
command = ["kubectl", "--context", "prod", "apply", "-f"]
manifest_dir = "/tmp/manifests"
timeout_secs = 30

[server]
port = 8080
"#;
        let config: PlacegridConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.cluster.nodes.len(), 3);
        assert_eq!(config.state.backend, StateBackend::Redb);
        assert_eq!(config.deploy.timeout_secs, Some(30));
        assert_eq!(config.server.port, 8080);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_minimal_fills_defaults() {
        let toml_str = r#"
[cluster]
nodes = ["x"]
"#;
        let config: PlacegridConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.cluster.nodes, vec!["x"]);
        assert_eq!(config.state.path, PathBuf::from("deployed_apps.csv"));
        assert_eq!(config.deploy.timeout_secs, None);
    }

    #[test]
    fn rejects_duplicate_nodes() {
        let mut config = PlacegridConfig::default();
        config.cluster.nodes = vec!["n1".to_string(), "n1".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_empty_topology_and_ids() {
        let mut config = PlacegridConfig::default();
        config.cluster.nodes.clear();
        assert!(config.validate().is_err());

        config.cluster.nodes = vec![" ".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_empty_command() {
        let mut config = PlacegridConfig::default();
        config.deploy.command.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn from_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("placegrid.toml");
        let config = PlacegridConfig::default();
        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();

        let loaded = PlacegridConfig::from_file(&path).unwrap();
        assert_eq!(loaded.cluster.nodes, config.cluster.nodes);
        assert_eq!(loaded.server.port, 5000);
    }
}
