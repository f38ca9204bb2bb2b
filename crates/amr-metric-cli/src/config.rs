//! Embedding-source configuration file.
//!
//! A JSON key-value file that can override the node table URI and supply a
//! custom relation table. Presence of custom edge embeddings is what flips
//! the relation representation from scalar to vector for the whole run.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use amr_metric_core::error::ConfigError;

/// Recognized keys of the embedding config file.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfigFile {
    pub custom_node_embeddings: bool,
    #[serde(default)]
    pub node_embeddings_filepath: Option<PathBuf>,
    pub custom_edge_embeddings: bool,
    #[serde(default)]
    pub edge_embeddings_filepath: Option<PathBuf>,
    #[serde(default)]
    pub edge_embeddings_keys_filepath: Option<PathBuf>,
}

impl EmbeddingConfigFile {
    /// Load and validate: a `custom_*` toggle without its filepath is a
    /// malformed key, reported before anything is scored.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|e| ConfigError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if config.custom_node_embeddings && config.node_embeddings_filepath.is_none() {
            return Err(ConfigError::MalformedKey {
                key: "node_embeddings_filepath".to_string(),
                path: path.to_path_buf(),
                reason: "required when custom_node_embeddings is true".to_string(),
            });
        }
        if config.custom_edge_embeddings
            && (config.edge_embeddings_filepath.is_none()
                || config.edge_embeddings_keys_filepath.is_none())
        {
            return Err(ConfigError::MalformedKey {
                key: "edge_embeddings_filepath".to_string(),
                path: path.to_path_buf(),
                reason: "edge embeddings and keys filepaths are required when \
                         custom_edge_embeddings is true"
                    .to_string(),
            });
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_config(json: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(json.as_bytes()).unwrap();
        f
    }

    #[test]
    fn loads_a_complete_config() {
        let f = write_config(
            r#"{
                "custom_node_embeddings": true,
                "node_embeddings_filepath": "nodes.txt",
                "custom_edge_embeddings": true,
                "edge_embeddings_filepath": "edges.json",
                "edge_embeddings_keys_filepath": "keys.json"
            }"#,
        );
        let c = EmbeddingConfigFile::load(f.path()).unwrap();
        assert!(c.custom_node_embeddings);
        assert_eq!(c.node_embeddings_filepath.unwrap(), PathBuf::from("nodes.txt"));
    }

    #[test]
    fn toggle_without_filepath_is_malformed() {
        let f = write_config(
            r#"{"custom_node_embeddings": true, "custom_edge_embeddings": false}"#,
        );
        let err = EmbeddingConfigFile::load(f.path()).unwrap_err();
        assert!(err.to_string().contains("node_embeddings_filepath"));
    }

    #[test]
    fn missing_edge_keys_path_is_malformed() {
        let f = write_config(
            r#"{
                "custom_node_embeddings": false,
                "custom_edge_embeddings": true,
                "edge_embeddings_filepath": "edges.json"
            }"#,
        );
        assert!(EmbeddingConfigFile::load(f.path()).is_err());
    }
}
