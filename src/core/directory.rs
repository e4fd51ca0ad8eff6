//! Node directory: read-only pubkey → manager mapping.
//!
//! Loaded once at process start and passed explicitly to whatever needs it;
//! there is no way to mutate a directory after construction.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::{Error, Result};

/// Immutable mapping from node identifier to operator/manager name
#[derive(Debug, Clone, Default)]
pub struct NodeDirectory {
    managers: HashMap<String, String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DirectoryFile {
    Map(HashMap<String, String>),
    Entries(Vec<DirectoryEntry>),
}

#[derive(Deserialize)]
struct DirectoryEntry {
    #[serde(alias = "id", alias = "ip")]
    pubkey: String,
    manager: String,
}

impl NodeDirectory {
    /// Empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(node id, manager)` pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            managers: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Parse a JSON object `{ id: manager }` or list of `{ pubkey, manager }`
    pub fn from_json(content: &str) -> Result<Self> {
        let parsed: DirectoryFile = serde_json::from_str(content)?;
        let managers = match parsed {
            DirectoryFile::Map(map) => map,
            DirectoryFile::Entries(entries) => entries
                .into_iter()
                .map(|e| (e.pubkey, e.manager))
                .collect(),
        };
        Ok(Self { managers })
    }

    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        let directory = Self::from_json(&content)?;
        info!(entries = directory.len(), path = %path.display(), "loaded node directory");
        Ok(directory)
    }

    /// Manager for a node, if known
    pub fn manager_for(&self, node_id: &str) -> Option<&str> {
        self.managers.get(node_id).map(String::as_str)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.managers.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.managers.is_empty()
    }
}
