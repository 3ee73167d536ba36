//! StoreConfig and root resolution.

use crate::store::DEFAULT_COLLECTION_FILE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_root() -> PathBuf {
    PathBuf::from("data")
}

fn default_collection_file() -> String {
    DEFAULT_COLLECTION_FILE.to_string()
}

fn default_max_depth() -> usize {
    16
}

/// Where and how leaf collections are stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Hierarchy root; relative paths resolve against the workspace.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// File name of every leaf collection.
    #[serde(default = "default_collection_file")]
    pub collection_file: String,

    /// Deepest folder level the walker visits.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    #[serde(default)]
    pub follow_links: bool,
}

impl StoreConfig {
    /// Absolute hierarchy root for `workspace_root`.
    pub fn resolve_root(&self, workspace_root: &Path) -> PathBuf {
        let root = if self.root.is_absolute() {
            self.root.clone()
        } else {
            workspace_root.join(&self.root)
        };
        // Canonicalization fails for a root that does not exist yet.
        dunce::canonicalize(&root).unwrap_or(root)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            collection_file: default_collection_file(),
            max_depth: default_max_depth(),
            follow_links: false,
        }
    }
}
