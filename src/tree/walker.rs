//! Hierarchy Walker
//!
//! Discovers every leaf collection below the store root and aggregates their
//! records, tagging each with the location derived from its directory path.
//! Traversal is iterative (walkdir keeps its own stack) and bounded by
//! `max_depth`.

use crate::codec::DecodeReport;
use crate::concurrency::LocationLockManager;
use crate::error::StorageError;
use crate::store::LeafStore;
use crate::types::{LocatedRecord, LocationKey, HIERARCHY_DEPTH};
use serde::{Deserialize, Serialize};
use std::path::Path;
use walkdir::WalkDir;

/// Walker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkerConfig {
    /// Deepest directory level (relative to the root) that is visited.
    pub max_depth: usize,
    /// Follow symlinked directories.
    pub follow_links: bool,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            max_depth: 16,
            follow_links: false,
        }
    }
}

/// Aggregates records from all leaf collections in a hierarchy.
#[derive(Debug, Clone, Default)]
pub struct HierarchyWalker {
    config: WalkerConfig,
}

impl HierarchyWalker {
    pub fn new(config: WalkerConfig) -> Self {
        Self { config }
    }

    /// Collect every record below `store.root()`.
    ///
    /// Directories are visited depth-first in file-name order. A directory that
    /// holds a collection contributes its records and is still descended into.
    /// A missing root yields nothing; unreadable subtrees are logged and
    /// skipped. Failing to read a collection file that exists is an error.
    pub fn collect_all(
        &self,
        store: &dyn LeafStore,
        locks: &LocationLockManager,
    ) -> Result<DecodeReport<LocatedRecord>, StorageError> {
        let root = store.root();
        let mut report = DecodeReport::new();

        if !root.is_dir() {
            tracing::debug!(root = %root.display(), "Store root does not exist yet");
            return Ok(report);
        }

        let walker = WalkDir::new(root)
            .follow_links(self.config.follow_links)
            .max_depth(self.config.max_depth)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    let path = e
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| root.display().to_string());
                    tracing::warn!("Skipping unreadable directory {}: {}", path, e);
                    continue;
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }

            let collection = entry.path().join(store.collection_file());
            if !collection.is_file() {
                continue;
            }

            let location = derive_location(root, entry.path());
            if entry.depth() != HIERARCHY_DEPTH {
                tracing::debug!(
                    path = %entry.path().display(),
                    depth = entry.depth(),
                    "Collection found outside the expected depth"
                );
            }

            let lock = locks.get_lock(&location);
            let leaf = {
                let _guard = lock.read();
                store.read_path(&collection)?
            };

            report.warnings.extend(leaf.warnings);
            report
                .records
                .extend(leaf.records.into_iter().map(|record| LocatedRecord {
                    record,
                    location: location.clone(),
                }));
        }

        tracing::debug!(
            root = %root.display(),
            records = report.records.len(),
            warnings = report.warnings.len(),
            "Collected hierarchy"
        );
        Ok(report)
    }
}

/// Location for a directory: the first three path segments below `root`.
pub fn derive_location(root: &Path, dir: &Path) -> LocationKey {
    let segments: Vec<String> = dir
        .strip_prefix(root)
        .map(|rel| {
            rel.components()
                .take(HIERARCHY_DEPTH)
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    LocationKey::derived(&segments)
}
