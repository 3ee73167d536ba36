//! Record Service
//!
//! Façade used by the CLI and the interactive menu. Reads always materialize the
//! whole hierarchy through the walker; mutations re-read and rewrite exactly
//! the one leaf collection that owns the target record. Rows of that
//! collection that fail to decode are not carried over; the returned
//! [`Mutation`] lists them.
//!
//! Mutations hold the owning location's write lock for the re-read and the
//! rewrite. Another process editing the same file between the aggregated read
//! and that re-read can still lose an update; the re-read only detects a
//! vanished record.
//!
//! Record ids are assumed unique across the hierarchy but this is not checked.
//! With duplicates, lookups act on the first match in traversal order.

use crate::codec::{self, DecodeReport, RowWarning};
use crate::concurrency::LocationLockManager;
use crate::config::StoreConfig;
use crate::error::ApiError;
use crate::store::{CsvLeafStore, LeafStore};
use crate::tree::{HierarchyWalker, WalkerConfig};
use crate::types::{validate_price, FieldUpdate, LocatedRecord, LocationKey, Record};
use crate::views::{self, SortField, Statistics};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Input for [`RecordService::create`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecord {
    pub level1: String,
    pub level2: String,
    pub level3: String,
    pub name: String,
    pub price: f64,
    pub stock: u64,
    #[serde(default)]
    pub description: String,
}

/// Result of an update or delete.
///
/// A rewrite keeps only the rows that decoded, so malformed rows in the same
/// collection are removed from disk; they are listed in `dropped_rows`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mutation {
    pub item: LocatedRecord,
    pub dropped_rows: Vec<RowWarning>,
}

pub struct RecordService {
    store: Arc<dyn LeafStore>,
    walker: HierarchyWalker,
    locks: LocationLockManager,
}

impl RecordService {
    /// Service over a CSV hierarchy rooted at `root` with default settings.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self::with_store(Arc::new(CsvLeafStore::new(root)), HierarchyWalker::default())
    }

    /// Service built from resolved store configuration.
    pub fn from_config(config: &StoreConfig, workspace_root: &Path) -> Self {
        let store = CsvLeafStore::with_collection_file(
            config.resolve_root(workspace_root),
            &config.collection_file,
        );
        let walker = HierarchyWalker::new(WalkerConfig {
            max_depth: config.max_depth,
            follow_links: config.follow_links,
        });
        Self::with_store(Arc::new(store), walker)
    }

    pub fn with_store(store: Arc<dyn LeafStore>, walker: HierarchyWalker) -> Self {
        Self {
            store,
            walker,
            locks: LocationLockManager::new(),
        }
    }

    pub fn root(&self) -> &Path {
        self.store.root()
    }

    /// File a new record under its location, creating the leaf on first use.
    pub fn create(&self, input: NewRecord) -> Result<LocatedRecord, ApiError> {
        let location = LocationKey::new(&input.level1, &input.level2, &input.level3)?;
        let name = input.name.trim();
        if name.is_empty() {
            return Err(ApiError::ValidationError("name cannot be empty".to_string()));
        }
        validate_price(input.price).map_err(ApiError::ValidationError)?;

        let record = Record {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            price: codec::stored_price(input.price),
            stock: input.stock,
            description: input.description.trim().to_string(),
        };

        let lock = self.locks.get_lock(&location);
        {
            let _guard = lock.write();
            self.store.append_one(&location, &record)?;
        }
        info!(id = %record.id, location = %location, "Created record");

        Ok(LocatedRecord { record, location })
    }

    /// Every record in the hierarchy, in traversal order.
    pub fn list_all(&self) -> Result<Vec<LocatedRecord>, ApiError> {
        Ok(self.list_all_with_report()?.records)
    }

    /// Every record plus the malformed rows that were skipped.
    pub fn list_all_with_report(&self) -> Result<DecodeReport<LocatedRecord>, ApiError> {
        Ok(self.walker.collect_all(self.store.as_ref(), &self.locks)?)
    }

    /// Records whose `field` matches `criterion`; see [`views::filter_records`].
    pub fn filter(&self, field: &str, criterion: &str) -> Result<Vec<LocatedRecord>, ApiError> {
        Ok(views::filter_records(self.list_all()?, field, criterion))
    }

    /// First record with `id` in traversal order.
    pub fn find_by_id(&self, id: &str) -> Result<Option<LocatedRecord>, ApiError> {
        Ok(self.list_all()?.into_iter().find(|r| r.record.id == id))
    }

    /// Change one field of the record with `id` and rewrite its collection.
    pub fn update(&self, id: &str, change: FieldUpdate) -> Result<Mutation, ApiError> {
        change.validate()?;
        let found = self
            .find_by_id(id)?
            .ok_or_else(|| ApiError::RecordNotFound(id.to_string()))?;
        let location = found.location;

        let lock = self.locks.get_lock(&location);
        let _guard = lock.write();

        let DecodeReport {
            mut records,
            warnings,
        } = self.store.read_all(&location)?;
        let Some(target) = records.iter_mut().find(|r| r.id == id) else {
            return Err(ApiError::ConsistencyError {
                id: id.to_string(),
                location,
            });
        };
        change.apply(target);
        target.price = codec::stored_price(target.price);
        let updated = target.clone();

        self.store.write_all(&location, &records)?;
        log_dropped(&location, &warnings);
        info!(id = %id, field = change.field_name(), location = %location, "Updated record");

        Ok(Mutation {
            item: LocatedRecord {
                record: updated,
                location,
            },
            dropped_rows: warnings,
        })
    }

    /// Remove the record with `id` from its collection.
    pub fn delete(&self, id: &str) -> Result<Mutation, ApiError> {
        let found = self
            .find_by_id(id)?
            .ok_or_else(|| ApiError::RecordNotFound(id.to_string()))?;
        let location = found.location;

        let lock = self.locks.get_lock(&location);
        let _guard = lock.write();

        let DecodeReport {
            mut records,
            warnings,
        } = self.store.read_all(&location)?;
        let Some(pos) = records.iter().position(|r| r.id == id) else {
            return Err(ApiError::RecordNotFound(format!(
                "{} is no longer stored under {}",
                id, location
            )));
        };
        let removed = records.remove(pos);

        self.store.write_all(&location, &records)?;
        log_dropped(&location, &warnings);
        info!(id = %id, location = %location, "Deleted record");

        Ok(Mutation {
            item: LocatedRecord {
                record: removed,
                location,
            },
            dropped_rows: warnings,
        })
    }

    /// All records ordered by `field` (name, price, stock, level1).
    pub fn sort(&self, field: &str, ascending: bool) -> Result<Vec<LocatedRecord>, ApiError> {
        let field: SortField = field.parse()?;
        let mut records = self.list_all()?;
        views::sort_records(&mut records, field, ascending);
        Ok(records)
    }

    pub fn statistics(&self) -> Result<Statistics, ApiError> {
        Ok(Statistics::compute(&self.list_all()?))
    }
}

fn log_dropped(location: &LocationKey, dropped: &[RowWarning]) {
    if !dropped.is_empty() {
        warn!(
            location = %location,
            dropped = dropped.len(),
            "Rewrite removed malformed rows from collection"
        );
    }
}
