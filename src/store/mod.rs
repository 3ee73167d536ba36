//! Leaf Store
//!
//! One physical record collection per fully-qualified location key. Stores keep
//! no cache: every read goes back to the backing file, so a read after a write
//! in the same process always observes the write.

pub mod persistence;

use crate::codec::DecodeReport;
use crate::error::StorageError;
use crate::types::{LocationKey, Record};
use std::path::{Path, PathBuf};

pub use persistence::CsvLeafStore;

/// Default name of the collection file inside each leaf directory.
pub const DEFAULT_COLLECTION_FILE: &str = "items.csv";

/// Leaf store interface
///
/// Implementations do not lock; callers that share a store across threads
/// serialize access per key with [`crate::concurrency::LocationLockManager`].
pub trait LeafStore: Send + Sync {
    /// Root directory of the hierarchy.
    fn root(&self) -> &Path;

    /// File name every leaf collection uses.
    fn collection_file(&self) -> &str;

    /// Collection file for `key`, creating the leaf directories if missing.
    fn path_for(&self, key: &LocationKey) -> Result<PathBuf, StorageError>;

    /// Decode the collection at an explicit file path. A missing file reads as
    /// an empty collection.
    fn read_path(&self, path: &Path) -> Result<DecodeReport, StorageError>;

    /// Decode every record stored under `key`.
    fn read_all(&self, key: &LocationKey) -> Result<DecodeReport, StorageError>;

    /// Replace the whole collection under `key` with `records`.
    fn write_all(&self, key: &LocationKey, records: &[Record]) -> Result<(), StorageError>;

    /// Add one record, writing the header first if the collection is new.
    fn append_one(&self, key: &LocationKey, record: &Record) -> Result<(), StorageError>;
}
