//! Per-location locking for leaf collections
//!
//! Mutations of a leaf collection are read-modify-write sequences. Holding the
//! location's write lock for the whole sequence keeps other threads of this
//! process from observing or overwriting a half-applied change. Nothing here
//! protects against a second process editing the same files.

use crate::types::LocationKey;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Lock manager handing out one read-write lock per location key.
///
/// Different locations never contend with each other.
#[derive(Default)]
pub struct LocationLockManager {
    locks: RwLock<HashMap<LocationKey, Arc<RwLock<()>>>>,
}

impl LocationLockManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the lock for `key`.
    pub fn get_lock(&self, key: &LocationKey) -> Arc<RwLock<()>> {
        {
            let map = self.locks.read();
            if let Some(lock) = map.get(key) {
                return Arc::clone(lock);
            }
        }

        // Another thread may have inserted between the two acquisitions.
        let mut map = self.locks.write();
        map.entry(key.clone())
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone()
    }

    /// Number of locations that have been locked at least once.
    pub fn tracked(&self) -> usize {
        self.locks.read().len()
    }
}
