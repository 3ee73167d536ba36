//! Stockroom: Hierarchical Inventory Store
//!
//! Product records live in CSV files laid out as `root/<category>/<brand>/<model>/items.csv`.
//! The record service aggregates every leaf collection for listing, filtering,
//! sorting and statistics, and rewrites exactly one collection per mutation.

pub mod codec;
pub mod concurrency;
pub mod config;
pub mod error;
pub mod logging;
pub mod service;
pub mod store;
pub mod tooling;
pub mod tree;
pub mod types;
pub mod views;

pub use error::{ApiError, StorageError};
pub use service::{Mutation, NewRecord, RecordService};
pub use types::{FieldUpdate, LocatedRecord, LocationKey, Record};
