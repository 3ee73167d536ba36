//! Configuration
//!
//! Layered settings loaded through the `config` crate: built-in defaults, the
//! global file, the workspace file, then `STOCKROOM_*` environment variables.

mod facade;
pub mod merge;
pub mod paths;
pub mod sources;
mod store;

pub use facade::ConfigLoader;
pub use store::StoreConfig;

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

/// Name of the per-workspace configuration file.
pub const WORKSPACE_CONFIG_FILE: &str = "stockroom.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockroomConfig {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}
