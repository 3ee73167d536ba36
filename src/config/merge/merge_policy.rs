//! Built-in defaults seeded into every builder so partial files deserialize.

use crate::config::StockroomConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Builder preloaded with `StockroomConfig::default()`.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let defaults = Config::try_from(&StockroomConfig::default())?;
    Ok(Config::builder().add_source(defaults))
}
