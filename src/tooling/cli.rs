//! CLI Tooling
//!
//! Command-line interface for Stockroom. Each subcommand maps onto one
//! `RecordService` operation; `menu` starts the interactive shell.

use crate::config::{ConfigLoader, StockroomConfig};
use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::service::{NewRecord, RecordService};
use crate::tooling::format::{
    format_dropped_text, format_record_detail, format_records_text, format_statistics_text,
    format_warnings_text,
};
use crate::types::{FieldUpdate, LocatedRecord};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::info;

/// Stockroom CLI - category/brand/model inventory on plain CSV files
#[derive(Parser)]
#[command(name = "stockroom")]
#[command(about = "Hierarchical inventory stored as CSV files (category/brand/model)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Inventory root directory (overrides store.root)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Apply logging flags on top of the configured logging section.
    ///
    /// `--log-file` is not folded in here; it goes to
    /// [`crate::logging::init_logging`] so it outranks `STOCKROOM_LOG_FILE`.
    pub fn logging_overrides(&self, base: &LoggingConfig) -> LoggingConfig {
        let mut config = base.clone();
        if self.verbose {
            config.level = "debug".to_string();
        }
        if let Some(level) = &self.log_level {
            config.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.output = output.clone();
        }
        config
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Add a product under category/brand/model (folders are created as needed)
    Add {
        /// Category (level 1)
        #[arg(long)]
        category: String,
        /// Brand (level 2)
        #[arg(long)]
        brand: String,
        /// Model or family (level 3)
        #[arg(long)]
        model: String,
        /// Product name
        #[arg(long)]
        name: String,
        /// Unit price, e.g. 199.99
        #[arg(long)]
        price: f64,
        /// Units in stock
        #[arg(long)]
        stock: u64,
        /// Optional description
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List every product in the hierarchy
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Filter products by field; price/stock accept >N, <N, =N
    Filter {
        /// id, name, description, level1, level2, level3, price or stock
        field: String,
        /// Substring, or numeric comparison for price/stock
        criterion: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show one product by id
    Show {
        id: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Change one field (name, price, stock, description) of a product
    Update {
        id: String,
        field: String,
        value: String,
    },
    /// Delete a product by id
    Delete {
        id: String,
        /// Skip confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// List all products ordered by name, price, stock or level1
    Sort {
        field: String,
        /// Sort in descending order
        #[arg(long)]
        descending: bool,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Count, mean price, total stock and per-category counts
    Stats {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Interactive numbered menu
    Menu,
}

/// CLI context: loaded configuration plus the record service it configures.
pub struct CliContext {
    config: StockroomConfig,
    service: RecordService,
}

impl CliContext {
    /// Create a new CLI context
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        Self::with_root(workspace_root, config_path, None)
    }

    /// Create a context whose inventory root overrides the configured one.
    pub fn with_root(
        workspace_root: PathBuf,
        config_path: Option<PathBuf>,
        root: Option<PathBuf>,
    ) -> Result<Self, ApiError> {
        let mut config = match &config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        if let Some(root) = root {
            config.store.root = root;
        }
        let service = RecordService::from_config(&config.store, &workspace_root);
        Ok(Self { config, service })
    }

    pub fn config(&self) -> &StockroomConfig {
        &self.config
    }

    pub fn service(&self) -> &RecordService {
        &self.service
    }

    pub fn root(&self) -> &Path {
        self.service.root()
    }

    /// Execute a command and return its rendered output.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Add {
                category,
                brand,
                model,
                name,
                price,
                stock,
                description,
            } => {
                let created = self.service.create(NewRecord {
                    level1: category.clone(),
                    level2: brand.clone(),
                    level3: model.clone(),
                    name: name.clone(),
                    price: *price,
                    stock: *stock,
                    description: description.clone(),
                })?;
                Ok(format!(
                    "Product added with id={} in {}",
                    created.record.id, created.location
                ))
            }
            Commands::List { format } => {
                let report = self.service.list_all_with_report()?;
                if is_json(format)? {
                    return to_json(&json!({
                        "records": report.records,
                        "warnings": report.warnings,
                        "total": report.records.len(),
                    }));
                }
                let mut out = format_records_text("Products", &report.records);
                out.push_str(&format_warnings_text(&report.warnings));
                Ok(out)
            }
            Commands::Filter {
                field,
                criterion,
                format,
            } => {
                let records = self.service.filter(field, criterion)?;
                self.render_records(&format!("Filter: {} {}", field, criterion), &records, format)
            }
            Commands::Show { id, format } => {
                let found = self
                    .service
                    .find_by_id(id)?
                    .ok_or_else(|| ApiError::RecordNotFound(id.clone()))?;
                if is_json(format)? {
                    return to_json(&found);
                }
                Ok(format_record_detail(&found))
            }
            Commands::Update { id, field, value } => {
                let change = FieldUpdate::parse(field, value)?;
                let updated = self.service.update(id, change)?;
                info!(id = %id, field = %field, "Update command applied");
                let mut out = format!(
                    "Updated {} of {} in {}",
                    field, updated.item.record.id, updated.item.location
                );
                out.push_str(&format_dropped_text(&updated.dropped_rows));
                Ok(out)
            }
            Commands::Delete { id, yes } => {
                if !yes && !confirm(&format!("Delete product '{}'?", id))? {
                    return Ok("Deletion cancelled".to_string());
                }
                let removed = self.service.delete(id)?;
                let mut out = format!(
                    "Deleted {} ({}) from {}",
                    removed.item.record.id, removed.item.record.name, removed.item.location
                );
                out.push_str(&format_dropped_text(&removed.dropped_rows));
                Ok(out)
            }
            Commands::Sort {
                field,
                descending,
                format,
            } => {
                let records = self.service.sort(field, !descending)?;
                let direction = if *descending { "descending" } else { "ascending" };
                self.render_records(&format!("Sorted by {} ({})", field, direction), &records, format)
            }
            Commands::Stats { format } => {
                let stats = self.service.statistics()?;
                if is_json(format)? {
                    return to_json(&stats);
                }
                Ok(format_statistics_text(&stats))
            }
            Commands::Menu => {
                crate::tooling::menu::run(&self.service)?;
                Ok("Goodbye.".to_string())
            }
        }
    }

    fn render_records(
        &self,
        title: &str,
        records: &[LocatedRecord],
        format: &str,
    ) -> Result<String, ApiError> {
        if is_json(format)? {
            return to_json(&json!({
                "records": records,
                "total": records.len(),
            }));
        }
        Ok(format_records_text(title, records))
    }
}

fn is_json(format: &str) -> Result<bool, ApiError> {
    match format {
        "json" => Ok(true),
        "text" => Ok(false),
        other => Err(ApiError::ValidationError(format!(
            "Invalid format: {} (must be 'text' or 'json')",
            other
        ))),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::OutputError(format!("Failed to encode JSON: {}", e)))
}

fn confirm(prompt: &str) -> Result<bool, ApiError> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| ApiError::InputError(e.to_string()))
}
