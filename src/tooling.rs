//! Tooling Layer
//!
//! Command-line entry points, the interactive menu, and text rendering.

pub mod cli;
pub mod format;
pub mod menu;

pub use cli::{Cli, CliContext, Commands};
