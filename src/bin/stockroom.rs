//! Stockroom CLI Binary
//!
//! Command-line interface for the Stockroom inventory store.

use clap::Parser;
use stockroom::tooling::cli::{Cli, CliContext};
use std::process;

fn main() {
    let cli = Cli::parse();

    let context = match CliContext::with_root(cli.workspace.clone(), cli.config.clone(), cli.root.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            process::exit(1);
        }
    };

    let logging = cli.logging_overrides(&context.config().logging);
    if let Err(e) = stockroom::logging::init_logging(Some(&logging), cli.log_file.clone()) {
        eprintln!("Error initializing logging: {}", e);
        process::exit(1);
    }

    match context.execute(&cli.command) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error ({}): {}", e.kind(), e);
            process::exit(1);
        }
    }
}
