//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `geo_proximity` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - User-facing output formatting
//!
//! All query functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use geo_proximity::initialization::init_logger_with;
use geo_proximity::{run_query, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    match run_query(config).await {
        Ok(report) => {
            let rendered = serde_json::to_string_pretty(&report.output)
                .context("Failed to render query output")?;
            println!("{rendered}");
            eprintln!(
                "Matched {} of {} record{} in {:.3}s",
                report.matched,
                report.loaded,
                if report.loaded == 1 { "" } else { "s" },
                report.elapsed_seconds
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("geo_proximity error: {:#}", e);
            process::exit(1);
        }
    }
}
