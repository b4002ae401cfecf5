//! Logger initialization.
//!
//! This module provides functions to initialize the logger with custom formatting.

use std::io::Write;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;
use colored::*;
use log::LevelFilter;

/// Initializes the logger with the specified level and format.
///
/// Configures `env_logger` with custom formatting. Supports both plain text
/// (with colors) and JSON formats for structured logging.
///
/// The logger reads from the `RUST_LOG` environment variable first; the
/// provided `level` then overrides it for this crate.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
///
/// # Examples
///
/// ```bash
/// # Quick debugging of query cycles
/// RUST_LOG=geo_proximity=debug geo_proximity places.jsonl --lat 0 --lng 0 --radius 1
///
/// # Machine-readable output
/// geo_proximity places.jsonl --lat 0 --lng 0 --radius 1 --log-format json
/// ```
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    let mut builder = env_logger::Builder::from_default_env();

    builder.filter_level(level);
    builder.filter_module("tokio", LevelFilter::Warn);
    builder.filter_module("geo_proximity", level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| writeln!(buf, "{}", json_line(record)));
        }
        LogFormat::Plain => {
            builder.format(|buf, record| {
                let level = record.level();
                let colored_level = match level {
                    log::Level::Error => level.to_string().red(),
                    log::Level::Warn => level.to_string().yellow(),
                    log::Level::Info => level.to_string().green(),
                    log::Level::Debug => level.to_string().blue(),
                    log::Level::Trace => level.to_string().purple(),
                };

                writeln!(
                    buf,
                    "{} [{}] {}",
                    record.target().cyan(),
                    colored_level,
                    record.args()
                )
            });
        }
    }

    // try_init so tests can call this more than once without panicking
    builder.try_init().map_err(InitializationError::from)?;

    Ok(())
}

/// Renders one log record as a JSON object.
///
/// Fields: `ts` (RFC 3339, milliseconds, UTC), `level`, `target`, `module`,
/// `line` and `msg`. Query logs use the target `geo_proximity::query::*`, so
/// a collector can split engine diagnostics from store or CLI output.
fn json_line(record: &log::Record<'_>) -> serde_json::Value {
    serde_json::json!({
        "ts": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        "level": record.level().as_str(),
        "target": record.target(),
        "module": record.module_path(),
        "line": record.line(),
        "msg": record.args().to_string(),
    })
}
