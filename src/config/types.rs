//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and query configuration.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, ValueEnum};
use strum_macros::{Display, EnumIter, EnumString};

use crate::error_handling::GeoQueryError;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Distance units accepted by a query.
///
/// Only kilometers are implemented. Any other unit string is rejected with
/// [`GeoQueryError::InvalidArgument`] instead of being silently ignored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString, EnumIter)]
pub enum Units {
    #[default]
    /// Kilometers (the only implemented unit)
    #[strum(to_string = "km")]
    Kilometers,
}

impl Units {
    /// Parses a unit name such as `"km"`.
    pub fn parse(s: &str) -> Result<Self, GeoQueryError> {
        Units::from_str(s.trim())
            .map_err(|_| GeoQueryError::InvalidArgument(format!("unsupported unit: {s:?}")))
    }
}

/// Command-line configuration for the `geo_proximity` binary.
///
/// Loads a record file into an in-memory store and runs a single proximity
/// query against it.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use geo_proximity::Config;
///
/// let config = Config::parse_from([
///     "geo_proximity", "places.jsonl", "--lat", "40.7", "--lng", "-74.0", "--radius", "2",
/// ]);
/// assert_eq!(config.field, "position");
/// ```
#[derive(Debug, Clone, Parser)]
#[command(name = "geo_proximity", version, about)]
pub struct Config {
    /// JSON array or JSON-lines file of records (each with an `id`)
    pub input: PathBuf,

    /// Collection name the records are loaded into
    #[arg(long, default_value = "places")]
    pub collection: String,

    /// Latitude of the query center
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude of the query center
    #[arg(long, allow_hyphen_values = true)]
    pub lng: f64,

    /// Search radius
    #[arg(long)]
    pub radius: f64,

    /// Record field holding the point (dotted paths allowed)
    #[arg(long, default_value = "position")]
    pub field: String,

    /// Distance units (only `km` is supported)
    #[arg(long, default_value = "km")]
    pub units: String,

    /// Print a GeoJSON FeatureCollection instead of annotated records
    #[arg(long)]
    pub geojson: bool,

    /// Include record properties in GeoJSON features
    #[arg(long)]
    pub include_props: bool,

    /// Log per-cycle query diagnostics
    #[arg(long)]
    pub log_query: bool,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_units_parse_km() {
        assert_eq!(Units::parse("km").unwrap(), Units::Kilometers);
        assert_eq!(Units::parse(" km ").unwrap(), Units::Kilometers);
        assert_eq!(Units::Kilometers.to_string(), "km");
    }

    #[test]
    fn test_units_rejects_unsupported() {
        for unit in ["mi", "miles", "m", ""] {
            match Units::parse(unit) {
                Err(GeoQueryError::InvalidArgument(msg)) => assert!(msg.contains("unsupported")),
                other => panic!("expected InvalidArgument for {unit:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_units_only_kilometers() {
        assert_eq!(Units::iter().count(), 1);
        assert_eq!(Units::default(), Units::Kilometers);
    }

    #[test]
    fn test_config_parse_defaults() {
        let config = Config::parse_from([
            "geo_proximity",
            "places.json",
            "--lat",
            "-33.86",
            "--lng",
            "151.2",
            "--radius",
            "5",
        ]);
        assert_eq!(config.input, PathBuf::from("places.json"));
        assert_eq!(config.collection, "places");
        assert_eq!(config.field, "position");
        assert_eq!(config.units, "km");
        assert_eq!(config.lat, -33.86);
        assert!(!config.geojson);
        assert!(!config.log_query);
        assert!(matches!(config.log_level, LogLevel::Info));
        assert!(matches!(config.log_format, LogFormat::Plain));
    }
}
