//! Application configuration and constants.
//!
//! This module provides:
//! - Engine constants (precision bands, edge buffer, Earth radius)
//! - CLI option types and parsing
//! - Query unit selection

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{Config, LogFormat, LogLevel, Units};
