//! Application initialization.
//!
//! The library itself needs no global setup; the binary installs a logger
//! before running a query.

mod logger;

// Re-export public API
pub use logger::init_logger_with;
