//! Main application modules.
//!
//! This module provides record loading and the one-shot query run used by
//! the `geo_proximity` binary.

pub mod records;
pub mod run;

// Re-export public API
pub use records::parse_records;
pub use run::{run_query, QueryReport};
