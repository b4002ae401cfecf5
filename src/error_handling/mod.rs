//! Error handling.
//!
//! This module provides the error taxonomy of the crate:
//! - **InvalidArgument**: rejected input, reported synchronously before a query starts
//! - **Store**: a failing cell subscription, reported once on the live stream
//! - **Cancelled**: teardown before the first result of a one-shot query
//!
//! Initialization errors (logger setup) are kept separate.

mod types;

// Re-export public API
pub use types::{GeoQueryError, InitializationError, StoreError};
