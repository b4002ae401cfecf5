//! Error type definitions.
//!
//! This module defines all error types used throughout the crate.

use log::SetLoggerError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}

/// Errors reported by a document store subscription.
///
/// These are propagated verbatim through a proximity query; the engine never
/// retries them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached or has been shut down.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The range scan could not be served (missing or misconfigured index).
    #[error("Invalid index: {0}")]
    InvalidIndex(String),
}

/// Errors produced by proximity queries.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeoQueryError {
    /// A caller-supplied argument was rejected before any subscription opened
    /// (bad radius, bad geohash, unsupported unit, bad edge buffer).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A per-cell subscription failed; all sibling subscriptions were torn down.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The query was torn down before it produced a result.
    #[error("Query cancelled before a result was produced")]
    Cancelled,
}

impl From<geohash::GeohashError> for GeoQueryError {
    fn from(error: geohash::GeohashError) -> Self {
        GeoQueryError::InvalidArgument(format!("geohash: {error}"))
    }
}
