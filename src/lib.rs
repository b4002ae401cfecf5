//! geo_proximity library: live geohash proximity queries
//!
//! This library answers "what is near this point?" against document stores
//! that only offer string range scans. Records carry a [`FirePoint`] (a
//! coordinate plus its geohash); a query scans the geohash cell around the
//! center and its eight neighbors, filters by true distance, annotates each
//! hit with distance and bearing, and keeps the sorted answer live as the
//! underlying data changes.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use futures::StreamExt;
//! use geo_proximity::{Document, GeoClient, MemoryStore, QueryOptions};
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryStore::new());
//! let client = GeoClient::new(store.clone());
//!
//! let cafe = client.point(48.8584, 2.2945)?;
//! store.insert("places", Document::new("cafe", json!({"position": cafe.to_value()})));
//!
//! let center = client.point(48.8566, 2.3522)?;
//! let mut nearby = client
//!     .query("places")
//!     .within(&center, 5.0, "position", QueryOptions::default())?;
//!
//! while let Some(hits) = nearby.next().await {
//!     for hit in hits? {
//!         println!("{} is {:.2} km away", hit.document.id, hit.hit_metadata.distance);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! Live queries are plain `futures` streams and can be polled from any
//! executor; [`MemoryStore`] uses Tokio's `watch` channel for change
//! notification.

#![warn(missing_docs)]

mod app;
mod client;
pub mod config;
mod error_handling;
pub mod geohash;
mod geojson;
pub mod initialization;
mod query;
mod store;

// Re-export public API
pub use app::{parse_records, run_query, QueryReport};
pub use client::GeoClient;
pub use config::{Config, LogFormat, LogLevel, Units};
pub use error_handling::{GeoQueryError, InitializationError, StoreError};
pub use geohash::{FirePoint, GeoPoint};
pub use geojson::{to_feature_collection, to_geojson, Feature, FeatureCollection, Point};
pub use query::{
    get, CombineReport, DiagnosticHook, GeoHit, GeoQuery, GeoQueryStream, HitMetadata,
    QueryExecution, QueryOptions, QueryState,
};
pub use store::{lookup_path, Document, DocumentStore, MemoryStore, Snapshot, SnapshotStream};
