//! Proximity query engine.
//!
//! [`GeoQuery::within`] turns "records near this point" into one live range
//! subscription per geohash cell (the center cell and its eight neighbors),
//! then merges their snapshots with combine-latest semantics into a sorted,
//! distance-annotated result stream.

mod coordinator;
mod merge;
mod options;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use futures::{Stream, StreamExt};
use log::debug;
use tokio_util::sync::CancellationToken;

use crate::config::{GEOHASH_SUBFIELD, RANGE_SENTINEL};
use crate::error_handling::GeoQueryError;
use crate::geohash::{decode_bounds, neighbors, precision_for_radius, FirePoint, GeoPoint};
use crate::store::DocumentStore;

// Re-export public API
pub use coordinator::{GeoQueryStream, QueryState};
pub use merge::{GeoHit, HitMetadata, QueryExecution};
pub use options::{CombineReport, DiagnosticHook, QueryOptions};

/// Proximity queries against one collection of a [`DocumentStore`].
///
/// Every stream created by [`within`](GeoQuery::within) is tied to this
/// query's shutdown token; [`shutdown`](GeoQuery::shutdown) cancels them all.
pub struct GeoQuery<S: ?Sized> {
    store: Arc<S>,
    collection: String,
    shutdown: CancellationToken,
}

impl<S: DocumentStore + ?Sized> GeoQuery<S> {
    /// Creates a query handle for `collection`.
    pub fn new(store: Arc<S>, collection: impl Into<String>) -> Self {
        Self::with_shutdown(store, collection, CancellationToken::new())
    }

    pub(crate) fn with_shutdown(
        store: Arc<S>,
        collection: impl Into<String>,
        shutdown: CancellationToken,
    ) -> Self {
        GeoQuery {
            store,
            collection: collection.into(),
            shutdown,
        }
    }

    /// Collection this handle queries.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Cancels every live stream created through this handle.
    ///
    /// Streams still waiting for their first result yield
    /// `Err(GeoQueryError::Cancelled)` before ending.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Streams the records within `radius` km of `center`, nearest first.
    ///
    /// `field` names the record field holding a [`FirePoint`] (dotted paths
    /// allowed). Each item is the full, re-sorted result set; a new item is
    /// produced whenever any scanned cell changes, once every cell has
    /// delivered its first snapshot.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` before opening any subscription when the
    /// radius is not positive, the field is empty, the center is malformed,
    /// or the options are invalid. Store failures arrive later as a single
    /// `Err` item on the stream, as does `Cancelled` when
    /// [`shutdown`](GeoQuery::shutdown) stops the query before its first
    /// result.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use std::sync::Arc;
    /// use futures::StreamExt;
    /// use geo_proximity::{FirePoint, GeoQuery, MemoryStore, QueryOptions};
    ///
    /// # async fn example() -> Result<(), geo_proximity::GeoQueryError> {
    /// let query = GeoQuery::new(Arc::new(MemoryStore::new()), "places");
    /// let center = FirePoint::new(40.7128, -74.0060)?;
    /// let mut results = query.within(&center, 2.0, "position", QueryOptions::default())?;
    /// while let Some(hits) = results.next().await {
    ///     println!("{} places nearby", hits?.len());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn within(
        &self,
        center: &FirePoint,
        radius: f64,
        field: &str,
        options: QueryOptions,
    ) -> Result<GeoQueryStream, GeoQueryError> {
        let started = Instant::now();
        options.validate()?;
        validate_field(field)?;
        GeoPoint::new(center.geopoint.latitude, center.geopoint.longitude)?;

        let precision = precision_for_radius(radius)?;
        let radius_buffer = radius * options.edge_buffer;

        let center_cell = center
            .geohash
            .get(..precision)
            .filter(|cell| cell.len() == precision)
            .ok_or_else(|| {
                GeoQueryError::InvalidArgument(format!(
                    "center geohash {:?} is shorter than precision {}",
                    center.geohash, precision
                ))
            })?;
        decode_bounds(center_cell)?;

        let mut seen = HashSet::new();
        let cells: Vec<String> = neighbors(center_cell)?
            .into_iter()
            .chain(std::iter::once(center_cell.to_string()))
            .filter(|cell| seen.insert(cell.clone()))
            .collect();

        debug!(
            "Query {} within {} km of {} (precision {}, {} cells)",
            self.collection,
            radius,
            center.geohash,
            precision,
            cells.len()
        );

        let order_by = format!("{field}.{GEOHASH_SUBFIELD}");
        let subscriptions = cells
            .iter()
            .map(|cell| {
                let upper = format!("{cell}{RANGE_SENTINEL}");
                let subscription =
                    self.store
                        .subscribe_range(&self.collection, &order_by, cell, &upper);
                (cell.clone(), subscription)
            })
            .collect();

        let execution = QueryExecution {
            center: center.clone(),
            radius,
            radius_buffer,
            field: field.to_string(),
            precision,
            cells,
            started,
        };

        Ok(GeoQueryStream::new(
            execution,
            subscriptions,
            &self.shutdown,
            options,
        ))
    }
}

fn validate_field(field: &str) -> Result<(), GeoQueryError> {
    if field.is_empty() || field.split('.').any(str::is_empty) {
        return Err(GeoQueryError::InvalidArgument(format!(
            "field must be a non-empty dotted path, got {field:?}"
        )));
    }
    Ok(())
}

/// Resolves to the first item of a live query, then releases it.
///
/// The stream is dropped as soon as the first item arrives, which tears its
/// cell subscriptions down. Works for result streams and for the GeoJSON
/// stream returned by [`to_geojson`](crate::to_geojson).
///
/// # Errors
///
/// Returns the stream's error if its first item is an error, or
/// `GeoQueryError::Cancelled` if it ends without producing anything.
pub async fn get<St, T>(stream: St) -> Result<T, GeoQueryError>
where
    St: Stream<Item = Result<T, GeoQueryError>> + Unpin,
{
    let mut stream = stream;
    let first = stream.next().await;
    drop(stream);
    first.unwrap_or(Err(GeoQueryError::Cancelled))
}
