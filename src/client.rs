//! Client facade: point construction and query handles.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error_handling::GeoQueryError;
use crate::geohash::{bearing_degrees, haversine_distance_km, FirePoint};
use crate::query::GeoQuery;
use crate::store::DocumentStore;

/// Entry point bound to one document store.
///
/// Queries created through the client share its shutdown token, so
/// [`shutdown`](GeoClient::shutdown) stops every live query at once.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use geo_proximity::{get, GeoClient, MemoryStore, QueryOptions};
///
/// # async fn example() -> Result<(), geo_proximity::GeoQueryError> {
/// let client = GeoClient::new(Arc::new(MemoryStore::new()));
/// let center = client.point(40.7128, -74.0060)?;
/// let hits = get(client.query("places").within(&center, 5.0, "position", QueryOptions::default())?).await?;
/// # Ok(())
/// # }
/// ```
pub struct GeoClient<S: ?Sized> {
    store: Arc<S>,
    shutdown: CancellationToken,
}

impl<S: DocumentStore + ?Sized> GeoClient<S> {
    /// Creates a client over `store`.
    pub fn new(store: Arc<S>) -> Self {
        GeoClient {
            store,
            shutdown: CancellationToken::new(),
        }
    }

    /// Returns a query handle for `collection`.
    pub fn query(&self, collection: impl Into<String>) -> GeoQuery<S> {
        GeoQuery::with_shutdown(
            Arc::clone(&self.store),
            collection,
            self.shutdown.child_token(),
        )
    }

    /// Builds a [`FirePoint`] to store in a record field.
    pub fn point(&self, latitude: f64, longitude: f64) -> Result<FirePoint, GeoQueryError> {
        FirePoint::new(latitude, longitude)
    }

    /// Haversine distance between two points in kilometers.
    pub fn distance(&self, from: &FirePoint, to: &FirePoint) -> f64 {
        haversine_distance_km(&from.geopoint, &to.geopoint)
    }

    /// Initial bearing from `from` to `to` in degrees.
    pub fn bearing(&self, from: &FirePoint, to: &FirePoint) -> f64 {
        bearing_degrees(&from.geopoint, &to.geopoint)
    }

    /// Cancels every live query created through this client.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{QueryOptions, QueryState};
    use crate::store::MemoryStore;
    use futures::StreamExt;

    #[test]
    fn test_point_validates_and_hashes() {
        let client = GeoClient::new(Arc::new(MemoryStore::new()));
        let point = client.point(57.64911, 10.40744).unwrap();
        assert_eq!(point.geohash, "u4pruydqq");
        assert!(client.point(91.0, 0.0).is_err());
    }

    #[test]
    fn test_distance_and_bearing_between_points() {
        let client = GeoClient::new(Arc::new(MemoryStore::new()));
        let a = client.point(0.0, 0.0).unwrap();
        let b = client.point(0.0, 1.0).unwrap();
        assert!((client.distance(&a, &b) - 111.19).abs() < 0.01);
        assert_eq!(client.distance(&a, &a), 0.0);
        assert!((client.bearing(&a, &b) - 90.0).abs() < 1e-9);
        assert!((client.bearing(&b, &a) - 270.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_shutdown_cancels_queries_from_all_handles() {
        let client = GeoClient::new(Arc::new(MemoryStore::new()));
        let center = client.point(10.0, 10.0).unwrap();
        let mut first = client
            .query("a")
            .within(&center, 3.0, "pos", QueryOptions::default())
            .unwrap();
        let mut second = client
            .query("b")
            .within(&center, 3.0, "pos", QueryOptions::default())
            .unwrap();

        assert!(first.next().await.unwrap().unwrap().is_empty());
        client.shutdown();
        assert!(first.next().await.is_none());
        // No result yet on the second query, so it learns why it stopped
        assert_eq!(second.next().await, Some(Err(GeoQueryError::Cancelled)));
        assert!(second.next().await.is_none());
        assert_eq!(second.state(), QueryState::Cancelled);
    }
}
