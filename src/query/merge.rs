//! The combine step: concatenate, filter, annotate, sort.

use std::time::Instant;

use log::debug;
use serde::Serialize;

use crate::geohash::{bearing_degrees, haversine_distance_km, FirePoint};
use crate::store::{Document, Snapshot};

/// Distance and bearing from the query center to a hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HitMetadata {
    /// Great-circle distance in kilometers
    pub distance: f64,
    /// Initial bearing in degrees, `[0, 360)`
    pub bearing: f64,
}

/// A record that matched a proximity query.
///
/// Serializes as the original record with an extra `hitMetadata` field:
/// `{"id": ..., ...fields, "hitMetadata": {"distance": ..., "bearing": ...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoHit {
    /// Unmodified copy of the matching record
    #[serde(flatten)]
    pub document: Document,
    /// Per-query annotation
    #[serde(rename = "hitMetadata")]
    pub hit_metadata: HitMetadata,
}

/// Immutable parameters of one `within` call.
#[derive(Debug, Clone)]
pub struct QueryExecution {
    pub(crate) center: FirePoint,
    pub(crate) radius: f64,
    pub(crate) radius_buffer: f64,
    pub(crate) field: String,
    pub(crate) precision: usize,
    pub(crate) cells: Vec<String>,
    pub(crate) started: Instant,
}

impl QueryExecution {
    /// Query center.
    pub fn center(&self) -> &FirePoint {
        &self.center
    }

    /// Requested radius in kilometers.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Radius actually used by the filter (radius times the edge buffer).
    pub fn radius_buffer(&self) -> f64 {
        self.radius_buffer
    }

    /// Record field holding the point.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Geohash precision of the scanned cells.
    pub fn precision(&self) -> usize {
        self.precision
    }

    /// Scanned cells, neighbors first, center cell last.
    pub fn cells(&self) -> &[String] {
        &self.cells
    }
}

/// Outcome of one combine cycle.
#[derive(Debug)]
pub(crate) struct Combined {
    pub hits: Vec<GeoHit>,
    pub total: usize,
}

/// Merges the latest snapshot of every cell into the sorted result list.
///
/// Records whose field does not hold a point are skipped. The sort is stable,
/// so equal distances keep snapshot order.
pub(crate) fn combine<'a, I>(execution: &QueryExecution, snapshots: I) -> Combined
where
    I: IntoIterator<Item = &'a Snapshot>,
{
    let center = &execution.center.geopoint;
    let mut total = 0;

    let mut hits: Vec<GeoHit> = snapshots
        .into_iter()
        .flatten()
        .filter_map(|document| {
            total += 1;
            let Some(point) = document.point(&execution.field) else {
                debug!(
                    "Skipping document {}: field {:?} holds no point",
                    document.id, execution.field
                );
                return None;
            };
            let distance = haversine_distance_km(center, &point.geopoint);
            (distance <= execution.radius_buffer).then(|| GeoHit {
                document: document.clone(),
                hit_metadata: HitMetadata {
                    distance,
                    bearing: bearing_degrees(center, &point.geopoint),
                },
            })
        })
        .collect();

    hits.sort_by(|a, b| a.hit_metadata.distance.total_cmp(&b.hit_metadata.distance));

    Combined { hits, total }
}
