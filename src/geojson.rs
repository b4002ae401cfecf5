//! GeoJSON projection of query results.

use futures::{Stream, StreamExt};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error_handling::GeoQueryError;
use crate::query::GeoHit;

/// GeoJSON `Point` geometry; coordinates are `[longitude, latitude]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Point")]
pub struct Point {
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
}

/// GeoJSON `Feature` with a point geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    /// Location of the record
    pub geometry: Point,
    /// Record copy, or empty
    pub properties: Map<String, Value>,
}

/// GeoJSON `FeatureCollection`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    /// One feature per projected record
    pub features: Vec<Feature>,
}

/// Projects query results onto a GeoJSON feature collection.
///
/// Each hit becomes a point feature at the [`FirePoint`](crate::FirePoint)
/// stored in `field`. With `include_props`, the feature's properties are the
/// full record including `hitMetadata`; otherwise they are empty. Input order
/// is preserved and nothing is filtered, except hits whose field holds no
/// point.
pub fn to_feature_collection(
    results: &[GeoHit],
    field: &str,
    include_props: bool,
) -> FeatureCollection {
    let features = results
        .iter()
        .filter_map(|hit| {
            let Some(point) = hit.document.point(field) else {
                debug!(
                    "Skipping document {} in GeoJSON: field {:?} holds no point",
                    hit.document.id, field
                );
                return None;
            };
            let properties = if include_props {
                match serde_json::to_value(hit) {
                    Ok(Value::Object(map)) => map,
                    _ => Map::new(),
                }
            } else {
                Map::new()
            };
            Some(Feature {
                geometry: Point {
                    coordinates: [point.geopoint.longitude, point.geopoint.latitude],
                },
                properties,
            })
        })
        .collect();

    FeatureCollection { features }
}

/// Maps a live result stream to a live feature-collection stream.
pub fn to_geojson<St>(
    results: St,
    field: impl Into<String>,
    include_props: bool,
) -> impl Stream<Item = Result<FeatureCollection, GeoQueryError>> + Unpin
where
    St: Stream<Item = Result<Vec<GeoHit>, GeoQueryError>> + Unpin,
{
    let field = field.into();
    results.map(move |item| item.map(|hits| to_feature_collection(&hits, &field, include_props)))
}
