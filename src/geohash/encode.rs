//! Base-32 geohash encoding and decoding, backed by the `geohash` crate.

use geohash::{Coord, Rect};

use crate::error_handling::GeoQueryError;

use super::types::GeoPoint;

/// Largest latitude handed to the encoder.
///
/// The `geohash` crate's fixed-point encoding folds exactly 90 into the
/// southern row, so the north pole is nudged just inside the top row.
const MAX_ENCODED_LATITUDE: f64 = 90.0 - 1e-9;

/// Bounding box of a geohash cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellBounds {
    /// Southern edge
    pub min_lat: f64,
    /// Northern edge
    pub max_lat: f64,
    /// Western edge
    pub min_lng: f64,
    /// Eastern edge
    pub max_lng: f64,
}

impl CellBounds {
    /// Center of the cell.
    pub fn center(&self) -> GeoPoint {
        GeoPoint {
            latitude: (self.min_lat + self.max_lat) / 2.0,
            longitude: (self.min_lng + self.max_lng) / 2.0,
        }
    }
}

impl From<Rect<f64>> for CellBounds {
    fn from(rect: Rect<f64>) -> Self {
        CellBounds {
            min_lat: rect.min().y,
            max_lat: rect.max().y,
            min_lng: rect.min().x,
            max_lng: rect.max().x,
        }
    }
}

/// Encodes a point as a geohash of `precision` characters.
///
/// # Errors
///
/// Returns `InvalidArgument` for out-of-range coordinates or a precision
/// outside `1..=12`.
pub fn encode(point: &GeoPoint, precision: usize) -> Result<String, GeoQueryError> {
    let coord = Coord {
        x: point.longitude,
        y: point.latitude.min(MAX_ENCODED_LATITUDE),
    };
    Ok(geohash::encode(coord, precision)?)
}

/// Decodes a geohash into its cell bounds.
///
/// # Errors
///
/// Returns `InvalidArgument` for an empty hash, a hash longer than 12
/// characters, or a character outside the base-32 alphabet.
pub fn decode_bounds(hash: &str) -> Result<CellBounds, GeoQueryError> {
    ensure_not_empty(hash)?;
    Ok(geohash::decode_bbox(hash)?.into())
}

/// Checks that `hash` is a decodable geohash.
pub(crate) fn validate_hash(hash: &str) -> Result<(), GeoQueryError> {
    decode_bounds(hash).map(|_| ())
}

fn ensure_not_empty(hash: &str) -> Result<(), GeoQueryError> {
    if hash.is_empty() {
        return Err(GeoQueryError::InvalidArgument(
            "geohash must not be empty".to_string(),
        ));
    }
    Ok(())
}
