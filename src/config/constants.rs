//! Configuration constants.
//!
//! This module defines the fixed parameters of the proximity engine: geohash
//! precision limits, the radius-to-precision band table, and the geometric
//! constants shared by the distance and bearing helpers.

/// Geohash length stored in every [`FirePoint`](crate::FirePoint).
///
/// Consumers take prefixes of this hash for coarser cells, so it must be at
/// least as fine as the finest band in [`PRECISION_BANDS`].
pub const MAX_PRECISION: usize = 9;

/// Multiplier applied to the search radius before filtering.
///
/// Geohash cells are rectangles on a sphere, so records close to a cell edge
/// can sit a little outside the requested circle. Kept at 1.02; changing it
/// changes which records a query returns.
pub const EDGE_BUFFER_FACTOR: f64 = 1.02;

/// Mean Earth radius in kilometers (haversine model).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Appended to a cell to form the exclusive upper bound of its range scan.
///
/// `~` sorts after every character of the geohash base-32 alphabet.
pub const RANGE_SENTINEL: char = '~';

/// Suffix of the sub-field holding the geohash inside a point field.
pub const GEOHASH_SUBFIELD: &str = "geohash";

/// Radius bands mapping a search radius (km) to a geohash precision.
///
/// Each entry is `(max_radius_km, precision)`, ordered finest first. A radius
/// above the last band falls back to precision 1.
pub const PRECISION_BANDS: [(f64, usize); 8] = [
    (0.00477, 9),
    (0.0382, 8),
    (0.153, 7),
    (1.22, 6),
    (4.89, 5),
    (39.1, 4),
    (156.0, 3),
    (1250.0, 2),
];

/// Precision used when a radius exceeds every band.
pub const COARSEST_PRECISION: usize = 1;
