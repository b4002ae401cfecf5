//! Geohash utilities.
//!
//! This module provides:
//! - Point types stored in records ([`GeoPoint`], [`FirePoint`])
//! - Base-32 encoding and cell bounds (via the `geohash` crate)
//! - Adjacent-cell enumeration with antimeridian wraparound
//! - Radius-to-precision selection
//! - Haversine distance and initial bearing

mod distance;
mod encode;
mod neighbors;
mod precision;
mod types;

// Re-export public API
pub use distance::{bearing_degrees, haversine_distance_km};
pub use encode::{decode_bounds, encode, CellBounds};
pub use neighbors::{adjacent, neighbors, Direction};
pub use precision::precision_for_radius;
pub use types::{FirePoint, GeoPoint};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbor_centers_are_close_to_cell_size() {
        // At the precision chosen for a radius, every neighbor center lies
        // within a few cell widths of the query point.
        let center = GeoPoint::new(48.8566, 2.3522).unwrap();
        let radius_km = 1.0;
        let precision = precision_for_radius(radius_km).unwrap();
        let hash = encode(&center, precision).unwrap();
        for cell in neighbors(&hash).unwrap() {
            let cell_center = decode_bounds(&cell).unwrap().center();
            let d = haversine_distance_km(&center, &cell_center);
            assert!(d < 4.0, "neighbor {cell} is {d} km away");
        }
    }
}
