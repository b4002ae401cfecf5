//! Adjacent-cell lookup.
//!
//! Delegates to the `geohash` crate, which steps one cell width from the
//! cell center and re-encodes. Longitude wraps at the antimeridian; latitude
//! wraps past a pole onto the opposite polar row.

use crate::error_handling::GeoQueryError;

use super::encode::validate_hash;

/// Cardinal direction for [`adjacent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward increasing latitude
    North,
    /// Toward decreasing latitude
    South,
    /// Toward increasing longitude
    East,
    /// Toward decreasing longitude
    West,
}

impl From<Direction> for geohash::Direction {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::North => geohash::Direction::N,
            Direction::South => geohash::Direction::S,
            Direction::East => geohash::Direction::E,
            Direction::West => geohash::Direction::W,
        }
    }
}

/// Returns the cell adjacent to `hash` in `direction`, at the same precision.
pub fn adjacent(hash: &str, direction: Direction) -> Result<String, GeoQueryError> {
    validate_hash(hash)?;
    Ok(geohash::neighbor(hash, direction.into())?)
}

/// Returns the eight cells surrounding `hash`.
///
/// Order is N, NE, E, SE, S, SW, W, NW. The input cell is never included.
///
/// # Errors
///
/// Returns `InvalidArgument` for an empty or malformed hash.
pub fn neighbors(hash: &str) -> Result<[String; 8], GeoQueryError> {
    validate_hash(hash)?;
    let geohash::Neighbors {
        n,
        ne,
        e,
        se,
        s,
        sw,
        w,
        nw,
    } = geohash::neighbors(hash)?;
    Ok([n, ne, e, se, s, sw, w, nw])
}
