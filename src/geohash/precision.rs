//! Radius-to-precision selection.

use crate::config::{COARSEST_PRECISION, PRECISION_BANDS};
use crate::error_handling::GeoQueryError;

/// Chooses the geohash precision whose cells cover a search radius.
///
/// Walks [`PRECISION_BANDS`] finest first and returns the first band the
/// radius fits in, so a larger radius never yields a finer precision. Radii
/// beyond the last band clamp to precision 1.
///
/// # Errors
///
/// Returns `InvalidArgument` when `radius_km` is not a finite positive number.
pub fn precision_for_radius(radius_km: f64) -> Result<usize, GeoQueryError> {
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Err(GeoQueryError::InvalidArgument(format!(
            "radius must be a positive number of kilometers, got {radius_km}"
        )));
    }

    Ok(PRECISION_BANDS
        .iter()
        .find(|(max_km, _)| radius_km <= *max_km)
        .map(|&(_, precision)| precision)
        .unwrap_or(COARSEST_PRECISION))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_edges() {
        assert_eq!(precision_for_radius(0.001).unwrap(), 9);
        assert_eq!(precision_for_radius(0.00477).unwrap(), 9);
        assert_eq!(precision_for_radius(0.005).unwrap(), 8);
        assert_eq!(precision_for_radius(0.1).unwrap(), 7);
        assert_eq!(precision_for_radius(1.0).unwrap(), 6);
        assert_eq!(precision_for_radius(1.22).unwrap(), 6);
        assert_eq!(precision_for_radius(2.0).unwrap(), 5);
        assert_eq!(precision_for_radius(10.0).unwrap(), 4);
        assert_eq!(precision_for_radius(100.0).unwrap(), 3);
        assert_eq!(precision_for_radius(1000.0).unwrap(), 2);
    }

    #[test]
    fn test_huge_radius_clamps_to_coarsest() {
        assert_eq!(precision_for_radius(1250.1).unwrap(), 1);
        assert_eq!(precision_for_radius(20_000.0).unwrap(), 1);
    }

    #[test]
    fn test_invalid_radius() {
        for radius in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                precision_for_radius(radius),
                Err(GeoQueryError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_monotonic() {
        let mut radius = 0.0001;
        let mut previous = precision_for_radius(radius).unwrap();
        while radius < 5000.0 {
            radius *= 1.07;
            let current = precision_for_radius(radius).unwrap();
            assert!(current <= previous, "radius {radius} got finer precision");
            previous = current;
        }
    }
}
