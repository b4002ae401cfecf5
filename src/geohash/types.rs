//! Point types stored alongside records.

use serde::{Deserialize, Serialize};

use crate::config::MAX_PRECISION;
use crate::error_handling::GeoQueryError;

use super::encode::encode;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, `[-90, 90]`
    pub latitude: f64,
    /// Longitude in degrees, `[-180, 180]`
    pub longitude: f64,
}

impl GeoPoint {
    /// Creates a point, rejecting non-finite or out-of-range coordinates.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoQueryError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoQueryError::InvalidArgument(format!(
                "latitude must be within [-90, 90], got {latitude}"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoQueryError::InvalidArgument(format!(
                "longitude must be within [-180, 180], got {longitude}"
            )));
        }
        Ok(GeoPoint {
            latitude,
            longitude,
        })
    }
}

/// A point plus its full-precision geohash, as stored in a record field.
///
/// The geohash is always the encoding of `geopoint` at [`MAX_PRECISION`];
/// coarser cells are prefixes of it. Regenerate the value when the point
/// moves instead of mutating it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirePoint {
    /// Raw coordinate
    pub geopoint: GeoPoint,
    /// Base-32 geohash of `geopoint`
    pub geohash: String,
}

impl FirePoint {
    /// Builds a point record from coordinates.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoQueryError> {
        let geopoint = GeoPoint::new(latitude, longitude)?;
        FirePoint::from_geopoint(geopoint)
    }

    /// Builds a point record from a coordinate.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the coordinate is out of range.
    pub fn from_geopoint(geopoint: GeoPoint) -> Result<Self, GeoQueryError> {
        Ok(FirePoint {
            geohash: encode(&geopoint, MAX_PRECISION)?,
            geopoint,
        })
    }

    /// Returns the record as a JSON value suitable for storing in a document field.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "geopoint": {
                "latitude": self.geopoint.latitude,
                "longitude": self.geopoint.longitude,
            },
            "geohash": self.geohash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geopoint_rejects_out_of_range() {
        assert!(GeoPoint::new(90.0, 180.0).is_ok());
        assert!(GeoPoint::new(-90.0, -180.0).is_ok());
        assert!(matches!(
            GeoPoint::new(90.5, 0.0),
            Err(GeoQueryError::InvalidArgument(_))
        ));
        assert!(matches!(
            GeoPoint::new(0.0, -180.1),
            Err(GeoQueryError::InvalidArgument(_))
        ));
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_firepoint_has_full_precision_hash() {
        let point = FirePoint::new(57.64911, 10.40744).unwrap();
        assert_eq!(point.geohash.len(), MAX_PRECISION);
        assert_eq!(point.geohash, "u4pruydqq");
    }

    #[test]
    fn test_firepoint_value_roundtrips_through_serde() {
        let point = FirePoint::new(-33.8688, 151.2093).unwrap();
        let value = point.to_value();
        assert_eq!(value["geohash"], serde_json::json!(point.geohash));
        let back: FirePoint = serde_json::from_value(value).unwrap();
        assert_eq!(back, point);
    }
}
