//! Geographic points and great-circle distance.

use serde::{Deserialize, Serialize};

use crate::domain::error::EngineError;

/// Mean earth radius in kilometers (IUGG R1).
const EARTH_RADIUS_KM: f64 = 6371.0088;

/// A WGS84 coordinate pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Reject coordinates outside the valid WGS84 ranges, including NaN.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(-90.0..=90.0).contains(&self.lat) || !(-180.0..=180.0).contains(&self.lng) {
            return Err(EngineError::InvalidQuery(format!(
                "coordinates ({}, {}) are out of range",
                self.lat, self.lng
            )));
        }
        Ok(())
    }

    /// Great-circle distance to another point in kilometers (haversine).
    ///
    /// A spherical approximation is accurate to well under 0.5% over the tens
    /// of kilometers the catalog spans.
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = (other.lat - self.lat).to_radians();
        let dlng = (other.lng - self.lng).to_radians();

        let a = (dlat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        let p = GeoPoint::new(46.3044, 16.3366);
        assert_eq!(p.distance_km(&p), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = GeoPoint::new(46.3044, 16.3366);
        let b = GeoPoint::new(45.8150, 15.9819);
        assert!((a.distance_km(&b) - b.distance_km(&a)).abs() < 1e-9);
    }

    #[test]
    fn varazdin_to_zagreb_is_about_60_km() {
        // Varaždin center to Zagreb center, roughly 61 km great-circle.
        let varazdin = GeoPoint::new(46.3044, 16.3366);
        let zagreb = GeoPoint::new(45.8150, 15.9819);
        let d = varazdin.distance_km(&zagreb);
        assert!((55.0..65.0).contains(&d), "got {d}");
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let a = GeoPoint::new(46.0, 16.0);
        let b = GeoPoint::new(47.0, 16.0);
        let d = a.distance_km(&b);
        assert!((110.0..112.5).contains(&d), "got {d}");
    }

    #[test]
    fn validate_rejects_out_of_range_coordinates() {
        assert!(GeoPoint::new(91.0, 0.0).validate().is_err());
        assert!(GeoPoint::new(0.0, -181.0).validate().is_err());
        assert!(GeoPoint::new(f64::NAN, 0.0).validate().is_err());
        assert!(GeoPoint::new(-90.0, 180.0).validate().is_ok());
    }
}
