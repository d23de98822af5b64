use libm::{asin, atan2, cos, sin, sqrt};
use serde::{Deserialize, Serialize};

use crate::angle::{dtr, fix_angle, rtd};

pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

// Kaaba coordinates (most precise available)
pub const KAABA_LATITUDE: f64 = 21.4224779;
pub const KAABA_LONGITUDE: f64 = 39.8251832;

/// A geographic point. Values are taken as-is; callers that need range
/// checking go through `validation`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoCoordinate {
    pub const KAABA: GeoCoordinate = GeoCoordinate {
        latitude: KAABA_LATITUDE,
        longitude: KAABA_LONGITUDE,
    };

    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Initial great-circle bearing from `self` to `target`, in [0, 360)
    /// with 0 = North. At identical or antipodal points the bearing is
    /// geometrically indeterminate; atan2 still yields a stable finite
    /// value, which is returned as-is.
    pub fn bearing_to(&self, target: GeoCoordinate) -> f64 {
        let lat1 = dtr(self.latitude);
        let lat2 = dtr(target.latitude);
        let dlon = dtr(target.longitude - self.longitude);

        let y = sin(dlon) * cos(lat2);
        let x = cos(lat1) * sin(lat2) - sin(lat1) * cos(lat2) * cos(dlon);

        fix_angle(rtd(atan2(y, x)))
    }

    /// Great-circle distance to `target` in meters (haversine, spherical
    /// Earth of mean radius 6371 km).
    pub fn distance_to(&self, target: GeoCoordinate) -> f64 {
        let lat1 = dtr(self.latitude);
        let lat2 = dtr(target.latitude);
        let dlat = lat2 - lat1;
        let dlon = dtr(target.longitude - self.longitude);

        let a = sin(dlat / 2.0) * sin(dlat / 2.0)
            + cos(lat1) * cos(lat2) * sin(dlon / 2.0) * sin(dlon / 2.0);
        let c = 2.0 * asin(sqrt(a.clamp(0.0, 1.0)));

        EARTH_RADIUS_METERS * c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearing_always_in_range() {
        let targets = [
            GeoCoordinate::new(21.4224779, 39.8251832),
            GeoCoordinate::new(-21.4224779, -140.1748168), // antipode
            GeoCoordinate::new(90.0, 0.0),
            GeoCoordinate::new(-90.0, 0.0),
        ];
        for lat in [-90.0, -45.0, 0.0, 45.0, 90.0] {
            for lon in [-180.0, -73.9855, 0.0, 139.7454, 180.0] {
                let origin = GeoCoordinate::new(lat, lon);
                for target in targets {
                    let bearing = origin.bearing_to(target);
                    assert!((0.0..360.0).contains(&bearing));
                    assert!(origin.distance_to(target) >= 0.0);
                }
            }
        }
    }

    #[test]
    fn test_distance_at_same_point() {
        let kaaba = GeoCoordinate::KAABA;
        assert!(kaaba.distance_to(kaaba) < 100.0);
        let bearing = kaaba.bearing_to(kaaba);
        assert!(bearing.is_finite());
        assert!((0.0..360.0).contains(&bearing));
    }

    #[test]
    fn test_antipodal_distance() {
        let kaaba = GeoCoordinate::KAABA;
        let antipode = GeoCoordinate::new(-KAABA_LATITUDE, KAABA_LONGITUDE - 180.0);
        let distance_km = kaaba.distance_to(antipode) / 1000.0;
        // Half the Earth's circumference
        assert!(distance_km > 19_965.0 && distance_km < 20_065.0);
    }

    #[test]
    fn test_date_line_continuity() {
        // The signed longitude delta must take the short way across 180°:
        // two origins straddling the date line see nearly the same bearing.
        let east = GeoCoordinate::new(0.0, 179.9);
        let west = GeoCoordinate::new(0.0, -179.9);
        let b_east = east.bearing_to(GeoCoordinate::KAABA);
        let b_west = west.bearing_to(GeoCoordinate::KAABA);
        assert!((b_east - b_west).abs() < 1.0);
    }
}
