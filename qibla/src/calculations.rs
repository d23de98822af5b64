use shared::{signed_relative_bearing, GeoCoordinate};

use crate::models::{CompassPoint, HeadingReading, QiblaDirection};

/// Default alignment window, degrees either side of the target bearing.
pub const ALIGNMENT_THRESHOLD_DEGREES: f64 = 5.0;

/// Computes the great-circle bearing and distance from an origin to a target
/// point, the Kaaba by default. Pure and stateless; build one per coordinate
/// sample or reuse, either is fine.
pub struct QiblaCalculator {
    origin: GeoCoordinate,
    target: GeoCoordinate,
    alignment_threshold: f64,
}

impl QiblaCalculator {
    pub fn new(origin: GeoCoordinate) -> Self {
        Self {
            origin,
            target: GeoCoordinate::KAABA,
            alignment_threshold: ALIGNMENT_THRESHOLD_DEGREES,
        }
    }

    pub fn with_target(mut self, target: GeoCoordinate) -> Self {
        self.target = target;
        self
    }

    pub fn with_alignment_threshold(mut self, degrees: f64) -> Self {
        self.alignment_threshold = degrees;
        self
    }

    /// Direction without a device heading: the relative bearing is absent
    /// and the alignment flag is false.
    pub fn compute(&self) -> QiblaDirection {
        self.build(None)
    }

    /// Direction against a device heading sample. Alignment holds when the
    /// signed relative bearing is within the threshold.
    pub fn compute_with_heading(&self, heading: &HeadingReading) -> QiblaDirection {
        self.build(Some(heading.degrees))
    }

    fn build(&self, heading: Option<f64>) -> QiblaDirection {
        let bearing = self.origin.bearing_to(self.target);
        let distance_meters = self.origin.distance_to(self.target);

        let relative_bearing = heading.map(|h| signed_relative_bearing(bearing, h));
        let is_aligned = relative_bearing
            .map(|rel| rel.abs() <= self.alignment_threshold)
            .unwrap_or(false);

        QiblaDirection {
            bearing,
            distance_meters,
            cardinal: CompassPoint::from_bearing(bearing),
            relative_bearing,
            is_aligned,
        }
    }
}
