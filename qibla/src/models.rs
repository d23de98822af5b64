use serde::{Deserialize, Serialize};

/// 16-point compass rose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompassPoint {
    N,
    NNE,
    NE,
    ENE,
    E,
    ESE,
    SE,
    SSE,
    S,
    SSW,
    SW,
    WSW,
    W,
    WNW,
    NW,
    NNW,
}

impl CompassPoint {
    pub const ALL: [CompassPoint; 16] = [
        CompassPoint::N,
        CompassPoint::NNE,
        CompassPoint::NE,
        CompassPoint::ENE,
        CompassPoint::E,
        CompassPoint::ESE,
        CompassPoint::SE,
        CompassPoint::SSE,
        CompassPoint::S,
        CompassPoint::SSW,
        CompassPoint::SW,
        CompassPoint::WSW,
        CompassPoint::W,
        CompassPoint::WNW,
        CompassPoint::NW,
        CompassPoint::NNW,
    ];

    /// Sector lookup: 16 equal 22.5° sectors centered on each point.
    pub fn from_bearing(bearing: f64) -> CompassPoint {
        let bearing = shared::fix_angle(bearing);
        let index = ((bearing + 11.25) / 22.5) as usize % 16;
        Self::ALL[index]
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            CompassPoint::N => "N",
            CompassPoint::NNE => "NNE",
            CompassPoint::NE => "NE",
            CompassPoint::ENE => "ENE",
            CompassPoint::E => "E",
            CompassPoint::ESE => "ESE",
            CompassPoint::SE => "SE",
            CompassPoint::SSE => "SSE",
            CompassPoint::S => "S",
            CompassPoint::SSW => "SSW",
            CompassPoint::SW => "SW",
            CompassPoint::WSW => "WSW",
            CompassPoint::W => "W",
            CompassPoint::WNW => "WNW",
            CompassPoint::NW => "NW",
            CompassPoint::NNW => "NNW",
        }
    }
}

impl std::fmt::Display for CompassPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// Compass calibration quality, classified from the heading accuracy the
/// device reports (degrees of expected error; negative means invalid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalibrationLevel {
    Invalid,
    Low,
    Medium,
    High,
}

impl CalibrationLevel {
    pub fn from_accuracy(accuracy_degrees: f64) -> CalibrationLevel {
        if accuracy_degrees < 0.0 {
            CalibrationLevel::Invalid
        } else if accuracy_degrees <= 5.0 {
            CalibrationLevel::High
        } else if accuracy_degrees <= 15.0 {
            CalibrationLevel::Medium
        } else {
            CalibrationLevel::Low
        }
    }

    /// Medium or better is good enough to steer by.
    pub fn is_usable(&self) -> bool {
        matches!(self, CalibrationLevel::Medium | CalibrationLevel::High)
    }
}

/// One sample from a device heading source (magnetometer).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HeadingReading {
    /// Compass heading in degrees, 0-360, 0 = North.
    pub degrees: f64,
    /// Reported accuracy in degrees; negative when the sensor is invalid.
    pub accuracy_degrees: f64,
}

impl HeadingReading {
    pub fn new(degrees: f64, accuracy_degrees: f64) -> Self {
        Self {
            degrees,
            accuracy_degrees,
        }
    }

    pub fn calibration(&self) -> CalibrationLevel {
        CalibrationLevel::from_accuracy(self.accuracy_degrees)
    }
}

/// Result of a direction computation. Recomputed whole on every new
/// coordinate or heading sample, never mutated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QiblaDirection {
    /// Bearing to the target in degrees, [0, 360), 0 = North.
    pub bearing: f64,
    /// Great-circle distance to the target in meters.
    pub distance_meters: f64,
    /// Compass sector the bearing falls in.
    pub cardinal: CompassPoint,
    /// Bearing relative to the device heading, (-180, 180]. `None` when no
    /// heading was supplied.
    pub relative_bearing: Option<f64>,
    /// Whether the device heading is within the alignment threshold of the
    /// target bearing. Always false without a heading.
    pub is_aligned: bool,
}

impl QiblaDirection {
    pub fn distance_km(&self) -> f64 {
        self.distance_meters / 1000.0
    }

    /// Formats as e.g. "58° NE".
    pub fn formatted_bearing(&self) -> String {
        format!("{}° {}", self.bearing.round() as i64, self.cardinal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compass_point_cardinals() {
        assert_eq!(CompassPoint::from_bearing(0.0), CompassPoint::N);
        assert_eq!(CompassPoint::from_bearing(90.0), CompassPoint::E);
        assert_eq!(CompassPoint::from_bearing(180.0), CompassPoint::S);
        assert_eq!(CompassPoint::from_bearing(270.0), CompassPoint::W);
        assert_eq!(CompassPoint::from_bearing(45.0), CompassPoint::NE);
    }

    #[test]
    fn test_compass_point_sector_edges() {
        // Sectors are centered on the point, so the edge at 11.25° tips over
        assert_eq!(CompassPoint::from_bearing(11.24), CompassPoint::N);
        assert_eq!(CompassPoint::from_bearing(11.26), CompassPoint::NNE);
        // Wraps back to N near 360
        assert_eq!(CompassPoint::from_bearing(359.0), CompassPoint::N);
        assert_eq!(CompassPoint::from_bearing(348.7), CompassPoint::NNW);
    }

    #[test]
    fn test_calibration_levels() {
        assert_eq!(
            CalibrationLevel::from_accuracy(-1.0),
            CalibrationLevel::Invalid
        );
        assert_eq!(CalibrationLevel::from_accuracy(3.0), CalibrationLevel::High);
        assert_eq!(
            CalibrationLevel::from_accuracy(12.0),
            CalibrationLevel::Medium
        );
        assert_eq!(CalibrationLevel::from_accuracy(40.0), CalibrationLevel::Low);

        assert!(CalibrationLevel::High.is_usable());
        assert!(CalibrationLevel::Medium.is_usable());
        assert!(!CalibrationLevel::Low.is_usable());
        assert!(!CalibrationLevel::Invalid.is_usable());
    }

    #[test]
    fn test_formatted_bearing() {
        let direction = QiblaDirection {
            bearing: 58.4,
            distance_meters: 10_304_000.0,
            cardinal: CompassPoint::from_bearing(58.4),
            relative_bearing: None,
            is_aligned: false,
        };
        assert_eq!(direction.formatted_bearing(), "58° ENE");
        assert!((direction.distance_km() - 10_304.0).abs() < 1e-9);
    }
}
