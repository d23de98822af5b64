pub mod calculations;
pub mod models;

pub use calculations::QiblaCalculator;
pub use models::{CalibrationLevel, CompassPoint, HeadingReading, QiblaDirection};
