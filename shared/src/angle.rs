use libm::floor;

const PI: f64 = std::f64::consts::PI;

pub fn dtr(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

pub fn rtd(radians: f64) -> f64 {
    radians * 180.0 / PI
}

/// Normalizes an angle into [0, 360).
pub fn fix_angle(angle: f64) -> f64 {
    fix(angle, 360.0)
}

/// Normalizes an hour value into [0, 24).
pub fn fix_hour(hour: f64) -> f64 {
    fix(hour, 24.0)
}

fn fix(a: f64, b: f64) -> f64 {
    let a = a - b * floor(a / b);
    if a < 0.0 {
        a + b
    } else {
        a
    }
}

/// Signed difference between a target bearing and the device heading,
/// normalized to (-180, 180]. Negative means the target is to the left.
pub fn signed_relative_bearing(bearing: f64, heading: f64) -> f64 {
    let delta = fix_angle(bearing - heading);
    if delta > 180.0 {
        delta - 360.0
    } else {
        delta
    }
}
