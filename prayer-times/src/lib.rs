pub mod calculations;
pub mod models;
pub mod navigator;

pub use calculations::{PrayerCalculator, HIGH_LATITUDE_THRESHOLD};
pub use models::{
    CalculationMethod, DailyPrayerSchedule, HighLatitudeRule, Madhab, MethodParameters,
    MinuteOrAngle, Prayer,
};
pub use navigator::{current_prayer, next_prayer, time_until};
