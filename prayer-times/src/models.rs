use chrono::{DateTime, Datelike, NaiveDate, Utc};
use hijri_date::HijriDate;
use serde::{Deserialize, Serialize};
use shared::error::{CoreError, CoreResult};
use shared::geo::GeoCoordinate;

/// The five daily prayers plus sunrise. Sunrise is a solar reference event,
/// not a prayer; `is_prayer` distinguishes the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prayer {
    Fajr,
    Sunrise,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl Prayer {
    pub const ALL: [Prayer; 6] = [
        Prayer::Fajr,
        Prayer::Sunrise,
        Prayer::Dhuhr,
        Prayer::Asr,
        Prayer::Maghrib,
        Prayer::Isha,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Prayer::Fajr => "Fajr",
            Prayer::Sunrise => "Sunrise",
            Prayer::Dhuhr => "Dhuhr",
            Prayer::Asr => "Asr",
            Prayer::Maghrib => "Maghrib",
            Prayer::Isha => "Isha",
        }
    }

    pub fn arabic_name(&self) -> &'static str {
        match self {
            Prayer::Fajr => "الفجر",
            Prayer::Sunrise => "الشروق",
            Prayer::Dhuhr => "الظهر",
            Prayer::Asr => "العصر",
            Prayer::Maghrib => "المغرب",
            Prayer::Isha => "العشاء",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Prayer::Fajr => "Dawn",
            Prayer::Sunrise => "Sunrise",
            Prayer::Dhuhr => "Noon",
            Prayer::Asr => "Afternoon",
            Prayer::Maghrib => "Sunset",
            Prayer::Isha => "Night",
        }
    }

    /// False only for `Sunrise`.
    pub fn is_prayer(&self) -> bool {
        !matches!(self, Prayer::Sunrise)
    }
}

impl std::fmt::Display for Prayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Named astronomical parameter bundles used by the major prayer-time
/// authorities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalculationMethod {
    Mwl,
    Isna,
    Egypt,
    UmmAlQura,
    Dubai,
    Moonsighting,
    Kuwait,
    Qatar,
    Singapore,
    Tehran,
    Turkey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighLatitudeRule {
    NightMiddle,
    OneSeventh,
    AngleBased,
}

/// Asr shadow-ratio rule. Only Asr is affected; all other times are
/// madhab-independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Madhab {
    /// Shafi, Maliki and Hanbali: Asr when shadow length equals object
    /// length.
    Shafi,
    /// Hanafi: Asr when shadow length equals twice the object length.
    Hanafi,
}

impl Madhab {
    pub fn shadow_factor(&self) -> f64 {
        match self {
            Madhab::Shafi => 1.0,
            Madhab::Hanafi => 2.0,
        }
    }
}

impl Default for Madhab {
    fn default() -> Self {
        Madhab::Shafi
    }
}

impl Default for CalculationMethod {
    fn default() -> Self {
        CalculationMethod::Mwl
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MinuteOrAngle {
    Minute { minute: f64 },
    Angle { angle: f64 },
}

/// The tunable inputs of the solar computation: twilight depression angles
/// (or fixed-minute offsets) plus an optional high-latitude rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MethodParameters {
    /// Fajr twilight depression angle in degrees.
    pub fajr: f64,
    /// Maghrib as minutes after sunset or a depression angle.
    pub maghrib: MinuteOrAngle,
    /// Isha as a depression angle or minutes after Maghrib.
    pub isha: MinuteOrAngle,
    pub high_latitude: Option<HighLatitudeRule>,
}

impl CalculationMethod {
    pub const ALL: [CalculationMethod; 11] = [
        CalculationMethod::Mwl,
        CalculationMethod::Isna,
        CalculationMethod::Egypt,
        CalculationMethod::UmmAlQura,
        CalculationMethod::Dubai,
        CalculationMethod::Moonsighting,
        CalculationMethod::Kuwait,
        CalculationMethod::Qatar,
        CalculationMethod::Singapore,
        CalculationMethod::Tehran,
        CalculationMethod::Turkey,
    ];

    pub fn parameters(self) -> MethodParameters {
        let sunset = MinuteOrAngle::Minute { minute: 0.0 };
        match self {
            Self::Mwl => MethodParameters {
                fajr: 18.0,
                maghrib: sunset,
                isha: MinuteOrAngle::Angle { angle: 17.0 },
                high_latitude: None,
            },
            Self::Isna => MethodParameters {
                fajr: 15.0,
                maghrib: sunset,
                isha: MinuteOrAngle::Angle { angle: 15.0 },
                high_latitude: None,
            },
            Self::Egypt => MethodParameters {
                fajr: 19.5,
                maghrib: sunset,
                isha: MinuteOrAngle::Angle { angle: 17.5 },
                high_latitude: None,
            },
            Self::UmmAlQura => MethodParameters {
                fajr: 18.5,
                maghrib: sunset,
                isha: MinuteOrAngle::Minute { minute: 90.0 },
                high_latitude: None,
            },
            Self::Dubai => MethodParameters {
                fajr: 18.2,
                maghrib: sunset,
                isha: MinuteOrAngle::Angle { angle: 18.2 },
                high_latitude: None,
            },
            Self::Moonsighting => MethodParameters {
                fajr: 18.0,
                maghrib: sunset,
                isha: MinuteOrAngle::Angle { angle: 18.0 },
                high_latitude: None,
            },
            Self::Kuwait => MethodParameters {
                fajr: 18.0,
                maghrib: sunset,
                isha: MinuteOrAngle::Angle { angle: 17.5 },
                high_latitude: None,
            },
            Self::Qatar => MethodParameters {
                fajr: 18.0,
                maghrib: sunset,
                isha: MinuteOrAngle::Minute { minute: 90.0 },
                high_latitude: None,
            },
            Self::Singapore => MethodParameters {
                fajr: 20.0,
                maghrib: sunset,
                isha: MinuteOrAngle::Angle { angle: 18.0 },
                high_latitude: None,
            },
            Self::Tehran => MethodParameters {
                fajr: 17.7,
                maghrib: MinuteOrAngle::Angle { angle: 4.5 },
                isha: MinuteOrAngle::Angle { angle: 14.0 },
                high_latitude: None,
            },
            Self::Turkey => MethodParameters {
                fajr: 18.0,
                maghrib: sunset,
                isha: MinuteOrAngle::Angle { angle: 17.0 },
                high_latitude: None,
            },
        }
    }
}

impl std::str::FromStr for CalculationMethod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mwl" => Ok(Self::Mwl),
            "isna" => Ok(Self::Isna),
            "egypt" => Ok(Self::Egypt),
            "ummalqura" | "makkah" => Ok(Self::UmmAlQura),
            "dubai" => Ok(Self::Dubai),
            "moonsighting" => Ok(Self::Moonsighting),
            "kuwait" => Ok(Self::Kuwait),
            "qatar" => Ok(Self::Qatar),
            "singapore" => Ok(Self::Singapore),
            "tehran" => Ok(Self::Tehran),
            "turkey" => Ok(Self::Turkey),
            other => Err(CoreError::validation(format!(
                "Unknown calculation method: {}",
                other
            ))),
        }
    }
}

impl std::str::FromStr for Madhab {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "shafi" => Ok(Self::Shafi),
            "hanafi" => Ok(Self::Hanafi),
            other => Err(CoreError::validation(format!("Unknown madhab: {}", other))),
        }
    }
}

impl std::str::FromStr for HighLatitudeRule {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nightmiddle" => Ok(Self::NightMiddle),
            "oneseventh" => Ok(Self::OneSeventh),
            "anglebased" => Ok(Self::AngleBased),
            other => Err(CoreError::validation(format!(
                "Unknown high latitude rule: {}",
                other
            ))),
        }
    }
}

/// One day's six solar-event times for a coordinate, method and madhab.
/// Immutable; recomputed from scratch when any input changes. Entries are
/// strictly increasing and may cross the UTC date boundary (the calendar
/// date is nominal, local to the coordinate's longitude).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyPrayerSchedule {
    pub date: NaiveDate,
    pub coordinates: GeoCoordinate,
    /// `None` when computed from custom parameters.
    pub method: Option<CalculationMethod>,
    pub madhab: Madhab,
    pub fajr: DateTime<Utc>,
    pub sunrise: DateTime<Utc>,
    pub dhuhr: DateTime<Utc>,
    pub asr: DateTime<Utc>,
    pub maghrib: DateTime<Utc>,
    pub isha: DateTime<Utc>,
}

impl DailyPrayerSchedule {
    pub fn time_of(&self, prayer: Prayer) -> DateTime<Utc> {
        match prayer {
            Prayer::Fajr => self.fajr,
            Prayer::Sunrise => self.sunrise,
            Prayer::Dhuhr => self.dhuhr,
            Prayer::Asr => self.asr,
            Prayer::Maghrib => self.maghrib,
            Prayer::Isha => self.isha,
        }
    }

    /// The six entries in chronological order.
    pub fn entries(&self) -> [(Prayer, DateTime<Utc>); 6] {
        Prayer::ALL.map(|prayer| (prayer, self.time_of(prayer)))
    }

    /// Hijri date of the schedule's Gregorian date, as DD/MM/YYYY.
    pub fn hijri_date(&self) -> CoreResult<String> {
        let year = usize::try_from(self.date.year())
            .map_err(|_| CoreError::calculation("Date precedes the Gregorian calendar"))?;
        let hijri = HijriDate::from_gr(year, self.date.month() as usize, self.date.day() as usize)
            .map_err(|e| CoreError::calculation(format!("Failed to derive Hijri date: {}", e)))?;
        Ok(hijri.format("%d/%m/%Y").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sunrise_is_not_a_prayer() {
        assert!(!Prayer::Sunrise.is_prayer());
        for prayer in Prayer::ALL {
            if prayer != Prayer::Sunrise {
                assert!(prayer.is_prayer());
            }
        }
    }

    #[test]
    fn test_method_parsing_matches_serde_names() {
        for method in CalculationMethod::ALL {
            let name = serde_json::to_string(&method).unwrap();
            let name = name.trim_matches('"');
            assert_eq!(name.parse::<CalculationMethod>().unwrap(), method);
        }
        assert!("nope".parse::<CalculationMethod>().is_err());
    }

    #[test]
    fn test_fixed_minute_isha_methods() {
        for method in [CalculationMethod::UmmAlQura, CalculationMethod::Qatar] {
            assert!(matches!(
                method.parameters().isha,
                MinuteOrAngle::Minute { minute } if minute == 90.0
            ));
        }
        assert!(matches!(
            CalculationMethod::Mwl.parameters().isha,
            MinuteOrAngle::Angle { angle } if angle == 17.0
        ));
    }

    #[test]
    fn test_shadow_factors() {
        assert_eq!(Madhab::Shafi.shadow_factor(), 1.0);
        assert_eq!(Madhab::Hanafi.shadow_factor(), 2.0);
    }
}
