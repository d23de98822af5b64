use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use libm::{acos, asin, atan, atan2, cos, floor, sin, tan};
use shared::angle::{dtr, fix_angle, fix_hour, rtd};
use shared::error::{CoreError, CoreResult};
use shared::geo::GeoCoordinate;
use tracing::{debug, warn};

use crate::models::{
    CalculationMethod, DailyPrayerSchedule, HighLatitudeRule, Madhab, MethodParameters,
    MinuteOrAngle,
};

/// Above this absolute latitude the night-middle rule kicks in automatically
/// when the method carries no rule of its own.
pub const HIGH_LATITUDE_THRESHOLD: f64 = 48.0;

// Atmospheric refraction plus the solar radius, degrees below the geometric
// horizon at sunrise/sunset.
const HORIZON_ANGLE: f64 = 0.833;

// Fallback Isha depression angle for the angle-based night portion when the
// method defines Isha in minutes.
const DEFAULT_ISHA_ANGLE: f64 = 18.0;

pub struct PrayerCalculator {
    coordinates: GeoCoordinate,
    parameters: MethodParameters,
    method: Option<CalculationMethod>,
    madhab: Madhab,
}

impl PrayerCalculator {
    pub fn new(coordinates: GeoCoordinate, method: CalculationMethod, madhab: Madhab) -> Self {
        Self {
            coordinates,
            parameters: method.parameters(),
            method: Some(method),
            madhab,
        }
    }

    /// Calculator over hand-built parameters instead of a named method.
    pub fn with_parameters(
        coordinates: GeoCoordinate,
        parameters: MethodParameters,
        madhab: Madhab,
    ) -> Self {
        Self {
            coordinates,
            parameters,
            method: None,
            madhab,
        }
    }

    /// Overrides the method's high-latitude rule.
    pub fn with_high_latitude_rule(mut self, rule: HighLatitudeRule) -> Self {
        self.parameters.high_latitude = Some(rule);
        self
    }

    /// Computes the six solar-event times for one calendar day.
    ///
    /// Fails with `UnsolvableSchedule` when the sun never crosses the
    /// horizon (polar day/night), when a twilight angle has no solution and
    /// no high-latitude rule is active, or when the computed entries come
    /// out non-finite or out of order. A failure is a first-class outcome;
    /// it is never coerced into default times.
    pub fn schedule_for(&self, date: NaiveDate) -> CoreResult<DailyPrayerSchedule> {
        let raw = self.compute_raw(date)?;

        let sequence = [
            raw.fajr,
            raw.sunrise,
            raw.dhuhr,
            raw.asr,
            raw.maghrib,
            raw.isha,
        ];
        if sequence.iter().any(|t| !t.is_finite())
            || !sequence.windows(2).all(|pair| pair[0] < pair[1])
        {
            warn!(
                latitude = self.coordinates.latitude,
                %date,
                "computed prayer times are out of order, reporting unsolvable"
            );
            return Err(CoreError::unsolvable_schedule(
                self.coordinates.latitude,
                date,
            ));
        }

        Ok(DailyPrayerSchedule {
            date,
            coordinates: self.coordinates,
            method: self.method,
            madhab: self.madhab,
            fajr: to_timestamp(date, raw.fajr),
            sunrise: to_timestamp(date, raw.sunrise),
            dhuhr: to_timestamp(date, raw.dhuhr),
            asr: to_timestamp(date, raw.asr),
            maghrib: to_timestamp(date, raw.maghrib),
            isha: to_timestamp(date, raw.isha),
        })
    }

    // Times in UTC hours relative to the date's midnight, on a continuous
    // axis: entries that cross the UTC date boundary fall outside [0, 24)
    // instead of wrapping, which keeps the chronological order intact.
    fn compute_raw(&self, date: NaiveDate) -> CoreResult<RawTimes> {
        let jd = julian_date(date);
        let (eqt, decl) = sun_position(jd);
        let lng_offset = self.coordinates.longitude / 15.0;

        // Solar transit in apparent local time
        let noon = 12.0 - eqt;

        let sunrise = self.sun_angle_time(HORIZON_ANGLE, noon, decl, -1.0);
        let sunset = self.sun_angle_time(HORIZON_ANGLE, noon, decl, 1.0);
        let (sunrise, sunset) = match (sunrise, sunset) {
            (Some(rise), Some(set)) => (rise, set),
            _ => {
                warn!(
                    latitude = self.coordinates.latitude,
                    %date,
                    "sun never crosses the horizon, no schedule"
                );
                return Err(CoreError::unsolvable_schedule(
                    self.coordinates.latitude,
                    date,
                ));
            }
        };

        let fajr = self.sun_angle_time(self.parameters.fajr, noon, decl, -1.0);

        let asr = self
            .asr_time(self.madhab.shadow_factor(), noon, decl)
            .ok_or_else(|| {
                CoreError::unsolvable_schedule(self.coordinates.latitude, date)
            })?;

        let maghrib = match self.parameters.maghrib {
            MinuteOrAngle::Angle { angle } => self
                .sun_angle_time(angle, noon, decl, 1.0)
                .ok_or_else(|| {
                    CoreError::unsolvable_schedule(self.coordinates.latitude, date)
                })?,
            MinuteOrAngle::Minute { minute } => sunset + minute / 60.0,
        };

        let isha = match self.parameters.isha {
            MinuteOrAngle::Angle { angle } => self.sun_angle_time(angle, noon, decl, 1.0),
            MinuteOrAngle::Minute { minute } => Some(maghrib + minute / 60.0),
        };

        let (fajr, isha) = self.resolve_twilight(fajr, isha, sunrise, sunset, date)?;

        Ok(RawTimes {
            fajr: fajr - lng_offset,
            sunrise: sunrise - lng_offset,
            dhuhr: noon - lng_offset,
            asr: asr - lng_offset,
            maghrib: maghrib - lng_offset,
            isha: isha - lng_offset,
        })
    }

    /// Applies the active high-latitude rule to Fajr and Isha: fills in
    /// entries whose depression angle had no solution and caps entries that
    /// drift deeper into the night than the rule's portion allows. With no
    /// active rule, a missing solution fails the whole schedule.
    fn resolve_twilight(
        &self,
        fajr: Option<f64>,
        isha: Option<f64>,
        sunrise: f64,
        sunset: f64,
        date: NaiveDate,
    ) -> CoreResult<(f64, f64)> {
        let rule = self.parameters.high_latitude.or({
            if self.coordinates.latitude.abs() > HIGH_LATITUDE_THRESHOLD {
                Some(HighLatitudeRule::NightMiddle)
            } else {
                None
            }
        });

        let rule = match rule {
            Some(rule) => rule,
            None => {
                return match (fajr, isha) {
                    (Some(fajr), Some(isha)) => Ok((fajr, isha)),
                    _ => {
                        warn!(
                            latitude = self.coordinates.latitude,
                            %date,
                            "twilight angle unreachable and no high-latitude rule active"
                        );
                        Err(CoreError::unsolvable_schedule(
                            self.coordinates.latitude,
                            date,
                        ))
                    }
                };
            }
        };

        let night = 24.0 - (sunset - sunrise);
        let (fajr_portion, isha_portion) = match rule {
            HighLatitudeRule::NightMiddle => (night / 2.0, night / 2.0),
            HighLatitudeRule::OneSeventh => (night / 7.0, night / 7.0),
            HighLatitudeRule::AngleBased => {
                let isha_angle = match self.parameters.isha {
                    MinuteOrAngle::Angle { angle } => angle,
                    MinuteOrAngle::Minute { .. } => DEFAULT_ISHA_ANGLE,
                };
                (
                    self.parameters.fajr / 60.0 * night,
                    isha_angle / 60.0 * night,
                )
            }
        };

        let fajr = match fajr {
            Some(fajr) if sunrise - fajr <= fajr_portion => fajr,
            _ => {
                debug!(?rule, "substituting Fajr via high-latitude night portion");
                sunrise - fajr_portion
            }
        };
        let isha = match isha {
            Some(isha) if isha - sunset <= isha_portion => isha,
            _ => {
                debug!(?rule, "substituting Isha via high-latitude night portion");
                sunset + isha_portion
            }
        };

        Ok((fajr, isha))
    }

    /// Hour of the day (apparent local time) at which the sun reaches
    /// `angle` degrees below the horizon, before (`direction` = -1) or after
    /// (+1) solar noon. `None` when the sun never reaches that angle on
    /// this date at this latitude.
    fn sun_angle_time(&self, angle: f64, noon: f64, decl: f64, direction: f64) -> Option<f64> {
        let lat = dtr(self.coordinates.latitude);

        let p1 = -sin(dtr(angle)) - sin(dtr(decl)) * sin(lat);
        let p2 = cos(dtr(decl)) * cos(lat);
        let ratio = p1 / p2;

        if !ratio.is_finite() || !(-1.0..=1.0).contains(&ratio) {
            return None;
        }

        let t = rtd(acos(ratio)) / 15.0;
        Some(noon + direction * t)
    }

    /// Asr: the moment the shadow of an object equals `factor` times its
    /// length plus its noon shadow, expressed as a (negative) depression
    /// angle and fed through the hour-angle equation.
    fn asr_time(&self, factor: f64, noon: f64, decl: f64) -> Option<f64> {
        let lat = dtr(self.coordinates.latitude);
        let decl_rad = dtr(decl);

        let angle = -rtd(atan(1.0 / (factor + tan((lat - decl_rad).abs()))));
        self.sun_angle_time(angle, noon, decl, 1.0)
    }
}

#[derive(Debug)]
struct RawTimes {
    fajr: f64,
    sunrise: f64,
    dhuhr: f64,
    asr: f64,
    maghrib: f64,
    isha: f64,
}

fn to_timestamp(date: NaiveDate, hours: f64) -> DateTime<Utc> {
    let midnight = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
    midnight + Duration::milliseconds((hours * 3_600_000.0).round() as i64)
}

/// Julian day number at 0h UT for a Gregorian calendar date.
fn julian_date(date: NaiveDate) -> f64 {
    let mut year = date.year();
    let mut month = date.month();
    let day = date.day();

    if month <= 2 {
        year -= 1;
        month += 12;
    }

    let a = floor(year as f64 / 100.0);
    let b = 2.0 - a + floor(a / 4.0);

    floor(365.25 * (year as f64 + 4716.0)) + floor(30.6001 * (month as f64 + 1.0))
        + day as f64
        + b
        - 1524.5
}

/// Low-precision solar ephemeris: equation of time (hours) and declination
/// (degrees) for a Julian day.
fn sun_position(jd: f64) -> (f64, f64) {
    let d = jd - 2451545.0;
    let g = fix_angle(357.529 + 0.98560028 * d);
    let q = fix_angle(280.459 + 0.98564736 * d);
    let l = fix_angle(q + 1.915 * sin(dtr(g)) + 0.020 * sin(dtr(2.0 * g)));

    let e = 23.439 - 0.00000036 * d;
    let ra = rtd(atan2(cos(dtr(e)) * sin(dtr(l)), cos(dtr(l)))) / 15.0;
    // Near the equinoxes the apparent longitude wraps past 360° a day or
    // two before the mean longitude, so the raw difference can come out
    // near ±24 h; normalize into (-12, 12].
    let eqt = fix_hour(q / 15.0 - fix_hour(ra) + 12.0) - 12.0;
    let decl = rtd(asin(sin(dtr(e)) * sin(dtr(l))));

    (eqt, decl)
}
