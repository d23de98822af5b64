use chrono::{DateTime, Duration, Utc};

use crate::models::{DailyPrayerSchedule, Prayer};

/// First entry of the day strictly after `now`, or `None` once all six have
/// passed. At that point the caller should compute the next calendar day's
/// schedule.
pub fn next_prayer(schedule: &DailyPrayerSchedule, now: DateTime<Utc>) -> Option<Prayer> {
    schedule
        .entries()
        .iter()
        .find(|(_, time)| *time > now)
        .map(|(prayer, _)| *prayer)
}

/// The period containing `now`: the most recent entry at or before it, or
/// `None` before Fajr.
///
/// The window between sunrise and Dhuhr reports `Prayer::Sunrise` even
/// though sunrise is not a prayer, so that the six periods tile the day.
/// Callers that only want worship periods can filter on
/// `Prayer::is_prayer`.
pub fn current_prayer(schedule: &DailyPrayerSchedule, now: DateTime<Utc>) -> Option<Prayer> {
    schedule
        .entries()
        .iter()
        .rev()
        .find(|(_, time)| *time <= now)
        .map(|(prayer, _)| *prayer)
}

/// Signed time from `now` until the given entry; negative once it has
/// passed.
pub fn time_until(schedule: &DailyPrayerSchedule, prayer: Prayer, now: DateTime<Utc>) -> Duration {
    schedule.time_of(prayer) - now
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use shared::geo::GeoCoordinate;

    use crate::models::Madhab;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 21, hour, minute, 0).unwrap()
    }

    fn sample_schedule() -> DailyPrayerSchedule {
        DailyPrayerSchedule {
            date: NaiveDate::from_ymd_opt(2024, 6, 21).unwrap(),
            coordinates: GeoCoordinate::new(40.7580, -73.9855),
            method: None,
            madhab: Madhab::Shafi,
            fajr: at(7, 19),
            sunrise: at(9, 25),
            dhuhr: at(16, 58),
            asr: at(20, 58),
            maghrib: Utc.with_ymd_and_hms(2024, 6, 22, 0, 31, 0).unwrap(),
            isha: Utc.with_ymd_and_hms(2024, 6, 22, 2, 28, 0).unwrap(),
        }
    }

    #[test]
    fn test_before_fajr() {
        let schedule = sample_schedule();
        let now = at(5, 0);
        assert_eq!(next_prayer(&schedule, now), Some(Prayer::Fajr));
        assert_eq!(current_prayer(&schedule, now), None);
    }

    #[test]
    fn test_exactly_at_fajr() {
        // "Next" is strictly after now, so at the instant of Fajr the next
        // entry is already Sunrise while the current period becomes Fajr.
        let schedule = sample_schedule();
        let now = schedule.fajr;
        assert_eq!(next_prayer(&schedule, now), Some(Prayer::Sunrise));
        assert_eq!(current_prayer(&schedule, now), Some(Prayer::Fajr));
    }

    #[test]
    fn test_sunrise_window_reports_sunrise_period() {
        let schedule = sample_schedule();
        let now = at(12, 0);
        assert_eq!(current_prayer(&schedule, now), Some(Prayer::Sunrise));
        assert_eq!(next_prayer(&schedule, now), Some(Prayer::Dhuhr));
    }

    #[test]
    fn test_between_dhuhr_and_asr() {
        let schedule = sample_schedule();
        let now = at(18, 30);
        assert_eq!(current_prayer(&schedule, now), Some(Prayer::Dhuhr));
        assert_eq!(next_prayer(&schedule, now), Some(Prayer::Asr));
    }

    #[test]
    fn test_after_isha() {
        let schedule = sample_schedule();
        let now = Utc.with_ymd_and_hms(2024, 6, 22, 3, 0, 0).unwrap();
        assert_eq!(next_prayer(&schedule, now), None);
        assert_eq!(current_prayer(&schedule, now), Some(Prayer::Isha));
    }

    #[test]
    fn test_rollover_keeps_current_from_today() {
        // Once all of today's entries have passed, "next" comes from the
        // following day's schedule while the running period is still
        // today's Isha.
        let today = sample_schedule();
        let mut tomorrow = sample_schedule();
        tomorrow.date = NaiveDate::from_ymd_opt(2024, 6, 22).unwrap();
        let shift = Duration::days(1);
        tomorrow.fajr += shift;
        tomorrow.sunrise += shift;
        tomorrow.dhuhr += shift;
        tomorrow.asr += shift;
        tomorrow.maghrib += shift;
        tomorrow.isha += shift;

        let now = Utc.with_ymd_and_hms(2024, 6, 22, 3, 0, 0).unwrap();
        assert_eq!(next_prayer(&today, now), None);
        assert_eq!(next_prayer(&tomorrow, now), Some(Prayer::Fajr));
        assert_eq!(current_prayer(&today, now), Some(Prayer::Isha));
        // Tomorrow's schedule knows nothing of the running period yet
        assert_eq!(current_prayer(&tomorrow, now), None);
    }

    #[test]
    fn test_time_until_signs() {
        let schedule = sample_schedule();
        let now = at(12, 0);
        assert!(time_until(&schedule, Prayer::Dhuhr, now) > Duration::zero());
        assert!(time_until(&schedule, Prayer::Fajr, now) < Duration::zero());
        assert_eq!(
            time_until(&schedule, Prayer::Dhuhr, now),
            Duration::minutes(4 * 60 + 58)
        );
    }
}
