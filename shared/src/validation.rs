use chrono::FixedOffset;
use chrono::{Offset, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{CoreError, CoreResult};

pub fn validate_latitude(lat: f64) -> CoreResult<()> {
    if !lat.is_finite() || lat < -90.0 || lat > 90.0 {
        return Err(CoreError::Validation(
            "Latitude must be between -90 and 90 degrees".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_longitude(lng: f64) -> CoreResult<()> {
    if !lng.is_finite() || lng < -180.0 || lng > 180.0 {
        return Err(CoreError::Validation(
            "Longitude must be between -180 and 180 degrees".to_string(),
        ));
    }
    Ok(())
}

/// Parses either an IANA timezone name ("Europe/London") or a fixed offset
/// ("+05:00", "-08:30") into a `FixedOffset`. Named zones resolve to their
/// current UTC offset.
pub fn parse_timezone(timezone: &str) -> CoreResult<FixedOffset> {
    let timezone = timezone.trim();

    if timezone.starts_with('+') || timezone.starts_with('-') {
        parse_timezone_offset(timezone)
    } else {
        parse_timezone_name(timezone)
    }
}

fn parse_timezone_name(timezone: &str) -> CoreResult<FixedOffset> {
    let tz: Tz = timezone.parse().map_err(|_| {
        CoreError::TimezoneParsing(format!("Invalid timezone name: {}", timezone))
    })?;

    let offset = tz.offset_from_utc_datetime(&Utc::now().naive_utc());
    Ok(offset.fix())
}

fn parse_timezone_offset(timezone: &str) -> CoreResult<FixedOffset> {
    let mut parts = timezone[1..].split(':');

    let hours: i32 = parts
        .next()
        .ok_or_else(|| {
            CoreError::TimezoneParsing("Missing hours in timezone offset".to_string())
        })?
        .parse()
        .map_err(|_| {
            CoreError::TimezoneParsing("Invalid hours in timezone offset".to_string())
        })?;

    let minutes: i32 = parts.next().unwrap_or("0").parse().map_err(|_| {
        CoreError::TimezoneParsing("Invalid minutes in timezone offset".to_string())
    })?;

    if hours < -12 || hours > 14 {
        return Err(CoreError::TimezoneParsing(
            "Timezone offset hours must be between -12 and +14".to_string(),
        ));
    }

    if minutes < 0 || minutes > 59 {
        return Err(CoreError::TimezoneParsing(
            "Timezone offset minutes must be between 0 and 59".to_string(),
        ));
    }

    let total_seconds =
        (hours * 3600 + minutes * 60) * if timezone.starts_with('-') { -1 } else { 1 };

    FixedOffset::east_opt(total_seconds)
        .ok_or_else(|| CoreError::TimezoneParsing("Invalid timezone offset".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_latitude() {
        assert!(validate_latitude(0.0).is_ok());
        assert!(validate_latitude(90.0).is_ok());
        assert!(validate_latitude(-90.0).is_ok());
        assert!(validate_latitude(45.5).is_ok());

        assert!(validate_latitude(91.0).is_err());
        assert!(validate_latitude(-91.0).is_err());
        assert!(validate_latitude(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_longitude() {
        assert!(validate_longitude(0.0).is_ok());
        assert!(validate_longitude(180.0).is_ok());
        assert!(validate_longitude(-180.0).is_ok());
        assert!(validate_longitude(123.456).is_ok());

        assert!(validate_longitude(181.0).is_err());
        assert!(validate_longitude(-181.0).is_err());
    }

    #[test]
    fn test_parse_timezone_offset() {
        assert!(parse_timezone("+05:00").is_ok());
        assert!(parse_timezone("-08:30").is_ok());
        assert!(parse_timezone("+00:00").is_ok());

        assert!(parse_timezone("+25:00").is_err());
        assert!(parse_timezone("-15:00").is_err());
        assert!(parse_timezone("+05:60").is_err());
    }

    #[test]
    fn test_parse_timezone_name() {
        assert!(parse_timezone("UTC").is_ok());
        assert!(parse_timezone("America/New_York").is_ok());
        assert!(parse_timezone("Europe/London").is_ok());
        assert!(parse_timezone("Asia/Karachi").is_ok());

        assert!(parse_timezone("Invalid/Timezone").is_err());
    }
}
