use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Calculation error: {0}")]
    Calculation(String),

    #[error("No valid prayer schedule for latitude {latitude} on {date}")]
    UnsolvableSchedule { latitude: f64, date: NaiveDate },

    #[error("Timezone parsing error: {0}")]
    TimezoneParsing(String),

    #[error("Date parsing error: {0}")]
    DateParsing(#[from] chrono::ParseError),
}

// Convenience constructors for common error patterns
impl CoreError {
    pub fn validation<T: std::fmt::Display>(message: T) -> Self {
        CoreError::Validation(message.to_string())
    }

    pub fn calculation<T: std::fmt::Display>(message: T) -> Self {
        CoreError::Calculation(message.to_string())
    }

    pub fn timezone_parsing<T: std::fmt::Display>(message: T) -> Self {
        CoreError::TimezoneParsing(message.to_string())
    }

    pub fn unsolvable_schedule(latitude: f64, date: NaiveDate) -> Self {
        CoreError::UnsolvableSchedule { latitude, date }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_message() {
        let error = CoreError::validation("latitude out of range");
        assert_eq!(
            error.to_string(),
            "Validation error: latitude out of range"
        );
    }

    #[test]
    fn test_unsolvable_schedule_message() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();
        let error = CoreError::unsolvable_schedule(69.65, date);
        assert!(error.to_string().contains("69.65"));
        assert!(error.to_string().contains("2024-06-21"));
    }

    #[test]
    fn test_from_chrono_parse_error() {
        let parse_err = "not-a-date".parse::<NaiveDate>().unwrap_err();
        let error: CoreError = parse_err.into();
        assert!(matches!(error, CoreError::DateParsing(_)));
    }
}
