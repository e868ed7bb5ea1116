use chrono::NaiveTime;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

pub const MIN_DURATION_MINUTES: u32 = 1;
pub const MAX_DURATION_MINUTES: u32 = 480;

static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("regex compiles"));

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("'{0}' is not a valid HH:MM 24-hour time")]
    InvalidTimeFormat(String),
    #[error("duration must be between 1 and 480 minutes, got {0}")]
    InvalidDuration(i64),
    #[error("lesson cannot run past midnight")]
    CrossesMidnight,
}

/// Strict "HH:MM" parsing; leading zeros are required.
pub fn parse_time(value: &str) -> Result<NaiveTime, ScheduleError> {
    if !TIME_RE.is_match(value) {
        return Err(ScheduleError::InvalidTimeFormat(value.to_string()));
    }
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| ScheduleError::InvalidTimeFormat(value.to_string()))
}

pub fn validate_duration(minutes: i64) -> Result<u32, ScheduleError> {
    if (i64::from(MIN_DURATION_MINUTES)..=i64::from(MAX_DURATION_MINUTES)).contains(&minutes) {
        Ok(minutes as u32)
    } else {
        Err(ScheduleError::InvalidDuration(minutes))
    }
}
