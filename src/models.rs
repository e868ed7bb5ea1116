use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::validation::{self, ScheduleError};

/// Serde adapter for "HH:MM" wall-clock times on the wire.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let value = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&value, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// A candidate booking window on a given date. Built fresh per
/// validation call; `end_time` is always derived from the start and a
/// validated duration, never supplied directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct TimeSlot {
    #[schema(value_type = String, format = "date", example = "2025-01-20")]
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "14:00")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "15:30")]
    pub end_time: NaiveTime,
}

impl TimeSlot {
    /// Validates the "HH:MM" start time and the duration, then derives
    /// the end time. Slots that would run past midnight are rejected.
    pub fn new(
        date: NaiveDate,
        start_time: &str,
        duration_minutes: i64,
    ) -> Result<Self, ScheduleError> {
        let start = validation::parse_time(start_time)?;
        let minutes = validation::validate_duration(duration_minutes)?;
        let (end, wrapped) = start.overflowing_add_signed(Duration::minutes(i64::from(minutes)));
        if wrapped != 0 {
            return Err(ScheduleError::CrossesMidnight);
        }
        Ok(Self {
            date,
            start_time: start,
            end_time: end,
        })
    }
}

/// An already scheduled group lesson, read-only for conflict checking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct GroupLesson {
    pub id: String,
    /// Display label, e.g. "Cours de sensibilisation".
    pub name: Option<String>,
    #[schema(value_type = String, format = "date", example = "2025-01-20")]
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "14:00")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "15:30")]
    pub end_time: NaiveTime,
    pub room_id: Option<String>,
    pub instructor_id: Option<String>,
    pub enrolled_count: u32,
    pub capacity: u32,
}

/// A daily availability window. A slot is covered when some window
/// fully contains it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct AvailabilityWindow {
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "08:00")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "18:00")]
    pub end_time: NaiveTime,
}

impl AvailabilityWindow {
    pub fn covers(&self, slot: &TimeSlot) -> bool {
        self.start_time <= slot.start_time && slot.end_time <= self.end_time
    }
}

/// Reference data for a bookable room. An empty `availability` list
/// means the room has no configured restriction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Room {
    pub id: String,
    pub capacity: u32,
    #[serde(default)]
    pub availability: Vec<AvailabilityWindow>,
}

/// Reference data for an instructor, same availability convention as
/// [`Room`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Instructor {
    pub id: String,
    #[serde(default)]
    pub availability: Vec<AvailabilityWindow>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Conflict {
    pub message: String,
    pub severity: Severity,
}

/// Outcome of one validation call. `has_conflict` is true exactly when
/// `conflicts` holds at least one `error` entry; warnings alone never
/// set it. `suggestions` is populated only for conflicting slots.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ConflictResult {
    pub has_conflict: bool,
    pub conflicts: Vec<Conflict>,
    pub suggestions: Vec<String>,
}
