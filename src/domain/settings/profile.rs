//! The user profile record and its small value types.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{UserId, ValidationError};

/// Biological sex used by the energy-expenditure formulas downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    #[default]
    Male,
    Female,
}

impl Sex {
    /// Storage token for this value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sex {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Sex::Male),
            "female" => Ok(Sex::Female),
            other => Err(ValidationError::invalid_format(
                "sex",
                format!("expected 'male' or 'female', got '{}'", other),
            )),
        }
    }
}

/// Local wall-clock time of day, minute precision, rendered as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    /// Builds a time from hour and minute; `None` when out of range.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// Returns the inner time.
    pub fn as_naive_time(&self) -> NaiveTime {
        self.0
    }
}

impl From<NaiveTime> for TimeOfDay {
    fn from(t: NaiveTime) -> Self {
        Self(NaiveTime::from_hms_opt(t.hour(), t.minute(), 0).unwrap_or(t))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl FromStr for TimeOfDay {
    type Err = ValidationError;

    /// Accepts `HH:MM` and `HH:MM:SS` (Postgres `time` columns render seconds).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        NaiveTime::parse_from_str(s, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
            .map(Self::from)
            .map_err(|_| ValidationError::invalid_format("time", format!("expected HH:MM, got '{}'", s)))
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A user's complete nutrition and scheduling configuration.
///
/// Every field is populated. Instances only come out of
/// [`ProfileDefaults`](super::ProfileDefaults) or the validated save path,
/// so consumers never deal with missing values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,

    // Anthropometrics
    pub weight_lb: f64,
    pub height_cm: f64,
    pub age: i32,
    pub sex: Sex,

    // Goal and activity
    pub goal: String,
    pub activity: String,

    // Display preferences
    pub unit_pref: String,
    pub decimal_places: i32,

    // Daily rhythm
    pub wake_time: TimeOfDay,
    pub sleep_time: TimeOfDay,
    pub snacks_count: u32,
    pub water_interval_hours: f64,
    pub quiet_period_enabled: bool,
    pub auto_completion_enabled: bool,

    // Streak control
    pub strict_mode: bool,
    pub water_must_meet: bool,
    pub kcal_window: f64,

    // Sleep-aware meal scheduling
    pub pre_sleep_cutoff_hours: f64,
    pub night_mode_buffer_min: u32,
    pub last_reminder_buffer_min: u32,
    pub allow_light_protein_after_cutoff: bool,
    pub auto_reschedule_meals: bool,
    pub min_gap_between_meals_min: u32,

    // Water intake
    pub water_goal_override_oz: Option<f64>,
    pub water_reminders_per_day: u32,
    pub today_exercise_minutes: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sex_parses_case_insensitively() {
        assert_eq!("Female".parse::<Sex>().unwrap(), Sex::Female);
        assert_eq!(" male ".parse::<Sex>().unwrap(), Sex::Male);
        assert!("other".parse::<Sex>().is_err());
    }

    #[test]
    fn sex_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Sex::Female).unwrap(), r#""female""#);
    }

    #[test]
    fn time_of_day_parses_hours_and_minutes() {
        let t: TimeOfDay = "07:00".parse().unwrap();
        assert_eq!(t, TimeOfDay::from_hm(7, 0).unwrap());
        assert_eq!(t.to_string(), "07:00");
    }

    #[test]
    fn time_of_day_accepts_seconds_and_drops_them() {
        let t: TimeOfDay = "23:15:42".parse().unwrap();
        assert_eq!(t.to_string(), "23:15");
    }

    #[test]
    fn time_of_day_rejects_garbage() {
        assert!("25:00".parse::<TimeOfDay>().is_err());
        assert!("seven".parse::<TimeOfDay>().is_err());
        assert!("".parse::<TimeOfDay>().is_err());
    }

    #[test]
    fn time_of_day_round_trips_through_json() {
        let t = TimeOfDay::from_hm(22, 30).unwrap();
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, r#""22:30""#);
        assert_eq!(serde_json::from_str::<TimeOfDay>(&json).unwrap(), t);
    }
}
