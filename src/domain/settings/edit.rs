//! The user-submitted edit and the lenient coercion of secondary fields.
//!
//! Numeric and time fields arrive as raw text, exactly as typed. The four
//! gated fields are checked by [`ProfileValidator`](super::ProfileValidator);
//! everything else goes through the `coerce_*` helpers here, which fall back
//! to the field's default instead of failing.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::UserId;

use super::defaults::ProfileDefaults;
use super::profile::{Sex, TimeOfDay, UserProfile};
use super::validator::PrimaryFields;

/// A full settings form submission.
///
/// `Default` is the form pre-filled with documented defaults, so a partial
/// submission deserialized with `#[serde(default)]` replaces omitted fields
/// with their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileEdit {
    pub weight_lb: String,
    pub height_cm: String,
    pub age: String,
    pub decimal_places: String,

    pub sex: Sex,
    pub goal: String,
    pub activity: String,
    pub unit_pref: String,

    pub wake_time: String,
    pub sleep_time: String,
    pub snacks_count: String,
    pub water_interval_hours: String,
    pub quiet_period_enabled: bool,
    pub auto_completion_enabled: bool,

    pub strict_mode: bool,
    pub water_must_meet: bool,
    pub kcal_window: String,

    pub pre_sleep_cutoff_hours: String,
    pub night_mode_buffer_min: String,
    pub last_reminder_buffer_min: String,
    pub allow_light_protein_after_cutoff: bool,
    pub auto_reschedule_meals: bool,
    pub min_gap_between_meals_min: String,

    /// Blank means "no override".
    pub water_goal_override_oz: String,
    pub water_reminders_per_day: String,
    pub today_exercise_minutes: String,
}

impl ProfileEdit {
    /// Pre-fills the form from a loaded profile.
    pub fn from_profile(p: &UserProfile) -> Self {
        Self {
            weight_lb: p.weight_lb.to_string(),
            height_cm: p.height_cm.to_string(),
            age: p.age.to_string(),
            decimal_places: p.decimal_places.to_string(),
            sex: p.sex,
            goal: p.goal.clone(),
            activity: p.activity.clone(),
            unit_pref: p.unit_pref.clone(),
            wake_time: p.wake_time.to_string(),
            sleep_time: p.sleep_time.to_string(),
            snacks_count: p.snacks_count.to_string(),
            water_interval_hours: p.water_interval_hours.to_string(),
            quiet_period_enabled: p.quiet_period_enabled,
            auto_completion_enabled: p.auto_completion_enabled,
            strict_mode: p.strict_mode,
            water_must_meet: p.water_must_meet,
            kcal_window: format!("{:.2}", p.kcal_window),
            pre_sleep_cutoff_hours: p.pre_sleep_cutoff_hours.to_string(),
            night_mode_buffer_min: p.night_mode_buffer_min.to_string(),
            last_reminder_buffer_min: p.last_reminder_buffer_min.to_string(),
            allow_light_protein_after_cutoff: p.allow_light_protein_after_cutoff,
            auto_reschedule_meals: p.auto_reschedule_meals,
            min_gap_between_meals_min: p.min_gap_between_meals_min.to_string(),
            water_goal_override_oz: p
                .water_goal_override_oz
                .map(|oz| oz.to_string())
                .unwrap_or_default(),
            water_reminders_per_day: p.water_reminders_per_day.to_string(),
            today_exercise_minutes: p.today_exercise_minutes.to_string(),
        }
    }

    /// Builds the full record from already-validated primary fields.
    ///
    /// Never fails. Fields that could not be interpreted are reported in
    /// [`CoercedProfile::defaulted`] for logging.
    pub fn into_profile(self, user_id: UserId, primary: PrimaryFields) -> CoercedProfile {
        let mut c = Coercer::default();

        let profile = UserProfile {
            user_id,
            weight_lb: primary.weight_lb,
            height_cm: primary.height_cm,
            age: primary.age,
            decimal_places: primary.decimal_places,
            sex: self.sex,
            goal: c.label("goal", &self.goal, ProfileDefaults::GOAL),
            activity: c.label("activity", &self.activity, ProfileDefaults::ACTIVITY),
            unit_pref: c.label("unit_pref", &self.unit_pref, ProfileDefaults::UNIT_PREF),
            wake_time: c.time("wake_time", &self.wake_time, ProfileDefaults::wake_time()),
            sleep_time: c.time("sleep_time", &self.sleep_time, ProfileDefaults::sleep_time()),
            snacks_count: c.count("snacks_count", &self.snacks_count, ProfileDefaults::SNACKS_COUNT),
            water_interval_hours: c.positive(
                "water_interval_hours",
                &self.water_interval_hours,
                ProfileDefaults::WATER_INTERVAL_HOURS,
            ),
            quiet_period_enabled: self.quiet_period_enabled,
            auto_completion_enabled: self.auto_completion_enabled,
            strict_mode: self.strict_mode,
            water_must_meet: self.water_must_meet,
            kcal_window: c.fraction("kcal_window", &self.kcal_window, ProfileDefaults::KCAL_WINDOW),
            pre_sleep_cutoff_hours: c.positive(
                "pre_sleep_cutoff_hours",
                &self.pre_sleep_cutoff_hours,
                ProfileDefaults::PRE_SLEEP_CUTOFF_HOURS,
            ),
            night_mode_buffer_min: c.count(
                "night_mode_buffer_min",
                &self.night_mode_buffer_min,
                ProfileDefaults::NIGHT_MODE_BUFFER_MIN,
            ),
            last_reminder_buffer_min: c.count(
                "last_reminder_buffer_min",
                &self.last_reminder_buffer_min,
                ProfileDefaults::LAST_REMINDER_BUFFER_MIN,
            ),
            allow_light_protein_after_cutoff: self.allow_light_protein_after_cutoff,
            auto_reschedule_meals: self.auto_reschedule_meals,
            min_gap_between_meals_min: c.positive_count(
                "min_gap_between_meals_min",
                &self.min_gap_between_meals_min,
                ProfileDefaults::MIN_GAP_BETWEEN_MEALS_MIN,
            ),
            water_goal_override_oz: c.override_oz(&self.water_goal_override_oz),
            water_reminders_per_day: c.positive_count(
                "water_reminders_per_day",
                &self.water_reminders_per_day,
                ProfileDefaults::WATER_REMINDERS_PER_DAY,
            ),
            today_exercise_minutes: c.count(
                "today_exercise_minutes",
                &self.today_exercise_minutes,
                ProfileDefaults::TODAY_EXERCISE_MINUTES,
            ),
        };

        CoercedProfile {
            profile,
            defaulted: c.defaulted,
        }
    }
}

impl Default for ProfileEdit {
    fn default() -> Self {
        type D = ProfileDefaults;
        Self {
            weight_lb: D::WEIGHT_LB.to_string(),
            height_cm: D::HEIGHT_CM.to_string(),
            age: D::AGE.to_string(),
            decimal_places: D::DECIMAL_PLACES.to_string(),
            sex: D::SEX,
            goal: D::GOAL.to_string(),
            activity: D::ACTIVITY.to_string(),
            unit_pref: D::UNIT_PREF.to_string(),
            wake_time: D::wake_time().to_string(),
            sleep_time: D::sleep_time().to_string(),
            snacks_count: D::SNACKS_COUNT.to_string(),
            water_interval_hours: D::WATER_INTERVAL_HOURS.to_string(),
            quiet_period_enabled: D::QUIET_PERIOD_ENABLED,
            auto_completion_enabled: D::AUTO_COMPLETION_ENABLED,
            strict_mode: D::STRICT_MODE,
            water_must_meet: D::WATER_MUST_MEET,
            kcal_window: format!("{:.2}", D::KCAL_WINDOW),
            pre_sleep_cutoff_hours: D::PRE_SLEEP_CUTOFF_HOURS.to_string(),
            night_mode_buffer_min: D::NIGHT_MODE_BUFFER_MIN.to_string(),
            last_reminder_buffer_min: D::LAST_REMINDER_BUFFER_MIN.to_string(),
            allow_light_protein_after_cutoff: D::ALLOW_LIGHT_PROTEIN_AFTER_CUTOFF,
            auto_reschedule_meals: D::AUTO_RESCHEDULE_MEALS,
            min_gap_between_meals_min: D::MIN_GAP_BETWEEN_MEALS_MIN.to_string(),
            water_goal_override_oz: String::new(),
            water_reminders_per_day: D::WATER_REMINDERS_PER_DAY.to_string(),
            today_exercise_minutes: D::TODAY_EXERCISE_MINUTES.to_string(),
        }
    }
}

/// Result of building a record from an edit.
#[derive(Debug, Clone, PartialEq)]
pub struct CoercedProfile {
    pub profile: UserProfile,
    /// Secondary fields whose submitted text was replaced by the default.
    pub defaulted: Vec<&'static str>,
}

#[derive(Default)]
struct Coercer {
    defaulted: Vec<&'static str>,
}

impl Coercer {
    fn fallback<T>(&mut self, field: &'static str, parsed: Option<T>, default: T) -> T {
        parsed.unwrap_or_else(|| {
            self.defaulted.push(field);
            default
        })
    }

    fn label(&mut self, field: &'static str, raw: &str, default: &str) -> String {
        let value = Some(raw.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        self.fallback(field, value, default.to_string())
    }

    fn time(&mut self, field: &'static str, raw: &str, default: TimeOfDay) -> TimeOfDay {
        self.fallback(field, raw.parse().ok(), default)
    }

    /// Non-negative integer that fits the storage column.
    fn count(&mut self, field: &'static str, raw: &str, default: u32) -> u32 {
        self.fallback(field, storable_count(raw), default)
    }

    /// Strictly positive integer that fits the storage column.
    fn positive_count(&mut self, field: &'static str, raw: &str, default: u32) -> u32 {
        let value = storable_count(raw).filter(|v| *v > 0);
        self.fallback(field, value, default)
    }

    /// Strictly positive finite real.
    fn positive(&mut self, field: &'static str, raw: &str, default: f64) -> f64 {
        let value = parse_finite(raw).filter(|v| *v > 0.0);
        self.fallback(field, value, default)
    }

    /// Real in (0, 1].
    fn fraction(&mut self, field: &'static str, raw: &str, default: f64) -> f64 {
        let value = parse_finite(raw).filter(|v| *v > 0.0 && *v <= 1.0);
        self.fallback(field, value, default)
    }

    fn override_oz(&mut self, raw: &str) -> Option<f64> {
        if raw.trim().is_empty() {
            return None;
        }
        let value = parse_finite(raw).filter(|v| *v > 0.0);
        if value.is_none() {
            self.defaulted.push("water_goal_override_oz");
        }
        value
    }
}

/// Parsing through `i32` keeps every accepted count within the `INTEGER` column.
fn storable_count(raw: &str) -> Option<u32> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .and_then(|v| u32::try_from(v).ok())
}

pub(crate) fn parse_finite(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
