//! Default values and the stored-record merge.
//!
//! A stored row may predate newer columns or carry NULLs. [`ProfileDefaults::apply`]
//! is the single place where such gaps are filled, so everything downstream
//! works with a complete [`UserProfile`].

use crate::domain::foundation::UserId;

use super::profile::{Sex, TimeOfDay, UserProfile};

/// A profile row as the storage backend returns it: every column optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredProfile {
    pub user_id: Option<UserId>,
    pub weight_lb: Option<f64>,
    pub height_cm: Option<f64>,
    pub age: Option<i32>,
    pub sex: Option<String>,
    pub goal: Option<String>,
    pub activity: Option<String>,
    pub unit_pref: Option<String>,
    pub decimal_places: Option<i32>,
    pub wake_time: Option<String>,
    pub sleep_time: Option<String>,
    pub snacks_count: Option<i32>,
    pub water_interval_hours: Option<f64>,
    pub quiet_period_enabled: Option<bool>,
    pub auto_completion_enabled: Option<bool>,
    pub strict_mode: Option<bool>,
    pub water_must_meet: Option<bool>,
    pub kcal_window: Option<f64>,
    pub pre_sleep_cutoff_hours: Option<f64>,
    pub night_mode_buffer_min: Option<i32>,
    pub last_reminder_buffer_min: Option<i32>,
    pub allow_light_protein_after_cutoff: Option<bool>,
    pub auto_reschedule_meals: Option<bool>,
    pub min_gap_between_meals_min: Option<i32>,
    pub water_goal_override_oz: Option<f64>,
    pub water_reminders_per_day: Option<i32>,
    pub today_exercise_minutes: Option<i32>,
}

impl From<&UserProfile> for StoredProfile {
    fn from(p: &UserProfile) -> Self {
        Self {
            user_id: Some(p.user_id.clone()),
            weight_lb: Some(p.weight_lb),
            height_cm: Some(p.height_cm),
            age: Some(p.age),
            sex: Some(p.sex.as_str().to_string()),
            goal: Some(p.goal.clone()),
            activity: Some(p.activity.clone()),
            unit_pref: Some(p.unit_pref.clone()),
            decimal_places: Some(p.decimal_places),
            wake_time: Some(p.wake_time.to_string()),
            sleep_time: Some(p.sleep_time.to_string()),
            snacks_count: stored_count(p.snacks_count),
            water_interval_hours: Some(p.water_interval_hours),
            quiet_period_enabled: Some(p.quiet_period_enabled),
            auto_completion_enabled: Some(p.auto_completion_enabled),
            strict_mode: Some(p.strict_mode),
            water_must_meet: Some(p.water_must_meet),
            kcal_window: Some(p.kcal_window),
            pre_sleep_cutoff_hours: Some(p.pre_sleep_cutoff_hours),
            night_mode_buffer_min: stored_count(p.night_mode_buffer_min),
            last_reminder_buffer_min: stored_count(p.last_reminder_buffer_min),
            allow_light_protein_after_cutoff: Some(p.allow_light_protein_after_cutoff),
            auto_reschedule_meals: Some(p.auto_reschedule_meals),
            min_gap_between_meals_min: stored_count(p.min_gap_between_meals_min),
            water_goal_override_oz: p.water_goal_override_oz,
            water_reminders_per_day: stored_count(p.water_reminders_per_day),
            today_exercise_minutes: stored_count(p.today_exercise_minutes),
        }
    }
}

/// Counts coming out of coercion always fit the column. One that doesn't is
/// stored as NULL and loads as its default rather than as a different number.
fn stored_count(v: u32) -> Option<i32> {
    i32::try_from(v).ok()
}

/// Documented default for every profile field.
pub struct ProfileDefaults;

impl ProfileDefaults {
    pub const WEIGHT_LB: f64 = 160.0;
    pub const HEIGHT_CM: f64 = 170.0;
    pub const AGE: i32 = 30;
    pub const SEX: Sex = Sex::Male;
    pub const GOAL: &'static str = "maintain";
    pub const ACTIVITY: &'static str = "moderate";
    pub const UNIT_PREF: &'static str = "g";
    pub const DECIMAL_PLACES: i32 = 1;
    pub const WAKE_TIME: (u32, u32) = (7, 0);
    pub const SLEEP_TIME: (u32, u32) = (23, 0);
    pub const SNACKS_COUNT: u32 = 0;
    pub const WATER_INTERVAL_HOURS: f64 = 2.5;
    pub const QUIET_PERIOD_ENABLED: bool = false;
    pub const AUTO_COMPLETION_ENABLED: bool = false;
    pub const STRICT_MODE: bool = false;
    pub const WATER_MUST_MEET: bool = false;
    pub const KCAL_WINDOW: f64 = 0.10;
    pub const PRE_SLEEP_CUTOFF_HOURS: f64 = 2.5;
    pub const NIGHT_MODE_BUFFER_MIN: u32 = 90;
    pub const LAST_REMINDER_BUFFER_MIN: u32 = 60;
    pub const ALLOW_LIGHT_PROTEIN_AFTER_CUTOFF: bool = true;
    pub const AUTO_RESCHEDULE_MEALS: bool = true;
    pub const MIN_GAP_BETWEEN_MEALS_MIN: u32 = 120;
    pub const WATER_REMINDERS_PER_DAY: u32 = 8;
    pub const TODAY_EXERCISE_MINUTES: u32 = 0;

    pub fn wake_time() -> TimeOfDay {
        let (h, m) = Self::WAKE_TIME;
        TimeOfDay::from_hm(h, m).unwrap_or_else(midnight)
    }

    pub fn sleep_time() -> TimeOfDay {
        let (h, m) = Self::SLEEP_TIME;
        TimeOfDay::from_hm(h, m).unwrap_or_else(midnight)
    }

    /// The all-default profile, used when no row exists yet.
    pub fn for_user(user_id: UserId) -> UserProfile {
        Self::apply(user_id, StoredProfile::default())
    }

    /// Fills every absent or uninterpretable stored value with its default.
    ///
    /// Total: never fails. The `user_id` argument is authoritative; the one
    /// carried by `stored` (if any) is ignored.
    pub fn apply(user_id: UserId, stored: StoredProfile) -> UserProfile {
        UserProfile {
            user_id,
            weight_lb: stored.weight_lb.unwrap_or(Self::WEIGHT_LB),
            height_cm: stored.height_cm.unwrap_or(Self::HEIGHT_CM),
            age: stored.age.unwrap_or(Self::AGE),
            sex: stored
                .sex
                .and_then(|s| s.parse().ok())
                .unwrap_or(Self::SEX),
            goal: non_blank(stored.goal).unwrap_or_else(|| Self::GOAL.to_string()),
            activity: non_blank(stored.activity).unwrap_or_else(|| Self::ACTIVITY.to_string()),
            unit_pref: non_blank(stored.unit_pref).unwrap_or_else(|| Self::UNIT_PREF.to_string()),
            decimal_places: stored.decimal_places.unwrap_or(Self::DECIMAL_PLACES),
            wake_time: stored
                .wake_time
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(Self::wake_time),
            sleep_time: stored
                .sleep_time
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(Self::sleep_time),
            snacks_count: unsigned(stored.snacks_count).unwrap_or(Self::SNACKS_COUNT),
            water_interval_hours: stored
                .water_interval_hours
                .unwrap_or(Self::WATER_INTERVAL_HOURS),
            quiet_period_enabled: stored
                .quiet_period_enabled
                .unwrap_or(Self::QUIET_PERIOD_ENABLED),
            auto_completion_enabled: stored
                .auto_completion_enabled
                .unwrap_or(Self::AUTO_COMPLETION_ENABLED),
            strict_mode: stored.strict_mode.unwrap_or(Self::STRICT_MODE),
            water_must_meet: stored.water_must_meet.unwrap_or(Self::WATER_MUST_MEET),
            kcal_window: stored.kcal_window.unwrap_or(Self::KCAL_WINDOW),
            pre_sleep_cutoff_hours: stored
                .pre_sleep_cutoff_hours
                .unwrap_or(Self::PRE_SLEEP_CUTOFF_HOURS),
            night_mode_buffer_min: unsigned(stored.night_mode_buffer_min)
                .unwrap_or(Self::NIGHT_MODE_BUFFER_MIN),
            last_reminder_buffer_min: unsigned(stored.last_reminder_buffer_min)
                .unwrap_or(Self::LAST_REMINDER_BUFFER_MIN),
            allow_light_protein_after_cutoff: stored
                .allow_light_protein_after_cutoff
                .unwrap_or(Self::ALLOW_LIGHT_PROTEIN_AFTER_CUTOFF),
            auto_reschedule_meals: stored
                .auto_reschedule_meals
                .unwrap_or(Self::AUTO_RESCHEDULE_MEALS),
            min_gap_between_meals_min: unsigned(stored.min_gap_between_meals_min)
                .unwrap_or(Self::MIN_GAP_BETWEEN_MEALS_MIN),
            water_goal_override_oz: stored.water_goal_override_oz,
            water_reminders_per_day: unsigned(stored.water_reminders_per_day)
                .unwrap_or(Self::WATER_REMINDERS_PER_DAY),
            today_exercise_minutes: unsigned(stored.today_exercise_minutes)
                .unwrap_or(Self::TODAY_EXERCISE_MINUTES),
        }
    }
}

fn midnight() -> TimeOfDay {
    TimeOfDay::from(chrono::NaiveTime::MIN)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn unsigned(value: Option<i32>) -> Option<u32> {
    value.and_then(|v| u32::try_from(v).ok())
}
