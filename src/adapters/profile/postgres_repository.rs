//! PostgreSQL adapter for ProfileRepository

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::settings::{StoredProfile, UserProfile};
use crate::ports::ProfileRepository;

/// PostgreSQL implementation of ProfileRepository.
///
/// Columns are nullable so rows written by older clients load cleanly;
/// defaults are applied above this layer.
#[derive(Clone)]
pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_PROFILE: &str = r#"
    SELECT id, weight_lb, height_cm, age, sex, goal, activity, unit_pref,
           decimal_places, wake_time, sleep_time, snacks_count, water_interval_hours,
           quiet_period_enabled, auto_completion_enabled, strict_mode, water_must_meet,
           kcal_window, pre_sleep_cutoff_hours, night_mode_buffer_min,
           last_reminder_buffer_min, allow_light_protein_after_cutoff,
           auto_reschedule_meals, min_gap_between_meals_min, water_goal_override_oz,
           water_reminders_per_day, today_exercise_minutes
    FROM user_profiles
    WHERE id = $1
"#;

const UPSERT_PROFILE: &str = r#"
    INSERT INTO user_profiles (
        id, weight_lb, height_cm, age, sex, goal, activity, unit_pref,
        decimal_places, wake_time, sleep_time, snacks_count, water_interval_hours,
        quiet_period_enabled, auto_completion_enabled, strict_mode, water_must_meet,
        kcal_window, pre_sleep_cutoff_hours, night_mode_buffer_min,
        last_reminder_buffer_min, allow_light_protein_after_cutoff,
        auto_reschedule_meals, min_gap_between_meals_min, water_goal_override_oz,
        water_reminders_per_day, today_exercise_minutes, updated_at
    )
    VALUES (
        $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
        $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, NOW()
    )
    ON CONFLICT (id) DO UPDATE SET
        weight_lb = EXCLUDED.weight_lb,
        height_cm = EXCLUDED.height_cm,
        age = EXCLUDED.age,
        sex = EXCLUDED.sex,
        goal = EXCLUDED.goal,
        activity = EXCLUDED.activity,
        unit_pref = EXCLUDED.unit_pref,
        decimal_places = EXCLUDED.decimal_places,
        wake_time = EXCLUDED.wake_time,
        sleep_time = EXCLUDED.sleep_time,
        snacks_count = EXCLUDED.snacks_count,
        water_interval_hours = EXCLUDED.water_interval_hours,
        quiet_period_enabled = EXCLUDED.quiet_period_enabled,
        auto_completion_enabled = EXCLUDED.auto_completion_enabled,
        strict_mode = EXCLUDED.strict_mode,
        water_must_meet = EXCLUDED.water_must_meet,
        kcal_window = EXCLUDED.kcal_window,
        pre_sleep_cutoff_hours = EXCLUDED.pre_sleep_cutoff_hours,
        night_mode_buffer_min = EXCLUDED.night_mode_buffer_min,
        last_reminder_buffer_min = EXCLUDED.last_reminder_buffer_min,
        allow_light_protein_after_cutoff = EXCLUDED.allow_light_protein_after_cutoff,
        auto_reschedule_meals = EXCLUDED.auto_reschedule_meals,
        min_gap_between_meals_min = EXCLUDED.min_gap_between_meals_min,
        water_goal_override_oz = EXCLUDED.water_goal_override_oz,
        water_reminders_per_day = EXCLUDED.water_reminders_per_day,
        today_exercise_minutes = EXCLUDED.today_exercise_minutes,
        updated_at = NOW()
"#;

fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<Option<T>, DomainError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get::<Option<T>, _>(name)
        .map_err(|e| DomainError::database(format!("Failed to read column {}: {}", name, e)))
}

fn from_db_row(row: &PgRow) -> Result<StoredProfile, DomainError> {
    let id: String = row
        .try_get("id")
        .map_err(|e| DomainError::database(format!("Failed to read column id: {}", e)))?;

    Ok(StoredProfile {
        user_id: UserId::new(id).ok(),
        weight_lb: column(row, "weight_lb")?,
        height_cm: column(row, "height_cm")?,
        age: column(row, "age")?,
        sex: column(row, "sex")?,
        goal: column(row, "goal")?,
        activity: column(row, "activity")?,
        unit_pref: column(row, "unit_pref")?,
        decimal_places: column(row, "decimal_places")?,
        wake_time: column(row, "wake_time")?,
        sleep_time: column(row, "sleep_time")?,
        snacks_count: column(row, "snacks_count")?,
        water_interval_hours: column(row, "water_interval_hours")?,
        quiet_period_enabled: column(row, "quiet_period_enabled")?,
        auto_completion_enabled: column(row, "auto_completion_enabled")?,
        strict_mode: column(row, "strict_mode")?,
        water_must_meet: column(row, "water_must_meet")?,
        kcal_window: column(row, "kcal_window")?,
        pre_sleep_cutoff_hours: column(row, "pre_sleep_cutoff_hours")?,
        night_mode_buffer_min: column(row, "night_mode_buffer_min")?,
        last_reminder_buffer_min: column(row, "last_reminder_buffer_min")?,
        allow_light_protein_after_cutoff: column(row, "allow_light_protein_after_cutoff")?,
        auto_reschedule_meals: column(row, "auto_reschedule_meals")?,
        min_gap_between_meals_min: column(row, "min_gap_between_meals_min")?,
        water_goal_override_oz: column(row, "water_goal_override_oz")?,
        water_reminders_per_day: column(row, "water_reminders_per_day")?,
        today_exercise_minutes: column(row, "today_exercise_minutes")?,
    })
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<StoredProfile>, DomainError> {
        let row = sqlx::query(SELECT_PROFILE)
            .bind(user_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to fetch profile: {}", e)))?;

        row.as_ref().map(from_db_row).transpose()
    }

    async fn upsert(&self, profile: &UserProfile) -> Result<(), DomainError> {
        let row = StoredProfile::from(profile);

        sqlx::query(UPSERT_PROFILE)
            .bind(profile.user_id.as_str())
            .bind(row.weight_lb)
            .bind(row.height_cm)
            .bind(row.age)
            .bind(row.sex)
            .bind(row.goal)
            .bind(row.activity)
            .bind(row.unit_pref)
            .bind(row.decimal_places)
            .bind(row.wake_time)
            .bind(row.sleep_time)
            .bind(row.snacks_count)
            .bind(row.water_interval_hours)
            .bind(row.quiet_period_enabled)
            .bind(row.auto_completion_enabled)
            .bind(row.strict_mode)
            .bind(row.water_must_meet)
            .bind(row.kcal_window)
            .bind(row.pre_sleep_cutoff_hours)
            .bind(row.night_mode_buffer_min)
            .bind(row.last_reminder_buffer_min)
            .bind(row.allow_light_protein_after_cutoff)
            .bind(row.auto_reschedule_meals)
            .bind(row.min_gap_between_meals_min)
            .bind(row.water_goal_override_oz)
            .bind(row.water_reminders_per_day)
            .bind(row.today_exercise_minutes)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to upsert profile: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_binds_one_placeholder_per_column() {
        let placeholders = (1..=27).all(|n| UPSERT_PROFILE.contains(&format!("${}", n)));
        assert!(placeholders);
        assert!(!UPSERT_PROFILE.contains("$28"));
    }

    #[test]
    fn upsert_replaces_on_user_conflict() {
        assert!(UPSERT_PROFILE.contains("ON CONFLICT (id) DO UPDATE"));
        assert!(UPSERT_PROFILE.contains("updated_at = NOW()"));
    }

    #[test]
    fn select_reads_every_upserted_column() {
        let upserted: Vec<&str> = UPSERT_PROFILE
            .split("ON CONFLICT")
            .next()
            .unwrap_or_default()
            .lines()
            .flat_map(|l| l.split(','))
            .map(str::trim)
            .filter(|c| !c.is_empty() && c.chars().all(|ch| ch.is_ascii_lowercase() || ch == '_'))
            .filter(|c| *c != "updated_at")
            .collect();

        assert!(!upserted.is_empty());
        for column in upserted {
            assert!(SELECT_PROFILE.contains(column), "{column} missing from SELECT");
        }
    }
}
