//! Request/response bodies for the settings endpoints.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::settings::{ProfileEdit, SettingsError, Sex, UserProfile};

// ════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════

/// PUT body. Every field is optional; omitted fields take their default.
///
/// Numeric fields accept either JSON numbers or the text exactly as typed
/// into the form, so `"snacks_count": "abc"` reaches the coercion rules
/// instead of failing deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SaveProfileRequest {
    #[serde(deserialize_with = "text")]
    pub weight_lb: Option<String>,
    #[serde(deserialize_with = "text")]
    pub height_cm: Option<String>,
    #[serde(deserialize_with = "text")]
    pub age: Option<String>,
    #[serde(deserialize_with = "text")]
    pub decimal_places: Option<String>,

    pub sex: Option<String>,
    pub goal: Option<String>,
    pub activity: Option<String>,
    pub unit_pref: Option<String>,

    pub wake_time: Option<String>,
    pub sleep_time: Option<String>,
    #[serde(deserialize_with = "text")]
    pub snacks_count: Option<String>,
    #[serde(deserialize_with = "text")]
    pub water_interval_hours: Option<String>,
    pub quiet_period_enabled: Option<bool>,
    pub auto_completion_enabled: Option<bool>,

    pub strict_mode: Option<bool>,
    pub water_must_meet: Option<bool>,
    #[serde(deserialize_with = "text")]
    pub kcal_window: Option<String>,

    #[serde(deserialize_with = "text")]
    pub pre_sleep_cutoff_hours: Option<String>,
    #[serde(deserialize_with = "text")]
    pub night_mode_buffer_min: Option<String>,
    #[serde(deserialize_with = "text")]
    pub last_reminder_buffer_min: Option<String>,
    pub allow_light_protein_after_cutoff: Option<bool>,
    pub auto_reschedule_meals: Option<bool>,
    #[serde(deserialize_with = "text")]
    pub min_gap_between_meals_min: Option<String>,

    /// `null` or `""` clears the override.
    #[serde(deserialize_with = "text")]
    pub water_goal_override_oz: Option<String>,
    #[serde(deserialize_with = "text")]
    pub water_reminders_per_day: Option<String>,
    #[serde(deserialize_with = "text")]
    pub today_exercise_minutes: Option<String>,
}

/// A JSON scalar as form text: strings as-is, numbers and bools printed,
/// `null` as absent.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|v| match v {
        Scalar::Text(s) => s,
        Scalar::Number(n) => number_text(&n),
        Scalar::Flag(b) => b.to_string(),
    }))
}

/// Integral floats print without the fraction, so `2.0` reaches the integer
/// fields as `"2"`.
fn number_text(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(v) if n.is_f64() && v.fract() == 0.0 && v.abs() < 9.0e15 => format!("{}", v as i64),
        _ => n.to_string(),
    }
}

impl SaveProfileRequest {
    /// Builds the form submission, filling omitted fields from defaults.
    pub fn into_edit(self) -> ProfileEdit {
        let d = ProfileEdit::default();
        ProfileEdit {
            weight_lb: self.weight_lb.unwrap_or(d.weight_lb),
            height_cm: self.height_cm.unwrap_or(d.height_cm),
            age: self.age.unwrap_or(d.age),
            decimal_places: self.decimal_places.unwrap_or(d.decimal_places),
            // An unrecognised sex is a secondary field: fall back, don't reject
            sex: self
                .sex
                .and_then(|s| s.parse::<Sex>().ok())
                .unwrap_or(d.sex),
            goal: self.goal.unwrap_or(d.goal),
            activity: self.activity.unwrap_or(d.activity),
            unit_pref: self.unit_pref.unwrap_or(d.unit_pref),
            wake_time: self.wake_time.unwrap_or(d.wake_time),
            sleep_time: self.sleep_time.unwrap_or(d.sleep_time),
            snacks_count: self.snacks_count.unwrap_or(d.snacks_count),
            water_interval_hours: self.water_interval_hours.unwrap_or(d.water_interval_hours),
            quiet_period_enabled: self.quiet_period_enabled.unwrap_or(d.quiet_period_enabled),
            auto_completion_enabled: self
                .auto_completion_enabled
                .unwrap_or(d.auto_completion_enabled),
            strict_mode: self.strict_mode.unwrap_or(d.strict_mode),
            water_must_meet: self.water_must_meet.unwrap_or(d.water_must_meet),
            kcal_window: self.kcal_window.unwrap_or(d.kcal_window),
            pre_sleep_cutoff_hours: self
                .pre_sleep_cutoff_hours
                .unwrap_or(d.pre_sleep_cutoff_hours),
            night_mode_buffer_min: self.night_mode_buffer_min.unwrap_or(d.night_mode_buffer_min),
            last_reminder_buffer_min: self
                .last_reminder_buffer_min
                .unwrap_or(d.last_reminder_buffer_min),
            allow_light_protein_after_cutoff: self
                .allow_light_protein_after_cutoff
                .unwrap_or(d.allow_light_protein_after_cutoff),
            auto_reschedule_meals: self.auto_reschedule_meals.unwrap_or(d.auto_reschedule_meals),
            min_gap_between_meals_min: self
                .min_gap_between_meals_min
                .unwrap_or(d.min_gap_between_meals_min),
            water_goal_override_oz: self.water_goal_override_oz.unwrap_or_default(),
            water_reminders_per_day: self
                .water_reminders_per_day
                .unwrap_or(d.water_reminders_per_day),
            today_exercise_minutes: self
                .today_exercise_minutes
                .unwrap_or(d.today_exercise_minutes),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Responses
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub profile: UserProfile,
}

#[derive(Debug, Clone, Serialize)]
pub struct SaveProfileResponse {
    pub profile: UserProfile,
    /// Secondary fields whose input was replaced by the default
    pub defaulted_fields: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorResponse {
    pub fn unauthenticated() -> Self {
        Self {
            code: "UNAUTHENTICATED".to_string(),
            message: "Not authenticated".to_string(),
            field: None,
        }
    }

    pub fn validation(error: &SettingsError) -> Self {
        Self {
            code: "VALIDATION_FAILED".to_string(),
            message: error.to_string(),
            field: error.field().map(str::to_string),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self {
            code: "STORAGE_ERROR".to_string(),
            message: message.into(),
            field: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ValidationError;
    use serde_json::json;

    fn request(body: serde_json::Value) -> SaveProfileRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn numbers_and_strings_both_become_text() {
        let req = request(json!({"weight_lb": 172.5, "age": "41", "snacks_count": 2}));

        assert_eq!(req.weight_lb.as_deref(), Some("172.5"));
        assert_eq!(req.age.as_deref(), Some("41"));
        assert_eq!(req.snacks_count.as_deref(), Some("2"));
    }

    #[test]
    fn integral_floats_lose_their_fraction() {
        let req = request(json!({"snacks_count": 2.0, "age": 41.0, "kcal_window": 0.15}));

        assert_eq!(req.snacks_count.as_deref(), Some("2"));
        assert_eq!(req.age.as_deref(), Some("41"));
        assert_eq!(req.kcal_window.as_deref(), Some("0.15"));
    }

    #[test]
    fn junk_text_survives_deserialization() {
        let edit = request(json!({"snacks_count": "abc"})).into_edit();
        assert_eq!(edit.snacks_count, "abc");
    }

    #[test]
    fn empty_body_is_the_default_form() {
        assert_eq!(request(json!({})).into_edit(), ProfileEdit::default());
    }

    #[test]
    fn null_override_clears_it() {
        let edit = request(json!({"water_goal_override_oz": null})).into_edit();
        assert_eq!(edit.water_goal_override_oz, "");

        let edit = request(json!({"water_goal_override_oz": 96})).into_edit();
        assert_eq!(edit.water_goal_override_oz, "96");
    }

    #[test]
    fn unknown_sex_falls_back_to_default() {
        let edit = request(json!({"sex": "other"})).into_edit();
        assert_eq!(edit.sex, Sex::Male);

        let edit = request(json!({"sex": "Female"})).into_edit();
        assert_eq!(edit.sex, Sex::Female);
    }

    #[test]
    fn validation_error_response_names_the_field() {
        let err = SettingsError::from(ValidationError::out_of_range("height", 120.0, 220.0, 250.0));

        let body = ErrorResponse::validation(&err);

        assert_eq!(body.code, "VALIDATION_FAILED");
        assert_eq!(body.field.as_deref(), Some("height"));
        assert!(body.message.contains("height"));
    }

    #[test]
    fn field_is_omitted_when_absent() {
        let json = serde_json::to_value(ErrorResponse::storage("could not save")).unwrap();
        assert!(json.get("field").is_none());
    }
}
