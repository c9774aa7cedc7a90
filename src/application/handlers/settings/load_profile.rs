//! LoadProfile - Query handler returning the caller's fully defaulted profile.

use std::sync::Arc;

use crate::domain::foundation::CommandMetadata;
use crate::domain::settings::{ProfileDefaults, SettingsError, UserProfile};
use crate::ports::{ProfileRepository, SessionValidator};

use super::authenticate;

/// Query for the profile of whoever holds the access token.
#[derive(Debug, Clone, Default)]
pub struct LoadProfileQuery {
    pub access_token: Option<String>,
}

/// Handler for loading a profile.
///
/// A user without a stored row gets the all-default profile; a partial row
/// is completed field by field from [`ProfileDefaults`].
pub struct LoadProfileHandler {
    sessions: Arc<dyn SessionValidator>,
    repository: Arc<dyn ProfileRepository>,
}

impl LoadProfileHandler {
    pub fn new(sessions: Arc<dyn SessionValidator>, repository: Arc<dyn ProfileRepository>) -> Self {
        Self {
            sessions,
            repository,
        }
    }

    pub async fn handle(
        &self,
        query: LoadProfileQuery,
        metadata: CommandMetadata,
    ) -> Result<UserProfile, SettingsError> {
        let user_id = authenticate(self.sessions.as_ref(), query.access_token.as_deref()).await?;
        let correlation_id = metadata.correlation_id();

        let stored = self.repository.find_by_user(&user_id).await.map_err(|err| {
            tracing::error!(
                user_id = %user_id,
                correlation_id = %correlation_id,
                error = %err,
                "Could not load profile"
            );
            SettingsError::Storage(err)
        })?;

        let profile = match stored {
            Some(row) => ProfileDefaults::apply(user_id, row),
            None => {
                tracing::debug!(user_id = %user_id, "No stored profile, using defaults");
                ProfileDefaults::for_user(user_id)
            }
        };

        tracing::debug!(
            user_id = %profile.user_id,
            correlation_id = %correlation_id,
            "Profile loaded"
        );
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::MockSessionValidator;
    use crate::adapters::profile::InMemoryProfileRepository;
    use crate::domain::foundation::{AuthError, ErrorCode, UserId};
    use crate::domain::settings::{Sex, StoredProfile, TimeOfDay};
    use proptest::prelude::*;

    const TOKEN: &str = "valid-token";

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    fn handler(repository: Arc<InMemoryProfileRepository>) -> LoadProfileHandler {
        let sessions = Arc::new(MockSessionValidator::new().with_test_user(TOKEN, "user-1"));
        LoadProfileHandler::new(sessions, repository)
    }

    fn query() -> LoadProfileQuery {
        LoadProfileQuery {
            access_token: Some(TOKEN.to_string()),
        }
    }

    #[tokio::test]
    async fn missing_row_yields_all_defaults() {
        let repository = Arc::new(InMemoryProfileRepository::new());

        let profile = handler(repository)
            .handle(query(), CommandMetadata::new())
            .await
            .unwrap();

        assert_eq!(profile, ProfileDefaults::for_user(user()));
    }

    #[tokio::test]
    async fn partial_row_is_completed_with_defaults() {
        let row = StoredProfile {
            weight_lb: Some(182.0),
            sex: Some("female".to_string()),
            wake_time: Some("06:15".to_string()),
            snacks_count: Some(2),
            ..Default::default()
        };
        let repository = Arc::new(InMemoryProfileRepository::new().with_row(user(), row));

        let profile = handler(repository)
            .handle(query(), CommandMetadata::new())
            .await
            .unwrap();

        assert_eq!(profile.weight_lb, 182.0);
        assert_eq!(profile.sex, Sex::Female);
        assert_eq!(profile.wake_time, TimeOfDay::from_hm(6, 15).unwrap());
        assert_eq!(profile.snacks_count, 2);
        assert_eq!(profile.height_cm, ProfileDefaults::HEIGHT_CM);
        assert_eq!(profile.min_gap_between_meals_min, ProfileDefaults::MIN_GAP_BETWEEN_MEALS_MIN);
        assert_eq!(profile.water_reminders_per_day, ProfileDefaults::WATER_REMINDERS_PER_DAY);
    }

    #[tokio::test]
    async fn storage_failure_is_propagated() {
        let repository = Arc::new(InMemoryProfileRepository::new());
        repository.fail_reads(true);

        let err = handler(repository)
            .handle(query(), CommandMetadata::new())
            .await
            .unwrap_err();

        assert!(matches!(err, SettingsError::Storage(_)));
        assert_eq!(err.code(), ErrorCode::DatabaseError);
    }

    #[tokio::test]
    async fn unauthenticated_caller_never_reaches_storage() {
        let repository = Arc::new(InMemoryProfileRepository::new());
        let h = handler(repository.clone());

        let err = h
            .handle(
                LoadProfileQuery {
                    access_token: Some("stolen".to_string()),
                },
                CommandMetadata::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, SettingsError::Unauthenticated(AuthError::InvalidToken)));
        assert_eq!(repository.fetch_count(), 0);
    }

    fn stored_row() -> impl Strategy<Value = StoredProfile> {
        (
            proptest::option::of(1.0f64..400.0),
            proptest::option::of(120.0f64..=220.0),
            proptest::option::of(15i32..=100),
            proptest::option::of(0i32..10),
            proptest::option::of(0i32..1000),
            proptest::option::of(prop_oneof![Just("male"), Just("female")]),
            proptest::option::of(any::<bool>()),
            proptest::option::of(0.01f64..=1.0),
        )
            .prop_map(|(w, h, age, snacks, gap, sex, strict, kcal)| StoredProfile {
                weight_lb: w,
                height_cm: h,
                age,
                snacks_count: snacks,
                min_gap_between_meals_min: gap,
                sex: sex.map(str::to_string),
                strict_mode: strict,
                kcal_window: kcal,
                ..Default::default()
            })
    }

    proptest! {
        #[test]
        fn every_field_is_stored_value_or_default(row in stored_row()) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let repository = Arc::new(InMemoryProfileRepository::new().with_row(user(), row.clone()));

            let profile = rt
                .block_on(handler(repository).handle(query(), CommandMetadata::new()))
                .unwrap();

            prop_assert_eq!(profile.weight_lb, row.weight_lb.unwrap_or(ProfileDefaults::WEIGHT_LB));
            prop_assert_eq!(profile.height_cm, row.height_cm.unwrap_or(ProfileDefaults::HEIGHT_CM));
            prop_assert_eq!(profile.age, row.age.unwrap_or(ProfileDefaults::AGE));
            prop_assert_eq!(
                profile.snacks_count,
                row.snacks_count.map_or(ProfileDefaults::SNACKS_COUNT, |n| n as u32)
            );
            prop_assert_eq!(
                profile.min_gap_between_meals_min,
                row.min_gap_between_meals_min
                    .map_or(ProfileDefaults::MIN_GAP_BETWEEN_MEALS_MIN, |n| n as u32)
            );
            prop_assert_eq!(profile.strict_mode, row.strict_mode.unwrap_or(ProfileDefaults::STRICT_MODE));
            prop_assert_eq!(profile.kcal_window, row.kcal_window.unwrap_or(ProfileDefaults::KCAL_WINDOW));
            prop_assert_eq!(profile.water_interval_hours, ProfileDefaults::WATER_INTERVAL_HOURS);
            prop_assert_eq!(profile.wake_time, ProfileDefaults::wake_time());
        }
    }
}
