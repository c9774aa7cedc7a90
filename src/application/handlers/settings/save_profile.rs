//! SaveProfile - Command handler that validates, upserts and invalidates.

use std::sync::Arc;

use crate::domain::foundation::{CommandMetadata, EventEnvelope, EventId, Timestamp, UserId};
use crate::domain::settings::{
    ProfileEdit, ProfileSaved, ProfileValidator, SettingsError, UserProfile,
};
use crate::ports::{EventPublisher, ProfileRepository, SessionValidator};

use super::{authenticate, DependentCacheInvalidator};

/// Command to save the caller's settings form.
#[derive(Debug, Clone)]
pub struct SaveProfileCommand {
    pub access_token: Option<String>,
    pub edit: ProfileEdit,
}

/// Result of a successful save.
#[derive(Debug, Clone)]
pub struct SaveProfileResult {
    /// The record exactly as it was written.
    pub profile: UserProfile,
    /// Secondary fields whose input was replaced by the default.
    pub defaulted_fields: Vec<String>,
}

/// Handler for saving a profile.
///
/// Order: identity, validation, coercion, upsert, invalidation. Validation
/// and identity failures happen before any storage call; a failed upsert
/// skips invalidation.
pub struct SaveProfileHandler {
    sessions: Arc<dyn SessionValidator>,
    repository: Arc<dyn ProfileRepository>,
    invalidator: DependentCacheInvalidator,
    event_publisher: Option<Arc<dyn EventPublisher>>,
}

impl SaveProfileHandler {
    pub fn new(
        sessions: Arc<dyn SessionValidator>,
        repository: Arc<dyn ProfileRepository>,
        invalidator: DependentCacheInvalidator,
    ) -> Self {
        Self {
            sessions,
            repository,
            invalidator,
            event_publisher: None,
        }
    }

    /// Also publish a `ProfileSaved` event after each successful save.
    pub fn with_event_publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.event_publisher = Some(publisher);
        self
    }

    pub async fn handle(
        &self,
        cmd: SaveProfileCommand,
        metadata: CommandMetadata,
    ) -> Result<SaveProfileResult, SettingsError> {
        let user_id = authenticate(self.sessions.as_ref(), cmd.access_token.as_deref()).await?;
        let correlation_id = metadata.correlation_id();

        let coerced = ProfileValidator::validate(user_id.clone(), cmd.edit).map_err(|err| {
            tracing::warn!(
                user_id = %user_id,
                field = err.field(),
                error = %err,
                "Profile edit rejected"
            );
            SettingsError::ValidationFailed(err)
        })?;

        if !coerced.defaulted.is_empty() {
            tracing::debug!(
                user_id = %user_id,
                fields = ?coerced.defaulted,
                "Secondary fields fell back to defaults"
            );
        }

        self.repository
            .upsert(&coerced.profile)
            .await
            .map_err(|err| {
                tracing::error!(
                    user_id = %user_id,
                    correlation_id = %correlation_id,
                    error = %err,
                    "Could not save profile"
                );
                SettingsError::Storage(err)
            })?;

        if let Err(err) = self.invalidator.invalidate(&user_id).await {
            tracing::warn!(user_id = %user_id, error = %err, "Profile saved but dependents not invalidated");
        }

        let defaulted_fields: Vec<String> =
            coerced.defaulted.iter().map(|f| f.to_string()).collect();

        self.publish_saved(&user_id, &defaulted_fields, &correlation_id)
            .await;

        tracing::info!(
            user_id = %user_id,
            correlation_id = %correlation_id,
            source = metadata.source().unwrap_or("unknown"),
            "Profile saved"
        );

        Ok(SaveProfileResult {
            profile: coerced.profile,
            defaulted_fields,
        })
    }

    async fn publish_saved(&self, user_id: &UserId, defaulted: &[String], correlation_id: &str) {
        let Some(publisher) = &self.event_publisher else {
            return;
        };

        let event = ProfileSaved {
            event_id: EventId::new(),
            user_id: user_id.clone(),
            defaulted_fields: defaulted.to_vec(),
            saved_at: Timestamp::now(),
        };

        let envelope = match EventEnvelope::from_event(&event) {
            Ok(envelope) => envelope
                .with_correlation_id(correlation_id)
                .with_user_id(user_id.as_str()),
            Err(err) => {
                tracing::warn!(error = %err, "Could not serialize ProfileSaved");
                return;
            }
        };

        if let Err(err) = publisher.publish(envelope).await {
            tracing::warn!(user_id = %user_id, error = %err, "Could not publish ProfileSaved");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::MockSessionValidator;
    use crate::adapters::cache::InMemoryCacheInvalidator;
    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::profile::InMemoryProfileRepository;
    use crate::application::handlers::settings::{LoadProfileHandler, LoadProfileQuery};
    use crate::domain::foundation::AuthError;
    use crate::domain::settings::{CacheKey, ProfileDefaults};
    use proptest::prelude::*;

    const TOKEN: &str = "valid-token";

    struct Fixture {
        sessions: Arc<MockSessionValidator>,
        repository: Arc<InMemoryProfileRepository>,
        cache: Arc<InMemoryCacheInvalidator>,
        bus: Arc<InMemoryEventBus>,
        handler: SaveProfileHandler,
    }

    fn fixture() -> Fixture {
        let sessions = Arc::new(MockSessionValidator::new().with_test_user(TOKEN, "user-1"));
        let repository = Arc::new(InMemoryProfileRepository::new());
        let cache = Arc::new(InMemoryCacheInvalidator::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let handler = SaveProfileHandler::new(
            sessions.clone(),
            repository.clone(),
            DependentCacheInvalidator::new(cache.clone()),
        )
        .with_event_publisher(bus.clone());
        Fixture {
            sessions,
            repository,
            cache,
            bus,
            handler,
        }
    }

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    fn command(edit: ProfileEdit) -> SaveProfileCommand {
        SaveProfileCommand {
            access_token: Some(TOKEN.to_string()),
            edit,
        }
    }

    fn valid_edit() -> ProfileEdit {
        ProfileEdit {
            weight_lb: "175".to_string(),
            height_cm: "180".to_string(),
            age: "34".to_string(),
            decimal_places: "0".to_string(),
            snacks_count: "2".to_string(),
            ..Default::default()
        }
    }

    async fn save(f: &Fixture, edit: ProfileEdit) -> Result<SaveProfileResult, SettingsError> {
        f.handler.handle(command(edit), CommandMetadata::new()).await
    }

    // ════════════════════════════════════════════════════════════════════════
    // Validation gates
    // ════════════════════════════════════════════════════════════════════════

    async fn assert_rejected(edit: ProfileEdit, field: &str) {
        let f = fixture();

        let err = save(&f, edit).await.unwrap_err();

        assert!(matches!(err, SettingsError::ValidationFailed(_)));
        assert_eq!(err.field(), Some(field));
        assert_eq!(f.repository.upsert_count(), 0);
        assert_eq!(f.cache.total_marks(), 0);
        assert_eq!(f.bus.event_count(), 0);
    }

    #[tokio::test]
    async fn zero_weight_is_rejected() {
        assert_rejected(
            ProfileEdit {
                weight_lb: "0".to_string(),
                ..valid_edit()
            },
            "weight",
        )
        .await;
    }

    #[tokio::test]
    async fn tall_height_is_rejected() {
        assert_rejected(
            ProfileEdit {
                height_cm: "250".to_string(),
                ..valid_edit()
            },
            "height",
        )
        .await;
    }

    #[tokio::test]
    async fn young_age_is_rejected() {
        assert_rejected(
            ProfileEdit {
                age: "10".to_string(),
                ..valid_edit()
            },
            "age",
        )
        .await;
    }

    #[tokio::test]
    async fn non_numeric_decimal_places_are_rejected() {
        assert_rejected(
            ProfileEdit {
                decimal_places: "two".to_string(),
                ..valid_edit()
            },
            "decimal_places",
        )
        .await;
    }

    #[tokio::test]
    async fn fractional_age_and_decimal_places_are_truncated() {
        let f = fixture();

        let result = save(
            &f,
            ProfileEdit {
                age: "30.5".to_string(),
                decimal_places: "2.0".to_string(),
                ..valid_edit()
            },
        )
        .await
        .unwrap();

        assert_eq!(result.profile.age, 30);
        assert_eq!(result.profile.decimal_places, 2);
        let row = f.repository.row(&user()).unwrap();
        assert_eq!(row.age, Some(30));
        assert_eq!(row.decimal_places, Some(2));
    }

    // ════════════════════════════════════════════════════════════════════════
    // Successful saves
    // ════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn junk_snack_count_saves_as_zero() {
        let f = fixture();

        let result = save(
            &f,
            ProfileEdit {
                snacks_count: "abc".to_string(),
                ..valid_edit()
            },
        )
        .await
        .unwrap();

        assert_eq!(result.profile.snacks_count, 0);
        assert_eq!(result.defaulted_fields, vec!["snacks_count".to_string()]);
        assert_eq!(f.repository.row(&user()).unwrap().snacks_count, Some(0));
    }

    #[tokio::test]
    async fn success_marks_each_dependent_once() {
        let f = fixture();

        save(&f, valid_edit()).await.unwrap();

        for key in CacheKey::DEPENDENTS_OF_PROFILE {
            assert_eq!(f.cache.mark_count(&user(), key), 1, "{key}");
        }
        assert_eq!(f.cache.total_marks(), 3);
        assert_eq!(f.repository.upsert_count(), 1);
    }

    #[tokio::test]
    async fn success_publishes_profile_saved() {
        let f = fixture();

        save(
            &f,
            ProfileEdit {
                kcal_window: "2".to_string(),
                ..valid_edit()
            },
        )
        .await
        .unwrap();

        let events = f.bus.events_of_type("settings.profile_saved.v1");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].metadata.user_id.as_deref(), Some("user-1"));
        let payload: ProfileSaved = events[0].payload_as().unwrap();
        assert_eq!(payload.defaulted_fields, vec!["kcal_window".to_string()]);
    }

    #[tokio::test]
    async fn saving_twice_is_idempotent() {
        let f = fixture();

        let first = save(&f, valid_edit()).await.unwrap();
        let row_after_first = f.repository.row(&user());
        let second = save(&f, valid_edit()).await.unwrap();

        assert_eq!(first.profile, second.profile);
        assert_eq!(f.repository.row(&user()), row_after_first);
        assert_eq!(f.repository.row_count(), 1);
    }

    #[tokio::test]
    async fn save_then_load_returns_saved_values() {
        let f = fixture();
        let loader = LoadProfileHandler::new(f.sessions.clone(), f.repository.clone());

        let saved = save(&f, valid_edit()).await.unwrap();
        let loaded = loader
            .handle(
                LoadProfileQuery {
                    access_token: Some(TOKEN.to_string()),
                },
                CommandMetadata::new(),
            )
            .await
            .unwrap();

        assert_eq!(loaded, saved.profile);
        assert_eq!(loaded.weight_lb, 175.0);
        assert_eq!(loaded.water_reminders_per_day, ProfileDefaults::WATER_REMINDERS_PER_DAY);
    }

    #[tokio::test]
    async fn count_too_large_to_store_defaults_and_round_trips() {
        let f = fixture();
        let loader = LoadProfileHandler::new(f.sessions.clone(), f.repository.clone());

        let saved = save(
            &f,
            ProfileEdit {
                snacks_count: "3000000000".to_string(),
                ..valid_edit()
            },
        )
        .await
        .unwrap();
        let loaded = loader
            .handle(
                LoadProfileQuery {
                    access_token: Some(TOKEN.to_string()),
                },
                CommandMetadata::new(),
            )
            .await
            .unwrap();

        assert_eq!(saved.profile.snacks_count, ProfileDefaults::SNACKS_COUNT);
        assert_eq!(saved.defaulted_fields, vec!["snacks_count".to_string()]);
        assert_eq!(loaded, saved.profile);
    }

    // ════════════════════════════════════════════════════════════════════════
    // Failures
    // ════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn storage_failure_skips_invalidation() {
        let f = fixture();
        f.repository.fail_writes(true);

        let err = save(&f, valid_edit()).await.unwrap_err();

        assert!(matches!(err, SettingsError::Storage(_)));
        assert_eq!(f.repository.row(&user()), None);
        assert_eq!(f.cache.total_marks(), 0);
        assert_eq!(f.bus.event_count(), 0);
    }

    #[tokio::test]
    async fn invalidation_failure_does_not_fail_the_save() {
        let f = fixture();
        f.cache.fail_marks(true);

        let result = save(&f, valid_edit()).await;

        assert!(result.is_ok());
        assert!(f.repository.row(&user()).is_some());
    }

    #[tokio::test]
    async fn publish_failure_does_not_fail_the_save() {
        let f = fixture();
        f.bus.fail_publishes(true);

        let result = save(&f, valid_edit()).await;

        assert!(result.is_ok());
        assert_eq!(f.repository.upsert_count(), 1);
        assert_eq!(f.cache.total_marks(), 3);
        assert_eq!(f.bus.event_count(), 0);
    }

    #[tokio::test]
    async fn saves_without_a_publisher_still_invalidate() {
        let f = fixture();
        let handler = SaveProfileHandler::new(
            f.sessions.clone(),
            f.repository.clone(),
            DependentCacheInvalidator::new(f.cache.clone()),
        );

        handler
            .handle(command(valid_edit()), CommandMetadata::new())
            .await
            .unwrap();

        assert_eq!(f.cache.total_marks(), 3);
        assert_eq!(f.bus.event_count(), 0);
    }

    #[tokio::test]
    async fn unauthenticated_save_never_touches_storage() {
        let f = fixture();

        let err = f
            .handler
            .handle(
                SaveProfileCommand {
                    access_token: None,
                    edit: valid_edit(),
                },
                CommandMetadata::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SettingsError::Unauthenticated(AuthError::MissingCredentials)
        ));
        assert_eq!(f.repository.upsert_count(), 0);
    }

    #[tokio::test]
    async fn identity_is_checked_before_validation() {
        let f = fixture();

        let err = f
            .handler
            .handle(
                SaveProfileCommand {
                    access_token: Some("expired".to_string()),
                    edit: ProfileEdit {
                        weight_lb: "0".to_string(),
                        ..valid_edit()
                    },
                },
                CommandMetadata::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, SettingsError::Unauthenticated(_)));
    }

    // ════════════════════════════════════════════════════════════════════════
    // Properties
    // ════════════════════════════════════════════════════════════════════════

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread().build().unwrap()
    }

    proptest! {
        #[test]
        fn out_of_range_height_never_writes(height in prop_oneof![0.0f64..119.99, 220.01f64..1000.0]) {
            let f = fixture();
            let edit = ProfileEdit { height_cm: height.to_string(), ..valid_edit() };

            let err = runtime().block_on(save(&f, edit)).unwrap_err();

            prop_assert_eq!(err.field(), Some("height"));
            prop_assert_eq!(f.repository.upsert_count(), 0);
        }

        #[test]
        fn out_of_range_age_never_writes(age in prop_oneof![-50i32..15, 101i32..500]) {
            let f = fixture();
            let edit = ProfileEdit { age: age.to_string(), ..valid_edit() };

            let err = runtime().block_on(save(&f, edit)).unwrap_err();

            prop_assert_eq!(err.field(), Some("age"));
            prop_assert_eq!(f.repository.upsert_count(), 0);
        }

        #[test]
        fn non_positive_weight_never_writes(weight in -500.0f64..=0.0) {
            let f = fixture();
            let edit = ProfileEdit { weight_lb: weight.to_string(), ..valid_edit() };

            let err = runtime().block_on(save(&f, edit)).unwrap_err();

            prop_assert_eq!(err.field(), Some("weight"));
            prop_assert_eq!(f.repository.upsert_count(), 0);
        }

        #[test]
        fn valid_saves_are_idempotent(
            weight in 1.0f64..500.0,
            height in 120.0f64..=220.0,
            age in 15i32..=100,
            snacks in "[0-9a-z]{0,3}",
        ) {
            let f = fixture();
            let edit = ProfileEdit {
                weight_lb: weight.to_string(),
                height_cm: height.to_string(),
                age: age.to_string(),
                snacks_count: snacks,
                ..valid_edit()
            };
            let rt = runtime();

            let first = rt.block_on(save(&f, edit.clone())).unwrap();
            let row = f.repository.row(&user());
            let second = rt.block_on(save(&f, edit)).unwrap();

            prop_assert_eq!(first.profile, second.profile);
            prop_assert_eq!(f.repository.row(&user()), row);
        }
    }
}
