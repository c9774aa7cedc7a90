//! HTTP handlers for the settings endpoints.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::middleware::BearerToken;
use crate::application::handlers::settings::{
    LoadProfileHandler, LoadProfileQuery, SaveProfileCommand, SaveProfileHandler,
};
use crate::domain::foundation::CommandMetadata;
use crate::domain::settings::SettingsError;

use super::dto::{ErrorResponse, ProfileResponse, SaveProfileRequest, SaveProfileResponse};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct SettingsHandlers {
    load_handler: Arc<LoadProfileHandler>,
    save_handler: Arc<SaveProfileHandler>,
}

impl SettingsHandlers {
    pub fn new(load_handler: Arc<LoadProfileHandler>, save_handler: Arc<SaveProfileHandler>) -> Self {
        Self {
            load_handler,
            save_handler,
        }
    }
}

/// Correlation id from `x-request-id`, when the caller sent one.
fn metadata(headers: &HeaderMap) -> CommandMetadata {
    let metadata = CommandMetadata::new().with_source("http");
    match headers.get("x-request-id").and_then(|v| v.to_str().ok()) {
        Some(id) if !id.trim().is_empty() => metadata.with_correlation_id(id.trim()),
        _ => metadata,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/settings/profile - the caller's profile with defaults applied
pub async fn get_profile(
    State(handlers): State<SettingsHandlers>,
    BearerToken(access_token): BearerToken,
    headers: HeaderMap,
) -> Response {
    let query = LoadProfileQuery { access_token };

    match handlers.load_handler.handle(query, metadata(&headers)).await {
        Ok(profile) => (StatusCode::OK, Json(ProfileResponse { profile })).into_response(),
        Err(e) => handle_settings_error(e, "Could not load profile"),
    }
}

/// PUT /api/settings/profile - validate and save the settings form
pub async fn save_profile(
    State(handlers): State<SettingsHandlers>,
    BearerToken(access_token): BearerToken,
    headers: HeaderMap,
    Json(req): Json<SaveProfileRequest>,
) -> Response {
    let cmd = SaveProfileCommand {
        access_token,
        edit: req.into_edit(),
    };

    match handlers.save_handler.handle(cmd, metadata(&headers)).await {
        Ok(result) => (
            StatusCode::OK,
            Json(SaveProfileResponse {
                profile: result.profile,
                defaulted_fields: result.defaulted_fields,
            }),
        )
            .into_response(),
        Err(e) => handle_settings_error(e, "Could not save profile"),
    }
}

fn handle_settings_error(error: SettingsError, storage_message: &str) -> Response {
    match &error {
        SettingsError::Unauthenticated(_) => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::unauthenticated()),
        )
            .into_response(),
        SettingsError::ValidationFailed(_) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse::validation(&error)),
        )
            .into_response(),
        // Adapter details stay in the logs
        SettingsError::Storage(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::storage(storage_message)),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{AuthError, DomainError, ValidationError};

    #[test]
    fn unauthenticated_maps_to_401() {
        let response =
            handle_settings_error(AuthError::InvalidToken.into(), "Could not load profile");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn validation_maps_to_422() {
        let response = handle_settings_error(
            ValidationError::not_positive("weight", 0.0).into(),
            "Could not save profile",
        );
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn storage_maps_to_500() {
        let response = handle_settings_error(
            DomainError::database("connection refused").into(),
            "Could not save profile",
        );
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn request_id_becomes_correlation_id() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", "req-42".parse().unwrap());

        let m = metadata(&headers);

        assert_eq!(m.correlation_id(), "req-42");
        assert_eq!(m.source(), Some("http"));
    }
}
