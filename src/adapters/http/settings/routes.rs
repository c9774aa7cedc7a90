//! HTTP routes for the settings endpoints.

use axum::{routing::get, Router};

use super::handlers::{get_profile, save_profile, SettingsHandlers};

/// Creates the settings router, to be nested under `/api/settings`.
pub fn settings_routes(handlers: SettingsHandlers) -> Router {
    Router::new()
        .route("/profile", get(get_profile).put(save_profile))
        .with_state(handlers)
}
