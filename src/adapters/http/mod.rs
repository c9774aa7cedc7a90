//! HTTP adapters - REST API implementations.

pub mod middleware;
pub mod settings;

pub use settings::{settings_routes, SettingsHandlers};

use axum::Router;

/// The full API router: every module nested under `/api`.
pub fn api_router(settings: SettingsHandlers) -> Router {
    Router::new().nest("/api/settings", settings_routes(settings))
}
