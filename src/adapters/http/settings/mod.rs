//! HTTP adapter for the profile settings endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{ErrorResponse, ProfileResponse, SaveProfileRequest, SaveProfileResponse};
pub use handlers::SettingsHandlers;
pub use routes::settings_routes;
