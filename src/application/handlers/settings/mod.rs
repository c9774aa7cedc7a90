//! Settings handlers - loading and saving the nutrition profile.

mod invalidate_dependents;
mod load_profile;
mod save_profile;

pub use invalidate_dependents::DependentCacheInvalidator;
pub use load_profile::{LoadProfileHandler, LoadProfileQuery};
pub use save_profile::{SaveProfileCommand, SaveProfileHandler, SaveProfileResult};

use crate::domain::foundation::{AuthError, UserId};
use crate::domain::settings::SettingsError;
use crate::ports::SessionValidator;

/// Establishes the caller's identity from a raw access token.
///
/// A missing or blank token is `MissingCredentials`. Every identity failure
/// surfaces as `Unauthenticated`; an unavailable auth service is logged at
/// error level since it is not the caller's fault.
pub(crate) async fn authenticate(
    sessions: &dyn SessionValidator,
    access_token: Option<&str>,
) -> Result<UserId, SettingsError> {
    let token = access_token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingCredentials)?;

    match sessions.validate(token).await {
        Ok(user) => Ok(user.id),
        Err(err) => {
            if err.is_transient() {
                tracing::error!(error = %err, "Identity could not be established");
            } else {
                tracing::debug!(error = %err, "Rejected access token");
            }
            Err(SettingsError::Unauthenticated(err))
        }
    }
}
