//! Settings-specific error types.

use thiserror::Error;

use crate::domain::foundation::{AuthError, DomainError, ErrorCode, ValidationError};

/// Everything `load` and `save` can fail with.
///
/// The three kinds stay distinct all the way to the caller: a login problem,
/// a field the user must correct, or a generic storage failure.
#[derive(Debug, Clone, Error)]
pub enum SettingsError {
    /// No valid identity could be established.
    #[error("Not authenticated: {0}")]
    Unauthenticated(#[source] AuthError),

    /// A gated field was rejected; nothing was written.
    #[error("Invalid value for '{field}': {0}", field = .0.field())]
    ValidationFailed(#[source] ValidationError),

    /// The storage backend failed; stored state is unchanged.
    #[error("Storage failure: {0}")]
    Storage(#[source] DomainError),
}

impl SettingsError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SettingsError::Unauthenticated(_) => ErrorCode::Unauthorized,
            SettingsError::ValidationFailed(_) => ErrorCode::ValidationFailed,
            SettingsError::Storage(e) => e.code,
        }
    }

    /// The rejected field, for validation failures.
    pub fn field(&self) -> Option<&str> {
        match self {
            SettingsError::ValidationFailed(e) => Some(e.field()),
            _ => None,
        }
    }
}

impl From<AuthError> for SettingsError {
    fn from(err: AuthError) -> Self {
        SettingsError::Unauthenticated(err)
    }
}

impl From<ValidationError> for SettingsError {
    fn from(err: ValidationError) -> Self {
        SettingsError::ValidationFailed(err)
    }
}

impl From<DomainError> for SettingsError {
    fn from(err: DomainError) -> Self {
        SettingsError::Storage(err)
    }
}
