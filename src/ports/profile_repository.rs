//! ProfileRepository port - keyed storage for profile rows.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::settings::{StoredProfile, UserProfile};

/// Storage backend for user profiles: one row per user, keyed by user ID.
///
/// # Contract
///
/// Implementations must:
/// - Return `Ok(None)` when no row exists (a missing row is not an error)
/// - Return the row as stored, without applying defaults
/// - Make `upsert` a single atomic insert-or-replace; on error the previous
///   row (or its absence) must remain observable
/// - Report infrastructure failures as `DomainError` (`DatabaseError` code)
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Fetch the stored row for a user.
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<StoredProfile>, DomainError>;

    /// Insert the row if absent, replace it if present.
    async fn upsert(&self, profile: &UserProfile) -> Result<(), DomainError>;
}
