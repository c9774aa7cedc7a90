//! Marks every cache derived from a user's profile as stale.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::settings::CacheKey;
use crate::ports::CacheInvalidator;

/// Fans a profile write out to the dependent cache keys.
///
/// Each key in [`CacheKey::DEPENDENTS_OF_PROFILE`] is marked exactly once.
/// A failure on one key does not stop the others; the failures are reported
/// together afterwards.
#[derive(Clone)]
pub struct DependentCacheInvalidator {
    cache: Arc<dyn CacheInvalidator>,
}

impl DependentCacheInvalidator {
    pub fn new(cache: Arc<dyn CacheInvalidator>) -> Self {
        Self { cache }
    }

    pub async fn invalidate(&self, user_id: &UserId) -> Result<(), DomainError> {
        let mut failed = Vec::new();

        for key in CacheKey::DEPENDENTS_OF_PROFILE {
            if let Err(err) = self.cache.mark_stale(user_id, key).await {
                tracing::warn!(user_id = %user_id, key = %key, error = %err, "Failed to mark cache stale");
                failed.push(key.as_str());
            }
        }

        if failed.is_empty() {
            tracing::debug!(user_id = %user_id, "Dependent caches marked stale");
            return Ok(());
        }

        Err(DomainError::cache(format!(
            "Failed to mark {} of {} dependent caches stale",
            failed.len(),
            CacheKey::DEPENDENTS_OF_PROFILE.len()
        ))
        .with_detail("keys", failed.join(",")))
    }
}
