//! CacheInvalidator port - stale signals for data derived from the profile.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::settings::CacheKey;

/// Marks one user's derived cache entry as stale.
///
/// This only emits the signal. Consumers (scheduling, streak and summary
/// engines) recompute lazily on their next read.
///
/// # Contract
///
/// - Marking an already-stale key is harmless
/// - Errors are returned to the caller, never swallowed by the adapter
#[async_trait]
pub trait CacheInvalidator: Send + Sync {
    async fn mark_stale(&self, user_id: &UserId, key: CacheKey) -> Result<(), DomainError>;
}
