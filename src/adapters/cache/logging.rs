//! CacheInvalidator for single-instance deployments without Redis.
//!
//! No dependent cache lives in this process, so the signal has nobody to
//! reach. It is logged and nothing is retained.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::settings::CacheKey;
use crate::ports::CacheInvalidator;

/// Logs each stale signal at `info` and keeps no state.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingCacheInvalidator;

impl LoggingCacheInvalidator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CacheInvalidator for LoggingCacheInvalidator {
    async fn mark_stale(&self, user_id: &UserId, key: CacheKey) -> Result<(), DomainError> {
        tracing::info!(user_id = %user_id, key = %key, "Dependent cache marked stale");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::settings::DependentCacheInvalidator;
    use std::sync::Arc;

    #[test]
    fn holds_no_state() {
        assert_eq!(std::mem::size_of::<LoggingCacheInvalidator>(), 0);
    }

    #[tokio::test]
    async fn every_mark_succeeds() {
        let invalidator = DependentCacheInvalidator::new(Arc::new(LoggingCacheInvalidator::new()));

        for i in 0..1000 {
            let user = UserId::new(format!("user-{}", i)).unwrap();
            invalidator.invalidate(&user).await.unwrap();
        }
    }
}
