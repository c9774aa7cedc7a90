//! CacheInvalidator that turns each stale signal into a domain event.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope, UserId};
use crate::domain::settings::{CacheInvalidated, CacheKey};
use crate::ports::{CacheInvalidator, EventPublisher};

/// Publishes a [`CacheInvalidated`] envelope per marked key.
///
/// Selected with `redis.invalidation = "events"`: the envelopes go out on
/// the events channel next to `ProfileSaved`, and consumers that own the
/// cached values drop them on their own schedule.
pub struct EventBusCacheInvalidator {
    publisher: Arc<dyn EventPublisher>,
}

impl EventBusCacheInvalidator {
    pub fn new(publisher: Arc<dyn EventPublisher>) -> Self {
        Self { publisher }
    }
}

#[async_trait]
impl CacheInvalidator for EventBusCacheInvalidator {
    async fn mark_stale(&self, user_id: &UserId, key: CacheKey) -> Result<(), DomainError> {
        let envelope = EventEnvelope::from_event(&CacheInvalidated::new(user_id.clone(), key))
            .map_err(|e| DomainError::new(ErrorCode::EventPublishFailed, e.to_string()))?
            .with_user_id(user_id.as_str());

        self.publisher.publish(envelope).await
    }
}
