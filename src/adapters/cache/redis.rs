//! Redis-backed CacheInvalidator for multi-instance deployments.
//!
//! Each stale signal is one atomic pipeline:
//! 1. `DEL` the cached value so the next reader misses
//! 2. `PUBLISH` a `cache.invalidated.v1` envelope on the invalidation channel
//!    so subscribed instances can drop their local copies

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;

use crate::domain::foundation::{DomainError, EventEnvelope, UserId};
use crate::domain::settings::{CacheInvalidated, CacheKey};
use crate::ports::CacheInvalidator;

/// Redis cache invalidator.
#[derive(Clone)]
pub struct RedisCacheInvalidator {
    conn: MultiplexedConnection,
    channel: String,
    timeout: Duration,
}

impl RedisCacheInvalidator {
    pub fn new(conn: MultiplexedConnection, channel: impl Into<String>, timeout: Duration) -> Self {
        Self {
            conn,
            channel: channel.into(),
            timeout,
        }
    }

    /// Storage key of one user's cached value.
    pub fn value_key(user_id: &UserId, key: CacheKey) -> String {
        format!("fitfuel:cache:{}:{}", user_id, key.as_str())
    }
}

#[async_trait]
impl CacheInvalidator for RedisCacheInvalidator {
    async fn mark_stale(&self, user_id: &UserId, key: CacheKey) -> Result<(), DomainError> {
        let envelope = EventEnvelope::from_event(&CacheInvalidated::new(user_id.clone(), key))
            .map_err(|e| DomainError::cache(format!("Failed to encode stale signal: {}", e)))?;
        let payload = serde_json::to_string(&envelope)
            .map_err(|e| DomainError::cache(format!("Failed to encode stale signal: {}", e)))?;

        let mut conn = self.conn.clone();
        let mut pipe = redis::pipe();
        pipe.atomic()
            .del(Self::value_key(user_id, key))
            .ignore()
            .publish(&self.channel, payload)
            .ignore();

        match tokio::time::timeout(self.timeout, pipe.query_async::<_, ()>(&mut conn)).await {
            Ok(Ok(())) => {
                tracing::debug!(user_id = %user_id, key = %key, "Published stale signal");
                Ok(())
            }
            Ok(Err(e)) => Err(DomainError::cache(format!("Redis invalidation failed: {}", e))
                .with_detail("key", key.as_str())),
            Err(_) => Err(DomainError::cache("Redis invalidation timed out")
                .with_detail("key", key.as_str())),
        }
    }
}

impl std::fmt::Debug for RedisCacheInvalidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheInvalidator")
            .field("channel", &self.channel)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
