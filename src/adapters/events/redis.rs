//! Redis pub/sub EventPublisher.
//!
//! Each envelope is serialized to JSON and `PUBLISH`ed on one channel.
//! Delivery is fire-and-forget: Redis keeps nothing for subscribers that
//! are not connected, and the service keeps nothing either.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::ports::EventPublisher;

#[derive(Clone)]
pub struct RedisEventPublisher {
    conn: MultiplexedConnection,
    channel: String,
    timeout: Duration,
}

impl RedisEventPublisher {
    pub fn new(conn: MultiplexedConnection, channel: impl Into<String>, timeout: Duration) -> Self {
        Self {
            conn,
            channel: channel.into(),
            timeout,
        }
    }

    /// Wire form of an envelope.
    pub fn encode(event: &EventEnvelope) -> Result<String, DomainError> {
        serde_json::to_string(event).map_err(|e| {
            DomainError::new(
                ErrorCode::EventPublishFailed,
                format!("Failed to encode {}: {}", event.event_type, e),
            )
        })
    }
}

#[async_trait]
impl EventPublisher for RedisEventPublisher {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let payload = Self::encode(&event)?;
        let mut conn = self.conn.clone();
        let mut cmd = redis::cmd("PUBLISH");
        cmd.arg(&self.channel).arg(payload);

        match tokio::time::timeout(self.timeout, cmd.query_async::<_, i64>(&mut conn)).await {
            Ok(Ok(receivers)) => {
                tracing::debug!(
                    event_type = %event.event_type,
                    event_id = %event.event_id,
                    receivers,
                    "Published event"
                );
                Ok(())
            }
            Ok(Err(e)) => Err(DomainError::new(
                ErrorCode::EventPublishFailed,
                format!("Redis publish failed: {}", e),
            )
            .with_detail("event_type", event.event_type)),
            Err(_) => Err(
                DomainError::new(ErrorCode::EventPublishFailed, "Redis publish timed out")
                    .with_detail("event_type", event.event_type),
            ),
        }
    }
}

impl std::fmt::Debug for RedisEventPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisEventPublisher")
            .field("channel", &self.channel)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
