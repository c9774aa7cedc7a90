//! EventPublisher adapters.
//!
//! - `RedisEventPublisher` - publishes envelopes on a Redis pub/sub channel
//! - `InMemoryEventBus` - records envelopes for assertions in tests

mod in_memory;
mod redis;

pub use self::in_memory::InMemoryEventBus;
pub use self::redis::RedisEventPublisher;
