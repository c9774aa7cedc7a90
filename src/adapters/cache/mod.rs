//! CacheInvalidator adapters.
//!
//! - `RedisCacheInvalidator` - drops the cached value and announces it on a channel
//! - `EventBusCacheInvalidator` - publishes `cache.invalidated.v1` envelopes
//! - `LoggingCacheInvalidator` - logs the signal when no Redis is configured
//! - `InMemoryCacheInvalidator` - stale-flag registry for tests

mod event_bus;
mod in_memory;
mod logging;
mod redis;

pub use self::event_bus::EventBusCacheInvalidator;
pub use self::in_memory::InMemoryCacheInvalidator;
pub use self::logging::LoggingCacheInvalidator;
pub use self::redis::RedisCacheInvalidator;
