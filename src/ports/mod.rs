//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the settings pipeline and the outside world. Adapters implement them.
//!
//! - `SessionValidator` - identity provider
//! - `ProfileRepository` - keyed profile storage with upsert
//! - `CacheInvalidator` - stale signals for dependent caches
//! - `EventPublisher` - outbound domain events

mod cache_invalidator;
mod event_publisher;
mod profile_repository;
mod session_validator;

pub use cache_invalidator::CacheInvalidator;
pub use event_publisher::EventPublisher;
pub use profile_repository::ProfileRepository;
pub use session_validator::SessionValidator;
