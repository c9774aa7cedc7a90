//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the settings pipeline to external systems:
//! - `auth` - Session validation (HS256 JWT, mock)
//! - `profile` - Profile storage (PostgreSQL, in-memory)
//! - `cache` - Stale signals (Redis, events, log-only, in-memory)
//! - `events` - Event publishers (Redis pub/sub, in-memory recorder)
//! - `http` - REST API

pub mod auth;
pub mod cache;
pub mod events;
pub mod http;
pub mod profile;

pub use events::InMemoryEventBus;
