//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, authentication outcomes, event
//! infrastructure and error types used across the settings service.

mod auth;
mod command;
mod errors;
mod events;
mod ids;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use command::CommandMetadata;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{DomainEvent, EventEnvelope, EventId, EventMetadata};
pub use ids::UserId;
pub use timestamp::Timestamp;
