//! HTTP middleware and extractors for axum.
//!
//! - `auth` - bearer-token extraction

pub mod auth;

pub use auth::BearerToken;
