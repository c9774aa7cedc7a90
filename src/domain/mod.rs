//! Domain layer containing business rules and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, auth outcomes, events, errors)
//! - `settings` - The nutrition profile, its defaults, validation and edit coercion

pub mod foundation;
pub mod settings;
