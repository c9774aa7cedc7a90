//! FitFuel settings service.
//!
//! Loads and saves the per-user nutrition profile: fills gaps with documented
//! defaults on read, gates the anthropometric fields on write, coerces the
//! scheduling fields leniently, upserts the full record and marks the caches
//! derived from the profile stale.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
