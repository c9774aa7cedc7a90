//! Profile storage adapters.
//!
//! - `PgProfileRepository` - PostgreSQL, one row per user in `user_profiles`
//! - `InMemoryProfileRepository` - map-backed, for tests and local runs

mod in_memory;
mod postgres_repository;

pub use in_memory::InMemoryProfileRepository;
pub use postgres_repository::PgProfileRepository;
