//! Settings domain: the nutrition profile and the rules around editing it.
//!
//! - `profile` - [`UserProfile`] and its value types
//! - `defaults` - [`ProfileDefaults`] and the stored-row merge
//! - `validator` - [`ProfileValidator`], hard gates on anthropometrics
//! - `edit` - [`ProfileEdit`], the raw form and lenient coercion
//! - `events` - [`ProfileSaved`], [`CacheInvalidated`], [`CacheKey`]

mod defaults;
mod edit;
mod errors;
mod events;
mod profile;
mod validator;

pub use defaults::{ProfileDefaults, StoredProfile};
pub use edit::{CoercedProfile, ProfileEdit};
pub use errors::SettingsError;
pub use events::{CacheInvalidated, CacheKey, ProfileSaved};
pub use profile::{Sex, TimeOfDay, UserProfile};
pub use validator::{PrimaryFields, ProfileValidator};
