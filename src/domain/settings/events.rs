//! Settings events and the dependent cache keys.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{EventId, Timestamp, UserId};
use crate::domain_event;

/// Logical caches derived from the profile.
///
/// The string forms are the query keys downstream consumers already use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CacheKey {
    #[serde(rename = "user_profile")]
    UserProfile,
    #[serde(rename = "/api/targets/today")]
    TargetsToday,
    #[serde(rename = "/api/summary/today")]
    SummaryToday,
}

impl CacheKey {
    /// Every key that a profile write makes stale.
    pub const DEPENDENTS_OF_PROFILE: [CacheKey; 3] = [
        CacheKey::UserProfile,
        CacheKey::TargetsToday,
        CacheKey::SummaryToday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheKey::UserProfile => "user_profile",
            CacheKey::TargetsToday => "/api/targets/today",
            CacheKey::SummaryToday => "/api/summary/today",
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Published when a profile write has been persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSaved {
    pub event_id: EventId,
    pub user_id: UserId,
    /// Secondary fields that were replaced by their default.
    pub defaulted_fields: Vec<String>,
    pub saved_at: Timestamp,
}

domain_event!(
    ProfileSaved,
    event_type = "settings.profile_saved.v1",
    aggregate_id = user_id,
    aggregate_type = "UserProfile",
    occurred_at = saved_at,
    event_id = event_id
);

/// A single stale signal for one user's cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheInvalidated {
    pub event_id: EventId,
    pub user_id: UserId,
    pub key: CacheKey,
    pub invalidated_at: Timestamp,
}

impl CacheInvalidated {
    pub const EVENT_TYPE: &'static str = "cache.invalidated.v1";

    pub fn new(user_id: UserId, key: CacheKey) -> Self {
        Self {
            event_id: EventId::new(),
            user_id,
            key,
            invalidated_at: Timestamp::now(),
        }
    }
}

domain_event!(
    CacheInvalidated,
    event_type = "cache.invalidated.v1",
    aggregate_id = user_id,
    aggregate_type = "UserProfile",
    occurred_at = invalidated_at,
    event_id = event_id
);
