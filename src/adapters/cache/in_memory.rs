//! In-memory CacheInvalidator: a stale-flag registry tests can poll.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::settings::CacheKey;
use crate::ports::CacheInvalidator;

/// Tracks which (user, key) pairs are stale and how often each was marked.
///
/// [`take_stale`](Self::take_stale) plays the consumer: `true` means the
/// entry would be recomputed. Entries are never evicted, so this is a test
/// double only.
#[derive(Debug, Default)]
pub struct InMemoryCacheInvalidator {
    stale: Mutex<HashSet<(UserId, CacheKey)>>,
    marks: Mutex<HashMap<(UserId, CacheKey), usize>>,
    fail: AtomicBool,
}

impl InMemoryCacheInvalidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `mark_stale` fail.
    pub fn fail_marks(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn is_stale(&self, user_id: &UserId, key: CacheKey) -> bool {
        lock(&self.stale).contains(&(user_id.clone(), key))
    }

    /// Returns whether the entry was stale and clears the flag.
    pub fn take_stale(&self, user_id: &UserId, key: CacheKey) -> bool {
        lock(&self.stale).remove(&(user_id.clone(), key))
    }

    /// How many times the entry has been marked since creation.
    pub fn mark_count(&self, user_id: &UserId, key: CacheKey) -> usize {
        lock(&self.marks)
            .get(&(user_id.clone(), key))
            .copied()
            .unwrap_or(0)
    }

    /// Total marks across all users and keys.
    pub fn total_marks(&self) -> usize {
        lock(&self.marks).values().sum()
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl CacheInvalidator for InMemoryCacheInvalidator {
    async fn mark_stale(&self, user_id: &UserId, key: CacheKey) -> Result<(), DomainError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DomainError::cache(format!("Simulated failure marking {}", key)));
        }
        let entry = (user_id.clone(), key);
        lock(&self.stale).insert(entry.clone());
        *lock(&self.marks).entry(entry).or_insert(0) += 1;
        Ok(())
    }
}
