//! In-memory ProfileRepository for tests and local development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::settings::{StoredProfile, UserProfile};
use crate::ports::ProfileRepository;

/// Keyed map of stored rows with call counters and a failure switch.
///
/// Rows are kept as [`StoredProfile`] so tests can seed partial rows the
/// way an older schema would have left them.
#[derive(Debug, Default)]
pub struct InMemoryProfileRepository {
    rows: RwLock<HashMap<UserId, StoredProfile>>,
    upserts: AtomicUsize,
    fetches: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a raw row (possibly partial).
    pub fn with_row(self, user_id: UserId, row: StoredProfile) -> Self {
        self.write_rows().insert(user_id, row);
        self
    }

    /// Makes every subsequent `find_by_user` fail.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent `upsert` fail without touching stored rows.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of `upsert` calls, successful or not.
    pub fn upsert_count(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    /// Number of `find_by_user` calls.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Raw stored row, for assertions.
    pub fn row(&self, user_id: &UserId) -> Option<StoredProfile> {
        self.read_rows().get(user_id).cloned()
    }

    pub fn row_count(&self) -> usize {
        self.read_rows().len()
    }

    fn read_rows(&self) -> std::sync::RwLockReadGuard<'_, HashMap<UserId, StoredProfile>> {
        self.rows.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_rows(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<UserId, StoredProfile>> {
        self.rows.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<StoredProfile>, DomainError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "Simulated read failure",
            ));
        }
        Ok(self.read_rows().get(user_id).cloned())
    }

    async fn upsert(&self, profile: &UserProfile) -> Result<(), DomainError> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "Simulated upsert failure",
            ));
        }
        self.write_rows()
            .insert(profile.user_id.clone(), StoredProfile::from(profile));
        Ok(())
    }
}
