//! In-process store. Used by tests and the simulator.

use super::{Ledger, Store, WriteBatch};
use crate::core::{GroupId, StoreError, StoreResult, UserId};
use crate::guild::Guild;
use crate::progress::{EngagementRecord, UserRecord};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
pub struct MemoryStore {
    ledger: RwLock<Ledger>,
    failing_commits: AtomicU32,
    failing_reads: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` commits fail without applying anything.
    pub fn fail_next_commits(&self, n: u32) {
        self.failing_commits.store(n, Ordering::SeqCst);
    }

    /// Make the next `n` reads fail.
    pub fn fail_next_reads(&self, n: u32) {
        self.failing_reads.store(n, Ordering::SeqCst);
    }

    /// Copy of the whole state.
    pub fn snapshot(&self) -> Ledger {
        self.ledger.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Ledger>> {
        if take_one(&self.failing_reads) {
            return Err(StoreError::Unavailable("injected read failure".into()));
        }
        Ok(self.ledger.read().unwrap_or_else(|e| e.into_inner()))
    }

    fn write(&self) -> RwLockWriteGuard<'_, Ledger> {
        self.ledger.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn take_one(counter: &AtomicU32) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

impl Store for MemoryStore {
    fn user(&self, id: &UserId) -> StoreResult<Option<UserRecord>> {
        Ok(self.read()?.users.get(id).cloned())
    }

    fn users(&self) -> StoreResult<Vec<UserRecord>> {
        Ok(self.read()?.users.values().cloned().collect())
    }

    fn latest_engagement(&self, id: &UserId) -> StoreResult<Option<EngagementRecord>> {
        Ok(self.read()?.latest_engagement(id).cloned())
    }

    fn latest_engagement_times(&self) -> StoreResult<BTreeMap<UserId, DateTime<Utc>>> {
        Ok(self.read()?.latest_engagement_times())
    }

    fn engagements_for(&self, id: &UserId) -> StoreResult<Vec<EngagementRecord>> {
        Ok(self.read()?.engagements_for(id))
    }

    fn guild(&self, group: &GroupId) -> StoreResult<Option<Guild>> {
        Ok(self.read()?.guilds.get(group).cloned())
    }

    fn guilds(&self) -> StoreResult<Vec<Guild>> {
        Ok(self.read()?.guilds.values().cloned().collect())
    }

    fn commit(&self, batch: WriteBatch) -> StoreResult<()> {
        if take_one(&self.failing_commits) {
            return Err(StoreError::Unavailable("injected commit failure".into()));
        }
        self.write().apply(batch);
        Ok(())
    }
}
