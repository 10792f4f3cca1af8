//! Per-entity mutual exclusion.
//!
//! One mutex per user, per guild, plus one for the guild registry (name and
//! group uniqueness). Keys are always taken in `LockKey` order: registry,
//! then guilds, then users, each by id. Nested calls keep that order as long
//! as the inner keys sort after the outer ones.

use crate::core::{GroupId, UserId};
use dashmap::DashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LockKey {
    GuildRegistry,
    Guild(GroupId),
    User(UserId),
}

#[derive(Debug, Default)]
pub struct LockTable {
    slots: DashMap<LockKey, Arc<Mutex<()>>>,
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, key: &LockKey) -> Arc<Mutex<()>> {
        self.slots.entry(key.clone()).or_default().value().clone()
    }

    /// Run `f` while holding every key.
    pub fn with_locked<T>(&self, keys: impl IntoIterator<Item = LockKey>, f: impl FnOnce() -> T) -> T {
        let mut keys: Vec<LockKey> = keys.into_iter().collect();
        keys.sort();
        keys.dedup();

        let slots: Vec<Arc<Mutex<()>>> = keys.iter().map(|key| self.slot(key)).collect();
        let _guards: Vec<MutexGuard<'_, ()>> = slots
            .iter()
            .map(|slot| slot.lock().unwrap_or_else(|e| e.into_inner()))
            .collect();
        f()
    }

    /// Number of keys ever locked.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
