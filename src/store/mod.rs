//! Storage collaborator.
//!
//! Reads are plain lookups. Every write of an engine operation goes through
//! one [`WriteBatch`], which a store applies entirely or not at all.

pub mod json;
pub mod memory;

pub use json::JsonStore;
pub use memory::MemoryStore;

use crate::core::{GroupId, StoreResult, UserId};
use crate::guild::Guild;
use crate::progress::{EngagementRecord, UserRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub trait Store: Send + Sync {
    fn user(&self, id: &UserId) -> StoreResult<Option<UserRecord>>;

    fn users(&self) -> StoreResult<Vec<UserRecord>>;

    /// Most recently written history entry of a user.
    fn latest_engagement(&self, id: &UserId) -> StoreResult<Option<EngagementRecord>>;

    /// Timestamp of every user's most recent history entry.
    fn latest_engagement_times(&self) -> StoreResult<BTreeMap<UserId, DateTime<Utc>>>;

    /// History of a user, oldest entry first.
    fn engagements_for(&self, id: &UserId) -> StoreResult<Vec<EngagementRecord>>;

    fn guild(&self, group: &GroupId) -> StoreResult<Option<Guild>>;

    fn guilds(&self) -> StoreResult<Vec<Guild>>;

    /// Apply every write of one operation atomically.
    fn commit(&self, batch: WriteBatch) -> StoreResult<()>;
}

/// Writes produced by one engine operation.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    pub users: Vec<UserRecord>,
    pub engagements: Vec<EngagementRecord>,
    pub guilds: Vec<Guild>,
    pub deleted_guilds: Vec<GroupId>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_user(&mut self, record: UserRecord) -> &mut Self {
        self.users.push(record);
        self
    }

    pub fn append_engagements(&mut self, entries: impl IntoIterator<Item = EngagementRecord>) -> &mut Self {
        self.engagements.extend(entries);
        self
    }

    pub fn put_guild(&mut self, guild: Guild) -> &mut Self {
        self.guilds.push(guild);
        self
    }

    pub fn delete_guild(&mut self, group: GroupId) -> &mut Self {
        self.deleted_guilds.push(group);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
            && self.engagements.is_empty()
            && self.guilds.is_empty()
            && self.deleted_guilds.is_empty()
    }
}

/// Whole persisted state. Shared by the bundled stores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    pub users: BTreeMap<UserId, UserRecord>,
    #[serde(default)]
    pub engagements: Vec<EngagementRecord>,
    #[serde(default)]
    pub guilds: BTreeMap<GroupId, Guild>,
}

impl Ledger {
    /// Deletions run before upserts, so a batch can recreate a guild.
    pub fn apply(&mut self, batch: WriteBatch) {
        for group in batch.deleted_guilds {
            self.guilds.remove(&group);
        }
        for guild in batch.guilds {
            self.guilds.insert(guild.group.clone(), guild);
        }
        for record in batch.users {
            self.users.insert(record.user_id().clone(), record);
        }
        self.engagements.extend(batch.engagements);
    }

    pub fn latest_engagement(&self, id: &UserId) -> Option<&EngagementRecord> {
        // max_by_key keeps the last maximum, so later entries win ties.
        self.engagements
            .iter()
            .filter(|entry| &entry.user_id == id)
            .max_by_key(|entry| entry.timestamp)
    }

    pub fn latest_engagement_times(&self) -> BTreeMap<UserId, DateTime<Utc>> {
        let mut latest: BTreeMap<UserId, DateTime<Utc>> = BTreeMap::new();
        for entry in &self.engagements {
            latest
                .entry(entry.user_id.clone())
                .and_modify(|t| *t = (*t).max(entry.timestamp))
                .or_insert(entry.timestamp);
        }
        latest
    }

    pub fn engagements_for(&self, id: &UserId) -> Vec<EngagementRecord> {
        self.engagements
            .iter()
            .filter(|entry| &entry.user_id == id)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Reward;
    use chrono::{Duration, NaiveDate, TimeZone};

    fn entry(user: &str, minutes: i64) -> EngagementRecord {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes);
        EngagementRecord::new(
            UserId::from(user),
            Reward {
                experience: 10,
                currency: 90,
            },
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            at,
        )
    }

    #[test]
    fn test_apply_batch() {
        let mut ledger = Ledger::default();
        let mut batch = WriteBatch::new();
        batch
            .put_user(UserRecord::new(UserId::from("a")))
            .append_engagements([entry("a", 0), entry("a", 5), entry("b", 1)])
            .put_guild(Guild::new(GroupId::from("g"), "Keep".into(), Utc::now()));
        assert!(!batch.is_empty());
        ledger.apply(batch);

        assert_eq!(ledger.users.len(), 1);
        assert_eq!(ledger.engagements_for(&UserId::from("a")).len(), 2);
        assert!(ledger.guilds.contains_key(&GroupId::from("g")));

        let mut batch = WriteBatch::new();
        batch.delete_guild(GroupId::from("g"));
        ledger.apply(batch);
        assert!(ledger.guilds.is_empty());
    }

    #[test]
    fn test_latest_engagement() {
        let mut ledger = Ledger::default();
        ledger.engagements = vec![entry("a", 10), entry("a", 3), entry("b", 20)];
        let latest = ledger.latest_engagement(&UserId::from("a")).unwrap();
        assert_eq!(latest.timestamp, ledger.engagements[0].timestamp);
        assert!(ledger.latest_engagement(&UserId::from("c")).is_none());

        let times = ledger.latest_engagement_times();
        assert_eq!(times.len(), 2);
        assert_eq!(times[&UserId::from("a")], ledger.engagements[0].timestamp);
    }
}
