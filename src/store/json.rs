//! JSON snapshot store (default `~/.streakhold/ledger.json`).
//!
//! The whole ledger is rewritten on every commit: serialized to a sibling
//! temp file, then renamed over the snapshot. The in-memory copy only moves
//! forward once the file is in place.

use super::{Ledger, Store, WriteBatch};
use crate::core::{GroupId, StoreResult, UserId};
use crate::guild::Guild;
use crate::progress::{EngagementRecord, UserRecord};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard};

pub fn default_ledger_path() -> io::Result<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            "Could not determine home directory",
        )
    })?;
    Ok(home_dir.join(".streakhold").join("ledger.json"))
}

#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    ledger: RwLock<Ledger>,
}

impl JsonStore {
    /// Open the snapshot at `path`, starting empty if it does not exist.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let ledger = match fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ledger::default(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(
            path = %path.display(),
            users = ledger.users.len(),
            guilds = ledger.guilds.len(),
            "opened ledger"
        );
        Ok(Self {
            path,
            ledger: RwLock::new(ledger),
        })
    }

    pub fn open_default() -> StoreResult<Self> {
        Self::open(default_ledger_path()?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> RwLockReadGuard<'_, Ledger> {
        self.ledger.read().unwrap_or_else(|e| e.into_inner())
    }

    fn persist(&self, ledger: &Ledger) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(ledger)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl Store for JsonStore {
    fn user(&self, id: &UserId) -> StoreResult<Option<UserRecord>> {
        Ok(self.read().users.get(id).cloned())
    }

    fn users(&self) -> StoreResult<Vec<UserRecord>> {
        Ok(self.read().users.values().cloned().collect())
    }

    fn latest_engagement(&self, id: &UserId) -> StoreResult<Option<EngagementRecord>> {
        Ok(self.read().latest_engagement(id).cloned())
    }

    fn latest_engagement_times(&self) -> StoreResult<BTreeMap<UserId, DateTime<Utc>>> {
        Ok(self.read().latest_engagement_times())
    }

    fn engagements_for(&self, id: &UserId) -> StoreResult<Vec<EngagementRecord>> {
        Ok(self.read().engagements_for(id))
    }

    fn guild(&self, group: &GroupId) -> StoreResult<Option<Guild>> {
        Ok(self.read().guilds.get(group).cloned())
    }

    fn guilds(&self) -> StoreResult<Vec<Guild>> {
        Ok(self.read().guilds.values().cloned().collect())
    }

    fn commit(&self, batch: WriteBatch) -> StoreResult<()> {
        let mut ledger = self.ledger.write().unwrap_or_else(|e| e.into_inner());
        let mut next = ledger.clone();
        next.apply(batch);
        self.persist(&next)?;
        *ledger = next;
        Ok(())
    }
}
