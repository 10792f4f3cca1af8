//! The engine: every top-level operation a front end can call.
//!
//! Each operation locks the entities it touches (see [`locks`]), reads them
//! from the store, runs the pure rules, and commits one [`WriteBatch`]. A
//! failed commit leaves nothing behind.

pub mod boards;
pub mod guilds;
pub mod locks;
pub mod progress;

pub use guilds::{DonationReceipt, GuildView};
pub use locks::{LockKey, LockTable};
pub use progress::{EngagementOutcome, PurchaseReceipt};

use crate::core::{
    local_date, Clock, EngineConfig, EngineError, EngineResult, GroupId, Reason, StoreResult,
    SystemClock, UserId,
};
use crate::guild::Guild;
use crate::names::{NameResolver, RawIds};
use crate::progress::UserRecord;
use crate::store::{Store, WriteBatch};
use chrono::{DateTime, NaiveDate, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::{Arc, Mutex};

pub struct Engine {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    names: Arc<dyn NameResolver>,
    config: EngineConfig,
    locks: LockTable,
    /// Seeds one generator per operation
    rng: Mutex<ChaCha8Rng>,
}

impl Engine {
    /// Engine on the system clock with raw ids as display names.
    pub fn new(store: Arc<dyn Store>, config: EngineConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            store,
            clock: Arc::new(SystemClock),
            names: Arc::new(RawIds),
            config,
            locks: LockTable::new(),
            rng: Mutex::new(rng),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_names(mut self, names: Arc<dyn NameResolver>) -> Self {
        self.names = names;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    // ========================================================================
    // Shared helpers
    // ========================================================================

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Calendar day in the configured offset.
    fn today(&self) -> NaiveDate {
        local_date(self.now(), self.config.utc_offset_minutes)
    }

    fn operation_rng(&self) -> ChaCha8Rng {
        let mut master = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        ChaCha8Rng::seed_from_u64(master.gen())
    }

    fn commit(&self, operation: &'static str, batch: WriteBatch) -> EngineResult<()> {
        self.store.commit(batch).map_err(|e| {
            tracing::warn!(operation, error = %e, "commit failed, operation aborted");
            EngineError::from(e)
        })
    }

    fn read<T>(&self, what: &'static str, result: StoreResult<T>) -> EngineResult<T> {
        result.map_err(|e| {
            tracing::warn!(read = what, error = %e, "store read failed");
            EngineError::from(e)
        })
    }

    fn require_user(&self, user: &UserId) -> EngineResult<UserRecord> {
        self.read("user", self.store.user(user))?
            .ok_or(EngineError::NotFound(Reason::UserNotFound))
    }

    fn require_guild(&self, group: &GroupId) -> EngineResult<Guild> {
        self.read("guild", self.store.guild(group))?
            .ok_or(EngineError::NotFound(Reason::GuildNotFound))
    }

    /// Group of the guild `user` belongs to, taken from guild membership.
    ///
    /// `mirrored` wins while that guild still lists the user; otherwise the
    /// most recently founded guild that does.
    fn guild_of(&self, user: &UserId, mirrored: Option<&GroupId>) -> EngineResult<Option<GroupId>> {
        let guilds = self.read("guilds", self.store.guilds())?;
        let mut joined: Vec<Guild> = guilds.into_iter().filter(|g| g.is_member(user)).collect();
        if let Some(group) = mirrored {
            if joined.iter().any(|g| &g.group == group) {
                return Ok(Some(group.clone()));
            }
        }
        joined.sort_by_key(|g| g.created_at);
        Ok(joined.pop().map(|g| g.group))
    }

    fn display_name(&self, user: &UserId) -> String {
        self.names.name_or_id(user)
    }
}
