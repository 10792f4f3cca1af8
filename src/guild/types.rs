//! Guild record plus the level buff and upgrade cost tables.

use crate::core::balance::{GUILD_MAX_LEVEL, GUILD_START_LEVEL};
use crate::core::progression::GuildBuff;
use crate::core::{GroupId, GuildId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Resources consumed from the guild pool to leave a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeCost {
    pub experience: u64,
    pub currency: u64,
}

/// Buffs indexed by guild level 1-5.
const GUILD_BUFFS: [GuildBuff; 5] = [
    GuildBuff {
        experience_bonus: 0.002,
        coin_low: 98,
        coin_high: 189,
    },
    GuildBuff {
        experience_bonus: 0.01,
        coin_low: 158,
        coin_high: 211,
    },
    GuildBuff {
        experience_bonus: 0.018,
        coin_low: 180,
        coin_high: 258,
    },
    GuildBuff {
        experience_bonus: 0.018,
        coin_low: 210,
        coin_high: 298,
    },
    GuildBuff {
        experience_bonus: 0.018,
        coin_low: 210,
        coin_high: 298,
    },
];

/// Upgrade costs indexed by the level being left (1-4).
/// Currency column kept exactly as published, including the 3 -> 4 step.
const UPGRADE_COSTS: [UpgradeCost; 4] = [
    UpgradeCost {
        experience: 10_000,
        currency: 10_000,
    },
    UpgradeCost {
        experience: 30_000,
        currency: 26_000,
    },
    UpgradeCost {
        experience: 80_000,
        currency: 150_000,
    },
    UpgradeCost {
        experience: 120_000,
        currency: 150_000,
    },
];

/// Buff granted by a guild of `level`, `None` for level 0 or unknown levels.
pub fn buff_for_level(level: u32) -> Option<GuildBuff> {
    let index = usize::try_from(level.checked_sub(1)?).ok()?;
    GUILD_BUFFS.get(index).copied()
}

/// Cost to go from `level` to `level + 1`, `None` at the cap.
pub fn upgrade_cost(level: u32) -> Option<UpgradeCost> {
    if level >= GUILD_MAX_LEVEL {
        return None;
    }
    let index = usize::try_from(level.checked_sub(1)?).ok()?;
    UPGRADE_COSTS.get(index).copied()
}

/// A guild: one per group, with a shared pool and two privileged roles.
///
/// `lord` and every manager are always members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guild {
    pub id: GuildId,
    pub group: GroupId,
    pub name: String,
    pub level: u32,
    pub experience: u64,
    /// Shared pool, separate from members' personal currency
    pub currency: u64,
    pub lord: Option<UserId>,
    pub managers: BTreeSet<UserId>,
    pub members: BTreeSet<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Guild {
    pub fn new(group: GroupId, name: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: GuildId::generate(),
            group,
            name,
            level: GUILD_START_LEVEL,
            experience: 0,
            currency: 0,
            lord: None,
            managers: BTreeSet::new(),
            members: BTreeSet::new(),
            created_at,
        }
    }

    pub fn is_member(&self, user: &UserId) -> bool {
        self.members.contains(user)
    }

    pub fn is_lord(&self, user: &UserId) -> bool {
        self.lord.as_ref() == Some(user)
    }

    pub fn is_manager(&self, user: &UserId) -> bool {
        self.managers.contains(user)
    }

    pub fn buff(&self) -> Option<GuildBuff> {
        buff_for_level(self.level)
    }

    pub fn next_upgrade_cost(&self) -> Option<UpgradeCost> {
        upgrade_cost(self.level)
    }

    pub fn is_max_level(&self) -> bool {
        self.level >= GUILD_MAX_LEVEL
    }
}
