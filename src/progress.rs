//! Per-user progression state and the engagement history entry.

use crate::core::balance::LEVEL_THRESHOLD_BASE;
use crate::core::progression::{compute_level_up, Reward};
use crate::core::{GroupId, UserId};
use crate::inventory::Inventory;
use crate::titles::TitleBook;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Streak, experience, level and currency of one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProgress {
    pub user_id: UserId,
    /// Lifetime engagement count, never decreases
    pub total_days: u32,
    pub last_engagement_date: Option<NaiveDate>,
    pub streak_days: u32,
    /// Cumulative, never decreases
    pub experience: u64,
    pub level: u32,
    pub next_level_threshold: u64,
    pub currency: u64,
    /// Guild (by group) the user currently belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild: Option<GroupId>,
}

impl UserProgress {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            total_days: 0,
            last_engagement_date: None,
            streak_days: 0,
            experience: 0,
            level: 1,
            next_level_threshold: LEVEL_THRESHOLD_BASE,
            currency: 0,
            guild: None,
        }
    }

    /// Credit one engaged day and recompute the level.
    /// Returns true if the level went up.
    pub fn credit_day(&mut self, reward: Reward, date: NaiveDate, streak_days: u32) -> bool {
        let previous_level = self.level;

        self.experience = self.experience.saturating_add(reward.experience);
        let state = compute_level_up(self.experience, self.level);
        self.level = state.level;
        self.next_level_threshold = state.next_threshold;

        self.currency = self.currency.saturating_add(reward.currency);
        self.total_days = self.total_days.saturating_add(1);
        self.last_engagement_date = Some(date);
        self.streak_days = streak_days;

        self.level > previous_level
    }

    /// Take `amount` currency. Returns false (and changes nothing) if short.
    pub fn spend(&mut self, amount: u64) -> bool {
        match self.currency.checked_sub(amount) {
            Some(rest) => {
                self.currency = rest;
                true
            }
            None => false,
        }
    }
}

/// Everything stored per user: progress, inventory and titles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub progress: UserProgress,
    #[serde(default)]
    pub inventory: Inventory,
    #[serde(default)]
    pub titles: TitleBook,
}

impl UserRecord {
    pub fn new(user_id: UserId) -> Self {
        Self {
            progress: UserProgress::new(user_id),
            inventory: Inventory::default(),
            titles: TitleBook::default(),
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.progress.user_id
    }
}

/// Append-only history entry, one per engaged (or backfilled) day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementRecord {
    pub id: Uuid,
    pub user_id: UserId,
    pub experience: u64,
    pub currency: u64,
    /// Calendar day credited
    pub date: NaiveDate,
    /// When the entry was written
    pub timestamp: DateTime<Utc>,
}

impl EngagementRecord {
    pub fn new(user_id: UserId, reward: Reward, date: NaiveDate, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            experience: reward.experience,
            currency: reward.currency,
            date,
            timestamp,
        }
    }
}
