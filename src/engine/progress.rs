//! Personal operations: engagement, backfill, shop, inventory and titles.

use super::locks::LockKey;
use super::Engine;
use crate::backfill::{apply_backfill, plan_backfill, BackfillOutcome};
use crate::core::progression::{engagement_reward, GuildBuff};
use crate::core::{EngineError, EngineResult, GroupId, Reason, Reward, UserId};
use crate::inventory::{Inventory, ItemKind, ShopItem};
use crate::progress::{EngagementRecord, UserProgress, UserRecord};
use crate::store::WriteBatch;
use crate::streak::{next_streak, StreakOutcome};
use crate::titles::{self, OwnedTitle, TitleDef, TitleId, ALL_TITLES};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

/// Result of a successful daily engagement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngagementOutcome {
    pub user_id: UserId,
    pub date: NaiveDate,
    pub streak_days: u32,
    /// True when a previous streak was lost before this engagement
    pub streak_broken: bool,
    pub reward: Reward,
    pub guild_buffed: bool,
    pub level: u32,
    pub leveled_up: bool,
    pub experience: u64,
    pub next_level_threshold: u64,
    pub currency: u64,
    pub total_days: u32,
    pub titles_granted: Vec<TitleId>,
    pub titles_revoked: Vec<TitleId>,
}

/// Result of a shop purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseReceipt {
    pub kind: ItemKind,
    pub quantity: u32,
    pub total_price: u64,
    pub currency_left: u64,
    /// Quantity held after the purchase
    pub held: u32,
}

impl Engine {
    /// Buff of the guild attached to `group`, if any.
    fn group_buff(&self, group: Option<&GroupId>) -> EngineResult<Option<GuildBuff>> {
        let Some(group) = group else {
            return Ok(None);
        };
        Ok(self.read("guild", self.store.guild(group))?.and_then(|guild| guild.buff()))
    }

    /// Daily engagement: streak, rewards, level, history and titles in one go.
    ///
    /// `group` is the context the engagement happens in; its guild, if any,
    /// buffs the rewards.
    pub fn perform_daily_engagement(
        &self,
        user: &UserId,
        group: Option<&GroupId>,
    ) -> EngineResult<EngagementOutcome> {
        self.locks.with_locked([LockKey::User(user.clone())], || {
            let today = self.today();
            let now = self.now();
            let mut record = match self.read("user", self.store.user(user))? {
                Some(record) => record,
                None => {
                    let mut record = UserRecord::new(user.clone());
                    record.progress.guild = self.guild_of(user, None)?;
                    record
                }
            };

            let previous = &record.progress;
            let outcome = next_streak(previous.last_engagement_date, previous.streak_days, today);
            let streak_days = outcome
                .streak_days()
                .ok_or(EngineError::AlreadyDone(Reason::AlreadyEngagedToday))?;
            let streak_broken = outcome == StreakOutcome::Broken;

            let buff = self.group_buff(group)?;
            let mut rng = self.operation_rng();
            let reward = engagement_reward(&mut rng, streak_days, record.progress.level, buff.as_ref());
            debug!(
                user = %user,
                streak_days,
                experience = reward.experience,
                currency = reward.currency,
                buffed = buff.is_some(),
                "drew engagement reward"
            );

            let previous_total = record.progress.total_days;
            let leveled_up = record.progress.credit_day(reward, today, streak_days);
            let changes = titles::apply_engagement(
                &mut record.titles,
                previous_total,
                record.progress.total_days,
                streak_days,
                now,
            );

            let entry = EngagementRecord::new(user.clone(), reward, today, now);
            let progress = record.progress.clone();
            let mut batch = WriteBatch::new();
            batch.put_user(record).append_engagements([entry]);
            self.commit("daily_engagement", batch)?;

            info!(
                user = %user,
                streak_days,
                level = progress.level,
                leveled_up,
                titles_granted = changes.granted.len(),
                titles_revoked = changes.revoked.len(),
                "engagement recorded"
            );

            Ok(EngagementOutcome {
                user_id: user.clone(),
                date: today,
                streak_days,
                streak_broken,
                reward,
                guild_buffed: buff.is_some(),
                level: progress.level,
                leveled_up,
                experience: progress.experience,
                next_level_threshold: progress.next_level_threshold,
                currency: progress.currency,
                total_days: progress.total_days,
                titles_granted: changes.granted,
                titles_revoked: changes.revoked,
            })
        })
    }

    pub fn get_progress(&self, user: &UserId) -> EngineResult<UserProgress> {
        Ok(self.require_user(user)?.progress)
    }

    /// Held items. A user with no record holds nothing.
    pub fn get_inventory(&self, user: &UserId) -> EngineResult<Inventory> {
        Ok(self
            .store
            .user(user)?
            .map(|record| record.inventory)
            .unwrap_or_default())
    }

    /// Every item the shop sells, in kind order.
    pub fn shop_catalog(&self) -> Vec<ShopItem> {
        self.config
            .shop
            .iter()
            .map(|(kind, price)| ShopItem {
                kind: *kind,
                price: *price,
                description: kind.description(),
            })
            .collect()
    }

    pub fn purchase_item(&self, user: &UserId, kind: ItemKind, quantity: u32) -> EngineResult<PurchaseReceipt> {
        if quantity == 0 {
            return Err(EngineError::InvalidState(Reason::InvalidQuantity));
        }
        let price = self
            .config
            .price_of(kind)
            .ok_or(EngineError::NotFound(Reason::UnknownItem))?;
        let total_price = price.saturating_mul(u64::from(quantity));

        self.locks.with_locked([LockKey::User(user.clone())], || {
            let mut record = self.require_user(user)?;
            if !record.progress.spend(total_price) {
                return Err(EngineError::InsufficientResource(Reason::InsufficientCurrency));
            }
            record.inventory.add(kind, quantity);

            let receipt = PurchaseReceipt {
                kind,
                quantity,
                total_price,
                currency_left: record.progress.currency,
                held: record.inventory.quantity(kind),
            };
            let mut batch = WriteBatch::new();
            batch.put_user(record);
            self.commit("purchase", batch)?;

            info!(user = %user, item = kind.slug(), quantity, total_price, "purchase completed");
            Ok(receipt)
        })
    }

    /// Spend `days` backfill tokens to credit the most recent missed days.
    pub fn perform_backfill(
        &self,
        user: &UserId,
        days: u32,
        group: Option<&GroupId>,
    ) -> EngineResult<BackfillOutcome> {
        self.locks.with_locked([LockKey::User(user.clone())], || {
            let record = self.read("user", self.store.user(user))?;
            let plan = plan_backfill(
                record.as_ref(),
                days,
                self.today(),
                self.config.backfill_window_days,
            )?;
            let mut record = record.ok_or(EngineError::NotFound(Reason::UserNotFound))?;

            let buff = self.group_buff(group)?;
            let mut rng = self.operation_rng();
            let (outcome, history) = apply_backfill(&mut record, &plan, buff.as_ref(), &mut rng, self.now())?;

            let mut batch = WriteBatch::new();
            batch.put_user(record).append_engagements(history);
            self.commit("backfill", batch)?;

            info!(
                user = %user,
                days = outcome.tokens_spent,
                experience = outcome.experience_granted,
                currency = outcome.currency_granted,
                level = outcome.level,
                "backfill applied"
            );
            Ok(outcome)
        })
    }

    // ========================================================================
    // Titles
    // ========================================================================

    /// Static catalog of every title that can be earned.
    pub fn grantable_titles(&self) -> &'static [TitleDef] {
        ALL_TITLES
    }

    pub fn get_titles(&self, user: &UserId) -> EngineResult<Vec<OwnedTitle>> {
        Ok(self
            .store
            .user(user)?
            .map(|record| record.titles.titles().to_vec())
            .unwrap_or_default())
    }

    pub fn active_title(&self, user: &UserId) -> EngineResult<Option<TitleId>> {
        Ok(self
            .store
            .user(user)?
            .and_then(|record| record.titles.active()))
    }

    /// Make one held title the only active one.
    pub fn activate_title(&self, user: &UserId, title: TitleId) -> EngineResult<()> {
        self.locks.with_locked([LockKey::User(user.clone())], || {
            let mut record = self.require_user(user)?;
            if !record.titles.activate(title) {
                return Err(EngineError::NotFound(Reason::TitleNotOwned));
            }
            let mut batch = WriteBatch::new();
            batch.put_user(record);
            self.commit("activate_title", batch)?;
            info!(user = %user, title = title.slug(), "title activated");
            Ok(())
        })
    }

    pub fn deactivate_all_titles(&self, user: &UserId) -> EngineResult<()> {
        self.locks.with_locked([LockKey::User(user.clone())], || {
            let mut record = self.require_user(user)?;
            record.titles.deactivate_all();
            let mut batch = WriteBatch::new();
            batch.put_user(record);
            self.commit("deactivate_titles", batch)?;
            debug!(user = %user, "titles deactivated");
            Ok(())
        })
    }
}
