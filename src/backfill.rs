//! Backfill: spend tokens to credit missed days inside a short window.
//!
//! Validation (`plan_backfill`) is separate from mutation (`apply_backfill`)
//! so a rejected request never touches the record.

use crate::core::progression::{backfill_reward, GuildBuff};
use crate::core::{EngineError, EngineResult, Reason};
use crate::inventory::ItemKind;
use crate::progress::{EngagementRecord, UserRecord};
use chrono::{DateTime, Days, NaiveDate, Utc};
use rand::Rng;
use serde::Serialize;

/// Validated backfill: the dates to credit, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackfillPlan {
    pub dates: Vec<NaiveDate>,
}

impl BackfillPlan {
    pub fn token_cost(&self) -> u32 {
        self.dates.len() as u32
    }
}

/// Result of a completed backfill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackfillOutcome {
    pub dates: Vec<NaiveDate>,
    pub experience_granted: u64,
    pub currency_granted: u64,
    pub tokens_spent: u32,
    pub level: u32,
    pub leveled_up: bool,
}

/// Days in the window before `today` that come after `last`, most recent first.
pub fn gap_days(last: NaiveDate, today: NaiveDate, window_days: u32) -> Vec<NaiveDate> {
    (1..=u64::from(window_days))
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .filter(|date| *date > last)
        .collect()
}

/// Check tokens, history and gap days, in that order.
///
/// The `days` most recent gap days are chosen so the last credited day is
/// as close to today as possible.
pub fn plan_backfill(
    record: Option<&UserRecord>,
    days: u32,
    today: NaiveDate,
    window_days: u32,
) -> EngineResult<BackfillPlan> {
    if days == 0 {
        return Err(EngineError::InvalidState(Reason::InvalidQuantity));
    }

    let tokens = record
        .map(|r| r.inventory.quantity(ItemKind::BackfillToken))
        .unwrap_or(0);
    if tokens < days {
        return Err(EngineError::InsufficientResource(Reason::InsufficientTokens));
    }

    let last = record
        .and_then(|r| r.progress.last_engagement_date)
        .ok_or(EngineError::InvalidState(Reason::NoEngagementHistory))?;

    let candidates = gap_days(last, today, window_days);
    if candidates.len() < days as usize {
        return Err(EngineError::InvalidState(Reason::NotEnoughGapDays));
    }

    let mut dates: Vec<NaiveDate> = candidates.into_iter().take(days as usize).collect();
    dates.sort();
    Ok(BackfillPlan { dates })
}

/// Consume the tokens, then credit every planned day, oldest first.
///
/// Each day uses the minimum-tier reward at the level reached so far and
/// forces the streak to 1. Title rules are not evaluated. A record that no
/// longer holds the planned tokens is left untouched.
pub fn apply_backfill<R: Rng + ?Sized>(
    record: &mut UserRecord,
    plan: &BackfillPlan,
    buff: Option<&GuildBuff>,
    rng: &mut R,
    now: DateTime<Utc>,
) -> EngineResult<(BackfillOutcome, Vec<EngagementRecord>)> {
    if !record
        .inventory
        .remove(ItemKind::BackfillToken, plan.token_cost())
    {
        return Err(EngineError::InsufficientResource(Reason::InsufficientTokens));
    }

    let starting_level = record.progress.level;
    let mut history = Vec::with_capacity(plan.dates.len());
    let mut experience_granted = 0;
    let mut currency_granted = 0;

    for date in &plan.dates {
        let reward = backfill_reward(rng, record.progress.level, buff);
        record.progress.credit_day(reward, *date, 1);
        experience_granted += reward.experience;
        currency_granted += reward.currency;
        history.push(EngagementRecord::new(
            record.progress.user_id.clone(),
            reward,
            *date,
            now,
        ));
    }

    let outcome = BackfillOutcome {
        dates: plan.dates.clone(),
        experience_granted,
        currency_granted,
        tokens_spent: plan.token_cost(),
        level: record.progress.level,
        leveled_up: record.progress.level > starting_level,
    };
    Ok((outcome, history))
}
