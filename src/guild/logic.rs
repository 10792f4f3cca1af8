//! Guild state transitions.
//!
//! Caller authorization (only the lord elects, dismisses and upgrades) is
//! the front end's job. These functions only guard the guild's own
//! invariants, and leave the guild untouched when they fail.

use super::types::{Guild, UpgradeCost};
use crate::core::balance::{DONATION_EXPERIENCE_MAX, DONATION_EXPERIENCE_MIN};
use crate::core::{EngineError, EngineResult, GroupId, Reason, UserId};
use chrono::{DateTime, Utc};
use rand::Rng;

/// Build a new guild after checking group and name uniqueness.
///
/// The founder and the first `max_co_founders` distinct co-founders become
/// members. No role is assigned.
pub fn found_guild<'a>(
    group: GroupId,
    name: &str,
    founder: &UserId,
    co_founders: &[UserId],
    max_co_founders: usize,
    existing: impl IntoIterator<Item = &'a Guild>,
    now: DateTime<Utc>,
) -> EngineResult<Guild> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EngineError::InvalidState(Reason::InvalidName));
    }

    for guild in existing {
        if guild.group == group {
            return Err(EngineError::InvalidState(Reason::GuildAlreadyExists));
        }
        if guild.name == name {
            return Err(EngineError::InvalidState(Reason::GuildNameTaken));
        }
    }

    let mut guild = Guild::new(group, name.to_string(), now);
    guild.members.insert(founder.clone());
    let mut added = 0;
    for co_founder in co_founders {
        if added == max_co_founders {
            break;
        }
        // Repeats and the founder do not count toward the cap.
        if guild.members.insert(co_founder.clone()) {
            added += 1;
        }
    }
    Ok(guild)
}

pub fn join(guild: &mut Guild, user: &UserId) -> EngineResult<()> {
    if !guild.members.insert(user.clone()) {
        return Err(EngineError::InvalidState(Reason::AlreadyMember));
    }
    Ok(())
}

/// Remove a member. A leaving lord leaves the seat empty.
pub fn leave(guild: &mut Guild, user: &UserId) -> EngineResult<()> {
    if !guild.members.remove(user) {
        return Err(EngineError::InvalidState(Reason::NotMember));
    }
    if guild.is_lord(user) {
        guild.lord = None;
    }
    guild.managers.remove(user);
    Ok(())
}

/// Replace the lord. The previous lord stays a member.
pub fn elect_lord(guild: &mut Guild, target: &UserId) -> EngineResult<()> {
    if !guild.is_member(target) {
        return Err(EngineError::InvalidState(Reason::NotMember));
    }
    guild.lord = Some(target.clone());
    Ok(())
}

pub fn elect_manager(guild: &mut Guild, target: &UserId) -> EngineResult<()> {
    if !guild.is_member(target) {
        return Err(EngineError::InvalidState(Reason::NotMember));
    }
    if !guild.managers.insert(target.clone()) {
        return Err(EngineError::InvalidState(Reason::AlreadyManager));
    }
    Ok(())
}

pub fn dismiss_manager(guild: &mut Guild, target: &UserId) -> EngineResult<()> {
    if !guild.managers.remove(target) {
        return Err(EngineError::InvalidState(Reason::NotManager));
    }
    Ok(())
}

/// Spend the pool to gain exactly one level. All or nothing.
pub fn upgrade(guild: &mut Guild) -> EngineResult<UpgradeCost> {
    let cost = guild
        .next_upgrade_cost()
        .ok_or(EngineError::AtCap(Reason::GuildAtMaxLevel))?;

    if guild.experience < cost.experience {
        return Err(EngineError::InsufficientResource(
            Reason::InsufficientGuildExperience,
        ));
    }
    if guild.currency < cost.currency {
        return Err(EngineError::InsufficientResource(
            Reason::InsufficientGuildCurrency,
        ));
    }

    guild.experience -= cost.experience;
    guild.currency -= cost.currency;
    guild.level += 1;
    Ok(cost)
}

/// Flat guild experience granted by any donation, whatever the amount.
pub fn donation_experience<R: Rng + ?Sized>(rng: &mut R) -> u64 {
    rng.gen_range(DONATION_EXPERIENCE_MIN..=DONATION_EXPERIENCE_MAX)
}

/// Move `amount` into the pool and add the flat experience gain.
/// Returns the experience gained. Debiting the donor is the caller's job.
pub fn donate<R: Rng + ?Sized>(guild: &mut Guild, amount: u64, rng: &mut R) -> EngineResult<u64> {
    if amount == 0 {
        return Err(EngineError::InvalidState(Reason::InvalidAmount));
    }
    let experience = donation_experience(rng);
    guild.currency = guild.currency.saturating_add(amount);
    guild.experience = guild.experience.saturating_add(experience);
    Ok(experience)
}
