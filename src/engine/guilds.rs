//! Guild operations.
//!
//! Lord-only rights (elections, dismissal, upgrade) are checked here against
//! the acting user. Guild records are locked as a whole; member user records
//! are locked after the guild whenever their `guild` field changes.

use super::locks::LockKey;
use super::Engine;
use crate::core::progression::GuildBuff;
use crate::core::{EngineError, EngineResult, GroupId, Reason, UserId};
use crate::guild::{self, Guild, UpgradeCost};
use crate::store::WriteBatch;
use serde::Serialize;
use tracing::info;

/// A guild plus what a front end needs to render it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuildView {
    pub guild: Guild,
    pub lord_name: Option<String>,
    pub manager_names: Vec<String>,
    pub buff: Option<GuildBuff>,
    pub next_upgrade_cost: Option<UpgradeCost>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DonationReceipt {
    pub group: GroupId,
    pub amount: u64,
    pub experience_gained: u64,
    pub guild_currency: u64,
    pub guild_experience: u64,
    pub donor_currency_left: u64,
}

fn require_lord(guild: &Guild, actor: &UserId) -> EngineResult<()> {
    if guild.is_lord(actor) {
        Ok(())
    } else {
        Err(EngineError::InvalidState(Reason::NotLord))
    }
}

impl Engine {
    /// Point each listed user's `guild` field at `group` when `joined`,
    /// otherwise clear it if it points there. Users without a record are
    /// skipped.
    fn mirror_membership(
        &self,
        batch: &mut WriteBatch,
        users: impl IntoIterator<Item = UserId>,
        group: &GroupId,
        joined: bool,
    ) -> EngineResult<()> {
        for user in users {
            let Some(mut record) = self.read("user", self.store.user(&user))? else {
                continue;
            };
            if joined {
                record.progress.guild = Some(group.clone());
            } else if record.progress.guild.as_ref() == Some(group) {
                record.progress.guild = None;
            } else {
                continue;
            }
            batch.put_user(record);
        }
        Ok(())
    }

    /// Found the guild of `group`. No role is assigned; the founder claims
    /// the lord seat with a separate election.
    pub fn create_guild(
        &self,
        group: &GroupId,
        name: &str,
        founder: &UserId,
        co_founders: &[UserId],
    ) -> EngineResult<Guild> {
        let mut keys = vec![
            LockKey::GuildRegistry,
            LockKey::Guild(group.clone()),
            LockKey::User(founder.clone()),
        ];
        keys.extend(co_founders.iter().cloned().map(LockKey::User));

        self.locks.with_locked(keys, || {
            let existing = self.read("guilds", self.store.guilds())?;
            let guild = guild::found_guild(
                group.clone(),
                name,
                founder,
                co_founders,
                self.config.max_co_founders,
                &existing,
                self.now(),
            )?;

            let mut batch = WriteBatch::new();
            self.mirror_membership(&mut batch, guild.members.iter().cloned(), group, true)?;
            batch.put_guild(guild.clone());
            self.commit("create_guild", batch)?;

            info!(group = %group, name = %guild.name, members = guild.members.len(), "guild founded");
            Ok(guild)
        })
    }

    pub fn get_guild(&self, group: &GroupId) -> EngineResult<GuildView> {
        let guild = self.require_guild(group)?;
        Ok(GuildView {
            lord_name: guild.lord.as_ref().map(|lord| self.display_name(lord)),
            manager_names: guild.managers.iter().map(|m| self.display_name(m)).collect(),
            buff: guild.buff(),
            next_upgrade_cost: guild.next_upgrade_cost(),
            guild,
        })
    }

    pub fn join_guild(&self, group: &GroupId, user: &UserId) -> EngineResult<Guild> {
        let keys = [LockKey::Guild(group.clone()), LockKey::User(user.clone())];
        self.locks.with_locked(keys, || {
            let mut guild = self.require_guild(group)?;
            guild::join(&mut guild, user)?;

            let mut batch = WriteBatch::new();
            self.mirror_membership(&mut batch, [user.clone()], group, true)?;
            batch.put_guild(guild.clone());
            self.commit("join_guild", batch)?;

            info!(group = %group, user = %user, members = guild.members.len(), "joined guild");
            Ok(guild)
        })
    }

    pub fn leave_guild(&self, group: &GroupId, user: &UserId) -> EngineResult<Guild> {
        let keys = [LockKey::Guild(group.clone()), LockKey::User(user.clone())];
        self.locks.with_locked(keys, || {
            let mut guild = self.require_guild(group)?;
            let was_lord = guild.is_lord(user);
            guild::leave(&mut guild, user)?;

            let mut batch = WriteBatch::new();
            self.mirror_membership(&mut batch, [user.clone()], group, false)?;
            batch.put_guild(guild.clone());
            self.commit("leave_guild", batch)?;

            info!(group = %group, user = %user, was_lord, "left guild");
            Ok(guild)
        })
    }

    /// Spend the pool on one level. Lord only.
    pub fn upgrade_guild(&self, group: &GroupId, actor: &UserId) -> EngineResult<Guild> {
        self.locks.with_locked([LockKey::Guild(group.clone())], || {
            let mut guild = self.require_guild(group)?;
            require_lord(&guild, actor)?;
            let cost = guild::upgrade(&mut guild)?;

            let mut batch = WriteBatch::new();
            batch.put_guild(guild.clone());
            self.commit("upgrade_guild", batch)?;

            info!(
                group = %group,
                level = guild.level,
                experience_spent = cost.experience,
                currency_spent = cost.currency,
                "guild upgraded"
            );
            Ok(guild)
        })
    }

    /// Move personal currency into the guild pool. Members only.
    pub fn donate_to_guild(&self, group: &GroupId, user: &UserId, amount: u64) -> EngineResult<DonationReceipt> {
        if amount == 0 {
            return Err(EngineError::InvalidState(Reason::InvalidAmount));
        }
        let keys = [LockKey::Guild(group.clone()), LockKey::User(user.clone())];
        self.locks.with_locked(keys, || {
            let mut guild = self.require_guild(group)?;
            if !guild.is_member(user) {
                return Err(EngineError::InvalidState(Reason::NotMember));
            }
            let mut record = self.require_user(user)?;
            if !record.progress.spend(amount) {
                return Err(EngineError::InsufficientResource(Reason::InsufficientCurrency));
            }
            let mut rng = self.operation_rng();
            let experience_gained = guild::donate(&mut guild, amount, &mut rng)?;

            let receipt = DonationReceipt {
                group: group.clone(),
                amount,
                experience_gained,
                guild_currency: guild.currency,
                guild_experience: guild.experience,
                donor_currency_left: record.progress.currency,
            };
            let mut batch = WriteBatch::new();
            batch.put_guild(guild).put_user(record);
            self.commit("donate", batch)?;

            info!(group = %group, user = %user, amount, experience_gained, "donation received");
            Ok(receipt)
        })
    }

    /// Seat `target` as lord. While the seat is empty any member may claim
    /// or assign it; afterwards only the sitting lord can.
    pub fn elect_lord(&self, group: &GroupId, actor: &UserId, target: &UserId) -> EngineResult<Guild> {
        self.locks.with_locked([LockKey::Guild(group.clone())], || {
            let mut guild = self.require_guild(group)?;
            match guild.lord {
                Some(_) => require_lord(&guild, actor)?,
                None if !guild.is_member(actor) => {
                    return Err(EngineError::InvalidState(Reason::NotMember))
                }
                None => {}
            }
            guild::elect_lord(&mut guild, target)?;

            let mut batch = WriteBatch::new();
            batch.put_guild(guild.clone());
            self.commit("elect_lord", batch)?;

            info!(group = %group, lord = %target, "lord elected");
            Ok(guild)
        })
    }

    pub fn elect_manager(&self, group: &GroupId, actor: &UserId, target: &UserId) -> EngineResult<Guild> {
        self.locks.with_locked([LockKey::Guild(group.clone())], || {
            let mut guild = self.require_guild(group)?;
            require_lord(&guild, actor)?;
            guild::elect_manager(&mut guild, target)?;

            let mut batch = WriteBatch::new();
            batch.put_guild(guild.clone());
            self.commit("elect_manager", batch)?;

            info!(group = %group, manager = %target, "manager elected");
            Ok(guild)
        })
    }

    pub fn dismiss_manager(&self, group: &GroupId, actor: &UserId, target: &UserId) -> EngineResult<Guild> {
        self.locks.with_locked([LockKey::Guild(group.clone())], || {
            let mut guild = self.require_guild(group)?;
            require_lord(&guild, actor)?;
            guild::dismiss_manager(&mut guild, target)?;

            let mut batch = WriteBatch::new();
            batch.put_guild(guild.clone());
            self.commit("dismiss_manager", batch)?;

            info!(group = %group, manager = %target, "manager dismissed");
            Ok(guild)
        })
    }

    /// Delete the guild and everything in it. Returns the deleted record.
    pub fn destroy_guild(&self, group: &GroupId) -> EngineResult<Guild> {
        let keys = [LockKey::GuildRegistry, LockKey::Guild(group.clone())];
        self.locks.with_locked(keys, || {
            let guild = self.require_guild(group)?;
            let member_keys = guild.members.iter().cloned().map(LockKey::User);

            self.locks.with_locked(member_keys, || {
                let mut batch = WriteBatch::new();
                self.mirror_membership(&mut batch, guild.members.iter().cloned(), group, false)?;
                batch.delete_guild(group.clone());
                self.commit("destroy_guild", batch)?;

                info!(group = %group, name = %guild.name, members = guild.members.len(), "guild destroyed");
                Ok(guild.clone())
            })
        })
    }
}
