//! Leaderboards, rank-of-self and engagement history.
//!
//! Read-only: nothing here takes a lock. A board is a snapshot of the store
//! at the moment it was read.

use super::Engine;
use crate::core::{EngineError, EngineResult, GroupId, Reason, UserId};
use crate::progress::EngagementRecord;
use crate::ranking::{
    guild_key, guild_self_rank, top_guilds, top_users, user_key, user_self_rank, Leaderboard,
    LeaderboardEntry, LeaderboardKind, MyRankings, Subject,
};
use crate::titles::title_def;
use std::collections::BTreeMap;

impl Engine {
    /// Top `limit` entries of a board (`0` means the configured default).
    pub fn get_leaderboard(&self, kind: LeaderboardKind, limit: usize) -> EngineResult<Leaderboard> {
        let limit = if limit == 0 {
            self.config.leaderboard_limit
        } else {
            limit
        };

        let entries = if kind.is_guild_board() {
            top_guilds(kind, self.read("guilds", self.store.guilds())?, limit)
                .into_iter()
                .enumerate()
                .map(|(index, guild)| {
                    let (primary, secondary) = guild_key(kind, &guild);
                    LeaderboardEntry {
                        position: index + 1,
                        primary,
                        secondary: (kind == LeaderboardKind::GuildLevel).then_some(secondary),
                        subject: Subject::Guild {
                            group: guild.group,
                            name: guild.name,
                        },
                    }
                })
                .collect()
        } else {
            let records = self.read("users", self.store.users())?;
            let titles: BTreeMap<UserId, Option<String>> = records
                .iter()
                .map(|r| {
                    let title = r.titles.active().map(|id| title_def(id).name.to_string());
                    (r.user_id().clone(), title)
                })
                .collect();
            let users = records.into_iter().map(|r| r.progress).collect();

            top_users(kind, users, limit)
                .into_iter()
                .enumerate()
                .map(|(index, progress)| {
                    let (primary, secondary) = user_key(kind, &progress);
                    LeaderboardEntry {
                        position: index + 1,
                        primary,
                        secondary: (kind == LeaderboardKind::Level).then_some(secondary),
                        subject: Subject::User {
                            name: self.display_name(&progress.user_id),
                            title: titles.get(&progress.user_id).cloned().flatten(),
                            id: progress.user_id,
                        },
                    }
                })
                .collect()
        };

        Ok(Leaderboard { kind, entries })
    }

    /// Position of `user` on a board.
    ///
    /// On a guild board this is the rank of the user's own guild.
    pub fn get_self_rank(&self, kind: LeaderboardKind, user: &UserId) -> EngineResult<usize> {
        let record = self.require_user(user)?;
        if kind.is_guild_board() {
            let group = self
                .guild_of(user, record.progress.guild.as_ref())?
                .ok_or(EngineError::NotFound(Reason::NotInGuild))?;
            return self.guild_rank(kind, &group);
        }

        let my_latest = self
            .read("latest_engagement", self.store.latest_engagement(user))?
            .map(|e| e.timestamp);
        let times = self.read("latest_engagement_times", self.store.latest_engagement_times())?;
        let users = self.read("users", self.store.users())?;
        Ok(user_self_rank(
            kind,
            &record.progress,
            my_latest,
            users
                .iter()
                .map(|r| (&r.progress, times.get(r.user_id()).copied())),
        ))
    }

    /// Position of the guild of `group` on a guild board.
    pub fn guild_rank(&self, kind: LeaderboardKind, group: &GroupId) -> EngineResult<usize> {
        if !kind.is_guild_board() {
            return Err(EngineError::InvalidState(Reason::InvalidBoard));
        }
        let guild = self.require_guild(group)?;
        let guilds = self.read("guilds", self.store.guilds())?;
        Ok(guild_self_rank(kind, &guild, &guilds))
    }

    /// Rank on the lifetime, streak and level boards in one call.
    pub fn my_rankings(&self, user: &UserId) -> EngineResult<MyRankings> {
        Ok(MyRankings {
            lifetime: self.get_self_rank(LeaderboardKind::Lifetime, user)?,
            streak: self.get_self_rank(LeaderboardKind::Streak, user)?,
            level: self.get_self_rank(LeaderboardKind::Level, user)?,
        })
    }

    /// Every history entry of a user, oldest first.
    pub fn engagement_history(&self, user: &UserId) -> EngineResult<Vec<EngagementRecord>> {
        self.read("engagements", self.store.engagements_for(user))
    }
}
