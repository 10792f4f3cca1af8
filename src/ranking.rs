//! Leaderboards and rank-of-self.
//!
//! Top-N boards are a plain sort. Rank-of-self does not need the sorted
//! list: it counts who is strictly ahead on the primary key, then breaks
//! ties on the most recent engagement timestamp.

use crate::core::{GroupId, UserId};
use crate::guild::Guild;
use crate::progress::UserProgress;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Board kinds
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardKind {
    Streak,
    Level,
    Lifetime,
    GuildLevel,
    GuildCoins,
}

impl LeaderboardKind {
    pub const ALL: [LeaderboardKind; 5] = [
        LeaderboardKind::Streak,
        LeaderboardKind::Level,
        LeaderboardKind::Lifetime,
        LeaderboardKind::GuildLevel,
        LeaderboardKind::GuildCoins,
    ];

    pub fn is_guild_board(&self) -> bool {
        matches!(self, LeaderboardKind::GuildLevel | LeaderboardKind::GuildCoins)
    }

    pub fn slug(&self) -> &'static str {
        match self {
            LeaderboardKind::Streak => "streak",
            LeaderboardKind::Level => "level",
            LeaderboardKind::Lifetime => "lifetime",
            LeaderboardKind::GuildLevel => "guild_level",
            LeaderboardKind::GuildCoins => "guild_coins",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            LeaderboardKind::Streak => "Streak Leaderboard",
            LeaderboardKind::Level => "Level Leaderboard",
            LeaderboardKind::Lifetime => "Lifetime Engagement Leaderboard",
            LeaderboardKind::GuildLevel => "Guild Level Leaderboard",
            LeaderboardKind::GuildCoins => "Guild Coin Leaderboard",
        }
    }
}

impl fmt::Display for LeaderboardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for LeaderboardKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LeaderboardKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == s)
            .ok_or(())
    }
}

// ============================================================================
// Entries
// ============================================================================

/// Who an entry is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Subject {
    User {
        id: UserId,
        name: String,
        title: Option<String>,
    },
    Guild {
        group: GroupId,
        name: String,
    },
}

impl Subject {
    pub fn name(&self) -> &str {
        match self {
            Subject::User { name, .. } | Subject::Guild { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    /// 1-based
    pub position: usize,
    pub subject: Subject,
    /// Value of the primary sort key
    pub primary: u64,
    /// Secondary figure shown next to it (experience on level boards)
    pub secondary: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Leaderboard {
    pub kind: LeaderboardKind,
    pub entries: Vec<LeaderboardEntry>,
}

/// A user's position on the three personal boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MyRankings {
    pub lifetime: usize,
    pub streak: usize,
    pub level: usize,
}

// ============================================================================
// Keys and ordering
// ============================================================================

/// Primary key of a user on a personal board. Compared lexicographically.
pub fn user_key(kind: LeaderboardKind, progress: &UserProgress) -> (u64, u64) {
    match kind {
        LeaderboardKind::Streak => (u64::from(progress.streak_days), 0),
        LeaderboardKind::Lifetime => (u64::from(progress.total_days), 0),
        LeaderboardKind::Level => (u64::from(progress.level), progress.experience),
        LeaderboardKind::GuildLevel | LeaderboardKind::GuildCoins => (0, 0),
    }
}

/// Primary key of a guild on a guild board.
pub fn guild_key(kind: LeaderboardKind, guild: &Guild) -> (u64, u64) {
    match kind {
        LeaderboardKind::GuildLevel => (u64::from(guild.level), guild.experience),
        LeaderboardKind::GuildCoins => (guild.currency, 0),
        _ => (0, 0),
    }
}

/// Earlier dates first, users who never engaged last.
fn earlier_date_first(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Board order for users: key descending, then earliest last engagement on
/// the day-count boards, then id for a stable result.
pub fn compare_users(kind: LeaderboardKind, a: &UserProgress, b: &UserProgress) -> Ordering {
    let by_key = user_key(kind, b).cmp(&user_key(kind, a));
    let by_date = match kind {
        LeaderboardKind::Streak | LeaderboardKind::Lifetime => {
            earlier_date_first(a.last_engagement_date, b.last_engagement_date)
        }
        _ => Ordering::Equal,
    };
    by_key.then(by_date).then_with(|| a.user_id.cmp(&b.user_id))
}

pub fn compare_guilds(kind: LeaderboardKind, a: &Guild, b: &Guild) -> Ordering {
    guild_key(kind, b)
        .cmp(&guild_key(kind, a))
        .then(a.created_at.cmp(&b.created_at))
        .then_with(|| a.group.cmp(&b.group))
}

/// Sort users for `kind` and keep the first `limit`.
pub fn top_users(kind: LeaderboardKind, mut users: Vec<UserProgress>, limit: usize) -> Vec<UserProgress> {
    users.sort_by(|a, b| compare_users(kind, a, b));
    users.truncate(limit);
    users
}

pub fn top_guilds(kind: LeaderboardKind, mut guilds: Vec<Guild>, limit: usize) -> Vec<Guild> {
    guilds.sort_by(|a, b| compare_guilds(kind, a, b));
    guilds.truncate(limit);
    guilds
}

// ============================================================================
// Rank of self
// ============================================================================

/// True if `other` engaged most recently before `mine`. A user with no
/// history is treated as the latest possible.
fn engaged_earlier(other: Option<DateTime<Utc>>, mine: Option<DateTime<Utc>>) -> bool {
    match (other, mine) {
        (Some(other), Some(mine)) => other < mine,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

/// Rank of `me` among `everyone` (which may include `me`).
///
/// Each competitor comes with the timestamp of its most recent engagement
/// entry. Rank is 1 + users strictly ahead on the key + tied users whose
/// latest entry is strictly earlier than mine.
pub fn user_self_rank<'a>(
    kind: LeaderboardKind,
    me: &UserProgress,
    my_latest: Option<DateTime<Utc>>,
    everyone: impl IntoIterator<Item = (&'a UserProgress, Option<DateTime<Utc>>)>,
) -> usize {
    let my_key = user_key(kind, me);
    let mut ahead = 0;
    let mut tied_earlier = 0;

    for (other, latest) in everyone {
        if other.user_id == me.user_id {
            continue;
        }
        match user_key(kind, other).cmp(&my_key) {
            Ordering::Greater => ahead += 1,
            Ordering::Equal if engaged_earlier(latest, my_latest) => tied_earlier += 1,
            _ => {}
        }
    }
    1 + ahead + tied_earlier
}

/// Rank of `me` among `everyone`. Ties go to the older guild.
pub fn guild_self_rank<'a>(
    kind: LeaderboardKind,
    me: &Guild,
    everyone: impl IntoIterator<Item = &'a Guild>,
) -> usize {
    let my_key = guild_key(kind, me);
    1 + everyone
        .into_iter()
        .filter(|other| other.group != me.group)
        .filter(|other| match guild_key(kind, other).cmp(&my_key) {
            Ordering::Greater => true,
            Ordering::Equal => other.created_at < me.created_at,
            Ordering::Less => false,
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
    }

    fn user(id: &str, streak: u32, total: u32, level: u32, exp: u64) -> UserProgress {
        let mut p = UserProgress::new(UserId::from(id));
        p.streak_days = streak;
        p.total_days = total;
        p.level = level;
        p.experience = exp;
        p.last_engagement_date = Some(base_time().date_naive());
        p
    }

    fn guild(group: &str, level: u32, exp: u64, coins: u64, age_minutes: i64) -> Guild {
        let mut g = Guild::new(
            GroupId::from(group),
            format!("Guild {group}"),
            base_time() - Duration::minutes(age_minutes),
        );
        g.level = level;
        g.experience = exp;
        g.currency = coins;
        g
    }

    #[test]
    fn test_kind_slug_round_trip() {
        for kind in LeaderboardKind::ALL {
            assert_eq!(kind.slug().parse::<LeaderboardKind>(), Ok(kind));
        }
        assert!("weekly".parse::<LeaderboardKind>().is_err());
        assert!(LeaderboardKind::GuildCoins.is_guild_board());
        assert!(!LeaderboardKind::Streak.is_guild_board());
    }

    #[test]
    fn test_self_rank_tied_streaks_by_latest_timestamp() {
        let a = user("a", 10, 10, 1, 0);
        let b = user("b", 10, 10, 1, 0);
        let c = user("c", 5, 5, 1, 0);
        let t_a = Some(base_time());
        let t_b = Some(base_time() + Duration::minutes(5));
        let t_c = Some(base_time() - Duration::minutes(30));
        let all = [(&a, t_a), (&b, t_b), (&c, t_c)];

        assert_eq!(user_self_rank(LeaderboardKind::Streak, &a, t_a, all), 1);
        assert_eq!(user_self_rank(LeaderboardKind::Streak, &b, t_b, all), 2);
        assert_eq!(user_self_rank(LeaderboardKind::Streak, &c, t_c, all), 3);
    }

    #[test]
    fn test_self_rank_level_uses_experience_as_second_key() {
        let a = user("a", 0, 0, 3, 500);
        let b = user("b", 0, 0, 3, 700);
        let c = user("c", 0, 0, 4, 0);
        let all = [(&a, None), (&b, None), (&c, None)];
        assert_eq!(user_self_rank(LeaderboardKind::Level, &c, None, all), 1);
        assert_eq!(user_self_rank(LeaderboardKind::Level, &b, None, all), 2);
        assert_eq!(user_self_rank(LeaderboardKind::Level, &a, None, all), 3);
    }

    #[test]
    fn test_self_rank_without_history_yields_to_tied_users() {
        let a = user("a", 2, 2, 1, 0);
        let b = user("b", 2, 2, 1, 0);
        let all = [(&a, Some(base_time())), (&b, None)];
        assert_eq!(user_self_rank(LeaderboardKind::Lifetime, &b, None, all), 2);
        assert_eq!(user_self_rank(LeaderboardKind::Lifetime, &a, Some(base_time()), all), 1);
    }

    #[test]
    fn test_top_streak_earlier_date_wins_tie() {
        let mut early = user("z", 4, 4, 1, 0);
        early.last_engagement_date = Some(NaiveDate::from_ymd_opt(2024, 4, 28).unwrap());
        let late = user("a", 4, 4, 1, 0);
        let low = user("m", 1, 9, 1, 0);
        let mut never = UserProgress::new(UserId::from("n"));
        never.streak_days = 4;

        let top = top_users(LeaderboardKind::Streak, vec![late, low, never, early], 10);
        let ids: Vec<&str> = top.iter().map(|p| p.user_id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a", "n", "m"]);
    }

    #[test]
    fn test_top_users_truncates() {
        let users: Vec<UserProgress> = (0..15).map(|i| user(&format!("u{i:02}"), 0, i, 1, 0)).collect();
        let top = top_users(LeaderboardKind::Lifetime, users, 10);
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].total_days, 14);
        assert_eq!(top[9].total_days, 5);
    }

    #[test]
    fn test_top_level_orders_by_level_then_experience() {
        let users = vec![user("a", 0, 0, 2, 300), user("b", 0, 0, 3, 10), user("c", 0, 0, 2, 350)];
        let top = top_users(LeaderboardKind::Level, users, 10);
        let ids: Vec<&str> = top.iter().map(|p| p.user_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_guild_boards() {
        let guilds = vec![guild("g1", 2, 100, 50, 0), guild("g2", 3, 0, 10, 0), guild("g3", 2, 500, 900, 0)];
        let by_level = top_guilds(LeaderboardKind::GuildLevel, guilds.clone(), 10);
        let groups: Vec<&str> = by_level.iter().map(|g| g.group.as_str()).collect();
        assert_eq!(groups, vec!["g2", "g3", "g1"]);

        let by_coins = top_guilds(LeaderboardKind::GuildCoins, guilds, 2);
        let groups: Vec<&str> = by_coins.iter().map(|g| g.group.as_str()).collect();
        assert_eq!(groups, vec!["g3", "g1"]);
    }

    #[test]
    fn test_guild_self_rank_ties_go_to_older_guild() {
        let old = guild("old", 2, 100, 0, 60);
        let young = guild("young", 2, 100, 0, 0);
        let top = guild("top", 4, 0, 0, 0);
        let all = [old.clone(), young.clone(), top.clone()];
        assert_eq!(guild_self_rank(LeaderboardKind::GuildLevel, &top, &all), 1);
        assert_eq!(guild_self_rank(LeaderboardKind::GuildLevel, &old, &all), 2);
        assert_eq!(guild_self_rank(LeaderboardKind::GuildLevel, &young, &all), 3);
    }
}
