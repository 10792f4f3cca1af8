//! Plain-text rendering of successful results.
//!
//! This is the text handed to the rendering sink. Errors are never rendered
//! here; the front end localises them from their reason codes.

use crate::backfill::BackfillOutcome;
use crate::engine::{DonationReceipt, EngagementOutcome, GuildView, PurchaseReceipt};
use crate::inventory::Inventory;
use crate::progress::UserProgress;
use crate::ranking::{Leaderboard, LeaderboardKind, MyRankings, Subject};
use crate::titles::title_def;
use std::fmt;

const RULE: &str = "====================";

impl fmt::Display for EngagementOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Check-in complete for {}", self.date)?;
        writeln!(f, "{RULE}")?;
        if self.streak_broken {
            writeln!(f, "Streak broken, starting over")?;
        }
        writeln!(f, "Streak: {} days", self.streak_days)?;
        writeln!(f, "Total: {} days", self.total_days)?;
        let buffed = if self.guild_buffed { " (guild buff)" } else { "" };
        writeln!(
            f,
            "Reward: +{} exp, +{} coins{}",
            self.reward.experience, self.reward.currency, buffed
        )?;
        writeln!(
            f,
            "Level {}: {}/{} exp",
            self.level, self.experience, self.next_level_threshold
        )?;
        if self.leveled_up {
            writeln!(f, "Level up!")?;
        }
        writeln!(f, "Coins: {}", self.currency)?;
        for id in &self.titles_granted {
            writeln!(f, "Title earned: {}", title_def(*id).name)?;
        }
        for id in &self.titles_revoked {
            writeln!(f, "Title lost: {}", title_def(*id).name)?;
        }
        Ok(())
    }
}

impl fmt::Display for UserProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Progress of {}", self.user_id)?;
        writeln!(f, "{RULE}")?;
        writeln!(
            f,
            "Level {}: {}/{} exp",
            self.level, self.experience, self.next_level_threshold
        )?;
        writeln!(f, "Coins: {}", self.currency)?;
        writeln!(f, "Streak: {} days", self.streak_days)?;
        writeln!(f, "Total: {} days", self.total_days)?;
        match self.last_engagement_date {
            Some(date) => writeln!(f, "Last check-in: {date}"),
            None => writeln!(f, "Last check-in: never"),
        }
    }
}

impl fmt::Display for Inventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Inventory")?;
        writeln!(f, "{RULE}")?;
        if self.is_empty() {
            return writeln!(f, "(empty)");
        }
        for (kind, quantity) in self.iter() {
            writeln!(f, "{kind}: {quantity}")?;
        }
        Ok(())
    }
}

impl fmt::Display for PurchaseReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Bought {} x {} for {} coins",
            self.quantity, self.kind, self.total_price
        )?;
        writeln!(f, "Now holding {}, {} coins left", self.held, self.currency_left)
    }
}

impl fmt::Display for BackfillOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Backfilled {} day(s)", self.dates.len())?;
        writeln!(f, "{RULE}")?;
        for date in &self.dates {
            writeln!(f, "  {date}")?;
        }
        writeln!(
            f,
            "Reward: +{} exp, +{} coins",
            self.experience_granted, self.currency_granted
        )?;
        writeln!(f, "Tokens used: {}", self.tokens_spent)?;
        if self.leveled_up {
            writeln!(f, "Level up! Now level {}", self.level)?;
        }
        Ok(())
    }
}

fn write_entry_value(f: &mut fmt::Formatter<'_>, kind: LeaderboardKind, primary: u64, secondary: Option<u64>) -> fmt::Result {
    match kind {
        LeaderboardKind::Streak | LeaderboardKind::Lifetime => write!(f, "{primary} days"),
        LeaderboardKind::Level | LeaderboardKind::GuildLevel => {
            write!(f, "level {primary} ({} exp)", secondary.unwrap_or(0))
        }
        LeaderboardKind::GuildCoins => write!(f, "{primary} coins"),
    }
}

impl fmt::Display for Leaderboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.kind.title())?;
        writeln!(f, "{RULE}")?;
        if self.entries.is_empty() {
            return writeln!(f, "No entries yet");
        }
        for entry in &self.entries {
            write!(f, "{}. ", entry.position)?;
            match &entry.subject {
                Subject::User { name, title, .. } => {
                    write!(f, "{name}")?;
                    if let Some(title) = title {
                        write!(f, " [{title}]")?;
                    }
                }
                Subject::Guild { name, .. } => write!(f, "<{name}>")?,
            }
            write!(f, " - ")?;
            write_entry_value(f, self.kind, entry.primary, entry.secondary)?;
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for MyRankings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "My rankings")?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "Lifetime: #{}", self.lifetime)?;
        writeln!(f, "Streak: #{}", self.streak)?;
        writeln!(f, "Level: #{}", self.level)
    }
}

impl fmt::Display for GuildView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guild = &self.guild;
        writeln!(f, "<{}>", guild.name)?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "Level: {}", guild.level)?;
        match self.next_upgrade_cost {
            Some(cost) => writeln!(
                f,
                "Exp: {}/{}  Coins: {}/{}",
                guild.experience, cost.experience, guild.currency, cost.currency
            )?,
            None => writeln!(f, "Exp: {}  Coins: {} (max level)", guild.experience, guild.currency)?,
        }
        writeln!(f, "Members: {}", guild.members.len())?;
        writeln!(f, "Lord: {}", self.lord_name.as_deref().unwrap_or("(vacant)"))?;
        if self.manager_names.is_empty() {
            writeln!(f, "Managers: none")?;
        } else {
            writeln!(f, "Managers: {}", self.manager_names.join(", "))?;
        }
        if let Some(buff) = &self.buff {
            writeln!(
                f,
                "Buff: +{:.1}% exp, coins {}-{}",
                buff.experience_bonus * 100.0,
                buff.coin_low,
                buff.coin_high
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for DonationReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Donated {} coins, guild gained {} exp",
            self.amount, self.experience_gained
        )?;
        writeln!(
            f,
            "Guild pool: {} exp, {} coins",
            self.guild_experience, self.guild_currency
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GroupId, UserId};
    use crate::inventory::ItemKind;
    use crate::ranking::LeaderboardEntry;

    #[test]
    fn test_leaderboard_text() {
        let board = Leaderboard {
            kind: LeaderboardKind::Streak,
            entries: vec![
                LeaderboardEntry {
                    position: 1,
                    subject: Subject::User {
                        id: UserId::from("1"),
                        name: "Aria".into(),
                        title: Some("Dedicated".into()),
                    },
                    primary: 12,
                    secondary: None,
                },
                LeaderboardEntry {
                    position: 2,
                    subject: Subject::User {
                        id: UserId::from("2"),
                        name: "2".into(),
                        title: None,
                    },
                    primary: 3,
                    secondary: None,
                },
            ],
        };
        let text = board.to_string();
        assert!(text.starts_with("Streak Leaderboard\n"));
        assert!(text.contains("1. Aria [Dedicated] - 12 days\n"));
        assert!(text.contains("2. 2 - 3 days\n"));
    }

    #[test]
    fn test_guild_board_text() {
        let board = Leaderboard {
            kind: LeaderboardKind::GuildLevel,
            entries: vec![LeaderboardEntry {
                position: 1,
                subject: Subject::Guild {
                    group: GroupId::from("g"),
                    name: "Keep".into(),
                },
                primary: 3,
                secondary: Some(420),
            }],
        };
        assert!(board.to_string().contains("1. <Keep> - level 3 (420 exp)"));
    }

    #[test]
    fn test_empty_board_text() {
        let board = Leaderboard {
            kind: LeaderboardKind::GuildCoins,
            entries: Vec::new(),
        };
        assert!(board.to_string().contains("No entries yet"));
    }

    #[test]
    fn test_inventory_text() {
        let mut inventory = Inventory::default();
        assert!(inventory.to_string().contains("(empty)"));
        inventory.add(ItemKind::BackfillToken, 2);
        assert!(inventory.to_string().contains("Backfill Token: 2"));
    }

    #[test]
    fn test_progress_text() {
        let progress = UserProgress::new(UserId::from("u1"));
        let text = progress.to_string();
        assert!(text.contains("Level 1: 0/200 exp"));
        assert!(text.contains("Last check-in: never"));
    }
}
