//! Title types and the per-user title book.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a title is earned and whether it can be taken away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TitleRule {
    /// Granted the day lifetime engagement first reaches the count. Never revoked.
    LifetimeDays(u32),
    /// Granted the day the streak reaches the length. Revoked once the streak
    /// falls below it again.
    StreakDays(u32),
}

/// Unique identifier for each title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TitleId {
    Newcomer,
    Dedicated,
    SwornToTheMoon,
    SevenDayVanguard,
    EternalArbiter,
}

impl TitleId {
    /// Stable kebab-case slug.
    pub fn slug(&self) -> &'static str {
        match self {
            TitleId::Newcomer => "newcomer",
            TitleId::Dedicated => "dedicated",
            TitleId::SwornToTheMoon => "sworn-to-the-moon",
            TitleId::SevenDayVanguard => "seven-day-vanguard",
            TitleId::EternalArbiter => "eternal-arbiter",
        }
    }

    pub fn from_slug(slug: &str) -> Option<TitleId> {
        super::data::ALL_TITLES
            .iter()
            .map(|def| def.id)
            .find(|id| id.slug() == slug)
    }
}

impl fmt::Display for TitleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Static definition of a title.
#[derive(Debug, Clone, Serialize)]
pub struct TitleDef {
    pub id: TitleId,
    pub name: &'static str,
    pub description: &'static str,
    pub rule: TitleRule,
}

impl TitleDef {
    pub fn is_conditional(&self) -> bool {
        matches!(self.rule, TitleRule::StreakDays(_))
    }
}

/// A title held by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedTitle {
    pub id: TitleId,
    pub acquired_at: DateTime<Utc>,
    pub active: bool,
}

/// All titles held by one user. At most one is active.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TitleBook {
    titles: Vec<OwnedTitle>,
}

impl TitleBook {
    pub fn holds(&self, id: TitleId) -> bool {
        self.titles.iter().any(|t| t.id == id)
    }

    /// Grant a title. Returns true if newly granted.
    pub fn grant(&mut self, id: TitleId, now: DateTime<Utc>) -> bool {
        if self.holds(id) {
            return false;
        }
        self.titles.push(OwnedTitle {
            id,
            acquired_at: now,
            active: false,
        });
        true
    }

    /// Delete a title outright. If it was active, no title is active afterwards.
    pub fn revoke(&mut self, id: TitleId) -> bool {
        let before = self.titles.len();
        self.titles.retain(|t| t.id != id);
        self.titles.len() != before
    }

    /// Make `id` the only active title. Returns false if not held.
    pub fn activate(&mut self, id: TitleId) -> bool {
        if !self.holds(id) {
            return false;
        }
        for title in &mut self.titles {
            title.active = title.id == id;
        }
        true
    }

    pub fn deactivate_all(&mut self) {
        for title in &mut self.titles {
            title.active = false;
        }
    }

    pub fn active(&self) -> Option<TitleId> {
        self.titles.iter().find(|t| t.active).map(|t| t.id)
    }

    pub fn titles(&self) -> &[OwnedTitle] {
        &self.titles
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn test_grant_is_idempotent() {
        let mut book = TitleBook::default();
        assert!(book.grant(TitleId::Newcomer, now()));
        assert!(!book.grant(TitleId::Newcomer, now()));
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_activate_deactivates_others() {
        let mut book = TitleBook::default();
        book.grant(TitleId::Newcomer, now());
        book.grant(TitleId::Dedicated, now());
        assert!(book.activate(TitleId::Newcomer));
        assert!(book.activate(TitleId::Dedicated));
        assert_eq!(book.active(), Some(TitleId::Dedicated));
        assert_eq!(book.titles().iter().filter(|t| t.active).count(), 1);
    }

    #[test]
    fn test_activate_unowned_fails() {
        let mut book = TitleBook::default();
        book.grant(TitleId::Newcomer, now());
        book.activate(TitleId::Newcomer);
        assert!(!book.activate(TitleId::EternalArbiter));
        assert_eq!(book.active(), Some(TitleId::Newcomer));
    }

    #[test]
    fn test_revoke_active_clears_active() {
        let mut book = TitleBook::default();
        book.grant(TitleId::SevenDayVanguard, now());
        book.activate(TitleId::SevenDayVanguard);
        assert!(book.revoke(TitleId::SevenDayVanguard));
        assert_eq!(book.active(), None);
        assert!(!book.revoke(TitleId::SevenDayVanguard));
    }

    #[test]
    fn test_slug_round_trip() {
        for def in super::super::data::ALL_TITLES {
            assert_eq!(TitleId::from_slug(def.id.slug()), Some(def.id));
        }
        assert_eq!(TitleId::from_slug("emperor"), None);
    }
}
