//! Title lifecycle: grants on milestones, revocation of broken streak titles.

use super::data::{conditional_titles, ALL_TITLES};
use super::types::{TitleBook, TitleId, TitleRule};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Titles granted and revoked by one engagement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TitleChanges {
    pub granted: Vec<TitleId>,
    pub revoked: Vec<TitleId>,
}

impl TitleChanges {
    pub fn is_empty(&self) -> bool {
        self.granted.is_empty() && self.revoked.is_empty()
    }
}

/// Titles whose milestone is hit by this engagement.
///
/// `previous_total` is lifetime engagement before the event; `total_days`
/// and `streak_days` are the values after it.
pub fn earned_titles(previous_total: u32, total_days: u32, streak_days: u32) -> Vec<TitleId> {
    ALL_TITLES
        .iter()
        .filter(|def| match def.rule {
            TitleRule::LifetimeDays(days) => total_days == days && previous_total < days,
            TitleRule::StreakDays(days) => streak_days == days,
        })
        .map(|def| def.id)
        .collect()
}

/// Run the full lifecycle for one engagement against a user's title book.
///
/// Revocation runs every time: a conditional title is removed when the
/// streak is below its length and it was not earned in this same call.
pub fn apply_engagement(
    book: &mut TitleBook,
    previous_total: u32,
    total_days: u32,
    streak_days: u32,
    now: DateTime<Utc>,
) -> TitleChanges {
    let earned = earned_titles(previous_total, total_days, streak_days);
    let mut changes = TitleChanges::default();

    for id in &earned {
        if book.grant(*id, now) {
            changes.granted.push(*id);
        }
    }

    for def in conditional_titles() {
        let TitleRule::StreakDays(days) = def.rule else {
            continue;
        };
        if streak_days < days && !earned.contains(&def.id) && book.revoke(def.id) {
            changes.revoked.push(def.id);
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn test_first_engagement_grants_newcomer() {
        assert_eq!(earned_titles(0, 1, 1), vec![TitleId::Newcomer]);
    }

    #[test]
    fn test_seventh_day_grants_dedicated_and_vanguard() {
        assert_eq!(
            earned_titles(6, 7, 7),
            vec![TitleId::Dedicated, TitleId::SevenDayVanguard]
        );
    }

    #[test]
    fn test_seventh_total_without_streak() {
        assert_eq!(earned_titles(6, 7, 2), vec![TitleId::Dedicated]);
    }

    #[test]
    fn test_thirtieth_day_grants_everything_at_thirty() {
        assert_eq!(
            earned_titles(29, 30, 30),
            vec![TitleId::SwornToTheMoon, TitleId::EternalArbiter]
        );
    }

    #[test]
    fn test_no_titles_between_milestones() {
        assert!(earned_titles(10, 11, 11).is_empty());
    }

    #[test]
    fn test_streak_break_revokes_vanguard() {
        let mut book = TitleBook::default();
        book.grant(TitleId::SevenDayVanguard, now());
        book.grant(TitleId::Newcomer, now());

        let changes = apply_engagement(&mut book, 10, 11, 1, now());
        assert_eq!(changes.revoked, vec![TitleId::SevenDayVanguard]);
        assert!(!book.holds(TitleId::SevenDayVanguard));
        assert!(book.holds(TitleId::Newcomer));
    }

    #[test]
    fn test_streak_above_seven_keeps_vanguard() {
        let mut book = TitleBook::default();
        book.grant(TitleId::SevenDayVanguard, now());
        let changes = apply_engagement(&mut book, 10, 11, 11, now());
        assert!(changes.is_empty());
        assert!(book.holds(TitleId::SevenDayVanguard));
    }

    #[test]
    fn test_arbiter_revoked_below_thirty() {
        let mut book = TitleBook::default();
        book.grant(TitleId::SevenDayVanguard, now());
        book.grant(TitleId::EternalArbiter, now());
        book.activate(TitleId::EternalArbiter);

        let changes = apply_engagement(&mut book, 40, 41, 8, now());
        assert_eq!(changes.revoked, vec![TitleId::EternalArbiter]);
        assert!(book.holds(TitleId::SevenDayVanguard));
        assert_eq!(book.active(), None);
    }

    #[test]
    fn test_grant_at_seven_is_not_revoked_same_turn() {
        let mut book = TitleBook::default();
        let changes = apply_engagement(&mut book, 6, 7, 7, now());
        assert!(changes.granted.contains(&TitleId::SevenDayVanguard));
        assert!(changes.revoked.is_empty());
        assert!(book.holds(TitleId::SevenDayVanguard));
    }

    #[test]
    fn test_already_held_permanent_not_reported_again() {
        let mut book = TitleBook::default();
        book.grant(TitleId::Newcomer, now());
        let changes = apply_engagement(&mut book, 0, 1, 1, now());
        assert!(changes.granted.is_empty());
    }
}
