//! Daily streak tracking.

use chrono::NaiveDate;

/// What an engagement on `today` does to the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakOutcome {
    /// No earlier engagement on record.
    First,
    /// Last engagement was yesterday.
    Continued { streak_days: u32 },
    /// Gap of two or more days, or a last date in the future.
    Broken,
    /// Already engaged today. Caller must not mutate state.
    AlreadyDone,
}

impl StreakOutcome {
    /// New streak length, or `None` when the engagement must be rejected.
    pub fn streak_days(&self) -> Option<u32> {
        match self {
            StreakOutcome::First | StreakOutcome::Broken => Some(1),
            StreakOutcome::Continued { streak_days } => Some(*streak_days),
            StreakOutcome::AlreadyDone => None,
        }
    }
}

/// Decide continuation or break from the last engagement date.
pub fn next_streak(last: Option<NaiveDate>, previous_streak: u32, today: NaiveDate) -> StreakOutcome {
    let Some(last) = last else {
        return StreakOutcome::First;
    };

    if last == today {
        return StreakOutcome::AlreadyDone;
    }

    if today.pred_opt() == Some(last) {
        StreakOutcome::Continued {
            streak_days: previous_streak.saturating_add(1),
        }
    } else {
        StreakOutcome::Broken
    }
}
