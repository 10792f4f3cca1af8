//! Static title catalog.

use super::types::{TitleDef, TitleId, TitleRule};

/// All title definitions in display order.
pub const ALL_TITLES: &[TitleDef] = &[
    // ═══════════════════════════════════════════════════════════════
    // PERMANENT (lifetime engagement)
    // ═══════════════════════════════════════════════════════════════
    TitleDef {
        id: TitleId::Newcomer,
        name: "Newcomer",
        description: "Engage for the first time",
        rule: TitleRule::LifetimeDays(1),
    },
    TitleDef {
        id: TitleId::Dedicated,
        name: "Dedicated",
        description: "Engage on 7 days in total",
        rule: TitleRule::LifetimeDays(7),
    },
    TitleDef {
        id: TitleId::SwornToTheMoon,
        name: "Sworn to the Moon",
        description: "Engage on 30 days in total",
        rule: TitleRule::LifetimeDays(30),
    },
    // ═══════════════════════════════════════════════════════════════
    // CONDITIONAL (unbroken streak, revoked when it breaks)
    // ═══════════════════════════════════════════════════════════════
    TitleDef {
        id: TitleId::SevenDayVanguard,
        name: "Seven-Day Vanguard",
        description: "Engage 7 days in a row (lost when the streak breaks)",
        rule: TitleRule::StreakDays(7),
    },
    TitleDef {
        id: TitleId::EternalArbiter,
        name: "Eternal Arbiter",
        description: "Engage 30 days in a row (lost when the streak breaks)",
        rule: TitleRule::StreakDays(30),
    },
];

/// Look up a title definition by id.
pub fn title_def(id: TitleId) -> &'static TitleDef {
    let index = match id {
        TitleId::Newcomer => 0,
        TitleId::Dedicated => 1,
        TitleId::SwornToTheMoon => 2,
        TitleId::SevenDayVanguard => 3,
        TitleId::EternalArbiter => 4,
    };
    &ALL_TITLES[index]
}

/// Conditional titles only.
pub fn conditional_titles() -> impl Iterator<Item = &'static TitleDef> {
    ALL_TITLES.iter().filter(|def| def.is_conditional())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_id_has_a_def() {
        for id in [
            TitleId::Newcomer,
            TitleId::Dedicated,
            TitleId::SwornToTheMoon,
            TitleId::SevenDayVanguard,
            TitleId::EternalArbiter,
        ] {
            assert_eq!(title_def(id).id, id);
        }
    }

    #[test]
    fn test_conditional_titles() {
        let ids: Vec<_> = conditional_titles().map(|d| d.id).collect();
        assert_eq!(ids, vec![TitleId::SevenDayVanguard, TitleId::EternalArbiter]);
    }
}
