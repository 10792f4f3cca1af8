//! Progression calculator: level curve, level-ups and reward formulas.
//!
//! Pure functions only. Randomness is injected by the caller so reward
//! distributions are reproducible under a seeded generator.

use super::balance::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Guild reward modifier applied on top of an individual reward.
///
/// Experience is boosted multiplicatively; currency is redrawn from the
/// `[coin_low, coin_high]` band and the unbuffed value is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuildBuff {
    pub experience_bonus: f64,
    pub coin_low: u64,
    pub coin_high: u64,
}

impl GuildBuff {
    /// floor(experience * (1 + bonus))
    pub fn buff_experience(&self, experience: u64) -> u64 {
        (experience as f64 * (1.0 + self.experience_bonus)) as u64
    }

    /// Fresh draw from the coin band.
    pub fn draw_currency<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        rng.gen_range(self.coin_low..=self.coin_high)
    }
}

/// Level plus the threshold that must be reached to leave it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelState {
    pub level: u32,
    pub next_threshold: u64,
}

/// Experience and currency credited by one engagement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reward {
    pub experience: u64,
    pub currency: u64,
}

fn grow_threshold(threshold: u64) -> u64 {
    (threshold as f64 * LEVEL_THRESHOLD_GROWTH) as u64
}

/// Experience threshold of a level.
///
/// threshold(1) = 200, threshold(n) = floor(threshold(n - 1) * 1.2).
/// Every step floors, so from level 6 on this is a few points below
/// the un-floored closed form 200 * 1.2^(n-1).
pub fn level_threshold(level: u32) -> u64 {
    let mut threshold = LEVEL_THRESHOLD_BASE;
    for _ in 1..level.max(1) {
        threshold = grow_threshold(threshold);
    }
    threshold
}

/// Raises `current_level` while `experience_total` reaches the level's threshold.
///
/// The threshold is compared against the cumulative total, not against
/// experience earned inside the level.
pub fn compute_level_up(experience_total: u64, current_level: u32) -> LevelState {
    let mut level = current_level.max(1);
    let mut threshold = level_threshold(level);

    while experience_total >= threshold && threshold < u64::MAX {
        level += 1;
        threshold = grow_threshold(threshold);
    }

    LevelState {
        level,
        next_threshold: threshold,
    }
}

/// base * (level - 1) * 0.15, level 1 gets nothing.
fn level_bonus(base: u64, level: u32) -> f64 {
    base as f64 * (level.saturating_sub(1) as f64 * LEVEL_REWARD_BONUS_PER_LEVEL)
}

/// Streak bonus as a fraction of `reference`.
/// At thirty days both thirty-day bonuses apply together with the week bonus.
fn streak_bonus(streak_days: u32, reference: f64) -> f64 {
    let mut bonus = 0.0;
    if streak_days >= WEEK_STREAK_DAYS {
        bonus += reference * WEEK_STREAK_BONUS;
    }
    if streak_days >= MONTH_STREAK_DAYS {
        bonus += reference * MONTH_STREAK_BONUS;
        bonus += reference * MONTH_STREAK_EXTRA_BONUS;
    }
    bonus
}

/// Experience for a daily engagement.
///
/// Streak bonuses are fractions of the current level's threshold.
pub fn experience_reward<R: Rng + ?Sized>(
    rng: &mut R,
    streak_days: u32,
    level: u32,
    buff: Option<&GuildBuff>,
) -> u64 {
    let base = rng.gen_range(BASE_EXPERIENCE_MIN..=BASE_EXPERIENCE_MAX);
    let threshold = level_threshold(level) as f64;
    let raw = (base as f64 + level_bonus(base, level) + streak_bonus(streak_days, threshold)) as u64;

    match buff {
        Some(buff) => buff.buff_experience(raw),
        None => raw,
    }
}

/// Currency for a daily engagement.
///
/// Streak bonuses are fractions of the base draw. A guild buff replaces the
/// whole result with a draw from its coin band.
pub fn currency_reward<R: Rng + ?Sized>(
    rng: &mut R,
    streak_days: u32,
    level: u32,
    buff: Option<&GuildBuff>,
) -> u64 {
    let base = rng.gen_range(BASE_CURRENCY_MIN..=BASE_CURRENCY_MAX);
    let raw = (base as f64 + level_bonus(base, level) + streak_bonus(streak_days, base as f64)) as u64;

    match buff {
        Some(buff) => buff.draw_currency(rng),
        None => raw,
    }
}

/// Both rewards of a daily engagement.
pub fn engagement_reward<R: Rng + ?Sized>(
    rng: &mut R,
    streak_days: u32,
    level: u32,
    buff: Option<&GuildBuff>,
) -> Reward {
    let experience = experience_reward(rng, streak_days, level, buff);
    let currency = currency_reward(rng, streak_days, level, buff);
    Reward {
        experience,
        currency,
    }
}

/// Minimum-tier reward credited for a backfilled day.
///
/// Fixed bases scaled by the level bonus (floored before adding), no streak
/// bonus, then guild-buffed like a normal reward.
pub fn backfill_reward<R: Rng + ?Sized>(
    rng: &mut R,
    level: u32,
    buff: Option<&GuildBuff>,
) -> Reward {
    let scale = |base: u64| {
        let bonus = (base * u64::from(level.saturating_sub(1))) as f64 * LEVEL_REWARD_BONUS_PER_LEVEL;
        base + bonus as u64
    };
    let experience = scale(BACKFILL_BASE_EXPERIENCE);
    let currency = scale(BACKFILL_BASE_CURRENCY);

    match buff {
        Some(buff) => Reward {
            experience: buff.buff_experience(experience),
            currency: buff.draw_currency(rng),
        },
        None => Reward {
            experience,
            currency,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    fn level_three_buff() -> GuildBuff {
        GuildBuff {
            experience_bonus: 0.018,
            coin_low: 180,
            coin_high: 258,
        }
    }

    #[test]
    fn test_level_threshold_curve() {
        let expected = [200, 240, 288, 345, 414, 496, 595, 714, 856, 1027];
        for (i, want) in expected.iter().enumerate() {
            assert_eq!(level_threshold(i as u32 + 1), *want, "level {}", i + 1);
        }
    }

    #[test]
    fn test_level_threshold_matches_recursive_definition() {
        fn recursive(level: u32) -> u64 {
            if level <= 1 {
                200
            } else {
                (recursive(level - 1) as f64 * 1.2) as u64
            }
        }
        for level in 1..=60 {
            assert_eq!(level_threshold(level), recursive(level));
        }
    }

    #[test]
    fn test_level_threshold_matches_closed_form_on_early_levels() {
        for level in 1..=5u32 {
            let closed = (200.0 * 1.2f64.powi(level as i32 - 1)) as u64;
            assert_eq!(level_threshold(level), closed);
        }
    }

    #[test]
    fn test_level_threshold_zero_treated_as_one() {
        assert_eq!(level_threshold(0), 200);
    }

    #[test]
    fn test_compute_level_up_no_change() {
        let state = compute_level_up(150, 1);
        assert_eq!(state, LevelState { level: 1, next_threshold: 200 });
    }

    #[test]
    fn test_compute_level_up_multiple_levels() {
        // 250 >= 200 -> level 2 (240), 250 >= 240 -> level 3 (288)
        let state = compute_level_up(250, 1);
        assert_eq!(state, LevelState { level: 3, next_threshold: 288 });
    }

    #[test]
    fn test_compute_level_up_exact_threshold_levels_up() {
        let state = compute_level_up(200, 1);
        assert_eq!(state.level, 2);
        assert_eq!(state.next_threshold, 240);
    }

    #[test]
    fn test_compute_level_up_idempotent() {
        for exp in [0, 199, 200, 1_000, 12_345, 987_654] {
            let first = compute_level_up(exp, 1);
            let second = compute_level_up(exp, first.level);
            assert_eq!(first, second, "exp {}", exp);
            assert!(exp < second.next_threshold);
        }
    }

    #[test]
    fn test_buff_experience_level_three() {
        assert_eq!(level_three_buff().buff_experience(1000), 1018);
    }

    #[test]
    fn test_buff_currency_stays_in_band() {
        let buff = level_three_buff();
        let mut rng = rng();
        for _ in 0..1_000 {
            let coins = buff.draw_currency(&mut rng);
            assert!((180..=258).contains(&coins));
        }
    }

    #[test]
    fn test_experience_reward_level_one_range() {
        let mut rng = rng();
        for _ in 0..1_000 {
            let exp = experience_reward(&mut rng, 1, 1, None);
            assert!((10..=50).contains(&exp), "got {}", exp);
        }
    }

    #[test]
    fn test_experience_reward_month_streak_stacks_bonuses() {
        // level 5: base*1.6 + 414*(0.03+0.13+0.03) = base*1.6 + 78.66
        let mut rng = rng();
        for _ in 0..1_000 {
            let exp = experience_reward(&mut rng, 30, 5, None);
            assert!((94..=158).contains(&exp), "got {}", exp);
        }
    }

    #[test]
    fn test_experience_reward_week_streak_bonus() {
        // level 1: base + 200*0.03 = base + 6
        let mut rng = rng();
        for _ in 0..1_000 {
            let exp = experience_reward(&mut rng, 7, 1, None);
            assert!((15..=56).contains(&exp), "got {}", exp);
        }
    }

    #[test]
    fn test_currency_reward_level_one_range() {
        let mut rng = rng();
        for _ in 0..1_000 {
            let coins = currency_reward(&mut rng, 1, 1, None);
            assert!((90..=180).contains(&coins));
        }
    }

    #[test]
    fn test_currency_reward_month_streak_uses_base() {
        // base * (1 + 0.03 + 0.13 + 0.03) = base * 1.19
        let mut rng = rng();
        for _ in 0..1_000 {
            let coins = currency_reward(&mut rng, 30, 1, None);
            assert!((107..=214).contains(&coins), "got {}", coins);
        }
    }

    #[test]
    fn test_currency_reward_buff_replaces_value() {
        // Level 20 unbuffed would be far above the band
        let buff = level_three_buff();
        let mut rng = rng();
        for _ in 0..1_000 {
            let coins = currency_reward(&mut rng, 30, 20, Some(&buff));
            assert!((180..=258).contains(&coins));
        }
    }

    #[test]
    fn test_same_seed_same_rewards() {
        let mut a = ChaCha8Rng::seed_from_u64(99);
        let mut b = ChaCha8Rng::seed_from_u64(99);
        for _ in 0..50 {
            assert_eq!(
                engagement_reward(&mut a, 8, 3, None),
                engagement_reward(&mut b, 8, 3, None)
            );
        }
    }

    #[test]
    fn test_backfill_reward_level_one() {
        let reward = backfill_reward(&mut rng(), 1, None);
        assert_eq!(reward, Reward { experience: 10, currency: 90 });
    }

    #[test]
    fn test_backfill_reward_scales_with_level() {
        // 10 + floor(10*4*0.15) = 16, 90 + floor(90*4*0.15) = 144
        let reward = backfill_reward(&mut rng(), 5, None);
        assert_eq!(reward, Reward { experience: 16, currency: 144 });
    }

    #[test]
    fn test_backfill_reward_buffed() {
        let buff = level_three_buff();
        let reward = backfill_reward(&mut rng(), 1, Some(&buff));
        assert_eq!(reward.experience, 10); // floor(10 * 1.018)
        assert!((180..=258).contains(&reward.currency));
    }
}
