//! Balance constants shared by the engine and the simulator.
//!
//! All reward, leveling and guild economy numbers live here.
//! These are product policy, not configuration: change once, test everywhere.

// =============================================================================
// LEVELING CURVE
// =============================================================================

/// Experience required to leave level 1.
pub const LEVEL_THRESHOLD_BASE: u64 = 200;

/// Per-level growth of the threshold. Each step floors before the next one.
/// threshold(n) = floor(threshold(n - 1) * LEVEL_THRESHOLD_GROWTH)
pub const LEVEL_THRESHOLD_GROWTH: f64 = 1.2;

/// Reward amplifier gained per level above 1 (level 1 gets none).
pub const LEVEL_REWARD_BONUS_PER_LEVEL: f64 = 0.15;

// =============================================================================
// DAILY ENGAGEMENT REWARDS
// =============================================================================

/// Inclusive range of the base experience draw.
pub const BASE_EXPERIENCE_MIN: u64 = 10;
pub const BASE_EXPERIENCE_MAX: u64 = 50;

/// Inclusive range of the base currency draw.
pub const BASE_CURRENCY_MIN: u64 = 90;
pub const BASE_CURRENCY_MAX: u64 = 180;

/// Streak length that unlocks the first streak bonus.
pub const WEEK_STREAK_DAYS: u32 = 7;

/// Streak length that unlocks the thirty-day bonuses.
pub const MONTH_STREAK_DAYS: u32 = 30;

/// Bonus fraction at a seven-day streak.
pub const WEEK_STREAK_BONUS: f64 = 0.03;

/// Bonus fraction at a thirty-day streak. Stacks with the week bonus and
/// with MONTH_STREAK_EXTRA_BONUS.
pub const MONTH_STREAK_BONUS: f64 = 0.13;

/// Second thirty-day bonus, applied on top of MONTH_STREAK_BONUS.
pub const MONTH_STREAK_EXTRA_BONUS: f64 = 0.03;

// =============================================================================
// BACKFILL
// =============================================================================

/// Fixed base experience credited for a backfilled day.
pub const BACKFILL_BASE_EXPERIENCE: u64 = 10;

/// Fixed base currency credited for a backfilled day.
pub const BACKFILL_BASE_CURRENCY: u64 = 90;

// =============================================================================
// GUILD ECONOMY
// =============================================================================

/// Level every guild starts at.
pub const GUILD_START_LEVEL: u32 = 1;

/// Highest reachable guild level.
pub const GUILD_MAX_LEVEL: u32 = 5;

/// Inclusive range of the flat guild experience granted per donation.
pub const DONATION_EXPERIENCE_MIN: u64 = 15;
pub const DONATION_EXPERIENCE_MAX: u64 = 35;
