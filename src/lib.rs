//! Streakhold - daily-engagement progression and guild economy engine.
//!
//! Streaks, experience and levels, currency, titles, backfill tokens, guilds
//! and leaderboards. Front ends drive everything through [`Engine`].

pub mod backfill;
pub mod core;
pub mod engine;
pub mod guild;
pub mod inventory;
pub mod names;
pub mod progress;
pub mod ranking;
pub mod report;
pub mod store;
pub mod streak;
pub mod titles;

pub use crate::core::{
    Clock, EngineConfig, EngineError, EngineResult, GroupId, GuildId, ManualClock, Reason,
    StoreError, SystemClock, UserId,
};
pub use backfill::BackfillOutcome;
pub use engine::{DonationReceipt, EngagementOutcome, Engine, GuildView, PurchaseReceipt};
pub use guild::Guild;
pub use inventory::{Inventory, ItemKind, ShopItem};
pub use names::{NameBook, NameResolver, RawIds};
pub use progress::{EngagementRecord, UserProgress, UserRecord};
pub use ranking::{Leaderboard, LeaderboardEntry, LeaderboardKind, MyRankings, Subject};
pub use store::{JsonStore, MemoryStore, Store, WriteBatch};
pub use titles::{OwnedTitle, TitleDef, TitleId};
