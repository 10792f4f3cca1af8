//! Core types shared by every engine component.

pub mod balance;
pub mod clock;
pub mod config;
pub mod error;
pub mod ids;
pub mod progression;

pub use clock::{local_date, Clock, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult, Reason, StoreError, StoreResult};
pub use ids::{GroupId, GuildId, UserId};
pub use progression::{GuildBuff, LevelState, Reward};
