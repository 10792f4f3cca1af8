//! Guild economy: a group-scoped shared pool with levels, roles and buffs.
//!
//! A guild's level buffs the daily rewards of engagements made in its group.
//! Members feed the pool with donations; the lord spends it on upgrades.

pub mod logic;
pub mod types;

pub use logic::*;
pub use types::*;
