//! Error taxonomy for engine operations.
//!
//! Validation failures never mutate state and are returned as typed values.
//! Each carries a [`Reason`] with a stable code the front end can localise.

use serde::Serialize;
use std::fmt;
use std::io;

/// Stable reason attached to every validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    // Engagement
    AlreadyEngagedToday,
    // Lookups
    UserNotFound,
    GuildNotFound,
    TitleNotOwned,
    UnknownItem,
    // Resources
    InsufficientCurrency,
    InsufficientTokens,
    InsufficientGuildExperience,
    InsufficientGuildCurrency,
    // Backfill
    NoEngagementHistory,
    NotEnoughGapDays,
    // Guild state
    GuildAlreadyExists,
    GuildNameTaken,
    AlreadyMember,
    NotMember,
    AlreadyManager,
    NotManager,
    NotLord,
    NotInGuild,
    GuildAtMaxLevel,
    // Input
    InvalidQuantity,
    InvalidAmount,
    InvalidName,
    InvalidBoard,
}

impl Reason {
    /// Stable snake_case code, safe to key localised messages on.
    pub fn code(&self) -> &'static str {
        match self {
            Reason::AlreadyEngagedToday => "already_engaged_today",
            Reason::UserNotFound => "user_not_found",
            Reason::GuildNotFound => "guild_not_found",
            Reason::TitleNotOwned => "title_not_owned",
            Reason::UnknownItem => "unknown_item",
            Reason::InsufficientCurrency => "insufficient_currency",
            Reason::InsufficientTokens => "insufficient_tokens",
            Reason::InsufficientGuildExperience => "insufficient_guild_experience",
            Reason::InsufficientGuildCurrency => "insufficient_guild_currency",
            Reason::NoEngagementHistory => "no_engagement_history",
            Reason::NotEnoughGapDays => "not_enough_gap_days",
            Reason::GuildAlreadyExists => "guild_already_exists",
            Reason::GuildNameTaken => "guild_name_taken",
            Reason::AlreadyMember => "already_member",
            Reason::NotMember => "not_member",
            Reason::AlreadyManager => "already_manager",
            Reason::NotManager => "not_manager",
            Reason::NotLord => "not_lord",
            Reason::NotInGuild => "not_in_guild",
            Reason::GuildAtMaxLevel => "guild_at_max_level",
            Reason::InvalidQuantity => "invalid_quantity",
            Reason::InvalidAmount => "invalid_amount",
            Reason::InvalidName => "invalid_name",
            Reason::InvalidBoard => "invalid_board",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Failure reported by a storage collaborator.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Error returned by every top-level engine operation.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("already done: {0}")]
    AlreadyDone(Reason),

    #[error("not found: {0}")]
    NotFound(Reason),

    #[error("insufficient resource: {0}")]
    InsufficientResource(Reason),

    #[error("invalid state: {0}")]
    InvalidState(Reason),

    #[error("at cap: {0}")]
    AtCap(Reason),

    #[error(transparent)]
    StorageFailure(#[from] StoreError),
}

impl EngineError {
    /// The validation reason, or `None` for storage failures.
    pub fn reason(&self) -> Option<Reason> {
        match self {
            EngineError::AlreadyDone(r)
            | EngineError::NotFound(r)
            | EngineError::InsufficientResource(r)
            | EngineError::InvalidState(r)
            | EngineError::AtCap(r) => Some(*r),
            EngineError::StorageFailure(_) => None,
        }
    }

    /// Stable code for the front end.
    pub fn reason_code(&self) -> &'static str {
        match self.reason() {
            Some(r) => r.code(),
            None => "storage_failure",
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_code_matches_serde_name() {
        for reason in [
            Reason::AlreadyEngagedToday,
            Reason::InsufficientGuildCurrency,
            Reason::GuildAtMaxLevel,
            Reason::NotEnoughGapDays,
        ] {
            let json = serde_json::to_string(&reason).unwrap();
            assert_eq!(json, format!("\"{}\"", reason.code()));
        }
    }

    #[test]
    fn test_storage_failure_has_no_reason() {
        let err = EngineError::from(StoreError::Unavailable("down".into()));
        assert_eq!(err.reason(), None);
        assert_eq!(err.reason_code(), "storage_failure");
    }

    #[test]
    fn test_validation_error_display() {
        let err = EngineError::AtCap(Reason::GuildAtMaxLevel);
        assert_eq!(err.to_string(), "at cap: guild_at_max_level");
        assert_eq!(err.reason(), Some(Reason::GuildAtMaxLevel));
    }
}
