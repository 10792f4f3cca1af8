//! Display-name resolution for rendered output.

use crate::core::UserId;
use dashmap::DashMap;

/// Maps a user id to a human-readable name.
pub trait NameResolver: Send + Sync {
    fn display_name(&self, user: &UserId) -> Option<String>;

    /// Resolved name, or the raw id when unknown.
    fn name_or_id(&self, user: &UserId) -> String {
        self.display_name(user)
            .unwrap_or_else(|| user.as_str().to_string())
    }
}

/// Resolver that knows nobody; every name falls back to the id.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawIds;

impl NameResolver for RawIds {
    fn display_name(&self, _user: &UserId) -> Option<String> {
        None
    }
}

/// Names registered at runtime, e.g. as the front end sees them.
#[derive(Debug, Default)]
pub struct NameBook {
    names: DashMap<UserId, String>,
}

impl NameBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, user: UserId, name: impl Into<String>) {
        self.names.insert(user, name.into());
    }
}

impl NameResolver for NameBook {
    fn display_name(&self, user: &UserId) -> Option<String> {
        self.names
            .get(user)
            .map(|name| name.value().clone())
            .filter(|name| !name.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_to_raw_id() {
        assert_eq!(RawIds.name_or_id(&UserId::from("10086")), "10086");
    }

    #[test]
    fn test_name_book() {
        let book = NameBook::new();
        book.set(UserId::from("1"), "Aria");
        book.set(UserId::from("2"), "  ");
        assert_eq!(book.name_or_id(&UserId::from("1")), "Aria");
        assert_eq!(book.name_or_id(&UserId::from("2")), "2");
        assert_eq!(book.name_or_id(&UserId::from("3")), "3");
    }
}
