//! Engine configuration (load from `~/.streakhold/config.json`).
//!
//! Only operational knobs live here. Reward numbers are in `balance`.

use crate::inventory::ItemKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Operational settings for an [`crate::engine::Engine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Unit price of each purchasable item kind
    pub shop: BTreeMap<ItemKind, u64>,

    /// How many calendar days before today a backfill may reach
    pub backfill_window_days: u32,

    /// Co-founders accepted at guild creation (founder not counted)
    pub max_co_founders: usize,

    /// Leaderboard size used when a caller asks for limit 0
    pub leaderboard_limit: usize,

    /// Day boundary, minutes east of UTC
    pub utc_offset_minutes: i32,

    /// Seed for reproducible reward draws (None = entropy)
    pub rng_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let mut shop = BTreeMap::new();
        shop.insert(ItemKind::BackfillToken, 100);
        Self {
            shop,
            backfill_window_days: 3,
            max_co_founders: 5,
            leaderboard_limit: 10,
            utc_offset_minutes: 0,
            rng_seed: None,
        }
    }
}

impl EngineConfig {
    /// Default config file path (~/.streakhold/config.json).
    pub fn default_path() -> io::Result<PathBuf> {
        let home_dir = dirs::home_dir().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "Could not determine home directory",
            )
        })?;
        Ok(home_dir.join(".streakhold").join("config.json"))
    }

    /// Read a config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> io::Result<Self> {
        let json = fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Load from the default path, or return defaults if absent or unreadable.
    pub fn load_or_default() -> Self {
        let path = match Self::default_path() {
            Ok(p) => p,
            Err(_) => return Self::default(),
        };
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                }
                Self::default()
            }
        }
    }

    /// Builder-style seed override.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Price of one unit, if the kind is sold.
    pub fn price_of(&self, kind: ItemKind) -> Option<u64> {
        self.shop.get(&kind).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.price_of(ItemKind::BackfillToken), Some(100));
        assert_eq!(config.backfill_window_days, 3);
        assert_eq!(config.max_co_founders, 5);
        assert_eq!(config.leaderboard_limit, 10);
        assert_eq!(config.rng_seed, None);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "rng_seed": 42, "utc_offset_minutes": 480 }"#).unwrap();
        assert_eq!(config.rng_seed, Some(42));
        assert_eq!(config.utc_offset_minutes, 480);
        assert_eq!(config.backfill_window_days, 3);
        assert_eq!(config.price_of(ItemKind::BackfillToken), Some(100));
    }

    #[test]
    fn test_shop_override() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "shop": { "backfill_token": 250 } }"#).unwrap();
        assert_eq!(config.price_of(ItemKind::BackfillToken), Some(250));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "max_co_founders": 3 }"#).unwrap();
        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.max_co_founders, 3);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(EngineConfig::load(&dir.path().join("nope.json")).is_err());
    }
}
