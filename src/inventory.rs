//! Consumable inventory and the shop catalog.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Kinds of consumable items. Generic on purpose; only one kind exists today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Credits one missed engagement day retroactively.
    BackfillToken,
}

impl ItemKind {
    pub const ALL: [ItemKind; 1] = [ItemKind::BackfillToken];

    pub fn slug(&self) -> &'static str {
        match self {
            ItemKind::BackfillToken => "backfill_token",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ItemKind::BackfillToken => "Backfill Token",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ItemKind::BackfillToken => {
                "Credits one missed day within the backfill window at the minimum reward"
            }
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ItemKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ItemKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == s || kind.name().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

/// A priced entry of the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShopItem {
    pub kind: ItemKind,
    pub price: u64,
    pub description: &'static str,
}

/// Item kind -> quantity. Kinds with zero quantity are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    items: BTreeMap<ItemKind, u32>,
}

impl Inventory {
    pub fn quantity(&self, kind: ItemKind) -> u32 {
        self.items.get(&kind).copied().unwrap_or(0)
    }

    pub fn add(&mut self, kind: ItemKind, quantity: u32) {
        if quantity == 0 {
            return;
        }
        let entry = self.items.entry(kind).or_insert(0);
        *entry = entry.saturating_add(quantity);
    }

    /// Remove `quantity` units. Returns false (and changes nothing) if short.
    pub fn remove(&mut self, kind: ItemKind, quantity: u32) -> bool {
        let held = self.quantity(kind);
        if held < quantity {
            return false;
        }
        if held == quantity {
            self.items.remove(&kind);
        } else {
            self.items.insert(kind, held - quantity);
        }
        true
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemKind, u32)> + '_ {
        self.items.iter().map(|(kind, qty)| (*kind, *qty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_remove() {
        let mut inv = Inventory::default();
        inv.add(ItemKind::BackfillToken, 3);
        assert_eq!(inv.quantity(ItemKind::BackfillToken), 3);
        assert!(inv.remove(ItemKind::BackfillToken, 2));
        assert_eq!(inv.quantity(ItemKind::BackfillToken), 1);
    }

    #[test]
    fn test_remove_to_zero_deletes_entry() {
        let mut inv = Inventory::default();
        inv.add(ItemKind::BackfillToken, 2);
        assert!(inv.remove(ItemKind::BackfillToken, 2));
        assert!(inv.is_empty());
        assert_eq!(inv.iter().count(), 0);
    }

    #[test]
    fn test_remove_more_than_held_is_noop() {
        let mut inv = Inventory::default();
        inv.add(ItemKind::BackfillToken, 1);
        assert!(!inv.remove(ItemKind::BackfillToken, 2));
        assert_eq!(inv.quantity(ItemKind::BackfillToken), 1);
    }

    #[test]
    fn test_add_zero_keeps_empty() {
        let mut inv = Inventory::default();
        inv.add(ItemKind::BackfillToken, 0);
        assert!(inv.is_empty());
    }

    #[test]
    fn test_parse_item_kind() {
        assert_eq!("backfill_token".parse(), Ok(ItemKind::BackfillToken));
        assert_eq!("backfill token".parse(), Ok(ItemKind::BackfillToken));
        assert!("sword".parse::<ItemKind>().is_err());
    }

    #[test]
    fn test_serializes_as_map() {
        let mut inv = Inventory::default();
        inv.add(ItemKind::BackfillToken, 4);
        let json = serde_json::to_string(&inv).unwrap();
        assert_eq!(json, r#"{"backfill_token":4}"#);
    }
}
