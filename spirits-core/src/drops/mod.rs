//! Drop system.
//!
//! Correct answers may yield a reward: first a chance roll, then a weighted
//! pick from the drop table. Drops are cosmetic or crafting rewards only.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

/// Drop categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DropCategory {
    Cosmetic,   // hats, robes, pen skins
    Material,   // chalk, ink, paper
    Consumable, // hint scrolls, healing tea
    Currency,   // star coins
}

/// Rarity tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// Default table weight for entries of this rarity (lower = rarer)
    pub fn drop_weight(&self) -> f32 {
        match self {
            Self::Common => 100.0,
            Self::Uncommon => 40.0,
            Self::Rare => 10.0,
            Self::Epic => 2.0,
            Self::Legendary => 0.3,
        }
    }
}

/// Drop table entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropEntry {
    pub item_id: String,
    pub name: String,
    pub category: DropCategory,
    pub rarity: Rarity,
    pub weight: f32,
    pub min_quantity: u32,
    pub max_quantity: u32,
}

impl DropEntry {
    pub fn new(
        item_id: &str,
        name: &str,
        category: DropCategory,
        rarity: Rarity,
        quantity: (u32, u32),
    ) -> Self {
        Self {
            item_id: item_id.to_string(),
            name: name.to_string(),
            category,
            rarity,
            weight: rarity.drop_weight(),
            min_quantity: quantity.0,
            max_quantity: quantity.1,
        }
    }
}

/// A rolled reward
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drop {
    pub item_id: String,
    pub name: String,
    pub category: DropCategory,
    pub rarity: Rarity,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropTable {
    pub entries: Vec<DropEntry>,
}

impl Default for DropTable {
    fn default() -> Self {
        Self::default_table()
    }
}

impl DropTable {
    pub fn new(entries: Vec<DropEntry>) -> Self {
        Self { entries }
    }

    pub fn default_table() -> Self {
        use DropCategory::*;
        use Rarity::*;
        Self::new(vec![
            DropEntry::new("star_coin", "Star Coin", Currency, Common, (1, 5)),
            DropEntry::new("chalk", "Chalk Stick", Material, Common, (1, 3)),
            DropEntry::new("ink", "Bottle of Ink", Material, Uncommon, (1, 2)),
            DropEntry::new("hint_scroll", "Hint Scroll", Consumable, Uncommon, (1, 1)),
            DropEntry::new("healing_tea", "Healing Tea", Consumable, Uncommon, (1, 1)),
            DropEntry::new("compass_charm", "Compass Charm", Cosmetic, Rare, (1, 1)),
            DropEntry::new("abacus_hat", "Abacus Hat", Cosmetic, Epic, (1, 1)),
            DropEntry::new("golden_ratio_robe", "Golden Ratio Robe", Cosmetic, Legendary, (1, 1)),
        ])
    }

    pub fn total_weight(&self) -> f32 {
        self.entries.iter().map(|e| e.weight.max(0.0)).sum()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entries.is_empty() {
            return Err(ConfigError::Invalid("drop table is empty".into()));
        }
        for entry in &self.entries {
            if entry.weight.is_nan() || entry.weight < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "drop '{}' has invalid weight {}",
                    entry.item_id, entry.weight
                )));
            }
            if entry.min_quantity > entry.max_quantity {
                return Err(ConfigError::Invalid(format!(
                    "drop '{}' has min_quantity {} > max_quantity {}",
                    entry.item_id, entry.min_quantity, entry.max_quantity
                )));
            }
        }
        if self.total_weight() <= 0.0 {
            return Err(ConfigError::Invalid("drop table has zero total weight".into()));
        }
        Ok(())
    }

    /// Weighted pick by cumulative weight
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Drop> {
        let total_weight = self.total_weight();
        if total_weight <= 0.0 {
            return None;
        }

        let roll = rng.gen::<f32>() * total_weight;
        let mut accumulated = 0.0;

        for entry in &self.entries {
            let weight = entry.weight.max(0.0);
            if weight == 0.0 {
                continue;
            }
            accumulated += weight;
            if roll < accumulated {
                return Some(Self::materialize(entry, rng));
            }
        }

        // Float accumulation can leave roll == total; take the last weighted entry
        self.entries
            .iter()
            .rev()
            .find(|e| e.weight > 0.0)
            .map(|e| Self::materialize(e, rng))
    }

    /// Chance roll followed by a table roll
    pub fn roll_on_correct<R: Rng + ?Sized>(&self, chance: f64, rng: &mut R) -> Option<Drop> {
        let chance = if chance.is_nan() { 0.0 } else { chance.clamp(0.0, 1.0) };
        if !rng.gen_bool(chance) {
            return None;
        }
        let drop = self.roll(rng);
        if let Some(d) = &drop {
            debug!(item = %d.item_id, quantity = d.quantity, rarity = ?d.rarity, "drop rolled");
        }
        drop
    }

    fn materialize<R: Rng + ?Sized>(entry: &DropEntry, rng: &mut R) -> Drop {
        let quantity = if entry.max_quantity > entry.min_quantity {
            rng.gen_range(entry.min_quantity..=entry.max_quantity)
        } else {
            entry.min_quantity
        };
        Drop {
            item_id: entry.item_id.clone(),
            name: entry.name.clone(),
            category: entry.category,
            rarity: entry.rarity,
            quantity,
        }
    }
}

/// Accumulated drops, keyed by item id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub items: BTreeMap<String, u32>,
}

impl Inventory {
    pub fn add(&mut self, drop: &Drop) {
        *self.items.entry(drop.item_id.clone()).or_insert(0) += drop.quantity;
    }

    pub fn add_all<'a>(&mut self, drops: impl IntoIterator<Item = &'a Drop>) {
        for drop in drops {
            self.add(drop);
        }
    }

    pub fn count(&self, item_id: &str) -> u32 {
        self.items.get(item_id).copied().unwrap_or(0)
    }

    pub fn total_items(&self) -> u32 {
        self.items.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn rng(seed: u64) -> Xoshiro256PlusPlus {
        Xoshiro256PlusPlus::seed_from_u64(seed)
    }

    #[test]
    fn test_default_table_valid() {
        assert!(DropTable::default_table().validate().is_ok());
    }

    #[test]
    fn test_roll_deterministic() {
        let table = DropTable::default_table();
        let a: Vec<_> = {
            let mut r = rng(42);
            (0..20).map(|_| table.roll(&mut r)).collect()
        };
        let b: Vec<_> = {
            let mut r = rng(42);
            (0..20).map(|_| table.roll(&mut r)).collect()
        };
        assert_eq!(a, b);
    }

    #[test]
    fn test_quantity_within_bounds() {
        let table = DropTable::default_table();
        let mut r = rng(7);
        for _ in 0..500 {
            let drop = table.roll(&mut r).unwrap();
            let entry = table
                .entries
                .iter()
                .find(|e| e.item_id == drop.item_id)
                .unwrap();
            assert!(drop.quantity >= entry.min_quantity);
            assert!(drop.quantity <= entry.max_quantity);
        }
    }

    #[test]
    fn test_rarity_distribution() {
        let table = DropTable::default_table();
        let mut r = rng(9);
        let mut common = 0;
        let mut rare_plus = 0;
        for _ in 0..2000 {
            match table.roll(&mut r).unwrap().rarity {
                Rarity::Common | Rarity::Uncommon => common += 1,
                _ => rare_plus += 1,
            }
        }
        assert!(common > rare_plus * 5, "common={common} rare+={rare_plus}");
    }

    #[test]
    fn test_zero_weight_entries_never_drop() {
        let mut table = DropTable::default_table();
        for entry in &mut table.entries {
            if entry.item_id != "chalk" {
                entry.weight = 0.0;
            }
        }
        let mut r = rng(1);
        for _ in 0..100 {
            assert_eq!(table.roll(&mut r).unwrap().item_id, "chalk");
        }
    }

    #[test]
    fn test_empty_table() {
        let table = DropTable::new(vec![]);
        assert!(table.roll(&mut rng(1)).is_none());
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_invalid_entries_rejected() {
        let mut table = DropTable::default_table();
        table.entries[0].weight = -1.0;
        assert!(table.validate().is_err());

        let mut table = DropTable::default_table();
        table.entries[0].min_quantity = 9;
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_roll_on_correct_chance_bounds() {
        let table = DropTable::default_table();
        let mut r = rng(5);
        for _ in 0..100 {
            assert!(table.roll_on_correct(0.0, &mut r).is_none());
            assert!(table.roll_on_correct(1.0, &mut r).is_some());
            assert!(table.roll_on_correct(7.5, &mut r).is_some());
            assert!(table.roll_on_correct(f64::NAN, &mut r).is_none());
        }
    }

    #[test]
    fn test_inventory_accumulates() {
        let mut inv = Inventory::default();
        let coin = Drop {
            item_id: "star_coin".into(),
            name: "Star Coin".into(),
            category: DropCategory::Currency,
            rarity: Rarity::Common,
            quantity: 3,
        };
        inv.add(&coin);
        inv.add_all([&coin, &coin]);
        assert_eq!(inv.count("star_coin"), 9);
        assert_eq!(inv.count("abacus_hat"), 0);
        assert_eq!(inv.total_items(), 9);
    }
}
