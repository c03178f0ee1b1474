//! Player progression: HP, attack, experience and level.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::constants::{ATTACK_PER_LEVEL, BASE_PLAYER_ATTACK, BASE_PLAYER_HP, HP_PER_LEVEL};
use crate::drops::Inventory;

/// Experience needed to go from `level` to `level + 1`
pub fn exp_to_next(level: u32) -> u32 {
    50 * level.max(1) + 50
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub name: String,
    pub level: u32,
    /// Experience accumulated toward the next level
    pub exp: u32,
    pub max_hp: u32,
    pub hp: u32,
    pub attack: u32,
    pub inventory: Inventory,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self::new("Student")
    }
}

impl PlayerStats {
    pub fn new(name: &str) -> Self {
        Self::with_stats(name, BASE_PLAYER_HP, BASE_PLAYER_ATTACK)
    }

    pub fn with_stats(name: &str, max_hp: u32, attack: u32) -> Self {
        Self {
            name: name.to_string(),
            level: 1,
            exp: 0,
            max_hp,
            hp: max_hp,
            attack,
            inventory: Inventory::default(),
        }
    }

    /// Add experience; returns the number of levels gained
    pub fn gain_exp(&mut self, amount: u32) -> u32 {
        self.exp = self.exp.saturating_add(amount);
        let mut gained = 0;
        while self.exp >= exp_to_next(self.level) {
            self.exp -= exp_to_next(self.level);
            self.level += 1;
            self.max_hp += HP_PER_LEVEL;
            self.attack += ATTACK_PER_LEVEL;
            gained += 1;
        }
        if gained > 0 {
            self.hp = self.max_hp;
            info!(player = %self.name, level = self.level, "level up");
        }
        gained
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.hp = self.hp.saturating_sub(amount);
    }

    pub fn heal(&mut self, amount: u32) {
        self.hp = self.hp.saturating_add(amount).min(self.max_hp);
    }

    pub fn is_defeated(&self) -> bool {
        self.hp == 0
    }

    pub fn hp_fraction(&self) -> f32 {
        if self.max_hp == 0 {
            0.0
        } else {
            self.hp as f32 / self.max_hp as f32
        }
    }
}
