use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::battle::BattleSettings;
use crate::constants::{
    BASE_DROP_CHANCE, BASE_PLAYER_ATTACK, BASE_PLAYER_HP, COMBO_STEP_MULT, MAX_COMBO,
    MAX_DIFFICULTY, MIN_DIFFICULTY,
};
use crate::drops::DropTable;
use crate::error::ConfigError;
use crate::logging::TracingConfig;
use crate::player::PlayerStats;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankConfig {
    pub seed: u64,
    pub difficulty: u8,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            difficulty: MIN_DIFFICULTY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub name: String,
    pub max_hp: u32,
    pub attack: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            name: "Student".into(),
            max_hp: BASE_PLAYER_HP,
            attack: BASE_PLAYER_ATTACK,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleConfig {
    pub combo_step_mult: f32,
    pub max_combo: u32,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            combo_step_mult: COMBO_STEP_MULT,
            max_combo: MAX_COMBO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropConfig {
    /// Base chance of a drop per correct answer
    pub chance: f64,
    /// Custom table; `None` uses the built-in one
    #[serde(default)]
    pub table: Option<DropTable>,
}

impl Default for DropConfig {
    fn default() -> Self {
        Self {
            chance: BASE_DROP_CHANCE,
            table: None,
        }
    }
}

/// Top-level game configuration (config/game.ron)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub bank: BankConfig,
    pub player: PlayerConfig,
    pub battle: BattleConfig,
    pub drops: DropConfig,
    pub logging: TracingConfig,
}

impl GameConfig {
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_ron_str(&content)?;
        info!(path = %path.display(), seed = config.bank.seed, "config loaded");
        Ok(config)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&self.bank.difficulty) {
            return Err(ConfigError::Invalid(format!(
                "bank.difficulty {} outside {}..={}",
                self.bank.difficulty, MIN_DIFFICULTY, MAX_DIFFICULTY
            )));
        }
        if self.player.max_hp == 0 {
            return Err(ConfigError::Invalid("player.max_hp must be positive".into()));
        }
        if self.player.attack == 0 {
            return Err(ConfigError::Invalid("player.attack must be positive".into()));
        }
        if !self.battle.combo_step_mult.is_finite() || self.battle.combo_step_mult < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "battle.combo_step_mult {} must be a non-negative number",
                self.battle.combo_step_mult
            )));
        }
        if !(0.0..=1.0).contains(&self.drops.chance) {
            return Err(ConfigError::Invalid(format!(
                "drops.chance {} outside [0, 1]",
                self.drops.chance
            )));
        }
        if let Some(table) = &self.drops.table {
            table.validate()?;
        }
        Ok(())
    }

    pub fn battle_settings(&self) -> BattleSettings {
        BattleSettings {
            combo_step_mult: self.battle.combo_step_mult,
            max_combo: self.battle.max_combo,
            drop_chance: self.drops.chance,
        }
    }

    pub fn drop_table(&self) -> DropTable {
        self.drops.table.clone().unwrap_or_default()
    }

    pub fn new_player(&self) -> PlayerStats {
        PlayerStats::with_stats(&self.player.name, self.player.max_hp, self.player.attack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.battle_settings(), BattleSettings::default());
        assert_eq!(config.drop_table(), DropTable::default_table());
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = GameConfig::from_ron_str("(bank: (seed: 7, difficulty: 3))").unwrap();
        assert_eq!(config.bank.seed, 7);
        assert_eq!(config.bank.difficulty, 3);
        assert_eq!(config.player, PlayerConfig::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = GameConfig::default();
        config.bank.difficulty = 9;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = GameConfig::default();
        config.player.max_hp = 0;
        assert!(config.validate().is_err());

        let mut config = GameConfig::default();
        config.drops.chance = 1.5;
        assert!(config.validate().is_err());

        let mut config = GameConfig::default();
        config.drops.table = Some(DropTable::new(vec![]));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_ron() {
        assert!(matches!(
            GameConfig::from_ron_str("(bank: (seed: \"x\"))"),
            Err(ConfigError::Ron(_))
        ));
    }

    #[test]
    fn test_json_roundtrip() {
        let mut config = GameConfig::default();
        config.bank.seed = 1234;
        config.drops.table = Some(DropTable::default_table());
        let back = GameConfig::from_json(&config.to_json()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_new_player_uses_config() {
        let mut config = GameConfig::default();
        config.player.name = "Noether".into();
        config.player.max_hp = 80;
        let player = config.new_player();
        assert_eq!(player.name, "Noether");
        assert_eq!(player.hp, 80);
    }
}
