//! Centralized game constants for the math spirits core.
//!
//! Per-module tables (spirit stats, drop tables, generator ranges) remain in
//! their respective modules as the single source of truth.

// =====================================================
// Answer checking
// =====================================================

/// Two numeric options closer than this are considered the same option
pub const OPTION_EPSILON: f64 = 0.001;

/// Tolerance used for answers without a fractional part
pub const INTEGER_TOLERANCE: f64 = 0.001;

/// Maximum decimal places tracked when deriving a tolerance
pub const MAX_DECIMAL_PLACES: u32 = 6;

/// Number of options offered per problem (correct answer included)
pub const OPTION_COUNT: usize = 4;

/// Random distractor attempts before falling back to fixed offsets
pub const DISTRACTOR_ATTEMPTS: u32 = 64;

// =====================================================
// Difficulty
// =====================================================

pub const MIN_DIFFICULTY: u8 = 1;
pub const MAX_DIFFICULTY: u8 = 5;

/// Concepts (limits, measure, induction...) only appear in random draws from this difficulty
pub const CONCEPT_MIN_DIFFICULTY: u8 = 3;

// =====================================================
// Combat
// =====================================================

/// Per-combo-step damage multiplier: final = 1.0 + combo * COMBO_STEP_MULT
pub const COMBO_STEP_MULT: f32 = 0.15;

/// Combo steps beyond this no longer increase damage
pub const MAX_COMBO: u32 = 5;

/// Base chance that a correct answer yields a drop
pub const BASE_DROP_CHANCE: f64 = 0.35;

// =====================================================
// Player
// =====================================================

pub const BASE_PLAYER_HP: u32 = 100;
pub const BASE_PLAYER_ATTACK: u32 = 20;

/// HP gained per level
pub const HP_PER_LEVEL: u32 = 10;

/// Attack gained per level
pub const ATTACK_PER_LEVEL: u32 = 2;
