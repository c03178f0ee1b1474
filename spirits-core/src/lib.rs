//! Math Spirits - Core Library
//!
//! Deterministic game logic for the Math Spirits quiz RPG:
//! - Problem generation across six topics with four numeric options
//! - Seeded problem bank (topic/kind/concept/spirit selection)
//! - Spirits (数学之灵) mapped to operation types
//! - Quiz combat encounters with combos and weighted drops
//! - Player progression
//! - Parallel audit of generator invariants
//! - Headless Bevy plugin and RON configuration

pub mod audit;
pub mod bank;
pub mod battle;
pub mod constants;
pub mod drops;
pub mod engine;
pub mod error;
pub mod logging;
pub mod player;
pub mod problem;
pub mod spirit;

pub use error::{Result, SpiritsError};
