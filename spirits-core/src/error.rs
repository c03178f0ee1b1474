//! Error types for the spirits core.

use thiserror::Error;

/// Failure to interpret a typed answer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnswerParseError {
    #[error("answer is empty")]
    Empty,
    #[error("not a number: {0:?}")]
    NotANumber(String),
    #[error("fraction has a zero denominator: {0:?}")]
    ZeroDenominator(String),
}

/// Illegal action for the current encounter state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleError {
    #[error("encounter already finished ({0})")]
    Finished(String),
    #[error("no problem is waiting for an answer")]
    NoActiveProblem,
    #[error("a problem is already waiting for an answer")]
    ProblemPending,
    #[error("encounter has not finished yet")]
    NotFinished,
    #[error("option index {index} out of range (0..{count})")]
    OptionOutOfRange { index: usize, count: usize },
}

/// Configuration loading and validation failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid RON config: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Crate-level error
#[derive(Debug, Error)]
pub enum SpiritsError {
    #[error(transparent)]
    Answer(#[from] AnswerParseError),
    #[error(transparent)]
    Battle(#[from] BattleError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T, E = SpiritsError> = std::result::Result<T, E>;
