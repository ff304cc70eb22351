use thiserror::Error;

use crate::core::types::Position;

#[derive(Error, Debug)]
pub enum HuntError {
    #[error("Invalid maze layout: {0}")]
    InvalidLayout(String),

    #[error("Position {0} is not on the field of play")]
    OffField(Position),

    #[error("No path between {0} and {1}")]
    Unreachable(Position, Position),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    #[error("Cannot resample: every particle has zero weight")]
    DegenerateWeights,

    #[error("Transition produced no successor states")]
    NoSuccessor,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HuntError>;
