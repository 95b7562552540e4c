use thiserror::Error;

use crate::core::types::{ActionId, DroneId, ShipId};

#[derive(Error, Debug)]
pub enum FleetError {
    #[error("Ship not found: {0}")]
    ShipNotFound(ShipId),

    #[error("Action not found: {0}")]
    ActionNotFound(ActionId),

    #[error("Drone not found: {0}")]
    DroneNotFound(DroneId),

    #[error("Ship is not playing: {0}")]
    NotPlaying(ShipId),

    #[error("Battle has already ended")]
    BattleEnded,

    #[error("Battle has not ended yet")]
    BattleNotEnded,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, FleetError>;
