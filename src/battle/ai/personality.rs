//! AI personality configuration loaded from TOML
//!
//! Personalities tune the tactical AI: how much each evaluator weighs in a
//! maneuver score, and which producers propose maneuvers at all.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::{FleetError, Result};

/// Weights of the maneuver evaluators (each evaluator scores in [-1, 1])
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorWeights {
    /// Power left after the maneuver
    pub turn_cost: f64,
    /// Overheating an equipment
    pub overheat: f64,
    /// Damage done to enemies
    pub enemy_health: f64,
    /// Damage done to (or health restored on) allies
    pub ally_health: f64,
    /// Beneficial effects on allies, harmful ones on enemies
    pub active_effects: f64,
    /// Staying away from other ships
    pub clustering: f64,
    /// Staying away from the arena border
    pub position: f64,
    /// Not wasting the turn
    pub idling: f64,
}

impl Default for EvaluatorWeights {
    fn default() -> Self {
        Self {
            turn_cost: 1.0,
            overheat: 3.0,
            enemy_health: 5.0,
            ally_health: 20.0,
            active_effects: 3.0,
            clustering: 4.0,
            position: 0.5,
            idling: 2.0,
        }
    }
}

/// Enabled maneuver producers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProducerConfig {
    pub end_turn: bool,
    pub direct_shots: bool,
    pub blast_shots: bool,
    pub toggles: bool,
    pub drones: bool,
    pub random_moves: bool,
    /// Cells per side of the arena grid scanned for moves and blasts
    pub move_grid: usize,
    /// Passes over the move grid (each with fresh random offsets)
    pub move_iterations: usize,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            end_turn: true,
            direct_shots: true,
            blast_shots: true,
            toggles: true,
            drones: true,
            random_moves: true,
            move_grid: 10,
            move_iterations: 1,
        }
    }
}

/// Complete AI personality configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiPersonality {
    /// Name of this personality (set from filename)
    #[serde(default)]
    pub name: String,
    /// Evaluator weights
    #[serde(default)]
    pub weights: EvaluatorWeights,
    /// Maneuver producers
    #[serde(default)]
    pub producers: ProducerConfig,
}

impl Default for AiPersonality {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            weights: EvaluatorWeights::default(),
            producers: ProducerConfig::default(),
        }
    }
}

impl AiPersonality {
    /// Parse a personality from TOML text (missing keys keep their defaults)
    pub fn from_toml_str(name: &str, contents: &str) -> Result<Self> {
        let mut personality: AiPersonality = toml::from_str(contents)?;
        personality.name = name.to_string();
        personality.validate().map_err(FleetError::InvalidConfig)?;
        Ok(personality)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.producers.move_grid == 0 {
            return Err(format!("{}: move_grid must be positive", self.name));
        }
        let weights = &self.weights;
        let all = [
            weights.turn_cost,
            weights.overheat,
            weights.enemy_health,
            weights.ally_health,
            weights.active_effects,
            weights.clustering,
            weights.position,
            weights.idling,
        ];
        if all.iter().any(|weight| !weight.is_finite()) {
            return Err(format!("{}: evaluator weights must be finite", self.name));
        }
        Ok(())
    }
}

/// Load personality from TOML file
///
/// Loads from `data/ai_personalities/{name}.toml`
pub fn load_personality(name: &str) -> Result<AiPersonality> {
    load_personality_from(PERSONALITY_DIR, name)
}

/// Load personality from `{dir}/{name}.toml`
pub fn load_personality_from(dir: impl AsRef<Path>, name: &str) -> Result<AiPersonality> {
    let path = personality_path(dir.as_ref(), name);
    let contents = fs::read_to_string(&path)?;
    AiPersonality::from_toml_str(name, &contents)
}

const PERSONALITY_DIR: &str = "data/ai_personalities";

fn personality_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.toml", name))
}
