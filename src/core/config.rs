//! Battle configuration with documented constants
//!
//! All magic numbers of the battle rules are collected here with
//! explanations of their purpose and how they interact with each other.
//! A battle keeps its own copy, so a serialized battle replays with the
//! rules it was started with.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{FleetError, Result};

/// Configuration for the battle engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    // === ARENA ===
    /// Width of the arena (km)
    pub arena_width: f64,

    /// Height of the arena (km)
    pub arena_height: f64,

    /// Hard margin along the arena border that no move may end inside (km)
    pub border: f64,

    /// Hard minimal distance between two ships (km)
    ///
    /// Engines may request a larger "soft" safety distance, never a smaller one.
    pub ship_separation: f64,

    /// Spacing between ships of a fleet line, relative to the line length
    ///
    /// At 0.2 and the default arena, ships of a fleet are ~190km apart.
    pub formation_spacing_ratio: f64,

    // === CHECKS ===
    /// Safety cap on the consistency pass run after each action
    ///
    /// Hitting the cap means two rules keep undoing each other; the pass is
    /// aborted with an error log rather than looping forever.
    pub max_check_iterations: usize,

    /// Whether a double KO ends the battle as a draw
    ///
    /// When false, a pass leaving no fleet alive emits no end-of-battle diff.
    pub draw_on_mutual_destruction: bool,

    // === AI ===
    /// Soft thinking budget of an AI for one ship turn (ms)
    pub ai_time_budget_ms: u64,

    /// Maximal number of maneuvers an AI may apply in a single turn
    pub ai_max_turn_maneuvers: usize,

    /// Cycle count after which an AI duel is declared a draw
    pub max_cycles: u32,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            // Arena
            arena_width: 1808.0,
            arena_height: 948.0,
            border: 50.0,
            ship_separation: 100.0,
            formation_spacing_ratio: 0.2,

            // Checks
            max_check_iterations: 1000,
            draw_on_mutual_destruction: false,

            // AI
            ai_time_budget_ms: 10_000,
            ai_max_turn_maneuvers: 30,
            max_cycles: 100,
        }
    }
}

impl BattleConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text (missing keys keep their defaults)
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: BattleConfig = toml::from_str(contents)?;
        config.validate().map_err(FleetError::InvalidConfig)?;
        Ok(config)
    }

    /// Load a config from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.arena_width < 0.0 || self.arena_height < 0.0 {
            return Err("Arena dimensions must not be negative".into());
        }

        // A border eating half the arena leaves no room to move
        if self.arena_width > 0.0 && self.border * 2.0 >= self.arena_width {
            return Err(format!(
                "border ({}) should be < arena_width / 2 ({:.1})",
                self.border,
                self.arena_width / 2.0
            ));
        }
        if self.arena_height > 0.0 && self.border * 2.0 >= self.arena_height {
            return Err(format!(
                "border ({}) should be < arena_height / 2 ({:.1})",
                self.border,
                self.arena_height / 2.0
            ));
        }

        if self.ship_separation < 0.0 {
            return Err("ship_separation must not be negative".into());
        }

        if self.max_check_iterations == 0 {
            return Err("max_check_iterations must be positive".into());
        }

        if self.max_cycles == 0 {
            return Err("max_cycles must be positive".into());
        }

        Ok(())
    }
}
