//! Drones: static objects applying effects around them

use serde::{Deserialize, Serialize};

use crate::battle::diffs::BattleDiff;
use crate::battle::effects::Effect;
use crate::battle::geometry::{arena_distance, ArenaLocation};
use crate::battle::state::Battle;
use crate::core::types::{ActionId, DroneId, IdAllocator, ShipId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drone {
    pub id: DroneId,
    /// Deploying ship (attribution only)
    pub owner: ShipId,
    pub code: String,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub effects: Vec<Effect>,
    /// Action that deployed this drone
    pub parent: Option<ActionId>,
    /// Remaining activations
    pub duration: u32,
}

impl Drone {
    pub fn new(ids: &IdAllocator, owner: ShipId, code: &str, duration: u32) -> Self {
        Self {
            id: ids.next_id(),
            owner,
            code: code.to_string(),
            x: 0.0,
            y: 0.0,
            radius: 0.0,
            effects: Vec::new(),
            parent: None,
            duration,
        }
    }

    pub fn location(&self) -> ArenaLocation {
        ArenaLocation::new(self.x, self.y)
    }

    pub fn is_in_range(&self, x: f64, y: f64) -> bool {
        arena_distance(self.location(), ArenaLocation::new(x, y)) <= self.radius
    }

    /// Alive ships inside the drone radius
    pub fn affected_ships(&self, battle: &Battle) -> Vec<ShipId> {
        battle
            .alive_ships()
            .filter(|ship| ship.is_in_circle(self.x, self.y, self.radius))
            .map(|ship| ship.id)
            .collect()
    }

    /// Diffs of one activation, at its owner's turn start
    ///
    /// An activation with ships in range consumes one duration point; the
    /// drone is destroyed when none remains.
    pub fn activation_diffs(&self, battle: &Battle) -> Vec<BattleDiff> {
        let ships = self.affected_ships(battle);
        let mut result = Vec::new();
        let mut remaining = self.duration;

        if self.duration >= 1 && !ships.is_empty() {
            result.push(BattleDiff::DroneApplied {
                drone_id: self.id,
                ships,
            });
            remaining -= 1;
        }

        if self.duration <= 1 {
            let mut destroyed = self.clone();
            destroyed.duration = remaining;
            result.push(BattleDiff::DroneDestroyed { drone: destroyed });
        }

        result
    }

    pub fn description(&self) -> String {
        let effects = if self.effects.is_empty() {
            "• do nothing".to_string()
        } else {
            self.effects
                .iter()
                .map(|effect| format!("• {}", effect.description()))
                .collect::<Vec<_>>()
                .join("\n")
        };
        format!(
            "For {} activation{}:\n{}",
            self.duration,
            if self.duration > 1 { "s" } else { "" },
            effects
        )
    }
}
