//! Triggered equipment: weapons, self-applied boosts, blasts and cones

use serde::{Deserialize, Serialize};

use crate::battle::actions::ActionTargettingMode;
use crate::battle::diffs::BattleDiff;
use crate::battle::effects::{Effect, EffectSource};
use crate::battle::geometry::{
    angular_difference, arena_angle, arena_distance, radians, ArenaLocation, ArenaLocationAngle, Target,
};
use crate::battle::ship::Ship;
use crate::battle::state::Battle;
use crate::core::types::{ActionId, ShipId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerAction {
    pub power: i32,
    /// Maximal distance to the target (0 for self-applied)
    pub range: f64,
    /// Radius around the target that is affected
    pub blast: f64,
    /// Aperture (in degrees) of the affected cone from the source
    pub angle: f64,
    pub effects: Vec<Effect>,
}

impl TriggerAction {
    pub fn new(power: i32, range: f64, effects: Vec<Effect>) -> Self {
        Self {
            power,
            range,
            blast: 0.0,
            angle: 0.0,
            effects,
        }
    }

    pub fn with_blast(mut self, blast: f64) -> Self {
        self.blast = blast;
        self
    }

    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    pub fn verb(&self) -> &'static str {
        if self.range > 0.0 {
            "Fire"
        } else {
            "Trigger"
        }
    }

    pub fn targetting_mode(&self) -> ActionTargettingMode {
        if self.blast > 0.0 {
            if self.range > 0.0 {
                ActionTargettingMode::Space
            } else {
                ActionTargettingMode::Surroundings
            }
        } else if self.range > 0.0 {
            if self.angle > 0.0 {
                ActionTargettingMode::Space
            } else {
                ActionTargettingMode::Ship
            }
        } else {
            ActionTargettingMode::SelfConfirm
        }
    }

    /// Nearest enemy for harmful effects, nearest ally otherwise
    pub fn default_target(&self, battle: &Battle, ship: &Ship) -> Target {
        if self.range <= 0.0 {
            return ship.target();
        }
        let harmful = self.effects.iter().any(|effect| !effect.is_beneficial());
        let candidates: Vec<&Ship> = if harmful {
            battle.enemies(ship.fleet_id, true).collect()
        } else {
            battle
                .allies(ship.fleet_id, true)
                .filter(|other| other.id != ship.id)
                .collect()
        };
        candidates
            .into_iter()
            .min_by(|a, b| {
                ship.distance_to(a)
                    .partial_cmp(&ship.distance_to(b))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|nearest| nearest.target())
            .unwrap_or_else(|| ship.target())
    }

    fn check_location_target(&self, ship: &Ship, target: Target) -> Option<Target> {
        if self.blast > 0.0 || self.angle > 0.0 {
            Some(target.constraint_in_range(ship.arena_x, ship.arena_y, self.range))
        } else {
            None
        }
    }

    pub fn check_target(&self, ship: &Ship, target: Target) -> Option<Target> {
        if !target.is_ship() {
            return self.check_location_target(ship, target);
        }
        if self.range > 0.0 && target.ship_id == Some(ship.id) {
            // No self fire
            None
        } else if self.blast > 0.0 || self.angle > 0.0 {
            self.check_location_target(ship, Target::from_location(target.x, target.y))
        } else if target.is_in_range(ship.arena_x, ship.arena_y, self.range) {
            Some(target)
        } else {
            None
        }
    }

    /// Alive ships hit when firing from `source` at `target`
    pub fn impacted_ships(&self, battle: &Battle, target: &Target, source: ArenaLocation) -> Vec<ShipId> {
        let ships = battle.alive_ships();
        if self.blast > 0.0 {
            ships
                .filter(|ship| ship.distance_to_location(target.location()) <= self.blast)
                .map(|ship| ship.id)
                .collect()
        } else if self.angle > 0.0 {
            let direction = arena_angle(source, target.location());
            let max_angle = radians(self.angle * 0.5);
            ships
                .filter(|ship| {
                    let distance = arena_distance(source, ship.position());
                    distance >= 0.000001
                        && distance <= self.range
                        && angular_difference(arena_angle(source, ship.position()), direction).abs()
                            < max_angle
                })
                .map(|ship| ship.id)
                .collect()
        } else {
            ships
                .filter(|ship| Some(ship.id) == target.ship_id)
                .map(|ship| ship.id)
                .collect()
        }
    }

    pub fn specific_diffs(
        &self,
        action_id: ActionId,
        battle: &Battle,
        ship: &Ship,
        target: &Target,
    ) -> Vec<BattleDiff> {
        let mut result = Vec::new();

        if arena_distance(ship.position(), target.location()) > 1e-6 {
            // Face the target
            let angle = arena_angle(ship.position(), target.location());
            if angular_difference(angle, ship.arena_angle).abs() > 1e-6 {
                result.push(BattleDiff::ShipMove {
                    ship_id: ship.id,
                    start: ship.location(),
                    end: ArenaLocationAngle::new(ship.arena_x, ship.arena_y, angle),
                    engine: ship.first_engine().map(|engine| engine.id),
                });
            }

            if self.range > 0.0 {
                result.push(BattleDiff::ProjectileFired {
                    ship_id: ship.id,
                    action_id,
                    target: *target,
                });
            }
        }

        for impacted_id in self.impacted_ships(battle, target, ship.position()) {
            if let Some(impacted) = battle.ship(impacted_id) {
                for effect in &self.effects {
                    result.extend(effect.on_diffs(battle, impacted, EffectSource::Ship(ship.id), 1.0));
                }
            }
        }

        result
    }

    pub fn description(&self) -> String {
        if self.effects.is_empty() {
            return String::new();
        }

        let mut info = Vec::new();
        if self.power != 0 {
            info.push(format!("power usage {}", self.power));
        }
        if self.range > 0.0 {
            info.push(format!("max range {}km", self.range));
        }

        let suffix = if self.blast > 0.0 {
            format!("in {}km radius", self.blast)
        } else if self.angle > 0.0 {
            format!("in {}° arc", self.angle)
        } else if self.range > 0.0 {
            "on target".to_string()
        } else {
            "on self".to_string()
        };
        let effects: Vec<String> = self
            .effects
            .iter()
            .map(|effect| format!("• {} {}", effect.description(), suffix))
            .collect();

        format!("{} ({}):\n{}", self.verb(), info.join(", "), effects.join("\n"))
    }
}
