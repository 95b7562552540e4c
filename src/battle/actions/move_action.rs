//! Engines: moving the ship in the arena

use serde::{Deserialize, Serialize};

use crate::battle::actions::ActionUnavailability;
use crate::battle::constants::{DEFAULT_MOVE_DISTANCE, DEFAULT_SAFETY_DISTANCE, REACHABLE_MARGIN};
use crate::battle::diffs::BattleDiff;
use crate::battle::exclusion::ExclusionAreas;
use crate::battle::geometry::{arena_angle, arena_distance, ArenaLocationAngle, Target};
use crate::battle::ship::Ship;
use crate::battle::ship_value::{ShipAttributeName, ShipValueName};
use crate::battle::state::Battle;
use crate::core::types::ActionId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveAction {
    /// Raw distance per power point, before maneuvrability
    pub distance_per_power: f64,
    /// Distance kept from other ships
    pub safety_distance: f64,
    /// Percent of the distance that depends on maneuvrability
    pub maneuvrability_factor: f64,
}

impl Default for MoveAction {
    fn default() -> Self {
        Self {
            distance_per_power: 0.0,
            safety_distance: DEFAULT_SAFETY_DISTANCE,
            maneuvrability_factor: 0.0,
        }
    }
}

impl MoveAction {
    pub fn new(distance_per_power: f64) -> Self {
        Self {
            distance_per_power,
            ..Self::default()
        }
    }

    pub fn with_safety_distance(mut self, safety_distance: f64) -> Self {
        self.safety_distance = safety_distance;
        self
    }

    pub fn with_maneuvrability_factor(mut self, factor: f64) -> Self {
        self.maneuvrability_factor = factor;
        self
    }

    /// Effective distance per power point for a ship
    pub fn distance_by_power(&self, ship: &Ship) -> f64 {
        let maneuvrability = ship.get_attribute(ShipAttributeName::Maneuvrability).max(0) as f64;
        let factor = self.maneuvrability_factor / 100.0;
        self.distance_per_power * (1.0 - factor * (1.0 - maneuvrability / (maneuvrability + 2.0)))
    }

    /// Power needed to reach a target (0 as estimate without target)
    pub fn power_usage(&self, ship: &Ship, target: Option<&Target>) -> i32 {
        let per_power = self.distance_by_power(ship);
        if per_power <= 0.0 {
            return i32::MAX;
        }
        match target {
            Some(target) => {
                let distance = target.distance_to(ship.position());
                (distance / per_power).ceil() as i32
            }
            None => 0,
        }
    }

    /// Distance reachable with some power
    pub fn range_radius(&self, ship: &Ship, power: i32) -> f64 {
        power as f64 * self.distance_by_power(ship)
    }

    pub fn check_cannot_be_applied(&self, ship: &Ship, remaining_power: i32) -> Option<ActionUnavailability> {
        if remaining_power < 1 {
            Some(ActionUnavailability::Power)
        } else if ship.has_active_vigilance() {
            Some(ActionUnavailability::Vigilance)
        } else if ship.is_pinned(false) {
            Some(ActionUnavailability::Pinned)
        } else {
            None
        }
    }

    pub fn default_target(&self, ship: &Ship) -> Target {
        Target::from_location(
            ship.arena_x + ship.arena_angle.cos() * DEFAULT_MOVE_DISTANCE,
            ship.arena_y + ship.arena_angle.sin() * DEFAULT_MOVE_DISTANCE,
        )
    }

    pub fn exclusion_areas(&self, battle: &Battle, ship: &Ship) -> ExclusionAreas {
        ExclusionAreas::from_ship(battle, ship, self.safety_distance, true)
    }

    /// Stop the target before borders and other ships
    pub fn apply_exclusion(&self, battle: &Battle, ship: &Ship, target: Target) -> Target {
        let destination = self
            .exclusion_areas(battle, ship)
            .stop_before(target.location(), ship.position());
        Target::from_location(destination.x, destination.y)
    }

    /// Bring the target within reach of the remaining power
    pub fn apply_reachable_range(&self, ship: &Ship, target: Target, margin: f64) -> Target {
        let max_distance =
            (self.range_radius(ship, ship.get_value(ShipValueName::Power)) - margin).max(0.0);
        target.constraint_in_range(ship.arena_x, ship.arena_y, max_distance)
    }

    pub fn check_location_target(&self, battle: &Battle, ship: &Ship, target: Target) -> Option<Target> {
        let target = self.apply_reachable_range(ship, target, REACHABLE_MARGIN);
        let target = self.apply_exclusion(battle, ship, target);
        (target.distance_to(ship.position()) > 0.0).then_some(target)
    }

    /// Move to the target, facing the direction of travel
    pub fn specific_diffs(&self, action_id: ActionId, ship: &Ship, target: &Target) -> Vec<BattleDiff> {
        let angle = if arena_distance(target.location(), ship.position()) < 0.00001 {
            ship.arena_angle
        } else {
            arena_angle(ship.position(), target.location())
        };
        vec![BattleDiff::ShipMove {
            ship_id: ship.id,
            start: ship.location(),
            end: ArenaLocationAngle::new(target.x, target.y, angle),
            engine: Some(action_id),
        }]
    }

    pub fn description(&self) -> String {
        let mut result = if self.maneuvrability_factor > 0.0 {
            let minimal = self.distance_per_power * (1.0 - self.maneuvrability_factor / 100.0);
            format!(
                "Move: {}-{}km per power point",
                minimal.round(),
                self.distance_per_power
            )
        } else {
            format!("Move: {}km per power point", self.distance_per_power)
        };
        if self.safety_distance > 0.0 {
            result.push_str(&format!(" (safety: {}km)", self.safety_distance));
        }
        result
    }
}
