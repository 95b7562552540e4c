//! Move-then-fire simulation
//!
//! Given an action and a target, find out whether the playing ship must
//! move first (to get in range), and how much power the whole sequence
//! costs. Used by the AI to build maneuvers, and usable by a UI to preview
//! an action.

use std::f64::consts::PI;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::battle::actions::{Action, MoveAction};
use crate::battle::constants::{APPROACH_SCAN_ANGLES, APPROACH_SCAN_RINGS};
use crate::battle::geometry::{arena_distance, Target};
use crate::battle::ship::Ship;
use crate::battle::ship_value::ShipValueName;
use crate::battle::state::Battle;
use crate::core::types::ActionId;

/// Outcome of an approach search
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Approach {
    /// Target already within the radius
    NoMoveNeeded,
    /// No reachable location puts the target within the radius
    NoVectorFound,
    Move(Target),
}

/// One step of a simulated sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveFirePart {
    pub action: ActionId,
    pub target: Target,
    pub power: i32,
    pub possible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveFireResult {
    /// False only if no route can be found
    pub success: bool,
    /// Successive parts making the full move+fire
    pub parts: Vec<MoveFirePart>,
    /// Both move and fire are possible this turn
    pub complete: bool,

    pub need_move: bool,
    pub can_move: bool,
    pub can_end_move: bool,
    pub total_move_ap: i32,
    pub move_location: Target,

    pub need_fire: bool,
    pub can_fire: bool,
    pub total_fire_ap: i32,
    pub fire_location: Target,
}

impl MoveFireResult {
    fn new(ship: &Ship) -> Self {
        Self {
            success: false,
            parts: Vec::new(),
            complete: false,
            need_move: false,
            can_move: false,
            can_end_move: false,
            total_move_ap: 0,
            move_location: ship.target(),
            need_fire: false,
            can_fire: false,
            total_fire_ap: 0,
            fire_location: Target::from_location(0.0, 0.0),
        }
    }
}

pub struct MoveFireSimulator<'a> {
    ship: &'a Ship,
}

impl<'a> MoveFireSimulator<'a> {
    pub fn new(ship: &'a Ship) -> Self {
        Self { ship }
    }

    /// Engine going the farthest per power point
    pub fn find_best_engine(&self) -> Option<&'a Action> {
        let ship = self.ship;
        ship.actions
            .list_all()
            .filter_map(|action| action.as_move().map(|engine| (action, engine)))
            .max_by_key(|(_, engine)| OrderedFloat(engine.distance_by_power(ship)))
            .map(|(action, _)| action)
    }

    /// Whether an engine can bring the ship exactly to a location
    pub fn can_move_to(&self, battle: &Battle, engine: &MoveAction, target: Target) -> bool {
        engine
            .check_location_target(battle, self.ship, target)
            .map(|checked| checked.x == target.x && checked.y == target.y)
            .unwrap_or(false)
    }

    /// Locations covering a disc, on `nr` rings of increasing angular density
    pub fn scan_circle(&self, x: f64, y: f64, radius: f64, nr: usize, na: usize) -> Vec<Target> {
        let ring_step = if nr > 1 { 1.0 / (nr - 1) as f64 } else { 0.0 };
        let mut result = Vec::new();
        for ring in 0..nr.max(1) {
            let r = ring as f64 * ring_step;
            let angles = ((na as f64 * r).ceil() as usize).max(1);
            for step in 0..angles {
                let a = step as f64 * 2.0 * PI / angles as f64;
                result.push(Target::from_location(
                    x + r * radius * a.cos(),
                    y + r * radius * a.sin(),
                ));
            }
        }
        result
    }

    /// Closest reachable location putting the target within `radius`
    pub fn get_approach(
        &self,
        battle: &Battle,
        engine: &MoveAction,
        target: Target,
        radius: f64,
        margin: f64,
    ) -> Approach {
        let dx = target.x - self.ship.arena_x;
        let dy = target.y - self.ship.arena_y;
        let distance = (dx * dx + dy * dy).sqrt();

        if distance <= radius {
            return Approach::NoMoveNeeded;
        }

        let radius = if margin > 0.0 && radius > margin {
            radius - margin
        } else {
            radius
        };
        let factor = (distance - radius) / distance;
        let direct = Target::from_location(self.ship.arena_x + dx * factor, self.ship.arena_y + dy * factor);
        if self.can_move_to(battle, engine, direct) {
            return Approach::Move(direct);
        }

        self.scan_circle(target.x, target.y, radius, APPROACH_SCAN_RINGS, APPROACH_SCAN_ANGLES)
            .into_iter()
            .filter(|candidate| self.can_move_to(battle, engine, *candidate))
            .min_by_key(|candidate| OrderedFloat(candidate.distance_to(self.ship.position())))
            .map(Approach::Move)
            .unwrap_or(Approach::NoVectorFound)
    }

    /// Simulate an action on a valid target, moving first if needed
    pub fn simulate_action(&self, battle: &Battle, action: &Action, target: Target, move_margin: f64) -> MoveFireResult {
        let ship = self.ship;
        let mut result = MoveFireResult::new(ship);
        let mut power = ship.get_value(ShipValueName::Power);

        // Move or approach needed?
        let mut move_target = None;
        if let Some(engine) = action.as_move() {
            let corrected = engine.apply_reachable_range(ship, target, move_margin);
            let corrected = engine.apply_exclusion(battle, ship, corrected);
            result.need_move = target.distance_to(ship.position()) > 0.0;
            move_target = Some(corrected);
        } else if let Some(engine) = self.find_best_engine().and_then(|action| action.as_move()) {
            match self.get_approach(battle, engine, target, action.range_radius(ship), move_margin) {
                Approach::Move(approach) => {
                    result.need_move = true;
                    move_target = Some(approach);
                }
                Approach::NoVectorFound => {
                    result.need_move = true;
                    return result;
                }
                Approach::NoMoveNeeded => {}
            }
        }
        if let Some(location) = move_target {
            if arena_distance(location.location(), ship.position()) < 0.000001 {
                result.need_move = false;
            }
        }

        // Move power
        let engine = if action.as_move().is_some() {
            Some(action)
        } else {
            self.find_best_engine()
        };
        if let (true, Some(location), Some(engine)) = (result.need_move, move_target, engine) {
            result.total_move_ap = engine.power_usage(battle, ship, Some(&location));
            result.can_move = power > 0;
            result.can_end_move = result.total_move_ap <= power;
            result.move_location = location;
            result.parts.push(MoveFirePart {
                action: engine.id,
                target: location,
                power: result.total_move_ap,
                possible: result.can_move,
            });
            power -= result.total_move_ap;
        }

        // Action power
        if action.as_move().is_some() {
            result.success = result.need_move && result.can_move;
        } else {
            result.need_fire = true;
            result.total_fire_ap = action.power_usage(battle, ship, Some(&target));
            result.can_fire = result.total_fire_ap <= power;
            result.fire_location = target;
            result.parts.push(MoveFirePart {
                action: action.id,
                target,
                power: result.total_fire_ap,
                possible: (!result.need_move || result.can_end_move) && result.can_fire,
            });
            result.success = true;
        }

        result.complete = (!result.need_move || result.can_end_move) && (!result.need_fire || result.can_fire);
        result
    }
}
