//! Ship maneuver: an action on a target, with the move needed to reach it

use crate::battle::actions::{Action, ActionKind, ActionTargettingMode};
use crate::battle::diffs::BattleDiff;
use crate::battle::effects::EffectSource;
use crate::battle::geometry::{ArenaLocation, Target};
use crate::battle::ship::Ship;
use crate::battle::simulator::{MoveFireResult, MoveFireSimulator};
use crate::battle::state::Battle;
use crate::core::types::{ActionId, ShipId};

/// Move margin of maneuvers, to absorb rounding on the engine range
pub const DEFAULT_MOVE_MARGIN: f64 = 1.0;

/// An action the AI considers, simulated against the current battle
#[derive(Debug, Clone)]
pub struct Maneuver {
    pub ship: ShipId,
    pub action: Action,
    pub target: Target,
    pub simulation: MoveFireResult,
    /// Guessed diffs on impacted ships (not applied)
    pub effects: Vec<BattleDiff>,
    origin: ArenaLocation,
}

impl Maneuver {
    pub fn new(battle: &Battle, ship: &Ship, action: &Action, target: Target) -> Self {
        Self::with_margin(battle, ship, action, target, DEFAULT_MOVE_MARGIN)
    }

    pub fn with_margin(battle: &Battle, ship: &Ship, action: &Action, target: Target, move_margin: f64) -> Self {
        let simulation = MoveFireSimulator::new(ship).simulate_action(battle, action, target, move_margin);
        let mut maneuver = Self {
            ship: ship.id,
            action: action.clone(),
            target,
            simulation,
            effects: Vec::new(),
            origin: ship.position(),
        };
        maneuver.effects = maneuver.guess_effects(battle, ship);
        maneuver
    }

    /// Something of the maneuver can be done this turn
    pub fn is_possible(&self) -> bool {
        self.simulation.success && self.simulation.parts.iter().any(|part| part.possible)
    }

    /// The maneuver cannot be fully done this turn
    pub fn is_incomplete(&self) -> bool {
        let simulation = &self.simulation;
        (simulation.need_move && !simulation.can_end_move) || (simulation.need_fire && !simulation.can_fire)
    }

    /// Another maneuver could follow on the same ship
    pub fn may_continue(&self, battle: &Battle) -> bool {
        battle.playing_ship_id() == Some(self.ship) && !self.is_incomplete() && !self.action.is_end_turn()
    }

    /// Location of the ship once the maneuver is done
    pub fn final_location(&self) -> ArenaLocation {
        if self.simulation.need_move {
            self.simulation.move_location.location()
        } else {
            self.origin
        }
    }

    pub fn power_usage(&self) -> i32 {
        self.simulation.total_move_ap + self.simulation.total_fire_ap
    }

    /// Apply the simulated parts in order
    ///
    /// Stops at the first impossible or failing part. Turn ends are never
    /// applied here. Returns true if every part was applied.
    pub fn apply(&self, battle: &mut Battle) -> bool {
        if !self.simulation.success || battle.playing_ship_id() != Some(self.ship) {
            return false;
        }
        for part in &self.simulation.parts {
            if part.action == ActionId::END_TURN
                || !part.possible
                || !battle.apply_one_action(part.action, Some(part.target))
            {
                return false;
            }
        }
        true
    }

    fn guess_effects(&self, battle: &Battle, ship: &Ship) -> Vec<BattleDiff> {
        let source = EffectSource::Ship(ship.id);
        let mut result = Vec::new();

        match &self.action.kind {
            ActionKind::Trigger(trigger) => {
                let fire_from = self.final_location();
                for impacted in trigger.impacted_ships(battle, &self.target, fire_from) {
                    if let Some(impacted) = battle.ship(impacted) {
                        for effect in &trigger.effects {
                            result.extend(effect.on_diffs(battle, impacted, source, 1.0));
                        }
                    }
                }
            }
            ActionKind::DeployDrone(deploy)
                if self.action.targetting_mode(battle, ship) == ActionTargettingMode::Space =>
            {
                for impacted in battle.collect_ships_in_circle(self.target.location(), deploy.effect_radius, true) {
                    if let Some(impacted) = battle.ship(impacted) {
                        for effect in &deploy.effects {
                            result.extend(effect.on_diffs(battle, impacted, source, 1.0));
                        }
                    }
                }
            }
            ActionKind::Toggle(toggle) => {
                result.extend(toggle.specific_diffs(self.action.id, battle, ship, true));
            }
            ActionKind::Vigilance(vigilance) => {
                result.extend(vigilance.toggle.specific_diffs(self.action.id, battle, ship, false));
            }
            _ => {}
        }

        // Area effects on final location
        let location = self.final_location();
        for drone in battle.drones() {
            if drone.is_in_range(location.x, location.y) {
                for effect in &drone.effects {
                    result.extend(effect.on_diffs(battle, ship, EffectSource::Drone(drone.id), 1.0));
                }
            }
        }

        result
    }
}
