//! Drone deployment (and recall of the deployed drone)

use serde::{Deserialize, Serialize};

use crate::battle::actions::ActionTargettingMode;
use crate::battle::diffs::BattleDiff;
use crate::battle::drone::Drone;
use crate::battle::effects::Effect;
use crate::battle::geometry::Target;
use crate::battle::ship::Ship;
use crate::battle::state::Battle;
use crate::core::types::ActionId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployDroneAction {
    /// Code given to deployed drones
    pub drone_code: String,
    pub power: i32,
    /// Maximal distance from the ship to the drone
    pub deploy_distance: f64,
    /// Number of activations before the drone is destroyed
    pub lifetime: u32,
    pub effect_radius: f64,
    pub effects: Vec<Effect>,
}

impl DeployDroneAction {
    pub fn new(drone_code: &str, power: i32, deploy_distance: f64, lifetime: u32, effect_radius: f64) -> Self {
        Self {
            drone_code: drone_code.to_string(),
            power,
            deploy_distance,
            lifetime,
            effect_radius,
            effects: Vec::new(),
        }
    }

    pub fn with_effects(mut self, effects: Vec<Effect>) -> Self {
        self.effects = effects;
        self
    }

    /// Drone previously deployed by this action, still in the arena
    fn deployed<'a>(&self, action_id: ActionId, battle: &'a Battle, ship: &Ship) -> Option<&'a Drone> {
        battle
            .drones()
            .find(|drone| drone.owner == ship.id && drone.parent == Some(action_id))
    }

    pub fn targetting_mode(&self, action_id: ActionId, battle: &Battle, ship: &Ship) -> ActionTargettingMode {
        if self.deployed(action_id, battle, ship).is_some() {
            ActionTargettingMode::SelfOnly
        } else {
            ActionTargettingMode::Space
        }
    }

    pub fn default_target(&self, action_id: ActionId, battle: &Battle, ship: &Ship) -> Target {
        if self.deployed(action_id, battle, ship).is_some() {
            ship.target()
        } else {
            Target::from_location(
                ship.arena_x + ship.arena_angle.cos() * self.deploy_distance,
                ship.arena_y + ship.arena_angle.sin() * self.deploy_distance,
            )
        }
    }

    /// Recalling is free
    pub fn power_usage(&self, action_id: ActionId, battle: &Battle, ship: &Ship) -> i32 {
        if self.deployed(action_id, battle, ship).is_some() {
            0
        } else {
            self.power
        }
    }

    pub fn check_target(&self, action_id: ActionId, battle: &Battle, ship: &Ship, target: Target) -> Option<Target> {
        if self.deployed(action_id, battle, ship).is_some() {
            (target.ship_id == Some(ship.id)).then_some(target)
        } else if target.is_ship() {
            None
        } else {
            Some(target.constraint_in_range(ship.arena_x, ship.arena_y, self.deploy_distance))
        }
    }

    /// Deploy a new drone at the target, or recall the existing one
    pub fn specific_diffs(
        &self,
        action_id: ActionId,
        battle: &Battle,
        ship: &Ship,
        target: &Target,
    ) -> Vec<BattleDiff> {
        if let Some(drone) = self.deployed(action_id, battle, ship) {
            return vec![BattleDiff::DroneDestroyed {
                drone: drone.clone(),
            }];
        }

        let mut drone = Drone::new(&battle.ids, ship.id, &self.drone_code, self.lifetime);
        drone.x = target.x;
        drone.y = target.y;
        drone.radius = self.effect_radius;
        drone.effects = self.effects.clone();
        drone.parent = Some(action_id);
        vec![BattleDiff::DroneDeployed { drone }]
    }

    pub fn description(&self) -> String {
        let header = format!(
            "Deploy drone for {} activation{} (power usage {}, max range {}km)",
            self.lifetime,
            if self.lifetime > 1 { "s" } else { "" },
            self.power,
            self.deploy_distance
        );
        let effects: Vec<String> = self
            .effects
            .iter()
            .map(|effect| {
                format!(
                    "• {} for ships in {}km radius",
                    effect.description(),
                    self.effect_radius
                )
            })
            .collect();
        format!("{}:\n{}", header, effects.join("\n"))
    }
}
