//! Bully AI: shoot the nearest enemy, or move towards one

use ordered_float::OrderedFloat;

use crate::battle::actions::Action;
use crate::battle::ai::maneuver::Maneuver;
use crate::battle::ai::{BattleAi, WorkStep};
use crate::battle::effects::EffectKind;
use crate::battle::geometry::arena_distance;
use crate::battle::ship::Ship;
use crate::battle::ship_value::ShipValueName;
use crate::battle::state::Battle;
use crate::core::random::{RandomGenerator, SeededRandom};
use crate::core::types::ShipId;

/// Share of the remaining gap covered by a fallback move
const APPROACH_FACTOR: f64 = 0.5;

pub struct BullyAi {
    rng: Box<dyn RandomGenerator + Send>,
    /// Absorbs floating-point rounding on engine ranges
    pub move_margin: f64,
    pending: bool,
}

impl BullyAi {
    pub fn new(rng: Box<dyn RandomGenerator + Send>) -> Self {
        Self {
            rng,
            move_margin: 0.1,
            pending: false,
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(Box::new(SeededRandom::new(seed)))
    }

    /// Weapons with a damaging effect
    fn weapons(ship: &Ship) -> Vec<&Action> {
        ship.actions
            .list_all()
            .filter(|action| {
                action.as_trigger().is_some_and(|trigger| {
                    trigger
                        .effects
                        .iter()
                        .any(|effect| matches!(effect.kind, EffectKind::Damage { .. }))
                })
            })
            .collect()
    }

    /// Every weapon on every enemy that can actually fire this turn
    pub fn list_maneuvers(&self, battle: &Battle, ship: &Ship) -> Vec<Maneuver> {
        let weapons = Self::weapons(ship);
        battle
            .enemies(ship.fleet_id, true)
            .flat_map(|enemy| {
                weapons
                    .iter()
                    .map(move |weapon| Maneuver::with_margin(battle, ship, weapon, enemy.target(), self.move_margin))
            })
            .filter(|maneuver| maneuver.simulation.can_fire && maneuver.is_possible())
            .collect()
    }

    /// Maneuver firing from the nearest location
    pub fn pick_maneuver(ship: &Ship, maneuvers: Vec<Maneuver>) -> Option<Maneuver> {
        maneuvers.into_iter().min_by_key(|maneuver| {
            OrderedFloat(arena_distance(ship.position(), maneuver.simulation.fire_location.location()))
        })
    }

    /// Move half way to a random enemy, stopping short of its safety distance
    pub fn fallback_maneuver(&mut self, battle: &Battle, ship: &Ship) -> Option<Maneuver> {
        let enemies: Vec<&Ship> = battle.enemies(ship.fleet_id, true).collect();
        let picked = enemies[self.rng.choice_index(enemies.len())?];
        let engine = ship.first_engine()?;
        let move_action = engine.as_move()?;

        let distance = ship.distance_to(picked);
        if distance <= move_action.safety_distance {
            return None;
        }
        let target = picked.target().constraint_in_range(
            ship.arena_x,
            ship.arena_y,
            (distance - move_action.safety_distance) * APPROACH_FACTOR,
        );
        let target = move_action.check_location_target(battle, ship, target)?;
        Some(Maneuver::new(battle, ship, engine, target))
    }
}

impl BattleAi for BullyAi {
    fn name(&self) -> &str {
        "bully"
    }

    fn init_work(&mut self, battle: &Battle, ship_id: ShipId) {
        self.pending = battle
            .ship(ship_id)
            .is_some_and(|ship| ship.get_value(ShipValueName::Power) > 0);
    }

    fn do_work_unit(&mut self, battle: &mut Battle, ship_id: ShipId) -> WorkStep {
        if !self.pending {
            return WorkStep::Done;
        }
        let Some(ship) = battle.ship(ship_id) else {
            return WorkStep::Done;
        };

        let maneuvers = self.list_maneuvers(battle, ship);
        if let Some(maneuver) = Self::pick_maneuver(ship, maneuvers) {
            tracing::debug!(ship = %ship_id, action = %maneuver.action.code, "Bully AI shoots");
            if maneuver.apply(battle) {
                // Try another shot
                self.init_work(battle, ship_id);
                return WorkStep::Applied;
            }
            return WorkStep::Done;
        }

        self.pending = false;
        match self.fallback_maneuver(battle, ship) {
            Some(maneuver) => {
                tracing::debug!(ship = %ship_id, "Bully AI moves towards an enemy");
                if maneuver.apply(battle) {
                    WorkStep::Applied
                } else {
                    WorkStep::Done
                }
            }
            None => WorkStep::Done,
        }
    }
}
