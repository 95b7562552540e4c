//! Battle state machine
//!
//! A battle owns the two engaged fleets, the play order and the drones.
//! After [`Battle::start`], every change goes through [`Battle::apply_diffs`],
//! which logs the diffs and notifies event subscribers.
//!
//! Turn flow: the playing ship applies actions through
//! [`Battle::apply_one_action`]; each action is followed by the checks pass,
//! and the end-turn action hands over to the next ship of the play order.

use std::cmp::Reverse;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::battle::actions::Action;
use crate::battle::checks::BattleChecks;
use crate::battle::diffs::BattleDiff;
use crate::battle::drone::Drone;
use crate::battle::effects::{Effect, EffectSource};
use crate::battle::equipment::Equipment;
use crate::battle::fleet::Fleet;
use crate::battle::geometry::{ArenaLocation, Target};
use crate::battle::log::{BattleEvent, DiffLog, EventBus};
use crate::battle::outcome::BattleOutcome;
use crate::battle::ship::Ship;
use crate::battle::ship_value::ShipValueName;
use crate::core::config::BattleConfig;
use crate::core::error::{FleetError, Result};
use crate::core::random::RandomGenerator;
use crate::core::types::{ActionId, Cycle, DroneId, FleetId, IdAllocator, ShipId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Battle {
    pub fleets: Vec<Fleet>,
    /// Ships sorted by initiative throw (dead ships are removed)
    pub play_order: Vec<ShipId>,
    pub play_index: usize,
    pub playing_ship: Option<ShipId>,
    /// One cycle is one turn played by every ship of the play order
    pub cycle: Cycle,
    /// Deployed drones, sorted by id
    pub drones: Vec<Drone>,
    pub log: DiffLog,
    pub ended: bool,
    pub outcome: Option<BattleOutcome>,
    pub config: BattleConfig,
    pub ids: IdAllocator,
    #[serde(skip)]
    pub events: EventBus,
}

impl Battle {
    /// Battle between an attacker and a defender fleet
    ///
    /// `ids` is the allocator the fleets were built with.
    pub fn new(attacker: Fleet, defender: Fleet, ids: IdAllocator) -> Self {
        Self {
            fleets: vec![attacker, defender],
            play_order: Vec::new(),
            play_index: 0,
            playing_ship: None,
            cycle: 0,
            drones: Vec::new(),
            log: DiffLog::new(),
            ended: false,
            outcome: None,
            config: BattleConfig::default(),
            ids,
            events: EventBus::new(),
        }
    }

    pub fn with_config(mut self, config: BattleConfig) -> Self {
        self.config = config;
        self
    }

    // === LOOKUP ===

    pub fn fleet(&self, id: FleetId) -> Option<&Fleet> {
        self.fleets.iter().find(|fleet| fleet.id == id)
    }

    /// Every engaged ship, fleet by fleet
    pub fn ships(&self) -> impl Iterator<Item = &Ship> {
        self.fleets.iter().flat_map(|fleet| fleet.ships.iter())
    }

    pub fn alive_ships(&self) -> impl Iterator<Item = &Ship> {
        self.ships().filter(|ship| ship.alive)
    }

    pub fn ship(&self, id: ShipId) -> Option<&Ship> {
        self.ships().find(|ship| ship.id == id)
    }

    pub fn ship_mut(&mut self, id: ShipId) -> Option<&mut Ship> {
        self.fleets
            .iter_mut()
            .flat_map(|fleet| fleet.ships.iter_mut())
            .find(|ship| ship.id == id)
    }

    /// Ship lookup, failing with [`FleetError::ShipNotFound`]
    pub fn get_ship(&self, id: ShipId) -> Result<&Ship> {
        self.ship(id).ok_or(FleetError::ShipNotFound(id))
    }

    /// Ships belonging to a fleet
    pub fn allies(&self, fleet: FleetId, alive_only: bool) -> impl Iterator<Item = &Ship> {
        self.ships()
            .filter(move |ship| ship.fleet_id == fleet && (ship.alive || !alive_only))
    }

    /// Ships not belonging to a fleet
    pub fn enemies(&self, fleet: FleetId, alive_only: bool) -> impl Iterator<Item = &Ship> {
        self.ships()
            .filter(move |ship| ship.fleet_id != fleet && (ship.alive || !alive_only))
    }

    pub fn drones(&self) -> impl Iterator<Item = &Drone> {
        self.drones.iter()
    }

    pub fn drone(&self, id: DroneId) -> Option<&Drone> {
        self.drones.iter().find(|drone| drone.id == id)
    }

    pub fn drone_mut(&mut self, id: DroneId) -> Option<&mut Drone> {
        self.drones.iter_mut().find(|drone| drone.id == id)
    }

    pub fn add_drone(&mut self, drone: Drone) {
        let index = self.drones.partition_point(|existing| existing.id < drone.id);
        self.drones.insert(index, drone);
    }

    pub fn remove_drone(&mut self, id: DroneId) -> Option<Drone> {
        let index = self.drones.iter().position(|drone| drone.id == id)?;
        Some(self.drones.remove(index))
    }

    /// Ships within a radius of a point
    pub fn collect_ships_in_circle(&self, center: ArenaLocation, radius: f64, alive_only: bool) -> Vec<ShipId> {
        self.ships()
            .filter(|ship| (ship.alive || !alive_only) && ship.distance_to_location(center) <= radius)
            .map(|ship| ship.id)
            .collect()
    }

    /// Area effects expected on a ship: drones in range, then active toggles
    /// of alive ships covering it
    pub fn area_effects<'a>(&'a self, ship: &'a Ship) -> Vec<(EffectSource, &'a Effect)> {
        let from_drones = self
            .drones()
            .filter(|drone| drone.is_in_range(ship.arena_x, ship.arena_y))
            .flat_map(|drone| {
                drone
                    .effects
                    .iter()
                    .map(move |effect| (EffectSource::Drone(drone.id), effect))
            });
        let from_toggles = self.alive_ships().flat_map(|owner| {
            owner
                .area_effects(ship)
                .map(move |effect| (EffectSource::Ship(owner.id), effect))
        });
        from_drones.chain(from_toggles).collect()
    }

    // === TURNS ===

    pub fn playing_ship_id(&self) -> Option<ShipId> {
        self.playing_ship
    }

    pub fn playing_ship(&self) -> Option<&Ship> {
        self.playing_ship.and_then(|id| self.ship(id))
    }

    /// Whether a fleet may act right now
    pub fn can_play(&self, fleet: FleetId) -> bool {
        !self.ended
            && self
                .playing_ship()
                .map(|ship| ship.fleet_id == fleet && ship.is_able_to_play(false))
                .unwrap_or(false)
    }

    /// Throw every ship's initiative and sort the play order
    ///
    /// Equal throws keep the fleet order.
    pub fn throw_initiative<R: RandomGenerator>(&mut self, rng: &mut R) {
        let mut throws: Vec<(ShipId, f64)> = Vec::new();
        for ship in self.fleets.iter_mut().flat_map(|fleet| fleet.ships.iter_mut()) {
            ship.throw_initiative(rng);
            throws.push((ship.id, ship.play_priority));
        }
        throws.sort_by_key(|(_, priority)| Reverse(OrderedFloat(*priority)));
        self.play_order = throws.into_iter().map(|(id, _)| id).collect();
        self.play_index = 0;
        self.playing_ship = None;
    }

    pub fn play_order_index(&self, ship: ShipId) -> Option<usize> {
        self.play_order.iter().position(|id| *id == ship)
    }

    /// Number of turns before a ship plays (0 for the playing ship)
    pub fn play_order_distance(&self, ship: ShipId) -> Option<usize> {
        let index = self.play_order_index(ship)?;
        let len = self.play_order.len();
        Some((index + len - self.play_index % len) % len)
    }

    /// Remove a ship from the play order, returning its former index
    pub fn remove_from_play_order(&mut self, ship: ShipId) -> Option<usize> {
        let index = self.play_order_index(ship)?;
        self.play_order.remove(index);
        if index < self.play_index {
            self.play_index -= 1;
        }
        Some(index)
    }

    /// Put a ship back in the play order (the play index is left untouched)
    pub fn insert_in_play_order(&mut self, index: usize, ship: ShipId) {
        let index = index.min(self.play_order.len());
        self.play_order.insert(index, ship);
    }

    pub fn set_playing_ship(&mut self, ship: ShipId) {
        self.playing_ship = Some(ship);
        if let Some(index) = self.play_order_index(ship) {
            self.play_index = index;
        }
    }

    /// Ship playing after the current one (dead ships are skipped)
    pub fn next_ship(&self) -> Option<&Ship> {
        let len = self.play_order.len();
        if len == 0 {
            return None;
        }
        let start = match self.playing_ship {
            Some(id) if self.play_order.get(self.play_index) == Some(&id) => self.play_index + 1,
            Some(_) => self.play_index,
            None => 0,
        };
        (0..len)
            .map(|offset| self.play_order[(start + offset) % len])
            .filter_map(|id| self.ship(id))
            .find(|ship| ship.alive)
    }

    /// Place both fleets on facing vertical lines
    pub fn place_ships(&mut self) {
        let width = self.config.arena_width;
        let height = self.config.arena_height;
        let spacing = height * self.config.formation_spacing_ratio;
        if let Some(fleet) = self.fleets.get_mut(0) {
            place_fleet_ships(fleet, width * 0.25, height * 0.5, 0.0, spacing);
        }
        if let Some(fleet) = self.fleets.get_mut(1) {
            place_fleet_ships(fleet, width * 0.75, height * 0.5, std::f64::consts::PI, spacing);
        }
    }

    /// Start the battle, without logging anything
    pub fn start<R: RandomGenerator>(&mut self, rng: &mut R) {
        self.outcome = None;
        self.ended = false;
        self.cycle = 1;
        self.drones.clear();
        for ship in self.fleets.iter_mut().flat_map(|fleet| fleet.ships.iter_mut()) {
            ship.restore_initial_state();
        }
        self.place_ships();
        self.throw_initiative(rng);
        if let Some(first) = self.play_order.first().copied() {
            self.set_playing_ship(first);
        }
        tracing::info!(
            ships = self.play_order.len(),
            playing = ?self.playing_ship,
            "Battle started"
        );
    }

    /// End the playing ship's turn (or pick the first ship when none plays)
    pub fn advance_to_next_ship(&mut self) -> bool {
        if self.playing_ship.is_some() {
            self.apply_one_action(ActionId::END_TURN, None)
        } else if let Some(first) = self.play_order.first().copied() {
            self.set_playing_ship(first);
            true
        } else {
            false
        }
    }

    // === MUTATION ===

    /// Apply diffs in order, logging them and notifying subscribers
    pub fn apply_diffs(&mut self, diffs: Vec<BattleDiff>) {
        for mut diff in diffs {
            diff.apply(self);
            let event = BattleEvent::new(self.log.count(), self.cycle, false, &diff);
            if let BattleDiff::ShipChange { new_ship, .. } = &diff {
                tracing::debug!(ship = %new_ship, cycle = self.cycle, "Turn change");
            }
            self.log.add(diff);
            self.events.publish(&event);
        }
    }

    /// Apply an effect on a ship right away, at full success
    ///
    /// Returns true if the effect changed anything.
    pub fn apply_effect(&mut self, effect: &Effect, ship_id: ShipId, source: EffectSource) -> bool {
        self.apply_effect_with_success(effect, ship_id, source, 1.0)
    }

    pub fn apply_effect_with_success(
        &mut self,
        effect: &Effect,
        ship_id: ShipId,
        source: EffectSource,
        success: f64,
    ) -> bool {
        let diffs = match self.ship(ship_id) {
            Some(ship) => effect.on_diffs(self, ship, source, success),
            None => {
                tracing::error!(ship = %ship_id, "Cannot apply effect, ship not found");
                return false;
            }
        };
        if diffs.is_empty() {
            false
        } else {
            self.apply_diffs(diffs);
            true
        }
    }

    /// Run the checks pass, returning the diffs it applied
    pub fn perform_checks(&mut self) -> Vec<BattleDiff> {
        BattleChecks::new().apply(self)
    }

    /// Apply an action of the playing ship, then the checks pass
    ///
    /// Without target, the action's default one is used. A playing ship
    /// left without hull has its turn ended automatically.
    pub fn apply_one_action(&mut self, action_id: ActionId, target: Option<Target>) -> bool {
        if self.ended {
            tracing::warn!(action = %action_id, "Cannot apply action, battle has ended");
            return false;
        }
        let Some(ship_id) = self.playing_ship else {
            tracing::error!(action = %action_id, "Cannot apply action, no ship playing");
            return false;
        };
        let Some(action) = self.find_action(ship_id, action_id) else {
            tracing::warn!(action = %action_id, ship = %ship_id, "Cannot apply action, not available");
            return false;
        };

        if !action.apply(self, ship_id, target) {
            return false;
        }

        self.perform_checks();

        if !self.ended {
            self.apply_diffs(vec![BattleDiff::ShipActionEnded { ship_id }]);

            let hull = self.ship(ship_id).map(|ship| ship.get_value(ShipValueName::Hull));
            if self.playing_ship == Some(ship_id) && hull.is_some_and(|hull| hull <= 0) {
                tracing::debug!(ship = %ship_id, "Playing ship destroyed, ending its turn");
                self.apply_one_action(ActionId::END_TURN, None);
            }
        }

        true
    }

    fn find_action(&self, ship_id: ShipId, action_id: ActionId) -> Option<Action> {
        self.ship(ship_id)
            .and_then(|ship| ship.actions.get(action_id))
            .cloned()
    }

    /// Revert the last action (with its checks and follow-ups)
    ///
    /// Reverted diffs are dropped from the log. Returns false if no action
    /// was found in the log (it is then fully reverted).
    pub fn revert_one_action(&mut self) -> bool {
        while let Some(diff) = self.log.pop() {
            diff.revert(self);
            let event = BattleEvent::new(self.log.count(), self.cycle, true, &diff);
            self.events.publish(&event);
            if matches!(diff, BattleDiff::ShipActionUsed { .. }) {
                return true;
            }
        }
        false
    }

    /// End the battle through a logged diff
    pub fn end_battle(&mut self, winner: Option<FleetId>) {
        self.apply_diffs(vec![BattleDiff::EndBattle { winner }]);
    }

    /// Record the end of the battle (diff application only)
    pub fn mark_ended(&mut self, winner: Option<FleetId>) {
        self.ended = true;
        self.outcome = Some(BattleOutcome::new(winner, self.cycle));
        tracing::info!(winner = ?winner, cycle = self.cycle, "Battle ended");
    }

    /// Cancel the end of the battle (diff revert only)
    pub fn resume_battle(&mut self) {
        self.ended = false;
        self.outcome = None;
    }

    pub fn ended(&self) -> bool {
        self.ended
    }

    /// Salvage the wrecks into the outcome loot (once the battle has ended)
    pub fn collect_loot<R: RandomGenerator>(&mut self, rng: &mut R) -> Result<&[Equipment]> {
        let outcome = self.outcome.as_mut().ok_or(FleetError::BattleNotEnded)?;
        outcome.collect_loot(&mut self.fleets, rng);
        Ok(&outcome.loot)
    }

    // === SERIALIZATION ===

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restore a battle (event subscribers are not restored)
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Line up a fleet, centered on (x, y), perpendicular to its facing angle
fn place_fleet_ships(fleet: &mut Fleet, x: f64, y: f64, facing_angle: f64, spacing: f64) {
    let side_angle = facing_angle + std::f64::consts::FRAC_PI_2;
    let total_length = spacing * fleet.ships.len().saturating_sub(1) as f64;
    let (dx, dy) = (side_angle.cos(), side_angle.sin());
    let x = x - dx * total_length * 0.5;
    let y = y - dy * total_length * 0.5;
    for (i, ship) in fleet.ships.iter_mut().enumerate() {
        ship.set_arena_position(x + i as f64 * dx * spacing, y + i as f64 * dy * spacing);
        ship.set_arena_facing_angle(facing_angle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::actions::{TargetFilter, ToggleAction};
    use crate::battle::effects::EffectKind;
    use crate::battle::loadout::ShipBuilder;
    use crate::core::random::SkewedRandom;
    use std::sync::{Arc, Mutex};

    /// Two fleets of two ships, started with a fixed initiative
    fn started_battle() -> (Battle, Vec<ShipId>) {
        let ids = IdAllocator::new();
        let mut fleet1 = Fleet::new(&ids, "Attacker");
        let mut fleet2 = Fleet::new(&ids, "Defender");
        let ships = vec![
            fleet1.add_ship(ShipBuilder::new("a1").maneuvrability(2).build(&ids)),
            fleet1.add_ship(ShipBuilder::new("a2").maneuvrability(2).build(&ids)),
            fleet2.add_ship(ShipBuilder::new("d1").maneuvrability(2).build(&ids)),
            fleet2.add_ship(ShipBuilder::new("d2").maneuvrability(2).build(&ids)),
        ];
        let mut battle = Battle::new(fleet1, fleet2, ids);
        battle.start(&mut SkewedRandom::new(vec![0.9, 0.2, 0.7, 0.4]));
        (battle, ships)
    }

    #[test]
    fn test_initiative_order() {
        let (battle, ships) = started_battle();
        assert_eq!(battle.play_order, vec![ships[0], ships[2], ships[3], ships[1]]);
        assert_eq!(battle.playing_ship_id(), Some(ships[0]));
        assert_eq!(battle.cycle, 1);
        assert_eq!(battle.log.count(), 0);
    }

    #[test]
    fn test_initiative_ties_keep_fleet_order() {
        let (mut battle, ships) = started_battle();
        battle.throw_initiative(&mut SkewedRandom::new(vec![0.5, 0.5, 0.5, 0.5]));
        assert_eq!(battle.play_order, ships);
    }

    #[test]
    fn test_ship_placement() {
        let (battle, ships) = started_battle();
        let a1 = battle.ship(ships[0]).unwrap();
        let a2 = battle.ship(ships[1]).unwrap();
        let d1 = battle.ship(ships[2]).unwrap();
        assert_eq!(a1.arena_x, 452.0);
        assert!((a1.arena_y - 379.2).abs() < 1e-6);
        assert!((a2.arena_y - 568.8).abs() < 1e-6);
        assert_eq!(a1.arena_angle, 0.0);
        assert_eq!(d1.arena_x, 1356.0);
        assert_eq!(d1.arena_angle, std::f64::consts::PI);
    }

    #[test]
    fn test_play_order_distance() {
        let (mut battle, ships) = started_battle();
        assert_eq!(battle.play_order_distance(ships[0]), Some(0));
        assert_eq!(battle.play_order_distance(ships[1]), Some(3));
        battle.set_playing_ship(ships[3]);
        assert_eq!(battle.play_order_distance(ships[0]), Some(2));
        assert_eq!(battle.play_order_distance(ships[1]), Some(1));
    }

    #[test]
    fn test_turns_cycle_through_play_order() {
        let (mut battle, ships) = started_battle();
        let order = battle.play_order.clone();
        for expected in order.iter().skip(1) {
            assert!(battle.advance_to_next_ship());
            assert_eq!(battle.playing_ship_id(), Some(*expected));
            assert_eq!(battle.cycle, 1);
        }
        assert!(battle.advance_to_next_ship());
        assert_eq!(battle.playing_ship_id(), Some(ships[0]));
        assert_eq!(battle.cycle, 2);
    }

    #[test]
    fn test_dead_ships_are_skipped() {
        let (mut battle, ships) = started_battle();
        // a1 plays, d1 is next
        let death = battle.ship(ships[2]).unwrap().get_death_diffs();
        battle.apply_diffs(death);
        assert_eq!(battle.play_order, vec![ships[0], ships[3], ships[1]]);
        assert_eq!(battle.next_ship().map(|ship| ship.id), Some(ships[3]));

        // Playing ship death keeps the turn flow
        let death = battle.ship(ships[0]).unwrap().get_death_diffs();
        battle.apply_diffs(death);
        assert_eq!(battle.play_order, vec![ships[3], ships[1]]);
        assert_eq!(battle.next_ship().map(|ship| ship.id), Some(ships[3]));
    }

    #[test]
    fn test_death_revert_restores_play_order() {
        let (mut battle, ships) = started_battle();
        battle.set_playing_ship(ships[3]);
        let before = (battle.play_order.clone(), battle.play_index);

        let death = battle.ship(ships[2]).unwrap().get_death_diffs();
        battle.apply_diffs(death);
        assert_eq!(battle.play_index, 1);
        assert!(!battle.ship(ships[2]).unwrap().alive);

        while let Some(diff) = battle.log.pop() {
            diff.revert(&mut battle);
        }
        assert_eq!((battle.play_order.clone(), battle.play_index), before);
        assert!(battle.ship(ships[2]).unwrap().alive);
    }

    #[test]
    fn test_can_play() {
        let (mut battle, ships) = started_battle();
        let attacker = battle.fleets[0].id;
        let defender = battle.fleets[1].id;
        assert!(battle.can_play(attacker));
        assert!(!battle.can_play(defender));
        battle.set_playing_ship(ships[2]);
        assert!(battle.can_play(defender));
        battle.end_battle(Some(defender));
        assert!(!battle.can_play(defender));
    }

    #[test]
    fn test_end_battle_is_logged_and_revertible() {
        let (mut battle, _) = started_battle();
        let winner = battle.fleets[1].id;
        battle.end_battle(Some(winner));
        assert!(battle.ended());
        assert_eq!(battle.outcome.as_ref().and_then(|outcome| outcome.winner), Some(winner));
        assert_eq!(battle.log.count(), 1);
        assert!(!battle.apply_one_action(ActionId::END_TURN, None));

        assert!(!battle.revert_one_action());
        assert!(!battle.ended());
        assert!(battle.outcome.is_none());
    }

    #[test]
    fn test_apply_effect() {
        let (mut battle, ships) = started_battle();
        let damage = Effect::new(&battle.ids, EffectKind::Damage { base: 3, span: 0 });
        let source = EffectSource::Ship(ships[2]);
        assert!(battle.apply_effect(&damage, ships[0], source));
        assert_eq!(battle.ship(ships[0]).unwrap().get_value(ShipValueName::Hull), 7);
        assert!(!battle.apply_effect(&damage, ShipId(999), source));

        let pinned = Effect::new(&battle.ids, EffectKind::Pinned { hard: false });
        assert!(!battle.apply_effect(&pinned, ships[0], source));
    }

    #[test]
    fn test_revert_one_action() {
        let (mut battle, ships) = started_battle();
        let power = battle.ship(ships[0]).unwrap().get_value(ShipValueName::Power);
        assert!(battle.apply_one_action(ActionId::END_TURN, None));
        assert_eq!(battle.playing_ship_id(), Some(ships[2]));

        assert!(battle.revert_one_action());
        assert_eq!(battle.playing_ship_id(), Some(ships[0]));
        assert_eq!(battle.ship(ships[0]).unwrap().get_value(ShipValueName::Power), power);
        assert_eq!(battle.log.count(), 0);
    }

    #[test]
    fn test_events_are_published() {
        let (mut battle, _) = started_battle();
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        battle.events.subscribe(move |event| {
            if let Ok(mut events) = sink.lock() {
                events.push(event.clone());
            }
        });

        battle.advance_to_next_ship();
        let events = received.lock().unwrap();
        assert_eq!(events.len(), battle.log.count());
        assert!(events.iter().all(|event| !event.reverted));
        assert!(events.iter().enumerate().all(|(i, event)| event.index == i));
    }

    #[test]
    fn test_area_effects_from_drones() {
        let (mut battle, ships) = started_battle();
        let effect = Effect::new(&battle.ids, EffectKind::Pinned { hard: false });
        let owner = ships[0];
        let position = battle.ship(ships[2]).unwrap().position();
        let mut drone = Drone::new(&battle.ids, owner, "pin", 2);
        drone.x = position.x;
        drone.y = position.y + 50.0;
        drone.radius = 60.0;
        drone.effects = vec![effect.clone()];
        let drone_id = drone.id;
        battle.add_drone(drone);

        let ship = battle.ship(ships[2]).unwrap();
        assert_eq!(
            battle.area_effects(ship),
            vec![(EffectSource::Drone(drone_id), &effect)]
        );
        let other = battle.ship(ships[3]).unwrap();
        assert!(battle.area_effects(other).is_empty());
    }

    #[test]
    fn test_area_effects_from_toggles() {
        let (mut battle, ships) = started_battle();
        let effect = Effect::new(&battle.ids, EffectKind::DamageModifier { factor: -20 });
        let field = ToggleAction::new(2, 200.0, vec![effect.clone()]).with_filter(TargetFilter::Allies);
        let action = Action::toggle(&battle.ids, "field", "Field", field);
        let owner = battle.ship_mut(ships[0]).unwrap();
        let action_id = owner.actions.add_custom(action);

        let ally = battle.ship(ships[1]).unwrap();
        assert!(battle.area_effects(ally).is_empty());

        battle.ship_mut(ships[0]).unwrap().actions.toggle(action_id, true);
        let ally = battle.ship(ships[1]).unwrap();
        assert_eq!(
            battle.area_effects(ally),
            vec![(EffectSource::Ship(ships[0]), &effect)]
        );
        let enemy = battle.ship(ships[2]).unwrap();
        assert!(battle.area_effects(enemy).is_empty());
    }

    #[test]
    fn test_collect_ships_in_circle() {
        let (battle, ships) = started_battle();
        let a1 = battle.ship(ships[0]).unwrap().position();
        assert_eq!(battle.collect_ships_in_circle(a1, 10.0, true), vec![ships[0]]);
        assert_eq!(battle.collect_ships_in_circle(a1, 200.0, true), vec![ships[0], ships[1]]);
    }

    #[test]
    fn test_json_round_trip() {
        let (mut battle, ships) = started_battle();
        battle.advance_to_next_ship();
        let json = battle.to_json().unwrap();
        let restored = Battle::from_json(&json).unwrap();
        assert_eq!(restored.play_order, battle.play_order);
        assert_eq!(restored.playing_ship_id(), Some(ships[2]));
        assert_eq!(restored.log.count(), battle.log.count());
        assert_eq!(restored.ids.peek(), battle.ids.peek());
        assert_eq!(restored.fleets, battle.fleets);
    }

    #[test]
    fn test_get_ship_error() {
        let (battle, _) = started_battle();
        assert!(matches!(
            battle.get_ship(ShipId(999)),
            Err(FleetError::ShipNotFound(ShipId(999)))
        ));
    }
}
