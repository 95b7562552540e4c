//! Statistics collected over a battle
//!
//! Stats are fed with battle events, either live (subscribed to the event
//! bus) or by replaying a diff log after the fact. Reverted events cancel
//! their forward counterpart.

use std::sync::{Arc, Mutex};

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::battle::geometry::arena_distance;
use crate::battle::log::{BattleEvent, BattleEventType, DiffLog};
use crate::battle::state::Battle;
use crate::core::types::{ActionId, ShipId};

/// Counters for one side of the battle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetStats {
    pub shield_damage_dealt: i64,
    pub hull_damage_dealt: i64,
    pub shield_damage_taken: i64,
    pub hull_damage_taken: i64,
    /// Total distance moved (km)
    pub move_distance: f64,
    pub drones_deployed: i64,
    /// Actions used, not counting turn ends
    pub actions_used: i64,
}

impl FleetStats {
    pub fn damage_dealt(&self) -> i64 {
        self.shield_damage_dealt + self.hull_damage_dealt
    }

    pub fn damage_taken(&self) -> i64 {
        self.shield_damage_taken + self.hull_damage_taken
    }
}

/// One line of the stats summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatLine {
    pub name: String,
    pub attacker: i64,
    pub defender: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BattleStats {
    attacker_ships: AHashSet<ShipId>,
    pub attacker: FleetStats,
    pub defender: FleetStats,
}

impl BattleStats {
    /// Stats of a battle, the first fleet being the attacker
    pub fn new(battle: &Battle) -> Self {
        let attacker_ships = battle
            .fleets
            .first()
            .map(|fleet| fleet.ships.iter().map(|ship| ship.id).collect())
            .unwrap_or_default();
        Self {
            attacker_ships,
            ..Self::default()
        }
    }

    /// Stats kept up to date by the battle events
    pub fn watch(battle: &mut Battle) -> Arc<Mutex<BattleStats>> {
        let stats = Arc::new(Mutex::new(Self::new(battle)));
        let sink = Arc::clone(&stats);
        battle.events.subscribe(move |event| match sink.lock() {
            Ok(mut stats) => stats.record(event),
            Err(_) => tracing::warn!("Battle stats poisoned, event dropped"),
        });
        stats
    }

    /// Replay a whole log
    pub fn process_log(&mut self, log: &DiffLog) {
        for diff in log.iter() {
            self.record_type(&BattleEventType::from_diff(diff), 1);
        }
    }

    pub fn record(&mut self, event: &BattleEvent) {
        let sign = if event.reverted { -1 } else { 1 };
        self.record_type(&event.event_type, sign);
    }

    fn side(&mut self, ship: ShipId) -> &mut FleetStats {
        if self.attacker_ships.contains(&ship) {
            &mut self.attacker
        } else {
            &mut self.defender
        }
    }

    fn other_side(&mut self, ship: ShipId) -> &mut FleetStats {
        if self.attacker_ships.contains(&ship) {
            &mut self.defender
        } else {
            &mut self.attacker
        }
    }

    fn record_type(&mut self, event_type: &BattleEventType, sign: i64) {
        match event_type {
            BattleEventType::Damage { ship_id, shield, hull } => {
                let (shield, hull) = (*shield as i64 * sign, *hull as i64 * sign);
                let taken = self.side(*ship_id);
                taken.shield_damage_taken += shield;
                taken.hull_damage_taken += hull;
                let dealt = self.other_side(*ship_id);
                dealt.shield_damage_dealt += shield;
                dealt.hull_damage_dealt += hull;
            }
            BattleEventType::Move { ship_id, start, end } => {
                let distance = arena_distance(start.location(), end.location());
                self.side(*ship_id).move_distance += distance * sign as f64;
            }
            BattleEventType::DroneDeployed { owner, .. } => {
                self.side(*owner).drones_deployed += sign;
            }
            BattleEventType::ActionUsed { ship_id, action_id, .. } if *action_id != ActionId::END_TURN => {
                self.side(*ship_id).actions_used += sign;
            }
            _ => {}
        }
    }

    /// Summary lines, at most `max_count`
    pub fn important(&self, max_count: usize) -> Vec<StatLine> {
        let line = |name: &str, attacker: i64, defender: i64| StatLine {
            name: name.to_string(),
            attacker,
            defender,
        };
        vec![
            line(
                "Damage dealt",
                self.attacker.damage_dealt(),
                self.defender.damage_dealt(),
            ),
            line(
                "Move distance (km)",
                self.attacker.move_distance.round() as i64,
                self.defender.move_distance.round() as i64,
            ),
            line(
                "Drones deployed",
                self.attacker.drones_deployed,
                self.defender.drones_deployed,
            ),
            line(
                "Actions used",
                self.attacker.actions_used,
                self.defender.actions_used,
            ),
        ]
        .into_iter()
        .take(max_count)
        .collect()
    }
}
