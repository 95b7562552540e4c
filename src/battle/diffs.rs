//! Reversible battle mutations
//!
//! Every change of the battle state is a [`BattleDiff`]. Diffs reference
//! ships and drones by id, so they can be serialized, replayed on another
//! battle copy, and reverted in reverse order.
//!
//! A diff referencing a missing object logs an error and does nothing.

use serde::{Deserialize, Serialize};

use crate::battle::drone::Drone;
use crate::battle::effects::{Effect, EffectKind};
use crate::battle::geometry::{ArenaLocationAngle, Target};
use crate::battle::ship::Ship;
use crate::battle::ship_value::{AttributeModifier, ShipAttributeName, ShipValueName};
use crate::battle::state::Battle;
use crate::core::types::{ActionId, DroneId, EffectId, FleetId, ShipId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BattleDiff {
    /// Relative change of a ship value
    ShipValue {
        ship_id: ShipId,
        value: ShipValueName,
        diff: i32,
    },
    /// Modifier added to and/or removed from an attribute
    ShipAttribute {
        ship_id: ShipId,
        attribute: ShipAttributeName,
        added: AttributeModifier,
        removed: AttributeModifier,
    },
    ShipEffectAdded { ship_id: ShipId, effect: Effect },
    ShipEffectRemoved { ship_id: ShipId, effect: Effect },
    /// Relative change of a sticky effect duration
    ShipEffectChanged {
        ship_id: ShipId,
        effect_id: EffectId,
        duration: i32,
    },
    /// Damage received (informational, values change through ShipValue)
    ShipDamage {
        ship_id: ShipId,
        shield: i32,
        hull: i32,
        theoretical: i32,
    },
    ShipMove {
        ship_id: ShipId,
        start: ArenaLocationAngle,
        end: ArenaLocationAngle,
        /// Engine used, if any
        engine: Option<ActionId>,
    },
    /// Ship leaves the battle
    ///
    /// Its play order position and the play index are recorded on apply.
    ShipDeath {
        ship_id: ShipId,
        removed_at: Option<usize>,
        play_index: usize,
    },
    /// Turn passes from one ship to another
    ShipChange {
        ship_id: ShipId,
        new_ship: ShipId,
        cycle_diff: u32,
    },
    ShipActionUsed {
        ship_id: ShipId,
        action_id: ActionId,
        target: Target,
    },
    /// Action fully applied, checks included (informational)
    ShipActionEnded { ship_id: ShipId },
    ShipActionToggle {
        ship_id: ShipId,
        action_id: ActionId,
        activated: bool,
    },
    /// Action cooled down by some heat
    ShipCooldown {
        ship_id: ShipId,
        action_id: ActionId,
        heat: u32,
    },
    /// Weapon shot (informational)
    ProjectileFired {
        ship_id: ShipId,
        action_id: ActionId,
        target: Target,
    },
    DroneDeployed { drone: Drone },
    /// Drone removed (expired or recalled)
    DroneDestroyed { drone: Drone },
    /// Drone activation, consuming one duration point
    DroneApplied { drone_id: DroneId, ships: Vec<ShipId> },
    /// Battle ends, with a winner or as a draw
    EndBattle { winner: Option<FleetId> },
}

fn with_ship(battle: &mut Battle, ship_id: ShipId, mutate: impl FnOnce(&mut Ship)) {
    match battle.ship_mut(ship_id) {
        Some(ship) => mutate(ship),
        None => tracing::error!(ship = %ship_id, "Diff references a missing ship"),
    }
}

fn with_effect(ship: &mut Ship, effect_id: EffectId, mutate: impl FnOnce(&mut Effect)) {
    match ship.active_effects.iter_mut().find(|effect| effect.id == effect_id) {
        Some(effect) => mutate(effect),
        None => tracing::error!(ship = %ship.id, effect = %effect_id, "Diff references a missing effect"),
    }
}

fn change_duration(effect: &mut Effect, change: i32) {
    if let EffectKind::Sticky { duration, .. } = &mut effect.kind {
        *duration = (*duration as i64 + change as i64).max(0) as u32;
    }
}

/// Keep active effects sorted by id, so add/remove pairs commute
fn insert_effect(ship: &mut Ship, effect: Effect) {
    let index = ship
        .active_effects
        .partition_point(|existing| existing.id < effect.id);
    ship.active_effects.insert(index, effect);
}

fn remove_effect(ship: &mut Ship, effect_id: EffectId) {
    match ship.active_effects.iter().position(|effect| effect.id == effect_id) {
        Some(index) => {
            ship.active_effects.remove(index);
        }
        None => tracing::error!(ship = %ship.id, effect = %effect_id, "Cannot remove missing effect"),
    }
}

fn change_attribute(ship: &mut Ship, attribute: ShipAttributeName, added: AttributeModifier, removed: AttributeModifier) {
    let attr = ship.attributes.get_mut(attribute);
    if !added.is_empty() {
        attr.add_modifier(added);
    }
    if !removed.is_empty() {
        attr.remove_modifier(removed);
    }
}

impl BattleDiff {
    /// Ship this diff is mainly about, if any
    pub fn ship_id(&self) -> Option<ShipId> {
        match self {
            Self::ShipValue { ship_id, .. }
            | Self::ShipAttribute { ship_id, .. }
            | Self::ShipEffectAdded { ship_id, .. }
            | Self::ShipEffectRemoved { ship_id, .. }
            | Self::ShipEffectChanged { ship_id, .. }
            | Self::ShipDamage { ship_id, .. }
            | Self::ShipMove { ship_id, .. }
            | Self::ShipDeath { ship_id, .. }
            | Self::ShipChange { ship_id, .. }
            | Self::ShipActionUsed { ship_id, .. }
            | Self::ShipActionEnded { ship_id }
            | Self::ShipActionToggle { ship_id, .. }
            | Self::ShipCooldown { ship_id, .. }
            | Self::ProjectileFired { ship_id, .. } => Some(*ship_id),
            Self::DroneDeployed { drone } | Self::DroneDestroyed { drone } => Some(drone.owner),
            Self::DroneApplied { .. } | Self::EndBattle { .. } => None,
        }
    }

    /// Apply the diff on a battle
    ///
    /// Takes `&mut self` to record what a revert needs and is only known
    /// at apply time (play order positions).
    pub fn apply(&mut self, battle: &mut Battle) {
        match self {
            Self::ShipValue { ship_id, value, diff } => {
                let (value, diff) = (*value, *diff);
                with_ship(battle, *ship_id, |ship| {
                    ship.values.set(value, ship.values.get(value) + diff)
                });
            }
            Self::ShipAttribute {
                ship_id,
                attribute,
                added,
                removed,
            } => {
                let (attribute, added, removed) = (*attribute, *added, *removed);
                with_ship(battle, *ship_id, |ship| change_attribute(ship, attribute, added, removed));
            }
            Self::ShipEffectAdded { ship_id, effect } => {
                let effect = effect.clone();
                with_ship(battle, *ship_id, |ship| insert_effect(ship, effect));
            }
            Self::ShipEffectRemoved { ship_id, effect } => {
                let effect_id = effect.id;
                with_ship(battle, *ship_id, |ship| remove_effect(ship, effect_id));
            }
            Self::ShipEffectChanged {
                ship_id,
                effect_id,
                duration,
            } => {
                let (effect_id, duration) = (*effect_id, *duration);
                with_ship(battle, *ship_id, |ship| {
                    with_effect(ship, effect_id, |effect| change_duration(effect, duration))
                });
            }
            Self::ShipMove { ship_id, end, .. } => {
                let end = *end;
                with_ship(battle, *ship_id, |ship| {
                    ship.set_arena_position(end.x, end.y);
                    ship.set_arena_facing_angle(end.angle);
                });
            }
            Self::ShipDeath {
                ship_id,
                removed_at,
                play_index,
            } => {
                *play_index = battle.play_index;
                with_ship(battle, *ship_id, |ship| ship.alive = false);
                *removed_at = battle.remove_from_play_order(*ship_id);
            }
            Self::ShipChange {
                new_ship,
                cycle_diff,
                ..
            } => {
                battle.set_playing_ship(*new_ship);
                battle.cycle += *cycle_diff;
            }
            Self::ShipActionUsed {
                ship_id, action_id, ..
            } => {
                let action_id = *action_id;
                with_ship(battle, *ship_id, |ship| {
                    if let Some(cooldown) = ship.actions.cooldown_mut(action_id) {
                        cooldown.use_once();
                    }
                });
            }
            Self::ShipActionToggle {
                ship_id,
                action_id,
                activated,
            } => {
                let (action_id, activated) = (*action_id, *activated);
                with_ship(battle, *ship_id, |ship| {
                    ship.actions.toggle(action_id, activated);
                });
            }
            Self::ShipCooldown {
                ship_id,
                action_id,
                heat,
            } => {
                let (action_id, heat) = (*action_id, *heat);
                with_ship(battle, *ship_id, |ship| {
                    if let Some(cooldown) = ship.actions.cooldown_mut(action_id) {
                        cooldown.cool(heat);
                    }
                });
            }
            Self::DroneDeployed { drone } => battle.add_drone(drone.clone()),
            Self::DroneDestroyed { drone } => {
                if battle.remove_drone(drone.id).is_none() {
                    tracing::error!(drone = %drone.id, "Cannot destroy missing drone");
                }
            }
            Self::DroneApplied { drone_id, .. } => match battle.drone_mut(*drone_id) {
                Some(drone) => drone.duration = drone.duration.saturating_sub(1),
                None => tracing::error!(drone = %drone_id, "Diff references a missing drone"),
            },
            Self::EndBattle { winner } => battle.mark_ended(*winner),
            Self::ShipDamage { .. } | Self::ShipActionEnded { .. } | Self::ProjectileFired { .. } => {}
        }
    }

    /// Undo a previously applied diff
    pub fn revert(&self, battle: &mut Battle) {
        match self {
            Self::ShipValue { ship_id, value, diff } => {
                let (value, diff) = (*value, *diff);
                with_ship(battle, *ship_id, |ship| {
                    ship.values.set(value, ship.values.get(value) - diff)
                });
            }
            Self::ShipAttribute {
                ship_id,
                attribute,
                added,
                removed,
            } => {
                let (attribute, added, removed) = (*attribute, *added, *removed);
                with_ship(battle, *ship_id, |ship| change_attribute(ship, attribute, removed, added));
            }
            Self::ShipEffectAdded { ship_id, effect } => {
                let effect_id = effect.id;
                with_ship(battle, *ship_id, |ship| remove_effect(ship, effect_id));
            }
            Self::ShipEffectRemoved { ship_id, effect } => {
                let effect = effect.clone();
                with_ship(battle, *ship_id, |ship| insert_effect(ship, effect));
            }
            Self::ShipEffectChanged {
                ship_id,
                effect_id,
                duration,
            } => {
                let (effect_id, duration) = (*effect_id, *duration);
                with_ship(battle, *ship_id, |ship| {
                    with_effect(ship, effect_id, |effect| change_duration(effect, -duration))
                });
            }
            Self::ShipMove { ship_id, start, .. } => {
                let start = *start;
                with_ship(battle, *ship_id, |ship| {
                    ship.set_arena_position(start.x, start.y);
                    ship.set_arena_facing_angle(start.angle);
                });
            }
            Self::ShipDeath {
                ship_id,
                removed_at,
                play_index,
            } => {
                with_ship(battle, *ship_id, |ship| ship.alive = true);
                if let Some(index) = removed_at {
                    battle.insert_in_play_order(*index, *ship_id);
                }
                battle.play_index = *play_index;
            }
            Self::ShipChange {
                ship_id,
                cycle_diff,
                ..
            } => {
                battle.set_playing_ship(*ship_id);
                battle.cycle = battle.cycle.saturating_sub(*cycle_diff);
            }
            Self::ShipActionUsed {
                ship_id, action_id, ..
            } => {
                let action_id = *action_id;
                with_ship(battle, *ship_id, |ship| {
                    if let Some(cooldown) = ship.actions.cooldown_mut(action_id) {
                        cooldown.use_times(-1);
                    }
                });
            }
            Self::ShipActionToggle {
                ship_id,
                action_id,
                activated,
            } => {
                let (action_id, activated) = (*action_id, *activated);
                with_ship(battle, *ship_id, |ship| {
                    ship.actions.toggle(action_id, !activated);
                });
            }
            Self::ShipCooldown {
                ship_id,
                action_id,
                heat,
            } => {
                let (action_id, heat) = (*action_id, *heat);
                with_ship(battle, *ship_id, |ship| {
                    if let Some(cooldown) = ship.actions.cooldown_mut(action_id) {
                        cooldown.heat_up(heat);
                    }
                });
            }
            Self::DroneDeployed { drone } => {
                if battle.remove_drone(drone.id).is_none() {
                    tracing::error!(drone = %drone.id, "Cannot recall missing drone");
                }
            }
            Self::DroneDestroyed { drone } => battle.add_drone(drone.clone()),
            Self::DroneApplied { drone_id, .. } => match battle.drone_mut(*drone_id) {
                Some(drone) => drone.duration += 1,
                None => tracing::error!(drone = %drone_id, "Diff references a missing drone"),
            },
            Self::EndBattle { .. } => battle.resume_battle(),
            Self::ShipDamage { .. } | Self::ShipActionEnded { .. } | Self::ProjectileFired { .. } => {}
        }
    }

    /// Diff producing the opposite mutation, when one exists
    pub fn reverse(&self) -> Option<BattleDiff> {
        match self {
            Self::ShipValue { ship_id, value, diff } => Some(Self::ShipValue {
                ship_id: *ship_id,
                value: *value,
                diff: -diff,
            }),
            Self::ShipAttribute {
                ship_id,
                attribute,
                added,
                removed,
            } => Some(Self::ShipAttribute {
                ship_id: *ship_id,
                attribute: *attribute,
                added: *removed,
                removed: *added,
            }),
            Self::ShipEffectAdded { ship_id, effect } => Some(Self::ShipEffectRemoved {
                ship_id: *ship_id,
                effect: effect.clone(),
            }),
            Self::ShipEffectRemoved { ship_id, effect } => Some(Self::ShipEffectAdded {
                ship_id: *ship_id,
                effect: effect.clone(),
            }),
            Self::ShipEffectChanged {
                ship_id,
                effect_id,
                duration,
            } => Some(Self::ShipEffectChanged {
                ship_id: *ship_id,
                effect_id: *effect_id,
                duration: -duration,
            }),
            Self::ShipMove {
                ship_id,
                start,
                end,
                engine,
            } => Some(Self::ShipMove {
                ship_id: *ship_id,
                start: *end,
                end: *start,
                engine: *engine,
            }),
            Self::ShipActionToggle {
                ship_id,
                action_id,
                activated,
            } => Some(Self::ShipActionToggle {
                ship_id: *ship_id,
                action_id: *action_id,
                activated: !activated,
            }),
            Self::DroneDeployed { drone } => Some(Self::DroneDestroyed { drone: drone.clone() }),
            Self::DroneDestroyed { drone } => Some(Self::DroneDeployed { drone: drone.clone() }),
            _ => None,
        }
    }
}
