//! Ships: the combatant units of a battle
//!
//! A ship is mutated during a battle only through diffs. The direct setters
//! here are meant for setup (fleet assembly, tests, cheats outside battle).

use serde::{Deserialize, Serialize};

use crate::battle::actions::{Action, ActionKind, ActionList};
use crate::battle::diffs::BattleDiff;
use crate::battle::effects::{Effect, EffectKind};
use crate::battle::equipment::{Equipment, SlotType};
use crate::battle::geometry::{arena_distance, ArenaLocation, ArenaLocationAngle, Target};
use crate::battle::ship_value::{AttributeModifier, ShipAttributeName, ShipAttributes, ShipValueName, ShipValues};
use crate::core::random::RandomGenerator;
use crate::core::types::{EffectId, FleetId, IdAllocator, ShipId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ship {
    pub id: ShipId,
    /// Owning fleet (set when added to a fleet)
    pub fleet_id: FleetId,
    pub name: String,
    pub alive: bool,
    /// Mission critical ship: its loss loses the battle
    pub critical: bool,
    /// Last initiative throw
    pub play_priority: f64,

    pub arena_x: f64,
    pub arena_y: f64,
    pub arena_angle: f64,

    pub values: ShipValues,
    pub attributes: ShipAttributes,

    /// Intrinsic effects of the hull model (base capacities, skills)
    pub model_effects: Vec<Effect>,
    pub equipments: Vec<Equipment>,
    /// Effects currently carried (sticky copies, area effects)
    pub active_effects: Vec<Effect>,
    pub actions: ActionList,
}

impl Ship {
    pub fn new(ids: &IdAllocator, name: &str) -> Self {
        Self {
            id: ids.next_id(),
            fleet_id: FleetId(0),
            name: name.to_string(),
            alive: true,
            critical: false,
            play_priority: 0.0,
            arena_x: 0.0,
            arena_y: 0.0,
            arena_angle: 0.0,
            values: ShipValues::default(),
            attributes: ShipAttributes::default(),
            model_effects: Vec::new(),
            equipments: Vec::new(),
            active_effects: Vec::new(),
            actions: ActionList::new(),
        }
    }

    // === POSITION ===

    pub fn set_arena_position(&mut self, x: f64, y: f64) {
        self.arena_x = x;
        self.arena_y = y;
    }

    pub fn set_arena_facing_angle(&mut self, angle: f64) {
        self.arena_angle = angle;
    }

    pub fn position(&self) -> ArenaLocation {
        ArenaLocation::new(self.arena_x, self.arena_y)
    }

    pub fn location(&self) -> ArenaLocationAngle {
        ArenaLocationAngle::new(self.arena_x, self.arena_y, self.arena_angle)
    }

    /// Target pointing at this ship
    pub fn target(&self) -> Target {
        Target::from_ship(self.id, self.arena_x, self.arena_y)
    }

    pub fn is_in_circle(&self, x: f64, y: f64, radius: f64) -> bool {
        self.distance_to_location(ArenaLocation::new(x, y)) <= radius
    }

    pub fn distance_to(&self, other: &Ship) -> f64 {
        arena_distance(self.position(), other.position())
    }

    pub fn distance_to_location(&self, location: ArenaLocation) -> f64 {
        arena_distance(self.position(), location)
    }

    // === VALUES AND ATTRIBUTES ===

    pub fn get_value(&self, name: ShipValueName) -> i32 {
        self.values.get(name)
    }

    /// Direct value write, for setup only
    pub fn set_value(&mut self, name: ShipValueName, value: i32) {
        self.values.set(name, value);
    }

    pub fn get_attribute(&self, name: ShipAttributeName) -> i32 {
        self.attributes.get(name).get()
    }

    /// Diffs changing a value (empty when nothing changes)
    pub fn get_value_diffs(&self, name: ShipValueName, value: i32, relative: bool) -> Vec<BattleDiff> {
        let current = self.get_value(name);
        let target = if relative { current + value } else { value };
        if target != current {
            vec![BattleDiff::ShipValue {
                ship_id: self.id,
                value: name,
                diff: target - current,
            }]
        } else {
            Vec::new()
        }
    }

    /// Diffs putting the ship out of the battle
    pub fn get_death_diffs(&self) -> Vec<BattleDiff> {
        let mut result: Vec<BattleDiff> = ShipValueName::ALL
            .iter()
            .flat_map(|name| self.get_value_diffs(*name, 0, false))
            .collect();
        result.push(BattleDiff::ShipDeath {
            ship_id: self.id,
            removed_at: None,
            play_index: 0,
        });
        result
    }

    /// Recompute attributes from the model, equipment and active effects
    pub fn update_attributes(&mut self) {
        self.attributes.reset();
        let modifiers: Vec<(ShipAttributeName, AttributeModifier)> = self
            .all_effects()
            .filter_map(|effect| match effect.unwrapped().kind {
                EffectKind::Attribute { attribute, value } => Some((attribute, AttributeModifier::cumulative(value))),
                EffectKind::AttributeMultiply { attribute, value } => {
                    Some((attribute, AttributeModifier::multiplier(value)))
                }
                EffectKind::AttributeLimit { attribute, value } => Some((attribute, AttributeModifier::limit(value))),
                _ => None,
            })
            .collect();
        for (attribute, modifier) in modifiers {
            self.attributes.get_mut(attribute).add_modifier(modifier);
        }
    }

    /// Fill hull and shield to their capacity
    pub fn restore_health(&mut self) {
        for name in [ShipValueName::Hull, ShipValueName::Shield] {
            let capacity = self.get_attribute(name.capacity());
            self.values.set(name, capacity);
        }
    }

    /// Back to a fresh state, ready for a new battle
    pub fn restore_initial_state(&mut self) {
        self.alive = true;
        self.active_effects.clear();
        self.update_attributes();
        self.restore_health();
        let power = self.get_attribute(ShipAttributeName::PowerCapacity);
        self.values.set(ShipValueName::Power, power);
        self.actions.update_from_ship(&self.equipments);
    }

    pub fn is_able_to_play(&self, check_power: bool) -> bool {
        self.alive && (!check_power || self.get_value(ShipValueName::Power) > 0)
    }

    pub fn throw_initiative<R: RandomGenerator>(&mut self, rng: &mut R) {
        self.play_priority = rng.random() * self.get_attribute(ShipAttributeName::Maneuvrability) as f64;
    }

    // === EQUIPMENT ===

    /// Attach an equipment; actions are re-derived (invalidating action ids)
    pub fn equip(&mut self, equipment: Equipment) {
        self.equipments.push(equipment);
        self.update_attributes();
        self.actions.update_from_ship(&self.equipments);
    }

    pub fn equipments_in_slot(&self, slot: SlotType) -> impl Iterator<Item = &Equipment> {
        self.equipments
            .iter()
            .filter(move |equipment| equipment.slot == slot)
    }

    // === EFFECTS ===

    /// Active effects
    pub fn effects(&self) -> impl Iterator<Item = &Effect> {
        self.active_effects.iter()
    }

    /// Model, equipment and active effects
    pub fn all_effects(&self) -> impl Iterator<Item = &Effect> {
        self.model_effects
            .iter()
            .chain(self.equipments.iter().flat_map(|equipment| equipment.effects.iter()))
            .chain(self.active_effects.iter())
    }

    pub fn has_effect(&self, id: EffectId) -> bool {
        self.active_effects.iter().any(|effect| effect.id == id)
    }

    pub fn get_effect(&self, id: EffectId) -> Option<&Effect> {
        self.active_effects.iter().find(|effect| effect.id == id)
    }

    /// Pinned by an active effect (`hard_only` to ignore soft pins)
    pub fn is_pinned(&self, hard_only: bool) -> bool {
        self.effects().any(|effect| {
            matches!(effect.unwrapped().kind, EffectKind::Pinned { hard } if hard || !hard_only)
        })
    }

    // === ACTIONS ===

    /// Toggle actions (and vigilances), optionally only the active ones
    pub fn toggle_actions(&self, only_active: bool) -> impl Iterator<Item = &Action> {
        self.actions.list_all().filter(move |action| {
            action.as_toggle().is_some() && (!only_active || self.actions.is_toggled(action.id))
        })
    }

    pub fn has_active_vigilance(&self) -> bool {
        self.toggle_actions(true)
            .any(|action| matches!(action.kind, ActionKind::Vigilance(_)))
    }

    /// First engine, by equipment order
    pub fn first_engine(&self) -> Option<&Action> {
        self.actions.list_all().find(|action| action.as_move().is_some())
    }

    /// Effects of active toggles affecting another ship
    pub fn area_effects<'a>(&'a self, other: &'a Ship) -> impl Iterator<Item = &'a Effect> + 'a {
        self.toggle_actions(true)
            .filter_map(|action| action.as_toggle())
            .filter(move |toggle| toggle.covers(self, other))
            .flat_map(|toggle| toggle.effects.iter())
    }
}
