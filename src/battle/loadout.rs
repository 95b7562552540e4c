//! Ship assembly and standard equipment
//!
//! Used to set up quick battles, AI duels and test fixtures.

use crate::battle::actions::{Action, DeployDroneAction, TargetFilter, ToggleAction, TriggerAction};
use crate::battle::constants::DRONE_DEPLOY_DISTANCE;
use crate::battle::effects::{Effect, EffectKind};
use crate::battle::equipment::{Equipment, SlotType};
use crate::battle::fleet::Fleet;
use crate::battle::ship::Ship;
use crate::battle::ship_value::{ShipAttributeName, ShipValueName};
use crate::battle::state::Battle;
use crate::core::config::BattleConfig;
use crate::core::random::SeededRandom;
use crate::core::types::IdAllocator;

// === SHIP BUILDER ===

/// Builder of ships with intrinsic capacities and equipment
///
/// ```ignore
/// let ship = ShipBuilder::new("Avenger")
///     .hull(20)
///     .power(8)
///     .equip(laser(&ids, 3, 300.0, 8))
///     .build(&ids);
/// ```
#[derive(Debug, Clone)]
pub struct ShipBuilder {
    name: String,
    hull: i32,
    shield: i32,
    power: i32,
    maneuvrability: i32,
    precision: i32,
    critical: bool,
    equipments: Vec<Equipment>,
}

impl ShipBuilder {
    /// Bare ship: 10 hull, 5 power, 1 maneuvrability, nothing else
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            hull: 10,
            shield: 0,
            power: 5,
            maneuvrability: 1,
            precision: 0,
            critical: false,
            equipments: Vec::new(),
        }
    }

    pub fn hull(mut self, capacity: i32) -> Self {
        self.hull = capacity;
        self
    }

    pub fn shield(mut self, capacity: i32) -> Self {
        self.shield = capacity;
        self
    }

    pub fn power(mut self, capacity: i32) -> Self {
        self.power = capacity;
        self
    }

    pub fn maneuvrability(mut self, value: i32) -> Self {
        self.maneuvrability = value;
        self
    }

    pub fn precision(mut self, value: i32) -> Self {
        self.precision = value;
        self
    }

    /// Mission critical ship: losing it loses the battle
    pub fn critical(mut self) -> Self {
        self.critical = true;
        self
    }

    pub fn equip(mut self, equipment: Equipment) -> Self {
        self.equipments.push(equipment);
        self
    }

    /// Assemble the ship, fully restored
    pub fn build(self, ids: &IdAllocator) -> Ship {
        let mut ship = Ship::new(ids, &self.name);
        ship.critical = self.critical;
        ship.model_effects = [
            (ShipAttributeName::HullCapacity, self.hull),
            (ShipAttributeName::ShieldCapacity, self.shield),
            (ShipAttributeName::PowerCapacity, self.power),
            (ShipAttributeName::Maneuvrability, self.maneuvrability),
            (ShipAttributeName::Precision, self.precision),
        ]
        .into_iter()
        .filter(|(_, value)| *value != 0)
        .map(|(attribute, value)| Effect::new(ids, EffectKind::Attribute { attribute, value }))
        .collect();
        for equipment in self.equipments {
            ship.equip(equipment);
        }
        ship.restore_initial_state();
        ship
    }
}

// === STANDARD EQUIPMENT ===

fn damage(ids: &IdAllocator, base: i32) -> Effect {
    Effect::new(ids, EffectKind::Damage { base, span: 0 })
}

pub fn engine(ids: &IdAllocator, distance_per_power: f64) -> Equipment {
    Equipment::new(ids, SlotType::Engine, "engine")
        .with_name("Ion Engine")
        .with_action(Action::engine(ids, "Ion Engine", distance_per_power))
}

/// Single target weapon
pub fn laser(ids: &IdAllocator, power: i32, range: f64, base_damage: i32) -> Equipment {
    let weapon = TriggerAction::new(power, range, vec![damage(ids, base_damage)]);
    Equipment::new(ids, SlotType::Weapon, "laser")
        .with_name("Laser")
        .with_action(Action::weapon(ids, "laser", "Laser", weapon))
}

/// Blast weapon, overheating after each shot
pub fn missile(ids: &IdAllocator, power: i32, range: f64, blast: f64, base_damage: i32) -> Equipment {
    let weapon = TriggerAction::new(power, range, vec![damage(ids, base_damage)]).with_blast(blast);
    Equipment::new(ids, SlotType::Weapon, "missile")
        .with_name("Missile Launcher")
        .with_action(Action::weapon(ids, "missile", "Missile Launcher", weapon).with_cooldown(1, 1))
}

pub fn shield_booster(ids: &IdAllocator, capacity: i32) -> Equipment {
    Equipment::new(ids, SlotType::Shield, "shieldbooster")
        .with_name("Shield Booster")
        .with_effects(vec![Effect::new(
            ids,
            EffectKind::Attribute {
                attribute: ShipAttributeName::ShieldCapacity,
                value: capacity,
            },
        )])
}

pub fn power_core(ids: &IdAllocator, capacity: i32) -> Equipment {
    Equipment::new(ids, SlotType::Power, "powercore")
        .with_name("Power Core")
        .with_effects(vec![Effect::new(
            ids,
            EffectKind::Attribute {
                attribute: ShipAttributeName::PowerCapacity,
                value: capacity,
            },
        )])
}

/// Drone repairing hull of ships entering its radius
pub fn repair_drone(ids: &IdAllocator, power: i32, lifetime: u32, radius: f64, repair: i32) -> Equipment {
    let effect = Effect::new(
        ids,
        EffectKind::Value {
            value: ShipValueName::Hull,
            on: repair,
            off: 0,
            start: repair,
            end: 0,
        },
    );
    let deploy =
        DeployDroneAction::new("repairdrone", power, DRONE_DEPLOY_DISTANCE, lifetime, radius).with_effects(vec![effect]);
    Equipment::new(ids, SlotType::Weapon, "repairdrone")
        .with_name("Repair Drone")
        .with_action(Action::deploy_drone(ids, "Repair Drone", deploy))
}

/// Vigilance damaging the first enemy entering its area
pub fn vigilance_system(ids: &IdAllocator, power: i32, radius: f64, base_damage: i32) -> Equipment {
    let toggle = ToggleAction::new(power, radius, Vec::new()).with_filter(TargetFilter::Enemies);
    let action = Action::vigilance(ids, "vigilance", "Vigilance System", toggle, 1, vec![damage(ids, base_damage)]);
    Equipment::new(ids, SlotType::Weapon, "vigilancesystem")
        .with_name("Vigilance System")
        .with_action(action)
}

/// Beam anchoring the target for its next turn
pub fn tractor_beam(ids: &IdAllocator, power: i32, range: f64) -> Equipment {
    let pin = Effect::new(ids, EffectKind::Pinned { hard: true });
    let weapon = TriggerAction::new(power, range, vec![Effect::sticky(ids, pin, 1)]);
    Equipment::new(ids, SlotType::Weapon, "tractorbeam")
        .with_name("Tractor Beam")
        .with_action(Action::weapon(ids, "tractorbeam", "Tractor Beam", weapon).with_cooldown(1, 2))
}

/// Damping field lowering damage taken by allies around
pub fn damping_field(ids: &IdAllocator, power: i32, radius: f64, factor: i32) -> Equipment {
    let effect = Effect::new(ids, EffectKind::DamageModifier { factor: -factor });
    let toggle = ToggleAction::new(power, radius, vec![effect]).with_filter(TargetFilter::Allies);
    Equipment::new(ids, SlotType::Shield, "dampingfield")
        .with_name("Damping Field")
        .with_action(Action::toggle(ids, "dampingfield", "Damping Field", toggle))
}

// === STANDARD FLEETS ===

/// Ship from a small set of standard designs, cycling with `index`
pub fn standard_ship(ids: &IdAllocator, name: &str, index: usize) -> Ship {
    let base = ShipBuilder::new(name)
        .hull(20)
        .shield(0)
        .power(6)
        .maneuvrability(3)
        .precision(2)
        .equip(engine(ids, 120.0))
        .equip(shield_booster(ids, 10));
    let ship = match index % 3 {
        0 => base.equip(laser(ids, 3, 350.0, 8)),
        1 => base
            .equip(missile(ids, 4, 500.0, 120.0, 7))
            .equip(laser(ids, 2, 250.0, 5)),
        _ => base
            .power(4)
            .equip(power_core(ids, 2))
            .equip(laser(ids, 3, 350.0, 6))
            .equip(repair_drone(ids, 3, 3, 150.0, 4)),
    };
    ship.build(ids)
}

pub fn standard_fleet(ids: &IdAllocator, player: &str, count: usize) -> Fleet {
    let mut fleet = Fleet::new(ids, player);
    for index in 0..count {
        fleet.add_ship(standard_ship(ids, &format!("{} {}", player, index + 1), index));
    }
    fleet
}

/// Started battle between two standard fleets
pub fn quick_battle(attackers: usize, defenders: usize, seed: u64) -> Battle {
    quick_battle_with_config(attackers, defenders, seed, BattleConfig::default())
}

pub fn quick_battle_with_config(attackers: usize, defenders: usize, seed: u64, config: BattleConfig) -> Battle {
    let ids = IdAllocator::new();
    let attacker = standard_fleet(&ids, "Attacker", attackers);
    let defender = standard_fleet(&ids, "Defender", defenders);
    let mut battle = Battle::new(attacker, defender, ids).with_config(config);
    battle.start(&mut SeededRandom::new(seed));
    battle
}
