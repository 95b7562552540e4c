//! Effects: units of state mutation delivered by actions, drones and toggles
//!
//! Effects never mutate a ship directly. Each hook returns the diffs that
//! the battle will apply (and may later revert):
//! - `on_diffs` when the effect reaches a ship
//! - `off_diffs` when a lasting effect leaves it
//! - `turn_start_diffs` / `turn_end_diffs` while it stays active
//!
//! An [`Effect`] is a template (equipment, weapon, drone) or an active copy
//! carried by a ship. Sticky copies get their own id, so the template is
//! never touched by duration bookkeeping.

use serde::{Deserialize, Serialize};

use crate::battle::diffs::BattleDiff;
use crate::battle::exclusion::ExclusionAreas;
use crate::battle::geometry::{arena_angle, ArenaLocation};
use crate::battle::ship::Ship;
use crate::battle::ship_value::{AttributeModifier, ShipAttributeName, ShipValueName};
use crate::battle::state::Battle;
use crate::core::types::{ActionId, DroneId, EffectId, IdAllocator, ShipId};

/// Origin of an effect application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectSource {
    Ship(ShipId),
    Drone(DroneId),
}

impl EffectSource {
    /// Current location of the source, if it still exists
    pub fn location(&self, battle: &Battle) -> Option<ArenaLocation> {
        match self {
            Self::Ship(id) => battle.ship(*id).map(|ship| ship.position()),
            Self::Drone(id) => battle
                .drone(*id)
                .map(|drone| ArenaLocation::new(drone.x, drone.y)),
        }
    }

    /// Ship responsible for the effect (a drone's owner)
    pub fn ship_id(&self, battle: &Battle) -> Option<ShipId> {
        match self {
            Self::Ship(id) => Some(*id),
            Self::Drone(id) => battle.drone(*id).map(|drone| drone.owner),
        }
    }
}

/// Closed set of effect behaviors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Damage absorbed by shield first, then hull
    Damage { base: i32, span: i32 },
    /// Percent modifier on incoming damage (while active)
    DamageModifier { factor: i32 },
    /// Additive attribute modifier
    Attribute {
        attribute: ShipAttributeName,
        value: i32,
    },
    /// Percent attribute modifier
    AttributeMultiply {
        attribute: ShipAttributeName,
        value: i32,
    },
    /// Ceiling on an attribute (ceilings compose by minimum)
    AttributeLimit {
        attribute: ShipAttributeName,
        value: i32,
    },
    /// Relative value changes at each lifecycle point
    Value {
        value: ShipValueName,
        on: i32,
        off: i32,
        start: i32,
        end: i32,
    },
    /// Move some value from the source ship to the target (or the reverse)
    ValueTransfer { value: ShipValueName, amount: i32 },
    /// Push the ship away from the source
    Repel { distance: f64 },
    /// Cool down overheated actions (0 = full cooling, 0 count = all)
    Cooldown { cooling: u32, maxcount: u32 },
    /// Blocks engines; a hard pin also prevents being pushed
    Pinned { hard: bool },
    /// Marker set by a vigilance toggle; intruders receive the wrapped effects
    Vigilance {
        action: ActionId,
        intruder_count: u32,
        intruder_effects: Vec<Effect>,
    },
    /// Wraps another effect for a number of turns
    Sticky { base: Box<Effect>, duration: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub id: EffectId,
    pub kind: EffectKind,
}

/// Prefix a number with its sign
fn signed(value: i32) -> String {
    format!("{}{}", if value > 0 { "+" } else { "-" }, value.abs())
}

impl Effect {
    pub fn new(ids: &IdAllocator, kind: EffectKind) -> Self {
        Self {
            id: ids.next_id(),
            kind,
        }
    }

    /// Wrap an effect to make it last `duration` turns
    pub fn sticky(ids: &IdAllocator, base: Effect, duration: u32) -> Self {
        Self::new(
            ids,
            EffectKind::Sticky {
                base: Box::new(base),
                duration,
            },
        )
    }

    /// Effect actually applying modifiers (the base of a sticky wrapper)
    pub fn unwrapped(&self) -> &Effect {
        match &self.kind {
            EffectKind::Sticky { base, .. } => base.unwrapped(),
            _ => self,
        }
    }

    /// Remaining duration of a sticky effect
    pub fn duration(&self) -> Option<u32> {
        match &self.kind {
            EffectKind::Sticky { duration, .. } => Some(*duration),
            _ => None,
        }
    }

    pub fn is_sticky(&self) -> bool {
        matches!(self.kind, EffectKind::Sticky { .. })
    }

    pub fn code(&self) -> &'static str {
        match &self.kind {
            EffectKind::Damage { .. } => "damage",
            EffectKind::DamageModifier { .. } => "damagemod",
            EffectKind::Attribute { .. } => "attr",
            EffectKind::AttributeMultiply { .. } => "attrmult",
            EffectKind::AttributeLimit { .. } => "attrlimit",
            EffectKind::Value { .. } => "value",
            EffectKind::ValueTransfer { .. } => "valuetransfer",
            EffectKind::Repel { .. } => "repel",
            EffectKind::Cooldown { .. } => "cooldown",
            EffectKind::Pinned { .. } => "pinned",
            EffectKind::Vigilance { .. } => "vigilance",
            EffectKind::Sticky { base, .. } => base.code(),
        }
    }

    /// Code including the affected value or attribute
    pub fn full_code(&self) -> String {
        fn attr_key(attribute: ShipAttributeName) -> &'static str {
            match attribute {
                ShipAttributeName::HullCapacity => "hull_capacity",
                ShipAttributeName::ShieldCapacity => "shield_capacity",
                ShipAttributeName::PowerCapacity => "power_capacity",
                ShipAttributeName::Maneuvrability => "maneuvrability",
                ShipAttributeName::Precision => "precision",
            }
        }
        match &self.kind {
            EffectKind::Attribute { attribute, .. }
            | EffectKind::AttributeMultiply { attribute, .. }
            | EffectKind::AttributeLimit { attribute, .. } => {
                format!("{}-{}", self.code(), attr_key(*attribute))
            }
            EffectKind::Value { value, .. } | EffectKind::ValueTransfer { value, .. } => {
                format!("{}-{}", self.code(), value.name())
            }
            EffectKind::Sticky { base, .. } => base.full_code(),
            _ => self.code().to_string(),
        }
    }

    /// Whether the effect is good for the ship receiving it
    pub fn is_beneficial(&self) -> bool {
        match &self.kind {
            EffectKind::Damage { .. } => false,
            EffectKind::DamageModifier { factor } => *factor <= 0,
            EffectKind::Attribute { value, .. } => *value >= 0,
            EffectKind::AttributeMultiply { value, .. } => *value >= 0,
            EffectKind::AttributeLimit { .. } => false,
            EffectKind::Value {
                on, off, start, end, ..
            } => {
                if *off < -*on || *end < -*start {
                    false
                } else if (*off != 0 && *off == -*on) || (*end != 0 && *end == -*start) {
                    *on > 0 || *start > 0
                } else {
                    *on > 0 || *off > 0 || *start > 0 || *end > 0
                }
            }
            EffectKind::ValueTransfer { amount, .. } => *amount >= 0,
            EffectKind::Repel { .. } => false,
            EffectKind::Cooldown { .. } => true,
            EffectKind::Pinned { .. } => false,
            EffectKind::Vigilance { .. } => false,
            EffectKind::Sticky { base, .. } => base.is_beneficial(),
        }
    }

    /// Diffs to apply when the effect reaches a ship
    ///
    /// `success` in `[0, 1]` scales random spans (damage).
    pub fn on_diffs(
        &self,
        battle: &Battle,
        ship: &Ship,
        source: EffectSource,
        success: f64,
    ) -> Vec<BattleDiff> {
        match &self.kind {
            EffectKind::Damage { .. } => {
                let (shield, hull, theoretical) = self.effective_damage(ship, success);
                let mut result = Vec::new();
                if shield != 0 || hull != 0 {
                    result.push(BattleDiff::ShipDamage {
                        ship_id: ship.id,
                        shield,
                        hull,
                        theoretical,
                    });
                }
                if shield != 0 {
                    result.push(BattleDiff::ShipValue {
                        ship_id: ship.id,
                        value: ShipValueName::Shield,
                        diff: -shield,
                    });
                }
                if hull != 0 {
                    result.push(BattleDiff::ShipValue {
                        ship_id: ship.id,
                        value: ShipValueName::Hull,
                        diff: -hull,
                    });
                }
                result
            }
            EffectKind::Attribute { attribute, value } => vec![BattleDiff::ShipAttribute {
                ship_id: ship.id,
                attribute: *attribute,
                added: AttributeModifier::cumulative(*value),
                removed: AttributeModifier::default(),
            }],
            EffectKind::AttributeMultiply { attribute, value } => {
                vec![BattleDiff::ShipAttribute {
                    ship_id: ship.id,
                    attribute: *attribute,
                    added: AttributeModifier::multiplier(*value),
                    removed: AttributeModifier::default(),
                }]
            }
            EffectKind::AttributeLimit { attribute, value } => vec![BattleDiff::ShipAttribute {
                ship_id: ship.id,
                attribute: *attribute,
                added: AttributeModifier::limit(*value),
                removed: AttributeModifier::default(),
            }],
            EffectKind::Value { value, on, .. } => {
                if *on != 0 {
                    ship.get_value_diffs(*value, *on, true)
                } else {
                    Vec::new()
                }
            }
            EffectKind::ValueTransfer { value, amount } => {
                let EffectSource::Ship(source_id) = source else {
                    return Vec::new();
                };
                let Some(source_ship) = battle.ship(source_id) else {
                    return Vec::new();
                };
                let (giver, receiver, wanted) = if *amount < 0 {
                    (ship, source_ship, -*amount)
                } else {
                    (source_ship, ship, *amount)
                };
                let moved = giver.get_value(*value).min(wanted);
                if moved > 0 {
                    let mut result = giver.get_value_diffs(*value, -moved, true);
                    result.extend(receiver.get_value_diffs(*value, moved, true));
                    result
                } else {
                    Vec::new()
                }
            }
            EffectKind::Repel { distance } => self.repel_diffs(battle, ship, source, *distance),
            EffectKind::Cooldown { cooling, maxcount } => {
                let overheated: Vec<_> = ship.actions.overheated().collect();
                let count = if *maxcount == 0 {
                    overheated.len()
                } else {
                    (*maxcount as usize).min(overheated.len())
                };
                overheated
                    .into_iter()
                    .take(count)
                    .map(|(action_id, cooldown)| BattleDiff::ShipCooldown {
                        ship_id: ship.id,
                        action_id,
                        heat: if *cooling == 0 {
                            cooldown.heat
                        } else {
                            (*cooling).min(cooldown.heat)
                        },
                    })
                    .collect()
            }
            EffectKind::Vigilance {
                intruder_effects, ..
            } => intruder_effects
                .iter()
                .flat_map(|effect| effect.on_diffs(battle, ship, source, success))
                .collect(),
            EffectKind::Sticky { base, duration } => {
                let copy = Effect {
                    id: battle.ids.next_id(),
                    kind: EffectKind::Sticky {
                        base: base.clone(),
                        duration: *duration,
                    },
                };
                let mut result = vec![BattleDiff::ShipEffectAdded {
                    ship_id: ship.id,
                    effect: copy,
                }];
                result.extend(base.on_diffs(battle, ship, source, success));
                result
            }
            EffectKind::DamageModifier { .. } | EffectKind::Pinned { .. } => Vec::new(),
        }
    }

    /// Diffs to apply when a lasting effect leaves a ship
    pub fn off_diffs(&self, ship: &Ship) -> Vec<BattleDiff> {
        match &self.kind {
            EffectKind::Attribute { attribute, value } => vec![BattleDiff::ShipAttribute {
                ship_id: ship.id,
                attribute: *attribute,
                added: AttributeModifier::default(),
                removed: AttributeModifier::cumulative(*value),
            }],
            EffectKind::AttributeMultiply { attribute, value } => {
                vec![BattleDiff::ShipAttribute {
                    ship_id: ship.id,
                    attribute: *attribute,
                    added: AttributeModifier::default(),
                    removed: AttributeModifier::multiplier(*value),
                }]
            }
            EffectKind::AttributeLimit { attribute, value } => vec![BattleDiff::ShipAttribute {
                ship_id: ship.id,
                attribute: *attribute,
                added: AttributeModifier::default(),
                removed: AttributeModifier::limit(*value),
            }],
            EffectKind::Value { value, off, .. } if *off != 0 => {
                ship.get_value_diffs(*value, *off, true)
            }
            EffectKind::Sticky { base, .. } => base.off_diffs(ship),
            _ => Vec::new(),
        }
    }

    /// Diffs to apply when a ship carrying this effect starts its turn
    pub fn turn_start_diffs(&self, ship: &Ship) -> Vec<BattleDiff> {
        match &self.kind {
            EffectKind::Value { value, start, .. } if *start != 0 => {
                ship.get_value_diffs(*value, *start, true)
            }
            EffectKind::Sticky { base, .. } => base.turn_start_diffs(ship),
            _ => Vec::new(),
        }
    }

    /// Diffs to apply when a ship carrying this effect ends its turn
    ///
    /// A sticky copy also loses one turn of duration, and leaves the ship
    /// when none remains.
    pub fn turn_end_diffs(&self, ship: &Ship) -> Vec<BattleDiff> {
        match &self.kind {
            EffectKind::Value { value, end, .. } if *end != 0 => {
                ship.get_value_diffs(*value, *end, true)
            }
            EffectKind::Sticky { base, duration } => {
                let mut result = base.turn_end_diffs(ship);
                if *duration > 0 {
                    result.push(BattleDiff::ShipEffectChanged {
                        ship_id: ship.id,
                        effect_id: self.id,
                        duration: -1,
                    });
                }
                if *duration <= 1 {
                    let expired = Effect {
                        id: self.id,
                        kind: EffectKind::Sticky {
                            base: base.clone(),
                            duration: 0,
                        },
                    };
                    result.push(BattleDiff::ShipEffectRemoved {
                        ship_id: ship.id,
                        effect: expired,
                    });
                    result.extend(base.off_diffs(ship));
                }
                result
            }
            _ => Vec::new(),
        }
    }

    /// Damage factor from the damage modifiers active on a ship
    pub fn damage_factor(ship: &Ship) -> f64 {
        let percent: i32 = ship
            .all_effects()
            .filter_map(|effect| match effect.unwrapped().kind {
                EffectKind::DamageModifier { factor } => Some(factor),
                _ => None,
            })
            .sum();
        (percent.clamp(-100, 100) + 100) as f64 / 100.0
    }

    /// Split of a damage effect on a ship: (shield loss, hull loss, theoretical damage)
    pub fn effective_damage(&self, ship: &Ship, success: f64) -> (i32, i32, i32) {
        let (base, span) = match self.unwrapped().kind {
            EffectKind::Damage { base, span } => (base, span),
            _ => return (0, 0, 0),
        };
        let theoretical =
            ((base as f64 + span as f64 * success) * Self::damage_factor(ship)).round() as i32;
        let mut damage = theoretical.max(0);

        let shield = damage.min(ship.get_value(ShipValueName::Shield).max(0));
        damage -= shield;
        let hull = damage.min(ship.get_value(ShipValueName::Hull).max(0));

        (shield, hull, theoretical)
    }

    fn repel_diffs(
        &self,
        battle: &Battle,
        ship: &Ship,
        source: EffectSource,
        distance: f64,
    ) -> Vec<BattleDiff> {
        if source == EffectSource::Ship(ship.id) || ship.is_pinned(true) {
            return Vec::new();
        }
        let Some(origin) = source.location(battle) else {
            return Vec::new();
        };
        let position = ship.position();
        let angle = arena_angle(origin, position);
        let wanted = ArenaLocation::new(
            position.x + angle.cos() * distance,
            position.y + angle.sin() * distance,
        );
        let exclusion = ExclusionAreas::from_ship(battle, ship, 0.0, true);
        let destination = exclusion.stop_before(wanted, position);
        if destination != position {
            let start = ship.location();
            let mut end = start;
            end.x = destination.x;
            end.y = destination.y;
            vec![BattleDiff::ShipMove {
                ship_id: ship.id,
                start,
                end,
                engine: None,
            }]
        } else {
            Vec::new()
        }
    }

    /// Human readable description
    pub fn description(&self) -> String {
        match &self.kind {
            EffectKind::Damage { base, span } => {
                if *span > 0 {
                    format!("do {}-{} damage", base, base + span)
                } else {
                    format!("do {} damage", base)
                }
            }
            EffectKind::DamageModifier { factor } => {
                format!("{}% incoming damage", signed(*factor))
            }
            EffectKind::Attribute { attribute, value } => {
                format!("{} {}", attribute.name(), signed(*value))
            }
            EffectKind::AttributeMultiply { attribute, value } => {
                format!("{} {}%", attribute.name(), signed(*value))
            }
            EffectKind::AttributeLimit { attribute, value } => {
                format!("limit {} to {}", attribute.name(), value)
            }
            EffectKind::Value {
                value,
                on,
                off,
                start,
                end,
            } => {
                let mut parts = Vec::new();
                if *on != 0 {
                    if *off == -*on {
                        parts.push(format!("{} while active", signed(*on)));
                    } else if *off != 0 {
                        parts.push(format!("{} on", signed(*on)));
                        parts.push(format!("{} off", signed(*off)));
                    } else {
                        parts.push(signed(*on));
                    }
                }
                if *start != 0 {
                    if *end == -*start {
                        parts.push(format!("{} during turn", signed(*start)));
                    } else {
                        parts.push(format!("{} on turn start", signed(*start)));
                        if *end != 0 {
                            parts.push(format!("{} on turn end", signed(*end)));
                        }
                    }
                } else if *end != 0 {
                    parts.push(format!("{} on turn end", signed(*end)));
                }
                if *off != 0 && *on == 0 {
                    parts.push(format!("{} when removed", signed(*off)));
                }
                if parts.is_empty() {
                    "no effect".to_string()
                } else {
                    format!("{} {}", value.name(), parts.join(", "))
                }
            }
            EffectKind::ValueTransfer { value, amount } => {
                let verb = if *amount < 0 { "steal" } else { "give" };
                format!("{} {} {}", verb, amount.abs(), value.name())
            }
            EffectKind::Repel { distance } => format!("repel ships {}km away", distance),
            EffectKind::Cooldown { cooling, maxcount } => {
                let strength = if *cooling == 0 {
                    "Full".to_string()
                } else {
                    cooling.to_string()
                };
                let target = match maxcount {
                    0 => "all equipments".to_string(),
                    1 => "1 equipment".to_string(),
                    count => format!("{} equipments", count),
                };
                format!("{} cooling ({})", strength, target)
            }
            EffectKind::Pinned { hard } => {
                if *hard {
                    "anchored".to_string()
                } else {
                    "pinned".to_string()
                }
            }
            EffectKind::Vigilance {
                intruder_effects, ..
            } => {
                let effects: Vec<String> =
                    intruder_effects.iter().map(|effect| effect.description()).collect();
                format!("vigilance ({})", effects.join(", "))
            }
            EffectKind::Sticky { base, duration } => format!(
                "{} for {} turn{}",
                base.description(),
                duration,
                if *duration > 1 { "s" } else { "" }
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::fleet::Fleet;
    use crate::battle::loadout::{missile, tractor_beam, ShipBuilder};
    use crate::core::random::SkewedRandom;

    fn ids() -> IdAllocator {
        IdAllocator::new()
    }

    /// One ship per fleet, the first one playing
    fn two_ships(
        first: impl FnOnce(&IdAllocator) -> ShipBuilder,
        second: impl FnOnce(&IdAllocator) -> ShipBuilder,
    ) -> (Battle, ShipId, ShipId) {
        let ids = IdAllocator::new();
        let mut attackers = Fleet::new(&ids, "Attacker");
        let mut defenders = Fleet::new(&ids, "Defender");
        let first = attackers.add_ship(first(&ids).build(&ids));
        let second = defenders.add_ship(second(&ids).build(&ids));
        let mut battle = Battle::new(attackers, defenders, ids);
        battle.start(&mut SkewedRandom::new(vec![0.9, 0.1]));
        (battle, first, second)
    }

    fn place(battle: &mut Battle, ship: ShipId, x: f64, y: f64) {
        if let Some(ship) = battle.ship_mut(ship) {
            ship.set_arena_position(x, y);
        }
    }

    fn undo_last(battle: &mut Battle) {
        if let Some(diff) = battle.log.pop() {
            diff.revert(battle);
        }
    }

    fn undo_all(battle: &mut Battle) {
        while !battle.log.is_empty() {
            undo_last(battle);
        }
    }

    fn value_of(battle: &Battle, ship: ShipId, value: ShipValueName) -> i32 {
        battle.ship(ship).map(|ship| ship.get_value(value)).unwrap()
    }

    fn value_effect(on: i32, off: i32, start: i32, end: i32) -> Effect {
        Effect::new(
            &ids(),
            EffectKind::Value {
                value: ShipValueName::Hull,
                on,
                off,
                start,
                end,
            },
        )
    }

    #[test]
    fn test_damage_description() {
        let ids = ids();
        let effect = Effect::new(&ids, EffectKind::Damage { base: 50, span: 0 });
        assert_eq!(effect.description(), "do 50 damage");
        let effect = Effect::new(&ids, EffectKind::Damage { base: 50, span: 30 });
        assert_eq!(effect.description(), "do 50-80 damage");
    }

    #[test]
    fn test_value_descriptions() {
        assert_eq!(value_effect(0, 0, 0, 0).description(), "no effect");
        assert_eq!(value_effect(3, 0, 0, 0).description(), "hull +3");
        assert_eq!(value_effect(3, -3, 0, 0).description(), "hull +3 while active");
        assert_eq!(value_effect(3, 2, 0, 0).description(), "hull +3 on, +2 off");
        assert_eq!(value_effect(0, 0, 2, -2).description(), "hull +2 during turn");
        assert_eq!(
            value_effect(0, 0, 2, 1).description(),
            "hull +2 on turn start, +1 on turn end"
        );
        assert_eq!(value_effect(0, 0, 0, -4).description(), "hull -4 on turn end");
        assert_eq!(value_effect(0, 5, 0, 0).description(), "hull +5 when removed");
    }

    #[test]
    fn test_value_beneficial() {
        assert!(value_effect(3, 0, 0, 0).is_beneficial());
        assert!(!value_effect(-3, 0, 0, 0).is_beneficial());
        assert!(value_effect(3, -3, 0, 0).is_beneficial());
        assert!(!value_effect(0, 0, 2, -4).is_beneficial());
    }

    #[test]
    fn test_other_descriptions() {
        let ids = ids();
        let attr = Effect::new(
            &ids,
            EffectKind::Attribute {
                attribute: ShipAttributeName::Precision,
                value: 5,
            },
        );
        assert_eq!(attr.description(), "precision +5");
        assert_eq!(attr.full_code(), "attr-precision");

        let limit = Effect::new(
            &ids,
            EffectKind::AttributeLimit {
                attribute: ShipAttributeName::ShieldCapacity,
                value: 10,
            },
        );
        assert_eq!(limit.description(), "limit shield capacity to 10");
        assert!(!limit.is_beneficial());

        let mult = Effect::new(
            &ids,
            EffectKind::AttributeMultiply {
                attribute: ShipAttributeName::Maneuvrability,
                value: -20,
            },
        );
        assert_eq!(mult.description(), "maneuvrability -20%");

        let repel = Effect::new(&ids, EffectKind::Repel { distance: 34.0 });
        assert_eq!(repel.description(), "repel ships 34km away");

        let transfer = Effect::new(
            &ids,
            EffectKind::ValueTransfer {
                value: ShipValueName::Power,
                amount: -2,
            },
        );
        assert_eq!(transfer.description(), "steal 2 power");
        assert!(!transfer.is_beneficial());
    }

    #[test]
    fn test_cooldown_descriptions() {
        let ids = ids();
        let full = Effect::new(&ids, EffectKind::Cooldown { cooling: 0, maxcount: 0 });
        assert_eq!(full.description(), "Full cooling (all equipments)");
        let one = Effect::new(&ids, EffectKind::Cooldown { cooling: 1, maxcount: 1 });
        assert_eq!(one.description(), "1 cooling (1 equipment)");
        let two = Effect::new(&ids, EffectKind::Cooldown { cooling: 2, maxcount: 2 });
        assert_eq!(two.description(), "2 cooling (2 equipments)");
    }

    #[test]
    fn test_pinned_descriptions() {
        let ids = ids();
        assert_eq!(
            Effect::new(&ids, EffectKind::Pinned { hard: false }).description(),
            "pinned"
        );
        assert_eq!(
            Effect::new(&ids, EffectKind::Pinned { hard: true }).description(),
            "anchored"
        );
    }

    #[test]
    fn test_sticky_wraps_base() {
        let ids = ids();
        let base = Effect::new(
            &ids,
            EffectKind::Attribute {
                attribute: ShipAttributeName::Precision,
                value: 2,
            },
        );
        let sticky = Effect::sticky(&ids, base.clone(), 1);
        assert_eq!(sticky.description(), "precision +2 for 1 turn");
        assert_eq!(sticky.full_code(), "attr-precision");
        assert_eq!(sticky.code(), "attr");
        assert!(sticky.is_beneficial());
        assert_eq!(sticky.unwrapped(), &base);
        assert_eq!(sticky.duration(), Some(1));

        let longer = Effect::sticky(&ids, base, 3);
        assert_eq!(longer.description(), "precision +2 for 3 turns");
    }

    #[test]
    fn test_repel_pushes_away_from_source() {
        let (mut battle, pusher, pushed) = two_ships(|_| ShipBuilder::new("pusher"), |_| ShipBuilder::new("pushed"));
        place(&mut battle, pusher, 500.0, 400.0);
        place(&mut battle, pushed, 600.0, 400.0);
        let repel = Effect::new(&battle.ids, EffectKind::Repel { distance: 100.0 });

        assert!(battle.apply_effect(&repel, pushed, EffectSource::Ship(pusher)));
        let position = battle.ship(pushed).unwrap().position();
        assert!((position.x - 700.0).abs() < 1e-6);
        assert!((position.y - 400.0).abs() < 1e-6);

        undo_all(&mut battle);
        assert_eq!(battle.ship(pushed).unwrap().position(), ArenaLocation::new(600.0, 400.0));

        // The source never pushes itself
        assert!(!battle.apply_effect(&repel, pusher, EffectSource::Ship(pusher)));
    }

    #[test]
    fn test_repel_stops_at_arena_border() {
        let (mut battle, pusher, pushed) = two_ships(|_| ShipBuilder::new("pusher"), |_| ShipBuilder::new("pushed"));
        place(&mut battle, pusher, 1500.0, 400.0);
        place(&mut battle, pushed, 1700.0, 400.0);
        let repel = Effect::new(&battle.ids, EffectKind::Repel { distance: 200.0 });

        assert!(battle.apply_effect(&repel, pushed, EffectSource::Ship(pusher)));
        // Arena is 1808 wide, with a 50km border
        let position = battle.ship(pushed).unwrap().position();
        assert!((position.x - 1757.0).abs() < 1e-6);
        assert!((position.y - 400.0).abs() < 1e-6);

        undo_all(&mut battle);
        assert_eq!(battle.ship(pushed).unwrap().position(), ArenaLocation::new(1700.0, 400.0));
    }

    #[test]
    fn test_repel_spares_anchored_ships() {
        let (mut battle, pusher, pushed) = two_ships(|_| ShipBuilder::new("pusher"), |_| ShipBuilder::new("pushed"));
        place(&mut battle, pusher, 500.0, 400.0);
        place(&mut battle, pushed, 600.0, 400.0);
        let anchor = Effect::sticky(&battle.ids, Effect::new(&battle.ids, EffectKind::Pinned { hard: true }), 1);
        assert!(battle.apply_effect(&anchor, pushed, EffectSource::Ship(pusher)));

        let repel = Effect::new(&battle.ids, EffectKind::Repel { distance: 100.0 });
        assert!(!battle.apply_effect(&repel, pushed, EffectSource::Ship(pusher)));
        assert_eq!(battle.ship(pushed).unwrap().position(), ArenaLocation::new(600.0, 400.0));
    }

    #[test]
    fn test_value_transfer_moves_what_is_available() {
        let (mut battle, thief, victim) = two_ships(
            |_| ShipBuilder::new("thief").power(10),
            |_| ShipBuilder::new("victim").power(10),
        );
        for (ship, power) in [(thief, 2), (victim, 6)] {
            if let Some(ship) = battle.ship_mut(ship) {
                ship.set_value(ShipValueName::Power, power);
            }
        }
        let total = |battle: &Battle| value_of(battle, thief, ShipValueName::Power) + value_of(battle, victim, ShipValueName::Power);
        let steal = |amount| {
            EffectKind::ValueTransfer {
                value: ShipValueName::Power,
                amount,
            }
        };

        let effect = Effect::new(&battle.ids, steal(-3));
        assert!(battle.apply_effect(&effect, victim, EffectSource::Ship(thief)));
        assert_eq!(value_of(&battle, thief, ShipValueName::Power), 5);
        assert_eq!(value_of(&battle, victim, ShipValueName::Power), 3);
        assert_eq!(total(&battle), 8);

        // Only what the victim still has
        let effect = Effect::new(&battle.ids, steal(-10));
        assert!(battle.apply_effect(&effect, victim, EffectSource::Ship(thief)));
        assert_eq!(value_of(&battle, thief, ShipValueName::Power), 8);
        assert_eq!(value_of(&battle, victim, ShipValueName::Power), 0);
        assert!(!battle.apply_effect(&effect, victim, EffectSource::Ship(thief)));

        // Giving goes the other way
        let effect = Effect::new(&battle.ids, steal(4));
        assert!(battle.apply_effect(&effect, victim, EffectSource::Ship(thief)));
        assert_eq!(value_of(&battle, thief, ShipValueName::Power), 4);
        assert_eq!(value_of(&battle, victim, ShipValueName::Power), 4);
        assert_eq!(total(&battle), 8);

        undo_all(&mut battle);
        assert_eq!(value_of(&battle, thief, ShipValueName::Power), 2);
        assert_eq!(value_of(&battle, victim, ShipValueName::Power), 6);
    }

    #[test]
    fn test_cooldown_reduces_heat() {
        let (mut battle, ship_id, _) = two_ships(
            |ids| {
                ShipBuilder::new("hot")
                    .equip(tractor_beam(ids, 1, 200.0))
                    .equip(missile(ids, 1, 300.0, 50.0, 5))
            },
            |_| ShipBuilder::new("other"),
        );
        let ship = battle.ship(ship_id).unwrap();
        let beam = ship.actions.get_by_code("fire-tractorbeam").map(|action| action.id).unwrap();
        let launcher = ship.actions.get_by_code("fire-missile").map(|action| action.id).unwrap();
        for action in [beam, launcher] {
            battle.ship_mut(ship_id).unwrap().actions.cooldown_mut(action).unwrap().use_once();
        }
        let cooldown = |battle: &Battle, action| battle.ship(ship_id).unwrap().actions.cooldown(action);
        let heated = (cooldown(&battle, beam), cooldown(&battle, launcher));
        assert_eq!((heated.0.heat, heated.1.heat), (2, 1));

        // One step on the first overheated action
        let partial = Effect::new(&battle.ids, EffectKind::Cooldown { cooling: 1, maxcount: 1 });
        assert!(battle.apply_effect(&partial, ship_id, EffectSource::Ship(ship_id)));
        assert_eq!(cooldown(&battle, beam).heat, 1);
        assert_eq!(cooldown(&battle, launcher).heat, 1);

        let full = Effect::new(&battle.ids, EffectKind::Cooldown { cooling: 0, maxcount: 0 });
        assert!(battle.apply_effect(&full, ship_id, EffectSource::Ship(ship_id)));
        assert!(cooldown(&battle, beam).can_use());
        assert!(cooldown(&battle, launcher).can_use());
        assert!(!battle.apply_effect(&full, ship_id, EffectSource::Ship(ship_id)));

        undo_all(&mut battle);
        assert_eq!((cooldown(&battle, beam), cooldown(&battle, launcher)), heated);
    }

    #[test]
    fn test_attribute_limits_keep_the_lowest() {
        let (mut battle, ship_id, _) = two_ships(|_| ShipBuilder::new("sharp").precision(20), |_| ShipBuilder::new("other"));
        let precision = |battle: &Battle| battle.ship(ship_id).unwrap().get_attribute(ShipAttributeName::Precision);
        let limit = |value| EffectKind::AttributeLimit {
            attribute: ShipAttributeName::Precision,
            value,
        };
        assert_eq!(precision(&battle), 20);

        let loose = Effect::new(&battle.ids, limit(12));
        let tight = Effect::new(&battle.ids, limit(8));
        battle.apply_effect(&loose, ship_id, EffectSource::Ship(ship_id));
        assert_eq!(precision(&battle), 12);
        battle.apply_effect(&tight, ship_id, EffectSource::Ship(ship_id));
        assert_eq!(precision(&battle), 8);
        battle.apply_effect(&loose, ship_id, EffectSource::Ship(ship_id));
        assert_eq!(precision(&battle), 8);

        undo_last(&mut battle);
        undo_last(&mut battle);
        assert_eq!(precision(&battle), 12);
        undo_all(&mut battle);
        assert_eq!(precision(&battle), 20);
    }

    #[test]
    fn test_damage_modifier_scales_incoming_damage() {
        let (mut battle, shooter, target) = two_ships(|_| ShipBuilder::new("shooter"), |_| ShipBuilder::new("target").hull(100));
        let hit = Effect::new(&battle.ids, EffectKind::Damage { base: 20, span: 0 });
        let hull = |battle: &Battle| value_of(battle, target, ShipValueName::Hull);

        let damping = Effect::new(&battle.ids, EffectKind::DamageModifier { factor: -25 });
        let damped = Effect::sticky(&battle.ids, damping, 2);
        assert!(battle.apply_effect(&damped, target, EffectSource::Ship(shooter)));
        battle.apply_effect(&hit, target, EffectSource::Ship(shooter));
        assert_eq!(hull(&battle), 85);

        let weakness = Effect::new(&battle.ids, EffectKind::DamageModifier { factor: 75 });
        let weakened = Effect::sticky(&battle.ids, weakness, 2);
        battle.apply_effect(&weakened, target, EffectSource::Ship(shooter));
        battle.apply_effect(&hit, target, EffectSource::Ship(shooter));
        assert_eq!(hull(&battle), 55);

        undo_all(&mut battle);
        assert_eq!(hull(&battle), 100);
        assert_eq!(battle.ship(target).unwrap().effects().count(), 0);
        battle.apply_effect(&hit, target, EffectSource::Ship(shooter));
        assert_eq!(hull(&battle), 80);
    }
}
