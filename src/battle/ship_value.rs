//! Bounded ship quantities
//!
//! Values (hull, shield, power) are plain counters consumed in battle.
//! Attributes (capacities, maneuvrability, precision) are derived from a
//! list of modifiers contributed by equipment and active effects.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Values consumed during a battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipValueName {
    Hull,
    Shield,
    Power,
}

impl ShipValueName {
    pub const ALL: [ShipValueName; 3] = [Self::Hull, Self::Shield, Self::Power];

    /// Attribute bounding this value
    pub fn capacity(self) -> ShipAttributeName {
        match self {
            Self::Hull => ShipAttributeName::HullCapacity,
            Self::Shield => ShipAttributeName::ShieldCapacity,
            Self::Power => ShipAttributeName::PowerCapacity,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Hull => "hull",
            Self::Shield => "shield",
            Self::Power => "power",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Hull => "Physical structure of the ship",
            Self::Shield => "Shield around the ship that may absorb damage",
            Self::Power => "Power available to supply the equipments",
        }
    }
}

impl fmt::Display for ShipValueName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Attributes derived from modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipAttributeName {
    HullCapacity,
    ShieldCapacity,
    PowerCapacity,
    Maneuvrability,
    Precision,
}

impl ShipAttributeName {
    pub const ALL: [ShipAttributeName; 5] = [
        Self::HullCapacity,
        Self::ShieldCapacity,
        Self::PowerCapacity,
        Self::Maneuvrability,
        Self::Precision,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::HullCapacity => "hull capacity",
            Self::ShieldCapacity => "shield capacity",
            Self::PowerCapacity => "power capacity",
            Self::Maneuvrability => "maneuvrability",
            Self::Precision => "precision",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::HullCapacity => "Maximal Hull value before the ship risks collapsing",
            Self::ShieldCapacity => "Maximal Shield value to protect the hull from damage",
            Self::PowerCapacity => "Maximal Power value to use equipment",
            Self::Maneuvrability => "Ability to move first, fast and to evade weapons",
            Self::Precision => "Ability to target far and aim good",
        }
    }
}

impl fmt::Display for ShipAttributeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One modification of an attribute
///
/// Any combination of the three parts may be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttributeModifier {
    pub cumulative: Option<i32>,
    /// Percent bonus (or malus if negative)
    pub multiplier: Option<i32>,
    pub limit: Option<i32>,
}

impl AttributeModifier {
    pub fn cumulative(value: i32) -> Self {
        Self {
            cumulative: Some(value),
            ..Self::default()
        }
    }

    pub fn multiplier(value: i32) -> Self {
        Self {
            multiplier: Some(value),
            ..Self::default()
        }
    }

    pub fn limit(value: i32) -> Self {
        Self {
            limit: Some(value),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cumulative.is_none() && self.multiplier.is_none() && self.limit.is_none()
    }
}

/// Attribute computed from its modifiers
///
/// Value is the sum of cumulatives, scaled by the sum of multipliers (in
/// percent) when there are any, then capped by the lowest limit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShipAttribute {
    current: i32,
    cumulatives: Vec<i32>,
    multipliers: Vec<i32>,
    limits: Vec<i32>,
}

impl ShipAttribute {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> i32 {
        self.current
    }

    /// Lowest limit, if any limit applies
    pub fn maximal(&self) -> Option<i32> {
        self.limits.iter().copied().min()
    }

    pub fn reset(&mut self) {
        self.cumulatives.clear();
        self.multipliers.clear();
        self.limits.clear();
        self.update();
    }

    pub fn add_modifier(&mut self, modifier: AttributeModifier) {
        if let Some(value) = modifier.cumulative {
            self.cumulatives.push(value);
        }
        if let Some(value) = modifier.multiplier {
            self.multipliers.push(value);
        }
        if let Some(value) = modifier.limit {
            self.limits.push(value);
        }
        self.update();
    }

    /// Remove one occurrence of each part of the modifier
    pub fn remove_modifier(&mut self, modifier: AttributeModifier) {
        fn remove_one(list: &mut Vec<i32>, value: i32) {
            if let Some(index) = list.iter().position(|item| *item == value) {
                list.remove(index);
            }
        }
        if let Some(value) = modifier.cumulative {
            remove_one(&mut self.cumulatives, value);
        }
        if let Some(value) = modifier.multiplier {
            remove_one(&mut self.multipliers, value);
        }
        if let Some(value) = modifier.limit {
            remove_one(&mut self.limits, value);
        }
        self.update();
    }

    fn update(&mut self) {
        let mut value: i32 = self.cumulatives.iter().sum();
        if !self.multipliers.is_empty() {
            let percent: i32 = self.multipliers.iter().sum();
            value = (value as f64 * (1.0 + percent as f64 / 100.0)).round() as i32;
        }
        if let Some(limit) = self.maximal() {
            value = value.min(limit);
        }
        self.current = value;
    }
}

/// Full set of attributes of a ship
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShipAttributes {
    pub hull_capacity: ShipAttribute,
    pub shield_capacity: ShipAttribute,
    pub power_capacity: ShipAttribute,
    pub maneuvrability: ShipAttribute,
    pub precision: ShipAttribute,
}

impl ShipAttributes {
    pub fn get(&self, name: ShipAttributeName) -> &ShipAttribute {
        match name {
            ShipAttributeName::HullCapacity => &self.hull_capacity,
            ShipAttributeName::ShieldCapacity => &self.shield_capacity,
            ShipAttributeName::PowerCapacity => &self.power_capacity,
            ShipAttributeName::Maneuvrability => &self.maneuvrability,
            ShipAttributeName::Precision => &self.precision,
        }
    }

    pub fn get_mut(&mut self, name: ShipAttributeName) -> &mut ShipAttribute {
        match name {
            ShipAttributeName::HullCapacity => &mut self.hull_capacity,
            ShipAttributeName::ShieldCapacity => &mut self.shield_capacity,
            ShipAttributeName::PowerCapacity => &mut self.power_capacity,
            ShipAttributeName::Maneuvrability => &mut self.maneuvrability,
            ShipAttributeName::Precision => &mut self.precision,
        }
    }

    pub fn reset(&mut self) {
        for name in ShipAttributeName::ALL {
            self.get_mut(name).reset();
        }
    }
}

/// Current values of a ship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShipValues {
    pub hull: i32,
    pub shield: i32,
    pub power: i32,
}

impl ShipValues {
    pub fn get(&self, name: ShipValueName) -> i32 {
        match name {
            ShipValueName::Hull => self.hull,
            ShipValueName::Shield => self.shield,
            ShipValueName::Power => self.power,
        }
    }

    pub fn set(&mut self, name: ShipValueName, value: i32) {
        match name {
            ShipValueName::Hull => self.hull = value,
            ShipValueName::Shield => self.shield = value,
            ShipValueName::Power => self.power = value,
        }
    }
}
