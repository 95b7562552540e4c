//! Toggled equipment: effects that stay active until switched off

use serde::{Deserialize, Serialize};

use crate::battle::actions::{ActionTargettingMode, TargetFilter};
use crate::battle::diffs::BattleDiff;
use crate::battle::effects::{Effect, EffectSource};
use crate::battle::geometry::{arena_distance, ArenaLocation};
use crate::battle::ship::Ship;
use crate::battle::state::Battle;
use crate::core::types::{ActionId, ShipId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToggleAction {
    /// Power locked while active (given back on deactivation)
    pub power: i32,
    /// Radius of the affected area (0 for the owner ship only)
    pub radius: f64,
    pub filter: TargetFilter,
    pub effects: Vec<Effect>,
}

impl ToggleAction {
    pub fn new(power: i32, radius: f64, effects: Vec<Effect>) -> Self {
        Self {
            power,
            radius,
            filter: TargetFilter::All,
            effects,
        }
    }

    pub fn with_filter(mut self, filter: TargetFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn targetting_mode(&self, toggled: bool) -> ActionTargettingMode {
        if toggled || self.radius <= 0.0 {
            ActionTargettingMode::SelfConfirm
        } else {
            ActionTargettingMode::Surroundings
        }
    }

    pub fn power_usage(&self, toggled: bool) -> i32 {
        if toggled {
            -self.power
        } else {
            self.power
        }
    }

    /// Whether a ship is affected by the toggle of an owner ship
    pub fn covers(&self, owner: &Ship, other: &Ship) -> bool {
        if self.radius <= 0.0 {
            owner.id == other.id
        } else {
            arena_distance(owner.position(), other.position()) <= self.radius && self.filter.matches(owner, other)
        }
    }

    /// Alive ships in the area around `source`, passing the team filter
    pub fn impacted_ships(&self, battle: &Battle, ship: &Ship, source: ArenaLocation) -> Vec<ShipId> {
        if self.radius <= 0.0 {
            return vec![ship.id];
        }
        battle
            .alive_ships()
            .filter(|other| arena_distance(other.position(), source) <= self.radius)
            .filter(|other| self.filter.matches(ship, other))
            .map(|other| other.id)
            .collect()
    }

    /// Switch the toggle, adding or removing its effects on impacted ships
    ///
    /// With `apply_on` unset, activation registers the effects without
    /// running their on-diffs.
    pub fn specific_diffs(
        &self,
        action_id: ActionId,
        battle: &Battle,
        ship: &Ship,
        apply_on: bool,
    ) -> Vec<BattleDiff> {
        let toggled = ship.actions.is_toggled(action_id);
        let mut result = vec![BattleDiff::ShipActionToggle {
            ship_id: ship.id,
            action_id,
            activated: !toggled,
        }];

        for impacted_id in self.impacted_ships(battle, ship, ship.position()) {
            let Some(impacted) = battle.ship(impacted_id) else {
                continue;
            };
            for effect in &self.effects {
                if toggled {
                    if impacted.has_effect(effect.id) {
                        result.push(BattleDiff::ShipEffectRemoved {
                            ship_id: impacted_id,
                            effect: effect.clone(),
                        });
                        result.extend(effect.off_diffs(impacted));
                    }
                } else if !impacted.has_effect(effect.id) {
                    result.push(BattleDiff::ShipEffectAdded {
                        ship_id: impacted_id,
                        effect: effect.clone(),
                    });
                    if apply_on {
                        result.extend(effect.on_diffs(battle, impacted, EffectSource::Ship(ship.id), 1.0));
                    }
                }
            }
        }

        result
    }

    pub fn description(&self) -> String {
        if self.effects.is_empty() {
            return String::new();
        }
        let suffix = if self.radius > 0.0 {
            format!("in {}km radius", self.radius)
        } else {
            "on owner ship".to_string()
        };
        let effects: Vec<String> = self
            .effects
            .iter()
            .map(|effect| format!("• {} {}", effect.description(), suffix))
            .collect();
        format!("When active (power usage {}):\n{}", self.power, effects.join("\n"))
    }
}
