//! Battle actions
//!
//! An action is the only way a playing ship changes the battle. Applying
//! one goes through a fixed pipeline:
//! 1. availability check (playing, power, cooldown, kind-specific rules)
//! 2. target check (kinds may alter or reject the requested target)
//! 3. diffs: action used, power spent, then the kind-specific diffs
//!
//! Kinds form a closed set, each implemented in its own module.

pub mod action_list;
pub mod cooldown;
pub mod deploy_drone;
pub mod end_turn;
pub mod move_action;
pub mod toggle;
pub mod trigger;
pub mod vigilance;

pub use action_list::ActionList;
pub use cooldown::{Cooldown, CooldownSpec};
pub use deploy_drone::DeployDroneAction;
pub use move_action::MoveAction;
pub use toggle::ToggleAction;
pub use trigger::TriggerAction;
pub use vigilance::VigilanceAction;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::battle::diffs::BattleDiff;
use crate::battle::effects::Effect;
use crate::battle::geometry::{ArenaLocation, Target};
use crate::battle::ship::Ship;
use crate::battle::ship_value::ShipValueName;
use crate::battle::state::Battle;
use crate::core::types::{ActionId, EquipmentId, IdAllocator, ShipId};

// === TARGETTING ===

/// Hint on the kind of target an action needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionTargettingMode {
    /// Applied at once on the owner ship
    SelfOnly,
    /// Applied on the owner ship, after confirmation
    SelfConfirm,
    /// Applied on one selected ship
    Ship,
    /// Applied on a point in space
    Space,
    /// Applied on the owner ship, affecting its surroundings
    Surroundings,
}

/// Team filter of ships affected by an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TargetFilter {
    #[default]
    All,
    Allies,
    AlliesButSelf,
    Enemies,
}

impl TargetFilter {
    /// Whether `other` passes the filter, seen from `source`
    pub fn matches(self, source: &Ship, other: &Ship) -> bool {
        match self {
            Self::All => true,
            Self::Allies => source.fleet_id == other.fleet_id,
            Self::AlliesButSelf => source.fleet_id == other.fleet_id && source.id != other.id,
            Self::Enemies => source.fleet_id != other.fleet_id,
        }
    }

    /// Designation of the filtered ships, as used in descriptions
    pub fn designation(self, plural: bool) -> &'static str {
        match (self, plural) {
            (Self::All, true) => "ships",
            (Self::All, false) => "ship",
            (Self::Allies | Self::AlliesButSelf, true) => "team members",
            (Self::Allies | Self::AlliesButSelf, false) => "team member",
            (Self::Enemies, true) => "enemies",
            (Self::Enemies, false) => "enemy",
        }
    }
}

/// Reason why an action cannot be used right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionUnavailability {
    /// The ship does not have this action
    NotAvailable,
    NotPlaying,
    Power,
    Overheated,
    /// A vigilance action is active
    Vigilance,
    Pinned,
}

impl fmt::Display for ActionUnavailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NotAvailable => "action not available",
            Self::NotPlaying => "ship not playing",
            Self::Power => "not enough power",
            Self::Overheated => "overheated",
            Self::Vigilance => "vigilance active",
            Self::Pinned => "pinned",
        };
        f.write_str(text)
    }
}

// === ACTION ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionKind {
    EndTurn,
    Move(MoveAction),
    Trigger(TriggerAction),
    Toggle(ToggleAction),
    DeployDrone(DeployDroneAction),
    Vigilance(VigilanceAction),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub id: ActionId,
    pub code: String,
    pub name: String,
    /// Equipment providing this action, if any
    pub equipment: Option<EquipmentId>,
    pub cooldown: CooldownSpec,
    pub kind: ActionKind,
}

impl Action {
    pub fn new(ids: &IdAllocator, code: &str, name: &str, kind: ActionKind) -> Self {
        Self {
            id: ids.next_id(),
            code: code.to_string(),
            name: name.to_string(),
            equipment: None,
            cooldown: CooldownSpec::unlimited(),
            kind,
        }
    }

    /// The end-turn action, common to all ships
    pub fn end_turn() -> Self {
        Self {
            id: ActionId::END_TURN,
            code: "endturn".to_string(),
            name: "End turn".to_string(),
            equipment: None,
            cooldown: CooldownSpec::unlimited(),
            kind: ActionKind::EndTurn,
        }
    }

    /// Engine with default safety distance
    pub fn engine(ids: &IdAllocator, name: &str, distance_per_power: f64) -> Self {
        Self::new(
            ids,
            "move",
            name,
            ActionKind::Move(MoveAction::new(distance_per_power)),
        )
    }

    pub fn weapon(ids: &IdAllocator, code: &str, name: &str, weapon: TriggerAction) -> Self {
        Self::new(ids, &format!("fire-{}", code), name, ActionKind::Trigger(weapon))
    }

    pub fn toggle(ids: &IdAllocator, code: &str, name: &str, toggle: ToggleAction) -> Self {
        Self::new(ids, &format!("toggle-{}", code), name, ActionKind::Toggle(toggle))
    }

    pub fn deploy_drone(ids: &IdAllocator, name: &str, deploy: DeployDroneAction) -> Self {
        Self::new(
            ids,
            &format!("deploy-{}", deploy.drone_code),
            name,
            ActionKind::DeployDrone(deploy),
        )
    }

    /// Vigilance toggle; the watch effect is bound to the new action id
    pub fn vigilance(
        ids: &IdAllocator,
        code: &str,
        name: &str,
        toggle: ToggleAction,
        intruder_count: u32,
        intruder_effects: Vec<Effect>,
    ) -> Self {
        let id: ActionId = ids.next_id();
        let vigilance = VigilanceAction::new(ids, id, toggle, intruder_count, intruder_effects);
        Self {
            id,
            code: code.to_string(),
            name: name.to_string(),
            equipment: None,
            cooldown: CooldownSpec::unlimited(),
            kind: ActionKind::Vigilance(vigilance),
        }
    }

    pub fn with_cooldown(mut self, overheat: u32, cooling: u32) -> Self {
        self.cooldown = CooldownSpec::new(overheat, cooling);
        self
    }

    pub fn is_end_turn(&self) -> bool {
        matches!(self.kind, ActionKind::EndTurn)
    }

    /// Toggle part of the action (plain toggles and vigilance)
    pub fn as_toggle(&self) -> Option<&ToggleAction> {
        match &self.kind {
            ActionKind::Toggle(toggle) => Some(toggle),
            ActionKind::Vigilance(vigilance) => Some(&vigilance.toggle),
            _ => None,
        }
    }

    pub fn as_move(&self) -> Option<&MoveAction> {
        match &self.kind {
            ActionKind::Move(engine) => Some(engine),
            _ => None,
        }
    }

    pub fn as_trigger(&self) -> Option<&TriggerAction> {
        match &self.kind {
            ActionKind::Trigger(trigger) => Some(trigger),
            _ => None,
        }
    }

    /// Effects this action delivers to its targets
    pub fn effects(&self) -> &[Effect] {
        match &self.kind {
            ActionKind::Trigger(trigger) => &trigger.effects,
            ActionKind::Toggle(toggle) => &toggle.effects,
            ActionKind::DeployDrone(deploy) => &deploy.effects,
            ActionKind::Vigilance(vigilance) => &vigilance.intruder_effects,
            ActionKind::EndTurn | ActionKind::Move(_) => &[],
        }
    }

    pub fn verb(&self, ship: &Ship) -> &'static str {
        let toggled = ship.actions.is_toggled(self.id);
        match &self.kind {
            ActionKind::EndTurn => "End turn",
            ActionKind::Move(_) => "Move",
            ActionKind::Trigger(trigger) => trigger.verb(),
            ActionKind::Toggle(_) => {
                if toggled {
                    "Deactivate"
                } else {
                    "Activate"
                }
            }
            ActionKind::DeployDrone(_) => "Deploy",
            ActionKind::Vigilance(_) => {
                if toggled {
                    "Stop"
                } else {
                    "Watch with"
                }
            }
        }
    }

    pub fn targetting_mode(&self, battle: &Battle, ship: &Ship) -> ActionTargettingMode {
        match &self.kind {
            ActionKind::EndTurn => {
                if ship.get_value(ShipValueName::Power) != 0 {
                    ActionTargettingMode::SelfConfirm
                } else {
                    ActionTargettingMode::SelfOnly
                }
            }
            ActionKind::Move(_) => ActionTargettingMode::Space,
            ActionKind::Trigger(trigger) => trigger.targetting_mode(),
            ActionKind::Toggle(toggle) => toggle.targetting_mode(ship.actions.is_toggled(self.id)),
            ActionKind::Vigilance(vigilance) => vigilance
                .toggle
                .targetting_mode(ship.actions.is_toggled(self.id)),
            ActionKind::DeployDrone(deploy) => deploy.targetting_mode(self.id, battle, ship),
        }
    }

    pub fn default_target(&self, battle: &Battle, ship: &Ship) -> Target {
        match &self.kind {
            ActionKind::Move(engine) => engine.default_target(ship),
            ActionKind::Trigger(trigger) => trigger.default_target(battle, ship),
            ActionKind::DeployDrone(deploy) => deploy.default_target(self.id, battle, ship),
            ActionKind::EndTurn | ActionKind::Toggle(_) | ActionKind::Vigilance(_) => ship.target(),
        }
    }

    /// Power needed to apply the action (estimated when no target is given)
    ///
    /// Negative values give power back.
    pub fn power_usage(&self, battle: &Battle, ship: &Ship, target: Option<&Target>) -> i32 {
        match &self.kind {
            ActionKind::EndTurn => end_turn::power_usage(ship),
            ActionKind::Move(engine) => engine.power_usage(ship, target),
            ActionKind::Trigger(trigger) => trigger.power,
            ActionKind::Toggle(toggle) => toggle.power_usage(ship.actions.is_toggled(self.id)),
            ActionKind::Vigilance(vigilance) => vigilance
                .toggle
                .power_usage(ship.actions.is_toggled(self.id)),
            ActionKind::DeployDrone(deploy) => deploy.power_usage(self.id, battle, ship),
        }
    }

    /// Maximal distance of a target, for targetting purposes
    pub fn range_radius(&self, ship: &Ship) -> f64 {
        match &self.kind {
            ActionKind::Move(engine) => {
                engine.range_radius(ship, ship.get_value(ShipValueName::Power))
            }
            ActionKind::Trigger(trigger) => trigger.range,
            ActionKind::DeployDrone(deploy) => deploy.deploy_distance,
            ActionKind::EndTurn | ActionKind::Toggle(_) | ActionKind::Vigilance(_) => 0.0,
        }
    }

    /// Why the action cannot be used by a ship, if it cannot
    ///
    /// `remaining_power` defaults to the ship's current power.
    pub fn check_cannot_be_applied(
        &self,
        battle: &Battle,
        ship: &Ship,
        remaining_power: Option<i32>,
    ) -> Option<ActionUnavailability> {
        if ship.actions.get(self.id).is_none() {
            return Some(ActionUnavailability::NotAvailable);
        }
        if battle.playing_ship_id() != Some(ship.id) {
            return Some(ActionUnavailability::NotPlaying);
        }

        let remaining = remaining_power.unwrap_or_else(|| ship.get_value(ShipValueName::Power));
        let checks_power = !matches!(self.kind, ActionKind::EndTurn | ActionKind::Move(_));
        if checks_power && remaining < self.power_usage(battle, ship, None) {
            return Some(ActionUnavailability::Power);
        }

        if !ship.actions.cooldown(self.id).can_use() {
            return Some(ActionUnavailability::Overheated);
        }

        match &self.kind {
            ActionKind::Move(engine) => engine.check_cannot_be_applied(ship, remaining),
            _ => None,
        }
    }

    pub fn can_be_used(&self, battle: &Battle, ship: &Ship, remaining_power: Option<i32>) -> bool {
        self.check_cannot_be_applied(battle, ship, remaining_power)
            .is_none()
    }

    /// Check a target, returning it (possibly altered) when suitable
    pub fn check_target(&self, battle: &Battle, ship: &Ship, target: Target) -> Option<Target> {
        if self.check_cannot_be_applied(battle, ship, None).is_some() {
            return None;
        }
        match &self.kind {
            ActionKind::EndTurn | ActionKind::Toggle(_) | ActionKind::Vigilance(_) => {
                (target.ship_id == Some(ship.id)).then_some(target)
            }
            ActionKind::Move(engine) => {
                if target.is_ship() {
                    None
                } else {
                    engine.check_location_target(battle, ship, target)
                }
            }
            ActionKind::Trigger(trigger) => trigger.check_target(ship, target),
            ActionKind::DeployDrone(deploy) => deploy.check_target(self.id, battle, ship, target),
        }
    }

    /// Ships affected by applying the action on a target
    pub fn impacted_ships(
        &self,
        battle: &Battle,
        ship: &Ship,
        target: &Target,
        source: ArenaLocation,
    ) -> Vec<ShipId> {
        match &self.kind {
            ActionKind::Trigger(trigger) => trigger.impacted_ships(battle, target, source),
            ActionKind::Toggle(toggle) => toggle.impacted_ships(battle, ship, source),
            ActionKind::Vigilance(vigilance) => vigilance.toggle.impacted_ships(battle, ship, source),
            ActionKind::DeployDrone(deploy) => battle
                .alive_ships()
                .filter(|other| other.distance_to_location(target.location()) <= deploy.effect_radius)
                .map(|other| other.id)
                .collect(),
            ActionKind::EndTurn | ActionKind::Move(_) => Vec::new(),
        }
    }

    /// Full list of diffs caused by applying the action
    ///
    /// Empty when the action or the target is rejected.
    pub fn get_diffs(&self, battle: &Battle, ship: &Ship, target: Target) -> Vec<BattleDiff> {
        if let Some(reason) = self.check_cannot_be_applied(battle, ship, None) {
            tracing::warn!(action = %self.code, ship = %ship.id, %reason, "Action rejected");
            return Vec::new();
        }

        let Some(checked) = self.check_target(battle, ship, target) else {
            tracing::warn!(action = %self.code, ship = %ship.id, %target, "Action rejected - invalid target");
            return Vec::new();
        };

        let cost = self.power_usage(battle, ship, Some(&checked));
        if !self.is_end_turn() && ship.get_value(ShipValueName::Power) < cost {
            tracing::warn!(action = %self.code, ship = %ship.id, cost, "Action rejected - not enough power");
            return Vec::new();
        }

        let mut result = vec![BattleDiff::ShipActionUsed {
            ship_id: ship.id,
            action_id: self.id,
            target: checked,
        }];

        if cost != 0 {
            result.extend(ship.get_value_diffs(ShipValueName::Power, -cost, true));
        }

        result.extend(self.specific_diffs(battle, ship, &checked));
        result
    }

    fn specific_diffs(&self, battle: &Battle, ship: &Ship, target: &Target) -> Vec<BattleDiff> {
        match &self.kind {
            ActionKind::EndTurn => end_turn::specific_diffs(battle, ship),
            ActionKind::Move(engine) => engine.specific_diffs(self.id, ship, target),
            ActionKind::Trigger(trigger) => trigger.specific_diffs(self.id, battle, ship, target),
            ActionKind::Toggle(toggle) => toggle.specific_diffs(self.id, battle, ship, true),
            ActionKind::Vigilance(vigilance) => {
                vigilance.toggle.specific_diffs(self.id, battle, ship, false)
            }
            ActionKind::DeployDrone(deploy) => deploy.specific_diffs(self.id, battle, ship, target),
        }
    }

    /// Apply the action on the battle, for a given ship
    ///
    /// Without target, the default one is used. Returns false when nothing
    /// was applied.
    pub fn apply(&self, battle: &mut Battle, ship_id: ShipId, target: Option<Target>) -> bool {
        let diffs = {
            let Some(ship) = battle.ship(ship_id) else {
                tracing::error!(action = %self.code, ship = %ship_id, "Could not apply action, ship not found");
                return false;
            };
            let target = target.unwrap_or_else(|| self.default_target(battle, ship));
            if self.check_target(battle, ship, target).is_none() {
                tracing::error!(action = %self.code, ship = %ship_id, %target, "Could not apply action, target rejected");
                return false;
            }
            self.get_diffs(battle, ship, target)
        };

        if diffs.is_empty() {
            tracing::error!(action = %self.code, ship = %ship_id, "Could not apply action, no diff produced");
            false
        } else {
            battle.apply_diffs(diffs);
            true
        }
    }

    /// Textual description of what the action does
    pub fn effects_description(&self) -> String {
        match &self.kind {
            ActionKind::EndTurn => {
                "End the current ship's turn.\nWill also generate power and cool down equipments."
                    .to_string()
            }
            ActionKind::Move(engine) => engine.description(),
            ActionKind::Trigger(trigger) => trigger.description(),
            ActionKind::Toggle(toggle) => toggle.description(),
            ActionKind::Vigilance(vigilance) => vigilance.description(),
            ActionKind::DeployDrone(deploy) => deploy.description(),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}
