//! Battle system - turn-based tactical combat between two fleets
//!
//! Every change to a running battle is a [`BattleDiff`]: actions and
//! effects only compute diffs, the [`Battle`] applies them and keeps them
//! in its log. Any state can be reached again by replaying or reverting the
//! log, which is what replays, undo and AI look-ahead rely on.
//!
//! Turn structure:
//! - the play order is thrown once, at battle start (initiative)
//! - the playing ship applies actions until it ends its turn
//! - after each action, the checks pass fixes up the battle state
//!   (area effects, value ranges, deaths, victory)

pub mod actions;
pub mod ai;
pub mod checks;
pub mod cheats;
pub mod constants;
pub mod diffs;
pub mod drone;
pub mod effects;
pub mod equipment;
pub mod exclusion;
pub mod fleet;
pub mod geometry;
pub mod loadout;
pub mod log;
pub mod outcome;
pub mod ship;
pub mod ship_value;
pub mod simulator;
pub mod state;
pub mod stats;

// Re-exports for convenient access
pub use actions::{
    Action, ActionKind, ActionList, ActionTargettingMode, ActionUnavailability, Cooldown, CooldownSpec,
    DeployDroneAction, MoveAction, TargetFilter, ToggleAction, TriggerAction, VigilanceAction,
};
pub use checks::BattleChecks;
pub use cheats::BattleCheats;
pub use constants::*;
pub use diffs::BattleDiff;
pub use drone::Drone;
pub use effects::{Effect, EffectKind, EffectSource};
pub use equipment::{Equipment, SlotType};
pub use exclusion::ExclusionAreas;
pub use fleet::Fleet;
pub use geometry::{
    angular_difference, arena_angle, arena_distance, ArenaCircleArea, ArenaLocation, ArenaLocationAngle, Target,
};
pub use loadout::{quick_battle, quick_battle_with_config, standard_fleet, standard_ship, ShipBuilder};
pub use log::{BattleEvent, BattleEventType, DiffLog, DiffLogClient, EventBus, SubscriptionId};
pub use outcome::BattleOutcome;
pub use ship::Ship;
pub use ship_value::{AttributeModifier, ShipAttribute, ShipAttributeName, ShipValueName};
pub use simulator::{Approach, MoveFirePart, MoveFireResult, MoveFireSimulator};
pub use state::Battle;
pub use stats::{BattleStats, FleetStats, StatLine};
