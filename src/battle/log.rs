//! Battle log and typed events
//!
//! The [`DiffLog`] keeps every applied diff, in order. Diffs are stored as
//! applied, with their revert data, so a log can be walked backward.
//!
//! External observers (display, stats, AI reactions) subscribe to the
//! [`EventBus`] and receive one [`BattleEvent`] per applied or reverted diff.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::battle::diffs::BattleDiff;
use crate::battle::geometry::{ArenaLocationAngle, Target};
use crate::battle::ship_value::ShipValueName;
use crate::battle::state::Battle;
use crate::core::types::{ActionId, Cycle, DroneId, FleetId, ShipId};

// === DIFF LOG ===

/// Ordered list of applied diffs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiffLog {
    diffs: Vec<BattleDiff>,
}

impl DiffLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diff: BattleDiff) {
        self.diffs.push(diff);
    }

    pub fn get(&self, index: usize) -> Option<&BattleDiff> {
        self.diffs.get(index)
    }

    pub fn count(&self) -> usize {
        self.diffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diffs.is_empty()
    }

    /// Remove and return the last diff
    pub fn pop(&mut self) -> Option<BattleDiff> {
        self.diffs.pop()
    }

    /// Drop every diff from `start` onward
    pub fn clear(&mut self, start: usize) {
        self.diffs.truncate(start);
    }

    pub fn iter(&self) -> impl Iterator<Item = &BattleDiff> {
        self.diffs.iter()
    }
}

/// Cursor walking a log over its own copy of a battle
///
/// The client battle must be in the state matching the cursor position:
/// either a copy of the battle before any logged diff (cursor 0), or a copy
/// of the current battle (cursor at the log end).
#[derive(Debug, Clone)]
pub struct DiffLogClient {
    battle: Battle,
    cursor: usize,
}

impl DiffLogClient {
    /// Client over a battle copy matching the start of the log
    pub fn at_log_start(battle: Battle) -> Self {
        Self { battle, cursor: 0 }
    }

    /// Client over a battle copy matching the end of a log
    pub fn at_log_end(battle: Battle, log: &DiffLog) -> Self {
        Self {
            battle,
            cursor: log.count(),
        }
    }

    /// Battle as displayed at the cursor position
    pub fn battle(&self) -> &Battle {
        &self.battle
    }

    /// Number of diffs applied on the client battle
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn at_start(&self) -> bool {
        self.cursor == 0
    }

    pub fn at_end(&self, log: &DiffLog) -> bool {
        self.cursor >= log.count()
    }

    /// Last diff applied on the client battle
    pub fn current<'a>(&self, log: &'a DiffLog) -> Option<&'a BattleDiff> {
        self.cursor.checked_sub(1).and_then(|index| log.get(index))
    }

    /// Apply the next diff, returning its event
    pub fn forward(&mut self, log: &DiffLog) -> Option<BattleEvent> {
        let mut diff = log.get(self.cursor)?.clone();
        diff.apply(&mut self.battle);
        let event = BattleEvent::new(self.cursor, self.battle.cycle, false, &diff);
        self.cursor += 1;
        Some(event)
    }

    /// Revert the last applied diff, returning its event
    pub fn backward(&mut self, log: &DiffLog) -> Option<BattleEvent> {
        let index = self.cursor.checked_sub(1)?;
        let diff = log.get(index)?;
        diff.revert(&mut self.battle);
        self.cursor = index;
        Some(BattleEvent::new(index, self.battle.cycle, true, diff))
    }

    /// Apply every remaining diff
    pub fn jump_to_end(&mut self, log: &DiffLog) -> Vec<BattleEvent> {
        std::iter::from_fn(|| self.forward(log)).collect()
    }

    /// Revert every applied diff
    pub fn jump_to_start(&mut self, log: &DiffLog) -> Vec<BattleEvent> {
        std::iter::from_fn(|| self.backward(log)).collect()
    }

    /// Drop logged diffs after the cursor
    pub fn truncate(&self, log: &mut DiffLog) {
        log.clear(self.cursor);
    }
}

// === EVENTS ===

/// Typed, human readable view of one diff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BattleEventType {
    ValueChange {
        ship_id: ShipId,
        value: ShipValueName,
        diff: i32,
    },
    AttributeChange { ship_id: ShipId },
    EffectAdded { ship_id: ShipId, code: String },
    EffectRemoved { ship_id: ShipId, code: String },
    EffectChanged { ship_id: ShipId },
    Damage {
        ship_id: ShipId,
        shield: i32,
        hull: i32,
    },
    Move {
        ship_id: ShipId,
        start: ArenaLocationAngle,
        end: ArenaLocationAngle,
    },
    Death { ship_id: ShipId },
    ShipChange {
        ship_id: ShipId,
        new_ship: ShipId,
        new_cycle: bool,
    },
    ActionUsed {
        ship_id: ShipId,
        action_id: ActionId,
        target: Target,
    },
    ActionEnded { ship_id: ShipId },
    Toggle {
        ship_id: ShipId,
        action_id: ActionId,
        activated: bool,
    },
    Cooldown {
        ship_id: ShipId,
        action_id: ActionId,
        heat: u32,
    },
    Fire {
        ship_id: ShipId,
        action_id: ActionId,
        target: Target,
    },
    DroneDeployed { drone_id: DroneId, owner: ShipId },
    DroneDestroyed { drone_id: DroneId },
    DroneApplied { drone_id: DroneId, ships: usize },
    EndBattle { winner: Option<FleetId> },
}

impl BattleEventType {
    pub fn from_diff(diff: &BattleDiff) -> Self {
        match diff {
            BattleDiff::ShipValue {
                ship_id,
                value,
                diff,
            } => Self::ValueChange {
                ship_id: *ship_id,
                value: *value,
                diff: *diff,
            },
            BattleDiff::ShipAttribute { ship_id, .. } => Self::AttributeChange { ship_id: *ship_id },
            BattleDiff::ShipEffectAdded { ship_id, effect } => Self::EffectAdded {
                ship_id: *ship_id,
                code: effect.full_code(),
            },
            BattleDiff::ShipEffectRemoved { ship_id, effect } => Self::EffectRemoved {
                ship_id: *ship_id,
                code: effect.full_code(),
            },
            BattleDiff::ShipEffectChanged { ship_id, .. } => Self::EffectChanged { ship_id: *ship_id },
            BattleDiff::ShipDamage {
                ship_id,
                shield,
                hull,
                ..
            } => Self::Damage {
                ship_id: *ship_id,
                shield: *shield,
                hull: *hull,
            },
            BattleDiff::ShipMove {
                ship_id, start, end, ..
            } => Self::Move {
                ship_id: *ship_id,
                start: *start,
                end: *end,
            },
            BattleDiff::ShipDeath { ship_id, .. } => Self::Death { ship_id: *ship_id },
            BattleDiff::ShipChange {
                ship_id,
                new_ship,
                cycle_diff,
            } => Self::ShipChange {
                ship_id: *ship_id,
                new_ship: *new_ship,
                new_cycle: *cycle_diff > 0,
            },
            BattleDiff::ShipActionUsed {
                ship_id,
                action_id,
                target,
            } => Self::ActionUsed {
                ship_id: *ship_id,
                action_id: *action_id,
                target: *target,
            },
            BattleDiff::ShipActionEnded { ship_id } => Self::ActionEnded { ship_id: *ship_id },
            BattleDiff::ShipActionToggle {
                ship_id,
                action_id,
                activated,
            } => Self::Toggle {
                ship_id: *ship_id,
                action_id: *action_id,
                activated: *activated,
            },
            BattleDiff::ShipCooldown {
                ship_id,
                action_id,
                heat,
            } => Self::Cooldown {
                ship_id: *ship_id,
                action_id: *action_id,
                heat: *heat,
            },
            BattleDiff::ProjectileFired {
                ship_id,
                action_id,
                target,
            } => Self::Fire {
                ship_id: *ship_id,
                action_id: *action_id,
                target: *target,
            },
            BattleDiff::DroneDeployed { drone } => Self::DroneDeployed {
                drone_id: drone.id,
                owner: drone.owner,
            },
            BattleDiff::DroneDestroyed { drone } => Self::DroneDestroyed { drone_id: drone.id },
            BattleDiff::DroneApplied { drone_id, ships } => Self::DroneApplied {
                drone_id: *drone_id,
                ships: ships.len(),
            },
            BattleDiff::EndBattle { winner } => Self::EndBattle { winner: *winner },
        }
    }
}

impl fmt::Display for BattleEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValueChange {
                ship_id,
                value,
                diff,
            } => write!(f, "{} {} {:+}", ship_id, value, diff),
            Self::AttributeChange { ship_id } => write!(f, "{} attributes changed", ship_id),
            Self::EffectAdded { ship_id, code } => write!(f, "{} gains {}", ship_id, code),
            Self::EffectRemoved { ship_id, code } => write!(f, "{} loses {}", ship_id, code),
            Self::EffectChanged { ship_id } => write!(f, "{} effect duration changed", ship_id),
            Self::Damage {
                ship_id,
                shield,
                hull,
            } => write!(f, "{} takes {} shield and {} hull damage", ship_id, shield, hull),
            Self::Move { ship_id, end, .. } => {
                write!(f, "{} moves to ({:.0}, {:.0})", ship_id, end.x, end.y)
            }
            Self::Death { ship_id } => write!(f, "{} is destroyed", ship_id),
            Self::ShipChange {
                new_ship, new_cycle, ..
            } => {
                if *new_cycle {
                    write!(f, "New cycle, {} plays", new_ship)
                } else {
                    write!(f, "{} plays", new_ship)
                }
            }
            Self::ActionUsed {
                ship_id,
                action_id,
                target,
            } => write!(f, "{} uses {} on {}", ship_id, action_id, target),
            Self::ActionEnded { ship_id } => write!(f, "{} action ended", ship_id),
            Self::Toggle {
                ship_id,
                action_id,
                activated,
            } => write!(
                f,
                "{} {} {}",
                ship_id,
                if *activated { "activates" } else { "deactivates" },
                action_id
            ),
            Self::Cooldown {
                ship_id,
                action_id,
                heat,
            } => write!(f, "{} cools {} by {}", ship_id, action_id, heat),
            Self::Fire {
                ship_id,
                action_id,
                target,
            } => write!(f, "{} fires {} at {}", ship_id, action_id, target),
            Self::DroneDeployed { drone_id, owner } => write!(f, "{} deploys {}", owner, drone_id),
            Self::DroneDestroyed { drone_id } => write!(f, "{} is destroyed", drone_id),
            Self::DroneApplied { drone_id, ships } => {
                write!(f, "{} affects {} ship(s)", drone_id, ships)
            }
            Self::EndBattle { winner } => match winner {
                Some(fleet) => write!(f, "Battle won by {}", fleet),
                None => f.write_str("Battle ended in a draw"),
            },
        }
    }
}

/// Log entry for battle observers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleEvent {
    /// Position of the diff in the log
    pub index: usize,
    pub cycle: Cycle,
    /// Emitted by a revert rather than an apply
    pub reverted: bool,
    pub event_type: BattleEventType,
}

impl BattleEvent {
    pub fn new(index: usize, cycle: Cycle, reverted: bool, diff: &BattleDiff) -> Self {
        Self {
            index,
            cycle,
            reverted,
            event_type: BattleEventType::from_diff(diff),
        }
    }
}

impl fmt::Display for BattleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reverted {
            write!(f, "[{}] (reverted) {}", self.cycle, self.event_type)
        } else {
            write!(f, "[{}] {}", self.cycle, self.event_type)
        }
    }
}

// === EVENT BUS ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&BattleEvent) + Send>;

/// Subscribers notified of every battle event
///
/// Subscribers only see immutable events and cannot reach the battle.
/// They are not persisted, nor carried by clones.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&BattleEvent) + Send + 'static) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscriber, returning false if it was unknown
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn publish(&mut self, event: &BattleEvent) {
        for (_, callback) in self.subscribers.iter_mut() {
            callback(event);
        }
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
