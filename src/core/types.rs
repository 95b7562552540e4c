//! Core type definitions used throughout the codebase
//!
//! Every battle object is referenced by a typed integer id. Ids are handed
//! out by an [`IdAllocator`] owned by the session (and then by the battle),
//! never by a process-wide counter.

use std::cell::Cell;
use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! object_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

object_id!(
    /// Unique identifier for ships
    ShipId,
    "ship"
);
object_id!(
    /// Unique identifier for fleets
    FleetId,
    "fleet"
);
object_id!(
    /// Unique identifier for drones deployed in a battle
    DroneId,
    "drone"
);
object_id!(
    /// Unique identifier for effect instances (templates and active copies)
    EffectId,
    "effect"
);
object_id!(
    /// Unique identifier for actions
    ActionId,
    "action"
);
object_id!(
    /// Unique identifier for equipment items
    EquipmentId,
    "equipment"
);

impl ActionId {
    /// Reserved id of the end-of-turn action every ship owns
    pub const END_TURN: ActionId = ActionId(0);
}

/// Battle cycle counter (one cycle = every ship played once)
pub type Cycle = u32;

/// Per-session identifier allocator
///
/// Uses interior mutability so that code computing diffs from a shared
/// `&Battle` can still mint ids for the objects those diffs will create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdAllocator {
    next: Cell<u64>,
}

impl IdAllocator {
    /// Create an allocator; ids start at 1 (0 is reserved)
    pub fn new() -> Self {
        Self { next: Cell::new(1) }
    }

    /// Allocate the next id, typed by the caller
    pub fn next_id<T: From<u64>>(&self) -> T {
        let value = self.next.get();
        self.next.set(value + 1);
        T::from(value)
    }

    /// Value the next allocation will return
    pub fn peek(&self) -> u64 {
        self.next.get()
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
