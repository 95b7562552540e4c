//! Overheat and cooling of actions

use serde::{Deserialize, Serialize};

/// Static cooldown configuration of an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CooldownSpec {
    /// Uses per turn before overheating (0 for unlimited)
    pub overheat: u32,
    /// Turn ends needed to cool down once overheated
    pub cooling: u32,
}

impl CooldownSpec {
    pub fn new(overheat: u32, cooling: u32) -> Self {
        Self { overheat, cooling }
    }

    /// No overheat at all
    pub fn unlimited() -> Self {
        Self::new(0, 1)
    }
}

/// Live cooldown state of an action on a ship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cooldown {
    /// Uses since last cooling
    pub uses: u32,
    /// Remaining heat, in turns
    pub heat: u32,
    pub overheat: u32,
    pub cooling: u32,
}

impl Default for Cooldown {
    fn default() -> Self {
        Self::from_spec(CooldownSpec::unlimited())
    }
}

impl Cooldown {
    pub fn from_spec(spec: CooldownSpec) -> Self {
        Self {
            uses: 0,
            heat: 0,
            overheat: spec.overheat,
            cooling: spec.cooling.max(1),
        }
    }

    pub fn can_use(&self) -> bool {
        self.heat == 0
    }

    /// Whether one more use would overheat
    pub fn will_overheat(&self) -> bool {
        self.overheat > 0 && self.uses + 1 >= self.overheat
    }

    /// Uses left before overheating (`None` when unlimited)
    pub fn remaining_uses(&self) -> Option<u32> {
        if self.overheat == 0 {
            None
        } else if self.heat > 0 {
            Some(0)
        } else {
            Some(self.overheat.saturating_sub(self.uses))
        }
    }

    /// Record uses (negative to undo them)
    ///
    /// Heat is fully derived from the use count, so undoing the use that
    /// overheated the action also clears the heat.
    pub fn use_times(&mut self, count: i32) {
        if self.overheat == 0 {
            return;
        }
        self.uses = (self.uses as i64 + count as i64).max(0) as u32;
        self.heat = if self.uses >= self.overheat {
            self.cooling
        } else {
            0
        };
    }

    pub fn use_once(&mut self) {
        self.use_times(1);
    }

    /// Dissipate some heat
    pub fn cool(&mut self, steps: u32) {
        self.heat = self.heat.saturating_sub(steps);
        if self.heat == 0 {
            self.uses = 0;
        }
    }

    /// Undo a cooling; an action only heats up at its overheat count
    pub fn heat_up(&mut self, steps: u32) {
        self.heat += steps;
        if self.heat > 0 {
            self.uses = self.uses.max(self.overheat);
        }
    }

    pub fn reset(&mut self) {
        self.uses = 0;
        self.heat = 0;
    }
}

impl std::fmt::Display for Cooldown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Overheat {} / Cooldown {}", self.overheat, self.cooling)
    }
}
