//! Vigilance: watch an area and react to ships entering it
//!
//! Activation only marks the ships already inside with a vigilance effect.
//! Reactions happen later, in the checks pass, when a ship without the
//! mark is found inside the area.

use serde::{Deserialize, Serialize};

use crate::battle::actions::ToggleAction;
use crate::battle::effects::{Effect, EffectKind};
use crate::core::types::{ActionId, IdAllocator};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VigilanceAction {
    pub toggle: ToggleAction,
    /// Maximal number of intruders reacted to at once (0 for unlimited)
    pub intruder_count: u32,
    pub intruder_effects: Vec<Effect>,
}

impl VigilanceAction {
    /// Bind a vigilance to its action; the toggle carries the watch mark
    pub fn new(
        ids: &IdAllocator,
        action_id: ActionId,
        mut toggle: ToggleAction,
        intruder_count: u32,
        intruder_effects: Vec<Effect>,
    ) -> Self {
        toggle.effects = vec![Effect::new(
            ids,
            EffectKind::Vigilance {
                action: action_id,
                intruder_count,
                intruder_effects: intruder_effects.clone(),
            },
        )];
        Self {
            toggle,
            intruder_count,
            intruder_effects,
        }
    }

    pub fn description(&self) -> String {
        let filter = self.toggle.filter;
        let suffix = match self.intruder_count {
            0 => format!("on all incoming {}", filter.designation(true)),
            1 => format!("on the first incoming {}", filter.designation(false)),
            count => format!("on the first {} incoming {}", count, filter.designation(true)),
        };
        let effects: Vec<String> = self
            .intruder_effects
            .iter()
            .map(|effect| format!("• {} {}", effect.description(), suffix))
            .collect();
        format!(
            "Watch a {}km area (power usage {}):\n{}",
            self.toggle.radius,
            self.toggle.power,
            effects.join("\n")
        )
    }
}
