//! Equipment attached to ships

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::battle::actions::Action;
use crate::battle::effects::Effect;
use crate::core::types::{EquipmentId, IdAllocator};

/// Kind of slot an equipment fits in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotType {
    Hull,
    Shield,
    Power,
    Engine,
    Weapon,
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Hull => "hull",
            Self::Shield => "shield",
            Self::Power => "power",
            Self::Engine => "engine",
            Self::Weapon => "weapon",
        };
        f.write_str(name)
    }
}

/// Piece of equipment: permanent effects and an optional action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: EquipmentId,
    pub code: String,
    pub name: String,
    pub slot: SlotType,
    /// Permanent effects on the ship that equips this
    pub effects: Vec<Effect>,
    pub action: Option<Action>,
}

impl Equipment {
    pub fn new(ids: &IdAllocator, slot: SlotType, code: &str) -> Self {
        Self {
            id: ids.next_id(),
            code: code.to_string(),
            name: code.to_string(),
            slot,
            effects: Vec::new(),
            action: None,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_effects(mut self, effects: Vec<Effect>) -> Self {
        self.effects = effects;
        self
    }

    /// Attach the action triggered by this equipment
    pub fn with_action(mut self, mut action: Action) -> Self {
        action.equipment = Some(self.id);
        self.action = Some(action);
        self
    }

    /// Description of permanent effects and action
    pub fn effects_description(&self) -> String {
        let mut parts = Vec::new();

        if !self.effects.is_empty() {
            let lines: Vec<String> = std::iter::once("When equipped:".to_string())
                .chain(self.effects.iter().map(|effect| format!("• {}", effect.description())))
                .collect();
            parts.push(lines.join("\n"));
        }

        if let Some(action) = &self.action {
            let description = action.effects_description();
            if !description.is_empty() {
                parts.push(description);
            }
        }

        if parts.is_empty() {
            "does nothing".to_string()
        } else {
            parts.join("\n\n")
        }
    }
}
