//! Per-ship bookkeeping of available actions, toggles and cooldowns
//!
//! Actions are re-derived from the ship equipment by
//! [`ActionList::update_from_ship`], which resets toggles, cooldowns and
//! custom actions, and bumps [`ActionList::version`]. Action ids held
//! across two versions are stale: consumers should re-resolve by code.

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::battle::actions::{Action, Cooldown};
use crate::battle::equipment::Equipment;
use crate::core::types::ActionId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionList {
    from_model: Vec<Action>,
    custom: Vec<Action>,
    end_turn: Action,
    toggled: AHashSet<ActionId>,
    cooldowns: AHashMap<ActionId, Cooldown>,
    version: u32,
}

impl Default for ActionList {
    fn default() -> Self {
        Self {
            from_model: Vec::new(),
            custom: Vec::new(),
            end_turn: Action::end_turn(),
            toggled: AHashSet::new(),
            cooldowns: AHashMap::new(),
            version: 0,
        }
    }
}

impl ActionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Re-derive actions from equipment, resetting all live state
    pub fn update_from_ship(&mut self, equipments: &[Equipment]) {
        self.from_model = equipments
            .iter()
            .filter_map(|equipment| equipment.action.clone())
            .collect();
        self.custom.clear();
        self.toggled.clear();
        self.cooldowns.clear();
        self.version += 1;
    }

    /// Add an action not provided by equipment
    pub fn add_custom(&mut self, action: Action) -> ActionId {
        let id = action.id;
        self.custom.push(action);
        id
    }

    /// Every action, end turn last
    pub fn list_all(&self) -> impl Iterator<Item = &Action> {
        self.from_model
            .iter()
            .chain(self.custom.iter())
            .chain(std::iter::once(&self.end_turn))
    }

    pub fn get(&self, id: ActionId) -> Option<&Action> {
        self.list_all().find(|action| action.id == id)
    }

    pub fn get_by_code(&self, code: &str) -> Option<&Action> {
        self.list_all().find(|action| action.code == code)
    }

    pub fn is_toggled(&self, id: ActionId) -> bool {
        self.toggled.contains(&id)
    }

    /// Set the toggle state of an action, returning the resulting state
    pub fn toggle(&mut self, id: ActionId, active: bool) -> bool {
        let is_toggle = self
            .get(id)
            .map(|action| action.as_toggle().is_some())
            .unwrap_or(false);
        if is_toggle {
            if active {
                self.toggled.insert(id);
            } else {
                self.toggled.remove(&id);
            }
        } else {
            tracing::warn!(action = %id, "Cannot toggle, not a toggle action");
        }
        self.is_toggled(id)
    }

    /// Currently active toggles
    pub fn toggled_actions(&self) -> impl Iterator<Item = &Action> {
        self.list_all()
            .filter(move |action| self.toggled.contains(&action.id))
    }

    /// Live cooldown of an action (a fresh one when never used)
    pub fn cooldown(&self, id: ActionId) -> Cooldown {
        if let Some(cooldown) = self.cooldowns.get(&id) {
            return *cooldown;
        }
        match self.get(id) {
            Some(action) => Cooldown::from_spec(action.cooldown),
            None => Cooldown::default(),
        }
    }

    pub fn cooldown_mut(&mut self, id: ActionId) -> Option<&mut Cooldown> {
        let spec = self.get(id)?.cooldown;
        Some(
            self.cooldowns
                .entry(id)
                .or_insert_with(|| Cooldown::from_spec(spec)),
        )
    }

    /// Actions with some heat, in list order
    pub fn overheated(&self) -> impl Iterator<Item = (ActionId, Cooldown)> + '_ {
        self.list_all().filter_map(move |action| {
            let cooldown = self.cooldown(action.id);
            (cooldown.heat > 0).then_some((action.id, cooldown))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::actions::ToggleAction;
    use crate::battle::equipment::SlotType;
    use crate::core::types::IdAllocator;

    fn equipped(ids: &IdAllocator) -> Vec<Equipment> {
        vec![
            Equipment::new(ids, SlotType::Engine, "engine").with_action(Action::engine(ids, "Engine", 100.0)),
            Equipment::new(ids, SlotType::Hull, "plate"),
        ]
    }

    #[test]
    fn test_update_from_ship() {
        let ids = IdAllocator::new();
        let mut list = ActionList::new();
        assert_eq!(list.list_all().count(), 1);
        assert!(list.get(ActionId::END_TURN).is_some());

        list.update_from_ship(&equipped(&ids));
        assert_eq!(list.version(), 1);
        let codes: Vec<&str> = list.list_all().map(|action| action.code.as_str()).collect();
        assert_eq!(codes, vec!["move", "endturn"]);
        assert!(list.get_by_code("move").is_some());
        assert!(list.get_by_code("fire-laser").is_none());
    }

    #[test]
    fn test_update_resets_state() {
        let ids = IdAllocator::new();
        let mut list = ActionList::new();
        let toggle = list.add_custom(Action::toggle(&ids, "shield", "Shield", ToggleAction::new(1, 0.0, vec![])));
        assert!(list.toggle(toggle, true));
        assert!(list.is_toggled(toggle));
        assert_eq!(list.toggled_actions().count(), 1);

        list.update_from_ship(&equipped(&ids));
        assert!(!list.is_toggled(toggle));
        assert!(list.get(toggle).is_none());
    }

    #[test]
    fn test_toggle_only_toggle_actions() {
        let ids = IdAllocator::new();
        let mut list = ActionList::new();
        let engine = list.add_custom(Action::engine(&ids, "Engine", 100.0));
        assert!(!list.toggle(engine, true));
        assert!(!list.toggle(ActionId(999), true));
    }

    #[test]
    fn test_cooldowns() {
        let ids = IdAllocator::new();
        let mut list = ActionList::new();
        let engine = list.add_custom(Action::engine(&ids, "Engine", 100.0).with_cooldown(1, 2));
        assert!(list.cooldown(engine).can_use());
        assert_eq!(list.overheated().count(), 0);

        if let Some(cooldown) = list.cooldown_mut(engine) {
            cooldown.use_once();
        }
        assert_eq!(list.cooldown(engine).heat, 2);
        let overheated: Vec<ActionId> = list.overheated().map(|(id, _)| id).collect();
        assert_eq!(overheated, vec![engine]);

        assert!(list.cooldown_mut(ActionId(999)).is_none());
    }
}
