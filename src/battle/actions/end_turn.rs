//! End of a ship's turn: power regeneration, cooling and turn change

use ahash::AHashSet;

use crate::battle::diffs::BattleDiff;
use crate::battle::ship::Ship;
use crate::battle::ship_value::{ShipAttributeName, ShipValueName};
use crate::battle::state::Battle;
use crate::core::types::EffectId;

/// Power "used" by ending the turn
///
/// Negative: the ship recovers its capacity, minus what active toggles lock.
pub fn power_usage(ship: &Ship) -> i32 {
    let toggled: i32 = ship
        .toggle_actions(true)
        .filter_map(|action| action.as_toggle())
        .map(|toggle| toggle.power)
        .sum();
    ship.get_value(ShipValueName::Power) + toggled - ship.get_attribute(ShipAttributeName::PowerCapacity)
}

pub fn specific_diffs(battle: &Battle, ship: &Ship) -> Vec<BattleDiff> {
    if battle.playing_ship_id() != Some(ship.id) {
        return Vec::new();
    }
    let mut result = Vec::new();

    // Cool down actions
    for (action_id, _) in ship.actions.overheated() {
        result.push(BattleDiff::ShipCooldown {
            ship_id: ship.id,
            action_id,
            heat: 1,
        });
    }

    // "On turn end" effects
    for effect in ship.effects() {
        result.extend(effect.turn_end_diffs(ship));
    }

    let Some(new_ship) = battle.next_ship() else {
        return result;
    };
    let cycle_diff = if battle.play_order_index(new_ship.id) == Some(0) {
        1
    } else {
        0
    };
    result.push(BattleDiff::ShipChange {
        ship_id: ship.id,
        new_ship: new_ship.id,
        cycle_diff,
    });

    // Drones of the new ship
    for drone in battle.drones().filter(|drone| drone.owner == new_ship.id) {
        result.extend(drone.activation_diffs(battle));
    }

    // "On turn start" effects, not counting the ones just removed
    let removed: AHashSet<EffectId> = result
        .iter()
        .filter_map(|diff| match diff {
            BattleDiff::ShipEffectRemoved { ship_id, effect } if *ship_id == new_ship.id => Some(effect.id),
            _ => None,
        })
        .collect();
    for effect in new_ship.effects().filter(|effect| !removed.contains(&effect.id)) {
        result.extend(effect.turn_start_diffs(new_ship));
    }

    result
}
