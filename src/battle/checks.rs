//! Consistency checks run after every action
//!
//! Diffs produced by an action may leave the battle in a state that needs
//! fixing (ship out of an area, value above its capacity, hull at zero...).
//! The checks pass computes corrective diffs and applies them, until a pass
//! finds nothing left to fix.

use ahash::{AHashMap, AHashSet};

use crate::battle::diffs::BattleDiff;
use crate::battle::effects::{EffectKind, EffectSource};
use crate::battle::ship::Ship;
use crate::battle::ship_value::ShipValueName;
use crate::battle::state::Battle;
use crate::core::types::{ActionId, EffectId, ShipId};

/// One checks pass, with its vigilance reaction budget
#[derive(Debug, Default)]
pub struct BattleChecks {
    /// Reactions already done, by watching ship and vigilance action
    reactions: AHashMap<(ShipId, ActionId), u32>,
}

impl BattleChecks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply checks until the battle is consistent, returning the applied diffs
    pub fn apply(&mut self, battle: &mut Battle) -> Vec<BattleDiff> {
        let max_iterations = battle.config.max_check_iterations;
        let mut all = Vec::new();
        let mut loops = 0;

        loop {
            let diffs = self.check_all(battle);
            if diffs.is_empty() {
                break;
            }
            battle.apply_diffs(diffs.clone());
            all.extend(diffs);

            loops += 1;
            if loops >= max_iterations {
                tracing::error!(loops, "Battle checks stuck in infinite loop");
                break;
            }
        }

        all
    }

    /// Next batch of corrective diffs, by priority
    ///
    /// Applying a batch may reveal more things to fix; call again while this
    /// returns diffs.
    pub fn check_all(&mut self, battle: &Battle) -> Vec<BattleDiff> {
        if battle.ended() {
            return Vec::new();
        }

        let diffs = self.check_area_effects(battle);
        if !diffs.is_empty() {
            return diffs;
        }

        let diffs = check_ship_values(battle);
        if !diffs.is_empty() {
            return diffs;
        }

        let diffs = check_dead_ships(battle);
        if !diffs.is_empty() {
            return diffs;
        }

        check_victory(battle)
    }

    /// Area effects to remove from or add to alive ships
    pub fn check_area_effects(&mut self, battle: &Battle) -> Vec<BattleDiff> {
        let ships: Vec<&Ship> = battle.alive_ships().collect();
        ships
            .into_iter()
            .flat_map(|ship| self.area_effects_diffs(battle, ship))
            .collect()
    }

    /// Diffs bringing a ship's area effects in line with its position
    pub fn area_effects_diffs(&mut self, battle: &Battle, ship: &Ship) -> Vec<BattleDiff> {
        let mut result = Vec::new();
        let expected = battle.area_effects(ship);
        let expected_ids: AHashSet<EffectId> = expected.iter().map(|(_, effect)| effect.id).collect();

        // Obsolete effects (sticky copies leave on their own)
        for effect in ship.effects() {
            if !effect.is_sticky() && !expected_ids.contains(&effect.id) {
                result.push(BattleDiff::ShipEffectRemoved {
                    ship_id: ship.id,
                    effect: effect.clone(),
                });
                result.extend(effect.off_diffs(ship));
            }
        }

        // Missing effects
        for (source, effect) in expected {
            if ship.has_effect(effect.id) {
                continue;
            }
            result.push(BattleDiff::ShipEffectAdded {
                ship_id: ship.id,
                effect: effect.clone(),
            });
            if self.consume_reaction(source, &effect.kind) {
                result.extend(effect.on_diffs(battle, ship, source, 1.0));
            }
        }

        result
    }

    /// Whether an effect entering a ship should run its on-diffs
    ///
    /// Only vigilance marks are limited, to their intruder count per pass.
    fn consume_reaction(&mut self, source: EffectSource, kind: &EffectKind) -> bool {
        let EffectKind::Vigilance {
            action,
            intruder_count,
            ..
        } = kind
        else {
            return true;
        };
        if *intruder_count == 0 {
            return true;
        }
        let EffectSource::Ship(watcher) = source else {
            return true;
        };
        let done = self.reactions.entry((watcher, *action)).or_insert(0);
        if *done < *intruder_count {
            *done += 1;
            true
        } else {
            tracing::debug!(ship = %watcher, action = %action, "Vigilance reaction budget exhausted");
            false
        }
    }
}

/// Values of alive ships brought back between 0 and their capacity
pub fn check_ship_values(battle: &Battle) -> Vec<BattleDiff> {
    let mut result = Vec::new();
    for ship in battle.alive_ships() {
        for name in ShipValueName::ALL {
            let value = ship.get_value(name);
            let maximum = ship.get_attribute(name.capacity());
            let diff = if value < 0 {
                -value
            } else if value > maximum {
                maximum - value
            } else {
                0
            };
            if diff != 0 {
                result.push(BattleDiff::ShipValue {
                    ship_id: ship.id,
                    value: name,
                    diff,
                });
            }
        }
    }
    result
}

/// Death of the first non-playing ship without hull
///
/// One ship at a time, as a death may change the state of others.
pub fn check_dead_ships(battle: &Battle) -> Vec<BattleDiff> {
    let playing = battle.playing_ship_id();
    battle
        .alive_ships()
        .find(|ship| Some(ship.id) != playing && ship.get_value(ShipValueName::Hull) <= 0)
        .map(|ship| ship.get_death_diffs())
        .unwrap_or_default()
}

/// End of the battle when a single fleet remains
pub fn check_victory(battle: &Battle) -> Vec<BattleDiff> {
    if battle.ended() {
        return Vec::new();
    }
    let alive: Vec<_> = battle.fleets.iter().filter(|fleet| fleet.is_alive()).collect();
    if alive.len() == battle.fleets.len() {
        return Vec::new();
    }
    match alive.as_slice() {
        [winner] => vec![BattleDiff::EndBattle {
            winner: Some(winner.id),
        }],
        [] if battle.config.draw_on_mutual_destruction => vec![BattleDiff::EndBattle { winner: None }],
        _ => Vec::new(),
    }
}
