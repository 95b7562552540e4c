//! Maneuver producers and evaluators for the tactical AI
//!
//! Producers propose maneuvers for the playing ship. Evaluators score a
//! maneuver in `[-1, 1]`, from one point of view each (power left, damage
//! done, positioning...). The tactical AI combines them with weights.

use crate::battle::actions::{Action, ActionKind, ActionTargettingMode};
use crate::battle::ai::maneuver::Maneuver;
use crate::battle::diffs::BattleDiff;
use crate::battle::geometry::{arena_distance, ArenaLocation, Target};
use crate::battle::ship::Ship;
use crate::battle::ship_value::{ShipAttributeName, ShipValueName};
use crate::battle::state::Battle;
use crate::core::random::RandomGenerator;

/// Scores a maneuver in `[-1, 1]`
pub type Evaluator = fn(&Battle, &Ship, &Maneuver) -> f64;

// === PRODUCERS ===

/// Actions the ship could use right now
fn playable_actions<'a>(battle: &'a Battle, ship: &'a Ship) -> impl Iterator<Item = &'a Action> + 'a {
    ship.actions
        .list_all()
        .filter(move |action| action.can_be_used(battle, ship, None))
}

/// "Random" arena locations, one per cell of a `cells`x`cells` grid
pub fn scan_arena(battle: &Battle, cells: usize, rng: &mut dyn RandomGenerator) -> Vec<Target> {
    let width = battle.config.arena_width;
    let height = battle.config.arena_height;
    let cells = cells.max(1);
    (0..cells * cells)
        .map(|cell| {
            let (x, y) = ((cell % cells) as f64, (cell / cells) as f64);
            Target::from_location(
                (x + rng.random()) * width / cells as f64,
                (y + rng.random()) * height / cells as f64,
            )
        })
        .collect()
}

pub fn produce_end_turn(battle: &Battle, ship: &Ship) -> Vec<Maneuver> {
    vec![Maneuver::new(battle, ship, &Action::end_turn(), ship.target())]
}

/// Every weapon on every alive enemy
pub fn produce_direct_shots(battle: &Battle, ship: &Ship) -> Vec<Maneuver> {
    let weapons: Vec<&Action> = playable_actions(battle, ship)
        .filter(|action| action.as_trigger().is_some())
        .collect();
    battle
        .enemies(ship.fleet_id, true)
        .flat_map(|enemy| {
            weapons
                .iter()
                .map(move |weapon| Maneuver::new(battle, ship, weapon, enemy.target()))
        })
        .collect()
}

/// Blast shots between two close enemies
pub fn produce_interesting_blast_shots(battle: &Battle, ship: &Ship) -> Vec<Maneuver> {
    let enemies: Vec<&Ship> = battle.enemies(ship.fleet_id, true).collect();
    let mut result = Vec::new();
    for weapon in playable_actions(battle, ship) {
        let Some(trigger) = weapon.as_trigger().filter(|trigger| trigger.blast > 0.0) else {
            continue;
        };
        for (index, first) in enemies.iter().enumerate() {
            for second in &enemies[index + 1..] {
                if first.distance_to(second) < trigger.blast * 2.0 {
                    let middle = Target::from_location(
                        (first.arena_x + second.arena_x) / 2.0,
                        (first.arena_y + second.arena_y) / 2.0,
                    );
                    result.push(Maneuver::new(battle, ship, weapon, middle));
                }
            }
        }
    }
    result
}

/// Blast shots on a grid, keeping those hitting anything
pub fn produce_random_blast_shots(
    battle: &Battle,
    ship: &Ship,
    cells: usize,
    rng: &mut dyn RandomGenerator,
) -> Vec<Maneuver> {
    let weapons: Vec<&Action> = playable_actions(battle, ship)
        .filter(|action| action.as_trigger().is_some_and(|trigger| trigger.blast > 0.0))
        .collect();
    if weapons.is_empty() {
        return Vec::new();
    }
    let grid = scan_arena(battle, cells, rng);
    weapons
        .into_iter()
        .flat_map(|weapon| grid.iter().map(move |location| (weapon, *location)))
        .filter(|(weapon, location)| {
            weapon.as_trigger().is_some_and(|trigger| {
                !trigger
                    .impacted_ships(battle, location, ship.position())
                    .is_empty()
            })
        })
        .map(|(weapon, location)| Maneuver::new(battle, ship, weapon, location))
        .collect()
}

pub fn produce_blast_shots(
    battle: &Battle,
    ship: &Ship,
    cells: usize,
    rng: &mut dyn RandomGenerator,
) -> Vec<Maneuver> {
    let mut result = produce_interesting_blast_shots(battle, ship);
    result.extend(produce_random_blast_shots(battle, ship, cells, rng));
    result
}

/// Switching toggles (and vigilance) on or off
pub fn produce_toggle_actions(battle: &Battle, ship: &Ship) -> Vec<Maneuver> {
    playable_actions(battle, ship)
        .filter(|action| matches!(action.kind, ActionKind::Toggle(_) | ActionKind::Vigilance(_)))
        .filter(|action| {
            matches!(
                action.targetting_mode(battle, ship),
                ActionTargettingMode::SelfOnly | ActionTargettingMode::SelfConfirm | ActionTargettingMode::Surroundings
            )
        })
        .map(|toggle| Maneuver::new(battle, ship, toggle, ship.target()))
        .collect()
}

/// Drones deployed on alive allies (the ship included)
pub fn produce_drone_deployments(battle: &Battle, ship: &Ship) -> Vec<Maneuver> {
    let deployers: Vec<&Action> = playable_actions(battle, ship)
        .filter(|action| matches!(action.kind, ActionKind::DeployDrone(_)))
        .filter(|action| action.targetting_mode(battle, ship) == ActionTargettingMode::Space)
        .collect();
    battle
        .allies(ship.fleet_id, true)
        .flat_map(|ally| {
            deployers.iter().map(move |deployer| {
                Maneuver::new(battle, ship, deployer, Target::from_location(ally.arena_x, ally.arena_y))
            })
        })
        .collect()
}

/// Moves to random locations of the arena grid
pub fn produce_random_moves(
    battle: &Battle,
    ship: &Ship,
    cells: usize,
    iterations: usize,
    rng: &mut dyn RandomGenerator,
) -> Vec<Maneuver> {
    let engines: Vec<&Action> = playable_actions(battle, ship)
        .filter(|action| action.as_move().is_some())
        .collect();
    if engines.is_empty() {
        return Vec::new();
    }
    let mut result = Vec::new();
    for _ in 0..iterations {
        let grid = scan_arena(battle, cells, rng);
        for engine in &engines {
            result.extend(grid.iter().map(|target| Maneuver::new(battle, ship, engine, *target)));
        }
    }
    result
}

// === EVALUATORS ===

fn power_capacity(ship: &Ship) -> i32 {
    ship.get_attribute(ShipAttributeName::PowerCapacity)
}

/// Power left at the end of the maneuver
pub fn evaluate_turn_cost(_battle: &Battle, ship: &Ship, maneuver: &Maneuver) -> f64 {
    let usage = maneuver.power_usage();
    let power = ship.get_value(ShipValueName::Power);
    let capacity = power_capacity(ship);
    if usage == 0 || capacity <= 0 {
        -1.0
    } else if maneuver.simulation.total_fire_ap > capacity || usage > power {
        // Not doable in one turn
        -1.0
    } else {
        ((power - usage) as f64 / capacity as f64).clamp(-1.0, 1.0)
    }
}

/// Penalty for doing nothing useful with the power left
pub fn evaluate_idling(_battle: &Battle, ship: &Ship, maneuver: &Maneuver) -> f64 {
    let capacity = power_capacity(ship).max(1) as f64;
    let power = ship.get_value(ShipValueName::Power) as f64;
    let result = match &maneuver.action.kind {
        ActionKind::EndTurn => -power / capacity,
        ActionKind::Trigger(_) => 0.5,
        ActionKind::Toggle(_) | ActionKind::Vigilance(_) => {
            if ship.actions.is_toggled(maneuver.action.id) {
                -0.2
            } else {
                0.5
            }
        }
        ActionKind::Move(_) => -(power - maneuver.power_usage() as f64) / capacity,
        ActionKind::DeployDrone(_) => 0.0,
    };
    result.clamp(-1.0, 1.0)
}

/// Health change of a ship caused by the maneuver, relative to its health
///
/// -1 when the ship dies.
fn proportional_health(maneuver: &Maneuver, ship: &Ship) -> f64 {
    let hull_capacity = ship.get_attribute(ShipAttributeName::HullCapacity);
    let shield_capacity = ship.get_attribute(ShipAttributeName::ShieldCapacity);
    let hull = ship.get_value(ShipValueName::Hull);
    let shield = ship.get_value(ShipValueName::Shield);
    let (mut dhull, mut dshield) = (0, 0);

    for diff in &maneuver.effects {
        if let BattleDiff::ShipValue { ship_id, value, diff } = diff {
            if *ship_id != ship.id {
                continue;
            }
            match value {
                ShipValueName::Hull => dhull += (hull + diff).clamp(0, hull_capacity.max(0)) - hull,
                ShipValueName::Shield => dshield += (shield + diff).clamp(0, shield_capacity.max(0)) - shield,
                ShipValueName::Power => {}
            }
        }
    }

    if hull + dhull <= 0 {
        -1.0
    } else if hull + shield <= 0 {
        0.0
    } else {
        ((dhull + dshield) as f64 / (hull + shield) as f64).clamp(-1.0, 1.0)
    }
}

/// Health effect on a group of ships, deaths weighing extra
pub fn evaluate_health_effect(maneuver: &Maneuver, ships: &[&Ship]) -> f64 {
    if ships.is_empty() {
        return 0.0;
    }
    let diffs: Vec<f64> = ships.iter().map(|ship| proportional_health(maneuver, ship)).collect();
    let deaths = diffs.iter().filter(|diff| **diff == -1.0).count() as f64;
    let total: f64 = diffs.iter().sum();
    (total * 0.5 - deaths * 0.5) / ships.len() as f64
}

pub fn evaluate_enemy_health(battle: &Battle, ship: &Ship, maneuver: &Maneuver) -> f64 {
    let enemies: Vec<&Ship> = battle.enemies(ship.fleet_id, true).collect();
    -evaluate_health_effect(maneuver, &enemies)
}

pub fn evaluate_ally_health(battle: &Battle, ship: &Ship, maneuver: &Maneuver) -> f64 {
    let allies: Vec<&Ship> = battle.allies(ship.fleet_id, true).collect();
    evaluate_health_effect(maneuver, &allies)
}

/// Penalty for ending close to other ships
pub fn evaluate_clustering(battle: &Battle, ship: &Ship, maneuver: &Maneuver) -> f64 {
    let location = maneuver.final_location();
    let distances: Vec<f64> = battle
        .alive_ships()
        .filter(|other| other.id != ship.id)
        .map(|other| arena_distance(other.position(), location))
        .collect();
    if distances.is_empty() {
        return 0.0;
    }
    let factor = battle.config.arena_width.max(battle.config.arena_height) * 0.01;
    let crowding: f64 = distances.iter().map(|distance| factor / distance).sum();
    -crowding.clamp(0.0, 1.0)
}

/// Penalty for ending close to the arena border
pub fn evaluate_position(battle: &Battle, _ship: &Ship, maneuver: &Maneuver) -> f64 {
    let width = battle.config.arena_width;
    let height = battle.config.arena_height;
    let ArenaLocation { x, y } = maneuver.final_location();
    let distance = x.min(y).min(width - x).min(height - y);
    let factor = (width / 2.0).min(height / 2.0);
    if factor <= 0.0 {
        return 0.0;
    }
    (-1.0 + 2.0 * distance / factor).clamp(-1.0, 1.0)
}

/// Penalty for overheating an equipment, by its cooling time
pub fn evaluate_overheat(_battle: &Battle, ship: &Ship, maneuver: &Maneuver) -> f64 {
    let cooldown = ship.actions.cooldown(maneuver.action.id);
    if cooldown.will_overheat() {
        -(0.4 * cooldown.cooling as f64).min(1.0)
    } else {
        0.0
    }
}

/// Beneficial effects gained by allies or lost by enemies, and conversely
pub fn evaluate_active_effects(battle: &Battle, ship: &Ship, maneuver: &Maneuver) -> f64 {
    let mut result = 0.0;
    for diff in &maneuver.effects {
        let (target, effect, removed) = match diff {
            BattleDiff::ShipEffectAdded { ship_id, effect } => (*ship_id, effect, false),
            BattleDiff::ShipEffectRemoved { ship_id, effect } => (*ship_id, effect, true),
            _ => continue,
        };
        let enemy = battle
            .ship(target)
            .is_some_and(|target| target.fleet_id != ship.fleet_id);
        let beneficial = effect.is_beneficial() != removed;
        result += if beneficial != enemy { 1.0 } else { -1.0 };
    }
    let count = battle.ships().count().max(1) as f64;
    (result / count).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::effects::{Effect, EffectKind};
    use crate::battle::fleet::Fleet;
    use crate::battle::loadout::{damping_field, engine, laser, missile, ShipBuilder};
    use crate::core::config::BattleConfig;
    use crate::core::random::SkewedRandom;
    use crate::core::types::{IdAllocator, ShipId};

    /// Two ships per side; the first one plays
    fn battle_with(first: ShipBuilder, ids: IdAllocator, config: BattleConfig) -> (Battle, Vec<ShipId>) {
        let mut fleet1 = Fleet::new(&ids, "Attacker");
        let mut fleet2 = Fleet::new(&ids, "Defender");
        let ships = vec![
            fleet1.add_ship(first.maneuvrability(5).build(&ids)),
            fleet1.add_ship(ShipBuilder::new("ally").hull(20).build(&ids)),
            fleet2.add_ship(ShipBuilder::new("enemy1").hull(20).build(&ids)),
            fleet2.add_ship(ShipBuilder::new("enemy2").hull(20).build(&ids)),
        ];
        let mut battle = Battle::new(fleet1, fleet2, ids).with_config(config);
        battle.start(&mut SkewedRandom::new(vec![0.9, 0.1, 0.1, 0.1]));
        (battle, ships)
    }

    fn place(battle: &mut Battle, positions: &[(ShipId, f64, f64)]) {
        for (id, x, y) in positions {
            if let Some(ship) = battle.ship_mut(*id) {
                ship.set_arena_position(*x, *y);
            }
        }
    }

    #[test]
    fn test_scan_arena() {
        let ids = IdAllocator::new();
        let config = BattleConfig {
            arena_width: 100.0,
            arena_height: 100.0,
            border: 10.0,
            ..BattleConfig::default()
        };
        let (battle, _) = battle_with(ShipBuilder::new("ship"), ids, config);
        let mut rng = SkewedRandom::looping(vec![0.5]);
        let grid: Vec<(f64, f64)> = scan_arena(&battle, 2, &mut rng)
            .iter()
            .map(|target| (target.x, target.y))
            .collect();
        assert_eq!(grid, vec![(25.0, 25.0), (75.0, 25.0), (25.0, 75.0), (75.0, 75.0)]);
    }

    #[test]
    fn test_produce_direct_shots() {
        let ids = IdAllocator::new();
        let (battle, ships) = battle_with(ShipBuilder::new("ship"), ids, BattleConfig::default());
        let ship = battle.ship(ships[0]).unwrap();
        assert!(produce_direct_shots(&battle, ship).is_empty());

        let ids = IdAllocator::new();
        let builder = ShipBuilder::new("ship")
            .equip(laser(&ids, 1, 100.0, 2))
            .equip(laser(&ids, 2, 300.0, 3));
        let (battle, ships) = battle_with(builder, ids, BattleConfig::default());
        let ship = battle.ship(ships[0]).unwrap();
        let shots = produce_direct_shots(&battle, ship);
        assert_eq!(shots.len(), 4);
        let targets: Vec<Option<ShipId>> = shots.iter().map(|shot| shot.target.ship_id).collect();
        assert_eq!(
            targets,
            vec![Some(ships[2]), Some(ships[2]), Some(ships[3]), Some(ships[3])]
        );
    }

    #[test]
    fn test_produce_random_moves() {
        let ids = IdAllocator::new();
        let config = BattleConfig {
            arena_width: 100.0,
            arena_height: 100.0,
            border: 10.0,
            ..BattleConfig::default()
        };
        let (battle, ships) = battle_with(ShipBuilder::new("ship").power(10), ids, config.clone());
        let ship = battle.ship(ships[0]).unwrap();
        let mut rng = SkewedRandom::looping(vec![0.5]);
        assert!(produce_random_moves(&battle, ship, 2, 1, &mut rng).is_empty());

        let ids = IdAllocator::new();
        let builder = ShipBuilder::new("ship").power(10).equip(engine(&ids, 1000.0));
        let (battle, ships) = battle_with(builder, ids, config);
        let ship = battle.ship(ships[0]).unwrap();
        let moves = produce_random_moves(&battle, ship, 2, 1, &mut rng);
        let targets: Vec<(f64, f64)> = moves.iter().map(|m| (m.target.x, m.target.y)).collect();
        assert_eq!(targets, vec![(25.0, 25.0), (75.0, 25.0), (25.0, 75.0), (75.0, 75.0)]);
    }

    #[test]
    fn test_produce_interesting_blast_shots() {
        let ids = IdAllocator::new();
        let builder = ShipBuilder::new("ship").power(10).equip(missile(&ids, 1, 1000.0, 105.0, 5));
        let (mut battle, ships) = battle_with(builder, ids, BattleConfig::default());
        place(
            &mut battle,
            &[(ships[0], 100.0, 100.0), (ships[1], 100.0, 800.0), (ships[2], 500.0, 100.0), (ships[3], 900.0, 100.0)],
        );
        let ship = battle.ship(ships[0]).unwrap();
        assert!(produce_interesting_blast_shots(&battle, ship).is_empty());

        place(&mut battle, &[(ships[3], 700.0, 100.0)]);
        let ship = battle.ship(ships[0]).unwrap();
        let shots = produce_interesting_blast_shots(&battle, ship);
        assert_eq!(shots.len(), 1);
        assert_eq!((shots[0].target.x, shots[0].target.y), (600.0, 100.0));
    }

    #[test]
    fn test_produce_toggles_and_end_turn() {
        let ids = IdAllocator::new();
        let builder = ShipBuilder::new("ship").power(10).equip(damping_field(&ids, 2, 200.0, 20));
        let (battle, ships) = battle_with(builder, ids, BattleConfig::default());
        let ship = battle.ship(ships[0]).unwrap();
        let toggles = produce_toggle_actions(&battle, ship);
        assert_eq!(toggles.len(), 1);
        assert_eq!(toggles[0].target.ship_id, Some(ship.id));

        let end = produce_end_turn(&battle, ship);
        assert_eq!(end.len(), 1);
        assert!(end[0].action.is_end_turn());
    }

    #[test]
    fn test_evaluate_turn_cost() {
        let ids = IdAllocator::new();
        let builder = ShipBuilder::new("ship")
            .power(10)
            .equip(engine(&ids, 25.0))
            .equip(missile(&ids, 5, 100.0, 10.0, 50));
        let (mut battle, ships) = battle_with(builder, ids, BattleConfig::default());
        place(
            &mut battle,
            &[(ships[0], 300.0, 300.0), (ships[1], 300.0, 800.0), (ships[2], 1500.0, 300.0), (ships[3], 1500.0, 800.0)],
        );
        let ship = battle.ship(ships[0]).unwrap();
        let weapon = ship.actions.get_by_code("fire-missile").unwrap();

        let cost_at = |x: f64| {
            let maneuver = Maneuver::with_margin(&battle, ship, weapon, Target::from_location(x, 300.0), 0.0);
            evaluate_turn_cost(&battle, ship, &maneuver)
        };
        assert_eq!(cost_at(400.0), 0.5); // 5 power remaining on 10
        assert!((cost_at(410.0) - 0.4).abs() < 1e-9);
        assert!((cost_at(440.0) - 0.3).abs() < 1e-9);
        assert_eq!(cost_at(700.0), -1.0); // can't do in one turn

        let end = Maneuver::new(&battle, ship, &Action::end_turn(), ship.target());
        assert_eq!(evaluate_turn_cost(&battle, ship, &end), -1.0);
    }

    #[test]
    fn test_evaluate_idling() {
        let ids = IdAllocator::new();
        let builder = ShipBuilder::new("ship")
            .power(10)
            .equip(engine(&ids, 50.0))
            .equip(laser(&ids, 2, 100.0, 10));
        let (mut battle, ships) = battle_with(builder, ids, BattleConfig::default());
        place(&mut battle, &[(ships[0], 300.0, 300.0)]);
        let ship = battle.ship(ships[0]).unwrap();
        let engine = ship.actions.get_by_code("move").unwrap();
        let weapon = ship.actions.get_by_code("fire-laser").unwrap();

        let end = Maneuver::new(&battle, ship, &Action::end_turn(), ship.target());
        assert_eq!(evaluate_idling(&battle, ship, &end), -1.0);
        let shot = Maneuver::new(&battle, ship, weapon, Target::from_location(350.0, 300.0));
        assert_eq!(evaluate_idling(&battle, ship, &shot), 0.5);
        let small_move = Maneuver::new(&battle, ship, engine, Target::from_location(300.0, 400.0));
        assert_eq!(small_move.power_usage(), 2);
        assert!((evaluate_idling(&battle, ship, &small_move) + 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_evaluate_enemy_health() {
        let ids = IdAllocator::new();
        let builder = ShipBuilder::new("ship").power(10).equip(missile(&ids, 5, 500.0, 100.0, 10));
        let (mut battle, ships) = battle_with(builder, ids, BattleConfig::default());
        place(
            &mut battle,
            &[(ships[0], 100.0, 300.0), (ships[1], 100.0, 800.0), (ships[2], 350.0, 300.0), (ships[3], 400.0, 300.0)],
        );
        // enemy1: 20 hull, enemy2: 10 hull left
        battle.apply_diffs(vec![BattleDiff::ShipValue {
            ship_id: ships[3],
            value: ShipValueName::Hull,
            diff: -10,
        }]);
        let ship = battle.ship(ships[0]).unwrap();
        let weapon = ship.actions.get_by_code("fire-missile").unwrap();

        let miss = Maneuver::new(&battle, ship, weapon, Target::from_location(200.0, 300.0));
        assert_eq!(evaluate_enemy_health(&battle, ship, &miss), 0.0);

        // enemy1 loses half its hull
        let one = Maneuver::new(&battle, ship, weapon, Target::from_location(280.0, 300.0));
        assert!((evaluate_enemy_health(&battle, ship, &one) - 0.125).abs() < 1e-9);

        // enemy1 loses half its hull, enemy2 dies
        let both = Maneuver::new(&battle, ship, weapon, Target::from_location(380.0, 300.0));
        assert!((evaluate_enemy_health(&battle, ship, &both) - 0.625).abs() < 1e-9);
        assert!(evaluate_ally_health(&battle, ship, &both).abs() < 1e-9);
    }

    #[test]
    fn test_evaluate_clustering_and_position() {
        let ids = IdAllocator::new();
        let config = BattleConfig {
            arena_width: 1000.0,
            arena_height: 500.0,
            ..BattleConfig::default()
        };
        let (mut battle, ships) = battle_with(ShipBuilder::new("ship").power(10), ids, config);
        place(
            &mut battle,
            &[(ships[0], 250.0, 250.0), (ships[1], 250.0, 150.0), (ships[2], 1000.0, 500.0), (ships[3], 0.0, 0.0)],
        );
        let ship = battle.ship(ships[0]).unwrap();
        let end = Maneuver::new(&battle, ship, &Action::end_turn(), ship.target());
        // 10 / 100 from the ally, then both corners
        let expected = -(0.1 + 10.0 / 790.5694150420949 + 10.0 / 353.5533905932738);
        assert!((evaluate_clustering(&battle, ship, &end) - expected).abs() < 1e-9);
        assert_eq!(evaluate_position(&battle, ship, &end), 1.0);

        place(&mut battle, &[(ships[0], 0.0, 250.0), (ships[1], 5.0, 250.0)]);
        let ship = battle.ship(ships[0]).unwrap();
        let end = Maneuver::new(&battle, ship, &Action::end_turn(), ship.target());
        assert_eq!(evaluate_clustering(&battle, ship, &end), -1.0);
        assert_eq!(evaluate_position(&battle, ship, &end), -1.0);
    }

    #[test]
    fn test_evaluate_overheat() {
        let ids = IdAllocator::new();
        let builder = ShipBuilder::new("ship")
            .power(10)
            .equip(missile(&ids, 1, 500.0, 50.0, 1))
            .equip(laser(&ids, 1, 500.0, 1));
        let (battle, ships) = battle_with(builder, ids, BattleConfig::default());
        let ship = battle.ship(ships[0]).unwrap();
        let target = battle.ship(ships[2]).unwrap().target();
        let hot = Maneuver::new(&battle, ship, ship.actions.get_by_code("fire-missile").unwrap(), target);
        assert!((evaluate_overheat(&battle, ship, &hot) + 0.4).abs() < 1e-9);
        let cool = Maneuver::new(&battle, ship, ship.actions.get_by_code("fire-laser").unwrap(), target);
        assert_eq!(evaluate_overheat(&battle, ship, &cool), 0.0);
    }

    #[test]
    fn test_evaluate_active_effects() {
        let ids = IdAllocator::new();
        let builder = ShipBuilder::new("ship").power(10).equip(damping_field(&ids, 2, 500.0, 20));
        let (mut battle, ships) = battle_with(builder, ids, BattleConfig::default());
        place(
            &mut battle,
            &[(ships[0], 300.0, 300.0), (ships[1], 300.0, 500.0), (ships[2], 1500.0, 300.0), (ships[3], 1500.0, 600.0)],
        );
        let ship = battle.ship(ships[0]).unwrap();
        let toggle = ship.actions.get_by_code("toggle-dampingfield").unwrap();
        let maneuver = Maneuver::new(&battle, ship, toggle, ship.target());
        // Protection added on both allies, out of 4 ships
        assert_eq!(evaluate_active_effects(&battle, ship, &maneuver), 0.5);

        let harmful = Effect::new(&battle.ids, EffectKind::DamageModifier { factor: 50 });
        let mut cursed = maneuver.clone();
        cursed.effects = vec![BattleDiff::ShipEffectAdded {
            ship_id: ships[2],
            effect: harmful,
        }];
        assert_eq!(evaluate_active_effects(&battle, ship, &cursed), 0.25);
    }
}
