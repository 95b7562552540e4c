//! Battle system integration tests

use fleet_tactics::battle::loadout::{damping_field, engine, laser, repair_drone, vigilance_system};
use fleet_tactics::battle::*;
use fleet_tactics::core::{ActionId, FleetError, IdAllocator, SeededRandom, ShipId, SkewedRandom};

/// One gunship (10 power, 1-power laser doing 10 damage at 100km) against a
/// 40 hull target, 80km apart; the gunship plays first
fn gunship_duel() -> (Battle, ShipId, ShipId) {
    let ids = IdAllocator::new();
    let mut attackers = Fleet::new(&ids, "Attacker");
    let mut defenders = Fleet::new(&ids, "Defender");
    let gunship = attackers.add_ship(
        ShipBuilder::new("gunship")
            .power(10)
            .equip(engine(&ids, 100.0))
            .equip(laser(&ids, 1, 100.0, 10))
            .build(&ids),
    );
    let target = defenders.add_ship(ShipBuilder::new("target").hull(40).build(&ids));
    let mut battle = Battle::new(attackers, defenders, ids);
    battle.start(&mut SkewedRandom::new(vec![0.9, 0.1]));
    for (id, x) in [(gunship, 400.0), (target, 480.0)] {
        if let Some(ship) = battle.ship_mut(id) {
            ship.set_arena_position(x, 400.0);
        }
    }
    assert_eq!(battle.playing_ship_id(), Some(gunship));
    (battle, gunship, target)
}

fn action_of(battle: &Battle, ship: ShipId, code: &str) -> ActionId {
    battle
        .ship(ship)
        .and_then(|ship| ship.actions.get_by_code(code))
        .map(|action| action.id)
        .unwrap()
}

fn laser_of(battle: &Battle, ship: ShipId) -> ActionId {
    action_of(battle, ship, "fire-laser")
}

/// Use an action that targets its own ship (toggles, recalls)
fn use_on_self(battle: &mut Battle, ship: ShipId, action: ActionId) -> bool {
    let target = battle.ship(ship).unwrap().target();
    battle.apply_one_action(action, Some(target))
}

fn place(battle: &mut Battle, ship: ShipId, x: f64, y: f64) {
    if let Some(ship) = battle.ship_mut(ship) {
        ship.set_arena_position(x, y);
    }
}

fn value(battle: &Battle, ship: ShipId, name: ShipValueName) -> i32 {
    battle.ship(ship).unwrap().get_value(name)
}

fn fire(battle: &mut Battle, from: ShipId, to: ShipId) -> bool {
    let laser = laser_of(battle, from);
    let target = battle.ship(to).unwrap().target();
    battle.apply_one_action(laser, Some(target))
}

#[test]
fn test_shoot_to_victory() {
    let (mut battle, gunship, target) = gunship_duel();

    for shot in 1..=3 {
        assert!(fire(&mut battle, gunship, target));
        let ship = battle.ship(target).unwrap();
        assert_eq!(ship.get_value(ShipValueName::Hull), 40 - 10 * shot);
        assert_eq!(ship.get_value(ShipValueName::Shield), 0);
        assert!(!battle.ended());
    }
    assert!(fire(&mut battle, gunship, target));

    // Four hits of 0 shield / 10 hull
    let hits: Vec<(i32, i32)> = battle
        .log
        .iter()
        .filter_map(|diff| match diff {
            BattleDiff::ShipDamage { ship_id, shield, hull, .. } if *ship_id == target => Some((*shield, *hull)),
            _ => None,
        })
        .collect();
    assert_eq!(hits, vec![(0, 10); 4]);

    // Death, then victory, in the same checks pass
    let death = battle
        .log
        .iter()
        .position(|diff| matches!(diff, BattleDiff::ShipDeath { ship_id, .. } if *ship_id == target));
    let end = battle
        .log
        .iter()
        .position(|diff| matches!(diff, BattleDiff::EndBattle { .. }));
    assert!(matches!((death, end), (Some(death), Some(end)) if death < end));

    assert!(battle.ended());
    let winner = battle.fleets[0].id;
    assert_eq!(battle.outcome.as_ref().and_then(|outcome| outcome.winner), Some(winner));
    assert!(!battle.ship(target).unwrap().alive);
    assert_eq!(battle.ship(gunship).unwrap().get_value(ShipValueName::Power), 6);

    // Nothing more can happen
    assert!(!fire(&mut battle, gunship, target));
    assert!(battle.perform_checks().is_empty());
}

#[test]
fn test_undo_whole_fight() {
    let (mut battle, gunship, target) = gunship_duel();
    for _ in 0..4 {
        fire(&mut battle, gunship, target);
    }
    assert!(battle.ended());

    for _ in 0..4 {
        assert!(battle.revert_one_action());
    }
    assert!(!battle.revert_one_action());
    assert!(!battle.ended());
    assert!(battle.outcome.is_none());
    let ship = battle.ship(target).unwrap();
    assert!(ship.alive);
    assert_eq!(ship.get_value(ShipValueName::Hull), 40);
    assert_eq!(battle.ship(gunship).unwrap().get_value(ShipValueName::Power), 10);
    assert_eq!(battle.play_order.len(), 2);
    assert_eq!(battle.log.count(), 0);

    assert_eq!(battle.playing_ship_id(), Some(gunship));
    assert_eq!(battle.ship(gunship).unwrap().position(), ArenaLocation::new(400.0, 400.0));
}

#[test]
fn test_saved_battle_goes_on() {
    let (mut battle, gunship, target) = gunship_duel();
    fire(&mut battle, gunship, target);

    let mut restored = Battle::from_json(&battle.to_json().unwrap()).unwrap();
    assert_eq!(restored.log.count(), battle.log.count());
    assert_eq!(restored.playing_ship_id(), Some(gunship));
    for _ in 0..3 {
        assert!(fire(&mut restored, gunship, target));
    }
    assert!(restored.ended());
    assert!(!battle.ended());
}

#[test]
fn test_turn_end_restores_power() {
    let (mut battle, gunship, target) = gunship_duel();
    fire(&mut battle, gunship, target);
    fire(&mut battle, gunship, target);
    assert_eq!(battle.ship(gunship).unwrap().get_value(ShipValueName::Power), 8);

    assert!(battle.advance_to_next_ship());
    assert_eq!(battle.playing_ship_id(), Some(target));
    assert!(battle.advance_to_next_ship());
    assert_eq!(battle.playing_ship_id(), Some(gunship));
    assert_eq!(battle.cycle, 2);
    assert_eq!(battle.ship(gunship).unwrap().get_value(ShipValueName::Power), 10);
}

#[test]
fn test_only_playing_ship_acts() {
    let (mut battle, gunship, target) = gunship_duel();
    // The target has no laser at all, and does not play
    let laser = laser_of(&battle, gunship);
    assert!(battle.advance_to_next_ship());
    let aim = battle.ship(gunship).unwrap().target();
    assert!(!battle.apply_one_action(laser, Some(aim)));
    assert_eq!(battle.ship(target).unwrap().get_value(ShipValueName::Hull), 40);
}

#[test]
fn test_sticky_template_is_not_consumed() {
    let (mut battle, gunship, _) = gunship_duel();
    let base = Effect::new(
        &battle.ids,
        EffectKind::Attribute {
            attribute: ShipAttributeName::Precision,
            value: 2,
        },
    );
    let template = Effect::sticky(&battle.ids, base, 2);
    assert!(battle.apply_effect(&template, gunship, EffectSource::Ship(gunship)));
    assert_eq!(battle.ship(gunship).unwrap().get_attribute(ShipAttributeName::Precision), 2);

    // One turn end consumes one turn of the active copy only
    battle.advance_to_next_ship();
    let active = battle
        .ship(gunship)
        .unwrap()
        .effects()
        .find(|effect| effect.is_sticky())
        .map(|effect| effect.duration());
    assert_eq!(active, Some(Some(1)));
    assert_eq!(template.duration(), Some(2));

    // Second turn end removes it
    battle.advance_to_next_ship();
    battle.advance_to_next_ship();
    let ship = battle.ship(gunship).unwrap();
    assert!(!ship.effects().any(|effect| effect.is_sticky()));
    assert_eq!(ship.get_attribute(ShipAttributeName::Precision), 0);
    assert_eq!(template.duration(), Some(2));
}

#[test]
fn test_stats_follow_the_fight() {
    let (mut battle, gunship, target) = gunship_duel();
    let stats = BattleStats::watch(&mut battle);
    fire(&mut battle, gunship, target);
    fire(&mut battle, gunship, target);
    battle.revert_one_action();

    let stats = stats.lock().unwrap();
    assert_eq!(stats.attacker.hull_damage_dealt, 10);
    assert_eq!(stats.defender.hull_damage_taken, 10);
    assert_eq!(stats.attacker.actions_used, 1);
    assert_eq!(stats.defender.damage_dealt(), 0);
}

#[test]
fn test_loot_needs_an_ended_battle() {
    let (mut battle, gunship, target) = gunship_duel();
    let mut rng = SeededRandom::new(1);
    assert!(matches!(battle.collect_loot(&mut rng), Err(FleetError::BattleNotEnded)));

    for _ in 0..4 {
        fire(&mut battle, gunship, target);
    }
    // The bare target carries no equipment to salvage
    assert!(battle.collect_loot(&mut rng).unwrap().is_empty());
}

#[test]
fn test_repair_drone_heals_allies_in_range() {
    let ids = IdAllocator::new();
    let mut attackers = Fleet::new(&ids, "Attacker");
    let mut defenders = Fleet::new(&ids, "Defender");
    let medic = attackers.add_ship(
        ShipBuilder::new("medic")
            .power(6)
            .equip(repair_drone(&ids, 2, 3, 150.0, 4))
            .build(&ids),
    );
    let wounded = attackers.add_ship(ShipBuilder::new("wounded").hull(20).build(&ids));
    defenders.add_ship(ShipBuilder::new("enemy").build(&ids));
    let mut battle = Battle::new(attackers, defenders, ids);
    battle.start(&mut SkewedRandom::new(vec![0.9, 0.1, 0.1]));
    assert_eq!(battle.playing_ship_id(), Some(medic));
    for (id, x) in [(medic, 300.0), (wounded, 400.0)] {
        if let Some(ship) = battle.ship_mut(id) {
            ship.set_arena_position(x, 400.0);
        }
    }
    if let Some(ship) = battle.ship_mut(wounded) {
        ship.set_value(ShipValueName::Hull, 10);
    }

    let deploy = battle
        .ship(medic)
        .unwrap()
        .actions
        .list_all()
        .find(|action| matches!(action.kind, ActionKind::DeployDrone(_)))
        .map(|action| action.id)
        .unwrap();
    assert!(battle.apply_one_action(deploy, Some(Target::from_location(400.0, 400.0))));
    assert_eq!(battle.drones().count(), 1);
    assert_eq!(battle.ship(wounded).unwrap().get_value(ShipValueName::Hull), 14);

    // Undeploy through undo
    assert!(battle.revert_one_action());
    assert_eq!(battle.drones().count(), 0);
    assert_eq!(battle.ship(wounded).unwrap().get_value(ShipValueName::Hull), 10);
}

#[test]
fn test_quick_battle_is_reproducible() {
    let first = quick_battle(3, 3, 42);
    let second = quick_battle(3, 3, 42);
    let order = |battle: &Battle| -> Vec<String> {
        battle
            .play_order
            .iter()
            .filter_map(|id| battle.ship(*id))
            .map(|ship| ship.name.clone())
            .collect()
    };
    assert_eq!(order(&first), order(&second));
    assert_eq!(first.play_order.len(), 6);
    assert!(first.alive_ships().all(|ship| ship.get_value(ShipValueName::Power) > 0));
}

#[test]
fn test_vigilance_hits_incoming_enemy() {
    let ids = IdAllocator::new();
    let mut attackers = Fleet::new(&ids, "Attacker");
    let mut defenders = Fleet::new(&ids, "Defender");
    let watcher = attackers.add_ship(
        ShipBuilder::new("watcher")
            .power(10)
            .equip(vigilance_system(&ids, 3, 300.0, 7))
            .build(&ids),
    );
    let intruder = defenders.add_ship(
        ShipBuilder::new("intruder")
            .hull(30)
            .power(5)
            .equip(engine(&ids, 100.0))
            .build(&ids),
    );
    let mut battle = Battle::new(attackers, defenders, ids);
    battle.start(&mut SkewedRandom::new(vec![0.9, 0.1]));
    assert_eq!(battle.playing_ship_id(), Some(watcher));
    place(&mut battle, watcher, 400.0, 400.0);
    place(&mut battle, intruder, 900.0, 400.0);

    let vigilance = action_of(&battle, watcher, "vigilance");
    assert!(use_on_self(&mut battle, watcher, vigilance));
    assert!(battle.ship(watcher).unwrap().actions.is_toggled(vigilance));
    assert_eq!(value(&battle, watcher, ShipValueName::Power), 7);
    // Nobody inside yet
    assert_eq!(value(&battle, intruder, ShipValueName::Hull), 30);

    assert!(battle.advance_to_next_ship());
    assert_eq!(battle.playing_ship_id(), Some(intruder));
    let engine = action_of(&battle, intruder, "move");
    assert!(battle.apply_one_action(engine, Some(Target::from_location(650.0, 400.0))));
    assert_eq!(value(&battle, intruder, ShipValueName::Hull), 23);
    assert_eq!(battle.ship(intruder).unwrap().effects().count(), 1);

    // Moving inside the area does not trigger it again
    assert!(battle.apply_one_action(engine, Some(Target::from_location(600.0, 400.0))));
    assert_eq!(value(&battle, intruder, ShipValueName::Hull), 23);

    assert!(battle.revert_one_action());
    assert_eq!(value(&battle, intruder, ShipValueName::Hull), 23);
    assert!(battle.revert_one_action());
    let ship = battle.ship(intruder).unwrap();
    assert_eq!(ship.get_value(ShipValueName::Hull), 30);
    assert_eq!(ship.get_value(ShipValueName::Power), 5);
    assert_eq!(ship.position(), ArenaLocation::new(900.0, 400.0));
    assert_eq!(ship.effects().count(), 0);
    assert!(battle.ship(watcher).unwrap().actions.is_toggled(vigilance));
}

#[test]
fn test_toggle_covers_allies_until_switched_off() {
    let ids = IdAllocator::new();
    let mut attackers = Fleet::new(&ids, "Attacker");
    let mut defenders = Fleet::new(&ids, "Defender");
    let guardian = attackers.add_ship(
        ShipBuilder::new("guardian")
            .power(10)
            .equip(damping_field(&ids, 3, 200.0, 50))
            .build(&ids),
    );
    let ally = attackers.add_ship(ShipBuilder::new("ally").hull(40).build(&ids));
    let enemy = defenders.add_ship(ShipBuilder::new("enemy").hull(40).build(&ids));
    let mut battle = Battle::new(attackers, defenders, ids);
    battle.start(&mut SkewedRandom::new(vec![0.9, 0.1, 0.1]));
    assert_eq!(battle.playing_ship_id(), Some(guardian));
    place(&mut battle, guardian, 400.0, 400.0);
    place(&mut battle, ally, 400.0, 550.0);
    place(&mut battle, enemy, 550.0, 400.0);

    let field = action_of(&battle, guardian, "toggle-dampingfield");
    let hit = Effect::new(&battle.ids, EffectKind::Damage { base: 10, span: 0 });
    let hull_loss = |battle: &Battle, ship: ShipId| hit.effective_damage(battle.ship(ship).unwrap(), 1.0).1;
    let covered = |battle: &Battle, ship: ShipId| battle.ship(ship).unwrap().effects().count() > 0;
    assert_eq!(hull_loss(&battle, ally), 10);

    // Activation locks power and covers allies in range only
    assert!(use_on_self(&mut battle, guardian, field));
    assert!(battle.ship(guardian).unwrap().actions.is_toggled(field));
    assert_eq!(value(&battle, guardian, ShipValueName::Power), 7);
    assert!(covered(&battle, guardian));
    assert!(covered(&battle, ally));
    assert!(!covered(&battle, enemy));
    assert_eq!(hull_loss(&battle, ally), 5);
    assert_eq!(hull_loss(&battle, enemy), 10);

    // Deactivation gives power back and uncovers
    assert!(use_on_self(&mut battle, guardian, field));
    assert!(!battle.ship(guardian).unwrap().actions.is_toggled(field));
    assert_eq!(value(&battle, guardian, ShipValueName::Power), 10);
    assert!(!covered(&battle, guardian));
    assert!(!covered(&battle, ally));
    assert_eq!(hull_loss(&battle, ally), 10);

    assert!(battle.revert_one_action());
    assert!(battle.ship(guardian).unwrap().actions.is_toggled(field));
    assert_eq!(value(&battle, guardian, ShipValueName::Power), 7);
    assert!(covered(&battle, ally));

    assert!(battle.revert_one_action());
    assert!(!battle.ship(guardian).unwrap().actions.is_toggled(field));
    assert_eq!(value(&battle, guardian, ShipValueName::Power), 10);
    assert!(!covered(&battle, guardian));
    assert!(!covered(&battle, ally));
    assert_eq!(battle.log.count(), 0);
}

#[test]
fn test_drone_recall_is_free_and_undoable() {
    let ids = IdAllocator::new();
    let mut attackers = Fleet::new(&ids, "Attacker");
    let mut defenders = Fleet::new(&ids, "Defender");
    let medic = attackers.add_ship(
        ShipBuilder::new("medic")
            .power(6)
            .equip(repair_drone(&ids, 2, 3, 150.0, 4))
            .build(&ids),
    );
    let wounded = attackers.add_ship(ShipBuilder::new("wounded").hull(20).build(&ids));
    defenders.add_ship(ShipBuilder::new("enemy").build(&ids));
    let mut battle = Battle::new(attackers, defenders, ids);
    battle.start(&mut SkewedRandom::new(vec![0.9, 0.1, 0.1]));
    assert_eq!(battle.playing_ship_id(), Some(medic));
    place(&mut battle, medic, 300.0, 400.0);
    place(&mut battle, wounded, 400.0, 400.0);
    if let Some(ship) = battle.ship_mut(wounded) {
        ship.set_value(ShipValueName::Hull, 10);
    }

    let deploy = action_of(&battle, medic, "deploy-repairdrone");
    assert!(battle.apply_one_action(deploy, Some(Target::from_location(400.0, 400.0))));
    assert_eq!(battle.drones().count(), 1);
    assert_eq!(value(&battle, medic, ShipValueName::Power), 4);
    assert_eq!(value(&battle, wounded, ShipValueName::Hull), 14);

    // A deployed drone only accepts its owner as target, for recall
    let elsewhere = Target::from_location(350.0, 400.0);
    assert!(!battle.apply_one_action(deploy, Some(elsewhere)));
    assert!(use_on_self(&mut battle, medic, deploy));
    assert_eq!(battle.drones().count(), 0);
    assert_eq!(value(&battle, medic, ShipValueName::Power), 4);
    assert_eq!(battle.ship(wounded).unwrap().effects().count(), 0);
    assert_eq!(value(&battle, wounded, ShipValueName::Hull), 14);

    // Undo the recall, then the deployment
    assert!(battle.revert_one_action());
    let drone = battle.drones().next().unwrap();
    assert_eq!((drone.x, drone.y), (400.0, 400.0));
    assert_eq!(drone.parent, Some(deploy));
    assert_eq!(battle.ship(wounded).unwrap().effects().count(), 1);

    assert!(battle.revert_one_action());
    assert_eq!(battle.drones().count(), 0);
    assert_eq!(value(&battle, medic, ShipValueName::Power), 6);
    assert_eq!(value(&battle, wounded, ShipValueName::Hull), 10);
}
