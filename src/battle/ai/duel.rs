//! Duels between two AIs over quick battles

use serde::{Deserialize, Serialize};

use crate::battle::ai::{AiKind, BattleAi};
use crate::battle::loadout::quick_battle_with_config;
use crate::battle::state::Battle;
use crate::core::config::BattleConfig;
use crate::core::error::Result;

/// Result of one duel battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuelResult {
    /// Index of the winning side (0 for the first AI), none on a draw
    pub winner: Option<usize>,
    pub cycles: u32,
    pub seed: u64,
}

/// Cumulated results of a duel over several battles
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DuelRecord {
    pub wins: [u32; 2],
    pub draws: u32,
}

impl DuelRecord {
    pub fn record(&mut self, result: &DuelResult) {
        match result.winner {
            Some(side) if side < 2 => self.wins[side] += 1,
            _ => self.draws += 1,
        }
    }

    pub fn played(&self) -> u32 {
        self.wins[0] + self.wins[1] + self.draws
    }
}

/// Two AIs fighting each other, the first one playing the attacker fleet
#[derive(Debug, Clone)]
pub struct AiDuel {
    pub first: AiKind,
    pub second: AiKind,
    /// Ships per fleet
    pub ships: usize,
    pub config: BattleConfig,
}

impl AiDuel {
    pub fn new(first: AiKind, second: AiKind) -> Self {
        Self {
            first,
            second,
            ships: 3,
            config: BattleConfig::default(),
        }
    }

    pub fn with_ships(mut self, ships: usize) -> Self {
        self.ships = ships;
        self
    }

    pub fn with_config(mut self, config: BattleConfig) -> Self {
        self.config = config;
        self
    }

    /// Play a started battle to its end (or to the cycle cap)
    pub fn play(&self, battle: &mut Battle, seed: u64) -> Result<DuelResult> {
        let mut ais: [Box<dyn BattleAi + Send>; 2] = [
            self.first.build(seed),
            self.second.build(seed.wrapping_add(1)),
        ];
        let first_fleet = battle.fleets.first().map(|fleet| fleet.id);

        while !battle.ended() && battle.cycle <= battle.config.max_cycles {
            let Some(playing) = battle.playing_ship() else {
                break;
            };
            let (ship_id, side) = (playing.id, usize::from(Some(playing.fleet_id) != first_fleet));

            let ai = &mut ais[side];
            ai.play_turn(battle)?;

            if !battle.ended() && battle.playing_ship_id() == Some(ship_id) {
                tracing::error!(ai = ai.name(), ship = %ship_id, "AI did not end its turn");
                if !battle.advance_to_next_ship() {
                    break;
                }
            }
        }

        let winner = battle
            .outcome
            .as_ref()
            .filter(|outcome| !outcome.draw)
            .and_then(|outcome| outcome.winner)
            .and_then(|winner| battle.fleets.iter().position(|fleet| fleet.id == winner));
        let result = DuelResult {
            winner,
            cycles: battle.cycle,
            seed,
        };
        tracing::info!(
            first = %self.first.name(),
            second = %self.second.name(),
            winner = ?result.winner,
            cycles = result.cycles,
            "Duel battle over"
        );
        Ok(result)
    }

    /// Play a fresh quick battle
    pub fn fight(&self, seed: u64) -> Result<DuelResult> {
        let mut battle = quick_battle_with_config(self.ships, self.ships, seed, self.config.clone());
        self.play(&mut battle, seed)
    }

    /// Play `rounds` battles, with consecutive seeds
    pub fn run(&self, rounds: u32, seed: u64) -> Result<DuelRecord> {
        let mut record = DuelRecord::default();
        for round in 0..rounds {
            let result = self.fight(seed.wrapping_add(round as u64))?;
            record.record(&result);
        }
        Ok(record)
    }
}
