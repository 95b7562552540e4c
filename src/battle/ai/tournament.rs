//! Round robin tournament between AIs
//!
//! Every pair of contenders fights a number of duel battles, in both
//! seats alternately. Battles are independent and run in parallel.

use std::cmp::Reverse;

use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::battle::ai::duel::{AiDuel, DuelResult};
use crate::battle::ai::personality::AiPersonality;
use crate::battle::ai::AiKind;
use crate::core::config::BattleConfig;
use crate::core::error::{FleetError, Result};

/// One battle of the tournament
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuelSummary {
    /// Contender indices of the first and second seats
    pub seats: [usize; 2],
    pub first: String,
    pub second: String,
    pub result: DuelResult,
}

impl DuelSummary {
    pub fn winner_name(&self) -> Option<&str> {
        match self.result.winner {
            Some(0) => Some(&self.first),
            Some(1) => Some(&self.second),
            _ => None,
        }
    }
}

/// Ranking line of a contender
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub name: String,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    /// Wins plus half draws, per battle played
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentResult {
    pub duels: Vec<DuelSummary>,
    /// Best first
    pub ranking: Vec<Standing>,
}

#[derive(Debug, Clone)]
pub struct AiTournament {
    pub contenders: Vec<AiKind>,
    /// Ships per fleet
    pub ships: usize,
    pub config: BattleConfig,
}

impl AiTournament {
    pub fn new(contenders: Vec<AiKind>) -> Self {
        Self {
            contenders,
            ships: 3,
            config: BattleConfig::default(),
        }
    }

    /// Passive, bully and default tactical AIs
    pub fn standard() -> Self {
        Self::new(vec![
            AiKind::Passive,
            AiKind::Bully,
            AiKind::Tactical(AiPersonality::default()),
        ])
    }

    /// Play `rounds` battles for each pair of contenders
    pub fn run(&self, rounds: u32, seed: u64) -> Result<TournamentResult> {
        if self.contenders.len() < 2 {
            return Err(FleetError::InvalidConfig(
                "a tournament needs at least two contenders".to_string(),
            ));
        }

        // (first, second) seats, swapped every other round
        let mut jobs = Vec::new();
        for i in 0..self.contenders.len() {
            for j in (i + 1)..self.contenders.len() {
                for round in 0..rounds {
                    let (first, second) = if round % 2 == 0 { (i, j) } else { (j, i) };
                    jobs.push((first, second));
                }
            }
        }

        tracing::info!(
            contenders = self.contenders.len(),
            battles = jobs.len(),
            "Tournament started"
        );

        let duels: Vec<DuelSummary> = jobs
            .par_iter()
            .enumerate()
            .map(|(index, &(first, second))| {
                let duel = AiDuel::new(self.contenders[first].clone(), self.contenders[second].clone())
                    .with_ships(self.ships)
                    .with_config(self.config.clone());
                let result = duel.fight(seed.wrapping_add(index as u64))?;
                Ok(DuelSummary {
                    seats: [first, second],
                    first: duel.first.name(),
                    second: duel.second.name(),
                    result,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let ranking = self.rank(&duels);
        Ok(TournamentResult { duels, ranking })
    }

    fn rank(&self, duels: &[DuelSummary]) -> Vec<Standing> {
        let mut standings: Vec<Standing> = self
            .contenders
            .iter()
            .map(|contender| Standing {
                name: contender.name(),
                wins: 0,
                losses: 0,
                draws: 0,
                score: 0.0,
            })
            .collect();

        for duel in duels {
            for (seat, contender) in duel.seats.iter().enumerate() {
                let Some(standing) = standings.get_mut(*contender) else {
                    continue;
                };
                match duel.result.winner {
                    None => standing.draws += 1,
                    Some(winner) if winner == seat => standing.wins += 1,
                    Some(_) => standing.losses += 1,
                }
            }
        }

        for standing in standings.iter_mut() {
            let played = standing.wins + standing.losses + standing.draws;
            if played > 0 {
                standing.score = (standing.wins as f64 + 0.5 * standing.draws as f64) / played as f64;
            }
        }
        standings.sort_by_key(|standing| Reverse(OrderedFloat(standing.score)));
        standings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_config() -> BattleConfig {
        BattleConfig {
            max_cycles: 2,
            ..BattleConfig::default()
        }
    }

    #[test]
    fn test_needs_two_contenders() {
        let tournament = AiTournament::new(vec![AiKind::Passive]);
        assert!(matches!(tournament.run(1, 0), Err(FleetError::InvalidConfig(_))));
    }

    #[test]
    fn test_round_robin() {
        let mut tournament = AiTournament::new(vec![AiKind::Passive, AiKind::Passive, AiKind::Passive]);
        tournament.ships = 1;
        tournament.config = short_config();
        let result = tournament.run(2, 5).unwrap();

        // 3 pairs, 2 rounds each
        assert_eq!(result.duels.len(), 6);
        assert!(result.duels.iter().all(|duel| duel.result.winner.is_none()));
        assert_eq!(result.ranking.len(), 3);
        assert!(result
            .ranking
            .iter()
            .all(|standing| standing.draws == 4 && standing.score == 0.5));
    }

    #[test]
    fn test_ranking_order() {
        let tournament = AiTournament::new(vec![AiKind::Passive, AiKind::Bully]);
        let duel = |seats: [usize; 2], winner: Option<usize>| DuelSummary {
            seats,
            first: tournament.contenders[seats[0]].name(),
            second: tournament.contenders[seats[1]].name(),
            result: DuelResult {
                winner,
                cycles: 5,
                seed: 0,
            },
        };
        let ranking = tournament.rank(&[
            duel([0, 1], Some(1)),
            duel([1, 0], Some(0)),
            duel([0, 1], None),
        ]);
        assert_eq!(ranking[0].name, "bully");
        assert_eq!(ranking[0].wins, 2);
        assert_eq!(ranking[0].draws, 1);
        assert!((ranking[0].score - 2.5 / 3.0).abs() < 1e-9);
        assert_eq!(ranking[1].name, "passive");
        assert_eq!(ranking[1].losses, 2);
    }
}
