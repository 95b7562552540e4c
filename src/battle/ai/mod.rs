//! Battle AI
//!
//! An AI plays the turn of the playing ship, through the same action API a
//! human player uses. Its thinking is split in small work units so that
//! the [`AiRunner`] can enforce a wall-clock budget and a maneuver cap,
//! and always hand the turn over with an end-turn action.
//!
//! Implementations:
//! - [`PassiveAi`]: ends its turns right away (baseline)
//! - [`BullyAi`]: shoots the nearest enemy, or closes in on one
//! - [`TacticalAi`]: scores every produced maneuver with weighted evaluators

pub mod bully;
pub mod duel;
pub mod helpers;
pub mod maneuver;
pub mod personality;
pub mod tactical;
pub mod tournament;

pub use bully::BullyAi;
pub use duel::{AiDuel, DuelRecord, DuelResult};
pub use maneuver::Maneuver;
pub use personality::{load_personality, AiPersonality, EvaluatorWeights, ProducerConfig};
pub use tactical::TacticalAi;
pub use tournament::{AiTournament, DuelSummary, Standing, TournamentResult};

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::battle::state::Battle;
use crate::core::config::BattleConfig;
use crate::core::error::{FleetError, Result};
use crate::core::random::SeededRandom;
use crate::core::types::{ActionId, ShipId};

/// Outcome of a single work unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkStep {
    /// Some thinking was done, more is needed
    Thinking,
    /// A maneuver was applied, the AI wants to go on
    Applied,
    /// Nothing more to do this turn
    Done,
}

/// Summary of one AI turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiTurnReport {
    pub ship: ShipId,
    pub work_units: usize,
    pub maneuvers: usize,
    /// The time budget or maneuver cap cut the turn short
    pub forced_end: bool,
    /// The turn was ended by the runner
    pub ended_turn: bool,
    pub elapsed_ms: u64,
}

/// Trait for battle AI implementations
pub trait BattleAi {
    fn name(&self) -> &str;

    /// Prepare the work for a ship turn (called again after each maneuver
    /// by implementations that re-plan)
    fn init_work(&mut self, battle: &Battle, ship: ShipId);

    /// Do a single unit of synchronous work
    fn do_work_unit(&mut self, battle: &mut Battle, ship: ShipId) -> WorkStep;

    /// Play the whole turn of the playing ship
    fn play_turn(&mut self, battle: &mut Battle) -> Result<AiTurnReport> {
        AiRunner::new(&battle.config).run(self, battle)
    }
}

/// Drives an AI through a ship turn
#[derive(Debug, Clone, Copy)]
pub struct AiRunner {
    pub time_budget: Duration,
    pub max_maneuvers: usize,
}

impl AiRunner {
    pub fn new(config: &BattleConfig) -> Self {
        Self {
            time_budget: Duration::from_millis(config.ai_time_budget_ms),
            max_maneuvers: config.ai_max_turn_maneuvers,
        }
    }

    pub fn run<A: BattleAi + ?Sized>(&self, ai: &mut A, battle: &mut Battle) -> Result<AiTurnReport> {
        if battle.ended() {
            return Err(FleetError::BattleEnded);
        }
        // No ship left to play
        let ship = battle.playing_ship_id().ok_or(FleetError::BattleEnded)?;

        let started = Instant::now();
        let mut report = AiTurnReport {
            ship,
            work_units: 0,
            maneuvers: 0,
            forced_end: false,
            ended_turn: false,
            elapsed_ms: 0,
        };

        ai.init_work(battle, ship);
        loop {
            let step = ai.do_work_unit(battle, ship);
            report.work_units += 1;
            if step == WorkStep::Done || battle.ended() {
                break;
            }
            if battle.playing_ship_id() != Some(ship) {
                tracing::error!(ai = ai.name(), ship = %ship, "AI switched to another ship in unit work");
                break;
            }
            if step == WorkStep::Applied {
                report.maneuvers += 1;
                if report.maneuvers >= self.max_maneuvers {
                    tracing::warn!(ai = ai.name(), ship = %ship, "AI played too many maneuvers, forcing turn end");
                    report.forced_end = true;
                    break;
                }
            }
            if started.elapsed() >= self.time_budget {
                tracing::warn!(ai = ai.name(), ship = %ship, "AI takes too long to play, forcing turn end");
                report.forced_end = true;
                break;
            }
        }

        if !battle.ended() && battle.playing_ship_id() == Some(ship) {
            report.ended_turn = battle.apply_one_action(ActionId::END_TURN, None);
        }
        report.elapsed_ms = started.elapsed().as_millis() as u64;
        tracing::debug!(
            ai = ai.name(),
            ship = %ship,
            maneuvers = report.maneuvers,
            work_units = report.work_units,
            "AI turn played"
        );
        Ok(report)
    }
}

/// AI doing nothing but ending its turns
#[derive(Debug, Clone, Default)]
pub struct PassiveAi;

impl BattleAi for PassiveAi {
    fn name(&self) -> &str {
        "passive"
    }

    fn init_work(&mut self, _battle: &Battle, _ship: ShipId) {}

    fn do_work_unit(&mut self, _battle: &mut Battle, _ship: ShipId) -> WorkStep {
        WorkStep::Done
    }
}

/// Available AI implementations, for duels and tournaments
#[derive(Debug, Clone, PartialEq)]
pub enum AiKind {
    Passive,
    Bully,
    Tactical(AiPersonality),
}

impl AiKind {
    /// `passive`, `bully`, `tactical`, or the name of a personality file
    /// (played by the tactical AI)
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "passive" => Ok(Self::Passive),
            "bully" => Ok(Self::Bully),
            "tactical" => Ok(Self::Tactical(AiPersonality::default())),
            personality => Ok(Self::Tactical(load_personality(personality)?)),
        }
    }

    pub fn name(&self) -> String {
        match self {
            Self::Passive => "passive".to_string(),
            Self::Bully => "bully".to_string(),
            Self::Tactical(personality) => format!("tactical:{}", personality.name),
        }
    }

    pub fn build(&self, seed: u64) -> Box<dyn BattleAi + Send> {
        match self {
            Self::Passive => Box::new(PassiveAi),
            Self::Bully => Box::new(BullyAi::new(Box::new(SeededRandom::new(seed)))),
            Self::Tactical(personality) => Box::new(TacticalAi::new(
                personality.clone(),
                Box::new(SeededRandom::new(seed)),
            )),
        }
    }
}
