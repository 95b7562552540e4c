//! Tactical AI: weighted evaluation of produced maneuvers
//!
//! On each turn (and again after each applied maneuver) the enabled
//! producers propose maneuvers. One maneuver is evaluated per work unit;
//! once all of them are scored (or the thinking time is over), the best
//! one is applied.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::battle::ai::helpers::{self, Evaluator};
use crate::battle::ai::maneuver::Maneuver;
use crate::battle::ai::personality::AiPersonality;
use crate::battle::ai::{BattleAi, WorkStep};
use crate::battle::ship::Ship;
use crate::battle::state::Battle;
use crate::core::random::{RandomGenerator, SeededRandom};
use crate::core::types::ShipId;

/// Scores closer than this are a tie
const SCORE_EPSILON: f64 = 1e-4;

/// Share of the AI time budget spent thinking (the rest is kept for applying)
const THINK_RATIO: f64 = 0.8;

pub struct TacticalAi {
    personality: AiPersonality,
    rng: Box<dyn RandomGenerator + Send>,
    work: VecDeque<Maneuver>,
    best: Option<(Maneuver, f64)>,
    produced: usize,
    evaluated: usize,
    thinking_since: Option<Instant>,
    think_budget: Option<Duration>,
}

impl TacticalAi {
    pub fn new(personality: AiPersonality, rng: Box<dyn RandomGenerator + Send>) -> Self {
        Self {
            personality,
            rng,
            work: VecDeque::new(),
            best: None,
            produced: 0,
            evaluated: 0,
            thinking_since: None,
            think_budget: None,
        }
    }

    pub fn with_seed(personality: AiPersonality, seed: u64) -> Self {
        Self::new(personality, Box::new(SeededRandom::new(seed)))
    }

    pub fn personality(&self) -> &AiPersonality {
        &self.personality
    }

    /// Maneuvers produced since the last planning
    pub fn produced(&self) -> usize {
        self.produced
    }

    pub fn evaluated(&self) -> usize {
        self.evaluated
    }

    /// Weighted score of a maneuver
    pub fn evaluate(&self, battle: &Battle, ship: &Ship, maneuver: &Maneuver) -> f64 {
        let weights = &self.personality.weights;
        let evaluators: [(f64, Evaluator); 8] = [
            (weights.turn_cost, helpers::evaluate_turn_cost),
            (weights.overheat, helpers::evaluate_overheat),
            (weights.enemy_health, helpers::evaluate_enemy_health),
            (weights.ally_health, helpers::evaluate_ally_health),
            (weights.active_effects, helpers::evaluate_active_effects),
            (weights.clustering, helpers::evaluate_clustering),
            (weights.position, helpers::evaluate_position),
            (weights.idling, helpers::evaluate_idling),
        ];
        let total_weight: f64 = evaluators.iter().map(|(weight, _)| weight.abs()).sum();
        if total_weight <= 0.0 {
            return 0.0;
        }
        let score: f64 = evaluators
            .iter()
            .filter(|(weight, _)| *weight != 0.0)
            .map(|(weight, evaluator)| weight * evaluator(battle, ship, maneuver))
            .sum();
        score / total_weight
    }

    /// Produce every maneuver of the enabled producers, alternating them
    fn produce(&mut self, battle: &Battle, ship: &Ship) -> Vec<Vec<Maneuver>> {
        let producers = &self.personality.producers;
        let rng: &mut dyn RandomGenerator = &mut *self.rng;
        let mut batches = Vec::new();
        if producers.end_turn {
            batches.push(helpers::produce_end_turn(battle, ship));
        }
        if producers.direct_shots {
            batches.push(helpers::produce_direct_shots(battle, ship));
        }
        if producers.blast_shots {
            batches.push(helpers::produce_blast_shots(battle, ship, producers.move_grid, rng));
        }
        if producers.toggles {
            batches.push(helpers::produce_toggle_actions(battle, ship));
        }
        if producers.drones {
            batches.push(helpers::produce_drone_deployments(battle, ship));
        }
        if producers.random_moves {
            batches.push(helpers::produce_random_moves(
                battle,
                ship,
                producers.move_grid,
                producers.move_iterations,
                rng,
            ));
        }
        batches
    }

    fn thinking_over(&self) -> bool {
        match (self.thinking_since, self.think_budget) {
            (Some(since), Some(budget)) => since.elapsed() >= budget,
            _ => false,
        }
    }

    /// Apply the best maneuver found
    fn conclude(&mut self, battle: &mut Battle, ship_id: ShipId) -> WorkStep {
        let Some((maneuver, score)) = self.best.take() else {
            return WorkStep::Done;
        };
        self.work.clear();
        if maneuver.action.is_end_turn() {
            tracing::debug!(ship = %ship_id, score, "Tactical AI ends its turn");
            return WorkStep::Done;
        }
        tracing::debug!(
            ship = %ship_id,
            action = %maneuver.action.code,
            score,
            evaluated = self.evaluated,
            "Tactical AI applies maneuver"
        );
        if !maneuver.apply(battle) {
            tracing::warn!(ship = %ship_id, action = %maneuver.action.code, "Maneuver could not be fully applied");
            return WorkStep::Done;
        }
        if maneuver.may_continue(battle) {
            self.init_work(battle, ship_id);
            WorkStep::Applied
        } else {
            // Partial maneuver, the turn cannot go further
            WorkStep::Done
        }
    }
}

impl BattleAi for TacticalAi {
    fn name(&self) -> &str {
        "tactical"
    }

    fn init_work(&mut self, battle: &Battle, ship_id: ShipId) {
        self.work.clear();
        self.best = None;
        self.evaluated = 0;
        self.thinking_since = Some(Instant::now());
        self.think_budget = Some(Duration::from_millis(
            (battle.config.ai_time_budget_ms as f64 * THINK_RATIO) as u64,
        ));

        let Some(ship) = battle.ship(ship_id) else {
            tracing::error!(ship = %ship_id, "Tactical AI cannot find its ship");
            self.produced = 0;
            return;
        };

        // Round robin over producers, so a time-out still sees some of each
        let mut batches: Vec<VecDeque<Maneuver>> =
            self.produce(battle, ship).into_iter().map(VecDeque::from).collect();
        while batches.iter().any(|batch| !batch.is_empty()) {
            for batch in batches.iter_mut() {
                if let Some(maneuver) = batch.pop_front() {
                    self.work.push_back(maneuver);
                }
            }
        }
        self.produced = self.work.len();
        tracing::trace!(ship = %ship_id, produced = self.produced, "Tactical AI planned");
    }

    fn do_work_unit(&mut self, battle: &mut Battle, ship_id: ShipId) -> WorkStep {
        if self.work.is_empty() || self.thinking_over() {
            return self.conclude(battle, ship_id);
        }

        let Some(maneuver) = self.work.pop_front() else {
            return WorkStep::Thinking;
        };
        if !maneuver.is_possible() {
            return WorkStep::Thinking;
        }
        let Some(ship) = battle.ship(ship_id) else {
            return WorkStep::Done;
        };
        let score = self.evaluate(battle, ship, &maneuver);
        self.evaluated += 1;

        let better = match &self.best {
            None => true,
            Some((_, best)) if (score - best).abs() < SCORE_EPSILON => self.rng.bool(),
            Some((_, best)) => score > *best,
        };
        if better {
            self.best = Some((maneuver, score));
        }
        WorkStep::Thinking
    }
}
