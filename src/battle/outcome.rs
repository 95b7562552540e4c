//! Result of an ended battle, and salvage from the wrecks

use serde::{Deserialize, Serialize};

use crate::battle::equipment::Equipment;
use crate::battle::fleet::Fleet;
use crate::core::random::RandomGenerator;
use crate::core::types::{Cycle, FleetId};

/// Luck threshold above which a wreck of the losing side yields equipment
const LOSER_SALVAGE_LUCK: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleOutcome {
    pub winner: Option<FleetId>,
    /// No winner
    pub draw: bool,
    /// Cycle at which the battle ended
    pub cycle: Cycle,
    /// Equipment salvaged from dead ships
    pub loot: Vec<Equipment>,
}

impl BattleOutcome {
    pub fn new(winner: Option<FleetId>, cycle: Cycle) -> Self {
        Self {
            winner,
            draw: winner.is_none(),
            cycle,
            loot: Vec::new(),
        }
    }

    /// Salvage equipment from dead ships into the loot
    ///
    /// Salvaged equipment is detached from its wreck. Dead ships of the
    /// winner give back a random number of their equipment; wrecks of the
    /// other side give a single one, on a lucky roll.
    pub fn collect_loot<R: RandomGenerator>(&mut self, fleets: &mut [Fleet], rng: &mut R) {
        self.loot.clear();
        for fleet in fleets.iter_mut() {
            let winner = Some(fleet.id) == self.winner;
            for ship in fleet.ships.iter_mut().filter(|ship| !ship.alive) {
                let count = if winner {
                    rng.rand_int(0, ship.equipments.len() as i64) as usize
                } else if rng.random() > LOSER_SALVAGE_LUCK {
                    1
                } else {
                    0
                };
                for _ in 0..count {
                    let Some(index) = rng.choice_index(ship.equipments.len()) else {
                        break;
                    };
                    let salvaged = ship.equipments.remove(index);
                    tracing::debug!(ship = %ship.id, equipment = %salvaged.code, "Equipment salvaged");
                    self.loot.push(salvaged);
                }
            }
        }
    }
}
