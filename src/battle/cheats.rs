//! Cheat helpers on a running battle, for development and tests
//!
//! Cheats go through diffs like any gameplay change, so they are logged and
//! can be reverted.

use crate::battle::diffs::BattleDiff;
use crate::battle::ship_value::ShipValueName;
use crate::battle::state::Battle;
use crate::core::error::{FleetError, Result};
use crate::core::types::{FleetId, ShipId};

pub struct BattleCheats<'a> {
    battle: &'a mut Battle,
    player: FleetId,
}

impl<'a> BattleCheats<'a> {
    pub fn new(battle: &'a mut Battle, player: FleetId) -> Self {
        Self { battle, player }
    }

    /// Make the player win: every other ship dies
    pub fn win(&mut self) {
        let player = self.player;
        self.kill_where(|fleet| fleet != player);
        self.battle.end_battle(Some(player));
    }

    /// Make the player lose: every player ship dies
    pub fn lose(&mut self) {
        let player = self.player;
        self.kill_where(|fleet| fleet == player);
        let winner = self
            .battle
            .fleets
            .iter()
            .map(|fleet| fleet.id)
            .find(|fleet| *fleet != player);
        self.battle.end_battle(winner);
    }

    /// Destroy a single ship (the checks pass may then end the battle)
    pub fn destroy(&mut self, ship_id: ShipId) -> Result<()> {
        let diffs = self.battle.get_ship(ship_id)?.get_death_diffs();
        self.battle.apply_diffs(diffs);
        self.battle.perform_checks();
        Ok(())
    }

    /// Fill a ship's hull, shield and power to their capacity
    pub fn refill(&mut self, ship_id: ShipId) -> Result<()> {
        let ship = self.battle.get_ship(ship_id)?;
        if !ship.alive {
            return Err(FleetError::ShipNotFound(ship_id));
        }
        let diffs: Vec<BattleDiff> = ShipValueName::ALL
            .iter()
            .flat_map(|name| ship.get_value_diffs(*name, ship.get_attribute(name.capacity()), false))
            .collect();
        self.battle.apply_diffs(diffs);
        Ok(())
    }

    fn kill_where(&mut self, doomed: impl Fn(FleetId) -> bool) {
        let diffs: Vec<BattleDiff> = self
            .battle
            .alive_ships()
            .filter(|ship| doomed(ship.fleet_id))
            .flat_map(|ship| ship.get_death_diffs())
            .collect();
        self.battle.apply_diffs(diffs);
    }
}
