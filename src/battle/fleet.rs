//! Fleets: groups of ships belonging to one player

use serde::{Deserialize, Serialize};

use crate::battle::ship::Ship;
use crate::core::types::{FleetId, IdAllocator, ShipId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fleet {
    pub id: FleetId,
    /// Name of the owning player
    pub player: String,
    pub ships: Vec<Ship>,
}

impl Fleet {
    pub fn new(ids: &IdAllocator, player: &str) -> Self {
        Self {
            id: ids.next_id(),
            player: player.to_string(),
            ships: Vec::new(),
        }
    }

    /// Take ownership of a ship
    pub fn add_ship(&mut self, mut ship: Ship) -> ShipId {
        ship.fleet_id = self.id;
        let id = ship.id;
        self.ships.push(ship);
        id
    }

    /// Give a ship away, if it belongs to this fleet
    pub fn remove_ship(&mut self, id: ShipId) -> Option<Ship> {
        let index = self.ships.iter().position(|ship| ship.id == id)?;
        Some(self.ships.remove(index))
    }

    pub fn ship(&self, id: ShipId) -> Option<&Ship> {
        self.ships.iter().find(|ship| ship.id == id)
    }

    pub fn ship_mut(&mut self, id: ShipId) -> Option<&mut Ship> {
        self.ships.iter_mut().find(|ship| ship.id == id)
    }

    /// At least one ship alive, and no critical ship lost
    pub fn is_alive(&self) -> bool {
        self.ships.iter().any(|ship| ship.alive) && !self.ships.iter().any(|ship| ship.critical && !ship.alive)
    }
}
