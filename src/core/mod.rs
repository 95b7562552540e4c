pub mod config;
pub mod error;
pub mod random;
pub mod types;

pub use config::BattleConfig;
pub use error::{FleetError, Result};
pub use random::{RandomGenerator, SeededRandom, SkewedRandom};
pub use types::{ActionId, Cycle, DroneId, EffectId, EquipmentId, FleetId, IdAllocator, ShipId};
