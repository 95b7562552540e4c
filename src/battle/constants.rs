//! Battle tunables shared across modules
//!
//! Arena dimensions and checks limits live in [`BattleConfig`]; the values
//! here are rules of the actions themselves.
//!
//! [`BattleConfig`]: crate::core::config::BattleConfig

// Movement
/// Default distance engines keep from other ships (km)
pub const DEFAULT_SAFETY_DISTANCE: f64 = 120.0;
/// Distance kept below the exact reach of the remaining power (km)
pub const REACHABLE_MARGIN: f64 = 0.1;
/// Distance of the default move target, straight ahead (km)
pub const DEFAULT_MOVE_DISTANCE: f64 = 100.0;

// Approach search (see `MoveFireSimulator::scan_circle`)
pub const APPROACH_SCAN_RINGS: usize = 6;
pub const APPROACH_SCAN_ANGLES: usize = 30;

// Drones
/// Maximal distance between a ship and the drone it deploys (km)
pub const DRONE_DEPLOY_DISTANCE: f64 = 300.0;
