//! Fleet Tactics - turn-based tactical space combat
//!
//! [`battle`] holds the battle engine and its AIs, [`core`] the shared ids,
//! configuration, errors and random generators.

pub mod battle;
pub mod core;
