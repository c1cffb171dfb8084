//! Vault Simulation Framework
//!
//! Drives a `Vault` through scripted or generated workloads and reports the
//! resulting state.
//!
//! # Modules
//! - `scenario`: JSON scenario format (config + steps)
//! - `engine`: Executes steps against a vault and an in-memory gateway
//! - `workload`: Seeded random scenario generator
//! - `replay`: Rebuilds balances from the event log and checks them
//! - `export`: Report JSON export

pub mod engine;
pub mod export;
pub mod replay;
pub mod scenario;
pub mod workload;

/// Crate version constant
pub const VERSION: &str = "1.0.0";
