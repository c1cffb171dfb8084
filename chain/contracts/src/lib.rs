//! Capped custody vault contract
//!
//! On-chain style ledger that holds native value for independent accounts
//! under two immutable limits: a ceiling per withdrawal and a ceiling on the
//! total value held.
//!
//! # Modules
//! - `vault`: Balances, deposit, withdraw, custody holdings, counters
//! - `gateway`: Value-transfer boundary used to release withdrawn funds
//! - `journal`: Undo log that makes a failed release roll back the withdrawal
//! - `events`: `Deposit` / `Withdraw` notifications
//! - `errors`: Contract error types
//! - `config`: Construction-time limits from JSON or environment

pub mod config;
pub mod errors;
pub mod events;
pub mod gateway;
pub mod journal;
pub mod vault;

pub use config::VaultConfig;
pub use errors::{ConfigError, TransferError, VaultError};
pub use events::ContractEvent;
pub use gateway::{InMemoryGateway, ValueGateway};
pub use vault::Vault;

/// Contract ABI version, frozen after release
pub const CONTRACT_ABI_VERSION: &str = "1.0.0";
