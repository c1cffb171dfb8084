//! Types library for the custody vault
//!
//! Core value types shared by the vault ledger and its tooling.
//!
//! # Modules
//! - `ids`: Account identifiers
//! - `numeric`: Native-asset amounts in wei

pub mod ids;
pub mod numeric;

