//! Construction-time configuration for a vault
//!
//! Two amounts, both positive, supplied once. They can come from a JSON
//! document or from the environment; either way they are validated before a
//! `Vault` is built from them.

use std::env;

use serde::{Deserialize, Serialize};
use vault_types::numeric::Wei;

use crate::errors::{ConfigError, VaultError};

/// Environment variable holding the per-withdrawal ceiling.
pub const ENV_WITHDRAW_LIMIT: &str = "VAULT_WITHDRAW_LIMIT";
/// Environment variable holding the global custody ceiling.
pub const ENV_BANK_CAP: &str = "VAULT_BANK_CAP";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Max value a single withdrawal may release
    pub withdraw_limit: Wei,
    /// Max value the vault may hold in aggregate
    pub bank_cap: Wei,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            withdraw_limit: Wei::ether(1),
            bank_cap: Wei::ether(10),
        }
    }
}

impl VaultConfig {
    pub fn new(withdraw_limit: Wei, bank_cap: Wei) -> Self {
        Self {
            withdraw_limit,
            bank_cap,
        }
    }

    /// Reject configurations a vault could not be built from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.withdraw_limit.is_zero() || self.bank_cap.is_zero() {
            return Err(ConfigError::Rejected(VaultError::InvalidConfiguration {
                withdraw_limit: self.withdraw_limit,
                bank_cap: self.bank_cap,
            }));
        }
        Ok(())
    }

    /// Parse and validate a JSON document.
    ///
    /// Amounts are wei, either as decimal strings or integers.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `VAULT_WITHDRAW_LIMIT` and `VAULT_BANK_CAP`.
    ///
    /// Values are ether (`"1"`, `"0.25"`) or raw wei with a `wei` suffix
    /// (`"1000 wei"`). Both variables are required.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            withdraw_limit: read_amount(ENV_WITHDRAW_LIMIT)?,
            bank_cap: read_amount(ENV_BANK_CAP)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Start from `self` and replace whichever fields are set in the
    /// environment.
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if env::var(ENV_WITHDRAW_LIMIT).is_ok() {
            self.withdraw_limit = read_amount(ENV_WITHDRAW_LIMIT)?;
        }
        if env::var(ENV_BANK_CAP).is_ok() {
            self.bank_cap = read_amount(ENV_BANK_CAP)?;
        }
        self.validate()?;
        Ok(self)
    }
}

fn read_amount(key: &str) -> Result<Wei, ConfigError> {
    let raw = env::var(key).map_err(|_| ConfigError::MissingVar(key.to_string()))?;
    raw.parse::<Wei>().map_err(|source| ConfigError::InvalidAmount {
        key: key.to_string(),
        source,
    })
}
