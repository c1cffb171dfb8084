//! Scenario files
//!
//! A scenario is a vault configuration plus an ordered list of steps.
//! Accounts are referred to by label; the engine maps each label to a fresh
//! `AccountId` the first time it appears. Amounts are wei, as decimal
//! strings or integers.
//!
//! ```json
//! {
//!   "config": { "withdraw_limit": "1000000000000000000", "bank_cap": "10000000000000000000" },
//!   "steps": [
//!     { "op": "deposit", "account": "alice", "amount": "2000000000000000000" },
//!     { "op": "fail_next_release" },
//!     { "op": "withdraw", "account": "alice", "amount": "1000000000000000000" }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vault_contracts::config::VaultConfig;
use vault_contracts::errors::{ConfigError, VaultError};
use vault_types::numeric::Wei;

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Cannot read scenario {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed scenario: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid scenario config: {0}")]
    Config(#[from] ConfigError),

    #[error("Vault rejected scenario config: {0}")]
    Vault(#[from] VaultError),
}

/// One operation against the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// `account` deposits `amount` of attached value.
    Deposit { account: String, amount: Wei },
    /// `account` withdraws `amount`.
    Withdraw { account: String, amount: Wei },
    /// Value pushed into the vault's custody without a deposit.
    ForceSend { amount: Wei },
    /// The gateway refuses the next release that reaches it.
    FailNextRelease,
}

impl Step {
    pub fn label(&self) -> &'static str {
        match self {
            Step::Deposit { .. } => "deposit",
            Step::Withdraw { .. } => "withdraw",
            Step::ForceSend { .. } => "force_send",
            Step::FailNextRelease => "fail_next_release",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub config: VaultConfig,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn new(config: VaultConfig) -> Self {
        Self {
            config,
            steps: Vec::new(),
        }
    }

    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Parse a scenario and validate its config.
    pub fn from_json_str(json: &str) -> Result<Self, ScenarioError> {
        let scenario: Self = serde_json::from_str(json)?;
        scenario.config.validate()?;
        Ok(scenario)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json(&self) -> Result<String, ScenarioError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
