//! Simulation engine
//!
//! Runs scenario steps against one vault and an in-memory gateway, records
//! what each step did, and summarises the final state in a [`Report`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use vault_contracts::config::VaultConfig;
use vault_contracts::errors::VaultError;
use vault_contracts::gateway::InMemoryGateway;
use vault_contracts::vault::Vault;
use vault_types::ids::AccountId;
use vault_types::numeric::Wei;

use crate::replay::{validate_replay, ReplayValidation};
use crate::scenario::{Scenario, ScenarioError, Step};

/// What happened to one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus {
    /// The vault accepted the operation and emitted an event.
    Committed,
    /// The vault refused the operation; state is unchanged.
    Rejected { error: String },
    /// Harness-level step (forced value, failure injection).
    Applied,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub index: usize,
    pub op: String,
    #[serde(flatten)]
    pub status: StepStatus,
}

/// Final state of a run, keyed by account label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub version: String,
    pub config: VaultConfig,
    pub outcomes: Vec<StepOutcome>,
    pub balances: BTreeMap<String, Wei>,
    pub custody_holdings: Wei,
    pub total_recorded: Wei,
    pub paid_out: Wei,
    pub deposit_count: u64,
    pub withdrawal_count: u64,
    pub committed: usize,
    pub rejected: usize,
    pub event_count: usize,
    pub replay: ReplayValidation,
}

pub struct SimEngine {
    config: VaultConfig,
    vault: Vault,
    gateway: InMemoryGateway,
    accounts: BTreeMap<String, AccountId>,
    outcomes: Vec<StepOutcome>,
}

impl SimEngine {
    pub fn new(config: VaultConfig) -> Result<Self, VaultError> {
        let vault = Vault::from_config(&config)?;
        Ok(Self {
            config,
            vault,
            gateway: InMemoryGateway::new(),
            accounts: BTreeMap::new(),
            outcomes: Vec::new(),
        })
    }

    /// Id behind `label`, allocated on first use.
    pub fn account(&mut self, label: &str) -> AccountId {
        *self
            .accounts
            .entry(label.to_string())
            .or_insert_with(AccountId::new)
    }

    /// Execute one step and record its outcome.
    pub fn apply(&mut self, step: &Step) -> &StepOutcome {
        let status = match step {
            Step::Deposit { account, amount } => {
                let id = self.account(account);
                Self::status_of(self.vault.deposit(id, *amount))
            }
            Step::Withdraw { account, amount } => {
                let id = self.account(account);
                Self::status_of(self.vault.withdraw(id, *amount, &mut self.gateway))
            }
            Step::ForceSend { amount } => {
                self.vault.receive_unsolicited(*amount);
                StepStatus::Applied
            }
            Step::FailNextRelease => {
                self.gateway.fail_next_release();
                StepStatus::Applied
            }
        };

        let index = self.outcomes.len();
        debug!(index, op = step.label(), status = ?status, "Step applied");
        self.outcomes.push(StepOutcome {
            index,
            op: step.label().to_string(),
            status,
        });
        &self.outcomes[index]
    }

    fn status_of<T>(result: Result<T, VaultError>) -> StepStatus {
        match result {
            Ok(_) => StepStatus::Committed,
            // Ids are fresh per run, so keep them out of the report text.
            Err(VaultError::TransferFailed(e)) => StepStatus::Rejected {
                error: format!("Transfer failed: {}", e.reason),
            },
            Err(e) => StepStatus::Rejected {
                error: e.to_string(),
            },
        }
    }

    pub fn vault(&self) -> &Vault {
        &self.vault
    }

    pub fn gateway(&self) -> &InMemoryGateway {
        &self.gateway
    }

    pub fn outcomes(&self) -> &[StepOutcome] {
        &self.outcomes
    }

    /// Balance of `label`, zero if it never appeared.
    pub fn balance_of(&self, label: &str) -> Wei {
        self.accounts
            .get(label)
            .map(|id| self.vault.get_vault_balance(id))
            .unwrap_or(Wei::ZERO)
    }

    pub fn report(&self) -> Report {
        let balances = self
            .accounts
            .iter()
            .map(|(label, id)| (label.clone(), self.vault.get_vault_balance(id)))
            .collect();
        let committed = self
            .outcomes
            .iter()
            .filter(|o| o.status == StepStatus::Committed)
            .count();
        let rejected = self
            .outcomes
            .iter()
            .filter(|o| matches!(o.status, StepStatus::Rejected { .. }))
            .count();

        Report {
            version: crate::VERSION.to_string(),
            config: self.config.clone(),
            outcomes: self.outcomes.clone(),
            balances,
            custody_holdings: self.vault.custody_holdings(),
            total_recorded: self.vault.total_recorded(),
            paid_out: self.gateway.total_paid_out(),
            deposit_count: self.vault.deposit_count(),
            withdrawal_count: self.vault.withdrawal_count(),
            committed,
            rejected,
            event_count: self.vault.events().len(),
            replay: validate_replay(&self.vault),
        }
    }
}

/// Run every step of `scenario` on a fresh vault.
pub fn run_scenario(scenario: &Scenario) -> Result<Report, ScenarioError> {
    scenario.config.validate()?;
    let mut engine = SimEngine::new(scenario.config.clone())?;

    for step in &scenario.steps {
        engine.apply(step);
    }

    let report = engine.report();
    info!(
        steps = scenario.steps.len(),
        committed = report.committed,
        rejected = report.rejected,
        custody = %report.custody_holdings,
        replay_ok = report.replay.matches(),
        "Scenario complete"
    );
    Ok(report)
}
