//! Seeded workload generator
//!
//! Produces random but reproducible scenarios: the same config and seed
//! always yield the same steps. Withdrawal amounts run past the limit on
//! purpose so the rejection paths get exercised alongside the happy path.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use vault_contracts::config::VaultConfig;
use vault_types::numeric::{Wei, WEI_PER_ETHER};

use crate::scenario::{Scenario, Step};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadConfig {
    pub vault: VaultConfig,
    /// Distinct account labels (`acct-0`, `acct-1`, ...)
    pub accounts: usize,
    pub steps: usize,
    pub max_deposit: Wei,
    pub max_withdraw: Wei,
    /// Probability a step is a forced transfer
    pub force_send_ratio: f64,
    /// Probability a step arms a release failure
    pub failure_ratio: f64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            vault: VaultConfig::default(),
            accounts: 5,
            steps: 1_000,
            max_deposit: Wei::ether(3),
            max_withdraw: Wei::from_wei(WEI_PER_ETHER * 3 / 2),
            force_send_ratio: 0.01,
            failure_ratio: 0.05,
        }
    }
}

pub struct WorkloadGenerator {
    config: WorkloadConfig,
    rng: ChaCha8Rng,
}

impl WorkloadGenerator {
    pub fn new(config: WorkloadConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn next_step(&mut self) -> Step {
        let roll: f64 = self.rng.gen();

        if roll < self.config.force_send_ratio {
            // Forced value is kept small relative to deposits.
            let ceiling = (self.config.max_deposit.as_u128() / 10).max(1);
            return Step::ForceSend {
                amount: self.amount_up_to(ceiling),
            };
        }
        if roll < self.config.force_send_ratio + self.config.failure_ratio {
            return Step::FailNextRelease;
        }

        let account = self.account_label();
        if self.rng.gen_bool(0.5) {
            Step::Deposit {
                account,
                amount: self.amount_up_to(self.config.max_deposit.as_u128()),
            }
        } else {
            Step::Withdraw {
                account,
                amount: self.amount_up_to(self.config.max_withdraw.as_u128()),
            }
        }
    }

    /// Build a full scenario of `config.steps` steps.
    pub fn scenario(&mut self) -> Scenario {
        let steps = (0..self.config.steps).map(|_| self.next_step()).collect();
        Scenario {
            config: self.config.vault.clone(),
            steps,
        }
    }

    fn account_label(&mut self) -> String {
        let n = self.rng.gen_range(0..self.config.accounts.max(1));
        format!("acct-{n}")
    }

    fn amount_up_to(&mut self, ceiling: u128) -> Wei {
        Wei::from_wei(self.rng.gen_range(1..=ceiling.max(1)))
    }
}

/// Convenience: one generated scenario.
pub fn generate(config: WorkloadConfig, seed: u64) -> Scenario {
    WorkloadGenerator::new(config, seed).scenario()
}
