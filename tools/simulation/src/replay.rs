//! Event log replay
//!
//! Rebuilds every account's balance from `Deposit`/`Withdraw` events alone
//! and compares the result with the vault's books. Rolled-back withdrawals
//! leave no events, so a faithful log always reproduces the ledger.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vault_contracts::events::ContractEvent;
use vault_contracts::vault::Vault;
use vault_types::ids::AccountId;
use vault_types::numeric::Wei;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReplayError {
    #[error("Event {index} withdraws {amount} from {account} holding {available}")]
    Underflow {
        index: usize,
        account: AccountId,
        amount: Wei,
        available: Wei,
    },

    #[error("Event {index} overflows the balance of {account}")]
    Overflow { index: usize, account: AccountId },

    #[error("Malformed event log: {0}")]
    Malformed(String),
}

/// Outcome of checking a replayed log against live state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayValidation {
    pub events_replayed: usize,
    pub accounts_checked: usize,
    pub mismatched_accounts: usize,
    /// Set when the log itself could not be replayed.
    pub error: Option<String>,
}

impl ReplayValidation {
    pub fn matches(&self) -> bool {
        self.error.is_none() && self.mismatched_accounts == 0
    }
}

/// Apply events in order, starting from empty balances.
pub fn replay_balances(events: &[ContractEvent]) -> Result<HashMap<AccountId, Wei>, ReplayError> {
    let mut balances: HashMap<AccountId, Wei> = HashMap::new();

    for (index, event) in events.iter().enumerate() {
        let account = event.account_id();
        let amount = event.amount();
        let current = balances.get(&account).copied().unwrap_or(Wei::ZERO);

        let next = match event {
            ContractEvent::Deposit(_) => current
                .checked_add(amount)
                .ok_or(ReplayError::Overflow { index, account })?,
            ContractEvent::Withdraw(_) => {
                current
                    .checked_sub(amount)
                    .ok_or(ReplayError::Underflow {
                        index,
                        account,
                        amount,
                        available: current,
                    })?
            }
        };
        balances.insert(account, next);
    }

    Ok(balances)
}

/// Replay the vault's own event log and compare with its balances.
pub fn validate_replay(vault: &Vault) -> ReplayValidation {
    validate_against(vault, vault.events())
}

/// Replay `events` and compare with `vault`'s balances.
pub fn validate_against(vault: &Vault, events: &[ContractEvent]) -> ReplayValidation {
    let replayed = match replay_balances(events) {
        Ok(balances) => balances,
        Err(e) => {
            return ReplayValidation {
                events_replayed: events.len(),
                accounts_checked: 0,
                mismatched_accounts: 0,
                error: Some(e.to_string()),
            }
        }
    };

    let recorded: HashMap<AccountId, Wei> = vault
        .balances()
        .map(|(account, balance)| (*account, balance))
        .collect();

    let mut accounts: Vec<&AccountId> = recorded.keys().chain(replayed.keys()).collect();
    accounts.sort();
    accounts.dedup();

    let accounts_checked = accounts.len();
    let mismatched_accounts = accounts
        .into_iter()
        .filter(|account| {
            let expected = replayed.get(*account).copied().unwrap_or(Wei::ZERO);
            let actual = recorded.get(*account).copied().unwrap_or(Wei::ZERO);
            expected != actual
        })
        .count();

    ReplayValidation {
        events_replayed: events.len(),
        accounts_checked,
        mismatched_accounts,
        error: None,
    }
}

/// Serialize an event log for storage.
pub fn export_event_log(events: &[ContractEvent]) -> Result<String, ReplayError> {
    serde_json::to_string(events).map_err(|e| ReplayError::Malformed(e.to_string()))
}

/// Load an event log written by [`export_event_log`].
pub fn import_event_log(json: &str) -> Result<Vec<ContractEvent>, ReplayError> {
    serde_json::from_str(json).map_err(|e| ReplayError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vault_contracts::gateway::InMemoryGateway;

    fn populated_vault() -> (Vault, AccountId, AccountId) {
        let mut vault = Vault::new(Wei::from_wei(100), Wei::from_wei(1_000)).unwrap();
        let mut gateway = InMemoryGateway::new();
        let alice = AccountId::new();
        let bob = AccountId::new();

        vault.deposit(alice, Wei::from_wei(300)).unwrap();
        vault.deposit(bob, Wei::from_wei(50)).unwrap();
        vault.withdraw(alice, Wei::from_wei(100), &mut gateway).unwrap();
        gateway.fail_next_release();
        assert!(vault.withdraw(bob, Wei::from_wei(50), &mut gateway).is_err());

        (vault, alice, bob)
    }

    #[test]
    fn test_replay_reproduces_balances() {
        let (vault, alice, bob) = populated_vault();
        let balances = replay_balances(vault.events()).unwrap();

        assert_eq!(balances[&alice], Wei::from_wei(200));
        assert_eq!(balances[&bob], Wei::from_wei(50));
        assert!(validate_replay(&vault).matches());
    }

    #[test]
    fn test_replay_detects_truncated_log() {
        let (vault, _, _) = populated_vault();
        let truncated = &vault.events()[..1];

        let validation = validate_against(&vault, truncated);
        assert!(!validation.matches());
        assert_eq!(validation.mismatched_accounts, 2);
    }

    #[test]
    fn test_replay_underflow() {
        let (vault, alice, _) = populated_vault();
        // Withdraw without the preceding deposit.
        let events = vec![vault.events()[2].clone()];

        assert_eq!(
            replay_balances(&events),
            Err(ReplayError::Underflow {
                index: 0,
                account: alice,
                amount: Wei::from_wei(100),
                available: Wei::ZERO,
            })
        );
        assert!(validate_against(&vault, &events).error.is_some());
    }

    #[test]
    fn test_event_log_round_trip() {
        let (vault, _, _) = populated_vault();
        let json = export_event_log(vault.events()).unwrap();
        let imported = import_event_log(&json).unwrap();

        assert_eq!(imported, vault.events());
        assert!(validate_against(&vault, &imported).matches());
    }

    #[test]
    fn test_import_malformed() {
        assert!(matches!(
            import_event_log("not json"),
            Err(ReplayError::Malformed(_))
        ));
    }

    mod props {
        use super::*;
        use crate::engine::run_scenario;
        use crate::workload::{generate, WorkloadConfig};
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            /// Any generated workload leaves a log that reproduces the ledger,
            /// and never records more than the vault holds.
            #[test]
            fn generated_runs_replay_cleanly(
                seed in any::<u64>(),
                steps in 1usize..400,
                accounts in 1usize..8,
            ) {
                let config = WorkloadConfig { steps, accounts, ..WorkloadConfig::default() };
                let report = run_scenario(&generate(config, seed)).unwrap();

                prop_assert!(report.replay.matches());
                prop_assert!(report.total_recorded <= report.custody_holdings);
                prop_assert_eq!(
                    report.event_count as u64,
                    report.deposit_count + report.withdrawal_count
                );
            }
        }
    }
}
