//! Vault: capped custody of native value in per-account balances
//!
//! - Deposit with positive-amount and bank-cap checks
//! - Withdraw with per-call limit and balance checks, released through a
//!   [`ValueGateway`] only after the books are debited
//! - Journal-backed rollback when a release fails
//! - Balance queries, counters, append-only event log

use std::collections::HashMap;

use tracing::{debug, error, info, warn};
use vault_types::ids::AccountId;
use vault_types::numeric::Wei;

use crate::config::VaultConfig;
use crate::errors::VaultError;
use crate::events::{ContractEvent, Deposit, Withdraw};
use crate::gateway::ValueGateway;
use crate::journal::{Journal, JournalEntry};

/// Core vault contract.
///
/// Holds one balance per account plus the vault's own custody holdings: the
/// native value actually sitting with the vault. Custody grows with every
/// deposit and with value pushed in out of band, and shrinks only when a
/// withdrawal releases funds, so it is never below the sum of balances.
///
/// Both limits are fixed at construction and have no setter.
///
/// State-changing operations run checks, then effects, then (withdraw only)
/// the external release.
#[derive(Debug)]
pub struct Vault {
    /// Balances: account -> amount. Missing key means zero.
    balances: HashMap<AccountId, Wei>,
    /// Max value released by a single withdrawal
    withdraw_limit: Wei,
    /// Max value the vault may hold in custody
    bank_cap: Wei,
    /// Native value currently held by the vault
    custody: Wei,
    deposit_count: u64,
    withdrawal_count: u64,
    /// Emitted events log (append-only)
    events: Vec<ContractEvent>,
    /// Undo log for open withdrawal frames
    journal: Journal,
}

impl Vault {
    /// Create a vault with fixed withdraw limit and bank cap.
    ///
    /// Fails with [`VaultError::InvalidConfiguration`] if either is zero.
    pub fn new(withdraw_limit: Wei, bank_cap: Wei) -> Result<Self, VaultError> {
        if withdraw_limit.is_zero() || bank_cap.is_zero() {
            return Err(VaultError::InvalidConfiguration {
                withdraw_limit,
                bank_cap,
            });
        }

        info!(
            withdraw_limit = %withdraw_limit,
            bank_cap = %bank_cap,
            "Vault initialized"
        );

        Ok(Self {
            balances: HashMap::new(),
            withdraw_limit,
            bank_cap,
            custody: Wei::ZERO,
            deposit_count: 0,
            withdrawal_count: 0,
            events: Vec::new(),
            journal: Journal::new(),
        })
    }

    pub fn from_config(config: &VaultConfig) -> Result<Self, VaultError> {
        Self::new(config.withdraw_limit, config.bank_cap)
    }

    // ───────────────────────── Deposit ─────────────────────────

    /// Deposit `attached` into `caller`'s vault.
    ///
    /// `attached` is value that arrives with the call. The cap is checked
    /// against custody holdings before that value is counted, so value sent
    /// to the vault outside `deposit` also uses up capacity.
    ///
    /// Emits and returns a `Deposit` event.
    pub fn deposit(&mut self, caller: AccountId, attached: Wei) -> Result<ContractEvent, VaultError> {
        if attached.is_zero() {
            warn!(account = %caller, "Rejected deposit: zero amount");
            return Err(VaultError::ZeroAmount);
        }

        let holdings = self.custody;
        let new_holdings = match holdings.checked_add(attached) {
            Some(total) if total <= self.bank_cap => total,
            _ => {
                warn!(
                    account = %caller,
                    holdings = %holdings,
                    attempted = %attached,
                    cap = %self.bank_cap,
                    "Rejected deposit: bank cap exceeded"
                );
                return Err(VaultError::BankCapExceeded {
                    holdings,
                    attempted: attached,
                    cap: self.bank_cap,
                });
            }
        };

        let new_balance = self
            .get_vault_balance(&caller)
            .checked_add(attached)
            .ok_or(VaultError::Overflow)?;

        self.set_balance(caller, new_balance);
        self.set_custody(new_holdings);
        self.deposit_count += 1;
        self.journal.record(JournalEntry::DepositCounted);

        let event = ContractEvent::Deposit(Deposit {
            account_id: caller,
            amount: attached,
        });
        self.emit(event.clone());

        debug!(
            account = %caller,
            amount = %attached,
            balance = %new_balance,
            holdings = %new_holdings,
            "Deposit committed"
        );
        Ok(event)
    }

    // ───────────────────────── Withdraw ─────────────────────────

    /// Withdraw `amount` from `caller`'s vault and release it through
    /// `gateway`.
    ///
    /// The limit check does not look at the balance: nobody withdraws more
    /// than the limit in one call. The balance is debited before the gateway
    /// runs, so a call that re-enters from inside the release sees the
    /// reduced balance. If the release fails, every change made since this
    /// call started is undone, nested calls included.
    ///
    /// Emits and returns a `Withdraw` event on success only.
    pub fn withdraw<G: ValueGateway + ?Sized>(
        &mut self,
        caller: AccountId,
        amount: Wei,
        gateway: &mut G,
    ) -> Result<ContractEvent, VaultError> {
        if amount > self.withdraw_limit {
            warn!(
                account = %caller,
                requested = %amount,
                max_allowed = %self.withdraw_limit,
                "Rejected withdrawal: limit exceeded"
            );
            return Err(VaultError::WithdrawLimitExceeded {
                requested: amount,
                max_allowed: self.withdraw_limit,
            });
        }

        let available = self.get_vault_balance(&caller);
        if amount > available {
            warn!(
                account = %caller,
                available = %available,
                requested = %amount,
                "Rejected withdrawal: insufficient balance"
            );
            return Err(VaultError::InsufficientBalance {
                available,
                requested: amount,
            });
        }

        let new_balance = available.checked_sub(amount).ok_or(VaultError::Overflow)?;
        let new_holdings = self.custody.checked_sub(amount).ok_or(VaultError::Overflow)?;

        let checkpoint = self.journal.open();
        self.set_balance(caller, new_balance);
        self.withdrawal_count += 1;
        self.journal.record(JournalEntry::WithdrawalCounted);
        self.set_custody(new_holdings);

        match gateway.release(self, caller, amount) {
            Ok(()) => {
                let event = ContractEvent::Withdraw(Withdraw {
                    account_id: caller,
                    amount,
                });
                self.emit(event.clone());
                self.journal.commit(checkpoint);

                debug!(
                    account = %caller,
                    amount = %amount,
                    depth = checkpoint.depth(),
                    "Withdrawal committed"
                );
                Ok(event)
            }
            Err(err) => {
                let undone = self.journal.rollback(checkpoint);
                let reverted = undone.len();
                for entry in undone {
                    self.undo(entry);
                }

                error!(
                    account = %caller,
                    amount = %amount,
                    reverted_entries = reverted,
                    reason = %err.reason,
                    "Release failed, withdrawal rolled back"
                );
                Err(VaultError::TransferFailed(err))
            }
        }
    }

    // ───────────────────────── Out-of-band value ─────────────────────────

    /// Account for value that reached the vault without a deposit (forced
    /// transfers). Custody grows, no balance does, and the value counts
    /// against the bank cap from now on. It cannot be refused, so it may
    /// push custody past the cap, after which every deposit is rejected.
    ///
    /// Custody clamps at `Wei::MAX`. Real native supply is far below that, so
    /// the clamp only triggers on synthetic inputs; it is logged when it does.
    pub fn receive_unsolicited(&mut self, amount: Wei) {
        let holdings = match self.custody.checked_add(amount) {
            Some(total) => total,
            None => {
                warn!(
                    amount = %amount,
                    holdings = %self.custody,
                    "Unsolicited value saturated custody holdings"
                );
                Wei::MAX
            }
        };
        self.set_custody(holdings);

        if holdings > self.bank_cap {
            warn!(
                amount = %amount,
                holdings = %holdings,
                cap = %self.bank_cap,
                "Unsolicited value pushed custody past bank cap"
            );
        } else {
            debug!(amount = %amount, holdings = %holdings, "Unsolicited value received");
        }
    }

    // ───────────────────────── Queries ─────────────────────────

    /// Balance of `account`; zero if it never deposited.
    pub fn get_vault_balance(&self, account: &AccountId) -> Wei {
        self.balances.get(account).copied().unwrap_or(Wei::ZERO)
    }

    /// Every account with a balance entry. Accounts drained to zero keep
    /// their entry.
    pub fn balances(&self) -> impl Iterator<Item = (&AccountId, Wei)> {
        self.balances.iter().map(|(account, amount)| (account, *amount))
    }

    pub fn withdraw_limit(&self) -> Wei {
        self.withdraw_limit
    }

    pub fn bank_cap(&self) -> Wei {
        self.bank_cap
    }

    /// Native value actually held by the vault.
    pub fn custody_holdings(&self) -> Wei {
        self.custody
    }

    /// Sum of all recorded balances. Never exceeds `custody_holdings`.
    pub fn total_recorded(&self) -> Wei {
        self.balances
            .values()
            .fold(Wei::ZERO, |acc, amount| acc.saturating_add(*amount))
    }

    pub fn deposit_count(&self) -> u64 {
        self.deposit_count
    }

    pub fn withdrawal_count(&self) -> u64 {
        self.withdrawal_count
    }

    /// Number of withdrawals currently waiting on their release.
    pub fn withdrawal_depth(&self) -> usize {
        self.journal.depth()
    }

    // ───────────────────────── Events ─────────────────────────

    /// Get all emitted events.
    pub fn events(&self) -> &[ContractEvent] {
        &self.events
    }

    /// Drain all events (consume and clear).
    ///
    /// Returns nothing while a withdrawal is waiting on its release: events
    /// logged inside that window may still be rolled back.
    pub fn drain_events(&mut self) -> Vec<ContractEvent> {
        if self.journal.in_frame() {
            return Vec::new();
        }
        std::mem::take(&mut self.events)
    }

    // ───────────────────────── Internal ─────────────────────────

    fn set_balance(&mut self, account: AccountId, amount: Wei) {
        let previous = self.balances.insert(account, amount);
        self.journal.record(JournalEntry::Balance { account, previous });
    }

    fn set_custody(&mut self, holdings: Wei) {
        let previous = std::mem::replace(&mut self.custody, holdings);
        self.journal.record(JournalEntry::Custody { previous });
    }

    fn emit(&mut self, event: ContractEvent) {
        self.events.push(event);
        self.journal.record(JournalEntry::EventEmitted);
    }

    fn undo(&mut self, entry: JournalEntry) {
        match entry {
            JournalEntry::Balance {
                account,
                previous: Some(amount),
            } => {
                self.balances.insert(account, amount);
            }
            JournalEntry::Balance {
                account,
                previous: None,
            } => {
                self.balances.remove(&account);
            }
            JournalEntry::Custody { previous } => self.custody = previous,
            JournalEntry::DepositCounted => {
                self.deposit_count = self.deposit_count.saturating_sub(1);
            }
            JournalEntry::WithdrawalCounted => {
                self.withdrawal_count = self.withdrawal_count.saturating_sub(1);
            }
            JournalEntry::EventEmitted => {
                self.events.pop();
            }
        }
    }
}
