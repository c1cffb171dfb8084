//! Contract-specific error types
//!
//! Every variant is a rejection of the whole operation: by the time one of
//! these reaches the caller, no effect of the failed call survives.

use thiserror::Error;
use vault_types::ids::AccountId;
use vault_types::numeric::{AmountError, Wei};

/// Vault ledger errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VaultError {
    #[error("Invalid configuration: withdraw limit {withdraw_limit} and bank cap {bank_cap} must both be positive")]
    InvalidConfiguration { withdraw_limit: Wei, bank_cap: Wei },

    #[error("Deposit amount must be positive")]
    ZeroAmount,

    #[error("Bank cap exceeded: holdings {holdings} + deposit {attempted} > cap {cap}")]
    BankCapExceeded {
        holdings: Wei,
        attempted: Wei,
        cap: Wei,
    },

    #[error("Withdraw limit exceeded: requested {requested}, max allowed {max_allowed}")]
    WithdrawLimitExceeded { requested: Wei, max_allowed: Wei },

    #[error("Insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance { available: Wei, requested: Wei },

    #[error("Transfer failed: {0}")]
    TransferFailed(#[from] TransferError),

    #[error("Arithmetic overflow in balance calculation")]
    Overflow,
}

/// Raised by a value gateway when it could not release funds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("release of {amount} to {recipient} rejected: {reason}")]
pub struct TransferError {
    pub recipient: AccountId,
    pub amount: Wei,
    pub reason: String,
}

impl TransferError {
    pub fn new(recipient: AccountId, amount: Wei, reason: impl Into<String>) -> Self {
        Self {
            recipient,
            amount,
            reason: reason.into(),
        }
    }
}

/// Configuration loading errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid amount in {key}: {source}")]
    InvalidAmount {
        key: String,
        #[source]
        source: AmountError,
    },

    #[error("Malformed config document: {0}")]
    Malformed(String),

    #[error("Rejected config: {0}")]
    Rejected(#[from] VaultError),
}
