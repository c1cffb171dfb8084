//! Contract events
//!
//! Events are immutable records appended to the vault's log once an
//! operation has committed. External observers read or drain the log; the
//! ledger never reads it back for decisions.

use serde::{Deserialize, Serialize};
use vault_types::ids::AccountId;
use vault_types::numeric::Wei;

/// Value was deposited into `account_id`'s vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    pub account_id: AccountId,
    pub amount: Wei,
}

/// Value was released from `account_id`'s vault to the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdraw {
    pub account_id: AccountId,
    pub amount: Wei,
}

/// Enum wrapper for all contract events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContractEvent {
    Deposit(Deposit),
    Withdraw(Withdraw),
}

impl ContractEvent {
    pub fn account_id(&self) -> AccountId {
        match self {
            ContractEvent::Deposit(e) => e.account_id,
            ContractEvent::Withdraw(e) => e.account_id,
        }
    }

    pub fn amount(&self) -> Wei {
        match self {
            ContractEvent::Deposit(e) => e.amount,
            ContractEvent::Withdraw(e) => e.amount,
        }
    }

    /// Short label for logs and reports.
    pub fn label(&self) -> &'static str {
        match self {
            ContractEvent::Deposit(_) => "deposit",
            ContractEvent::Withdraw(_) => "withdraw",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deposit_event_wire_shape() {
        let account_id = AccountId::new();
        let event = ContractEvent::Deposit(Deposit {
            account_id,
            amount: Wei::from_wei(2_000),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "deposit");
        assert_eq!(json["amount"], "2000");
        assert_eq!(json["account_id"], account_id.to_string());

        let back: ContractEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_event_accessors() {
        let account_id = AccountId::new();
        let event = ContractEvent::Withdraw(Withdraw {
            account_id,
            amount: Wei::ether(1),
        });
        assert_eq!(event.account_id(), account_id);
        assert_eq!(event.amount(), Wei::ether(1));
        assert_eq!(event.label(), "withdraw");
    }
}
