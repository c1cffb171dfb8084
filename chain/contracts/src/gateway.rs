//! Value-transfer gateway: the boundary where released funds leave the vault
//!
//! The vault never moves native value itself. After a withdrawal has debited
//! its books it asks a `ValueGateway` to release the funds. The gateway is
//! handed the vault back for the duration of the release, because whatever
//! receives the value may run its own logic and call into the vault again
//! before the withdrawal returns.

use std::collections::{HashMap, HashSet};

use tracing::debug;
use vault_types::ids::AccountId;
use vault_types::numeric::Wei;

use crate::errors::TransferError;
use crate::vault::Vault;

/// Native-asset transfer mechanism used by [`Vault::withdraw`].
///
/// `release` returns `Ok(())` only if `amount` reached `recipient`. Any error
/// makes the vault discard the whole withdrawal, including the effects of
/// calls made on `vault` from inside `release`. Implementations that keep
/// their own state must treat a failed outer release the same way.
pub trait ValueGateway {
    fn release(
        &mut self,
        vault: &mut Vault,
        recipient: AccountId,
        amount: Wei,
    ) -> Result<(), TransferError>;
}

/// Gateway that settles releases into an in-memory payout book.
///
/// Recipients never run code here, so releases never re-enter the vault.
/// Failures can be injected per recipient or for the next release.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGateway {
    paid_out: HashMap<AccountId, Wei>,
    rejected: HashSet<AccountId>,
    fail_next: bool,
    releases: u64,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse every release to `recipient` from now on.
    pub fn reject_recipient(&mut self, recipient: AccountId) {
        self.rejected.insert(recipient);
    }

    /// Accept releases to `recipient` again.
    pub fn accept_recipient(&mut self, recipient: &AccountId) {
        self.rejected.remove(recipient);
    }

    /// Refuse exactly one upcoming release, whoever it is for.
    pub fn fail_next_release(&mut self) {
        self.fail_next = true;
    }

    /// Total value delivered to `recipient` so far.
    pub fn paid_to(&self, recipient: &AccountId) -> Wei {
        self.paid_out.get(recipient).copied().unwrap_or(Wei::ZERO)
    }

    /// Total value delivered to everyone.
    pub fn total_paid_out(&self) -> Wei {
        self.paid_out
            .values()
            .fold(Wei::ZERO, |acc, v| acc.saturating_add(*v))
    }

    /// Number of successful releases.
    pub fn releases(&self) -> u64 {
        self.releases
    }
}

impl ValueGateway for InMemoryGateway {
    fn release(
        &mut self,
        _vault: &mut Vault,
        recipient: AccountId,
        amount: Wei,
    ) -> Result<(), TransferError> {
        if self.fail_next {
            self.fail_next = false;
            return Err(TransferError::new(recipient, amount, "injected failure"));
        }
        if self.rejected.contains(&recipient) {
            return Err(TransferError::new(recipient, amount, "recipient refuses value"));
        }

        let entry = self.paid_out.entry(recipient).or_insert(Wei::ZERO);
        *entry = entry.saturating_add(amount);
        self.releases += 1;

        debug!(recipient = %recipient, amount = %amount, "Value released");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault() -> Vault {
        Vault::new(Wei::ether(1), Wei::ether(10)).unwrap()
    }

    #[test]
    fn test_release_records_payout() {
        let mut gateway = InMemoryGateway::new();
        let mut vault = vault();
        let acc = AccountId::new();

        gateway.release(&mut vault, acc, Wei::from_wei(10)).unwrap();
        gateway.release(&mut vault, acc, Wei::from_wei(5)).unwrap();

        assert_eq!(gateway.paid_to(&acc), Wei::from_wei(15));
        assert_eq!(gateway.total_paid_out(), Wei::from_wei(15));
        assert_eq!(gateway.releases(), 2);
    }

    #[test]
    fn test_fail_next_is_one_shot() {
        let mut gateway = InMemoryGateway::new();
        let mut vault = vault();
        let acc = AccountId::new();

        gateway.fail_next_release();
        let err = gateway.release(&mut vault, acc, Wei::from_wei(1)).unwrap_err();
        assert_eq!(err.reason, "injected failure");
        assert!(gateway.release(&mut vault, acc, Wei::from_wei(1)).is_ok());
        assert_eq!(gateway.releases(), 1);
    }

    #[test]
    fn test_rejected_recipient() {
        let mut gateway = InMemoryGateway::new();
        let mut vault = vault();
        let acc = AccountId::new();

        gateway.reject_recipient(acc);
        assert!(gateway.release(&mut vault, acc, Wei::from_wei(1)).is_err());
        assert_eq!(gateway.paid_to(&acc), Wei::ZERO);

        gateway.accept_recipient(&acc);
        assert!(gateway.release(&mut vault, acc, Wei::from_wei(1)).is_ok());
    }
}
