//! Investor registry. One record per participant, created on first touch and
//! never removed.

use ink::storage::Mapping;

use crate::constants::ZERO_ADDRESS;
use crate::errors::{Error, Result};
use crate::{AccountId, Balance};

/// Per-participant book entry.
#[derive(scale::Encode, scale::Decode, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct Investor {
    /// Native value accepted from this participant, net of refunds.
    pub contributed: Balance,
    /// Asset units delivered to this participant.
    pub credited: Balance,
    pub whitelisted: bool,
    /// Re-entry lock. Only `true` while a purchase is in flight.
    pub purchasing: bool,
}

#[ink::storage_item]
#[derive(Debug, Default)]
pub struct InvestorRegistry {
    records: Mapping<AccountId, Investor>,
    /// Number of addresses that ever became whitelisted.
    participant_count: u32,
}

impl InvestorRegistry {
    /// Materialise a zero record for `who` if none exists yet.
    pub fn register(&mut self, who: AccountId) -> Investor {
        match self.records.get(who) {
            Some(record) => record,
            None => {
                let record = Investor::default();
                self.records.insert(who, &record);
                record
            }
        }
    }

    pub fn get(&self, who: AccountId) -> Investor {
        self.records.get(who).unwrap_or_default()
    }

    pub fn contains(&self, who: AccountId) -> bool {
        self.records.contains(who)
    }

    /// Mark `who` as whitelisted.
    ///
    /// Returns `Ok(true)` only on a not-whitelisted → whitelisted transition;
    /// repeated calls and the null address are silent no-ops.
    pub fn whitelist(&mut self, who: AccountId) -> Result<bool> {
        if who == AccountId::from(ZERO_ADDRESS) {
            return Ok(false);
        }
        let mut record = self.register(who);
        if record.whitelisted {
            return Ok(false);
        }
        self.participant_count = self
            .participant_count
            .checked_add(1)
            .ok_or(Error::Overflow)?;
        record.whitelisted = true;
        self.records.insert(who, &record);
        Ok(true)
    }

    pub fn participant_count(&self) -> u32 {
        self.participant_count
    }

    /// Overwrite the record for `who`. Only the purchase engine writes
    /// balances and the lock through here.
    pub(crate) fn store(&mut self, who: AccountId, record: &Investor) {
        self.records.insert(who, record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ink::env::{test, DefaultEnvironment};

    fn accounts() -> test::DefaultAccounts<DefaultEnvironment> {
        test::default_accounts::<DefaultEnvironment>()
    }

    #[ink::test]
    fn get_on_unknown_address_is_zero_record() {
        let registry = InvestorRegistry::default();
        assert_eq!(registry.get(accounts().bob), Investor::default());
        assert!(!registry.contains(accounts().bob));
    }

    #[ink::test]
    fn register_is_idempotent() {
        let mut registry = InvestorRegistry::default();
        let bob = accounts().bob;
        assert_eq!(registry.register(bob), Investor::default());
        assert!(registry.contains(bob));

        let mut funded = registry.get(bob);
        funded.contributed = 7;
        registry.store(bob, &funded);

        assert_eq!(registry.register(bob).contributed, 7);
        assert_eq!(registry.participant_count(), 0);
    }

    #[ink::test]
    fn whitelist_counts_each_address_once() {
        let mut registry = InvestorRegistry::default();
        let accs = accounts();

        assert_eq!(registry.whitelist(accs.bob), Ok(true));
        assert_eq!(registry.whitelist(accs.bob), Ok(false));
        assert_eq!(registry.whitelist(accs.charlie), Ok(true));

        assert_eq!(registry.participant_count(), 2);
        assert!(registry.get(accs.bob).whitelisted);
        assert!(registry.get(accs.charlie).whitelisted);
        assert!(!registry.get(accs.django).whitelisted);
    }

    #[ink::test]
    fn whitelist_ignores_null_address() {
        let mut registry = InvestorRegistry::default();
        let null = AccountId::from(ZERO_ADDRESS);
        assert_eq!(registry.whitelist(null), Ok(false));
        assert_eq!(registry.participant_count(), 0);
        assert!(!registry.contains(null));
    }

    #[ink::test]
    fn whitelist_keeps_existing_balances() {
        let mut registry = InvestorRegistry::default();
        let bob = accounts().bob;
        registry.store(
            bob,
            &Investor { contributed: 5, credited: 50, ..Default::default() },
        );

        assert_eq!(registry.whitelist(bob), Ok(true));
        let record = registry.get(bob);
        assert_eq!(record.contributed, 5);
        assert_eq!(record.credited, 50);
        assert!(record.whitelisted);
    }
}
