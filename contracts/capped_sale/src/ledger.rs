//! Collaborators reached during settlement: the asset ledger that holds the
//! credited units, and the native-currency transfers for refunds and the
//! beneficiary forward.

use ink::env::call::{build_call, ExecutionInput, Selector};
use ink::env::DefaultEnvironment;

use crate::{AccountId, Balance};

/// Message surface the asset ledger contract must expose. The sale only
/// calls these four.
#[ink::trait_definition]
pub trait SaleLedger {
    #[ink(message)]
    fn allowance(&self, owner: AccountId, spender: AccountId) -> Balance;

    #[ink(message)]
    fn balance_of(&self, owner: AccountId) -> Balance;

    /// The one sale contract allowed to pull from owner allowances.
    #[ink(message)]
    fn registered_sale(&self) -> AccountId;

    #[ink(message)]
    fn transfer_from(&mut self, owner: AccountId, to: AccountId, amount: Balance) -> bool;
}

/// Asset ledger as seen by the purchase engine.
pub trait AssetLedger {
    fn allowance(&self, owner: AccountId, spender: AccountId) -> Balance;
    fn balance_of(&self, owner: AccountId) -> Balance;
    fn registered_sale(&self) -> AccountId;
    /// `false` means the transfer did not happen.
    fn transfer_from(&mut self, owner: AccountId, to: AccountId, amount: Balance) -> bool;
}

/// Native-currency transfers out of the sale contract.
pub trait Payments {
    /// `false` means the value was not moved.
    fn pay(&mut self, to: AccountId, amount: Balance) -> bool;
}

/// Cross-contract client for a deployed [`SaleLedger`].
///
/// Transport failures are folded into the neutral answer (zero, the null
/// account, `false`) so every one of them surfaces as a delegate failure.
pub struct LedgerClient {
    address: AccountId,
}

impl LedgerClient {
    pub fn new(address: AccountId) -> Self {
        Self { address }
    }
}

impl AssetLedger for LedgerClient {
    fn allowance(&self, owner: AccountId, spender: AccountId) -> Balance {
        let result: Result<ink::MessageResult<Balance>, ink::env::Error> =
            build_call::<DefaultEnvironment>()
                .call(self.address)
                .exec_input(
                    ExecutionInput::new(Selector::new(ink::selector_bytes!(
                        "SaleLedger::allowance"
                    )))
                    .push_arg(owner)
                    .push_arg(spender),
                )
                .returns::<Balance>()
                .try_invoke();

        match result {
            Ok(Ok(amount)) => amount,
            _ => 0,
        }
    }

    fn balance_of(&self, owner: AccountId) -> Balance {
        let result: Result<ink::MessageResult<Balance>, ink::env::Error> =
            build_call::<DefaultEnvironment>()
                .call(self.address)
                .exec_input(
                    ExecutionInput::new(Selector::new(ink::selector_bytes!(
                        "SaleLedger::balance_of"
                    )))
                    .push_arg(owner),
                )
                .returns::<Balance>()
                .try_invoke();

        match result {
            Ok(Ok(amount)) => amount,
            _ => 0,
        }
    }

    fn registered_sale(&self) -> AccountId {
        let result: Result<ink::MessageResult<AccountId>, ink::env::Error> =
            build_call::<DefaultEnvironment>()
                .call(self.address)
                .exec_input(ExecutionInput::new(Selector::new(ink::selector_bytes!(
                    "SaleLedger::registered_sale"
                ))))
                .returns::<AccountId>()
                .try_invoke();

        match result {
            Ok(Ok(sale)) => sale,
            _ => AccountId::from(crate::constants::ZERO_ADDRESS),
        }
    }

    fn transfer_from(&mut self, owner: AccountId, to: AccountId, amount: Balance) -> bool {
        let result: Result<ink::MessageResult<bool>, ink::env::Error> =
            build_call::<DefaultEnvironment>()
                .call(self.address)
                .exec_input(
                    ExecutionInput::new(Selector::new(ink::selector_bytes!(
                        "SaleLedger::transfer_from"
                    )))
                    .push_arg(owner)
                    .push_arg(to)
                    .push_arg(amount),
                )
                .returns::<bool>()
                .try_invoke();

        matches!(result, Ok(Ok(true)))
    }
}

/// Pays out of the executing contract's own balance.
pub struct NativePayments;

impl Payments for NativePayments {
    fn pay(&mut self, to: AccountId, amount: Balance) -> bool {
        ink::env::transfer::<DefaultEnvironment>(to, amount).is_ok()
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use ink::prelude::collections::BTreeMap;
    use ink::prelude::vec::Vec;

    /// In-memory ledger. The spender of every `transfer_from` is taken to be
    /// `sale`.
    pub struct MockLedger {
        pub sale: AccountId,
        pub balances: BTreeMap<AccountId, Balance>,
        pub allowances: BTreeMap<(AccountId, AccountId), Balance>,
        pub reject_transfers: bool,
        pub transfers: Vec<(AccountId, AccountId, Balance)>,
    }

    impl MockLedger {
        /// `owner` holds `supply` and has approved all of it to `sale`.
        pub fn funded(sale: AccountId, owner: AccountId, supply: Balance) -> Self {
            let mut balances = BTreeMap::new();
            balances.insert(owner, supply);
            let mut allowances = BTreeMap::new();
            allowances.insert((owner, sale), supply);
            Self {
                sale,
                balances,
                allowances,
                reject_transfers: false,
                transfers: Vec::new(),
            }
        }
    }

    impl AssetLedger for MockLedger {
        fn allowance(&self, owner: AccountId, spender: AccountId) -> Balance {
            self.allowances.get(&(owner, spender)).copied().unwrap_or(0)
        }

        fn balance_of(&self, owner: AccountId) -> Balance {
            self.balances.get(&owner).copied().unwrap_or(0)
        }

        fn registered_sale(&self) -> AccountId {
            self.sale
        }

        fn transfer_from(&mut self, owner: AccountId, to: AccountId, amount: Balance) -> bool {
            if self.reject_transfers {
                return false;
            }
            let allowance = self.allowance(owner, self.sale);
            let balance = self.balance_of(owner);
            if allowance < amount || balance < amount {
                return false;
            }
            self.allowances.insert((owner, self.sale), allowance - amount);
            self.balances.insert(owner, balance - amount);
            *self.balances.entry(to).or_insert(0) += amount;
            self.transfers.push((owner, to, amount));
            true
        }
    }

    /// Records every payment; refuses payments to `fail_to`.
    #[derive(Default)]
    pub struct MockPayments {
        pub paid: Vec<(AccountId, Balance)>,
        pub fail_to: Option<AccountId>,
    }

    impl Payments for MockPayments {
        fn pay(&mut self, to: AccountId, amount: Balance) -> bool {
            if self.fail_to == Some(to) {
                return false;
            }
            self.paid.push((to, amount));
            true
        }
    }
}
