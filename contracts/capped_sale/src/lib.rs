#![cfg_attr(not(feature = "std"), no_std, no_main)]

//! # Capped Sale
//!
//! **Role:** Accepts native-currency payments for a fixed time span and
//! delivers units of a companion asset ledger at a fixed exchange rate.
//!
//! ## Caps
//!
//! ```text
//!   global cap       : total native value the sale ever accepts
//!   participant cap  : global_cap / whitelisted_count, frozen by the first
//!                      purchase after `start`, enforced only during the
//!                      restricted window (first day of the sale)
//! ```
//!
//! Whatever part of a payment would breach a cap is refunded inside the same
//! call; the rest is credited and forwarded to the beneficiary.
//!
//! ## Purchase flow
//!
//! ```text
//!   purchase / deposit
//!     ├── freeze participant cap (first purchase only)
//!     ├── validate: whitelisted, fee price, lock, schedule, minimum
//!     ├── excess = participant-cap overage + global-cap overage
//!     ├── refund excess ──► participant
//!     ├── transfer_from(owner → participant) on the asset ledger
//!     ├── forward net ──► beneficiary
//!     └── commit totals, emit PurchaseCompleted
//! ```
//!
//! Any failure discards the whole purchase.

pub mod caps;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod ledger;
pub mod registry;
pub mod window;

pub use ink::primitives::AccountId;
pub type Balance = u128;
pub type Timestamp = u64;

pub use errors::{Error, ErrorKind};

#[ink::contract]
mod capped_sale {
    use ink::prelude::vec::Vec;

    use crate::caps::SaleState;
    use crate::constants::{MAX_WHITELIST_BATCH, MIN_WHITELIST_BATCH, ZERO_ADDRESS};
    use crate::engine::{self, Counterparties, PurchaseRequest, Receipt};
    use crate::errors::Error;
    use crate::ledger::{LedgerClient, NativePayments};
    use crate::registry::{Investor, InvestorRegistry};
    use crate::window;

    // =========================================================================
    // STORAGE
    // =========================================================================

    #[ink(storage)]
    pub struct CappedSale {
        /// Deployer. Holds the credited units on the asset ledger and every role.
        owner: AccountId,
        /// May whitelist participants.
        registrar: AccountId,
        /// Asset ledger contract the credits are drawn from.
        asset_ledger: AccountId,
        sale: SaleState,
        investors: InvestorRegistry,
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    #[ink(event)]
    pub struct SaleConfigured {
        start: Timestamp,
        end: Timestamp,
        global_cap: Balance,
        exchange_rate: Balance,
    }

    #[ink(event)]
    pub struct BeneficiaryChanged {
        #[ink(topic)]
        previous: AccountId,
        #[ink(topic)]
        updated: AccountId,
    }

    #[ink(event)]
    pub struct ParticipantWhitelisted {
        #[ink(topic)]
        participant: AccountId,
        participant_count: u32,
    }

    /// Emitted once, by the purchase that froze the participant cap.
    #[ink(event)]
    pub struct ParticipantCapFrozen {
        participant_cap: Balance,
        participant_count: u32,
    }

    #[ink(event)]
    pub struct Refunded {
        #[ink(topic)]
        participant: AccountId,
        amount: Balance,
    }

    #[ink(event)]
    pub struct PurchaseCompleted {
        #[ink(topic)]
        participant: AccountId,
        net_amount: Balance,
        credited: Balance,
    }

    // =========================================================================
    // ROLES
    // =========================================================================

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Role {
        Owner,
        Registrar,
    }

    // =========================================================================
    // IMPLEMENTATION
    // =========================================================================

    impl CappedSale {
        /// Configure the sale. The deployer becomes the owner.
        ///
        /// `start` must be in the future and `end` after it; caps, rate and
        /// every account must be non-zero.
        #[ink(constructor)]
        pub fn new(
            start: Timestamp,
            end: Timestamp,
            global_cap: Balance,
            exchange_rate: Balance,
            registrar: AccountId,
            beneficiary: AccountId,
            asset_ledger: AccountId,
        ) -> Result<Self, Error> {
            let null = AccountId::from(ZERO_ADDRESS);
            if registrar == null || asset_ledger == null {
                return Err(Error::ZeroAddress);
            }
            let now = Self::env().block_timestamp();
            let sale = SaleState::new(start, end, global_cap, exchange_rate, beneficiary, now)?;

            Self::env().emit_event(SaleConfigured {
                start,
                end,
                global_cap,
                exchange_rate,
            });

            Ok(Self {
                owner: Self::env().caller(),
                registrar,
                asset_ledger,
                sale,
                investors: InvestorRegistry::default(),
            })
        }

        // =====================================================================
        // PURCHASE
        // =====================================================================

        /// Plain payment entry point. Same as [`Self::purchase`].
        #[ink(message, payable)]
        pub fn deposit(&mut self) -> Result<Receipt, Error> {
            self.purchase()
        }

        /// Buy credits with the transferred value.
        ///
        /// The part of the value above the participant cap (restricted window
        /// only) or the global cap is refunded in the same call.
        #[ink(message, payable)]
        pub fn purchase(&mut self) -> Result<Receipt, Error> {
            let request = PurchaseRequest {
                participant: self.env().caller(),
                value: self.env().transferred_value(),
                fee_price: self.fee_price(),
                now: self.env().block_timestamp(),
            };
            let parties = Counterparties {
                owner: self.owner,
                sale: self.env().account_id(),
            };
            let cap_was_frozen = self.sale.participant_cap_frozen();
            let mut ledger = LedgerClient::new(self.asset_ledger);

            let receipt = engine::purchase(
                &mut self.sale,
                &mut self.investors,
                &parties,
                &request,
                &mut ledger,
                &mut NativePayments,
            )?;

            if !cap_was_frozen {
                self.env().emit_event(ParticipantCapFrozen {
                    participant_cap: self.sale.participant_cap,
                    participant_count: self.investors.participant_count(),
                });
            }
            if receipt.refunded > 0 {
                self.env().emit_event(Refunded {
                    participant: receipt.participant,
                    amount: receipt.refunded,
                });
            }
            self.env().emit_event(PurchaseCompleted {
                participant: receipt.participant,
                net_amount: receipt.net_amount,
                credited: receipt.credited,
            });

            Ok(receipt)
        }

        // =====================================================================
        // WHITELIST
        // =====================================================================

        /// Whitelist one participant. Re-whitelisting is a no-op.
        #[ink(message)]
        pub fn whitelist(&mut self, participant: AccountId) -> Result<(), Error> {
            self.ensure_whitelisting_open()?;
            self.whitelist_one(participant)
        }

        /// Whitelist 1 to 30 participants in one call.
        #[ink(message)]
        pub fn whitelist_batch(&mut self, participants: Vec<AccountId>) -> Result<(), Error> {
            self.ensure_whitelisting_open()?;
            if !(MIN_WHITELIST_BATCH..=MAX_WHITELIST_BATCH).contains(&participants.len()) {
                return Err(Error::InvalidBatchSize);
            }
            for participant in participants {
                self.whitelist_one(participant)?;
            }
            Ok(())
        }

        // =====================================================================
        // ADMIN
        // =====================================================================

        #[ink(message)]
        pub fn change_beneficiary(&mut self, updated: AccountId) -> Result<(), Error> {
            self.ensure_role(self.env().caller(), Role::Owner)?;
            if self.has_started() {
                return Err(Error::SaleAlreadyStarted);
            }
            if updated == AccountId::from(ZERO_ADDRESS) {
                return Err(Error::ZeroAddress);
            }
            let previous = self.sale.beneficiary;
            if updated == previous {
                return Err(Error::BeneficiaryUnchanged);
            }
            self.sale.beneficiary = updated;
            self.env().emit_event(BeneficiaryChanged { previous, updated });
            Ok(())
        }

        // =====================================================================
        // VIEW FUNCTIONS
        // =====================================================================

        #[ink(message)]
        pub fn investor(&self, participant: AccountId) -> Investor {
            self.investors.get(participant)
        }

        #[ink(message)]
        pub fn is_whitelisted(&self, participant: AccountId) -> bool {
            self.investors.get(participant).whitelisted
        }

        #[ink(message)]
        pub fn participant_count(&self) -> u32 {
            self.investors.participant_count()
        }

        /// Zero until the first purchase after `start`.
        #[ink(message)]
        pub fn participant_cap(&self) -> Balance {
            self.sale.participant_cap
        }

        #[ink(message)]
        pub fn raised_total(&self) -> Balance {
            self.sale.raised
        }

        #[ink(message)]
        pub fn remaining_global_cap(&self) -> Balance {
            self.sale.remaining_global_cap()
        }

        #[ink(message)]
        pub fn sale_state(&self) -> SaleState {
            self.sale
        }

        #[ink(message)]
        pub fn owner(&self) -> AccountId {
            self.owner
        }

        #[ink(message)]
        pub fn registrar(&self) -> AccountId {
            self.registrar
        }

        #[ink(message)]
        pub fn beneficiary(&self) -> AccountId {
            self.sale.beneficiary
        }

        #[ink(message)]
        pub fn asset_ledger(&self) -> AccountId {
            self.asset_ledger
        }

        #[ink(message)]
        pub fn restricted_window_active(&self) -> bool {
            window::restricted_window_active(self.sale.start, self.env().block_timestamp())
        }

        #[ink(message)]
        pub fn restricted_window_end(&self) -> Timestamp {
            window::restricted_window_end(self.sale.start)
        }

        #[ink(message)]
        pub fn has_started(&self) -> bool {
            self.env().block_timestamp() >= self.sale.start
        }

        #[ink(message)]
        pub fn has_ended(&self) -> bool {
            self.env().block_timestamp() > self.sale.end
        }

        // =====================================================================
        // INTERNAL HELPERS
        // =====================================================================

        /// The owner holds every role.
        fn has_role(&self, who: AccountId, role: Role) -> bool {
            match role {
                Role::Owner => who == self.owner,
                Role::Registrar => who == self.registrar || who == self.owner,
            }
        }

        fn ensure_role(&self, who: AccountId, role: Role) -> Result<(), Error> {
            if self.has_role(who, role) {
                return Ok(());
            }
            Err(match role {
                Role::Owner => Error::NotOwner,
                Role::Registrar => Error::NotRegistrar,
            })
        }

        /// Registrar or owner, sale not over, restricted window not open.
        fn ensure_whitelisting_open(&self) -> Result<(), Error> {
            self.ensure_role(self.env().caller(), Role::Registrar)?;
            if self.has_ended() {
                return Err(Error::SaleEnded);
            }
            if self.restricted_window_active() {
                return Err(Error::RestrictedWindowActive);
            }
            Ok(())
        }

        fn whitelist_one(&mut self, participant: AccountId) -> Result<(), Error> {
            if self.investors.whitelist(participant)? {
                self.env().emit_event(ParticipantWhitelisted {
                    participant,
                    participant_count: self.investors.participant_count(),
                });
            }
            Ok(())
        }

        /// Fee price of the current call, as the host prices one unit of weight.
        fn fee_price(&self) -> Balance {
            self.env().weight_to_fee(1)
        }
    }

    // =========================================================================
    // UNIT TESTS
    // =========================================================================
    //
    // Successful purchases need the asset ledger contract, which the off-chain
    // environment cannot call; they are covered against in-memory
    // collaborators in `engine`.

}
