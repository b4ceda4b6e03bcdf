//! Sale parameters and the one-shot participant cap.

use crate::constants::ZERO_ADDRESS;
use crate::errors::{Error, Result};
use crate::{AccountId, Balance, Timestamp};

/// Schedule, caps and running totals of the sale.
#[derive(scale::Encode, scale::Decode, Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct SaleState {
    pub start: Timestamp,
    pub end: Timestamp,
    /// Most native value the sale will ever accept.
    pub global_cap: Balance,
    /// Native smallest units per whole credited unit.
    pub exchange_rate: Balance,
    /// Native value accepted so far, net of refunds.
    pub raised: Balance,
    /// Zero until frozen by the first purchase after `start`.
    pub participant_cap: Balance,
    /// Receives the net amount of every purchase.
    pub beneficiary: AccountId,
}

impl SaleState {
    /// Validate constructor arguments against `now`.
    pub fn new(
        start: Timestamp,
        end: Timestamp,
        global_cap: Balance,
        exchange_rate: Balance,
        beneficiary: AccountId,
        now: Timestamp,
    ) -> Result<Self> {
        if start <= now || end <= start {
            return Err(Error::InvalidSchedule);
        }
        if global_cap == 0 {
            return Err(Error::InvalidGlobalCap);
        }
        if exchange_rate == 0 {
            return Err(Error::InvalidExchangeRate);
        }
        if beneficiary == AccountId::from(ZERO_ADDRESS) {
            return Err(Error::ZeroAddress);
        }
        Ok(Self {
            start,
            end,
            global_cap,
            exchange_rate,
            raised: 0,
            participant_cap: 0,
            beneficiary,
        })
    }

    pub fn participant_cap_frozen(&self) -> bool {
        self.participant_cap != 0
    }

    pub fn remaining_global_cap(&self) -> Balance {
        self.global_cap.saturating_sub(self.raised)
    }

    /// Freeze `participant_cap = global_cap / participant_count` if it is not
    /// set yet. Returns `Ok(true)` when this call did the freezing.
    ///
    /// The first purchase after `start` fixes the cap from whatever
    /// population the registry holds at that instant; later whitelisting does
    /// not move it.
    pub fn ensure_participant_cap(
        &mut self,
        participant_count: u32,
        now: Timestamp,
    ) -> Result<bool> {
        if now < self.start {
            return Err(Error::SaleNotStarted);
        }
        if self.participant_cap_frozen() {
            return Ok(false);
        }
        if participant_count == 0 {
            return Err(Error::NoParticipants);
        }
        let cap = self
            .global_cap
            .checked_div(Balance::from(participant_count))
            .ok_or(Error::Overflow)?;
        if cap == 0 {
            return Err(Error::ParticipantCapUnset);
        }
        self.participant_cap = cap;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: Timestamp = 10_000;
    const END: Timestamp = 10_000_000_000;

    fn beneficiary() -> AccountId {
        AccountId::from([0x07; 32])
    }

    fn sale(global_cap: Balance) -> SaleState {
        SaleState::new(START, END, global_cap, 1, beneficiary(), 0).unwrap()
    }

    #[test]
    fn new_rejects_bad_parameters() {
        let b = beneficiary();
        assert_eq!(SaleState::new(START, END, 1, 1, b, START), Err(Error::InvalidSchedule));
        assert_eq!(SaleState::new(START, START, 1, 1, b, 0), Err(Error::InvalidSchedule));
        assert_eq!(SaleState::new(START, END, 0, 1, b, 0), Err(Error::InvalidGlobalCap));
        assert_eq!(SaleState::new(START, END, 1, 0, b, 0), Err(Error::InvalidExchangeRate));
        assert_eq!(
            SaleState::new(START, END, 1, 1, AccountId::from(ZERO_ADDRESS), 0),
            Err(Error::ZeroAddress)
        );
    }

    #[test]
    fn new_starts_empty() {
        let s = sale(100);
        assert_eq!(s.raised, 0);
        assert!(!s.participant_cap_frozen());
        assert_eq!(s.remaining_global_cap(), 100);
    }

    #[test]
    fn cap_needs_started_sale() {
        let mut s = sale(100);
        assert_eq!(s.ensure_participant_cap(2, START - 1), Err(Error::SaleNotStarted));
        assert_eq!(s.participant_cap, 0);
    }

    #[test]
    fn cap_divides_global_cap_by_population() {
        let mut s = sale(100);
        assert_eq!(s.ensure_participant_cap(2, START), Ok(true));
        assert_eq!(s.participant_cap, 50);
    }

    #[test]
    fn cap_freezes_once() {
        let mut s = sale(100);
        s.ensure_participant_cap(4, START).unwrap();
        assert_eq!(s.ensure_participant_cap(1, START + 1), Ok(false));
        assert_eq!(s.ensure_participant_cap(100, END), Ok(false));
        assert_eq!(s.participant_cap, 25);
    }

    #[test]
    fn zero_population_does_not_freeze() {
        let mut s = sale(100);
        assert_eq!(s.ensure_participant_cap(0, START), Err(Error::NoParticipants));
        assert!(!s.participant_cap_frozen());

        // A later call with a population still freezes normally.
        assert_eq!(s.ensure_participant_cap(3, START + 5), Ok(true));
        assert_eq!(s.participant_cap, 33);
    }

    #[test]
    fn cap_rounding_to_zero_is_rejected() {
        let mut s = sale(3);
        assert_eq!(s.ensure_participant_cap(4, START), Err(Error::ParticipantCapUnset));
        assert!(!s.participant_cap_frozen());
    }
}
