/// Every failure the sale can report. Any `Err` aborts the whole message and
/// leaves storage untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub enum Error {
    // ── Construction ──────────────────────────────────────────────────────
    /// `start` is not in the future, or `end` is not after `start`.
    InvalidSchedule,
    /// Global cap must be non-zero.
    InvalidGlobalCap,
    /// Exchange rate must be non-zero.
    InvalidExchangeRate,
    /// A required account is the null address.
    ZeroAddress,

    // ── Authorization ─────────────────────────────────────────────────────
    /// Caller is not the contract owner.
    NotOwner,
    /// Caller is neither the registrar nor the owner.
    NotRegistrar,

    // ── Phase ─────────────────────────────────────────────────────────────
    /// The sale has not opened yet.
    SaleNotStarted,
    /// The sale has closed.
    SaleEnded,
    /// The action is only allowed before the sale opens.
    SaleAlreadyStarted,
    /// Whitelisting is closed while the restricted window is open.
    RestrictedWindowActive,

    // ── Re-entry ──────────────────────────────────────────────────────────
    /// A purchase for this participant is already in flight.
    PurchaseInProgress,

    // ── Caps & eligibility ────────────────────────────────────────────────
    /// Participant is not whitelisted.
    NotWhitelisted,
    /// Submitted value is below `MIN_CONTRIBUTION`.
    BelowMinimumContribution,
    /// Observed fee price is above `MAX_FEE_PRICE`.
    FeePriceTooHigh,
    /// No participants were whitelisted when the cap had to be frozen.
    NoParticipants,
    /// The participant cap is not set (or rounded down to zero).
    ParticipantCapUnset,
    /// The participant already holds more than the participant cap.
    ParticipantCapExceeded,
    /// The raised total already exceeds the global cap.
    GlobalCapExceeded,
    /// Nothing is left to accept after refunding the excess.
    NothingToPurchase,
    /// `whitelist_batch` needs between 1 and 30 addresses.
    InvalidBatchSize,
    /// The new beneficiary equals the current one.
    BeneficiaryUnchanged,

    // ── Delegates ─────────────────────────────────────────────────────────
    /// The asset ledger does not name this contract as its sale.
    SaleNotRegistered,
    /// The owner's allowance to the sale does not cover the credits.
    InsufficientAllowance,
    /// The owner's ledger balance does not cover the credits.
    InsufficientLedgerBalance,
    /// The ledger rejected or failed the `transfer_from`.
    LedgerTransferFailed,
    /// Returning the excess to the participant failed.
    RefundFailed,
    /// Forwarding the net amount to the beneficiary failed.
    ForwardFailed,

    /// An arithmetic operation overflowed.
    Overflow,
}

/// Coarse classification of [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Construction,
    Authorization,
    Phase,
    Reentry,
    CapOrEligibility,
    DelegateFailure,
    Arithmetic,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        use Error::*;
        match self {
            InvalidSchedule | InvalidGlobalCap | InvalidExchangeRate | ZeroAddress => {
                ErrorKind::Construction
            }
            NotOwner | NotRegistrar => ErrorKind::Authorization,
            SaleNotStarted | SaleEnded | SaleAlreadyStarted | RestrictedWindowActive => {
                ErrorKind::Phase
            }
            PurchaseInProgress => ErrorKind::Reentry,
            NotWhitelisted
            | BelowMinimumContribution
            | FeePriceTooHigh
            | NoParticipants
            | ParticipantCapUnset
            | ParticipantCapExceeded
            | GlobalCapExceeded
            | NothingToPurchase
            | InvalidBatchSize
            | BeneficiaryUnchanged => ErrorKind::CapOrEligibility,
            SaleNotRegistered
            | InsufficientAllowance
            | InsufficientLedgerBalance
            | LedgerTransferFailed
            | RefundFailed
            | ForwardFailed => ErrorKind::DelegateFailure,
            Overflow => ErrorKind::Arithmetic,
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(Error::InvalidSchedule.kind(), ErrorKind::Construction);
        assert_eq!(Error::NotRegistrar.kind(), ErrorKind::Authorization);
        assert_eq!(Error::RestrictedWindowActive.kind(), ErrorKind::Phase);
        assert_eq!(Error::PurchaseInProgress.kind(), ErrorKind::Reentry);
        assert_eq!(Error::NothingToPurchase.kind(), ErrorKind::CapOrEligibility);
        assert_eq!(Error::NoParticipants.kind(), ErrorKind::CapOrEligibility);
        assert_eq!(Error::LedgerTransferFailed.kind(), ErrorKind::DelegateFailure);
        assert_eq!(Error::ForwardFailed.kind(), ErrorKind::DelegateFailure);
    }
}
