//! Purchase engine.
//!
//! A purchase is planned against copies of the sale state and the investor
//! record, settled with the collaborators, and only then committed:
//!
//! ```text
//!   plan ──► lock ──► refund excess ──► credit ledger ──► forward net ──► commit
//!    │         │            │                 │                │
//!    └─ Err    └────────────┴─────── Err ─────┴────────────────┴──► unlock, discard plan
//! ```
//!
//! Nothing in storage changes unless every step succeeds, apart from the
//! record's lock which is released on every path.

use crate::caps::SaleState;
use crate::constants::{CREDIT_SCALE, MAX_FEE_PRICE, MIN_CONTRIBUTION, ZERO_ADDRESS};
use crate::errors::{Error, Result};
use crate::ledger::{AssetLedger, Payments};
use crate::registry::{Investor, InvestorRegistry};
use crate::window;
use crate::{AccountId, Balance, Timestamp};

/// One submission of native value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseRequest {
    pub participant: AccountId,
    pub value: Balance,
    /// Fee price the submission was made at.
    pub fee_price: Balance,
    pub now: Timestamp,
}

/// Identities on the asset-ledger side of a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counterparties {
    /// Holder of the credited units; the sale spends its allowance.
    pub owner: AccountId,
    /// The sale contract itself.
    pub sale: AccountId,
}

/// Result of a committed purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub struct Receipt {
    pub participant: AccountId,
    pub submitted: Balance,
    pub refunded: Balance,
    pub net_amount: Balance,
    pub credited: Balance,
}

/// Staged outcome of a purchase. Holds the post-purchase sale state and
/// investor record; storage is untouched until it is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchasePlan {
    pub sale: SaleState,
    pub record: Investor,
    pub excess: Balance,
    pub net_amount: Balance,
    pub credited: Balance,
}

/// Portion of `value` that would breach a cap.
///
/// Tier one (restricted window only): whatever takes the participant above
/// `participant_cap`. Tier two: whatever of the remainder takes the sale
/// above `global_cap`.
pub fn compute_excess(
    window_active: bool,
    contributed: Balance,
    raised: Balance,
    value: Balance,
    participant_cap: Balance,
    global_cap: Balance,
) -> Result<Balance> {
    let mut excess: Balance = 0;
    let mut working = value;

    if window_active {
        let after = contributed.checked_add(value).ok_or(Error::Overflow)?;
        if after > participant_cap {
            excess = after - participant_cap;
            working = value
                .checked_sub(excess)
                .ok_or(Error::ParticipantCapExceeded)?;
        }
    }

    let raised_after = raised.checked_add(working).ok_or(Error::Overflow)?;
    if raised_after > global_cap {
        excess = excess
            .checked_add(raised_after - global_cap)
            .ok_or(Error::Overflow)?;
    }

    Ok(excess)
}

/// `floor(net * CREDIT_SCALE / exchange_rate)` without forming the full
/// product.
pub fn credits_for(net: Balance, exchange_rate: Balance) -> Result<Balance> {
    if exchange_rate == 0 {
        return Err(Error::InvalidExchangeRate);
    }
    let whole = (net / exchange_rate)
        .checked_mul(CREDIT_SCALE)
        .ok_or(Error::Overflow)?;
    let fraction = (net % exchange_rate)
        .checked_mul(CREDIT_SCALE)
        .ok_or(Error::Overflow)?
        / exchange_rate;
    whole.checked_add(fraction).ok_or(Error::Overflow)
}

/// Validate `request` and compute its effect without touching storage.
pub fn plan(
    sale: &SaleState,
    participant_count: u32,
    record: &Investor,
    request: &PurchaseRequest,
) -> Result<PurchasePlan> {
    let mut staged = *sale;
    staged.ensure_participant_cap(participant_count, request.now)?;

    if request.participant == AccountId::from(ZERO_ADDRESS) {
        return Err(Error::ZeroAddress);
    }
    if request.fee_price > MAX_FEE_PRICE {
        return Err(Error::FeePriceTooHigh);
    }
    if record.purchasing {
        return Err(Error::PurchaseInProgress);
    }
    if !window::sale_open(staged.start, staged.end, request.now) {
        return Err(if request.now < staged.start {
            Error::SaleNotStarted
        } else {
            Error::SaleEnded
        });
    }
    if !staged.participant_cap_frozen() {
        return Err(Error::ParticipantCapUnset);
    }
    if request.value < MIN_CONTRIBUTION {
        return Err(Error::BelowMinimumContribution);
    }
    if !record.whitelisted {
        return Err(Error::NotWhitelisted);
    }

    let window_active = window::restricted_window_active(staged.start, request.now);
    if staged.raised > staged.global_cap {
        return Err(Error::GlobalCapExceeded);
    }
    if window_active && record.contributed > staged.participant_cap {
        return Err(Error::ParticipantCapExceeded);
    }

    let excess = compute_excess(
        window_active,
        record.contributed,
        staged.raised,
        request.value,
        staged.participant_cap,
        staged.global_cap,
    )?;
    let net_amount = request
        .value
        .checked_sub(excess)
        .ok_or(Error::GlobalCapExceeded)?;
    if net_amount == 0 {
        return Err(Error::NothingToPurchase);
    }

    let credited = credits_for(net_amount, staged.exchange_rate)?;

    staged.raised = staged.raised.checked_add(net_amount).ok_or(Error::Overflow)?;
    let mut updated = *record;
    updated.contributed = updated
        .contributed
        .checked_add(net_amount)
        .ok_or(Error::Overflow)?;
    updated.credited = updated.credited.checked_add(credited).ok_or(Error::Overflow)?;
    updated.purchasing = false;

    Ok(PurchasePlan {
        sale: staged,
        record: updated,
        excess,
        net_amount,
        credited,
    })
}

/// Move `amount` credited units from the owner's allowance to `to`, after
/// checking the ledger is wired to this sale and can cover the amount.
pub fn deliver_credits<L: AssetLedger>(
    ledger: &mut L,
    parties: &Counterparties,
    to: AccountId,
    amount: Balance,
) -> Result<()> {
    if ledger.registered_sale() != parties.sale {
        return Err(Error::SaleNotRegistered);
    }
    if ledger.allowance(parties.owner, parties.sale) < amount {
        return Err(Error::InsufficientAllowance);
    }
    if ledger.balance_of(parties.owner) < amount {
        return Err(Error::InsufficientLedgerBalance);
    }
    if !ledger.transfer_from(parties.owner, to, amount) {
        return Err(Error::LedgerTransferFailed);
    }
    Ok(())
}

fn settle<L: AssetLedger, P: Payments>(
    plan: &PurchasePlan,
    participant: AccountId,
    parties: &Counterparties,
    ledger: &mut L,
    payments: &mut P,
) -> Result<()> {
    if plan.excess > 0 && !payments.pay(participant, plan.excess) {
        return Err(Error::RefundFailed);
    }
    deliver_credits(ledger, parties, participant, plan.credited)?;
    if !payments.pay(plan.sale.beneficiary, plan.net_amount) {
        return Err(Error::ForwardFailed);
    }
    Ok(())
}

/// Run one purchase end to end. On `Err` the sale state and the investor
/// record are exactly as they were before the call.
pub fn purchase<L: AssetLedger, P: Payments>(
    sale: &mut SaleState,
    registry: &mut InvestorRegistry,
    parties: &Counterparties,
    request: &PurchaseRequest,
    ledger: &mut L,
    payments: &mut P,
) -> Result<Receipt> {
    let participant = request.participant;
    let record = registry.get(participant);
    let plan = plan(sale, registry.participant_count(), &record, request)?;

    registry.store(participant, &Investor { purchasing: true, ..record });
    let settled = settle(&plan, participant, parties, ledger, payments);

    match settled {
        Ok(()) => {
            *sale = plan.sale;
            registry.store(participant, &plan.record);
            Ok(Receipt {
                participant,
                submitted: request.value,
                refunded: plan.excess,
                net_amount: plan.net_amount,
                credited: plan.credited,
            })
        }
        Err(error) => {
            registry.store(participant, &record);
            Err(error)
        }
    }
}
