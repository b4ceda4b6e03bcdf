//! Fixed parameters of the sale. None of these are configurable after deploy.

use crate::{Balance, Timestamp};

/// Smallest-unit scale of the credited asset (18 decimals).
pub const CREDIT_SCALE: Balance = 1_000_000_000_000_000_000;

/// One whole unit of the native currency, 18 decimals.
pub const ONE_UNIT: Balance = 1_000_000_000_000_000_000;

/// Smallest accepted submission: 0.1 of a native unit.
pub const MIN_CONTRIBUTION: Balance = ONE_UNIT / 10;

/// Ceiling on the fee price a purchase may be submitted at.
///
/// Legacy anti-front-running guard. The value is carried over as-is and is
/// only meaningful on hosts whose fee price is denominated the same way.
pub const MAX_FEE_PRICE: Balance = 50_000_000_000;

/// Length of the restricted window that opens at `start`: one day in ms.
pub const RESTRICTED_WINDOW_MS: Timestamp = 24 * 60 * 60 * 1_000;

/// Bounds on the number of addresses accepted by one `whitelist_batch` call.
pub const MIN_WHITELIST_BATCH: usize = 1;
pub const MAX_WHITELIST_BATCH: usize = 30;

/// The null account. Never a valid participant, registrar or beneficiary.
pub const ZERO_ADDRESS: [u8; 32] = [0u8; 32];
