//! Window gate: the first day after `start` is the restricted window.
//!
//! ```text
//!   start                 start + 1 day                     end
//!     │◄── restricted ──────►│◄──────── open ─────────────────►│
//!     │ participant cap on   │ participant cap lifted          │
//!     │ whitelisting closed  │ whitelisting allowed            │
//!     │ global cap enforced for the whole sale ───────────────►│
//! ```

use crate::constants::RESTRICTED_WINDOW_MS;
use crate::Timestamp;

/// First instant after the restricted window.
pub fn restricted_window_end(start: Timestamp) -> Timestamp {
    start.saturating_add(RESTRICTED_WINDOW_MS)
}

/// `true` exactly when `start <= now < start + 1 day`.
pub fn restricted_window_active(start: Timestamp, now: Timestamp) -> bool {
    start <= now && now < restricted_window_end(start)
}

/// `true` when `start <= now <= end`.
pub fn sale_open(start: Timestamp, end: Timestamp, now: Timestamp) -> bool {
    start <= now && now <= end
}
