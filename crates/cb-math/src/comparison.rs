//! Matching event times against lattice step times.

use cb_core::{Time, TIME_TOLERANCE};

/// Return `true` if time `t` is at or after `event`, allowing for the
/// rounding left by `i · dt` step times.
#[inline]
pub fn on_or_after(t: Time, event: Time) -> bool {
    t >= event - TIME_TOLERANCE
}
