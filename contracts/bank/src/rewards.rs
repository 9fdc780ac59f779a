//! Reward engine arithmetic.
//!
//! Pure `i128` helpers; the running `reward_paid` accumulator itself lives
//! in contract storage and is advanced by the facade. All division floors,
//! so truncation loss stays in the pool and is only reachable through the
//! admin's remainder path once every staker has exited.

use crate::phase::Phase;

/// The slice of `total_reward` claimable as of `phase`.
///
/// Cumulative tier weights are fixed: 20% once `Reward1` opens, 50% at
/// `Reward2`, the full pool at `Reward3`. Phases before the reward windows
/// unlock nothing. `None` on multiply overflow.
pub fn unlocked_pool(phase: Phase, total_reward: i128) -> Option<i128> {
    let pct: i128 = match phase {
        Phase::Staking | Phase::Locked => return Some(0),
        Phase::Reward1 => 20,
        Phase::Reward2 => 50,
        Phase::Reward3 => return Some(total_reward),
    };
    total_reward.checked_mul(pct)?.checked_div(100)
}

/// `floor(available × principal / outstanding)`.
///
/// `outstanding` still includes the withdrawer's own principal, so it is
/// strictly positive whenever a withdrawal is in flight. `None` on multiply
/// overflow.
pub fn payout_share(available: i128, principal: i128, outstanding: i128) -> Option<i128> {
    available.checked_mul(principal)?.checked_div(outstanding)
}
