//! Phase clock: derives the bank's lifecycle phase from elapsed ledger time.
//!
//! The bank never stores a "current phase" field. Every entry point derives
//! the phase from `deploy_time`, `period_length`, and the ledger timestamp,
//! so there is no scheduler to run and no stored phase to go stale.

use soroban_sdk::contracttype;

/// The five sequential lifecycle windows of a bank instance.
///
/// Each window lasts exactly one `period_length`; `Reward3` is terminal and
/// open-ended. The derived `Ord` gives the temporal order
/// `Staking < Locked < Reward1 < Reward2 < Reward3`.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum Phase {
    /// Deposits are accepted.
    Staking = 0,
    /// Deposits are locked; nothing can move.
    Locked = 1,
    /// First withdrawal window: 20% of the reward pool is unlocked.
    Reward1 = 2,
    /// Second withdrawal window: 50% of the reward pool is unlocked.
    Reward2 = 3,
    /// Final, open-ended window: the whole reward pool is unlocked.
    Reward3 = 4,
}

impl Phase {
    /// True for the three windows in which stakers may withdraw.
    pub fn is_reward(self) -> bool {
        self >= Phase::Reward1
    }
}

/// Pure phase derivation. Total for every `now`; timestamps before
/// `deploy_time` count as `Staking`. `period_length` is validated non-zero
/// at initialisation.
pub fn phase_at(deploy_time: u64, period_length: u64, now: u64) -> Phase {
    let elapsed = now.saturating_sub(deploy_time);
    match elapsed / period_length {
        0 => Phase::Staking,
        1 => Phase::Locked,
        2 => Phase::Reward1,
        3 => Phase::Reward2,
        _ => Phase::Reward3,
    }
}
