//! Stake ledger: per-staker records and the global staking counters.
//!
//! All balance mutation funnels through `record_deposit` / `record_withdrawal`;
//! the facade owns the surrounding phase and auth checks as well as the token
//! movement itself.

use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

use crate::ContractError;

// ── Storage key constants ────────────────────────────────────────────────────

const TOTAL_STAKED: Symbol = symbol_short!("TOT_STK");
const OUTSTANDING: Symbol = symbol_short!("OUT_STK");
const ACTIVE_COUNT: Symbol = symbol_short!("ACT_CNT");

// Per-staker persistent storage uses a tuple key: (prefix, staker_address)
const STAKE: Symbol = symbol_short!("STK");

/// A staker's position. Invariant: `active == (principal > 0)` — the record
/// is zeroed and deactivated exactly once, on withdrawal.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakeRecord {
    pub principal: i128,
    pub active: bool,
}

pub fn get_record(env: &Env, staker: &Address) -> StakeRecord {
    env.storage()
        .persistent()
        .get(&(STAKE, staker.clone()))
        .unwrap_or(StakeRecord {
            principal: 0,
            active: false,
        })
}

/// Sum of every deposit ever made. Frozen once the staking window closes,
/// because `record_deposit` is only reachable during `Staking`.
pub fn total_staked(env: &Env) -> i128 {
    env.storage().instance().get(&TOTAL_STAKED).unwrap_or(0)
}

/// Sum of principals not yet withdrawn. Shrinks monotonically.
pub fn outstanding_staked(env: &Env) -> i128 {
    env.storage().instance().get(&OUTSTANDING).unwrap_or(0)
}

/// Number of stakers with outstanding principal. Shrinks monotonically.
pub fn active_count(env: &Env) -> u32 {
    env.storage().instance().get(&ACTIVE_COUNT).unwrap_or(0)
}

/// Credit `amount` to the staker's position and the global counters.
///
/// The active-staker counter moves only on the staker's first deposit;
/// repeat deposits during the staking window just grow the principal.
pub fn record_deposit(env: &Env, staker: &Address, amount: i128) -> Result<(), ContractError> {
    if amount <= 0 {
        return Err(ContractError::InvalidAmount);
    }

    let mut rec = get_record(env, staker);
    let first_deposit = !rec.active;

    rec.principal = rec
        .principal
        .checked_add(amount)
        .ok_or(ContractError::Overflow)?;
    rec.active = true;
    env.storage()
        .persistent()
        .set(&(STAKE, staker.clone()), &rec);

    if first_deposit {
        let count = active_count(env)
            .checked_add(1)
            .ok_or(ContractError::Overflow)?;
        env.storage().instance().set(&ACTIVE_COUNT, &count);
    }

    let total = total_staked(env)
        .checked_add(amount)
        .ok_or(ContractError::Overflow)?;
    env.storage().instance().set(&TOTAL_STAKED, &total);

    let outstanding = outstanding_staked(env)
        .checked_add(amount)
        .ok_or(ContractError::Overflow)?;
    env.storage().instance().set(&OUTSTANDING, &outstanding);

    Ok(())
}

/// Zero the staker's position and return the principal that was outstanding.
///
/// Exactly-once: the record is deactivated before the facade performs any
/// token transfer, so a repeat call — reentrant or otherwise — always fails
/// with `NoStake`.
pub fn record_withdrawal(env: &Env, staker: &Address) -> Result<i128, ContractError> {
    let rec = get_record(env, staker);
    if !rec.active {
        return Err(ContractError::NoStake);
    }

    let principal = rec.principal;
    env.storage().persistent().set(
        &(STAKE, staker.clone()),
        &StakeRecord {
            principal: 0,
            active: false,
        },
    );

    let count = active_count(env).saturating_sub(1);
    env.storage().instance().set(&ACTIVE_COUNT, &count);

    let outstanding = outstanding_staked(env).saturating_sub(principal);
    env.storage().instance().set(&OUTSTANDING, &outstanding);

    Ok(principal)
}
