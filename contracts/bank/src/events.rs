#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, Env};

use crate::phase::Phase;

// ── Event payloads ──────────────────────────────────────────────────────────

/// Fired once when the bank is bootstrapped.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub admin: Address,
    pub token: Address,
    pub total_reward: i128,
    pub period_length: u64,
    pub timestamp: u64,
}

/// Fired when a staker deposits during the staking window.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DepositedEvent {
    pub staker: Address,
    pub amount: i128,
    pub new_total_staked: i128,
    pub timestamp: u64,
}

/// Fired when a staker withdraws principal plus reward.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawnEvent {
    pub staker: Address,
    pub principal: i128,
    pub reward: i128,
    pub phase: Phase,
    pub timestamp: u64,
}

/// Fired when the admin reclaims the unclaimed remainder after settlement.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RemainderWithdrawnEvent {
    pub admin: Address,
    pub amount: i128,
    pub timestamp: u64,
}

/// Fired when the admin hands the role to a new address.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdminChangedEvent {
    pub old_admin: Address,
    pub new_admin: Address,
    pub timestamp: u64,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(
    env: &Env,
    admin: Address,
    token: Address,
    total_reward: i128,
    period_length: u64,
) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            admin,
            token,
            total_reward,
            period_length,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_deposited(env: &Env, staker: Address, amount: i128, new_total_staked: i128) {
    env.events().publish(
        (symbol_short!("DEPOSIT"), staker.clone()),
        DepositedEvent {
            staker,
            amount,
            new_total_staked,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_withdrawn(env: &Env, staker: Address, principal: i128, reward: i128, phase: Phase) {
    env.events().publish(
        (symbol_short!("WITHDRAWN"), staker.clone()),
        WithdrawnEvent {
            staker,
            principal,
            reward,
            phase,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_remainder_withdrawn(env: &Env, admin: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("REMAINDER"), admin.clone()),
        RemainderWithdrawnEvent {
            admin,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_admin_changed(env: &Env, old_admin: Address, new_admin: Address) {
    env.events().publish(
        (symbol_short!("ADM_CHG"), new_admin.clone()),
        AdminChangedEvent {
            old_admin,
            new_admin,
            timestamp: env.ledger().timestamp(),
        },
    );
}
