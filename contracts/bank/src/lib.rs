#![no_std]

pub mod events;
pub mod phase;
pub mod rewards;
pub mod stake;

use soroban_sdk::{contract, contractimpl, symbol_short, token, Address, Env, Symbol};

pub use phase::Phase;
pub use stake::StakeRecord;

// ── Storage key constants ────────────────────────────────────────────────────

const ADMIN: Symbol = symbol_short!("ADMIN");
const INITIALIZED: Symbol = symbol_short!("INIT");
const TOKEN: Symbol = symbol_short!("TOKEN");
const TOTAL_REWARD: Symbol = symbol_short!("TOT_RWD");
const PERIOD_LENGTH: Symbol = symbol_short!("PERIOD");
const DEPLOY_TIME: Symbol = symbol_short!("DEPLOY_AT");
const REWARD_PAID: Symbol = symbol_short!("RWD_PAID");

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    NotAuthorized = 3,
    InvalidAmount = 4,
    InsufficientAllowance = 5,
    WrongPhase = 6,
    NoStake = 7,
    TooEarly = 8,
    NotSettled = 9,
    Overflow = 10,
}

// ── Contract ─────────────────────────────────────────────────────────────────

/// Custodial staking bank with a fixed five-window lifecycle.
///
/// Stakers deposit a fungible token during the staking window, sit through a
/// lock window, and then withdraw principal plus a slice of the pre-funded
/// reward pool across three reward windows. The unlocked slice of the pool
/// grows 20% → 50% → 100% across the windows, and each payout is weighted by
/// the withdrawer's share of the stake still outstanding, so waiting longer
/// earns a weakly larger reward. The admin reclaims whatever the truncating
/// arithmetic left behind once every staker has exited.
#[contract]
pub struct BankContract;

#[contractimpl]
impl BankContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the bank.
    ///
    /// * `token`         – SAC address of the token staked and paid as reward.
    /// * `total_reward`  – size of the reward pool, in token units.
    /// * `period_length` – seconds per lifecycle window; all five windows
    ///                     share this length and the clock starts now.
    ///
    /// The admin must separately transfer `total_reward` tokens into the
    /// contract before the first reward window opens; the bank does not
    /// verify its own funding.
    pub fn initialize(
        env: Env,
        admin: Address,
        token: Address,
        total_reward: i128,
        period_length: u64,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::AlreadyInitialized);
        }
        if total_reward < 0 || period_length == 0 {
            return Err(ContractError::InvalidAmount);
        }

        let now = env.ledger().timestamp();

        env.storage().instance().set(&ADMIN, &admin);
        env.storage().instance().set(&INITIALIZED, &true);
        env.storage().instance().set(&TOKEN, &token);
        env.storage().instance().set(&TOTAL_REWARD, &total_reward);
        env.storage().instance().set(&PERIOD_LENGTH, &period_length);
        env.storage().instance().set(&DEPLOY_TIME, &now);
        // Staking counters and REWARD_PAID start at zero; unwrap_or(0)
        // handles absent keys, so no explicit init needed.

        events::publish_initialized(&env, admin, token, total_reward, period_length);

        Ok(())
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Deposit `amount` tokens for the caller during the staking window.
    ///
    /// Requires a prior token allowance of at least `amount` in favour of the
    /// contract; the tokens are pulled in via `transfer_from` only after the
    /// stake ledger is updated.
    pub fn deposit(env: Env, staker: Address, amount: i128) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();

        // The admin never stakes, in any phase.
        if staker == Self::read_admin(&env)? {
            return Err(ContractError::NotAuthorized);
        }
        if Self::current_phase(&env)? != Phase::Staking {
            return Err(ContractError::WrongPhase);
        }
        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }

        let token_id = Self::read_token(&env)?;
        let client = token::Client::new(&env, &token_id);
        let contract = env.current_contract_address();

        if client.allowance(&staker, &contract) < amount {
            return Err(ContractError::InsufficientAllowance);
        }

        stake::record_deposit(&env, &staker, amount)?;

        events::publish_deposited(&env, staker.clone(), amount, stake::total_staked(&env));

        client.transfer_from(&contract, &staker, &contract, &amount);

        Ok(())
    }

    // ── Withdrawal ──────────────────────────────────────────────────────────

    /// Withdraw the caller's entire principal plus their reward for the
    /// current reward window. Returns the total payout.
    ///
    /// The reward is the caller's share of the unlocked-but-unclaimed pool,
    /// weighted by their fraction of the stake still outstanding (their own
    /// principal included). All ledger state is committed before the token
    /// transfer, so a reentrant second call lands on a deactivated record.
    pub fn withdraw(env: Env, staker: Address) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();

        if staker == Self::read_admin(&env)? {
            return Err(ContractError::NotAuthorized);
        }
        let phase = Self::current_phase(&env)?;
        if !phase.is_reward() {
            return Err(ContractError::WrongPhase);
        }

        // Outstanding stake at this instant, withdrawer included — the
        // denominator of the payout share.
        let outstanding = stake::outstanding_staked(&env);
        let principal = stake::record_withdrawal(&env, &staker)?;

        let total_reward: i128 = env.storage().instance().get(&TOTAL_REWARD).unwrap_or(0);
        let paid: i128 = env.storage().instance().get(&REWARD_PAID).unwrap_or(0);

        let unlocked =
            rewards::unlocked_pool(phase, total_reward).ok_or(ContractError::Overflow)?;
        let available = unlocked.saturating_sub(paid);
        let reward = rewards::payout_share(available, principal, outstanding)
            .ok_or(ContractError::Overflow)?;

        let new_paid = paid.checked_add(reward).ok_or(ContractError::Overflow)?;
        env.storage().instance().set(&REWARD_PAID, &new_paid);

        let payout = principal.checked_add(reward).ok_or(ContractError::Overflow)?;

        events::publish_withdrawn(&env, staker.clone(), principal, reward, phase);

        let token_id = Self::read_token(&env)?;
        token::Client::new(&env, &token_id).transfer(
            &env.current_contract_address(),
            &staker,
            &payout,
        );

        Ok(payout)
    }

    /// Reclaim the unclaimed remainder of the reward pool. Admin only,
    /// final window only, and only once every staker has withdrawn.
    ///
    /// The remainder is whatever floor truncation left behind plus any tier
    /// slice nobody stayed long enough to claim. `REWARD_PAID` is pinned to
    /// the full pool before the transfer, so the reclaim pays out once.
    pub fn withdraw_remaining(env: Env, caller: Address) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();

        if caller != Self::read_admin(&env)? {
            return Err(ContractError::NotAuthorized);
        }
        if Self::current_phase(&env)? != Phase::Reward3 {
            return Err(ContractError::TooEarly);
        }
        if stake::active_count(&env) > 0 {
            return Err(ContractError::NotSettled);
        }

        let total_reward: i128 = env.storage().instance().get(&TOTAL_REWARD).unwrap_or(0);
        let paid: i128 = env.storage().instance().get(&REWARD_PAID).unwrap_or(0);
        let remainder = total_reward.saturating_sub(paid);

        env.storage().instance().set(&REWARD_PAID, &total_reward);

        events::publish_remainder_withdrawn(&env, caller.clone(), remainder);

        if remainder > 0 {
            let token_id = Self::read_token(&env)?;
            token::Client::new(&env, &token_id).transfer(
                &env.current_contract_address(),
                &caller,
                &remainder,
            );
        }

        Ok(remainder)
    }

    // ── Admin ───────────────────────────────────────────────────────────────

    /// Hand the admin role to `new_admin`. Only the current admin may call
    /// this; allowed in any phase.
    pub fn change_admin(env: Env, caller: Address, new_admin: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();

        let admin = Self::read_admin(&env)?;
        if caller != admin {
            return Err(ContractError::NotAuthorized);
        }

        env.storage().instance().set(&ADMIN, &new_admin);

        events::publish_admin_changed(&env, admin, new_admin);

        Ok(())
    }

    // ── View functions ───────────────────────────────────────────────────────

    /// Return the lifecycle phase at the current ledger timestamp.
    pub fn get_phase(env: Env) -> Result<Phase, ContractError> {
        Self::require_initialized(&env)?;
        Self::current_phase(&env)
    }

    /// Return a staker's outstanding principal.
    pub fn get_principal(env: Env, staker: Address) -> i128 {
        stake::get_record(&env, &staker).principal
    }

    /// True while the staker has principal not yet withdrawn.
    pub fn has_staked(env: Env, staker: Address) -> bool {
        stake::get_record(&env, &staker).active
    }

    /// Number of stakers with outstanding principal.
    pub fn get_active_count(env: Env) -> u32 {
        stake::active_count(&env)
    }

    /// Sum of every deposit ever made; frozen once the staking window closes.
    pub fn get_total_staked(env: Env) -> i128 {
        stake::total_staked(&env)
    }

    /// Sum of principals not yet withdrawn.
    pub fn get_outstanding_staked(env: Env) -> i128 {
        stake::outstanding_staked(&env)
    }

    /// Size of the pre-funded reward pool.
    pub fn get_total_reward(env: Env) -> i128 {
        env.storage().instance().get(&TOTAL_REWARD).unwrap_or(0)
    }

    /// Cumulative reward already paid out (or pinned after the admin reclaim).
    pub fn get_reward_paid(env: Env) -> i128 {
        env.storage().instance().get(&REWARD_PAID).unwrap_or(0)
    }

    /// Seconds per lifecycle window.
    pub fn get_period_length(env: Env) -> u64 {
        env.storage().instance().get(&PERIOD_LENGTH).unwrap_or(0)
    }

    /// Address of the staked/reward token.
    pub fn get_token(env: Env) -> Result<Address, ContractError> {
        Self::read_token(&env)
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    pub fn get_admin(env: Env) -> Result<Address, ContractError> {
        Self::read_admin(&env)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    /// Guard: revert if the contract is not yet initialized.
    fn require_initialized(env: &Env) -> Result<(), ContractError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::NotInitialized);
        }
        Ok(())
    }

    fn read_admin(env: &Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&ADMIN)
            .ok_or(ContractError::NotInitialized)
    }

    fn read_token(env: &Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&TOKEN)
            .ok_or(ContractError::NotInitialized)
    }

    /// Derive the phase from the ledger clock and the stored deploy
    /// time / period length.
    fn current_phase(env: &Env) -> Result<Phase, ContractError> {
        let deploy_time: u64 = env
            .storage()
            .instance()
            .get(&DEPLOY_TIME)
            .ok_or(ContractError::NotInitialized)?;
        let period_length: u64 = env
            .storage()
            .instance()
            .get(&PERIOD_LENGTH)
            .ok_or(ContractError::NotInitialized)?;
        Ok(phase::phase_at(
            deploy_time,
            period_length,
            env.ledger().timestamp(),
        ))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
