use soroban_sdk::{Address, Env, String};

use crate::config::MAX_OUTCOME_NAME_LENGTH;
use crate::errors::Error;
use crate::escrow::TokenEscrow;
use crate::events::EventEmitter;
use crate::storage::Storage;
use crate::types::{Outcome, Pool, PoolStatus};

// ===== POOL MANAGER =====

/// Pool creation and stake escrow. Payouts are out of scope; stakes only feed
/// the fee and bond calculations.
pub struct PoolManager;

impl PoolManager {
    pub fn create_pool(
        env: &Env,
        creator: &Address,
        outcome_a_name: String,
        outcome_b_name: String,
        expiry_height: u32,
    ) -> Result<u64, Error> {
        creator.require_auth();
        PoolValidator::validate_outcome_name(&outcome_a_name)?;
        PoolValidator::validate_outcome_name(&outcome_b_name)?;
        if expiry_height <= env.ledger().sequence() {
            return Err(Error::InvalidExpiry);
        }

        let pool_id = Storage::next_pool_id(env);
        let pool = Pool::new(
            pool_id,
            creator.clone(),
            outcome_a_name,
            outcome_b_name,
            expiry_height,
        );
        Storage::set_pool(env, &pool);

        EventEmitter::emit_pool_created(env, pool_id, creator, expiry_height);
        Ok(pool_id)
    }

    pub fn stake(
        env: &Env,
        staker: &Address,
        pool_id: u64,
        outcome: Outcome,
        amount: i128,
    ) -> Result<(), Error> {
        staker.require_auth();

        let mut pool = Storage::get_pool(env, pool_id)?;
        if pool.status != PoolStatus::Open {
            return Err(Error::InvalidPoolState);
        }
        if pool.is_expired(env.ledger().sequence()) {
            return Err(Error::PoolExpired);
        }
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        TokenEscrow::hold(env, staker, amount)?;
        match outcome {
            Outcome::A => {
                pool.total_stake_a = pool
                    .total_stake_a
                    .checked_add(amount)
                    .ok_or(Error::ArithmeticOverflow)?
            }
            Outcome::B => {
                pool.total_stake_b = pool
                    .total_stake_b
                    .checked_add(amount)
                    .ok_or(Error::ArithmeticOverflow)?
            }
        }
        Storage::set_pool(env, &pool);

        EventEmitter::emit_stake(env, pool_id, staker, outcome, amount);
        Ok(())
    }
}

// ===== POOL VALIDATOR =====

pub struct PoolValidator;

impl PoolValidator {
    pub fn validate_outcome_name(name: &String) -> Result<(), Error> {
        if name.len() == 0 || name.len() > MAX_OUTCOME_NAME_LENGTH {
            return Err(Error::InvalidOutcomeName);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_name_bounds() {
        let env = Env::default();
        assert!(PoolValidator::validate_outcome_name(&String::from_str(&env, "yes")).is_ok());
        assert_eq!(
            PoolValidator::validate_outcome_name(&String::from_str(&env, "")),
            Err(Error::InvalidOutcomeName)
        );

        let long = [b'x'; 101];
        assert_eq!(
            PoolValidator::validate_outcome_name(&String::from_bytes(&env, &long)),
            Err(Error::InvalidOutcomeName)
        );
    }
}
