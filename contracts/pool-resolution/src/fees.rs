use soroban_sdk::{contracttype, Address, Env, Map, Vec};

use crate::admin::AdminAccessControl;
use crate::config::{ConfigManager, EngineConfig, BPS_DENOMINATOR};
use crate::consensus::WeightedSubmission;
use crate::errors::Error;
use crate::escrow::TokenEscrow;
use crate::events::EventEmitter;
use crate::oracles::OracleRegistry;
use crate::storage::Storage;
use crate::types::{OracleFeeShare, Pool, PoolStatus, Verdict};

/// Fee management for automated settlements.
///
/// The resolution fee is taken out of the pool's escrowed stake when the
/// consensus evaluator settles it and is split among the providers whose
/// submissions backed the verdict. Shares stay in escrow until the dispute
/// window closes; an upheld dispute returns every unclaimed share.

// ===== FEE TYPES =====

/// Aggregated consensus weight of one provider.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProviderWeight {
    pub provider_id: u64,
    pub weight: i128,
}

// ===== FEE MANAGER =====

pub struct FeeManager;

impl FeeManager {
    /// Reserve the resolution fee on a settled pool. Idempotent.
    pub fn collect(env: &Env, pool: &mut Pool, config: &EngineConfig) -> Result<i128, Error> {
        if pool.fee_collected {
            return Ok(pool.resolution_fee);
        }
        FeeValidator::validate_collectable(pool)?;

        let fee = FeeCalculator::resolution_fee(pool.total_stake(), config.resolution_fee_bps)?;
        pool.resolution_fee = fee;
        pool.fee_collected = true;

        EventEmitter::emit_fee_collected(env, pool.id, fee);
        Ok(fee)
    }

    /// Entry point for `collect_resolution_fee`.
    pub fn collect_resolution_fee(env: &Env, pool_id: u64) -> Result<i128, Error> {
        let mut pool = Storage::get_pool(env, pool_id)?;
        if pool.fee_collected {
            return Ok(pool.resolution_fee);
        }

        let config = ConfigManager::get_config(env)?;
        let fee = Self::collect(env, &mut pool, &config)?;
        Storage::set_pool(env, &pool);
        Ok(fee)
    }

    /// Split the collected fee among the providers behind `used`.
    ///
    /// Leaves the pool undistributed when the submissions carry no weight, so
    /// the admin can split it later with `distribute_oracle_fees`.
    pub fn distribute(
        env: &Env,
        pool: &mut Pool,
        used: &Vec<WeightedSubmission>,
    ) -> Result<i128, Error> {
        let mut weights: Map<u64, i128> = Map::new(env);
        for submission in used.iter() {
            let current = weights.get(submission.provider_id).unwrap_or(0);
            weights.set(submission.provider_id, current + submission.weight);
        }
        Self::assign_shares(env, pool, &FeeCalculator::provider_weights(env, &weights))
    }

    /// Admin re-split of a collected fee that was not distributed at
    /// settlement.
    pub fn distribute_oracle_fees(
        env: &Env,
        admin: &Address,
        pool_id: u64,
        oracle_ids: Vec<u64>,
    ) -> Result<i128, Error> {
        AdminAccessControl::require_admin_auth(env, admin)?;

        let mut pool = Storage::get_pool(env, pool_id)?;
        if pool.status != PoolStatus::Settled {
            return Err(Error::InvalidPoolState);
        }
        if !pool.fee_collected {
            return Err(Error::FeeNotCollected);
        }
        if pool.fees_distributed {
            return Err(Error::FeesAlreadyDistributed);
        }
        if oracle_ids.is_empty() {
            return Err(Error::EmptyOracleSet);
        }

        let weights = Self::weights_from_last_attempt(env, &pool, &oracle_ids)?;
        let distributed = Self::assign_shares(env, &mut pool, &weights)?;
        Storage::set_pool(env, &pool);
        Ok(distributed)
    }

    /// Pay the caller's share once the pool can no longer be disputed.
    pub fn claim(env: &Env, oracle: &Address, pool_id: u64) -> Result<i128, Error> {
        oracle.require_auth();

        let pool = Storage::get_pool(env, pool_id)?;
        let config = ConfigManager::get_config(env)?;
        FeeValidator::validate_claimable(&pool, &config, env.ledger().sequence())?;

        let provider = OracleRegistry::get_by_address(env, oracle)?;
        let mut share =
            Storage::get_fee_share(env, pool_id, provider.id).ok_or(Error::NothingToClaim)?;
        if share.claimed {
            return Err(Error::AlreadyClaimed);
        }
        if share.amount <= 0 {
            return Err(Error::NothingToClaim);
        }

        share.claimed = true;
        Storage::set_fee_share(env, &share);
        TokenEscrow::release(env, oracle, share.amount)?;

        EventEmitter::emit_fee_claimed(env, pool_id, provider.id, share.amount);
        Ok(share.amount)
    }

    /// Return every unclaimed share to the pool escrow and clear the fee.
    pub fn refund_unclaimed(env: &Env, pool: &mut Pool) -> i128 {
        if !pool.fee_collected {
            return 0;
        }

        let mut refunded: i128 = 0;
        for provider_id in Storage::get_fee_recipients(env, pool.id).iter() {
            if let Some(mut share) = Storage::get_fee_share(env, pool.id, provider_id) {
                if !share.claimed && share.amount > 0 {
                    refunded += share.amount;
                    share.amount = 0;
                    Storage::set_fee_share(env, &share);
                }
            }
        }
        if !pool.fees_distributed {
            refunded = pool.resolution_fee;
        }

        pool.resolution_fee -= refunded;
        pool.fee_collected = false;

        EventEmitter::emit_fee_refunded(env, pool.id, refunded);
        refunded
    }

    fn assign_shares(
        env: &Env,
        pool: &mut Pool,
        weights: &Vec<ProviderWeight>,
    ) -> Result<i128, Error> {
        let shares = FeeCalculator::split(env, pool.resolution_fee, weights)?;
        if shares.is_empty() {
            return Ok(0);
        }

        let mut recipients = Vec::new(env);
        let mut distributed: i128 = 0;
        for (provider_id, amount) in shares.iter() {
            Storage::set_fee_share(
                env,
                &OracleFeeShare {
                    pool_id: pool.id,
                    provider_id,
                    amount,
                    claimed: false,
                },
            );
            recipients.push_back(provider_id);
            distributed += amount;
            EventEmitter::emit_fee_share_assigned(env, pool.id, provider_id, amount);
        }

        Storage::set_fee_recipients(env, pool.id, &recipients);
        pool.fees_distributed = true;
        Ok(distributed)
    }

    /// Weights of `oracle_ids` among the submissions backing the successful
    /// attempt. Falls back to an equal split when none of them carries weight.
    fn weights_from_last_attempt(
        env: &Env,
        pool: &Pool,
        oracle_ids: &Vec<u64>,
    ) -> Result<Vec<ProviderWeight>, Error> {
        let mut weights: Map<u64, i128> = Map::new(env);
        for provider_id in oracle_ids.iter() {
            Storage::get_provider(env, provider_id)?;
            weights.set(provider_id, 0);
        }

        if pool.attempt_count > 0 {
            let attempt = Storage::get_attempt(env, pool.id, pool.attempt_count - 1)?;
            if let Verdict::Success(_) = attempt.verdict {
                for submission_id in attempt.submission_ids_used.iter() {
                    let submission = Storage::get_submission(env, submission_id)?;
                    if let Some(current) = weights.get(submission.provider_id) {
                        let provider = Storage::get_provider(env, submission.provider_id)?;
                        let weight = (submission.confidence as i128)
                            * (provider.reliability_score as i128);
                        weights.set(submission.provider_id, current + weight);
                    }
                }
            }
        }

        let total: i128 = weights.values().iter().sum();
        if total == 0 {
            for provider_id in oracle_ids.iter() {
                weights.set(provider_id, 1);
            }
        }
        Ok(FeeCalculator::provider_weights(env, &weights))
    }
}

// ===== FEE CALCULATOR =====

pub struct FeeCalculator;

impl FeeCalculator {
    /// `total_stake x fee_bps / 10_000`, rounded down.
    pub fn resolution_fee(total_stake: i128, fee_bps: u32) -> Result<i128, Error> {
        total_stake
            .checked_mul(fee_bps as i128)
            .map(|scaled| scaled / BPS_DENOMINATOR)
            .ok_or(Error::ArithmeticOverflow)
    }

    /// Provider weights in ascending provider id order.
    pub fn provider_weights(env: &Env, weights: &Map<u64, i128>) -> Vec<ProviderWeight> {
        let mut result = Vec::new(env);
        for (provider_id, weight) in weights.iter() {
            result.push_back(ProviderWeight { provider_id, weight });
        }
        result
    }

    /// Proportional split of `fee`. Rounding dust goes to the last provider.
    /// Returns no shares when the total weight is zero.
    pub fn split(
        env: &Env,
        fee: i128,
        weights: &Vec<ProviderWeight>,
    ) -> Result<Vec<(u64, i128)>, Error> {
        let mut shares = Vec::new(env);
        let total_weight: i128 = weights.iter().map(|w| w.weight.max(0)).sum();
        if fee <= 0 || total_weight <= 0 {
            return Ok(shares);
        }

        let mut assigned: i128 = 0;
        let last = weights.len() - 1;
        for (index, entry) in weights.iter().enumerate() {
            let amount = if index as u32 == last {
                fee - assigned
            } else {
                fee.checked_mul(entry.weight.max(0))
                    .ok_or(Error::ArithmeticOverflow)?
                    / total_weight
            };
            assigned += amount;
            shares.push_back((entry.provider_id, amount));
        }
        Ok(shares)
    }
}

// ===== FEE VALIDATOR =====

pub struct FeeValidator;

impl FeeValidator {
    pub fn validate_collectable(pool: &Pool) -> Result<(), Error> {
        if pool.status != PoolStatus::Settled {
            return Err(Error::InvalidPoolState);
        }
        Ok(())
    }

    /// Shares unlock once the dispute window closed with no dispute pending.
    pub fn validate_claimable(pool: &Pool, config: &EngineConfig, height: u32) -> Result<(), Error> {
        if pool.status != PoolStatus::Settled {
            return Err(Error::ClaimNotAvailable);
        }
        let settled_at = pool.settled_at_height.ok_or(Error::ClaimNotAvailable)?;
        if height < settled_at.saturating_add(config.dispute_window_blocks) {
            return Err(Error::ClaimNotAvailable);
        }
        if pool.active_disputes > 0 {
            return Err(Error::ClaimNotAvailable);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WinningOutcome;
    use soroban_sdk::testutils::Address as _;
    use soroban_sdk::{vec, String};

    fn weights(env: &Env, entries: &[(u64, i128)]) -> Vec<ProviderWeight> {
        let mut result = Vec::new(env);
        for (provider_id, weight) in entries {
            result.push_back(ProviderWeight {
                provider_id: *provider_id,
                weight: *weight,
            });
        }
        result
    }

    fn settled_pool(env: &Env, settled_at: u32) -> Pool {
        let mut pool = Pool::new(
            1,
            Address::generate(env),
            String::from_str(env, "yes"),
            String::from_str(env, "no"),
            10,
        );
        pool.status = PoolStatus::Settled;
        pool.winning_outcome = WinningOutcome::A;
        pool.settled_at_height = Some(settled_at);
        pool
    }

    #[test]
    fn test_resolution_fee_in_basis_points() {
        assert_eq!(FeeCalculator::resolution_fee(1_000_000, 200), Ok(20_000));
        assert_eq!(FeeCalculator::resolution_fee(99, 200), Ok(1));
        assert_eq!(FeeCalculator::resolution_fee(0, 200), Ok(0));
        assert_eq!(
            FeeCalculator::resolution_fee(i128::MAX, 200),
            Err(Error::ArithmeticOverflow)
        );
    }

    #[test]
    fn test_split_is_proportional_with_dust_to_last() {
        let env = Env::default();
        let shares = FeeCalculator::split(&env, 100, &weights(&env, &[(1, 1), (2, 1), (3, 1)]))
            .unwrap();

        assert_eq!(shares, vec![&env, (1u64, 33i128), (2u64, 33i128), (3u64, 34i128)]);
    }

    #[test]
    fn test_split_by_confidence_times_reliability() {
        let env = Env::default();
        let shares =
            FeeCalculator::split(&env, 1_000, &weights(&env, &[(1, 9_000), (2, 1_000)])).unwrap();

        assert_eq!(shares, vec![&env, (1u64, 900i128), (2u64, 100i128)]);
    }

    #[test]
    fn test_split_without_weight_assigns_nothing() {
        let env = Env::default();
        assert!(FeeCalculator::split(&env, 100, &weights(&env, &[(1, 0)]))
            .unwrap()
            .is_empty());
        assert!(FeeCalculator::split(&env, 0, &weights(&env, &[(1, 5)]))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_claim_gated_by_dispute_window() {
        let env = Env::default();
        let config =
            ConfigManager::default_config(Address::generate(&env), Address::generate(&env));
        let mut pool = settled_pool(&env, 100);
        let open_until = 100 + config.dispute_window_blocks;

        assert_eq!(
            FeeValidator::validate_claimable(&pool, &config, open_until - 1),
            Err(Error::ClaimNotAvailable)
        );
        assert!(FeeValidator::validate_claimable(&pool, &config, open_until).is_ok());

        pool.active_disputes = 1;
        assert_eq!(
            FeeValidator::validate_claimable(&pool, &config, open_until),
            Err(Error::ClaimNotAvailable)
        );

        pool.active_disputes = 0;
        pool.status = PoolStatus::Reversed;
        assert_eq!(
            FeeValidator::validate_claimable(&pool, &config, open_until),
            Err(Error::ClaimNotAvailable)
        );
    }
}
