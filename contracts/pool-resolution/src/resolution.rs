use soroban_sdk::{Address, Env, Map, String, Vec};

use crate::admin::AdminAccessControl;
use crate::config::{
    ConfigManager, EngineConfig, MAX_CRITERIA, MAX_ORACLE_SOURCES, MAX_RETRY_ATTEMPTS,
};
use crate::consensus::{ConsensusEvaluator, Evaluation, WeightedSubmission};
use crate::errors::Error;
use crate::events::{AttemptRecordedEvent, EventEmitter, FallbackTriggeredEvent};
use crate::fees::FeeManager;
use crate::oracles::{OracleRegistry, SubmissionLedger};
use crate::storage::Storage;
use crate::types::{
    CriteriaKind, Criterion, FallbackReason, FallbackStatus, LogicalOperator, Outcome, Pool,
    PoolStatus, ResolutionAttempt, ResolutionConfig, ResolutionOutcome, Verdict, WinningOutcome,
};

// ===== POOL RESOLUTION MANAGER =====

/// Drives a pool from expiry to a final outcome.
///
/// Each call to [`PoolResolutionManager::attempt`] records exactly one
/// [`ResolutionAttempt`], including failed ones: failures are returned as
/// `ResolutionOutcome::Pending` so the audit record survives the invocation.
pub struct PoolResolutionManager;

impl PoolResolutionManager {
    #[allow(clippy::too_many_arguments)]
    pub fn configure(
        env: &Env,
        caller: &Address,
        pool_id: u64,
        oracle_source_ids: Vec<u64>,
        criteria: Vec<Criterion>,
        logical_operator: LogicalOperator,
        outcome_when_true: Outcome,
        max_retry_attempts: u32,
    ) -> Result<(), Error> {
        let pool = Storage::get_pool(env, pool_id)?;
        AdminAccessControl::require_creator_or_admin(env, caller, &pool)?;

        if pool.status != PoolStatus::Open || pool.attempt_count > 0 {
            return Err(Error::ConfigLocked);
        }
        if pool.is_expired(env.ledger().sequence()) {
            return Err(Error::PoolExpired);
        }

        let config = ResolutionConfig {
            pool_id,
            oracle_source_ids,
            criteria,
            logical_operator,
            outcome_when_true,
            max_retry_attempts,
        };
        ResolutionConfigValidator::validate(env, &config)?;
        Storage::set_resolution_config(env, &config);

        EventEmitter::emit_resolution_configured(
            env,
            pool_id,
            config.oracle_source_ids.len(),
            config.criteria.len(),
        );
        Ok(())
    }

    pub fn attempt(env: &Env, caller: &Address, pool_id: u64) -> Result<ResolutionOutcome, Error> {
        caller.require_auth();

        let mut pool = Storage::get_pool(env, pool_id)?;
        let height = env.ledger().sequence();

        match pool.status {
            PoolStatus::Settled | PoolStatus::ManuallySettled => {
                let outcome = pool
                    .winning_outcome
                    .outcome()
                    .ok_or(Error::InvalidPoolState)?;
                return Ok(ResolutionOutcome::Settled(outcome));
            }
            PoolStatus::FallbackTriggered => return Err(Error::PoolInFallback),
            PoolStatus::Reversed => return Err(Error::InvalidPoolState),
            PoolStatus::Open if !pool.is_expired(height) => return Err(Error::PoolNotExpired),
            PoolStatus::Open | PoolStatus::AwaitingResolution => {}
        }

        let resolution_config =
            Storage::get_resolution_config(env, pool_id).ok_or(Error::ResolutionNotConfigured)?;
        let config = ConfigManager::get_config(env)?;

        if let Some(last) = pool.last_attempt_height {
            if height < last.saturating_add(config.retry_cooldown_blocks) {
                return Err(Error::RetryCooldownActive);
            }
        }

        let submissions = SubmissionLedger::submissions_since(env, pool_id, pool.submission_cursor)?;
        let evaluation = ConsensusEvaluator::evaluate(env, &resolution_config, &submissions)?;

        let attempt_index = pool.attempt_count;
        pool.status = PoolStatus::AwaitingResolution;
        pool.submission_cursor = SubmissionLedger::pool_submission_count(env, pool_id);
        pool.attempt_count += 1;
        pool.last_attempt_height = Some(height);

        Self::record_attempt(env, &pool, attempt_index, &evaluation);
        Self::update_provider_reliability(env, &evaluation)?;

        let outcome = match evaluation.verdict {
            Verdict::Success(outcome) => {
                Self::settle(env, &mut pool, caller, outcome, &evaluation.used, &config)?;
                ResolutionOutcome::Settled(outcome)
            }
            Verdict::Failure(reason)
                if attempt_index + 1 >= resolution_config.max_retry_attempts =>
            {
                FallbackManager::enter(
                    env,
                    &mut pool,
                    FallbackReason::RetriesExhausted(reason),
                    true,
                    &config,
                );
                ResolutionOutcome::FallbackTriggered(reason)
            }
            Verdict::Failure(reason) => ResolutionOutcome::Pending(reason),
        };

        Storage::set_pool(env, &pool);
        Ok(outcome)
    }

    /// Overturn an automated settlement. Returns the cleared outcome, or
    /// `WinningOutcome::None` when the pool was no longer `Settled`.
    pub fn reverse(env: &Env, pool: &mut Pool, dispute_id: u64) -> WinningOutcome {
        if pool.status != PoolStatus::Settled {
            return WinningOutcome::None;
        }

        let overturned = pool.winning_outcome;
        pool.winning_outcome = WinningOutcome::None;
        pool.resolver = None;
        pool.status = PoolStatus::Reversed;
        FeeManager::refund_unclaimed(env, pool);

        if let Some(outcome) = overturned.outcome() {
            EventEmitter::emit_pool_reversed(env, pool.id, dispute_id, outcome);
        }
        overturned
    }

    fn settle(
        env: &Env,
        pool: &mut Pool,
        resolver: &Address,
        outcome: Outcome,
        used: &Vec<WeightedSubmission>,
        config: &EngineConfig,
    ) -> Result<(), Error> {
        pool.status = PoolStatus::Settled;
        pool.winning_outcome = outcome.into();
        pool.settled_at_height = Some(env.ledger().sequence());
        pool.resolver = Some(resolver.clone());

        FeeManager::collect(env, pool, config)?;
        FeeManager::distribute(env, pool, used)?;

        EventEmitter::emit_pool_settled(env, pool.id, outcome);
        Ok(())
    }

    fn record_attempt(env: &Env, pool: &Pool, attempt_index: u32, evaluation: &Evaluation) {
        let mut submission_ids_used = Vec::new(env);
        for submission in evaluation.used.iter() {
            submission_ids_used.push_back(submission.submission_id);
        }

        let attempt = ResolutionAttempt {
            pool_id: pool.id,
            attempt_index,
            attempted_at_height: env.ledger().sequence(),
            submission_ids_used,
            verdict: evaluation.verdict,
        };
        Storage::set_attempt(env, &attempt);

        EventEmitter::emit_attempt_recorded(
            env,
            &AttemptRecordedEvent {
                pool_id: pool.id,
                attempt_index,
                verdict: attempt.verdict,
                submissions_used: attempt.submission_ids_used.len(),
                height: attempt.attempted_at_height,
            },
        );
    }

    /// Reward the providers that backed a settlement, or penalize every
    /// provider considered by a failed attempt. Once per provider.
    fn update_provider_reliability(env: &Env, evaluation: &Evaluation) -> Result<(), Error> {
        let (success, contributors) = match evaluation.verdict {
            Verdict::Success(_) => (true, &evaluation.used),
            Verdict::Failure(_) => (false, &evaluation.considered),
        };

        let mut providers: Map<u64, bool> = Map::new(env);
        for submission in contributors.iter() {
            providers.set(submission.provider_id, true);
        }
        for provider_id in providers.keys().iter() {
            OracleRegistry::update_reliability(env, provider_id, success)?;
        }
        Ok(())
    }

    /// A pool is on the automated path while it has a resolution config and
    /// has not entered fallback or reversal.
    pub fn is_automated(env: &Env, pool_id: u64) -> Result<bool, Error> {
        let pool = Storage::get_pool(env, pool_id)?;
        let configured = Storage::get_resolution_config(env, pool_id).is_some();
        Ok(configured
            && matches!(
                pool.status,
                PoolStatus::Open | PoolStatus::AwaitingResolution | PoolStatus::Settled
            ))
    }
}

// ===== FALLBACK MANAGER =====

/// Privileged exit from the automated path.
pub struct FallbackManager;

impl FallbackManager {
    pub fn trigger(env: &Env, admin: &Address, pool_id: u64, reason: String) -> Result<(), Error> {
        AdminAccessControl::require_admin_auth(env, admin)?;

        let config = ConfigManager::get_config(env)?;
        if reason.len() == 0 || reason.len() > config.max_reason_length {
            return Err(Error::InvalidReason);
        }

        let mut pool = Storage::get_pool(env, pool_id)?;
        match pool.status {
            PoolStatus::AwaitingResolution => {}
            PoolStatus::Open if pool.is_expired(env.ledger().sequence()) => {}
            PoolStatus::FallbackTriggered => return Err(Error::PoolInFallback),
            _ => return Err(Error::InvalidPoolState),
        }

        Self::enter(env, &mut pool, FallbackReason::Manual(reason), false, &config);
        Storage::set_pool(env, &pool);
        Ok(())
    }

    /// Move the pool to `FallbackTriggered` and notify its creator.
    pub fn enter(
        env: &Env,
        pool: &mut Pool,
        reason: FallbackReason,
        max_retries_reached: bool,
        config: &EngineConfig,
    ) {
        let height = env.ledger().sequence();
        let eligible_at_height = height.saturating_add(config.fallback_delay_blocks);

        pool.status = PoolStatus::FallbackTriggered;
        Storage::set_fallback(
            env,
            &FallbackStatus {
                pool_id: pool.id,
                triggered_at_height: height,
                reason: reason.clone(),
                max_retries_reached,
                manual_settle_height: eligible_at_height,
                notified_creator: true,
            },
        );

        EventEmitter::emit_fallback_triggered(
            env,
            &FallbackTriggeredEvent {
                pool_id: pool.id,
                reason,
                eligible_at_height,
                creator: pool.creator.clone(),
            },
        );
    }

    /// Settle a pool that fell back, or re-settle a reversed one. No
    /// resolution fee is taken.
    pub fn manual_settle(
        env: &Env,
        admin: &Address,
        pool_id: u64,
        outcome: Outcome,
    ) -> Result<(), Error> {
        AdminAccessControl::require_admin_auth(env, admin)?;

        let mut pool = Storage::get_pool(env, pool_id)?;
        let height = env.ledger().sequence();

        match pool.status {
            PoolStatus::FallbackTriggered => {
                let fallback = Storage::get_fallback(env, pool_id).ok_or(Error::InvalidPoolState)?;
                if height < fallback.manual_settle_height {
                    return Err(Error::FallbackDelayNotElapsed);
                }
            }
            PoolStatus::Reversed => {}
            _ => return Err(Error::InvalidPoolState),
        }

        pool.status = PoolStatus::ManuallySettled;
        pool.winning_outcome = outcome.into();
        pool.settled_at_height = Some(height);
        Storage::set_pool(env, &pool);

        EventEmitter::emit_manual_settlement(env, pool_id, admin, outcome);
        Ok(())
    }

    pub fn is_in_fallback(env: &Env, pool_id: u64) -> Result<bool, Error> {
        Ok(Storage::get_pool(env, pool_id)?.status == PoolStatus::FallbackTriggered)
    }
}

// ===== RESOLUTION CONFIG VALIDATOR =====

pub struct ResolutionConfigValidator;

impl ResolutionConfigValidator {
    pub fn validate(env: &Env, config: &ResolutionConfig) -> Result<(), Error> {
        Self::validate_oracle_sources(env, &config.oracle_source_ids)?;
        Self::validate_criteria(&config.criteria)?;

        if config.max_retry_attempts == 0 || config.max_retry_attempts > MAX_RETRY_ATTEMPTS {
            return Err(Error::InvalidRetryLimit);
        }

        for criterion in config.criteria.iter() {
            let mut covered = false;
            for provider_id in config.oracle_source_ids.iter() {
                if Storage::get_provider(env, provider_id)?.supports(&criterion.data_type) {
                    covered = true;
                    break;
                }
            }
            if !covered {
                return Err(Error::DataTypeNotCovered);
            }
        }
        Ok(())
    }

    fn validate_oracle_sources(env: &Env, oracle_source_ids: &Vec<u64>) -> Result<(), Error> {
        if oracle_source_ids.is_empty() {
            return Err(Error::EmptyOracleSet);
        }
        if oracle_source_ids.len() > MAX_ORACLE_SOURCES {
            return Err(Error::UnknownOracleSource);
        }
        for (index, provider_id) in oracle_source_ids.iter().enumerate() {
            if oracle_source_ids.first_index_of(provider_id) != Some(index as u32) {
                return Err(Error::UnknownOracleSource);
            }
            Storage::get_provider(env, provider_id).map_err(|_| Error::UnknownOracleSource)?;
        }
        Ok(())
    }

    pub fn validate_criteria(criteria: &Vec<Criterion>) -> Result<(), Error> {
        if criteria.is_empty() || criteria.len() > MAX_CRITERIA {
            return Err(Error::InvalidCriteria);
        }

        for (index, criterion) in criteria.iter().enumerate() {
            if criterion.data_type.len() == 0 {
                return Err(Error::InvalidCriteria);
            }
            if let CriteriaKind::CategoricalMajority(expected) = &criterion.kind {
                if expected.len() == 0 {
                    return Err(Error::InvalidCriteria);
                }
            }
            for earlier in criteria.iter().take(index) {
                if earlier.data_type == criterion.data_type {
                    return Err(Error::DuplicateDataType);
                }
            }
        }
        Ok(())
    }
}
