use soroban_sdk::{Address, Env, String, Vec};

use crate::admin::AdminAccessControl;
use crate::config::{
    INITIAL_RELIABILITY, MAX_CONFIDENCE, MAX_DATA_TYPES_PER_PROVIDER, MAX_SUBMISSIONS_PER_POOL,
    MAX_SUBMISSIONS_PER_PROVIDER, RELIABILITY_PENALTY, RELIABILITY_RECOVERY_DIVISOR,
};
use crate::errors::Error;
use crate::events::EventEmitter;
use crate::storage::Storage;
use crate::types::{OracleProvider, OracleSubmission, OracleValue};

// ===== ORACLE REGISTRY =====

/// Registry of oracle providers.
///
/// Providers are registered by the admin, identified by a monotonic id and
/// looked up by address when they submit data.
pub struct OracleRegistry;

impl OracleRegistry {
    pub fn register_provider(
        env: &Env,
        admin: &Address,
        address: &Address,
        data_types: Vec<String>,
    ) -> Result<u64, Error> {
        AdminAccessControl::require_admin_auth(env, admin)?;
        OracleValidator::validate_data_types(&data_types)?;

        if Storage::get_provider_id(env, address).is_some() {
            return Err(Error::ProviderAlreadyRegistered);
        }

        let provider_id = Storage::next_provider_id(env);
        let provider = OracleProvider {
            id: provider_id,
            address: address.clone(),
            reliability_score: INITIAL_RELIABILITY,
            total_resolutions: 0,
            successful_resolutions: 0,
            is_active: true,
            supported_data_types: data_types,
            registered_at_height: env.ledger().sequence(),
        };

        Storage::set_provider(env, &provider);
        Storage::set_provider_id(env, address, provider_id);

        EventEmitter::emit_provider_registered(env, provider_id, address);
        Ok(provider_id)
    }

    pub fn set_active(
        env: &Env,
        admin: &Address,
        provider_id: u64,
        active: bool,
    ) -> Result<(), Error> {
        AdminAccessControl::require_admin_auth(env, admin)?;

        let mut provider = Storage::get_provider(env, provider_id)?;
        if provider.is_active != active {
            provider.is_active = active;
            Storage::set_provider(env, &provider);
            EventEmitter::emit_provider_status(env, provider_id, active);
        }
        Ok(())
    }

    pub fn get_by_address(env: &Env, address: &Address) -> Result<OracleProvider, Error> {
        let provider_id = Storage::get_provider_id(env, address).ok_or(Error::ProviderNotFound)?;
        Storage::get_provider(env, provider_id)
    }

    /// Record the outcome of an attempt the provider contributed to.
    pub fn update_reliability(env: &Env, provider_id: u64, success: bool) -> Result<u32, Error> {
        let mut provider = Storage::get_provider(env, provider_id)?;
        let previous = provider.reliability_score;

        provider.reliability_score = ReliabilityPolicy::next_score(previous, success);
        provider.total_resolutions += 1;
        if success {
            provider.successful_resolutions += 1;
        }
        Storage::set_provider(env, &provider);

        EventEmitter::emit_reliability_updated(env, provider_id, previous, provider.reliability_score);
        Ok(provider.reliability_score)
    }
}

// ===== RELIABILITY POLICY =====

pub struct ReliabilityPolicy;

impl ReliabilityPolicy {
    /// Success recovers a tenth of the distance to 100 (at least one point);
    /// failure costs a flat penalty. The result stays within [0, 100].
    pub fn next_score(score: u32, success: bool) -> u32 {
        let score = score.min(MAX_CONFIDENCE);
        if success {
            let gap = MAX_CONFIDENCE - score;
            if gap == 0 {
                return score;
            }
            score + (gap / RELIABILITY_RECOVERY_DIVISOR).max(1)
        } else {
            score.saturating_sub(RELIABILITY_PENALTY)
        }
    }
}

// ===== SUBMISSION LEDGER =====

/// Append-only per-pool record of oracle submissions.
///
/// Once a pool has a resolution config only its oracle sources may submit.
/// Each provider is capped per pool so no single provider can exhaust the
/// pool's submission cap.
pub struct SubmissionLedger;

impl SubmissionLedger {
    pub fn submit(
        env: &Env,
        oracle: &Address,
        pool_id: u64,
        data_type: String,
        value: OracleValue,
        confidence: u32,
    ) -> Result<u64, Error> {
        oracle.require_auth();

        let pool = Storage::get_pool(env, pool_id)?;
        if !pool.status.accepts_submissions() {
            return Err(Error::InvalidPoolState);
        }

        let provider = OracleRegistry::get_by_address(env, oracle)?;
        if !provider.is_active {
            return Err(Error::ProviderInactive);
        }
        if !provider.supports(&data_type) {
            return Err(Error::UnsupportedDataType);
        }
        if confidence > MAX_CONFIDENCE {
            return Err(Error::InvalidConfidence);
        }
        if let Some(config) = Storage::get_resolution_config(env, pool_id) {
            if !config.oracle_source_ids.contains(provider.id) {
                return Err(Error::NotOracleSource);
            }
        }

        let provider_count = Storage::get_provider_submission_count(env, pool_id, provider.id);
        let mut pool_submissions = Storage::get_pool_submissions(env, pool_id);
        if provider_count >= MAX_SUBMISSIONS_PER_PROVIDER
            || pool_submissions.len() >= MAX_SUBMISSIONS_PER_POOL
        {
            return Err(Error::SubmissionLimitReached);
        }

        let submission_id = Storage::next_submission_id(env);
        let submission = OracleSubmission {
            id: submission_id,
            provider_id: provider.id,
            pool_id,
            data_type,
            value,
            confidence,
            submitted_at_height: env.ledger().sequence(),
        };
        Storage::set_submission(env, &submission);

        pool_submissions.push_back(submission_id);
        Storage::set_pool_submissions(env, pool_id, &pool_submissions);
        Storage::set_provider_submission_count(env, pool_id, provider.id, provider_count + 1);

        EventEmitter::emit_data_submitted(env, pool_id, submission_id, provider.id);
        Ok(submission_id)
    }

    /// Submissions appended after `cursor` in the pool's submission list.
    pub fn submissions_since(
        env: &Env,
        pool_id: u64,
        cursor: u32,
    ) -> Result<Vec<OracleSubmission>, Error> {
        let ids = Storage::get_pool_submissions(env, pool_id);
        let mut submissions = Vec::new(env);
        for index in cursor..ids.len() {
            if let Some(id) = ids.get(index) {
                submissions.push_back(Storage::get_submission(env, id)?);
            }
        }
        Ok(submissions)
    }

    pub fn pool_submission_count(env: &Env, pool_id: u64) -> u32 {
        Storage::get_pool_submissions(env, pool_id).len()
    }
}

// ===== ORACLE VALIDATOR =====

pub struct OracleValidator;

impl OracleValidator {
    pub fn validate_data_types(data_types: &Vec<String>) -> Result<(), Error> {
        if data_types.is_empty() || data_types.len() > MAX_DATA_TYPES_PER_PROVIDER {
            return Err(Error::InvalidDataTypes);
        }
        for (index, data_type) in data_types.iter().enumerate() {
            if data_type.len() == 0 {
                return Err(Error::InvalidDataTypes);
            }
            if data_types.first_index_of(&data_type) != Some(index as u32) {
                return Err(Error::InvalidDataTypes);
            }
        }
        Ok(())
    }
}
