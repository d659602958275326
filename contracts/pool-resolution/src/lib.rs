#![no_std]

use soroban_sdk::{contract, contractimpl, Address, BytesN, Env, String, Vec};

pub mod admin;
pub mod config;
pub mod consensus;
pub mod disputes;
pub mod errors;
pub mod escrow;
pub mod events;
pub mod fees;
pub mod oracles;
pub mod pools;
pub mod queries;
pub mod resolution;
pub mod storage;
pub mod types;
pub mod voting;

use crate::admin::AdminAccessControl;
use crate::config::{ConfigManager, EngineConfig};
use crate::disputes::DisputeManager;
use crate::errors::Error;
use crate::fees::FeeManager;
use crate::oracles::{OracleRegistry, SubmissionLedger};
use crate::pools::PoolManager;
use crate::queries::QueryManager;
use crate::resolution::{FallbackManager, PoolResolutionManager};
use crate::storage::Storage;
use crate::types::{
    Criterion, Dispute, DisputeVote, FallbackStatus, LogicalOperator, OracleFeeShare,
    OracleProvider, OracleSubmission, OracleValue, Outcome, Pool, ResolutionAttempt,
    ResolutionConfig, ResolutionOutcome, VoteChoice,
};
use crate::voting::VotingManager;

#[contract]
pub struct PoolResolution;

#[contractimpl]
impl PoolResolution {
    // ===== ADMINISTRATION =====

    pub fn initialize(
        env: Env,
        admin: Address,
        token: Address,
        treasury: Address,
    ) -> Result<(), Error> {
        AdminAccessControl::initialize(&env, &admin, &token, &treasury)
    }

    pub fn update_config(env: Env, admin: Address, config: EngineConfig) -> Result<(), Error> {
        AdminAccessControl::update_config(&env, &admin, &config)
    }

    pub fn get_config(env: Env) -> Result<EngineConfig, Error> {
        ConfigManager::get_config(&env)
    }

    // ===== POOLS =====

    pub fn create_pool(
        env: Env,
        creator: Address,
        outcome_a_name: String,
        outcome_b_name: String,
        expiry_height: u32,
    ) -> Result<u64, Error> {
        PoolManager::create_pool(&env, &creator, outcome_a_name, outcome_b_name, expiry_height)
    }

    pub fn stake(
        env: Env,
        staker: Address,
        pool_id: u64,
        outcome: Outcome,
        amount: i128,
    ) -> Result<(), Error> {
        PoolManager::stake(&env, &staker, pool_id, outcome, amount)
    }

    // ===== ORACLES =====

    pub fn register_oracle_provider(
        env: Env,
        admin: Address,
        address: Address,
        data_types: Vec<String>,
    ) -> Result<u64, Error> {
        OracleRegistry::register_provider(&env, &admin, &address, data_types)
    }

    pub fn set_provider_active(
        env: Env,
        admin: Address,
        provider_id: u64,
        active: bool,
    ) -> Result<(), Error> {
        OracleRegistry::set_active(&env, &admin, provider_id, active)
    }

    pub fn submit_oracle_data(
        env: Env,
        oracle: Address,
        pool_id: u64,
        data_type: String,
        value: OracleValue,
        confidence: u32,
    ) -> Result<u64, Error> {
        SubmissionLedger::submit(&env, &oracle, pool_id, data_type, value, confidence)
    }

    // ===== RESOLUTION =====

    #[allow(clippy::too_many_arguments)]
    pub fn configure_pool_resolution(
        env: Env,
        caller: Address,
        pool_id: u64,
        oracle_ids: Vec<u64>,
        criteria: Vec<Criterion>,
        operator: LogicalOperator,
        outcome_when_true: Outcome,
        max_retries: u32,
    ) -> Result<(), Error> {
        PoolResolutionManager::configure(
            &env,
            &caller,
            pool_id,
            oracle_ids,
            criteria,
            operator,
            outcome_when_true,
            max_retries,
        )
    }

    /// Run one evaluation pass. Failed evaluations are reported as
    /// `Pending` or `FallbackTriggered`, not as errors.
    pub fn attempt_automated_resolution(
        env: Env,
        caller: Address,
        pool_id: u64,
    ) -> Result<ResolutionOutcome, Error> {
        PoolResolutionManager::attempt(&env, &caller, pool_id)
    }

    pub fn trigger_fallback_resolution(
        env: Env,
        admin: Address,
        pool_id: u64,
        reason: String,
    ) -> Result<(), Error> {
        FallbackManager::trigger(&env, &admin, pool_id, reason)
    }

    pub fn manual_settle_fallback(
        env: Env,
        admin: Address,
        pool_id: u64,
        outcome: Outcome,
    ) -> Result<(), Error> {
        FallbackManager::manual_settle(&env, &admin, pool_id, outcome)
    }

    // ===== DISPUTES =====

    pub fn create_dispute(
        env: Env,
        disputer: Address,
        pool_id: u64,
        reason: String,
        evidence_hash: Option<BytesN<32>>,
    ) -> Result<u64, Error> {
        DisputeManager::create(&env, &disputer, pool_id, reason, evidence_hash)
    }

    pub fn vote_on_dispute(
        env: Env,
        voter: Address,
        dispute_id: u64,
        choice: VoteChoice,
    ) -> Result<u64, Error> {
        VotingManager::cast_vote(&env, &voter, dispute_id, choice)
    }

    pub fn resolve_dispute(env: Env, dispute_id: u64) -> Result<bool, Error> {
        DisputeManager::resolve(&env, dispute_id)
    }

    // ===== FEES =====

    pub fn collect_resolution_fee(env: Env, pool_id: u64) -> Result<i128, Error> {
        FeeManager::collect_resolution_fee(&env, pool_id)
    }

    pub fn distribute_oracle_fees(
        env: Env,
        admin: Address,
        pool_id: u64,
        oracle_ids: Vec<u64>,
    ) -> Result<i128, Error> {
        FeeManager::distribute_oracle_fees(&env, &admin, pool_id, oracle_ids)
    }

    pub fn claim_oracle_fee(env: Env, oracle: Address, pool_id: u64) -> Result<i128, Error> {
        FeeManager::claim(&env, &oracle, pool_id)
    }

    // ===== QUERIES =====

    pub fn get_pool(env: Env, pool_id: u64) -> Result<Pool, Error> {
        Storage::get_pool(&env, pool_id)
    }

    pub fn get_provider(env: Env, provider_id: u64) -> Result<OracleProvider, Error> {
        Storage::get_provider(&env, provider_id)
    }

    pub fn get_provider_by_address(env: Env, address: Address) -> Result<OracleProvider, Error> {
        QueryManager::provider_by_address(&env, &address)
    }

    pub fn get_submission(env: Env, submission_id: u64) -> Result<OracleSubmission, Error> {
        Storage::get_submission(&env, submission_id)
    }

    pub fn get_pool_submissions(env: Env, pool_id: u64) -> Result<Vec<OracleSubmission>, Error> {
        QueryManager::pool_submissions(&env, pool_id)
    }

    pub fn get_resolution_config(env: Env, pool_id: u64) -> Option<ResolutionConfig> {
        Storage::get_resolution_config(&env, pool_id)
    }

    pub fn get_attempt(
        env: Env,
        pool_id: u64,
        attempt_index: u32,
    ) -> Result<ResolutionAttempt, Error> {
        Storage::get_attempt(&env, pool_id, attempt_index)
    }

    pub fn get_attempts(env: Env, pool_id: u64) -> Result<Vec<ResolutionAttempt>, Error> {
        QueryManager::attempts(&env, pool_id)
    }

    pub fn get_fallback_status(env: Env, pool_id: u64) -> Option<FallbackStatus> {
        Storage::get_fallback(&env, pool_id)
    }

    pub fn get_dispute(env: Env, dispute_id: u64) -> Result<Dispute, Error> {
        Storage::get_dispute(&env, dispute_id)
    }

    pub fn get_pool_disputes(env: Env, pool_id: u64) -> Result<Vec<Dispute>, Error> {
        QueryManager::pool_disputes(&env, pool_id)
    }

    pub fn get_dispute_vote(env: Env, dispute_id: u64, voter: Address) -> Option<DisputeVote> {
        Storage::get_vote(&env, dispute_id, &voter)
    }

    pub fn get_oracle_fee_share(
        env: Env,
        pool_id: u64,
        provider_id: u64,
    ) -> Option<OracleFeeShare> {
        Storage::get_fee_share(&env, pool_id, provider_id)
    }

    pub fn get_pool_count(env: Env) -> u64 {
        Storage::pool_count(&env)
    }

    pub fn get_provider_count(env: Env) -> u64 {
        Storage::provider_count(&env)
    }

    pub fn get_submission_count(env: Env) -> u64 {
        Storage::submission_count(&env)
    }

    pub fn get_dispute_count(env: Env) -> u64 {
        Storage::dispute_count(&env)
    }

    pub fn is_pool_automated(env: Env, pool_id: u64) -> Result<bool, Error> {
        PoolResolutionManager::is_automated(&env, pool_id)
    }

    pub fn is_pool_in_fallback(env: Env, pool_id: u64) -> Result<bool, Error> {
        FallbackManager::is_in_fallback(&env, pool_id)
    }
}

#[cfg(test)]
extern crate std;
