use soroban_sdk::{contracttype, Address, Env, IntoVal, TryFromVal, Val, Vec};

use crate::config::{BUMP_AMOUNT, BUMP_THRESHOLD};
use crate::errors::Error;
use crate::types::{
    Dispute, DisputeVote, FallbackStatus, OracleFeeShare, OracleProvider, OracleSubmission, Pool,
    ResolutionAttempt, ResolutionConfig,
};

/// Storage keys. Every table is keyed by a monotonic integer id; relations are
/// stored as id lists (`PoolSubmissions`, `PoolDisputes`, ...).
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    Config,
    PoolCount,
    Pool(u64),
    ProviderCount,
    Provider(u64),
    ProviderByAddress(Address),
    SubmissionCount,
    Submission(u64),
    PoolSubmissions(u64),
    ProviderSubmissionCount(u64, u64),
    ResolutionConfig(u64),
    Attempt(u64, u32),
    Fallback(u64),
    DisputeCount,
    Dispute(u64),
    PoolDisputes(u64),
    Vote(u64, Address),
    FeeShare(u64, u64),
    FeeRecipients(u64),
}

/// Typed accessors over persistent storage.
///
/// Every write bumps the entry's TTL so that pool history outlives the
/// default archival period.
pub struct Storage;

impl Storage {
    fn get<V>(env: &Env, key: &DataKey) -> Option<V>
    where
        V: TryFromVal<Env, Val>,
    {
        env.storage().persistent().get(key)
    }

    fn set<V>(env: &Env, key: &DataKey, value: &V)
    where
        V: IntoVal<Env, Val>,
    {
        env.storage().persistent().set(key, value);
        env.storage()
            .persistent()
            .extend_ttl(key, BUMP_THRESHOLD, BUMP_AMOUNT);
    }

    /// Increment a counter and return the new value; ids start at 1.
    fn next_id(env: &Env, counter: DataKey) -> u64 {
        let next = Self::count(env, counter.clone()) + 1;
        env.storage().instance().set(&counter, &next);
        env.storage()
            .instance()
            .extend_ttl(BUMP_THRESHOLD, BUMP_AMOUNT);
        next
    }

    fn count(env: &Env, counter: DataKey) -> u64 {
        env.storage().instance().get(&counter).unwrap_or(0)
    }

    // ===== ADMIN =====

    pub fn get_admin(env: &Env) -> Option<Address> {
        env.storage().instance().get(&DataKey::Admin)
    }

    pub fn set_admin(env: &Env, admin: &Address) {
        env.storage().instance().set(&DataKey::Admin, admin);
    }

    // ===== POOLS =====

    pub fn next_pool_id(env: &Env) -> u64 {
        Self::next_id(env, DataKey::PoolCount)
    }

    pub fn pool_count(env: &Env) -> u64 {
        Self::count(env, DataKey::PoolCount)
    }

    pub fn get_pool(env: &Env, pool_id: u64) -> Result<Pool, Error> {
        Self::get(env, &DataKey::Pool(pool_id)).ok_or(Error::PoolNotFound)
    }

    pub fn set_pool(env: &Env, pool: &Pool) {
        Self::set(env, &DataKey::Pool(pool.id), pool);
    }

    // ===== PROVIDERS =====

    pub fn next_provider_id(env: &Env) -> u64 {
        Self::next_id(env, DataKey::ProviderCount)
    }

    pub fn provider_count(env: &Env) -> u64 {
        Self::count(env, DataKey::ProviderCount)
    }

    pub fn get_provider(env: &Env, provider_id: u64) -> Result<OracleProvider, Error> {
        Self::get(env, &DataKey::Provider(provider_id)).ok_or(Error::ProviderNotFound)
    }

    pub fn set_provider(env: &Env, provider: &OracleProvider) {
        Self::set(env, &DataKey::Provider(provider.id), provider);
    }

    pub fn get_provider_id(env: &Env, address: &Address) -> Option<u64> {
        Self::get(env, &DataKey::ProviderByAddress(address.clone()))
    }

    pub fn set_provider_id(env: &Env, address: &Address, provider_id: u64) {
        Self::set(env, &DataKey::ProviderByAddress(address.clone()), &provider_id);
    }

    // ===== SUBMISSIONS =====

    pub fn next_submission_id(env: &Env) -> u64 {
        Self::next_id(env, DataKey::SubmissionCount)
    }

    pub fn submission_count(env: &Env) -> u64 {
        Self::count(env, DataKey::SubmissionCount)
    }

    pub fn get_submission(env: &Env, submission_id: u64) -> Result<OracleSubmission, Error> {
        Self::get(env, &DataKey::Submission(submission_id)).ok_or(Error::SubmissionNotFound)
    }

    pub fn set_submission(env: &Env, submission: &OracleSubmission) {
        Self::set(env, &DataKey::Submission(submission.id), submission);
    }

    pub fn get_pool_submissions(env: &Env, pool_id: u64) -> Vec<u64> {
        Self::get(env, &DataKey::PoolSubmissions(pool_id)).unwrap_or(Vec::new(env))
    }

    pub fn set_pool_submissions(env: &Env, pool_id: u64, ids: &Vec<u64>) {
        Self::set(env, &DataKey::PoolSubmissions(pool_id), ids);
    }

    pub fn get_provider_submission_count(env: &Env, pool_id: u64, provider_id: u64) -> u32 {
        Self::get(env, &DataKey::ProviderSubmissionCount(pool_id, provider_id)).unwrap_or(0)
    }

    pub fn set_provider_submission_count(env: &Env, pool_id: u64, provider_id: u64, count: u32) {
        Self::set(env, &DataKey::ProviderSubmissionCount(pool_id, provider_id), &count);
    }

    // ===== RESOLUTION =====

    pub fn get_resolution_config(env: &Env, pool_id: u64) -> Option<ResolutionConfig> {
        Self::get(env, &DataKey::ResolutionConfig(pool_id))
    }

    pub fn set_resolution_config(env: &Env, config: &ResolutionConfig) {
        Self::set(env, &DataKey::ResolutionConfig(config.pool_id), config);
    }

    pub fn get_attempt(env: &Env, pool_id: u64, index: u32) -> Result<ResolutionAttempt, Error> {
        Self::get(env, &DataKey::Attempt(pool_id, index)).ok_or(Error::AttemptNotFound)
    }

    pub fn set_attempt(env: &Env, attempt: &ResolutionAttempt) {
        Self::set(
            env,
            &DataKey::Attempt(attempt.pool_id, attempt.attempt_index),
            attempt,
        );
    }

    pub fn get_fallback(env: &Env, pool_id: u64) -> Option<FallbackStatus> {
        Self::get(env, &DataKey::Fallback(pool_id))
    }

    pub fn set_fallback(env: &Env, status: &FallbackStatus) {
        Self::set(env, &DataKey::Fallback(status.pool_id), status);
    }

    // ===== FEES =====

    pub fn get_fee_share(env: &Env, pool_id: u64, provider_id: u64) -> Option<OracleFeeShare> {
        Self::get(env, &DataKey::FeeShare(pool_id, provider_id))
    }

    pub fn set_fee_share(env: &Env, share: &OracleFeeShare) {
        Self::set(env, &DataKey::FeeShare(share.pool_id, share.provider_id), share);
    }

    pub fn get_fee_recipients(env: &Env, pool_id: u64) -> Vec<u64> {
        Self::get(env, &DataKey::FeeRecipients(pool_id)).unwrap_or(Vec::new(env))
    }

    pub fn set_fee_recipients(env: &Env, pool_id: u64, ids: &Vec<u64>) {
        Self::set(env, &DataKey::FeeRecipients(pool_id), ids);
    }

    // ===== DISPUTES =====

    pub fn next_dispute_id(env: &Env) -> u64 {
        Self::next_id(env, DataKey::DisputeCount)
    }

    pub fn dispute_count(env: &Env) -> u64 {
        Self::count(env, DataKey::DisputeCount)
    }

    pub fn get_dispute(env: &Env, dispute_id: u64) -> Result<Dispute, Error> {
        Self::get(env, &DataKey::Dispute(dispute_id)).ok_or(Error::DisputeNotFound)
    }

    pub fn set_dispute(env: &Env, dispute: &Dispute) {
        Self::set(env, &DataKey::Dispute(dispute.id), dispute);
    }

    pub fn get_pool_disputes(env: &Env, pool_id: u64) -> Vec<u64> {
        Self::get(env, &DataKey::PoolDisputes(pool_id)).unwrap_or(Vec::new(env))
    }

    pub fn set_pool_disputes(env: &Env, pool_id: u64, ids: &Vec<u64>) {
        Self::set(env, &DataKey::PoolDisputes(pool_id), ids);
    }

    pub fn get_vote(env: &Env, dispute_id: u64, voter: &Address) -> Option<DisputeVote> {
        Self::get(env, &DataKey::Vote(dispute_id, voter.clone()))
    }

    pub fn set_vote(env: &Env, vote: &DisputeVote) {
        Self::set(env, &DataKey::Vote(vote.dispute_id, vote.voter.clone()), vote);
    }
}
