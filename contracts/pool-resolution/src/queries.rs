use soroban_sdk::{Address, Env, Vec};

use crate::errors::Error;
use crate::oracles::{OracleRegistry, SubmissionLedger};
use crate::storage::Storage;
use crate::types::{Dispute, OracleProvider, OracleSubmission, ResolutionAttempt};

/// Read-only views that assemble records from several storage entries.
pub struct QueryManager;

impl QueryManager {
    pub fn provider_by_address(env: &Env, address: &Address) -> Result<OracleProvider, Error> {
        OracleRegistry::get_by_address(env, address)
    }

    /// Every submission recorded for the pool, oldest first.
    pub fn pool_submissions(env: &Env, pool_id: u64) -> Result<Vec<OracleSubmission>, Error> {
        Storage::get_pool(env, pool_id)?;
        SubmissionLedger::submissions_since(env, pool_id, 0)
    }

    /// The pool's attempt log in index order.
    pub fn attempts(env: &Env, pool_id: u64) -> Result<Vec<ResolutionAttempt>, Error> {
        let pool = Storage::get_pool(env, pool_id)?;
        let mut attempts = Vec::new(env);
        for index in 0..pool.attempt_count {
            attempts.push_back(Storage::get_attempt(env, pool_id, index)?);
        }
        Ok(attempts)
    }

    pub fn pool_disputes(env: &Env, pool_id: u64) -> Result<Vec<Dispute>, Error> {
        Storage::get_pool(env, pool_id)?;
        let mut disputes = Vec::new(env);
        for dispute_id in Storage::get_pool_disputes(env, pool_id).iter() {
            disputes.push_back(Storage::get_dispute(env, dispute_id)?);
        }
        Ok(disputes)
    }
}
