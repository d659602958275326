use soroban_sdk::{Address, BytesN, Env, String};

use crate::config::{BondForfeitPolicy, ConfigManager, EngineConfig, BPS_DENOMINATOR};
use crate::errors::Error;
use crate::escrow::TokenEscrow;
use crate::events::{DisputeCreatedEvent, DisputeResolvedEvent, EventEmitter};
use crate::resolution::PoolResolutionManager;
use crate::storage::Storage;
use crate::types::{Dispute, DisputeResolution, DisputeStatus, Pool, PoolStatus, WinningOutcome};
use crate::voting::VotingManager;

// ===== DISPUTE MANAGER =====

/// Bonded challenges against automated settlements.
///
/// A dispute escrows a bond proportional to the pool's stake, collects
/// weighted votes until its deadline and is resolved exactly once.
pub struct DisputeManager;

impl DisputeManager {
    pub fn create(
        env: &Env,
        disputer: &Address,
        pool_id: u64,
        reason: String,
        evidence_hash: Option<BytesN<32>>,
    ) -> Result<u64, Error> {
        disputer.require_auth();

        let config = ConfigManager::get_config(env)?;
        let mut pool = Storage::get_pool(env, pool_id)?;
        let height = env.ledger().sequence();

        DisputeValidator::validate_dispute_creation(env, &pool, disputer, &reason, &config, height)?;

        let bond_amount = DisputeUtils::bond_amount(&pool, config.bond_bps)?;
        if TokenEscrow::balance(env, disputer)? < bond_amount {
            return Err(Error::InsufficientBondFunds);
        }
        TokenEscrow::hold(env, disputer, bond_amount)?;

        let dispute_id = Storage::next_dispute_id(env);
        let dispute = Dispute {
            id: dispute_id,
            pool_id,
            disputer: disputer.clone(),
            bond_amount,
            reason,
            evidence_hash,
            created_at_height: height,
            voting_deadline_height: height.saturating_add(config.voting_window_blocks),
            status: DisputeStatus::Active,
            resolution: DisputeResolution::None,
            votes_for: 0,
            votes_against: 0,
            overturned_outcome: WinningOutcome::None,
        };
        Storage::set_dispute(env, &dispute);

        let mut pool_disputes = Storage::get_pool_disputes(env, pool_id);
        pool_disputes.push_back(dispute_id);
        Storage::set_pool_disputes(env, pool_id, &pool_disputes);

        pool.dispute_count += 1;
        pool.active_disputes += 1;
        Storage::set_pool(env, &pool);

        EventEmitter::emit_dispute_created(
            env,
            &DisputeCreatedEvent {
                dispute_id,
                pool_id,
                disputer: disputer.clone(),
                bond_amount,
                voting_deadline_height: dispute.voting_deadline_height,
            },
        );
        Ok(dispute_id)
    }

    /// Close voting and apply the verdict. Returns whether the dispute was
    /// upheld; a resolved dispute returns its stored verdict unchanged.
    ///
    /// A dispute whose pool is no longer `Settled` (another dispute already
    /// reversed it) is moot and its bond goes back to the disputer.
    pub fn resolve(env: &Env, dispute_id: u64) -> Result<bool, Error> {
        let mut dispute = Storage::get_dispute(env, dispute_id)?;
        if dispute.status == DisputeStatus::Resolved {
            return Ok(dispute.resolution == DisputeResolution::Upheld);
        }
        if env.ledger().sequence() < dispute.voting_deadline_height {
            return Err(Error::VotingStillOpen);
        }

        let config = ConfigManager::get_config(env)?;
        let mut pool = Storage::get_pool(env, dispute.pool_id)?;
        let upheld = VotingManager::is_upheld(&dispute);
        let moot = pool.status != PoolStatus::Settled;

        let bond_recipient = if upheld {
            dispute.overturned_outcome = PoolResolutionManager::reverse(env, &mut pool, dispute_id);
            dispute.disputer.clone()
        } else if moot {
            dispute.disputer.clone()
        } else {
            DisputeUtils::forfeit_recipient(&pool, &config)
        };
        TokenEscrow::release(env, &bond_recipient, dispute.bond_amount)?;

        let resolution = if upheld {
            DisputeResolution::Upheld
        } else {
            DisputeResolution::Rejected
        };
        dispute.status = DisputeStatus::Resolved;
        dispute.resolution = resolution;
        pool.active_disputes = pool.active_disputes.saturating_sub(1);

        Storage::set_dispute(env, &dispute);
        Storage::set_pool(env, &pool);

        EventEmitter::emit_dispute_resolved(
            env,
            &DisputeResolvedEvent {
                dispute_id,
                pool_id: pool.id,
                resolution,
                votes_for: dispute.votes_for,
                votes_against: dispute.votes_against,
                bond_recipient,
            },
        );
        Ok(upheld)
    }
}

// ===== DISPUTE VALIDATOR =====

pub struct DisputeValidator;

impl DisputeValidator {
    pub fn validate_dispute_creation(
        env: &Env,
        pool: &Pool,
        disputer: &Address,
        reason: &String,
        config: &EngineConfig,
        height: u32,
    ) -> Result<(), Error> {
        if pool.status != PoolStatus::Settled {
            return Err(Error::InvalidPoolState);
        }
        let settled_at = pool.settled_at_height.ok_or(Error::InvalidPoolState)?;
        if height >= settled_at.saturating_add(config.dispute_window_blocks) {
            return Err(Error::DisputeWindowClosed);
        }
        if pool.dispute_count >= config.max_disputes_per_pool {
            return Err(Error::MaxDisputesReached);
        }
        if reason.len() == 0 || reason.len() > config.max_reason_length {
            return Err(Error::InvalidReason);
        }

        for dispute_id in Storage::get_pool_disputes(env, pool.id).iter() {
            if &Storage::get_dispute(env, dispute_id)?.disputer == disputer {
                return Err(Error::AlreadyDisputed);
            }
        }
        Ok(())
    }
}

// ===== DISPUTE UTILITIES =====

pub struct DisputeUtils;

impl DisputeUtils {
    /// `bond_bps x total stake / 10_000` at creation time.
    pub fn bond_amount(pool: &Pool, bond_bps: u32) -> Result<i128, Error> {
        pool.total_stake()
            .checked_mul(bond_bps as i128)
            .map(|scaled| scaled / BPS_DENOMINATOR)
            .ok_or(Error::ArithmeticOverflow)
    }

    pub fn forfeit_recipient(pool: &Pool, config: &EngineConfig) -> Address {
        match (config.bond_forfeit, &pool.resolver) {
            (BondForfeitPolicy::Resolver, Some(resolver)) => resolver.clone(),
            _ => config.treasury.clone(),
        }
    }
}
