use soroban_sdk::{contracttype, Address, Env};

use crate::errors::Error;
use crate::storage::DataKey;
use crate::voting::VotingPowerPolicy;

/// Configuration for the pool resolution engine.
///
/// Constants below are the defaults written by `initialize`; the admin may
/// later replace the whole [`EngineConfig`] through `update_config`, which is
/// validated against the bounds defined here.

// ===== CORE CONSTANTS =====

/// Basis point denominator (100%)
pub const BPS_DENOMINATOR: i128 = 10_000;

/// Ledgers per day at ~5s close time
pub const DAY_IN_LEDGERS: u32 = 17_280;

/// Storage TTL bump threshold
pub const BUMP_THRESHOLD: u32 = 14 * DAY_IN_LEDGERS;

/// Storage TTL bump amount
pub const BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;

// ===== ORACLE CONSTANTS =====

/// Confidence and reliability are both percentages
pub const MAX_CONFIDENCE: u32 = 100;

/// Reliability assigned on registration
pub const INITIAL_RELIABILITY: u32 = 100;

/// Reliability lost per failed or conflicting attempt
pub const RELIABILITY_PENALTY: u32 = 10;

/// A successful attempt recovers 1/N of the distance to 100 (at least 1 point)
pub const RELIABILITY_RECOVERY_DIVISOR: u32 = 10;

/// Maximum data types a provider may declare
pub const MAX_DATA_TYPES_PER_PROVIDER: u32 = 16;

/// Maximum submissions recorded per pool
pub const MAX_SUBMISSIONS_PER_POOL: u32 = 100;

/// Maximum submissions one provider may record against a single pool
pub const MAX_SUBMISSIONS_PER_PROVIDER: u32 = 10;

/// Share of total weight (percent) at which the runner-up value makes a data type conflicting
pub const CONFLICT_THRESHOLD_PERCENT: i128 = 40;

// ===== RESOLUTION CONSTANTS =====

/// Upper bound for a pool's retry budget
pub const MAX_RETRY_ATTEMPTS: u32 = 10;

/// Maximum oracle sources per resolution config
pub const MAX_ORACLE_SOURCES: u32 = 10;

/// Maximum criteria per resolution config
pub const MAX_CRITERIA: u32 = 8;

/// Maximum outcome name length in bytes
pub const MAX_OUTCOME_NAME_LENGTH: u32 = 100;

// ===== DEFAULTS =====

/// Default resolution fee (2%)
pub const DEFAULT_RESOLUTION_FEE_BPS: u32 = 200;

/// Maximum resolution fee (10%)
pub const MAX_RESOLUTION_FEE_BPS: u32 = 1_000;

/// Default blocks between failed attempts
pub const DEFAULT_RETRY_COOLDOWN_BLOCKS: u32 = 720;

/// Default blocks between fallback and manual settlement
pub const DEFAULT_FALLBACK_DELAY_BLOCKS: u32 = DAY_IN_LEDGERS;

/// Default blocks after settlement during which disputes are accepted
pub const DEFAULT_DISPUTE_WINDOW_BLOCKS: u32 = DAY_IN_LEDGERS;

/// Default dispute bond (5% of pool stake)
pub const DEFAULT_BOND_BPS: u32 = 500;

/// Maximum dispute bond (50% of pool stake)
pub const MAX_BOND_BPS: u32 = 5_000;

/// Default dispute voting window
pub const DEFAULT_VOTING_WINDOW_BLOCKS: u32 = 3 * DAY_IN_LEDGERS;

/// Default dispute cap per pool
pub const DEFAULT_MAX_DISPUTES_PER_POOL: u32 = 3;

/// Default minimum voter balance (1 XLM)
pub const DEFAULT_MIN_VOTER_BALANCE: i128 = 10_000_000;

/// Default balance per voting power unit (1 XLM)
pub const DEFAULT_POWER_UNIT: i128 = 10_000_000;

/// Default maximum dispute reason length in bytes
pub const DEFAULT_MAX_REASON_LENGTH: u32 = 280;

// ===== CONFIG TYPES =====

/// Where a rejected dispute's bond goes.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BondForfeitPolicy {
    /// Bond is paid to the configured treasury
    Treasury,
    /// Bond is paid to the caller whose attempt settled the pool
    Resolver,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EngineConfig {
    /// Token held in escrow for stakes, bonds and fees
    pub token: Address,
    pub treasury: Address,
    pub resolution_fee_bps: u32,
    pub retry_cooldown_blocks: u32,
    pub fallback_delay_blocks: u32,
    pub dispute_window_blocks: u32,
    pub bond_bps: u32,
    pub voting_window_blocks: u32,
    pub max_disputes_per_pool: u32,
    pub min_voter_balance: i128,
    pub max_reason_length: u32,
    pub voting_power: VotingPowerPolicy,
    pub bond_forfeit: BondForfeitPolicy,
}

// ===== CONFIG MANAGER =====

pub struct ConfigManager;

impl ConfigManager {
    pub fn default_config(token: Address, treasury: Address) -> EngineConfig {
        EngineConfig {
            token,
            treasury,
            resolution_fee_bps: DEFAULT_RESOLUTION_FEE_BPS,
            retry_cooldown_blocks: DEFAULT_RETRY_COOLDOWN_BLOCKS,
            fallback_delay_blocks: DEFAULT_FALLBACK_DELAY_BLOCKS,
            dispute_window_blocks: DEFAULT_DISPUTE_WINDOW_BLOCKS,
            bond_bps: DEFAULT_BOND_BPS,
            voting_window_blocks: DEFAULT_VOTING_WINDOW_BLOCKS,
            max_disputes_per_pool: DEFAULT_MAX_DISPUTES_PER_POOL,
            min_voter_balance: DEFAULT_MIN_VOTER_BALANCE,
            max_reason_length: DEFAULT_MAX_REASON_LENGTH,
            voting_power: VotingPowerPolicy::V1(DEFAULT_POWER_UNIT),
            bond_forfeit: BondForfeitPolicy::Treasury,
        }
    }

    pub fn validate(config: &EngineConfig) -> Result<(), Error> {
        if config.resolution_fee_bps > MAX_RESOLUTION_FEE_BPS {
            return Err(Error::InvalidConfig);
        }
        if config.bond_bps > MAX_BOND_BPS {
            return Err(Error::InvalidConfig);
        }
        if config.voting_window_blocks == 0 || config.max_disputes_per_pool == 0 {
            return Err(Error::InvalidConfig);
        }
        if config.min_voter_balance < 0 || config.max_reason_length == 0 {
            return Err(Error::InvalidConfig);
        }
        config.voting_power.validate()
    }

    pub fn get_config(env: &Env) -> Result<EngineConfig, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Config)
            .ok_or(Error::NotInitialized)
    }

    pub fn store_config(env: &Env, config: &EngineConfig) -> Result<(), Error> {
        Self::validate(config)?;
        env.storage().instance().set(&DataKey::Config, config);
        env.storage()
            .instance()
            .extend_ttl(BUMP_THRESHOLD, BUMP_AMOUNT);
        Ok(())
    }
}
