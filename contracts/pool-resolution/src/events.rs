use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

use crate::types::{DisputeResolution, FallbackReason, Outcome, Verdict, VoteChoice};

/// Event system for the pool resolution contract.
///
/// Every state change publishes one contract event. Topics start with a short
/// symbol naming the change, followed by the id of the record it touched, so
/// indexers can subscribe per pool, provider or dispute.

// ===== EVENT TYPES =====

/// Event emitted for every recorded resolution attempt.
///
/// Failed attempts are not contract errors, so this event is the only signal
/// a dashboard receives when an attempt ends in `Failure`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AttemptRecordedEvent {
    pub pool_id: u64,
    pub attempt_index: u32,
    pub verdict: Verdict,
    pub submissions_used: u32,
    pub height: u32,
}

/// Event emitted when a pool enters the fallback path.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FallbackTriggeredEvent {
    pub pool_id: u64,
    pub reason: FallbackReason,
    pub eligible_at_height: u32,
    pub creator: Address,
}

/// Dispute created event
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DisputeCreatedEvent {
    pub dispute_id: u64,
    pub pool_id: u64,
    pub disputer: Address,
    pub bond_amount: i128,
    pub voting_deadline_height: u32,
}

/// Dispute resolved event
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DisputeResolvedEvent {
    pub dispute_id: u64,
    pub pool_id: u64,
    pub resolution: DisputeResolution,
    pub votes_for: u64,
    pub votes_against: u64,
    /// Recipient of the bond: the disputer when upheld, the forfeit target otherwise
    pub bond_recipient: Address,
}

// ===== EVENT EMITTER =====

pub struct EventEmitter;

impl EventEmitter {
    pub fn emit_initialized(env: &Env, admin: &Address, token: &Address) {
        env.events()
            .publish((symbol_short!("init"),), (admin.clone(), token.clone()));
    }

    pub fn emit_config_updated(env: &Env, admin: &Address) {
        env.events().publish(
            (symbol_short!("cfg_upd"),),
            (admin.clone(), env.ledger().sequence()),
        );
    }

    pub fn emit_pool_created(env: &Env, pool_id: u64, creator: &Address, expiry_height: u32) {
        env.events().publish(
            (symbol_short!("pool_new"), pool_id),
            (creator.clone(), expiry_height),
        );
    }

    pub fn emit_stake(env: &Env, pool_id: u64, staker: &Address, outcome: Outcome, amount: i128) {
        env.events().publish(
            (symbol_short!("stake"), pool_id),
            (staker.clone(), outcome, amount),
        );
    }

    pub fn emit_provider_registered(env: &Env, provider_id: u64, address: &Address) {
        env.events()
            .publish((symbol_short!("orc_reg"), provider_id), address.clone());
    }

    pub fn emit_provider_status(env: &Env, provider_id: u64, active: bool) {
        env.events()
            .publish((symbol_short!("orc_stat"), provider_id), active);
    }

    pub fn emit_reliability_updated(env: &Env, provider_id: u64, previous: u32, current: u32) {
        env.events().publish(
            (symbol_short!("orc_rel"), provider_id),
            (previous, current),
        );
    }

    pub fn emit_data_submitted(env: &Env, pool_id: u64, submission_id: u64, provider_id: u64) {
        env.events().publish(
            (symbol_short!("orc_data"), pool_id),
            (submission_id, provider_id),
        );
    }

    pub fn emit_resolution_configured(
        env: &Env,
        pool_id: u64,
        oracle_count: u32,
        criteria_count: u32,
    ) {
        env.events().publish(
            (symbol_short!("res_cfg"), pool_id),
            (oracle_count, criteria_count),
        );
    }

    pub fn emit_attempt_recorded(env: &Env, event: &AttemptRecordedEvent) {
        env.events()
            .publish((symbol_short!("attempt"), event.pool_id), event.clone());
    }

    pub fn emit_pool_settled(env: &Env, pool_id: u64, outcome: Outcome) {
        env.events().publish(
            (symbol_short!("settled"), pool_id),
            (outcome, env.ledger().sequence()),
        );
    }

    /// Publishes the fallback and a creator notification topic keyed by the
    /// creator's address.
    pub fn emit_fallback_triggered(env: &Env, event: &FallbackTriggeredEvent) {
        env.events()
            .publish((symbol_short!("fallback"), event.pool_id), event.clone());
        env.events().publish(
            (Symbol::new(env, "creator_notice"), event.creator.clone()),
            (event.pool_id, event.eligible_at_height),
        );
    }

    pub fn emit_manual_settlement(env: &Env, pool_id: u64, admin: &Address, outcome: Outcome) {
        env.events().publish(
            (symbol_short!("man_set"), pool_id),
            (admin.clone(), outcome),
        );
    }

    pub fn emit_fee_collected(env: &Env, pool_id: u64, amount: i128) {
        env.events()
            .publish((symbol_short!("fee_col"), pool_id), amount);
    }

    pub fn emit_fee_share_assigned(env: &Env, pool_id: u64, provider_id: u64, amount: i128) {
        env.events().publish(
            (symbol_short!("fee_share"), pool_id),
            (provider_id, amount),
        );
    }

    pub fn emit_fee_claimed(env: &Env, pool_id: u64, provider_id: u64, amount: i128) {
        env.events().publish(
            (symbol_short!("fee_clm"), pool_id),
            (provider_id, amount),
        );
    }

    pub fn emit_fee_refunded(env: &Env, pool_id: u64, amount: i128) {
        env.events()
            .publish((symbol_short!("fee_ref"), pool_id), amount);
    }

    pub fn emit_dispute_created(env: &Env, event: &DisputeCreatedEvent) {
        env.events()
            .publish((symbol_short!("dsp_new"), event.pool_id), event.clone());
    }

    pub fn emit_vote_cast(
        env: &Env,
        dispute_id: u64,
        voter: &Address,
        choice: VoteChoice,
        voting_power: u64,
    ) {
        env.events().publish(
            (symbol_short!("dsp_vote"), dispute_id),
            (voter.clone(), choice, voting_power),
        );
    }

    pub fn emit_dispute_resolved(env: &Env, event: &DisputeResolvedEvent) {
        env.events()
            .publish((symbol_short!("dsp_res"), event.pool_id), event.clone());
    }

    pub fn emit_pool_reversed(env: &Env, pool_id: u64, dispute_id: u64, overturned: Outcome) {
        env.events().publish(
            (symbol_short!("reversed"), pool_id),
            (dispute_id, overturned),
        );
    }
}
