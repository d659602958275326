use soroban_sdk::{contracttype, Address, BytesN, String, Vec};

// ===== POOL TYPES =====

/// One side of a binary pool.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    A,
    B,
}

impl Outcome {
    /// The other side of the pool.
    pub fn opposite(&self) -> Outcome {
        match self {
            Outcome::A => Outcome::B,
            Outcome::B => Outcome::A,
        }
    }
}

/// Stored winner of a pool. `None` until the pool settles and again after a
/// reversal.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WinningOutcome {
    None,
    A,
    B,
}

impl WinningOutcome {
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            WinningOutcome::None => None,
            WinningOutcome::A => Some(Outcome::A),
            WinningOutcome::B => Some(Outcome::B),
        }
    }
}

impl From<Outcome> for WinningOutcome {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::A => WinningOutcome::A,
            Outcome::B => WinningOutcome::B,
        }
    }
}

/// Lifecycle of a pool.
///
/// Status only moves through [`crate::resolution`]:
///
/// ```text
/// Open -> AwaitingResolution -> Settled -> Reversed -> ManuallySettled
///                  |                                        ^
///                  +-----> FallbackTriggered ---------------+
/// ```
///
/// `winning_outcome` is `A` or `B` exactly when the status is `Settled` or
/// `ManuallySettled`.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PoolStatus {
    /// Accepting stakes and oracle data
    Open,
    /// Expired, at least one automated attempt started
    AwaitingResolution,
    /// Settled by the consensus evaluator
    Settled,
    /// Automation gave up, waiting for a privileged settlement
    FallbackTriggered,
    /// Settled by a privileged caller
    ManuallySettled,
    /// Automated settlement overturned by an upheld dispute
    Reversed,
}

impl PoolStatus {
    /// Whether oracles may still append submissions.
    pub fn accepts_submissions(&self) -> bool {
        matches!(self, PoolStatus::Open | PoolStatus::AwaitingResolution)
    }
}

/// A binary prediction pool and its resolution bookkeeping.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pool {
    pub id: u64,
    pub creator: Address,
    pub outcome_a_name: String,
    pub outcome_b_name: String,
    pub total_stake_a: i128,
    pub total_stake_b: i128,
    pub expiry_height: u32,
    pub status: PoolStatus,
    pub winning_outcome: WinningOutcome,
    pub settled_at_height: Option<u32>,
    /// Caller whose attempt produced the automated settlement
    pub resolver: Option<Address>,
    /// Number of resolution attempts recorded so far
    pub attempt_count: u32,
    pub last_attempt_height: Option<u32>,
    /// Index into the pool's submission list consumed by the last attempt
    pub submission_cursor: u32,
    pub resolution_fee: i128,
    pub fee_collected: bool,
    pub fees_distributed: bool,
    pub dispute_count: u32,
    pub active_disputes: u32,
}

impl Pool {
    pub fn new(
        id: u64,
        creator: Address,
        outcome_a_name: String,
        outcome_b_name: String,
        expiry_height: u32,
    ) -> Self {
        Self {
            id,
            creator,
            outcome_a_name,
            outcome_b_name,
            total_stake_a: 0,
            total_stake_b: 0,
            expiry_height,
            status: PoolStatus::Open,
            winning_outcome: WinningOutcome::None,
            settled_at_height: None,
            resolver: None,
            attempt_count: 0,
            last_attempt_height: None,
            submission_cursor: 0,
            resolution_fee: 0,
            fee_collected: false,
            fees_distributed: false,
            dispute_count: 0,
            active_disputes: 0,
        }
    }

    pub fn total_stake(&self) -> i128 {
        self.total_stake_a + self.total_stake_b
    }

    pub fn is_expired(&self, height: u32) -> bool {
        height >= self.expiry_height
    }
}

// ===== ORACLE TYPES =====

/// A registered oracle provider.
///
/// Providers are never deleted. `reliability_score` stays within [0, 100] and
/// feeds both consensus weighting and the oracle fee split.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OracleProvider {
    pub id: u64,
    pub address: Address,
    pub reliability_score: u32,
    pub total_resolutions: u32,
    pub successful_resolutions: u32,
    pub is_active: bool,
    pub supported_data_types: Vec<String>,
    pub registered_at_height: u32,
}

impl OracleProvider {
    pub fn supports(&self, data_type: &String) -> bool {
        self.supported_data_types.contains(data_type)
    }
}

/// Value reported by an oracle.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum OracleValue {
    Numeric(i128),
    Boolean(bool),
    Text(String),
}

/// Immutable record of one oracle report against a pool.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OracleSubmission {
    pub id: u64,
    pub provider_id: u64,
    pub pool_id: u64,
    pub data_type: String,
    pub value: OracleValue,
    pub confidence: u32,
    pub submitted_at_height: u32,
}

// ===== CRITERIA TYPES =====

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Comparator {
    Gt,
    Gte,
    Lt,
    Lte,
    Eq,
    Neq,
}

impl Comparator {
    pub fn compare(&self, observed: i128, threshold: i128) -> bool {
        match self {
            Comparator::Gt => observed > threshold,
            Comparator::Gte => observed >= threshold,
            Comparator::Lt => observed < threshold,
            Comparator::Lte => observed <= threshold,
            Comparator::Eq => observed == threshold,
            Comparator::Neq => observed != threshold,
        }
    }
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NumericThreshold {
    pub comparator: Comparator,
    pub value: i128,
}

/// Closed set of criteria kinds. Each kind has its own evaluator in
/// [`crate::consensus`].
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CriteriaKind {
    /// Weighted average of numeric reports compared against a threshold
    NumericThreshold(NumericThreshold),
    /// Weighted-majority boolean equals the expected flag
    BooleanEquality(bool),
    /// Weighted-majority text equals the expected value
    CategoricalMajority(String),
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Criterion {
    pub data_type: String,
    pub kind: CriteriaKind,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LogicalOperator {
    And,
    Or,
}

/// How a pool is settled automatically. One per pool; locked once the first
/// attempt starts.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolutionConfig {
    pub pool_id: u64,
    pub oracle_source_ids: Vec<u64>,
    pub criteria: Vec<Criterion>,
    pub logical_operator: LogicalOperator,
    /// Outcome chosen when the combined criteria hold; the other outcome wins otherwise
    pub outcome_when_true: Outcome,
    pub max_retry_attempts: u32,
}

impl ResolutionConfig {
    pub fn outcome_for(&self, holds: bool) -> Outcome {
        if holds {
            self.outcome_when_true
        } else {
            self.outcome_when_true.opposite()
        }
    }
}

// ===== RESOLUTION TYPES =====

/// Why an automated attempt could not settle a pool.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailureReason {
    InsufficientData,
    ConflictingData,
    OracleUnavailable,
    CriteriaUnsatisfiable,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Verdict {
    Success(Outcome),
    Failure(FailureReason),
}

/// Append-only audit record of one evaluation pass.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolutionAttempt {
    pub pool_id: u64,
    pub attempt_index: u32,
    pub attempted_at_height: u32,
    pub submission_ids_used: Vec<u64>,
    pub verdict: Verdict,
}

/// Result reported to the caller of `attempt_automated_resolution`.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResolutionOutcome {
    Settled(Outcome),
    /// Attempt failed; a retry is allowed after the cooldown
    Pending(FailureReason),
    /// Attempt budget exhausted; the pool now waits for manual settlement
    FallbackTriggered(FailureReason),
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FallbackReason {
    RetriesExhausted(FailureReason),
    Manual(String),
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FallbackStatus {
    pub pool_id: u64,
    pub triggered_at_height: u32,
    pub reason: FallbackReason,
    pub max_retries_reached: bool,
    /// First height at which `manual_settle_fallback` is accepted
    pub manual_settle_height: u32,
    pub notified_creator: bool,
}

// ===== FEE TYPES =====

/// An oracle's claimable part of a pool's resolution fee.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OracleFeeShare {
    pub pool_id: u64,
    pub provider_id: u64,
    pub amount: i128,
    pub claimed: bool,
}

// ===== DISPUTE TYPES =====

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DisputeStatus {
    Active,
    Resolved,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DisputeResolution {
    /// Voting still open or not yet tallied
    None,
    Upheld,
    Rejected,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VoteChoice {
    Uphold,
    Reject,
}

/// A bonded challenge against a settled pool.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Dispute {
    pub id: u64,
    pub pool_id: u64,
    pub disputer: Address,
    pub bond_amount: i128,
    pub reason: String,
    pub evidence_hash: Option<BytesN<32>>,
    pub created_at_height: u32,
    pub voting_deadline_height: u32,
    pub status: DisputeStatus,
    pub resolution: DisputeResolution,
    pub votes_for: u64,
    pub votes_against: u64,
    /// Outcome that was cleared when the dispute was upheld
    pub overturned_outcome: WinningOutcome,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DisputeVote {
    pub dispute_id: u64,
    pub voter: Address,
    pub voting_power: u64,
    pub choice: VoteChoice,
    pub voted_at_height: u32,
}
