use soroban_sdk::contracterror;

/// Error codes for the pool resolution contract.
///
/// Codes are grouped into ranges so that clients can classify a failure from
/// its number alone:
///
/// - **Configuration (100-199)**: rejected at configuration time, never partially applied
/// - **Data (200-299)**: oracle provider and submission problems
/// - **Authorization (300-399)**: a privileged operation invoked by the wrong caller
/// - **State (400-499)**: a pool or dispute is in the wrong lifecycle state
/// - **Economic (500-599)**: bonds, balances and fee amounts
/// - **Validation (600-699)**: malformed input parameters
///
/// Evaluation problems (insufficient or conflicting oracle data) are not
/// errors: they are recorded as failed resolution attempts and reported
/// through [`crate::types::ResolutionOutcome::Pending`].
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    // ===== CONFIGURATION ERRORS =====
    /// Engine configuration values are out of bounds
    InvalidConfig = 100,
    /// Resolution config names no oracle sources
    EmptyOracleSet = 101,
    /// Resolution config has no criteria or a malformed criterion
    InvalidCriteria = 102,
    /// Two criteria target the same data type
    DuplicateDataType = 103,
    /// Resolution config names an unregistered or duplicated oracle
    UnknownOracleSource = 104,
    /// Retry limit outside the allowed range
    InvalidRetryLimit = 105,
    /// Pool has no resolution config
    ResolutionNotConfigured = 106,
    /// Resolution config can no longer be changed
    ConfigLocked = 107,
    /// No configured oracle supports a criterion's data type
    DataTypeNotCovered = 108,

    // ===== DATA ERRORS =====
    /// Oracle provider not found
    ProviderNotFound = 200,
    /// Oracle provider is deactivated
    ProviderInactive = 201,
    /// Oracle provider does not supply this data type
    UnsupportedDataType = 202,
    /// Pool has reached its submission cap
    SubmissionLimitReached = 203,
    /// Submission not found
    SubmissionNotFound = 204,
    /// Provider is not an oracle source of the pool's resolution config
    NotOracleSource = 205,

    // ===== AUTHORIZATION ERRORS =====
    /// Caller is not allowed to perform this action
    Unauthorized = 300,
    /// Admin address is not set
    AdminNotSet = 301,

    // ===== STATE ERRORS =====
    /// Contract is already initialized
    AlreadyInitialized = 400,
    /// Contract is not initialized
    NotInitialized = 401,
    /// Pool not found
    PoolNotFound = 402,
    /// Pool is in the wrong state for this operation
    InvalidPoolState = 403,
    /// Pool has not reached its expiry height
    PoolNotExpired = 404,
    /// Pool is past its expiry height
    PoolExpired = 405,
    /// Retry cooldown has not elapsed
    RetryCooldownActive = 406,
    /// Pool is waiting for manual settlement
    PoolInFallback = 407,
    /// Fallback delay has not elapsed
    FallbackDelayNotElapsed = 408,
    /// Dispute not found
    DisputeNotFound = 409,
    /// Dispute is already resolved
    DisputeNotActive = 410,
    /// Dispute window for this pool has closed
    DisputeWindowClosed = 411,
    /// Pool has reached its dispute limit
    MaxDisputesReached = 412,
    /// Caller already disputed this pool
    AlreadyDisputed = 413,
    /// Voting deadline has passed
    VotingClosed = 414,
    /// Voting deadline has not been reached
    VotingStillOpen = 415,
    /// Caller already voted on this dispute
    AlreadyVoted = 416,
    /// Oracle fees for this pool were already distributed
    FeesAlreadyDistributed = 417,
    /// Resolution fee has not been collected
    FeeNotCollected = 418,
    /// Fee shares cannot be claimed yet
    ClaimNotAvailable = 419,
    /// Resolution attempt not found
    AttemptNotFound = 420,
    /// Address is already registered as an oracle provider
    ProviderAlreadyRegistered = 421,

    // ===== ECONOMIC ERRORS =====
    /// Disputer cannot cover the bond
    InsufficientBondFunds = 500,
    /// Voter balance is below the minimum
    InsufficientVoterBalance = 501,
    /// Amount must be positive
    InvalidAmount = 502,
    /// Nothing to claim
    NothingToClaim = 503,
    /// Fee share was already claimed
    AlreadyClaimed = 504,
    /// Arithmetic overflow in an amount calculation
    ArithmeticOverflow = 505,

    // ===== VALIDATION ERRORS =====
    /// Confidence outside [0, 100]
    InvalidConfidence = 600,
    /// Provider data types are empty or malformed
    InvalidDataTypes = 601,
    /// Dispute reason is empty or too long
    InvalidReason = 602,
    /// Outcome name is empty or too long
    InvalidOutcomeName = 603,
    /// Expiry height is not in the future
    InvalidExpiry = 604,
}

/// Error category, one per code range.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorCategory {
    Config,
    Data,
    Authorization,
    State,
    Economic,
    Validation,
}

impl Error {
    /// Category derived from the numeric code range.
    pub fn category(&self) -> ErrorCategory {
        match *self as u32 {
            100..=199 => ErrorCategory::Config,
            200..=299 => ErrorCategory::Data,
            300..=399 => ErrorCategory::Authorization,
            400..=499 => ErrorCategory::State,
            500..=599 => ErrorCategory::Economic,
            _ => ErrorCategory::Validation,
        }
    }

    /// Human-readable description of the error.
    pub fn description(&self) -> &'static str {
        match self {
            Error::InvalidConfig => "Engine configuration is invalid",
            Error::EmptyOracleSet => "At least one oracle source is required",
            Error::InvalidCriteria => "Resolution criteria are invalid",
            Error::DuplicateDataType => "Each data type may appear in one criterion only",
            Error::UnknownOracleSource => "Oracle source is unknown or duplicated",
            Error::InvalidRetryLimit => "Retry limit is out of range",
            Error::ResolutionNotConfigured => "Pool has no resolution configuration",
            Error::ConfigLocked => "Resolution configuration is locked",
            Error::DataTypeNotCovered => "No configured oracle supplies this data type",
            Error::ProviderNotFound => "Oracle provider not found",
            Error::ProviderInactive => "Oracle provider is inactive",
            Error::UnsupportedDataType => "Oracle provider does not supply this data type",
            Error::SubmissionLimitReached => "Pool submission limit reached",
            Error::SubmissionNotFound => "Submission not found",
            Error::NotOracleSource => "Provider is not an oracle source for this pool",
            Error::Unauthorized => "Caller is not authorized",
            Error::AdminNotSet => "Admin is not set",
            Error::AlreadyInitialized => "Contract is already initialized",
            Error::NotInitialized => "Contract is not initialized",
            Error::PoolNotFound => "Pool not found",
            Error::InvalidPoolState => "Pool is in the wrong state",
            Error::PoolNotExpired => "Pool has not expired",
            Error::PoolExpired => "Pool has expired",
            Error::RetryCooldownActive => "Retry cooldown is active",
            Error::PoolInFallback => "Pool is awaiting manual settlement",
            Error::FallbackDelayNotElapsed => "Fallback delay has not elapsed",
            Error::DisputeNotFound => "Dispute not found",
            Error::DisputeNotActive => "Dispute is not active",
            Error::DisputeWindowClosed => "Dispute window has closed",
            Error::MaxDisputesReached => "Maximum disputes reached for pool",
            Error::AlreadyDisputed => "Caller already disputed this pool",
            Error::VotingClosed => "Voting has closed",
            Error::VotingStillOpen => "Voting is still open",
            Error::AlreadyVoted => "Caller already voted",
            Error::FeesAlreadyDistributed => "Oracle fees already distributed",
            Error::FeeNotCollected => "Resolution fee not collected",
            Error::ClaimNotAvailable => "Fee shares are not claimable yet",
            Error::AttemptNotFound => "Resolution attempt not found",
            Error::ProviderAlreadyRegistered => "Address is already a provider",
            Error::InsufficientBondFunds => "Insufficient funds for dispute bond",
            Error::InsufficientVoterBalance => "Voter balance below minimum",
            Error::InvalidAmount => "Amount must be positive",
            Error::NothingToClaim => "Nothing to claim",
            Error::AlreadyClaimed => "Already claimed",
            Error::ArithmeticOverflow => "Arithmetic overflow",
            Error::InvalidConfidence => "Confidence must be between 0 and 100",
            Error::InvalidDataTypes => "Data types are invalid",
            Error::InvalidReason => "Reason length is out of bounds",
            Error::InvalidOutcomeName => "Outcome name is invalid",
            Error::InvalidExpiry => "Expiry must be in the future",
        }
    }

    /// Stable machine-readable code for client-side handling.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidConfig => "INVALID_CONFIG",
            Error::EmptyOracleSet => "EMPTY_ORACLE_SET",
            Error::InvalidCriteria => "INVALID_CRITERIA",
            Error::DuplicateDataType => "DUPLICATE_DATA_TYPE",
            Error::UnknownOracleSource => "UNKNOWN_ORACLE_SOURCE",
            Error::InvalidRetryLimit => "INVALID_RETRY_LIMIT",
            Error::ResolutionNotConfigured => "RESOLUTION_NOT_CONFIGURED",
            Error::ConfigLocked => "CONFIG_LOCKED",
            Error::DataTypeNotCovered => "DATA_TYPE_NOT_COVERED",
            Error::ProviderNotFound => "PROVIDER_NOT_FOUND",
            Error::ProviderInactive => "PROVIDER_INACTIVE",
            Error::UnsupportedDataType => "UNSUPPORTED_DATA_TYPE",
            Error::SubmissionLimitReached => "SUBMISSION_LIMIT_REACHED",
            Error::SubmissionNotFound => "SUBMISSION_NOT_FOUND",
            Error::NotOracleSource => "NOT_ORACLE_SOURCE",
            Error::Unauthorized => "UNAUTHORIZED",
            Error::AdminNotSet => "ADMIN_NOT_SET",
            Error::AlreadyInitialized => "ALREADY_INITIALIZED",
            Error::NotInitialized => "NOT_INITIALIZED",
            Error::PoolNotFound => "POOL_NOT_FOUND",
            Error::InvalidPoolState => "INVALID_POOL_STATE",
            Error::PoolNotExpired => "POOL_NOT_EXPIRED",
            Error::PoolExpired => "POOL_EXPIRED",
            Error::RetryCooldownActive => "RETRY_COOLDOWN_ACTIVE",
            Error::PoolInFallback => "POOL_IN_FALLBACK",
            Error::FallbackDelayNotElapsed => "FALLBACK_DELAY_NOT_ELAPSED",
            Error::DisputeNotFound => "DISPUTE_NOT_FOUND",
            Error::DisputeNotActive => "DISPUTE_NOT_ACTIVE",
            Error::DisputeWindowClosed => "DISPUTE_WINDOW_CLOSED",
            Error::MaxDisputesReached => "MAX_DISPUTES_REACHED",
            Error::AlreadyDisputed => "ALREADY_DISPUTED",
            Error::VotingClosed => "VOTING_CLOSED",
            Error::VotingStillOpen => "VOTING_STILL_OPEN",
            Error::AlreadyVoted => "ALREADY_VOTED",
            Error::FeesAlreadyDistributed => "FEES_ALREADY_DISTRIBUTED",
            Error::FeeNotCollected => "FEE_NOT_COLLECTED",
            Error::ClaimNotAvailable => "CLAIM_NOT_AVAILABLE",
            Error::AttemptNotFound => "ATTEMPT_NOT_FOUND",
            Error::ProviderAlreadyRegistered => "PROVIDER_ALREADY_REGISTERED",
            Error::InsufficientBondFunds => "INSUFFICIENT_BOND_FUNDS",
            Error::InsufficientVoterBalance => "INSUFFICIENT_VOTER_BALANCE",
            Error::InvalidAmount => "INVALID_AMOUNT",
            Error::NothingToClaim => "NOTHING_TO_CLAIM",
            Error::AlreadyClaimed => "ALREADY_CLAIMED",
            Error::ArithmeticOverflow => "ARITHMETIC_OVERFLOW",
            Error::InvalidConfidence => "INVALID_CONFIDENCE",
            Error::InvalidDataTypes => "INVALID_DATA_TYPES",
            Error::InvalidReason => "INVALID_REASON",
            Error::InvalidOutcomeName => "INVALID_OUTCOME_NAME",
            Error::InvalidExpiry => "INVALID_EXPIRY",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories_follow_code_ranges() {
        assert_eq!(Error::EmptyOracleSet.category(), ErrorCategory::Config);
        assert_eq!(Error::UnsupportedDataType.category(), ErrorCategory::Data);
        assert_eq!(Error::Unauthorized.category(), ErrorCategory::Authorization);
        assert_eq!(Error::VotingClosed.category(), ErrorCategory::State);
        assert_eq!(Error::InsufficientVoterBalance.category(), ErrorCategory::Economic);
        assert_eq!(Error::InvalidConfidence.category(), ErrorCategory::Validation);
    }

    #[test]
    fn test_error_codes_and_descriptions() {
        assert_eq!(Error::PoolInFallback as u32, 407);
        assert_eq!(Error::PoolInFallback.code(), "POOL_IN_FALLBACK");
        assert_eq!(
            Error::InsufficientBondFunds.description(),
            "Insufficient funds for dispute bond"
        );
    }
}
