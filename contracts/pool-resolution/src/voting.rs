use soroban_sdk::{contracttype, Address, Env};

use crate::config::ConfigManager;
use crate::errors::Error;
use crate::escrow::TokenEscrow;
use crate::events::EventEmitter;
use crate::storage::Storage;
use crate::types::{Dispute, DisputeStatus, DisputeVote, VoteChoice};

// ===== VOTING POWER POLICY =====

/// Maps a voter's balance to dispute voting power.
///
/// The policy is versioned so it can be replaced through `update_config`
/// without touching vote tallying. Every version is a pure function of the
/// balance.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VotingPowerPolicy {
    /// `max(1, floor(balance / power_unit))`
    V1(i128),
}

impl VotingPowerPolicy {
    pub fn power(&self, balance: i128) -> u64 {
        match self {
            VotingPowerPolicy::V1(power_unit) => {
                let units = if *power_unit > 0 {
                    balance.max(0) / power_unit
                } else {
                    0
                };
                (units.min(u64::MAX as i128) as u64).max(1)
            }
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        match self {
            VotingPowerPolicy::V1(power_unit) if *power_unit <= 0 => Err(Error::InvalidConfig),
            VotingPowerPolicy::V1(_) => Ok(()),
        }
    }
}

// ===== VOTING MANAGER =====

pub struct VotingManager;

impl VotingManager {
    /// Record a vote on an active dispute.
    ///
    /// Voting power is derived from the voter's token balance at vote time.
    pub fn cast_vote(
        env: &Env,
        voter: &Address,
        dispute_id: u64,
        choice: VoteChoice,
    ) -> Result<u64, Error> {
        voter.require_auth();

        let config = ConfigManager::get_config(env)?;
        let mut dispute = Storage::get_dispute(env, dispute_id)?;
        let height = env.ledger().sequence();

        VotingValidator::validate_vote(env, &dispute, voter, height)?;

        let balance = TokenEscrow::balance(env, voter)?;
        if balance < config.min_voter_balance {
            return Err(Error::InsufficientVoterBalance);
        }
        let voting_power = config.voting_power.power(balance);

        let vote = DisputeVote {
            dispute_id,
            voter: voter.clone(),
            voting_power,
            choice,
            voted_at_height: height,
        };
        Self::apply_vote(&mut dispute, &vote);

        Storage::set_vote(env, &vote);
        Storage::set_dispute(env, &dispute);

        EventEmitter::emit_vote_cast(env, dispute_id, voter, choice, voting_power);
        Ok(voting_power)
    }

    fn apply_vote(dispute: &mut Dispute, vote: &DisputeVote) {
        match vote.choice {
            VoteChoice::Uphold => dispute.votes_for += vote.voting_power,
            VoteChoice::Reject => dispute.votes_against += vote.voting_power,
        }
    }

    /// Strict majority upholds; a tie rejects.
    pub fn is_upheld(dispute: &Dispute) -> bool {
        dispute.votes_for > dispute.votes_against
    }
}

// ===== VOTING VALIDATOR =====

pub struct VotingValidator;

impl VotingValidator {
    pub fn validate_vote(
        env: &Env,
        dispute: &Dispute,
        voter: &Address,
        height: u32,
    ) -> Result<(), Error> {
        if dispute.status != DisputeStatus::Active {
            return Err(Error::DisputeNotActive);
        }
        if height >= dispute.voting_deadline_height {
            return Err(Error::VotingClosed);
        }
        if Storage::get_vote(env, dispute.id, voter).is_some() {
            return Err(Error::AlreadyVoted);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DisputeResolution, WinningOutcome};
    use soroban_sdk::testutils::Address as _;
    use soroban_sdk::String;

    fn dispute(env: &Env, votes_for: u64, votes_against: u64) -> Dispute {
        Dispute {
            id: 1,
            pool_id: 1,
            disputer: Address::generate(env),
            bond_amount: 0,
            reason: String::from_str(env, "wrong feed"),
            evidence_hash: None,
            created_at_height: 0,
            voting_deadline_height: 100,
            status: DisputeStatus::Active,
            resolution: DisputeResolution::None,
            votes_for,
            votes_against,
            overturned_outcome: WinningOutcome::None,
        }
    }

    #[test]
    fn test_power_is_floor_of_balance_over_unit() {
        let policy = VotingPowerPolicy::V1(10);
        assert_eq!(policy.power(75), 7);
        assert_eq!(policy.power(100), 10);
    }

    #[test]
    fn test_power_has_floor_of_one() {
        let policy = VotingPowerPolicy::V1(1_000);
        assert_eq!(policy.power(1), 1);
        assert_eq!(policy.power(0), 1);
    }

    #[test]
    fn test_policy_rejects_non_positive_unit() {
        assert_eq!(VotingPowerPolicy::V1(0).validate(), Err(Error::InvalidConfig));
        assert!(VotingPowerPolicy::V1(1).validate().is_ok());
    }

    #[test]
    fn test_strict_majority_upholds_and_tie_rejects() {
        let env = Env::default();
        assert!(VotingManager::is_upheld(&dispute(&env, 7, 3)));
        assert!(!VotingManager::is_upheld(&dispute(&env, 5, 5)));
        assert!(!VotingManager::is_upheld(&dispute(&env, 0, 0)));
    }

    #[test]
    fn test_apply_vote_updates_tally() {
        let env = Env::default();
        let mut d = dispute(&env, 0, 0);
        let vote = DisputeVote {
            dispute_id: 1,
            voter: Address::generate(&env),
            voting_power: 4,
            choice: VoteChoice::Reject,
            voted_at_height: 1,
        };
        VotingManager::apply_vote(&mut d, &vote);
        assert_eq!(d.votes_against, 4);
        assert_eq!(d.votes_for, 0);
    }
}
