use soroban_sdk::{contracttype, Env, String, Vec};

use crate::config::CONFLICT_THRESHOLD_PERCENT;
use crate::errors::Error;
use crate::storage::Storage;
use crate::types::{
    CriteriaKind, Criterion, FailureReason, LogicalOperator, OracleSubmission, OracleValue,
    ResolutionConfig, Verdict,
};

// ===== CONSENSUS TYPES =====

/// A submission paired with its consensus weight
/// (`confidence x reliability_score`).
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WeightedSubmission {
    pub submission_id: u64,
    pub provider_id: u64,
    pub data_type: String,
    pub value: OracleValue,
    pub weight: i128,
}

/// Accumulated weight behind one distinct reported value.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ValueTally {
    pub value: OracleValue,
    pub weight: i128,
}

/// Result of one evaluation pass.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Evaluation {
    pub verdict: Verdict,
    /// Submissions backing the sub-criteria that produced a definite result
    pub used: Vec<WeightedSubmission>,
    /// Qualifying submissions for data types named by a criterion
    pub considered: Vec<WeightedSubmission>,
}

/// Outcome of a single criterion.
#[derive(Clone, Debug, Eq, PartialEq)]
enum CriterionResult {
    Holds(bool),
    Fails(FailureReason),
}

// ===== CONSENSUS EVALUATOR =====

/// Aggregates oracle submissions into a verdict against a pool's criteria.
///
/// Only submissions from active providers listed in the pool's
/// `oracle_source_ids` qualify. For every criterion the qualifying reports
/// for its data type are weighted by `confidence x reliability_score`:
/// numeric criteria use the weighted average, boolean and categorical
/// criteria the weighted-majority value. When the runner-up value carries at
/// least 40% of the total weight the criterion fails with `ConflictingData`.
///
/// Criteria are combined with three-valued logic: under `And` a definite
/// `false` decides the result even if another criterion failed, under `Or` a
/// definite `true` does. Otherwise the first failure (in configuration order)
/// is reported.
pub struct ConsensusEvaluator;

impl ConsensusEvaluator {
    pub fn evaluate(
        env: &Env,
        config: &ResolutionConfig,
        submissions: &Vec<OracleSubmission>,
    ) -> Result<Evaluation, Error> {
        let mut any_active = false;
        let mut weighted = Vec::new(env);

        for provider_id in config.oracle_source_ids.iter() {
            let provider = Storage::get_provider(env, provider_id)?;
            if !provider.is_active {
                continue;
            }
            any_active = true;

            for submission in submissions.iter() {
                if submission.provider_id != provider_id {
                    continue;
                }
                weighted.push_back(WeightedSubmission {
                    submission_id: submission.id,
                    provider_id,
                    data_type: submission.data_type.clone(),
                    value: submission.value.clone(),
                    weight: (submission.confidence as i128) * (provider.reliability_score as i128),
                });
            }
        }

        if !any_active {
            return Ok(Evaluation {
                verdict: Verdict::Failure(FailureReason::OracleUnavailable),
                used: Vec::new(env),
                considered: Vec::new(env),
            });
        }

        Ok(Self::evaluate_weighted(env, config, &weighted))
    }

    /// Evaluate already-weighted submissions against the config's criteria.
    pub fn evaluate_weighted(
        env: &Env,
        config: &ResolutionConfig,
        weighted: &Vec<WeightedSubmission>,
    ) -> Evaluation {
        let mut used = Vec::new(env);
        let mut first_failure: Option<FailureReason> = None;
        let mut decided: Option<bool> = None;
        let mut all_hold = true;
        let mut any_holds = false;

        for criterion in config.criteria.iter() {
            let matching = Self::matching_submissions(env, &criterion, weighted);
            match Self::evaluate_criterion(env, &criterion, &matching, weighted) {
                CriterionResult::Holds(holds) => {
                    used.append(&matching);
                    all_hold &= holds;
                    any_holds |= holds;
                    let short_circuits = match config.logical_operator {
                        LogicalOperator::And => !holds,
                        LogicalOperator::Or => holds,
                    };
                    if short_circuits && decided.is_none() {
                        decided = Some(holds);
                    }
                }
                CriterionResult::Fails(reason) => {
                    if first_failure.is_none() {
                        first_failure = Some(reason);
                    }
                }
            }
        }

        let verdict = match (decided, first_failure) {
            (Some(holds), _) => Verdict::Success(config.outcome_for(holds)),
            (None, Some(reason)) => Verdict::Failure(reason),
            (None, None) => {
                let holds = match config.logical_operator {
                    LogicalOperator::And => all_hold,
                    LogicalOperator::Or => any_holds,
                };
                Verdict::Success(config.outcome_for(holds))
            }
        };

        if let Verdict::Failure(_) = verdict {
            used = Vec::new(env);
        }

        Evaluation {
            verdict,
            used,
            considered: Self::named_by_criteria(env, config, weighted),
        }
    }

    fn named_by_criteria(
        env: &Env,
        config: &ResolutionConfig,
        weighted: &Vec<WeightedSubmission>,
    ) -> Vec<WeightedSubmission> {
        let mut named = Vec::new(env);
        for submission in weighted.iter() {
            if config
                .criteria
                .iter()
                .any(|criterion| criterion.data_type == submission.data_type)
            {
                named.push_back(submission);
            }
        }
        named
    }

    /// Submissions for the criterion's data type whose value kind matches the
    /// criterion.
    fn matching_submissions(
        env: &Env,
        criterion: &Criterion,
        weighted: &Vec<WeightedSubmission>,
    ) -> Vec<WeightedSubmission> {
        let mut matching = Vec::new(env);
        for submission in weighted.iter() {
            if submission.data_type == criterion.data_type
                && Self::kind_matches(&criterion.kind, &submission.value)
            {
                matching.push_back(submission);
            }
        }
        matching
    }

    fn kind_matches(kind: &CriteriaKind, value: &OracleValue) -> bool {
        matches!(
            (kind, value),
            (CriteriaKind::NumericThreshold(_), OracleValue::Numeric(_))
                | (CriteriaKind::BooleanEquality(_), OracleValue::Boolean(_))
                | (CriteriaKind::CategoricalMajority(_), OracleValue::Text(_))
        )
    }

    fn evaluate_criterion(
        env: &Env,
        criterion: &Criterion,
        matching: &Vec<WeightedSubmission>,
        weighted: &Vec<WeightedSubmission>,
    ) -> CriterionResult {
        if matching.is_empty() {
            return CriterionResult::Fails(Self::missing_data_reason(criterion, weighted));
        }

        let total_weight: i128 = matching.iter().map(|s| s.weight).sum();
        if total_weight <= 0 {
            return CriterionResult::Fails(FailureReason::InsufficientData);
        }

        let tallies = Self::tally(env, matching);
        let (leader, runner_up_weight) = Self::leader(&tallies);
        if Self::is_conflicting(runner_up_weight, total_weight) {
            return CriterionResult::Fails(FailureReason::ConflictingData);
        }

        match (&criterion.kind, leader) {
            (CriteriaKind::NumericThreshold(threshold), _) => {
                match Self::weighted_average(matching, total_weight) {
                    Some(average) => {
                        CriterionResult::Holds(threshold.comparator.compare(average, threshold.value))
                    }
                    None => CriterionResult::Fails(FailureReason::CriteriaUnsatisfiable),
                }
            }
            (CriteriaKind::BooleanEquality(expected), Some(OracleValue::Boolean(observed))) => {
                CriterionResult::Holds(observed == *expected)
            }
            (CriteriaKind::CategoricalMajority(expected), Some(OracleValue::Text(observed))) => {
                CriterionResult::Holds(observed == *expected)
            }
            _ => CriterionResult::Fails(FailureReason::CriteriaUnsatisfiable),
        }
    }

    /// An empty match set is `InsufficientData`, unless reports for the data
    /// type exist with the wrong value kind, which the caller cannot fix by
    /// waiting.
    fn missing_data_reason(
        criterion: &Criterion,
        weighted: &Vec<WeightedSubmission>,
    ) -> FailureReason {
        let reported = weighted
            .iter()
            .any(|submission| submission.data_type == criterion.data_type);
        if reported {
            FailureReason::CriteriaUnsatisfiable
        } else {
            FailureReason::InsufficientData
        }
    }

    fn tally(env: &Env, matching: &Vec<WeightedSubmission>) -> Vec<ValueTally> {
        let mut tallies: Vec<ValueTally> = Vec::new(env);
        for submission in matching.iter() {
            let mut found = false;
            for index in 0..tallies.len() {
                if let Some(mut entry) = tallies.get(index) {
                    if entry.value == submission.value {
                        entry.weight += submission.weight;
                        tallies.set(index, entry);
                        found = true;
                        break;
                    }
                }
            }
            if !found {
                tallies.push_back(ValueTally {
                    value: submission.value.clone(),
                    weight: submission.weight,
                });
            }
        }
        tallies
    }

    /// Heaviest value and the weight of the runner-up. Ties keep the earlier
    /// tally entry: tallies follow `oracle_source_ids` order, then submission
    /// order within a provider.
    fn leader(tallies: &Vec<ValueTally>) -> (Option<OracleValue>, i128) {
        let mut top: Option<ValueTally> = None;
        let mut runner_up_weight: i128 = 0;
        for entry in tallies.iter() {
            match &top {
                Some(current) if entry.weight <= current.weight => {
                    runner_up_weight = runner_up_weight.max(entry.weight);
                }
                Some(current) => {
                    runner_up_weight = current.weight;
                    top = Some(entry);
                }
                None => top = Some(entry),
            }
        }
        (top.map(|entry| entry.value), runner_up_weight)
    }

    pub fn is_conflicting(runner_up_weight: i128, total_weight: i128) -> bool {
        runner_up_weight > 0 && runner_up_weight * 100 >= total_weight * CONFLICT_THRESHOLD_PERCENT
    }

    fn weighted_average(matching: &Vec<WeightedSubmission>, total_weight: i128) -> Option<i128> {
        let mut sum: i128 = 0;
        for submission in matching.iter() {
            if let OracleValue::Numeric(value) = submission.value {
                sum = sum.checked_add(value.checked_mul(submission.weight)?)?;
            }
        }
        sum.checked_div(total_weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Comparator, NumericThreshold, Outcome};
    use soroban_sdk::vec;

    fn price(env: &Env) -> String {
        String::from_str(env, "price")
    }

    fn numeric_config(env: &Env, threshold: i128, operator: LogicalOperator) -> ResolutionConfig {
        ResolutionConfig {
            pool_id: 1,
            oracle_source_ids: vec![env, 1u64, 2u64],
            criteria: vec![
                env,
                Criterion {
                    data_type: price(env),
                    kind: CriteriaKind::NumericThreshold(NumericThreshold {
                        comparator: Comparator::Gte,
                        value: threshold,
                    }),
                },
            ],
            logical_operator: operator,
            outcome_when_true: Outcome::A,
            max_retry_attempts: 3,
        }
    }

    fn weighted(
        env: &Env,
        id: u64,
        data_type: &str,
        value: OracleValue,
        weight: i128,
    ) -> WeightedSubmission {
        WeightedSubmission {
            submission_id: id,
            provider_id: id,
            data_type: String::from_str(env, data_type),
            value,
            weight,
        }
    }

    #[test]
    fn test_agreeing_numeric_reports_settle() {
        let env = Env::default();
        let config = numeric_config(&env, 100_000, LogicalOperator::And);
        let subs = vec![
            &env,
            weighted(&env, 1, "price", OracleValue::Numeric(105_000), 9_000),
            weighted(&env, 2, "price", OracleValue::Numeric(105_000), 8_500),
        ];

        let evaluation = ConsensusEvaluator::evaluate_weighted(&env, &config, &subs);
        assert_eq!(evaluation.verdict, Verdict::Success(Outcome::A));
        assert_eq!(evaluation.used.len(), 2);
    }

    #[test]
    fn test_below_threshold_selects_other_outcome() {
        let env = Env::default();
        let config = numeric_config(&env, 100_000, LogicalOperator::And);
        let subs = vec![
            &env,
            weighted(&env, 1, "price", OracleValue::Numeric(90_000), 100),
        ];

        let evaluation = ConsensusEvaluator::evaluate_weighted(&env, &config, &subs);
        assert_eq!(evaluation.verdict, Verdict::Success(Outcome::B));
    }

    #[test]
    fn test_even_split_is_conflicting() {
        let env = Env::default();
        let config = numeric_config(&env, 100_000, LogicalOperator::And);
        let subs = vec![
            &env,
            weighted(&env, 1, "price", OracleValue::Numeric(120_000), 5_000),
            weighted(&env, 2, "price", OracleValue::Numeric(80_000), 5_000),
        ];

        let evaluation = ConsensusEvaluator::evaluate_weighted(&env, &config, &subs);
        assert_eq!(
            evaluation.verdict,
            Verdict::Failure(FailureReason::ConflictingData)
        );
        assert!(evaluation.used.is_empty());
    }

    #[test]
    fn test_minor_dissent_is_outweighed() {
        let env = Env::default();
        let config = numeric_config(&env, 100_000, LogicalOperator::And);
        let subs = vec![
            &env,
            weighted(&env, 1, "price", OracleValue::Numeric(110_000), 8_000),
            weighted(&env, 2, "price", OracleValue::Numeric(50_000), 2_000),
        ];

        // weighted average is 98_000
        let evaluation = ConsensusEvaluator::evaluate_weighted(&env, &config, &subs);
        assert_eq!(evaluation.verdict, Verdict::Success(Outcome::B));
    }

    #[test]
    fn test_no_reports_is_insufficient_data() {
        let env = Env::default();
        let config = numeric_config(&env, 100_000, LogicalOperator::And);

        let evaluation = ConsensusEvaluator::evaluate_weighted(&env, &config, &Vec::new(&env));
        assert_eq!(
            evaluation.verdict,
            Verdict::Failure(FailureReason::InsufficientData)
        );
    }

    #[test]
    fn test_zero_weight_is_insufficient_data() {
        let env = Env::default();
        let config = numeric_config(&env, 100_000, LogicalOperator::And);
        let subs = vec![
            &env,
            weighted(&env, 1, "price", OracleValue::Numeric(120_000), 0),
        ];

        let evaluation = ConsensusEvaluator::evaluate_weighted(&env, &config, &subs);
        assert_eq!(
            evaluation.verdict,
            Verdict::Failure(FailureReason::InsufficientData)
        );
    }

    #[test]
    fn test_wrong_value_kind_is_unsatisfiable() {
        let env = Env::default();
        let config = numeric_config(&env, 100_000, LogicalOperator::And);
        let subs = vec![
            &env,
            weighted(&env, 1, "price", OracleValue::Boolean(true), 100),
        ];

        let evaluation = ConsensusEvaluator::evaluate_weighted(&env, &config, &subs);
        assert_eq!(
            evaluation.verdict,
            Verdict::Failure(FailureReason::CriteriaUnsatisfiable)
        );
    }

    #[test]
    fn test_categorical_and_boolean_majority() {
        let env = Env::default();
        let mut config = numeric_config(&env, 0, LogicalOperator::And);
        config.criteria = vec![
            &env,
            Criterion {
                data_type: String::from_str(&env, "winner"),
                kind: CriteriaKind::CategoricalMajority(String::from_str(&env, "home")),
            },
            Criterion {
                data_type: String::from_str(&env, "played"),
                kind: CriteriaKind::BooleanEquality(true),
            },
        ];
        let subs = vec![
            &env,
            weighted(&env, 1, "winner", OracleValue::Text(String::from_str(&env, "home")), 900),
            weighted(&env, 2, "winner", OracleValue::Text(String::from_str(&env, "away")), 100),
            weighted(&env, 3, "played", OracleValue::Boolean(true), 500),
        ];

        let evaluation = ConsensusEvaluator::evaluate_weighted(&env, &config, &subs);
        assert_eq!(evaluation.verdict, Verdict::Success(Outcome::A));
        assert_eq!(evaluation.used.len(), 3);
    }

    #[test]
    fn test_and_decided_by_false_despite_missing_data() {
        let env = Env::default();
        let mut config = numeric_config(&env, 100_000, LogicalOperator::And);
        config.criteria.push_back(Criterion {
            data_type: String::from_str(&env, "volume"),
            kind: CriteriaKind::NumericThreshold(NumericThreshold {
                comparator: Comparator::Gt,
                value: 0,
            }),
        });
        let subs = vec![
            &env,
            weighted(&env, 1, "price", OracleValue::Numeric(10), 100),
        ];

        let evaluation = ConsensusEvaluator::evaluate_weighted(&env, &config, &subs);
        assert_eq!(evaluation.verdict, Verdict::Success(Outcome::B));
    }

    #[test]
    fn test_or_with_missing_data_reports_failure() {
        let env = Env::default();
        let mut config = numeric_config(&env, 100_000, LogicalOperator::Or);
        config.criteria.push_back(Criterion {
            data_type: String::from_str(&env, "volume"),
            kind: CriteriaKind::NumericThreshold(NumericThreshold {
                comparator: Comparator::Gt,
                value: 0,
            }),
        });
        let subs = vec![
            &env,
            weighted(&env, 1, "price", OracleValue::Numeric(10), 100),
        ];

        let evaluation = ConsensusEvaluator::evaluate_weighted(&env, &config, &subs);
        assert_eq!(
            evaluation.verdict,
            Verdict::Failure(FailureReason::InsufficientData)
        );
    }

    #[test]
    fn test_unnamed_data_types_are_not_considered() {
        let env = Env::default();
        let config = numeric_config(&env, 100_000, LogicalOperator::And);
        let subs = vec![
            &env,
            weighted(&env, 1, "volume", OracleValue::Numeric(5_000), 100),
        ];

        let evaluation = ConsensusEvaluator::evaluate_weighted(&env, &config, &subs);
        assert_eq!(
            evaluation.verdict,
            Verdict::Failure(FailureReason::InsufficientData)
        );
        assert!(evaluation.considered.is_empty());
    }

    #[test]
    fn test_conflict_threshold_boundary() {
        assert!(ConsensusEvaluator::is_conflicting(40, 100));
        assert!(!ConsensusEvaluator::is_conflicting(39, 100));
        assert!(!ConsensusEvaluator::is_conflicting(0, 100));
    }
}
