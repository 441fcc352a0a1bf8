//! Deterministic survival comparison: Kaplan-Meier estimator per arm plus a
//! two-group log-rank test. No randomness anywhere; identical inputs always
//! reproduce identical output.

pub mod km;
pub mod logrank;
pub mod special;

pub use km::{fit, KmCurve, Observation};
pub use logrank::{log_rank, LogRankResult};

use onco_core::SurvivalResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StatsError {
    #[error("treatment arm '{0}' has no observations")]
    EmptyGroup(String),
    #[error("treatment arm '{0}' has zero observed events; the log-rank p-value is undefined")]
    ZeroEventGroup(String),
    #[error("treatment arm '{0}' contains a non-finite or negative duration")]
    InvalidDuration(String),
}

/// One arm's time-to-event sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmData {
    pub treatment: String,
    pub observations: Vec<Observation>,
}

/// Compare two treatment arms.
///
/// Validates both samples up front (a zero-event group is a typed failure,
/// never a fabricated number), then fits a Kaplan-Meier curve per arm and
/// runs the log-rank test across the pooled event times.
pub fn evaluate(arm_a: &ArmData, arm_b: &ArmData) -> Result<SurvivalResult, StatsError> {
    validate_arm(arm_a)?;
    validate_arm(arm_b)?;

    let curve_a = km::fit(&arm_a.observations);
    let curve_b = km::fit(&arm_b.observations);
    let lr = logrank::log_rank(&arm_a.observations, &arm_b.observations);

    let mut group_curves = BTreeMap::new();
    group_curves.insert(arm_a.treatment.clone(), curve_a.points);
    group_curves.insert(arm_b.treatment.clone(), curve_b.points);

    let mut medians = BTreeMap::new();
    medians.insert(arm_a.treatment.clone(), curve_a.median);
    medians.insert(arm_b.treatment.clone(), curve_b.median);

    let mut observed_expected = BTreeMap::new();
    observed_expected.insert(arm_a.treatment.clone(), lr.observed_expected_a);
    observed_expected.insert(arm_b.treatment.clone(), lr.observed_expected_b);

    Ok(SurvivalResult {
        group_curves,
        test_statistic: lr.chi_square,
        p_value: lr.p_value,
        median_survival_by_group: medians,
        events_observed_vs_expected: observed_expected,
    })
}

fn validate_arm(arm: &ArmData) -> Result<(), StatsError> {
    if arm.observations.is_empty() {
        return Err(StatsError::EmptyGroup(arm.treatment.clone()));
    }
    if arm
        .observations
        .iter()
        .any(|o| !o.duration.is_finite() || o.duration < 0.0)
    {
        return Err(StatsError::InvalidDuration(arm.treatment.clone()));
    }
    if !arm.observations.iter().any(|o| o.event_observed) {
        return Err(StatsError::ZeroEventGroup(arm.treatment.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arm(treatment: &str, pairs: &[(f64, bool)]) -> ArmData {
        ArmData {
            treatment: treatment.into(),
            observations: pairs
                .iter()
                .map(|(duration, event_observed)| Observation {
                    duration: *duration,
                    event_observed: *event_observed,
                })
                .collect(),
        }
    }

    fn pembrolizumab() -> ArmData {
        arm(
            "pembrolizumab",
            &[
                (6.0, true),
                (8.0, true),
                (10.0, false),
                (12.0, true),
                (15.0, false),
                (18.0, false),
                (20.0, false),
                (24.0, false),
                (28.0, true),
                (36.0, false),
            ],
        )
    }

    fn nivolumab() -> ArmData {
        arm(
            "nivolumab",
            &[
                (2.0, true),
                (3.0, true),
                (4.0, true),
                (5.0, true),
                (6.0, true),
                (7.0, true),
                (8.0, true),
                (9.0, true),
                (10.0, false),
                (12.0, false),
            ],
        )
    }

    #[test]
    fn demo_comparison_medians_and_p_value() {
        let result = evaluate(&pembrolizumab(), &nivolumab()).unwrap();
        assert!((result.p_value - 0.008298).abs() < 1e-4);
        assert_eq!(result.median_survival_by_group["pembrolizumab"], Some(28.0));
        assert_eq!(result.median_survival_by_group["nivolumab"], Some(6.0));
    }

    #[test]
    fn evaluate_is_deterministic() {
        let a = evaluate(&pembrolizumab(), &nivolumab()).unwrap();
        let b = evaluate(&pembrolizumab(), &nivolumab()).unwrap();
        assert_eq!(a.p_value.to_bits(), b.p_value.to_bits());
        assert_eq!(a.median_survival_by_group, b.median_survival_by_group);
    }

    #[test]
    fn evaluate_is_row_order_invariant() {
        let mut shuffled = pembrolizumab();
        shuffled.observations.reverse();
        shuffled.observations.swap(1, 4);
        let a = evaluate(&pembrolizumab(), &nivolumab()).unwrap();
        let b = evaluate(&shuffled, &nivolumab()).unwrap();
        assert_eq!(a.p_value.to_bits(), b.p_value.to_bits());
    }

    #[test]
    fn zero_event_group_is_a_typed_failure() {
        let censored_only = arm("nivolumab", &[(3.0, false), (5.0, false)]);
        let err = evaluate(&pembrolizumab(), &censored_only).unwrap_err();
        assert_eq!(err, StatsError::ZeroEventGroup("nivolumab".into()));
    }

    #[test]
    fn empty_group_is_a_typed_failure() {
        let empty = arm("nivolumab", &[]);
        let err = evaluate(&pembrolizumab(), &empty).unwrap_err();
        assert_eq!(err, StatsError::EmptyGroup("nivolumab".into()));
    }

    #[test]
    fn non_finite_duration_is_a_typed_failure() {
        let bad = arm("nivolumab", &[(f64::NAN, true), (4.0, true)]);
        let err = evaluate(&pembrolizumab(), &bad).unwrap_err();
        assert_eq!(err, StatsError::InvalidDuration("nivolumab".into()));
    }

    #[test]
    fn curves_are_non_increasing_for_every_group() {
        let result = evaluate(&pembrolizumab(), &nivolumab()).unwrap();
        for points in result.group_curves.values() {
            for w in points.windows(2) {
                assert!(w[1].survival <= w[0].survival + 1e-12);
            }
        }
    }
}
