use crate::model::{
    EvidenceSet, Grade, Recommendation, RiskProfile, Strength, SurvivalResult,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Confidence-score weighting. The weights are tunable rather than baked
/// into the synthesis code:
///
/// confidence = w_significance * (1 - p)
///            + w_volume * min(evidence_count / volume_cap, 1)
///            + w_effect * min(|effect| / effect_scale_months, 1)
///
/// clamped to [0, 1]. Each term is monotonic in its input. `volume_cap`
/// mirrors the 1A evidence threshold; `effect_scale_months` mirrors the
/// 12-month survival-benefit bar of the top cascade rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesizerConfig {
    pub weight_significance: f64,
    pub weight_volume: f64,
    pub weight_effect: f64,
    pub volume_cap: usize,
    pub effect_scale_months: f64,
    /// |effect| needed (together with p < 0.01 and volume >= volume_cap) for 1A.
    pub effect_threshold_high: f64,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            weight_significance: 0.50,
            weight_volume: 0.25,
            weight_effect: 0.25,
            volume_cap: 10,
            effect_scale_months: 12.0,
            effect_threshold_high: 12.0,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SynthesisError {
    #[error("neither arm reached median survival; evidence is inconclusive")]
    InconclusiveEvidence,
    #[error("survival result does not cover two treatment arms")]
    MissingArm,
}

/// Tagged grade-cascade conditions, ordered. First match wins; `Fallback`
/// makes the cascade total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CascadeRule {
    HighCertainty,
    ModerateCertainty,
    SignificantOnly,
    Fallback,
}

fn classify(p_value: f64, evidence_count: usize, effect: f64, cfg: &SynthesizerConfig) -> CascadeRule {
    if p_value < 0.01 && evidence_count >= cfg.volume_cap && effect.abs() >= cfg.effect_threshold_high {
        CascadeRule::HighCertainty
    } else if p_value < 0.05 && evidence_count >= 5 {
        CascadeRule::ModerateCertainty
    } else if p_value < 0.05 {
        CascadeRule::SignificantOnly
    } else {
        CascadeRule::Fallback
    }
}

/// Combine evidence volume, statistical significance and effect size into a
/// graded recommendation. Deterministic; the optional risk profile only
/// augments the rationale text.
pub fn synthesize(
    evidence: &EvidenceSet,
    survival: &SurvivalResult,
    risk: Option<&RiskProfile>,
    cfg: &SynthesizerConfig,
) -> Result<Recommendation, SynthesisError> {
    let (preferred, other, effect) = preferred_arm(survival)?;

    let p_value = survival.p_value;
    let evidence_count = evidence.total_found;

    let (grade, strength) = match classify(p_value, evidence_count, effect, cfg) {
        CascadeRule::HighCertainty => (Grade::OneA, Strength::Strong),
        CascadeRule::ModerateCertainty => (Grade::OneB, Strength::Strong),
        CascadeRule::SignificantOnly => (Grade::TwoB, Strength::Weak),
        CascadeRule::Fallback => (Grade::TwoC, Strength::Weak),
    };

    let confidence = confidence_score(p_value, evidence_count, effect, cfg);

    let mut rationale = templated_rationale(&preferred, &other, p_value, evidence_count, effect);
    if let Some(r) = risk {
        rationale.push_str(&format!(
            " Grade 3-4 adverse-event rate for {}: {:.0}%.",
            r.treatment,
            r.severe_grade_rate * 100.0
        ));
    }

    Ok(Recommendation {
        preferred_arm: preferred,
        grade,
        strength,
        confidence,
        rationale,
        supporting_p_value: p_value,
        supporting_effect_size: effect,
        evidence_count,
    })
}

pub fn confidence_score(p_value: f64, evidence_count: usize, effect: f64, cfg: &SynthesizerConfig) -> f64 {
    let volume = (evidence_count as f64 / cfg.volume_cap as f64).min(1.0);
    let magnitude = (effect.abs() / cfg.effect_scale_months).min(1.0);
    let score = cfg.weight_significance * (1.0 - p_value)
        + cfg.weight_volume * volume
        + cfg.weight_effect * magnitude;
    score.clamp(0.0, 1.0)
}

/// Rationale template. The p-value, evidence count and effect size are cited
/// with plain `{}` formatting so downstream layers can verify provenance by
/// string matching, without recomputation.
pub fn templated_rationale(preferred: &str, other: &str, p_value: f64, evidence_count: usize, effect: f64) -> String {
    format!(
        "Log-rank p={p_value}, {evidence_count} supporting publications, \
         median survival benefit {effect} months; {preferred} favoured over {other}."
    )
}

/// Pick the preferred arm and the signed effect size (months, relative to the
/// preferred arm).
///
/// - both medians defined and different: higher median wins, effect = difference
/// - both defined and equal: lower log-rank O/E hazard proxy wins, effect = 0
/// - exactly one defined: the arm that never dropped below 50% survival wins;
///   effect is the lower bound last-observed-time minus the opponent median
/// - both undefined: inconclusive
fn preferred_arm(survival: &SurvivalResult) -> Result<(String, String, f64), SynthesisError> {
    let mut arms = survival.median_survival_by_group.iter();
    let (arm_a, med_a) = arms.next().ok_or(SynthesisError::MissingArm)?;
    let (arm_b, med_b) = arms.next().ok_or(SynthesisError::MissingArm)?;

    match (med_a, med_b) {
        (Some(a), Some(b)) if a > b => Ok((arm_a.clone(), arm_b.clone(), a - b)),
        (Some(a), Some(b)) if b > a => Ok((arm_b.clone(), arm_a.clone(), b - a)),
        (Some(_), Some(_)) => {
            let ratio = |arm: &str| {
                survival
                    .events_observed_vs_expected
                    .get(arm)
                    .map(|(o, e)| if *e > 0.0 { o / e } else { f64::INFINITY })
                    .unwrap_or(f64::INFINITY)
            };
            if ratio(arm_a) <= ratio(arm_b) {
                Ok((arm_a.clone(), arm_b.clone(), 0.0))
            } else {
                Ok((arm_b.clone(), arm_a.clone(), 0.0))
            }
        }
        (Some(a), None) => Ok((
            arm_b.clone(),
            arm_a.clone(),
            lower_bound_effect(survival, arm_b, *a),
        )),
        (None, Some(b)) => Ok((
            arm_a.clone(),
            arm_b.clone(),
            lower_bound_effect(survival, arm_a, *b),
        )),
        (None, None) => Err(SynthesisError::InconclusiveEvidence),
    }
}

fn lower_bound_effect(survival: &SurvivalResult, preferred: &str, opponent_median: f64) -> f64 {
    let last_time = survival
        .group_curves
        .get(preferred)
        .and_then(|c| c.last())
        .map(|p| p.time)
        .unwrap_or(opponent_median);
    (last_time - opponent_median).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CurvePoint, EvidenceSource};
    use std::collections::BTreeMap;

    fn evidence(n: usize) -> EvidenceSet {
        EvidenceSet {
            records: vec![],
            total_found: n,
            source: EvidenceSource::Primary,
        }
    }

    fn survival(p: f64, med_a: Option<f64>, med_b: Option<f64>) -> SurvivalResult {
        let mut medians = BTreeMap::new();
        medians.insert("arm_a".to_string(), med_a);
        medians.insert("arm_b".to_string(), med_b);
        let mut curves = BTreeMap::new();
        for arm in ["arm_a", "arm_b"] {
            curves.insert(
                arm.to_string(),
                vec![CurvePoint {
                    time: 36.0,
                    survival: 0.6,
                    lower: 0.4,
                    upper: 0.8,
                }],
            );
        }
        let mut oe = BTreeMap::new();
        oe.insert("arm_a".to_string(), (4.0, 8.0));
        oe.insert("arm_b".to_string(), (8.0, 4.0));
        SurvivalResult {
            group_curves: curves,
            test_statistic: 0.0,
            p_value: p,
            median_survival_by_group: medians,
            events_observed_vs_expected: oe,
        }
    }

    #[test]
    fn cascade_rule_one_high_certainty() {
        let rec = synthesize(
            &evidence(12),
            &survival(0.0083, Some(28.0), Some(6.0)),
            None,
            &SynthesizerConfig::default(),
        )
        .unwrap();
        assert_eq!(rec.grade, Grade::OneA);
        assert_eq!(rec.strength, Strength::Strong);
        assert_eq!(rec.preferred_arm, "arm_a");
        assert_eq!(rec.supporting_effect_size, 22.0);
        assert!(rec.confidence >= 0.90, "confidence was {}", rec.confidence);
    }

    #[test]
    fn cascade_rule_two_moderate() {
        let rec = synthesize(
            &evidence(6),
            &survival(0.03, Some(20.0), Some(10.0)),
            None,
            &SynthesizerConfig::default(),
        )
        .unwrap();
        assert_eq!(rec.grade, Grade::OneB);
        assert_eq!(rec.strength, Strength::Strong);
    }

    #[test]
    fn cascade_rule_three_significant_only() {
        let rec = synthesize(
            &evidence(2),
            &survival(0.03, Some(20.0), Some(10.0)),
            None,
            &SynthesizerConfig::default(),
        )
        .unwrap();
        assert_eq!(rec.grade, Grade::TwoB);
        assert_eq!(rec.strength, Strength::Weak);
    }

    #[test]
    fn cascade_falls_back_to_2c() {
        let rec = synthesize(
            &evidence(0),
            &survival(0.40, Some(12.0), Some(11.0)),
            None,
            &SynthesizerConfig::default(),
        )
        .unwrap();
        assert_eq!(rec.grade, Grade::TwoC);
        assert_eq!(rec.strength, Strength::Weak);
    }

    #[test]
    fn first_matching_rule_wins() {
        // p < 0.01 but thin evidence: rule 1 fails on volume, rule 2 matches.
        assert_eq!(
            classify(0.005, 6, 20.0, &SynthesizerConfig::default()),
            CascadeRule::ModerateCertainty
        );
    }

    #[test]
    fn undefined_median_prefers_that_arm() {
        let rec = synthesize(
            &evidence(5),
            &survival(0.02, None, Some(9.0)),
            None,
            &SynthesizerConfig::default(),
        )
        .unwrap();
        assert_eq!(rec.preferred_arm, "arm_a");
        // Lower bound: last curve time 36.0 minus opponent median 9.0.
        assert_eq!(rec.supporting_effect_size, 27.0);
    }

    #[test]
    fn equal_medians_break_tie_on_hazard_proxy() {
        let rec = synthesize(
            &evidence(5),
            &survival(0.02, Some(12.0), Some(12.0)),
            None,
            &SynthesizerConfig::default(),
        )
        .unwrap();
        // arm_a: O/E = 0.5; arm_b: O/E = 2.0.
        assert_eq!(rec.preferred_arm, "arm_a");
        assert_eq!(rec.supporting_effect_size, 0.0);
    }

    #[test]
    fn both_medians_undefined_is_inconclusive() {
        let err = synthesize(
            &evidence(5),
            &survival(0.02, None, None),
            None,
            &SynthesizerConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err, SynthesisError::InconclusiveEvidence);
    }

    #[test]
    fn confidence_is_monotonic_in_each_input() {
        let cfg = SynthesizerConfig::default();
        assert!(confidence_score(0.01, 8, 10.0, &cfg) > confidence_score(0.05, 8, 10.0, &cfg));
        assert!(confidence_score(0.01, 9, 10.0, &cfg) > confidence_score(0.01, 8, 10.0, &cfg));
        assert!(confidence_score(0.01, 8, 11.0, &cfg) > confidence_score(0.01, 8, 10.0, &cfg));
    }

    #[test]
    fn rationale_cites_inputs_verbatim() {
        let rec = synthesize(
            &evidence(12),
            &survival(0.0083, Some(28.0), Some(6.0)),
            None,
            &SynthesizerConfig::default(),
        )
        .unwrap();
        assert!(rec.rationale.contains(&format!("{}", rec.supporting_p_value)));
        assert!(rec.rationale.contains(&format!("{}", rec.evidence_count)));
        assert!(rec.rationale.contains(&format!("{}", rec.supporting_effect_size)));
    }
}
