use crate::model::{GateDecision, GateOutcome, Recommendation, RiskProfile};
use crate::time::EpochMs;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Recommendations below this confidence come back for modification.
    pub min_confidence: f64,
    /// Supporting p-values at or above this are not strong enough to approve.
    pub significance_ceiling: f64,
    /// Severe (grade 3-4) adverse-event rate above this rejects outright.
    pub severe_rate_ceiling: f64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.70,
            significance_ceiling: 0.05,
            severe_rate_ceiling: 0.25,
        }
    }
}

/// Ordered gate conditions; the first that holds decides the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateRule {
    LowConfidence,
    InsufficientSignificance,
    SafetyCeilingExceeded,
    Clean,
}

fn classify(rec: &Recommendation, risk: Option<&RiskProfile>, cfg: &GateConfig) -> GateRule {
    if rec.confidence < cfg.min_confidence {
        GateRule::LowConfidence
    } else if rec.supporting_p_value >= cfg.significance_ceiling {
        GateRule::InsufficientSignificance
    } else if risk.map_or(false, |r| r.severe_grade_rate > cfg.severe_rate_ceiling) {
        GateRule::SafetyCeilingExceeded
    } else {
        GateRule::Clean
    }
}

/// Evaluate a complete recommendation exactly once. Pure: the same inputs
/// always produce the same outcome and comment; only the timestamp varies.
pub fn review(
    rec: &Recommendation,
    risk: Option<&RiskProfile>,
    cfg: &GateConfig,
    evaluated_ms: EpochMs,
) -> GateDecision {
    let (outcome, reviewer_comment) = match classify(rec, risk, cfg) {
        GateRule::LowConfidence => (
            GateOutcome::Modified,
            format!(
                "Confidence {:.2} is below the {:.2} review floor. \
                 Recommend dose adjustment or corticosteroid prophylaxis before adoption.",
                rec.confidence, cfg.min_confidence
            ),
        ),
        GateRule::InsufficientSignificance => (
            GateOutcome::Modified,
            format!(
                "Supporting p-value {} does not meet the {} significance ceiling. \
                 Suggest clinical trial enrollment instead of a first-line recommendation.",
                rec.supporting_p_value, cfg.significance_ceiling
            ),
        ),
        GateRule::SafetyCeilingExceeded => (
            GateOutcome::Rejected,
            format!(
                "Severe adverse-event rate for {} exceeds the {:.0}% safety ceiling.",
                rec.preferred_arm,
                cfg.severe_rate_ceiling * 100.0
            ),
        ),
        GateRule::Clean => (
            GateOutcome::Approved,
            "Strong evidence and acceptable safety profile. Proceed with recommendation.".to_string(),
        ),
    };

    GateDecision {
        outcome,
        reviewer_comment,
        evaluated_ms,
    }
}
