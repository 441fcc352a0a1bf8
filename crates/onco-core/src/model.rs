use crate::ids::SessionId;
use crate::time::EpochMs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// One workflow run is identified by exactly one Query. Immutable once submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    pub cancer_type: String,
    /// Ordered; the evaluator compares the first two arms.
    pub treatment_arms: Vec<String>,
    /// Inclusive publication-year range, e.g. (2023, 2025).
    pub min_year: u16,
    pub max_year: u16,
    pub max_results: usize,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("cancer_type must not be empty")]
    EmptyCancerType,
    #[error("a query needs at least two treatment arms, got {0}")]
    TooFewArms(usize),
    #[error("max_results must be at least 1")]
    ZeroMaxResults,
    #[error("year range {0}..={1} is inverted")]
    InvertedYearRange(u16, u16),
}

impl Query {
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.cancer_type.trim().is_empty() {
            return Err(QueryError::EmptyCancerType);
        }
        if self.treatment_arms.len() < 2 {
            return Err(QueryError::TooFewArms(self.treatment_arms.len()));
        }
        if self.max_results == 0 {
            return Err(QueryError::ZeroMaxResults);
        }
        if self.min_year > self.max_year {
            return Err(QueryError::InvertedYearRange(self.min_year, self.max_year));
        }
        Ok(())
    }
}

/// A normalized publication record. Produced only by an evidence backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvidenceRecord {
    pub title: String,
    pub authors: Vec<String>,
    pub venue: String,
    pub year: Option<u16>,
    /// Backend-native identifier (PMID, Europe PMC id, ...).
    pub external_id: String,
    pub abstract_text: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceSource {
    Primary,
    Fallback,
}

/// Records keep the backend's relevance/date order; no cross-backend dedup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceSet {
    pub records: Vec<EvidenceRecord>,
    pub total_found: usize,
    pub source: EvidenceSource,
}

impl EvidenceSet {
    pub fn empty(source: EvidenceSource) -> Self {
        Self {
            records: vec![],
            total_found: 0,
            source,
        }
    }
}

/// One point of a product-limit survival curve, with Greenwood bands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurvePoint {
    pub time: f64,
    pub survival: f64,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurvivalResult {
    pub group_curves: BTreeMap<String, Vec<CurvePoint>>,
    pub test_statistic: f64,
    pub p_value: f64,
    /// None = median not reached.
    pub median_survival_by_group: BTreeMap<String, Option<f64>>,
    /// Log-rank observed and expected event totals per arm. The O/E ratio is
    /// the hazard proxy used to break a median tie.
    pub events_observed_vs_expected: BTreeMap<String, (f64, f64)>,
}

/// Static adverse-event profile for a treatment; independent of any Query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskProfile {
    pub treatment: String,
    pub any_grade_rate: f64,
    pub severe_grade_rate: f64,
    pub named_event_rates: BTreeMap<String, f64>,
    pub monitoring_note: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Grade {
    #[serde(rename = "1A")]
    OneA,
    #[serde(rename = "1B")]
    OneB,
    #[serde(rename = "2A")]
    TwoA,
    #[serde(rename = "2B")]
    TwoB,
    #[serde(rename = "2C")]
    TwoC,
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Grade::OneA => "1A",
            Grade::OneB => "1B",
            Grade::TwoA => "2A",
            Grade::TwoB => "2B",
            Grade::TwoC => "2C",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    Strong,
    Weak,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub preferred_arm: String,
    pub grade: Grade,
    pub strength: Strength,
    /// In [0, 1].
    pub confidence: f64,
    pub rationale: String,
    pub supporting_p_value: f64,
    /// Median survival benefit in months, relative to the preferred arm.
    pub supporting_effect_size: f64,
    pub evidence_count: usize,
}

/// Terminal gate states. The pending state is the absence of a GateDecision on
/// the in-flight record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GateOutcome {
    Approved,
    Modified,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateDecision {
    pub outcome: GateOutcome,
    pub reviewer_comment: String,
    pub evaluated_ms: EpochMs,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Complete,
    Incomplete,
}

/// The durable, session-keyed audit record. Owned by the orchestrator while
/// in flight; immutable once committed to the audit store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRecord {
    pub session_id: SessionId,
    pub query: Query,
    pub evidence: Option<EvidenceSet>,
    pub survival: Option<SurvivalResult>,
    pub risk: Option<RiskProfile>,
    pub recommendation: Option<Recommendation>,
    pub gate: Option<GateDecision>,
    pub status: RunStatus,
    pub warnings: Vec<String>,
    pub created_ms: EpochMs,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> Query {
        Query {
            cancer_type: "melanoma".into(),
            treatment_arms: vec!["pembrolizumab".into(), "nivolumab".into()],
            min_year: 2023,
            max_year: 2025,
            max_results: 12,
        }
    }

    #[test]
    fn valid_query_passes() {
        assert!(query().validate().is_ok());
    }

    #[test]
    fn query_needs_two_arms() {
        let mut q = query();
        q.treatment_arms.truncate(1);
        assert_eq!(q.validate(), Err(QueryError::TooFewArms(1)));
    }

    #[test]
    fn query_rejects_inverted_year_range() {
        let mut q = query();
        q.min_year = 2026;
        assert_eq!(q.validate(), Err(QueryError::InvertedYearRange(2026, 2025)));
    }

    #[test]
    fn query_rejects_zero_max_results() {
        let mut q = query();
        q.max_results = 0;
        assert_eq!(q.validate(), Err(QueryError::ZeroMaxResults));
    }
}
