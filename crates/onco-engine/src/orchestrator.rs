use std::sync::Arc;
use std::time::Duration;

use onco_audit::{AuditError, AuditStore};
use onco_core::{
    backoff_delay_ms, gate, now_ms, reasoner, risk, EvidenceSet, EvidenceSource, Query, QueryError,
    RiskError, RiskProfile, RunStatus, SessionId, SurvivalResult, SynthesisError, WorkflowRecord,
};
use onco_evidence::{EvidenceBackend, SearchFailure};
use onco_stats::{ArmData, StatsError};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::narrative::{carries_citations, NarrativeClient};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("invalid query: {0}")]
    InvalidQuery(#[from] QueryError),
    #[error("invalid samples: {0}")]
    InvalidSamples(String),
    #[error(transparent)]
    UnknownTreatment(#[from] RiskError),
    #[error("statistical evaluation failed: {0}")]
    Computation(#[from] StatsError),
    #[error("synthesis failed: {0}")]
    Inconclusive(#[from] SynthesisError),
    #[error("audit persistence failed: {0}")]
    Persistence(#[from] AuditError),
    #[error("internal task failure: {0}")]
    Internal(String),
}

/// One run's inputs: the literature query plus the two-arm survival samples
/// the statistics run on.
#[derive(Debug, Clone)]
pub struct RunInput {
    pub query: Query,
    pub samples: Vec<ArmData>,
}

/// Drives one workflow end to end: literature retrieval and survival
/// statistics concurrently, then synthesis, gate review and an audit commit.
///
/// All retry, fallback and degradation policy is here; the stages themselves
/// are pure or single-shot.
pub struct Orchestrator {
    primary: Arc<dyn EvidenceBackend>,
    fallback: Option<Arc<dyn EvidenceBackend>>,
    narrative: Option<Arc<dyn NarrativeClient>>,
    audit: Arc<dyn AuditStore>,
    config: EngineConfig,
}

impl Orchestrator {
    pub fn new(
        primary: Arc<dyn EvidenceBackend>,
        audit: Arc<dyn AuditStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            primary,
            fallback: None,
            narrative: None,
            audit,
            config,
        }
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn EvidenceBackend>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn with_narrative(mut self, narrative: Arc<dyn NarrativeClient>) -> Self {
        self.narrative = Some(narrative);
        self
    }

    pub async fn run(&self, input: RunInput) -> Result<WorkflowRecord, WorkflowError> {
        input.query.validate()?;
        validate_samples(&input.query, &input.samples)?;

        // Fail fast on an unrecognized treatment: nothing has been committed
        // yet, so an unusable query leaves no audit trace.
        let profiles: Vec<RiskProfile> = input
            .samples
            .iter()
            .map(|s| risk::assess(&s.treatment))
            .collect::<Result<_, _>>()?;

        let session_id = SessionId::new();
        let created_ms = now_ms();
        info!(session = session_id.as_str(), cancer_type = %input.query.cancer_type, "workflow started");

        let arm_a = input.samples[0].clone();
        let arm_b = input.samples[1].clone();
        let stats_task =
            tokio::task::spawn_blocking(move || onco_stats::evaluate(&arm_a, &arm_b));

        let (evidence_outcome, stats_outcome) =
            tokio::join!(self.gather_evidence(&input.query), stats_task);
        let (evidence, mut warnings) = evidence_outcome;
        let survival = stats_outcome.map_err(|e| WorkflowError::Internal(e.to_string()))?;

        let incomplete = |evidence: EvidenceSet,
                          survival: Option<SurvivalResult>,
                          warnings: Vec<String>| WorkflowRecord {
            session_id: session_id.clone(),
            query: input.query.clone(),
            evidence: Some(evidence),
            survival,
            risk: None,
            recommendation: None,
            gate: None,
            status: RunStatus::Incomplete,
            warnings,
            created_ms,
        };

        let survival: SurvivalResult = match survival {
            Ok(s) => s,
            Err(e) => {
                warnings.push(format!("statistical evaluation failed: {e}"));
                self.commit_incomplete(&incomplete(evidence, None, warnings));
                return Err(e.into());
            }
        };

        let recommendation = match self.synthesize(&evidence, &survival, &profiles) {
            Ok(rec) => rec,
            Err(e) => {
                warnings.push(format!("synthesis failed: {e}"));
                self.commit_incomplete(&incomplete(evidence, Some(survival), warnings));
                return Err(e.into());
            }
        };

        let preferred_risk = profiles
            .iter()
            .find(|p| p.treatment == recommendation.preferred_arm)
            .cloned();

        let recommendation = self
            .apply_narrative(recommendation, &evidence, &mut warnings)
            .await;

        let gate = gate::review(
            &recommendation,
            preferred_risk.as_ref(),
            &self.config.gate,
            now_ms(),
        );

        let record = WorkflowRecord {
            session_id,
            query: input.query,
            evidence: Some(evidence),
            survival: Some(survival),
            risk: preferred_risk,
            recommendation: Some(recommendation),
            gate: Some(gate),
            status: RunStatus::Complete,
            warnings,
            created_ms,
        };

        self.audit.commit(&record)?;
        info!(session = record.session_id.as_str(), "workflow committed");
        Ok(record)
    }

    /// Two-pass synthesis: the first pass decides the preferred arm, the
    /// second folds that arm's safety profile into the rationale. Both passes
    /// are pure and cheap.
    fn synthesize(
        &self,
        evidence: &EvidenceSet,
        survival: &SurvivalResult,
        profiles: &[RiskProfile],
    ) -> Result<onco_core::Recommendation, SynthesisError> {
        let first = reasoner::synthesize(evidence, survival, None, &self.config.synthesizer)?;
        let preferred = profiles.iter().find(|p| p.treatment == first.preferred_arm);
        reasoner::synthesize(evidence, survival, preferred, &self.config.synthesizer)
    }

    async fn apply_narrative(
        &self,
        recommendation: onco_core::Recommendation,
        evidence: &EvidenceSet,
        warnings: &mut Vec<String>,
    ) -> onco_core::Recommendation {
        let Some(client) = &self.narrative else {
            return recommendation;
        };
        match client.narrate(&recommendation, evidence).await {
            Ok(text) if carries_citations(&text, &recommendation) => {
                let mut rec = recommendation;
                rec.rationale = text;
                rec
            }
            Ok(_) => {
                warnings.push(
                    "narrative dropped: missing verbatim citations; templated rationale kept"
                        .to_string(),
                );
                recommendation
            }
            Err(e) => {
                warn!(error = %e, "narrative client failed");
                warnings.push(format!("narrative client failed: {e}; templated rationale kept"));
                recommendation
            }
        }
    }

    /// Retrieve literature: primary with retries, then fallback with retries,
    /// then an empty set. Never fails the run.
    async fn gather_evidence(&self, query: &Query) -> (EvidenceSet, Vec<String>) {
        let mut warnings = vec![];

        match self.try_backend(self.primary.as_ref(), query).await {
            Ok(set) => return (set, warnings),
            Err(e) => {
                warn!(error = %e, "primary literature source failed");
                warnings.push(format!("primary literature source failed: {e}"));
            }
        }

        if let Some(fallback) = &self.fallback {
            match self.try_backend(fallback.as_ref(), query).await {
                Ok(set) => return (set, warnings),
                Err(e) => {
                    warn!(error = %e, "fallback literature source failed");
                    warnings.push(format!("fallback literature source failed: {e}"));
                }
            }
        }

        warnings.push("no literature retrieved; recommendation is based on statistics alone".to_string());
        (EvidenceSet::empty(EvidenceSource::Primary), warnings)
    }

    /// One backend, up to `max_evidence_attempts` tries. Only transient
    /// failures (timeout, rate limit) are retried, with exponential backoff.
    async fn try_backend(
        &self,
        backend: &dyn EvidenceBackend,
        query: &Query,
    ) -> Result<EvidenceSet, SearchFailure> {
        let mut attempt: u32 = 0;
        loop {
            let outcome =
                tokio::time::timeout(self.config.evidence_timeout, backend.search(query)).await;
            let failure = match outcome {
                Ok(Ok(set)) => return Ok(set),
                Ok(Err(e)) => e,
                Err(_) => SearchFailure::Timeout,
            };
            attempt += 1;
            if !failure.is_transient() || attempt >= self.config.max_evidence_attempts {
                return Err(failure);
            }
            let delay =
                backoff_delay_ms(attempt - 1, self.config.backoff_base_ms, self.config.backoff_cap_ms);
            warn!(attempt, delay_ms = delay, error = %failure, "retrying literature source");
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }

    /// Best-effort traceability commit on a failed run. The run's own error
    /// is what the caller sees; a second failure here is only logged.
    fn commit_incomplete(&self, record: &WorkflowRecord) {
        if let Err(e) = self.audit.commit(record) {
            warn!(session = record.session_id.as_str(), error = %e, "incomplete-record commit failed");
        }
    }
}

fn validate_samples(query: &Query, samples: &[ArmData]) -> Result<(), WorkflowError> {
    if samples.len() != 2 {
        return Err(WorkflowError::InvalidSamples(format!(
            "expected survival data for exactly 2 arms, got {}",
            samples.len()
        )));
    }
    if samples[0].treatment == samples[1].treatment {
        return Err(WorkflowError::InvalidSamples(format!(
            "both samples are for {}",
            samples[0].treatment
        )));
    }
    let named: Vec<&str> = query.treatment_arms.iter().take(2).map(String::as_str).collect();
    for sample in samples {
        if !named.contains(&sample.treatment.as_str()) {
            return Err(WorkflowError::InvalidSamples(format!(
                "sample arm {} is not named in the query",
                sample.treatment
            )));
        }
    }
    Ok(())
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

    fn arm(treatment: &str) -> ArmData {
        ArmData {
            treatment: treatment.into(),
            observations: vec![],
        }
    }

    #[test]
    fn samples_must_cover_both_query_arms() {
        let q = query();
        assert!(validate_samples(&q, &[arm("pembrolizumab"), arm("nivolumab")]).is_ok());

        let err = validate_samples(&q, &[arm("pembrolizumab")]).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidSamples(_)));

        let err = validate_samples(&q, &[arm("pembrolizumab"), arm("ipilimumab")]).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidSamples(_)));

        let err =
            validate_samples(&q, &[arm("pembrolizumab"), arm("pembrolizumab")]).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidSamples(_)));
    }
}
