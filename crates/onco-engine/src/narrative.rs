use async_trait::async_trait;
use onco_core::{EvidenceSet, Recommendation};

/// Optional free-text rewriter for the recommendation rationale (an LLM in
/// practice). Its output is advisory: the orchestrator accepts it only when
/// it preserves the numeric provenance of the templated rationale.
#[async_trait]
pub trait NarrativeClient: Send + Sync {
    async fn narrate(
        &self,
        recommendation: &Recommendation,
        evidence: &EvidenceSet,
    ) -> anyhow::Result<String>;
}

/// A narrative is accepted only if it carries all three citations verbatim,
/// exactly as the template prints them.
pub(crate) fn carries_citations(text: &str, rec: &Recommendation) -> bool {
    let p = format!("p={}", rec.supporting_p_value);
    let volume = format!("{} supporting publications", rec.evidence_count);
    let effect = format!("{} months", rec.supporting_effect_size);
    text.contains(&p) && text.contains(&volume) && text.contains(&effect)
}
