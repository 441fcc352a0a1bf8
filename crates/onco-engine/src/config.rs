use std::time::Duration;

use onco_core::{GateConfig, SynthesizerConfig};

/// Knobs for one workflow run. Retry and timeout policy lives here, never in
/// the evidence backends themselves.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Per-attempt ceiling on a single backend call.
    pub evidence_timeout: Duration,
    /// Attempts per backend before giving up on it (transient failures only).
    pub max_evidence_attempts: u32,
    pub backoff_base_ms: u64,
    pub backoff_cap_ms: u64,
    pub synthesizer: SynthesizerConfig,
    pub gate: GateConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            evidence_timeout: Duration::from_secs(10),
            max_evidence_attempts: 3,
            backoff_base_ms: 250,
            backoff_cap_ms: 5_000,
            synthesizer: SynthesizerConfig::default(),
            gate: GateConfig::default(),
        }
    }
}
