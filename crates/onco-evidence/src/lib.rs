//! Literature-retrieval backends behind one seam.
//!
//! A backend performs exactly one search per call: no retries, no backend
//! selection, no local state beyond its HTTP client. Retry, backoff and
//! fallback policy belong to the orchestrator.

pub mod europepmc;
pub mod fixture;
pub mod pubmed;
pub mod throttle;

pub use europepmc::EuropePmcBackend;
pub use fixture::StaticBackend;
pub use pubmed::PubMedBackend;
pub use throttle::RequestThrottle;

use async_trait::async_trait;
use onco_core::{EvidenceSet, EvidenceSource, Query};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SearchFailure {
    #[error("backend timed out")]
    Timeout,
    #[error("backend rate limited the request")]
    RateLimited,
    #[error("query rejected by backend: {0}")]
    InvalidQuery(String),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

impl SearchFailure {
    /// Transient kinds may be retried (with backoff) by the orchestrator.
    pub fn is_transient(&self) -> bool {
        matches!(self, SearchFailure::Timeout | SearchFailure::RateLimited)
    }
}

#[async_trait]
pub trait EvidenceBackend: Send + Sync {
    fn source(&self) -> EvidenceSource;

    /// Run one search. Must honor `query.max_results` and the minimum-year
    /// filter, and return a typed failure instead of guessing.
    async fn search(&self, query: &Query) -> Result<EvidenceSet, SearchFailure>;
}

/// Search term shared by the HTTP backends: all query facets joined, the way
/// the upstream APIs expect free-text terms.
pub(crate) fn search_term(query: &Query) -> String {
    let mut parts = vec![query.cancer_type.clone()];
    parts.extend(query.treatment_arms.iter().cloned());
    parts.join(" AND ")
}
