use crate::pubmed::classify_reqwest_error;
use crate::throttle::RequestThrottle;
use crate::{search_term, EvidenceBackend, SearchFailure};
use async_trait::async_trait;
use onco_core::{EvidenceRecord, EvidenceSet, EvidenceSource, Query};
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

const DEFAULT_BASE_URL: &str = "https://www.ebi.ac.uk/europepmc/webservices/rest";

/// Fallback backend: the Europe PMC REST API. Broader academic coverage than
/// PubMed and ships abstracts in the search response (resultType=core).
pub struct EuropePmcBackend {
    http: reqwest::Client,
    base_url: String,
    throttle: RequestThrottle,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "resultList")]
    result_list: ResultList,
}

#[derive(Debug, Deserialize)]
struct ResultList {
    #[serde(default)]
    result: Vec<PmcResult>,
}

#[derive(Debug, Deserialize)]
struct PmcResult {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(rename = "authorString", default)]
    author_string: String,
    #[serde(rename = "journalTitle", default)]
    journal_title: String,
    #[serde(rename = "pubYear", default)]
    pub_year: Option<String>,
    #[serde(rename = "abstractText", default)]
    abstract_text: String,
}

impl EuropePmcBackend {
    pub fn new(timeout: Duration, max_requests_per_second: f64) -> Result<Self, SearchFailure> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout, max_requests_per_second)
    }

    pub fn with_base_url(
        base_url: &str,
        timeout: Duration,
        max_requests_per_second: f64,
    ) -> Result<Self, SearchFailure> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SearchFailure::Unavailable(format!("http client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            throttle: RequestThrottle::new(max_requests_per_second),
        })
    }
}

#[async_trait]
impl EvidenceBackend for EuropePmcBackend {
    fn source(&self) -> EvidenceSource {
        EvidenceSource::Fallback
    }

    async fn search(&self, query: &Query) -> Result<EvidenceSet, SearchFailure> {
        let term = format!(
            "{} AND PUB_YEAR:[{} TO {}]",
            search_term(query),
            query.min_year,
            query.max_year
        );
        info!(term, max = query.max_results, "europepmc search");

        self.throttle.acquire().await;
        let response = self
            .http
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("query", term.as_str()),
                ("format", "json"),
                ("resultType", "core"),
                ("pageSize", &query.max_results.to_string()),
            ])
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let parsed: SearchResponse = match response.status() {
            s if s.is_success() => response
                .json()
                .await
                .map_err(|e| SearchFailure::Unavailable(format!("malformed response: {e}")))?,
            reqwest::StatusCode::TOO_MANY_REQUESTS => return Err(SearchFailure::RateLimited),
            s if s.is_client_error() => {
                return Err(SearchFailure::InvalidQuery(format!("HTTP {s}")))
            }
            s => return Err(SearchFailure::Unavailable(format!("HTTP {s}"))),
        };

        let mut records: Vec<EvidenceRecord> = parsed
            .result_list
            .result
            .into_iter()
            .map(result_to_record)
            .filter(|r| r.year.map_or(true, |y| y >= query.min_year))
            .collect();
        records.truncate(query.max_results);

        let total_found = records.len();
        Ok(EvidenceSet {
            records,
            total_found,
            source: self.source(),
        })
    }
}

fn result_to_record(r: PmcResult) -> EvidenceRecord {
    let authors = r
        .author_string
        .split(',')
        .map(|a| a.trim().trim_end_matches('.').to_string())
        .filter(|a| !a.is_empty())
        .take(5)
        .collect();

    EvidenceRecord {
        title: r.title,
        authors,
        venue: r.journal_title,
        year: r.pub_year.and_then(|y| y.parse().ok()),
        external_id: r.id,
        abstract_text: r.abstract_text,
    }
}
