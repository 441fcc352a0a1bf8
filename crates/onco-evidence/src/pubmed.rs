use crate::throttle::RequestThrottle;
use crate::{search_term, EvidenceBackend, SearchFailure};
use async_trait::async_trait;
use onco_core::{EvidenceRecord, EvidenceSet, EvidenceSource, Query};
use serde_json::Value;
use std::time::Duration;
use tracing::info;

const DEFAULT_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

/// Primary backend: NCBI PubMed via the E-utilities JSON API
/// (esearch for ids, esummary for the records).
///
/// Note: esummary carries no abstracts, so `abstract_text` is empty on
/// records from this backend; the fallback backend fills it.
pub struct PubMedBackend {
    http: reqwest::Client,
    base_url: String,
    tool: String,
    email: String,
    throttle: RequestThrottle,
}

impl PubMedBackend {
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
            tool: "oncoflow".to_string(),
            email: "research@example.com".to_string(),
            throttle: RequestThrottle::new(max_requests_per_second),
        })
    }

    async fn get_json(&self, url: &str, params: &[(&str, String)]) -> Result<Value, SearchFailure> {
        self.throttle.acquire().await;
        let response = self
            .http
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        match response.status() {
            s if s.is_success() => response
                .json::<Value>()
                .await
                .map_err(|e| SearchFailure::Unavailable(format!("malformed response: {e}"))),
            reqwest::StatusCode::TOO_MANY_REQUESTS => Err(SearchFailure::RateLimited),
            s if s.is_client_error() => Err(SearchFailure::InvalidQuery(format!("HTTP {s}"))),
            s => Err(SearchFailure::Unavailable(format!("HTTP {s}"))),
        }
    }
}

pub(crate) fn classify_reqwest_error(e: reqwest::Error) -> SearchFailure {
    if e.is_timeout() {
        SearchFailure::Timeout
    } else {
        SearchFailure::Unavailable(e.to_string())
    }
}

#[async_trait]
impl EvidenceBackend for PubMedBackend {
    fn source(&self) -> EvidenceSource {
        EvidenceSource::Primary
    }

    async fn search(&self, query: &Query) -> Result<EvidenceSet, SearchFailure> {
        let term = format!(
            "{} AND {}:{}[dp]",
            search_term(query),
            query.min_year,
            query.max_year
        );
        info!(term, max = query.max_results, "pubmed esearch");

        let esearch = self
            .get_json(
                &format!("{}/esearch.fcgi", self.base_url),
                &[
                    ("db", "pubmed".to_string()),
                    ("term", term),
                    ("retmax", query.max_results.to_string()),
                    ("retmode", "json".to_string()),
                    ("tool", self.tool.clone()),
                    ("email", self.email.clone()),
                ],
            )
            .await?;

        let ids: Vec<String> = esearch["esearchresult"]["idlist"]
            .as_array()
            .map(|a| {
                a.iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        if ids.is_empty() {
            return Ok(EvidenceSet::empty(self.source()));
        }

        let esummary = self
            .get_json(
                &format!("{}/esummary.fcgi", self.base_url),
                &[
                    ("db", "pubmed".to_string()),
                    ("id", ids.join(",")),
                    ("retmode", "json".to_string()),
                    ("tool", self.tool.clone()),
                    ("email", self.email.clone()),
                ],
            )
            .await?;

        let mut records = Vec::with_capacity(ids.len());
        for id in &ids {
            let doc = &esummary["result"][id.as_str()];
            if doc.is_null() {
                continue;
            }
            records.push(summary_to_record(id, doc));
        }
        // The minimum-year filter is part of the term, but upstream date
        // parsing is lenient; enforce it again on the parsed year.
        records.retain(|r: &EvidenceRecord| r.year.map_or(true, |y| y >= query.min_year));
        records.truncate(query.max_results);

        let total_found = records.len();
        Ok(EvidenceSet {
            records,
            total_found,
            source: self.source(),
        })
    }
}

fn summary_to_record(id: &str, doc: &Value) -> EvidenceRecord {
    let authors = doc["authors"]
        .as_array()
        .map(|a| {
            a.iter()
                .filter_map(|v| v["name"].as_str().map(str::to_string))
                .take(5)
                .collect()
        })
        .unwrap_or_default();

    let year = doc["pubdate"]
        .as_str()
        .and_then(|d| d.get(..4))
        .and_then(|y| y.parse::<u16>().ok());

    EvidenceRecord {
        title: doc["title"].as_str().unwrap_or("No title available").to_string(),
        authors,
        venue: doc["fulljournalname"].as_str().unwrap_or_default().to_string(),
        year,
        external_id: id.to_string(),
        abstract_text: String::new(),
    }
}
