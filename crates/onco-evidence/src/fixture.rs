use crate::{EvidenceBackend, SearchFailure};
use async_trait::async_trait;
use onco_core::{EvidenceRecord, EvidenceSet, EvidenceSource, Query};

/// Canned backend for tests and offline runs. Honors the same contract as
/// the HTTP backends (result cap, minimum-year filter) against a fixed
/// record list.
pub struct StaticBackend {
    records: Vec<EvidenceRecord>,
    source: EvidenceSource,
}

impl StaticBackend {
    pub fn new(records: Vec<EvidenceRecord>, source: EvidenceSource) -> Self {
        Self { records, source }
    }

    /// `n` plausible melanoma checkpoint-inhibitor records, years 2023-2025.
    pub fn with_demo_records(n: usize, source: EvidenceSource) -> Self {
        let records = (0..n)
            .map(|i| EvidenceRecord {
                title: format!(
                    "Anti-PD-1 therapy in advanced melanoma: cohort analysis {}",
                    i + 1
                ),
                authors: vec!["Smith J".into(), "Jones K".into(), "Garcia M".into()],
                venue: "Journal of Clinical Oncology".into(),
                year: Some(2023 + (i % 3) as u16),
                external_id: format!("demo-{:04}", i + 1),
                abstract_text: "Overall survival outcomes with checkpoint blockade.".into(),
            })
            .collect();
        Self::new(records, source)
    }
}

#[async_trait]
impl EvidenceBackend for StaticBackend {
    fn source(&self) -> EvidenceSource {
        self.source
    }

    async fn search(&self, query: &Query) -> Result<EvidenceSet, SearchFailure> {
        let records: Vec<EvidenceRecord> = self
            .records
            .iter()
            .filter(|r| r.year.map_or(true, |y| y >= query.min_year && y <= query.max_year))
            .take(query.max_results)
            .cloned()
            .collect();
        let total_found = records.len();
        Ok(EvidenceSet {
            records,
            total_found,
            source: self.source,
        })
    }
}
