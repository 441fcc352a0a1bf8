use std::collections::HashMap;
use std::sync::Mutex;

use onco_core::{SessionId, WorkflowRecord};

use crate::traits::{AuditError, AuditFilter, AuditStore};

/// In-memory audit log for tests. Not durable, but honors the same
/// append-only contract as the SQLite store.
#[derive(Default)]
pub struct InMemoryAuditStore {
    records: Mutex<HashMap<String, WorkflowRecord>>,
}

impl InMemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuditStore for InMemoryAuditStore {
    fn commit(&self, record: &WorkflowRecord) -> Result<(), AuditError> {
        let mut records = self.records.lock().unwrap();
        let key = record.session_id.as_str().to_string();
        if records.contains_key(&key) {
            return Err(AuditError::DuplicateSession(key));
        }
        records.insert(key, record.clone());
        Ok(())
    }

    fn get_by_session(&self, session_id: &SessionId) -> Result<Option<WorkflowRecord>, AuditError> {
        let records = self.records.lock().unwrap();
        Ok(records.get(session_id.as_str()).cloned())
    }

    fn search(&self, filter: &AuditFilter) -> Result<Vec<WorkflowRecord>, AuditError> {
        let records = self.records.lock().unwrap();
        let mut found: Vec<WorkflowRecord> = records
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        found.sort_by_key(|r| r.created_ms);
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onco_core::{Query, RunStatus, SessionId};

    fn record(cancer_type: &str, created_ms: i64) -> WorkflowRecord {
        WorkflowRecord {
            session_id: SessionId::new(),
            query: Query {
                cancer_type: cancer_type.to_string(),
                treatment_arms: vec!["pembrolizumab".into(), "nivolumab".into()],
                min_year: 2023,
                max_year: 2025,
                max_results: 12,
            },
            evidence: None,
            survival: None,
            risk: None,
            recommendation: None,
            gate: None,
            status: RunStatus::Incomplete,
            warnings: vec![],
            created_ms,
        }
    }

    #[test]
    fn commit_then_get_round_trips() {
        let store = InMemoryAuditStore::new();
        let rec = record("melanoma", 100);
        store.commit(&rec).unwrap();
        let found = store.get_by_session(&rec.session_id).unwrap().unwrap();
        assert_eq!(found.session_id, rec.session_id);
        assert_eq!(found.query.cancer_type, "melanoma");
    }

    #[test]
    fn duplicate_session_is_rejected() {
        let store = InMemoryAuditStore::new();
        let rec = record("melanoma", 100);
        store.commit(&rec).unwrap();
        let err = store.commit(&rec).unwrap_err();
        assert!(matches!(err, AuditError::DuplicateSession(_)));
    }

    #[test]
    fn missing_session_is_none() {
        let store = InMemoryAuditStore::new();
        assert!(store.get_by_session(&SessionId::new()).unwrap().is_none());
    }

    #[test]
    fn search_filters_and_orders_by_created() {
        let store = InMemoryAuditStore::new();
        store.commit(&record("melanoma", 300)).unwrap();
        store.commit(&record("nsclc", 200)).unwrap();
        store.commit(&record("Melanoma", 100)).unwrap();

        let filter = AuditFilter {
            cancer_type: Some("melanoma".into()),
            ..Default::default()
        };
        let found = store.search(&filter).unwrap();
        assert_eq!(found.len(), 2);
        assert!(found[0].created_ms < found[1].created_ms);
    }

    #[test]
    fn search_respects_time_window() {
        let store = InMemoryAuditStore::new();
        for t in [100, 200, 300] {
            store.commit(&record("melanoma", t)).unwrap();
        }
        let filter = AuditFilter {
            created_after_ms: Some(150),
            created_before_ms: Some(250),
            ..Default::default()
        };
        let found = store.search(&filter).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].created_ms, 200);
    }
}
