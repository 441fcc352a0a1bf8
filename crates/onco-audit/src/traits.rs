use onco_core::{EpochMs, SessionId, WorkflowRecord};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("session {0} already committed")]
    DuplicateSession(String),
    #[error("record serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("audit backend failed: {0}")]
    Backend(String),
}

/// Append-only audit log, keyed by session id. Committed records are
/// immutable; there is no update or delete. An amendment is a fresh record
/// whose warnings cite the prior session id.
pub trait AuditStore: Send + Sync {
    /// Atomically persist one record. Fails with `DuplicateSession` if the
    /// session id was already committed.
    fn commit(&self, record: &WorkflowRecord) -> Result<(), AuditError>;

    fn get_by_session(&self, session_id: &SessionId) -> Result<Option<WorkflowRecord>, AuditError>;

    /// Records matching the filter, oldest first.
    fn search(&self, filter: &AuditFilter) -> Result<Vec<WorkflowRecord>, AuditError>;
}

#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub cancer_type: Option<String>,
    pub created_after_ms: Option<EpochMs>,
    pub created_before_ms: Option<EpochMs>,
}

impl AuditFilter {
    pub fn matches(&self, record: &WorkflowRecord) -> bool {
        if let Some(ct) = &self.cancer_type {
            if !record.query.cancer_type.eq_ignore_ascii_case(ct) {
                return false;
            }
        }
        if let Some(after) = self.created_after_ms {
            if record.created_ms < after {
                return false;
            }
        }
        if let Some(before) = self.created_before_ms {
            if record.created_ms > before {
                return false;
            }
        }
        true
    }
}
