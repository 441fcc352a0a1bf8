use std::path::Path;
use std::sync::Mutex;

use onco_core::{RunStatus, SessionId, WorkflowRecord};
use rusqlite::{params, Connection, ErrorCode};
use tracing::info;

use crate::traits::{AuditError, AuditFilter, AuditStore};

/// Durable audit log: one row per session, the full record as a JSON
/// document plus indexed scalar columns for filtering. The primary key on
/// session_id enforces append-only at the schema level.
pub struct SqliteAuditStore {
    conn: Mutex<Connection>,
}

impl SqliteAuditStore {
    pub fn open(db_path: &Path) -> Result<Self, AuditError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn = Connection::open(db_path)
            .map_err(|e| AuditError::Backend(format!("open {}: {e}", db_path.display())))?;
        let init_sql = include_str!("../migrations/0001_init.sql");
        conn.execute_batch(init_sql).map_err(backend)?;
        info!(db = %db_path.display(), "audit store opened");
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn status_to_str(s: RunStatus) -> &'static str {
        match s {
            RunStatus::Complete => "complete",
            RunStatus::Incomplete => "incomplete",
        }
    }
}

fn backend(e: rusqlite::Error) -> AuditError {
    AuditError::Backend(e.to_string())
}

impl AuditStore for SqliteAuditStore {
    fn commit(&self, record: &WorkflowRecord) -> Result<(), AuditError> {
        let record_json = serde_json::to_string(record)?;
        let conn = self.conn.lock().unwrap();
        let tx = conn.unchecked_transaction().map_err(backend)?;
        let res = tx.execute(
            "INSERT INTO workflow_records(session_id, cancer_type, status, created_ms, record_json)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.session_id.as_str(),
                record.query.cancer_type,
                Self::status_to_str(record.status),
                record.created_ms,
                record_json
            ],
        );
        match res {
            Ok(_) => {
                tx.commit().map_err(backend)?;
                Ok(())
            }
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                Err(AuditError::DuplicateSession(
                    record.session_id.as_str().to_string(),
                ))
            }
            Err(e) => Err(backend(e)),
        }
    }

    fn get_by_session(&self, session_id: &SessionId) -> Result<Option<WorkflowRecord>, AuditError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT record_json FROM workflow_records WHERE session_id = ?1")
            .map_err(backend)?;
        let mut rows = stmt
            .query_map(params![session_id.as_str()], |r| r.get::<_, String>(0))
            .map_err(backend)?;
        match rows.next() {
            Some(row) => {
                let json = row.map_err(backend)?;
                Ok(Some(serde_json::from_str(&json)?))
            }
            None => Ok(None),
        }
    }

    fn search(&self, filter: &AuditFilter) -> Result<Vec<WorkflowRecord>, AuditError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT record_json FROM workflow_records
                 WHERE (?1 IS NULL OR cancer_type = ?1 COLLATE NOCASE)
                   AND (?2 IS NULL OR created_ms >= ?2)
                   AND (?3 IS NULL OR created_ms <= ?3)
                 ORDER BY created_ms ASC",
            )
            .map_err(backend)?;
        let rows = stmt
            .query_map(
                params![
                    filter.cancer_type,
                    filter.created_after_ms,
                    filter.created_before_ms
                ],
                |r| r.get::<_, String>(0),
            )
            .map_err(backend)?;

        let mut records = vec![];
        for row in rows {
            let json = row.map_err(backend)?;
            records.push(serde_json::from_str(&json)?);
        }
        Ok(records)
    }
}
