//! Session-keyed audit persistence.
//!
//! Two stores behind one trait: an in-memory twin for tests and a SQLite
//! store for durable runs. Both are append-only.

pub mod memory;
pub mod sqlite;
pub mod traits;

pub use memory::InMemoryAuditStore;
pub use sqlite::SqliteAuditStore;
pub use traits::{AuditError, AuditFilter, AuditStore};
