//! SQLite-backed persistence: scored evidence points, opportunity
//! rollups, condition mappings, and session summaries.

pub mod repository;
pub mod sqlite;

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{EfficacyDataPoint, Opportunity};

pub use repository::*;
pub use sqlite::*;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Invalid review transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

/// The persistence sink the pipeline writes through: bulk point insert
/// with per-point failure isolation, and full-replace opportunity upsert
/// keyed by (drug, disease).
pub trait EvidenceSink: Send + Sync {
    fn insert_points(
        &self,
        session_id: Option<&Uuid>,
        drug_key: &str,
        disease: &str,
        points: &[EfficacyDataPoint],
    ) -> Result<InsertOutcome, StoreError>;

    fn replace_opportunities(&self, opportunities: &[Opportunity]) -> Result<(), StoreError>;
}

pub struct SqliteEvidenceStore {
    conn: Mutex<Connection>,
}

impl SqliteEvidenceStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Ok(Self {
            conn: Mutex::new(sqlite::open_database(path)?),
        })
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Ok(Self {
            conn: Mutex::new(sqlite::open_memory_database()?),
        })
    }

    /// Run a closure against the underlying connection (repository calls).
    pub fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let conn = self.conn.lock().unwrap();
        f(&conn)
    }
}

impl EvidenceSink for SqliteEvidenceStore {
    fn insert_points(
        &self,
        session_id: Option<&Uuid>,
        drug_key: &str,
        disease: &str,
        points: &[EfficacyDataPoint],
    ) -> Result<InsertOutcome, StoreError> {
        let conn = self.conn.lock().unwrap();
        Ok(repository::efficacy::insert_data_points(
            &conn, session_id, drug_key, disease, points,
        ))
    }

    fn replace_opportunities(&self, opportunities: &[Opportunity]) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        repository::opportunity::replace_opportunities(&conn, opportunities)
    }
}
