//! Persisted condition mappings — the standardizer's second resolution
//! step. Writes come from manual curation or confirmed thesaurus hits.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use crate::standardize::{ConditionMappingStore, StoredMapping};
use crate::store::{sqlite, StoreError};

pub fn get_mapping(
    conn: &Connection,
    normalized: &str,
) -> Result<Option<StoredMapping>, StoreError> {
    let mapping = conn
        .query_row(
            "SELECT standard_name, thesaurus_id, confidence
             FROM condition_mappings WHERE normalized_input = ?1",
            [normalized],
            |row| {
                Ok(StoredMapping {
                    standard_name: row.get(0)?,
                    thesaurus_id: row.get(1)?,
                    confidence: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(mapping)
}

pub fn upsert_mapping(
    conn: &Connection,
    normalized: &str,
    mapping: &StoredMapping,
) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO condition_mappings (normalized_input, standard_name, thesaurus_id, confidence)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(normalized_input) DO UPDATE SET
             standard_name = excluded.standard_name,
             thesaurus_id = excluded.thesaurus_id,
             confidence = excluded.confidence",
        params![
            normalized,
            mapping.standard_name,
            mapping.thesaurus_id,
            mapping.confidence,
        ],
    )?;
    Ok(())
}

/// Mapping store backed by its own SQLite connection, usable as the
/// standardizer's second resolution step.
pub struct SqliteMappingStore {
    conn: Mutex<Connection>,
}

impl SqliteMappingStore {
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

    pub fn upsert(&self, normalized: &str, mapping: &StoredMapping) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        upsert_mapping(&conn, normalized, mapping)
    }
}

impl ConditionMappingStore for SqliteMappingStore {
    fn get(&self, normalized: &str) -> Option<StoredMapping> {
        let conn = self.conn.lock().unwrap();
        match get_mapping(&conn, normalized) {
            Ok(mapping) => mapping,
            Err(e) => {
                tracing::warn!(input = normalized, error = %e, "Mapping lookup failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_and_get_roundtrip() {
        let store = SqliteMappingStore::in_memory().unwrap();
        let mapping = StoredMapping {
            standard_name: "Neuromyelitis Optica".to_string(),
            thesaurus_id: Some("C0270612".to_string()),
            confidence: 0.95,
        };
        store.upsert("devic disease", &mapping).unwrap();

        let loaded = store.get("devic disease").unwrap();
        assert_eq!(loaded.standard_name, "Neuromyelitis Optica");
        assert_eq!(loaded.thesaurus_id.as_deref(), Some("C0270612"));
        assert_eq!(loaded.confidence, 0.95);
    }

    #[test]
    fn missing_mapping_is_none() {
        let store = SqliteMappingStore::in_memory().unwrap();
        assert!(store.get("nothing here").is_none());
    }

    #[test]
    fn upsert_replaces_existing() {
        let store = SqliteMappingStore::in_memory().unwrap();
        let first = StoredMapping {
            standard_name: "Old Name".to_string(),
            thesaurus_id: None,
            confidence: 0.8,
        };
        let second = StoredMapping {
            standard_name: "New Name".to_string(),
            thesaurus_id: Some("C1".to_string()),
            confidence: 0.9,
        };
        store.upsert("term", &first).unwrap();
        store.upsert("term", &second).unwrap();
        let loaded = store.get("term").unwrap();
        assert_eq!(loaded.standard_name, "New Name");
    }
}
