//! Session and per-drug result summaries.

use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::models::{BenchmarkSession, DrugBenchmarkResult, SessionStatus};
use crate::store::StoreError;

pub fn insert_session(conn: &Connection, session: &BenchmarkSession) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO benchmark_sessions (id, disease_input, disease_standard,
         therapeutic_area, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            session.id.to_string(),
            session.disease.raw_name,
            session.disease.standard_name,
            session.disease.therapeutic_area,
            session.status.as_str(),
            session.created_at.to_rfc3339(),
        ],
    )?;
    for result in &session.results {
        insert_drug_result(conn, &session.id, result)?;
    }
    Ok(())
}

pub fn insert_drug_result(
    conn: &Connection,
    session_id: &Uuid,
    result: &DrugBenchmarkResult,
) -> Result<(), StoreError> {
    let errors = serde_json::to_string(&result.errors).unwrap_or_else(|_| "[]".to_string());
    conn.execute(
        "INSERT INTO drug_results (id, session_id, drug_key, generic_name,
         extraction_status, data_point_count, errors)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            Uuid::new_v4().to_string(),
            session_id.to_string(),
            result.drug.drug_key,
            result.drug.generic_name,
            result.status.as_str(),
            result.data_points.len() as i64,
            errors,
        ],
    )?;
    Ok(())
}

pub fn update_session_status(
    conn: &Connection,
    session_id: &Uuid,
    status: SessionStatus,
) -> Result<(), StoreError> {
    let changed = conn.execute(
        "UPDATE benchmark_sessions SET status = ?1 WHERE id = ?2",
        params![status.as_str(), session_id.to_string()],
    )?;
    if changed == 0 {
        return Err(StoreError::NotFound {
            entity_type: "benchmark_session".to_string(),
            id: session_id.to_string(),
        });
    }
    Ok(())
}

pub fn get_session_status(
    conn: &Connection,
    session_id: &Uuid,
) -> Result<SessionStatus, StoreError> {
    let status: String = conn
        .query_row(
            "SELECT status FROM benchmark_sessions WHERE id = ?1",
            [session_id.to_string()],
            |row| row.get(0),
        )
        .map_err(|_| StoreError::NotFound {
            entity_type: "benchmark_session".to_string(),
            id: session_id.to_string(),
        })?;
    SessionStatus::from_str(&status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApprovedDrug, DiseaseMatch, ExtractionStatus};
    use crate::store::sqlite::open_memory_database;

    fn sample_session() -> BenchmarkSession {
        let mut session = BenchmarkSession::new(DiseaseMatch::unmatched("SLE"));
        session.status = SessionStatus::Complete;
        let mut result = DrugBenchmarkResult::pending(ApprovedDrug::from_generic("belimumab"));
        result.status = ExtractionStatus::Success;
        result.errors.push("one transient error".to_string());
        session.results.push(result);
        session
    }

    #[test]
    fn session_roundtrip() {
        let conn = open_memory_database().unwrap();
        let session = sample_session();
        insert_session(&conn, &session).unwrap();
        assert_eq!(
            get_session_status(&conn, &session.id).unwrap(),
            SessionStatus::Complete
        );

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM drug_results WHERE session_id = ?1",
                [session.id.to_string()],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn status_update() {
        let conn = open_memory_database().unwrap();
        let session = sample_session();
        insert_session(&conn, &session).unwrap();
        update_session_status(&conn, &session.id, SessionStatus::ReviewNeeded).unwrap();
        assert_eq!(
            get_session_status(&conn, &session.id).unwrap(),
            SessionStatus::ReviewNeeded
        );
    }

    #[test]
    fn updating_missing_session_is_not_found() {
        let conn = open_memory_database().unwrap();
        let err = update_session_status(&conn, &Uuid::new_v4(), SessionStatus::Failed);
        assert!(matches!(err, Err(StoreError::NotFound { .. })));
    }
}
