//! Evidence-point persistence.
//!
//! Bulk insert runs per-point: one bad row is logged and skipped, the
//! rest of the session's results survive. Review transitions are guarded
//! — only pending points can be confirmed or rejected.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::models::{EfficacyDataPoint, EndpointType, ReviewStatus, SourceKind};
use crate::store::StoreError;

/// What a bulk insert actually achieved.
#[derive(Debug, Clone, Default)]
pub struct InsertOutcome {
    pub inserted: usize,
    pub failures: Vec<String>,
}

pub fn insert_data_points(
    conn: &Connection,
    session_id: Option<&Uuid>,
    drug_key: &str,
    disease: &str,
    points: &[EfficacyDataPoint],
) -> InsertOutcome {
    let mut outcome = InsertOutcome::default();
    for point in points {
        match insert_data_point(conn, session_id, drug_key, disease, point) {
            Ok(()) => outcome.inserted += 1,
            Err(e) => {
                tracing::warn!(point_id = %point.id, error = %e, "Data point insert failed, continuing batch");
                outcome.failures.push(format!("{}: {e}", point.id));
            }
        }
    }
    outcome
}

pub fn insert_data_point(
    conn: &Connection,
    session_id: Option<&Uuid>,
    drug_key: &str,
    disease: &str,
    point: &EfficacyDataPoint,
) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO efficacy_points (id, session_id, drug_key, disease, source_kind,
         source_url, paper_id, registry_id, trial_name, phase, endpoint_name, endpoint_type,
         drug_arm_name, drug_arm_n, drug_arm_result, drug_arm_unit, comparator_arm_name,
         comparator_arm_n, comparator_arm_result, p_value, confidence_interval, timepoint,
         source_text, confidence_score, review_status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                 ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26)",
        params![
            point.id.to_string(),
            session_id.map(|id| id.to_string()),
            drug_key,
            disease,
            point.source_kind.as_str(),
            point.source_url,
            point.paper_id,
            point.registry_id,
            point.trial_name,
            point.phase,
            point.endpoint_name,
            point.endpoint_type.as_ref().map(|t| t.as_str()),
            point.drug_arm_name,
            point.drug_arm_n,
            point.drug_arm_result,
            point.drug_arm_unit,
            point.comparator_arm_name,
            point.comparator_arm_n,
            point.comparator_arm_result,
            point.p_value,
            point.confidence_interval,
            point.timepoint,
            point.source_text,
            point.confidence_score,
            point.review_status.as_str(),
            point.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

const POINT_COLUMNS: &str =
    "id, source_kind, source_url, paper_id, registry_id, trial_name, phase, endpoint_name,
     endpoint_type, drug_arm_name, drug_arm_n, drug_arm_result, drug_arm_unit,
     comparator_arm_name, comparator_arm_n, comparator_arm_result, p_value,
     confidence_interval, timepoint, source_text, confidence_score, review_status, created_at";

fn point_from_row(row: &Row) -> Result<EfficacyDataPoint, rusqlite::Error> {
    let id: String = row.get(0)?;
    let source_kind: String = row.get(1)?;
    let endpoint_type: Option<String> = row.get(8)?;
    let review_status: String = row.get(21)?;
    let created_at: String = row.get(22)?;

    Ok(EfficacyDataPoint {
        id: Uuid::parse_str(&id).unwrap_or_default(),
        source_kind: SourceKind::from_str(&source_kind).unwrap_or(SourceKind::Publication),
        source_url: row.get(2)?,
        paper_id: row.get(3)?,
        registry_id: row.get(4)?,
        trial_name: row.get(5)?,
        phase: row.get(6)?,
        endpoint_name: row.get(7)?,
        endpoint_type: endpoint_type
            .as_deref()
            .and_then(|t| EndpointType::from_str(t).ok()),
        drug_arm_name: row.get(9)?,
        drug_arm_n: row.get(10)?,
        drug_arm_result: row.get(11)?,
        drug_arm_unit: row.get(12)?,
        comparator_arm_name: row.get(13)?,
        comparator_arm_n: row.get(14)?,
        comparator_arm_result: row.get(15)?,
        p_value: row.get(16)?,
        confidence_interval: row.get(17)?,
        timepoint: row.get(18)?,
        source_text: row.get(19)?,
        confidence_score: row.get(20)?,
        review_status: ReviewStatus::from_str(&review_status)
            .unwrap_or(ReviewStatus::PendingReview),
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

/// All points awaiting human review.
pub fn get_pending_points(conn: &Connection) -> Result<Vec<EfficacyDataPoint>, StoreError> {
    let sql = format!(
        "SELECT {POINT_COLUMNS} FROM efficacy_points WHERE review_status = ?1 ORDER BY created_at"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([ReviewStatus::PendingReview.as_str()], point_from_row)?;
    let mut points = Vec::new();
    for row in rows {
        points.push(row?);
    }
    Ok(points)
}

pub fn count_pending(conn: &Connection) -> Result<u32, StoreError> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM efficacy_points WHERE review_status = ?1",
        [ReviewStatus::PendingReview.as_str()],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Human review transition: pending → confirmed | rejected only.
pub fn set_review_status(
    conn: &Connection,
    point_id: &Uuid,
    new_status: ReviewStatus,
) -> Result<(), StoreError> {
    let current: String = conn
        .query_row(
            "SELECT review_status FROM efficacy_points WHERE id = ?1",
            [point_id.to_string()],
            |row| row.get(0),
        )
        .map_err(|_| StoreError::NotFound {
            entity_type: "efficacy_point".to_string(),
            id: point_id.to_string(),
        })?;

    let from = ReviewStatus::from_str(&current)?;
    let allowed = from == ReviewStatus::PendingReview
        && matches!(
            new_status,
            ReviewStatus::UserConfirmed | ReviewStatus::UserRejected
        );
    if !allowed {
        return Err(StoreError::InvalidTransition {
            from: from.as_str().to_string(),
            to: new_status.as_str().to_string(),
        });
    }

    conn.execute(
        "UPDATE efficacy_points SET review_status = ?1 WHERE id = ?2",
        params![new_status.as_str(), point_id.to_string()],
    )?;
    Ok(())
}

/// Everything that counts toward aggregation for one drug×disease group —
/// rejected points are excluded here, not downstream.
pub fn get_points_for_aggregation(
    conn: &Connection,
    drug_key: &str,
    disease: &str,
) -> Result<Vec<EfficacyDataPoint>, StoreError> {
    let sql = format!(
        "SELECT {POINT_COLUMNS} FROM efficacy_points
         WHERE drug_key = ?1 AND disease = ?2 AND review_status != ?3
         ORDER BY created_at"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params![drug_key, disease, ReviewStatus::UserRejected.as_str()],
        point_from_row,
    )?;
    let mut points = Vec::new();
    for row in rows {
        points.push(row?);
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::sqlite::open_memory_database;

    fn sample_point() -> EfficacyDataPoint {
        let mut p = EfficacyDataPoint::new(SourceKind::Publication, "https://example.org/p");
        p.paper_id = Some("19945765".to_string());
        p.endpoint_name = Some("SRI-4".to_string());
        p.endpoint_type = Some(EndpointType::Primary);
        p.drug_arm_result = Some(52.4);
        p.p_value = Some(0.001);
        p.confidence_score = 0.93;
        p.review_status = ReviewStatus::AutoAccepted;
        p
    }

    #[test]
    fn roundtrips_a_point() {
        let conn = open_memory_database().unwrap();
        let point = sample_point();
        insert_data_point(&conn, None, "belimumab", "SLE", &point).unwrap();

        let points = get_points_for_aggregation(&conn, "belimumab", "SLE").unwrap();
        assert_eq!(points.len(), 1);
        let loaded = &points[0];
        assert_eq!(loaded.id, point.id);
        assert_eq!(loaded.endpoint_name.as_deref(), Some("SRI-4"));
        assert_eq!(loaded.endpoint_type, Some(EndpointType::Primary));
        assert_eq!(loaded.drug_arm_result, Some(52.4));
        assert_eq!(loaded.confidence_score, 0.93);
    }

    #[test]
    fn one_bad_row_does_not_sink_the_batch() {
        let conn = open_memory_database().unwrap();
        let good_a = sample_point();
        let duplicate = good_a.clone(); // same primary key → constraint failure
        let good_b = sample_point();

        let outcome =
            insert_data_points(&conn, None, "belimumab", "SLE", &[good_a, duplicate, good_b]);
        assert_eq!(outcome.inserted, 2);
        assert_eq!(outcome.failures.len(), 1);

        let stored = get_points_for_aggregation(&conn, "belimumab", "SLE").unwrap();
        assert_eq!(stored.len(), 2);
    }

    #[test]
    fn pending_review_transitions() {
        let conn = open_memory_database().unwrap();
        let mut point = sample_point();
        point.review_status = ReviewStatus::PendingReview;
        insert_data_point(&conn, None, "belimumab", "SLE", &point).unwrap();
        assert_eq!(count_pending(&conn).unwrap(), 1);

        set_review_status(&conn, &point.id, ReviewStatus::UserConfirmed).unwrap();
        assert_eq!(count_pending(&conn).unwrap(), 0);

        // Already confirmed: a second transition is rejected.
        let err = set_review_status(&conn, &point.id, ReviewStatus::UserRejected);
        assert!(matches!(err, Err(StoreError::InvalidTransition { .. })));
    }

    #[test]
    fn accepted_to_rejected_is_not_a_valid_transition() {
        let conn = open_memory_database().unwrap();
        let point = sample_point(); // auto_accepted
        insert_data_point(&conn, None, "belimumab", "SLE", &point).unwrap();
        let err = set_review_status(&conn, &point.id, ReviewStatus::UserRejected);
        assert!(matches!(err, Err(StoreError::InvalidTransition { .. })));
    }

    #[test]
    fn rejected_points_excluded_from_aggregation_query() {
        let conn = open_memory_database().unwrap();
        let mut pending = sample_point();
        pending.review_status = ReviewStatus::PendingReview;
        insert_data_point(&conn, None, "belimumab", "SLE", &pending).unwrap();
        set_review_status(&conn, &pending.id, ReviewStatus::UserRejected).unwrap();

        let accepted = sample_point();
        insert_data_point(&conn, None, "belimumab", "SLE", &accepted).unwrap();

        let points = get_points_for_aggregation(&conn, "belimumab", "SLE").unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].id, accepted.id);
    }

    #[test]
    fn missing_point_reports_not_found() {
        let conn = open_memory_database().unwrap();
        let err = set_review_status(&conn, &Uuid::new_v4(), ReviewStatus::UserConfirmed);
        assert!(matches!(err, Err(StoreError::NotFound { .. })));
    }
}
