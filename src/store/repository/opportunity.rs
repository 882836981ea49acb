//! Opportunity persistence: full replace-on-conflict keyed by
//! (drug, disease). Rollups are recomputed wholesale by the aggregator,
//! never patched field-by-field.

use std::str::FromStr;

use chrono::Utc;
use rusqlite::{params, Connection, Row};

use crate::models::{Consistency, EfficacySignal, EvidenceLevel, Opportunity};
use crate::store::StoreError;

pub fn replace_opportunities(
    conn: &Connection,
    opportunities: &[Opportunity],
) -> Result<(), StoreError> {
    let now = Utc::now().to_rfc3339();
    for opp in opportunities {
        let contributing = serde_json::to_string(&opp.contributing_papers)
            .unwrap_or_else(|_| "[]".to_string());
        conn.execute(
            "INSERT INTO opportunities (drug_key, disease, total_patients, study_count,
             aggregate_score, best_paper_id, best_paper_score, avg_response_rate,
             consistency, cv, evidence_level, efficacy_signal, contributing_papers,
             rank, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
             ON CONFLICT(drug_key, disease) DO UPDATE SET
                 total_patients = excluded.total_patients,
                 study_count = excluded.study_count,
                 aggregate_score = excluded.aggregate_score,
                 best_paper_id = excluded.best_paper_id,
                 best_paper_score = excluded.best_paper_score,
                 avg_response_rate = excluded.avg_response_rate,
                 consistency = excluded.consistency,
                 cv = excluded.cv,
                 evidence_level = excluded.evidence_level,
                 efficacy_signal = excluded.efficacy_signal,
                 contributing_papers = excluded.contributing_papers,
                 rank = excluded.rank,
                 updated_at = excluded.updated_at",
            params![
                opp.drug_key,
                opp.disease,
                opp.total_patients as i64,
                opp.study_count as i64,
                opp.aggregate_score,
                opp.best_paper_id,
                opp.best_paper_score,
                opp.avg_response_rate,
                opp.consistency.as_str(),
                opp.cv,
                opp.evidence_level.as_str(),
                opp.efficacy_signal.as_str(),
                contributing,
                opp.rank,
                now,
            ],
        )?;
    }
    Ok(())
}

fn opportunity_from_row(row: &Row) -> Result<Opportunity, rusqlite::Error> {
    let consistency: String = row.get(8)?;
    let evidence_level: String = row.get(10)?;
    let efficacy_signal: String = row.get(11)?;
    let contributing: String = row.get(12)?;

    Ok(Opportunity {
        drug_key: row.get(0)?,
        disease: row.get(1)?,
        total_patients: row.get::<_, i64>(2)? as u64,
        study_count: row.get::<_, i64>(3)? as usize,
        aggregate_score: row.get(4)?,
        best_paper_id: row.get(5)?,
        best_paper_score: row.get(6)?,
        avg_response_rate: row.get(7)?,
        consistency: Consistency::from_str(&consistency).unwrap_or(Consistency::NotAvailable),
        cv: row.get(9)?,
        evidence_level: EvidenceLevel::from_str(&evidence_level)
            .unwrap_or(EvidenceLevel::Unknown),
        efficacy_signal: EfficacySignal::from_str(&efficacy_signal)
            .unwrap_or(EfficacySignal::None),
        contributing_papers: serde_json::from_str(&contributing).unwrap_or_default(),
        rank: row.get(13)?,
    })
}

pub fn get_opportunities_for_drug(
    conn: &Connection,
    drug_key: &str,
) -> Result<Vec<Opportunity>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT drug_key, disease, total_patients, study_count, aggregate_score,
         best_paper_id, best_paper_score, avg_response_rate, consistency, cv,
         evidence_level, efficacy_signal, contributing_papers, rank
         FROM opportunities WHERE drug_key = ?1 ORDER BY rank",
    )?;
    let rows = stmt.query_map([drug_key], opportunity_from_row)?;
    let mut opportunities = Vec::new();
    for row in rows {
        opportunities.push(row?);
    }
    Ok(opportunities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::sqlite::open_memory_database;

    fn opportunity(disease: &str, score: f64, rank: u32) -> Opportunity {
        Opportunity {
            drug_key: "belimumab".to_string(),
            disease: disease.to_string(),
            total_patients: 867,
            study_count: 2,
            aggregate_score: score,
            best_paper_id: Some("19945765".to_string()),
            best_paper_score: Some(score),
            avg_response_rate: Some(52.4),
            consistency: Consistency::High,
            cv: Some(4.2),
            evidence_level: EvidenceLevel::Rct,
            efficacy_signal: EfficacySignal::Strong,
            contributing_papers: vec!["19945765".to_string(), "21292033".to_string()],
            rank,
        }
    }

    #[test]
    fn roundtrips_an_opportunity() {
        let conn = open_memory_database().unwrap();
        replace_opportunities(&conn, &[opportunity("SLE", 8.4, 1)]).unwrap();
        let loaded = get_opportunities_for_drug(&conn, "belimumab").unwrap();
        assert_eq!(loaded.len(), 1);
        let opp = &loaded[0];
        assert_eq!(opp.disease, "SLE");
        assert_eq!(opp.total_patients, 867);
        assert_eq!(opp.consistency, Consistency::High);
        assert_eq!(opp.evidence_level, EvidenceLevel::Rct);
        assert_eq!(opp.contributing_papers.len(), 2);
    }

    #[test]
    fn conflict_replaces_the_whole_row() {
        let conn = open_memory_database().unwrap();
        replace_opportunities(&conn, &[opportunity("SLE", 8.4, 1)]).unwrap();

        let mut updated = opportunity("SLE", 3.1, 4);
        updated.consistency = Consistency::Low;
        updated.contributing_papers = vec!["99999999".to_string()];
        replace_opportunities(&conn, &[updated]).unwrap();

        let loaded = get_opportunities_for_drug(&conn, "belimumab").unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].aggregate_score, 3.1);
        assert_eq!(loaded[0].rank, 4);
        assert_eq!(loaded[0].consistency, Consistency::Low);
        assert_eq!(loaded[0].contributing_papers, vec!["99999999".to_string()]);
    }

    #[test]
    fn listing_orders_by_rank() {
        let conn = open_memory_database().unwrap();
        replace_opportunities(
            &conn,
            &[
                opportunity("Sjogren Syndrome", 4.0, 2),
                opportunity("SLE", 8.4, 1),
            ],
        )
        .unwrap();
        let loaded = get_opportunities_for_drug(&conn, "belimumab").unwrap();
        assert_eq!(loaded[0].disease, "SLE");
        assert_eq!(loaded[1].disease, "Sjogren Syndrome");
    }
}
