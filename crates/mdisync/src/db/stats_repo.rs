//! Document statistics for the dashboard.

use std::collections::BTreeMap;

use rusqlite::{params, Connection};
use serde::Serialize;

use super::{Database, DatabaseError};
use crate::NOT_AVAILABLE;

/// Status categories of the MDI summary sheet, matched as substrings of
/// `doc_status`.
pub const STATUS_CATEGORIES: [&str; 8] = [
    "Input Plan",
    "Ongoing 1st Issue",
    "Ongoing Resubmit",
    "Overdue 1st issue",
    "Overdue Cmt",
    "Overdue Re-submit",
    "Waiting Issue Final",
    "Waiting Cmt",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransmittalStats {
    pub total_out: i64,
    /// Sent out, no reply yet.
    pub pending: i64,
    pub received: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub by_table: BTreeMap<String, i64>,
    pub total: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStats {
    pub total_documents: i64,
    pub by_discipline: BTreeMap<String, i64>,
    pub by_scope: BTreeMap<String, i64>,
    pub by_ipi_status: BTreeMap<String, i64>,
    pub by_status: BTreeMap<String, i64>,
    pub by_review_code: BTreeMap<String, i64>,
    pub transmittals: TransmittalStats,
    pub needing_feedback: i64,
    pub status_categories: BTreeMap<String, CategoryStats>,
    pub status_by_table: BTreeMap<String, BTreeMap<String, i64>>,
    pub overdue_by_table: BTreeMap<String, i64>,
}

/// Computes every dashboard aggregate over the `documents` table.
pub fn document_stats(db: &Database) -> Result<DocumentStats, DatabaseError> {
    db.with_conn(|conn| {
        let mut stats = DocumentStats {
            total_documents: count(conn, "SELECT COUNT(*) FROM documents")?,
            // Rows without a discipline are grouped under N/A.
            by_discipline: group_counts(conn, "discipline", false)?,
            by_scope: group_counts(conn, "scope", true)?,
            by_ipi_status: group_counts(conn, "ipi_status", true)?,
            by_status: group_counts(conn, "doc_status", true)?,
            by_review_code: group_counts(conn, "review_code", true)?,
            transmittals: TransmittalStats {
                total_out: count(
                    conn,
                    "SELECT COUNT(*) FROM documents WHERE trn_out_date IS NOT NULL",
                )?,
                pending: count(
                    conn,
                    "SELECT COUNT(*) FROM documents
                     WHERE trn_out_date IS NOT NULL AND trn_in_date IS NULL",
                )?,
                received: count(
                    conn,
                    "SELECT COUNT(*) FROM documents WHERE trn_in_date IS NOT NULL",
                )?,
            },
            needing_feedback: count(
                conn,
                "SELECT COUNT(*) FROM documents
                 WHERE feedbackStatus IS NULL OR feedbackStatus = ''",
            )?,
            ..Default::default()
        };

        for category in STATUS_CATEGORIES {
            let pattern = format!("%{}%", category);
            let by_table = table_counts(conn, "WHERE doc_status LIKE ?1", &pattern)?;
            let total = by_table.values().sum();
            stats
                .status_categories
                .insert(category.to_string(), CategoryStats { by_table, total });
        }

        let mut stmt = conn.prepare(
            "SELECT \"table\", doc_status, COUNT(*) FROM documents
             WHERE \"table\" IS NOT NULL AND doc_status IS NOT NULL
             GROUP BY \"table\", doc_status",
        )?;
        let rows = stmt.query_map([], |r| {
            Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?, r.get::<_, i64>(2)?))
        })?;
        for row in rows {
            let (table, status, n) = row?;
            stats
                .status_by_table
                .entry(table)
                .or_default()
                .insert(status, n);
        }

        stats.overdue_by_table = table_counts(conn, "WHERE doc_status LIKE ?1", "%Overdue%")?;
        stats.overdue_by_table.remove(NOT_AVAILABLE);

        Ok(stats)
    })
}

fn count(conn: &Connection, sql: &str) -> Result<i64, DatabaseError> {
    Ok(conn.query_row(sql, [], |r| r.get(0))?)
}

fn group_counts(
    conn: &Connection,
    column: &str,
    skip_null: bool,
) -> Result<BTreeMap<String, i64>, DatabaseError> {
    super::ensure_identifier(column)?;
    let filter = if skip_null {
        format!("WHERE {} IS NOT NULL", column)
    } else {
        String::new()
    };
    let sql = format!(
        "SELECT {col}, COUNT(*) FROM documents {filter} GROUP BY {col}",
        col = column,
        filter = filter
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |r| {
        Ok((r.get::<_, Option<String>>(0)?, r.get::<_, i64>(1)?))
    })?;

    let mut counts = BTreeMap::new();
    for row in rows {
        let (key, n) = row?;
        let key = key
            .filter(|k| !k.is_empty())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        *counts.entry(key).or_insert(0) += n;
    }
    Ok(counts)
}

fn table_counts(
    conn: &Connection,
    filter: &str,
    pattern: &str,
) -> Result<BTreeMap<String, i64>, DatabaseError> {
    let sql = format!(
        "SELECT \"table\", COUNT(*) FROM documents {} GROUP BY \"table\"",
        filter
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![pattern], |r| {
        Ok((r.get::<_, Option<String>>(0)?, r.get::<_, i64>(1)?))
    })?;

    let mut counts = BTreeMap::new();
    for row in rows {
        let (table, n) = row?;
        let table = table
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        *counts.entry(table).or_insert(0) += n;
    }
    Ok(counts)
}
