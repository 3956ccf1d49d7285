//! Document repository: reads and writes for the `documents` table.
//!
//! Scanner writes are keyed by `localPath`; importer writes are keyed by
//! `companyDocNo`. Both go through the functions here.

use std::collections::HashMap;

use rusqlite::types::ToSql;
use rusqlite::{params, Connection, Row};
use serde::Serialize;

use super::{Database, DatabaseError};

/// Fields owned by the MDI report importer.
///
/// A rescan copies these forward unchanged; an import update rewrites
/// exactly these and nothing else.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrackingFields {
    pub ipi_status: Option<String>,
    pub review_code: Option<String>,
    pub trn_out_date: Option<String>,
    pub trn_out_no: Option<String>,
    pub date_receive_trn_out: Option<String>,
    pub trn_in_date: Option<String>,
    pub trn_in_no: Option<String>,
    pub ifi_plan_date: Option<String>,
    pub ifr_plan_date: Option<String>,
    pub ifa_plan_date: Option<String>,
    pub ifc_plan_date: Option<String>,
    pub iff_plan_date: Option<String>,
    pub ifi_actual_date: Option<String>,
    pub ifr_actual_date: Option<String>,
    pub ifa_actual_date: Option<String>,
    pub ifc_actual_date: Option<String>,
    pub iff_actual_date: Option<String>,
    pub target_mitigation_date: Option<String>,
    pub pic_ptsc: Option<String>,
    pub pic_lsp: Option<String>,
    pub doc_status: Option<String>,
}

impl TrackingFields {
    /// Store columns, in the order of [`TrackingFields::values`].
    pub const COLUMNS: [&'static str; 21] = [
        "ipi_status",
        "review_code",
        "trn_out_date",
        "trn_out_no",
        "date_receive_trn_out",
        "trn_in_date",
        "trn_in_no",
        "ifi_plan_date",
        "ifr_plan_date",
        "ifa_plan_date",
        "ifc_plan_date",
        "iff_plan_date",
        "ifi_actual_date",
        "ifr_actual_date",
        "ifa_actual_date",
        "ifc_actual_date",
        "iff_actual_date",
        "target_mitigation_date",
        "pic_ptsc",
        "pic_lsp",
        "doc_status",
    ];

    pub fn values(&self) -> [&Option<String>; 21] {
        [
            &self.ipi_status,
            &self.review_code,
            &self.trn_out_date,
            &self.trn_out_no,
            &self.date_receive_trn_out,
            &self.trn_in_date,
            &self.trn_in_no,
            &self.ifi_plan_date,
            &self.ifr_plan_date,
            &self.ifa_plan_date,
            &self.ifc_plan_date,
            &self.iff_plan_date,
            &self.ifi_actual_date,
            &self.ifr_actual_date,
            &self.ifa_actual_date,
            &self.ifc_actual_date,
            &self.iff_actual_date,
            &self.target_mitigation_date,
            &self.pic_ptsc,
            &self.pic_lsp,
            &self.doc_status,
        ]
    }

    fn values_mut(&mut self) -> [&mut Option<String>; 21] {
        [
            &mut self.ipi_status,
            &mut self.review_code,
            &mut self.trn_out_date,
            &mut self.trn_out_no,
            &mut self.date_receive_trn_out,
            &mut self.trn_in_date,
            &mut self.trn_in_no,
            &mut self.ifi_plan_date,
            &mut self.ifr_plan_date,
            &mut self.ifa_plan_date,
            &mut self.ifc_plan_date,
            &mut self.iff_plan_date,
            &mut self.ifi_actual_date,
            &mut self.ifr_actual_date,
            &mut self.ifa_actual_date,
            &mut self.ifc_actual_date,
            &mut self.iff_actual_date,
            &mut self.target_mitigation_date,
            &mut self.pic_ptsc,
            &mut self.pic_lsp,
            &mut self.doc_status,
        ]
    }

    /// True when no tracking field carries a value.
    pub fn is_empty(&self) -> bool {
        self.values().iter().all(|v| is_blank(v))
    }

    /// Copies every field of `other` into the blank fields of `self`.
    pub fn fill_missing_from(&mut self, other: &TrackingFields) {
        for (mine, theirs) in self.values_mut().into_iter().zip(other.values()) {
            if is_blank(mine) && !is_blank(theirs) {
                *mine = theirs.clone();
            }
        }
    }

    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            ipi_status: row.get("ipi_status")?,
            review_code: row.get("review_code")?,
            trn_out_date: row.get("trn_out_date")?,
            trn_out_no: row.get("trn_out_no")?,
            date_receive_trn_out: row.get("date_receive_trn_out")?,
            trn_in_date: row.get("trn_in_date")?,
            trn_in_no: row.get("trn_in_no")?,
            ifi_plan_date: row.get("ifi_plan_date")?,
            ifr_plan_date: row.get("ifr_plan_date")?,
            ifa_plan_date: row.get("ifa_plan_date")?,
            ifc_plan_date: row.get("ifc_plan_date")?,
            iff_plan_date: row.get("iff_plan_date")?,
            ifi_actual_date: row.get("ifi_actual_date")?,
            ifr_actual_date: row.get("ifr_actual_date")?,
            ifa_actual_date: row.get("ifa_actual_date")?,
            ifc_actual_date: row.get("ifc_actual_date")?,
            iff_actual_date: row.get("iff_actual_date")?,
            target_mitigation_date: row.get("target_mitigation_date")?,
            pic_ptsc: row.get("pic_ptsc")?,
            pic_lsp: row.get("pic_lsp")?,
            doc_status: row.get("doc_status")?,
        })
    }
}

/// Fields owned by the manual workflow steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkflowFields {
    #[serde(rename = "sharepointPath")]
    pub sharepoint_path: Option<String>,
    #[serde(rename = "feedbackStatus")]
    pub feedback_status: Option<String>,
}

/// A full `documents` row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentRow {
    #[serde(rename = "localPath")]
    pub local_path: String,
    pub stt: Option<i64>,
    pub name: Option<String>,
    pub table: Option<String>,
    pub description: Option<String>,
    pub discipline: Option<String>,
    #[serde(rename = "transNo")]
    pub trans_no: Option<String>,
    #[serde(rename = "dateReceived")]
    pub date_received: Option<String>,
    pub revision: Option<String>,
    pub doc_class: Option<String>,
    pub item: Option<String>,
    pub scope: Option<String>,
    #[serde(rename = "companyDocNo")]
    pub company_doc_no: Option<String>,
    #[serde(rename = "contractorDocNo")]
    pub contractor_doc_no: Option<String>,
    #[serde(flatten)]
    pub tracking: TrackingFields,
    #[serde(flatten)]
    pub workflow: WorkflowFields,
}

/// Columns written for a full row, tracking and workflow columns excluded.
const BASE_COLUMNS: [&str; 14] = [
    "localPath",
    "stt",
    "name",
    "table",
    "description",
    "discipline",
    "transNo",
    "dateReceived",
    "revision",
    "doc_class",
    "item",
    "scope",
    "companyDocNo",
    "contractorDocNo",
];

const WORKFLOW_COLUMNS: [&str; 2] = ["sharepointPath", "feedbackStatus"];

impl DocumentRow {
    pub(crate) fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            local_path: row.get("localPath")?,
            stt: row.get("stt")?,
            name: row.get("name")?,
            table: row.get("table")?,
            description: row.get("description")?,
            discipline: row.get("discipline")?,
            trans_no: row.get("transNo")?,
            date_received: row.get("dateReceived")?,
            revision: row.get("revision")?,
            doc_class: row.get("doc_class")?,
            item: row.get("item")?,
            scope: row.get("scope")?,
            company_doc_no: row.get("companyDocNo")?,
            contractor_doc_no: row.get("contractorDocNo")?,
            tracking: TrackingFields::from_row(row)?,
            workflow: WorkflowFields {
                sharepoint_path: row.get("sharepointPath")?,
                feedback_status: row.get("feedbackStatus")?,
            },
        })
    }

    /// Values in the order of [`all_columns`].
    fn sql_values(&self) -> Vec<&dyn ToSql> {
        let mut values: Vec<&dyn ToSql> = vec![
            &self.local_path,
            &self.stt,
            &self.name,
            &self.table,
            &self.description,
            &self.discipline,
            &self.trans_no,
            &self.date_received,
            &self.revision,
            &self.doc_class,
            &self.item,
            &self.scope,
            &self.company_doc_no,
            &self.contractor_doc_no,
        ];
        for value in self.tracking.values() {
            values.push(value);
        }
        values.push(&self.workflow.sharepoint_path);
        values.push(&self.workflow.feedback_status);
        values
    }
}

fn all_columns() -> impl Iterator<Item = &'static str> {
    BASE_COLUMNS
        .into_iter()
        .chain(TrackingFields::COLUMNS)
        .chain(WORKFLOW_COLUMNS)
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

fn upsert_sql() -> String {
    let columns: Vec<String> = all_columns().map(|c| format!("\"{}\"", c)).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
    format!(
        "INSERT OR REPLACE INTO documents ({}) VALUES ({})",
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// Finds a document by its local path.
pub fn find_by_path(db: &Database, local_path: &str) -> Result<Option<DocumentRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM documents WHERE localPath = ?1")?;
        let mut rows = stmt.query_map(params![local_path], DocumentRow::from_row)?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })
}

/// Loads every document keyed by local path.
pub fn load_existing_by_path(db: &Database) -> Result<HashMap<String, DocumentRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM documents")?;
        let rows = stmt
            .query_map([], DocumentRow::from_row)?
            .map(|r| r.map(|row| (row.local_path.clone(), row)))
            .collect::<Result<HashMap<_, _>, _>>()?;
        Ok(rows)
    })
}

/// Replaces the rows with the same `localPath`, all in one transaction.
pub fn upsert_many(db: &Database, rows: &[DocumentRow]) -> Result<usize, DatabaseError> {
    db.with_conn(|conn| {
        let tx = conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(&upsert_sql())?;
            for row in rows {
                stmt.execute(row.sql_values().as_slice())?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    })
}

/// Inserts a new row. Fails on an existing `localPath`.
pub fn insert(conn: &Connection, row: &DocumentRow) -> Result<(), DatabaseError> {
    let sql = upsert_sql().replacen("INSERT OR REPLACE", "INSERT", 1);
    conn.execute(&sql, row.sql_values().as_slice())?;
    Ok(())
}

/// Local paths of every row carrying the given company document number.
pub fn find_paths_by_company_doc_no(
    conn: &Connection,
    company_doc_no: &str,
) -> Result<Vec<String>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT localPath FROM documents WHERE companyDocNo = ?1 ORDER BY localPath")?;
    let paths = stmt
        .query_map(params![company_doc_no], |r| r.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(paths)
}

/// Overwrites the tracking fields of every row carrying the given company
/// document number. Returns the number of rows changed.
pub fn update_tracking_by_company_doc_no(
    conn: &Connection,
    company_doc_no: &str,
    tracking: &TrackingFields,
) -> Result<usize, DatabaseError> {
    let sql = update_tracking_sql("companyDocNo");
    let mut values: Vec<&dyn ToSql> = tracking
        .values()
        .into_iter()
        .map(|v| v as &dyn ToSql)
        .collect();
    values.push(&company_doc_no);
    Ok(conn.execute(&sql, values.as_slice())?)
}

fn update_tracking_sql(key_column: &str) -> String {
    let assignments: Vec<String> = TrackingFields::COLUMNS
        .iter()
        .enumerate()
        .map(|(i, c)| format!("\"{}\" = ?{}", c, i + 1))
        .collect();
    format!(
        "UPDATE documents SET {} WHERE \"{}\" = ?{}",
        assignments.join(", "),
        key_column,
        TrackingFields::COLUMNS.len() + 1
    )
}

/// All documents ordered by `stt` (unnumbered rows last), then name.
pub fn list_ordered(db: &Database) -> Result<Vec<DocumentRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT * FROM documents ORDER BY stt IS NULL, stt, name, localPath",
        )?;
        let rows = stmt
            .query_map([], DocumentRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Renumbers `stt` 1..n over the current ordering and persists it.
pub fn resequence(db: &Database) -> Result<Vec<DocumentRow>, DatabaseError> {
    let mut rows = list_ordered(db)?;
    db.with_conn(|conn| {
        let tx = conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare("UPDATE documents SET stt = ?1 WHERE localPath = ?2")?;
            for (i, row) in rows.iter_mut().enumerate() {
                let stt = i as i64 + 1;
                if row.stt != Some(stt) {
                    stmt.execute(params![stt, row.local_path])?;
                    row.stt = Some(stt);
                }
            }
        }
        tx.commit()?;
        Ok(())
    })?;
    Ok(rows)
}

pub fn set_sharepoint_path(
    db: &Database,
    local_path: &str,
    sharepoint_path: &str,
) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE documents SET sharepointPath = ?1 WHERE localPath = ?2",
            params![sharepoint_path, local_path],
        )?;
        Ok(changed > 0)
    })
}

pub fn set_feedback_status(
    db: &Database,
    local_path: &str,
    status: &str,
) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE documents SET feedbackStatus = ?1 WHERE localPath = ?2",
            params![status, local_path],
        )?;
        Ok(changed > 0)
    })
}

/// Outcome of merging importer placeholders into scanned rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    /// Placeholder rows inspected.
    pub placeholders: usize,
    /// Placeholders merged into at least one scanned row and deleted.
    pub merged: usize,
    /// Scanned rows that received tracking fields.
    pub updated_rows: usize,
}

/// Merges placeholder rows (keys starting with `placeholder_prefix`) into
/// scanned rows carrying the same company document number.
///
/// The scanned row keeps its classification. Its blank scope, contractor
/// number, tracking and workflow fields are filled from the placeholder,
/// which is then deleted. Running it again finds nothing to do.
pub fn reconcile_placeholders(
    db: &Database,
    placeholder_prefix: &str,
) -> Result<ReconcileReport, DatabaseError> {
    db.with_conn(|conn| {
        let tx = conn.unchecked_transaction()?;
        let mut report = ReconcileReport::default();

        let placeholders: Vec<DocumentRow> = {
            let mut stmt = tx.prepare(
                "SELECT * FROM documents
                 WHERE substr(localPath, 1, length(?1)) = ?1
                 ORDER BY localPath",
            )?;
            let rows = stmt
                .query_map(params![placeholder_prefix], DocumentRow::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };
        report.placeholders = placeholders.len();

        for placeholder in placeholders {
            let Some(doc_no) = placeholder
                .company_doc_no
                .as_deref()
                .filter(|n| !n.trim().is_empty())
            else {
                continue;
            };

            let scanned: Vec<DocumentRow> = {
                let mut stmt = tx.prepare(
                    "SELECT * FROM documents
                     WHERE companyDocNo = ?1 AND substr(localPath, 1, length(?2)) != ?2",
                )?;
                let rows = stmt
                    .query_map(params![doc_no, placeholder_prefix], DocumentRow::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            };
            if scanned.is_empty() {
                continue;
            }

            let update_sql = update_tracking_sql("localPath");
            for mut row in scanned {
                row.tracking.fill_missing_from(&placeholder.tracking);
                if is_blank(&row.scope) {
                    row.scope = placeholder.scope.clone();
                }
                if is_blank(&row.contractor_doc_no) {
                    row.contractor_doc_no = placeholder.contractor_doc_no.clone();
                }
                if is_blank(&row.workflow.sharepoint_path) {
                    row.workflow.sharepoint_path = placeholder.workflow.sharepoint_path.clone();
                }
                if is_blank(&row.workflow.feedback_status) {
                    row.workflow.feedback_status = placeholder.workflow.feedback_status.clone();
                }

                let mut values: Vec<&dyn ToSql> = row
                    .tracking
                    .values()
                    .into_iter()
                    .map(|v| v as &dyn ToSql)
                    .collect();
                values.push(&row.local_path);
                tx.execute(&update_sql, values.as_slice())?;
                tx.execute(
                    "UPDATE documents SET scope = ?1, contractorDocNo = ?2,
                     sharepointPath = ?3, feedbackStatus = ?4
                     WHERE localPath = ?5",
                    params![
                        row.scope,
                        row.contractor_doc_no,
                        row.workflow.sharepoint_path,
                        row.workflow.feedback_status,
                        row.local_path
                    ],
                )?;
                report.updated_rows += 1;
            }

            tx.execute(
                "DELETE FROM documents WHERE localPath = ?1",
                params![placeholder.local_path],
            )?;
            log::debug!(
                "Merged placeholder {} into scanned document(s) for {}",
                placeholder.local_path,
                doc_no
            );
            report.merged += 1;
        }

        tx.commit()?;
        Ok(report)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanned(path: &str, name: &str) -> DocumentRow {
        DocumentRow {
            local_path: path.to_string(),
            name: Some(name.to_string()),
            table: Some("Piping".to_string()),
            discipline: Some("MECH".to_string()),
            revision: Some("B".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_upsert_and_find() {
        let db = Database::open_in_memory().unwrap();
        let mut row = scanned("/p/a.pdf", "a");
        row.tracking.doc_status = Some("Approved".to_string());
        row.workflow.feedback_status = Some("Feedback received".to_string());

        upsert_many(&db, &[row.clone()]).unwrap();
        assert_eq!(find_by_path(&db, "/p/a.pdf").unwrap(), Some(row));
        assert_eq!(find_by_path(&db, "/p/missing.pdf").unwrap(), None);
    }

    #[test]
    fn test_upsert_replaces_on_same_path() {
        let db = Database::open_in_memory().unwrap();
        upsert_many(&db, &[scanned("/p/a.pdf", "a")]).unwrap();
        let mut second = scanned("/p/a.pdf", "a");
        second.revision = Some("C".to_string());
        upsert_many(&db, &[second]).unwrap();

        let all = load_existing_by_path(&db).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all["/p/a.pdf"].revision.as_deref(), Some("C"));
    }

    #[test]
    fn test_update_tracking_touches_only_tracking() {
        let db = Database::open_in_memory().unwrap();
        let mut row = scanned("/p/a.pdf", "a");
        row.company_doc_no = Some("DOC-1".to_string());
        row.scope = Some("PTSC".to_string());
        row.contractor_doc_no = Some("C-1".to_string());
        row.workflow.sharepoint_path = Some("/sp/MECH/a.pdf".to_string());
        upsert_many(&db, &[row]).unwrap();

        let tracking = TrackingFields {
            doc_status: Some("Waiting Cmt".to_string()),
            ifi_plan_date: Some("2024-01-15".to_string()),
            ..Default::default()
        };
        let changed = db
            .with_conn(|conn| update_tracking_by_company_doc_no(conn, "DOC-1", &tracking))
            .unwrap();
        assert_eq!(changed, 1);

        let stored = find_by_path(&db, "/p/a.pdf").unwrap().unwrap();
        assert_eq!(stored.tracking, tracking);
        assert_eq!(stored.table.as_deref(), Some("Piping"));
        assert_eq!(stored.scope.as_deref(), Some("PTSC"));
        assert_eq!(stored.contractor_doc_no.as_deref(), Some("C-1"));
        assert_eq!(stored.workflow.sharepoint_path.as_deref(), Some("/sp/MECH/a.pdf"));
    }

    #[test]
    fn test_insert_rejects_duplicate_path() {
        let db = Database::open_in_memory().unwrap();
        let row = scanned("IMPORT_DOC-1", "Doc");
        db.with_conn(|conn| insert(conn, &row)).unwrap();
        assert!(db.with_conn(|conn| insert(conn, &row)).is_err());
    }

    #[test]
    fn test_resequence_orders_by_stt_then_name() {
        let db = Database::open_in_memory().unwrap();
        let mut b = scanned("/p/b.pdf", "b");
        b.stt = Some(1);
        let mut c = scanned("/p/c.pdf", "c");
        c.stt = Some(2);
        // Unnumbered rows go after every numbered one.
        let a = scanned("/p/a.pdf", "a");
        upsert_many(&db, &[c, a, b]).unwrap();

        let rows = resequence(&db).unwrap();
        let order: Vec<(&str, Option<i64>)> = rows
            .iter()
            .map(|r| (r.local_path.as_str(), r.stt))
            .collect();
        assert_eq!(
            order,
            vec![("/p/b.pdf", Some(1)), ("/p/c.pdf", Some(2)), ("/p/a.pdf", Some(3))]
        );
        assert_eq!(find_by_path(&db, "/p/a.pdf").unwrap().unwrap().stt, Some(3));
    }

    #[test]
    fn test_resequence_keeps_existing_numbers() {
        let db = Database::open_in_memory().unwrap();
        let mut rows: Vec<DocumentRow> = ["/p/m.pdf", "/p/n.pdf"]
            .iter()
            .zip(1..)
            .map(|(path, stt)| {
                let mut row = scanned(path, path);
                row.stt = Some(stt);
                row
            })
            .collect();
        // Sorts before both by name, but has no number yet.
        rows.push(scanned("/p/0-new.pdf", "0-new"));
        upsert_many(&db, &rows).unwrap();

        resequence(&db).unwrap();
        assert_eq!(find_by_path(&db, "/p/m.pdf").unwrap().unwrap().stt, Some(1));
        assert_eq!(find_by_path(&db, "/p/n.pdf").unwrap().unwrap().stt, Some(2));
        assert_eq!(find_by_path(&db, "/p/0-new.pdf").unwrap().unwrap().stt, Some(3));
    }

    #[test]
    fn test_workflow_setters() {
        let db = Database::open_in_memory().unwrap();
        upsert_many(&db, &[scanned("/p/a.pdf", "a")]).unwrap();

        assert!(set_sharepoint_path(&db, "/p/a.pdf", "/sp/MECH/a.pdf").unwrap());
        assert!(set_feedback_status(&db, "/p/a.pdf", "Feedback received").unwrap());
        assert!(!set_feedback_status(&db, "/p/none.pdf", "x").unwrap());

        let row = find_by_path(&db, "/p/a.pdf").unwrap().unwrap();
        assert_eq!(row.workflow.sharepoint_path.as_deref(), Some("/sp/MECH/a.pdf"));
        assert_eq!(row.workflow.feedback_status.as_deref(), Some("Feedback received"));
    }

    #[test]
    fn test_fill_missing_from() {
        let mut mine = TrackingFields {
            doc_status: Some("Approved".to_string()),
            pic_lsp: Some("  ".to_string()),
            ..Default::default()
        };
        let theirs = TrackingFields {
            doc_status: Some("Waiting Cmt".to_string()),
            pic_lsp: Some("Lan".to_string()),
            review_code: Some("1".to_string()),
            ..Default::default()
        };
        mine.fill_missing_from(&theirs);
        assert_eq!(mine.doc_status.as_deref(), Some("Approved"));
        assert_eq!(mine.pic_lsp.as_deref(), Some("Lan"));
        assert_eq!(mine.review_code.as_deref(), Some("1"));
        assert!(!mine.is_empty());
        assert!(TrackingFields::default().is_empty());
    }

    #[test]
    fn test_reconcile_merges_and_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        let mut file = scanned("/p/TF1-2A19-001_B.pdf", "TF1-2A19-001_B");
        file.company_doc_no = Some("TF1-2A19-001".to_string());
        file.tracking.pic_ptsc = Some("Hai".to_string());

        let mut placeholder = DocumentRow {
            local_path: "IMPORT_TF1-2A19-001".to_string(),
            name: Some("Pipe layout".to_string()),
            table: Some("Report table".to_string()),
            company_doc_no: Some("TF1-2A19-001".to_string()),
            ..Default::default()
        };
        placeholder.scope = Some("PTSC".to_string());
        placeholder.tracking.doc_status = Some("Approved".to_string());
        placeholder.tracking.pic_ptsc = Some("Other".to_string());

        let orphan = DocumentRow {
            local_path: "IMPORT_DOC-9".to_string(),
            company_doc_no: Some("DOC-9".to_string()),
            ..Default::default()
        };
        upsert_many(&db, &[file, placeholder, orphan]).unwrap();

        let report = reconcile_placeholders(&db, "IMPORT_").unwrap();
        assert_eq!(report.placeholders, 2);
        assert_eq!(report.merged, 1);
        assert_eq!(report.updated_rows, 1);

        let merged = find_by_path(&db, "/p/TF1-2A19-001_B.pdf").unwrap().unwrap();
        assert_eq!(merged.table.as_deref(), Some("Piping"));
        assert_eq!(merged.scope.as_deref(), Some("PTSC"));
        assert_eq!(merged.tracking.doc_status.as_deref(), Some("Approved"));
        assert_eq!(merged.tracking.pic_ptsc.as_deref(), Some("Hai"));
        assert!(find_by_path(&db, "IMPORT_TF1-2A19-001").unwrap().is_none());
        assert!(find_by_path(&db, "IMPORT_DOC-9").unwrap().is_some());

        let again = reconcile_placeholders(&db, "IMPORT_").unwrap();
        assert_eq!(again.merged, 0);
        assert_eq!(again.placeholders, 1);
    }

    #[test]
    fn test_serializes_with_store_column_names() {
        let mut row = scanned("/p/a.pdf", "a");
        row.contractor_doc_no = Some("C-1".to_string());
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["localPath"], "/p/a.pdf");
        assert_eq!(value["contractorDocNo"], "C-1");
        assert!(value.get("sharepointPath").is_some());
        assert!(value.get("tracking").is_none());
    }
}
