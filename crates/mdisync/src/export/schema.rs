//! Store schema detection.
//!
//! Stores written by different versions of the tooling name columns
//! differently and keep milestone dates either in per-milestone columns or
//! in two serialized maps. The layout is detected once per export and one
//! mapping is applied to every row.

use std::collections::{HashMap, HashSet};

use rusqlite::types::ValueRef;
use rusqlite::{Connection, Row};

use super::contract::MilestoneDates;
use crate::dates;
use crate::db::{ensure_identifier, table_columns, table_names, DatabaseError};
use crate::error::ExportError;
use crate::importer::sheet::format_number;

/// Document tables in order of preference.
const DOCUMENT_TABLES: [&str; 2] = ["mdi_documents", "documents"];

const MILESTONES: [&str; 5] = ["ifi", "ifr", "ifa", "ifc", "iff"];

// Column-name variants, newest naming first.
const DOC_NO_COLUMNS: [&str; 2] = ["document_no", "companyDocNo"];
const STATUS_COLUMNS: [&str; 2] = ["status", "doc_status"];
const TABLE_COLUMNS: [&str; 2] = ["table_name", "table"];
const DATE_RECEIVED_COLUMNS: [&str; 2] = ["dateReceived", "date_received"];
const TITLE_COLUMNS: [&str; 2] = ["title", "name"];

/// Where milestone dates live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateLayout {
    /// `ifi_plan_date` … `iff_actual_date`.
    PerMilestone,
    /// `plan_dates` / `actual_dates` holding JSON maps.
    Serialized,
}

/// A row with every column rendered as text.
#[derive(Debug, Clone, Default)]
pub struct RawRecord {
    values: HashMap<String, String>,
}

impl RawRecord {
    pub fn from_row(row: &Row<'_>, columns: &[String]) -> Result<Self, rusqlite::Error> {
        let mut values = HashMap::with_capacity(columns.len());
        for (i, column) in columns.iter().enumerate() {
            let text = match row.get_ref(i)? {
                ValueRef::Null | ValueRef::Blob(_) => None,
                ValueRef::Integer(n) => Some(n.to_string()),
                ValueRef::Real(f) => Some(format_number(f)),
                ValueRef::Text(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
            };
            if let Some(text) = text {
                values.insert(column.clone(), text);
            }
        }
        Ok(Self { values })
    }

    /// Trimmed, non-empty value of `column`.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values
            .get(column)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// First non-empty value among `columns`.
    fn first_of(&self, columns: &[&str]) -> Option<&str> {
        columns.iter().find_map(|c| self.get(c))
    }

    /// Stored positive `stt`, if any.
    pub fn stt(&self) -> Option<i64> {
        self.get("stt")
            .and_then(|s| s.parse::<f64>().ok())
            .map(|n| n as i64)
            .filter(|n| *n > 0)
    }

    #[cfg(test)]
    pub fn with(mut self, column: &str, value: &str) -> Self {
        self.values.insert(column.to_string(), value.to_string());
        self
    }
}

/// Column names resolved against one store.
#[derive(Debug, Clone)]
pub struct SchemaAdapter {
    pub table: String,
    pub doc_no: Option<&'static str>,
    pub status: Option<&'static str>,
    pub table_name: Option<&'static str>,
    pub date_received: Option<&'static str>,
    pub title: Option<&'static str>,
    pub date_layout: DateLayout,
    columns: HashSet<String>,
}

impl SchemaAdapter {
    /// Picks the document table and resolves every column once.
    pub fn detect(conn: &Connection) -> Result<Self, ExportError> {
        let tables = table_names(conn)?;
        let table = DOCUMENT_TABLES
            .iter()
            .find(|t| tables.iter().any(|name| name == *t))
            .ok_or_else(|| ExportError::NoDocumentTable(tables.join(", ")))?;

        let columns: HashSet<String> = table_columns(conn, table)?.into_iter().collect();
        Ok(Self::from_columns(table, columns))
    }

    pub fn from_columns(table: &str, columns: HashSet<String>) -> Self {
        let pick = |candidates: &[&'static str]| -> Option<&'static str> {
            candidates.iter().copied().find(|c| columns.contains(*c))
        };

        let date_layout = if columns.contains("ifi_plan_date") {
            DateLayout::PerMilestone
        } else if columns.contains("plan_dates") && columns.contains("actual_dates") {
            DateLayout::Serialized
        } else {
            DateLayout::PerMilestone
        };

        let doc_no = pick(&DOC_NO_COLUMNS);
        let status = pick(&STATUS_COLUMNS);
        let table_name = pick(&TABLE_COLUMNS);
        let date_received = pick(&DATE_RECEIVED_COLUMNS);
        let title = pick(&TITLE_COLUMNS);

        Self {
            table: table.to_string(),
            doc_no,
            status,
            table_name,
            date_received,
            title,
            date_layout,
            columns,
        }
    }

    pub fn has(&self, column: &str) -> bool {
        self.columns.contains(column)
    }

    /// Rows carrying a business number, in `stt` order. `None` when the
    /// store has no document-number column at all.
    pub fn select_sql(&self) -> Result<Option<String>, DatabaseError> {
        ensure_identifier(&self.table)?;
        let Some(doc_no) = self.doc_no else {
            return Ok(None);
        };

        let mut order = Vec::new();
        if self.has("stt") {
            order.push("stt IS NULL".to_string());
            order.push("stt".to_string());
        }
        order.push(format!("\"{}\"", doc_no));
        if self.has("localPath") {
            order.push("localPath".to_string());
        }

        Ok(Some(format!(
            "SELECT * FROM {table} WHERE \"{col}\" IS NOT NULL AND TRIM(\"{col}\") != '' ORDER BY {order}",
            table = self.table,
            col = doc_no,
            order = order.join(", ")
        )))
    }

    // On a store carrying both namings, an empty newer column falls
    // through to the older one for that row.

    pub fn document_no<'r>(&self, raw: &'r RawRecord) -> Option<&'r str> {
        raw.first_of(&DOC_NO_COLUMNS)
            .or_else(|| raw.get("contractorDocNo"))
    }

    pub fn status<'r>(&self, raw: &'r RawRecord) -> Option<&'r str> {
        raw.first_of(&STATUS_COLUMNS)
            .or_else(|| raw.get("feedbackStatus"))
    }

    pub fn table_value<'r>(&self, raw: &'r RawRecord) -> Option<&'r str> {
        raw.first_of(&TABLE_COLUMNS)
    }

    pub fn title<'r>(&self, raw: &'r RawRecord) -> Option<&'r str> {
        raw.first_of(&TITLE_COLUMNS)
    }

    pub fn date_received(&self, raw: &RawRecord) -> Option<String> {
        dates::normalize_opt(raw.first_of(&DATE_RECEIVED_COLUMNS))
    }

    /// Plan and actual dates through the layout chosen for this store.
    pub fn milestones(&self, raw: &RawRecord) -> (MilestoneDates, MilestoneDates) {
        match self.date_layout {
            DateLayout::PerMilestone => (
                dates_from_columns(raw, "plan"),
                dates_from_columns(raw, "actual"),
            ),
            DateLayout::Serialized => (
                dates_from_serialized(raw.get("plan_dates")),
                dates_from_serialized(raw.get("actual_dates")),
            ),
        }
    }
}

fn dates_from_columns(raw: &RawRecord, kind: &str) -> MilestoneDates {
    let date = |milestone: &str| {
        dates::normalize_opt(raw.get(&format!("{}_{}_date", milestone, kind)))
    };
    MilestoneDates {
        ifi: date("ifi"),
        ifr: date("ifr"),
        ifa: date("ifa"),
        ifc: date("ifc"),
        iff: date("iff"),
    }
}

/// Parses a JSON map of milestone to date. Keys are matched
/// case-insensitively; `IFF/ASB` counts as `iff`. Malformed JSON yields
/// no dates.
fn dates_from_serialized(text: Option<&str>) -> MilestoneDates {
    let Some(text) = text else {
        return MilestoneDates::default();
    };
    let map = match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(text) {
        Ok(map) => map,
        Err(e) => {
            log::debug!("Ignoring malformed milestone map: {}", e);
            return MilestoneDates::default();
        }
    };

    let mut found: HashMap<&str, String> = HashMap::new();
    for (key, value) in &map {
        let key = key.trim().to_lowercase();
        let Some(milestone) = MILESTONES
            .iter()
            .copied()
            .find(|m| key == *m || key.starts_with(&format!("{}/", m)))
        else {
            continue;
        };
        let text = match value {
            serde_json::Value::String(s) => dates::normalize_text(s),
            serde_json::Value::Number(n) => n
                .as_f64()
                .and_then(dates::serial_to_date)
                .map(dates::format_date),
            _ => None,
        };
        if let Some(text) = text {
            found.insert(milestone, text);
        }
    }

    MilestoneDates {
        ifi: found.remove("ifi"),
        ifr: found.remove("ifr"),
        ifa: found.remove("ifa"),
        ifc: found.remove("ifc"),
        iff: found.remove("iff"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_prefers_newer_columns_on_hybrid_store() {
        let adapter = SchemaAdapter::from_columns(
            "documents",
            columns(&[
                "companyDocNo",
                "document_no",
                "doc_status",
                "status",
                "table",
                "table_name",
                "name",
                "title",
                "ifi_plan_date",
            ]),
        );
        assert_eq!(adapter.doc_no, Some("document_no"));
        assert_eq!(adapter.status, Some("status"));
        assert_eq!(adapter.table_name, Some("table_name"));
        assert_eq!(adapter.title, Some("title"));
        assert_eq!(adapter.date_layout, DateLayout::PerMilestone);

        let raw = RawRecord::default()
            .with("document_no", "NEW-1")
            .with("companyDocNo", "OLD-1")
            .with("status", "")
            .with("doc_status", "Approved")
            .with("title", "Title")
            .with("name", "Name");
        assert_eq!(adapter.document_no(&raw), Some("NEW-1"));
        assert_eq!(adapter.status(&raw), Some("Approved"));
        assert_eq!(adapter.title(&raw), Some("Title"));
    }

    #[test]
    fn test_stored_stt() {
        assert_eq!(RawRecord::default().with("stt", "7").stt(), Some(7));
        assert_eq!(RawRecord::default().with("stt", "3.0").stt(), Some(3));
        assert_eq!(RawRecord::default().with("stt", "0").stt(), None);
        assert_eq!(RawRecord::default().stt(), None);
    }

    #[test]
    fn test_select_sorts_unnumbered_last() {
        let adapter =
            SchemaAdapter::from_columns("documents", columns(&["stt", "companyDocNo", "localPath"]));
        let sql = adapter.select_sql().unwrap().unwrap();
        assert!(sql.ends_with("ORDER BY stt IS NULL, stt, \"companyDocNo\", localPath"));
    }

    #[test]
    fn test_falls_back_to_legacy_columns() {
        let adapter = SchemaAdapter::from_columns(
            "mdi_documents",
            columns(&[
                "id",
                "companyDocNo",
                "doc_status",
                "table",
                "date_received",
                "name",
                "plan_dates",
                "actual_dates",
            ]),
        );
        assert_eq!(adapter.doc_no, Some("companyDocNo"));
        assert_eq!(adapter.status, Some("doc_status"));
        assert_eq!(adapter.table_name, Some("table"));
        assert_eq!(adapter.date_received, Some("date_received"));
        assert_eq!(adapter.title, Some("name"));
        assert_eq!(adapter.date_layout, DateLayout::Serialized);
    }

    #[test]
    fn test_no_doc_number_column_selects_nothing() {
        let adapter = SchemaAdapter::from_columns("documents", columns(&["localPath", "name"]));
        assert_eq!(adapter.select_sql().unwrap(), None);
    }

    #[test]
    fn test_serialized_dates() {
        let dates = dates_from_serialized(Some(
            r#"{"IFI": "2024-01-15", "ifr": 45307, "IFF/ASB": "16/01/2024", "ifa": "TBA", "x": "2024-01-01"}"#,
        ));
        assert_eq!(dates.ifi.as_deref(), Some("2024-01-15"));
        assert_eq!(dates.ifr.as_deref(), Some("2024-01-16"));
        assert_eq!(dates.iff.as_deref(), Some("2024-01-16"));
        assert_eq!(dates.ifa, None);
        assert_eq!(dates.ifc, None);

        assert_eq!(dates_from_serialized(Some("not json")), MilestoneDates::default());
        assert_eq!(dates_from_serialized(None), MilestoneDates::default());
    }

    #[test]
    fn test_field_fallbacks() {
        let adapter = SchemaAdapter::from_columns(
            "documents",
            columns(&["companyDocNo", "contractorDocNo", "doc_status", "feedbackStatus"]),
        );
        let raw = RawRecord::default()
            .with("companyDocNo", " ")
            .with("contractorDocNo", "C-9")
            .with("feedbackStatus", "Feedback received");
        assert_eq!(adapter.document_no(&raw), Some("C-9"));
        assert_eq!(adapter.status(&raw), Some("Feedback received"));
    }

    #[test]
    fn test_per_milestone_dates_normalize_serials() {
        let adapter = SchemaAdapter::from_columns("documents", columns(&["ifi_plan_date"]));
        let raw = RawRecord::default()
            .with("ifi_plan_date", "45306")
            .with("ifa_actual_date", "2024-02-01 00:00:00");
        let (plan, actual) = adapter.milestones(&raw);
        assert_eq!(plan.ifi.as_deref(), Some("2024-01-15"));
        assert_eq!(actual.ifa.as_deref(), Some("2024-02-01"));
    }
}
