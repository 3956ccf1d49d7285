//! Schema-Adaptive Exporter.
//!
//! Publishes the store as the viewer's JSON contract. Only rows carrying a
//! business document number are exported; rows known only from the
//! filesystem stay internal.

pub mod contract;
pub mod schema;
pub mod spreadsheet;

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Local, NaiveDate, SecondsFormat};
use tracing::info_span;

use crate::db::Database;
use crate::error::ExportError;
use crate::NOT_AVAILABLE;

pub use contract::{
    ExportMetadata, ExportStatistics, ExternalDocument, ExternalDocumentSet, MilestoneDates,
    CONTRACT_VERSION,
};
pub use schema::{DateLayout, RawRecord, SchemaAdapter};
pub use spreadsheet::{export_documents_xlsx, export_generic_xlsx, SpreadsheetReport};

/// Status counted as approved in the statistics.
const APPROVED: &str = "Approved";

/// Exports the store as of now.
pub fn export(db: &Database) -> Result<ExternalDocumentSet, ExportError> {
    export_at(db, Local::now())
}

/// Exports the store with `now` as the export time. Overdue flags are
/// computed against `now`'s date.
pub fn export_at(db: &Database, now: DateTime<Local>) -> Result<ExternalDocumentSet, ExportError> {
    let _span = info_span!("export").entered();

    let (adapter, records) = db
        .with_conn(|conn| {
            let adapter = match SchemaAdapter::detect(conn) {
                Ok(adapter) => adapter,
                Err(ExportError::Database(e)) => return Err(e),
                Err(other) => return Ok(Err(other)),
            };
            let Some(sql) = adapter.select_sql()? else {
                return Ok(Ok((adapter, Vec::new())));
            };

            let mut stmt = conn.prepare(&sql)?;
            let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
            let records = stmt
                .query_map([], |row| RawRecord::from_row(row, &columns))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Ok((adapter, records)))
        })??;

    log::info!(
        "Exporting {} document(s) from table '{}' ({:?} dates)",
        records.len(),
        adapter.table,
        adapter.date_layout
    );
    if adapter.doc_no.is_none() {
        log::warn!("Table '{}' has no document number column", adapter.table);
    }

    let today = now.date_naive();
    let stts = assign_stt(&records);
    let documents: Vec<ExternalDocument> = records
        .iter()
        .zip(stts)
        .enumerate()
        .map(|(i, (raw, stt))| to_external(&adapter, raw, i + 1, stt, today))
        .collect();

    let statistics = statistics(&documents, &records);
    Ok(ExternalDocumentSet {
        metadata: ExportMetadata {
            export_date: now.to_rfc3339_opts(SecondsFormat::Secs, false),
            total_documents: documents.len(),
            last_update: now.format("%Y-%m-%d %H:%M:%S").to_string(),
            version: CONTRACT_VERSION.to_string(),
            statistics,
        },
        documents,
    })
}

/// Stored `stt` per record; records without one are numbered after the
/// highest stored value, in export order.
fn assign_stt(records: &[RawRecord]) -> Vec<i64> {
    let mut next = records.iter().filter_map(RawRecord::stt).max().unwrap_or(0);
    records
        .iter()
        .map(|raw| {
            raw.stt().unwrap_or_else(|| {
                next += 1;
                next
            })
        })
        .collect()
}

/// Maps one stored record to the contract shape. `position` is the
/// 1-based export position, used for the synthetic id.
pub fn to_external(
    adapter: &SchemaAdapter,
    raw: &RawRecord,
    position: usize,
    stt: i64,
    today: NaiveDate,
) -> ExternalDocument {
    let text = |column: &str| raw.get(column).unwrap_or_default().to_string();
    let opt = |column: &str| raw.get(column).map(str::to_string);
    let date = |column: &str| crate::dates::normalize_opt(raw.get(column));

    let (plan_dates, actual_dates) = adapter.milestones(raw);
    let status = adapter.status(raw).unwrap_or_default().to_string();
    let is_overdue = is_overdue(&plan_dates, &actual_dates, today);
    let is_critical = is_overdue || status.to_lowercase().contains("waiting");

    let local_path = opt("localPath");
    let id = opt("id")
        .or_else(|| local_path.clone())
        .unwrap_or_else(|| format!("doc-{}", position));

    ExternalDocument {
        id,
        stt,
        document_no: adapter.document_no(raw).unwrap_or_default().to_string(),
        title: adapter.title(raw).unwrap_or_default().to_string(),
        revision: text("revision"),
        discipline: raw
            .get("discipline")
            .unwrap_or(NOT_AVAILABLE)
            .to_string(),
        scope: text("scope"),
        doc_class: text("doc_class"),
        table: adapter.table_value(raw).unwrap_or_default().to_string(),
        item: text("item"),
        status,
        ipi_status: text("ipi_status"),
        review_code: text("review_code"),
        plan_dates,
        actual_dates,
        target_mitigation_date: date("target_mitigation_date"),
        trans_no: opt("transNo"),
        date_received: adapter.date_received(raw),
        trn_out_date: date("trn_out_date"),
        trn_out_no: opt("trn_out_no"),
        trn_in_date: date("trn_in_date"),
        trn_in_no: opt("trn_in_no"),
        pic_ptsc: opt("pic_ptsc"),
        pic_lsp: opt("pic_lsp"),
        local_path,
        sharepoint_path: opt("sharepointPath"),
        is_overdue,
        is_critical,
    }
}

/// A first-issue milestone (IFI, IFR, IFA) is planned before `today` and
/// has no actual date.
pub fn is_overdue(plan: &MilestoneDates, actual: &MilestoneDates, today: NaiveDate) -> bool {
    [
        (&plan.ifi, &actual.ifi),
        (&plan.ifr, &actual.ifr),
        (&plan.ifa, &actual.ifa),
    ]
    .into_iter()
    .any(|(planned, done)| {
        done.is_none()
            && planned
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d, crate::dates::DATE_FORMAT).ok())
                .is_some_and(|d| d < today)
    })
}

fn statistics(documents: &[ExternalDocument], records: &[RawRecord]) -> ExportStatistics {
    let disciplines: HashSet<&str> = records
        .iter()
        .filter_map(|r| r.get("discipline"))
        .collect();

    ExportStatistics {
        total: documents.len(),
        approved: documents.iter().filter(|d| d.status == APPROVED).count(),
        overdue: documents.iter().filter(|d| d.is_overdue).count(),
        disciplines: disciplines.len(),
    }
}

/// Writes the set as pretty-printed UTF-8 JSON, creating parent folders.
pub fn write_json(set: &ExternalDocumentSet, path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| ExportError::WriteFile {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }

    let json = serde_json::to_string_pretty(set)?;
    std::fs::write(path, json).map_err(|e| ExportError::WriteFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    log::info!(
        "Wrote {} document(s) to {}",
        set.metadata.total_documents,
        path.display()
    );
    Ok(())
}
