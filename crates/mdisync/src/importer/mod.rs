//! Spreadsheet Importer.
//!
//! Merges the MDI status report into the Document Store by company
//! document number. Matching rows get their tracking fields rewritten;
//! unknown numbers become placeholder rows keyed by a synthetic path.

pub mod row;
pub mod sheet;

use std::path::Path;

use rusqlite::Connection;
use serde::Serialize;
use tracing::info_span;

use crate::config::{ImportConfig, ProjectConfig};
use crate::db::{document_repo, Database, DatabaseError, DocumentRow};
use crate::error::{ImportError, ItemError};

pub use row::{ColumnIndex, MdiRow};
pub use sheet::{read_sheet, Cell, SheetRow, SheetTable};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    /// Non-blank data rows read from the sheet.
    pub total_rows: usize,
    pub inserted: usize,
    pub updated: usize,
    /// Rows without a company document number.
    pub skipped: usize,
    pub errors: Vec<ItemError>,
}

enum Outcome {
    Inserted,
    Updated,
}

/// Reads the workbook at `path` and merges it into the store.
pub fn import_workbook(
    db: &Database,
    config: &ProjectConfig,
    path: &Path,
) -> crate::Result<ImportSummary> {
    let _span = info_span!("import", path = %path.display()).entered();
    log::info!("Reading workbook {}", path.display());
    let table = read_sheet(path, &config.import)?;
    import_table(db, &config.import, &table)
}

/// Merges an already-read report table into the store.
///
/// Commits every `batch_size` rows, so an interruption keeps everything
/// up to the last full batch.
pub fn import_table(
    db: &Database,
    config: &ImportConfig,
    table: &SheetTable,
) -> crate::Result<ImportSummary> {
    let columns = ColumnIndex::resolve(table);
    if !columns.has(row::COMPANY_DOC_NO) {
        log::warn!(
            "Sheet has no '{}' column; every row will be skipped",
            row::COMPANY_DOC_NO
        );
    }

    let mut summary = ImportSummary {
        total_rows: table.rows.len(),
        ..Default::default()
    };
    let batch_size = config.batch_size.max(1);

    db.with_conn(|conn| {
        let mut tx = conn.unchecked_transaction()?;
        for (i, sheet_row) in table.rows.iter().enumerate() {
            let location = format!("row {}", sheet_row.number);

            match columns.extract(sheet_row) {
                Err(message) => {
                    log::warn!("{}: {}", location, message);
                    summary.errors.push(ItemError::new(location, message));
                }
                Ok(mdi) => match mdi.company_doc_no.clone() {
                    None => summary.skipped += 1,
                    Some(doc_no) => match merge_row(&tx, config, &doc_no, mdi) {
                        Ok(Outcome::Inserted) => summary.inserted += 1,
                        Ok(Outcome::Updated) => summary.updated += 1,
                        Err(e) => {
                            log::warn!("{}: {}", location, e);
                            summary.errors.push(ItemError::new(location, e.to_string()));
                        }
                    },
                },
            }

            if (i + 1) % batch_size == 0 {
                tx.commit()?;
                log::debug!("Committed {}/{} rows", i + 1, table.rows.len());
                tx = conn.unchecked_transaction()?;
            }
        }
        tx.commit()?;
        Ok(())
    })
    .map_err(ImportError::from)?;

    log::info!(
        "Import finished: {} rows, {} inserted, {} updated, {} skipped, {} errors",
        summary.total_rows,
        summary.inserted,
        summary.updated,
        summary.skipped,
        summary.errors.len()
    );
    Ok(summary)
}

/// Updates every row carrying `doc_no`, or inserts a placeholder.
fn merge_row(
    conn: &Connection,
    config: &ImportConfig,
    doc_no: &str,
    mdi: MdiRow,
) -> Result<Outcome, DatabaseError> {
    let existing = document_repo::find_paths_by_company_doc_no(conn, doc_no)?;
    if !existing.is_empty() {
        document_repo::update_tracking_by_company_doc_no(conn, doc_no, &mdi.tracking)?;
        return Ok(Outcome::Updated);
    }

    let placeholder = DocumentRow {
        local_path: config.placeholder_path(doc_no),
        name: mdi.document_name,
        table: mdi.table,
        description: Some(String::new()),
        discipline: mdi.org,
        revision: mdi.revision,
        doc_class: mdi.doc_class,
        item: mdi.item,
        scope: mdi.scope,
        company_doc_no: Some(doc_no.to_string()),
        contractor_doc_no: mdi.contractor_doc_no,
        tracking: mdi.tracking,
        ..Default::default()
    };
    document_repo::insert(conn, &placeholder)?;
    Ok(Outcome::Inserted)
}
