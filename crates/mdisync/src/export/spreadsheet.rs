//! Spreadsheet export of the document register and the generic file list.
//!
//! One sheet, one header row with the project's column labels, one row per
//! stored row in `stt` order. The last column links each row to its file,
//! relative to the workbook's folder.

use std::path::{Component, Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook, Worksheet};
use serde::Serialize;
use tracing::info_span;

use crate::db::{document_repo, generic_file_repo, Database, DocumentRow, GenericFileRow};
use crate::error::ExportError;

pub const SHEET_NAME: &str = "Sheet1";

/// Text shown in every link cell.
pub const LINK_TEXT: &str = "Mở File";

pub const DOCUMENT_HEADERS: [&str; 37] = [
    "STT",
    "Scope",
    "Table",
    "Item",
    "Bộ môn",
    "Company Doc No",
    "Contractor Doc No",
    "Tên tài liệu",
    "Class",
    "Phiên bản",
    "IPI Status",
    "Trans No",
    "Ngày nhận",
    "TRN Out Date",
    "TRN Out No",
    "Date Receive TRN Out",
    "TRN In Date",
    "TRN In No",
    "Review Code",
    "IFI Plan",
    "IFR Plan",
    "IFA Plan",
    "IFC Plan",
    "IFF Plan",
    "IFI Actual",
    "IFR Actual",
    "IFA Actual",
    "IFC Actual",
    "IFF Actual",
    "Target Date",
    "PIC PTSC",
    "PIC LSP",
    "Status",
    "Description",
    "Đường dẫn (SharePoint)",
    "Trạng thái Phản hồi",
    "Đường dẫn Local",
];

pub const GENERIC_HEADERS: [&str; 6] = [
    "STT",
    "Tên tài liệu",
    "Định dạng",
    "Ngày nhận",
    "Phiên bản",
    "Đường dẫn Local",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetReport {
    pub path: PathBuf,
    pub rows: usize,
    /// Rows written with a file link.
    pub links: usize,
}

/// Text columns between `STT` and the link column.
fn document_cells(doc: &DocumentRow) -> [Option<&str>; 35] {
    let t = &doc.tracking;
    [
        doc.scope.as_deref(),
        doc.table.as_deref(),
        doc.item.as_deref(),
        doc.discipline.as_deref(),
        doc.company_doc_no.as_deref(),
        doc.contractor_doc_no.as_deref(),
        doc.name.as_deref(),
        doc.doc_class.as_deref(),
        doc.revision.as_deref(),
        t.ipi_status.as_deref(),
        doc.trans_no.as_deref(),
        doc.date_received.as_deref(),
        t.trn_out_date.as_deref(),
        t.trn_out_no.as_deref(),
        t.date_receive_trn_out.as_deref(),
        t.trn_in_date.as_deref(),
        t.trn_in_no.as_deref(),
        t.review_code.as_deref(),
        t.ifi_plan_date.as_deref(),
        t.ifr_plan_date.as_deref(),
        t.ifa_plan_date.as_deref(),
        t.ifc_plan_date.as_deref(),
        t.iff_plan_date.as_deref(),
        t.ifi_actual_date.as_deref(),
        t.ifr_actual_date.as_deref(),
        t.ifa_actual_date.as_deref(),
        t.ifc_actual_date.as_deref(),
        t.iff_actual_date.as_deref(),
        t.target_mitigation_date.as_deref(),
        t.pic_ptsc.as_deref(),
        t.pic_lsp.as_deref(),
        t.doc_status.as_deref(),
        doc.description.as_deref(),
        doc.workflow.sharepoint_path.as_deref(),
        doc.workflow.feedback_status.as_deref(),
    ]
}

fn generic_cells(file: &GenericFileRow) -> [Option<&str>; 4] {
    [
        file.name.as_deref(),
        file.format.as_deref(),
        file.date_received.as_deref(),
        file.revision.as_deref(),
    ]
}

/// Writes the document register to `output`. An empty register is an
/// error and writes nothing.
pub fn export_documents_xlsx(db: &Database, output: &Path) -> Result<SpreadsheetReport, ExportError> {
    let _span = info_span!("export_xlsx", path = %output.display()).entered();
    let documents = document_repo::list_ordered(db)?;
    let rows: Vec<SheetLine<'_>> = documents
        .iter()
        .map(|doc| SheetLine {
            stt: doc.stt,
            cells: document_cells(doc).to_vec(),
            local_path: &doc.local_path,
        })
        .collect();
    write_workbook(output, &DOCUMENT_HEADERS, &rows)
}

/// Writes the generic file list to `output`.
pub fn export_generic_xlsx(db: &Database, output: &Path) -> Result<SpreadsheetReport, ExportError> {
    let _span = info_span!("export_generic_xlsx", path = %output.display()).entered();
    let files = generic_file_repo::list_ordered(db)?;
    let rows: Vec<SheetLine<'_>> = files
        .iter()
        .map(|file| SheetLine {
            stt: file.stt,
            cells: generic_cells(file).to_vec(),
            local_path: &file.local_path,
        })
        .collect();
    write_workbook(output, &GENERIC_HEADERS, &rows)
}

struct SheetLine<'a> {
    stt: Option<i64>,
    cells: Vec<Option<&'a str>>,
    local_path: &'a str,
}

fn write_workbook(
    output: &Path,
    headers: &[&str],
    lines: &[SheetLine<'_>],
) -> Result<SpreadsheetReport, ExportError> {
    if lines.is_empty() {
        return Err(ExportError::NothingToExport);
    }

    let base = workbook_folder(output)?;
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    let bold = Format::new().set_bold();
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &bold)?;
    }

    let link_col = (headers.len() - 1) as u16;
    let mut links = 0;
    for (i, line) in lines.iter().enumerate() {
        let row = i as u32 + 1;
        if let Some(stt) = line.stt {
            sheet.write_number(row, 0, stt as f64)?;
        }
        for (j, value) in line.cells.iter().enumerate() {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                sheet.write_string(row, j as u16 + 1, value)?;
            }
        }
        if write_link(sheet, row, link_col, line.local_path, &base)? {
            links += 1;
        }
    }
    sheet.autofit();

    workbook.save(output)?;
    log::info!(
        "Wrote {} row(s) to {} ({} linked)",
        lines.len(),
        output.display(),
        links
    );
    Ok(SpreadsheetReport {
        path: output.to_path_buf(),
        rows: lines.len(),
        links,
    })
}

/// Placeholder rows have no file and get no link.
fn write_link(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    local_path: &str,
    base: &Path,
) -> Result<bool, ExportError> {
    let target = Path::new(local_path);
    if !target.is_absolute() {
        return Ok(false);
    }
    let url = match relative_link(target, base) {
        Some(relative) => format!("file:///{}", relative),
        None => format!("file:///{}", slashed(target).trim_start_matches('/')),
    };
    sheet.write_url_with_text(row, col, url.as_str(), LINK_TEXT)?;
    Ok(true)
}

/// Absolute folder the workbook is written to, created if missing.
fn workbook_folder(output: &Path) -> Result<PathBuf, ExportError> {
    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let write_err = |e| ExportError::WriteFile {
        path: output.to_path_buf(),
        source: e,
    };
    std::fs::create_dir_all(&parent).map_err(write_err)?;
    if parent.is_absolute() {
        Ok(parent)
    } else {
        Ok(std::env::current_dir().map_err(write_err)?.join(parent))
    }
}

/// `target` relative to `base` with `/` separators. `None` when the two
/// share no root (e.g. different drives).
pub fn relative_link(target: &Path, base: &Path) -> Option<String> {
    let target: Vec<Component<'_>> = target.components().filter(|c| *c != Component::CurDir).collect();
    let base: Vec<Component<'_>> = base.components().filter(|c| *c != Component::CurDir).collect();

    let common = target
        .iter()
        .zip(&base)
        .take_while(|(a, b)| a == b)
        .count();
    if common == 0 {
        return None;
    }

    let mut parts: Vec<String> = vec!["..".to_string(); base.len() - common];
    parts.extend(
        target[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    Some(parts.join("/"))
}

fn slashed(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
