use std::collections::HashMap;

use super::sheet::{format_number, Cell, SheetRow, SheetTable};
use crate::dates;
use crate::db::TrackingFields;

pub const SCOPE: &str = "Scope";
pub const TABLE: &str = "Table";
pub const ITEM: &str = "Item";
pub const ORG: &str = "Org.";
pub const COMPANY_DOC_NO: &str = "CompanyDoc.No.";
pub const CONTRACTOR_DOC_NO: &str = "ContractorDoc.No.";
pub const DOCUMENT_NAME: &str = "DocumentName";
pub const CLASS: &str = "Class";
pub const REV: &str = "Rev";
pub const IPI: &str = "IPI";
pub const DATE_TRN_OUT: &str = "DateTRNOut";
pub const TRN_OUT_NO: &str = "TRNOutNo.";
pub const DATE_RECEIVE_TRN_OUT: &str = "DateReciveTRNOut";
pub const DATE_TRN_IN: &str = "DateTRNIn";
pub const TRN_IN_NO: &str = "TRNInNo.";
pub const CODE: &str = "Code";
pub const IFI_PLAN: &str = "IFI\nPlan Date";
pub const IFR_PLAN: &str = "IFR\nPlan Date";
pub const IFA_PLAN: &str = "IFA\nPlan Date";
pub const IFC_PLAN: &str = "IFC\nPlan Date";
pub const IFF_PLAN: &str = "IFF/ASB\nPlan Date";
pub const IFI_ACTUAL: &str = "IFI\nActual Date";
pub const IFR_ACTUAL: &str = "IFR\nActual Date";
pub const IFA_ACTUAL: &str = "IFA\nActual Date";
pub const IFC_ACTUAL: &str = "IFC\nActual Date";
pub const IFF_ACTUAL: &str = "IFF/ASB\nActual Date";
pub const TARGET_MITIGATION: &str = "Target Mitigation Date";
pub const PIC_PTSC: &str = "PIC PTSC";
pub const PIC_LSP: &str = "PIC LSP";
pub const STATUS: &str = "Status";

const ALL_HEADERS: [&str; 30] = [
    SCOPE,
    TABLE,
    ITEM,
    ORG,
    COMPANY_DOC_NO,
    CONTRACTOR_DOC_NO,
    DOCUMENT_NAME,
    CLASS,
    REV,
    IPI,
    DATE_TRN_OUT,
    TRN_OUT_NO,
    DATE_RECEIVE_TRN_OUT,
    DATE_TRN_IN,
    TRN_IN_NO,
    CODE,
    IFI_PLAN,
    IFR_PLAN,
    IFA_PLAN,
    IFC_PLAN,
    IFF_PLAN,
    IFI_ACTUAL,
    IFR_ACTUAL,
    IFA_ACTUAL,
    IFC_ACTUAL,
    IFF_ACTUAL,
    TARGET_MITIGATION,
    PIC_PTSC,
    PIC_LSP,
    STATUS,
];

/// One report row, typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MdiRow {
    pub company_doc_no: Option<String>,
    pub table: Option<String>,
    pub item: Option<String>,
    pub org: Option<String>,
    pub document_name: Option<String>,
    pub doc_class: Option<String>,
    pub revision: Option<String>,
    pub scope: Option<String>,
    pub contractor_doc_no: Option<String>,
    pub tracking: TrackingFields,
}

/// Header positions, resolved once per sheet.
#[derive(Debug, Clone)]
pub struct ColumnIndex {
    positions: HashMap<&'static str, usize>,
}

impl ColumnIndex {
    pub fn resolve(table: &SheetTable) -> Self {
        let positions = ALL_HEADERS
            .iter()
            .filter_map(|h| table.column(h).map(|i| (*h, i)))
            .collect();
        Self { positions }
    }

    pub fn has(&self, header: &str) -> bool {
        self.positions.contains_key(header)
    }

    fn cell<'r>(&self, row: &'r SheetRow, header: &str) -> Option<&'r Cell> {
        self.positions
            .get(header)
            .and_then(|&i| row.cells.get(i))
    }

    /// Trimmed text; blank and `nan` are absent.
    fn text(&self, row: &SheetRow, header: &str) -> Result<Option<String>, String> {
        let value = match self.cell(row, header) {
            None | Some(Cell::Empty) => None,
            Some(Cell::Text(s)) => Some(s.trim().to_string()),
            Some(Cell::Number(n)) => Some(format_number(*n)),
            Some(Cell::Bool(b)) => Some(b.to_string()),
            Some(Cell::Date(dt)) => Some(dates::format_date(dt.date())),
            Some(Cell::Error(e)) => return Err(format!("column '{}' holds {}", label(header), e)),
        };
        Ok(value.filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("nan")))
    }

    /// Calendar date from a native date, a serial or free text.
    /// Unparseable values are absent.
    fn date(&self, row: &SheetRow, header: &str) -> Result<Option<String>, String> {
        Ok(match self.cell(row, header) {
            None | Some(Cell::Empty) | Some(Cell::Bool(_)) => None,
            Some(Cell::Date(dt)) => Some(dates::format_date(dt.date())),
            Some(Cell::Number(n)) => dates::serial_to_date(*n).map(dates::format_date),
            Some(Cell::Text(s)) => dates::normalize_text(s),
            Some(Cell::Error(e)) => return Err(format!("column '{}' holds {}", label(header), e)),
        })
    }

    /// Extracts every known column of `row`.
    pub fn extract(&self, row: &SheetRow) -> Result<MdiRow, String> {
        Ok(MdiRow {
            company_doc_no: self.text(row, COMPANY_DOC_NO)?,
            table: self.text(row, TABLE)?,
            item: self.text(row, ITEM)?,
            org: self.text(row, ORG)?,
            document_name: self.text(row, DOCUMENT_NAME)?,
            doc_class: self.text(row, CLASS)?,
            revision: self.text(row, REV)?,
            scope: self.text(row, SCOPE)?,
            contractor_doc_no: self.text(row, CONTRACTOR_DOC_NO)?,
            tracking: TrackingFields {
                ipi_status: self.text(row, IPI)?,
                review_code: self.text(row, CODE)?,
                trn_out_date: self.date(row, DATE_TRN_OUT)?,
                trn_out_no: self.text(row, TRN_OUT_NO)?,
                date_receive_trn_out: self.date(row, DATE_RECEIVE_TRN_OUT)?,
                trn_in_date: self.date(row, DATE_TRN_IN)?,
                trn_in_no: self.text(row, TRN_IN_NO)?,
                ifi_plan_date: self.date(row, IFI_PLAN)?,
                ifr_plan_date: self.date(row, IFR_PLAN)?,
                ifa_plan_date: self.date(row, IFA_PLAN)?,
                ifc_plan_date: self.date(row, IFC_PLAN)?,
                iff_plan_date: self.date(row, IFF_PLAN)?,
                ifi_actual_date: self.date(row, IFI_ACTUAL)?,
                ifr_actual_date: self.date(row, IFR_ACTUAL)?,
                ifa_actual_date: self.date(row, IFA_ACTUAL)?,
                ifc_actual_date: self.date(row, IFC_ACTUAL)?,
                iff_actual_date: self.date(row, IFF_ACTUAL)?,
                target_mitigation_date: self.date(row, TARGET_MITIGATION)?,
                pic_ptsc: self.text(row, PIC_PTSC)?,
                pic_lsp: self.text(row, PIC_LSP)?,
                doc_status: self.text(row, STATUS)?,
            },
        })
    }
}

fn label(header: &str) -> String {
    header.replace('\n', " ")
}
