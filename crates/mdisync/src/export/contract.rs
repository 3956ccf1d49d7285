//! The versioned JSON document consumed by the viewer.

use serde::{Deserialize, Serialize};

/// Version of the external contract.
pub const CONTRACT_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalDocumentSet {
    pub metadata: ExportMetadata,
    pub documents: Vec<ExternalDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    /// ISO-8601 timestamp with offset.
    pub export_date: String,
    pub total_documents: usize,
    /// `YYYY-MM-DD HH:MM:SS`, local time.
    pub last_update: String,
    pub version: String,
    pub statistics: ExportStatistics,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportStatistics {
    pub total: usize,
    pub approved: usize,
    pub overdue: usize,
    pub disciplines: usize,
}

/// One date per milestone; `None` serializes as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneDates {
    pub ifi: Option<String>,
    pub ifr: Option<String>,
    pub ifa: Option<String>,
    pub ifc: Option<String>,
    pub iff: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalDocument {
    pub id: String,
    pub stt: i64,
    pub document_no: String,
    pub title: String,
    pub revision: String,
    pub discipline: String,
    pub scope: String,
    pub doc_class: String,
    pub table: String,
    pub item: String,
    pub status: String,
    pub ipi_status: String,
    pub review_code: String,
    pub plan_dates: MilestoneDates,
    pub actual_dates: MilestoneDates,
    pub target_mitigation_date: Option<String>,
    pub trans_no: Option<String>,
    pub date_received: Option<String>,
    pub trn_out_date: Option<String>,
    pub trn_out_no: Option<String>,
    pub trn_in_date: Option<String>,
    pub trn_in_no: Option<String>,
    pub pic_ptsc: Option<String>,
    pub pic_lsp: Option<String>,
    pub local_path: Option<String>,
    pub sharepoint_path: Option<String>,
    pub is_overdue: bool,
    pub is_critical: bool,
}
