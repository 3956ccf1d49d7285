pub mod classify;
pub mod config;
pub mod dates;
pub mod db;
pub mod error;
pub mod export;
pub mod importer;
pub mod logging;
pub mod scanner;
pub mod workflow;

/// Marker for a value that could not be derived.
pub const NOT_AVAILABLE: &str = "N/A";

pub use classify::{Classification, ClassMapper, CodeClassifier, DisciplineMatch, FolderClassCache};
pub use config::{load_config, load_config_from_str, ImportConfig, NamingConfig, ProjectConfig};
pub use db::{Database, DatabaseError, DocumentRow, GenericFileRow, TrackingFields, WorkflowFields};
pub use error::{
    ConfigError, ExportError, ImportError, ItemError, MdiSyncError, Result, ScanError,
    WorkflowError,
};
pub use export::{
    export, export_documents_xlsx, export_generic_xlsx, write_json, ExternalDocument,
    ExternalDocumentSet, SpreadsheetReport,
};
pub use importer::{import_workbook, ImportSummary};
pub use logging::{init_logging, LogFormat};
pub use scanner::{scan_documents, scan_generic_files, GenericScanReport, ScanReport};
pub use workflow::{collect_feedback, publish_to_sharepoint, WorkflowReport};
