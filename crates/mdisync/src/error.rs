use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MdiSyncError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("Invalid pattern '{name}': {reason}")]
    InvalidPattern { name: String, reason: String },

    #[error("Invalid discipline entry '{code}': {reason}")]
    InvalidDiscipline { code: String, reason: String },
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Scan root '{0}' does not exist or is not a directory")]
    RootNotFound(PathBuf),

    #[error("Directory walk failed under '{path}': {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error(transparent)]
    Database(#[from] crate::db::DatabaseError),
}

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Failed to open workbook '{path}': {reason}")]
    OpenWorkbook { path: PathBuf, reason: String },

    #[error("Sheet '{0}' not found in workbook")]
    SheetNotFound(String),

    #[error("Sheet '{sheet}' has no header row after skipping {skip_rows} rows")]
    MissingHeader { sheet: String, skip_rows: usize },

    #[error(transparent)]
    Database(#[from] crate::db::DatabaseError),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("No documents table found (available tables: {0})")]
    NoDocumentTable(String),

    #[error("Failed to write export '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize export: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Nothing to export")]
    NothingToExport,

    #[error("Failed to write workbook: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    #[error(transparent)]
    Database(#[from] crate::db::DatabaseError),
}

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Folder '{0}' does not exist")]
    FolderNotFound(PathBuf),

    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read directory '{path}': {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy '{from}' to '{to}': {source}")]
    CopyFile {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move '{from}' to '{to}': {source}")]
    MoveFile {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Database(#[from] crate::db::DatabaseError),
}

/// A per-item failure collected into an operation report instead of
/// aborting the run. `location` is a file path or a sheet row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemError {
    pub location: String,
    pub message: String,
}

impl ItemError {
    pub fn new(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MdiSyncError>;
