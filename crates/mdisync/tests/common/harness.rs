//! Test harness for isolated scan / import / export runs.

#![allow(dead_code)]

use std::path::PathBuf;

use assert_fs::prelude::*;
use assert_fs::TempDir;
use chrono::{DateTime, Local, TimeZone};

use mdisync::db::document_repo;
use mdisync::export::export_at;
use mdisync::importer::{import_table, SheetTable};
use mdisync::{
    scan_documents, Database, DocumentRow, ExternalDocumentSet, ImportSummary, ProjectConfig,
    ScanReport,
};

/// A temp project folder plus an in-memory document store.
pub struct TestHarness {
    temp_dir: TempDir,
    /// Root handed to the scanner.
    pub project_dir: PathBuf,
    pub db: Database,
    pub config: ProjectConfig,
}

impl TestHarness {
    pub fn new(config: ProjectConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let project = temp_dir.child("project");
        project.create_dir_all().expect("Failed to create project dir");
        let project_dir = project.path().to_path_buf();

        Self {
            temp_dir,
            project_dir,
            db: Database::open_in_memory().expect("Failed to open store"),
            config,
        }
    }

    /// Creates a file (and its folders) below the project root.
    pub fn add_file(&self, relative: &str) -> PathBuf {
        let path = self.project_dir.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create folders");
        }
        std::fs::write(&path, b"content").expect("Failed to write file");
        path
    }

    /// A folder inside the temp dir, outside the project tree.
    pub fn scratch_dir(&self, name: &str) -> PathBuf {
        let dir = self.temp_dir.child(name);
        dir.create_dir_all().expect("Failed to create dir");
        dir.path().to_path_buf()
    }

    pub fn local_path(&self, relative: &str) -> String {
        self.project_dir.join(relative).to_string_lossy().into_owned()
    }

    pub fn scan(&self) -> ScanReport {
        scan_documents(&self.db, &self.config, &self.project_dir).expect("Scan failed")
    }

    pub fn import(&self, table: &SheetTable) -> ImportSummary {
        import_table(&self.db, &self.config.import, table).expect("Import failed")
    }

    /// Export as of 2024-03-01 09:30 local time.
    pub fn export(&self) -> ExternalDocumentSet {
        export_at(&self.db, export_time()).expect("Export failed")
    }

    pub fn document(&self, local_path: &str) -> Option<DocumentRow> {
        document_repo::find_by_path(&self.db, local_path).expect("Lookup failed")
    }

    pub fn documents(&self) -> Vec<DocumentRow> {
        document_repo::list_ordered(&self.db).expect("Listing failed")
    }
}

pub fn export_time() -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2024, 3, 1, 9, 30, 0)
        .single()
        .expect("Unambiguous local time")
}
