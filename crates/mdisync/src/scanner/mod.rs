//! Directory Scanner.
//!
//! Walks a project folder and records every deliverable file in the
//! Document Store, keyed by local path. Per-file failures are collected
//! into the report; only a missing root or a store failure aborts.

mod documents;
mod generic;
pub mod naming;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;
use walkdir::WalkDir;

use crate::config::NamingConfig;
use crate::db::document_repo::ReconcileReport;
use crate::db::{DocumentRow, GenericFileRow};
use crate::error::{ItemError, ScanError};

pub use documents::{scan_documents, DocumentScanner};
pub use generic::scan_generic_files;
pub use naming::NamingRules;

/// Timestamp format of `dateReceived`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    /// Full document set after re-sequencing.
    pub documents: Vec<DocumentRow>,
    /// Files passing the extension filter.
    pub discovered: usize,
    pub upserted: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconciled: Option<ReconcileReport>,
    pub errors: Vec<ItemError>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericScanReport {
    pub files: Vec<GenericFileRow>,
    pub discovered: usize,
    pub upserted: usize,
    pub errors: Vec<ItemError>,
}

/// A file that passed the extension filter and whose metadata was readable.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub path: PathBuf,
    pub dir: PathBuf,
    pub base_name: String,
    /// Lowercased, without the dot.
    pub extension: String,
    pub date_received: String,
}

impl Candidate {
    pub fn local_path(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

fn ensure_root(root: &Path) -> Result<(), ScanError> {
    if !root.is_dir() {
        return Err(ScanError::RootNotFound(root.to_path_buf()));
    }
    Ok(())
}

/// Collects candidate files under `root` in a stable (name-sorted) order.
///
/// Unreadable subtrees and files are reported in `errors` and skipped.
/// Only a failure on `root` itself is returned as an error.
pub(crate) fn collect_candidates(
    root: &Path,
    naming: &NamingConfig,
    errors: &mut Vec<ItemError>,
) -> Result<Vec<Candidate>, ScanError> {
    ensure_root(root)?;

    let mut candidates = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(ScanError::Walk {
                    path: root.to_path_buf(),
                    source: e,
                });
            }
            Err(e) => {
                let location = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| root.display().to_string());
                log::warn!("Skipping unreadable entry {}: {}", location, e);
                errors.push(ItemError::new(location, e.to_string()));
                continue;
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if !naming.is_allowed_extension(extension) {
            continue;
        }
        let Some(base_name) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };

        let date_received = match creation_timestamp(path) {
            Ok(ts) => ts,
            Err(e) => {
                log::warn!("Skipping {}: {}", path.display(), e);
                errors.push(ItemError::new(path.display().to_string(), e.to_string()));
                continue;
            }
        };

        candidates.push(Candidate {
            path: path.to_path_buf(),
            dir: path.parent().unwrap_or(root).to_path_buf(),
            base_name,
            extension: extension.to_lowercase(),
            date_received,
        });
    }

    Ok(candidates)
}

/// Creation time in local time, or the modification time where the
/// platform has no birth time.
fn creation_timestamp(path: &Path) -> std::io::Result<String> {
    let meta = std::fs::metadata(path)?;
    let time = meta.created().or_else(|_| meta.modified())?;
    let local: DateTime<Local> = time.into();
    Ok(local.format(TIMESTAMP_FORMAT).to_string())
}
