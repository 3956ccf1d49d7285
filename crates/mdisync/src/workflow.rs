//! Manual workflow steps.
//!
//! These are the only writers of `sharepointPath` and `feedbackStatus`;
//! scans and imports carry both fields forward untouched.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info_span;

use crate::db::{document_repo, Database, DocumentRow};
use crate::error::{ItemError, WorkflowError};
use crate::NOT_AVAILABLE;

/// Recorded in `sharepointPath` when the copy fails.
pub const UPLOAD_FAILED: &str = "Upload failed";

/// Recorded in `feedbackStatus` once a feedback file is filed.
pub const FEEDBACK_RECEIVED: &str = "Feedback received";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowReport {
    /// Items the step acted on.
    pub processed: usize,
    /// Documents whose workflow field was written successfully.
    pub updated: usize,
    pub errors: Vec<ItemError>,
}

/// Move a file from `src` to `dst`. Tries `rename` first and falls back to
/// copy + delete for cross-device moves.
fn move_file(src: &Path, dst: &Path) -> Result<(), WorkflowError> {
    if std::fs::rename(src, dst).is_ok() {
        return Ok(());
    }

    let err = |e| WorkflowError::MoveFile {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source: e,
    };
    std::fs::copy(src, dst).map_err(err)?;
    std::fs::remove_file(src).map_err(err)?;
    Ok(())
}

fn ensure_folder(path: &Path) -> Result<(), WorkflowError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(WorkflowError::FolderNotFound(path.to_path_buf()))
    }
}

fn discipline_folder(root: &Path, doc: &DocumentRow) -> Option<PathBuf> {
    doc.discipline
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty() && *d != NOT_AVAILABLE)
        .map(|d| root.join(d))
}

fn create_folder(path: &Path) -> Result<(), WorkflowError> {
    std::fs::create_dir_all(path).map_err(|e| WorkflowError::CreateDirectory {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Copies every document with a known discipline and an existing local
/// file to `sp_root/<discipline>/<file name>`.
pub fn publish_to_sharepoint(db: &Database, sp_root: &Path) -> Result<WorkflowReport, WorkflowError> {
    let _span = info_span!("publish", root = %sp_root.display()).entered();
    ensure_folder(sp_root)?;

    let mut report = WorkflowReport::default();
    for doc in document_repo::list_ordered(db)? {
        let source = Path::new(&doc.local_path);
        let Some(folder) = discipline_folder(sp_root, &doc) else {
            continue;
        };
        let Some(file_name) = source.file_name().filter(|_| source.is_file()) else {
            continue;
        };
        report.processed += 1;

        let dest = folder.join(file_name);
        let copied = create_folder(&folder).and_then(|_| {
            std::fs::copy(source, &dest)
                .map(|_| ())
                .map_err(|e| WorkflowError::CopyFile {
                    from: source.to_path_buf(),
                    to: dest.clone(),
                    source: e,
                })
        });

        match copied {
            Ok(()) => {
                document_repo::set_sharepoint_path(
                    db,
                    &doc.local_path,
                    &dest.to_string_lossy(),
                )?;
                report.updated += 1;
            }
            Err(e) => {
                log::warn!("{}", e);
                document_repo::set_sharepoint_path(db, &doc.local_path, UPLOAD_FAILED)?;
                report.errors.push(ItemError::new(doc.local_path.clone(), e.to_string()));
            }
        }
    }

    log::info!(
        "Published {}/{} document(s) to {}",
        report.updated,
        report.processed,
        sp_root.display()
    );
    Ok(report)
}

/// Files each feedback document under `subcon_dir/<discipline>/` and marks
/// the matching document as having received feedback.
///
/// A feedback file matches the first document (in `stt` order) whose name
/// contains the file stem, or is contained in it.
pub fn collect_feedback(
    db: &Database,
    feedback_dir: &Path,
    subcon_dir: &Path,
) -> Result<WorkflowReport, WorkflowError> {
    let _span = info_span!("feedback", dir = %feedback_dir.display()).entered();
    ensure_folder(feedback_dir)?;
    ensure_folder(subcon_dir)?;

    let read_err = |e| WorkflowError::ReadDirectory {
        path: feedback_dir.to_path_buf(),
        source: e,
    };
    let mut files: Vec<PathBuf> = std::fs::read_dir(feedback_dir)
        .map_err(read_err)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()
        .map_err(read_err)?;
    files.retain(|p| p.is_file());
    files.sort();

    let documents = document_repo::list_ordered(db)?;
    let mut report = WorkflowReport::default();

    for file in files {
        let (Some(stem), Some(file_name)) = (
            file.file_stem().map(|s| s.to_string_lossy().into_owned()),
            file.file_name(),
        ) else {
            continue;
        };
        report.processed += 1;

        let Some(doc) = match_document(&documents, &stem) else {
            log::debug!("No document matches feedback '{}'", stem);
            continue;
        };
        let Some(folder) = discipline_folder(subcon_dir, doc) else {
            log::debug!("Feedback '{}' matches '{}' without a discipline", stem, doc.local_path);
            continue;
        };

        let dest = folder.join(file_name);
        match create_folder(&folder).and_then(|_| move_file(&file, &dest)) {
            Ok(()) => {
                document_repo::set_feedback_status(db, &doc.local_path, FEEDBACK_RECEIVED)?;
                report.updated += 1;
                log::debug!("Filed feedback {} for {}", dest.display(), doc.local_path);
            }
            Err(e) => {
                log::warn!("{}", e);
                report
                    .errors
                    .push(ItemError::new(file.to_string_lossy(), e.to_string()));
            }
        }
    }

    log::info!(
        "Collected feedback: {} file(s), {} matched",
        report.processed,
        report.updated
    );
    Ok(report)
}

fn match_document<'d>(documents: &'d [DocumentRow], stem: &str) -> Option<&'d DocumentRow> {
    if stem.is_empty() {
        return None;
    }
    documents.iter().find(|doc| {
        doc.name
            .as_deref()
            .is_some_and(|name| !name.is_empty() && (name.contains(stem) || stem.contains(name)))
    })
}
