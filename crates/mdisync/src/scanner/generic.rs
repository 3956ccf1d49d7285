use std::path::Path;

use tracing::info_span;

use super::{collect_candidates, GenericScanReport};
use crate::classify::parse_revision;
use crate::config::ProjectConfig;
use crate::db::{generic_file_repo, Database, GenericFileRow};

/// Scans supporting files into `generic_files`. No classification, no
/// business-number identity.
pub fn scan_generic_files(
    db: &Database,
    config: &ProjectConfig,
    root: &Path,
) -> crate::Result<GenericScanReport> {
    let _span = info_span!("scan_generic", root = %root.display()).entered();

    let mut report = GenericScanReport::default();
    let candidates = collect_candidates(root, &config.naming, &mut report.errors)?;
    report.discovered = candidates.len();

    let rows: Vec<GenericFileRow> = candidates
        .iter()
        .map(|c| GenericFileRow {
            local_path: c.local_path(),
            stt: None,
            name: Some(c.base_name.clone()),
            format: Some(c.extension.clone()),
            date_received: Some(c.date_received.clone()),
            revision: Some(parse_revision(&c.base_name)),
        })
        .collect();

    report.upserted = generic_file_repo::upsert_many(db, &rows)?;
    report.files = generic_file_repo::resequence(db)?;
    log::info!(
        "Upserted {} generic file(s) under {}",
        report.upserted,
        root.display()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_scan_generic_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("misc")).unwrap();
        fs::write(dir.path().join("misc/Spec_C.DOCX"), b"x").unwrap();
        fs::write(dir.path().join("misc/Appendix.pdf"), b"x").unwrap();
        fs::write(dir.path().join("misc/readme.md"), b"x").unwrap();

        let db = Database::open_in_memory().unwrap();
        let report = scan_generic_files(&db, &ProjectConfig::default(), dir.path()).unwrap();

        assert_eq!(report.discovered, 2);
        assert_eq!(report.files.len(), 2);
        assert_eq!(report.files[0].name.as_deref(), Some("Appendix"));
        assert_eq!(report.files[0].revision.as_deref(), Some("N/A"));
        assert_eq!(report.files[1].format.as_deref(), Some("docx"));
        assert_eq!(report.files[1].revision.as_deref(), Some("C"));
        assert_eq!(report.files[1].stt, Some(2));
    }
}
