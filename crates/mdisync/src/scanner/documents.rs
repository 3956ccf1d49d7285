use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::info_span;

use super::naming::{level_one_folder, NamingRules};
use super::{collect_candidates, Candidate, ScanReport};
use crate::classify::{ClassMapper, Classification, CodeClassifier, DisciplineMatch, FolderClassCache};
use crate::config::ProjectConfig;
use crate::db::{document_repo, Database, DocumentRow};
use crate::error::ScanError;

/// Turns discovered files into `documents` rows.
///
/// Holds the immutable lookup tables for one or more scans. The folder
/// class cache is created per scan and never outlives it.
pub struct DocumentScanner<'a> {
    config: &'a ProjectConfig,
    classifier: CodeClassifier,
    mapper: ClassMapper,
    naming: NamingRules,
}

impl<'a> DocumentScanner<'a> {
    pub fn new(config: &'a ProjectConfig) -> Result<Self, crate::error::ConfigError> {
        Ok(Self {
            config,
            classifier: CodeClassifier::new(config),
            mapper: ClassMapper::new(config),
            naming: NamingRules::new(&config.naming)?,
        })
    }

    pub fn scan(&self, db: &Database, root: &Path) -> Result<ScanReport, ScanError> {
        let _span = info_span!("scan", root = %root.display()).entered();

        let mut report = ScanReport::default();
        let candidates = collect_candidates(root, &self.config.naming, &mut report.errors)?;
        report.discovered = candidates.len();

        let existing = document_repo::load_existing_by_path(db)?;
        let mut cache = FolderClassCache::new();
        let mut transmittals: HashMap<PathBuf, String> = HashMap::new();

        let rows: Vec<DocumentRow> = candidates
            .iter()
            .map(|candidate| {
                let trans_no = transmittals
                    .entry(candidate.dir.clone())
                    .or_insert_with(|| self.naming.transmittal_for(&candidate.dir, root))
                    .clone();
                let folder = level_one_folder(&candidate.dir, root);
                self.build_row(
                    candidate,
                    trans_no,
                    folder.as_deref(),
                    existing.get(&candidate.local_path()),
                    &mut cache,
                )
            })
            .collect();

        report.upserted = document_repo::upsert_many(db, &rows)?;
        log::info!(
            "Upserted {} of {} discovered document(s) under {}",
            report.upserted,
            report.discovered,
            root.display()
        );

        if self.config.reconcile_placeholders {
            let reconciled = document_repo::reconcile_placeholders(
                db,
                &self.config.import.placeholder_prefix,
            )?;
            log::info!("Merged {} importer placeholder(s)", reconciled.merged);
            report.reconciled = Some(reconciled);
        }

        report.documents = document_repo::resequence(db)?;
        if !report.errors.is_empty() {
            log::warn!("{} file(s) skipped during scan", report.errors.len());
        }
        Ok(report)
    }

    /// Derives every classification field and carries importer and
    /// workflow fields forward from the row already stored for the path.
    fn build_row(
        &self,
        candidate: &Candidate,
        trans_no: String,
        folder: Option<&str>,
        existing: Option<&DocumentRow>,
        cache: &mut FolderClassCache,
    ) -> DocumentRow {
        let base = candidate.base_name.as_str();

        let classification = if self.naming.is_transmittal_file(base) {
            Classification::revision_only(base)
        } else {
            self.classifier.classify(base)
        };
        match classification.source {
            DisciplineMatch::UnknownCode(c) => {
                log::debug!("No discipline for code '{}' in {}", c, base)
            }
            DisciplineMatch::NoLookupChar => log::debug!("Unclassified file name {}", base),
            _ => {}
        }

        let doc_class = self.mapper.resolve(base, folder, cache);
        let company_doc_no = self
            .naming
            .business_number(base)
            .or_else(|| existing.and_then(|e| e.company_doc_no.clone()));

        DocumentRow {
            local_path: candidate.local_path(),
            stt: existing.and_then(|e| e.stt),
            name: Some(base.to_string()),
            table: Some(classification.table),
            description: Some(classification.description),
            discipline: Some(classification.discipline),
            trans_no: Some(trans_no),
            date_received: Some(candidate.date_received.clone()),
            revision: Some(classification.revision),
            doc_class: Some(doc_class),
            item: Some(self.naming.item_code(base)),
            scope: existing.and_then(|e| e.scope.clone()),
            company_doc_no,
            contractor_doc_no: existing.and_then(|e| e.contractor_doc_no.clone()),
            tracking: existing.map(|e| e.tracking.clone()).unwrap_or_default(),
            workflow: existing.map(|e| e.workflow.clone()).unwrap_or_default(),
        }
    }
}

/// Scans `root` into the store and returns the re-sequenced document set.
pub fn scan_documents(
    db: &Database,
    config: &ProjectConfig,
    root: &Path,
) -> crate::Result<ScanReport> {
    let scanner = DocumentScanner::new(config)?;
    Ok(scanner.scan(db, root)?)
}
