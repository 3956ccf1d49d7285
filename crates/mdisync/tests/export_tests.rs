//! Export against current and historical store layouts.

mod common;

use common::harness::export_time;
use common::{project_config, ConfigBuilder, SheetBuilder, TestHarness};
use mdisync::export::{export_at, write_json};
use mdisync::importer::row::{COMPANY_DOC_NO, DOCUMENT_NAME, IFA_ACTUAL, IFA_PLAN, STATUS};
use mdisync::{Database, ExportError, ExternalDocumentSet};

#[test]
fn test_rows_without_number_stay_internal() {
    let harness = TestHarness::new(project_config().build());
    harness.add_file("Area1/notes.pdf");
    harness.add_file("Area1/TF1-2A19-001_B.pdf");
    harness.scan();

    let sheet = SheetBuilder::new(&[COMPANY_DOC_NO, DOCUMENT_NAME, STATUS, IFA_PLAN, IFA_ACTUAL])
        .text_row(&["DOC-100", "Pump datasheet", "Approved", "2024-01-02", "2024-01-05"])
        .build();
    harness.import(&sheet);
    assert_eq!(harness.documents().len(), 3);

    let set = harness.export();
    let numbers: Vec<&str> = set.documents.iter().map(|d| d.document_no.as_str()).collect();
    // The placeholder has never been numbered, so it sorts last.
    assert_eq!(numbers, vec!["TF1-2A19-001_B", "DOC-100"]);
    assert_eq!(set.metadata.total_documents, 2);
    assert_eq!(set.metadata.statistics.approved, 1);
    assert_eq!(set.metadata.statistics.overdue, 0);

    let scanned = &set.documents[0];
    assert_eq!(scanned.stt, 1);

    // Numbered after the highest stored stt, never reusing one.
    let placeholder = &set.documents[1];
    assert_eq!(placeholder.id, "IMPORT_DOC-100");
    assert_eq!(placeholder.stt, 2);
    assert_eq!(placeholder.plan_dates.ifa.as_deref(), Some("2024-01-02"));
    assert_eq!(placeholder.actual_dates.ifa.as_deref(), Some("2024-01-05"));
    assert!(!placeholder.is_overdue);
}

#[test]
fn test_legacy_store_with_serialized_dates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.db");
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch(
            r#"CREATE TABLE mdi_documents (
                   id TEXT, document_no TEXT, title TEXT, revision TEXT, discipline TEXT,
                   status TEXT, table_name TEXT, date_received TEXT,
                   plan_dates TEXT, actual_dates TEXT
               );
               INSERT INTO mdi_documents VALUES
                   ('a1', 'TCPT-MEC-001', 'Valve list', 'B', 'MECH', 'Waiting Cmt', 'Piping',
                    '45306', '{"IFR": "2024-02-01", "IFF/ASB": 45366}', '{}');
               INSERT INTO mdi_documents VALUES
                   ('a2', '', 'Draft', 'A', 'MECH', 'Input Plan', 'Piping',
                    NULL, NULL, NULL);
               INSERT INTO mdi_documents VALUES
                   ('a3', 'TCPT-ELE-002', 'Cable schedule', 'A', NULL, 'Approved', 'Electrical',
                    '2024-01-20 08:00:00', 'not json', NULL);"#,
        )
        .unwrap();
    }

    let db = Database::open_unmigrated(&path).unwrap();
    let set = export_at(&db, export_time()).unwrap();
    assert_eq!(set.documents.len(), 2);

    // Ordered by document number.
    let cables = &set.documents[0];
    assert_eq!(cables.stt, 1);
    assert_eq!(cables.discipline, "N/A");
    assert_eq!(cables.date_received.as_deref(), Some("2024-01-20"));
    assert_eq!(cables.plan_dates, Default::default());
    assert!(!cables.is_critical);

    let valves = &set.documents[1];
    assert_eq!(valves.id, "a1");
    assert_eq!(valves.stt, 2);
    assert_eq!(valves.document_no, "TCPT-MEC-001");
    assert_eq!(valves.title, "Valve list");
    assert_eq!(valves.table, "Piping");
    assert_eq!(valves.status, "Waiting Cmt");
    assert_eq!(valves.date_received.as_deref(), Some("2024-01-15"));
    assert_eq!(valves.plan_dates.ifr.as_deref(), Some("2024-02-01"));
    assert_eq!(valves.plan_dates.iff.as_deref(), Some("2024-03-15"));
    assert!(valves.is_overdue);
    assert!(valves.is_critical);

    assert_eq!(set.metadata.statistics.total, 2);
    assert_eq!(set.metadata.statistics.approved, 1);
    assert_eq!(set.metadata.statistics.overdue, 1);
    assert_eq!(set.metadata.statistics.disciplines, 1);
}

#[test]
fn test_hybrid_store_prefers_newer_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hybrid.db");
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch(
            r#"CREATE TABLE documents (
                   id TEXT, localPath TEXT, stt INTEGER,
                   document_no TEXT, companyDocNo TEXT,
                   status TEXT, doc_status TEXT,
                   table_name TEXT, "table" TEXT,
                   title TEXT, name TEXT
               );
               INSERT INTO documents VALUES
                   ('r1', '/p/a.pdf', 4, 'NEW-1', 'OLD-1', 'Approved', 'Waiting Cmt',
                    'Piping', 'Legacy', 'Pump list', 'a');
               INSERT INTO documents VALUES
                   (NULL, '/p/b.pdf', NULL, 'NEW-2', 'OLD-2', NULL, 'Input Plan',
                    NULL, 'Legacy', NULL, 'b');
               INSERT INTO documents VALUES
                   (NULL, '/p/c.pdf', 1, NULL, 'OLD-3', 'Approved', NULL,
                    NULL, NULL, NULL, 'c');"#,
        )
        .unwrap();
    }

    let db = Database::open_unmigrated(&path).unwrap();
    let set = export_at(&db, export_time()).unwrap();

    // Rows are filtered on the newer number column only.
    assert_eq!(set.documents.len(), 2);

    let first = &set.documents[0];
    assert_eq!(first.id, "r1");
    assert_eq!(first.stt, 4);
    assert_eq!(first.document_no, "NEW-1");
    assert_eq!(first.status, "Approved");
    assert_eq!(first.table, "Piping");
    assert_eq!(first.title, "Pump list");

    // Empty newer values fall through to the older columns.
    let second = &set.documents[1];
    assert_eq!(second.id, "/p/b.pdf");
    assert_eq!(second.stt, 5);
    assert_eq!(second.document_no, "NEW-2");
    assert_eq!(second.status, "Input Plan");
    assert_eq!(second.table, "Legacy");
    assert_eq!(second.title, "b");
}

#[test]
fn test_store_without_document_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.db");
    rusqlite::Connection::open(&path)
        .unwrap()
        .execute_batch("CREATE TABLE settings (key TEXT, value TEXT);")
        .unwrap();

    let db = Database::open_unmigrated(&path).unwrap();
    let err = export_at(&db, export_time()).unwrap_err();
    assert!(matches!(err, ExportError::NoDocumentTable(_)));
    assert!(err.to_string().contains("settings"));
}

#[test]
fn test_published_json_shape() {
    let harness = TestHarness::new(ConfigBuilder::new().build());
    let sheet = SheetBuilder::new(&[COMPANY_DOC_NO, DOCUMENT_NAME, STATUS])
        .text_row(&["DOC-1", "Ống dẫn", "Waiting Cmt"])
        .build();
    harness.import(&sheet);

    let out = harness.scratch_dir("public").join("data").join("mdi.json");
    let set = harness.export();
    write_json(&set, &out).unwrap();

    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.contains("Ống dẫn"));

    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["metadata"]["version"], "1.0.0");
    assert_eq!(value["metadata"]["totalDocuments"], 1);
    assert_eq!(value["metadata"]["lastUpdate"], "2024-03-01 09:30:00");
    let doc = &value["documents"][0];
    assert_eq!(doc["documentNo"], "DOC-1");
    assert_eq!(doc["isCritical"], true);
    assert!(doc["planDates"]["ifi"].is_null());
    assert!(doc["sharepointPath"].is_null());

    let back: ExternalDocumentSet = serde_json::from_value(value).unwrap();
    assert_eq!(back, set);
}
