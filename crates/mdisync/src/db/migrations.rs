//! Database migration system.
//!
//! Tracks applied migrations in a `_migrations` table and applies
//! pending ones in order. Column additions are checked one by one so that
//! stores created by older tooling (which may already carry some of the
//! MDI columns) are upgraded in place.

use rusqlite::Connection;

use super::error::DatabaseError;
use super::table_columns;

/// A single migration definition.
struct Migration {
    version: u32,
    description: &'static str,
    kind: MigrationKind,
}

enum MigrationKind {
    /// Execute the SQL directly.
    Standard(&'static str),
    /// ALTER TABLE ADD COLUMN for each column that does not exist yet.
    AddColumns {
        table: &'static str,
        columns: &'static [(&'static str, &'static str)],
    },
}

/// Columns the MDI status report contributes to `documents`.
const MDI_TRACKING_COLUMNS: &[(&str, &str)] = &[
    ("scope", "TEXT"),
    ("item", "TEXT"),
    ("companyDocNo", "TEXT"),
    ("contractorDocNo", "TEXT"),
    ("ipi_status", "TEXT"),
    ("review_code", "TEXT"),
    ("trn_out_date", "TEXT"),
    ("trn_out_no", "TEXT"),
    ("date_receive_trn_out", "TEXT"),
    ("trn_in_date", "TEXT"),
    ("trn_in_no", "TEXT"),
    ("ifi_plan_date", "TEXT"),
    ("ifr_plan_date", "TEXT"),
    ("ifa_plan_date", "TEXT"),
    ("ifc_plan_date", "TEXT"),
    ("iff_plan_date", "TEXT"),
    ("ifi_actual_date", "TEXT"),
    ("ifr_actual_date", "TEXT"),
    ("ifa_actual_date", "TEXT"),
    ("ifc_actual_date", "TEXT"),
    ("iff_actual_date", "TEXT"),
    ("target_mitigation_date", "TEXT"),
    ("pic_ptsc", "TEXT"),
    ("pic_lsp", "TEXT"),
    ("doc_status", "TEXT"),
];

/// All migrations in order. Each is applied at most once.
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "create_documents_tables",
        kind: MigrationKind::Standard(include_str!("sql/001_create_documents.sql")),
    },
    Migration {
        version: 2,
        description: "add_mdi_tracking_columns",
        kind: MigrationKind::AddColumns {
            table: "documents",
            columns: MDI_TRACKING_COLUMNS,
        },
    },
    Migration {
        version: 3,
        description: "create_document_indexes",
        kind: MigrationKind::Standard(include_str!("sql/003_create_document_indexes.sql")),
    },
];

/// Runs all pending migrations on the given connection.
pub fn run_all(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    let current_version: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM _migrations",
        [],
        |r| r.get(0),
    )?;

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        log::info!(
            "Running migration v{}: {}",
            migration.version,
            migration.description
        );

        let fail = |e: DatabaseError| DatabaseError::Migration {
            version: migration.version,
            reason: e.to_string(),
        };

        match &migration.kind {
            MigrationKind::Standard(sql) => {
                conn.execute_batch(sql).map_err(|e| fail(e.into()))?;
            }
            MigrationKind::AddColumns { table, columns } => {
                let added = add_missing_columns(conn, table, columns).map_err(fail)?;
                log::info!(
                    "Migration v{} added {} column(s) to {}",
                    migration.version,
                    added,
                    table
                );
            }
        }

        conn.execute(
            "INSERT INTO _migrations (version, description) VALUES (?1, ?2)",
            rusqlite::params![migration.version, migration.description],
        )?;
    }

    Ok(())
}

fn add_missing_columns(
    conn: &Connection,
    table: &str,
    columns: &[(&str, &str)],
) -> Result<usize, DatabaseError> {
    let existing = table_columns(conn, table)?;
    let mut added = 0;
    for (column, sql_type) in columns {
        if existing.iter().any(|c| c == column) {
            continue;
        }
        conn.execute_batch(&format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            table, column, sql_type
        ))?;
        added += 1;
    }
    Ok(added)
}

/// Checks whether a column exists on a table.
pub fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool, DatabaseError> {
    Ok(table_columns(conn, table)?.iter().any(|c| c == column))
}
