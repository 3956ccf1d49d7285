//! Document Store.
//!
//! Uses rusqlite (SQLite) with a thread-safe `Database` handle.
//! All access is serialized through a `Mutex<Connection>`, which is the
//! single write path the scanner and importer share.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, OpenFlags};

pub mod document_repo;
pub mod error;
pub mod generic_file_repo;
pub mod migrations;
pub mod stats_repo;

pub use document_repo::{DocumentRow, TrackingFields, WorkflowFields};
pub use error::DatabaseError;
pub use generic_file_repo::GenericFileRow;

/// Thread-safe database handle wrapping a single rusqlite connection.
///
/// Cloning is cheap (inner `Arc`).
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Opens (or creates) the database at the given path and runs all
    /// pending migrations.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| DatabaseError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        migrations::run_all(&conn)?;

        log::info!("Database opened at {}", path.display());

        Ok(Self::from_connection(conn))
    }

    /// Opens an existing database read-only without touching its schema.
    ///
    /// Used to export stores written by older versions of the tooling.
    pub fn open_unmigrated(path: &Path) -> Result<Self, DatabaseError> {
        if !path.exists() {
            return Err(DatabaseError::NotFound(path.to_path_buf()));
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        log::info!("Database opened read-only at {}", path.display());
        Ok(Self::from_connection(conn))
    }

    /// Opens an in-memory database for testing. Runs all migrations.
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        migrations::run_all(&conn)?;
        Ok(Self::from_connection(conn))
    }

    /// Wraps an already-open connection as is.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Provides locked access to the underlying connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, DatabaseError>
    where
        F: FnOnce(&Connection) -> Result<T, DatabaseError>,
    {
        let conn = self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)?;
        f(&conn)
    }
}

/// Returns the canonical database path: `~/.mdisync/data/mdisync.db`.
pub fn default_database_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".mdisync").join("data").join("mdisync.db"))
}

/// Column names of `table`, in declaration order.
pub fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>, DatabaseError> {
    ensure_identifier(table)?;
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}

/// Names of all user tables.
pub fn table_names(conn: &Connection) -> Result<Vec<String>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

/// Only alphanumerics and underscores may be spliced into SQL.
pub(crate) fn ensure_identifier(name: &str) -> Result<(), DatabaseError> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(DatabaseError::InvalidIdentifier(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            let count: u32 =
                conn.query_row("SELECT COUNT(*) FROM _migrations", [], |r| r.get(0))?;
            assert!(count > 0);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_open_file_db() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("project.db");
        let db = Database::open(&path).unwrap();
        db.with_conn(|conn| {
            let tables = table_names(conn)?;
            assert!(tables.contains(&"documents".to_string()));
            assert!(tables.contains(&"generic_files".to_string()));
            Ok(())
        })
        .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_open_unmigrated_missing_file() {
        let result = Database::open_unmigrated(Path::new("/nonexistent/legacy.db"));
        assert!(matches!(result, Err(DatabaseError::NotFound(_))));
    }

    #[test]
    fn test_open_unmigrated_leaves_schema_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch("CREATE TABLE mdi_documents (id TEXT, document_no TEXT);")
                .unwrap();
        }

        let db = Database::open_unmigrated(&path).unwrap();
        db.with_conn(|conn| {
            assert_eq!(table_names(conn)?, vec!["mdi_documents".to_string()]);
            assert_eq!(
                table_columns(conn, "mdi_documents")?,
                vec!["id".to_string(), "document_no".to_string()]
            );
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_default_database_path() {
        let path = default_database_path().unwrap();
        assert!(path.ends_with("mdisync.db"));
        assert!(path.to_string_lossy().contains(".mdisync"));
    }

    #[test]
    fn test_ensure_identifier() {
        assert!(ensure_identifier("documents").is_ok());
        assert!(ensure_identifier("mdi_documents").is_ok());
        assert!(ensure_identifier("docs; DROP TABLE x").is_err());
        assert!(ensure_identifier("").is_err());
    }

    #[test]
    fn test_database_is_clone() {
        let db = Database::open_in_memory().unwrap();
        let db2 = db.clone();
        db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO documents (localPath, name) VALUES ('/p/a.pdf', 'a')",
                [],
            )?;
            Ok(())
        })
        .unwrap();
        db2.with_conn(|conn| {
            let count: u32 = conn.query_row("SELECT COUNT(*) FROM documents", [], |r| r.get(0))?;
            assert_eq!(count, 1);
            Ok(())
        })
        .unwrap();
    }
}
