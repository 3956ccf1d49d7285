//! Database error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from Document Store operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// SQLite error from rusqlite.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error when creating the database directory.
    #[error("IO error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An existing store was required but the file is missing.
    #[error("Database file '{0}' not found")]
    NotFound(PathBuf),

    /// A migration failed to apply.
    #[error("Migration failed at version {version}: {reason}")]
    Migration { version: u32, reason: String },

    /// A table or column name contained characters outside `[A-Za-z0-9_]`.
    #[error("Invalid SQL identifier: {0}")]
    InvalidIdentifier(String),

    /// The database lock was poisoned.
    #[error("Database lock poisoned")]
    LockPoisoned,
}
