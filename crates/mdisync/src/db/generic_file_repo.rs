//! Generic file repository: supporting files that are not MDI deliverables.

use rusqlite::{params, Row};
use serde::Serialize;

use super::{Database, DatabaseError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenericFileRow {
    #[serde(rename = "localPath")]
    pub local_path: String,
    pub stt: Option<i64>,
    pub name: Option<String>,
    /// Lowercased extension without the dot.
    pub format: Option<String>,
    #[serde(rename = "dateReceived")]
    pub date_received: Option<String>,
    pub revision: Option<String>,
}

impl GenericFileRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            local_path: row.get("localPath")?,
            stt: row.get("stt")?,
            name: row.get("name")?,
            format: row.get("format")?,
            date_received: row.get("dateReceived")?,
            revision: row.get("revision")?,
        })
    }
}

/// Replaces the rows with the same `localPath`, all in one transaction.
pub fn upsert_many(db: &Database, rows: &[GenericFileRow]) -> Result<usize, DatabaseError> {
    db.with_conn(|conn| {
        let tx = conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO generic_files
                 (localPath, stt, name, format, dateReceived, revision)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for row in rows {
                stmt.execute(params![
                    row.local_path,
                    row.stt,
                    row.name,
                    row.format,
                    row.date_received,
                    row.revision,
                ])?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    })
}

/// All generic files ordered by name.
pub fn list_ordered(db: &Database) -> Result<Vec<GenericFileRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM generic_files ORDER BY name, localPath")?;
        let rows = stmt
            .query_map([], GenericFileRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Renumbers `stt` 1..n in name order and persists it.
pub fn resequence(db: &Database) -> Result<Vec<GenericFileRow>, DatabaseError> {
    let mut rows = list_ordered(db)?;
    db.with_conn(|conn| {
        let tx = conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare("UPDATE generic_files SET stt = ?1 WHERE localPath = ?2")?;
            for (i, row) in rows.iter_mut().enumerate() {
                let stt = i as i64 + 1;
                stmt.execute(params![stt, row.local_path])?;
                row.stt = Some(stt);
            }
        }
        tx.commit()?;
        Ok(())
    })?;
    Ok(rows)
}
