use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

use crate::model::Student;

/// The roster persists as one JSON blob under a fixed key: the storage model
/// is a single key/value slot with whole-roster replace, no versioning and no
/// incremental writes.
const ROSTER_KEY: &str = "roster";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("serialize roster: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("write roster: {0}")]
    Db(#[from] rusqlite::Error),
}

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join("fitbook.sqlite3");
    let conn = Connection::open(db_path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv(
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )?;

    Ok(conn)
}

/// Load the roster. A missing or unparseable blob is an empty roster, not an
/// error; the parse failure is logged and the stored value left in place.
pub fn roster_load(conn: &Connection) -> Vec<Student> {
    let raw: Option<String> = match conn
        .query_row("SELECT value FROM kv WHERE key = ?", [ROSTER_KEY], |r| {
            r.get(0)
        })
        .optional()
    {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "roster read failed; starting from an empty roster");
            return Vec::new();
        }
    };

    let Some(raw) = raw else {
        return Vec::new();
    };

    match serde_json::from_str(&raw) {
        Ok(roster) => roster,
        Err(e) => {
            warn!(error = %e, "stored roster is not valid JSON; starting from an empty roster");
            Vec::new()
        }
    }
}

pub fn roster_save(conn: &Connection, roster: &[Student]) -> Result<(), StorageError> {
    let blob = serde_json::to_string(roster)?;
    conn.execute(
        "INSERT INTO kv(key, value) VALUES(?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        (ROSTER_KEY, &blob),
    )?;
    Ok(())
}
