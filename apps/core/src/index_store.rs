//! Persisted snapshot of the installed-application index, so a warm start
//! can answer queries before the first rescan finishes.

use std::path::Path;

use rusqlite::{params, Connection};

use crate::app_index::AppEntry;

pub fn open_at(path: &Path) -> Result<Connection, rusqlite::Error> {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let conn = Connection::open(path)?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn open_memory() -> Result<Connection, rusqlite::Error> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

fn init_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS app (path TEXT PRIMARY KEY, name TEXT NOT NULL)",
        [],
    )?;
    Ok(())
}

/// Swaps the whole snapshot atomically; a rescan either lands fully or not
/// at all.
pub fn replace_all(db: &mut Connection, entries: &[AppEntry]) -> Result<(), rusqlite::Error> {
    let tx = db.transaction()?;
    tx.execute("DELETE FROM app", [])?;
    {
        let mut stmt = tx.prepare("INSERT OR REPLACE INTO app (path, name) VALUES (?1, ?2)")?;
        for entry in entries {
            stmt.execute(params![entry.path, entry.name])?;
        }
    }
    tx.commit()
}

pub fn load_all(db: &Connection) -> Result<Vec<AppEntry>, rusqlite::Error> {
    let mut stmt = db.prepare("SELECT name, path FROM app ORDER BY name")?;
    let rows = stmt.query_map([], |row| {
        Ok(AppEntry {
            name: row.get(0)?,
            path: row.get(1)?,
        })
    })?;
    rows.collect()
}
