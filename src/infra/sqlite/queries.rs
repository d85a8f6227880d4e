use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};

use crate::infra::sqlite::schema::open_connection;

pub fn read_slot(db_path: &Path, name: &str) -> Result<Option<String>> {
    let conn = open_connection(db_path)?;
    conn.query_row(
        "SELECT value FROM slot WHERE name = ?1",
        params![name],
        |row| row.get(0),
    )
    .optional()
    .with_context(|| format!("failed to read slot: {name}"))
}

pub fn upsert_slot(db_path: &Path, name: &str, value: &str) -> Result<()> {
    let conn = open_connection(db_path)?;
    upsert_on(&conn, name, value)
}

pub fn delete_slot(db_path: &Path, name: &str) -> Result<()> {
    let conn = open_connection(db_path)?;
    conn.execute("DELETE FROM slot WHERE name = ?1", params![name])
        .with_context(|| format!("failed to delete slot: {name}"))?;
    Ok(())
}

/// Writes (`Some`) and deletes (`None`) in one transaction.
pub fn apply_slot_changes(db_path: &Path, changes: &[(&str, Option<&str>)]) -> Result<()> {
    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start slot transaction")?;

    for (name, value) in changes {
        match value {
            Some(value) => upsert_on(&tx, name, value)?,
            None => {
                tx.execute("DELETE FROM slot WHERE name = ?1", params![name])
                    .with_context(|| format!("failed to delete slot: {name}"))?;
            }
        }
    }

    tx.commit().context("failed to commit slot transaction")?;
    Ok(())
}

fn upsert_on(conn: &rusqlite::Connection, name: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO slot(name, value, updated_at)
         VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(name) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![name, value],
    )
    .with_context(|| format!("failed to write slot: {name}"))?;
    Ok(())
}
