//! Versioned schema for the SQLite store.
//!
//! Applied versions are recorded in `_schema_versions`. Each pending
//! migration runs in its own transaction together with its version row, so
//! a failed migration leaves the schema at the previous version.

use tokio_rusqlite::{Connection, params};

use crate::Error;

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

/// Ordered by version; never edit an entry once released.
const MIGRATIONS: &[Migration] = &[Migration { version: 1, name: "kv", sql: include_str!("../../migrations/001_kv.sql") }];

const VERSION_TABLE: &str = "CREATE TABLE IF NOT EXISTS _schema_versions (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL
)";

/// Bring the schema up to the latest version, returning how many migrations ran.
///
/// # Errors
///
/// Returns `Error::MigrationFailed` if the database was written by a newer
/// build, or a database error if a migration fails to apply.
pub async fn run(conn: &Connection) -> Result<usize, Error> {
    conn.call(|conn| -> Result<usize, Error> {
        conn.execute_batch(VERSION_TABLE)?;

        let current: i64 =
            conn.query_row("SELECT COALESCE(MAX(version), 0) FROM _schema_versions", [], |row| row.get(0))?;
        let latest = MIGRATIONS.last().map_or(0, |m| m.version);
        if current > latest {
            return Err(Error::MigrationFailed(format!(
                "schema version {current} is newer than this build supports ({latest})"
            )));
        }

        let mut applied = 0;
        for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
            let tx = conn.transaction()?;
            tx.execute_batch(migration.sql)?;
            tx.execute(
                "INSERT INTO _schema_versions (version, name, applied_at) VALUES (?1, ?2, ?3)",
                params![migration.version, migration.name, chrono::Utc::now().to_rfc3339()],
            )?;
            tx.commit()?;
            tracing::info!(version = migration.version, name = migration.name, "applied store migration");
            applied += 1;
        }

        Ok(applied)
    })
    .await
    .map_err(Error::from)
}
