//! Revision store schema migrations.
//!
//! Applied versions are recorded in `_migrations`. Each pending migration runs
//! in its own transaction together with its bookkeeping row, so a failed batch
//! leaves the schema at the previous version.

use crate::Error;
use tokio_rusqlite::{Connection, params, rusqlite};

/// A schema step, applied once per database.
struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

/// Ordered by ascending `version`.
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "revision_store",
    sql: include_str!("../../migrations/001_revision_store.sql"),
}];

const CREATE_MIGRATIONS_TABLE: &str = "CREATE TABLE IF NOT EXISTS _migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL
)";

/// Bring the schema up to date.
///
/// Returns the versions applied by this call, empty when the database was
/// already current.
///
/// # Errors
///
/// Returns `Error::MigrationFailed` naming the migration whose SQL failed.
pub async fn run(conn: &Connection) -> Result<Vec<i64>, Error> {
    let applied = conn
        .call(|conn| -> Result<Vec<i64>, Error> {
            conn.execute(CREATE_MIGRATIONS_TABLE, [])?;
            let current = schema_version(conn)?;

            let mut applied = Vec::new();
            for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
                apply(conn, migration)
                    .map_err(|e| Error::MigrationFailed(format!("{} ({}): {e}", migration.version, migration.name)))?;
                applied.push(migration.version);
            }

            Ok(applied)
        })
        .await?;

    if !applied.is_empty() {
        tracing::info!(?applied, "migrated revision store schema");
    }

    Ok(applied)
}

fn schema_version(conn: &rusqlite::Connection) -> Result<i64, rusqlite::Error> {
    conn.query_row("SELECT COALESCE(MAX(version), 0) FROM _migrations", [], |row| row.get(0))
}

fn apply(conn: &mut rusqlite::Connection, migration: &Migration) -> Result<(), rusqlite::Error> {
    let tx = conn.transaction()?;
    tx.execute_batch(migration.sql)?;
    tx.execute(
        "INSERT INTO _migrations (version, name, applied_at) VALUES (?1, ?2, ?3)",
        params![migration.version, migration.name, chrono::Utc::now().to_rfc3339()],
    )?;
    tx.commit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_applies_pending_once() {
        let conn = Connection::open_in_memory().await.unwrap();

        assert_eq!(run(&conn).await.unwrap(), vec![1]);
        assert!(run(&conn).await.unwrap().is_empty());

        let has_table: bool = conn
            .call(|conn| {
                conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='revision_store')",
                    [],
                    |row| row.get(0),
                )
            })
            .await
            .unwrap();

        assert!(has_table);
    }

    #[tokio::test]
    async fn test_run_records_names() {
        let conn = Connection::open_in_memory().await.unwrap();
        run(&conn).await.unwrap();

        let rows: Vec<(i64, String)> = conn
            .call(|conn| {
                let mut stmt = conn.prepare("SELECT version, name FROM _migrations ORDER BY version")?;
                let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
                rows.collect::<Result<Vec<_>, rusqlite::Error>>()
            })
            .await
            .unwrap();

        assert_eq!(rows, vec![(1, "revision_store".to_string())]);
    }

    #[test]
    fn test_migrations_ordered() {
        assert!(MIGRATIONS.windows(2).all(|pair| pair[0].version < pair[1].version));
    }
}
