//! SQLite-backed revision store.
//!
//! The whole revision map is kept as a single JSON document per session key.
//! The connection is opened with WAL mode and migrated on open.

use super::{RevisionStore, migrations};
use crate::Error;
use crate::revision::RevisionMap;
use async_trait::async_trait;
use std::path::Path;
use tokio_rusqlite::{Connection, params, rusqlite};

/// Session key used when none is given.
pub const DEFAULT_SESSION: &str = "revisions";

const PRAGMAS: &str = "PRAGMA journal_mode=WAL;
     PRAGMA synchronous=NORMAL;
     PRAGMA temp_store=MEMORY;
     PRAGMA foreign_keys=ON;";

/// Revision store handle.
///
/// Wraps a tokio-rusqlite Connection that runs database operations
/// on a background thread.
#[derive(Clone, Debug)]
pub struct SqliteRevisionStore {
    pub(crate) conn: Connection,
    session: String,
}

impl SqliteRevisionStore {
    /// Open a database at the specified path.
    ///
    /// Creates the file if it doesn't exist, applies performance pragmas,
    /// and runs any pending migrations.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        Self::init(conn).await
    }

    /// Open an in-memory database for testing.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, Error> {
        conn.call(|conn| {
            conn.execute_batch(PRAGMAS)?;
            Ok(())
        })
        .await
        .map_err(Error::Database)?;

        migrations::run(&conn).await?;

        Ok(Self { conn, session: DEFAULT_SESSION.to_string() })
    }

    /// Use `session` as the key under which the map is stored.
    ///
    /// Handles for different sessions share the connection but never see each
    /// other's revisions.
    pub fn with_session(self, session: impl Into<String>) -> Self {
        Self { session: session.into(), ..self }
    }

    pub fn session(&self) -> &str {
        &self.session
    }
}

#[async_trait]
impl RevisionStore for SqliteRevisionStore {
    async fn get_revisions(&self) -> Result<RevisionMap, Error> {
        let session = self.session.clone();
        let json = self
            .conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let result = conn.query_row(
                    "SELECT revisions_json FROM revision_store WHERE key = ?1",
                    params![session],
                    |row| row.get(0),
                );

                match result {
                    Ok(json) => Ok(Some(json)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        match json {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(RevisionMap::new()),
        }
    }

    async fn set_revisions(&self, revisions: &RevisionMap) -> Result<(), Error> {
        let session = self.session.clone();
        let json = serde_json::to_string(revisions).map_err(|e| Error::InvalidInput(e.to_string()))?;
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO revision_store (key, revisions_json, updated_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(key) DO UPDATE SET
                        revisions_json = excluded.revisions_json,
                        updated_at = excluded.updated_at",
                    params![session, json, now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}
