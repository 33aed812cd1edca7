use fileperm_core::{
    Level, LevelBackend, ResourceDirectory, ResourceId, ResourceKey, StorageError, StoredLevel,
};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;
use std::sync::Arc;

use super::Migrator;
use crate::error::CliError;

fn read_err(e: rusqlite::Error) -> StorageError {
    StorageError::Read(e.to_string())
}

fn write_err(e: rusqlite::Error) -> StorageError {
    StorageError::Write(e.to_string())
}

/// SQLite-based level storage
///
/// Holds both the resource registry and the level rows. Level rows are
/// written with `INSERT OR REPLACE` against the `resource_id` primary key,
/// so concurrent writers never need to read first.
///
/// # Example
/// ```no_run
/// use fileperm_cli::SqliteStore;
/// use fileperm_core::ResourceKey;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = SqliteStore::open(".fileperm/levels.db")?;
/// let id = store.create_resource(&ResourceKey::file("Plan.pdf"))?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and apply migrations.
    ///
    /// Creates the parent directory if needed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CliError> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        Self::from_connection(Connection::open(&path)?)
    }

    /// In-memory database, for tests.
    pub fn open_in_memory() -> Result<Self, CliError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, CliError> {
        Migrator::new(&conn).migrate()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Register a resource, returning its id.
    ///
    /// An existing `(namespace, key)` keeps its id.
    pub fn create_resource(&self, key: &ResourceKey) -> Result<ResourceId, StorageError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR IGNORE INTO resources (namespace, key) VALUES (?1, ?2)",
            params![key.namespace, key.key],
        )
        .map_err(write_err)?;

        conn.query_row(
            "SELECT id FROM resources WHERE namespace = ?1 AND key = ?2",
            params![key.namespace, key.key],
            |row| row.get::<_, i64>(0),
        )
        .map(ResourceId::new)
        .map_err(read_err)
    }

    /// Delete a resource and its level row.
    ///
    /// Returns `false` if the resource did not exist.
    pub fn delete_resource(&self, resource: ResourceId) -> Result<bool, StorageError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(write_err)?;
        tx.execute(
            "DELETE FROM resource_levels WHERE resource_id = ?1",
            params![resource.get()],
        )
        .map_err(write_err)?;
        let deleted = tx
            .execute("DELETE FROM resources WHERE id = ?1", params![resource.get()])
            .map_err(write_err)?;
        tx.commit().map_err(write_err)?;
        Ok(deleted > 0)
    }
}

impl LevelBackend for SqliteStore {
    fn read_level(&self, resource: ResourceId) -> Result<Option<Level>, StorageError> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT level FROM resource_levels WHERE resource_id = ?1",
            params![resource.get()],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map(|level| level.map(Level::new))
        .map_err(read_err)
    }

    fn upsert_level(&self, resource: ResourceId, level: &Level) -> Result<(), StorageError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO resource_levels (resource_id, level) VALUES (?1, ?2)",
            params![resource.get(), level.as_str()],
        )
        .map_err(write_err)?;
        Ok(())
    }

    fn delete_level(&self, resource: ResourceId) -> Result<bool, StorageError> {
        let conn = self.conn.lock();
        let deleted = conn
            .execute(
                "DELETE FROM resource_levels WHERE resource_id = ?1",
                params![resource.get()],
            )
            .map_err(write_err)?;
        Ok(deleted > 0)
    }

    fn scan_levels(&self) -> Result<Vec<StoredLevel>, StorageError> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare("SELECT resource_id, level FROM resource_levels ORDER BY resource_id")
            .map_err(read_err)?;

        let rows = stmt
            .query_map([], |row| {
                Ok(StoredLevel {
                    resource: ResourceId::new(row.get(0)?),
                    level: Level::new(row.get::<_, String>(1)?),
                })
            })
            .map_err(read_err)?;

        let levels = rows.collect::<Result<Vec<_>, _>>().map_err(read_err)?;
        Ok(levels)
    }
}

impl ResourceDirectory for SqliteStore {
    fn exists(&self, resource: ResourceId) -> Result<bool, StorageError> {
        let conn = self.conn.lock();
        let found = conn
            .query_row(
                "SELECT 1 FROM resources WHERE id = ?1",
                params![resource.get()],
                |_| Ok(()),
            )
            .optional()
            .map_err(read_err)?;
        Ok(found.is_some())
    }

    fn lookup(&self, key: &ResourceKey) -> Result<Option<ResourceId>, StorageError> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id FROM resources WHERE namespace = ?1 AND key = ?2",
            params![key.namespace, key.key],
            |row| row.get::<_, i64>(0),
        )
        .optional()
        .map(|id| id.map(ResourceId::new))
        .map_err(read_err)
    }

    fn key_of(&self, resource: ResourceId) -> Result<Option<ResourceKey>, StorageError> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT namespace, key FROM resources WHERE id = ?1",
            params![resource.get()],
            |row| Ok(ResourceKey::new(row.get(0)?, row.get::<_, String>(1)?)),
        )
        .optional()
        .map_err(read_err)
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}
