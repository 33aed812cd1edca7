//! Schema migrations for the level database

use rusqlite::Connection;

use crate::error::CliError;

/// SQL for each migration version
const MIGRATIONS: &[(&str, &str)] = &[("v001_initial", include_str!("v001_initial.sql"))];

/// Applies pending migrations, tracked with `PRAGMA user_version`
pub struct Migrator<'a> {
    conn: &'a Connection,
}

impl<'a> Migrator<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Current schema version
    pub fn current_version(&self) -> Result<i32, CliError> {
        let version: i32 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;
        Ok(version)
    }

    /// Latest schema version
    pub fn target_version(&self) -> i32 {
        MIGRATIONS.len() as i32
    }

    /// Run all pending migrations
    pub fn migrate(&self) -> Result<(), CliError> {
        let current = self.current_version()?;

        for (idx, (name, sql)) in MIGRATIONS.iter().enumerate() {
            let version = (idx + 1) as i32;
            if version <= current {
                continue;
            }
            log::info!("Running migration {}: {}", version, name);
            self.conn
                .execute_batch(sql)
                .map_err(|e| CliError::Migration(format!("{}: {}", name, e)))?;
            self.conn.pragma_update(None, "user_version", version)?;
        }

        Ok(())
    }
}
