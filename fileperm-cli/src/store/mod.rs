//! Persistent level storage

mod migrations;
mod sqlite;

pub use migrations::Migrator;
pub use sqlite::SqliteStore;
