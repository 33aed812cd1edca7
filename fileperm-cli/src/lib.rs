//! SQLite storage and operator commands for fileperm
//!
//! This crate provides:
//! - [`SqliteStore`], a persistent [`fileperm_core::LevelBackend`] and
//!   [`fileperm_core::ResourceDirectory`]
//! - The `fileperm` command line: configuration checks, level management,
//!   access checks and orphan repair

pub mod commands;
mod error;
pub mod store;

pub use commands::{Cli, Command, Context};
pub use error::CliError;
pub use store::SqliteStore;
