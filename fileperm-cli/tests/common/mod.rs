//! Common test utilities shared across test files.
#![allow(dead_code)]

use fileperm_cli::{Context, SqliteStore};
use fileperm_core::test_utils::sample_config;
use tempfile::TempDir;

/// A context over a fresh database file, plus the directory holding it.
pub fn temp_context() -> (TempDir, Context) {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open(dir.path().join("levels.db")).unwrap();
    (dir, Context::new(sample_config(), store))
}

/// Run a command and capture its output.
pub fn run(ctx: &Context, args: &[&str]) -> Result<String, fileperm_cli::CliError> {
    use clap::Parser;

    let argv = std::iter::once("fileperm").chain(args.iter().copied());
    let cli = fileperm_cli::Cli::parse_from(argv);
    let mut out = Vec::new();
    fileperm_cli::commands::dispatch(ctx, cli.command, &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}
