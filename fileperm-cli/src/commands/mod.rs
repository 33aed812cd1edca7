//! Command line definition and dispatch

mod access;
mod config;
mod level;
mod orphans;

use clap::{Parser, Subcommand};
use fileperm_core::{Config, ConfigHandle, FilePermissions, RawConfig};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::CliError;
use crate::store::SqliteStore;

pub use access::CanAccessArgs;
pub use config::check_config;
pub use level::{ResourceCommand, SetArgs};
pub use orphans::OrphansArgs;

#[derive(Parser, Debug)]
#[command(name = "fileperm", about = "Manage file permission levels")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// Permission configuration (.toml or .json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Level database
    #[arg(long, global = true, default_value = ".fileperm/levels.db")]
    pub db: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate the configuration and show the level options
    CheckConfig,
    /// Manage registered resources
    Resource {
        #[command(subcommand)]
        command: ResourceCommand,
    },
    /// Show the explicit level of a resource
    Get {
        /// Resource id
        id: i64,
    },
    /// Set the level of a resource
    Set(SetArgs),
    /// Remove the explicit level of a resource
    Remove {
        /// Resource id
        id: i64,
    },
    /// Check whether a set of groups may access a resource
    CanAccess(CanAccessArgs),
    /// Find stored levels missing from the configuration
    Orphans(OrphansArgs),
}

/// Everything a command needs: the policy service over the level database.
pub struct Context {
    pub service: Arc<FilePermissions>,
    pub store: Arc<SqliteStore>,
}

impl Context {
    pub fn new(config: Config, store: SqliteStore) -> Self {
        let store = Arc::new(store);
        let service = FilePermissions::new(ConfigHandle::new(config), store.clone(), store.clone());
        Self {
            service: Arc::new(service),
            store,
        }
    }

    /// Load configuration (built-in defaults when `config` is `None`) and
    /// open the database.
    pub fn open(config: Option<&Path>, db: &Path) -> Result<Self, CliError> {
        let config = match config {
            Some(path) => Config::load(path),
            None => Config::from_raw(&RawConfig::default()),
        };
        Ok(Self::new(config, SqliteStore::open(db)?))
    }
}

/// Run a parsed command line, writing human output to `out`.
pub fn run(cli: Cli, out: &mut impl Write) -> Result<(), CliError> {
    if let Command::CheckConfig = cli.command {
        return config::check_config(cli.config.as_deref(), out);
    }

    let ctx = Context::open(cli.config.as_deref(), &cli.db)?;
    dispatch(&ctx, cli.command, out)
}

/// Run a command against an open context.
pub fn dispatch(ctx: &Context, command: Command, out: &mut impl Write) -> Result<(), CliError> {
    match command {
        Command::CheckConfig => config::print_config(&ctx.service.config(), out),
        Command::Resource { command } => level::resource(ctx, command, out),
        Command::Get { id } => level::get(ctx, id, out),
        Command::Set(args) => level::set(ctx, args, out),
        Command::Remove { id } => level::remove(ctx, id, out),
        Command::CanAccess(args) => access::can_access(ctx, args, out),
        Command::Orphans(args) => orphans::orphans(ctx, args, out),
    }
}
