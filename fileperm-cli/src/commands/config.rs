//! `check-config`

use fileperm_core::{Config, RawConfig};
use std::io::Write;
use std::path::Path;

use crate::error::CliError;

/// Validate the configuration file and print what it configures.
///
/// Fails with [`CliError::InvalidConfig`] if the file would make every
/// decision deny.
pub fn check_config(path: Option<&Path>, out: &mut impl Write) -> Result<(), CliError> {
    let config = match path {
        Some(path) => Config::load(path),
        None => {
            writeln!(out, "No configuration file given; using built-in defaults")?;
            Config::from_raw(&RawConfig::default())
        }
    };
    print_config(&config, out)?;

    if config.is_invalid() {
        return Err(CliError::InvalidConfig(config.issues().len()));
    }
    Ok(())
}

pub(crate) fn print_config(config: &Config, out: &mut impl Write) -> Result<(), CliError> {
    writeln!(out, "Configuration: {}", config.validity())?;

    let levels: Vec<&str> = config.levels().iter().map(|l| l.as_str()).collect();
    writeln!(out, "Levels: {}", levels.join(", "))?;

    for (label, _) in config.level_group_map().labels() {
        writeln!(out, "  {}", label)?;
    }

    let defaults = config.defaults();
    if let Some(level) = defaults.global_default() {
        writeln!(out, "Default level: {}", level)?;
    }
    for (namespace, level) in defaults.namespace_defaults() {
        writeln!(out, "Default level for namespace {}: {}", namespace, level)?;
    }

    for issue in config.issues() {
        writeln!(out, "error: {}", issue)?;
    }
    Ok(())
}
