//! `resource`, `get`, `set`, `remove`

use clap::{Args, Subcommand};
use fileperm_core::{ResourceId, ResourceKey};
use std::io::Write;

use super::Context;
use crate::error::CliError;

#[derive(Subcommand, Debug)]
pub enum ResourceCommand {
    /// Register a resource and print its id
    Add {
        /// Namespace id (files live in 6)
        namespace: i32,
        /// Resource name within the namespace
        key: String,
    },
    /// Delete a resource and its level
    Delete {
        /// Resource id
        id: i64,
    },
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Resource id
    pub id: i64,
    /// New level
    pub level: String,
    /// Name recorded as having made the change
    #[arg(long, default_value = "cli")]
    pub actor: String,
}

pub fn resource(
    ctx: &Context,
    command: ResourceCommand,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match command {
        ResourceCommand::Add { namespace, key } => {
            let key = ResourceKey::new(namespace, key);
            let id = ctx.store.create_resource(&key)?;
            writeln!(out, "{}", id)?;
        }
        ResourceCommand::Delete { id } => {
            if !ctx.store.delete_resource(ResourceId::new(id))? {
                return Err(CliError::UnknownResource(id.to_string()));
            }
            writeln!(out, "Deleted resource {}", id)?;
        }
    }
    Ok(())
}

pub fn get(ctx: &Context, id: i64, out: &mut impl Write) -> Result<(), CliError> {
    let level = ctx.service.level_store().get_level(ResourceId::new(id))?;
    match level {
        Some(level) => writeln!(out, "{}", level)?,
        None => writeln!(out, "(none)")?,
    }
    Ok(())
}

pub fn set(ctx: &Context, args: SetArgs, out: &mut impl Write) -> Result<(), CliError> {
    let change = ctx
        .service
        .change_level(&args.actor, ResourceId::new(args.id), &args.level)?;

    log::info!("Level changed: {}", serde_json::to_string(&change)?);
    writeln!(
        out,
        "Resource {}: {} -> {}",
        change.resource,
        change.old_level_label(),
        change.new_level
    )?;
    Ok(())
}

pub fn remove(ctx: &Context, id: i64, out: &mut impl Write) -> Result<(), CliError> {
    ctx.service.level_store().remove_level(ResourceId::new(id))?;
    writeln!(out, "Removed level from resource {}", id)?;
    Ok(())
}
