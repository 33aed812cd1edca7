//! `can-access`

use clap::Args;
use fileperm_core::{ResourceId, FILE_NAMESPACE};
use std::io::Write;

use super::Context;
use crate::error::CliError;

#[derive(Args, Debug)]
pub struct CanAccessArgs {
    /// Resource id
    pub id: i64,
    /// Namespace the resource lives in
    #[arg(long, default_value_t = FILE_NAMESPACE)]
    pub namespace: i32,
    /// Group the user belongs to (repeatable)
    #[arg(long = "group")]
    pub groups: Vec<String>,
}

pub fn can_access(
    ctx: &Context,
    args: CanAccessArgs,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let resource = ResourceId::new(args.id);
    let evaluator = ctx.service.evaluator();

    let allowed = evaluator.can_access_resource(&args.groups, resource, args.namespace);
    let effective = match evaluator.effective_level(resource, args.namespace) {
        Ok(Some(level)) => level.to_string(),
        Ok(None) => "(none)".to_string(),
        Err(_) => "(unavailable)".to_string(),
    };

    writeln!(
        out,
        "{} (effective level: {})",
        if allowed { "allowed" } else { "denied" },
        effective
    )?;
    Ok(())
}
