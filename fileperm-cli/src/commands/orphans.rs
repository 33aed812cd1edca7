//! `orphans`

use clap::Args;
use fileperm_core::reconcile::{find_orphans, repair};
use fileperm_core::LevelFix;
use std::io::Write;

use super::Context;
use crate::error::CliError;

#[derive(Args, Debug)]
pub struct OrphansArgs {
    /// Replace an orphaned level. Format: old_level:new_level
    #[arg(long)]
    pub fix: Option<String>,
}

pub fn orphans(ctx: &Context, args: OrphansArgs, out: &mut impl Write) -> Result<(), CliError> {
    let config = ctx.service.config();
    let levels: Vec<&str> = config.levels().iter().map(|l| l.as_str()).collect();
    let valid = levels.join(", ");
    writeln!(out, "Valid permission levels: {}\n", valid)?;

    let orphans = find_orphans(&*ctx.store, &*ctx.store, config.catalog())?;
    if orphans.is_empty() {
        writeln!(out, "No orphaned permission levels found.")?;
        return Ok(());
    }

    writeln!(out, "Found {} orphaned permission level(s):", orphans.len())?;
    for orphan in &orphans {
        let name = orphan
            .key
            .as_ref()
            .map_or_else(|| "?".to_string(), |key| key.to_string());
        writeln!(
            out,
            "  Resource {} ({}): \"{}\" is not in [{}]",
            orphan.resource, name, orphan.level, valid
        )?;
    }

    let Some(fix) = args.fix else {
        writeln!(out, "\nTo repair, re-run with --fix old_level:new_level")?;
        return Ok(());
    };

    let fix: LevelFix = fix.parse()?;
    let report = repair(&ctx.service, &orphans, &fix)?;
    if report.matched == 0 {
        writeln!(
            out,
            "No orphaned entries found with level \"{}\". Nothing to fix.",
            fix.from
        )?;
        return Ok(());
    }

    for id in &report.skipped {
        writeln!(out, "  Skipping resource {}: it no longer exists", id)?;
    }
    writeln!(
        out,
        "Done. Updated {} entry/entries from \"{}\" to \"{}\".",
        report.updated.len(),
        fix.from,
        fix.to
    )?;
    Ok(())
}
