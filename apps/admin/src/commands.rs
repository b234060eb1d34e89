//! Command handlers. Each writes its report to `out` and fails on unknown ids or when a
//! change could not be persisted.

use crate::args::FlagCommand;
use anyhow::{Result, bail};
use flagkit::FlagManager;
use std::io::Write;
use tracing::debug;

/// Runs one command against `flags`.
///
/// # Errors
/// Unknown flag ids, a storage that stopped accepting writes, or a failed write to `out`.
pub fn run(flags: &FlagManager, command: FlagCommand, out: &mut impl Write) -> Result<()> {
    debug!(?command, "Running command");
    match command {
        FlagCommand::List { group } => list(flags, group.as_deref(), out),
        FlagCommand::Get { id } => {
            known(flags, &id)?;
            writeln!(out, "{}", flags.is_enabled(&id))?;
            Ok(())
        },
        FlagCommand::Enable { id } => switch(flags, &id, true, out),
        FlagCommand::Disable { id } => switch(flags, &id, false, out),
        FlagCommand::Toggle { id } => {
            known(flags, &id)?;
            let enabled = flags.toggle(id.clone());
            ensure_persisted(flags)?;
            writeln!(out, "{id}: {}", state(enabled))?;
            Ok(())
        },
        FlagCommand::Set { assignments } => {
            let mut draft = flags.draft();
            for (id, enabled) in assignments {
                known(flags, &id)?;
                draft.stage(id, enabled)?;
            }
            let changed = draft.commit();
            ensure_persisted(flags)?;
            writeln!(out, "{changed} flag(s) changed")?;
            Ok(())
        },
        FlagCommand::Reset => {
            let changed = flags.reset();
            ensure_persisted(flags)?;
            writeln!(out, "{changed} flag(s) reset to defaults")?;
            Ok(())
        },
    }
}

fn list(flags: &FlagManager, group: Option<&str>, out: &mut impl Write) -> Result<()> {
    let draft = flags.draft();
    let rows: Vec<_> = draft
        .entries()
        .into_iter()
        .filter(|row| group.is_none_or(|g| row.descriptor.group.eq_ignore_ascii_case(g)))
        .collect();

    if rows.is_empty() {
        writeln!(out, "No flags in group '{}'.", group.unwrap_or_default())?;
        return Ok(());
    }

    writeln!(out, "{:<24} {:<8} {:<5} {}", "Flag", "Group", "State", "Description")?;
    writeln!(out, "{:-<80}", "")?;
    for row in rows {
        let name = format!("{}{}", "  ".repeat(row.depth), row.descriptor.id);
        writeln!(
            out,
            "{:<24} {:<8} {:<5} {}",
            name,
            row.descriptor.group,
            state(row.live),
            row.descriptor.description
        )?;
    }
    Ok(())
}

fn switch(flags: &FlagManager, id: &str, enabled: bool, out: &mut impl Write) -> Result<()> {
    known(flags, id)?;
    let changed = flags.set(id.to_owned(), enabled);
    ensure_persisted(flags)?;
    if changed {
        writeln!(out, "{id}: {}", state(enabled))?;
    } else {
        writeln!(out, "{id}: already {}", state(enabled))?;
    }
    Ok(())
}

fn known(flags: &FlagManager, id: &str) -> Result<()> {
    if !flags.catalog().contains(id) {
        bail!("Unknown flag '{id}'. Run `flagctl list` to see the catalog.");
    }
    Ok(())
}

fn ensure_persisted(flags: &FlagManager) -> Result<()> {
    if !flags.is_persistent() {
        bail!("Change applied in memory only: flag storage is unavailable (see logs)");
    }
    Ok(())
}

const fn state(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}
