//! # CLI Argument Definitions
//!
//! Global options select where flags live; subcommands read or change them.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI structure parsing command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "flagctl")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Inspect and change persisted feature flags")]
pub struct Cli {
    /// Config file (TOML, JSON or YAML). Defaults to `flagkit.*` in the working directory.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory holding the flag document; overrides `storage.data_dir`.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: FlagCommand,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum FlagCommand {
    /// List every flag with its current state
    List {
        /// Only show flags of this group (case-insensitive)
        #[arg(short, long)]
        group: Option<String>,
    },
    /// Print `true` or `false` for one flag
    Get { id: String },
    /// Turn a flag on
    Enable { id: String },
    /// Turn a flag off
    Disable { id: String },
    /// Flip a flag and print its new state
    Toggle { id: String },
    /// Apply several assignments in one batch, e.g. `set DASHBOARD=off REPORTS_MODULE=on`
    Set {
        #[arg(required = true, value_name = "ID=BOOL", value_parser = parse_assignment)]
        assignments: Vec<(String, bool)>,
    },
    /// Put every flag back to its catalog default
    Reset,
}

/// Parses `ID=BOOL`, accepting `true/false`, `on/off`, `yes/no` and `1/0`.
pub fn parse_assignment(raw: &str) -> Result<(String, bool), String> {
    let (id, value) =
        raw.split_once('=').ok_or_else(|| format!("expected ID=BOOL, got '{raw}'"))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(format!("missing flag id in '{raw}'"));
    }
    let enabled = match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => true,
        "false" | "off" | "no" | "0" => false,
        other => return Err(format!("'{other}' is not a boolean")),
    };
    Ok((id.to_owned(), enabled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn assignments_accept_common_spellings() {
        assert_eq!(parse_assignment("DASHBOARD=on"), Ok(("DASHBOARD".to_owned(), true)));
        assert_eq!(parse_assignment(" A = FALSE "), Ok(("A".to_owned(), false)));
        assert_eq!(parse_assignment("A=1"), Ok(("A".to_owned(), true)));
        assert!(parse_assignment("A").is_err());
        assert!(parse_assignment("=true").is_err());
        assert!(parse_assignment("A=maybe").is_err());
    }

    #[test]
    fn global_options_work_after_the_subcommand() {
        let cli = Cli::try_parse_from(["flagctl", "get", "DASHBOARD", "--data-dir", "/tmp/x", "-v"])
            .unwrap();
        assert_eq!(cli.command, FlagCommand::Get { id: "DASHBOARD".to_owned() });
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
        assert!(cli.verbose);
    }

    #[test]
    fn set_needs_at_least_one_assignment() {
        assert!(Cli::try_parse_from(["flagctl", "set"]).is_err());
    }
}
