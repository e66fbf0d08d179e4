//! Clap derive structures for the `petcare` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use petcare_core::LockState;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// petcare: inspect and control Sure Petcare flaps from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "petcare",
    version,
    about = "Inspect and control Sure Petcare hubs, flaps and pets",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Account profile to use
    #[arg(long, short = 'p', env = "PETCARE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Config file (defaults to the platform config dir)
    #[arg(long, env = "PETCARE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format (defaults to the config file value, then table)
    #[arg(long, short = 'o', global = true)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

impl GlobalOpts {
    /// The output format in effect for this invocation.
    pub fn format(&self) -> OutputFormat {
        self.output.unwrap_or(OutputFormat::Table)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// One identifier per line (scripting)
    Plain,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List hubs
    Hubs,

    /// List cat and pet flaps with their lock mode
    #[command(alias = "doors")]
    Flaps,

    /// List pets with their location and timeline facts
    Pets,

    /// Show one hub, flap or pet by id
    Device(DeviceArgs),

    /// Set a flap's lock mode
    Lock(LockArgs),

    /// Print full pet records from the service
    PetDetails,

    /// Poll and print flap and pet state until interrupted
    Watch(WatchArgs),

    /// Inspect or edit the configuration
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct DeviceArgs {
    /// Entity id
    pub id: i64,
}

#[derive(Debug, Args)]
pub struct LockArgs {
    /// Flap id
    pub flap_id: i64,

    /// Lock mode: unlocked, locked_in, locked_out or locked_all
    #[arg(value_parser = parse_lock_mode)]
    pub mode: LockState,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Poll period in seconds (defaults to the config file value)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,
    /// Create or replace the active profile and write the config file
    Init(InitArgs),
    /// Show the effective configuration with secrets masked
    Show,
    /// Store the profile's password in the system keyring (read from stdin)
    SetPassword,
}

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Account email address
    #[arg(long)]
    pub email: String,

    /// Environment variable holding the password
    #[arg(long)]
    pub password_env: Option<String>,

    /// API root override
    #[arg(long)]
    pub base_url: Option<String>,
}

fn parse_lock_mode(raw: &str) -> Result<LockState, String> {
    let mode: LockState = raw
        .replace('-', "_")
        .parse()
        .map_err(|_| format!("unknown lock mode '{raw}'"))?;
    if mode.is_settable() {
        Ok(mode)
    } else {
        Err(format!("lock mode '{raw}' cannot be set"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn lock_mode_accepts_display_names() {
        let cli = Cli::try_parse_from(["petcare", "lock", "42", "locked-in"]).unwrap();
        match cli.command {
            Command::Lock(args) => {
                assert_eq!(args.flap_id, 42);
                assert_eq!(args.mode, LockState::LockedIn);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn curfew_modes_are_refused_by_parser() {
        assert!(Cli::try_parse_from(["petcare", "lock", "42", "curfew"]).is_err());
        assert!(Cli::try_parse_from(["petcare", "lock", "42", "sideways"]).is_err());
    }

    #[test]
    fn output_format_defaults_to_table() {
        let cli = Cli::try_parse_from(["petcare", "pets"]).unwrap();
        assert_eq!(cli.global.output, None);
        assert_eq!(cli.global.format(), OutputFormat::Table);
    }

    #[test]
    fn config_init_takes_profile_fields() {
        let cli = Cli::try_parse_from([
            "petcare",
            "config",
            "init",
            "--email",
            "owner@example.com",
            "--password-env",
            "PW",
        ])
        .unwrap();
        let Command::Config(ConfigArgs {
            command: ConfigCommand::Init(args),
        }) = cli.command
        else {
            panic!("expected config init");
        };
        assert_eq!(args.email, "owner@example.com");
        assert_eq!(args.password_env.as_deref(), Some("PW"));
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::try_parse_from(["petcare", "flaps", "-o", "json", "-vv"]).unwrap();
        assert_eq!(cli.global.output, Some(OutputFormat::Json));
        assert_eq!(cli.global.verbose, 2);
    }
}
