//! Clap derive structures for the `devreg` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use devreg_core::{DeviceId, DeviceState};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// devreg -- track devices and their lifecycle from the command line
#[derive(Debug, Parser)]
#[command(
    name = "devreg",
    version,
    about = "Manage a registry of devices and their lifecycle",
    long_about = "A CLI for registering devices, querying them by brand or state,\n\
        and updating them under lifecycle rules: a device that is IN_USE\n\
        keeps its name and brand and cannot be deleted.",
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
    /// Device snapshot file (overrides config)
    #[arg(long, env = "DEVREG_STORE", global = true, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Output format (overrides config)
    #[arg(long, short = 'o', env = "DEVREG_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output (overrides config)
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Re-attempts after a concurrent modification (0-10, overrides config)
    #[arg(long, env = "DEVREG_RETRIES", global = true, value_name = "N")]
    pub retries: Option<u32>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

impl OutputFormat {
    pub fn is_json(self) -> bool {
        matches!(self, Self::Json | Self::JsonCompact)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Register, inspect, update and remove devices
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

impl Command {
    /// Canonical subcommand path, e.g. `devices delete`, for error reports.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Devices(args) => match args.command {
                DevicesCommand::Create { .. } => "devices create",
                DevicesCommand::Get { .. } => "devices get",
                DevicesCommand::List { .. } => "devices list",
                DevicesCommand::Update { .. } => "devices update",
                DevicesCommand::Delete { .. } => "devices delete",
            },
            Self::Config(args) => match args.command {
                ConfigCommand::Init => "config init",
                ConfigCommand::Show => "config show",
                ConfigCommand::Path => "config path",
            },
            Self::Completions(_) => "completions",
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// Register a new device
    #[command(alias = "add")]
    Create {
        /// Device name (1-100 characters)
        #[arg(long)]
        name: String,

        /// Device brand (1-50 characters)
        #[arg(long)]
        brand: String,

        /// Initial state: available, in-use, inactive
        #[arg(long, default_value_t = DeviceState::Available)]
        state: DeviceState,
    },

    /// Get device details
    Get {
        /// Device ID (UUID)
        id: DeviceId,
    },

    /// List devices, optionally filtered by brand or state
    #[command(alias = "ls")]
    List {
        /// Exact, case-sensitive brand match
        #[arg(long, short = 'b', conflicts_with = "state")]
        brand: Option<String>,

        /// Only devices in this state
        #[arg(long, short = 's')]
        state: Option<DeviceState>,
    },

    /// Change a device's name, brand or state
    Update {
        /// Device ID (UUID)
        id: DeviceId,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New brand
        #[arg(long)]
        brand: Option<String>,

        /// New state: available, in-use, inactive
        #[arg(long)]
        state: Option<DeviceState>,

        /// JSON patch object, e.g. {"state": "IN_USE"}. Flags win over file
        /// values.
        #[arg(long, short = 'F', value_name = "FILE")]
        from_file: Option<PathBuf>,
    },

    /// Delete a device (refused while it is IN_USE)
    #[command(alias = "rm")]
    Delete {
        /// Device ID (UUID)
        id: DeviceId,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create the config file with guided setup (defaults with --yes)
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
