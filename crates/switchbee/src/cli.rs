//! Clap derive structures for the `switchbee` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use switchbee_core::{DeviceId, StateValue};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// switchbee -- control a SwitchBee central unit from the command line
#[derive(Debug, Parser)]
#[command(
    name = "switchbee",
    version,
    about = "Control SwitchBee home-automation devices from the command line",
    long_about = "Talks to a SwitchBee central unit on the local network: lists\n\
        devices and their states, and switches, dims or sets them.",
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
    /// Central unit profile to use
    #[arg(long, env = "SWITCHBEE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Central unit address (overrides profile)
    #[arg(long, short = 'i', env = "SWITCHBEE_HOST", global = true)]
    pub host: Option<String>,

    /// Login user name
    #[arg(long, short = 'u', env = "SWITCHBEE_USERNAME", global = true)]
    pub username: Option<String>,

    /// Login password
    #[arg(
        long,
        short = 'p',
        env = "SWITCHBEE_PASSWORD",
        global = true,
        hide_env_values = true
    )]
    pub password: Option<String>,

    /// Only load these device types (comma-separated, e.g. SWITCH,DIMMER)
    #[arg(long, value_delimiter = ',', global = true)]
    pub include: Vec<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SWITCHBEE_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Verify the central unit certificate against the system store
    #[arg(long, global = true)]
    pub verify_tls: bool,

    /// CA certificate for the central unit
    #[arg(long, global = true)]
    pub ca_cert: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, env = "SWITCHBEE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
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

#[derive(Debug, Clone, ValueEnum)]
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
    /// Fetch and show the state of every device
    #[command(name = "get_states", alias = "get-states", alias = "states")]
    GetStates(GetStatesArgs),

    /// Change the state of one device
    #[command(name = "set_state", alias = "set-state", alias = "set")]
    SetState(SetStateArgs),

    /// List configured devices without fetching states
    #[command(name = "get_devices", alias = "get-devices", alias = "devices")]
    GetDevices(GetDevicesArgs),

    /// Show central unit identity and installed modules
    Info,

    /// Show raw central unit statistics
    Stats,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Command arguments ────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GetStatesArgs {
    /// Only show devices that are currently on
    #[arg(long)]
    pub only_on: bool,

    /// Number of polling rounds, one second apart
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub delay: u32,
}

#[derive(Debug, Args)]
pub struct SetStateArgs {
    /// Device id, as shown by get_devices
    #[arg(long, short = 'd')]
    pub device_id: DeviceId,

    /// ON, OFF, or a number (percent, minutes, or target temperature)
    #[arg(
        long,
        short = 's',
        required_unless_present_any = ["mode", "fan", "temperature"]
    )]
    pub state: Option<StateValue>,

    /// Thermostat operating mode (one of the modes the device advertises)
    #[arg(long)]
    pub mode: Option<String>,

    /// Thermostat fan speed
    #[arg(long)]
    pub fan: Option<String>,

    /// Thermostat target temperature
    #[arg(long, short = 't')]
    pub temperature: Option<i32>,
}

#[derive(Debug, Args)]
pub struct GetDevicesArgs {
    /// Only list devices of this type (e.g. DIMMER)
    #[arg(long = "type")]
    pub device_type: Option<switchbee_core::DeviceType>,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: Shell,
}
