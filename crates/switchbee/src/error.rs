//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a stable exit code per kind.

use miette::Diagnostic;
use thiserror::Error;

use switchbee_config::ConfigError;
use switchbee_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the central unit: {reason}")]
    #[diagnostic(
        code(switchbee::connection_failed),
        help(
            "Check that the central unit is powered and on this network.\n\
             Slow links may need a longer --timeout."
        )
    )]
    ConnectionFailed { reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(switchbee::auth_failed),
        help("Check the user name and password (--username / --password).")
    )]
    AuthFailed { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(switchbee::no_credentials),
        help(
            "Pass --username and --password, set SWITCHBEE_USERNAME and\n\
             SWITCHBEE_PASSWORD, or add them to the profile in {path}"
        )
    )]
    NoCredentials { profile: String, path: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("No central unit address configured for profile '{profile}'")]
    #[diagnostic(
        code(switchbee::no_host),
        help("Pass --host (-i), set SWITCHBEE_HOST, or add `host` to the profile in {path}")
    )]
    NoHost { profile: String, path: String },

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(code(switchbee::profile_not_found), help("Available profiles: {available}"))]
    ProfileNotFound { name: String, available: String },

    #[error("Could not load configuration: {message}")]
    #[diagnostic(code(switchbee::config))]
    Config { message: String },

    // ── Devices ──────────────────────────────────────────────────────
    #[error("Device {id} not found")]
    #[diagnostic(
        code(switchbee::not_found),
        help("Run: switchbee get_devices to see available devices")
    )]
    DeviceNotFound { id: String },

    #[error("Invalid state for {device}: {reason}")]
    #[diagnostic(code(switchbee::invalid_state))]
    InvalidState { device: String, reason: String },

    #[error("Device is offline")]
    #[diagnostic(
        code(switchbee::device_offline),
        help("The central unit cannot reach this device's module.")
    )]
    DeviceOffline,

    // ── Central unit ─────────────────────────────────────────────────
    #[error("Central unit rejected the command ({status})")]
    #[diagnostic(code(switchbee::rejected))]
    Rejected { status: String },

    #[error("Unexpected response from the central unit: {message}")]
    #[diagnostic(code(switchbee::protocol))]
    Protocol { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(switchbee::validation))]
    Validation { field: String, reason: String },

    // ── Serialization ────────────────────────────────────────────────
    #[error("Could not render JSON output: {0}")]
    #[diagnostic(code(switchbee::json))]
    Json(#[from] serde_json::Error),

    #[error("Could not render YAML output: {0}")]
    #[diagnostic(code(switchbee::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::DeviceNotFound { .. } => exit_code::NOT_FOUND,
            Self::InvalidState { .. }
            | Self::Validation { .. }
            | Self::NoHost { .. }
            | Self::ProfileNotFound { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Authentication { message } => CliError::AuthFailed { message },

            CoreError::Connectivity { reason } => CliError::ConnectionFailed { reason },

            CoreError::NotConnected => CliError::ConnectionFailed {
                reason: "not connected".into(),
            },

            CoreError::Protocol { message } => CliError::Protocol { message },

            CoreError::DeviceNotFound { id } => CliError::DeviceNotFound { id: id.to_string() },

            CoreError::InvalidState { device, message } => CliError::InvalidState {
                device,
                reason: message,
            },

            CoreError::Rejected { status } => CliError::Rejected { status },

            CoreError::DeviceOffline => CliError::DeviceOffline,

            CoreError::Config { message } => CliError::Validation {
                field: "host".into(),
                reason: message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        let path = switchbee_config::config_path().display().to_string();
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoHost { profile } => CliError::NoHost { profile, path },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile, path },
            ConfigError::Figment(e) => CliError::Config {
                message: e.to_string(),
            },
        }
    }
}
