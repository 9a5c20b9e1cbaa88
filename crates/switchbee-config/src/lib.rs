//! Shared configuration for SwitchBee tools.
//!
//! TOML profiles, credential resolution (env + plaintext), and translation
//! to `switchbee_core::ControllerConfig`. The CLI layers its global flags
//! on top of a profile before handing it to [`profile_to_controller_config`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use switchbee_core::{ControllerConfig, DeviceType, TlsVerification};

/// Prefix for environment overrides of the config file
/// (`SWITCHBEE_DEFAULTS__TIMEOUT=5`, `SWITCHBEE_PROFILES__HOME__HOST=...`).
pub const ENV_PREFIX: &str = "SWITCHBEE_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no host configured for profile '{profile}'")]
    NoHost { profile: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named central unit profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Active profile name: explicit request, then `default_profile`,
    /// then `"default"`.
    pub fn active_profile_name(&self, requested: Option<&str>) -> String {
        requested
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Verify the central unit certificate against the system store.
    #[serde(default)]
    pub verify_tls: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            verify_tls: false,
        }
    }
}

fn default_timeout() -> u64 {
    10
}

/// A named central unit profile. Every field can also come from a CLI flag.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Central unit address (`192.168.1.50` or a full URL).
    pub host: Option<String>,

    pub username: Option<String>,

    /// Password (plaintext, prefer `password_env`).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Path to a CA certificate for the central unit.
    pub ca_cert: Option<PathBuf>,

    /// Override `defaults.verify_tls`.
    pub verify_tls: Option<bool>,

    /// Override `defaults.timeout`.
    pub timeout: Option<u64>,

    /// Device type codes to load (`["SWITCH", "DIMMER"]`). Empty loads all.
    #[serde(default)]
    pub include: Vec<String>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "switchbee", "switchbee").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("switchbee");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load defaults, then `path` (if it exists), then `SWITCHBEE_` env.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the password: `password_env` lookup, then plaintext.
pub fn resolve_password(
    profile: &Profile,
    profile_name: &str,
) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Parse `include` type codes, case-insensitively.
pub fn parse_include(codes: &[String]) -> Result<Vec<DeviceType>, ConfigError> {
    codes
        .iter()
        .map(|code| {
            code.trim()
                .parse::<DeviceType>()
                .map_err(|_| ConfigError::Validation {
                    field: "include".into(),
                    reason: format!("unknown device type '{code}'"),
                })
        })
        .collect()
}

/// Build a `ControllerConfig` from a profile.
///
/// This is the single boundary where config types cross into core types.
pub fn profile_to_controller_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ControllerConfig, ConfigError> {
    let host_str = profile.host.as_deref().ok_or_else(|| ConfigError::NoHost {
        profile: profile_name.into(),
    })?;
    let host = ControllerConfig::parse_host(host_str).map_err(|_| ConfigError::Validation {
        field: "host".into(),
        reason: format!("invalid address: {host_str}"),
    })?;

    let username = profile
        .username
        .clone()
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;
    let password = resolve_password(profile, profile_name)?;

    let tls = if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else if profile.verify_tls.unwrap_or(defaults.verify_tls) {
        TlsVerification::SystemDefaults
    } else {
        TlsVerification::DangerAcceptInvalid
    };

    let mut config = ControllerConfig::new(host, username, password);
    config.tls = tls;
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.include = parse_include(&profile.include)?;
    Ok(config)
}
