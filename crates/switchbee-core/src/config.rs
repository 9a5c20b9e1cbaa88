// ── Runtime connection configuration ──
//
// Describes *how* to reach a central unit. Carries credentials and
// connection tuning but never touches disk: the CLI builds a
// `ControllerConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use switchbee_api::{CentralUnitClient, DEFAULT_TOKEN_LIFETIME, TlsMode, TransportConfig};

use crate::error::CoreError;
use crate::model::DeviceType;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification. Central units ship self-signed certificates.
    #[default]
    DangerAcceptInvalid,
}

impl From<&TlsVerification> for TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        }
    }
}

/// Configuration for connecting to a single central unit.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Central unit base URL (e.g. `https://192.168.1.50`).
    pub host: Url,
    pub username: String,
    pub password: SecretString,
    pub tls: TlsVerification,
    /// Per-request timeout. Expiry surfaces as `CoreError::Connectivity`.
    pub timeout: Duration,
    /// How long a token is trusted after login before logging in again.
    pub token_lifetime: Duration,
    /// Device types to keep when loading the configuration. Empty keeps all.
    pub include: Vec<DeviceType>,
}

impl ControllerConfig {
    pub fn new(host: Url, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            host,
            username: username.into(),
            password,
            tls: TlsVerification::default(),
            timeout: DEFAULT_TIMEOUT,
            token_lifetime: DEFAULT_TOKEN_LIFETIME,
            include: Vec::new(),
        }
    }

    /// Parse a host as given on the command line or in a profile.
    ///
    /// A bare address (`192.168.1.50`) becomes `https://192.168.1.50`.
    pub fn parse_host(host: &str) -> Result<Url, CoreError> {
        Ok(CentralUnitClient::host_url(host)?)
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: TlsMode::from(&self.tls),
            timeout: self.timeout,
        }
    }
}
