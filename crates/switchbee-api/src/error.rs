use thiserror::Error;

/// Top-level error type for the `switchbee-api` crate.
///
/// Covers every failure mode of the `/commands` endpoint: authentication,
/// transport, envelope status, and payload decoding. `switchbee-core` maps
/// these into the domain error taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected (wrong credentials, account locked, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The central unit reported the token as invalid or expired.
    #[error("Token rejected by central unit ({status})")]
    TokenExpired { status: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Non-2xx HTTP status from the `/commands` endpoint.
    #[error("Unexpected HTTP status {status}: {body}")]
    Http { status: u16, body: String },

    // ── Envelope ────────────────────────────────────────────────────
    /// The central unit answered with a non-`OK` status.
    #[error("Central unit replied with status {status}")]
    CommandFailed { status: String, data: serde_json::Value },

    /// The central unit reported the addressed device as offline.
    #[error("Device is offline")]
    DeviceOffline,

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the token was rejected and a fresh login
    /// might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::TokenExpired { .. })
    }

    /// Returns `true` for network-level failures (timeouts, refused
    /// connections, TLS) as opposed to protocol or auth failures.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Tls(_))
    }

    /// Returns `true` if the failure came from a request timing out.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout(),
            _ => false,
        }
    }
}
