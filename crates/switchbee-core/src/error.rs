// ── Core error types ──
//
// User-facing errors from switchbee-core. Consumers never see HTTP
// status codes or JSON parse failures directly: the
// `From<switchbee_api::Error>` impl folds transport-layer errors into
// the domain taxonomy.

use thiserror::Error;

use crate::model::DeviceId;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    /// Bad credentials, or the token was rejected again right after a
    /// fresh login. Never retried.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Network failure or timeout. Surfaced immediately; callers may retry.
    #[error("Cannot reach central unit: {reason}")]
    Connectivity { reason: String },

    /// Operation attempted before a successful `connect()`.
    #[error("Not connected to a central unit")]
    NotConnected,

    // ── Data errors ──────────────────────────────────────────────────
    /// Unexpected or malformed response shape.
    #[error("Unexpected response from central unit: {message}")]
    Protocol { message: String },

    #[error("Device not found: {id}")]
    DeviceNotFound { id: DeviceId },

    /// Requested value is outside the device variant's legal domain.
    /// Raised before any request is sent.
    #[error("Invalid state for {device}: {message}")]
    InvalidState { device: String, message: String },

    // ── Operation errors ─────────────────────────────────────────────
    /// The central unit answered with a non-OK status.
    #[error("Central unit rejected the request with status {status}")]
    Rejected { status: String },

    #[error("Device is offline")]
    DeviceOffline,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<switchbee_api::Error> for CoreError {
    fn from(err: switchbee_api::Error) -> Self {
        use switchbee_api::Error as Api;

        match err {
            Api::Authentication { message } => CoreError::Authentication { message },
            Api::TokenExpired { status } => CoreError::Authentication {
                message: format!("token rejected ({status})"),
            },
            Api::Transport(ref e) if e.is_timeout() => CoreError::Connectivity {
                reason: format!("request timed out: {e}"),
            },
            Api::Transport(e) => CoreError::Connectivity {
                reason: e.to_string(),
            },
            Api::Tls(msg) => CoreError::Connectivity {
                reason: format!("TLS error: {msg}"),
            },
            Api::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            Api::Http { status, body } => CoreError::Protocol {
                message: format!("HTTP {status}: {body}"),
            },
            Api::Deserialization { message, body: _ } => CoreError::Protocol { message },
            Api::CommandFailed { status, .. } => CoreError::Rejected { status },
            Api::DeviceOffline => CoreError::DeviceOffline,
        }
    }
}
