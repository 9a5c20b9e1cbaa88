// Central unit HTTP client
//
// Wraps `reqwest::Client` with the `/commands` envelope: every call is a
// POST carrying `{command, params, token}` and every answer is a
// `{status, data}` envelope. This module only does transport mechanics
// and status classification; token handling lives in `session`.

use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::{CommandRequest, CommandResponse};
use crate::protocol::{ApiCommand, ApiStatus};
use crate::transport::TransportConfig;

const COMMANDS_PATH: &str = "commands";

/// Raw HTTP client for the central unit's command endpoint.
///
/// Stateless apart from the connection pool: it never holds a token.
/// Use [`Session`](crate::Session) for authenticated calls.
#[derive(Debug, Clone)]
pub struct CentralUnitClient {
    http: reqwest::Client,
    base_url: Url,
    commands_url: Url,
}

impl CentralUnitClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the central unit root, e.g. `https://192.168.1.50`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(http, base_url)
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Result<Self, Error> {
        let commands_url = base_url.join(COMMANDS_PATH)?;
        Ok(Self {
            http,
            base_url,
            commands_url,
        })
    }

    /// Turn a bare host (`192.168.1.50`, `cu.local:8443`) into a base URL.
    ///
    /// Central units only serve HTTPS, so a missing scheme means `https`.
    /// Inputs that already carry a scheme are parsed as-is.
    pub fn host_url(host: &str) -> Result<Url, Error> {
        let host = host.trim().trim_end_matches('/');
        if host.contains("://") {
            Ok(Url::parse(host)?)
        } else {
            Ok(Url::parse(&format!("https://{host}"))?)
        }
    }

    /// The central unit base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send one command and unwrap the envelope, returning `data` on `OK`.
    ///
    /// `params` is never logged: the `LOGIN` params carry the password.
    pub async fn send(
        &self,
        command: ApiCommand,
        params: &Value,
        token: Option<&str>,
    ) -> Result<Value, Error> {
        debug!(%command, "POST {}", self.commands_url);

        let body = CommandRequest {
            command,
            params,
            token,
        };

        let resp = self
            .http
            .post(self.commands_url.clone())
            .json(&body)
            .send()
            .await?;

        self.parse_envelope(command, resp).await
    }

    /// Parse the `{ status, data }` envelope.
    async fn parse_envelope(
        &self,
        command: ApiCommand,
        resp: reqwest::Response,
    ) -> Result<Value, Error> {
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                body: preview(&body).to_owned(),
            });
        }

        let body = resp.text().await?;
        trace!(%command, bytes = body.len(), "response received");

        let envelope: CommandResponse = serde_json::from_str(&body).map_err(|e| {
            Error::Deserialization {
                message: format!("{e} (body preview: {:?})", preview(&body)),
                body: body.clone(),
            }
        })?;

        match ApiStatus::from(envelope.status.as_str()) {
            ApiStatus::Ok => Ok(envelope.data),
            s if s.is_token_rejection() => Err(Error::TokenExpired {
                status: s.to_string(),
            }),
            ApiStatus::LoginFailed => Err(Error::Authentication {
                message: "central unit rejected the credentials".into(),
            }),
            ApiStatus::Offline => Err(Error::DeviceOffline),
            other => Err(Error::CommandFailed {
                status: other.to_string(),
                data: envelope.data,
            }),
        }
    }
}

fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
