// Session management
//
// Owns the central unit credentials and the current token. Every
// authenticated command goes through `Session::call`, which attaches the
// token, logs in first when there is none (or the local deadline has
// passed), and absorbs exactly one token rejection by logging in again
// and retrying the original command once.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use arc_swap::ArcSwapOption;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::client::CentralUnitClient;
use crate::error::Error;
use crate::models::{CentralUnitInfo, LoginData};
use crate::protocol::ApiCommand;

/// Tokens are treated as stale this long after login, regardless of the
/// expiry the central unit reports.
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(55 * 60);

#[derive(Debug, Default)]
struct TokenState {
    token: Option<String>,
    deadline: Option<Instant>,
}

impl TokenState {
    /// The token, if present and not past the local deadline.
    fn current(&self) -> Option<&str> {
        match (&self.token, self.deadline) {
            (Some(token), Some(deadline)) if Instant::now() < deadline => Some(token),
            _ => None,
        }
    }

    fn clear(&mut self) {
        self.token = None;
        self.deadline = None;
    }
}

/// Authenticated session against one central unit.
///
/// The token is private state with a single mutation point
/// ([`refresh_token`](Self::refresh_token)); callers only ever see it
/// attached to outgoing requests.
pub struct Session {
    client: CentralUnitClient,
    username: String,
    password: SecretString,
    token_lifetime: Duration,
    token: RwLock<TokenState>,
    identity: ArcSwapOption<CentralUnitInfo>,
    logins: AtomicU64,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.client.base_url().as_str())
            .field("username", &self.username)
            .field("logins", &self.logins.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(client: CentralUnitClient, username: String, password: SecretString) -> Self {
        Self {
            client,
            username,
            password,
            token_lifetime: DEFAULT_TOKEN_LIFETIME,
            token: RwLock::new(TokenState::default()),
            identity: ArcSwapOption::empty(),
            logins: AtomicU64::new(0),
        }
    }

    /// Override how long a token is trusted after login.
    pub fn with_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.token_lifetime = lifetime;
        self
    }

    /// The underlying transport client.
    pub fn client(&self) -> &CentralUnitClient {
        &self.client
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Log in unconditionally, replacing any current token.
    pub async fn login(&self) -> Result<(), Error> {
        let mut state = self.token.write().await;
        self.login_locked(&mut state).await.map(|_| ())
    }

    /// Forget the token and the recorded identity. Idempotent.
    ///
    /// The central unit has no logout command; the token simply ages out
    /// on the controller side.
    pub async fn disconnect(&self) {
        self.token.write().await.clear();
        self.identity.store(None);
        debug!("session cleared");
    }

    /// Whether a token is currently held and within its local deadline.
    pub async fn is_logged_in(&self) -> bool {
        self.token.read().await.current().is_some()
    }

    /// Number of logins after the first one.
    pub fn reconnect_count(&self) -> u64 {
        self.logins.load(Ordering::Relaxed).saturating_sub(1)
    }

    /// Central unit identity, available after a configuration fetch.
    pub fn central_unit(&self) -> Option<Arc<CentralUnitInfo>> {
        self.identity.load_full()
    }

    pub(crate) fn set_central_unit(&self, info: CentralUnitInfo) {
        self.identity.store(Some(Arc::new(info)));
    }

    // ── Guarded call path ────────────────────────────────────────────

    /// Send an authenticated command.
    ///
    /// On a token rejection the session logs in again and retries the
    /// command once. A second rejection surfaces as
    /// [`Error::Authentication`]; nothing else is retried.
    pub async fn call(&self, command: ApiCommand, params: Value) -> Result<Value, Error> {
        let token = self.token().await?;

        match self.client.send(command, &params, Some(&token)).await {
            Err(e) if e.is_auth_expired() => {
                warn!(%command, error = %e, "token rejected, logging in again");
                let fresh = self.refresh_token(Some(&token)).await?;
                self.client
                    .send(command, &params, Some(&fresh))
                    .await
                    .map_err(|e| {
                        if e.is_auth_expired() {
                            Error::Authentication {
                                message: format!(
                                    "token rejected again after re-login ({e})"
                                ),
                            }
                        } else {
                            e
                        }
                    })
            }
            other => other,
        }
    }

    /// Current token, logging in first if there is none or it aged out.
    async fn token(&self) -> Result<String, Error> {
        if let Some(token) = self.token.read().await.current() {
            return Ok(token.to_owned());
        }
        self.refresh_token(None).await
    }

    /// The single mutation point for the token.
    ///
    /// `stale` is the token the caller saw rejected. If another task has
    /// already replaced it, the replacement is returned without a new login.
    async fn refresh_token(&self, stale: Option<&str>) -> Result<String, Error> {
        let mut state = self.token.write().await;
        if let Some(current) = state.current() {
            if stale != Some(current) {
                debug!("token already refreshed by a concurrent call");
                return Ok(current.to_owned());
            }
        }
        self.login_locked(&mut state).await
    }

    async fn login_locked(&self, state: &mut TokenState) -> Result<String, Error> {
        debug!(username = %self.username, "logging in to central unit");

        let params = json!({
            "username": self.username,
            "password": self.password.expose_secret(),
        });

        let data = match self.client.send(ApiCommand::Login, &params, None).await {
            Ok(data) => data,
            Err(e) => {
                state.clear();
                return Err(match e {
                    Error::TokenExpired { status } | Error::CommandFailed { status, .. } => {
                        Error::Authentication {
                            message: format!("login rejected with status {status}"),
                        }
                    }
                    other => other,
                });
            }
        };

        let login: LoginData = match serde_json::from_value(data.clone()) {
            Ok(login) => login,
            Err(e) => {
                state.clear();
                return Err(Error::Deserialization {
                    message: format!("invalid LOGIN payload: {e}"),
                    body: data.to_string(),
                });
            }
        };

        state.token = Some(login.token.clone());
        state.deadline = Some(Instant::now() + self.token_lifetime);

        let count = self.logins.fetch_add(1, Ordering::Relaxed);
        if count == 0 {
            info!("logged in to central unit");
        } else {
            info!(reconnects = count, "logged in to central unit again");
        }
        Ok(login.token)
    }
}
