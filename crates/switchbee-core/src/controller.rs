// ── Controller facade ──
//
// Single entry point for application code: owns the session, the device
// store and the connection config. Every operation except `connect`
// requires a live session and fails with `NotConnected` otherwise.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info};

use switchbee_api::{CentralUnitClient, CentralUnitInfo, Session};

use crate::command::{StateValue, encode};
use crate::config::ControllerConfig;
use crate::convert::{LoadReport, load_configuration};
use crate::error::CoreError;
use crate::model::{Device, DeviceId, Zone};
use crate::store::{DeviceStore, Snapshot};

// ── Controller ───────────────────────────────────────────────────

/// Client facade for one central unit.
///
/// Cheaply cloneable via `Arc<ControllerInner>`; clones share the session
/// and the device store.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    store: DeviceStore,
    session: Mutex<Option<Arc<Session>>>,
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("host", &self.inner.config.host.as_str())
            .field("username", &self.inner.config.username)
            .finish_non_exhaustive()
    }
}

impl Controller {
    /// Create a controller. Does NOT connect; call
    /// [`connect()`](Self::connect) first.
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                config,
                store: DeviceStore::new(),
                session: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    /// The shared device store.
    pub fn store(&self) -> &DeviceStore {
        &self.inner.store
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Log in and load the configuration.
    ///
    /// Idempotent: connecting again replaces the session with a fresh
    /// login and reloads the configuration. On failure the controller is
    /// left disconnected.
    pub async fn connect(&self) -> Result<(), CoreError> {
        let config = &self.inner.config;
        info!(host = %config.host, "connecting to central unit");

        let client = CentralUnitClient::new(config.host.clone(), &config.transport())?;
        let session = Arc::new(
            Session::new(client, config.username.clone(), config.password.clone())
                .with_token_lifetime(config.token_lifetime),
        );
        if let Err(e) = session.login().await {
            self.disconnect().await;
            return Err(e.into());
        }

        *self.inner.session.lock().await = Some(Arc::clone(&session));

        match self.load(&session).await {
            Ok(report) => {
                if let Some(cu) = session.central_unit() {
                    info!(
                        name = %cu.name,
                        version = %cu.version,
                        devices = report.loaded,
                        "connected"
                    );
                }
                Ok(())
            }
            Err(e) => {
                self.disconnect().await;
                Err(e)
            }
        }
    }

    /// Drop the session and the device model. Idempotent.
    pub async fn disconnect(&self) {
        if let Some(session) = self.inner.session.lock().await.take() {
            session.disconnect().await;
        }
        self.inner.store.clear();
        debug!("disconnected");
    }

    pub async fn is_connected(&self) -> bool {
        self.inner.session.lock().await.is_some()
    }

    /// Re-fetch the configuration and swap the device model atomically.
    pub async fn refresh_configuration(&self) -> Result<LoadReport, CoreError> {
        let session = self.session().await?;
        self.load(&session).await
    }

    async fn load(&self, session: &Session) -> Result<LoadReport, CoreError> {
        let conf = session.get_configuration().await?;
        let (snapshot, report) = load_configuration(&conf, &self.inner.config.include);
        self.inner.store.replace(snapshot);
        Ok(report)
    }

    pub(crate) async fn session(&self) -> Result<Arc<Session>, CoreError> {
        self.inner
            .session
            .lock()
            .await
            .clone()
            .ok_or(CoreError::NotConnected)
    }

    // ── One-shot convenience ─────────────────────────────────────

    /// One-shot: connect, run closure, disconnect.
    pub async fn oneshot<F, Fut, T>(config: ControllerConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let controller = Controller::new(config);
        controller.connect().await?;
        let result = f(controller.clone()).await;
        controller.disconnect().await;
        result
    }

    // ── Device model accessors ───────────────────────────────────

    /// Current snapshot, loading the configuration if none is cached.
    pub async fn snapshot(&self) -> Result<Arc<Snapshot>, CoreError> {
        let session = self.session().await?;
        if let Some(snapshot) = self.inner.store.snapshot() {
            return Ok(snapshot);
        }
        self.load(&session).await?;
        self.inner
            .store
            .snapshot()
            .ok_or_else(|| CoreError::protocol("configuration did not load"))
    }

    /// All devices with their last known state.
    pub async fn devices(&self) -> Result<Vec<Arc<Device>>, CoreError> {
        Ok(self.snapshot().await?.devices().cloned().collect())
    }

    pub async fn zones(&self) -> Result<Vec<Zone>, CoreError> {
        Ok(self.snapshot().await?.zones().cloned().collect())
    }

    pub async fn find_device(&self, id: DeviceId) -> Result<Arc<Device>, CoreError> {
        self.snapshot()
            .await?
            .device(id)
            .cloned()
            .ok_or(CoreError::DeviceNotFound { id })
    }

    /// Identity of the central unit, recorded during the last
    /// configuration load.
    pub async fn central_unit(&self) -> Result<Arc<CentralUnitInfo>, CoreError> {
        self.session()
            .await?
            .central_unit()
            .ok_or_else(|| CoreError::protocol("central unit identity not loaded"))
    }

    /// Logins performed after the first one.
    pub async fn reconnect_count(&self) -> Result<u64, CoreError> {
        Ok(self.session().await?.reconnect_count())
    }

    /// Raw central unit statistics.
    pub async fn get_stats(&self) -> Result<Value, CoreError> {
        Ok(self.session().await?.get_stats().await?)
    }

    // ── Commands ─────────────────────────────────────────────────

    /// Validate, encode and send a state change.
    ///
    /// Invalid values are rejected before any request. On success the
    /// device model records the requested state without re-polling; on
    /// failure it keeps the last confirmed state.
    ///
    /// A partial thermostat setting is merged into the last known
    /// thermostat state. If none is known and the setting carries no
    /// power, the command is sent but nothing is recorded until the next
    /// poll (`get_state` or `refresh_states`).
    pub async fn set_state(&self, id: DeviceId, requested: &StateValue) -> Result<(), CoreError> {
        let session = self.session().await?;
        let device = self.find_device(id).await?;
        let encoded = encode(&device, requested)?;

        debug!(%id, value = %encoded.value, "sending state command");
        session.operate(id.get(), encoded.value).await?;

        if let Some(state) = encoded.optimistic {
            self.inner.store.set_state(id, state);
        }
        info!(%id, name = %device.name, %requested, "state set");
        Ok(())
    }
}
