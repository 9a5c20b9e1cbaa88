// ── State synchronization ──
//
// Fetch-and-merge of device states. No background polling: every call
// is one request whose results are merged into the store by device id.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, warn};

use crate::command::decode;
use crate::controller::Controller;
use crate::error::CoreError;
use crate::model::{DeviceId, DeviceState};

/// Per-call outcome of a batch state fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StateReport {
    /// Devices whose state was refreshed, in request order.
    pub updated: Vec<DeviceId>,
    /// Devices left stale: reported with an error, missing from the
    /// response, or undecodable.
    pub failed: Vec<DeviceId>,
}

impl StateReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

impl Controller {
    /// Fetch and store the state of one device.
    pub async fn get_state(&self, id: DeviceId) -> Result<DeviceState, CoreError> {
        let session = self.session().await?;
        let device = self.find_device(id).await?;
        if !device.kind.has_state() {
            return Err(CoreError::InvalidState {
                device: format!("{} ({id})", device.name),
                message: format!("{} devices have no readable state", device.device_type()),
            });
        }

        let raw = session.get_state(id.get()).await?;
        let state = decode(&device.kind, &raw)?;
        self.store().set_state(id, state.clone());
        Ok(state)
    }

    /// Fetch several states in one request and merge them by id.
    ///
    /// Succeeds when at least one device updated; per-device failures are
    /// listed in the report. Fails with `ProtocolError` when none did.
    pub async fn get_multiple_states(&self, ids: &[DeviceId]) -> Result<StateReport, CoreError> {
        let session = self.session().await?;
        if ids.is_empty() {
            return Ok(StateReport::default());
        }

        let snapshot = self.snapshot().await?;
        let mut seen = HashSet::new();
        let requested: Vec<DeviceId> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();
        if let Some(missing) = requested.iter().find(|id| !snapshot.contains(**id)) {
            return Err(CoreError::DeviceNotFound { id: *missing });
        }

        let raw_ids: Vec<u32> = requested.iter().map(|id| id.get()).collect();
        let entries = session.get_multiple_states(&raw_ids).await?;

        let mut decoded: Vec<(DeviceId, DeviceState)> = Vec::with_capacity(requested.len());
        let mut answered = HashSet::new();
        for entry in &entries {
            let id = DeviceId::new(entry.id);
            if !seen.contains(&id) {
                debug!(%id, "ignoring state for device that was not requested");
                continue;
            }
            if !answered.insert(id) {
                continue;
            }
            if let Some(error) = &entry.error {
                warn!(%id, %error, "central unit reported a state error");
                continue;
            }
            let Some(raw) = entry.state.as_ref().filter(|s| !s.is_null()) else {
                warn!(%id, "state missing from response");
                continue;
            };
            let Some(device) = snapshot.device(id) else {
                continue;
            };
            match decode(&device.kind, raw) {
                Ok(state) => decoded.push((id, state)),
                Err(e) => warn!(%id, error = %e, "could not decode state"),
            }
        }

        let ok: HashSet<DeviceId> = decoded.iter().map(|(id, _)| *id).collect();
        let (updated, failed): (Vec<DeviceId>, Vec<DeviceId>) =
            requested.into_iter().partition(|id| ok.contains(id));

        if updated.is_empty() {
            return Err(CoreError::protocol(format!(
                "no state could be read for any of {} requested devices",
                failed.len()
            )));
        }

        self.store().apply_states(&decoded);
        debug!(updated = updated.len(), failed = failed.len(), "states merged");
        Ok(StateReport { updated, failed })
    }

    /// Batch fetch for every pollable device.
    pub async fn refresh_states(&self) -> Result<StateReport, CoreError> {
        let snapshot = self.snapshot().await?;
        let ids: Vec<DeviceId> = snapshot
            .devices()
            .filter(|d| d.is_pollable())
            .map(|d| d.id)
            .collect();
        self.get_multiple_states(&ids).await
    }
}
