use serde::{Deserialize, Serialize};

use super::id::{DeviceId, ZoneId};

/// A named group of devices, usually a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    /// Devices in configuration order. Every id resolves in the same
    /// snapshot.
    pub devices: Vec<DeviceId>,
}
