// ── Immutable configuration snapshot ──
//
// One consistent view of zones and devices. Built once per configuration
// load and never mutated; state updates produce a new snapshot that
// shares every untouched `Arc<Device>`.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::model::{Device, DeviceId, Zone, ZoneId};

/// Zones and devices from one configuration load.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    devices: IndexMap<DeviceId, Arc<Device>>,
    zones: IndexMap<ZoneId, Zone>,
}

impl Snapshot {
    pub(crate) fn new(
        devices: IndexMap<DeviceId, Arc<Device>>,
        zones: IndexMap<ZoneId, Zone>,
    ) -> Self {
        Self { devices, zones }
    }

    /// All devices, in configuration order.
    pub fn devices(&self) -> impl Iterator<Item = &Arc<Device>> {
        self.devices.values()
    }

    pub fn device(&self, id: DeviceId) -> Option<&Arc<Device>> {
        self.devices.get(&id)
    }

    pub fn contains(&self, id: DeviceId) -> bool {
        self.devices.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// All zones, in configuration order.
    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.values()
    }

    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.get(&id)
    }

    /// Devices of one zone, or `None` if the zone is unknown.
    pub fn devices_in_zone(&self, id: ZoneId) -> Option<Vec<Arc<Device>>> {
        let zone = self.zones.get(&id)?;
        Some(
            zone.devices
                .iter()
                .filter_map(|device_id| self.devices.get(device_id).cloned())
                .collect(),
        )
    }

    /// Hardware modules keyed by unit id, each with the display names of
    /// the hardware found on it.
    pub fn modules(&self) -> BTreeMap<u32, BTreeSet<&'static str>> {
        let mut modules: BTreeMap<u32, BTreeSet<&'static str>> = BTreeMap::new();
        for device in self.devices.values() {
            modules
                .entry(device.unit_id())
                .or_default()
                .insert(device.hardware.display_name());
        }
        modules
    }

    /// Human-readable description of a module, e.g. `"Switch and Shutter"`.
    pub fn module_display(&self, unit_id: u32) -> Option<String> {
        let modules = self.modules();
        let names = modules.get(&unit_id)?;
        Some(names.iter().copied().collect::<Vec<_>>().join(" and "))
    }

    // ── Copy-on-write helpers ────────────────────────────────────────

    /// Copy with the given states applied. Ids not in the snapshot are
    /// ignored. Returns the copy and how many devices changed.
    pub(crate) fn with_states<'a, I>(&self, updates: I) -> (Self, usize)
    where
        I: IntoIterator<Item = (DeviceId, &'a crate::model::DeviceState)>,
    {
        let mut next = self.clone();
        let mut applied = 0;
        for (id, state) in updates {
            if let Some(slot) = next.devices.get_mut(&id) {
                *slot = Arc::new(slot.with_state(state.clone()));
                applied += 1;
            }
        }
        (next, applied)
    }

    /// Copy of `self` where devices without a state inherit the state of
    /// the same id in `previous`, provided the device type is unchanged.
    pub(crate) fn inherit_states(&self, previous: &Self) -> Self {
        let mut next = self.clone();
        for (id, slot) in &mut next.devices {
            if slot.state.is_some() {
                continue;
            }
            let Some(old) = previous.devices.get(id) else {
                continue;
            };
            if old.device_type() != slot.device_type() {
                continue;
            }
            if let Some(state) = &old.state {
                *slot = Arc::new(slot.with_state(state.clone()));
            }
        }
        next
    }
}
