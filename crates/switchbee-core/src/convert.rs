// ── Configuration-to-model conversion ──
//
// Turns the raw `GET_CONFIGURATION` payload into a `Snapshot`. Items the
// client cannot model (unknown codes, missing fields, virtual group
// switches) are skipped and counted, never fatal: firmware updates add
// hardware this client does not know yet.

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::Serialize;
use tracing::{debug, warn};

use switchbee_api::{ConfigurationData, RawItem, RawZone};

use crate::model::{
    Device, DeviceId, DeviceKind, DeviceType, HardwareType, TemperatureUnit, Zone, ZoneId,
};
use crate::store::Snapshot;

const UNKNOWN_NAME: &str = "Unknown";

/// Outcome counters of one configuration load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub loaded: usize,
    /// Type or hardware code this client does not know.
    pub skipped_unknown: usize,
    /// Missing id, type or hardware, or a duplicate id.
    pub skipped_invalid: usize,
    /// Excluded by the include filter, or a virtual group switch.
    pub skipped_filtered: usize,
}

enum Skip {
    Unknown,
    Invalid,
    Filtered,
}

/// Build a snapshot from a configuration payload.
///
/// `include` restricts the device types kept; an empty slice keeps all.
pub fn load_configuration(
    conf: &ConfigurationData,
    include: &[DeviceType],
) -> (Snapshot, LoadReport) {
    let mut report = LoadReport::default();
    let mut devices: IndexMap<DeviceId, Arc<Device>> = IndexMap::new();
    let mut zones: IndexMap<ZoneId, Zone> = IndexMap::new();
    let mut zone_ids = ZoneIds::new(&conf.zones);

    for (index, raw_zone) in conf.zones.iter().enumerate() {
        let zone_id = zone_ids.assign(raw_zone, index);

        let zone = match zones.entry(zone_id) {
            Entry::Occupied(_) => {
                warn!(
                    zone = %zone_id,
                    name = %raw_zone.name,
                    "duplicate zone id, skipping its items"
                );
                report.skipped_invalid += raw_zone.items.len();
                continue;
            }
            Entry::Vacant(slot) => slot.insert(Zone {
                id: zone_id,
                name: raw_zone.name.clone(),
                devices: Vec::new(),
            }),
        };

        for item in &raw_zone.items {
            match convert_item(item, zone_id, &raw_zone.name, include) {
                Ok(device) => {
                    if devices.contains_key(&device.id) {
                        warn!(
                            id = %device.id,
                            name = %device.name,
                            "duplicate device id, skipping"
                        );
                        report.skipped_invalid += 1;
                        continue;
                    }
                    zone.devices.push(device.id);
                    devices.insert(device.id, Arc::new(device));
                    report.loaded += 1;
                }
                Err(Skip::Unknown) => report.skipped_unknown += 1,
                Err(Skip::Invalid) => report.skipped_invalid += 1,
                Err(Skip::Filtered) => report.skipped_filtered += 1,
            }
        }
    }

    if report.skipped_unknown > 0 {
        warn!(count = report.skipped_unknown, "skipped items with unsupported type or hardware");
    }
    debug!(?report, zones = zones.len(), "configuration loaded");

    (Snapshot::new(devices, zones), report)
}

/// Zone id allocation. Wire ids are reserved up front; a zone without
/// one takes the first free id at or after its position.
struct ZoneIds {
    taken: HashSet<u32>,
}

impl ZoneIds {
    fn new(zones: &[RawZone]) -> Self {
        Self {
            taken: zones.iter().filter_map(|z| z.id).collect(),
        }
    }

    fn assign(&mut self, zone: &RawZone, index: usize) -> ZoneId {
        if let Some(id) = zone.id {
            return ZoneId::new(id);
        }
        let mut candidate = u32::try_from(index).unwrap_or(u32::MAX);
        while self.taken.contains(&candidate) {
            candidate = candidate.saturating_add(1);
        }
        self.taken.insert(candidate);
        ZoneId::new(candidate)
    }
}

fn convert_item(
    item: &RawItem,
    zone_id: ZoneId,
    zone_name: &str,
    include: &[DeviceType],
) -> Result<Device, Skip> {
    let label = item.name.as_deref().unwrap_or(UNKNOWN_NAME);

    let Some(type_code) = item.item_type.as_deref() else {
        warn!(name = label, "item missing type, skipping");
        return Err(Skip::Invalid);
    };
    let Ok(device_type) = DeviceType::from_str(type_code) else {
        warn!(name = label, type_code, "unknown device type, skipping");
        return Err(Skip::Unknown);
    };

    if !include.is_empty() && !include.contains(&device_type) {
        debug!(name = label, %device_type, "excluded by include filter");
        return Err(Skip::Filtered);
    }

    let Some(hw_code) = item.hardware.as_deref() else {
        warn!(name = label, "item missing hardware, skipping");
        return Err(Skip::Invalid);
    };
    let Ok(hardware) = HardwareType::from_str(hw_code) else {
        warn!(name = label, hw_code, "unknown hardware type, skipping");
        return Err(Skip::Unknown);
    };

    let Some(id) = item.id else {
        warn!(name = label, "item missing id, skipping");
        return Err(Skip::Invalid);
    };

    // Virtual group switches never report a state.
    if device_type == DeviceType::GroupSwitch && hardware == HardwareType::Virtual {
        debug!(id, name = label, "skipping virtual group switch");
        return Err(Skip::Filtered);
    }

    let unit = item
        .temperature_units
        .as_deref()
        .and_then(|u| TemperatureUnit::from_str(u).ok())
        .unwrap_or_default();
    let modes = item.modes.clone().unwrap_or_default();

    Ok(Device {
        id: DeviceId::new(id),
        name: label.to_owned(),
        kind: DeviceKind::new(device_type, modes, unit),
        hardware,
        zone_id,
        zone_name: zone_name.to_owned(),
        state: None,
    })
}
