// ── Domain model ──
//
// Canonical types built from the central unit configuration.

pub mod device;
pub mod id;
pub mod state;
pub mod zone;

pub use device::{Device, DeviceKind, DeviceType, HardwareType, StateDomain, TemperatureUnit};
pub use id::{DeviceId, ZoneId};
pub use state::{DeviceState, Power, ThermostatState};
pub use zone::Zone;
