// ── Device state types ──

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

/// The `ON` / `OFF` token used in both state payloads and commands.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    IntoStaticStr,
    EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Power {
    On,
    Off,
}

impl Power {
    pub fn is_on(self) -> bool {
        self == Self::On
    }
}

/// Thermostat readings and settings.
///
/// Only `power` is guaranteed; older firmware omits the rest when the
/// unit is off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermostatState {
    pub power: Power,
    pub mode: Option<String>,
    pub fan: Option<String>,
    pub target_temperature: Option<i32>,
    pub room_temperature: Option<f64>,
}

/// Last known state of a device, shaped by its variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeviceState {
    OnOff { power: Power },
    Percent { value: u8 },
    /// `minutes_left` is `None` when the unit reported a bare `ON`.
    Timer {
        power: Power,
        minutes_left: Option<u32>,
    },
    Thermostat(ThermostatState),
}

impl DeviceState {
    pub fn is_on(&self) -> bool {
        match self {
            Self::OnOff { power } | Self::Timer { power, .. } => power.is_on(),
            Self::Percent { value } => *value > 0,
            Self::Thermostat(t) => t.power.is_on(),
        }
    }
}

impl std::fmt::Display for DeviceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OnOff { power } => write!(f, "{power}"),
            Self::Percent { value } => write!(f, "{value}%"),
            Self::Timer {
                power: Power::On,
                minutes_left: Some(m),
            } => write!(f, "ON ({m} min left)"),
            Self::Timer { power, .. } => write!(f, "{power}"),
            Self::Thermostat(t) => {
                write!(f, "{}", t.power)?;
                if let Some(mode) = &t.mode {
                    write!(f, " {mode}")?;
                }
                if let Some(target) = t.target_temperature {
                    write!(f, " target {target}")?;
                }
                if let Some(room) = t.room_temperature {
                    write!(f, " room {room}")?;
                }
                Ok(())
            }
        }
    }
}
