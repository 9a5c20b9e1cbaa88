// ── Device domain types ──
//
// `DeviceType` and `HardwareType` are the single definitions of the
// central unit's type and hardware codes; `DeviceKind` is the tagged
// union the rest of the crate dispatches on.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

use super::id::{DeviceId, ZoneId};
use super::state::DeviceState;

/// Item type code (`"type"` in the configuration payload).
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
    EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum DeviceType {
    Dimmer,
    Switch,
    Shutter,
    Scenario,
    Repeater,
    GroupSwitch,
    TwoWay,
    TimedPower,
    Thermostat,
    LockGroup,
    TimedSwitch,
    Somfy,
    IrDevice,
    RollingScenario,
}

impl DeviceType {
    /// Human-readable label.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Dimmer => "Light",
            Self::Switch => "Switch",
            Self::Shutter => "Shutter",
            Self::Scenario => "Scenario",
            Self::Repeater => "Repeater",
            Self::GroupSwitch => "Group Switch",
            Self::TwoWay => "Two Way",
            Self::TimedPower => "Timed Power Switch",
            Self::Thermostat => "Thermostat",
            Self::LockGroup => "Lock Group",
            Self::TimedSwitch => "Timed Switch",
            Self::Somfy => "Somfy",
            Self::IrDevice => "Infra Red Device",
            Self::RollingScenario => "Rolling Scenario",
        }
    }
}

/// Hardware code (`"hw"` in the configuration payload).
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
    EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum HardwareType {
    Virtual,
    DimmableSwitch,
    Shutter,
    TimedPowerSwitch,
    Thermostat,
    Somfy,
    SocketIr,
    // Misspelled on the wire.
    #[serde(rename = "STIKER_SWITCH")]
    #[strum(serialize = "STIKER_SWITCH")]
    StickerSwitch,
    RegularSwitch,
    Repeater,
}

impl HardwareType {
    /// Module name as shown to users.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Virtual => "Virtual",
            Self::DimmableSwitch => "Switch",
            Self::Shutter => "Shutter",
            Self::TimedPowerSwitch => "Timed Power Switch",
            Self::Thermostat => "CoolSwitch",
            Self::Somfy => "Somfy",
            Self::SocketIr => "Socket IR",
            Self::StickerSwitch => "Sticker Switch",
            Self::RegularSwitch => "Regular Switch",
            Self::Repeater => "Repeater",
        }
    }
}

/// Thermostat temperature scale.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

/// The value domain a device variant accepts and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateDomain {
    /// `ON` / `OFF`.
    OnOff,
    /// Integer 0–100.
    Percent,
    /// `OFF`, or on with a minute countdown.
    Timer,
    /// Structured power/mode/fan/temperature object.
    Thermostat,
    /// No readable state; the only command is `ON`.
    Trigger,
    /// Listed for completeness; neither readable nor writable.
    Stateless,
}

/// Behavioral variant of a device, with the variant-specific
/// configuration it carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceKind {
    Switch,
    GroupSwitch,
    TimedSwitch,
    TwoWay,
    Dimmer,
    Shutter,
    TimedPower,
    Thermostat {
        /// Operating modes the unit advertises (e.g. `COOL`, `HEAT`).
        modes: Vec<String>,
        unit: TemperatureUnit,
    },
    Scenario,
    RollingScenario,
    Somfy,
    Repeater,
    LockGroup,
    IrDevice,
}

impl DeviceKind {
    /// Build the variant for a type code. Thermostat settings are ignored
    /// for every other type.
    pub fn new(device_type: DeviceType, modes: Vec<String>, unit: TemperatureUnit) -> Self {
        match device_type {
            DeviceType::Switch => Self::Switch,
            DeviceType::GroupSwitch => Self::GroupSwitch,
            DeviceType::TimedSwitch => Self::TimedSwitch,
            DeviceType::TwoWay => Self::TwoWay,
            DeviceType::Dimmer => Self::Dimmer,
            DeviceType::Shutter => Self::Shutter,
            DeviceType::TimedPower => Self::TimedPower,
            DeviceType::Thermostat => Self::Thermostat { modes, unit },
            DeviceType::Scenario => Self::Scenario,
            DeviceType::RollingScenario => Self::RollingScenario,
            DeviceType::Somfy => Self::Somfy,
            DeviceType::Repeater => Self::Repeater,
            DeviceType::LockGroup => Self::LockGroup,
            DeviceType::IrDevice => Self::IrDevice,
        }
    }

    pub fn device_type(&self) -> DeviceType {
        match self {
            Self::Switch => DeviceType::Switch,
            Self::GroupSwitch => DeviceType::GroupSwitch,
            Self::TimedSwitch => DeviceType::TimedSwitch,
            Self::TwoWay => DeviceType::TwoWay,
            Self::Dimmer => DeviceType::Dimmer,
            Self::Shutter => DeviceType::Shutter,
            Self::TimedPower => DeviceType::TimedPower,
            Self::Thermostat { .. } => DeviceType::Thermostat,
            Self::Scenario => DeviceType::Scenario,
            Self::RollingScenario => DeviceType::RollingScenario,
            Self::Somfy => DeviceType::Somfy,
            Self::Repeater => DeviceType::Repeater,
            Self::LockGroup => DeviceType::LockGroup,
            Self::IrDevice => DeviceType::IrDevice,
        }
    }

    pub fn domain(&self) -> StateDomain {
        match self {
            Self::Switch | Self::GroupSwitch | Self::TimedSwitch | Self::TwoWay => {
                StateDomain::OnOff
            }
            Self::Dimmer | Self::Shutter => StateDomain::Percent,
            Self::TimedPower => StateDomain::Timer,
            Self::Thermostat { .. } => StateDomain::Thermostat,
            Self::Scenario | Self::RollingScenario => StateDomain::Trigger,
            Self::Somfy | Self::Repeater | Self::LockGroup | Self::IrDevice => {
                StateDomain::Stateless
            }
        }
    }

    /// Whether the central unit reports a readable state for this variant.
    pub fn has_state(&self) -> bool {
        matches!(
            self.domain(),
            StateDomain::OnOff | StateDomain::Percent | StateDomain::Timer | StateDomain::Thermostat
        )
    }
}

/// A device channel as loaded from the central unit configuration.
///
/// Replaced wholesale on every configuration refresh; `state` is swapped
/// independently by state fetches and successful commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub kind: DeviceKind,
    pub hardware: HardwareType,
    pub zone_id: ZoneId,
    pub zone_name: String,
    /// Last known state. `None` until first fetched or commanded.
    pub state: Option<DeviceState>,
}

impl Device {
    pub fn device_type(&self) -> DeviceType {
        self.kind.device_type()
    }

    pub fn unit_id(&self) -> u32 {
        self.id.unit_id()
    }

    /// Included in state polls: a readable variant on real hardware.
    pub fn is_pollable(&self) -> bool {
        self.kind.has_state() && self.hardware != HardwareType::Virtual
    }

    /// Whether the last known state counts as "on".
    pub fn is_on(&self) -> bool {
        self.state.as_ref().is_some_and(DeviceState::is_on)
    }

    /// Copy of this device carrying `state`.
    pub fn with_state(&self, state: DeviceState) -> Self {
        Self {
            state: Some(state),
            ..self.clone()
        }
    }
}
