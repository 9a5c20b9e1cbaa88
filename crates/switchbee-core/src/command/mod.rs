// ── State commands ──
//
// `StateValue` is what callers ask for; `codec` checks it against the
// device variant, produces the wire value for `OPERATE`, and decodes the
// state payloads the central unit reports back.

pub mod codec;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Power;

pub use codec::{EncodedCommand, decode, encode};

/// A requested state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateValue {
    On,
    Off,
    /// Brightness or position, 0–100.
    Percent(u8),
    /// Timed-power countdown, in minutes.
    Minutes(u32),
    /// Bare integer from text input. Read as a percentage, a minute
    /// count, or a target temperature depending on the device.
    Number(u32),
    Thermostat(ThermostatSetting),
}

/// Partial thermostat update. Absent fields are left to the unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThermostatSetting {
    pub power: Option<Power>,
    pub mode: Option<String>,
    pub fan: Option<String>,
    pub target_temperature: Option<i32>,
}

impl ThermostatSetting {
    pub fn is_empty(&self) -> bool {
        self.power.is_none()
            && self.mode.is_none()
            && self.fan.is_none()
            && self.target_temperature.is_none()
    }
}

#[derive(Debug, Error)]
#[error("invalid state '{0}': expected ON, OFF or a number")]
pub struct ParseStateError(String);

impl FromStr for StateValue {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(power) = Power::from_str(trimmed) {
            return Ok(power.into());
        }
        trimmed
            .parse::<u32>()
            .map(Self::Number)
            .map_err(|_| ParseStateError(s.to_owned()))
    }
}

impl From<Power> for StateValue {
    fn from(power: Power) -> Self {
        match power {
            Power::On => Self::On,
            Power::Off => Self::Off,
        }
    }
}

impl fmt::Display for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => f.write_str("ON"),
            Self::Off => f.write_str("OFF"),
            Self::Percent(p) => write!(f, "{p}%"),
            Self::Minutes(m) => write!(f, "{m} min"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Thermostat(t) => {
                let parts: Vec<String> = [
                    t.power.map(|p| p.to_string()),
                    t.mode.clone(),
                    t.fan.as_ref().map(|fan| format!("fan {fan}")),
                    t.target_temperature.map(|c| format!("target {c}")),
                ]
                .into_iter()
                .flatten()
                .collect();
                f.write_str(&parts.join(" "))
            }
        }
    }
}
