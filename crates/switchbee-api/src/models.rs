// Raw wire types for the central unit's command endpoint.
//
// These mirror the JSON exactly and stay loosely typed where firmware
// versions disagree; `switchbee-core` normalizes them into the domain model.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::protocol::{ApiCommand, Directive};

/// Request envelope: `{"command": ..., "params": ..., "token": ...}`.
#[derive(Debug, Serialize)]
pub struct CommandRequest<'a> {
    pub command: ApiCommand,
    pub params: &'a Value,
    pub token: Option<&'a str>,
}

/// Response envelope: `{"status": "OK", "data": ...}`.
#[derive(Debug, Deserialize)]
pub struct CommandResponse {
    pub status: String,
    #[serde(default)]
    pub data: Value,
}

/// `data` of a successful `LOGIN`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginData {
    pub token: String,
    /// Server-side expiry in epoch millis. Not trusted (clock skew);
    /// the session tracks its own deadline.
    #[serde(default)]
    pub expiration: Option<i64>,
}

/// `data` of a successful `GET_CONFIGURATION`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConfigurationData {
    pub name: String,
    pub version: String,
    pub mac: String,
    #[serde(rename = "lastConfChange", default)]
    pub last_conf_change: i64,
    #[serde(default)]
    pub zones: Vec<RawZone>,
}

/// A zone as reported by `GET_CONFIGURATION`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawZone {
    /// Absent on current firmware; callers fall back to the zone's position.
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub items: Vec<RawItem>,
}

/// An item (device channel) inside a zone.
///
/// Every field is optional so one malformed item can be skipped without
/// rejecting the whole configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawItem {
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub item_type: Option<String>,
    #[serde(rename = "hw", default)]
    pub hardware: Option<String>,
    /// Thermostat only: supported operating modes.
    #[serde(default)]
    pub modes: Option<Vec<String>>,
    /// Thermostat only: `CELSIUS` or `FAHRENHEIT`.
    #[serde(rename = "temperatureUnits", default)]
    pub temperature_units: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// One entry of a `GET_MULTIPLE_STATES` response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawStateEntry {
    pub id: u32,
    #[serde(default)]
    pub state: Option<Value>,
    /// Set by the central unit when it could not read this device.
    #[serde(default)]
    pub error: Option<Value>,
}

/// `params` of an `OPERATE` command.
#[derive(Debug, Clone, Serialize)]
pub struct OperateParams {
    pub directive: Directive,
    #[serde(rename = "itemId")]
    pub item_id: u32,
    pub value: Value,
}

/// Identity of the central unit, recorded from the configuration payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CentralUnitInfo {
    pub name: String,
    pub mac: String,
    pub version: String,
    pub last_conf_change: i64,
}

impl From<&ConfigurationData> for CentralUnitInfo {
    fn from(conf: &ConfigurationData) -> Self {
        Self {
            name: conf.name.clone(),
            mac: conf.mac.clone(),
            version: conf.version.clone(),
            last_conf_change: conf.last_conf_change,
        }
    }
}
