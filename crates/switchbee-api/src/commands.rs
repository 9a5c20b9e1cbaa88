// Central unit command endpoints
//
// Typed wrappers over `Session::call` for each command the central unit
// understands. Payloads that vary per device type (states, operate
// values) stay as raw JSON; `switchbee-core` owns their interpretation.

use serde_json::{Value, json};
use tracing::debug;

use crate::error::Error;
use crate::models::{CentralUnitInfo, ConfigurationData, OperateParams, RawStateEntry};
use crate::protocol::{ApiCommand, Directive};
use crate::session::Session;

impl Session {
    /// Fetch the full zones/items configuration.
    ///
    /// Also records the central unit identity (name, MAC, firmware
    /// version) on the session.
    pub async fn get_configuration(&self) -> Result<ConfigurationData, Error> {
        debug!("fetching configuration");
        let data = self.call(ApiCommand::GetConfiguration, Value::Null).await?;
        let conf: ConfigurationData = decode(data, "GET_CONFIGURATION")?;
        self.set_central_unit(CentralUnitInfo::from(&conf));
        Ok(conf)
    }

    /// Fetch the raw state of one item.
    ///
    /// Returns whatever the central unit put in `data`: `"ON"`, `"OFF"`,
    /// an integer, or an object for thermostats.
    pub async fn get_state(&self, id: u32) -> Result<Value, Error> {
        debug!(id, "fetching state");
        self.call(ApiCommand::GetState, json!(id)).await
    }

    /// Fetch the raw states of several items in one request.
    ///
    /// Entry order is whatever the central unit chose; match by `id`.
    pub async fn get_multiple_states(&self, ids: &[u32]) -> Result<Vec<RawStateEntry>, Error> {
        debug!(count = ids.len(), "fetching multiple states");
        let data = self.call(ApiCommand::GetMultipleStates, json!(ids)).await?;
        decode(data, "GET_MULTIPLE_STATES")
    }

    /// Set an item's state. `value` must already be in wire form.
    pub async fn operate(&self, id: u32, value: Value) -> Result<Value, Error> {
        debug!(id, %value, "operating item");
        let params = OperateParams {
            directive: Directive::Set,
            item_id: id,
            value,
        };
        let params = serde_json::to_value(params).map_err(|e| Error::Deserialization {
            message: format!("failed to encode OPERATE params: {e}"),
            body: String::new(),
        })?;
        self.call(ApiCommand::Operate, params).await
    }

    /// Central unit statistics. The field set varies by firmware, so
    /// this stays loosely typed.
    pub async fn get_stats(&self) -> Result<Value, Error> {
        debug!("fetching stats");
        self.call(ApiCommand::Stats, Value::Null).await
    }
}

fn decode<T: serde::de::DeserializeOwned>(data: Value, command: &str) -> Result<T, Error> {
    serde_json::from_value(data.clone()).map_err(|e| Error::Deserialization {
        message: format!("invalid {command} payload: {e}"),
        body: data.to_string(),
    })
}
