//! Device model and client facade on top of `switchbee-api`.
//!
//! - **[`Controller`]**: the single entry point. [`connect()`](Controller::connect)
//!   logs in and loads the configuration; reads and writes go through the
//!   session, which re-authenticates transparently once per rejected token.
//!   [`Controller::oneshot()`] wraps connect/run/disconnect for CLI use.
//!
//! - **[`DeviceStore`]**: lock-free holder of the current [`Snapshot`].
//!   Configuration loads swap it whole; state fetches and commands swap in
//!   copies with individual devices replaced.
//!
//! - **Domain model** ([`model`]): [`Device`] with a tagged [`DeviceKind`],
//!   variant-shaped [`DeviceState`], and [`Zone`].
//!
//! - **Commands** ([`command`]): [`StateValue`] requests validated and
//!   encoded per variant before anything is sent.

pub mod command;
pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod model;
pub mod store;
pub mod sync;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{EncodedCommand, StateValue, ThermostatSetting};
pub use config::{ControllerConfig, TlsVerification};
pub use controller::Controller;
pub use convert::{LoadReport, load_configuration};
pub use error::CoreError;
pub use store::{DeviceStore, Snapshot};
pub use sync::StateReport;

pub use model::{
    Device, DeviceId, DeviceKind, DeviceState, DeviceType, HardwareType, Power, StateDomain,
    TemperatureUnit, ThermostatState, Zone, ZoneId,
};

pub use switchbee_api::CentralUnitInfo;
