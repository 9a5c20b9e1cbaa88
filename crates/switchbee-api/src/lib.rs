// switchbee-api: Async Rust client for the SwitchBee central unit command API

pub mod client;
pub mod commands;
pub mod error;
pub mod models;
pub mod protocol;
pub mod session;
pub mod transport;

pub use client::CentralUnitClient;
pub use error::Error;
pub use models::{CentralUnitInfo, ConfigurationData, RawItem, RawStateEntry, RawZone};
pub use protocol::{ApiCommand, ApiStatus, Directive};
pub use session::{DEFAULT_TOKEN_LIFETIME, Session};
pub use transport::{TlsMode, TransportConfig};
