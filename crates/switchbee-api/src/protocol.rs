// Wire vocabulary of the central unit's command endpoint.
//
// Every command name and envelope status is defined once here and
// referenced by both the request builder and the response classifier.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

/// Command names accepted by `POST /commands`.
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
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiCommand {
    Login,
    GetConfiguration,
    GetMultipleStates,
    GetState,
    Stats,
    Operate,
}

/// Envelope status reported in every response body.
///
/// The controller firmware may grow new statuses; anything unrecognised
/// is kept verbatim in [`Other`](Self::Other).
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiStatus {
    Ok,
    Failed,
    InvalidToken,
    TokenExpired,
    LoginFailed,
    Offline,
    #[strum(default)]
    Other(String),
}

impl ApiStatus {
    /// Token-related statuses that a fresh login can clear.
    pub fn is_token_rejection(&self) -> bool {
        matches!(self, Self::InvalidToken | Self::TokenExpired)
    }
}

impl From<&str> for ApiStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "OK" => Self::Ok,
            "FAILED" => Self::Failed,
            "INVALID_TOKEN" => Self::InvalidToken,
            "TOKEN_EXPIRED" => Self::TokenExpired,
            "LOGIN_FAILED" => Self::LoginFailed,
            "OFFLINE" => Self::Offline,
            _ => Self::Other(raw.to_owned()),
        }
    }
}

/// Directive carried by an `OPERATE` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Directive {
    Set,
}
