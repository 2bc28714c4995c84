//! Wire messages exchanged with the protocol server.
//!
//! A client sends one JSON [`Command`] and receives one JSON [`Response`]:
//!
//! ```json
//! {"op":"is_authorized","email":"a@x.com","password":"pw","resource":"/r"}
//! {"Code":0,"Message":"Success"}
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Result, auth::Directory};

/// The only operation the server supports.
pub const IS_AUTHORIZED: &str = "is_authorized";

/// A request. Missing fields decode as empty strings.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Command {
    pub op: String,
    pub email: String,
    pub password: String,
    pub resource: String,
}

impl Command {
    pub fn is_authorized(
        email: impl Into<String>,
        password: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            op: IS_AUTHORIZED.to_string(),
            email: email.into(),
            password: password.into(),
            resource: resource.into(),
        }
    }

    /// Decode a request; malformed input yields the default command.
    pub fn decode(bytes: &[u8]) -> Self {
        serde_json::from_slice(bytes).unwrap_or_else(|e| {
            warn!("malformed command: {e}");
            Command::default()
        })
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("op", &self.op)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("resource", &self.resource)
            .finish()
    }
}

/// Numeric outcome carried in [`Response::code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum ResponseCode {
    Success = 0,
    /// Reserved.
    AuthenticationFailure = 1,
    /// Reserved.
    AuthorizationFailure = 2,
    SystemError = 3,
}

impl From<ResponseCode> for u8 {
    fn from(code: ResponseCode) -> Self {
        code as u8
    }
}

impl TryFrom<u8> for ResponseCode {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(ResponseCode::Success),
            1 => Ok(ResponseCode::AuthenticationFailure),
            2 => Ok(ResponseCode::AuthorizationFailure),
            3 => Ok(ResponseCode::SystemError),
            other => Err(format!("unknown response code {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "Code")]
    pub code: ResponseCode,
    #[serde(rename = "Message")]
    pub message: String,
}

impl Response {
    pub fn success() -> Self {
        Self {
            code: ResponseCode::Success,
            message: "Success".to_string(),
        }
    }

    pub fn system_error(message: impl Into<String>) -> Self {
        Self {
            code: ResponseCode::SystemError,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == ResponseCode::Success
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Execute `command` against `directory`.
///
/// Every failure, including unsupported operations, is reported as
/// [`ResponseCode::SystemError`] carrying the error text.
pub fn handle_command(directory: &Directory, command: &Command) -> Response {
    if command.op != IS_AUTHORIZED {
        debug!(op = %command.op, "unsupported command");
        return Response::system_error("command not supported");
    }
    match directory.authorize(&command.email, &command.password, &command.resource) {
        Ok(()) => Response::success(),
        Err(e) => {
            debug!(email = %command.email, resource = %command.resource, "authorization refused: {e}");
            Response::system_error(e.to_string())
        }
    }
}
