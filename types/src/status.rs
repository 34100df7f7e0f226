use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Health of the lint backend as reported by the server.
///
/// Travels on the wire as its integer discriminant (`1`, `2`, `3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Status {
    #[default]
    Ok = 1,
    Warn = 2,
    Error = 3,
}

#[derive(Debug, Error)]
#[error("unknown status value {0}")]
pub struct UnknownStatusError(u8);

impl TryFrom<u8> for Status {
    type Error = UnknownStatusError;

    fn try_from(value: u8) -> Result<Self, UnknownStatusError> {
        match value {
            1 => Ok(Self::Ok),
            2 => Ok(Self::Warn),
            3 => Ok(Self::Error),
            other => Err(UnknownStatusError(other)),
        }
    }
}

impl From<Status> for u8 {
    fn from(status: Status) -> Self {
        status as u8
    }
}

impl Status {
    #[must_use]
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Payload of the status notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusParams {
    pub state: Status,
}
