use thiserror::Error;

use crate::codec::CodecError;
use crate::protocol::ResponseError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{command} not found in PATH")]
    CommandNotFound {
        command: String,
        #[source]
        source: which::Error,
    },
    #[error("spawning {command}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("server process has no {0} pipe")]
    MissingPipe(&'static str),
    /// The server answered `initialize` with an error.
    #[error("server initialization failed: {0}")]
    Initialize(ResponseError),
    /// The server answered a request with an error.
    #[error("request failed: {0}")]
    Response(ResponseError),
    #[error("{method} timed out")]
    Timeout { method: String },
    #[error("connection to server closed")]
    ConnectionClosed,
    #[error("encoding {method} params")]
    Serialize {
        method: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("decoding {method} result")]
    Deserialize {
        method: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl ClientError {
    /// Error code the server attached to a failed `initialize`, if any.
    #[must_use]
    pub fn initialize_code(&self) -> Option<i64> {
        match self {
            Self::Initialize(error) => Some(error.code),
            _ => None,
        }
    }
}
