//! Language client for the JavaScript Standard Style lint server.
//!
//! Spawns the server, frames JSON-RPC over its stdio, and reports what the
//! server does as [`ClientEvent`]s. Restart and error policy live in
//! [`error_handler`]; the session engine decides when to apply them.

pub mod codec;
pub mod error_handler;
pub mod protocol;
pub mod types;

mod client;
mod diagnostics;
mod error;

pub use client::{Connection, LanguageClient};
pub use diagnostics::DiagnosticCollection;
pub use error::ClientError;
pub use error_handler::{CloseAction, DefaultErrorHandler, ErrorAction, ErrorHandler};
pub use protocol::{FileChangeType, NoConfigParams, ResponseError};
pub use types::{
    ClientEvent, ClientOptions, ClientState, DiagnosticSeverity, DiagnosticsSnapshot,
    LintDiagnostic, ServerOptions,
};
