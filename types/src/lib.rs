//! Core domain types for jsstyle.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer: the language client, the
//! session engine, and the headless CLI host.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod dismissal;
mod document;
mod fixes;
mod profile;
mod status;

pub use dismissal::{DismissalScope, DismissalState};
pub use document::{SaveReason, TextDocument, WillSaveEvent};
pub use fixes::{AllFixesParams, AllFixesResult, Position, Range, TextDocumentIdentifier, TextEdit};
pub use profile::{LinterProfile, SEMISTANDARD, STANDARD, SUPPORTED_LANGUAGES};
pub use status::{Status, StatusParams, UnknownStatusError};
