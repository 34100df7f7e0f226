use serde::{Deserialize, Serialize};

/// Host-side snapshot of an open text document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDocument {
    pub uri: String,
    pub language_id: String,
    /// Monotonic version, bumped by the host on every content change.
    pub version: i32,
}

impl TextDocument {
    #[must_use]
    pub fn new(uri: impl Into<String>, language_id: impl Into<String>, version: i32) -> Self {
        Self {
            uri: uri.into(),
            language_id: language_id.into(),
            version,
        }
    }
}

/// Why the host is saving a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SaveReason {
    /// Explicit save by the user.
    Manual = 1,
    /// Idle autosave.
    AfterDelay = 2,
    /// Autosave triggered by the editor losing focus.
    FocusOut = 3,
}

impl TryFrom<u8> for SaveReason {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Manual),
            2 => Ok(Self::AfterDelay),
            3 => Ok(Self::FocusOut),
            other => Err(format!("unknown save reason {other}")),
        }
    }
}

impl From<SaveReason> for u8 {
    fn from(reason: SaveReason) -> Self {
        reason as u8
    }
}

/// A save that the host is about to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WillSaveEvent {
    pub document: TextDocument,
    pub reason: SaveReason,
}
