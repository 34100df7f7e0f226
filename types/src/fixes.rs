//! Wire types for the "all fixes" request.

use serde::{Deserialize, Serialize};

/// Zero-based line/character position. `character` counts UTF-16 code units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    #[must_use]
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    #[must_use]
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

/// A single replacement: `range` is replaced by `new_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEdit {
    pub range: Range,
    pub new_text: String,
}

impl TextEdit {
    #[must_use]
    pub fn replace(range: Range, new_text: impl Into<String>) -> Self {
        Self {
            range,
            new_text: new_text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextDocumentIdentifier {
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllFixesParams {
    pub text_document: TextDocumentIdentifier,
}

impl AllFixesParams {
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            text_document: TextDocumentIdentifier { uri: uri.into() },
        }
    }
}

/// Corrective edits computed against one specific document version.
///
/// The edits are only meaningful while the live document is still at
/// `document_version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllFixesResult {
    pub document_version: i32,
    #[serde(default)]
    pub edits: Vec<TextEdit>,
}

impl AllFixesResult {
    #[must_use]
    pub fn matches_version(&self, version: i32) -> bool {
        self.document_version == version
    }
}
