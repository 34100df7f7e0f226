//! JSON-RPC message shapes and the lint server's method names.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::{DiagnosticSeverity, LintDiagnostic};
use jsstyle_types::{Range, TextDocument};

/// Client → server request: compute every auto-fixable edit for a document.
pub const ALL_FIXES: &str = "textDocument/eslint/allFixes";
/// Server → client notification carrying [`jsstyle_types::StatusParams`].
pub const STATUS: &str = "eslint/status";
/// Server → client request: no linter configuration found for a document.
pub const NO_CONFIG: &str = "eslint/noConfig";
/// Server → client notification: the server called `process.exit` itself.
pub const EXIT_CALLED: &str = "eslint/exitCalled";

pub const PUBLISH_DIAGNOSTICS: &str = "textDocument/publishDiagnostics";

/// JSON-RPC "method not found".
pub const METHOD_NOT_FOUND: i64 = -32601;
/// `initialize` error code: the server could not load the linter package.
pub const LIBRARY_NOT_FOUND: i64 = 100;

#[derive(Debug, thiserror::Error)]
#[error("cannot convert path to file URI: {}", path.display())]
pub struct PathToUriError {
    path: PathBuf,
}

#[derive(Debug, Serialize)]
pub(crate) struct Request<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl<'a> Request<'a> {
    pub fn new(id: u64, method: &'a str, params: Option<serde_json::Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method,
            params,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct Notification<'a> {
    pub jsonrpc: &'static str,
    pub method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl<'a> Notification<'a> {
    pub fn new(method: &'a str, params: Option<serde_json::Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            method,
            params,
        }
    }
}

/// Reply to a request the server sent us.
#[derive(Debug, Serialize)]
pub(crate) struct Response {
    pub jsonrpc: &'static str,
    pub id: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseError>,
}

impl Response {
    pub fn ok(id: serde_json::Value, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn err(id: serde_json::Value, error: ResponseError) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// The `error` member of a JSON-RPC response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ResponseError {
    #[must_use]
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

impl fmt::Display for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

/// A classified inbound frame.
#[derive(Debug)]
pub(crate) enum Incoming {
    Response {
        id: u64,
        outcome: Result<serde_json::Value, ResponseError>,
    },
    Request {
        id: serde_json::Value,
        method: String,
        params: serde_json::Value,
    },
    Notification {
        method: String,
        params: serde_json::Value,
    },
}

pub(crate) fn parse_incoming(frame: &serde_json::Value) -> Option<Incoming> {
    let id = frame.get("id");
    let method = frame.get("method").and_then(|m| m.as_str()).map(String::from);
    let params = frame.get("params").cloned().unwrap_or(serde_json::Value::Null);

    match (id, method) {
        (Some(id_val), None) => {
            let id = id_val.as_u64()?;
            if let Some(error) = frame.get("error") {
                let error = serde_json::from_value(error.clone()).ok()?;
                return Some(Incoming::Response {
                    id,
                    outcome: Err(error),
                });
            }
            let result = frame.get("result")?.clone();
            Some(Incoming::Response {
                id,
                outcome: Ok(result),
            })
        }
        (Some(id_val), Some(method)) => Some(Incoming::Request {
            id: id_val.clone(),
            method,
            params,
        }),
        (None, Some(method)) => Some(Incoming::Notification { method, params }),
        (None, None) => None,
    }
}

pub(crate) fn initialize_params(
    root_uri: Option<&str>,
    initialization_options: &serde_json::Value,
) -> serde_json::Value {
    let workspace_folders = root_uri.map(|uri| {
        serde_json::json!([{
            "uri": uri,
            "name": "workspace"
        }])
    });
    serde_json::json!({
        "processId": std::process::id(),
        "rootUri": root_uri,
        "initializationOptions": initialization_options,
        "capabilities": {
            "workspace": {
                "didChangeConfiguration": { "dynamicRegistration": false },
                "didChangeWatchedFiles": { "dynamicRegistration": false }
            },
            "textDocument": {
                "synchronization": {
                    "dynamicRegistration": false,
                    "willSave": false,
                    "willSaveWaitUntil": false,
                    "didSave": false
                },
                "publishDiagnostics": {
                    "relatedInformation": false
                }
            }
        },
        "workspaceFolders": workspace_folders
    })
}

pub(crate) fn did_open_params(document: &TextDocument, text: &str) -> serde_json::Value {
    serde_json::json!({
        "textDocument": {
            "uri": document.uri,
            "languageId": document.language_id,
            "version": document.version,
            "text": text
        }
    })
}

pub(crate) fn did_change_params(document: &TextDocument, text: &str) -> serde_json::Value {
    serde_json::json!({
        "textDocument": {
            "uri": document.uri,
            "version": document.version
        },
        "contentChanges": [{
            "text": text
        }]
    })
}

pub(crate) fn did_close_params(uri: &str) -> serde_json::Value {
    serde_json::json!({
        "textDocument": { "uri": uri }
    })
}

pub(crate) fn did_change_configuration_params(settings: serde_json::Value) -> serde_json::Value {
    serde_json::json!({ "settings": settings })
}

/// `FileChangeType` from the watched-files notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileChangeType {
    Created = 1,
    Changed = 2,
    Deleted = 3,
}

pub(crate) fn did_change_watched_files_params(uri: &str, kind: FileChangeType) -> serde_json::Value {
    serde_json::json!({
        "changes": [{ "uri": uri, "type": kind as u8 }]
    })
}

#[derive(Debug, Deserialize)]
pub(crate) struct PublishDiagnosticsParams {
    pub uri: String,
    pub diagnostics: Vec<WireDiagnostic>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireDiagnostic {
    pub range: Range,
    pub severity: Option<u64>,
    pub source: Option<String>,
    pub code: Option<serde_json::Value>,
    pub message: String,
}

impl WireDiagnostic {
    pub fn into_lint_diagnostic(self) -> LintDiagnostic {
        let code = match self.code {
            Some(serde_json::Value::String(s)) => Some(s),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        LintDiagnostic::new(
            self.severity
                .and_then(DiagnosticSeverity::from_lsp)
                .unwrap_or(DiagnosticSeverity::Warning),
            self.message,
            self.range,
            self.source.unwrap_or_else(|| String::from("standard")),
            code,
        )
    }
}

/// Payload of the no-config request.
#[derive(Debug, Deserialize)]
pub struct NoConfigParams {
    pub message: String,
    pub document: jsstyle_types::TextDocumentIdentifier,
}

pub fn path_to_file_uri(path: &Path) -> Result<url::Url, PathToUriError> {
    url::Url::from_file_path(path).map_err(|()| PathToUriError {
        path: path.to_path_buf(),
    })
}

#[must_use]
pub fn file_uri_to_path(uri: &str) -> Option<PathBuf> {
    url::Url::parse(uri).ok().and_then(|u| u.to_file_path().ok())
}
