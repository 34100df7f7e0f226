//! Public types consumed by the session engine.
//!
//! The engine builds [`ServerOptions`] and [`ClientOptions`], drains
//! [`ClientEvent`]s from a running client, and reads [`DiagnosticsSnapshot`]s
//! for display.

use jsstyle_types::Range;

/// How to launch the lint server process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerOptions {
    /// Executable (resolved through `PATH`).
    pub command: String,
    pub args: Vec<String>,
}

/// What the client tells the server, and which documents it forwards.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Client name used in logs (the profile scope).
    pub name: String,
    /// Language ids whose documents are synced to the server.
    pub document_selector: Vec<String>,
    /// Glob patterns for `workspace/didChangeWatchedFiles`.
    pub watched_files: Vec<String>,
    /// Workspace root, if the host has one open.
    pub root_uri: Option<String>,
    /// Sent verbatim as `initializationOptions`.
    pub initialization_options: serde_json::Value,
}

/// Lifecycle state of a client session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Starting,
    Running,
    Stopped,
}

/// Something the server (or the transport) did.
#[derive(Debug)]
pub enum ClientEvent {
    StateChanged(ClientState),
    /// Server notification other than diagnostics.
    Notification {
        method: String,
        params: serde_json::Value,
    },
    /// Server request that must be answered through
    /// [`crate::Connection::respond`].
    Request {
        id: serde_json::Value,
        method: String,
        params: serde_json::Value,
    },
    Diagnostics {
        uri: String,
        items: Vec<LintDiagnostic>,
    },
    /// A frame could not be decoded; the stream is still usable.
    TransportError { message: String },
    /// The server's output stream ended or broke.
    Closed,
}

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticSeverity {
    Error = 1,
    Warning = 2,
    Information = 3,
    Hint = 4,
}

impl DiagnosticSeverity {
    /// Convert from LSP numeric severity (1=Error, 2=Warning, 3=Info, 4=Hint).
    ///
    /// Returns `None` for values outside the LSP-defined range.
    #[must_use]
    pub fn from_lsp(value: u64) -> Option<Self> {
        match value {
            1 => Some(Self::Error),
            2 => Some(Self::Warning),
            3 => Some(Self::Information),
            4 => Some(Self::Hint),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_error(self) -> bool {
        self == Self::Error
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Information => "info",
            Self::Hint => "hint",
        }
    }
}

/// A single lint finding.
///
/// Fields are private; external consumers read via accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct LintDiagnostic {
    severity: DiagnosticSeverity,
    message: String,
    range: Range,
    /// Reporting tool, e.g. "standard".
    source: String,
    /// Rule id, e.g. "no-unused-vars".
    code: Option<String>,
}

impl LintDiagnostic {
    #[must_use]
    pub fn new(
        severity: DiagnosticSeverity,
        message: String,
        range: Range,
        source: String,
        code: Option<String>,
    ) -> Self {
        Self {
            severity,
            message,
            range,
            source,
            code,
        }
    }

    #[must_use]
    pub fn severity(&self) -> DiagnosticSeverity {
        self.severity
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn range(&self) -> Range {
        self.range
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Format as `path:line:col: severity: [source] message (code)`, 1-indexed.
    #[must_use]
    pub fn display_with_path(&self, path: &std::path::Path) -> String {
        let mut line = format!(
            "{}:{}:{}: {}: [{}] {}",
            path.display(),
            self.range.start.line + 1,
            self.range.start.character + 1,
            self.severity.label(),
            self.source,
            self.message,
        );
        if let Some(code) = &self.code {
            line.push_str(&format!(" ({code})"));
        }
        line
    }
}

/// Immutable snapshot of the diagnostic collection.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticsSnapshot {
    /// Per-document diagnostics, documents with errors first.
    documents: Vec<(String, Vec<LintDiagnostic>)>,
}

impl DiagnosticsSnapshot {
    pub(crate) fn new(documents: Vec<(String, Vec<LintDiagnostic>)>) -> Self {
        Self { documents }
    }

    #[must_use]
    pub fn documents(&self) -> &[(String, Vec<LintDiagnostic>)] {
        &self.documents
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn count_by_severity(&self, severity: DiagnosticSeverity) -> usize {
        self.documents
            .iter()
            .flat_map(|(_, items)| items)
            .filter(|d| d.severity() == severity)
            .count()
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.count_by_severity(DiagnosticSeverity::Error)
    }

    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.count_by_severity(DiagnosticSeverity::Warning)
    }

    #[must_use]
    pub fn total_count(&self) -> usize {
        self.documents.iter().map(|(_, items)| items.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsstyle_types::Position;
    use std::path::PathBuf;

    fn diag(severity: DiagnosticSeverity, code: Option<&str>) -> LintDiagnostic {
        LintDiagnostic::new(
            severity,
            "Missing space before function parentheses.".to_string(),
            Range::new(Position::new(10, 5), Position::new(10, 6)),
            "standard".to_string(),
            code.map(String::from),
        )
    }

    #[test]
    fn severity_from_lsp() {
        assert_eq!(DiagnosticSeverity::from_lsp(1), Some(DiagnosticSeverity::Error));
        assert_eq!(DiagnosticSeverity::from_lsp(4), Some(DiagnosticSeverity::Hint));
        assert_eq!(DiagnosticSeverity::from_lsp(0), None);
        assert_eq!(DiagnosticSeverity::from_lsp(99), None);
    }

    #[test]
    fn display_is_one_indexed() {
        let path = PathBuf::from("src/index.js");
        assert_eq!(
            diag(DiagnosticSeverity::Error, Some("space-before-function-paren")).display_with_path(&path),
            "src/index.js:11:6: error: [standard] Missing space before function parentheses. (space-before-function-paren)"
        );
        assert_eq!(
            diag(DiagnosticSeverity::Warning, None).display_with_path(&path),
            "src/index.js:11:6: warning: [standard] Missing space before function parentheses."
        );
    }

    #[test]
    fn snapshot_counts() {
        let snap = DiagnosticsSnapshot::new(vec![(
            "file:///a.js".to_string(),
            vec![
                diag(DiagnosticSeverity::Error, None),
                diag(DiagnosticSeverity::Warning, None),
                diag(DiagnosticSeverity::Warning, None),
                diag(DiagnosticSeverity::Hint, None),
            ],
        )]);
        assert_eq!(snap.error_count(), 1);
        assert_eq!(snap.warning_count(), 2);
        assert_eq!(snap.total_count(), 4);
        assert!(!snap.is_empty());
        assert!(DiagnosticsSnapshot::default().is_empty());
    }
}
