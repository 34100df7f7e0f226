//! Latest published diagnostics per document.

use std::collections::HashMap;

use crate::types::{DiagnosticsSnapshot, LintDiagnostic};

#[derive(Debug, Default)]
pub struct DiagnosticCollection {
    data: HashMap<String, Vec<LintDiagnostic>>,
}

impl DiagnosticCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the diagnostics for `uri`. An empty list clears the entry.
    pub fn set(&mut self, uri: String, items: Vec<LintDiagnostic>) {
        if items.is_empty() {
            self.data.remove(&uri);
        } else {
            self.data.insert(uri, items);
        }
    }

    #[must_use]
    pub fn get(&self, uri: &str) -> &[LintDiagnostic] {
        self.data.get(uri).map_or(&[], Vec::as_slice)
    }

    /// Drop everything, e.g. when the server stops.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    #[must_use]
    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        let mut documents: Vec<(String, Vec<LintDiagnostic>)> = self
            .data
            .iter()
            .map(|(uri, items)| (uri.clone(), items.clone()))
            .collect();

        // Documents with errors first, then by uri
        documents.sort_by(|a, b| {
            let a_has_errors = a.1.iter().any(|d| d.severity().is_error());
            let b_has_errors = b.1.iter().any(|d| d.severity().is_error());
            b_has_errors.cmp(&a_has_errors).then_with(|| a.0.cmp(&b.0))
        });

        DiagnosticsSnapshot::new(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DiagnosticSeverity;
    use jsstyle_types::{Position, Range};

    fn make_diag(severity: DiagnosticSeverity, line: u32) -> LintDiagnostic {
        LintDiagnostic::new(
            severity,
            "Strings must use singlequote.".to_string(),
            Range::new(Position::new(line, 0), Position::new(line, 5)),
            "standard".to_string(),
            Some("quotes".to_string()),
        )
    }

    #[test]
    fn set_and_get() {
        let mut collection = DiagnosticCollection::new();
        collection.set(
            "file:///a.js".to_string(),
            vec![make_diag(DiagnosticSeverity::Error, 1)],
        );
        assert_eq!(collection.get("file:///a.js").len(), 1);
        assert!(collection.get("file:///b.js").is_empty());
    }

    #[test]
    fn empty_publish_clears_document() {
        let mut collection = DiagnosticCollection::new();
        collection.set(
            "file:///a.js".to_string(),
            vec![make_diag(DiagnosticSeverity::Error, 1)],
        );
        collection.set("file:///a.js".to_string(), vec![]);
        assert!(collection.snapshot().is_empty());
    }

    #[test]
    fn errors_sort_first() {
        let mut collection = DiagnosticCollection::new();
        collection.set(
            "file:///a.js".to_string(),
            vec![make_diag(DiagnosticSeverity::Warning, 1)],
        );
        collection.set(
            "file:///b.js".to_string(),
            vec![make_diag(DiagnosticSeverity::Error, 1)],
        );
        collection.set(
            "file:///c.js".to_string(),
            vec![make_diag(DiagnosticSeverity::Warning, 2)],
        );

        let snap = collection.snapshot();
        let uris: Vec<&str> = snap.documents().iter().map(|(u, _)| u.as_str()).collect();
        assert_eq!(uris, vec!["file:///b.js", "file:///a.js", "file:///c.js"]);
    }

    #[test]
    fn clear_drops_everything() {
        let mut collection = DiagnosticCollection::new();
        collection.set(
            "file:///a.js".to_string(),
            vec![make_diag(DiagnosticSeverity::Error, 1)],
        );
        collection.clear();
        assert!(collection.snapshot().is_empty());
    }
}
