//! Document and file-system sync with the server.

use std::path::Path;

use jsstyle_lsp::FileChangeType;
use jsstyle_types::TextDocument;

use crate::{EditorHost, LinterSession, ServerLauncher};

impl<H: EditorHost, L: ServerLauncher> LinterSession<H, L> {
    pub async fn on_document_opened(&mut self, document: &TextDocument) {
        let Some(text) = self.host.document_text(&document.uri) else {
            tracing::debug!("No text for opened document {}", document.uri);
            return;
        };
        let Some(client) = self.client.as_mut() else {
            return;
        };
        if let Err(e) = client.did_open(document, &text).await {
            tracing::warn!(linter = self.profile.scope, "didOpen failed for {}: {e}", document.uri);
        }
    }

    pub async fn on_document_changed(&mut self, document: &TextDocument) {
        let Some(text) = self.host.document_text(&document.uri) else {
            return;
        };
        let Some(client) = self.client.as_mut() else {
            return;
        };
        if let Err(e) = client.did_change(document, &text).await {
            tracing::warn!(linter = self.profile.scope, "didChange failed for {}: {e}", document.uri);
        }
    }

    pub async fn on_document_closed(&mut self, uri: &str) {
        let Some(client) = self.client.as_mut() else {
            return;
        };
        if let Err(e) = client.did_close(uri).await {
            tracing::warn!(linter = self.profile.scope, "didClose failed for {uri}: {e}");
        }
    }

    /// Forwarded only for paths matching the watched patterns.
    pub async fn on_watched_file_changed(&mut self, path: &Path, kind: FileChangeType) {
        let Some(client) = self.client.as_ref() else {
            return;
        };
        match client.did_change_watched_file(path, kind).await {
            Ok(true) => tracing::debug!("Forwarded {kind:?} for {}", path.display()),
            Ok(false) => {}
            Err(e) => tracing::warn!(linter = self.profile.scope, "didChangeWatchedFiles failed: {e}"),
        }
    }

    /// Sync everything already open when a server comes up.
    pub(crate) async fn open_all_documents(&mut self) {
        for document in self.host.open_documents() {
            self.on_document_opened(&document).await;
        }
    }
}
