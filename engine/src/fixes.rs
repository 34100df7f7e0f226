//! Requesting fixes from the server and applying them to the active document.

use jsstyle_lsp::protocol::ALL_FIXES;
use jsstyle_types::{AllFixesParams, AllFixesResult, TextEdit};

use crate::{EditorHost, LinterSession, ServerLauncher};

/// What happened to a batch of edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// The target is not the active document. Nothing shown.
    NotActive,
    /// The document moved on since the fixes were computed.
    Outdated,
    /// The host refused the edit transaction.
    Rejected,
}

impl<H: EditorHost, L: ServerLauncher> LinterSession<H, L> {
    /// Ask the server for every auto-fixable edit in `uri`. `None` when
    /// there is nothing to fix or the request failed; failures are reported
    /// to the user.
    pub async fn request_all_fixes(&mut self, uri: &str) -> Option<AllFixesResult> {
        let Some(connection) = self.client.as_ref().map(jsstyle_lsp::LanguageClient::connection)
        else {
            tracing::debug!(linter = self.profile.scope, "No server for fix request on {uri}");
            let message = self.fix_failed_message();
            self.host.show_error(&message);
            return None;
        };

        let params = AllFixesParams::new(uri);
        match connection
            .request::<_, Option<AllFixesResult>>(ALL_FIXES, &params)
            .await
        {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(linter = self.profile.scope, "Fix request for {uri} failed: {e}");
                let message = self.fix_failed_message();
                self.host.show_error(&message);
                None
            }
        }
    }

    /// Apply `edits` to `uri` if it is still the active document at
    /// `version`.
    pub fn apply_text_edits(&mut self, uri: &str, version: i32, edits: &[TextEdit]) -> ApplyOutcome {
        let Some(active) = self.host.active_document().filter(|doc| doc.uri == uri) else {
            tracing::debug!(linter = self.profile.scope, "Dropping fixes for inactive {uri}");
            return ApplyOutcome::NotActive;
        };

        if active.version != version {
            tracing::debug!(
                linter = self.profile.scope,
                expected = version,
                actual = active.version,
                "Fixes are outdated"
            );
            self.host.show_information(&format!(
                "{} fixes are outdated and can't be applied to the document.",
                self.profile.display_name
            ));
            return ApplyOutcome::Outdated;
        }

        if self.host.apply_edits(uri, edits) {
            ApplyOutcome::Applied
        } else {
            let message = self.fix_failed_message();
            self.host.show_error(&message);
            ApplyOutcome::Rejected
        }
    }

    /// Fix the active document now. `None` when there was no active
    /// document or nothing came back from the server.
    pub async fn run_auto_fix(&mut self) -> Option<ApplyOutcome> {
        let uri = self.host.active_document()?.uri;
        let result = self.request_all_fixes(&uri).await?;
        Some(self.apply_text_edits(&uri, result.document_version, &result.edits))
    }

    pub(crate) fn fix_failed_message(&self) -> String {
        format!(
            "Failed to apply {} fixes to the document. Please consider opening an issue with steps to reproduce.",
            self.profile.display_name
        )
    }
}
