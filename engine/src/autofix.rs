//! Settings changes and the auto-fix-on-save hook.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};

use jsstyle_lsp::Connection;
use jsstyle_lsp::protocol::ALL_FIXES;
use jsstyle_types::{AllFixesParams, AllFixesResult, SaveReason, TextEdit, WillSaveEvent};

use crate::{EditorHost, LinterSession, ServerLauncher};

/// Registration of the pre-save interception. Dropping the session's handle
/// disposes it; participants already handed out notice and contribute no
/// edits.
#[derive(Debug)]
pub struct SaveHook {
    scope: &'static str,
}

/// Future the host awaits before completing a save. Resolves to the edits
/// to apply as part of that save.
pub type SaveParticipant = Pin<Box<dyn Future<Output = Vec<TextEdit>> + Send>>;

impl<H: EditorHost, L: ServerLauncher> LinterSession<H, L> {
    /// Re-read the settings section and react to what changed.
    pub async fn on_configuration_changed(&mut self) {
        let settings = self.host.settings(&self.profile);
        self.update_save_hook(settings.auto_fix_on_save);

        let previous = std::mem::replace(&mut self.settings, settings);
        match (previous.enable, self.settings.enable) {
            (false, true) => {
                self.start().await;
            }
            (true, false) => self.stop().await,
            _ => self.forward_settings().await,
        }
    }

    /// Install or dispose the hook. Repeating the same value is a no-op.
    pub(crate) fn update_save_hook(&mut self, auto_fix_on_save: bool) {
        if auto_fix_on_save && self.save_hook.is_none() {
            tracing::debug!(linter = self.profile.scope, "Installing auto-fix save hook");
            self.save_hook = Some(Arc::new(SaveHook {
                scope: self.profile.scope,
            }));
        } else if !auto_fix_on_save && self.save_hook.is_some() {
            tracing::debug!(linter = self.profile.scope, "Disposing auto-fix save hook");
            self.save_hook = None;
        }
    }

    async fn forward_settings(&self) {
        let Some(client) = self.client.as_ref() else {
            return;
        };
        let mut section = serde_json::Map::new();
        section.insert(
            self.profile.scope.to_string(),
            self.settings.to_server_settings(),
        );
        if let Err(e) = client
            .did_change_configuration(serde_json::Value::Object(section))
            .await
        {
            tracing::warn!(linter = self.profile.scope, "Failed to forward settings: {e}");
        }
    }

    /// Join a save that is about to happen. `None` means the save goes ahead
    /// without us.
    #[must_use]
    pub fn on_will_save(&self, event: &WillSaveEvent) -> Option<SaveParticipant> {
        let hook = self.save_hook.as_ref()?;
        if !self.running || event.reason == SaveReason::AfterDelay {
            return None;
        }
        if !self.profile.handles_language(&event.document.language_id) {
            return None;
        }
        let connection = self.client.as_ref()?.connection();

        Some(Box::pin(fixes_for_save(
            connection,
            Arc::downgrade(hook),
            event.document.uri.clone(),
            event.document.version,
        )))
    }
}

/// `version` is the document version when the save started; fixes computed
/// for any other version are dropped.
async fn fixes_for_save(
    connection: Connection,
    hook: Weak<SaveHook>,
    uri: String,
    version: i32,
) -> Vec<TextEdit> {
    let params = AllFixesParams::new(uri);
    let result = connection
        .request::<_, Option<AllFixesResult>>(ALL_FIXES, &params)
        .await;

    let Some(hook) = hook.upgrade() else {
        tracing::debug!("Save hook disposed while fixing {}", params.text_document.uri);
        return Vec::new();
    };

    match result {
        Ok(Some(result)) if result.matches_version(version) => result.edits,
        Ok(Some(result)) => {
            tracing::debug!(
                linter = hook.scope,
                expected = version,
                actual = result.document_version,
                "Dropping stale save fixes"
            );
            Vec::new()
        }
        Ok(None) => Vec::new(),
        Err(e) => {
            tracing::warn!(linter = hook.scope, "Save fix request failed: {e}");
            Vec::new()
        }
    }
}
