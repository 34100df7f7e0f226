//! Editor-side session for one JavaScript Standard Style linter variant.
//!
//! A [`LinterSession`] owns everything one variant needs while the editor
//! runs: the language client, the status indicator state, the auto-fix
//! save hook and the published diagnostics. `standard` and `semistandard`
//! are two sessions over the same code, told apart by their
//! [`LinterProfile`].
//!
//! The session is driven from one event-handling context. Editor events come
//! in through methods such as [`LinterSession::on_configuration_changed`];
//! server events are drained with [`LinterSession::poll_events`] or
//! [`LinterSession::process_next_event`].

mod autofix;
mod commands;
mod documents;
mod fixes;
mod host;
mod indicator;
mod supervisor;


pub use autofix::{SaveHook, SaveParticipant};
pub use commands::{Command, CommandError};
pub use fixes::ApplyOutcome;
pub use host::{EditorHost, OutputLevel, ProcessLauncher, ServerLauncher};
pub use indicator::{StatusColor, StatusView};

pub use jsstyle_config::{LinterSettings, Memento};
pub use jsstyle_types::{LinterProfile, SEMISTANDARD, STANDARD, Status};

use std::sync::Arc;

use jsstyle_lsp::{
    ClientEvent, DefaultErrorHandler, DiagnosticCollection, DiagnosticsSnapshot, ErrorHandler,
    LanguageClient,
};

pub struct LinterSession<H: EditorHost, L: ServerLauncher = ProcessLauncher> {
    profile: LinterProfile,
    host: H,
    memento: Box<dyn Memento>,
    launcher: L,
    error_handler: Box<dyn ErrorHandler>,

    client: Option<LanguageClient>,
    /// Settings as last read from the host.
    settings: LinterSettings,

    // Indicator state
    status: Status,
    running: bool,
    tooltip: Option<String>,

    /// The server announced it called `process.exit`; do not restart it.
    exit_called: bool,
    /// Present iff auto-fix on save is enabled.
    save_hook: Option<Arc<SaveHook>>,
    diagnostics: DiagnosticCollection,
    /// Consecutive undecodable frames from the current client.
    transport_errors: u32,
    /// Set by a close the error handler wants restarted; acted on by the
    /// event pump.
    restart_pending: bool,
    no_config_shown: bool,
}

impl<H: EditorHost, L: ServerLauncher> LinterSession<H, L> {
    pub fn new(profile: LinterProfile, host: H, memento: Box<dyn Memento>, launcher: L) -> Self {
        let settings = host.settings(&profile);
        Self {
            profile,
            host,
            memento,
            launcher,
            error_handler: Box::new(DefaultErrorHandler::new()),
            client: None,
            settings,
            status: Status::Ok,
            running: false,
            tooltip: None,
            exit_called: false,
            save_hook: None,
            diagnostics: DiagnosticCollection::new(),
            transport_errors: 0,
            restart_pending: false,
            no_config_shown: false,
        }
    }

    /// Replace the restart/error policy.
    pub fn with_error_handler(mut self, handler: impl ErrorHandler + 'static) -> Self {
        self.error_handler = Box::new(handler);
        self
    }

    /// Read settings, install the save hook if configured and start the
    /// server if enabled.
    pub async fn activate(&mut self) {
        tracing::info!(linter = self.profile.scope, "Activating");
        self.refresh_indicator();
        self.settings = self.host.settings(&self.profile);
        self.update_save_hook(self.settings.auto_fix_on_save);
        if self.settings.enable {
            self.start().await;
        }
    }

    /// Dispose the save hook and stop the server.
    pub async fn deactivate(&mut self) {
        tracing::info!(linter = self.profile.scope, "Deactivating");
        self.save_hook = None;
        self.stop().await;
    }

    /// Handle every event the client has queued without waiting for more.
    /// Returns the number of events handled.
    pub async fn poll_events(&mut self) -> usize {
        let mut handled = self.drain_events().await;
        while std::mem::take(&mut self.restart_pending) {
            self.launch_client().await;
            handled += self.drain_events().await;
        }
        handled
    }

    /// Wait for the next client event and handle it. `false` when there is
    /// no client to wait on.
    pub async fn process_next_event(&mut self) -> bool {
        let Some(client) = self.client.as_mut() else {
            return false;
        };
        let event = client
            .next_event()
            .await
            .unwrap_or(ClientEvent::Closed);
        self.handle_client_event(event).await;
        self.poll_events().await;
        true
    }

    async fn drain_events(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.client.as_mut().and_then(LanguageClient::try_next_event) {
            self.handle_client_event(event).await;
            handled += 1;
        }
        handled
    }

    #[must_use]
    pub fn profile(&self) -> &LinterProfile {
        &self.profile
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[must_use]
    pub fn memento(&self) -> &dyn Memento {
        self.memento.as_ref()
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub fn exit_called(&self) -> bool {
        self.exit_called
    }

    #[must_use]
    pub fn has_save_hook(&self) -> bool {
        self.save_hook.is_some()
    }

    #[must_use]
    pub fn diagnostics(&self) -> DiagnosticsSnapshot {
        self.diagnostics.snapshot()
    }

    /// Output-log line, mirrored to tracing.
    pub(crate) fn log(&mut self, level: OutputLevel, message: &str) {
        match level {
            OutputLevel::Info => tracing::info!(linter = self.profile.scope, "{message}"),
            OutputLevel::Warn => tracing::warn!(linter = self.profile.scope, "{message}"),
            OutputLevel::Error => tracing::error!(linter = self.profile.scope, "{message}"),
        }
        self.host.append_output(level, message);
    }

    pub(crate) fn persist(&mut self, key: &str, value: serde_json::Value) {
        if let Err(e) = self.memento.update(key, value) {
            tracing::warn!(linter = self.profile.scope, "Failed to persist '{key}': {e}");
        }
    }
}
