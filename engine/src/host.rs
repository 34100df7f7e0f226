//! What the session needs from the editor it runs inside.

use std::future::Future;
use std::path::PathBuf;

use jsstyle_config::LinterSettings;
use jsstyle_lsp::{ClientError, ClientOptions, LanguageClient, LintDiagnostic, ServerOptions};
use jsstyle_types::{LinterProfile, TextDocument, TextEdit};

use crate::indicator::StatusView;

/// Severity of an output-log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputLevel {
    Info,
    Warn,
    Error,
}

/// The editor: documents, settings, notifications and the output log.
///
/// All methods are synchronous; the session calls them from its own
/// event-handling context and never holds them across a server round trip.
pub trait EditorHost {
    /// The document in the focused editor, if any.
    fn active_document(&self) -> Option<TextDocument>;

    fn open_documents(&self) -> Vec<TextDocument>;

    /// Current full text of an open document.
    fn document_text(&self, uri: &str) -> Option<String>;

    /// Root folder of the open workspace. `None` for loose files.
    fn workspace_root(&self) -> Option<PathBuf>;

    /// The profile's configuration section as it is right now.
    fn settings(&self, profile: &LinterProfile) -> LinterSettings;

    /// Apply all edits to `uri` as one transaction. `false` if the editor
    /// rejected it, in which case the document is unchanged.
    fn apply_edits(&mut self, uri: &str, edits: &[TextEdit]) -> bool;

    fn show_information(&mut self, message: &str);

    fn show_error(&mut self, message: &str);

    fn render_status(&mut self, view: &StatusView);

    fn append_output(&mut self, level: OutputLevel, message: &str);

    fn show_output(&mut self, preserve_focus: bool);

    fn publish_diagnostics(&mut self, uri: &str, diagnostics: &[LintDiagnostic]);
}

/// Starts a server and hands back an initialized client.
pub trait ServerLauncher {
    fn launch(
        &mut self,
        server: &ServerOptions,
        options: &ClientOptions,
    ) -> impl Future<Output = Result<LanguageClient, ClientError>>;
}

/// Runs the server as a child process over stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessLauncher;

impl ServerLauncher for ProcessLauncher {
    async fn launch(
        &mut self,
        server: &ServerOptions,
        options: &ClientOptions,
    ) -> Result<LanguageClient, ClientError> {
        tracing::info!(
            server = %options.name,
            command = %server.command,
            args = ?server.args,
            "Starting lint server"
        );
        LanguageClient::spawn(server, options).await
    }
}
