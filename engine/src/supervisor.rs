//! Server lifecycle: start, stop, restart policy and server-originated
//! notifications and requests.

use jsstyle_lsp::error_handler::{MAX_RESTART_COUNT, RESTART_WINDOW};
use jsstyle_lsp::protocol::{self, LIBRARY_NOT_FOUND, METHOD_NOT_FOUND};
use jsstyle_lsp::{
    ClientError, ClientEvent, ClientOptions, ClientState, CloseAction, ErrorAction, LanguageClient,
    LintDiagnostic, NoConfigParams, ResponseError,
};
use jsstyle_types::{DismissalScope, DismissalState, StatusParams, SUPPORTED_LANGUAGES};

use crate::{EditorHost, LinterSession, OutputLevel, ServerLauncher};

/// Watched so the server can pick up newly installed linter packages.
const WATCHED_FILES: &str = "**/package.json";

impl<H: EditorHost, L: ServerLauncher> LinterSession<H, L> {
    /// Start the server unless one is already running. A manual start
    /// forgets an earlier `exitCalled`.
    pub async fn start(&mut self) -> bool {
        if self.client.is_none() {
            self.exit_called = false;
            self.launch_client().await;
        }
        self.poll_events().await;
        self.client.is_some()
    }

    /// Shut the server down. Not followed by a restart.
    pub async fn stop(&mut self) {
        self.restart_pending = false;
        if let Some(client) = self.client.take() {
            client.shutdown().await;
        }
        self.clear_diagnostics();
        self.on_stopped();
    }

    pub(crate) async fn launch_client(&mut self) {
        let server = self.settings.server.server_options();
        let options = self.client_options();
        self.transport_errors = 0;

        match self.launcher.launch(&server, &options).await {
            Ok(client) => {
                tracing::debug!(linter = self.profile.scope, "Server initialized");
                self.client = Some(client);
            }
            Err(ClientError::Initialize(error)) if error.code == LIBRARY_NOT_FOUND => {
                tracing::debug!(linter = self.profile.scope, "Initialize failed: {error}");
                self.on_library_missing();
            }
            Err(e) => self.on_initialization_failed(&e),
        }
    }

    fn client_options(&self) -> ClientOptions {
        let root_uri = self.host.workspace_root().and_then(|root| {
            protocol::path_to_file_uri(&root)
                .map_err(|e| tracing::warn!("Not sending workspace root: {e}"))
                .ok()
                .map(String::from)
        });
        ClientOptions {
            name: self.profile.scope.to_string(),
            document_selector: SUPPORTED_LANGUAGES.iter().map(ToString::to_string).collect(),
            watched_files: vec![WATCHED_FILES.to_string()],
            root_uri,
            initialization_options: self.settings.initialization_options(),
        }
    }

    fn on_library_missing(&mut self) {
        let package = self.profile.package;
        let (scope, lines) = match self.host.workspace_root() {
            Some(root) => (
                DismissalScope::Workspace(root.display().to_string()),
                [
                    format!("Failed to load the {package} library."),
                    format!(
                        "To use {package} in this workspace please install {package} using \
                         'npm install {package}' or globally using 'npm install -g {package}'."
                    ),
                    format!("You need to reopen the workspace after installing {package}."),
                ],
            ),
            None => (
                DismissalScope::Global,
                [
                    format!("Failed to load the {package} library."),
                    format!(
                        "To use {package} for single JavaScript files install {package} globally \
                         using 'npm install -g {package}'."
                    ),
                    format!("You need to reopen the editor after installing {package}."),
                ],
            ),
        };
        self.log(OutputLevel::Info, &lines.join("\n"));

        let key = self.profile.dismissal_key;
        let mut state = DismissalState::from_value(self.memento.get(key));
        if !state.record(&scope) {
            return;
        }
        match serde_json::to_value(&state) {
            Ok(value) => self.persist(key, value),
            Err(e) => tracing::warn!("Failed to encode dismissal state: {e}"),
        }
        self.host.show_output(true);
        self.host.show_information(&format!("{} {}", lines[0], lines[1]));
    }

    fn on_initialization_failed(&mut self, error: &ClientError) {
        self.log(
            OutputLevel::Error,
            &format!("Server initialization failed.\n{}", error_chain(error)),
        );
        self.host.show_output(true);
    }

    pub(crate) async fn on_running(&mut self) {
        self.running = true;
        let message = format!("{} server is running.", self.profile.display_name);
        self.log(OutputLevel::Info, &message);
        self.tooltip = Some(message);
        self.refresh_indicator();
        self.open_all_documents().await;
    }

    pub(crate) fn on_stopped(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        let message = format!("{} server stopped.", self.profile.display_name);
        self.log(OutputLevel::Info, &message);
        self.tooltip = Some(message);
        self.refresh_indicator();
    }

    pub(crate) async fn handle_client_event(&mut self, event: ClientEvent) {
        if !matches!(event, ClientEvent::TransportError { .. }) {
            self.transport_errors = 0;
        }
        match event {
            ClientEvent::StateChanged(ClientState::Starting) => {
                tracing::debug!(linter = self.profile.scope, "Server starting");
            }
            ClientEvent::StateChanged(ClientState::Running) => self.on_running().await,
            ClientEvent::StateChanged(ClientState::Stopped) => self.on_stopped(),
            ClientEvent::Notification { method, params } => self.on_notification(&method, params),
            ClientEvent::Request { id, method, params } => {
                self.on_server_request(id, &method, params).await;
            }
            ClientEvent::Diagnostics { uri, items } => self.on_diagnostics(uri, items),
            ClientEvent::TransportError { message } => self.on_transport_error(&message).await,
            ClientEvent::Closed => self.on_closed(),
        }
    }

    fn on_notification(&mut self, method: &str, params: serde_json::Value) {
        if method == protocol::STATUS {
            match serde_json::from_value::<StatusParams>(params) {
                Ok(params) => self.set_status(params.state),
                Err(e) => tracing::warn!(linter = self.profile.scope, "Bad status notification: {e}"),
            }
        } else if method == protocol::EXIT_CALLED {
            self.on_exit_called(&params);
        } else {
            tracing::debug!(linter = self.profile.scope, "Ignoring notification '{method}'");
        }
    }

    /// `params` is `[code, detail]`.
    fn on_exit_called(&mut self, params: &serde_json::Value) {
        self.exit_called = true;

        let code = params
            .get(0)
            .and_then(serde_json::Value::as_i64)
            .map_or_else(|| "unknown".to_string(), |code| code.to_string());
        let mut message = format!(
            "Server process exited with code {code}. This usually indicates a misconfigured {} setup.",
            self.profile.package
        );
        if let Some(detail) = params.get(1).and_then(serde_json::Value::as_str)
            && !detail.is_empty()
        {
            message.push('\n');
            message.push_str(detail);
        }
        self.log(OutputLevel::Error, &message);

        let display = self.profile.display_name;
        self.host.show_error(&format!(
            "{display} server shut down itself. See '{display}' output channel for details."
        ));
    }

    async fn on_server_request(&mut self, id: serde_json::Value, method: &str, params: serde_json::Value) {
        let Some(connection) = self.client.as_ref().map(LanguageClient::connection) else {
            return;
        };

        let reply = if method == protocol::NO_CONFIG {
            match serde_json::from_value::<NoConfigParams>(params) {
                Ok(params) => self.on_no_config(&params),
                Err(e) => tracing::warn!(linter = self.profile.scope, "Bad noConfig request: {e}"),
            }
            connection.respond(id, serde_json::json!({})).await
        } else {
            tracing::debug!(linter = self.profile.scope, "Unhandled server request '{method}'");
            connection
                .respond_error(
                    id,
                    ResponseError::new(METHOD_NOT_FOUND, format!("Unhandled method {method}")),
                )
                .await
        };
        if let Err(e) = reply {
            tracing::warn!(linter = self.profile.scope, "Failed to answer '{method}': {e}");
        }
    }

    fn on_no_config(&mut self, params: &NoConfigParams) {
        self.log(
            OutputLevel::Info,
            &format!(
                "{} File will not be validated: {}",
                params.message, params.document.uri
            ),
        );
        if !self.no_config_shown {
            self.no_config_shown = true;
            self.host.show_information(&params.message);
        }
    }

    fn on_diagnostics(&mut self, uri: String, items: Vec<LintDiagnostic>) {
        self.diagnostics.set(uri.clone(), items);
        self.host.publish_diagnostics(&uri, self.diagnostics.get(&uri));
    }

    fn clear_diagnostics(&mut self) {
        for (uri, _) in self.diagnostics.snapshot().documents() {
            self.host.publish_diagnostics(uri, &[]);
        }
        self.diagnostics.clear();
    }

    async fn on_transport_error(&mut self, message: &str) {
        self.transport_errors += 1;
        match self.error_handler.error(message, self.transport_errors) {
            ErrorAction::Continue => {}
            ErrorAction::Shutdown => {
                self.log(
                    OutputLevel::Error,
                    "Connection to server is erroring. Shutting down server.",
                );
                self.stop().await;
            }
        }
    }

    fn on_closed(&mut self) {
        // The transport is gone; the client only holds dead handles now.
        self.client = None;
        self.clear_diagnostics();
        self.on_stopped();

        let action = if self.exit_called {
            CloseAction::DoNotRestart
        } else {
            self.error_handler.closed()
        };

        match action {
            CloseAction::Restart => {
                self.log(OutputLevel::Info, "Connection to server got closed. Server will restart.");
                self.restart_pending = true;
            }
            CloseAction::DoNotRestart if self.exit_called => {
                tracing::info!(linter = self.profile.scope, "Server exited itself, not restarting");
            }
            CloseAction::DoNotRestart => {
                let message = format!(
                    "The {} server crashed {MAX_RESTART_COUNT} times in the last {} minutes. \
                     The server will not be restarted.",
                    self.profile.display_name,
                    RESTART_WINDOW.as_secs() / 60
                );
                self.log(OutputLevel::Error, &message);
                self.host.show_error(&message);
            }
        }
    }
}

fn error_chain(error: &dyn std::error::Error) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
