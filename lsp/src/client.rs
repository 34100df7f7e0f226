//! Language client: owns the server connection and its lifecycle.
//!
//! A client is created by [`LanguageClient::spawn`] (child process over
//! stdio) or [`LanguageClient::connect`] (any byte stream). Both perform the
//! `initialize` handshake before returning, so holding a `LanguageClient` is
//! proof the server accepted the session. Server-originated traffic is
//! surfaced as [`ClientEvent`]s on a per-client channel.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::codec::{FrameReader, FrameWriter};
use crate::error::ClientError;
use crate::protocol::{
    self, FileChangeType, Incoming, Notification, PublishDiagnosticsParams, Request, Response,
    ResponseError,
};
use crate::types::{ClientEvent, ClientOptions, ClientState, ServerOptions};
use jsstyle_types::TextDocument;

const REQUEST_TIMEOUT_SECS: u64 = 30;

const SHUTDOWN_TIMEOUT_SECS: u64 = 2;

const WRITER_CHANNEL_CAPACITY: usize = 64;

type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<Result<serde_json::Value, ResponseError>>>>>;

enum WriterCommand {
    Send(serde_json::Value),
    Shutdown,
}

/// Cloneable request/notification handle onto a client's connection.
///
/// A `Connection` may outlive the borrow of the [`LanguageClient`] it came
/// from; once the client is gone every call fails with
/// [`ClientError::ConnectionClosed`].
#[derive(Clone)]
pub struct Connection {
    writer_tx: mpsc::Sender<WriterCommand>,
    pending: PendingMap,
    next_id: Arc<AtomicU64>,
}

impl Connection {
    /// Send a request and decode its result.
    pub async fn request<P, R>(&self, method: &str, params: &P) -> Result<R, ClientError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let params = serde_json::to_value(params).map_err(|source| ClientError::Serialize {
            method: method.to_string(),
            source,
        })?;
        let result = self.request_raw(method, Some(params)).await?;
        serde_json::from_value(result).map_err(|source| ClientError::Deserialize {
            method: method.to_string(),
            source,
        })
    }

    async fn request_raw(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, ClientError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id, tx);

        let frame = serde_json::to_value(Request::new(id, method, params)).map_err(|source| {
            ClientError::Serialize {
                method: method.to_string(),
                source,
            }
        })?;
        if self.writer_tx.send(WriterCommand::Send(frame)).await.is_err() {
            self.pending.lock().await.remove(&id);
            return Err(ClientError::ConnectionClosed);
        }

        match tokio::time::timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS), rx).await {
            Ok(Ok(outcome)) => outcome.map_err(ClientError::Response),
            Ok(Err(_)) => {
                // Reader task dropped the sender: server went away.
                self.pending.lock().await.remove(&id);
                Err(ClientError::ConnectionClosed)
            }
            Err(_) => {
                self.pending.lock().await.remove(&id);
                Err(ClientError::Timeout {
                    method: method.to_string(),
                })
            }
        }
    }

    pub async fn notify<P>(&self, method: &str, params: &P) -> Result<(), ClientError>
    where
        P: Serialize + ?Sized,
    {
        let params = serde_json::to_value(params).map_err(|source| ClientError::Serialize {
            method: method.to_string(),
            source,
        })?;
        self.notify_raw(method, Some(params)).await
    }

    async fn notify_raw(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<(), ClientError> {
        let frame = serde_json::to_value(Notification::new(method, params)).map_err(|source| {
            ClientError::Serialize {
                method: method.to_string(),
                source,
            }
        })?;
        self.send_frame(frame).await
    }

    /// Answer a server request with a result.
    pub async fn respond(
        &self,
        id: serde_json::Value,
        result: serde_json::Value,
    ) -> Result<(), ClientError> {
        self.send_response(Response::ok(id, result)).await
    }

    /// Answer a server request with an error.
    pub async fn respond_error(
        &self,
        id: serde_json::Value,
        error: ResponseError,
    ) -> Result<(), ClientError> {
        self.send_response(Response::err(id, error)).await
    }

    async fn send_response(&self, response: Response) -> Result<(), ClientError> {
        let frame = serde_json::to_value(response).map_err(|source| ClientError::Serialize {
            method: "response".to_string(),
            source,
        })?;
        self.send_frame(frame).await
    }

    async fn send_frame(&self, frame: serde_json::Value) -> Result<(), ClientError> {
        self.writer_tx
            .send(WriterCommand::Send(frame))
            .await
            .map_err(|_| ClientError::ConnectionClosed)
    }
}

pub struct LanguageClient {
    name: String,
    connection: Connection,
    child: Option<Child>,
    /// Unbounded so the reader never stalls behind unread events while a
    /// response is awaited.
    events: mpsc::UnboundedReceiver<ClientEvent>,
    document_selector: Vec<String>,
    watched_files: GlobSet,
    /// URIs we've sent didOpen for (to distinguish didOpen vs didChange).
    opened_docs: HashSet<String>,
    reader_handle: JoinHandle<()>,
    writer_handle: JoinHandle<()>,
}

impl LanguageClient {
    /// Launch the server as a child process and initialize it.
    pub async fn spawn(server: &ServerOptions, options: &ClientOptions) -> Result<Self, ClientError> {
        let resolved_cmd =
            which::which(&server.command).map_err(|source| ClientError::CommandNotFound {
                command: server.command.clone(),
                source,
            })?;
        let mut cmd = Command::new(&resolved_cmd);
        cmd.args(&server.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| ClientError::Spawn {
            command: server.command.clone(),
            source,
        })?;

        let stdout = child.stdout.take().ok_or(ClientError::MissingPipe("stdout"))?;
        let stdin = child.stdin.take().ok_or(ClientError::MissingPipe("stdin"))?;
        if let Some(stderr) = child.stderr.take() {
            let name = options.name.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    tracing::debug!(server = %name, "stderr: {line}");
                }
            });
        }

        Self::establish(stdout, stdin, Some(child), options).await
    }

    /// Initialize a server reachable over an already-open byte stream.
    pub async fn connect<R, W>(reader: R, writer: W, options: &ClientOptions) -> Result<Self, ClientError>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        Self::establish(reader, writer, None, options).await
    }

    async fn establish<R, W>(
        reader: R,
        writer: W,
        child: Option<Child>,
        options: &ClientOptions,
    ) -> Result<Self, ClientError>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let (event_tx, events) = mpsc::unbounded_channel();

        let (writer_tx, mut writer_rx) = mpsc::channel::<WriterCommand>(WRITER_CHANNEL_CAPACITY);
        let writer_name = options.name.clone();
        let writer_handle = tokio::spawn(async move {
            let mut writer = FrameWriter::new(writer);
            while let Some(cmd) = writer_rx.recv().await {
                match cmd {
                    WriterCommand::Send(frame) => {
                        if let Err(e) = writer.write_frame(&frame).await {
                            tracing::warn!(server = %writer_name, "Write error: {e}");
                            break;
                        }
                    }
                    WriterCommand::Shutdown => break,
                }
            }
        });

        let reader_pending = pending.clone();
        let reader_writer_tx = writer_tx.clone();
        let reader_event_tx = event_tx.clone();
        let reader_name = options.name.clone();
        let reader_handle = tokio::spawn(async move {
            let mut reader = FrameReader::new(reader);
            loop {
                match reader.read_frame().await {
                    Ok(Some(frame)) => {
                        Self::dispatch_frame(
                            &frame,
                            &reader_pending,
                            &reader_event_tx,
                            &reader_writer_tx,
                            &reader_name,
                        )
                        .await;
                    }
                    Ok(None) => {
                        tracing::info!(server = %reader_name, "Server closed its output stream");
                        break;
                    }
                    Err(e) if e.is_recoverable() => {
                        tracing::warn!(server = %reader_name, "Dropping undecodable frame: {e}");
                        let _ = reader_event_tx.send(ClientEvent::TransportError {
                            message: e.to_string(),
                        });
                    }
                    Err(e) => {
                        tracing::warn!(server = %reader_name, "Reader error: {e}");
                        break;
                    }
                }
            }
            // Fail whatever is still waiting for a response.
            reader_pending.lock().await.clear();
            let _ = reader_event_tx.send(ClientEvent::Closed);
        });

        let _ = event_tx.send(ClientEvent::StateChanged(ClientState::Starting));

        let client = Self {
            name: options.name.clone(),
            connection: Connection {
                writer_tx,
                pending,
                next_id: Arc::new(AtomicU64::new(1)),
            },
            child,
            events,
            document_selector: options.document_selector.clone(),
            watched_files: build_glob_set(&options.name, &options.watched_files),
            opened_docs: HashSet::new(),
            reader_handle,
            writer_handle,
        };

        client.initialize(options).await?;
        let _ = event_tx.send(ClientEvent::StateChanged(ClientState::Running));

        Ok(client)
    }

    async fn dispatch_frame(
        frame: &serde_json::Value,
        pending: &Mutex<HashMap<u64, oneshot::Sender<Result<serde_json::Value, ResponseError>>>>,
        event_tx: &mpsc::UnboundedSender<ClientEvent>,
        writer_tx: &mpsc::Sender<WriterCommand>,
        server_name: &str,
    ) {
        let Some(incoming) = protocol::parse_incoming(frame) else {
            tracing::trace!("Ignoring malformed JSON-RPC frame from '{server_name}'");
            return;
        };

        match incoming {
            Incoming::Response { id, outcome } => {
                let sender = pending.lock().await.remove(&id);
                if let Some(tx) = sender {
                    let _ = tx.send(outcome);
                }
            }
            Incoming::Request { id, method, .. }
                if method == "client/registerCapability"
                    || method == "client/unregisterCapability" =>
            {
                // Nothing is registered dynamically; acknowledge so the server doesn't wait.
                let response = Response::ok(id, serde_json::Value::Null);
                if let Ok(frame) = serde_json::to_value(response) {
                    let _ = writer_tx.send(WriterCommand::Send(frame)).await;
                }
            }
            Incoming::Request { id, method, params } => {
                let _ = event_tx.send(ClientEvent::Request { id, method, params });
            }
            Incoming::Notification { method, params } => {
                Self::handle_notification(server_name, method, params, event_tx);
            }
        }
    }

    fn handle_notification(
        server_name: &str,
        method: String,
        params: serde_json::Value,
        event_tx: &mpsc::UnboundedSender<ClientEvent>,
    ) {
        if method == protocol::PUBLISH_DIAGNOSTICS {
            match serde_json::from_value::<PublishDiagnosticsParams>(params) {
                Ok(diag_params) => {
                    let items = diag_params
                        .diagnostics
                        .into_iter()
                        .map(protocol::WireDiagnostic::into_lint_diagnostic)
                        .collect();
                    let _ = event_tx.send(ClientEvent::Diagnostics {
                        uri: diag_params.uri,
                        items,
                    });
                }
                Err(e) => {
                    tracing::debug!("Failed to parse publishDiagnostics from '{server_name}': {e}");
                }
            }
        } else if method == "window/logMessage" {
            let message = params["message"].as_str().unwrap_or_default();
            tracing::debug!(server = %server_name, "{message}");
        } else {
            let _ = event_tx.send(ClientEvent::Notification { method, params });
        }
    }

    async fn initialize(&self, options: &ClientOptions) -> Result<(), ClientError> {
        let params =
            protocol::initialize_params(options.root_uri.as_deref(), &options.initialization_options);
        match self.connection.request_raw("initialize", Some(params)).await {
            Ok(_) => {}
            Err(ClientError::Response(error)) => return Err(ClientError::Initialize(error)),
            Err(e) => return Err(e),
        }
        self.connection
            .notify_raw("initialized", Some(serde_json::json!({})))
            .await
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// A cloneable handle for issuing requests.
    #[must_use]
    pub fn connection(&self) -> Connection {
        self.connection.clone()
    }

    /// Next pending event without waiting.
    pub fn try_next_event(&mut self) -> Option<ClientEvent> {
        self.events.try_recv().ok()
    }

    /// Wait for the next event. `None` once the reader is gone and the
    /// queue is drained.
    pub async fn next_event(&mut self) -> Option<ClientEvent> {
        self.events.recv().await
    }

    #[must_use]
    pub fn handles_language(&self, language_id: &str) -> bool {
        self.document_selector.iter().any(|l| l == language_id)
    }

    /// Send `didOpen` for a selected document. Returns `false` when the
    /// document's language is not in the selector.
    pub async fn did_open(&mut self, document: &TextDocument, text: &str) -> Result<bool, ClientError> {
        if !self.handles_language(&document.language_id) {
            return Ok(false);
        }
        self.opened_docs.insert(document.uri.clone());
        self.connection
            .notify_raw(
                "textDocument/didOpen",
                Some(protocol::did_open_params(document, text)),
            )
            .await?;
        Ok(true)
    }

    /// Full-text sync. Falls back to `didOpen` for documents the server has
    /// not seen yet.
    pub async fn did_change(&mut self, document: &TextDocument, text: &str) -> Result<bool, ClientError> {
        if !self.opened_docs.contains(&document.uri) {
            return self.did_open(document, text).await;
        }
        self.connection
            .notify_raw(
                "textDocument/didChange",
                Some(protocol::did_change_params(document, text)),
            )
            .await?;
        Ok(true)
    }

    pub async fn did_close(&mut self, uri: &str) -> Result<bool, ClientError> {
        if !self.opened_docs.remove(uri) {
            return Ok(false);
        }
        self.connection
            .notify_raw("textDocument/didClose", Some(protocol::did_close_params(uri)))
            .await?;
        Ok(true)
    }

    pub async fn did_change_configuration(&self, settings: serde_json::Value) -> Result<(), ClientError> {
        self.connection
            .notify_raw(
                "workspace/didChangeConfiguration",
                Some(protocol::did_change_configuration_params(settings)),
            )
            .await
    }

    /// Forward a file-system change if it matches a watched pattern.
    pub async fn did_change_watched_file(
        &self,
        path: &Path,
        kind: FileChangeType,
    ) -> Result<bool, ClientError> {
        if !self.watched_files.is_match(path) {
            return Ok(false);
        }
        let uri = match protocol::path_to_file_uri(path) {
            Ok(uri) => uri,
            Err(e) => {
                tracing::warn!("Skipping watched-file notification: {e}");
                return Ok(false);
            }
        };
        self.connection
            .notify_raw(
                "workspace/didChangeWatchedFiles",
                Some(protocol::did_change_watched_files_params(uri.as_str(), kind)),
            )
            .await?;
        Ok(true)
    }

    /// Gracefully shut down the server. Consumes self.
    pub async fn shutdown(mut self) {
        if let Ok(response) = self.connection.request_raw("shutdown", None).await {
            tracing::trace!(server = %self.name, ?response, "Shutdown acknowledged");
            let _ = self.connection.notify_raw("exit", None).await;
        }

        let _ = self.connection.writer_tx.send(WriterCommand::Shutdown).await;
        let _ = self.writer_handle.await;

        if let Some(child) = self.child.as_mut() {
            let exited =
                tokio::time::timeout(Duration::from_secs(SHUTDOWN_TIMEOUT_SECS), child.wait()).await;
            if exited.is_err() {
                tracing::debug!("Server '{}' didn't exit in time, killing", self.name);
                let _ = child.kill().await;
            }
        }
        self.reader_handle.abort();
    }
}

fn build_glob_set(name: &str, patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match Glob::new(pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => tracing::warn!(server = %name, "Ignoring invalid watch pattern '{pattern}': {e}"),
        }
    }
    builder.build().unwrap_or_else(|e| {
        tracing::warn!(server = %name, "Failed to build watch patterns: {e}");
        GlobSet::empty()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsstyle_types::{AllFixesParams, AllFixesResult};
    use tokio::io::{DuplexStream, ReadHalf, WriteHalf};

    type ServerSide = (FrameReader<ReadHalf<DuplexStream>>, FrameWriter<WriteHalf<DuplexStream>>);

    fn options() -> ClientOptions {
        ClientOptions {
            name: "standard".to_string(),
            document_selector: vec!["javascript".to_string(), "javascriptreact".to_string()],
            watched_files: vec!["**/package.json".to_string()],
            root_uri: None,
            initialization_options: serde_json::json!({ "legacyModuleResolve": false }),
        }
    }

    fn pipe() -> (ReadHalf<DuplexStream>, WriteHalf<DuplexStream>, ServerSide) {
        let (client_io, server_io) = tokio::io::duplex(64 * 1024);
        let (client_read, client_write) = tokio::io::split(client_io);
        let (server_read, server_write) = tokio::io::split(server_io);
        (
            client_read,
            client_write,
            (FrameReader::new(server_read), FrameWriter::new(server_write)),
        )
    }

    async fn expect_frame(reader: &mut FrameReader<ReadHalf<DuplexStream>>) -> serde_json::Value {
        reader.read_frame().await.unwrap().expect("client closed stream")
    }

    /// Answer `initialize` and swallow `initialized`.
    async fn accept_handshake(server: &mut ServerSide) {
        let init = expect_frame(&mut server.0).await;
        assert_eq!(init["method"], "initialize");
        assert_eq!(init["params"]["initializationOptions"]["legacyModuleResolve"], false);
        server
            .1
            .write_frame(&serde_json::json!({
                "jsonrpc": "2.0", "id": init["id"], "result": { "capabilities": {} }
            }))
            .await
            .unwrap();
        let initialized = expect_frame(&mut server.0).await;
        assert_eq!(initialized["method"], "initialized");
    }

    async fn connected() -> (LanguageClient, ServerSide) {
        let (read, write, mut server) = pipe();
        let (client, ()) = tokio::join!(
            async { LanguageClient::connect(read, write, &options()).await.unwrap() },
            accept_handshake(&mut server)
        );
        (client, server)
    }

    #[tokio::test]
    async fn handshake_emits_starting_then_running() {
        let (mut client, _server) = connected().await;
        assert!(matches!(
            client.try_next_event(),
            Some(ClientEvent::StateChanged(ClientState::Starting))
        ));
        assert!(matches!(
            client.try_next_event(),
            Some(ClientEvent::StateChanged(ClientState::Running))
        ));
    }

    #[tokio::test]
    async fn initialize_error_keeps_code() {
        let (read, write, mut server) = pipe();
        let respond = async {
            let init = expect_frame(&mut server.0).await;
            server
                .1
                .write_frame(&serde_json::json!({
                    "jsonrpc": "2.0",
                    "id": init["id"],
                    "error": { "code": 100, "message": "Failed to load standard library" }
                }))
                .await
                .unwrap();
        };
        let opts = options();
        let (result, ()) = tokio::join!(LanguageClient::connect(read, write, &opts), respond);
        let err = result.err().expect("initialize must fail");
        assert_eq!(err.initialize_code(), Some(100));
    }

    #[tokio::test]
    async fn typed_request_round_trip() {
        let (client, mut server) = connected().await;
        let connection = client.connection();
        let params = AllFixesParams::new("file:///a.js");

        let serve = async {
            let request = expect_frame(&mut server.0).await;
            assert_eq!(request["method"], protocol::ALL_FIXES);
            assert_eq!(request["params"]["textDocument"]["uri"], "file:///a.js");
            server
                .1
                .write_frame(&serde_json::json!({
                    "jsonrpc": "2.0",
                    "id": request["id"],
                    "result": { "documentVersion": 3, "edits": [] }
                }))
                .await
                .unwrap();
        };
        let (result, ()) = tokio::join!(
            connection.request::<_, Option<AllFixesResult>>(
                protocol::ALL_FIXES,
                &params
            ),
            serve
        );
        let result = result.unwrap().expect("non-null result");
        assert_eq!(result.document_version, 3);
    }

    #[tokio::test]
    async fn response_behind_undrained_notifications_still_arrives() {
        let (mut client, mut server) = connected().await;
        let connection = client.connection();
        let params = AllFixesParams::new("file:///a.js");

        let serve = async {
            let request = expect_frame(&mut server.0).await;
            for step in 0..300 {
                server
                    .1
                    .write_frame(&serde_json::json!({
                        "jsonrpc": "2.0", "method": "custom/progress", "params": { "step": step }
                    }))
                    .await
                    .unwrap();
            }
            server
                .1
                .write_frame(&serde_json::json!({
                    "jsonrpc": "2.0",
                    "id": request["id"],
                    "result": { "documentVersion": 5, "edits": [] }
                }))
                .await
                .unwrap();
        };
        let (result, ()) = tokio::join!(
            tokio::time::timeout(
                Duration::from_secs(5),
                connection.request::<_, Option<AllFixesResult>>(protocol::ALL_FIXES, &params)
            ),
            serve
        );
        let result = result.expect("response arrived in time").unwrap();
        assert_eq!(result.map(|r| r.document_version), Some(5));

        let queued = std::iter::from_fn(|| client.try_next_event())
            .filter(|event| matches!(event, ClientEvent::Notification { .. }))
            .count();
        assert_eq!(queued, 300);
    }

    #[tokio::test]
    async fn error_response_surfaces_as_response_error() {
        let (client, mut server) = connected().await;
        let connection = client.connection();
        let params = AllFixesParams::new("file:///a.js");

        let serve = async {
            let request = expect_frame(&mut server.0).await;
            server
                .1
                .write_frame(&serde_json::json!({
                    "jsonrpc": "2.0",
                    "id": request["id"],
                    "error": { "code": -32603, "message": "internal" }
                }))
                .await
                .unwrap();
        };
        let (result, ()) = tokio::join!(
            connection.request::<_, Option<AllFixesResult>>(
                protocol::ALL_FIXES,
                &params
            ),
            serve
        );
        assert!(matches!(result, Err(ClientError::Response(e)) if e.code == -32603));
    }

    #[tokio::test]
    async fn server_close_fails_pending_and_emits_closed() {
        let (mut client, mut server) = connected().await;
        let connection = client.connection();
        let params = AllFixesParams::new("file:///a.js");

        let close = async {
            let _request = expect_frame(&mut server.0).await;
            drop(server);
        };
        let (result, ()) = tokio::join!(
            connection.request::<_, serde_json::Value>(protocol::ALL_FIXES, &params),
            close
        );
        assert!(matches!(result, Err(ClientError::ConnectionClosed)));

        let mut saw_closed = false;
        while let Some(event) = client.next_event().await {
            if matches!(event, ClientEvent::Closed) {
                saw_closed = true;
                break;
            }
        }
        assert!(saw_closed);
    }

    #[tokio::test]
    async fn notifications_and_requests_become_events() {
        let (mut client, mut server) = connected().await;
        // Skip lifecycle events.
        client.try_next_event();
        client.try_next_event();

        server
            .1
            .write_frame(&serde_json::json!({
                "jsonrpc": "2.0", "method": protocol::STATUS, "params": { "state": 3 }
            }))
            .await
            .unwrap();
        match client.next_event().await {
            Some(ClientEvent::Notification { method, params }) => {
                assert_eq!(method, protocol::STATUS);
                assert_eq!(params["state"], 3);
            }
            other => panic!("expected notification, got {other:?}"),
        }

        server
            .1
            .write_frame(&serde_json::json!({
                "jsonrpc": "2.0", "id": 11, "method": protocol::NO_CONFIG,
                "params": { "message": "No config", "document": { "uri": "file:///a.js" } }
            }))
            .await
            .unwrap();
        match client.next_event().await {
            Some(ClientEvent::Request { id, method, .. }) => {
                assert_eq!(id, 11);
                assert_eq!(method, protocol::NO_CONFIG);
                client.connection().respond(id, serde_json::json!({})).await.unwrap();
            }
            other => panic!("expected request, got {other:?}"),
        }
        let reply = expect_frame(&mut server.0).await;
        assert_eq!(reply["id"], 11);
        assert_eq!(reply["result"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn register_capability_is_acknowledged_without_event() {
        let (mut client, mut server) = connected().await;
        client.try_next_event();
        client.try_next_event();

        server
            .1
            .write_frame(&serde_json::json!({
                "jsonrpc": "2.0", "id": 1, "method": "client/registerCapability", "params": {}
            }))
            .await
            .unwrap();
        let reply = expect_frame(&mut server.0).await;
        assert_eq!(reply["id"], 1);
        assert!(reply["result"].is_null());
        assert!(client.try_next_event().is_none());
    }

    #[tokio::test]
    async fn publish_diagnostics_becomes_event() {
        let (mut client, mut server) = connected().await;
        client.try_next_event();
        client.try_next_event();

        server
            .1
            .write_frame(&serde_json::json!({
                "jsonrpc": "2.0",
                "method": protocol::PUBLISH_DIAGNOSTICS,
                "params": {
                    "uri": "file:///a.js",
                    "diagnostics": [{
                        "range": { "start": { "line": 0, "character": 9 }, "end": { "line": 0, "character": 10 } },
                        "severity": 1,
                        "message": "Extra semicolon."
                    }]
                }
            }))
            .await
            .unwrap();
        match client.next_event().await {
            Some(ClientEvent::Diagnostics { uri, items }) => {
                assert_eq!(uri, "file:///a.js");
                assert_eq!(items[0].message(), "Extra semicolon.");
            }
            other => panic!("expected diagnostics, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn document_sync_respects_selector() {
        let (mut client, mut server) = connected().await;

        let markdown = TextDocument::new("file:///README.md", "markdown", 1);
        assert!(!client.did_open(&markdown, "# hi").await.unwrap());

        let js = TextDocument::new("file:///a.js", "javascript", 1);
        assert!(client.did_change(&js, "var a = 1;").await.unwrap());
        let open = expect_frame(&mut server.0).await;
        assert_eq!(open["method"], "textDocument/didOpen");

        let js = TextDocument::new("file:///a.js", "javascript", 2);
        assert!(client.did_change(&js, "var a = 2;").await.unwrap());
        let change = expect_frame(&mut server.0).await;
        assert_eq!(change["method"], "textDocument/didChange");
        assert_eq!(change["params"]["textDocument"]["version"], 2);

        assert!(client.did_close("file:///a.js").await.unwrap());
        assert!(!client.did_close("file:///a.js").await.unwrap());
        let close = expect_frame(&mut server.0).await;
        assert_eq!(close["method"], "textDocument/didClose");
    }

    #[cfg(not(windows))]
    #[tokio::test]
    async fn watched_files_filtered_by_glob() {
        let (client, mut server) = connected().await;
        assert!(!client
            .did_change_watched_file(Path::new("/repo/index.js"), FileChangeType::Changed)
            .await
            .unwrap());
        assert!(client
            .did_change_watched_file(Path::new("/repo/package.json"), FileChangeType::Changed)
            .await
            .unwrap());
        let frame = expect_frame(&mut server.0).await;
        assert_eq!(frame["method"], "workspace/didChangeWatchedFiles");
        assert_eq!(frame["params"]["changes"][0]["uri"], "file:///repo/package.json");
    }

    #[test]
    fn invalid_glob_is_skipped() {
        let set = build_glob_set("standard", &["[".to_string(), "**/package.json".to_string()]);
        assert!(set.is_match("a/package.json"));
    }
}
