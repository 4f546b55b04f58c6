//! In-process LSP client for integration tests.
//!
//! Runs the real `tower_lsp::Server` over an in-memory duplex pipe and speaks
//! framed JSON-RPC to it, the same way an editor does over stdio. Messages the
//! server sends while the client waits for something else are queued and
//! handed out by the `expect_*` helpers.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{
    AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, DuplexStream, ReadHalf, WriteHalf,
};
use tower_lsp::{LspService, Server};
use tracing::debug;

use baseline_language_server::lsp::backend::BaselineBackend;
use baseline_language_server::lsp::config::ServerConfig;
use baseline_language_server::web_features::{FeatureMap, FeatureResolver};

const RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct LspClient {
    reader: BufReader<ReadHalf<DuplexStream>>,
    writer: WriteHalf<DuplexStream>,
    serial_request_id: i64,
    pending: VecDeque<Value>,
}

impl LspClient {
    /// Starts a server with the given raw dataset (or none) on the current runtime.
    pub fn start(features: Option<Value>, config: ServerConfig) -> Self {
        let resolver = Arc::new(FeatureResolver::new(
            features.map(|raw| Arc::new(FeatureMap::load(Some(&raw)))),
            config.resolver_options(),
        ));
        let config = Arc::new(config);
        let (service, socket) =
            LspService::new(|client| BaselineBackend::new(client, resolver, config));

        let (client_side, server_side) = tokio::io::duplex(1 << 16);
        let (server_in, server_out) = tokio::io::split(server_side);
        tokio::spawn(Server::new(server_in, server_out, socket).serve(service));

        let (reader, writer) = tokio::io::split(client_side);
        LspClient {
            reader: BufReader::new(reader),
            writer,
            serial_request_id: 0,
            pending: VecDeque::new(),
        }
    }

    async fn write(&mut self, message: Value) {
        let body = message.to_string();
        let frame = format!("Content-Length: {}\r\n\r\n{}", body.len(), body);
        self.writer
            .write_all(frame.as_bytes())
            .await
            .expect("server input closed");
        self.writer.flush().await.expect("failed to flush server input");
    }

    async fn read(&mut self) -> Value {
        let mut content_length = None;
        loop {
            let mut line = String::new();
            let n = self
                .reader
                .read_line(&mut line)
                .await
                .expect("failed to read server output");
            assert!(n > 0, "server output closed");
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some(length) = line.strip_prefix("Content-Length:") {
                content_length = Some(length.trim().parse::<usize>().expect("bad Content-Length"));
            }
        }
        let mut body = vec![0u8; content_length.expect("missing Content-Length header")];
        self.reader
            .read_exact(&mut body)
            .await
            .expect("truncated server message");
        let message: Value = serde_json::from_slice(&body).expect("server sent invalid JSON");
        debug!("<- {}", message);
        message
    }

    async fn read_with_timeout(&mut self) -> Value {
        tokio::time::timeout(RESPONSE_TIMEOUT, self.read())
            .await
            .expect("timed out waiting for the server")
    }

    async fn next_message(&mut self) -> Value {
        match self.pending.pop_front() {
            Some(message) => message,
            None => self.read_with_timeout().await,
        }
    }

    /// Sends a request and returns the full response object.
    pub async fn request(&mut self, method: &str, params: Value) -> Value {
        self.serial_request_id += 1;
        let id = self.serial_request_id;
        self.write(json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params }))
            .await;
        loop {
            let message = self.read_with_timeout().await;
            if message.get("method").is_none() && message["id"] == json!(id) {
                return message;
            }
            self.pending.push_back(message);
        }
    }

    pub async fn notify(&mut self, method: &str, params: Value) {
        self.write(json!({ "jsonrpc": "2.0", "method": method, "params": params }))
            .await;
    }

    /// Answers a request the server sent to the client.
    pub async fn respond(&mut self, id: Value, result: Value) {
        self.write(json!({ "jsonrpc": "2.0", "id": id, "result": result }))
            .await;
    }

    /// Waits for the next server notification named `method` and returns its
    /// params. Other messages are skipped.
    pub async fn expect_notification(&mut self, method: &str) -> Value {
        loop {
            let message = self.next_message().await;
            if message["method"] == method && message.get("id").is_none() {
                return message["params"].clone();
            }
            debug!("Skipping {} while waiting for {}", message, method);
        }
    }

    /// Waits for the next server-to-client request named `method`; returns
    /// its id and params.
    pub async fn expect_request(&mut self, method: &str) -> (Value, Value) {
        loop {
            let message = self.next_message().await;
            if message["method"] == method {
                if let Some(id) = message.get("id") {
                    return (id.clone(), message["params"].clone());
                }
            }
            debug!("Skipping {} while waiting for {}", message, method);
        }
    }

    pub async fn initialize(&mut self) -> Value {
        let response = self
            .request("initialize", json!({ "capabilities": {} }))
            .await;
        self.notify("initialized", json!({})).await;
        response
    }

    pub async fn did_open(&mut self, uri: &str, language_id: &str, version: i32, text: &str) {
        self.notify(
            "textDocument/didOpen",
            json!({
                "textDocument": {
                    "uri": uri,
                    "languageId": language_id,
                    "version": version,
                    "text": text
                }
            }),
        )
        .await;
    }

    /// Replaces the whole document text.
    pub async fn did_change(&mut self, uri: &str, version: i32, text: &str) {
        self.notify(
            "textDocument/didChange",
            json!({
                "textDocument": { "uri": uri, "version": version },
                "contentChanges": [{ "text": text }]
            }),
        )
        .await;
    }

    pub async fn did_close(&mut self, uri: &str) {
        self.notify("textDocument/didClose", json!({ "textDocument": { "uri": uri } }))
            .await;
    }

    pub async fn execute_command(&mut self, command: &str, arguments: Value) -> Value {
        self.request(
            "workspace/executeCommand",
            json!({ "command": command, "arguments": arguments }),
        )
        .await
    }
}
