//! LSP protocol handler implementations
//!
//! This module contains the `tower_lsp::LanguageServer` trait implementation
//! for the Baseline backend:
//! - Lifecycle handlers (initialize, initialized, shutdown)
//! - Document lifecycle (did_open, did_change, did_close)
//! - Information providers (hover, execute_command)

use std::sync::Arc;

use serde_json::Value;
use tower_lsp::{LanguageServer, jsonrpc};
use tower_lsp::lsp_types::{
    DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
    ExecuteCommandOptions, ExecuteCommandParams, Hover, HoverParams, HoverProviderCapability,
    InitializeParams, InitializeResult, InitializedParams, MessageType, ServerCapabilities,
    ServerInfo, TextDocumentSyncCapability, TextDocumentSyncKind,
};
use tower_lsp::jsonrpc::Result as LspResult;

use tracing::{debug, error, info, warn};

use super::state::BaselineBackend;
use crate::lsp::features::hover::feature_hover;
use crate::lsp::features::lookup::{
    lookup, CHECK_FEATURE_COMMAND, DATASET_UNAVAILABLE_MESSAGE, HELLO_WORLD_COMMAND,
    HELLO_WORLD_MESSAGE,
};
use crate::lsp::models::LspDocument;

#[tower_lsp::async_trait]
impl LanguageServer for BaselineBackend {
    /// Handles the LSP initialize request, advertising hover, incremental sync and the commands.
    async fn initialize(&self, params: InitializeParams) -> LspResult<InitializeResult> {
        info!(
            "Received initialize from {:?}",
            params.client_info.as_ref().map(|c| c.name.as_str())
        );
        debug!("Initialize params: {:?}", params);

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::INCREMENTAL)),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: vec![
                        HELLO_WORLD_COMMAND.to_string(),
                        CHECK_FEATURE_COMMAND.to_string(),
                    ],
                    work_done_progress_options: Default::default(),
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    /// Handles the LSP initialized notification.
    async fn initialized(&self, _: InitializedParams) {
        info!("Initialized with {} features", self.resolver.feature_count());
        if !self.resolver.is_available() {
            warn!("Running without a web-features dataset; every lookup will be 'not found'");
            self.client
                .show_message(MessageType::WARNING, DATASET_UNAVAILABLE_MESSAGE)
                .await;
        }
    }

    /// Handles the LSP shutdown request.
    async fn shutdown(&self) -> LspResult<()> {
        info!("Received shutdown request");
        Ok(())
    }

    /// Handles opening a text document and publishes its first scan.
    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        info!(
            "Opening document: URI={}, version={}, language={}",
            params.text_document.uri, params.text_document.version, params.text_document.language_id
        );
        let uri = params.text_document.uri;
        let document = Arc::new(LspDocument::new(
            self.next_document_id(),
            params.text_document.language_id,
            &params.text_document.text,
            params.text_document.version,
        ));
        self.documents_by_uri.insert(uri.clone(), document);
        self.validate(&uri).await;
    }

    /// Applies content changes and re-scans. The new scan replaces the old diagnostics.
    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        debug!("textDocument/didChange: URI={}, version={}", uri, version);

        let Some(document) = self.document(&uri) else {
            warn!("Failed to find document with URI={}", uri);
            return;
        };
        if document.apply(params.content_changes, version).await.is_none() {
            warn!("Failed to apply changes to document with URI={} at version {}", uri, version);
            return;
        }
        self.validate(&uri).await;
    }

    /// Forgets the document and clears its diagnostics.
    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        // DashMap::remove returns Option<(K, V)>
        if let Some((_key, document)) = self.documents_by_uri.remove(&uri) {
            info!("Closed document: {}, id: {}", uri, document.id);
        } else {
            warn!("Failed to find document with URI={}", uri);
        }
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }

    /// Shows the Baseline status of the feature under the cursor.
    async fn hover(&self, params: HoverParams) -> LspResult<Option<Hover>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        debug!("Hover request at {}:{:?}", uri, position);

        let Some(document) = self.document(&uri) else {
            debug!("Document not found: {}", uri);
            return Ok(None);
        };
        let snapshot = document.snapshot().await;
        if !self.config.handles_language(&snapshot.language_id) {
            return Ok(None);
        }
        Ok(feature_hover(&self.resolver, &snapshot.text, position))
    }

    /// Runs `baseline.helloWorld` or `baseline.checkFeature`.
    async fn execute_command(&self, params: ExecuteCommandParams) -> LspResult<Option<Value>> {
        info!("workspace/executeCommand: {}", params.command);
        match params.command.as_str() {
            HELLO_WORLD_COMMAND => {
                self.client
                    .show_message(MessageType::INFO, HELLO_WORLD_MESSAGE)
                    .await;
                Ok(None)
            }
            CHECK_FEATURE_COMMAND => {
                let token = match params.arguments.first() {
                    None | Some(Value::Null) => return Ok(None),
                    Some(Value::String(token)) => token,
                    Some(other) => {
                        return Err(jsonrpc::Error::invalid_params(format!(
                            "{} expects a feature id or name, got {}",
                            CHECK_FEATURE_COMMAND, other
                        )));
                    }
                };
                let Some(outcome) = lookup(&self.resolver, token) else {
                    debug!("Blank lookup input, nothing to do");
                    return Ok(None);
                };
                self.notify_lookup(&outcome);
                serde_json::to_value(&outcome).map(Some).map_err(|e| {
                    error!("Failed to serialize lookup outcome: {}", e);
                    jsonrpc::Error::internal_error()
                })
            }
            other => Err(jsonrpc::Error::invalid_params(format!("Unknown command: {}", other))),
        }
    }
}
