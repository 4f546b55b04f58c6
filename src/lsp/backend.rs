use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use dashmap::DashMap;
use tower_lsp::Client;
use tower_lsp::lsp_types::{
    Diagnostic, MessageActionItem, MessageType, ShowDocumentParams, Url,
};
use tracing::{debug, info, warn};

use crate::lsp::config::ServerConfig;
use crate::lsp::features::diagnostics::scan_document;
use crate::lsp::features::lookup::{LookupOutcome, OPEN_DOCS_ACTION};
use crate::lsp::models::LspDocument;
use crate::web_features::FeatureResolver;

mod handlers;
mod state;

pub use state::BaselineBackend;

impl BaselineBackend {
    /// Creates a backend around an already-loaded resolver. The resolver is
    /// built once at startup and never replaced.
    pub fn new(client: Client, resolver: Arc<FeatureResolver>, config: Arc<ServerConfig>) -> Self {
        info!(
            "Creating backend: dataset available={}, features={}, substring fallback={}",
            resolver.is_available(),
            resolver.feature_count(),
            resolver.options().substring_fallback
        );
        Self {
            client,
            documents_by_uri: Arc::new(DashMap::new()),
            serial_document_id: Arc::new(AtomicU32::new(0)),
            resolver,
            config,
        }
    }

    pub(super) fn next_document_id(&self) -> u32 {
        self.serial_document_id.fetch_add(1, Ordering::SeqCst)
    }

    pub(super) fn document(&self, uri: &Url) -> Option<Arc<LspDocument>> {
        // DashMap::get returns a guard that dereferences to the value
        self.documents_by_uri.get(uri).map(|r| r.value().clone())
    }

    /// Scans the open document at `uri`. Returns the version the scan ran
    /// against and the complete diagnostic list, or `None` when the document
    /// is not open or its language is not annotated.
    pub async fn scan(&self, uri: &Url) -> Option<(i32, Vec<Diagnostic>)> {
        let document = self.document(uri)?;
        let snapshot = document.snapshot().await;
        if !self.config.handles_language(&snapshot.language_id) {
            debug!("Skipping scan of {} (language '{}')", uri, snapshot.language_id);
            return None;
        }
        let diagnostics = scan_document(&self.resolver, &snapshot.text);
        Some((snapshot.version, diagnostics))
    }

    /// Scans a document and publishes the result unless the document moved
    /// on to a newer version in the meantime.
    pub(super) async fn validate(&self, uri: &Url) {
        let Some((version, diagnostics)) = self.scan(uri).await else {
            return;
        };
        self.publish_if_current(uri, version, diagnostics).await;
    }

    /// Publishes `diagnostics` computed against `version`. Returns `false`
    /// without publishing when the document was closed or has a newer version.
    pub async fn publish_if_current(&self, uri: &Url, version: i32, diagnostics: Vec<Diagnostic>) -> bool {
        let current = match self.document(uri) {
            Some(document) => document.version().await,
            None => {
                debug!("Document {} closed during scan, dropping diagnostics", uri);
                return false;
            }
        };
        if current != version {
            debug!("Discarding stale scan of {} (version {} < {})", uri, version, current);
            return false;
        }
        debug!("Publishing {} diagnostics for {} version {}", diagnostics.len(), uri, version);
        self.client
            .publish_diagnostics(uri.clone(), diagnostics, Some(version))
            .await;
        true
    }

    /// Shows the lookup result to the user. Runs detached so the command
    /// reply does not wait on the user choosing an action.
    pub(super) fn notify_lookup(&self, outcome: &LookupOutcome) {
        let client = self.client.clone();
        let outcome = outcome.clone();
        tokio::spawn(async move {
            match outcome {
                LookupOutcome::Found { message, doc_link, .. } => {
                    let actions = doc_link.as_ref().map(|_| {
                        vec![MessageActionItem {
                            title: OPEN_DOCS_ACTION.to_string(),
                            properties: Default::default(),
                        }]
                    });
                    let choice = client
                        .show_message_request(MessageType::INFO, message, actions)
                        .await;
                    match (choice, doc_link) {
                        (Ok(Some(item)), Some(link)) if item.title == OPEN_DOCS_ACTION => {
                            open_external(&client, &link).await;
                        }
                        (Ok(_), _) => {}
                        (Err(e), _) => debug!("Lookup message request failed: {}", e),
                    }
                }
                LookupOutcome::NotFound { message, .. } => {
                    client.show_message(MessageType::WARNING, message).await;
                }
                LookupOutcome::Unavailable { message } => {
                    client.show_message(MessageType::ERROR, message).await;
                }
            }
        });
    }
}

async fn open_external(client: &Client, link: &str) {
    let uri = match Url::parse(link) {
        Ok(uri) => uri,
        Err(e) => {
            warn!("Documentation link '{}' is not a valid URL: {}", link, e);
            return;
        }
    };
    let params = ShowDocumentParams {
        uri,
        external: Some(true),
        take_focus: Some(true),
        selection: None,
    };
    match client.show_document(params).await {
        Ok(true) => debug!("Opened documentation {}", link),
        Ok(false) => warn!("Client declined to open {}", link),
        Err(e) => warn!("Failed to open {}: {}", link, e),
    }
}
