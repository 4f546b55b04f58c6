//! Backend state management
//!
//! This module defines the BaselineBackend struct, which holds the open
//! documents, the feature resolver and the server configuration.

use std::sync::Arc;
use std::sync::atomic::AtomicU32;

use dashmap::DashMap;
use tower_lsp::Client;
use tower_lsp::lsp_types::Url;

use crate::lsp::config::ServerConfig;
use crate::lsp::models::LspDocument;
use crate::web_features::FeatureResolver;

/// The Baseline language server backend, managing state and handling LSP requests.
#[derive(Clone)]
pub struct BaselineBackend {
    pub(super) client: Client,
    pub(super) documents_by_uri: Arc<DashMap<Url, Arc<LspDocument>>>,
    pub(super) serial_document_id: Arc<AtomicU32>,
    /// Read-only after startup; shared by every request.
    pub(super) resolver: Arc<FeatureResolver>,
    pub(super) config: Arc<ServerConfig>,
}

// Manual Debug implementation to keep the document map out of log lines
impl std::fmt::Debug for BaselineBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaselineBackend")
            .field("dataset_available", &self.resolver.is_available())
            .field("feature_count", &self.resolver.feature_count())
            .field("documents_count", &self.documents_by_uri.len())
            .finish()
    }
}
