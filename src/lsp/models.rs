use ropey::Rope;

/// State for an open text document managed by the LSP server.
#[derive(Debug)]
pub struct LspDocumentState {
    pub language_id: String,
    pub text: Rope,
    pub version: i32,
}

/// LSP document with state for open files.
#[derive(Debug)]
pub struct LspDocument {
    pub id: u32,
    pub state: tokio::sync::RwLock<LspDocumentState>,
}

/// Point-in-time copy of a document, taken before running a scan so the
/// lock is not held while resolving tokens.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    pub language_id: String,
    pub text: Rope,
    pub version: i32,
}
