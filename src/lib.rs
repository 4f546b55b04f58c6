pub mod logging;
pub mod lsp;
pub mod web_features;
