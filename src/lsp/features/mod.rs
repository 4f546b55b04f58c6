//! LSP features built on the feature resolver
//!
//! Each module is a pure function of (resolver, document text, request) and
//! knows nothing about the client connection; the backend handlers in
//! `lsp::backend::handlers` do the I/O.
//!
//! - `words` - tokenization shared by hover and diagnostics
//! - `hover` - tooltip for the word under the cursor
//! - `diagnostics` - warning markers for non-Baseline features
//! - `lookup` - the `baseline.checkFeature` command

pub mod diagnostics;
pub mod hover;
pub mod lookup;
pub mod words;
