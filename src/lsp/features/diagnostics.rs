//! Baseline warning markers
//!
//! Scans a whole document, resolves every distinct word once, and emits a
//! warning at each occurrence of a word whose feature is not `high` Baseline.
//! A scan always yields the complete set for the document; publishing it
//! replaces whatever was published before.

use ropey::Rope;
use rustc_hash::FxHashMap;
use tower_lsp::lsp_types::{CodeDescription, Diagnostic, DiagnosticSeverity, NumberOrString, Url};
use tracing::{debug, trace};

use crate::lsp::document::byte_range_to_range;
use crate::lsp::features::words::words;
use crate::web_features::{classify, doc_link, FeatureResolver};

pub const DIAGNOSTIC_SOURCE: &str = "baseline";

/// What a warning needs to know about a resolved token.
#[derive(Debug, Clone)]
struct Verdict {
    feature_id: String,
    doc_link: Option<Url>,
}

pub fn warning_message(token: &str) -> String {
    format!("⚠️ \"{}\" is not fully Baseline supported", token)
}

/// Produces the full diagnostic list for `text`.
pub fn scan_document(resolver: &FeatureResolver, text: &Rope) -> Vec<Diagnostic> {
    if !resolver.is_available() {
        return Vec::new();
    }

    let source = text.to_string();
    let mut verdicts: FxHashMap<&str, Option<Verdict>> = FxHashMap::default();
    let mut diagnostics = Vec::new();

    for word in words(&source) {
        let verdict = verdicts.entry(word.text).or_insert_with(|| {
            let resolution = resolver.resolve(word.text)?;
            if !classify(resolution.record).needs_warning() {
                return None;
            }
            trace!("'{}' flagged as '{}'", word.text, resolution.record.id);
            Some(Verdict {
                feature_id: resolution.record.id.clone(),
                doc_link: doc_link(resolution.record).and_then(|link| Url::parse(&link).ok()),
            })
        });

        if let Some(verdict) = verdict {
            diagnostics.push(Diagnostic {
                range: byte_range_to_range(word.byte_range(), text),
                severity: Some(DiagnosticSeverity::WARNING),
                code: Some(NumberOrString::String(verdict.feature_id.clone())),
                code_description: verdict
                    .doc_link
                    .clone()
                    .map(|href| CodeDescription { href }),
                source: Some(DIAGNOSTIC_SOURCE.to_string()),
                message: warning_message(word.text),
                ..Default::default()
            });
        }
    }

    debug!(
        "Scanned {} distinct words, {} warnings",
        verdicts.len(),
        diagnostics.len()
    );
    diagnostics
}
