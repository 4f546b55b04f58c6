//! Hover tooltips for web-platform features
//!
//! ```text
//! User hovers over a word
//!       ↓
//! word_at(cursor)
//!       ├─→ FeatureResolver::resolve(word)
//!       ├─→ classify + doc_link
//!       └─→ markdown tooltip spanning the word
//! ```

use ropey::Rope;
use tower_lsp::lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind, Position};
use tracing::debug;

use crate::lsp::document::{byte_range_to_range, position_to_char_idx};
use crate::lsp::features::words::word_at;
use crate::web_features::{classify, doc_link, FeatureRecord, FeatureResolver};

pub const NO_DOCS_PLACEHOLDER: &str = "No Docs Available";

/// Markdown body of a feature tooltip.
pub fn hover_markdown(record: &FeatureRecord) -> String {
    let docs = match doc_link(record) {
        Some(link) => format!("[Docs]({})", link),
        None => NO_DOCS_PLACEHOLDER.to_string(),
    };
    // Two trailing spaces force markdown line breaks.
    format!(
        "**{}**  \n{}  \n{}",
        record.display_name(),
        classify(record).label(),
        docs
    )
}

/// Hover for the word under `position`, or `None` when there is no word or
/// the word does not resolve to a feature.
pub fn feature_hover(resolver: &FeatureResolver, text: &Rope, position: Position) -> Option<Hover> {
    let offset = text.char_to_byte(position_to_char_idx(&position, text));
    let source = text.to_string();
    let word = word_at(&source, offset)?;

    let resolution = resolver.resolve(word.text)?;
    debug!(
        "Hover '{}' resolved to '{}' via {:?}",
        word.text, resolution.record.id, resolution.strategy
    );

    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: hover_markdown(resolution.record),
        }),
        range: Some(byte_range_to_range(word.byte_range(), text)),
    })
}
