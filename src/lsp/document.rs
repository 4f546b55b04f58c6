use ropey::Rope;

use tower_lsp::lsp_types::{Position, Range, TextDocumentContentChangeEvent};

pub use crate::lsp::models::{DocumentSnapshot, LspDocument, LspDocumentState};

/// Converts an LSP position (UTF-16 code units) to a char index in the Rope.
/// Positions past the end of a line clamp to the line end; positions past the
/// last line clamp to the end of the text.
pub fn position_to_char_idx(position: &Position, text: &Rope) -> usize {
    let line = position.line as usize;
    if line >= text.len_lines() {
        return text.len_chars();
    }
    let line_start = text.line_to_char(line);
    let line_end = if line + 1 < text.len_lines() {
        // Stop before the line break so clamping never crosses lines.
        let next = text.line_to_char(line + 1);
        let mut end = next;
        while end > line_start && matches!(text.char(end - 1), '\n' | '\r') {
            end -= 1;
        }
        end
    } else {
        text.len_chars()
    };

    let start_cu = text.char_to_utf16_cu(line_start);
    let end_cu = text.char_to_utf16_cu(line_end);
    let target_cu = (start_cu + position.character as usize).min(end_cu);
    text.utf16_cu_to_char(target_cu)
}

/// Converts a byte offset into an LSP position (UTF-16 code units).
pub fn byte_to_position(byte: usize, text: &Rope) -> Position {
    let char_idx = text.byte_to_char(byte.min(text.len_bytes()));
    let line = text.char_to_line(char_idx);
    let line_start = text.line_to_char(line);
    let character = text.char_to_utf16_cu(char_idx) - text.char_to_utf16_cu(line_start);
    Position {
        line: line as u32,
        character: character as u32,
    }
}

/// Converts a byte range into an LSP range.
pub fn byte_range_to_range(range: std::ops::Range<usize>, text: &Rope) -> Range {
    Range {
        start: byte_to_position(range.start, text),
        end: byte_to_position(range.end, text),
    }
}

impl LspDocumentState {
    /// Applies a list of content changes to the document state.
    /// Returns the updated text if the version is newer, otherwise an error.
    pub fn apply(
        &mut self,
        changes: Vec<TextDocumentContentChangeEvent>,
        version: i32,
    ) -> Result<Rope, String> {
        if version <= self.version {
            return Err(format!("Version {} not newer than {}", version, self.version));
        }
        for change in changes {
            if let Some(range) = change.range {
                let start = position_to_char_idx(&range.start, &self.text);
                let end = position_to_char_idx(&range.end, &self.text);
                if start > end {
                    return Err(format!("Invalid change range {:?}", range));
                }
                self.text.remove(start..end);
                self.text.insert(start, &change.text);
            } else {
                self.text = Rope::from_str(&change.text);
            }
        }
        self.version = version;
        Ok(self.text.clone())
    }
}

impl LspDocument {
    pub fn new(id: u32, language_id: String, text: &str, version: i32) -> Self {
        LspDocument {
            id,
            state: tokio::sync::RwLock::new(LspDocumentState {
                language_id,
                text: Rope::from_str(text),
                version,
            }),
        }
    }

    /// Returns the current version of the document.
    pub async fn version(&self) -> i32 {
        self.state.read().await.version
    }

    pub async fn snapshot(&self) -> DocumentSnapshot {
        let state = self.state.read().await;
        DocumentSnapshot {
            language_id: state.language_id.clone(),
            // Rope clones share chunks, so this is cheap.
            text: state.text.clone(),
            version: state.version,
        }
    }

    /// Applies changes to the document, returning the new text.
    pub async fn apply(
        &self,
        changes: Vec<TextDocumentContentChangeEvent>,
        version: i32,
    ) -> Option<Rope> {
        let mut state = self.state.write().await;
        state.apply(changes, version).ok()
    }
}
