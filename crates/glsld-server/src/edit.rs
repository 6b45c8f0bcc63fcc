//! Incremental `didChange` application (§6: "didChange (incremental and
//! full)"): positions on the wire are UTF-16 code units (§6 "position
//! encoding: utf-16"), so converting one to a byte offset in a Rust `&str`
//! means walking the string counting `char::len_utf16()` rather than
//! indexing directly.

use crate::protocol::{Position, TextDocumentContentChangeEvent};

/// Converts a UTF-16-based line/character position into a byte offset into
/// `text`. A position past the end of the text clamps to `text.len()`
/// rather than panicking — a client racing edits against a stale range is
/// a protocol violation this server tolerates rather than crashes on.
pub fn position_to_byte_offset(text: &str, pos: Position) -> usize {
    let mut line = 0u32;
    let mut utf16_col = 0u32;
    for (byte_idx, ch) in text.char_indices().chain(std::iter::once((text.len(), '\0'))) {
        if line == pos.line && utf16_col == pos.character {
            return byte_idx;
        }
        if byte_idx == text.len() {
            break;
        }
        if ch == '\n' {
            line += 1;
            utf16_col = 0;
            if line > pos.line {
                // Position fell inside a shorter line than requested;
                // clamp to end-of-line.
                return byte_idx;
            }
        } else {
            utf16_col += ch.len_utf16() as u32;
        }
    }
    text.len()
}

/// Applies one `TextDocumentContentChangeEvent` to `source`: a full
/// replacement when `range` is absent, otherwise a byte-offset splice.
pub fn apply_change(source: &str, change: &TextDocumentContentChangeEvent) -> String {
    match change.range {
        None => change.text.clone(),
        Some(range) => {
            let start = position_to_byte_offset(source, range.start);
            let end = position_to_byte_offset(source, range.end);
            let mut out = String::with_capacity(source.len() - (end - start) + change.text.len());
            out.push_str(&source[..start]);
            out.push_str(&change.text);
            out.push_str(&source[end..]);
            out
        }
    }
}

/// Applies every change in order — the LSP spec defines later changes in
/// the same notification as operating on the result of earlier ones.
pub fn apply_changes(source: &str, changes: &[TextDocumentContentChangeEvent]) -> String {
    let mut current = source.to_string();
    for change in changes {
        current = apply_change(&current, change);
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_at_start_of_second_line() {
        let text = "abc\ndef";
        assert_eq!(position_to_byte_offset(text, Position { line: 1, character: 0 }), 4);
    }

    #[test]
    fn offset_mid_line() {
        let text = "hello world";
        assert_eq!(position_to_byte_offset(text, Position { line: 0, character: 6 }), 6);
    }

    #[test]
    fn full_replace_ignores_prior_content() {
        let change = TextDocumentContentChangeEvent { range: None, text: "new".into() };
        assert_eq!(apply_change("old content", &change), "new");
    }

    #[test]
    fn incremental_splice_replaces_only_the_range() {
        let source = "void main() { foo(); }";
        let change = TextDocumentContentChangeEvent {
            range: Some(crate::protocol::Range {
                start: Position { line: 0, character: 14 },
                end: Position { line: 0, character: 17 },
            }),
            text: "bar".into(),
        };
        assert_eq!(apply_change(source, &change), "void main() { bar(); }");
    }

    #[test]
    fn multiple_changes_apply_in_order() {
        let source = "aaa";
        let changes = vec![
            TextDocumentContentChangeEvent { range: None, text: "bbb".into() },
            TextDocumentContentChangeEvent {
                range: Some(crate::protocol::Range {
                    start: Position { line: 0, character: 0 },
                    end: Position { line: 0, character: 1 },
                }),
                text: "c".into(),
            },
        ];
        assert_eq!(apply_changes(source, &changes), "cbb");
    }
}
