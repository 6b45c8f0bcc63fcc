use glsl_atom::{AstSyntaxRange, FileID, TextPosition, TextRange};
use glsl_compile::CompilerResult;
use glsl_lex::{Punct, TokenKind};
use glsl_pp::PpToken;

/// Read-only index over one finished compile. Every method here is a pure
/// lookup over `result`'s token array — no recomputation, no mutation (§4.H).
pub struct LanguageQueryInfo<'a> {
    result: &'a CompilerResult,
}

impl<'a> LanguageQueryInfo<'a> {
    pub fn new(result: &'a CompilerResult) -> Self {
        Self { result }
    }

    pub fn compiler_result(&self) -> &'a CompilerResult {
        self.result
    }

    /// `LookupToken(id)`. Only the main file's token array is addressable —
    /// the preamble was merged into it at compile time (see `glsl-compile`'s
    /// `DESIGN.md` entry), so every token the parser produced lives here.
    pub fn lookup_token(&self, index: u32) -> Option<&'a PpToken> {
        self.result.tokens.get(index as usize)
    }

    /// `LookupTokens(range)`: every token an `AstSyntaxRange` spans.
    pub fn lookup_tokens(&self, range: AstSyntaxRange) -> &'a [PpToken] {
        let begin = range.begin as usize;
        let end = range.end as usize;
        if begin >= end || end > self.result.tokens.len() {
            return &[];
        }
        &self.result.tokens[begin..end]
    }

    /// `LookupTokenByPosition(pos)`: binary search on expanded start,
    /// returning every token whose expanded range starts exactly at `pos`
    /// (more than one when a zero-width expansion artifact sits at the same
    /// point).
    pub fn lookup_token_by_position(&self, pos: TextPosition) -> Vec<&'a PpToken> {
        let tokens = &self.result.tokens;
        let idx = tokens.partition_point(|t| t.expanded_range.start < pos);
        tokens[idx..]
            .iter()
            .take_while(|t| t.expanded_range.start == pos)
            .collect()
    }

    /// `LookupSpelledTextRange`: the raw, pre-expansion source span covering
    /// `range`'s tokens, which may cross file boundaries (the injected
    /// preamble's own synthetic file, see `FileID`).
    pub fn lookup_spelled_text_range(&self, range: AstSyntaxRange) -> Option<TextRange> {
        let toks = self.lookup_tokens(range);
        let (first, last) = (toks.first()?, toks.last()?);
        Some(TextRange::new(first.spelled_range.start, last.spelled_range.end))
    }

    /// `LookupSpelledTextRangeInMainFile`: same as
    /// [`lookup_spelled_text_range`](Self::lookup_spelled_text_range), but
    /// `None` if any covered token was spelled outside `main_file` — callers
    /// use this to suppress ranges that land inside the injected preamble
    /// text, which has no real position in the client's document.
    pub fn lookup_spelled_text_range_in_main_file(
        &self,
        range: AstSyntaxRange,
        main_file: FileID,
    ) -> Option<TextRange> {
        let toks = self.lookup_tokens(range);
        if toks.iter().any(|t| t.spelled_file != main_file) {
            return None;
        }
        self.lookup_spelled_text_range(range)
    }

    /// `LookupExpandedTextRange`: the post-macro-expansion span covering
    /// `range`'s tokens, using ordinary half-open containment.
    pub fn lookup_expanded_text_range(&self, range: AstSyntaxRange) -> Option<TextRange> {
        let toks = self.lookup_tokens(range);
        let (first, last) = (toks.first()?, toks.last()?);
        Some(TextRange::new(first.expanded_range.start, last.expanded_range.end))
    }

    /// `LookupExpandedTextRangeExtended`: same span as
    /// [`lookup_expanded_text_range`](Self::lookup_expanded_text_range), but
    /// callers should test containment with
    /// [`TextRange::contains_extended`] instead of `contains` — "cursor
    /// right after the token" (e.g. completion immediately following an
    /// identifier) must still count as inside.
    pub fn lookup_expanded_text_range_extended(&self, range: AstSyntaxRange) -> Option<TextRange> {
        self.lookup_expanded_text_range(range)
    }

    pub fn contains_position(&self, range: TextRange, pos: TextPosition) -> bool {
        range.contains(pos)
    }

    pub fn precedes_position(&self, range: TextRange, pos: TextPosition) -> bool {
        range.precedes(pos)
    }

    pub fn succeeds_position(&self, range: TextRange, pos: TextPosition) -> bool {
        range.succeeds(pos)
    }

    /// `LookupDotTokenIndex(fieldExpr)`: finds the `.` token ending a field
    /// access, whether it's a completed `a.b` (dot is second-to-last token)
    /// or a partial `a.` still being typed (dot is the last token).
    pub fn lookup_dot_token_index(&self, range: AstSyntaxRange) -> Option<u32> {
        let toks = self.lookup_tokens(range);
        let len = toks.len();
        if len == 0 {
            return None;
        }
        let last = len - 1;
        if is_dot(&toks[last]) {
            return Some(range.begin + last as u32);
        }
        if last > 0 && is_dot(&toks[last - 1]) {
            return Some(range.begin + (last - 1) as u32);
        }
        None
    }
}

fn is_dot(tok: &PpToken) -> bool {
    matches!(tok.kind, TokenKind::Punct(Punct::Dot))
}
