//! Predictive recursive descent driver (§4.D): token cursor, diagnostics
//! sink, and the small helpers every grammar module (`expr`, `stmt`,
//! `decl`) shares.

use glsl_atom::{
    AstSyntaxRange, AtomTable, DiagnosticMessage, DiagnosticSeverity, SyntaxTokenID, TextPosition,
    TextRange, TranslationUnitID,
};
use glsl_lex::{Keyword, Punct, TokenKind};
use glsl_pp::PpToken;

use crate::ast::{Arena, AstNode, AstSyntaxToken, ErrorKindHint, NodeId};
use crate::types::TypeTable;

/// `{success, node}` (§4.D): `success = false` tells the caller to engage
/// recovery instead of trusting `node` to be well-formed.
pub struct ParseResult<T> {
    pub success: bool,
    pub node: T,
}

impl<T> ParseResult<T> {
    pub fn ok(node: T) -> Self {
        Self { success: true, node }
    }

    pub fn err(node: T) -> Self {
        Self { success: false, node }
    }
}

pub struct Parser {
    pub(crate) tu: TranslationUnitID,
    pub(crate) tokens: Vec<PpToken>,
    pub(crate) pos: usize,
    pub(crate) arena: Arena,
    pub(crate) types: TypeTable,
    pub(crate) diagnostics: Vec<DiagnosticMessage>,
    /// Cached so `.length()` can be special-cased without repeatedly
    /// interning the string (§4.F treats `length` as a pseudo-method).
    pub(crate) length_atom: glsl_atom::Atom,
}

impl Parser {
    pub fn new(tu: TranslationUnitID, mut tokens: Vec<PpToken>, atoms: &mut AtomTable) -> Self {
        if !matches!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof)) {
            let eof_pos = tokens.last().map(|t| t.expanded_range.end).unwrap_or(TextPosition::origin());
            let eof_file = tokens.last().map(|t| t.spelled_file).unwrap_or(glsl_atom::FileID::MAIN);
            tokens.push(PpToken {
                kind: TokenKind::Eof,
                text: atoms.intern(""),
                spelled_file: eof_file,
                spelled_range: TextRange::point(eof_pos),
                expanded_range: TextRange::point(eof_pos),
            });
        }
        Self {
            tu,
            tokens,
            pos: 0,
            arena: Arena::new(),
            types: TypeTable::new(),
            diagnostics: Vec::new(),
            length_atom: atoms.intern("length"),
        }
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn peek(&self) -> &PpToken {
        self.peek_n(0)
    }

    pub(crate) fn peek_n(&self, n: usize) -> &PpToken {
        let idx = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    pub(crate) fn is_eof(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    pub(crate) fn bump(&mut self) -> AstSyntaxToken {
        let idx = self.pos.min(self.tokens.len() - 1);
        let tok = &self.tokens[idx];
        let ast_tok = AstSyntaxToken {
            id: SyntaxTokenID::new(self.tu, idx as u32),
            kind: tok.kind,
            text: tok.text,
        };
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        ast_tok
    }

    pub(crate) fn range_from(&self, begin: usize) -> AstSyntaxRange {
        AstSyntaxRange::new(self.tu, begin as u32, self.pos as u32)
    }

    pub(crate) fn at_punct(&self, p: Punct) -> bool {
        matches!(self.peek().kind, TokenKind::Punct(x) if x == p)
    }

    pub(crate) fn at_punct_n(&self, n: usize, p: Punct) -> bool {
        matches!(self.peek_n(n).kind, TokenKind::Punct(x) if x == p)
    }

    pub(crate) fn at_keyword(&self, k: Keyword) -> bool {
        matches!(self.peek().kind, TokenKind::Keyword(x) if x == k)
    }

    pub(crate) fn at_identifier(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Identifier)
    }

    pub(crate) fn at_identifier_n(&self, n: usize) -> bool {
        matches!(self.peek_n(n).kind, TokenKind::Identifier)
    }

    /// Consumes `p` if present, returning whether it matched. Used where a
    /// missing punctuation is recoverable by the caller rather than fatal.
    pub(crate) fn eat_punct(&mut self, p: Punct) -> bool {
        if self.at_punct(p) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(crate) fn spelled_range(&self) -> TextRange {
        self.peek().spelled_range
    }

    pub(crate) fn diag(&mut self, severity: DiagnosticSeverity, code: &'static str, text: impl Into<String>) {
        self.diagnostics.push(DiagnosticMessage::new(self.spelled_range(), severity, code, text));
    }

    pub(crate) fn alloc(&mut self, node: AstNode) -> NodeId {
        self.arena.alloc(node)
    }

    /// Wraps an already-skipped recovery range in an `ErrorExpr`/`ErrorStmt`
    /// node, per §4.D ("after recovery the parser emits an error node
    /// covering the skipped range").
    pub(crate) fn error_node(&mut self, range: AstSyntaxRange, hint: ErrorKindHint) -> NodeId {
        match hint {
            ErrorKindHint::Expr => self.alloc(AstNode::Expr(crate::ast::ExprNode {
                kind: crate::ast::ExprKind::Error,
                range,
                deduced_type: Some(self.types.error_type()),
                resolved_decl: None,
            })),
            ErrorKindHint::Stmt => {
                self.alloc(AstNode::Stmt(crate::ast::StmtNode { kind: crate::ast::StmtKind::Error, range }))
            }
            ErrorKindHint::TopLevel => self.alloc(AstNode::ErrorNode { range }),
        }
    }
}

/// Output of parsing one translation unit's token stream.
pub struct ParseOutput {
    pub arena: Arena,
    pub types: TypeTable,
    pub root: NodeId,
    pub diagnostics: Vec<DiagnosticMessage>,
}

/// Entry point: parse a post-preprocessor token stream into a `TranslationUnit`
/// AST root (§4.D, §4.E). `atoms` is the same table the preprocessor interned
/// `tokens`' text against; the parser needs write access only to intern the
/// synthetic EOF sentinel's empty text when the stream doesn't already end
/// with one.
pub fn parse_translation_unit(tu: TranslationUnitID, tokens: Vec<PpToken>, atoms: &mut AtomTable) -> ParseOutput {
    let mut p = Parser::new(tu, tokens, atoms);
    let begin = p.pos();
    let mut decls = Vec::new();
    while !p.is_eof() {
        let before = p.pos();
        decls.extend(p.parse_top_level_decl());
        if p.pos() == before {
            // Safety net: a grammar path that consumes nothing would loop
            // forever. Force progress by treating the token as an error.
            let rng = p.recover(crate::recovery::RecoveryMode::Semi);
            decls.push(p.error_node(rng, ErrorKindHint::TopLevel));
        }
    }
    let range = p.range_from(begin);
    let root = p.alloc(AstNode::TranslationUnit { decls, range });
    p.arena.link_parents(root);
    ParseOutput { arena: p.arena, types: p.types, root, diagnostics: p.diagnostics }
}
