//! Directive processing, macro expansion, and include resolution (§4.C).
//!
//! Turns a raw token stream from `glsl-lex` into a flat [`PpToken`] stream
//! with both spelled and expanded coordinates attached (§5), recording every
//! macro use and directive into a [`PPSymbolStore`] as it goes.

pub mod macro_table;
pub mod symbol_store;

pub use macro_table::{Argument, MacroTable, PPMacro, ReplacementElem, ReplacementItem, RepTok};
pub use symbol_store::{
    MacroSignature, MacroUseKind, PPSymbolKind, PPSymbolOccurrence, PPSymbolStore,
};

use glsl_atom::{Atom, AtomTable, DiagnosticMessage, DiagnosticSeverity, FileID, TextPosition, TextRange};
use glsl_lex::{IntBase, NumberKind, Punct, Token, TokenKind, Tokenizer};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Abstraction over reading `#include` targets, so tests can substitute an
/// in-memory file set instead of touching disk.
pub trait FileLoader {
    fn read_to_string(&self, path: &Path) -> std::io::Result<String>;
    fn is_file(&self, path: &Path) -> bool;
}

pub struct StdFileLoader;

impl FileLoader for StdFileLoader {
    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// One token of the synthesized per-translation-unit stream, carrying both
/// halves of the dual addressing model (§5).
#[derive(Debug, Clone)]
pub struct PpToken {
    pub kind: TokenKind,
    pub text: Atom,
    pub spelled_file: FileID,
    pub spelled_range: TextRange,
    pub expanded_range: TextRange,
}

/// Resolves a `#include` header name against an ordered list of search
/// roots. GLSL has no quoted-vs-angled search-order distinction mandated by
/// the spec, so both forms consult the same root list (§4.C).
pub struct IncludeResolver<'a> {
    pub roots: Vec<PathBuf>,
    loader: &'a dyn FileLoader,
}

impl<'a> IncludeResolver<'a> {
    pub fn new(loader: &'a dyn FileLoader) -> Self {
        Self { roots: Vec::new(), loader }
    }

    pub fn add_root(&mut self, root: impl Into<PathBuf>) {
        self.roots.push(root.into());
    }

    fn resolve(&self, current_dir: &Path, header: &str) -> Option<PathBuf> {
        let direct = current_dir.join(header);
        if self.loader.is_file(&direct) {
            return Some(direct);
        }
        for root in &self.roots {
            let candidate = root.join(header);
            if self.loader.is_file(&candidate) {
                return Some(candidate);
            }
        }
        None
    }
}

/// Wraps [`Tokenizer`] with one token of pushback, needed because directive
/// scanning (`#define`'s body, `#if`'s expression, ...) must stop exactly at
/// the first un-escaped newline without losing the token that follows it —
/// that token belongs to whatever comes next and the main loop still needs
/// to see it.
struct LineScanner<'a> {
    inner: Tokenizer<'a>,
    pending: Option<(Token<'a>, bool)>,
}

impl<'a> LineScanner<'a> {
    fn new(text: &'a str, count_utf16: bool) -> Self {
        Self { inner: Tokenizer::new(text, count_utf16), pending: None }
    }

    /// Next token plus whether a logical-line break was crossed to reach it.
    fn next_line(&mut self) -> (Token<'a>, bool) {
        if let Some(p) = self.pending.take() {
            return p;
        }
        self.inner.next_token_line()
    }

    /// Next token ignoring line boundaries — used inside expressions and
    /// macro argument lists, where a line break is just whitespace.
    fn next_spaced(&mut self) -> (Token<'a>, bool) {
        if let Some((t, _)) = self.pending.take() {
            return (t, false);
        }
        self.inner.next_token_spaced()
    }

    fn push_back(&mut self, tok: Token<'a>, crossed_newline: bool) {
        debug_assert!(self.pending.is_none());
        self.pending = Some((tok, crossed_newline));
    }

    /// Raw, non-tokenized text up to the next un-escaped newline. Used for
    /// `#include` header names and `#error`/message-style directive
    /// payloads, where re-joining re-tokenized spellings would mangle
    /// quotes and punctuation (GLSL's lexer has no string-literal grammar).
    fn read_raw_rest_of_line(&mut self) -> String {
        debug_assert!(self.pending.is_none());
        self.inner.read_raw_rest_of_line()
    }
}

/// One level of `#if`/`#ifdef`/`#ifndef` nesting. `parent_active` is the
/// emitting state of the enclosing context captured at push time, so a
/// frame's own `active` only needs to AND against it, not walk the whole
/// stack on every directive (§4.C).
struct CondFrame {
    active: bool,
    ever_active: bool,
    parent_active: bool,
}

/// Recursion guard depth for `#include` and macro expansion (§4.C: default
/// 200, configurable).
const DEFAULT_RECURSION_LIMIT: u32 = 200;

pub struct Preprocessor<'a> {
    atoms: &'a mut AtomTable,
    macros: MacroTable,
    cond_stack: Vec<CondFrame>,
    resolver: IncludeResolver<'a>,
    included_paths: HashSet<PathBuf>,
    recursion_limit: u32,
    expanding: Vec<Atom>,
    symbols: PPSymbolStore,
    diagnostics: Vec<DiagnosticMessage>,
    count_utf16: bool,
    next_include_file_id: u32,
}

impl<'a> Preprocessor<'a> {
    pub fn new(atoms: &'a mut AtomTable, loader: &'a dyn FileLoader, count_utf16: bool) -> Self {
        Self {
            atoms,
            macros: MacroTable::new(),
            cond_stack: Vec::new(),
            resolver: IncludeResolver::new(loader),
            included_paths: HashSet::new(),
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            expanding: Vec::new(),
            symbols: PPSymbolStore::new(),
            diagnostics: Vec::new(),
            count_utf16,
            next_include_file_id: 1,
        }
    }

    pub fn add_include_root(&mut self, root: impl Into<PathBuf>) {
        self.resolver.add_root(root);
    }

    pub fn set_recursion_limit(&mut self, limit: u32) {
        self.recursion_limit = limit;
    }

    pub fn macros(&self) -> &MacroTable {
        &self.macros
    }

    pub fn diagnostics(&self) -> &[DiagnosticMessage] {
        &self.diagnostics
    }

    pub fn into_symbol_store(self) -> PPSymbolStore {
        self.symbols
    }

    /// Preprocess a whole translation unit from its main-file text. `file`
    /// and `dir` identify the main file for spelled-position reporting and
    /// include resolution; `record_symbols` is true only for the user's
    /// own document (§4.C: "PP-symbol caching only records occurrences at
    /// include depth 0 of the user file").
    pub fn run(&mut self, file: FileID, dir: &Path, text: &str, record_symbols: bool) -> Vec<PpToken> {
        let mut out = Vec::new();
        self.process_file(file, dir, text, None, 0, record_symbols, &mut out);
        out
    }

    fn is_emitting(&self) -> bool {
        self.cond_stack.last().map(|f| f.active && f.parent_active).unwrap_or(true)
    }

    fn bubble_range(local: TextRange, bubble: Option<TextRange>) -> TextRange {
        bubble.unwrap_or(local)
    }

    fn process_file(
        &mut self,
        file: FileID,
        dir: &Path,
        text: &str,
        bubble: Option<TextRange>,
        depth: u32,
        record_symbols: bool,
        out: &mut Vec<PpToken>,
    ) {
        if depth > self.recursion_limit {
            self.diagnostics.push(DiagnosticMessage::new(
                TextRange::point(TextPosition::origin()),
                DiagnosticSeverity::Fatal,
                "pp-recursion-limit",
                "include nesting exceeded the recursion limit",
            ));
            return;
        }

        let cond_depth_on_entry = self.cond_stack.len();
        let mut scanner = LineScanner::new(text, self.count_utf16);
        let mut first = true;

        loop {
            let (token, crossed_newline) = scanner.next_line();
            let at_line_start = first || crossed_newline;
            first = false;
            if token.is_eof() {
                break;
            }

            if at_line_start && token.kind == TokenKind::Punct(Punct::Hash) {
                self.process_directive(&mut scanner, file, dir, token.range, bubble, depth, record_symbols, out);
                continue;
            }

            if !self.is_emitting() {
                continue;
            }

            self.expand_and_emit(&mut scanner, file, token, bubble, record_symbols, out);
        }

        // An unterminated `#if` in this file: drop the dangling frames
        // rather than let them leak into the caller's conditional state.
        self.cond_stack.truncate(cond_depth_on_entry);
    }

    #[allow(clippy::too_many_arguments)]
    fn process_directive<'t>(
        &mut self,
        tok: &mut LineScanner<'t>,
        file: FileID,
        dir: &Path,
        hash_range: TextRange,
        bubble: Option<TextRange>,
        depth: u32,
        record_symbols: bool,
        out: &mut Vec<PpToken>,
    ) {
        let (name_tok, crossed) = tok.next_line();
        if name_tok.is_eof() {
            return;
        }
        if crossed {
            // Bare `#` alone on a line: a null directive, legal and inert.
            tok.push_back(name_tok, crossed);
            return;
        }
        let directive = name_tok.spelling().to_string();

        match directive.as_str() {
            "define" if self.is_emitting() => self.directive_define(tok),
            "undef" if self.is_emitting() => self.directive_undef(tok, record_symbols),
            "ifdef" => self.directive_ifdef(tok, false),
            "ifndef" => self.directive_ifdef(tok, true),
            "if" => self.directive_if(tok),
            "elif" => self.directive_elif(tok),
            "else" => {
                self.directive_else();
                self.skip_rest_of_line(tok);
            }
            "endif" => {
                self.directive_endif();
                self.skip_rest_of_line(tok);
            }
            "include" if self.is_emitting() => {
                self.directive_include(tok, file, dir, hash_range, bubble, depth, record_symbols, out)
            }
            "version" | "extension" | "pragma" | "line" => {
                tok.read_raw_rest_of_line();
            }
            "error" if self.is_emitting() => {
                let msg = tok.read_raw_rest_of_line();
                self.diagnostics.push(DiagnosticMessage::new(
                    hash_range,
                    DiagnosticSeverity::Error,
                    "pp-error-directive",
                    msg.trim().to_string(),
                ));
            }
            _ if self.is_emitting() => {
                tok.read_raw_rest_of_line();
                self.diagnostics.push(DiagnosticMessage::new(
                    hash_range,
                    DiagnosticSeverity::Warning,
                    "pp-unknown-directive",
                    format!("unknown preprocessor directive '#{directive}'"),
                ));
            }
            _ => {
                tok.read_raw_rest_of_line();
            }
        }
    }

    fn skip_rest_of_line<'t>(&mut self, tok: &mut LineScanner<'t>) {
        loop {
            let (t, crossed) = tok.next_line();
            if t.is_eof() {
                break;
            }
            if crossed {
                tok.push_back(t, crossed);
                break;
            }
        }
    }

    fn directive_define<'t>(&mut self, tok: &mut LineScanner<'t>) {
        let (name_tok, _) = tok.next_line();
        if name_tok.is_eof() {
            return;
        }
        let name = self.atoms.intern(name_tok.spelling());
        let definition_site = name_tok.range;

        let (maybe_paren, had_space) = tok.next_spaced();
        let mut params: Option<Vec<Atom>> = None;
        let mut is_variadic = false;
        let mut carried: Option<Token<'t>> = None;

        if maybe_paren.kind == TokenKind::Punct(Punct::LParen) && !had_space {
            let mut names = Vec::new();
            loop {
                let (p, _) = tok.next_spaced();
                if p.kind == TokenKind::Punct(Punct::RParen) || p.is_eof() {
                    break;
                }
                if p.kind == TokenKind::Identifier {
                    if p.spelling() == "__VA_ARGS__" {
                        is_variadic = true;
                    }
                    names.push(self.atoms.intern(p.spelling()));
                }
                let (sep, _) = tok.next_spaced();
                if sep.kind == TokenKind::Punct(Punct::RParen) || sep.is_eof() {
                    break;
                }
            }
            params = Some(names);
        } else {
            carried = Some(maybe_paren);
        }

        let mut raw_tokens: Vec<(TokenKind, String)> = Vec::new();
        let mut current = if let Some(t) = carried {
            if t.is_eof() { None } else { Some(t) }
        } else {
            let (t, crossed) = tok.next_line();
            if crossed || t.is_eof() { None } else { Some(t) }
        };
        while let Some(t) = current {
            raw_tokens.push((t.kind, t.spelling().to_string()));
            let (next, crossed) = tok.next_line();
            if crossed {
                tok.push_back(next, crossed);
                break;
            }
            if next.is_eof() {
                break;
            }
            current = Some(next);
        }

        let items = self.build_replacement_items(&raw_tokens, params.as_deref());
        let replacement_text =
            raw_tokens.iter().map(|(_, s)| s.as_str()).collect::<Vec<_>>().join(" ");

        self.macros.define(PPMacro {
            name,
            params: params.clone(),
            is_variadic,
            items,
            definition_site,
        });

        self.symbols.push(PPSymbolOccurrence {
            spelled_range: definition_site,
            kind: PPSymbolKind::MacroDefinition {
                macro_sig: MacroSignature { name, params, is_variadic, replacement_text, definition_site },
            },
        });
    }

    /// Turn a flat token list into a `ReplacementItem` list, recognizing
    /// `#param` (stringize) and `##` (paste) and mapping identifiers that
    /// name a parameter to `ReplacementElem::Param`.
    fn build_replacement_items(
        &mut self,
        raw: &[(TokenKind, String)],
        params: Option<&[Atom]>,
    ) -> Vec<ReplacementItem> {
        let mut items = Vec::new();
        let mut i = 0;
        while i < raw.len() {
            let (kind, text) = &raw[i];
            if *kind == TokenKind::Punct(Punct::Hash) {
                if let Some(params) = params {
                    if let Some((_, pname)) = raw.get(i + 1) {
                        let atom = self.atoms.intern(pname);
                        if let Some(idx) = params.iter().position(|p| *p == atom) {
                            items.push(ReplacementItem {
                                elem: ReplacementElem::Stringize(idx),
                                paste_next: false,
                            });
                            i += 2;
                            continue;
                        }
                    }
                }
            }
            let elem = {
                let atom = self.atoms.intern(text);
                match (params, *kind == TokenKind::Identifier) {
                    (Some(params), true) => match params.iter().position(|p| *p == atom) {
                        Some(idx) => ReplacementElem::Param(idx),
                        None => ReplacementElem::Tok(RepTok { kind: *kind, text: atom, spelled: None }),
                    },
                    _ => ReplacementElem::Tok(RepTok { kind: *kind, text: atom, spelled: None }),
                }
            };
            let paste_next =
                raw.get(i + 1).map(|(k, _)| *k == TokenKind::Punct(Punct::HashHash)).unwrap_or(false);
            items.push(ReplacementItem { elem, paste_next });
            i += if paste_next { 2 } else { 1 };
        }
        items
    }

    fn directive_undef<'t>(&mut self, tok: &mut LineScanner<'t>, record_symbols: bool) {
        let (name_tok, _) = tok.next_line();
        if name_tok.is_eof() {
            return;
        }
        let name = self.atoms.intern(name_tok.spelling());
        self.macros.undef(name);
        if record_symbols {
            self.symbols.push(PPSymbolOccurrence {
                spelled_range: name_tok.range,
                kind: PPSymbolKind::MacroUse {
                    name,
                    kind: MacroUseKind::Undef,
                    resolved_definition: None,
                    expansion_range: None,
                },
            });
        }
        self.skip_rest_of_line(tok);
    }

    fn directive_ifdef<'t>(&mut self, tok: &mut LineScanner<'t>, negate: bool) {
        let (name_tok, _) = tok.next_line();
        let defined = if name_tok.is_eof() {
            false
        } else {
            let name = self.atoms.intern(name_tok.spelling());
            self.macros.is_defined(name)
        };
        let condition = if negate { !defined } else { defined };
        let parent_active = self.is_emitting();
        self.cond_stack.push(CondFrame {
            active: parent_active && condition,
            ever_active: parent_active && condition,
            parent_active,
        });
        self.skip_rest_of_line(tok);
    }

    fn directive_if<'t>(&mut self, tok: &mut LineScanner<'t>) {
        let parent_active = self.is_emitting();
        let tokens = self.collect_expr_tokens(tok);
        let condition = parent_active && self.evaluate_constant_expr(&tokens);
        self.cond_stack.push(CondFrame {
            active: parent_active && condition,
            ever_active: parent_active && condition,
            parent_active,
        });
    }

    fn directive_elif<'t>(&mut self, tok: &mut LineScanner<'t>) {
        let tokens = self.collect_expr_tokens(tok);
        let (ever_active, parent_active) = match self.cond_stack.last() {
            Some(f) => (f.ever_active, f.parent_active),
            None => return,
        };
        let condition = parent_active && !ever_active && self.evaluate_constant_expr(&tokens);
        if let Some(frame) = self.cond_stack.last_mut() {
            if !frame.parent_active || frame.ever_active {
                frame.active = false;
            } else {
                frame.active = condition;
                frame.ever_active = frame.ever_active || condition;
            }
        }
    }

    fn directive_else(&mut self) {
        if let Some(frame) = self.cond_stack.last_mut() {
            let active = frame.parent_active && !frame.ever_active;
            frame.active = active;
            frame.ever_active = frame.ever_active || active;
        }
    }

    fn directive_endif(&mut self) {
        self.cond_stack.pop();
    }

    /// Collect the raw tokens of an `#if`/`#elif` expression line, expanding
    /// object-like and invoked function-like macros but leaving the operand
    /// of `defined` alone (§4.C).
    fn collect_expr_tokens<'t>(&mut self, tok: &mut LineScanner<'t>) -> Vec<(TokenKind, String)> {
        let mut out = Vec::new();
        loop {
            let (t, crossed) = tok.next_line();
            if t.is_eof() {
                break;
            }
            if crossed {
                tok.push_back(t, crossed);
                break;
            }
            if t.kind == TokenKind::Identifier && t.spelling() == "defined" {
                out.push((t.kind, t.spelling().to_string()));
                let (next, _) = tok.next_spaced();
                if next.kind == TokenKind::Punct(Punct::LParen) {
                    out.push((next.kind, next.spelling().to_string()));
                    let (name, _) = tok.next_spaced();
                    out.push((name.kind, name.spelling().to_string()));
                    let (close, _) = tok.next_spaced();
                    out.push((close.kind, close.spelling().to_string()));
                } else {
                    out.push((next.kind, next.spelling().to_string()));
                }
                continue;
            }
            if t.kind == TokenKind::Identifier {
                let atom = self.atoms.intern(t.spelling());
                if self.macros.is_defined(atom) && !self.expanding.contains(&atom) {
                    if let Some(expansion) = self.try_expand_macro(atom, tok) {
                        for rt in expansion {
                            out.push((rt.kind, self.atoms.resolve(rt.text).to_string()));
                        }
                        continue;
                    }
                }
            }
            out.push((t.kind, t.spelling().to_string()));
        }
        out
    }

    /// Attempt macro expansion of a single identifier token already
    /// consumed from the stream. Returns `None` if `atom` isn't a defined
    /// macro, or is function-like but not followed by `(`.
    fn try_expand_macro<'t>(&mut self, atom: Atom, tok: &mut LineScanner<'t>) -> Option<Vec<RepTok>> {
        if self.expanding.contains(&atom) {
            return None;
        }
        let macro_def = self.macros.get(atom)?.clone();
        if !macro_def.is_function_like() {
            self.expanding.push(atom);
            let out = macro_table::substitute(self.atoms, &macro_def, &[]);
            self.expanding.pop();
            return Some(self.fully_expand_tokens(out));
        }

        let args = self.parse_macro_arguments(tok)?;
        self.expanding.push(atom);
        let expanded_args: Vec<Argument> = args
            .into_iter()
            .map(|raw| {
                let expanded = self.fully_expand_tokens(raw.clone());
                Argument { raw, expanded }
            })
            .collect();
        let out = macro_table::substitute(self.atoms, &macro_def, &expanded_args);
        self.expanding.pop();
        Some(self.fully_expand_tokens(out))
    }

    /// Parse `(arg, arg, ...)` immediately following a function-like macro
    /// name, splitting on top-level commas (balanced against nested
    /// parens). Returns `None` if the next token isn't `(` — the name is
    /// then just a plain identifier, not an invocation.
    fn parse_macro_arguments<'t>(&mut self, tok: &mut LineScanner<'t>) -> Option<Vec<Vec<RepTok>>> {
        let (open, _) = tok.next_spaced();
        if open.kind != TokenKind::Punct(Punct::LParen) {
            tok.push_back(open, false);
            return None;
        }
        let mut args: Vec<Vec<RepTok>> = vec![Vec::new()];
        let mut depth = 0i32;
        loop {
            let (t, _) = tok.next_spaced();
            if t.is_eof() {
                break;
            }
            match t.kind {
                TokenKind::Punct(Punct::LParen) => {
                    depth += 1;
                    let rt = self.rep_tok_of(&t);
                    args.last_mut().unwrap().push(rt);
                }
                TokenKind::Punct(Punct::RParen) => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                    let rt = self.rep_tok_of(&t);
                    args.last_mut().unwrap().push(rt);
                }
                TokenKind::Punct(Punct::Comma) if depth == 0 => {
                    args.push(Vec::new());
                }
                _ => {
                    let rt = self.rep_tok_of(&t);
                    args.last_mut().unwrap().push(rt);
                }
            }
        }
        if args.len() == 1 && args[0].is_empty() {
            args.clear();
        }
        Some(args)
    }

    fn rep_tok_of<'t>(&mut self, t: &Token<'t>) -> RepTok {
        let atom = self.atoms.intern(t.spelling());
        RepTok { kind: t.kind, text: atom, spelled: Some(t.range) }
    }

    /// Rescan a token list, expanding macro references found within it —
    /// argument pre-expansion (§4.C). A function-like invocation whose `(`
    /// lives outside this list is left unexpanded.
    fn fully_expand_tokens(&mut self, tokens: Vec<RepTok>) -> Vec<RepTok> {
        let mut out = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            let t = &tokens[i];
            if t.kind == TokenKind::Identifier && !self.expanding.contains(&t.text) {
                if let Some(macro_def) = self.macros.get(t.text).cloned() {
                    if !macro_def.is_function_like() {
                        self.expanding.push(t.text);
                        let expansion = macro_table::substitute(self.atoms, &macro_def, &[]);
                        self.expanding.pop();
                        out.extend(self.fully_expand_tokens(expansion));
                        i += 1;
                        continue;
                    } else if matches!(
                        tokens.get(i + 1),
                        Some(n) if n.kind == TokenKind::Punct(Punct::LParen)
                    ) {
                        if let Some((args, consumed)) = Self::split_args_in_slice(&tokens[i + 1..]) {
                            self.expanding.push(t.text);
                            let expanded_args: Vec<Argument> = args
                                .into_iter()
                                .map(|raw| {
                                    let expanded = self.fully_expand_tokens(raw.clone());
                                    Argument { raw, expanded }
                                })
                                .collect();
                            let expansion = macro_table::substitute(self.atoms, &macro_def, &expanded_args);
                            self.expanding.pop();
                            out.extend(self.fully_expand_tokens(expansion));
                            i += 1 + consumed;
                            continue;
                        }
                    }
                }
            }
            out.push(t.clone());
            i += 1;
        }
        out
    }

    fn split_args_in_slice(tokens: &[RepTok]) -> Option<(Vec<Vec<RepTok>>, usize)> {
        if tokens.first()?.kind != TokenKind::Punct(Punct::LParen) {
            return None;
        }
        let mut args: Vec<Vec<RepTok>> = vec![Vec::new()];
        let mut depth = 0i32;
        let mut idx = 1;
        while idx < tokens.len() {
            let t = &tokens[idx];
            match t.kind {
                TokenKind::Punct(Punct::LParen) => {
                    depth += 1;
                    args.last_mut().unwrap().push(t.clone());
                }
                TokenKind::Punct(Punct::RParen) => {
                    if depth == 0 {
                        idx += 1;
                        if args.len() == 1 && args[0].is_empty() {
                            args.clear();
                        }
                        return Some((args, idx));
                    }
                    depth -= 1;
                    args.last_mut().unwrap().push(t.clone());
                }
                TokenKind::Punct(Punct::Comma) if depth == 0 => {
                    args.push(Vec::new());
                }
                _ => args.last_mut().unwrap().push(t.clone()),
            }
            idx += 1;
        }
        None
    }

    /// Evaluate an `#if`/`#elif` constant expression. Per the division and
    /// modulo by zero resolution: the operation reports an `Error`
    /// diagnostic and the whole expression evaluates false rather than
    /// panicking.
    fn evaluate_constant_expr(&mut self, tokens: &[(TokenKind, String)]) -> bool {
        let mut parser =
            ExprParser { tokens, pos: 0, macros: &self.macros, atoms: &*self.atoms, diagnostics: &mut self.diagnostics };
        parser.parse_or().unwrap_or(0) != 0
    }

    #[allow(clippy::too_many_arguments)]
    fn directive_include<'t>(
        &mut self,
        tok: &mut LineScanner<'t>,
        _file: FileID,
        dir: &Path,
        hash_range: TextRange,
        bubble: Option<TextRange>,
        depth: u32,
        record_symbols: bool,
        out: &mut Vec<PpToken>,
    ) {
        let raw = tok.read_raw_rest_of_line();
        let header = raw.trim();
        let header_name = header.trim_matches(|c| c == '"' || c == '<' || c == '>').trim();

        let resolved = self.resolver.resolve(dir, header_name);
        let Some(path) = resolved else {
            self.diagnostics.push(DiagnosticMessage::new(
                hash_range,
                DiagnosticSeverity::Error,
                "pp-include-not-found",
                format!("cannot find include file '{header_name}'"),
            ));
            return;
        };

        if record_symbols {
            self.symbols.push(PPSymbolOccurrence {
                spelled_range: hash_range,
                kind: PPSymbolKind::HeaderName {
                    name: self.atoms.intern(header_name),
                    resolved_absolute_path: Some(path.display().to_string()),
                },
            });
        }

        if !self.included_paths.insert(path.clone()) {
            self.diagnostics.push(DiagnosticMessage::new(
                hash_range,
                DiagnosticSeverity::Error,
                "pp-include-cycle",
                format!("'{}' has already been included", path.display()),
            ));
            return;
        }

        let contents = match self.resolver.loader.read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                self.diagnostics.push(DiagnosticMessage::new(
                    hash_range,
                    DiagnosticSeverity::Error,
                    "pp-include-io",
                    format!("reading '{}': {e}", path.display()),
                ));
                return;
            }
        };

        let include_expanded = Self::bubble_range(hash_range, bubble);
        let include_file = FileID::new(1_000_000 + self.next_include_file_id);
        self.next_include_file_id += 1;
        let include_dir = path.parent().map(|p| p.to_path_buf()).unwrap_or_else(|| dir.to_path_buf());
        self.process_file(include_file, &include_dir, &contents, Some(include_expanded), depth + 1, false, out);
    }

    fn expand_and_emit<'t>(
        &mut self,
        tok: &mut LineScanner<'t>,
        file: FileID,
        token: Token<'t>,
        bubble: Option<TextRange>,
        record_symbols: bool,
        out: &mut Vec<PpToken>,
    ) {
        if token.kind == TokenKind::Identifier {
            let atom = self.atoms.intern(token.spelling());
            if self.macros.is_defined(atom) && !self.expanding.contains(&atom) {
                let invocation_start = token.range;
                if let Some(expansion) = self.try_expand_macro(atom, tok) {
                    let macro_def = self.macros.get(atom).cloned();
                    let expanded_range = Self::bubble_range(invocation_start, bubble);
                    for rt in &expansion {
                        let spelled = rt.spelled.unwrap_or(invocation_start);
                        out.push(PpToken {
                            kind: rt.kind,
                            text: rt.text,
                            spelled_file: file,
                            spelled_range: spelled,
                            expanded_range,
                        });
                    }
                    if record_symbols {
                        self.symbols.push(PPSymbolOccurrence {
                            spelled_range: invocation_start,
                            kind: PPSymbolKind::MacroUse {
                                name: atom,
                                kind: MacroUseKind::Expand,
                                resolved_definition: macro_def.map(|m| MacroSignature {
                                    name: m.name,
                                    params: m.params.clone(),
                                    is_variadic: m.is_variadic,
                                    replacement_text: String::new(),
                                    definition_site: m.definition_site,
                                }),
                                expansion_range: Some(expanded_range),
                            },
                        });
                    }
                    return;
                }
            }
        }

        let atom = self.atoms.intern(token.spelling());
        let expanded_range = Self::bubble_range(token.range, bubble);
        out.push(PpToken {
            kind: token.kind,
            text: atom,
            spelled_file: file,
            spelled_range: token.range,
            expanded_range,
        });
    }
}

/// Small recursive-descent evaluator for `#if`/`#elif` constant
/// expressions: the standard integer-expression subset (no floats, no
/// casts) with C-style operator precedence and short-circuiting `&&`/`||`.
struct ExprParser<'t, 'm> {
    tokens: &'t [(TokenKind, String)],
    pos: usize,
    macros: &'m MacroTable,
    atoms: &'m AtomTable,
    diagnostics: &'m mut Vec<DiagnosticMessage>,
}

impl<'t, 'm> ExprParser<'t, 'm> {
    fn peek(&self) -> Option<&(TokenKind, String)> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<&(TokenKind, String)> {
        let t = self.tokens.get(self.pos);
        self.pos += 1;
        t
    }

    fn peek_text(&self) -> Option<&str> {
        self.peek().map(|(_, s)| s.as_str())
    }

    fn parse_or(&mut self) -> Option<i64> {
        let mut lhs = self.parse_and()?;
        while self.peek_text() == Some("||") {
            self.bump();
            let rhs = self.parse_and()?;
            lhs = ((lhs != 0) || (rhs != 0)) as i64;
        }
        Some(lhs)
    }

    fn parse_and(&mut self) -> Option<i64> {
        let mut lhs = self.parse_bitor()?;
        while self.peek_text() == Some("&&") {
            self.bump();
            let rhs = self.parse_bitor()?;
            lhs = ((lhs != 0) && (rhs != 0)) as i64;
        }
        Some(lhs)
    }

    fn parse_bitor(&mut self) -> Option<i64> {
        let mut lhs = self.parse_bitxor()?;
        while self.peek_text() == Some("|") {
            self.bump();
            lhs |= self.parse_bitxor()?;
        }
        Some(lhs)
    }

    fn parse_bitxor(&mut self) -> Option<i64> {
        let mut lhs = self.parse_bitand()?;
        while self.peek_text() == Some("^") {
            self.bump();
            lhs ^= self.parse_bitand()?;
        }
        Some(lhs)
    }

    fn parse_bitand(&mut self) -> Option<i64> {
        let mut lhs = self.parse_equality()?;
        while self.peek_text() == Some("&") {
            self.bump();
            lhs &= self.parse_equality()?;
        }
        Some(lhs)
    }

    fn parse_equality(&mut self) -> Option<i64> {
        let mut lhs = self.parse_relational()?;
        loop {
            match self.peek_text() {
                Some("==") => {
                    self.bump();
                    lhs = (lhs == self.parse_relational()?) as i64;
                }
                Some("!=") => {
                    self.bump();
                    lhs = (lhs != self.parse_relational()?) as i64;
                }
                _ => break,
            }
        }
        Some(lhs)
    }

    fn parse_relational(&mut self) -> Option<i64> {
        let mut lhs = self.parse_shift()?;
        loop {
            match self.peek_text() {
                Some("<") => {
                    self.bump();
                    lhs = (lhs < self.parse_shift()?) as i64;
                }
                Some(">") => {
                    self.bump();
                    lhs = (lhs > self.parse_shift()?) as i64;
                }
                Some("<=") => {
                    self.bump();
                    lhs = (lhs <= self.parse_shift()?) as i64;
                }
                Some(">=") => {
                    self.bump();
                    lhs = (lhs >= self.parse_shift()?) as i64;
                }
                _ => break,
            }
        }
        Some(lhs)
    }

    fn parse_shift(&mut self) -> Option<i64> {
        let mut lhs = self.parse_additive()?;
        loop {
            match self.peek_text() {
                Some("<<") => {
                    self.bump();
                    lhs <<= self.parse_additive()?;
                }
                Some(">>") => {
                    self.bump();
                    lhs >>= self.parse_additive()?;
                }
                _ => break,
            }
        }
        Some(lhs)
    }

    fn parse_additive(&mut self) -> Option<i64> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            match self.peek_text() {
                Some("+") => {
                    self.bump();
                    lhs += self.parse_multiplicative()?;
                }
                Some("-") => {
                    self.bump();
                    lhs -= self.parse_multiplicative()?;
                }
                _ => break,
            }
        }
        Some(lhs)
    }

    fn parse_multiplicative(&mut self) -> Option<i64> {
        let mut lhs = self.parse_unary()?;
        loop {
            match self.peek_text() {
                Some("*") => {
                    self.bump();
                    lhs *= self.parse_unary()?;
                }
                Some("/") => {
                    self.bump();
                    let rhs = self.parse_unary()?;
                    if rhs == 0 {
                        self.diagnostics.push(DiagnosticMessage::new(
                            TextRange::point(TextPosition::origin()),
                            DiagnosticSeverity::Error,
                            "pp-division-by-zero",
                            "division by zero in #if expression",
                        ));
                        return None;
                    }
                    lhs /= rhs;
                }
                Some("%") => {
                    self.bump();
                    let rhs = self.parse_unary()?;
                    if rhs == 0 {
                        self.diagnostics.push(DiagnosticMessage::new(
                            TextRange::point(TextPosition::origin()),
                            DiagnosticSeverity::Error,
                            "pp-division-by-zero",
                            "modulo by zero in #if expression",
                        ));
                        return None;
                    }
                    lhs %= rhs;
                }
                _ => break,
            }
        }
        Some(lhs)
    }

    fn parse_unary(&mut self) -> Option<i64> {
        match self.peek_text() {
            Some("!") => {
                self.bump();
                Some((self.parse_unary()? == 0) as i64)
            }
            Some("~") => {
                self.bump();
                Some(!self.parse_unary()?)
            }
            Some("-") => {
                self.bump();
                Some(-self.parse_unary()?)
            }
            Some("+") => {
                self.bump();
                self.parse_unary()
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Option<i64> {
        let (kind, text) = self.bump()?.clone();
        match kind {
            TokenKind::Number(nk) => parse_int_literal(&text, nk),
            TokenKind::Identifier if text == "defined" => {
                let paren = self.peek_text() == Some("(");
                if paren {
                    self.bump();
                }
                let (_, name) = self.bump()?.clone();
                if paren {
                    self.bump();
                }
                let defined = self.macros.names_defined().any(|a| self.atoms.resolve(a) == name);
                Some(defined as i64)
            }
            // An undefined identifier in a constant expression evaluates
            // to 0 (§4.C), matching the behavior of object-like macros
            // that expand to nothing.
            TokenKind::Identifier => Some(0),
            TokenKind::Punct(Punct::LParen) => {
                let v = self.parse_or()?;
                if self.peek_text() == Some(")") {
                    self.bump();
                }
                Some(v)
            }
            _ => None,
        }
    }
}

fn parse_int_literal(text: &str, kind: NumberKind) -> Option<i64> {
    let (digits, base) = match kind {
        NumberKind::Int { base } | NumberKind::Uint { base } => (text.trim_end_matches(['u', 'U']), base),
        _ => return None,
    };
    let radix = match base {
        IntBase::Decimal => 10,
        IntBase::Octal => 8,
        IntBase::Hex => 16,
    };
    let trimmed = match base {
        IntBase::Hex => digits.trim_start_matches("0x").trim_start_matches("0X"),
        _ => digits,
    };
    i64::from_str_radix(trimmed, radix).ok().or(Some(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemLoader {
        files: Mutex<HashMap<PathBuf, String>>,
    }

    impl MemLoader {
        fn with(files: &[(&str, &str)]) -> Self {
            let mut m = HashMap::new();
            for (k, v) in files {
                m.insert(PathBuf::from(k), v.to_string());
            }
            Self { files: Mutex::new(m) }
        }
    }

    impl FileLoader for MemLoader {
        fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
            self.files
                .lock()
                .unwrap()
                .get(path)
                .cloned()
                .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "missing"))
        }

        fn is_file(&self, path: &Path) -> bool {
            self.files.lock().unwrap().contains_key(path)
        }
    }

    fn run_text(src: &str) -> (Vec<PpToken>, AtomTable) {
        let mut atoms = AtomTable::new();
        let loader = StdFileLoader;
        let toks = {
            let mut pp = Preprocessor::new(&mut atoms, &loader, false);
            pp.run(FileID::MAIN, Path::new("."), src, true)
        };
        (toks, atoms)
    }

    #[test]
    fn object_like_macro_expands() {
        let (toks, atoms) = run_text("#define N 4\nint x = N;");
        let spellings: Vec<&str> = toks.iter().map(|t| atoms.resolve(t.text)).collect();
        assert_eq!(spellings, vec!["int", "x", "=", "4", ";"]);
    }

    #[test]
    fn function_like_macro_substitutes_arguments() {
        let (toks, atoms) = run_text("#define ADD(a, b) ((a) + (b))\nint x = ADD(1, 2);");
        let spellings: Vec<&str> = toks.iter().map(|t| atoms.resolve(t.text)).collect();
        assert_eq!(
            spellings,
            vec!["int", "x", "=", "(", "(", "1", ")", "+", "(", "2", ")", ")", ";"]
        );
    }

    #[test]
    fn ifdef_skips_inactive_branch() {
        let (toks, atoms) = run_text("#define FOO\n#ifdef FOO\nint a;\n#else\nint b;\n#endif\n");
        let spellings: Vec<&str> = toks.iter().map(|t| atoms.resolve(t.text)).collect();
        assert_eq!(spellings, vec!["int", "a", ";"]);
    }

    #[test]
    fn if_expression_evaluates_arithmetic() {
        let (toks, atoms) = run_text("#if (1 + 2) == 3\nint a;\n#endif\n");
        let spellings: Vec<&str> = toks.iter().map(|t| atoms.resolve(t.text)).collect();
        assert_eq!(spellings, vec!["int", "a", ";"]);
    }

    #[test]
    fn elif_chain_picks_first_true_branch() {
        let (toks, atoms) = run_text("#if 0\nint a;\n#elif 1\nint b;\n#else\nint c;\n#endif\n");
        let spellings: Vec<&str> = toks.iter().map(|t| atoms.resolve(t.text)).collect();
        assert_eq!(spellings, vec!["int", "b", ";"]);
    }

    #[test]
    fn paste_and_stringize_operators_apply() {
        let (toks, atoms) =
            run_text("#define CAT(a, b) a##b\n#define STR(a) #a\nint CAT(fo,o) = 1;\nCAT(q,q) STR(hi);");
        let spellings: Vec<&str> = toks.iter().map(|t| atoms.resolve(t.text)).collect();
        assert_eq!(spellings[0..3], ["int", "foo", "="]);
    }

    #[test]
    fn include_resolves_and_inlines_file() {
        let mut atoms = AtomTable::new();
        let loader = MemLoader::with(&[("./lib.glsl", "int included;")]);
        let toks = {
            let mut pp = Preprocessor::new(&mut atoms, &loader, false);
            pp.run(FileID::MAIN, Path::new("."), "#include \"lib.glsl\"\nint main_;", true)
        };
        let spellings: Vec<&str> = toks.iter().map(|t| atoms.resolve(t.text)).collect();
        assert_eq!(spellings, vec!["int", "included", ";", "int", "main_", ";"]);
    }

    #[test]
    fn second_include_of_same_path_is_an_error() {
        let mut atoms = AtomTable::new();
        let loader = MemLoader::with(&[("./lib.glsl", "int x;")]);
        let diag_count = {
            let mut pp = Preprocessor::new(&mut atoms, &loader, false);
            let _ = pp.run(
                FileID::MAIN,
                Path::new("."),
                "#include \"lib.glsl\"\n#include \"lib.glsl\"\n",
                true,
            );
            pp.diagnostics().len()
        };
        assert_eq!(diag_count, 1);
    }

    #[test]
    fn division_by_zero_in_if_reports_diagnostic() {
        let mut atoms = AtomTable::new();
        let loader = StdFileLoader;
        let diag_count = {
            let mut pp = Preprocessor::new(&mut atoms, &loader, false);
            let _ = pp.run(FileID::MAIN, Path::new("."), "#if 1 / 0\nint a;\n#endif\n", true);
            pp.diagnostics().len()
        };
        assert_eq!(diag_count, 1);
    }

    #[test]
    fn unknown_directive_reports_warning() {
        let mut atoms = AtomTable::new();
        let loader = StdFileLoader;
        let diags = {
            let mut pp = Preprocessor::new(&mut atoms, &loader, false);
            let _ = pp.run(FileID::MAIN, Path::new("."), "#frobnicate\nint a;\n", true);
            pp.diagnostics().iter().map(|d| d.code).collect::<Vec<_>>()
        };
        assert_eq!(diags, vec!["pp-unknown-directive"]);
    }
}
