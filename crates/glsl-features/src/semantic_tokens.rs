//! Semantic Tokens (§4.I): a fixed type/modifier legend plus the
//! delta-encoding the LSP wire format wants, computed over a plain
//! recursive AST walk emitting one token per declaration name, reference,
//! and macro occurrence. Builtin (preamble) ranges are dropped — there is
//! no client-visible position to paint them at.

use std::collections::HashSet;

use glsl_atom::{FileID, TextRange};
use glsl_compile::CompilerResult;
use glsl_pp::symbol_store::PPSymbolKind;
use glsl_query::LanguageQueryInfo;
use glsl_syntax::{Arena, AstNode, AstSyntaxToken, DeclKind, ExprKind, NodeId};

pub const SEMANTIC_TYPES: &[&str] =
    &["type", "parameter", "variable", "property", "function", "macro", "keyword"];
pub const SEMANTIC_MODIFIERS: &[&str] = &["declaration", "readonly", "defaultLibrary"];

const TY_TYPE: u32 = 0;
const TY_PARAMETER: u32 = 1;
const TY_VARIABLE: u32 = 2;
const TY_PROPERTY: u32 = 3;
const TY_FUNCTION: u32 = 4;
const TY_MACRO: u32 = 5;

const MOD_DECLARATION: u32 = 1 << 0;
const MOD_DEFAULT_LIBRARY: u32 = 1 << 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SemanticToken {
    pub line: u32,
    pub start_char: u32,
    pub length: u32,
    pub token_type: u32,
    pub token_modifiers: u32,
}

/// Top-level decl ids contributed by the preamble, so a call resolving to one
/// of them can be painted with the `defaultLibrary` modifier instead of a
/// plain function token.
fn builtin_decl_ids(arena: &Arena, root: NodeId, preamble_decl_count: usize) -> HashSet<NodeId> {
    match arena.get(root) {
        AstNode::TranslationUnit { decls, .. } => decls.iter().take(preamble_decl_count).copied().collect(),
        _ => HashSet::new(),
    }
}

pub fn semantic_tokens(result: &CompilerResult) -> Vec<SemanticToken> {
    let info = LanguageQueryInfo::new(result);
    let builtins = builtin_decl_ids(&result.arena, result.root, result.preamble_decl_count);
    let mut out = Vec::new();

    for occurrence in result.symbol_store.iter() {
        let matches_macro = matches!(occurrence.kind, PPSymbolKind::MacroDefinition { .. } | PPSymbolKind::MacroUse { .. });
        if matches_macro {
            push_range(&mut out, occurrence.spelled_range, TY_MACRO, 0);
        }
    }

    walk(&result.arena, &info, result.root, &builtins, &mut out);
    out.sort_by_key(|t| (t.line, t.start_char));
    out
}

fn walk(arena: &Arena, info: &LanguageQueryInfo<'_>, id: NodeId, builtins: &HashSet<NodeId>, out: &mut Vec<SemanticToken>) {
    match arena.get(id) {
        AstNode::Decl(d) => match &d.kind {
            DeclKind::Variable { declarators, .. } => {
                for decl in declarators {
                    push_token(out, info, decl.name_token, TY_VARIABLE, MOD_DECLARATION);
                }
            }
            DeclKind::Param { declarator: Some(decl), .. } => {
                push_token(out, info, decl.name_token, TY_PARAMETER, MOD_DECLARATION);
            }
            DeclKind::Function { name_token, .. } => {
                push_token(out, info, *name_token, TY_FUNCTION, MOD_DECLARATION);
            }
            DeclKind::Struct { name_token: Some(t), .. } => {
                push_token(out, info, *t, TY_TYPE, MOD_DECLARATION);
            }
            DeclKind::InterfaceBlock { block_name_token, instance, .. } => {
                push_token(out, info, *block_name_token, TY_TYPE, MOD_DECLARATION);
                if let Some(decl) = instance {
                    push_token(out, info, decl.name_token, TY_VARIABLE, MOD_DECLARATION);
                }
            }
            _ => {}
        },
        AstNode::Expr(e) => match &e.kind {
            ExprKind::FieldAccess { dot_token, .. } => {
                let range = glsl_atom::AstSyntaxRange::new(dot_token.tu, dot_token.index + 1, dot_token.index + 2);
                if let Some(r) = info.lookup_spelled_text_range_in_main_file(range, FileID::MAIN) {
                    push_range(out, r, TY_PROPERTY, 0);
                }
            }
            ExprKind::FunctionCall { .. } => {
                let range = glsl_atom::AstSyntaxRange::new(e.range.tu, e.range.begin, e.range.begin + 1);
                if let Some(r) = info.lookup_spelled_text_range_in_main_file(range, FileID::MAIN) {
                    let is_builtin = e.resolved_decl.is_some_and(|dv| builtins.contains(&dv.decl));
                    let modifiers = if is_builtin { MOD_DEFAULT_LIBRARY } else { 0 };
                    push_range(out, r, TY_FUNCTION, modifiers);
                }
            }
            ExprKind::NameAccess { .. } => {
                if let Some(r) = info.lookup_spelled_text_range_in_main_file(e.range, FileID::MAIN) {
                    push_range(out, r, TY_VARIABLE, 0);
                }
            }
            _ => {}
        },
        _ => {}
    }
    for child in arena.get(id).children() {
        walk(arena, info, child, builtins, out);
    }
}

fn push_token(out: &mut Vec<SemanticToken>, info: &LanguageQueryInfo<'_>, token: AstSyntaxToken, ty: u32, modifiers: u32) {
    let range = glsl_atom::AstSyntaxRange::new(token.id.tu, token.id.index, token.id.index + 1);
    if let Some(r) = info.lookup_spelled_text_range_in_main_file(range, FileID::MAIN) {
        push_range(out, r, ty, modifiers);
    }
}

fn push_range(out: &mut Vec<SemanticToken>, range: TextRange, ty: u32, modifiers: u32) {
    if range.end.line != range.start.line {
        return;
    }
    out.push(SemanticToken {
        line: range.start.line,
        start_char: range.start.character,
        length: range.end.character - range.start.character,
        token_type: ty,
        token_modifiers: modifiers,
    });
}

/// LSP's `textDocument/semanticTokens/full` flat `u32` encoding: 5 values per
/// token, each position delta-encoded against the previous token rather than
/// absolute.
pub fn encode_deltas(tokens: &[SemanticToken]) -> Vec<u32> {
    let mut sorted = tokens.to_vec();
    sorted.sort_by_key(|t| (t.line, t.start_char));
    let mut out = Vec::with_capacity(sorted.len() * 5);
    let (mut prev_line, mut prev_char) = (0u32, 0u32);
    for t in &sorted {
        let delta_line = t.line - prev_line;
        let delta_start = if delta_line == 0 { t.start_char - prev_char } else { t.start_char };
        out.extend_from_slice(&[delta_line, delta_start, t.length, t.token_type, t.token_modifiers]);
        prev_line = t.line;
        prev_char = t.start_char;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use glsl_compile::CompilerInvocation;

    fn compile(src: &str) -> CompilerResult {
        let mut inv = CompilerInvocation::new();
        inv.set_main_file_from_buffer(src);
        inv.compile_main_file().expect("compile should succeed")
    }

    #[test]
    fn builtin_call_gets_default_library_modifier_user_call_does_not() {
        let src = "float len(vec3 v) { return v.x; }\nvoid main() { vec3 v = vec3(1.0); float a = normalize(v).x; float b = len(v); }";
        let result = compile(src);
        let tokens = semantic_tokens(&result);

        let builtin = tokens
            .iter()
            .find(|t| t.token_type == TY_FUNCTION && t.token_modifiers & MOD_DEFAULT_LIBRARY != 0);
        assert!(builtin.is_some(), "normalize() call should carry the defaultLibrary modifier");

        let user_calls: Vec<_> = tokens
            .iter()
            .filter(|t| t.token_type == TY_FUNCTION && t.token_modifiers & MOD_DEFAULT_LIBRARY == 0)
            .collect();
        assert!(!user_calls.is_empty(), "len() call should not carry the defaultLibrary modifier");
    }
}
