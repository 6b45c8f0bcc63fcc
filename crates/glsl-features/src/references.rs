//! Find References (§4.I): every occurrence of the symbol under the cursor,
//! found by resolving it once via [`glsl_query::query_symbol_by_position`]
//! and then walking the whole AST comparing `resolved_decl` against that
//! target — the same comparison `glsl-sema` uses to link a use back to its
//! binding, just run in reverse over every node instead of one.

use glsl_atom::{AstSyntaxRange, FileID, TextPosition, TextRange};
use glsl_compile::CompilerResult;
use glsl_query::{query_symbol_by_position, LanguageQueryInfo};
use glsl_syntax::{Arena, AstNode, DeclView, ExprKind, ExprNode, NodeId};

use crate::definition::declaration_name_range;

pub fn references(result: &CompilerResult, pos: TextPosition, include_declaration: bool) -> Vec<TextRange> {
    let info = LanguageQueryInfo::new(result);
    let Some(symbol) = query_symbol_by_position(&info, pos) else { return Vec::new() };
    let Some(target) = symbol.decl else { return Vec::new() };

    let mut out = Vec::new();
    if include_declaration {
        if let Some(range) = declaration_name_range(result, &info, target) {
            out.push(range);
        }
    }
    walk(&result.arena, &info, result.root, target, &mut out);
    out
}

fn walk(arena: &Arena, info: &LanguageQueryInfo<'_>, id: NodeId, target: DeclView, out: &mut Vec<TextRange>) {
    if let AstNode::Expr(e) = arena.get(id) {
        if references_target(e, target) {
            if let Some(range) = info.lookup_spelled_text_range_in_main_file(reference_range(e), FileID::MAIN) {
                out.push(range);
            }
        }
    }
    for child in arena.get(id).children() {
        walk(arena, info, child, target, out);
    }
}

fn references_target(e: &ExprNode, target: DeclView) -> bool {
    match e.kind {
        ExprKind::NameAccess { .. } | ExprKind::FieldAccess { .. } | ExprKind::FunctionCall { .. } => {
            e.resolved_decl == Some(target)
        }
        _ => false,
    }
}

/// The single token worth highlighting for a matching node — the whole name
/// for a bare reference, just the field token for `base.field`, just the
/// callee token for a call (`args` follow in the same expression's range).
fn reference_range(e: &ExprNode) -> AstSyntaxRange {
    match &e.kind {
        ExprKind::FieldAccess { dot_token, .. } => {
            AstSyntaxRange::new(dot_token.tu, dot_token.index + 1, dot_token.index + 2)
        }
        ExprKind::FunctionCall { .. } => AstSyntaxRange::new(e.range.tu, e.range.begin, e.range.begin + 1),
        _ => e.range,
    }
}
