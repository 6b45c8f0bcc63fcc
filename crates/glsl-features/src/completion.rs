//! Completion (§4.I): dispatches on [`crate::context`]'s classification,
//! then builds an item list specific to that context. Swizzle extension
//! follows the spec's literal example (`v.x^` → `x, xx, xy, xz, xw`): the
//! already-typed prefix plus itself extended by exactly one more letter
//! drawn from the same component set, not a full combinatorial expansion.

use std::collections::HashSet;

use glsl_atom::{TextPosition, TextRange};
use glsl_compile::CompilerResult;
use glsl_query::LanguageQueryInfo;
use glsl_syntax::{Arena, AstNode, DeclKind, ExprKind, NodeId, StmtKind, TypeDesc};

use crate::context::{self, CompletionContextKind};
use crate::printer;
use crate::TextEdit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionItemKind {
    Variable,
    Parameter,
    Field,
    Swizzle,
    Method,
    Function,
    Type,
    Keyword,
    Macro,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionItem {
    pub label: String,
    pub kind: CompletionItemKind,
    pub detail: Option<String>,
    pub text_edit: Option<TextEdit>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionList {
    pub is_incomplete: bool,
    pub items: Vec<CompletionItem>,
}

fn item(label: impl Into<String>, kind: CompletionItemKind) -> CompletionItem {
    CompletionItem { label: label.into(), kind, detail: None, text_edit: None }
}

fn item_detail(label: impl Into<String>, kind: CompletionItemKind, detail: impl Into<String>) -> CompletionItem {
    CompletionItem { label: label.into(), kind, detail: Some(detail.into()), text_edit: None }
}

/// `Completion(pos)` (§4.I): the cursor's context decides which item set
/// applies. Never fails the request — an unresolvable context (no enclosing
/// node, error-typed base) just yields fewer items.
pub fn completion(result: &CompilerResult, pos: TextPosition) -> CompletionList {
    let info = LanguageQueryInfo::new(result);
    let arena = &result.arena;
    let detected = context::detect(&info, arena, result.root, pos);

    match detected.kind {
        CompletionContextKind::Disabled => CompletionList::default(),
        CompletionContextKind::MemberAccess { base_type } => {
            member_access_items(result, &info, &detected.path, base_type, pos)
        }
        CompletionContextKind::TypesOnly => types_only_items(result),
        CompletionContextKind::Full => full_items(result, &detected.path, pos),
    }
}

fn field_replace_range(info: &LanguageQueryInfo<'_>, dot_token_index: u32, pos: TextPosition) -> TextRange {
    if let Some(tok) = info.lookup_token(dot_token_index + 1) {
        if tok.expanded_range.contains_extended(pos) {
            return tok.expanded_range;
        }
    }
    TextRange::point(pos)
}

fn member_access_items(
    result: &CompilerResult,
    info: &LanguageQueryInfo<'_>,
    path: &[NodeId],
    base_type: Option<glsl_syntax::TypeId>,
    pos: TextPosition,
) -> CompletionList {
    let atoms = &result.atoms;
    let arena = &result.arena;
    let Some(&innermost) = path.last() else { return CompletionList::default() };
    let AstNode::Expr(expr) = arena.get(innermost) else { return CompletionList::default() };
    let ExprKind::FieldAccess { field, dot_token, .. } = expr.kind else { return CompletionList::default() };
    let Some(base_type) = base_type else { return CompletionList::default() };

    let typed_prefix = atoms.resolve(field).to_string();
    let edit = TextEdit { range: field_replace_range(info, dot_token.index, pos), new_text: String::new() };
    let mut items = Vec::new();
    let mut is_incomplete = false;

    match result.types.resolve(base_type) {
        TypeDesc::Vector(_, arity) => {
            // Every letter drawn here is one of several valid next characters
            // (any swizzle-set member), so the list can never claim to be the
            // complete set of what the client might type next.
            is_incomplete = true;
            let arity = *arity as usize;
            if !typed_prefix.is_empty() {
                items.push(CompletionItem {
                    label: typed_prefix.clone(),
                    kind: CompletionItemKind::Swizzle,
                    detail: None,
                    text_edit: Some(edit.clone()),
                });
            }
            let set = typed_prefix
                .as_bytes()
                .first()
                .copied()
                .and_then(glsl_sema::swizzle::set_for_letter)
                .unwrap_or(glsl_sema::swizzle::SETS[0]);
            for &c in set.iter().take(arity) {
                let label = format!("{typed_prefix}{}", c as char);
                items.push(CompletionItem {
                    label,
                    kind: CompletionItemKind::Swizzle,
                    detail: None,
                    text_edit: Some(edit.clone()),
                });
            }
            items.push(item_detail("length", CompletionItemKind::Method, "int"));
        }
        TypeDesc::Array { .. } | TypeDesc::Matrix(..) => {
            items.push(item_detail("length", CompletionItemKind::Method, "int"));
        }
        TypeDesc::Struct { members, .. } => {
            for (name, ty) in members {
                let detail = printer::render_type_desc(&result.types, atoms, arena, *ty);
                items.push(item_detail(atoms.resolve(*name), CompletionItemKind::Field, detail));
            }
        }
        _ => {}
    }

    CompletionList { is_incomplete, items }
}

fn types_only_items(result: &CompilerResult) -> CompletionList {
    let atoms = &result.atoms;
    let arena = &result.arena;
    let mut items: Vec<CompletionItem> =
        glsl_lex::keyword::ALL.iter().filter(|k| k.is_type_name()).map(|k| item(k.text(), CompletionItemKind::Keyword)).collect();

    let AstNode::TranslationUnit { decls, .. } = arena.get(result.root) else {
        return CompletionList { is_incomplete: false, items };
    };
    for &d in decls {
        if let AstNode::Decl(decl) = arena.get(d) {
            if let DeclKind::Struct { name: Some(n), .. } = &decl.kind {
                items.push(item(atoms.resolve(*n), CompletionItemKind::Type));
            }
        }
    }
    CompletionList { is_incomplete: false, items }
}

fn token_precedes(info: &LanguageQueryInfo<'_>, token_index: u32, pos: TextPosition) -> bool {
    info.lookup_token(token_index).map(|t| t.expanded_range.start < pos).unwrap_or(false)
}

fn collect_locals(
    arena: &Arena,
    info: &LanguageQueryInfo<'_>,
    id: NodeId,
    pos: TextPosition,
    items: &mut Vec<CompletionItem>,
    result: &CompilerResult,
) {
    let AstNode::Stmt(stmt) = arena.get(id) else { return };
    match &stmt.kind {
        StmtKind::Compound(stmts) => {
            for &s in stmts {
                collect_locals(arena, info, s, pos, items, result);
            }
        }
        StmtKind::Decl(decl_id) => {
            if let AstNode::Decl(d) = arena.get(*decl_id) {
                if let DeclKind::Variable { declarators, ty, .. } = &d.kind {
                    let detail = printer::render_qual_type(&result.atoms, arena, *ty);
                    for decl in declarators {
                        if token_precedes(info, decl.name_token.id.index, pos) {
                            items.push(item_detail(result.atoms.resolve(decl.name), CompletionItemKind::Variable, detail.clone()));
                        }
                    }
                }
            }
        }
        StmtKind::If { then_branch, else_branch, .. } => {
            collect_locals(arena, info, *then_branch, pos, items, result);
            if let Some(e) = else_branch {
                collect_locals(arena, info, *e, pos, items, result);
            }
        }
        StmtKind::While { body, .. } | StmtKind::DoWhile { body, .. } | StmtKind::For { body, .. } | StmtKind::Switch { body, .. } => {
            collect_locals(arena, info, *body, pos, items, result);
        }
        _ => {}
    }
}

fn full_items(result: &CompilerResult, path: &[NodeId], pos: TextPosition) -> CompletionList {
    let info = LanguageQueryInfo::new(result);
    let atoms = &result.atoms;
    let arena = &result.arena;
    let mut items: Vec<CompletionItem> = glsl_lex::keyword::ALL.iter().map(|k| item(k.text(), CompletionItemKind::Keyword)).collect();

    if let AstNode::TranslationUnit { decls, .. } = arena.get(result.root) {
        let mut seen_functions = HashSet::new();
        for &d in decls {
            let AstNode::Decl(decl) = arena.get(d) else { continue };
            match &decl.kind {
                DeclKind::Function { name, return_type, .. } => {
                    if seen_functions.insert(*name) {
                        let detail = printer::render_qual_type(atoms, arena, *return_type);
                        items.push(item_detail(atoms.resolve(*name), CompletionItemKind::Function, detail));
                    }
                }
                DeclKind::Variable { declarators, ty, .. } => {
                    let detail = printer::render_qual_type(atoms, arena, *ty);
                    for decl in declarators {
                        items.push(item_detail(atoms.resolve(decl.name), CompletionItemKind::Variable, detail.clone()));
                    }
                }
                DeclKind::Struct { name: Some(n), .. } => {
                    items.push(item(atoms.resolve(*n), CompletionItemKind::Type));
                }
                DeclKind::InterfaceBlock { instance: Some(inst), block_name, .. } => {
                    items.push(item_detail(atoms.resolve(inst.name), CompletionItemKind::Variable, atoms.resolve(*block_name)));
                }
                _ => {}
            }
        }
    }

    let enclosing_function = path.iter().rev().find(|&&id| matches!(arena.get(id), AstNode::Decl(d) if matches!(d.kind, DeclKind::Function { .. })));
    if let Some(&func_id) = enclosing_function {
        if let AstNode::Decl(d) = arena.get(func_id) {
            if let DeclKind::Function { params, body, .. } = &d.kind {
                for &p in params {
                    if let AstNode::Decl(pd) = arena.get(p) {
                        if let DeclKind::Param { declarator: Some(decl), ty, .. } = &pd.kind {
                            let detail = printer::render_qual_type(atoms, arena, *ty);
                            items.push(item_detail(atoms.resolve(decl.name), CompletionItemKind::Parameter, detail));
                        }
                    }
                }
                if let Some(body) = body {
                    collect_locals(arena, &info, *body, pos, &mut items, result);
                }
            }
        }
    }

    CompletionList { is_incomplete: false, items }
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

    fn position_of(result: &CompilerResult, src: &str, needle: &str) -> TextPosition {
        let preamble_lines = result.preamble.source.matches('\n').count() as u32 + 1;
        let byte_off = src.find(needle).expect("needle present");
        let line = src[..byte_off].matches('\n').count() as u32;
        let col = byte_off - src[..byte_off].rfind('\n').map(|i| i + 1).unwrap_or(0);
        TextPosition::new(preamble_lines + line, col as u32)
    }

    #[test]
    fn struct_member_access_offers_field_names() {
        let src = "struct S { float x; float y; }; void main() { S s; float r = s.x; }";
        let result = compile(src);
        let pos = position_of(&result, src, "x; }");
        let list = completion(&result, pos);
        assert!(list.items.iter().any(|i| i.label == "x" && i.kind == CompletionItemKind::Field));
        assert!(list.items.iter().any(|i| i.label == "y" && i.kind == CompletionItemKind::Field));
    }

    #[test]
    fn swizzle_extends_a_typed_prefix() {
        let src = "void main() { vec4 v = vec4(1.0); float r = v.x; }";
        let result = compile(src);
        let pos = position_of(&result, src, "x; }");
        let list = completion(&result, pos);
        let labels: Vec<_> = list.items.iter().map(|i| i.label.as_str()).collect();
        assert!(labels.contains(&"x"));
        assert!(labels.contains(&"xx"));
        assert!(labels.contains(&"xy"));
        assert!(labels.contains(&"xz"));
        assert!(labels.contains(&"xw"));
        assert!(list.is_incomplete, "swizzle extension never enumerates every valid continuation");
    }

    #[test]
    fn struct_body_offers_types_only() {
        let src = "struct S { float a; };";
        let result = compile(src);
        let pos = position_of(&result, src, "float a");
        let list = completion(&result, pos);
        assert!(list.items.iter().any(|i| i.label == "float"));
        assert!(!list.items.iter().any(|i| i.kind == CompletionItemKind::Function));
    }

    #[test]
    fn function_body_offers_locals_and_keywords() {
        let src = "void main() { float localVar = 1.0; float r = max(localVar, ";
        let result = compile(src);
        let pos = position_of(&result, src, "localVar, ");
        let pos = TextPosition::new(pos.line, pos.character + "localVar, ".len() as u32);
        let list = completion(&result, pos);
        assert!(list.items.iter().any(|i| i.label == "localVar"));
        assert!(list.items.iter().any(|i| i.label == "if"));
    }
}
