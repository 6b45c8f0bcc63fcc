//! Inlay Hints (§4.I): three independent emitters, each gated by its own
//! `glsl-config` flag — argument names at call sites, the type an implicit
//! conversion produced, and a repeated function name past a long compound
//! body's closing brace.

use glsl_atom::{FileID, TextPosition};
use glsl_compile::CompilerResult;
use glsl_config::Config;
use glsl_query::LanguageQueryInfo;
use glsl_syntax::{Arena, AstNode, DeclKind, ExprKind, NodeId};

use crate::printer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlayHintKind {
    Parameter,
    Type,
    BlockEnd,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlayHint {
    pub position: TextPosition,
    pub label: String,
    pub kind: InlayHintKind,
}

pub fn inlay_hints(result: &CompilerResult, config: &Config) -> Vec<InlayHint> {
    if !config.file.inlay_hint.enable {
        return Vec::new();
    }
    let info = LanguageQueryInfo::new(result);
    let mut out = Vec::new();
    walk(result, &info, config, result.root, &mut out);
    out
}

fn walk(result: &CompilerResult, info: &LanguageQueryInfo<'_>, config: &Config, id: NodeId, out: &mut Vec<InlayHint>) {
    let arena = &result.arena;
    match arena.get(id) {
        AstNode::Expr(e) => {
            if config.file.inlay_hint.enable_argument_name_hint {
                if let ExprKind::FunctionCall { args, .. } = &e.kind {
                    if let Some(dv) = e.resolved_decl {
                        emit_argument_names(result, info, dv, args, out);
                    }
                }
            }
            if config.file.inlay_hint.enable_implicit_cast_hint {
                if let ExprKind::ImplicitCast { target, .. } = &e.kind {
                    if let Some(pos) = info.lookup_expanded_text_range_extended(e.range).map(|r| r.end) {
                        let label = printer::render_type_desc(&result.types, &result.atoms, arena, *target);
                        out.push(InlayHint { position: pos, label: format!("as {label}"), kind: InlayHintKind::Type });
                    }
                }
            }
        }
        AstNode::Decl(d) => {
            if config.file.inlay_hint.enable_block_end_hint {
                if let DeclKind::Function { name, body: Some(body), .. } = &d.kind {
                    emit_block_end(result, info, config, *name, *body, out);
                }
            }
        }
        _ => {}
    }
    for child in arena.get(id).children() {
        walk(result, info, config, child, out);
    }
}

fn emit_argument_names(
    result: &CompilerResult,
    info: &LanguageQueryInfo<'_>,
    dv: glsl_syntax::DeclView,
    args: &[NodeId],
    out: &mut Vec<InlayHint>,
) {
    let arena = &result.arena;
    let AstNode::Decl(d) = arena.get(dv.decl) else { return };
    let DeclKind::Function { params, .. } = &d.kind else { return };
    for (&param_id, &arg_id) in params.iter().zip(args.iter()) {
        let AstNode::Decl(pd) = arena.get(param_id) else { continue };
        let DeclKind::Param { declarator: Some(decl), .. } = &pd.kind else { continue };
        if is_same_name_reference(arena, arg_id, decl.name) {
            continue;
        }
        let Some(pos) = info.lookup_expanded_text_range_extended(arena.get(arg_id).range()).map(|r| r.start) else {
            continue;
        };
        let label = result.atoms.resolve(decl.name).to_string();
        out.push(InlayHint { position: pos, label: format!("{label}:"), kind: InlayHintKind::Parameter });
    }
}

fn is_same_name_reference(arena: &Arena, arg_id: NodeId, param_name: glsl_atom::Atom) -> bool {
    matches!(arena.get(arg_id), AstNode::Expr(e) if matches!(e.kind, ExprKind::NameAccess { name } if name == param_name))
}

fn emit_block_end(
    result: &CompilerResult,
    info: &LanguageQueryInfo<'_>,
    config: &Config,
    name: glsl_atom::Atom,
    body: NodeId,
    out: &mut Vec<InlayHint>,
) {
    let arena = &result.arena;
    let Some(range) = info.lookup_spelled_text_range_in_main_file(arena.get(body).range(), FileID::MAIN) else {
        return;
    };
    let threshold = config.file.inlay_hint.block_end_hint_line_threshold;
    if range.end.line.saturating_sub(range.start.line) < threshold {
        return;
    }
    let label = result.atoms.resolve(name).to_string();
    out.push(InlayHint { position: range.end, label: format!("// {label}"), kind: InlayHintKind::BlockEnd });
}
