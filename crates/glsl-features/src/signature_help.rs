//! Signature Help (§4.I): finds the innermost enclosing call by reusing the
//! completion context walk's ancestor chain, then enumerates every
//! same-named `Function` decl in the translation unit (preamble builtins
//! included — they sit in the same flat decl list, see
//! `CompilerResult::preamble_decl_count`) as a candidate overload.

use glsl_atom::TextPosition;
use glsl_compile::CompilerResult;
use glsl_query::LanguageQueryInfo;
use glsl_syntax::{Arena, AstNode, DeclKind, ExprKind, NodeId};

use crate::context;
use crate::printer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterInformation {
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureInformation {
    pub label: String,
    pub parameters: Vec<ParameterInformation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHelp {
    pub signatures: Vec<SignatureInformation>,
    pub active_signature: u32,
    pub active_parameter: u32,
}

pub fn signature_help(result: &CompilerResult, pos: TextPosition) -> Option<SignatureHelp> {
    let info = LanguageQueryInfo::new(result);
    let arena = &result.arena;
    let detected = context::detect(&info, arena, result.root, pos);

    let mut call = None;
    for &id in detected.path.iter().rev() {
        if let AstNode::Expr(e) = arena.get(id) {
            if let ExprKind::FunctionCall { name, args } = &e.kind {
                call = Some((*name, args.clone()));
                break;
            }
        }
    }
    let (name, args) = call?;
    let active_parameter = active_parameter_index(&info, arena, &args, pos);

    let AstNode::TranslationUnit { decls, .. } = arena.get(result.root) else { return None };
    let mut signatures = Vec::new();
    for &decl_id in decls {
        let AstNode::Decl(d) = arena.get(decl_id) else { continue };
        if let DeclKind::Function { name: fname, params, .. } = &d.kind {
            if *fname != name {
                continue;
            }
            signatures.push(SignatureInformation {
                label: printer::render_decl(&result.atoms, arena, decl_id, 0),
                parameters: printer::render_params(&result.atoms, arena, params)
                    .into_iter()
                    .map(|label| ParameterInformation { label })
                    .collect(),
            });
        }
    }
    if signatures.is_empty() {
        return None;
    }
    Some(SignatureHelp { signatures, active_signature: 0, active_parameter })
}

fn active_parameter_index(info: &LanguageQueryInfo<'_>, arena: &Arena, args: &[NodeId], pos: TextPosition) -> u32 {
    for (i, &arg) in args.iter().enumerate() {
        let Some(range) = info.lookup_expanded_text_range(arena.get(arg).range()) else { continue };
        if !info.precedes_position(range, pos) {
            return i as u32;
        }
    }
    args.len() as u32
}
