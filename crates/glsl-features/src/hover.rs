//! Hover (§4.I): a short render of whatever the cursor sits on — a macro's
//! definition text, or a declaration's signature rendered the way
//! [`crate::printer`] would print it back as source.

use glsl_atom::{AtomTable, TextPosition};
use glsl_compile::CompilerResult;
use glsl_pp::symbol_store::{MacroSignature, PPSymbolKind};
use glsl_query::{query_symbol_by_position, LanguageQueryInfo};
use glsl_syntax::AstNode;

use crate::printer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hover {
    pub contents: String,
}

pub fn hover(result: &CompilerResult, pos: TextPosition) -> Option<Hover> {
    let info = LanguageQueryInfo::new(result);
    if let Some(occ) = result.symbol_store.query_sorted(pos) {
        if let Some(text) = macro_hover_text(&result.atoms, &occ.kind) {
            return Some(Hover { contents: text });
        }
    }

    let symbol = query_symbol_by_position(&info, pos)?;
    let dv = symbol.decl?;
    if !matches!(result.arena.get(dv.decl), AstNode::Decl(_)) {
        return None;
    }
    let contents = printer::render_decl(&result.atoms, &result.arena, dv.decl, dv.index);
    if contents.is_empty() {
        return None;
    }
    Some(Hover { contents })
}

fn macro_hover_text(atoms: &AtomTable, kind: &PPSymbolKind) -> Option<String> {
    match kind {
        PPSymbolKind::MacroDefinition { macro_sig } => Some(render_macro(atoms, macro_sig)),
        PPSymbolKind::MacroUse { resolved_definition: Some(sig), .. } => Some(render_macro(atoms, sig)),
        _ => None,
    }
}

fn render_macro(atoms: &AtomTable, sig: &MacroSignature) -> String {
    let name = atoms.resolve(sig.name);
    match &sig.params {
        Some(params) => {
            let mut param_list =
                params.iter().map(|p| atoms.resolve(*p)).collect::<Vec<_>>().join(", ");
            if sig.is_variadic {
                if !param_list.is_empty() {
                    param_list.push_str(", ");
                }
                param_list.push_str("...");
            }
            format!("#define {name}({param_list}) {}", sig.replacement_text)
        }
        None => format!("#define {name} {}", sig.replacement_text),
    }
}
