//! Definition / Declaration (§4.I): GLSL has no separate forward-declaration
//! form worth distinguishing from a definition, so both LSP requests answer
//! with the same lookup — the declaring token's spelled range in the main
//! file.

use glsl_atom::{AstSyntaxRange, FileID, TextPosition, TextRange};
use glsl_compile::CompilerResult;
use glsl_pp::PPSymbolKind;
use glsl_query::{query_symbol_by_position, LanguageQueryInfo};
use glsl_syntax::{AstNode, DeclKind, DeclView};

pub fn definition(result: &CompilerResult, pos: TextPosition) -> Option<TextRange> {
    let info = LanguageQueryInfo::new(result);
    if let Some(occ) = result.symbol_store.query_sorted(pos) {
        return match &occ.kind {
            PPSymbolKind::MacroUse { resolved_definition: Some(sig), .. } => Some(sig.definition_site),
            PPSymbolKind::MacroDefinition { macro_sig } => Some(macro_sig.definition_site),
            _ => None,
        };
    }
    let symbol = query_symbol_by_position(&info, pos)?;
    let decl_view = symbol.decl?;
    declaration_name_range(result, &info, decl_view)
}

/// The spelled range of `dv`'s own declaring name token, or `None` if it
/// isn't addressable in the main file (e.g. a preamble builtin — there is
/// no client-visible location to point at).
pub(crate) fn declaration_name_range(
    result: &CompilerResult,
    info: &LanguageQueryInfo<'_>,
    dv: DeclView,
) -> Option<TextRange> {
    let AstNode::Decl(d) = result.arena.get(dv.decl) else { return None };
    let name_token = match &d.kind {
        DeclKind::Variable { declarators, .. } => declarators.get(dv.index as usize)?.name_token,
        DeclKind::Param { declarator: Some(decl), .. } => decl.name_token,
        DeclKind::Function { name_token, .. } => *name_token,
        DeclKind::Struct { name_token: Some(t), .. } => *t,
        DeclKind::InterfaceBlock { block_name_token, .. } => *block_name_token,
        _ => return None,
    };
    let range = AstSyntaxRange::new(name_token.id.tu, name_token.id.index, name_token.id.index + 1);
    info.lookup_spelled_text_range_in_main_file(range, FileID::MAIN)
}
