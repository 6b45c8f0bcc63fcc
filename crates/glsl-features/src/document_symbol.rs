//! Document Symbols (§4.I): one entry per top-level declaration (skipping
//! the preamble builtins merged ahead of the user file — see
//! `CompilerResult::preamble_decl_count`), with struct/interface-block
//! members nested as children. Reuses [`glsl_query::SymbolKind`] rather than
//! a parallel enum, since the classification a document symbol wants is the
//! same one `QuerySymbolByPosition` already computes for a single node.

use glsl_atom::{FileID, TextRange};
use glsl_compile::CompilerResult;
use glsl_query::{LanguageQueryInfo, SymbolKind};
use glsl_syntax::{AstNode, DeclKind, NodeId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSymbol {
    pub name: String,
    pub kind: SymbolKind,
    pub range: TextRange,
    pub selection_range: TextRange,
    pub children: Vec<DocumentSymbol>,
}

pub fn document_symbols(result: &CompilerResult) -> Vec<DocumentSymbol> {
    let info = LanguageQueryInfo::new(result);
    let arena = &result.arena;
    let AstNode::TranslationUnit { decls, .. } = arena.get(result.root) else { return Vec::new() };
    decls
        .iter()
        .skip(result.preamble_decl_count as usize)
        .flat_map(|&id| symbols_for_decl(result, &info, id))
        .collect()
}

fn symbols_for_decl(result: &CompilerResult, info: &LanguageQueryInfo<'_>, id: NodeId) -> Vec<DocumentSymbol> {
    let arena = &result.arena;
    let AstNode::Decl(d) = arena.get(id) else { return Vec::new() };
    let Some(whole_range) = info.lookup_spelled_text_range_in_main_file(d.range, FileID::MAIN) else {
        return Vec::new();
    };

    match &d.kind {
        DeclKind::Variable { declarators, .. } => declarators
            .iter()
            .filter_map(|decl| {
                let name_range = token_range(info, decl.name_token)?;
                Some(DocumentSymbol {
                    name: result.atoms.resolve(decl.name).to_string(),
                    kind: SymbolKind::Variable { is_global: true },
                    range: whole_range,
                    selection_range: name_range,
                    children: Vec::new(),
                })
            })
            .collect(),
        DeclKind::Function { name, name_token, .. } => {
            let Some(name_range) = token_range(info, *name_token) else { return Vec::new() };
            vec![DocumentSymbol {
                name: result.atoms.resolve(*name).to_string(),
                kind: SymbolKind::Function,
                range: whole_range,
                selection_range: name_range,
                children: Vec::new(),
            }]
        }
        DeclKind::Struct { name, name_token, members } => {
            let name_text = name.map(|n| result.atoms.resolve(n).to_string()).unwrap_or_default();
            let selection_range = name_token.and_then(|t| token_range(info, t)).unwrap_or(whole_range);
            vec![DocumentSymbol {
                name: name_text,
                kind: SymbolKind::Type,
                range: whole_range,
                selection_range,
                children: members.iter().flat_map(|&m| symbols_for_member(result, info, m, true)).collect(),
            }]
        }
        DeclKind::InterfaceBlock { block_name, block_name_token, members, instance, .. } => {
            let (name_text, selection_range) = match instance {
                Some(decl) => (
                    result.atoms.resolve(decl.name).to_string(),
                    token_range(info, decl.name_token).unwrap_or(whole_range),
                ),
                None => (
                    result.atoms.resolve(*block_name).to_string(),
                    token_range(info, *block_name_token).unwrap_or(whole_range),
                ),
            };
            vec![DocumentSymbol {
                name: name_text,
                kind: SymbolKind::Type,
                range: whole_range,
                selection_range,
                children: members.iter().flat_map(|&m| symbols_for_member(result, info, m, false)).collect(),
            }]
        }
        _ => Vec::new(),
    }
}

fn symbols_for_member(
    result: &CompilerResult,
    info: &LanguageQueryInfo<'_>,
    id: NodeId,
    is_struct: bool,
) -> Vec<DocumentSymbol> {
    let arena = &result.arena;
    let AstNode::Decl(d) = arena.get(id) else { return Vec::new() };
    let Some(whole_range) = info.lookup_spelled_text_range_in_main_file(d.range, FileID::MAIN) else {
        return Vec::new();
    };
    let DeclKind::Variable { declarators, .. } = &d.kind else { return Vec::new() };
    let kind = if is_struct { SymbolKind::StructMember } else { SymbolKind::BlockMember };
    declarators
        .iter()
        .filter_map(|decl| {
            let name_range = token_range(info, decl.name_token)?;
            Some(DocumentSymbol {
                name: result.atoms.resolve(decl.name).to_string(),
                kind,
                range: whole_range,
                selection_range: name_range,
                children: Vec::new(),
            })
        })
        .collect()
}

fn token_range(info: &LanguageQueryInfo<'_>, token: glsl_syntax::AstSyntaxToken) -> Option<TextRange> {
    let range = glsl_atom::AstSyntaxRange::new(token.id.tu, token.id.index, token.id.index + 1);
    info.lookup_spelled_text_range_in_main_file(range, FileID::MAIN)
}
