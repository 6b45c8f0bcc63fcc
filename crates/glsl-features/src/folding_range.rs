//! Folding Ranges (§4.I): every compound statement, struct body, and
//! interface-block body that spans at least two lines — a plain recursive
//! walk, since folding doesn't need cursor-relative pruning the way
//! completion/hover do.

use glsl_atom::FileID;
use glsl_compile::CompilerResult;
use glsl_query::LanguageQueryInfo;
use glsl_syntax::{Arena, AstNode, DeclKind, NodeId, StmtKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoldingRange {
    pub start_line: u32,
    pub end_line: u32,
}

pub fn folding_ranges(result: &CompilerResult) -> Vec<FoldingRange> {
    let info = LanguageQueryInfo::new(result);
    let mut out = Vec::new();
    walk(&result.arena, &info, result.root, &mut out);
    out
}

fn walk(arena: &Arena, info: &LanguageQueryInfo<'_>, id: NodeId, out: &mut Vec<FoldingRange>) {
    let range = match arena.get(id) {
        AstNode::Stmt(s) if matches!(s.kind, StmtKind::Compound(_)) => Some(s.range),
        AstNode::Decl(d) if matches!(d.kind, DeclKind::Struct { .. } | DeclKind::InterfaceBlock { .. }) => {
            Some(d.range)
        }
        _ => None,
    };
    if let Some(range) = range {
        if let Some(text_range) = info.lookup_spelled_text_range_in_main_file(range, FileID::MAIN) {
            if text_range.end.line > text_range.start.line {
                out.push(FoldingRange { start_line: text_range.start.line, end_line: text_range.end.line });
            }
        }
    }
    for child in arena.get(id).children() {
        walk(arena, info, child, out);
    }
}
