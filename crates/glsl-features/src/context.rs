//! Completion-context detection (§4.I): classifies the cursor position into
//! one of the four contexts the completion handler branches on. Built on
//! top of the same root-to-innermost-containing-node walk
//! `glsl-query::SymbolFinder` uses, generalized to keep the whole ancestor
//! chain rather than only the narrowest hit, since `TypesOnly` needs to look
//! past the innermost node for an enclosing `Struct`/`Function` decl.

use glsl_atom::TextPosition;
use glsl_query::{traverse_node_contains, AstVisitor, LanguageQueryInfo, VisitPolicy};
use glsl_syntax::{Arena, AstNode, DeclKind, ExprKind, NodeId, TypeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionContextKind {
    MemberAccess { base_type: Option<TypeId> },
    Disabled,
    TypesOnly,
    Full,
}

pub struct DetectedContext {
    pub kind: CompletionContextKind,
    /// Root-to-innermost chain of every node whose (expanded, extended)
    /// range contains the cursor. Always non-empty on a successful walk —
    /// the translation unit itself is index 0.
    pub path: Vec<NodeId>,
}

struct ContextFinder<'a, 'b> {
    info: &'b LanguageQueryInfo<'a>,
    pos: TextPosition,
    path: Vec<NodeId>,
    deepest: Vec<NodeId>,
}

impl AstVisitor for ContextFinder<'_, '_> {
    fn enter_node(&mut self, arena: &Arena, id: NodeId) -> VisitPolicy {
        let policy = traverse_node_contains(self.info, arena, id, self.pos);
        if policy == VisitPolicy::Traverse {
            self.path.push(id);
            if self.path.len() > self.deepest.len() {
                self.deepest = self.path.clone();
            }
        }
        policy
    }

    fn exit_node(&mut self, _arena: &Arena, id: NodeId) {
        if self.path.last() == Some(&id) {
            self.path.pop();
        }
    }
}

pub fn detect(info: &LanguageQueryInfo<'_>, arena: &Arena, root: NodeId, pos: TextPosition) -> DetectedContext {
    let mut finder = ContextFinder { info, pos, path: Vec::new(), deepest: Vec::new() };
    finder.walk(arena, root);
    let path = finder.deepest;
    let kind = classify(arena, &path);
    DetectedContext { kind, path }
}

fn classify(arena: &Arena, path: &[NodeId]) -> CompletionContextKind {
    let Some(&innermost) = path.last() else { return CompletionContextKind::Full };

    if let AstNode::Expr(e) = arena.get(innermost) {
        if let ExprKind::FieldAccess { base, .. } = e.kind {
            let base_type = arena.get(base).as_expr().and_then(|b| b.deduced_type);
            return CompletionContextKind::MemberAccess { base_type };
        }
    }

    if matches!(arena.get(innermost), AstNode::Decl(_)) {
        return CompletionContextKind::Disabled;
    }

    for &id in path.iter().rev() {
        match arena.get(id) {
            AstNode::Decl(d) => match d.kind {
                DeclKind::Struct { .. } => return CompletionContextKind::TypesOnly,
                DeclKind::Function { .. } => break,
                _ => {}
            },
            _ => {}
        }
    }
    CompletionContextKind::Full
}
