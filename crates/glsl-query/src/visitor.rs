use glsl_atom::TextPosition;
use glsl_syntax::{Arena, NodeId};

use crate::query_info::LanguageQueryInfo;

/// Controls recursion at one node during an `AstVisitor` walk (§4.H).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitPolicy {
    /// Visit this node, then recurse into its children.
    Traverse,
    /// Visit this node, but skip its children.
    Visit,
    /// Skip this node and its entire subtree.
    Leave,
    /// Abort the whole traversal immediately.
    Halt,
}

/// CRTP-style traversal skeleton: every node goes through
/// `enter_node → (recurse per the returned policy) → exit_node`. Feature
/// handlers implement this trait and drive the walk with
/// [`walk`](AstVisitor::walk); the default method bodies are no-ops so a
/// handler only overrides what it needs.
pub trait AstVisitor {
    /// Called before a node's children are considered. The returned policy
    /// decides whether to recurse (`Traverse`), visit this node only
    /// (`Visit`), skip the whole subtree (`Leave`), or stop the walk
    /// entirely (`Halt`).
    fn enter_node(&mut self, arena: &Arena, id: NodeId) -> VisitPolicy {
        let _ = (arena, id);
        VisitPolicy::Traverse
    }

    /// Called after a node's children (if any were walked) have all been
    /// visited.
    fn exit_node(&mut self, arena: &Arena, id: NodeId) {
        let _ = (arena, id);
    }

    /// Drives the walk starting at `id`. Returns `false` if a `Halt` was
    /// seen anywhere, so callers can short-circuit outer loops too.
    ///
    /// A child signaling `Halt` still gets this node's own `exit_node`
    /// called before the `false` propagates further up — a position can sit
    /// on this node itself (e.g. a function name, which has no token of its
    /// own among `children()`) even when every child has already scrolled
    /// past it.
    fn walk(&mut self, arena: &Arena, id: NodeId) -> bool
    where
        Self: Sized,
    {
        match self.enter_node(arena, id) {
            VisitPolicy::Halt => return false,
            VisitPolicy::Leave => return true,
            VisitPolicy::Visit => {
                self.exit_node(arena, id);
                return true;
            }
            VisitPolicy::Traverse => {}
        }
        let mut halted = false;
        for child in arena.get(id).children() {
            if !self.walk(arena, child) {
                halted = true;
                break;
            }
        }
        self.exit_node(arena, id);
        !halted
    }
}

/// The pruning rule every position-seeking traversal uses: keep descending
/// while the node's expanded range still contains `pos`, skip subtrees that
/// have already scrolled past `pos` (the AST is built left-to-right so later
/// siblings only get further away), and abort once a subtree definitely
/// can't contain `pos` anymore.
pub fn traverse_node_contains(info: &LanguageQueryInfo<'_>, arena: &Arena, id: NodeId, pos: TextPosition) -> VisitPolicy {
    let range = match info.lookup_expanded_text_range(arena.get(id).range()) {
        Some(r) => r,
        None => return VisitPolicy::Halt,
    };
    if range.contains_extended(pos) {
        VisitPolicy::Traverse
    } else if range.precedes(pos) {
        VisitPolicy::Leave
    } else {
        VisitPolicy::Halt
    }
}
