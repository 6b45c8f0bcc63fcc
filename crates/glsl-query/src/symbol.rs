use glsl_atom::{Atom, TextPosition};
use glsl_pp::{PPSymbolKind, PPSymbolOccurrence};
use glsl_syntax::{Arena, AstNode, DeclKind, DeclView, ExprKind, NodeId, TypeSpecifierKind};

use crate::query_info::LanguageQueryInfo;
use crate::visitor::{traverse_node_contains, AstVisitor, VisitPolicy};

/// What kind of thing a `QuerySymbolByPosition` hit names (§4.H: "local/
/// global variable, parameter, struct/block member, swizzle, type, function,
/// layout-qualifier key, block/block-instance name").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable { is_global: bool },
    Parameter,
    StructMember,
    BlockMember,
    Swizzle,
    Type,
    Function,
    LayoutQualifierKey,
    BlockInstance,
    HeaderName,
    Macro,
}

/// One `QuerySymbolByPosition` result: what the cursor landed on, the
/// declaration it resolves to (when one exists — a swizzle or
/// layout-qualifier key never does), and whether the cursor sits on the
/// *declaring* token rather than a use of it.
#[derive(Debug, Clone)]
pub struct QueriedSymbol {
    pub kind: SymbolKind,
    pub name: Atom,
    pub decl: Option<DeclView>,
    pub is_declaration: bool,
}

/// `QuerySymbolByPosition(pos)` (§4.H): the PP-symbol index is checked
/// first since it's an O(log n) binary search covering the whole file;
/// only on a miss does this fall back to walking the AST, which is the more
/// expensive path since the AST only exists for the ranges things actually
/// parsed into.
pub fn query_symbol_by_position(info: &LanguageQueryInfo<'_>, pos: TextPosition) -> Option<QueriedSymbol> {
    let result = info.compiler_result();
    if let Some(occ) = result.symbol_store.query_sorted(pos) {
        return Some(from_pp_occurrence(occ));
    }
    let arena = &result.arena;
    let mut finder = SymbolFinder { info, pos, found: None };
    finder.walk(arena, result.root);
    finder.found
}

fn from_pp_occurrence(occ: &PPSymbolOccurrence) -> QueriedSymbol {
    match &occ.kind {
        PPSymbolKind::HeaderName { name, .. } => QueriedSymbol {
            kind: SymbolKind::HeaderName,
            name: *name,
            decl: None,
            is_declaration: false,
        },
        PPSymbolKind::MacroDefinition { macro_sig } => QueriedSymbol {
            kind: SymbolKind::Macro,
            name: macro_sig.name,
            decl: None,
            is_declaration: true,
        },
        PPSymbolKind::MacroUse { name, .. } => QueriedSymbol {
            kind: SymbolKind::Macro,
            name: *name,
            decl: None,
            is_declaration: false,
        },
    }
}

/// Classification happens in `exit_node`, which runs bottom-up: a node's
/// children are fully visited (and have had their own chance to classify)
/// before its own `exit_node` fires. That gives the narrowest containing
/// node first — e.g. on `v.xyz.x`, the identifier `v` wins over the
/// `FieldAccess` nodes wrapping it, since `v` has no children to visit
/// first. `enter_node` still prunes with [`traverse_node_contains`], and
/// halts immediately once any deeper call has already set `found`.
struct SymbolFinder<'a, 'b> {
    info: &'b LanguageQueryInfo<'a>,
    pos: TextPosition,
    found: Option<QueriedSymbol>,
}

impl<'a, 'b> AstVisitor for SymbolFinder<'a, 'b> {
    fn enter_node(&mut self, arena: &Arena, id: NodeId) -> VisitPolicy {
        if self.found.is_some() {
            return VisitPolicy::Halt;
        }
        traverse_node_contains(self.info, arena, id, self.pos)
    }

    fn exit_node(&mut self, arena: &Arena, id: NodeId) {
        if self.found.is_some() {
            return;
        }
        self.found = classify_node(self.info, arena, id);
    }
}

fn classify_node(info: &LanguageQueryInfo<'_>, arena: &Arena, id: NodeId) -> Option<QueriedSymbol> {
    let result = info.compiler_result();
    if let AstNode::QualType(q) = arena.get(id) {
        if let TypeSpecifierKind::Named(name) = &q.specifier {
            // No stored link back to the `Struct` decl this names — `glsl-sema`
            // only resolves it transiently against the scope stack while
            // building the `TypeTable`, and that stack doesn't survive
            // `analyze()` returning. Good enough to classify, not enough to
            // jump to a definition from here.
            return Some(QueriedSymbol { kind: SymbolKind::Type, name: *name, decl: None, is_declaration: false });
        }
    }
    let expr = arena.get(id).as_expr()?;
    match &expr.kind {
        ExprKind::NameAccess { name } => {
            let decl = expr.resolved_decl;
            let kind = decl.map(|dv| classify_decl(arena, dv)).unwrap_or(SymbolKind::Variable { is_global: true });
            Some(QueriedSymbol { kind, name: *name, decl, is_declaration: false })
        }
        ExprKind::FunctionCall { name, .. } => Some(QueriedSymbol {
            kind: SymbolKind::Function,
            name: *name,
            decl: expr.resolved_decl,
            is_declaration: false,
        }),
        ExprKind::FieldAccess { field, .. } => {
            let decl = expr.resolved_decl;
            let kind = match decl {
                Some(dv) => classify_member_decl(arena, dv),
                // `.length()` is GLSL's one pseudo-method; everything else
                // with no resolved decl is a vector swizzle (§4.F).
                None if result.atoms.resolve(*field) == "length" => SymbolKind::Function,
                None => SymbolKind::Swizzle,
            };
            Some(QueriedSymbol { kind, name: *field, decl, is_declaration: false })
        }
        _ => None,
    }
}

fn classify_decl(arena: &Arena, dv: DeclView) -> SymbolKind {
    match decl_kind_of(arena, dv.decl) {
        Some(DeclKind::Param { .. }) => SymbolKind::Parameter,
        Some(DeclKind::Struct { .. }) => SymbolKind::Type,
        Some(DeclKind::InterfaceBlock { .. }) => SymbolKind::BlockInstance,
        Some(DeclKind::Function { .. }) => SymbolKind::Function,
        _ => SymbolKind::Variable { is_global: !is_nested_in_function(arena, dv.decl) },
    }
}

fn classify_member_decl(arena: &Arena, dv: DeclView) -> SymbolKind {
    match arena.parent(dv.decl).and_then(|p| decl_kind_of(arena, p)) {
        Some(DeclKind::InterfaceBlock { .. }) => SymbolKind::BlockMember,
        _ => SymbolKind::StructMember,
    }
}

fn decl_kind_of(arena: &Arena, id: NodeId) -> Option<DeclKind> {
    match arena.get(id) {
        AstNode::Decl(d) => Some(d.kind.clone()),
        _ => None,
    }
}

/// Walks parent links looking for an enclosing `Function` declaration —
/// present only for locals/parameters declared inside a function body, never
/// for top-level globals.
fn is_nested_in_function(arena: &Arena, mut id: NodeId) -> bool {
    while let Some(parent) = arena.parent(id) {
        if matches!(decl_kind_of(arena, parent), Some(DeclKind::Function { .. })) {
            return true;
        }
        id = parent;
    }
    false
}
