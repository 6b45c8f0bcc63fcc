//! AST node arena and node shapes (§3, §4.D, §4.E).
//!
//! Nodes are allocated into a flat [`Arena`] by index rather than boxed and
//! linked by pointer — the same index-handle idiom `glsl-atom` uses for
//! [`glsl_atom::Atom`] and [`glsl_atom::FileID`], kept consistent here so a
//! `NodeId` is `Copy`, hashable, and cheap to stash in side tables during
//! semantic analysis.

use glsl_atom::{Atom, AstSyntaxRange, SyntaxTokenID};
use glsl_lex::{Keyword, NumberKind, Punct};

use crate::types::TypeId;

/// Index into one [`Arena`]. Two `NodeId`s are only comparable if they index
/// the same arena — callers within one crate always do, since a compilation
/// owns exactly one arena per translation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Bump-style append-only node store. `glsl-sema` (consumer of this arena)
/// still needs write access after parsing to materialize `ImplicitCastExpr`
/// nodes and fill in deduced types, so `alloc`/`get_mut` stay public.
#[derive(Default)]
pub struct Arena {
    nodes: Vec<AstNode>,
    /// `parents[i]` is node `i`'s syntactic parent (§3), populated by
    /// [`Arena::link_parents`] once the tree is fully built — parsing
    /// allocates children before their parent exists, so this can't be
    /// filled in at `alloc` time.
    parents: Vec<Option<NodeId>>,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, node: AstNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        self.parents.push(None);
        id
    }

    pub fn get(&self, id: NodeId) -> &AstNode {
        &self.nodes[id.index()]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut AstNode {
        &mut self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents[id.index()]
    }

    /// Walks every node's `children()` and records the parent link. Call
    /// once after a translation unit finishes parsing.
    pub fn link_parents(&mut self, root: NodeId) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            for child in self.get(id).children() {
                self.parents[child.index()] = Some(id);
                stack.push(child);
            }
        }
    }
}

/// `{id, klass, text}` — a cheap value struct for AST leaves (§3
/// `AstSyntaxToken`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AstSyntaxToken {
    pub id: SyntaxTokenID,
    pub kind: glsl_lex::TokenKind,
    pub text: Atom,
}

/// `{nameToken, arraySpec?, initializer?}` (§3). Declarations own zero or
/// more of these addressable by index; `DeclView` names one.
#[derive(Debug, Clone)]
pub struct Declarator {
    pub name: Atom,
    pub name_token: AstSyntaxToken,
    pub array: Option<NodeId>,
    pub initializer: Option<NodeId>,
}

/// `(AstDecl*, index)` — "the nth declarator of this decl" (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeclView {
    pub decl: NodeId,
    pub index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    BitNot,
    PreInc,
    PreDec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    Xor,
    And,
    BitOr,
    BitXor,
    BitAnd,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Shl,
    Shr,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Mul,
    Div,
    Rem,
    Add,
    Sub,
    Shl,
    Shr,
    And,
    Xor,
    Or,
}

impl AssignOp {
    pub fn from_punct(p: Punct) -> Option<Self> {
        Some(match p {
            Punct::Eq => AssignOp::Assign,
            Punct::StarEq => AssignOp::Mul,
            Punct::SlashEq => AssignOp::Div,
            Punct::PercentEq => AssignOp::Rem,
            Punct::PlusEq => AssignOp::Add,
            Punct::MinusEq => AssignOp::Sub,
            Punct::ShiftLeftEq => AssignOp::Shl,
            Punct::ShiftRightEq => AssignOp::Shr,
            Punct::AmpEq => AssignOp::And,
            Punct::CaretEq => AssignOp::Xor,
            Punct::PipeEq => AssignOp::Or,
            _ => return None,
        })
    }
}

/// Expression node payloads (§4.D, §4.E). `ArrayConstructorCall` is split out
/// from `ConstructorCall` per the array-constructor-call supplement: it gets
/// its own shape so array-arity bookkeeping doesn't leak into the ordinary
/// constructor path.
#[derive(Debug, Clone)]
pub enum ExprKind {
    Error,
    BoolLiteral(bool),
    NumberLiteral { text: Atom, kind: NumberKind },
    /// A bare identifier reference; resolved to a `DeclView` by `glsl-sema`.
    NameAccess { name: Atom },
    /// `base.field`, also the raw shape swizzles and `.length()` parse into;
    /// `glsl-sema` classifies `field` as a struct member, swizzle, or the
    /// `length` pseudo-method.
    FieldAccess { base: NodeId, field: Atom, dot_token: SyntaxTokenID },
    IndexAccess { base: NodeId, index: NodeId },
    FunctionCall { name: Atom, args: Vec<NodeId> },
    ConstructorCall { ty: NodeId, args: Vec<NodeId> },
    ArrayConstructorCall { ty: NodeId, args: Vec<NodeId> },
    PostfixInc(NodeId),
    PostfixDec(NodeId),
    Unary { op: UnaryOp, operand: NodeId },
    Binary { op: BinaryOp, lhs: NodeId, rhs: NodeId },
    Ternary { cond: NodeId, then_branch: NodeId, else_branch: NodeId },
    Assign { op: AssignOp, lhs: NodeId, rhs: NodeId },
    Comma { lhs: NodeId, rhs: NodeId },
    /// Never produced by the parser; `glsl-sema` allocates these to wrap a
    /// subexpression that underwent an implicit conversion. Its syntax range
    /// degenerates to a zero-width point at the wrapped expression's start
    /// (§4.E: feature handlers check "single-token range" before emitting a
    /// cast hint).
    ImplicitCast { source: NodeId, target: TypeId },
}

#[derive(Debug, Clone)]
pub struct ExprNode {
    pub kind: ExprKind,
    pub range: AstSyntaxRange,
    pub deduced_type: Option<TypeId>,
    pub resolved_decl: Option<DeclView>,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    Error,
    Empty,
    Expr(NodeId),
    Decl(NodeId),
    Compound(Vec<NodeId>),
    If { cond: NodeId, then_branch: NodeId, else_branch: Option<NodeId> },
    While { cond: NodeId, body: NodeId },
    DoWhile { body: NodeId, cond: NodeId },
    For { init: Option<NodeId>, cond: Option<NodeId>, step: Option<NodeId>, body: NodeId },
    Switch { selector: NodeId, body: NodeId },
    Case(NodeId),
    Default,
    Break,
    Continue,
    Discard,
    Return(Option<NodeId>),
}

#[derive(Debug, Clone)]
pub struct StmtNode {
    pub kind: StmtKind,
    pub range: AstSyntaxRange,
}

/// One key-value pair inside `layout(...)` — the key is always an
/// identifier-shaped atom (`location`, `binding`, `set`, `std140`, ...); the
/// value is absent for flag-style keys (`layout(std140)`).
#[derive(Debug, Clone)]
pub struct LayoutEntry {
    pub key: Atom,
    pub key_token: AstSyntaxToken,
    pub value: Option<NodeId>,
}

/// Storage/precision/auxiliary/memory/interpolation/invariance qualifiers
/// plus `layout(...)` (§4.D declaration grammar).
#[derive(Debug, Clone)]
pub struct TypeQualifierSeqNode {
    pub keywords: Vec<Keyword>,
    pub layout: Vec<LayoutEntry>,
    pub range: AstSyntaxRange,
}

/// One array dimension; `None` is the unspecified trailing dimension GLSL
/// allows on function parameters (§4.E).
#[derive(Debug, Clone)]
pub struct ArraySpecNode {
    pub dims: Vec<Option<NodeId>>,
    pub range: AstSyntaxRange,
}

#[derive(Debug, Clone, Copy)]
pub enum TypeSpecifierKind {
    Builtin(Keyword),
    Named(Atom),
    /// `struct { ... }` written inline as a type specifier; points at the
    /// `AstStructDecl` allocated for it (§4.E.1 keeps structs as their own
    /// top-level node even when declared this way).
    InlineStruct(NodeId),
}

#[derive(Debug, Clone)]
pub struct QualTypeNode {
    pub qualifiers: Option<NodeId>,
    pub specifier: TypeSpecifierKind,
    pub specifier_token: AstSyntaxToken,
    pub array: Option<NodeId>,
    pub range: AstSyntaxRange,
}

#[derive(Debug, Clone)]
pub enum DeclKind {
    Error,
    Variable { qualifiers: Option<NodeId>, ty: NodeId, declarators: Vec<Declarator> },
    Param { qualifiers: Option<NodeId>, ty: NodeId, declarator: Option<Declarator> },
    Function {
        qualifiers: Option<NodeId>,
        return_type: NodeId,
        name: Atom,
        name_token: AstSyntaxToken,
        params: Vec<NodeId>,
        body: Option<NodeId>,
    },
    /// Per §4.E.1: `struct S { ... };` is its own top-level declaration, not
    /// folded into a variable decl that happens to use it inline.
    Struct { name: Option<Atom>, name_token: Option<AstSyntaxToken>, members: Vec<NodeId> },
    InterfaceBlock {
        qualifiers: NodeId,
        block_name: Atom,
        block_name_token: AstSyntaxToken,
        members: Vec<NodeId>,
        instance: Option<Declarator>,
    },
    Precision { precision: Keyword, ty: NodeId },
}

#[derive(Debug, Clone)]
pub struct DeclNode {
    pub kind: DeclKind,
    pub range: AstSyntaxRange,
}

/// Tagged union over the node categories listed in §4.E so `Arena` can stay
/// a single flat `Vec` instead of one arena per category; `AstNode::tag()`
/// recovers the category a visitor switches on.
#[derive(Debug, Clone)]
pub enum AstNode {
    Expr(ExprNode),
    Stmt(StmtNode),
    Decl(DeclNode),
    QualType(QualTypeNode),
    ArraySpec(ArraySpecNode),
    TypeQualifierSeq(TypeQualifierSeqNode),
    TranslationUnit { decls: Vec<NodeId>, range: AstSyntaxRange },
    /// A recovered span that doesn't fit any of the above (§4.D error
    /// recovery: "emits an `ErrorExpr`/`ErrorStmt` node covering the skipped
    /// range"). Used when recovery happens outside any expression/statement
    /// context, e.g. at top level between declarations.
    ErrorNode { range: AstSyntaxRange },
}

/// Tells `Parser::error_node` which node category a recovered span should be
/// wrapped as, since the recovery machinery in `recovery.rs` is shared
/// across expression, statement, and top-level contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKindHint {
    Expr,
    Stmt,
    TopLevel,
}

impl AstNode {
    /// Direct children, in syntactic order. Used to build the parent map
    /// (§3: "a pointer to its syntactic parent") and by visitors that don't
    /// need category-specific recursion.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            AstNode::Expr(e) => match &e.kind {
                ExprKind::Error
                | ExprKind::BoolLiteral(_)
                | ExprKind::NumberLiteral { .. }
                | ExprKind::NameAccess { .. } => vec![],
                ExprKind::FieldAccess { base, .. } => vec![*base],
                ExprKind::IndexAccess { base, index } => vec![*base, *index],
                ExprKind::FunctionCall { args, .. } => args.clone(),
                ExprKind::ConstructorCall { ty, args } | ExprKind::ArrayConstructorCall { ty, args } => {
                    let mut c = vec![*ty];
                    c.extend(args.iter().copied());
                    c
                }
                ExprKind::PostfixInc(n) | ExprKind::PostfixDec(n) => vec![*n],
                ExprKind::Unary { operand, .. } => vec![*operand],
                ExprKind::Binary { lhs, rhs, .. } | ExprKind::Assign { lhs, rhs, .. } | ExprKind::Comma { lhs, rhs } => {
                    vec![*lhs, *rhs]
                }
                ExprKind::Ternary { cond, then_branch, else_branch } => vec![*cond, *then_branch, *else_branch],
                ExprKind::ImplicitCast { source, .. } => vec![*source],
            },
            AstNode::Stmt(s) => match &s.kind {
                StmtKind::Error
                | StmtKind::Empty
                | StmtKind::Default
                | StmtKind::Break
                | StmtKind::Continue
                | StmtKind::Discard => vec![],
                StmtKind::Expr(n) | StmtKind::Decl(n) | StmtKind::Case(n) => vec![*n],
                StmtKind::Compound(stmts) => stmts.clone(),
                StmtKind::If { cond, then_branch, else_branch } => {
                    let mut c = vec![*cond, *then_branch];
                    c.extend(*else_branch);
                    c
                }
                StmtKind::While { cond, body } => vec![*cond, *body],
                StmtKind::DoWhile { body, cond } => vec![*body, *cond],
                StmtKind::For { init, cond, step, body } => {
                    let mut c = Vec::new();
                    c.extend(*init);
                    c.extend(*cond);
                    c.extend(*step);
                    c.push(*body);
                    c
                }
                StmtKind::Switch { selector, body } => vec![*selector, *body],
                StmtKind::Return(n) => n.into_iter().copied().collect(),
            },
            AstNode::Decl(d) => match &d.kind {
                DeclKind::Error | DeclKind::Precision { .. } => vec![],
                DeclKind::Variable { qualifiers, ty, declarators } => {
                    let mut c: Vec<NodeId> = qualifiers.into_iter().copied().collect();
                    c.push(*ty);
                    for decl in declarators {
                        c.extend(decl.array);
                        c.extend(decl.initializer);
                    }
                    c
                }
                DeclKind::Param { qualifiers, ty, declarator } => {
                    let mut c: Vec<NodeId> = qualifiers.into_iter().copied().collect();
                    c.push(*ty);
                    if let Some(decl) = declarator {
                        c.extend(decl.array);
                        c.extend(decl.initializer);
                    }
                    c
                }
                DeclKind::Function { qualifiers, return_type, params, body, .. } => {
                    let mut c: Vec<NodeId> = qualifiers.into_iter().copied().collect();
                    c.push(*return_type);
                    c.extend(params.iter().copied());
                    c.extend(*body);
                    c
                }
                DeclKind::Struct { members, .. } => members.clone(),
                DeclKind::InterfaceBlock { qualifiers, members, instance, .. } => {
                    let mut c = vec![*qualifiers];
                    c.extend(members.iter().copied());
                    if let Some(decl) = instance {
                        c.extend(decl.array);
                        c.extend(decl.initializer);
                    }
                    c
                }
            },
            AstNode::QualType(q) => {
                let mut c: Vec<NodeId> = q.qualifiers.into_iter().collect();
                if let TypeSpecifierKind::InlineStruct(n) = q.specifier {
                    c.push(n);
                }
                c.extend(q.array);
                c
            }
            AstNode::ArraySpec(a) => a.dims.iter().filter_map(|d| *d).collect(),
            AstNode::TypeQualifierSeq(t) => t.layout.iter().filter_map(|e| e.value).collect(),
            AstNode::TranslationUnit { decls, .. } => decls.clone(),
            AstNode::ErrorNode { .. } => vec![],
        }
    }

    pub fn range(&self) -> AstSyntaxRange {
        match self {
            AstNode::Expr(e) => e.range,
            AstNode::Stmt(s) => s.range,
            AstNode::Decl(d) => d.range,
            AstNode::QualType(q) => q.range,
            AstNode::ArraySpec(a) => a.range,
            AstNode::TypeQualifierSeq(t) => t.range,
            AstNode::TranslationUnit { range, .. } => *range,
            AstNode::ErrorNode { range } => *range,
        }
    }

    pub fn as_expr(&self) -> Option<&ExprNode> {
        match self {
            AstNode::Expr(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_stmt(&self) -> Option<&StmtNode> {
        match self {
            AstNode::Stmt(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_decl(&self) -> Option<&DeclNode> {
        match self {
            AstNode::Decl(d) => Some(d),
            _ => None,
        }
    }
}
