//! Single AST pass (§4.F): scope building, name/overload resolution, type
//! deduction, implicit-cast insertion, l-value checks, and the GLSL-specific
//! `.length()` / swizzle / interface-block-field special cases.
//!
//! Two sweeps over the translation unit's top-level declarations: a
//! registration sweep binds every struct, interface block, function
//! overload, and global variable name before anything is type-checked, so a
//! function may call another declared later in the file; a checking sweep
//! then walks each function body and global initializer.

use std::collections::HashMap;

use glsl_atom::{AstSyntaxRange, AtomTable, DiagnosticMessage, DiagnosticSeverity, TextRange};
use glsl_lex::NumberKind;
use glsl_pp::PpToken;
use glsl_syntax::{
    AssignOp, Arena, AstNode, BinaryOp, DeclKind, DeclView, Declarator, ExprKind, ExprNode, NodeId,
    ScalarKind, StmtKind, TypeDesc, TypeId, TypeTable, TypeSpecifierKind, UnaryOp,
};

use crate::convert::{self, Conversion};
use crate::scope::{Binding, ScopeKind, ScopeStack};
use crate::swizzle;

pub struct Analyzer<'a> {
    arena: &'a mut Arena,
    types: &'a mut TypeTable,
    atoms: &'a AtomTable,
    tokens: &'a [PpToken],
    scopes: ScopeStack,
    struct_types: HashMap<NodeId, TypeId>,
    current_return_type: Option<TypeId>,
    diagnostics: Vec<DiagnosticMessage>,
}

/// Runs semantic analysis over `root`'s translation unit, mutating `arena`
/// in place (filling `deducedType`/`resolvedDecl`, allocating
/// `ImplicitCastExpr` nodes) and returning the diagnostics it produced.
pub fn analyze(
    arena: &mut Arena,
    types: &mut TypeTable,
    atoms: &AtomTable,
    tokens: &[PpToken],
    root: NodeId,
) -> Vec<DiagnosticMessage> {
    let mut a = Analyzer {
        arena,
        types,
        atoms,
        tokens,
        scopes: ScopeStack::new(),
        struct_types: HashMap::new(),
        current_return_type: None,
        diagnostics: Vec::new(),
    };
    a.run(root);
    a.diagnostics
}

impl<'a> Analyzer<'a> {
    fn run(&mut self, root: NodeId) {
        let AstNode::TranslationUnit { decls, .. } = self.arena.get(root) else { return };
        let decls = decls.clone();
        for &id in &decls {
            self.register_top_level(id);
        }
        for &id in &decls {
            self.check_top_level(id);
        }
    }

    fn decl_range(&self, id: NodeId) -> AstSyntaxRange {
        self.arena.get(id).range()
    }

    fn text_range(&self, range: AstSyntaxRange) -> TextRange {
        let begin = self.tokens[range.begin as usize].spelled_range;
        let end_idx = range.end.saturating_sub(1).max(range.begin) as usize;
        let end = self.tokens[end_idx.min(self.tokens.len() - 1)].spelled_range;
        TextRange::new(begin.start, end.end)
    }

    fn diag(&mut self, range: AstSyntaxRange, severity: DiagnosticSeverity, code: &'static str, text: impl Into<String>) {
        let tr = self.text_range(range);
        self.diagnostics.push(DiagnosticMessage::new(tr, severity, code, text));
    }

    // ---- type resolution -------------------------------------------------

    fn element_type(&mut self, specifier: TypeSpecifierKind) -> TypeId {
        match specifier {
            TypeSpecifierKind::Builtin(kw) => self.types.for_builtin_keyword(kw),
            TypeSpecifierKind::Named(name) => match self.scopes.lookup(name) {
                Some(Binding::Type(t)) => *t,
                _ => self.types.error_type(),
            },
            TypeSpecifierKind::InlineStruct(decl) => {
                self.struct_types.get(&decl).copied().unwrap_or_else(|| self.types.error_type())
            }
        }
    }

    fn const_eval_array_size(&self, expr: NodeId) -> Option<u32> {
        let e = self.arena.get(expr).as_expr()?;
        match &e.kind {
            ExprKind::NumberLiteral { text, kind: NumberKind::Int { .. } | NumberKind::Uint { .. } } => {
                self.atoms.resolve(*text).trim_end_matches(['u', 'U']).parse().ok()
            }
            _ => None,
        }
    }

    fn array_type(&mut self, elem: TypeId, array: Option<NodeId>) -> TypeId {
        let Some(spec_id) = array else { return elem };
        let dims = match self.arena.get(spec_id) {
            AstNode::ArraySpec(a) => a.dims.clone(),
            _ => return elem,
        };
        let mut ty = elem;
        for dim in dims.into_iter().rev() {
            let size = dim.and_then(|e| self.const_eval_array_size(e));
            ty = self.types.intern(TypeDesc::Array { elem: ty, size });
        }
        ty
    }

    /// Type of a `QualType` node combined with whichever array spec applies
    /// — the declarator's own (`float a[3]`), falling back to the type
    /// specifier's (`float[3] a`).
    fn qual_type_with_array(&mut self, qual_node: NodeId, extra_array: Option<NodeId>) -> TypeId {
        let (specifier, qual_array) = match self.arena.get(qual_node) {
            AstNode::QualType(q) => (q.specifier, q.array),
            _ => return self.types.error_type(),
        };
        let elem = self.element_type(specifier);
        self.array_type(elem, extra_array.or(qual_array))
    }

    fn declarator_type(&mut self, qual_node: NodeId, declarator: &Declarator) -> TypeId {
        self.qual_type_with_array(qual_node, declarator.array)
    }

    fn type_of_decl_view(&mut self, view: DeclView) -> TypeId {
        let extracted = match &self.arena.get(view.decl).as_decl().unwrap().kind {
            DeclKind::Variable { ty, declarators } => Some((*ty, Some(declarators[view.index as usize].clone()))),
            DeclKind::Param { ty, declarator } => Some((*ty, declarator.clone())),
            _ => None,
        };
        match extracted {
            Some((ty, Some(d))) => self.declarator_type(ty, &d),
            Some((ty, None)) => self.qual_type_with_array(ty, None),
            None => self.types.error_type(),
        }
    }

    // ---- registration sweep -----------------------------------------------

    fn register_top_level(&mut self, id: NodeId) {
        let kind = self.arena.get(id).as_decl().unwrap().kind.clone();
        match kind {
            DeclKind::Struct { .. } => self.register_struct(id),
            DeclKind::InterfaceBlock { .. } => self.register_interface_block(id),
            DeclKind::Function { name, .. } => self.scopes.global_mut().add_function_overload(name, id),
            DeclKind::Variable { ty, declarators } => {
                for (i, d) in declarators.iter().enumerate() {
                    let t = self.declarator_type(ty, d);
                    let view = DeclView { decl: id, index: i as u32 };
                    self.scopes.global_mut().bind(d.name, Binding::Variable(view));
                    let _ = t; // recomputed on demand via type_of_decl_view
                }
            }
            DeclKind::Precision { .. } | DeclKind::Error | DeclKind::Param { .. } => {}
        }
    }

    fn register_struct(&mut self, decl_id: NodeId) {
        let (name, members) = match &self.arena.get(decl_id).as_decl().unwrap().kind {
            DeclKind::Struct { name, members, .. } => (*name, members.clone()),
            _ => return,
        };
        let member_types = self.member_type_list(&members);
        let type_id = self.types.intern(TypeDesc::Struct { decl: decl_id, members: member_types });
        self.struct_types.insert(decl_id, type_id);
        if let Some(name) = name {
            self.scopes.global_mut().bind(name, Binding::Type(type_id));
        }
    }

    fn register_interface_block(&mut self, decl_id: NodeId) {
        let (block_name, members, instance) = match &self.arena.get(decl_id).as_decl().unwrap().kind {
            DeclKind::InterfaceBlock { block_name, members, instance, .. } => {
                (*block_name, members.clone(), instance.clone())
            }
            _ => return,
        };
        let member_types = self.member_type_list(&members);
        let type_id = self.types.intern(TypeDesc::Struct { decl: decl_id, members: member_types });
        self.struct_types.insert(decl_id, type_id);
        match instance {
            Some(inst) => {
                self.scopes.global_mut().bind(inst.name, Binding::BlockInstance { block_decl: decl_id, type_id });
            }
            None => {
                for &member_decl in &members {
                    if let DeclKind::Variable { declarators, .. } = &self.arena.get(member_decl).as_decl().unwrap().kind {
                        for (i, d) in declarators.iter().enumerate() {
                            let view = DeclView { decl: member_decl, index: i as u32 };
                            self.scopes.global_mut().bind(d.name, Binding::Variable(view));
                        }
                    }
                }
            }
        }
        let _ = block_name;
    }

    fn member_type_list(&mut self, members: &[NodeId]) -> Vec<(glsl_atom::Atom, TypeId)> {
        let mut out = Vec::new();
        for &member_id in members {
            let (ty, declarators) = match &self.arena.get(member_id).as_decl().unwrap().kind {
                DeclKind::Variable { ty, declarators } => (*ty, declarators.clone()),
                _ => continue,
            };
            for d in &declarators {
                let t = self.declarator_type(ty, d);
                out.push((d.name, t));
            }
        }
        out
    }

    // ---- checking sweep -----------------------------------------------

    fn check_top_level(&mut self, id: NodeId) {
        let kind = self.arena.get(id).as_decl().unwrap().kind.clone();
        match kind {
            DeclKind::Function { qualifiers: _, return_type, params, body, .. } => {
                self.check_function(id, return_type, &params, body)
            }
            DeclKind::Variable { ty, declarators } => {
                for (i, d) in declarators.iter().enumerate() {
                    if let Some(init) = d.initializer {
                        let target = self.declarator_type(ty, d);
                        self.analyze_expr(init);
                        let new_init = self.cast_to(init, target);
                        self.check_convertible_or_diag(init, target, d.array.is_some());
                        self.set_declarator_initializer(id, i, new_init);
                    }
                }
            }
            _ => {}
        }
    }

    fn set_declarator_initializer(&mut self, decl_id: NodeId, index: usize, new_init: NodeId) {
        if let AstNode::Decl(d) = self.arena.get_mut(decl_id) {
            if let DeclKind::Variable { declarators, .. } = &mut d.kind {
                declarators[index].initializer = Some(new_init);
            }
        }
    }

    fn check_function(&mut self, decl_id: NodeId, return_type: NodeId, params: &[NodeId], body: Option<NodeId>) {
        let ret_ty = self.qual_type_with_array(return_type, None);
        let prev_ret = self.current_return_type.replace(ret_ty);
        self.scopes.push(ScopeKind::Function);
        for &param_id in params {
            let (ty, declarator) = match &self.arena.get(param_id).as_decl().unwrap().kind {
                DeclKind::Param { ty, declarator } => (*ty, declarator.clone()),
                _ => continue,
            };
            if let Some(d) = declarator {
                self.scopes.current_mut().bind(d.name, Binding::Variable(DeclView { decl: param_id, index: 0 }));
            }
            let _ = ty;
        }
        if let Some(body) = body {
            self.analyze_stmt(body);
        }
        self.scopes.pop();
        self.current_return_type = prev_ret;
        let _ = decl_id;
    }

    // ---- statements ------------------------------------------------------

    fn analyze_stmt(&mut self, id: NodeId) {
        let kind = self.arena.get(id).as_stmt().unwrap().kind.clone();
        match kind {
            StmtKind::Error | StmtKind::Empty | StmtKind::Default | StmtKind::Break | StmtKind::Continue | StmtKind::Discard => {}
            StmtKind::Expr(e) => {
                self.analyze_expr(e);
            }
            StmtKind::Decl(d) => self.analyze_local_decl(d),
            StmtKind::Compound(stmts) => {
                self.scopes.push(ScopeKind::Block);
                for s in stmts {
                    self.analyze_stmt(s);
                }
                self.scopes.pop();
            }
            StmtKind::If { cond, then_branch, else_branch } => {
                self.analyze_expr(cond);
                self.analyze_stmt(then_branch);
                if let Some(e) = else_branch {
                    self.analyze_stmt(e);
                }
            }
            StmtKind::While { cond, body } => {
                self.analyze_expr(cond);
                self.analyze_stmt(body);
            }
            StmtKind::DoWhile { body, cond } => {
                self.analyze_stmt(body);
                self.analyze_expr(cond);
            }
            StmtKind::For { init, cond, step, body } => {
                self.scopes.push(ScopeKind::Block);
                if let Some(init) = init {
                    self.analyze_stmt(init);
                }
                if let Some(cond) = cond {
                    self.analyze_expr(cond);
                }
                if let Some(step) = step {
                    self.analyze_expr(step);
                }
                self.analyze_stmt(body);
                self.scopes.pop();
            }
            StmtKind::Switch { selector, body } => {
                self.analyze_expr(selector);
                self.analyze_stmt(body);
            }
            StmtKind::Case(e) => self.analyze_expr(e),
            StmtKind::Return(e) => {
                if let Some(e) = e {
                    self.analyze_expr(e);
                    if let Some(ret_ty) = self.current_return_type {
                        let new_e = self.cast_to(e, ret_ty);
                        self.check_convertible_or_diag(e, ret_ty, false);
                        self.replace_return_value(id, new_e);
                    }
                }
            }
        }
    }

    fn replace_return_value(&mut self, stmt_id: NodeId, new_value: NodeId) {
        if let AstNode::Stmt(s) = self.arena.get_mut(stmt_id) {
            if let StmtKind::Return(v) = &mut s.kind {
                *v = Some(new_value);
            }
        }
    }

    fn analyze_local_decl(&mut self, decl_id: NodeId) {
        let (ty, declarators) = match &self.arena.get(decl_id).as_decl().unwrap().kind {
            DeclKind::Variable { ty, declarators } => (*ty, declarators.clone()),
            _ => return,
        };
        for (i, d) in declarators.iter().enumerate() {
            let target = self.declarator_type(ty, d);
            self.scopes.current_mut().bind(d.name, Binding::Variable(DeclView { decl: decl_id, index: i as u32 }));
            if let Some(init) = d.initializer {
                self.analyze_expr(init);
                let new_init = self.cast_to(init, target);
                self.check_convertible_or_diag(init, target, d.array.is_some());
                self.set_declarator_initializer(decl_id, i, new_init);
            }
        }
    }

    fn check_convertible_or_diag(&mut self, expr: NodeId, target: TypeId, is_array: bool) {
        if is_array {
            return; // array initializer-list checking isn't modeled (braced-list initializers are a non-goal here)
        }
        let source = self.expr_type(expr);
        if source == self.types.error_type() || target == self.types.error_type() {
            return;
        }
        if convert::classify(self.types, source, target).is_none() {
            let range = self.decl_range(expr);
            self.diag(range, DiagnosticSeverity::Error, "sema-type-mismatch", "initializer type is not convertible to the declared type");
        }
    }

    // ---- expressions -------------------------------------------------------

    fn expr_type(&self, id: NodeId) -> TypeId {
        self.arena.get(id).as_expr().and_then(|e| e.deduced_type).unwrap_or_else(|| self.types.error_type())
    }

    fn set_expr(&mut self, id: NodeId, ty: TypeId, resolved: Option<DeclView>) {
        if let AstNode::Expr(e) = self.arena.get_mut(id) {
            e.deduced_type = Some(ty);
            e.resolved_decl = resolved;
        }
    }

    fn cast_to(&mut self, expr: NodeId, target: TypeId) -> NodeId {
        let source = self.expr_type(expr);
        match convert::classify(self.types, source, target) {
            Some(Conversion::Implicit) => {
                let src_range = self.decl_range(expr);
                let range = AstSyntaxRange::new(src_range.tu, src_range.begin, src_range.begin);
                self.arena.alloc(AstNode::Expr(ExprNode {
                    kind: ExprKind::ImplicitCast { source: expr, target },
                    range,
                    deduced_type: Some(target),
                    resolved_decl: None,
                }))
            }
            _ => expr,
        }
    }

    /// Bottom-up type deduction, name/overload resolution, and cast
    /// insertion for one expression subtree. Mutates the node's own
    /// `deducedType`/`resolvedDecl`; for compound expressions whose
    /// children might get wrapped in an `ImplicitCastExpr`, also rewrites
    /// the owning node's child references.
    fn analyze_expr(&mut self, id: NodeId) {
        let kind = self.arena.get(id).as_expr().unwrap().kind.clone();
        match kind {
            ExprKind::Error => self.set_expr(id, self.types.error_type(), None),
            ExprKind::BoolLiteral(_) => {
                let t = self.types.intern(TypeDesc::Scalar(ScalarKind::Bool));
                self.set_expr(id, t, None);
            }
            ExprKind::NumberLiteral { kind: nk, .. } => {
                let scalar = match nk {
                    NumberKind::Int { .. } => ScalarKind::Int,
                    NumberKind::Uint { .. } => ScalarKind::Uint,
                    NumberKind::Float => ScalarKind::Float,
                    NumberKind::Double => ScalarKind::Double,
                };
                let t = self.types.intern(TypeDesc::Scalar(scalar));
                self.set_expr(id, t, None);
            }
            ExprKind::NameAccess { name } => self.analyze_name_access(id, name),
            ExprKind::FieldAccess { base, field, .. } => self.analyze_field_access(id, base, field),
            ExprKind::IndexAccess { base, index } => {
                self.analyze_expr(base);
                self.analyze_expr(index);
                let base_ty = self.expr_type(base);
                let elem = match self.types.resolve(base_ty) {
                    TypeDesc::Array { elem, .. } => *elem,
                    TypeDesc::Vector(s, _) => self.types.intern(TypeDesc::Scalar(*s)),
                    TypeDesc::Matrix(s, _, cols) => self.types.intern(TypeDesc::Vector(*s, *cols)),
                    _ => self.types.error_type(),
                };
                self.set_expr(id, elem, None);
            }
            ExprKind::FunctionCall { name, args } => self.analyze_call(id, name, &args),
            ExprKind::ConstructorCall { ty, args } => self.analyze_constructor(id, ty, &args, false),
            ExprKind::ArrayConstructorCall { ty, args } => self.analyze_constructor(id, ty, &args, true),
            ExprKind::PostfixInc(operand) | ExprKind::PostfixDec(operand) => {
                self.analyze_expr(operand);
                let t = self.expr_type(operand);
                self.set_expr(id, t, None);
                self.check_lvalue(operand);
            }
            ExprKind::Unary { op, operand } => {
                self.analyze_expr(operand);
                let t = self.expr_type(operand);
                self.set_expr(id, t, None);
                if matches!(op, UnaryOp::PreInc | UnaryOp::PreDec) {
                    self.check_lvalue(operand);
                }
            }
            ExprKind::Binary { op, lhs, rhs } => self.analyze_binary(id, op, lhs, rhs),
            ExprKind::Ternary { cond, then_branch, else_branch } => {
                self.analyze_expr(cond);
                self.analyze_expr(then_branch);
                self.analyze_expr(else_branch);
                let (t1, t2) = (self.expr_type(then_branch), self.expr_type(else_branch));
                let result = if t1 == t2 {
                    t1
                } else if convert::is_convertible(self.types, t1, t2) {
                    t2
                } else if convert::is_convertible(self.types, t2, t1) {
                    t1
                } else {
                    self.types.error_type()
                };
                self.set_expr(id, result, None);
            }
            ExprKind::Assign { op, lhs, rhs } => self.analyze_assign(id, op, lhs, rhs),
            ExprKind::Comma { lhs, rhs } => {
                self.analyze_expr(lhs);
                self.analyze_expr(rhs);
                let t = self.expr_type(rhs);
                self.set_expr(id, t, None);
            }
            ExprKind::ImplicitCast { target, .. } => self.set_expr(id, target, None),
        }
    }

    fn analyze_name_access(&mut self, id: NodeId, name: glsl_atom::Atom) {
        match self.scopes.lookup(name) {
            Some(Binding::Variable(view)) => {
                let view = *view;
                let t = self.type_of_decl_view(view);
                self.set_expr(id, t, Some(view));
            }
            Some(Binding::BlockInstance { type_id, .. }) => {
                let t = *type_id;
                self.set_expr(id, t, None);
            }
            _ => {
                let range = self.decl_range(id);
                self.diag(range, DiagnosticSeverity::Error, "sema-unresolved-name", format!("undeclared identifier"));
                self.set_expr(id, self.types.error_type(), None);
            }
        }
    }

    fn analyze_field_access(&mut self, id: NodeId, base: NodeId, field: glsl_atom::Atom) {
        self.analyze_expr(base);
        let base_ty = self.expr_type(base);
        let field_text = self.atoms.resolve(field).to_string();

        if field_text == "length" {
            if matches!(
                self.types.resolve(base_ty),
                TypeDesc::Array { .. } | TypeDesc::Vector(..) | TypeDesc::Matrix(..)
            ) {
                let t = self.types.intern(TypeDesc::Scalar(ScalarKind::Int));
                self.set_expr(id, t, None);
                return;
            }
        }

        match self.types.resolve(base_ty).clone() {
            TypeDesc::Vector(scalar, arity) => match swizzle::classify(&field_text, arity) {
                Some(sw) => {
                    let t = swizzle::result_type(self.types, scalar, &sw);
                    self.set_expr(id, t, None);
                }
                None => {
                    let range = self.decl_range(id);
                    self.diag(range, DiagnosticSeverity::Error, "sema-bad-swizzle", "not a valid swizzle for this vector");
                    self.set_expr(id, self.types.error_type(), None);
                }
            },
            TypeDesc::Struct { decl, .. } => match self.resolve_member(decl, field) {
                Some((t, view)) => self.set_expr(id, t, Some(view)),
                None => {
                    let range = self.decl_range(id);
                    self.diag(range, DiagnosticSeverity::Error, "sema-no-such-member", "no member with this name");
                    self.set_expr(id, self.types.error_type(), None);
                }
            },
            TypeDesc::Error => self.set_expr(id, self.types.error_type(), None),
            _ => {
                let range = self.decl_range(id);
                self.diag(range, DiagnosticSeverity::Error, "sema-no-such-member", "field access on a non-aggregate type");
                self.set_expr(id, self.types.error_type(), None);
            }
        }
    }

    fn resolve_member(&mut self, struct_or_block_decl: NodeId, field: glsl_atom::Atom) -> Option<(TypeId, DeclView)> {
        let members = match &self.arena.get(struct_or_block_decl).as_decl().unwrap().kind {
            DeclKind::Struct { members, .. } => members.clone(),
            DeclKind::InterfaceBlock { members, .. } => members.clone(),
            _ => return None,
        };
        for &member_id in &members {
            let (ty, declarators) = match &self.arena.get(member_id).as_decl().unwrap().kind {
                DeclKind::Variable { ty, declarators } => (*ty, declarators.clone()),
                _ => continue,
            };
            if let Some((i, d)) = declarators.iter().enumerate().find(|(_, d)| d.name == field) {
                let t = self.declarator_type(ty, d);
                return Some((t, DeclView { decl: member_id, index: i as u32 }));
            }
        }
        None
    }

    fn analyze_binary(&mut self, id: NodeId, op: BinaryOp, lhs: NodeId, rhs: NodeId) {
        self.analyze_expr(lhs);
        self.analyze_expr(rhs);
        let (lt, rt) = (self.expr_type(lhs), self.expr_type(rhs));
        let result = match op {
            BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Lt
            | BinaryOp::Gt
            | BinaryOp::Le
            | BinaryOp::Ge
            | BinaryOp::Or
            | BinaryOp::Xor
            | BinaryOp::And => self.types.intern(TypeDesc::Scalar(ScalarKind::Bool)),
            _ => self.arithmetic_result(lt, rt),
        };
        self.set_expr(id, result, None);
    }

    /// Elementwise arithmetic result: scalar-scalar widens, vector/matrix
    /// with a scalar operand broadcasts, matching shapes require identical
    /// or convertible scalar kinds.
    fn arithmetic_result(&mut self, lt: TypeId, rt: TypeId) -> TypeId {
        if lt == rt {
            return lt;
        }
        match (self.types.resolve(lt).clone(), self.types.resolve(rt).clone()) {
            (TypeDesc::Scalar(a), TypeDesc::Scalar(b)) => self.types.intern(TypeDesc::Scalar(convert::common_scalar(a, b))),
            (TypeDesc::Vector(a, n), TypeDesc::Scalar(_)) | (TypeDesc::Scalar(_), TypeDesc::Vector(a, n)) => {
                self.types.intern(TypeDesc::Vector(a, n))
            }
            (TypeDesc::Vector(a, n1), TypeDesc::Vector(b, n2)) if n1 == n2 => {
                self.types.intern(TypeDesc::Vector(convert::common_scalar(a, b), n1))
            }
            (TypeDesc::Matrix(a, r, c), TypeDesc::Scalar(_)) | (TypeDesc::Scalar(_), TypeDesc::Matrix(a, r, c)) => {
                self.types.intern(TypeDesc::Matrix(a, r, c))
            }
            (TypeDesc::Error, _) | (_, TypeDesc::Error) => self.types.error_type(),
            _ => self.types.error_type(),
        }
    }

    fn analyze_assign(&mut self, id: NodeId, op: AssignOp, lhs: NodeId, rhs: NodeId) {
        self.analyze_expr(lhs);
        self.analyze_expr(rhs);
        self.check_lvalue(lhs);
        let lt = self.expr_type(lhs);
        let new_rhs = match op {
            AssignOp::Assign => {
                self.check_convertible_or_diag(rhs, lt, false);
                self.cast_to(rhs, lt)
            }
            // Shift count keeps its own type (§4.D) — it's never converted
            // toward `lt`, only checked for being integer-family itself.
            AssignOp::Shl | AssignOp::Shr => {
                self.check_integer_family(lhs, lt);
                let rt = self.expr_type(rhs);
                self.check_integer_family(rhs, rt);
                rhs
            }
            // `&=`, `^=`, `|=` require both sides integer-family, then
            // convert the result back toward `lt` same as arithmetic.
            AssignOp::And | AssignOp::Xor | AssignOp::Or => {
                self.check_integer_family(lhs, lt);
                let rt = self.expr_type(rhs);
                self.check_integer_family(rhs, rt);
                self.check_convertible_or_diag(rhs, lt, false);
                self.cast_to(rhs, lt)
            }
            AssignOp::Mul | AssignOp::Div | AssignOp::Rem | AssignOp::Add | AssignOp::Sub => {
                let rt = self.expr_type(rhs);
                let result = self.arithmetic_result(lt, rt);
                if result == self.types.error_type() && lt != self.types.error_type() && rt != self.types.error_type() {
                    let range = self.decl_range(rhs);
                    self.diag(range, DiagnosticSeverity::Error, "sema-type-mismatch", "operand types are not compatible for this compound assignment");
                }
                self.check_convertible_or_diag(rhs, lt, false);
                self.cast_to(rhs, lt)
            }
        };
        if let AstNode::Expr(e) = self.arena.get_mut(id) {
            if let ExprKind::Assign { rhs: r, .. } = &mut e.kind {
                *r = new_rhs;
            }
        }
        self.set_expr(id, lt, None);
    }

    /// `<<=`, `>>=`, `&=`, `^=`, `|=` all require an integer-family operand
    /// (`int`/`uint`, scalar or vector) — `bool`/`float`/`double` on either
    /// side is a diagnostic, not a silent cast (§4.D/§4.E).
    fn check_integer_family(&mut self, expr: NodeId, ty: TypeId) {
        let is_integer_family = match self.types.resolve(ty) {
            TypeDesc::Scalar(ScalarKind::Int | ScalarKind::Uint) => true,
            TypeDesc::Vector(ScalarKind::Int | ScalarKind::Uint, _) => true,
            TypeDesc::Error => true,
            _ => false,
        };
        if !is_integer_family {
            let range = self.decl_range(expr);
            self.diag(range, DiagnosticSeverity::Error, "sema-bad-bitwise-operand", "operand must be an integer or unsigned integer type for this operator");
        }
    }

    /// §4.F l-value rules: the assignable surface is a name, field, or index
    /// access chain ultimately rooted at a variable — never a literal, a
    /// call result, or (until `const`-qualifier tracking lands) a
    /// `const`-qualified one.
    fn check_lvalue(&mut self, expr: NodeId) {
        let kind = self.arena.get(expr).as_expr().unwrap().kind.clone();
        let ok = match kind {
            ExprKind::NameAccess { .. } => true,
            ExprKind::FieldAccess { base, .. } | ExprKind::IndexAccess { base, .. } => {
                self.check_lvalue(base);
                return;
            }
            _ => false,
        };
        if !ok {
            let range = self.decl_range(expr);
            self.diag(range, DiagnosticSeverity::Error, "sema-not-an-lvalue", "expression is not assignable");
        }
    }

    fn analyze_call(&mut self, id: NodeId, name: glsl_atom::Atom, args: &[NodeId]) {
        for &a in args {
            self.analyze_expr(a);
        }
        let candidates = self.scopes.lookup_functions(name);
        if candidates.is_empty() {
            let range = self.decl_range(id);
            self.diag(range, DiagnosticSeverity::Error, "sema-unresolved-call", format!("no function named '{}'", self.atoms.resolve(name)));
            self.set_expr(id, self.types.error_type(), None);
            return;
        }
        let arg_types: Vec<TypeId> = args.iter().map(|&a| self.expr_type(a)).collect();
        let Some((winner, param_types, ret_ty)) = self.pick_overload(&candidates, &arg_types) else {
            let range = self.decl_range(id);
            self.diag(range, DiagnosticSeverity::Error, "sema-no-matching-overload", "no overload of this function matches the argument types");
            self.set_expr(id, self.types.error_type(), None);
            return;
        };
        let mut new_args = Vec::with_capacity(args.len());
        for (i, &a) in args.iter().enumerate() {
            new_args.push(self.cast_to(a, param_types[i]));
        }
        if let AstNode::Expr(e) = self.arena.get_mut(id) {
            if let ExprKind::FunctionCall { args, .. } = &mut e.kind {
                *args = new_args;
            }
        }
        self.set_expr(id, ret_ty, Some(DeclView { decl: winner, index: 0 }));
    }

    /// Returns `(winning decl, its parameter types, its return type)` for the
    /// best-matching overload, or `None` if zero or more than one candidate
    /// ties for best (§4.F: "error if zero or multiple equally-good
    /// candidates").
    fn pick_overload(&mut self, candidates: &[NodeId], arg_types: &[TypeId]) -> Option<(NodeId, Vec<TypeId>, TypeId)> {
        let mut best: Option<(NodeId, Vec<TypeId>, TypeId, u32)> = None;
        let mut best_count = 0u32;
        for &cand in candidates {
            let (params, return_type) = match &self.arena.get(cand).as_decl().unwrap().kind {
                DeclKind::Function { params, return_type, .. } => (params.clone(), *return_type),
                _ => continue,
            };
            if params.len() != arg_types.len() {
                continue;
            }
            let param_types: Vec<TypeId> = params
                .iter()
                .map(|&p| match &self.arena.get(p).as_decl().unwrap().kind {
                    DeclKind::Param { ty, declarator } => {
                        let ty = *ty;
                        let d = declarator.clone();
                        match d {
                            Some(d) => self.declarator_type(ty, &d),
                            None => self.qual_type_with_array(ty, None),
                        }
                    }
                    _ => self.types.error_type(),
                })
                .collect();
            let mut exact = 0u32;
            let mut viable = true;
            for (i, &arg_ty) in arg_types.iter().enumerate() {
                match convert::classify(self.types, arg_ty, param_types[i]) {
                    Some(Conversion::Identity) => exact += 1,
                    Some(Conversion::Implicit) => {}
                    None => {
                        viable = false;
                        break;
                    }
                }
            }
            if !viable {
                continue;
            }
            let ret_ty = self.qual_type_with_array(return_type, None);
            match &best {
                None => {
                    best = Some((cand, param_types, ret_ty, exact));
                    best_count = 1;
                }
                Some((_, _, _, prev_exact)) if exact > *prev_exact => {
                    best = Some((cand, param_types, ret_ty, exact));
                    best_count = 1;
                }
                Some((_, _, _, prev_exact)) if exact == *prev_exact => {
                    best_count += 1;
                }
                _ => {}
            }
        }
        if best_count == 1 {
            best.map(|(d, p, r, _)| (d, p, r))
        } else {
            None
        }
    }

    fn analyze_constructor(&mut self, id: NodeId, ty_node: NodeId, args: &[NodeId], is_array: bool) {
        for &a in args {
            self.analyze_expr(a);
        }
        let ty = self.qual_type_with_array(ty_node, None);
        let result = if is_array {
            let elem = match self.types.resolve(ty) {
                TypeDesc::Array { elem, .. } => *elem,
                other => self.types.intern(other.clone()),
            };
            self.types.intern(TypeDesc::Array { elem, size: Some(args.len() as u32) })
        } else {
            ty
        };
        self.set_expr(id, result, None);
    }
}
