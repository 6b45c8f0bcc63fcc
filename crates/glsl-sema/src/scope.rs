//! Scope stack (§3 `SymbolTable`): Global, Function, Block, and Struct
//! scopes, each an atom-keyed binding map. Innermost scope wins on lookup,
//! matching ordinary lexical shadowing.

use std::collections::HashMap;

use glsl_atom::Atom;
use glsl_syntax::{DeclView, NodeId, TypeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Function,
    Block,
    Struct,
}

/// What a name resolves to. Functions are kept as an overload *set* sharing
/// one name (§3: "the set of declarations with that name lives in the
/// global scope"); everything else binds to exactly one declarator.
#[derive(Debug, Clone)]
pub enum Binding {
    Variable(DeclView),
    Functions(Vec<NodeId>),
    /// A named struct type, usable as a type specifier.
    Type(TypeId),
    /// An interface block instance name, e.g. `uniform Block { ... } inst;`.
    BlockInstance { block_decl: NodeId, type_id: TypeId },
}

pub struct Scope {
    pub kind: ScopeKind,
    bindings: HashMap<Atom, Binding>,
}

impl Scope {
    pub fn new(kind: ScopeKind) -> Self {
        Self { kind, bindings: HashMap::new() }
    }

    pub fn bind(&mut self, name: Atom, binding: Binding) {
        self.bindings.insert(name, binding);
    }

    /// Adds `decl` to the named function's overload set, creating it if this
    /// is the first overload seen in this scope.
    pub fn add_function_overload(&mut self, name: Atom, decl: NodeId) {
        match self.bindings.entry(name) {
            std::collections::hash_map::Entry::Occupied(mut e) => {
                if let Binding::Functions(v) = e.get_mut() {
                    v.push(decl);
                } else {
                    e.insert(Binding::Functions(vec![decl]));
                }
            }
            std::collections::hash_map::Entry::Vacant(e) => {
                e.insert(Binding::Functions(vec![decl]));
            }
        }
    }

    pub fn get(&self, name: Atom) -> Option<&Binding> {
        self.bindings.get(&name)
    }
}

/// A stack of `Scope`s; lookups walk from the top (innermost) down.
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self { scopes: vec![Scope::new(ScopeKind::Global)] }
    }

    pub fn push(&mut self, kind: ScopeKind) {
        self.scopes.push(Scope::new(kind));
    }

    pub fn pop(&mut self) {
        debug_assert!(self.scopes.len() > 1, "must not pop the global scope");
        self.scopes.pop();
    }

    pub fn global_mut(&mut self) -> &mut Scope {
        &mut self.scopes[0]
    }

    pub fn current_mut(&mut self) -> &mut Scope {
        self.scopes.last_mut().expect("scope stack is never empty")
    }

    /// Innermost-wins lookup across the whole stack.
    pub fn lookup(&self, name: Atom) -> Option<&Binding> {
        self.scopes.iter().rev().find_map(|s| s.get(name))
    }

    /// All function-overload sets visible for `name`, innermost scope first.
    /// GLSL only ever declares functions at global scope, but collecting
    /// across the stack keeps this correct if that ever changes.
    pub fn lookup_functions(&self, name: Atom) -> Vec<NodeId> {
        let mut out = Vec::new();
        for scope in self.scopes.iter().rev() {
            if let Some(Binding::Functions(v)) = scope.get(name) {
                out.extend(v.iter().copied());
            }
        }
        out
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}
