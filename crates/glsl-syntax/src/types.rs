//! Structurally interned type descriptors (§3 `TypeDesc`).
//!
//! Two `TypeId`s compare equal iff they were interned for structurally equal
//! descriptors — `TypeTable` does the interning, so `TypeId` equality is
//! exactly pointer/index equality as the data model requires, without
//! needing a raw pointer.

use std::collections::HashMap;

use glsl_atom::Atom;
use glsl_lex::Keyword;

use crate::ast::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Int,
    Uint,
    Float,
    Double,
}

impl ScalarKind {
    /// `bool -> int -> uint -> float -> double`, the arithmetic-context
    /// widening order (§4.E).
    pub fn rank(self) -> u8 {
        match self {
            ScalarKind::Bool => 0,
            ScalarKind::Int => 1,
            ScalarKind::Uint => 2,
            ScalarKind::Float => 3,
            ScalarKind::Double => 4,
        }
    }
}

/// One structurally-interned shape (§3 `TypeDesc`). `Opaque` covers every
/// sampler/image/texture/subpass-input keyword rather than one variant per
/// permutation — they behave identically for type-equality purposes (two
/// samplers are the same type iff they're the same keyword).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDesc {
    Error,
    Void,
    Scalar(ScalarKind),
    Vector(ScalarKind, u8),
    Matrix(ScalarKind, u8, u8),
    Opaque(Keyword),
    Array { elem: TypeId, size: Option<u32> },
    Struct { decl: NodeId, members: Vec<(Atom, TypeId)> },
}

#[derive(Default)]
pub struct TypeTable {
    descs: Vec<TypeDesc>,
    index: HashMap<TypeDesc, TypeId>,
}

impl TypeTable {
    pub fn new() -> Self {
        let mut t = Self::default();
        // Pre-intern the handful of types every compilation touches so
        // `error_type()`/`void_type()` are O(1) without a lookup.
        t.intern(TypeDesc::Error);
        t.intern(TypeDesc::Void);
        t
    }

    pub fn intern(&mut self, desc: TypeDesc) -> TypeId {
        if let Some(&id) = self.index.get(&desc) {
            return id;
        }
        let id = TypeId(self.descs.len() as u32);
        self.index.insert(desc.clone(), id);
        self.descs.push(desc);
        id
    }

    pub fn resolve(&self, id: TypeId) -> &TypeDesc {
        &self.descs[id.index()]
    }

    pub fn error_type(&self) -> TypeId {
        TypeId(0)
    }

    pub fn void_type(&self) -> TypeId {
        TypeId(1)
    }

    /// The builtin scalar/vector/matrix type named by `kw`, or `None` if
    /// `kw` is a sampler/image/texture/subpass keyword (those still intern
    /// via `TypeDesc::Opaque`, just not through this table of fixed shapes).
    pub fn for_builtin_keyword(&mut self, kw: Keyword) -> TypeId {
        use Keyword::*;
        match kw {
            Void => self.void_type(),
            Bool => self.intern(TypeDesc::Scalar(ScalarKind::Bool)),
            Int => self.intern(TypeDesc::Scalar(ScalarKind::Int)),
            Uint => self.intern(TypeDesc::Scalar(ScalarKind::Uint)),
            Float => self.intern(TypeDesc::Scalar(ScalarKind::Float)),
            Double => self.intern(TypeDesc::Scalar(ScalarKind::Double)),
            Vec2 => self.intern(TypeDesc::Vector(ScalarKind::Float, 2)),
            Vec3 => self.intern(TypeDesc::Vector(ScalarKind::Float, 3)),
            Vec4 => self.intern(TypeDesc::Vector(ScalarKind::Float, 4)),
            Ivec2 => self.intern(TypeDesc::Vector(ScalarKind::Int, 2)),
            Ivec3 => self.intern(TypeDesc::Vector(ScalarKind::Int, 3)),
            Ivec4 => self.intern(TypeDesc::Vector(ScalarKind::Int, 4)),
            Uvec2 => self.intern(TypeDesc::Vector(ScalarKind::Uint, 2)),
            Uvec3 => self.intern(TypeDesc::Vector(ScalarKind::Uint, 3)),
            Uvec4 => self.intern(TypeDesc::Vector(ScalarKind::Uint, 4)),
            Bvec2 => self.intern(TypeDesc::Vector(ScalarKind::Bool, 2)),
            Bvec3 => self.intern(TypeDesc::Vector(ScalarKind::Bool, 3)),
            Bvec4 => self.intern(TypeDesc::Vector(ScalarKind::Bool, 4)),
            Dvec2 => self.intern(TypeDesc::Vector(ScalarKind::Double, 2)),
            Dvec3 => self.intern(TypeDesc::Vector(ScalarKind::Double, 3)),
            Dvec4 => self.intern(TypeDesc::Vector(ScalarKind::Double, 4)),
            Mat2 => self.intern(TypeDesc::Matrix(ScalarKind::Float, 2, 2)),
            Mat3 => self.intern(TypeDesc::Matrix(ScalarKind::Float, 3, 3)),
            Mat4 => self.intern(TypeDesc::Matrix(ScalarKind::Float, 4, 4)),
            Mat2x3 => self.intern(TypeDesc::Matrix(ScalarKind::Float, 2, 3)),
            Mat2x4 => self.intern(TypeDesc::Matrix(ScalarKind::Float, 2, 4)),
            Mat3x2 => self.intern(TypeDesc::Matrix(ScalarKind::Float, 3, 2)),
            Mat3x4 => self.intern(TypeDesc::Matrix(ScalarKind::Float, 3, 4)),
            Mat4x2 => self.intern(TypeDesc::Matrix(ScalarKind::Float, 4, 2)),
            Mat4x3 => self.intern(TypeDesc::Matrix(ScalarKind::Float, 4, 3)),
            Dmat2 => self.intern(TypeDesc::Matrix(ScalarKind::Double, 2, 2)),
            Dmat3 => self.intern(TypeDesc::Matrix(ScalarKind::Double, 3, 3)),
            Dmat4 => self.intern(TypeDesc::Matrix(ScalarKind::Double, 4, 4)),
            other => self.intern(TypeDesc::Opaque(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_shapes_intern_to_the_same_id() {
        let mut t = TypeTable::new();
        let a = t.intern(TypeDesc::Vector(ScalarKind::Float, 3));
        let b = t.intern(TypeDesc::Vector(ScalarKind::Float, 3));
        let c = t.intern(TypeDesc::Vector(ScalarKind::Float, 4));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn builtin_keyword_lookup_is_consistent_with_intern() {
        let mut t = TypeTable::new();
        let a = t.for_builtin_keyword(Keyword::Vec3);
        let b = t.intern(TypeDesc::Vector(ScalarKind::Float, 3));
        assert_eq!(a, b);
    }
}
