//! Implicit-conversion lattice used for both assignment compatibility and
//! overload resolution (§4.F). GLSL only ever widens scalars, and only
//! between vectors/matrices of identical shape — there is no vector↔scalar
//! splat in ordinary expressions (that's a constructor-call concern).

use glsl_syntax::{ScalarKind, TypeDesc, TypeId, TypeTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// Types already match; no cast node is inserted.
    Identity,
    /// `target` is implicitly reachable from `source` by scalar widening.
    Implicit,
}

/// Can `source` be used where `target` is expected, and if so how?
pub fn classify(types: &TypeTable, source: TypeId, target: TypeId) -> Option<Conversion> {
    if source == target {
        return Some(Conversion::Identity);
    }
    match (types.resolve(source), types.resolve(target)) {
        (TypeDesc::Error, _) | (_, TypeDesc::Error) => Some(Conversion::Identity),
        (TypeDesc::Scalar(s), TypeDesc::Scalar(t)) if t.rank() > s.rank() => Some(Conversion::Implicit),
        (TypeDesc::Vector(s, n1), TypeDesc::Vector(t, n2)) if n1 == n2 && t.rank() > s.rank() => {
            Some(Conversion::Implicit)
        }
        (TypeDesc::Matrix(s, r1, c1), TypeDesc::Matrix(t, r2, c2)) if r1 == r2 && c1 == c2 && t.rank() > s.rank() => {
            Some(Conversion::Implicit)
        }
        _ => None,
    }
}

pub fn is_convertible(types: &TypeTable, source: TypeId, target: TypeId) -> bool {
    classify(types, source, target).is_some()
}

/// Widest common scalar kind two ranks can both implicitly convert to,
/// used when deducing the result type of a binary arithmetic operator over
/// mismatched-but-convertible scalar operands.
pub fn common_scalar(a: ScalarKind, b: ScalarKind) -> ScalarKind {
    if a.rank() >= b.rank() { a } else { b }
}
