//! Vector swizzle classification (§4.F): `.xyzw` / `.rgba` / `.stpq`, 1–4
//! components, drawn from exactly one of the three component-name sets.

use glsl_syntax::{ScalarKind, TypeDesc, TypeId, TypeTable};

pub const SETS: [&[u8; 4]; 3] = [b"xyzw", b"rgba", b"stpq"];

/// Resolves one letter to its component index (0..=3) within whichever set
/// it belongs to, or `None` if it isn't a swizzle letter at all.
fn component_index(c: u8) -> Option<u8> {
    SETS.iter().find_map(|set| set.iter().position(|&x| x == c).map(|i| i as u8))
}

/// A valid swizzle: every letter from the same set, arity 1–4, every index
/// within the source vector's arity.
pub struct Swizzle {
    pub indices: Vec<u8>,
}

/// The component set `c` belongs to (one of `SETS`), or `None` if `c` isn't
/// a swizzle letter at all. Completion's swizzle-extension item (§4.I) uses
/// this to keep suggestions drawn from the one set already in use rather
/// than mixing `xyzw` with `rgba`.
pub fn set_for_letter(c: u8) -> Option<&'static [u8; 4]> {
    SETS.iter().copied().find(|set| set.contains(&c))
}

/// Classifies `field` as a swizzle over a vector of arity `source_arity`.
/// Returns `None` if `field` isn't swizzle-shaped (wrong length, mixed
/// component sets, or an index the source vector doesn't have).
pub fn classify(field: &str, source_arity: u8) -> Option<Swizzle> {
    let bytes = field.as_bytes();
    if bytes.is_empty() || bytes.len() > 4 {
        return None;
    }
    let set_idx = SETS.iter().position(|set| set.contains(&bytes[0]))?;
    let mut indices = Vec::with_capacity(bytes.len());
    for &b in bytes {
        if !SETS[set_idx].contains(&b) {
            return None;
        }
        let idx = component_index(b)?;
        if idx >= source_arity {
            return None;
        }
        indices.push(idx);
    }
    Some(Swizzle { indices })
}

/// The swizzle's result type: a scalar for a single component, otherwise a
/// vector of the source's scalar kind at the swizzle's arity.
pub fn result_type(types: &mut TypeTable, source_scalar: ScalarKind, swizzle: &Swizzle) -> TypeId {
    if swizzle.indices.len() == 1 {
        types.intern(TypeDesc::Scalar(source_scalar))
    } else {
        types.intern(TypeDesc::Vector(source_scalar, swizzle.indices.len() as u8))
    }
}
