//! Position-indexed store of preprocessor symbol occurrences (§4.C).
//!
//! The preprocessor notifies a sink of every directive and macro expansion
//! it processes at include depth 0 of the user file; this store is that
//! sink, and also the structure `QuerySymbolByPosition` (§4.H) consults
//! before falling back to an AST walk.

use glsl_atom::{Atom, TextPosition, TextRange};

/// One macro definition's shape, enough to reconstruct a `#define` line for
/// hover (§4.I) without re-reading source text.
#[derive(Debug, Clone)]
pub struct MacroSignature {
    pub name: Atom,
    pub params: Option<Vec<Atom>>,
    pub is_variadic: bool,
    pub replacement_text: String,
    pub definition_site: TextRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroUseKind {
    Expand,
    IfDef,
    IfNDef,
    Undef,
}

#[derive(Debug, Clone)]
pub enum PPSymbolKind {
    HeaderName {
        name: Atom,
        resolved_absolute_path: Option<String>,
    },
    MacroDefinition {
        macro_sig: MacroSignature,
    },
    MacroUse {
        name: Atom,
        kind: MacroUseKind,
        resolved_definition: Option<MacroSignature>,
        expansion_range: Option<TextRange>,
    },
}

/// A tagged record at a spelled text range, one of `HeaderName`,
/// `MacroDefinition`, or `MacroUse` (§3).
#[derive(Debug, Clone)]
pub struct PPSymbolOccurrence {
    pub spelled_range: TextRange,
    pub kind: PPSymbolKind,
}

/// Sorted-by-spelled-range-start accumulator supporting `O(log n)` point
/// lookup. Only populated for occurrences found at include depth 0 of the
/// user file (§4.C: "PP-symbol caching only records occurrences at include
/// depth 0 of the user file").
#[derive(Debug, Default, Clone)]
pub struct PPSymbolStore {
    occurrences: Vec<PPSymbolOccurrence>,
    sorted: bool,
}

impl PPSymbolStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, occurrence: PPSymbolOccurrence) {
        self.sorted = false;
        self.occurrences.push(occurrence);
    }

    fn ensure_sorted(&mut self) {
        if !self.sorted {
            self.occurrences.sort_by_key(|o| (o.spelled_range.start.line, o.spelled_range.start.character));
            self.sorted = true;
        }
    }

    /// Binary search for the occurrence whose spelled range contains `pos`.
    pub fn query(&mut self, pos: TextPosition) -> Option<&PPSymbolOccurrence> {
        self.ensure_sorted();
        self.query_sorted(pos)
    }

    /// Forces the lazy sort to run now rather than on first `query`. Once a
    /// `PPSymbolStore` is handed off inside an immutable `CompilerResult`,
    /// nothing can call the `&mut self` `query` anymore — `glsl-compile`
    /// calls this once right after preprocessing finishes so `query_sorted`
    /// is safe to use for the rest of the store's life.
    pub fn finalize(&mut self) {
        self.ensure_sorted();
    }

    /// Same lookup as [`query`](Self::query), but `&self` — only safe to
    /// call once [`finalize`](Self::finalize) (or `query`) has run at least
    /// once. Debug-asserts that precondition instead of silently re-sorting,
    /// since a `&self` method can't mutate `sorted`/`occurrences` itself.
    pub fn query_sorted(&self, pos: TextPosition) -> Option<&PPSymbolOccurrence> {
        debug_assert!(self.sorted, "PPSymbolStore::finalize must run before query_sorted");
        let idx = self
            .occurrences
            .partition_point(|o| o.spelled_range.start <= pos);
        // Candidates are those starting at or before `pos`; scan backwards a
        // short distance since ranges don't overlap at depth 0.
        for o in self.occurrences[..idx].iter().rev() {
            if o.spelled_range.contains_extended(pos) {
                return Some(o);
            }
            if o.spelled_range.end < pos {
                break;
            }
        }
        None
    }

    pub fn iter(&self) -> impl Iterator<Item = &PPSymbolOccurrence> {
        self.occurrences.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glsl_atom::AtomTable;

    #[test]
    fn query_finds_containing_occurrence() {
        let mut atoms = AtomTable::new();
        let name = atoms.intern("MAX");
        let mut store = PPSymbolStore::new();
        store.push(PPSymbolOccurrence {
            spelled_range: TextRange::new(TextPosition::new(0, 8), TextPosition::new(0, 11)),
            kind: PPSymbolKind::MacroUse {
                name,
                kind: MacroUseKind::Expand,
                resolved_definition: None,
                expansion_range: None,
            },
        });
        let hit = store.query(TextPosition::new(0, 9));
        assert!(hit.is_some());
        assert!(store.query(TextPosition::new(0, 20)).is_none());
    }
}
