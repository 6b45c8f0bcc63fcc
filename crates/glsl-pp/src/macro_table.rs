//! Macro definitions and the substitution engine (§4.C).

use glsl_atom::{Atom, AtomTable, TextRange};
use glsl_lex::TokenKind;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepTok {
    pub kind: TokenKind,
    pub text: Atom,
    /// Where this token's spelling really lives in source, when known — set
    /// for tokens captured from a macro invocation's arguments so that
    /// hover/go-to-definition on an argument reaches through the expansion
    /// to the call site. `None` for tokens that come from the macro body
    /// text itself, or from `#`/`##`, which have no single faithful spelling
    /// and collapse to the invocation site (§5).
    pub spelled: Option<TextRange>,
}

/// One element of a macro's replacement list, after `#`/`##` have been
/// folded out of the raw token sequence.
#[derive(Debug, Clone)]
pub enum ReplacementElem {
    Tok(RepTok),
    /// Index into the macro's parameter list.
    Param(usize),
    /// `#param` — stringize.
    Stringize(usize),
}

#[derive(Debug, Clone)]
pub struct ReplacementItem {
    pub elem: ReplacementElem,
    /// `##` follows this item in the replacement list.
    pub paste_next: bool,
}

#[derive(Debug, Clone)]
pub struct PPMacro {
    pub name: Atom,
    pub params: Option<Vec<Atom>>,
    pub is_variadic: bool,
    pub items: Vec<ReplacementItem>,
    pub definition_site: TextRange,
}

impl PPMacro {
    pub fn is_function_like(&self) -> bool {
        self.params.is_some()
    }
}

#[derive(Default)]
pub struct MacroTable {
    macros: HashMap<Atom, PPMacro>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, m: PPMacro) {
        self.macros.insert(m.name, m);
    }

    pub fn undef(&mut self, name: Atom) -> bool {
        self.macros.remove(&name).is_some()
    }

    pub fn get(&self, name: Atom) -> Option<&PPMacro> {
        self.macros.get(&name)
    }

    pub fn is_defined(&self, name: Atom) -> bool {
        self.macros.contains_key(&name)
    }

    pub fn names_defined(&self) -> impl Iterator<Item = Atom> + '_ {
        self.macros.keys().copied()
    }
}

pub struct Argument {
    pub raw: Vec<RepTok>,
    pub expanded: Vec<RepTok>,
}

/// Produce a single pasted token by concatenating two tokens' spellings and
/// reclassifying the result. GLSL has no string/char literal grammar so the
/// reclassification heuristics below are deliberately small: identifier-like
/// if it starts with a letter/underscore, numeric if all digits, otherwise
/// an operator if the whole text matches one, else an error token — a
/// malformed paste becomes a single `Error` token rather than a parser
/// crash, consistent with tokenizer-level error recovery (§4.B).
pub fn paste_tokens(atoms: &mut AtomTable, lhs: &RepTok, rhs: &RepTok) -> RepTok {
    let combined = format!("{}{}", atoms.resolve(lhs.text), atoms.resolve(rhs.text));
    classify_pasted(atoms, &combined)
}

fn classify_pasted(atoms: &mut AtomTable, text: &str) -> RepTok {
    let atom = atoms.intern(text);
    if text.is_empty() {
        return RepTok { kind: TokenKind::Error, text: atom, spelled: None };
    }
    let mut chars = text.chars();
    let first = chars.next().unwrap();
    if first == '_' || first.is_alphabetic() {
        if text.chars().all(|c| c == '_' || c.is_alphanumeric()) {
            let kind = match glsl_lex::keyword::lookup(text) {
                Some(kw) => TokenKind::Keyword(kw),
                None => TokenKind::Identifier,
            };
            return RepTok { kind, text: atom, spelled: None };
        }
        return RepTok { kind: TokenKind::Error, text: atom, spelled: None };
    }
    if first.is_ascii_digit() {
        if text.chars().all(|c| c.is_ascii_digit()) {
            return RepTok {
                kind: TokenKind::Number(glsl_lex::NumberKind::Int { base: glsl_lex::IntBase::Decimal }),
                text: atom,
                spelled: None,
            };
        }
        return RepTok { kind: TokenKind::Error, text: atom, spelled: None };
    }
    if let Some((p, len)) = glsl_lex::punct::lex_longest(text) {
        if len == text.len() {
            return RepTok { kind: TokenKind::Punct(p), text: atom, spelled: None };
        }
    }
    RepTok { kind: TokenKind::Error, text: atom, spelled: None }
}

/// Stringize the raw (unexpanded) argument tokens into one synthetic token,
/// joining adjacent tokens with a single space (an approximation of the
/// standard's "preserve original inter-token whitespace" rule, acceptable
/// since GLSL has no string literal consumer that would notice the
/// difference beyond `#pragma`/`#error` message text).
pub fn stringize(atoms: &mut AtomTable, raw: &[RepTok]) -> RepTok {
    let mut s = String::new();
    for (i, t) in raw.iter().enumerate() {
        if i > 0 {
            s.push(' ');
        }
        s.push_str(atoms.resolve(t.text));
    }
    let atom = atoms.intern(&s);
    RepTok { kind: TokenKind::PreprocessingString, text: atom, spelled: None }
}

/// Substitute `args` into `macro_def`'s replacement list, applying `##`
/// pasting at marked boundaries. Caller has already pre-expanded each
/// argument's `expanded` field (macro rescanning of arguments happens
/// before this call, per §4.C: "each argument is itself pre-expanded before
/// substitution except where the parameter appears in a `#` or `##`
/// context").
pub fn substitute(atoms: &mut AtomTable, macro_def: &PPMacro, args: &[Argument]) -> Vec<RepTok> {
    let items = &macro_def.items;
    let touches_paste: Vec<bool> = (0..items.len())
        .map(|i| items[i].paste_next || (i > 0 && items[i - 1].paste_next))
        .collect();

    let mut fragments: Vec<Vec<RepTok>> = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let frag = match &item.elem {
            ReplacementElem::Tok(t) => vec![t.clone()],
            ReplacementElem::Param(idx) => {
                let arg = &args[*idx];
                if touches_paste[i] { arg.raw.clone() } else { arg.expanded.clone() }
            }
            ReplacementElem::Stringize(idx) => vec![stringize(atoms, &args[*idx].raw)],
        };
        fragments.push(frag);
    }

    let mut out: Vec<RepTok> = Vec::new();
    for (i, frag) in fragments.into_iter().enumerate() {
        if i > 0 && items[i - 1].paste_next {
            if let (Some(last), true) = (out.pop(), !frag.is_empty()) {
                let pasted = paste_tokens(atoms, &last, &frag[0]);
                out.push(pasted);
                out.extend_from_slice(&frag[1..]);
            } else {
                out.extend(frag);
            }
        } else {
            out.extend(frag);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paste_concatenates_identifiers() {
        let mut atoms = AtomTable::new();
        let a = RepTok { kind: TokenKind::Identifier, text: atoms.intern("foo"), spelled: None };
        let b = RepTok { kind: TokenKind::Identifier, text: atoms.intern("bar"), spelled: None };
        let pasted = paste_tokens(&mut atoms, &a, &b);
        assert_eq!(pasted.kind, TokenKind::Identifier);
        assert_eq!(atoms.resolve(pasted.text), "foobar");
    }

    #[test]
    fn stringize_joins_with_spaces() {
        let mut atoms = AtomTable::new();
        let toks = vec![
            RepTok { kind: TokenKind::Identifier, text: atoms.intern("a"), spelled: None },
            RepTok { kind: TokenKind::Punct(glsl_lex::Punct::Plus), text: atoms.intern("+"), spelled: None },
            RepTok { kind: TokenKind::Identifier, text: atoms.intern("b"), spelled: None },
        ];
        let s = stringize(&mut atoms, &toks);
        assert_eq!(atoms.resolve(s.text), "a + b");
    }
}
