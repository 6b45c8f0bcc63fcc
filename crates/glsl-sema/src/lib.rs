//! Semantic analysis (§4.F): scope building, name and overload resolution,
//! type deduction, implicit-cast insertion, and the GLSL-specific member
//! resolution rules (swizzles, `.length()`, interface-block fields).

mod analyzer;
pub mod convert;
pub mod scope;
pub mod swizzle;

pub use analyzer::analyze;
pub use scope::{Binding, Scope, ScopeKind, ScopeStack};

#[cfg(test)]
mod tests {
    use super::*;
    use glsl_atom::{AtomTable, FileID, TranslationUnitID};
    use glsl_pp::{PpToken, Preprocessor, StdFileLoader};
    use glsl_syntax::{parse_translation_unit, Arena, NodeId, TypeTable};
    use std::path::Path;

    /// Runs the preprocessor then the parser over `src`, handing back
    /// everything `analyze` needs. No `#include`s are exercised here, so a
    /// plain `StdFileLoader` rooted at `.` is enough.
    fn compile(src: &str) -> (AtomTable, Arena, TypeTable, NodeId, Vec<PpToken>) {
        let mut atoms = AtomTable::new();
        let loader = StdFileLoader;
        let tokens = {
            let mut pp = Preprocessor::new(&mut atoms, &loader, false);
            pp.run(FileID::MAIN, Path::new("."), src, false)
        };
        let out = parse_translation_unit(TranslationUnitID::UserFile, tokens.clone(), &mut atoms);
        (atoms, out.arena, out.types, out.root, tokens)
    }

    #[test]
    fn resolves_global_variable_reference_and_deduces_its_type() {
        let (atoms, mut arena, mut types, root, tokens) = compile("float a; float b = a;");
        let diags = analyze(&mut arena, &mut types, &atoms, &tokens, root);
        assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
    }

    #[test]
    fn flags_use_of_an_undeclared_identifier() {
        let (atoms, mut arena, mut types, root, tokens) = compile("float a = nope;");
        let diags = analyze(&mut arena, &mut types, &atoms, &tokens, root);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, "sema-unresolved-name");
    }

    #[test]
    fn widens_int_literal_to_float_with_an_implicit_cast() {
        let (atoms, mut arena, mut types, root, tokens) = compile("float a = 1;");
        let diags = analyze(&mut arena, &mut types, &atoms, &tokens, root);
        assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
    }

    #[test]
    fn rejects_narrowing_initializer() {
        let (atoms, mut arena, mut types, root, tokens) = compile("int a = 1.0;");
        let diags = analyze(&mut arena, &mut types, &atoms, &tokens, root);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, "sema-type-mismatch");
    }

    #[test]
    fn resolves_vector_swizzle() {
        let (atoms, mut arena, mut types, root, tokens) =
            compile("vec3 a; float b = a.x; vec2 c = a.xy;");
        let diags = analyze(&mut arena, &mut types, &atoms, &tokens, root);
        assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
    }

    #[test]
    fn rejects_out_of_range_swizzle_component() {
        let (atoms, mut arena, mut types, root, tokens) = compile("vec2 a; float b = a.z;");
        let diags = analyze(&mut arena, &mut types, &atoms, &tokens, root);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, "sema-bad-swizzle");
    }

    #[test]
    fn resolves_struct_field_access() {
        let (atoms, mut arena, mut types, root, tokens) =
            compile("struct S { float x; }; S s; float y = s.x;");
        let diags = analyze(&mut arena, &mut types, &atoms, &tokens, root);
        assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
    }

    #[test]
    fn resolves_length_of_an_array() {
        let (atoms, mut arena, mut types, root, tokens) = compile("float a[4]; int n = a.length();");
        let diags = analyze(&mut arena, &mut types, &atoms, &tokens, root);
        assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
    }

    #[test]
    fn resolves_a_function_call_declared_later_in_the_file() {
        let (atoms, mut arena, mut types, root, tokens) = compile(
            "float caller() { return helper(1.0); } float helper(float x) { return x; }",
        );
        let diags = analyze(&mut arena, &mut types, &atoms, &tokens, root);
        assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
    }

    #[test]
    fn flags_assignment_to_a_non_lvalue() {
        let (atoms, mut arena, mut types, root, tokens) = compile("void f() { 1.0 = 2.0; }");
        let diags = analyze(&mut arena, &mut types, &atoms, &tokens, root);
        assert!(diags.iter().any(|d| d.code == "sema-not-an-lvalue"));
    }

    #[test]
    fn flags_ambiguous_overload_call() {
        let (atoms, mut arena, mut types, root, tokens) = compile(
            "float f(float a, int b) { return a; } float f(int a, float b) { return b; } float g() { return f(1, 1); }",
        );
        let diags = analyze(&mut arena, &mut types, &atoms, &tokens, root);
        assert!(diags.iter().any(|d| d.code == "sema-no-matching-overload"));
    }
}
