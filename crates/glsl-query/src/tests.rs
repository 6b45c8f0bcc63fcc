use glsl_atom::TextPosition;
use glsl_compile::CompilerInvocation;

use crate::{query_symbol_by_position, LanguageQueryInfo, SymbolKind};

fn compile(src: &str) -> glsl_compile::CompilerResult {
    let mut inv = CompilerInvocation::new();
    inv.set_main_file_from_buffer(src);
    inv.compile_main_file().expect("compile should succeed")
}

/// Finds the `(line, character)` of the first occurrence of `needle` on the
/// user-file portion of `src` (after the injected preamble's line count).
fn position_of(result: &glsl_compile::CompilerResult, src: &str, needle: &str) -> TextPosition {
    let preamble_lines = result.preamble.source.matches('\n').count() as u32 + 1;
    let byte_off = src.find(needle).expect("needle present in source");
    let line = src[..byte_off].matches('\n').count() as u32;
    let col = byte_off - src[..byte_off].rfind('\n').map(|i| i + 1).unwrap_or(0);
    TextPosition::new(preamble_lines + line, col as u32)
}

#[test]
fn looks_up_token_by_position_at_an_identifier() {
    let src = "void main() { float x = 1.0; }";
    let result = compile(src);
    let info = LanguageQueryInfo::new(&result);
    let pos = position_of(&result, src, "x =");
    let hits = info.lookup_token_by_position(pos);
    assert!(!hits.is_empty());
}

#[test]
fn classifies_a_global_variable_reference() {
    let src = "float g;\nvoid main() { g = 1.0; }";
    let result = compile(src);
    let info = LanguageQueryInfo::new(&result);
    let pos = position_of(&result, src, "g = 1.0");
    let symbol = query_symbol_by_position(&info, pos).expect("symbol at position");
    assert_eq!(symbol.kind, SymbolKind::Variable { is_global: true });
}

#[test]
fn classifies_a_local_variable_reference() {
    let src = "void main() { float x = 1.0; float y = x; }";
    let result = compile(src);
    let info = LanguageQueryInfo::new(&result);
    let pos = position_of(&result, src, "x; }");
    let symbol = query_symbol_by_position(&info, pos).expect("symbol at position");
    assert_eq!(symbol.kind, SymbolKind::Variable { is_global: false });
}

#[test]
fn classifies_a_swizzle_field_access() {
    let src = "void main() { vec4 v = vec4(1.0); float r = v.xyz.x; }";
    let result = compile(src);
    let info = LanguageQueryInfo::new(&result);
    let pos = position_of(&result, src, "xyz.x");
    let symbol = query_symbol_by_position(&info, pos).expect("symbol at position");
    assert_eq!(symbol.kind, SymbolKind::Swizzle);
}

#[test]
fn classifies_a_builtin_function_call() {
    let src = "void main() { vec3 v = vec3(1.0); float d = length(v); }";
    let result = compile(src);
    let info = LanguageQueryInfo::new(&result);
    let pos = position_of(&result, src, "length(v)");
    let symbol = query_symbol_by_position(&info, pos).expect("symbol at position");
    assert_eq!(symbol.kind, SymbolKind::Function);
}

#[test]
fn lookup_dot_token_index_finds_a_trailing_partial_dot() {
    // No closing brace: the buffer ends exactly at the still-being-typed
    // `.`, so the last token in the whole file is the dot itself.
    let src = "void main() { vec3 v = vec3(1.0); float d = v.";
    let result = compile(src);
    let info = LanguageQueryInfo::new(&result);
    let range = glsl_atom::AstSyntaxRange::new(
        glsl_atom::TranslationUnitID::UserFile,
        0,
        result.tokens.len() as u32,
    );
    let dot_index = info.lookup_dot_token_index(range).expect("trailing dot found");
    assert_eq!(dot_index, result.tokens.len() as u32 - 1);
}
