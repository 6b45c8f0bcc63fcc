//! Parser, AST, and type model (§4.D, §4.E).
//!
//! Consumes the token stream `glsl-pp` produces and builds a flat,
//! index-handle AST plus a structurally-interned type table. Downstream,
//! `glsl-sema` walks this arena to resolve names, deduce types, and insert
//! implicit casts; `glsl-features` walks it again to answer editor queries.

pub mod ast;
pub mod recovery;
pub mod types;

mod decl;
mod expr;
mod parser;
mod stmt;

pub use ast::{
    Arena, ArraySpecNode, AssignOp, AstNode, AstSyntaxToken, BinaryOp, DeclKind, DeclNode,
    DeclView, Declarator, ErrorKindHint, ExprKind, ExprNode, LayoutEntry, NodeId, QualTypeNode,
    StmtKind, StmtNode, TypeQualifierSeqNode, TypeSpecifierKind, UnaryOp,
};
pub use parser::{parse_translation_unit, ParseOutput, ParseResult, Parser};
pub use recovery::RecoveryMode;
pub use types::{ScalarKind, TypeDesc, TypeId, TypeTable};

#[cfg(test)]
mod tests {
    use glsl_atom::{AtomTable, FileID, TextPosition, TextRange, TranslationUnitID};
    use glsl_lex::{Keyword, Punct, TokenKind};
    use glsl_pp::PpToken;

    use super::*;

    fn token(atoms: &mut AtomTable, kind: TokenKind, text: &str) -> PpToken {
        let p = TextRange::point(TextPosition::origin());
        PpToken { kind, text: atoms.intern(text), spelled_file: FileID::MAIN, spelled_range: p, expanded_range: p }
    }

    /// `vec3 a = vec3(1.0, 2.0, 3.0);` — a variable decl whose initializer is
    /// a constructor call, exercising the decl/expr boundary end to end.
    #[test]
    fn parses_variable_decl_with_constructor_initializer() {
        let mut atoms = AtomTable::new();
        let tokens = vec![
            token(&mut atoms, TokenKind::Keyword(Keyword::Vec3), "vec3"),
            token(&mut atoms, TokenKind::Identifier, "a"),
            token(&mut atoms, TokenKind::Punct(Punct::Eq), "="),
            token(&mut atoms, TokenKind::Keyword(Keyword::Vec3), "vec3"),
            token(&mut atoms, TokenKind::Punct(Punct::LParen), "("),
            token(&mut atoms, TokenKind::Number(glsl_lex::NumberKind::Float), "1.0"),
            token(&mut atoms, TokenKind::Punct(Punct::Comma), ","),
            token(&mut atoms, TokenKind::Number(glsl_lex::NumberKind::Float), "2.0"),
            token(&mut atoms, TokenKind::Punct(Punct::Comma), ","),
            token(&mut atoms, TokenKind::Number(glsl_lex::NumberKind::Float), "3.0"),
            token(&mut atoms, TokenKind::Punct(Punct::RParen), ")"),
            token(&mut atoms, TokenKind::Punct(Punct::Semi), ";"),
        ];
        let out = parse_translation_unit(TranslationUnitID::UserFile, tokens, &mut atoms);
        let AstNode::TranslationUnit { decls, .. } = out.arena.get(out.root) else { panic!("expected TU") };
        assert_eq!(decls.len(), 1);
        let DeclKind::Variable { declarators, .. } = &out.arena.get(decls[0]).as_decl().unwrap().kind else {
            panic!("expected variable decl")
        };
        assert_eq!(declarators.len(), 1);
        let init = declarators[0].initializer.expect("initializer");
        assert!(matches!(
            &out.arena.get(init).as_expr().unwrap().kind,
            ExprKind::ConstructorCall { .. }
        ));
        assert!(out.diagnostics.is_empty());
    }

    /// `struct Light { vec3 pos; } sun;` must surface both the struct decl
    /// and the variable decl as separate top-level entries (§4.E.1).
    #[test]
    fn inline_struct_exposes_struct_and_variable_as_siblings() {
        let mut atoms = AtomTable::new();
        let tokens = vec![
            token(&mut atoms, TokenKind::Keyword(Keyword::Struct), "struct"),
            token(&mut atoms, TokenKind::Identifier, "Light"),
            token(&mut atoms, TokenKind::Punct(Punct::LBrace), "{"),
            token(&mut atoms, TokenKind::Keyword(Keyword::Vec3), "vec3"),
            token(&mut atoms, TokenKind::Identifier, "pos"),
            token(&mut atoms, TokenKind::Punct(Punct::Semi), ";"),
            token(&mut atoms, TokenKind::Punct(Punct::RBrace), "}"),
            token(&mut atoms, TokenKind::Identifier, "sun"),
            token(&mut atoms, TokenKind::Punct(Punct::Semi), ";"),
        ];
        let out = parse_translation_unit(TranslationUnitID::UserFile, tokens, &mut atoms);
        let AstNode::TranslationUnit { decls, .. } = out.arena.get(out.root) else { panic!("expected TU") };
        assert_eq!(decls.len(), 2);
        assert!(matches!(
            out.arena.get(decls[0]).as_decl().unwrap().kind,
            DeclKind::Struct { .. }
        ));
        assert!(matches!(
            out.arena.get(decls[1]).as_decl().unwrap().kind,
            DeclKind::Variable { .. }
        ));
    }

    /// `float f(float x) { return x * 2.0; }` — function decl with a body.
    #[test]
    fn parses_function_decl_with_body() {
        let mut atoms = AtomTable::new();
        let tokens = vec![
            token(&mut atoms, TokenKind::Keyword(Keyword::Float), "float"),
            token(&mut atoms, TokenKind::Identifier, "f"),
            token(&mut atoms, TokenKind::Punct(Punct::LParen), "("),
            token(&mut atoms, TokenKind::Keyword(Keyword::Float), "float"),
            token(&mut atoms, TokenKind::Identifier, "x"),
            token(&mut atoms, TokenKind::Punct(Punct::RParen), ")"),
            token(&mut atoms, TokenKind::Punct(Punct::LBrace), "{"),
            token(&mut atoms, TokenKind::Keyword(Keyword::Return), "return"),
            token(&mut atoms, TokenKind::Identifier, "x"),
            token(&mut atoms, TokenKind::Punct(Punct::Star), "*"),
            token(&mut atoms, TokenKind::Number(glsl_lex::NumberKind::Float), "2.0"),
            token(&mut atoms, TokenKind::Punct(Punct::Semi), ";"),
            token(&mut atoms, TokenKind::Punct(Punct::RBrace), "}"),
        ];
        let out = parse_translation_unit(TranslationUnitID::UserFile, tokens, &mut atoms);
        let AstNode::TranslationUnit { decls, .. } = out.arena.get(out.root) else { panic!("expected TU") };
        assert_eq!(decls.len(), 1);
        let DeclKind::Function { params, body, .. } = &out.arena.get(decls[0]).as_decl().unwrap().kind else {
            panic!("expected function decl")
        };
        assert_eq!(params.len(), 1);
        let body = body.expect("body");
        let StmtKind::Compound(stmts) = &out.arena.get(body).as_stmt().unwrap().kind else {
            panic!("expected compound body")
        };
        assert_eq!(stmts.len(), 1);
        assert!(matches!(out.arena.get(stmts[0]).as_stmt().unwrap().kind, StmtKind::Return(Some(_))));
    }

    /// A missing ')' in a call is recovered by consuming up to the next ';'
    /// rather than derailing the whole parse (§4.D error recovery): parsing
    /// keeps going and still reaches EOF.
    #[test]
    fn recovers_from_missing_closing_paren() {
        let mut atoms = AtomTable::new();
        let tokens = vec![
            token(&mut atoms, TokenKind::Identifier, "foo"),
            token(&mut atoms, TokenKind::Punct(Punct::LParen), "("),
            token(&mut atoms, TokenKind::Identifier, "a"),
            token(&mut atoms, TokenKind::Punct(Punct::Semi), ";"),
        ];
        let mut p = Parser::new(TranslationUnitID::UserFile, tokens, &mut atoms);
        let _ = p.parse_statement();
        assert!(p.is_eof());
    }
}
