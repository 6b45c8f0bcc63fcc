//! Declaration grammar (§4.D): qualifier sequences, `layout(...)`, type
//! specifiers, array suffixes, function signatures, struct bodies, and
//! interface blocks.

use glsl_atom::DiagnosticSeverity;
use glsl_lex::{Keyword, Punct, TokenKind};

use crate::ast::{
    ArraySpecNode, AstNode, AstSyntaxToken, Declarator, DeclKind, DeclNode, ErrorKindHint,
    LayoutEntry, NodeId, QualTypeNode, TypeQualifierSeqNode, TypeSpecifierKind,
};
use crate::parser::Parser;
use crate::recovery::RecoveryMode;

impl Parser {
    /// Top-level construct: a precision statement, a qualified interface
    /// block, or a qualified variable/function declaration. May return more
    /// than one node — `struct S { ... } a, b;` exposes both the struct
    /// itself and the variable declaration that uses it (§4.E.1).
    pub(crate) fn parse_top_level_decl(&mut self) -> Vec<NodeId> {
        if self.is_eof() {
            return Vec::new();
        }
        if self.eat_punct(Punct::Semi) {
            return Vec::new();
        }
        if self.at_keyword(Keyword::Precision) {
            return vec![self.parse_precision_decl()];
        }

        let begin = self.pos();
        let qualifiers = self.parse_type_qualifier_seq();

        if self.at_identifier() && self.at_punct_n(1, Punct::LBrace) {
            return vec![self.parse_interface_block(begin, qualifiers)];
        }

        let ty = self.parse_qual_type_from(begin, qualifiers);
        let mut out: Vec<NodeId> = self.inline_struct_of(ty).into_iter().collect();

        if !self.at_identifier() {
            if self.eat_punct(Punct::Semi) {
                return out;
            }
            self.diag(
                DiagnosticSeverity::Error,
                "syntax-expected-declarator-name",
                "expected a declarator, function signature, or ';'",
            );
            let rng = self.recover(RecoveryMode::Semi);
            out.push(self.error_node(rng, ErrorKindHint::TopLevel));
            return out;
        }

        if self.at_punct_n(1, Punct::LParen) {
            out.push(self.parse_function_decl(begin, qualifiers, ty));
        } else {
            out.push(self.parse_variable_decl(begin, qualifiers, ty));
        }
        out
    }

    fn inline_struct_of(&self, ty: NodeId) -> Option<NodeId> {
        match self.arena.get(ty) {
            AstNode::QualType(q) => match q.specifier {
                TypeSpecifierKind::InlineStruct(n) => Some(n),
                _ => None,
            },
            _ => None,
        }
    }

    /// A full type-qualifier-sequence-plus-specifier-plus-array, parsing its
    /// own qualifiers first. Used where no earlier lookahead already
    /// consumed them — e.g. a constructor call's type name (§4.D).
    pub(crate) fn parse_qual_type(&mut self) -> NodeId {
        let begin = self.pos();
        let qualifiers = self.parse_type_qualifier_seq();
        self.parse_qual_type_from(begin, qualifiers)
    }

    fn parse_qual_type_from(&mut self, begin: usize, qualifiers: Option<NodeId>) -> NodeId {
        let (specifier, specifier_token) = self.parse_type_specifier();
        let array = self.parse_array_spec();
        let range = self.range_from(begin);
        self.alloc(AstNode::QualType(QualTypeNode { qualifiers, specifier, specifier_token, array, range }))
    }

    fn parse_type_specifier(&mut self) -> (TypeSpecifierKind, AstSyntaxToken) {
        if self.at_keyword(Keyword::Struct) {
            let (node, tok) = self.parse_struct_decl();
            return (TypeSpecifierKind::InlineStruct(node), tok);
        }
        if let TokenKind::Keyword(kw) = self.peek().kind {
            if kw.is_type_name() {
                let tok = self.bump();
                return (TypeSpecifierKind::Builtin(kw), tok);
            }
        }
        if self.at_identifier() {
            let tok = self.bump();
            return (TypeSpecifierKind::Named(tok.text), tok);
        }
        self.diag(DiagnosticSeverity::Error, "syntax-expected-type", "expected a type specifier");
        let tok = self.bump();
        (TypeSpecifierKind::Named(tok.text), tok)
    }

    fn parse_type_qualifier_seq(&mut self) -> Option<NodeId> {
        let begin = self.pos();
        let mut keywords = Vec::new();
        let mut layout = Vec::new();
        loop {
            if self.is_eof() {
                break;
            }
            if self.at_keyword(Keyword::Layout) {
                layout.extend(self.parse_layout_qualifier());
                continue;
            }
            if let TokenKind::Keyword(kw) = self.peek().kind {
                if kw.is_qualifier() {
                    self.bump();
                    keywords.push(kw);
                    continue;
                }
            }
            break;
        }
        if keywords.is_empty() && layout.is_empty() {
            return None;
        }
        let range = self.range_from(begin);
        Some(self.alloc(AstNode::TypeQualifierSeq(TypeQualifierSeqNode { keywords, layout, range })))
    }

    fn parse_layout_qualifier(&mut self) -> Vec<LayoutEntry> {
        self.bump(); // 'layout'
        let mut out = Vec::new();
        if !self.eat_punct(Punct::LParen) {
            self.diag(DiagnosticSeverity::Error, "syntax-expected-lparen", "expected '(' after 'layout'");
            return out;
        }
        while !self.at_punct(Punct::RParen) && !self.is_eof() {
            if !self.at_identifier() {
                self.diag(DiagnosticSeverity::Error, "syntax-expected-layout-key", "expected a layout qualifier name");
                break;
            }
            let key_token = self.bump();
            let value = if self.eat_punct(Punct::Eq) { Some(self.parse_assignment()) } else { None };
            out.push(LayoutEntry { key: key_token.text, key_token, value });
            if !self.eat_punct(Punct::Comma) {
                break;
            }
        }
        if !self.eat_punct(Punct::RParen) {
            self.diag(DiagnosticSeverity::Error, "syntax-expected-rparen", "expected ')' to close layout qualifier");
            self.recover(RecoveryMode::Paren);
        }
        out
    }

    fn parse_array_spec(&mut self) -> Option<NodeId> {
        if !self.at_punct(Punct::LBracket) {
            return None;
        }
        let begin = self.pos();
        let mut dims = Vec::new();
        while self.eat_punct(Punct::LBracket) {
            if self.at_punct(Punct::RBracket) {
                dims.push(None);
            } else {
                dims.push(Some(self.parse_assignment()));
            }
            if !self.eat_punct(Punct::RBracket) {
                self.diag(DiagnosticSeverity::Error, "syntax-expected-rbracket", "expected ']' to close array dimension");
                self.recover(RecoveryMode::Bracket);
            }
            if self.is_eof() {
                break;
            }
        }
        let range = self.range_from(begin);
        Some(self.alloc(AstNode::ArraySpec(ArraySpecNode { dims, range })))
    }

    pub(crate) fn parse_declarator(&mut self) -> Declarator {
        let name_token = if self.at_identifier() {
            self.bump()
        } else {
            self.diag(DiagnosticSeverity::Error, "syntax-expected-declarator-name", "expected an identifier");
            self.bump()
        };
        let array = self.parse_array_spec();
        let initializer = if self.eat_punct(Punct::Eq) { Some(self.parse_assignment()) } else { None };
        Declarator { name: name_token.text, name_token, array, initializer }
    }

    fn parse_declarator_list(&mut self) -> Vec<Declarator> {
        let mut out = Vec::new();
        loop {
            out.push(self.parse_declarator());
            if !self.eat_punct(Punct::Comma) {
                break;
            }
            if self.is_eof() {
                break;
            }
        }
        out
    }

    fn parse_variable_decl(&mut self, begin: usize, qualifiers: Option<NodeId>, ty: NodeId) -> NodeId {
        let declarators = self.parse_declarator_list();
        if !self.eat_punct(Punct::Semi) {
            self.diag(DiagnosticSeverity::Error, "syntax-expected-semi", "expected ';' after declaration");
            self.recover(RecoveryMode::Semi);
        }
        let range = self.range_from(begin);
        self.alloc(AstNode::Decl(DeclNode { kind: DeclKind::Variable { qualifiers, ty, declarators }, range }))
    }

    /// A struct/interface-block member, or a parameter-list-free variable
    /// declaration anywhere a single declaration is expected.
    pub(crate) fn parse_member_decl(&mut self) -> NodeId {
        let begin = self.pos();
        let qualifiers = self.parse_type_qualifier_seq();
        let ty = self.parse_qual_type_from(begin, qualifiers);
        self.parse_variable_decl(begin, qualifiers, ty)
    }

    fn parse_param_decl(&mut self) -> NodeId {
        let begin = self.pos();
        let qualifiers = self.parse_type_qualifier_seq();
        let ty = self.parse_qual_type_from(begin, qualifiers);
        let declarator = if self.at_identifier() { Some(self.parse_declarator()) } else { None };
        let range = self.range_from(begin);
        self.alloc(AstNode::Decl(DeclNode { kind: DeclKind::Param { qualifiers, ty, declarator }, range }))
    }

    fn parse_param_list(&mut self) -> Vec<NodeId> {
        let mut out = Vec::new();
        if self.at_keyword(Keyword::Void) && self.at_punct_n(1, Punct::RParen) {
            self.bump();
            return out;
        }
        if self.at_punct(Punct::RParen) {
            return out;
        }
        loop {
            out.push(self.parse_param_decl());
            if !self.eat_punct(Punct::Comma) {
                break;
            }
            if self.is_eof() {
                break;
            }
        }
        out
    }

    fn parse_function_decl(&mut self, begin: usize, qualifiers: Option<NodeId>, return_type: NodeId) -> NodeId {
        let name_token = self.bump();
        self.eat_punct(Punct::LParen);
        let params = self.parse_param_list();
        if !self.eat_punct(Punct::RParen) {
            self.diag(DiagnosticSeverity::Error, "syntax-expected-rparen", "expected ')' to close parameter list");
            self.recover(RecoveryMode::Paren);
        }
        let body = if self.at_punct(Punct::LBrace) {
            Some(self.parse_compound_statement())
        } else {
            if !self.eat_punct(Punct::Semi) {
                self.diag(
                    DiagnosticSeverity::Error,
                    "syntax-expected-semi-or-body",
                    "expected ';' or a function body",
                );
                self.recover(RecoveryMode::Semi);
            }
            None
        };
        let range = self.range_from(begin);
        self.alloc(AstNode::Decl(DeclNode {
            kind: DeclKind::Function {
                qualifiers,
                return_type,
                name: name_token.text,
                name_token,
                params,
                body,
            },
            range,
        }))
    }

    /// `struct [Name] { members } ;` — always its own `AstStructDecl`
    /// (§4.E.1); returns the 'struct' keyword token too so callers building
    /// an inline `QualType` have a specifier token to anchor it to.
    fn parse_struct_decl(&mut self) -> (NodeId, AstSyntaxToken) {
        let begin = self.pos();
        let struct_token = self.bump();
        let name_token = if self.at_identifier() { Some(self.bump()) } else { None };
        if !self.eat_punct(Punct::LBrace) {
            self.diag(DiagnosticSeverity::Error, "syntax-expected-lbrace", "expected '{' to begin struct body");
        }
        let mut members = Vec::new();
        while !self.at_punct(Punct::RBrace) && !self.is_eof() {
            members.push(self.parse_member_decl());
        }
        if !self.eat_punct(Punct::RBrace) {
            self.diag(DiagnosticSeverity::Error, "syntax-expected-rbrace", "expected '}' to close struct body");
        }
        let range = self.range_from(begin);
        let node = self.alloc(AstNode::Decl(DeclNode {
            kind: DeclKind::Struct { name: name_token.map(|t| t.text), name_token, members },
            range,
        }));
        (node, struct_token)
    }

    fn parse_interface_block(&mut self, begin: usize, qualifiers: Option<NodeId>) -> NodeId {
        let block_name_token = self.bump();
        if !self.eat_punct(Punct::LBrace) {
            self.diag(DiagnosticSeverity::Error, "syntax-expected-lbrace", "expected '{' to begin interface block body");
        }
        let mut members = Vec::new();
        while !self.at_punct(Punct::RBrace) && !self.is_eof() {
            members.push(self.parse_member_decl());
        }
        if !self.eat_punct(Punct::RBrace) {
            self.diag(DiagnosticSeverity::Error, "syntax-expected-rbrace", "expected '}' to close interface block body");
        }
        let instance = if self.at_identifier() { Some(self.parse_declarator()) } else { None };
        if !self.eat_punct(Punct::Semi) {
            self.diag(DiagnosticSeverity::Error, "syntax-expected-semi", "expected ';' after interface block");
            self.recover(RecoveryMode::Semi);
        }
        let qualifiers = qualifiers.unwrap_or_else(|| {
            let range = self.range_from(begin);
            self.alloc(AstNode::TypeQualifierSeq(TypeQualifierSeqNode { keywords: vec![], layout: vec![], range }))
        });
        let range = self.range_from(begin);
        self.alloc(AstNode::Decl(DeclNode {
            kind: DeclKind::InterfaceBlock {
                qualifiers,
                block_name: block_name_token.text,
                block_name_token,
                members,
                instance,
            },
            range,
        }))
    }

    fn parse_precision_decl(&mut self) -> NodeId {
        let begin = self.pos();
        self.bump(); // 'precision'
        let precision = match self.peek().kind {
            TokenKind::Keyword(kw @ (Keyword::Highp | Keyword::Mediump | Keyword::Lowp)) => {
                self.bump();
                kw
            }
            _ => {
                self.diag(
                    DiagnosticSeverity::Error,
                    "syntax-expected-precision-qualifier",
                    "expected 'highp', 'mediump', or 'lowp'",
                );
                Keyword::Mediump
            }
        };
        let ty = self.parse_qual_type_from(self.pos(), None);
        if !self.eat_punct(Punct::Semi) {
            self.diag(DiagnosticSeverity::Error, "syntax-expected-semi", "expected ';' after precision statement");
            self.recover(RecoveryMode::Semi);
        }
        let range = self.range_from(begin);
        self.alloc(AstNode::Decl(DeclNode { kind: DeclKind::Precision { precision, ty }, range }))
    }
}
