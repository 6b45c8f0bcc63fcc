//! Statement grammar (§4.D): compound statements, control flow, and the
//! declaration-vs-expression-statement disambiguation inside function bodies.

use glsl_atom::DiagnosticSeverity;
use glsl_lex::{Keyword, Punct, TokenKind};

use crate::ast::{AstNode, ErrorKindHint, NodeId, StmtKind, StmtNode};
use crate::parser::Parser;
use crate::recovery::RecoveryMode;

impl Parser {
    pub(crate) fn parse_statement(&mut self) -> NodeId {
        match self.peek().kind {
            TokenKind::Punct(Punct::LBrace) => self.parse_compound_statement(),
            TokenKind::Punct(Punct::Semi) => {
                let begin = self.pos();
                self.bump();
                let range = self.range_from(begin);
                self.alloc(AstNode::Stmt(StmtNode { kind: StmtKind::Empty, range }))
            }
            TokenKind::Keyword(Keyword::If) => self.parse_if(),
            TokenKind::Keyword(Keyword::While) => self.parse_while(),
            TokenKind::Keyword(Keyword::Do) => self.parse_do_while(),
            TokenKind::Keyword(Keyword::For) => self.parse_for(),
            TokenKind::Keyword(Keyword::Switch) => self.parse_switch(),
            TokenKind::Keyword(Keyword::Case) => self.parse_case(),
            TokenKind::Keyword(Keyword::Default) => self.parse_default(),
            TokenKind::Keyword(Keyword::Break) => self.parse_simple_jump(StmtKind::Break),
            TokenKind::Keyword(Keyword::Continue) => self.parse_simple_jump(StmtKind::Continue),
            TokenKind::Keyword(Keyword::Discard) => self.parse_simple_jump(StmtKind::Discard),
            TokenKind::Keyword(Keyword::Return) => self.parse_return(),
            _ => {
                if self.looks_like_declaration() {
                    self.parse_decl_statement()
                } else {
                    self.parse_expr_statement()
                }
            }
        }
    }

    pub(crate) fn parse_compound_statement(&mut self) -> NodeId {
        let begin = self.pos();
        self.bump(); // '{'
        let mut stmts = Vec::new();
        while !self.at_punct(Punct::RBrace) && !self.is_eof() {
            stmts.push(self.parse_statement());
        }
        if !self.eat_punct(Punct::RBrace) {
            self.diag(DiagnosticSeverity::Error, "syntax-expected-rbrace", "expected '}' to close compound statement");
        }
        let range = self.range_from(begin);
        self.alloc(AstNode::Stmt(StmtNode { kind: StmtKind::Compound(stmts), range }))
    }

    fn parse_expr_statement(&mut self) -> NodeId {
        let begin = self.pos();
        let expr = self.parse_expression();
        if !self.eat_punct(Punct::Semi) {
            self.diag(DiagnosticSeverity::Error, "syntax-expected-semi", "expected ';' after expression statement");
            let rng = self.recover(RecoveryMode::Semi);
            return self.error_node(rng, ErrorKindHint::Stmt);
        }
        let range = self.range_from(begin);
        self.alloc(AstNode::Stmt(StmtNode { kind: StmtKind::Expr(expr), range }))
    }

    fn parse_decl_statement(&mut self) -> NodeId {
        let begin = self.pos();
        let decl = self.parse_member_decl();
        let range = self.range_from(begin);
        self.alloc(AstNode::Stmt(StmtNode { kind: StmtKind::Decl(decl), range }))
    }

    /// A declaration starts with a type qualifier, a known builtin type, or
    /// `identifier identifier` (§4.D). `struct` also starts one (inline
    /// struct type). Anything else is parsed as an expression statement.
    fn looks_like_declaration(&self) -> bool {
        if self.at_keyword(Keyword::Struct) || self.at_keyword(Keyword::Precision) {
            return true;
        }
        if let TokenKind::Keyword(kw) = self.peek().kind {
            if kw.is_qualifier() || kw.is_type_name() {
                return true;
            }
        }
        self.at_identifier() && self.at_identifier_n(1)
    }

    fn parse_if(&mut self) -> NodeId {
        let begin = self.pos();
        self.bump(); // 'if'
        if !self.eat_punct(Punct::LParen) {
            self.diag(DiagnosticSeverity::Error, "syntax-expected-lparen", "expected '(' after 'if'");
        }
        let cond = self.parse_expression();
        if !self.eat_punct(Punct::RParen) {
            self.diag(DiagnosticSeverity::Error, "syntax-expected-rparen", "expected ')' after if condition");
            self.recover(RecoveryMode::Paren);
        }
        let then_branch = self.parse_statement();
        let else_branch = if self.at_keyword(Keyword::Else) {
            self.bump();
            Some(self.parse_statement())
        } else {
            None
        };
        let range = self.range_from(begin);
        self.alloc(AstNode::Stmt(StmtNode { kind: StmtKind::If { cond, then_branch, else_branch }, range }))
    }

    fn parse_while(&mut self) -> NodeId {
        let begin = self.pos();
        self.bump(); // 'while'
        if !self.eat_punct(Punct::LParen) {
            self.diag(DiagnosticSeverity::Error, "syntax-expected-lparen", "expected '(' after 'while'");
        }
        let cond = self.parse_expression();
        if !self.eat_punct(Punct::RParen) {
            self.diag(DiagnosticSeverity::Error, "syntax-expected-rparen", "expected ')' after while condition");
            self.recover(RecoveryMode::Paren);
        }
        let body = self.parse_statement();
        let range = self.range_from(begin);
        self.alloc(AstNode::Stmt(StmtNode { kind: StmtKind::While { cond, body }, range }))
    }

    fn parse_do_while(&mut self) -> NodeId {
        let begin = self.pos();
        self.bump(); // 'do'
        let body = self.parse_statement();
        if !self.at_keyword(Keyword::While) {
            self.diag(DiagnosticSeverity::Error, "syntax-expected-while", "expected 'while' after do-statement body");
        } else {
            self.bump();
        }
        if !self.eat_punct(Punct::LParen) {
            self.diag(DiagnosticSeverity::Error, "syntax-expected-lparen", "expected '(' after 'while'");
        }
        let cond = self.parse_expression();
        if !self.eat_punct(Punct::RParen) {
            self.diag(DiagnosticSeverity::Error, "syntax-expected-rparen", "expected ')' after do-while condition");
            self.recover(RecoveryMode::Paren);
        }
        if !self.eat_punct(Punct::Semi) {
            self.diag(DiagnosticSeverity::Error, "syntax-expected-semi", "expected ';' after do-while statement");
            self.recover(RecoveryMode::Semi);
        }
        let range = self.range_from(begin);
        self.alloc(AstNode::Stmt(StmtNode { kind: StmtKind::DoWhile { body, cond }, range }))
    }

    fn parse_for(&mut self) -> NodeId {
        let begin = self.pos();
        self.bump(); // 'for'
        if !self.eat_punct(Punct::LParen) {
            self.diag(DiagnosticSeverity::Error, "syntax-expected-lparen", "expected '(' after 'for'");
        }
        let init = if self.at_punct(Punct::Semi) {
            self.bump();
            None
        } else if self.looks_like_declaration() {
            Some(self.parse_decl_statement())
        } else {
            Some(self.parse_expr_statement())
        };
        let cond = if self.at_punct(Punct::Semi) { None } else { Some(self.parse_expression()) };
        if !self.eat_punct(Punct::Semi) {
            self.diag(DiagnosticSeverity::Error, "syntax-expected-semi", "expected ';' after for-loop condition");
        }
        let step = if self.at_punct(Punct::RParen) { None } else { Some(self.parse_expression()) };
        if !self.eat_punct(Punct::RParen) {
            self.diag(DiagnosticSeverity::Error, "syntax-expected-rparen", "expected ')' after for-loop clauses");
            self.recover(RecoveryMode::Paren);
        }
        let body = self.parse_statement();
        let range = self.range_from(begin);
        self.alloc(AstNode::Stmt(StmtNode { kind: StmtKind::For { init, cond, step, body }, range }))
    }

    fn parse_switch(&mut self) -> NodeId {
        let begin = self.pos();
        self.bump(); // 'switch'
        if !self.eat_punct(Punct::LParen) {
            self.diag(DiagnosticSeverity::Error, "syntax-expected-lparen", "expected '(' after 'switch'");
        }
        let selector = self.parse_expression();
        if !self.eat_punct(Punct::RParen) {
            self.diag(DiagnosticSeverity::Error, "syntax-expected-rparen", "expected ')' after switch selector");
            self.recover(RecoveryMode::Paren);
        }
        let body = self.parse_compound_statement();
        let range = self.range_from(begin);
        self.alloc(AstNode::Stmt(StmtNode { kind: StmtKind::Switch { selector, body }, range }))
    }

    fn parse_case(&mut self) -> NodeId {
        let begin = self.pos();
        self.bump(); // 'case'
        let value = self.parse_expression();
        if !self.eat_punct(Punct::Colon) {
            self.diag(DiagnosticSeverity::Error, "syntax-expected-colon", "expected ':' after case label");
        }
        let range = self.range_from(begin);
        self.alloc(AstNode::Stmt(StmtNode { kind: StmtKind::Case(value), range }))
    }

    fn parse_default(&mut self) -> NodeId {
        let begin = self.pos();
        self.bump(); // 'default'
        if !self.eat_punct(Punct::Colon) {
            self.diag(DiagnosticSeverity::Error, "syntax-expected-colon", "expected ':' after 'default'");
        }
        let range = self.range_from(begin);
        self.alloc(AstNode::Stmt(StmtNode { kind: StmtKind::Default, range }))
    }

    fn parse_simple_jump(&mut self, kind: StmtKind) -> NodeId {
        let begin = self.pos();
        self.bump(); // 'break' / 'continue' / 'discard'
        if !self.eat_punct(Punct::Semi) {
            self.diag(DiagnosticSeverity::Error, "syntax-expected-semi", "expected ';'");
            self.recover(RecoveryMode::Semi);
        }
        let range = self.range_from(begin);
        self.alloc(AstNode::Stmt(StmtNode { kind, range }))
    }

    fn parse_return(&mut self) -> NodeId {
        let begin = self.pos();
        self.bump(); // 'return'
        let value = if self.at_punct(Punct::Semi) { None } else { Some(self.parse_expression()) };
        if !self.eat_punct(Punct::Semi) {
            self.diag(DiagnosticSeverity::Error, "syntax-expected-semi", "expected ';' after return statement");
            self.recover(RecoveryMode::Semi);
        }
        let range = self.range_from(begin);
        self.alloc(AstNode::Stmt(StmtNode { kind: StmtKind::Return(value), range }))
    }
}
