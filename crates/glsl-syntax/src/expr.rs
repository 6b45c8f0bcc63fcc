//! Expression grammar (§4.D): precedence climbing over the binary operator
//! table, right-associative ternary/assignment, and the constructor-call /
//! array-constructor-call special cases.

use glsl_lex::{Keyword, Punct, TokenKind};

use crate::ast::{AssignOp, AstNode, BinaryOp, ErrorKindHint, ExprKind, ExprNode, NodeId, UnaryOp};
use crate::parser::Parser;
use crate::recovery::RecoveryMode;

/// Binary operator precedence, low to high (§4.D): `||=0, ^^=1, &&=2, |=3,
/// ^=4, &=5, ==/!=(6), </>/<=/>=(7), <</>>(8), +/-(9), */ / /%(10)`.
fn binary_op(p: Punct) -> Option<(BinaryOp, u8)> {
    use BinaryOp::*;
    Some(match p {
        Punct::PipePipe => (Or, 0),
        Punct::CaretCaret => (Xor, 1),
        Punct::AmpAmp => (And, 2),
        Punct::Pipe => (BitOr, 3),
        Punct::Caret => (BitXor, 4),
        Punct::Amp => (BitAnd, 5),
        Punct::EqEq => (Eq, 6),
        Punct::BangEq => (Ne, 6),
        Punct::Lt => (Lt, 7),
        Punct::Gt => (Gt, 7),
        Punct::LtEq => (Le, 7),
        Punct::GtEq => (Ge, 7),
        Punct::ShiftLeft => (Shl, 8),
        Punct::ShiftRight => (Shr, 8),
        Punct::Plus => (Add, 9),
        Punct::Minus => (Sub, 9),
        Punct::Star => (Mul, 10),
        Punct::Slash => (Div, 10),
        Punct::Percent => (Rem, 10),
        _ => return None,
    })
}

impl Parser {
    /// The comma operator: statement-level, wraps completed assignments
    /// (§4.D).
    pub(crate) fn parse_expression(&mut self) -> NodeId {
        let mut lhs = self.parse_assignment();
        while self.at_punct(Punct::Comma) {
            let begin = self.expr_range_begin(lhs);
            self.bump();
            let rhs = self.parse_assignment();
            let range = self.range_from(begin);
            lhs = self.alloc(AstNode::Expr(ExprNode {
                kind: ExprKind::Comma { lhs, rhs },
                range,
                deduced_type: None,
                resolved_decl: None,
            }));
        }
        lhs
    }

    /// Right-associative assignment (§4.D): `= *= /= %= += -= <<= >>= &= ^= |=`.
    pub(crate) fn parse_assignment(&mut self) -> NodeId {
        let begin = self.pos();
        let lhs = self.parse_ternary();
        if let TokenKind::Punct(p) = self.peek().kind {
            if let Some(op) = AssignOp::from_punct(p) {
                self.bump();
                let rhs = self.parse_assignment();
                let range = self.range_from(begin);
                return self.alloc(AstNode::Expr(ExprNode {
                    kind: ExprKind::Assign { op, lhs, rhs },
                    range,
                    deduced_type: None,
                    resolved_decl: None,
                }));
            }
        }
        lhs
    }

    /// Right-associative `cond ? then : else`, sitting between assignment
    /// and logical-OR (§4.D).
    pub(crate) fn parse_ternary(&mut self) -> NodeId {
        let begin = self.pos();
        let cond = self.parse_binary(0);
        if self.at_punct(Punct::Question) {
            self.bump();
            let then_branch = self.parse_assignment();
            if !self.eat_punct(Punct::Colon) {
                self.diag(
                    glsl_atom::DiagnosticSeverity::Error,
                    "syntax-expected-colon",
                    "expected ':' in conditional expression",
                );
            }
            let else_branch = self.parse_assignment();
            let range = self.range_from(begin);
            return self.alloc(AstNode::Expr(ExprNode {
                kind: ExprKind::Ternary { cond, then_branch, else_branch },
                range,
                deduced_type: None,
                resolved_decl: None,
            }));
        }
        cond
    }

    /// Precedence-climbing binary-operator ladder; `min_prec` is the lowest
    /// precedence this call is willing to consume, so recursive calls for
    /// the right operand only eat strictly-higher-precedence operators,
    /// giving left-associativity (§4.D: "left-associative").
    fn parse_binary(&mut self, min_prec: u8) -> NodeId {
        let begin = self.pos();
        let mut lhs = self.parse_unary();
        loop {
            let Some((op, prec)) = (match self.peek().kind {
                TokenKind::Punct(p) => binary_op(p),
                _ => None,
            }) else {
                break;
            };
            if prec < min_prec {
                break;
            }
            self.bump();
            let rhs = self.parse_binary(prec + 1);
            let range = self.range_from(begin);
            lhs = self.alloc(AstNode::Expr(ExprNode {
                kind: ExprKind::Binary { op, lhs, rhs },
                range,
                deduced_type: None,
                resolved_decl: None,
            }));
        }
        lhs
    }

    /// Unary prefix: `+ - ~ ! ++ --` (§4.D).
    fn parse_unary(&mut self) -> NodeId {
        let begin = self.pos();
        let op = match self.peek().kind {
            TokenKind::Punct(Punct::Plus) => Some(UnaryOp::Plus),
            TokenKind::Punct(Punct::Minus) => Some(UnaryOp::Minus),
            TokenKind::Punct(Punct::Bang) => Some(UnaryOp::Not),
            TokenKind::Punct(Punct::Tilde) => Some(UnaryOp::BitNot),
            TokenKind::Punct(Punct::PlusPlus) => Some(UnaryOp::PreInc),
            TokenKind::Punct(Punct::MinusMinus) => Some(UnaryOp::PreDec),
            _ => None,
        };
        if let Some(op) = op {
            self.bump();
            let operand = self.parse_unary();
            let range = self.range_from(begin);
            return self.alloc(AstNode::Expr(ExprNode {
                kind: ExprKind::Unary { op, operand },
                range,
                deduced_type: None,
                resolved_decl: None,
            }));
        }
        self.parse_postfix()
    }

    /// Postfix: `() [] . ++ --` (§4.D).
    fn parse_postfix(&mut self) -> NodeId {
        let begin = self.pos();
        let mut node = self.parse_primary_or_constructor();
        loop {
            if self.at_punct(Punct::LBracket) {
                self.bump();
                let index = self.parse_expression();
                if !self.eat_punct(Punct::RBracket) {
                    self.diag(glsl_atom::DiagnosticSeverity::Error, "syntax-expected-rbracket", "expected ']'");
                    let rng = self.recover(RecoveryMode::Bracket);
                    node = self.error_node(rng, ErrorKindHint::Expr);
                    continue;
                }
                let range = self.range_from(begin);
                node = self.alloc(AstNode::Expr(ExprNode {
                    kind: ExprKind::IndexAccess { base: node, index },
                    range,
                    deduced_type: None,
                    resolved_decl: None,
                }));
            } else if self.at_punct(Punct::Dot) {
                let dot_tok = self.bump();
                if !self.at_identifier() {
                    self.diag(glsl_atom::DiagnosticSeverity::Error, "syntax-expected-field", "expected a field name after '.'");
                    let range = self.range_from(begin);
                    node = self.error_node(range, ErrorKindHint::Expr);
                    continue;
                }
                let field_tok = self.bump();
                // `.length()` is GLSL's one pseudo-method call; the parens
                // carry no information (always empty) so we just consume
                // them and leave the shape a plain `FieldAccess` (§4.F).
                if field_tok.text == self.length_atom && self.at_punct(Punct::LParen) {
                    self.bump();
                    if !self.eat_punct(Punct::RParen) {
                        self.diag(glsl_atom::DiagnosticSeverity::Error, "syntax-expected-rparen", "expected ')' after '.length('");
                        self.recover(RecoveryMode::Paren);
                    }
                }
                let range = self.range_from(begin);
                node = self.alloc(AstNode::Expr(ExprNode {
                    kind: ExprKind::FieldAccess { base: node, field: field_tok.text, dot_token: dot_tok.id },
                    range,
                    deduced_type: None,
                    resolved_decl: None,
                }));
            } else if self.at_punct(Punct::PlusPlus) {
                self.bump();
                let range = self.range_from(begin);
                node = self.alloc(AstNode::Expr(ExprNode {
                    kind: ExprKind::PostfixInc(node),
                    range,
                    deduced_type: None,
                    resolved_decl: None,
                }));
            } else if self.at_punct(Punct::MinusMinus) {
                self.bump();
                let range = self.range_from(begin);
                node = self.alloc(AstNode::Expr(ExprNode {
                    kind: ExprKind::PostfixDec(node),
                    range,
                    deduced_type: None,
                    resolved_decl: None,
                }));
            } else {
                break;
            }
        }
        node
    }

    /// "The parser first tries to parse a constructor call when the leading
    /// token is a builtin type name; otherwise a primary" (§4.D).
    fn parse_primary_or_constructor(&mut self) -> NodeId {
        if let TokenKind::Keyword(kw) = self.peek().kind {
            if kw.is_type_name() {
                return self.parse_constructor_call();
            }
        }
        if self.at_identifier() && self.at_punct_n(1, Punct::LParen) {
            return self.parse_function_call();
        }
        self.parse_primary()
    }

    fn parse_function_call(&mut self) -> NodeId {
        let begin = self.pos();
        let name_tok = self.bump();
        let args = self.parse_argument_list();
        let range = self.range_from(begin);
        self.alloc(AstNode::Expr(ExprNode {
            kind: ExprKind::FunctionCall { name: name_tok.text, args },
            range,
            deduced_type: None,
            resolved_decl: None,
        }))
    }

    /// `T(args...)` or the array-constructor form `T[n](args...)`
    /// (§4.D.1 supplement — the array form gets its own node so arity
    /// bookkeeping doesn't leak into the scalar/vector/matrix path).
    fn parse_constructor_call(&mut self) -> NodeId {
        let begin = self.pos();
        let ty = self.parse_qual_type();
        let is_array = matches!(self.arena.get(ty), AstNode::QualType(q) if q.array.is_some());
        let args = self.parse_argument_list();
        let range = self.range_from(begin);
        let kind = if is_array {
            ExprKind::ArrayConstructorCall { ty, args }
        } else {
            ExprKind::ConstructorCall { ty, args }
        };
        self.alloc(AstNode::Expr(ExprNode { kind, range, deduced_type: None, resolved_decl: None }))
    }

    fn parse_argument_list(&mut self) -> Vec<NodeId> {
        let mut args = Vec::new();
        if !self.eat_punct(Punct::LParen) {
            self.diag(glsl_atom::DiagnosticSeverity::Error, "syntax-expected-lparen", "expected '(' in call expression");
            return args;
        }
        if self.at_keyword(Keyword::Void) && self.at_punct_n(1, Punct::RParen) {
            self.bump();
        } else if !self.at_punct(Punct::RParen) {
            loop {
                args.push(self.parse_assignment());
                if self.eat_punct(Punct::Comma) {
                    continue;
                }
                break;
            }
        }
        if !self.eat_punct(Punct::RParen) {
            self.diag(glsl_atom::DiagnosticSeverity::Error, "syntax-expected-rparen", "expected ')' to close argument list");
            self.recover(RecoveryMode::Paren);
        }
        args
    }

    /// Identifier / literal / parenthesized expression (§4.D).
    fn parse_primary(&mut self) -> NodeId {
        let begin = self.pos();
        match self.peek().kind {
            TokenKind::Identifier => {
                let tok = self.bump();
                let range = self.range_from(begin);
                self.alloc(AstNode::Expr(ExprNode {
                    kind: ExprKind::NameAccess { name: tok.text },
                    range,
                    deduced_type: None,
                    resolved_decl: None,
                }))
            }
            TokenKind::Keyword(Keyword::True) => {
                self.bump();
                let range = self.range_from(begin);
                self.alloc(AstNode::Expr(ExprNode {
                    kind: ExprKind::BoolLiteral(true),
                    range,
                    deduced_type: None,
                    resolved_decl: None,
                }))
            }
            TokenKind::Keyword(Keyword::False) => {
                self.bump();
                let range = self.range_from(begin);
                self.alloc(AstNode::Expr(ExprNode {
                    kind: ExprKind::BoolLiteral(false),
                    range,
                    deduced_type: None,
                    resolved_decl: None,
                }))
            }
            TokenKind::Number(kind) => {
                let tok = self.bump();
                let range = self.range_from(begin);
                self.alloc(AstNode::Expr(ExprNode {
                    kind: ExprKind::NumberLiteral { text: tok.text, kind },
                    range,
                    deduced_type: None,
                    resolved_decl: None,
                }))
            }
            TokenKind::Punct(Punct::LParen) => {
                self.bump();
                let inner = self.parse_expression();
                if !self.eat_punct(Punct::RParen) {
                    self.diag(glsl_atom::DiagnosticSeverity::Error, "syntax-expected-rparen", "expected ')'");
                    let rng = self.recover(RecoveryMode::Paren);
                    return self.error_node(rng, ErrorKindHint::Expr);
                }
                inner
            }
            _ => {
                self.diag(glsl_atom::DiagnosticSeverity::Error, "syntax-expected-expression", "expected an expression");
                let rng = self.recover(RecoveryMode::Semi);
                self.error_node(rng, ErrorKindHint::Expr)
            }
        }
    }

    fn expr_range_begin(&self, node: NodeId) -> usize {
        self.arena.get(node).range().begin as usize
    }
}
