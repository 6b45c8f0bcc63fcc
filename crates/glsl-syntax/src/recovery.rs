//! Four-mode error recovery (§4.D).
//!
//! Keyed by the token that would have closed the construct the parser was
//! inside when it gave up. The scanner treats `()`/`[]`/`{}` as balanced
//! delimiters regardless of which closer it is hunting for, so a malformed
//! argument list doesn't get confused by a nested, well-formed one.

use glsl_atom::AstSyntaxRange;
use glsl_lex::{Punct, TokenKind};

use crate::parser::Parser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryMode {
    Paren,
    Bracket,
    Brace,
    Semi,
}

impl RecoveryMode {
    fn closer(self) -> Option<Punct> {
        match self {
            RecoveryMode::Paren => Some(Punct::RParen),
            RecoveryMode::Bracket => Some(Punct::RBracket),
            RecoveryMode::Brace => Some(Punct::RBrace),
            RecoveryMode::Semi => None,
        }
    }
}

impl Parser {
    /// Skip forward from the current position looking for `mode`'s closer
    /// at bracket depth 0, or a top-level `;` (always accepted as an
    /// alternate stop, per §4.D). Consumes the closer/`;` it stops on.
    /// Returns the `AstSyntaxRange` covering everything skipped, including
    /// the stopping token. Never deletes tokens — everything scanned ends up
    /// inside the returned range, which the caller wraps in an error node.
    pub(crate) fn recover(&mut self, mode: RecoveryMode) -> AstSyntaxRange {
        let begin = self.pos();
        let mut depth: i32 = 0;
        loop {
            if self.is_eof() {
                break;
            }
            let kind = self.peek().kind;
            if depth == 0 {
                if let TokenKind::Punct(p) = kind {
                    if Some(p) == mode.closer() {
                        self.bump();
                        break;
                    }
                    if p == Punct::Semi {
                        self.bump();
                        break;
                    }
                }
            }
            if let TokenKind::Punct(p) = kind {
                match p {
                    Punct::LParen | Punct::LBracket | Punct::LBrace => depth += 1,
                    Punct::RParen | Punct::RBracket | Punct::RBrace => depth -= 1,
                    _ => {}
                }
            }
            self.bump();
        }
        self.range_from(begin)
    }
}
