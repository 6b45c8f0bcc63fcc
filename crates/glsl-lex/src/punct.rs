//! Punctuation token kinds, longest-match-first.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Punct {
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Dot,
    Comma,
    Semi,
    Colon,
    Question,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Lt,
    Gt,
    Eq,
    Bang,
    Tilde,
    Amp,
    Pipe,
    Caret,
    ShiftLeft,
    ShiftRight,
    LtEq,
    GtEq,
    EqEq,
    BangEq,
    AmpAmp,
    PipePipe,
    CaretCaret,
    PlusPlus,
    MinusMinus,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    AmpEq,
    PipeEq,
    CaretEq,
    ShiftLeftEq,
    ShiftRightEq,
    /// `#`, only meaningful inside a macro replacement list (stringize).
    Hash,
    /// `##`, only meaningful inside a macro replacement list (paste).
    HashHash,
}

impl Punct {
    pub fn text(self) -> &'static str {
        use Punct::*;
        match self {
            LParen => "(",
            RParen => ")",
            LBracket => "[",
            RBracket => "]",
            LBrace => "{",
            RBrace => "}",
            Dot => ".",
            Comma => ",",
            Semi => ";",
            Colon => ":",
            Question => "?",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Percent => "%",
            Lt => "<",
            Gt => ">",
            Eq => "=",
            Bang => "!",
            Tilde => "~",
            Amp => "&",
            Pipe => "|",
            Caret => "^",
            ShiftLeft => "<<",
            ShiftRight => ">>",
            LtEq => "<=",
            GtEq => ">=",
            EqEq => "==",
            BangEq => "!=",
            AmpAmp => "&&",
            PipePipe => "||",
            CaretCaret => "^^",
            PlusPlus => "++",
            MinusMinus => "--",
            PlusEq => "+=",
            MinusEq => "-=",
            StarEq => "*=",
            SlashEq => "/=",
            PercentEq => "%=",
            AmpEq => "&=",
            PipeEq => "|=",
            CaretEq => "^=",
            ShiftLeftEq => "<<=",
            ShiftRightEq => ">>=",
            Hash => "#",
            HashHash => "##",
        }
    }

    /// Is this one of the compound-assignment operators (`+=` through `>>=`,
    /// inclusive of plain `=` which callers treat separately)?
    pub fn is_compound_assign(self) -> bool {
        use Punct::*;
        matches!(
            self,
            PlusEq
                | MinusEq
                | StarEq
                | SlashEq
                | PercentEq
                | AmpEq
                | PipeEq
                | CaretEq
                | ShiftLeftEq
                | ShiftRightEq
        )
    }
}

/// Try a 3-character, then 2-character, then 1-character punctuation match
/// at the head of `rest`. Returns the matched [`Punct`] and its byte length.
pub fn lex_longest(rest: &str) -> Option<(Punct, usize)> {
    let bytes = rest.as_bytes();
    let b = |i: usize| -> u8 { *bytes.get(i).unwrap_or(&0) };

    macro_rules! three {
        ($a:expr, $b_:expr, $c:expr, $p:expr) => {
            if b(0) == $a && b(1) == $b_ && b(2) == $c {
                return Some(($p, 3));
            }
        };
    }
    macro_rules! two {
        ($a:expr, $b_:expr, $p:expr) => {
            if b(0) == $a && b(1) == $b_ {
                return Some(($p, 2));
            }
        };
    }
    macro_rules! one {
        ($a:expr, $p:expr) => {
            if b(0) == $a {
                return Some(($p, 1));
            }
        };
    }

    use Punct::*;
    three!(b'<', b'<', b'=', ShiftLeftEq);
    three!(b'>', b'>', b'=', ShiftRightEq);
    two!(b'<', b'<', ShiftLeft);
    two!(b'>', b'>', ShiftRight);
    two!(b'<', b'=', LtEq);
    two!(b'>', b'=', GtEq);
    two!(b'=', b'=', EqEq);
    two!(b'!', b'=', BangEq);
    two!(b'&', b'&', AmpAmp);
    two!(b'|', b'|', PipePipe);
    two!(b'^', b'^', CaretCaret);
    two!(b'+', b'+', PlusPlus);
    two!(b'-', b'-', MinusMinus);
    two!(b'+', b'=', PlusEq);
    two!(b'-', b'=', MinusEq);
    two!(b'*', b'=', StarEq);
    two!(b'/', b'=', SlashEq);
    two!(b'%', b'=', PercentEq);
    two!(b'&', b'=', AmpEq);
    two!(b'|', b'=', PipeEq);
    two!(b'^', b'=', CaretEq);
    two!(b'#', b'#', HashHash);
    one!(b'(', LParen);
    one!(b')', RParen);
    one!(b'[', LBracket);
    one!(b']', RBracket);
    one!(b'{', LBrace);
    one!(b'}', RBrace);
    one!(b'.', Dot);
    one!(b',', Comma);
    one!(b';', Semi);
    one!(b':', Colon);
    one!(b'?', Question);
    one!(b'+', Plus);
    one!(b'-', Minus);
    one!(b'*', Star);
    one!(b'/', Slash);
    one!(b'%', Percent);
    one!(b'<', Lt);
    one!(b'>', Gt);
    one!(b'=', Eq);
    one!(b'!', Bang);
    one!(b'~', Tilde);
    one!(b'&', Amp);
    one!(b'|', Pipe);
    one!(b'^', Caret);
    one!(b'#', Hash);
    None
}
