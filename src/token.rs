#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Literals
    IntLit,
    FloatLit,
    CharLit,
    StrLit,
    Identifier,

    // Keywords
    While,
    If,
    Elif,
    Else,
    For,
    From,
    To,
    Then,
    Return,
    Function,
    And,
    Or,
    Not,
    Mod,
    Div,
    True,
    False,

    // Punctuation
    LParen,   // (
    RParen,   // )
    LBracket, // [
    RBracket, // ]
    Comma,    // ,
    Dot,      // .

    // Operators
    Plus,       // +
    Minus,      // -
    Star,       // *
    Slash,      // /
    Percent,    // %
    PlusEq,     // +=
    MinusEq,    // -=
    StarEq,     // *=
    SlashEq,    // /=
    PercentEq,  // %=
    DivEq,      // div=
    EqEq,       // ==
    NotEq,      // !=
    LessEq,     // <=
    GreaterEq,  // >=
    Less,       // <
    Greater,    // >
    AndAnd,     // &&
    OrOr,       // ||
    Bang,       // !
    Amp,        // &
    Pipe,       // |
    Tilde,      // ~
    Caret,      // ^
    Shl,        // <<
    Shr,        // >>
    PlusPlus,   // ++
    MinusMinus, // --
    Eq,         // =

    // Structural
    Tab,
    Newline,
    Eof,

    Comment,
    Unknown,
}

impl TokenKind {
    /// Closing counterpart of an opening bracket. The parser relies on the
    /// two bracket pairs only.
    pub fn closer(self) -> Option<TokenKind> {
        match self {
            TokenKind::LParen => Some(TokenKind::RParen),
            TokenKind::LBracket => Some(TokenKind::RBracket),
            _ => None,
        }
    }
}

/// A token scanned from the normalized source. The lexeme holds the decoded
/// content for char/string literals, the raw digits for numeric literals, and
/// the name for identifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
        }
    }

    /// Byte offset of the token in the normalized source.
    pub fn pos(&self) -> usize {
        self.span.start
    }
}
