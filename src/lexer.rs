use thiserror::Error;

use crate::token::{Span, Token, TokenKind};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LexError {
    #[error("Unrecognized character '{character}' at position {position}")]
    UnrecognizedCharacter { character: char, position: usize },
    #[error("Unterminated character literal at position {position}")]
    UnterminatedChar { position: usize },
    #[error("Unterminated string literal at position {position}")]
    UnterminatedString { position: usize },
    #[error("Invalid escape sequence '\\{sequence}' at position {position}")]
    InvalidEscape { sequence: char, position: usize },
    #[error("Malformed numeric literal '{literal}' at position {position}")]
    MalformedNumber { literal: String, position: usize },
}

impl LexError {
    /// Byte offset into the normalized source.
    pub fn position(&self) -> usize {
        match self {
            LexError::UnrecognizedCharacter { position, .. }
            | LexError::UnterminatedChar { position }
            | LexError::UnterminatedString { position }
            | LexError::InvalidEscape { position, .. }
            | LexError::MalformedNumber { position, .. } => *position,
        }
    }
}

pub type LexResult<T> = Result<T, LexError>;

struct FixedLexeme {
    lexeme: &'static str,
    kind: TokenKind,
    /// Word tokens match only when both neighbors are non-word characters,
    /// so `for` is not taken out of `forest`.
    word: bool,
}

const fn word(lexeme: &'static str, kind: TokenKind) -> FixedLexeme {
    FixedLexeme {
        lexeme,
        kind,
        word: true,
    }
}

const fn sym(lexeme: &'static str, kind: TokenKind) -> FixedLexeme {
    FixedLexeme {
        lexeme,
        kind,
        word: false,
    }
}

// Ordered so that every lexeme is tried before each of its proper prefixes
// (`==` before `=`, `div=` before `div`, `//` before `/`).
const FIXED_LEXEMES: &[FixedLexeme] = &[
    word("while", TokenKind::While),
    word("if", TokenKind::If),
    word("elif", TokenKind::Elif),
    word("else", TokenKind::Else),
    word("for", TokenKind::For),
    word("from", TokenKind::From),
    word("to", TokenKind::To),
    word("then", TokenKind::Then),
    word("return", TokenKind::Return),
    word("function", TokenKind::Function),
    word("and", TokenKind::And),
    word("or", TokenKind::Or),
    word("not", TokenKind::Not),
    word("mod", TokenKind::Mod),
    word("div=", TokenKind::DivEq),
    word("div", TokenKind::Div),
    word("true", TokenKind::True),
    word("false", TokenKind::False),
    sym("//", TokenKind::Comment),
    sym("+=", TokenKind::PlusEq),
    sym("-=", TokenKind::MinusEq),
    sym("*=", TokenKind::StarEq),
    sym("/=", TokenKind::SlashEq),
    sym("%=", TokenKind::PercentEq),
    sym("++", TokenKind::PlusPlus),
    sym("--", TokenKind::MinusMinus),
    sym("+", TokenKind::Plus),
    sym("-", TokenKind::Minus),
    sym("*", TokenKind::Star),
    sym("/", TokenKind::Slash),
    sym("%", TokenKind::Percent),
    sym("(", TokenKind::LParen),
    sym(")", TokenKind::RParen),
    sym("[", TokenKind::LBracket),
    sym("]", TokenKind::RBracket),
    sym("||", TokenKind::OrOr),
    sym("&&", TokenKind::AndAnd),
    sym("==", TokenKind::EqEq),
    sym("=", TokenKind::Eq),
    sym("<<", TokenKind::Shl),
    sym(">>", TokenKind::Shr),
    sym("!=", TokenKind::NotEq),
    sym("!", TokenKind::Bang),
    sym("<=", TokenKind::LessEq),
    sym(">=", TokenKind::GreaterEq),
    sym("<", TokenKind::Less),
    sym(">", TokenKind::Greater),
    sym(",", TokenKind::Comma),
    sym(".", TokenKind::Dot),
];

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn decode_escape(sequence: char, position: usize) -> LexResult<char> {
    match sequence {
        'n' => Ok('\n'),
        't' => Ok('\t'),
        '\\' => Ok('\\'),
        '\'' => Ok('\''),
        '"' => Ok('"'),
        '0' => Ok('\0'),
        _ => Err(LexError::InvalidEscape { sequence, position }),
    }
}

pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    pub fn next_token(&mut self) -> LexResult<Token> {
        loop {
            let start = self.pos;
            let Some(ch) = self.peek_char() else {
                return Ok(Token::new(
                    TokenKind::Eof,
                    "",
                    Span { start, end: start },
                ));
            };

            match ch {
                ' ' | '\r' | '\x0C' | '\x0B' => {
                    self.consume_char();
                }
                '\t' => {
                    self.consume_char();
                    return Ok(self.token_from(TokenKind::Tab, "\t", start));
                }
                '\n' => {
                    self.consume_char();
                    return Ok(self.token_from(TokenKind::Newline, "\n", start));
                }
                '\'' => return self.read_char_literal(start),
                '"' => return self.read_string_literal(start),
                c if c.is_ascii_digit() => return self.read_number(start),
                _ => {
                    if let Some(descriptor) = self.match_fixed_lexeme() {
                        if descriptor.kind == TokenKind::Comment {
                            // Mid-line comment: swallow the rest of the line.
                            self.consume_while(|c| c != '\n');
                            continue;
                        }
                        self.pos += descriptor.lexeme.len();
                        return Ok(self.token_from(
                            descriptor.kind,
                            descriptor.lexeme,
                            start,
                        ));
                    }
                    if ch.is_ascii_alphabetic() || ch == '_' {
                        return Ok(self.read_identifier(start));
                    }
                    return Err(LexError::UnrecognizedCharacter {
                        character: ch,
                        position: start,
                    });
                }
            }
        }
    }

    /// First descriptor whose lexeme matches at the current position, longest
    /// match first by table order.
    fn match_fixed_lexeme(&self) -> Option<&'static FixedLexeme> {
        let rest = &self.input[self.pos..];
        FIXED_LEXEMES.iter().find(|descriptor| {
            rest.starts_with(descriptor.lexeme)
                && (!descriptor.word || self.word_boundary(descriptor.lexeme.len()))
        })
    }

    fn word_boundary(&self, len: usize) -> bool {
        let before = self.input[..self.pos].chars().next_back();
        let after = self.input[self.pos + len..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    }

    fn read_identifier(&mut self, start: usize) -> Token {
        self.consume_while(|c| c.is_ascii_alphanumeric() || c == '_');
        let lexeme = &self.input[start..self.pos];
        self.token_from(TokenKind::Identifier, lexeme, start)
    }

    fn read_number(&mut self, start: usize) -> LexResult<Token> {
        self.consume_while(|c| c.is_ascii_digit());

        let mut is_float = false;
        if self.peek_char() == Some('.')
            && self
                .char_at(self.pos + 1)
                .is_some_and(|c| c.is_ascii_digit())
        {
            is_float = true;
            self.consume_char();
            self.consume_while(|c| c.is_ascii_digit());
        }

        let lexeme = &self.input[start..self.pos];
        let malformed = if is_float {
            lexeme.parse::<f64>().is_err()
        } else {
            lexeme.parse::<i64>().is_err()
        };
        if malformed {
            return Err(LexError::MalformedNumber {
                literal: lexeme.to_string(),
                position: start,
            });
        }

        let kind = if is_float {
            TokenKind::FloatLit
        } else {
            TokenKind::IntLit
        };
        Ok(self.token_from(kind, lexeme, start))
    }

    fn read_char_literal(&mut self, start: usize) -> LexResult<Token> {
        self.consume_char(); // opening apostrophe
        let decoded = match self.peek_char() {
            None | Some('\n') => {
                return Err(LexError::UnterminatedChar { position: start });
            }
            Some('\\') => {
                let escape_pos = self.pos;
                self.consume_char();
                match self.consume_char() {
                    None => return Err(LexError::UnterminatedChar { position: start }),
                    Some(sequence) => decode_escape(sequence, escape_pos)?,
                }
            }
            Some(c) => {
                self.consume_char();
                c
            }
        };
        match self.peek_char() {
            Some('\'') => {
                self.consume_char();
                Ok(self.token_from(TokenKind::CharLit, decoded.to_string(), start))
            }
            _ => Err(LexError::UnterminatedChar { position: start }),
        }
    }

    fn read_string_literal(&mut self, start: usize) -> LexResult<Token> {
        self.consume_char(); // opening quote
        let mut decoded = String::new();
        loop {
            match self.peek_char() {
                None | Some('\n') => {
                    return Err(LexError::UnterminatedString { position: start });
                }
                Some('"') => {
                    self.consume_char();
                    break;
                }
                Some('\\') => {
                    let escape_pos = self.pos;
                    self.consume_char();
                    match self.consume_char() {
                        None => {
                            return Err(LexError::UnterminatedString { position: start });
                        }
                        Some(sequence) => decoded.push(decode_escape(sequence, escape_pos)?),
                    }
                }
                Some(c) => {
                    self.consume_char();
                    decoded.push(c);
                }
            }
        }
        Ok(self.token_from(TokenKind::StrLit, decoded, start))
    }

    fn token_from(&self, kind: TokenKind, lexeme: impl Into<String>, start: usize) -> Token {
        Token::new(
            kind,
            lexeme,
            Span {
                start,
                end: self.pos,
            },
        )
    }

    fn consume_while<P>(&mut self, keep_predicate: P)
    where
        P: Fn(char) -> bool,
    {
        while let Some(c) = self.peek_char() {
            if !keep_predicate(c) {
                break;
            }
            self.consume_char();
        }
    }

    fn char_at(&self, index: usize) -> Option<char> {
        if index >= self.input.len() {
            None
        } else {
            self.input[index..].chars().next()
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.char_at(self.pos)
    }

    fn consume_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }
}

/// Scans the whole input in one pass. The buffer always ends with exactly one
/// end-of-file token whose offset equals the input length.
pub fn tokenize(input: &str) -> LexResult<Vec<Token>> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let is_eof = token.kind == TokenKind::Eof;
        tokens.push(token);
        if is_eof {
            break;
        }
    }
    Ok(tokens)
}

/// Random-access cursor over the finished token buffer. The parser only looks
/// ahead; it never rewinds.
pub struct TokenCursor {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenCursor {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.is_empty() {
            tokens.push(Token::new(TokenKind::Eof, "", Span::default()));
        }
        Self { tokens, pos: 0 }
    }

    pub fn current(&self) -> &Token {
        self.peek(0)
    }

    /// k-ahead lookahead, k = 0 being the current token. Clamps to the
    /// trailing end-of-file token.
    pub fn peek(&self, k: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + k).min(last)]
    }

    /// Advances by `n`; advancing past the end is a no-op.
    pub fn advance(&mut self, n: usize) {
        let last = self.tokens.len() - 1;
        self.pos = (self.pos + n).min(last);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .expect("tokenize should succeed")
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn lexes_a_simple_statement() {
        let tokens = tokenize("x = 1 + 2\n").expect("tokenize should succeed");
        let expected = vec![
            (TokenKind::Identifier, "x", 0),
            (TokenKind::Eq, "=", 2),
            (TokenKind::IntLit, "1", 4),
            (TokenKind::Plus, "+", 6),
            (TokenKind::IntLit, "2", 8),
            (TokenKind::Newline, "\n", 9),
            (TokenKind::Eof, "", 10),
        ];
        let actual: Vec<_> = tokens
            .iter()
            .map(|token| (token.kind, token.lexeme.as_str(), token.pos()))
            .collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn tabs_and_newlines_are_tokens() {
        assert_eq!(
            kinds("while x < 10\n\tx += 1\n"),
            vec![
                TokenKind::While,
                TokenKind::Identifier,
                TokenKind::Less,
                TokenKind::IntLit,
                TokenKind::Newline,
                TokenKind::Tab,
                TokenKind::Identifier,
                TokenKind::PlusEq,
                TokenKind::IntLit,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn longest_match_wins_over_prefixes() {
        assert_eq!(
            kinds("a == b = c\n"),
            vec![
                TokenKind::Identifier,
                TokenKind::EqEq,
                TokenKind::Identifier,
                TokenKind::Eq,
                TokenKind::Identifier,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds("a << b <= c < d\n"),
            vec![
                TokenKind::Identifier,
                TokenKind::Shl,
                TokenKind::Identifier,
                TokenKind::LessEq,
                TokenKind::Identifier,
                TokenKind::Less,
                TokenKind::Identifier,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds("a++ + b += c\n"),
            vec![
                TokenKind::Identifier,
                TokenKind::PlusPlus,
                TokenKind::Plus,
                TokenKind::Identifier,
                TokenKind::PlusEq,
                TokenKind::Identifier,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn compound_floor_division_assign() {
        assert_eq!(
            kinds("a div= 5\n"),
            vec![
                TokenKind::Identifier,
                TokenKind::DivEq,
                TokenKind::IntLit,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds("a div 5\n"),
            vec![
                TokenKind::Identifier,
                TokenKind::Div,
                TokenKind::IntLit,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn word_tokens_respect_identifier_boundaries() {
        assert_eq!(
            kinds("forest\n"),
            vec![TokenKind::Identifier, TokenKind::Newline, TokenKind::Eof]
        );
        assert_eq!(
            kinds("modulo\n"),
            vec![TokenKind::Identifier, TokenKind::Newline, TokenKind::Eof]
        );
        assert_eq!(
            kinds("for i from 1 to n\n"),
            vec![
                TokenKind::For,
                TokenKind::Identifier,
                TokenKind::From,
                TokenKind::IntLit,
                TokenKind::To,
                TokenKind::Identifier,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keyword_operators_lex_like_their_symbols() {
        assert_eq!(
            kinds("a and b or not c mod d\n"),
            vec![
                TokenKind::Identifier,
                TokenKind::And,
                TokenKind::Identifier,
                TokenKind::Or,
                TokenKind::Not,
                TokenKind::Identifier,
                TokenKind::Mod,
                TokenKind::Identifier,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn numeric_literals_split_on_trailing_dot() {
        let tokens = tokenize("1.5 + 2.\n").expect("tokenize should succeed");
        let actual: Vec<_> = tokens
            .iter()
            .map(|token| (token.kind, token.lexeme.as_str()))
            .collect();
        assert_eq!(
            actual,
            vec![
                (TokenKind::FloatLit, "1.5"),
                (TokenKind::Plus, "+"),
                (TokenKind::IntLit, "2"),
                (TokenKind::Dot, "."),
                (TokenKind::Newline, "\n"),
                (TokenKind::Eof, ""),
            ]
        );
    }

    #[test]
    fn errors_on_integer_overflow() {
        let err = tokenize("n = 99999999999999999999999999\n")
            .expect_err("expected overflow");
        assert_eq!(
            err,
            LexError::MalformedNumber {
                literal: "99999999999999999999999999".to_string(),
                position: 4,
            }
        );
    }

    #[test]
    fn decodes_char_literal_escapes() {
        let tokens = tokenize("c = '\\n'\n").expect("tokenize should succeed");
        assert_eq!(tokens[2].kind, TokenKind::CharLit);
        assert_eq!(tokens[2].lexeme, "\n");

        let tokens = tokenize("c = '\\0'\n").expect("tokenize should succeed");
        assert_eq!(tokens[2].lexeme, "\0");
    }

    #[test]
    fn decodes_string_literal_escapes() {
        let tokens = tokenize("s = \"a\\tb\\\"c\\\\\"\n").expect("tokenize should succeed");
        assert_eq!(tokens[2].kind, TokenKind::StrLit);
        assert_eq!(tokens[2].lexeme, "a\tb\"c\\");
    }

    #[test]
    fn errors_on_unterminated_char_literal() {
        let err = tokenize("c = 'x\n").expect_err("expected lexing failure");
        assert_eq!(err, LexError::UnterminatedChar { position: 4 });
    }

    #[test]
    fn errors_on_unterminated_string_literal() {
        let err = tokenize("s = \"abc\n").expect_err("expected lexing failure");
        assert_eq!(err, LexError::UnterminatedString { position: 4 });
    }

    #[test]
    fn errors_on_invalid_escape() {
        let err = tokenize("s = \"\\q\"\n").expect_err("expected lexing failure");
        assert_eq!(
            err,
            LexError::InvalidEscape {
                sequence: 'q',
                position: 5,
            }
        );
    }

    #[test]
    fn errors_on_unrecognized_character() {
        let err = tokenize("x = 1 @ 2\n").expect_err("expected lexing failure");
        assert_eq!(
            err,
            LexError::UnrecognizedCharacter {
                character: '@',
                position: 6,
            }
        );
    }

    #[test]
    fn mid_line_comment_is_swallowed() {
        assert_eq!(
            kinds("x = 1 // rest is ignored\n"),
            vec![
                TokenKind::Identifier,
                TokenKind::Eq,
                TokenKind::IntLit,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn eof_token_sits_at_input_length() {
        let input = "x = 1\n";
        let tokens = tokenize(input).expect("tokenize should succeed");
        let eof = tokens.last().expect("buffer is never empty");
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!(eof.pos(), input.len());
        assert_eq!(
            tokens.iter().filter(|t| t.kind == TokenKind::Eof).count(),
            1
        );
    }

    #[test]
    fn cursor_advance_past_end_is_idempotent() {
        let mut cursor = TokenCursor::new(tokenize("x\n").expect("tokenize"));
        assert_eq!(cursor.current().kind, TokenKind::Identifier);
        assert_eq!(cursor.peek(1).kind, TokenKind::Newline);
        assert_eq!(cursor.peek(99).kind, TokenKind::Eof);
        cursor.advance(2);
        assert_eq!(cursor.current().kind, TokenKind::Eof);
        cursor.advance(5);
        assert_eq!(cursor.current().kind, TokenKind::Eof);
    }
}
