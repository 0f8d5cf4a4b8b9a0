use thiserror::Error;

use crate::ast::{Block, Expr, ExprKind, Fixity, Ident, IfCase, Literal, Operator, Stmt, StmtKind};
use crate::lexer::TokenCursor;
use crate::token::{Token, TokenKind};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Indentation error.")]
    Indentation { position: usize },
    #[error("Newline expected.")]
    NewlineExpected { position: usize },
    #[error("'then' token expected.")]
    ThenExpected { position: usize },
    #[error("'from' - lower limit delimiter expected.")]
    FromExpected { position: usize },
    #[error("'to' - upper limit delimiter expected.")]
    ToExpected { position: usize },
    #[error("Token is not an identifier.")]
    IdentifierExpected { position: usize },
    #[error("( expected.")]
    ParameterListExpected { position: usize },
    #[error(") expected - matching parentheses not found.")]
    UnmatchedParenthesis { position: usize },
    #[error("{closer} expected.")]
    CloserExpected { closer: char, position: usize },
    #[error("Malformed numeric literal.")]
    MalformedLiteral { position: usize },
    #[error("Unexpected token.")]
    UnexpectedToken { position: usize },
    #[error("Unexpected trailing tokens.")]
    TrailingInput { position: usize },
}

impl ParseError {
    /// Byte offset into the normalized source.
    pub fn position(&self) -> usize {
        match self {
            ParseError::Indentation { position }
            | ParseError::NewlineExpected { position }
            | ParseError::ThenExpected { position }
            | ParseError::FromExpected { position }
            | ParseError::ToExpected { position }
            | ParseError::IdentifierExpected { position }
            | ParseError::ParameterListExpected { position }
            | ParseError::UnmatchedParenthesis { position }
            | ParseError::CloserExpected { position, .. }
            | ParseError::MalformedLiteral { position }
            | ParseError::UnexpectedToken { position }
            | ParseError::TrailingInput { position } => *position,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Parsing discipline applied by a precedence group. A group that does not
/// match its tokens delegates to the next (higher, tighter-binding) level;
/// `Primary` terminates the recursion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupFlavor {
    BinaryLeft,
    BinaryRight,
    Prefix,
    Postfix,
    CallOrMember,
    Primary,
}

struct PrecedenceGroup {
    flavor: GroupFlavor,
    ops: &'static [(TokenKind, Operator)],
}

/// Level at which the comma operator binds. Argument lists parse one level
/// above it, where the comma separates expressions instead of joining them.
const COMMA_PRECEDENCE: usize = 0;

const PRECEDENCE_TABLE: &[PrecedenceGroup] = &[
    // 0
    PrecedenceGroup {
        flavor: GroupFlavor::BinaryLeft,
        ops: &[(TokenKind::Comma, Operator::Comma)],
    },
    // 1
    PrecedenceGroup {
        flavor: GroupFlavor::BinaryRight,
        ops: &[
            (TokenKind::Eq, Operator::Assign),
            (TokenKind::PlusEq, Operator::AddAssign),
            (TokenKind::MinusEq, Operator::SubAssign),
            (TokenKind::StarEq, Operator::MulAssign),
            (TokenKind::SlashEq, Operator::DivAssign),
            (TokenKind::PercentEq, Operator::ModAssign),
            (TokenKind::DivEq, Operator::FloorDivAssign),
        ],
    },
    // 2
    PrecedenceGroup {
        flavor: GroupFlavor::BinaryLeft,
        ops: &[
            (TokenKind::OrOr, Operator::Or),
            (TokenKind::Or, Operator::Or),
        ],
    },
    // 3
    PrecedenceGroup {
        flavor: GroupFlavor::BinaryLeft,
        ops: &[
            (TokenKind::AndAnd, Operator::And),
            (TokenKind::And, Operator::And),
        ],
    },
    // 4
    PrecedenceGroup {
        flavor: GroupFlavor::BinaryLeft,
        ops: &[
            (TokenKind::EqEq, Operator::Eq),
            (TokenKind::NotEq, Operator::NotEq),
        ],
    },
    // 5
    PrecedenceGroup {
        flavor: GroupFlavor::BinaryLeft,
        ops: &[
            (TokenKind::Less, Operator::Less),
            (TokenKind::LessEq, Operator::LessEq),
            (TokenKind::Greater, Operator::Greater),
            (TokenKind::GreaterEq, Operator::GreaterEq),
        ],
    },
    // 6
    PrecedenceGroup {
        flavor: GroupFlavor::BinaryLeft,
        ops: &[
            (TokenKind::Plus, Operator::Add),
            (TokenKind::Minus, Operator::Sub),
        ],
    },
    // 7
    PrecedenceGroup {
        flavor: GroupFlavor::BinaryLeft,
        ops: &[
            (TokenKind::Star, Operator::Mul),
            (TokenKind::Slash, Operator::Div),
            (TokenKind::Percent, Operator::Mod),
            (TokenKind::Mod, Operator::Mod),
            (TokenKind::Div, Operator::FloorDiv),
        ],
    },
    // 8
    PrecedenceGroup {
        flavor: GroupFlavor::Prefix,
        ops: &[
            (TokenKind::Plus, Operator::UnaryPlus),
            (TokenKind::Minus, Operator::Negation),
            (TokenKind::Bang, Operator::Not),
            (TokenKind::Not, Operator::Not),
            (TokenKind::PlusPlus, Operator::PreIncrement),
            (TokenKind::MinusMinus, Operator::PreDecrement),
        ],
    },
    // 9
    PrecedenceGroup {
        flavor: GroupFlavor::Postfix,
        ops: &[
            (TokenKind::PlusPlus, Operator::PostIncrement),
            (TokenKind::MinusMinus, Operator::PostDecrement),
        ],
    },
    // 10
    PrecedenceGroup {
        flavor: GroupFlavor::CallOrMember,
        ops: &[
            (TokenKind::LBracket, Operator::Subscript),
            (TokenKind::LParen, Operator::Call),
        ],
    },
    // 11
    PrecedenceGroup {
        flavor: GroupFlavor::Primary,
        ops: &[],
    },
];

fn binary(op: Operator, left: Expr, right: Expr, pos: usize) -> Expr {
    Expr::new(
        ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        pos,
    )
}

fn unary(op: Operator, fixity: Fixity, operand: Expr, pos: usize) -> Expr {
    Expr::new(
        ExprKind::Unary {
            op,
            fixity,
            operand: Box::new(operand),
        },
        pos,
    )
}

pub struct Parser {
    cursor: TokenCursor,
    /// Expected leading tab count of the block being parsed; the top-level
    /// block is level 0, so the counter rests one below the next block.
    block_level: i32,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            cursor: TokenCursor::new(tokens),
            block_level: -1,
        }
    }

    pub fn parse_program(mut self) -> ParseResult<Block> {
        let block = self.parse_block()?;
        if self.current_kind() != TokenKind::Eof {
            return Err(ParseError::TrailingInput {
                position: self.current_pos(),
            });
        }
        Ok(block)
    }

    fn current_kind(&self) -> TokenKind {
        self.cursor.current().kind
    }

    fn current_pos(&self) -> usize {
        self.cursor.current().pos()
    }

    fn parse_block(&mut self) -> ParseResult<Block> {
        self.block_level += 1;
        let mut statements = Vec::new();
        while self.current_kind() != TokenKind::Eof {
            if self.leading_tabs()? < self.block_level {
                break;
            }
            self.skip_tabs();
            statements.push(self.parse_statement()?);
        }
        self.block_level -= 1;
        Ok(Block { statements })
    }

    /// Counts the leading tabs of the current line without consuming them.
    /// More tabs than the block expects is an indentation error; fewer means
    /// the block has ended.
    fn leading_tabs(&self) -> ParseResult<i32> {
        let mut count = 0;
        while self.cursor.peek(count as usize).kind == TokenKind::Tab {
            count += 1;
        }
        if count > self.block_level {
            return Err(ParseError::Indentation {
                position: self.current_pos(),
            });
        }
        Ok(count)
    }

    fn skip_tabs(&mut self) {
        while self.current_kind() == TokenKind::Tab {
            self.cursor.advance(1);
        }
    }

    fn parse_statement(&mut self) -> ParseResult<Stmt> {
        match self.current_kind() {
            TokenKind::While => self.parse_while(),
            TokenKind::If => self.parse_if(),
            TokenKind::For => self.parse_for(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Function => self.parse_function_def(),
            _ => self.parse_expr_statement(),
        }
    }

    fn expect_newline(&mut self) -> ParseResult<()> {
        if self.current_kind() != TokenKind::Newline {
            return Err(ParseError::NewlineExpected {
                position: self.current_pos(),
            });
        }
        self.cursor.advance(1);
        Ok(())
    }

    fn expect_identifier(&mut self) -> ParseResult<Ident> {
        if self.current_kind() != TokenKind::Identifier {
            return Err(ParseError::IdentifierExpected {
                position: self.current_pos(),
            });
        }
        let ident = Ident {
            name: self.cursor.current().lexeme.clone(),
            pos: self.current_pos(),
        };
        self.cursor.advance(1);
        Ok(ident)
    }

    fn parse_expr_statement(&mut self) -> ParseResult<Stmt> {
        let pos = self.current_pos();
        let expr = self.parse_at(COMMA_PRECEDENCE)?;
        self.expect_newline()?;
        Ok(Stmt {
            kind: StmtKind::Expr(expr),
            pos,
        })
    }

    fn parse_return(&mut self) -> ParseResult<Stmt> {
        let pos = self.current_pos();
        self.cursor.advance(1);
        let expr = self.parse_at(COMMA_PRECEDENCE)?;
        self.expect_newline()?;
        Ok(Stmt {
            kind: StmtKind::Return(expr),
            pos,
        })
    }

    fn parse_while(&mut self) -> ParseResult<Stmt> {
        let pos = self.current_pos();
        self.cursor.advance(1);
        let condition = self.parse_at(COMMA_PRECEDENCE)?;
        self.expect_newline()?;
        let body = self.parse_block()?;
        Ok(Stmt {
            kind: StmtKind::While { condition, body },
            pos,
        })
    }

    /// Parses a whole `if`/`elif`/`else` chain into one statement. Between
    /// cases the parser peeks past the leading tabs of the next line; the
    /// chain continues only on an `elif`/`else` at the same indentation.
    fn parse_if(&mut self) -> ParseResult<Stmt> {
        let pos = self.current_pos();
        let mut cases = Vec::new();
        loop {
            let case_kind = self.current_kind();
            if !matches!(
                case_kind,
                TokenKind::If | TokenKind::Elif | TokenKind::Else
            ) {
                break;
            }
            self.cursor.advance(1);

            let condition = if case_kind == TokenKind::Else {
                // Sentinel condition that is always true.
                Expr::new(ExprKind::Literal(Literal::Bool(true)), 0)
            } else {
                let condition = self.parse_at(COMMA_PRECEDENCE)?;
                if self.current_kind() != TokenKind::Then {
                    return Err(ParseError::ThenExpected {
                        position: self.current_pos(),
                    });
                }
                self.cursor.advance(1);
                condition
            };

            self.expect_newline()?;
            let body = self.parse_block()?;
            cases.push(IfCase { condition, body });

            if case_kind == TokenKind::Else {
                break;
            }
            let tabs = self.leading_tabs()?;
            if tabs < self.block_level {
                break;
            }
            match self.cursor.peek(tabs as usize).kind {
                TokenKind::Elif | TokenKind::Else => self.skip_tabs(),
                _ => break,
            }
        }
        Ok(Stmt {
            kind: StmtKind::If(cases),
            pos,
        })
    }

    fn parse_for(&mut self) -> ParseResult<Stmt> {
        let pos = self.current_pos();
        self.cursor.advance(1);
        let counter = self.expect_identifier()?;

        if self.current_kind() != TokenKind::From {
            return Err(ParseError::FromExpected {
                position: self.current_pos(),
            });
        }
        self.cursor.advance(1);
        let lower = self.parse_at(COMMA_PRECEDENCE)?;

        if self.current_kind() != TokenKind::To {
            return Err(ParseError::ToExpected {
                position: self.current_pos(),
            });
        }
        self.cursor.advance(1);
        let upper = self.parse_at(COMMA_PRECEDENCE)?;

        self.expect_newline()?;
        let body = self.parse_block()?;
        Ok(Stmt {
            kind: StmtKind::For {
                counter,
                lower,
                upper,
                body,
            },
            pos,
        })
    }

    fn parse_function_def(&mut self) -> ParseResult<Stmt> {
        let pos = self.current_pos();
        self.cursor.advance(1);
        let name = self.expect_identifier()?;

        if self.current_kind() != TokenKind::LParen {
            return Err(ParseError::ParameterListExpected {
                position: self.current_pos(),
            });
        }
        let mut params = Vec::new();
        if self.cursor.peek(1).kind != TokenKind::RParen {
            loop {
                self.cursor.advance(1);
                params.push(self.expect_identifier()?);
                if self.current_kind() != TokenKind::Comma {
                    break;
                }
            }
        } else {
            self.cursor.advance(1);
        }
        if self.current_kind() != TokenKind::RParen {
            return Err(ParseError::UnmatchedParenthesis {
                position: self.current_pos(),
            });
        }
        self.cursor.advance(1);

        self.expect_newline()?;
        let body = self.parse_block()?;
        Ok(Stmt {
            kind: StmtKind::FunctionDef { name, params, body },
            pos,
        })
    }

    fn parse_at(&mut self, level: usize) -> ParseResult<Expr> {
        match PRECEDENCE_TABLE[level].flavor {
            GroupFlavor::BinaryLeft => self.parse_binary_left(level),
            GroupFlavor::BinaryRight => self.parse_binary_right(level),
            GroupFlavor::Prefix => self.parse_prefix(level),
            GroupFlavor::Postfix => self.parse_postfix(level),
            GroupFlavor::CallOrMember => self.parse_call_or_member(level),
            GroupFlavor::Primary => self.parse_primary(),
        }
    }

    fn find_op(level: usize, kind: TokenKind) -> Option<Operator> {
        PRECEDENCE_TABLE[level]
            .ops
            .iter()
            .find(|(token, _)| *token == kind)
            .map(|(_, op)| *op)
    }

    fn parse_binary_left(&mut self, level: usize) -> ParseResult<Expr> {
        let mut node = self.parse_at(level + 1)?;
        while let Some(op) = Self::find_op(level, self.current_kind()) {
            let pos = self.current_pos();
            self.cursor.advance(1);
            let right = self.parse_at(level + 1)?;
            node = binary(op, node, right, pos);
        }
        Ok(node)
    }

    fn parse_binary_right(&mut self, level: usize) -> ParseResult<Expr> {
        let left = self.parse_at(level + 1)?;
        if let Some(op) = Self::find_op(level, self.current_kind()) {
            let pos = self.current_pos();
            self.cursor.advance(1);
            let right = self.parse_at(level)?;
            return Ok(binary(op, left, right, pos));
        }
        Ok(left)
    }

    fn parse_prefix(&mut self, level: usize) -> ParseResult<Expr> {
        if let Some(op) = Self::find_op(level, self.current_kind()) {
            let pos = self.current_pos();
            self.cursor.advance(1);
            let operand = self.parse_prefix(level)?;
            return Ok(unary(op, Fixity::Prefix, operand, pos));
        }
        self.parse_at(level + 1)
    }

    fn parse_postfix(&mut self, level: usize) -> ParseResult<Expr> {
        let mut node = self.parse_at(level + 1)?;
        while let Some(op) = Self::find_op(level, self.current_kind()) {
            let pos = self.current_pos();
            self.cursor.advance(1);
            node = unary(op, Fixity::Postfix, node, pos);
        }
        Ok(node)
    }

    /// Call, subscript, and member access share a level and are all left
    /// associative, so one loop folds them over the same base.
    fn parse_call_or_member(&mut self, level: usize) -> ParseResult<Expr> {
        let mut node = self.parse_at(level + 1)?;
        loop {
            if let Some(op) = Self::find_op(level, self.current_kind()) {
                let pos = self.current_pos();
                let operands = self.parse_argument_list(self.current_kind())?;
                node = Expr::new(
                    ExprKind::NAry {
                        op,
                        receiver: Some(Box::new(node)),
                        operands,
                    },
                    pos,
                );
            } else if self.current_kind() == TokenKind::Dot {
                let pos = self.current_pos();
                self.cursor.advance(1);
                let right = self.parse_at(level + 1)?;
                node = binary(Operator::MemberAccess, node, right, pos);
            } else {
                return Ok(node);
            }
        }
    }

    /// Parses a possibly-empty comma-separated argument list. The cursor sits
    /// on the opening bracket; on success the matching closer has been
    /// consumed. Arguments parse one level above the comma.
    fn parse_argument_list(&mut self, open: TokenKind) -> ParseResult<Vec<Expr>> {
        let closer = match open.closer() {
            Some(closer) => closer,
            None => {
                return Err(ParseError::UnexpectedToken {
                    position: self.current_pos(),
                });
            }
        };
        let mut operands = Vec::new();
        if self.cursor.peek(1).kind != closer {
            loop {
                self.cursor.advance(1);
                operands.push(self.parse_at(COMMA_PRECEDENCE + 1)?);
                if self.current_kind() != TokenKind::Comma {
                    break;
                }
            }
            if self.current_kind() != closer {
                return Err(ParseError::CloserExpected {
                    closer: if closer == TokenKind::RParen { ')' } else { ']' },
                    position: self.current_pos(),
                });
            }
            self.cursor.advance(1);
        } else {
            // Empty form: skip both delimiters.
            self.cursor.advance(2);
        }
        Ok(operands)
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let pos = self.current_pos();
        match self.current_kind() {
            TokenKind::True => {
                self.cursor.advance(1);
                Ok(Expr::new(ExprKind::Literal(Literal::Bool(true)), pos))
            }
            TokenKind::False => {
                self.cursor.advance(1);
                Ok(Expr::new(ExprKind::Literal(Literal::Bool(false)), pos))
            }
            TokenKind::IntLit => {
                let value = self
                    .cursor
                    .current()
                    .lexeme
                    .parse::<i64>()
                    .map_err(|_| ParseError::MalformedLiteral { position: pos })?;
                self.cursor.advance(1);
                Ok(Expr::new(ExprKind::Literal(Literal::Int(value)), pos))
            }
            TokenKind::FloatLit => {
                let value = self
                    .cursor
                    .current()
                    .lexeme
                    .parse::<f64>()
                    .map_err(|_| ParseError::MalformedLiteral { position: pos })?;
                self.cursor.advance(1);
                Ok(Expr::new(ExprKind::Literal(Literal::Float(value)), pos))
            }
            TokenKind::CharLit => {
                let value = self
                    .cursor
                    .current()
                    .lexeme
                    .chars()
                    .next()
                    .ok_or(ParseError::MalformedLiteral { position: pos })?;
                self.cursor.advance(1);
                Ok(Expr::new(ExprKind::Literal(Literal::Char(value)), pos))
            }
            TokenKind::StrLit => {
                let value = self.cursor.current().lexeme.clone();
                self.cursor.advance(1);
                Ok(Expr::new(ExprKind::Literal(Literal::Str(value)), pos))
            }
            TokenKind::LParen => {
                self.cursor.advance(1);
                let mut node = self.parse_at(COMMA_PRECEDENCE)?;
                // (x) = 5 must not be valid even though x = 5 is.
                node.force_rvalue = true;
                if self.current_kind() != TokenKind::RParen {
                    return Err(ParseError::UnmatchedParenthesis {
                        position: self.current_pos(),
                    });
                }
                self.cursor.advance(1);
                Ok(node)
            }
            TokenKind::LBracket => {
                let operands = self.parse_argument_list(TokenKind::LBracket)?;
                Ok(Expr::new(
                    ExprKind::NAry {
                        op: Operator::ListInit,
                        receiver: None,
                        operands,
                    },
                    pos,
                ))
            }
            TokenKind::Identifier => {
                let name = self.cursor.current().lexeme.clone();
                self.cursor.advance(1);
                Ok(Expr::new(ExprKind::Identifier(name), pos))
            }
            _ => Err(ParseError::UnexpectedToken { position: pos }),
        }
    }
}

/// Parses a token buffer into the top-level block. The buffer must end with
/// the lexer's end-of-file token; anything left over after the block is a
/// parse error.
pub fn parse_tokens(tokens: Vec<Token>) -> ParseResult<Block> {
    Parser::new(tokens).parse_program()
}
