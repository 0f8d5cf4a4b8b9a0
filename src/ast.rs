//! Syntax tree produced by the parser.
//!
//! The tree is a single tagged sum: parents own children by value through
//! `Box`/`Vec`, so dropping the root block releases everything. Every node
//! records the byte offset of its first token in the normalized source for
//! diagnostics raised by later stages.

/// Operator tags shared by unary, binary, and n-ary nodes.
///
/// The bitwise tags and `Unknown` are part of the evaluator-facing contract
/// even though the precedence table never maps a token onto them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Comma,
    UnaryPlus,
    Negation,
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    FloorDivAssign,
    Or,
    And,
    Not,
    BitAnd,
    BitOr,
    BitNot,
    BitXor,
    Shl,
    Shr,
    Eq,
    NotEq,
    Greater,
    Less,
    GreaterEq,
    LessEq,
    Assign,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
    Call,
    Subscript,
    MemberAccess,
    ListInit,
    Unknown,
}

/// Whether a unary operator appeared before or after its operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fixity {
    Prefix,
    Postfix,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    Str(String),
}

/// An expression node. `force_rvalue` is set when the expression was wrapped
/// in parentheses, so the evaluator can reject `(x) = 5` while accepting
/// `x = 5`.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub pos: usize,
    pub force_rvalue: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    Identifier(String),
    Unary {
        op: Operator,
        fixity: Fixity,
        operand: Box<Expr>,
    },
    Binary {
        op: Operator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Function call, subscript, or list initialization. The receiver is
    /// absent only for list initialization.
    NAry {
        op: Operator,
        receiver: Option<Box<Expr>>,
        operands: Vec<Expr>,
    },
}

impl Expr {
    pub fn new(kind: ExprKind, pos: usize) -> Self {
        Self {
            kind,
            pos,
            force_rvalue: false,
        }
    }
}

/// An identifier in a position where the grammar requires one: a for-loop
/// counter, a function name, or a parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub pos: usize,
}

/// A maximal run of statements sharing the same leading tab count. The
/// top-level block is the root of every parse.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub pos: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Expr(Expr),
    Return(Expr),
    /// One case per `if`/`elif`/`else`. An `else` case carries a literal-true
    /// sentinel condition and is always last.
    If(Vec<IfCase>),
    While {
        condition: Expr,
        body: Block,
    },
    For {
        counter: Ident,
        lower: Expr,
        upper: Expr,
        body: Block,
    },
    FunctionDef {
        name: Ident,
        params: Vec<Ident>,
        body: Block,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfCase {
    pub condition: Expr,
    pub body: Block,
}
