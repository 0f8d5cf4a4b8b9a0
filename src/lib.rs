//! `pseudoparse` library crate.
//!
//! Front-end for a small indentation-structured pseudocode language:
//! - `source`: strips comment and blank lines, maps offsets back to original lines
//! - `lexer`: scans normalized text into a token buffer with a lookahead cursor
//! - `parser`: precedence-table-driven recursive descent producing the AST
//!
//! Evaluation of the resulting tree belongs to a downstream tree-walking
//! evaluator; the front-end only hands it the root block.
pub mod ast;
pub mod lexer;
pub mod parser;
pub mod source;
pub mod token;

use thiserror::Error;

use crate::ast::Block;

/// Either of the two syntax error categories, for callers that drive the
/// whole front-end pipeline at once.
#[derive(Debug, Error, PartialEq)]
pub enum SyntaxError {
    #[error(transparent)]
    Lex(#[from] lexer::LexError),
    #[error(transparent)]
    Parse(#[from] parser::ParseError),
}

impl SyntaxError {
    /// Byte offset into the normalized source.
    pub fn position(&self) -> usize {
        match self {
            SyntaxError::Lex(error) => error.position(),
            SyntaxError::Parse(error) => error.position(),
        }
    }
}

/// Lexes and parses already-normalized source text. Callers that need
/// diagnostics keep the [`source::SourceMap`] from [`source::normalize`] to
/// resolve the error position.
pub fn parse_source(clean: &str) -> Result<Block, SyntaxError> {
    let tokens = lexer::tokenize(clean)?;
    Ok(parser::parse_tokens(tokens)?)
}
