use thiserror::Error;

use crate::ops::Op;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParserError {
    #[error("unknown command {0}")]
    UnknownCommand(String),
}

/// A single resolved token.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Word {
    Number(i64),
    Op(Op),
}

/// Splits one input line into its whitespace-separated tokens.
pub fn tokenize(line: &str) -> impl Iterator<Item = &str> {
    line.trim().split_whitespace()
}

/// Resolves a token to an operator or, failing that, an integer literal.
pub fn parse_word(word: &str) -> Result<Word, ParserError> {
    if let Some(op) = Op::by_name(word) {
        return Ok(Word::Op(op));
    }
    word.parse::<i64>()
        .map(Word::Number)
        .map_err(|_| ParserError::UnknownCommand(word.to_string()))
}
