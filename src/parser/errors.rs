use thiserror::Error;
use crate::lexer::Position;

/// Token stream does not match the grammar at `pos`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} at {pos}: expected '{expected}' but found '{found}'")]
pub struct SyntaxError {
    pub message: String,
    pub pos: Position,
    pub expected: String,
    pub found: String,
}

impl SyntaxError {
    pub fn new(
        message: impl Into<String>,
        pos: Position,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            pos,
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Structurally valid input that breaks a domain rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} ({context})")]
pub struct SemanticError {
    pub message: String,
    pub context: String,
}

impl SemanticError {
    pub fn new(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: context.into(),
        }
    }
}

/// Parser error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParserError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Semantic(#[from] SemanticError),
}

impl ParserError {
    pub fn is_semantic(&self) -> bool {
        matches!(self, ParserError::Semantic(_))
    }

    pub(crate) fn semantic(message: impl Into<String>, context: impl Into<String>) -> Self {
        ParserError::Semantic(SemanticError::new(message, context))
    }
}
