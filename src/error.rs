use thiserror::Error;

use crate::lexer::LexerError;
use crate::parser::ParserError;

/// Which stage rejected the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lexical,
    Syntax,
    Semantic,
}

impl ErrorKind {
    /// Heading used when the error is reported to a user.
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::Lexical => "Lexer error",
            ErrorKind::Syntax => "Parser error",
            ErrorKind::Semantic => "Semantic error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Any failure of the source-to-sketch pipeline
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error(transparent)]
    Lexer(#[from] LexerError),

    #[error(transparent)]
    Parser(#[from] ParserError),
}

impl CompileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompileError::Lexer(_) => ErrorKind::Lexical,
            CompileError::Parser(ParserError::Syntax(_)) => ErrorKind::Syntax,
            CompileError::Parser(ParserError::Semantic(_)) => ErrorKind::Semantic,
        }
    }
}
