use thiserror::Error;

/// Position in source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    pub fn start() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Lexer error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexerError {
    #[error("Invalid character '{0}' at {1}")]
    UnexpectedChar(char, Position),

    #[error("Unterminated string literal at {0}")]
    UnterminatedString(Position),
}

impl LexerError {
    /// Where scanning stopped.
    #[must_use]
    pub fn position(&self) -> Position {
        match self {
            LexerError::UnexpectedChar(_, pos) | LexerError::UnterminatedString(pos) => *pos,
        }
    }

    /// The character that could not be scanned, if there was one.
    #[must_use]
    pub fn invalid_char(&self) -> Option<char> {
        match self {
            LexerError::UnexpectedChar(ch, _) => Some(*ch),
            LexerError::UnterminatedString(_) => None,
        }
    }
}
