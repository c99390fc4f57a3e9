use crate::lexer::{Keyword, LexerError, Position, Token, TokenKind};
use tracing::{debug, trace};

pub struct Scanner {
    input: Vec<char>,
    current: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl Scanner {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            current: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    /// Scan the whole input. The returned stream always ends with `Eof`.
    pub fn scan_all(mut self) -> Result<Vec<Token>, LexerError> {
        loop {
            self.skip_whitespace();
            if self.is_at_end() {
                break;
            }

            let token = self.scan_token()?;
            trace!(kind = %token.kind, lexeme = %token.lexeme, pos = %token.pos, "token");
            self.tokens.push(token);
        }

        self.tokens.push(Token::new(
            TokenKind::Eof,
            self.current_position(),
            "EOF".to_string(),
        ));

        debug!(count = self.tokens.len(), "tokenized source");
        Ok(self.tokens)
    }

    fn current_position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.current).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.current += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    /// Skips whitespace and `#` line comments, in any interleaving.
    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            match ch {
                c if c.is_whitespace() => {
                    self.advance();
                }
                '#' => self.skip_comment(),
                _ => break,
            }
        }
    }

    fn skip_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn scan_token(&mut self) -> Result<Token, LexerError> {
        let start_pos = self.current_position();

        let Some(ch) = self.peek() else {
            return Ok(Token::new(TokenKind::Eof, start_pos, "EOF".to_string()));
        };

        let kind = match ch {
            '0'..='9' => return Ok(self.scan_number(start_pos)),
            c if c.is_ascii_alphabetic() || c == '_' => {
                return Ok(self.scan_identifier_or_keyword(start_pos));
            }
            '"' => return self.scan_string_literal(start_pos),

            '(' => TokenKind::OpenParen,
            ')' => TokenKind::CloseParen,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,

            // Every operator is a single character; `==` and `!=` are two tokens.
            '+' | '-' | '*' | '/' | '<' | '>' | '=' | '!' => TokenKind::Operator,

            other => return Err(LexerError::UnexpectedChar(other, start_pos)),
        };

        self.advance();
        Ok(Token::new(kind, start_pos, ch.to_string()))
    }

    fn scan_string_literal(&mut self, start_pos: Position) -> Result<Token, LexerError> {
        self.advance(); // opening quote
        let mut value = String::new();

        loop {
            match self.advance() {
                None => return Err(LexerError::UnterminatedString(start_pos)),
                Some('"') => break,
                Some('\\') => {
                    let escaped = self
                        .advance()
                        .ok_or(LexerError::UnterminatedString(start_pos))?;
                    value.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        // `\\`, `\"` and unknown escapes keep the escaped character
                        other => other,
                    });
                }
                Some(ch) => value.push(ch),
            }
        }

        Ok(Token::new(TokenKind::String, start_pos, value))
    }

    fn scan_number(&mut self, start_pos: Position) -> Token {
        let start_idx = self.current;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        let lexeme: String = self.input[start_idx..self.current].iter().collect();
        Token::new(TokenKind::Number, start_pos, lexeme)
    }

    fn scan_identifier_or_keyword(&mut self, start_pos: Position) -> Token {
        let start_idx = self.current;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        {
            self.advance();
        }

        let text: String = self.input[start_idx..self.current].iter().collect();

        match Keyword::from_str(&text) {
            Some(keyword) => Token::new(TokenKind::Keyword(keyword), start_pos, text),
            None => Token::new(TokenKind::Identifier, start_pos, text),
        }
    }
}

/// Convenience function for tokenizing input
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexerError> {
    Scanner::new(input).scan_all()
}
