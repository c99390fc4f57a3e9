//! Parser state, token helpers and the program entry point.

use crate::lexer::{Keyword, Position, Token, TokenKind};
use crate::parser::{ParserError, Program, SemanticError, SyntaxError};
use crate::symbol::table::FunctionRegistry;
use tracing::{debug, trace};

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    functions: FunctionRegistry,
}

impl Parser {
    #[must_use]
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map_or(true, |t| t.kind != TokenKind::Eof) {
            let pos = tokens.last().map_or(Position::start(), |t| t.pos);
            tokens.push(Token::new(TokenKind::Eof, pos, "EOF".to_string()));
        }

        Self {
            tokens,
            current: 0,
            functions: FunctionRegistry::new(),
        }
    }

    /// Get reference to the function registry
    #[must_use]
    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub(crate) fn functions_mut(&mut self) -> &mut FunctionRegistry {
        &mut self.functions
    }

    /// Check if we've reached the end of tokens
    pub(crate) fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    /// Peek at current token without consuming it
    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    /// Peek ahead n tokens
    pub(crate) fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.current + n)
    }

    /// Advance to next token, returning the one just consumed.
    /// Never moves past `Eof`.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    pub(crate) fn check_keyword(&self, keyword: Keyword) -> bool {
        self.peek().is_keyword(keyword)
    }

    /// `END`, `ELSE` and `DO` close a block; the caller consumes them.
    pub(crate) fn at_block_terminator(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Keyword(Keyword::End | Keyword::Else | Keyword::Do)
        )
    }

    /// Expect a specific keyword and consume it
    pub(crate) fn expect_keyword(&mut self, keyword: Keyword) -> Result<Token, ParserError> {
        if self.check_keyword(keyword) {
            Ok(self.advance())
        } else {
            Err(self.unexpected("Unexpected token", keyword.as_str()))
        }
    }

    /// Consume any token except `Eof`.
    pub(crate) fn expect_any(&mut self, expected: &str) -> Result<Token, ParserError> {
        if self.is_at_end() {
            Err(self.unexpected("Unexpected end of input", expected))
        } else {
            Ok(self.advance())
        }
    }

    /// Consume an identifier token and return its text.
    pub(crate) fn expect_identifier(&mut self, message: &str) -> Result<String, ParserError> {
        if self.peek().kind == TokenKind::Identifier {
            Ok(self.advance().lexeme)
        } else {
            Err(self.unexpected(message, "IDENTIFIER"))
        }
    }

    /// Consume a number token as an unsigned count.
    ///
    /// A non-number is a syntax error; a literal too large for `u32` is a
    /// semantic one, since it lexed and parsed fine.
    pub(crate) fn expect_number(&mut self, message: &str) -> Result<u32, ParserError> {
        let token = self.peek().clone();
        if token.kind != TokenKind::Number {
            return Err(SyntaxError::new(message, token.pos, "NUMBER", token.kind.name()).into());
        }
        self.advance();

        token.lexeme.parse::<u32>().map_err(|_| {
            SemanticError::new(
                format!("Number out of range: {}", token.lexeme),
                format!("Expected a value between 0 and {}", u32::MAX),
            )
            .into()
        })
    }

    /// Syntax error at the current token
    pub(crate) fn unexpected(&self, message: &str, expected: &str) -> ParserError {
        let token = self.peek();
        SyntaxError::new(message, token.pos, expected, token.to_string()).into()
    }

    /// Parse a complete program
    /// # Errors
    /// On the first syntax error, or if semantic analysis fails.
    pub fn parse_program(&mut self) -> Result<Program, ParserError> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            if let Some(stmt) = self.parse_statement()? {
                statements.push(stmt);
            }
        }

        debug!(statements = statements.len(), "parsed program");

        self.check_function_calls()?;

        Ok(Program::new(statements))
    }

    /// Every called function must be defined somewhere in the program.
    fn check_function_calls(&self) -> Result<(), ParserError> {
        if let Some(call) = self.functions.undefined_calls().next() {
            let declared: Vec<&str> = self.functions.declared_names().collect();
            let available = if declared.is_empty() {
                "none".to_string()
            } else {
                declared.join(", ")
            };

            trace!(name = %call.name, pos = %call.pos, "call to undefined function");
            return Err(ParserError::semantic(
                format!("Function '{}' is called but never defined", call.name),
                format!("Available functions: {available}"),
            ));
        }
        Ok(())
    }
}

/// Convenience function for parsing a token stream
/// # Errors
/// See [`Parser::parse_program`].
pub fn parse(tokens: Vec<Token>) -> Result<Program, ParserError> {
    Parser::new(tokens).parse_program()
}
