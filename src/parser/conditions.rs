use crate::lexer::{Token, TokenKind};
use crate::parser::{ComparisonOp, Condition, Parser, ParserError, SyntaxError};
use tracing::trace;

impl Parser {
    /// Parse `<operand> <operator> <operand>`.
    ///
    /// There are no compound conditions and no parentheses.
    pub(crate) fn parse_condition(&mut self) -> Result<Condition, ParserError> {
        let left = self.parse_operand()?;
        let op = self.parse_comparison_op()?;
        let right = self.parse_operand()?;

        let condition = Condition::new(left, op, right);
        trace!(%condition, "parsed condition");
        Ok(condition)
    }

    /// Identifier (possibly dotted, like `sensor.distance`) or number literal
    fn parse_operand(&mut self) -> Result<String, ParserError> {
        match self.peek().kind {
            TokenKind::Identifier | TokenKind::Number => Ok(self.advance().lexeme),
            _ => Err(self.unexpected("Invalid condition operand", "identifier or number")),
        }
    }

    /// `<` and `>` are one token each. `==` and `!=` arrive as two adjacent
    /// single-character operator tokens and are joined here.
    fn parse_comparison_op(&mut self) -> Result<ComparisonOp, ParserError> {
        const EXPECTED: &str = "<, >, == or !=";

        let first = self.peek().clone();
        if first.kind != TokenKind::Operator {
            return Err(self.unexpected("Expected comparison operator", EXPECTED));
        }

        let text = match first.lexeme.as_str() {
            "<" | ">" => first.lexeme.clone(),
            "=" | "!" => match self.peek_ahead(1) {
                Some(second) if is_adjacent_equals(&first, second) => {
                    format!("{}=", first.lexeme)
                }
                _ => return Err(invalid_operator(&first, EXPECTED)),
            },
            _ => return Err(invalid_operator(&first, EXPECTED)),
        };

        for _ in 0..text.len() {
            self.advance();
        }

        ComparisonOp::from_str(&text).ok_or_else(|| invalid_operator(&first, EXPECTED))
    }
}

fn is_adjacent_equals(first: &Token, second: &Token) -> bool {
    second.kind == TokenKind::Operator
        && second.lexeme == "="
        && second.pos.line == first.pos.line
        && second.pos.column == first.pos.column + 1
}

fn invalid_operator(token: &Token, expected: &str) -> ParserError {
    SyntaxError::new(
        "Invalid comparison operator",
        token.pos,
        expected,
        token.lexeme.clone(),
    )
    .into()
}

#[cfg(test)]
mod tests {
    use crate::lexer::tokenize;
    use crate::parser::{ComparisonOp, Condition, Parser, ParserError};

    fn condition(src: &str) -> Result<Condition, ParserError> {
        Parser::new(tokenize(src).unwrap()).parse_condition()
    }

    #[test]
    fn single_character_operators() {
        assert_eq!(
            condition("sensor.distance < 30").unwrap(),
            Condition::new("sensor.distance", ComparisonOp::Less, "30")
        );
        assert_eq!(
            condition("sensor.light > 500").unwrap().op,
            ComparisonOp::Greater
        );
    }

    #[test]
    fn joined_equality_operators() {
        assert_eq!(condition("x == 1").unwrap().op, ComparisonOp::Equal);
        assert_eq!(condition("x != 1").unwrap().op, ComparisonOp::NotEqual);
    }

    #[test]
    fn split_equality_is_rejected() {
        let err = condition("x = = 1").unwrap_err();
        match err {
            ParserError::Syntax(e) => {
                assert_eq!(e.found, "=");
                assert_eq!(e.expected, "<, >, == or !=");
            }
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn lone_assignment_is_not_a_comparison() {
        assert!(matches!(condition("x = 1"), Err(ParserError::Syntax(_))));
        assert!(matches!(condition("x + 1"), Err(ParserError::Syntax(_))));
    }

    #[test]
    fn operand_must_be_a_name_or_number() {
        let err = condition("STOP < 1").unwrap_err();
        assert!(matches!(err, ParserError::Syntax(ref e) if e.found == "STOP"));
    }
}
