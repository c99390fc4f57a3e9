use crate::lexer::{Keyword, TokenKind};
use crate::parser::{
    LedState, MotorSide, MoveDirection, Parser, ParserError, Statement, SyntaxError,
    TurnDirection,
};
use tracing::trace;

impl Parser {
    /// Parse a statement.
    ///
    /// Returns `None` for a stray top-level `END`, which is consumed and
    /// dropped.
    pub(crate) fn parse_statement(&mut self) -> Result<Option<Statement>, ParserError> {
        let token = self.peek().clone();

        let stmt = match token.kind {
            TokenKind::Keyword(Keyword::Robot) => self.parse_robot_declaration()?,
            TokenKind::Keyword(Keyword::Move) => self.parse_move_statement()?,
            TokenKind::Keyword(Keyword::Turn) => self.parse_turn_statement()?,
            TokenKind::Keyword(Keyword::Stop) => {
                self.advance();
                Statement::Stop
            }
            TokenKind::Keyword(Keyword::If) => self.parse_if_statement()?,
            TokenKind::Keyword(Keyword::While) => self.parse_while_statement()?,
            TokenKind::Keyword(Keyword::Repeat) => self.parse_repeat_statement()?,
            TokenKind::Keyword(Keyword::Led) => self.parse_led_statement()?,
            TokenKind::Keyword(Keyword::Servo) => self.parse_servo_statement()?,
            TokenKind::Keyword(Keyword::Motor) => self.parse_motor_statement()?,
            TokenKind::Keyword(Keyword::Wait) => self.parse_wait_statement()?,
            TokenKind::Keyword(Keyword::Function) => self.parse_function_def()?,
            TokenKind::Keyword(Keyword::Call) => self.parse_call_statement()?,
            TokenKind::Keyword(Keyword::Send) => self.parse_send_statement()?,
            TokenKind::Keyword(Keyword::End) => {
                trace!(pos = %token.pos, "skipping stray END");
                self.advance();
                return Ok(None);
            }
            _ => {
                return Err(SyntaxError::new(
                    "Unknown statement type",
                    token.pos,
                    "statement keyword",
                    token.lexeme,
                )
                .into())
            }
        };

        trace!(kind = stmt.node_type(), pos = %token.pos, "parsed statement");
        Ok(Some(stmt))
    }

    /// Parse statements up to (not including) the next `END`, `ELSE` or `DO`.
    pub(crate) fn parse_block(&mut self) -> Result<Vec<Statement>, ParserError> {
        let mut statements = Vec::new();

        while !self.is_at_end() && !self.at_block_terminator() {
            if let Some(stmt) = self.parse_statement()? {
                statements.push(stmt);
            }
        }

        Ok(statements)
    }

    /// `ROBOT <name>`
    fn parse_robot_declaration(&mut self) -> Result<Statement, ParserError> {
        self.expect_keyword(Keyword::Robot)?;
        let name = self.expect_identifier("Robot name must be an identifier")?;

        Ok(Statement::RobotDeclaration { name })
    }

    /// `MOVE (forward|backward) <distance>`
    fn parse_move_statement(&mut self) -> Result<Statement, ParserError> {
        self.expect_keyword(Keyword::Move)?;

        let dir = self.expect_any("forward or backward")?;
        let direction = match dir.kind {
            TokenKind::Keyword(Keyword::Forward) => MoveDirection::Forward,
            TokenKind::Keyword(Keyword::Backward) => MoveDirection::Backward,
            _ => {
                return Err(ParserError::semantic(
                    format!("Invalid movement direction: {}", dir.lexeme),
                    "Expected 'forward' or 'backward'",
                ))
            }
        };

        let distance = self.expect_number("Movement distance must be a number")?;

        Ok(Statement::Move {
            direction,
            distance,
        })
    }

    /// `TURN (left|right) <angle>`
    fn parse_turn_statement(&mut self) -> Result<Statement, ParserError> {
        self.expect_keyword(Keyword::Turn)?;

        let dir = self.expect_any("left or right")?;
        let direction = match dir.kind {
            TokenKind::Keyword(Keyword::Left) => TurnDirection::Left,
            TokenKind::Keyword(Keyword::Right) => TurnDirection::Right,
            _ => {
                return Err(ParserError::semantic(
                    format!("Invalid turn direction: {}", dir.lexeme),
                    "Expected 'left' or 'right'",
                ))
            }
        };

        let angle = self.expect_number("Turn angle must be a number")?;

        Ok(Statement::Turn { direction, angle })
    }

    /// `IF <cond> THEN <block> [ELSE <block>] END`
    fn parse_if_statement(&mut self) -> Result<Statement, ParserError> {
        self.expect_keyword(Keyword::If)?;
        let condition = self.parse_condition()?;
        self.expect_keyword(Keyword::Then)?;

        let then_body = self.parse_block()?;

        let else_body = if self.check_keyword(Keyword::Else) {
            self.advance();
            self.parse_block()?
        } else {
            Vec::new()
        };

        self.expect_keyword(Keyword::End)?;

        Ok(Statement::If {
            condition,
            then_body,
            else_body,
        })
    }

    /// `WHILE <cond> DO <block> END`
    fn parse_while_statement(&mut self) -> Result<Statement, ParserError> {
        self.expect_keyword(Keyword::While)?;
        let condition = self.parse_condition()?;
        self.expect_keyword(Keyword::Do)?;

        let body = self.parse_block()?;
        self.expect_keyword(Keyword::End)?;

        Ok(Statement::While { condition, body })
    }

    /// `REPEAT <count> TIMES <block> END`
    fn parse_repeat_statement(&mut self) -> Result<Statement, ParserError> {
        self.expect_keyword(Keyword::Repeat)?;
        let times = self.expect_number("Repeat count must be a number")?;
        self.expect_keyword(Keyword::Times)?;

        let body = self.parse_block()?;
        self.expect_keyword(Keyword::End)?;

        Ok(Statement::Repeat { times, body })
    }

    /// `LED (on|off) [<color>]`
    fn parse_led_statement(&mut self) -> Result<Statement, ParserError> {
        self.expect_keyword(Keyword::Led)?;

        let state_token = self.expect_any("on or off")?;
        let state = match state_token.kind {
            TokenKind::Keyword(Keyword::On) => LedState::On,
            TokenKind::Keyword(Keyword::Off) => LedState::Off,
            _ => {
                return Err(ParserError::semantic(
                    "LED state must be 'on' or 'off'",
                    format!("Found: {}", state_token.lexeme),
                ))
            }
        };

        let color = if self.peek().kind == TokenKind::Identifier {
            Some(self.advance().lexeme)
        } else {
            None
        };

        Ok(Statement::Led { state, color })
    }

    /// `SERVO <name> TO <angle>`
    fn parse_servo_statement(&mut self) -> Result<Statement, ParserError> {
        self.expect_keyword(Keyword::Servo)?;
        let name = self.expect_identifier("Servo name must be an identifier")?;
        self.expect_keyword(Keyword::To)?;
        let angle = self.expect_number("Servo angle must be a number")?;

        Ok(Statement::Servo { name, angle })
    }

    /// `MOTOR (left|right) SPEED <0..=100>`
    fn parse_motor_statement(&mut self) -> Result<Statement, ParserError> {
        self.expect_keyword(Keyword::Motor)?;

        let name_token = self.expect_any("left or right")?;
        let name = match name_token.kind {
            TokenKind::Keyword(Keyword::Left) => MotorSide::Left,
            TokenKind::Keyword(Keyword::Right) => MotorSide::Right,
            _ => {
                return Err(ParserError::semantic(
                    format!("Unknown motor: {}", name_token.lexeme),
                    "Expected 'left' or 'right'",
                ))
            }
        };

        self.expect_keyword(Keyword::Speed)?;
        let speed = self.expect_number("Motor speed must be a number")?;
        if speed > 100 {
            return Err(ParserError::semantic(
                "Motor speed must be between 0 and 100",
                format!("Found: {speed}"),
            ));
        }

        Ok(Statement::Motor { name, speed })
    }

    /// `WAIT <milliseconds>`
    fn parse_wait_statement(&mut self) -> Result<Statement, ParserError> {
        self.expect_keyword(Keyword::Wait)?;
        let duration = self.expect_number("Wait duration must be a number")?;

        Ok(Statement::Wait { duration })
    }

    /// `FUNCTION <name> <block> END`
    fn parse_function_def(&mut self) -> Result<Statement, ParserError> {
        self.expect_keyword(Keyword::Function)?;

        let pos = self.peek().pos;
        let name = self.expect_identifier("Function name must be an identifier")?;
        check_function_name(&name)?;
        self.functions_mut().add_function(&name, pos).map_err(|first| {
            ParserError::semantic(
                format!("Function '{name}' is defined more than once"),
                format!("First definition at {}", first.pos),
            )
        })?;

        let body = self.parse_block()?;
        self.expect_keyword(Keyword::End)?;

        Ok(Statement::FunctionDef { name, body })
    }

    /// `CALL <name>`; resolved after the whole program is parsed
    fn parse_call_statement(&mut self) -> Result<Statement, ParserError> {
        self.expect_keyword(Keyword::Call)?;

        let pos = self.peek().pos;
        let name = self.expect_identifier("Function name must be an identifier")?;
        check_function_name(&name)?;
        self.functions_mut().record_call(&name, pos);

        Ok(Statement::Call { name })
    }

    /// `SEND message "<text>"`
    fn parse_send_statement(&mut self) -> Result<Statement, ParserError> {
        self.expect_keyword(Keyword::Send)?;
        self.expect_keyword(Keyword::Message)?;

        let token = self.peek().clone();
        if token.kind != TokenKind::String {
            return Err(SyntaxError::new(
                "Send message must be a string",
                token.pos,
                "STRING",
                token.kind.name(),
            )
            .into());
        }
        self.advance();

        Ok(Statement::Send {
            message: token.lexeme,
        })
    }
}

/// Functions the sketch always defines itself
const SKETCH_FUNCTIONS: &[&str] = &["setup", "loop"];

/// Function names become C++ identifiers in the sketch, so dotted names
/// and the sketch's own entry points are rejected.
fn check_function_name(name: &str) -> Result<(), ParserError> {
    if name.contains('.') || SKETCH_FUNCTIONS.contains(&name) {
        return Err(ParserError::semantic(
            format!("Invalid function name: {name}"),
            "Function names must be plain identifiers other than setup/loop",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::lexer::{tokenize, Position};
    use crate::parser::*;

    fn parse_src(src: &str) -> Result<Program, ParserError> {
        Parser::new(tokenize(src).unwrap()).parse_program()
    }

    fn syntax(src: &str) -> SyntaxError {
        match parse_src(src) {
            Err(ParserError::Syntax(e)) => e,
            other => panic!("expected syntax error for {src:?}, got {other:?}"),
        }
    }

    fn semantic(src: &str) -> SemanticError {
        match parse_src(src) {
            Err(ParserError::Semantic(e)) => e,
            other => panic!("expected semantic error for {src:?}, got {other:?}"),
        }
    }

    #[test]
    fn robot_move_stop_end() {
        let program = parse_src("ROBOT r\nMOVE forward 10\nSTOP\nEND").unwrap();
        assert_eq!(
            program.statements,
            vec![
                Statement::RobotDeclaration { name: "r".into() },
                Statement::Move {
                    direction: MoveDirection::Forward,
                    distance: 10
                },
                Statement::Stop,
            ]
        );
    }

    #[test]
    fn if_with_else() {
        let program =
            parse_src("IF sensor.distance < 30 THEN STOP ELSE MOVE backward 5 END").unwrap();
        assert_eq!(
            program.statements,
            vec![Statement::If {
                condition: Condition::new("sensor.distance", ComparisonOp::Less, "30"),
                then_body: vec![Statement::Stop],
                else_body: vec![Statement::Move {
                    direction: MoveDirection::Backward,
                    distance: 5
                }],
            }]
        );
    }

    #[test]
    fn nested_blocks() {
        let src = "
            REPEAT 3 TIMES
                WHILE sensor.light > 100 DO
                    TURN right 15
                END
                WAIT 250
            END
        ";
        let program = parse_src(src).unwrap();
        assert_eq!(
            program.statements,
            vec![Statement::Repeat {
                times: 3,
                body: vec![
                    Statement::While {
                        condition: Condition::new("sensor.light", ComparisonOp::Greater, "100"),
                        body: vec![Statement::Turn {
                            direction: TurnDirection::Right,
                            angle: 15
                        }],
                    },
                    Statement::Wait { duration: 250 },
                ],
            }]
        );
    }

    #[test]
    fn led_color_is_optional() {
        let program = parse_src("LED on RED\nLED off\nLED on").unwrap();
        assert_eq!(
            program.statements,
            vec![
                Statement::Led {
                    state: LedState::On,
                    color: Some("RED".into())
                },
                Statement::Led {
                    state: LedState::Off,
                    color: None
                },
                Statement::Led {
                    state: LedState::On,
                    color: None
                },
            ]
        );
    }

    #[test]
    fn servo_motor_send() {
        let program =
            parse_src("SERVO arm TO 90\nMOTOR right SPEED 100\nSEND message \"hi\\tthere\"")
                .unwrap();
        assert_eq!(
            program.statements,
            vec![
                Statement::Servo {
                    name: "arm".into(),
                    angle: 90
                },
                Statement::Motor {
                    name: MotorSide::Right,
                    speed: 100
                },
                Statement::Send {
                    message: "hi\tthere".into()
                },
            ]
        );
    }

    #[test]
    fn calls_may_precede_definitions() {
        let program = parse_src("CALL dance\nFUNCTION dance\n  TURN left 360\nEND").unwrap();
        assert_eq!(program.statements.len(), 2);
        assert_eq!(
            program.statements[1],
            Statement::FunctionDef {
                name: "dance".into(),
                body: vec![Statement::Turn {
                    direction: TurnDirection::Left,
                    angle: 360
                }],
            }
        );
    }

    #[test]
    fn undefined_call_lists_available_functions() {
        let err = semantic("FUNCTION b\nEND\nFUNCTION a\nEND\nCALL c");
        assert_eq!(err.message, "Function 'c' is called but never defined");
        assert_eq!(err.context, "Available functions: a, b");

        let err = semantic("CALL ghost");
        assert_eq!(err.context, "Available functions: none");
    }

    #[test]
    fn undefined_call_inside_function_body() {
        let err = semantic("FUNCTION a\n  CALL b\nEND");
        assert!(err.message.contains("'b'"));
    }

    #[test]
    fn duplicate_function_is_semantic() {
        let err = semantic("FUNCTION a\nEND\nFUNCTION a\nEND");
        assert_eq!(err.message, "Function 'a' is defined more than once");
        assert_eq!(err.context, "First definition at line 1, column 10");
    }

    #[test]
    fn sketch_entry_points_are_not_function_names() {
        let err = semantic("FUNCTION loop\nSTOP\nEND\nCALL loop");
        assert_eq!(err.message, "Invalid function name: loop");
        assert_eq!(
            err.context,
            "Function names must be plain identifiers other than setup/loop"
        );

        let err = semantic("FUNCTION setup\nEND");
        assert_eq!(err.message, "Invalid function name: setup");

        // A call alone is enough, before any definition is seen
        let err = semantic("CALL loop");
        assert_eq!(err.message, "Invalid function name: loop");
    }

    #[test]
    fn dotted_function_names_are_rejected() {
        let err = semantic("FUNCTION a.b\nSTOP\nEND\nCALL a.b");
        assert_eq!(err.message, "Invalid function name: a.b");

        let err = semantic("CALL sensor.distance");
        assert_eq!(err.message, "Invalid function name: sensor.distance");

        assert!(parse_src("FUNCTION looping\nEND\nCALL looping").is_ok());
    }

    #[test]
    fn string_tokens_are_quoted_in_diagnostics() {
        let err = syntax("ROBOT \"rover\"");
        assert_eq!(err.found, "\"rover\"");
    }

    #[test]
    fn motor_rules() {
        let err = semantic("MOTOR left SPEED 150");
        assert_eq!(err.message, "Motor speed must be between 0 and 100");
        assert_eq!(err.context, "Found: 150");

        let err = semantic("MOTOR arm SPEED 50");
        assert_eq!(err.message, "Unknown motor: arm");

        assert!(parse_src("MOTOR left SPEED 0").is_ok());
    }

    #[test]
    fn bad_directions_are_semantic() {
        assert_eq!(
            semantic("MOVE sideways 10").message,
            "Invalid movement direction: sideways"
        );
        assert_eq!(semantic("TURN up 10").message, "Invalid turn direction: up");
        assert_eq!(semantic("LED blink").context, "Found: blink");
    }

    #[test]
    fn oversized_number_is_semantic() {
        let err = semantic("WAIT 99999999999");
        assert!(err.message.starts_with("Number out of range"));
    }

    #[test]
    fn numbers_are_required() {
        let err = syntax("MOVE forward far");
        assert_eq!(err.message, "Movement distance must be a number");
        assert_eq!(err.expected, "NUMBER");
        assert_eq!(err.found, "IDENTIFIER");
        assert_eq!(err.pos, Position::new(1, 14));

        assert_eq!(syntax("REPEAT x TIMES END").expected, "NUMBER");
    }

    #[test]
    fn send_needs_string() {
        let err = syntax("SEND message 42");
        assert_eq!(err.expected, "STRING");
        assert_eq!(err.found, "NUMBER");

        let err = syntax("SEND \"hi\"");
        assert_eq!(err.expected, "message");
    }

    #[test]
    fn missing_terminators() {
        let err = syntax("IF a < 1 THEN STOP");
        assert_eq!(err.expected, "END");
        assert_eq!(err.found, "EOF");

        let err = syntax("WHILE a < 1 STOP END");
        assert_eq!(err.expected, "DO");
        assert_eq!(err.found, "STOP");

        let err = syntax("REPEAT 2 TIMES STOP DO");
        assert_eq!(err.expected, "END");
        assert_eq!(err.found, "DO");
    }

    #[test]
    fn unknown_statement() {
        let err = syntax("STOP\nJUMP 3");
        assert_eq!(err.message, "Unknown statement type");
        assert_eq!(err.found, "JUMP");
        assert_eq!(err.pos, Position::new(2, 1));

        assert_eq!(syntax("ELSE").found, "ELSE");
    }

    #[test]
    fn stray_end_is_skipped() {
        let program = parse_src("END\nSTOP\nEND\nEND").unwrap();
        assert_eq!(program.statements, vec![Statement::Stop]);
    }

    #[test]
    fn dangling_keyword_at_eof() {
        let err = syntax("MOVE");
        assert_eq!(err.message, "Unexpected end of input");
        assert_eq!(err.found, "EOF");
    }

    #[test]
    fn empty_program() {
        assert_eq!(parse_src("# nothing here\n").unwrap(), Program::default());
    }
}
