use tracing::debug;

use crate::codegen::pins::{
    speed_to_duty, LED_PIN, MOTOR_LEFT_BACKWARD, MOTOR_LEFT_FORWARD,
    MOTOR_RIGHT_BACKWARD, MOTOR_RIGHT_FORWARD, MOVE_MS_PER_UNIT, OUTPUT_PINS, PIN_DEFINITIONS,
    SENSORS, SERIAL_BAUD, SERVO_PIN, SERVO_SETTLE_MS, TURN_MS_PER_DEGREE,
};
use crate::parser::{
    Condition, LedState, MotorSide, MoveDirection, Program, Statement, TurnDirection,
};

const INDENT: &str = "  ";

/// Lowers a parsed program to an Arduino sketch.
///
/// Generation cannot fail. The program is expected to have passed the
/// parser's checks; a tree rebuilt with `Program::from_json` is lowered as is.
#[derive(Debug, Default)]
pub struct CodeGenerator {
    indent_level: usize,
    /// Statement lines of the current target (`loop()` or a function scratch buffer)
    loop_lines: Vec<String>,
    setup_lines: Vec<String>,
    /// Hoisted `void name() { ... }` blocks, each followed by a blank line
    function_lines: Vec<String>,
    /// Nesting depth of `REPEAT`, used to pick a fresh loop counter
    repeat_depth: usize,
}

impl CodeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate the complete sketch for a program.
    ///
    /// State from an earlier call is discarded, so one generator can be
    /// reused across programs.
    pub fn generate(&mut self, program: &Program) -> String {
        *self = Self::default();

        self.indent_level = 1;
        self.generate_setup();
        self.generate_block(&program.statements);

        debug!(
            loop_lines = self.loop_lines.len(),
            function_lines = self.function_lines.len(),
            "generated sketch"
        );

        self.assemble()
    }

    /// Body of `setup()` from the last generation
    pub fn setup_code(&self) -> String {
        join_lines(&self.setup_lines)
    }

    /// Body of `loop()` from the last generation
    pub fn loop_code(&self) -> String {
        join_lines(&self.loop_lines)
    }

    /// Hoisted function definitions from the last generation
    pub fn function_code(&self) -> String {
        join_lines(&self.function_lines)
    }

    fn indent(&self) -> String {
        INDENT.repeat(self.indent_level)
    }

    fn add_line(&mut self, code: impl AsRef<str>) {
        let line = format!("{}{}", self.indent(), code.as_ref());
        self.loop_lines.push(line);
    }

    fn add_setup_line(&mut self, code: impl AsRef<str>) {
        let line = format!("{}{}", self.indent(), code.as_ref());
        self.setup_lines.push(line);
    }

    fn digital_write(&mut self, pin: u8, high: bool) {
        let level = if high { "HIGH" } else { "LOW" };
        self.add_line(format!("digitalWrite({pin}, {level});"));
    }

    fn generate_setup(&mut self) {
        self.add_setup_line("// Initialize pins");
        for pin in OUTPUT_PINS {
            self.add_setup_line(format!("pinMode({pin}, OUTPUT);"));
        }
        self.add_setup_line(format!("servo.attach({SERVO_PIN});"));
        self.add_setup_line(format!("Serial.begin({SERIAL_BAUD});"));
        self.add_setup_line("Serial.println(\"Robot initialized\");");
    }

    fn generate_block(&mut self, statements: &[Statement]) {
        for stmt in statements {
            self.generate_statement(stmt);
        }
    }

    fn generate_nested(&mut self, statements: &[Statement]) {
        self.indent_level += 1;
        self.generate_block(statements);
        self.indent_level -= 1;
    }

    /// Generate code for a statement
    fn generate_statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::RobotDeclaration { name } => {
                self.add_line(format!("// Robot: {name}"));
                self.add_line("// Initializing robot systems...");
            }

            Statement::Move {
                direction,
                distance,
            } => self.generate_move(*direction, *distance),

            Statement::Turn { direction, angle } => self.generate_turn(*direction, *angle),

            Statement::Stop => {
                self.add_line("// Stop all motors");
                for pin in [
                    MOTOR_LEFT_FORWARD,
                    MOTOR_LEFT_BACKWARD,
                    MOTOR_RIGHT_FORWARD,
                    MOTOR_RIGHT_BACKWARD,
                ] {
                    self.digital_write(pin, false);
                }
            }

            Statement::If {
                condition,
                then_body,
                else_body,
            } => {
                self.add_line(format!("if {} {{", lower_condition(condition)));
                self.generate_nested(then_body);
                if !else_body.is_empty() {
                    self.add_line("} else {");
                    self.generate_nested(else_body);
                }
                self.add_line("}");
            }

            Statement::While { condition, body } => {
                self.add_line(format!("while {} {{", lower_condition(condition)));
                self.generate_nested(body);
                self.add_line("}");
            }

            Statement::Repeat { times, body } => {
                let counter = loop_counter(self.repeat_depth);
                self.add_line(format!(
                    "for (int {counter} = 0; {counter} < {times}; {counter}++) {{"
                ));
                self.repeat_depth += 1;
                self.generate_nested(body);
                self.repeat_depth -= 1;
                self.add_line("}");
            }

            Statement::Led { state, color } => match state {
                LedState::On => {
                    self.add_line("// LED on");
                    if let Some(color) = color {
                        self.add_line(format!("// Color: {color}"));
                    }
                    self.digital_write(LED_PIN, true);
                }
                LedState::Off => {
                    self.add_line("// LED off");
                    self.digital_write(LED_PIN, false);
                }
            },

            Statement::Servo { name, angle } => {
                self.add_line(format!("// Servo {name} to angle {angle}"));
                self.add_line(format!("servo.write({angle});"));
                self.add_line(format!("delay({SERVO_SETTLE_MS});"));
            }

            Statement::Motor { name, speed } => {
                let pin = match name {
                    MotorSide::Left => MOTOR_LEFT_FORWARD,
                    MotorSide::Right => MOTOR_RIGHT_FORWARD,
                };
                self.add_line(format!("// Motor {name} speed: {speed}%"));
                self.add_line(format!("analogWrite({pin}, {});", speed_to_duty(*speed)));
            }

            Statement::Wait { duration } => {
                self.add_line(format!("delay({duration});  // Wait {duration}ms"));
            }

            Statement::FunctionDef { name, body } => self.generate_function(name, body),

            Statement::Call { name } => {
                self.add_line(format!("{name}();  // Call function"));
            }

            Statement::Send { message } => {
                self.add_line(format!("Serial.println(\"{}\");", escape_c_string(message)));
            }
        }
    }

    fn generate_move(&mut self, direction: MoveDirection, distance: u32) {
        let forward = direction == MoveDirection::Forward;

        self.add_line(format!("// Move {direction}: {distance} units"));
        self.digital_write(MOTOR_LEFT_FORWARD, forward);
        self.digital_write(MOTOR_RIGHT_FORWARD, forward);
        self.digital_write(MOTOR_LEFT_BACKWARD, !forward);
        self.digital_write(MOTOR_RIGHT_BACKWARD, !forward);
        self.add_line(format!("delay({});", u64::from(distance) * MOVE_MS_PER_UNIT));
    }

    /// Skid turn: one side drives forward while the other reverses.
    fn generate_turn(&mut self, direction: TurnDirection, angle: u32) {
        let right = direction == TurnDirection::Right;

        self.add_line(format!("// Turn {direction}: {angle} degrees"));
        self.digital_write(MOTOR_LEFT_FORWARD, right);
        self.digital_write(MOTOR_RIGHT_FORWARD, !right);
        self.digital_write(MOTOR_LEFT_BACKWARD, !right);
        self.digital_write(MOTOR_RIGHT_BACKWARD, right);
        self.add_line(format!("delay({});", u64::from(angle) * TURN_MS_PER_DEGREE));
    }

    /// Generate the body into a scratch buffer and hoist it; the call site
    /// gets nothing.
    fn generate_function(&mut self, name: &str, body: &[Statement]) {
        let saved_lines = std::mem::take(&mut self.loop_lines);
        let saved_indent = std::mem::replace(&mut self.indent_level, 1);
        let saved_depth = std::mem::replace(&mut self.repeat_depth, 0);

        self.generate_block(body);

        let body_lines = std::mem::replace(&mut self.loop_lines, saved_lines);
        self.indent_level = saved_indent;
        self.repeat_depth = saved_depth;

        self.function_lines.push(format!("void {name}() {{"));
        self.function_lines.extend(body_lines);
        self.function_lines.push("}".to_string());
        self.function_lines.push(String::new());
    }

    fn assemble(&self) -> String {
        let mut out: Vec<String> = vec!["#include <Servo.h>".into(), String::new()];

        out.push("// Pin Definitions".into());
        for (name, pin) in PIN_DEFINITIONS {
            out.push(format!("#define {name} {pin}"));
        }
        out.push(String::new());

        out.push("// Global Variables".into());
        out.push("Servo servo;".into());
        out.push(String::new());

        out.extend(self.function_lines.iter().cloned());

        out.push("void setup() {".into());
        out.extend(self.setup_lines.iter().cloned());
        out.push("}".into());
        out.push(String::new());

        out.push("void loop() {".into());
        if self.loop_lines.is_empty() {
            out.push(format!("{INDENT}// Your robot code here"));
        } else {
            out.extend(self.loop_lines.iter().cloned());
        }
        out.push("}".into());

        join_lines(&out)
    }
}

fn join_lines(lines: &[String]) -> String {
    let mut text = String::new();
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    text
}

/// `i`, `i1`, `i2`, ... so nested loops keep separate counters.
fn loop_counter(depth: usize) -> String {
    if depth == 0 {
        "i".to_string()
    } else {
        format!("i{depth}")
    }
}

/// Operands naming a sensor become an analog read of its pin.
fn lower_operand(operand: &str) -> String {
    SENSORS
        .iter()
        .find(|(name, _)| operand.contains(*name))
        .map_or_else(|| operand.to_string(), |(_, pin)| format!("analogRead({pin})"))
}

fn lower_condition(condition: &Condition) -> String {
    format!(
        "({} {} {})",
        lower_operand(&condition.left),
        condition.op,
        lower_operand(&condition.right)
    )
}

/// Re-encode decoded string text as a C string literal body.
fn escape_c_string(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    escaped
}
