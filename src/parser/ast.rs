use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a `MOVE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Forward,
    Backward,
}

/// Rotational sense of a `TURN`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnDirection {
    Left,
    Right,
}

/// Target state of an `LED` statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedState {
    On,
    Off,
}

/// The two drive motors that have a PWM pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotorSide {
    Left,
    Right,
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOp {
    #[serde(rename = "<")]
    Less,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
}

impl MoveDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoveDirection::Forward => "forward",
            MoveDirection::Backward => "backward",
        }
    }
}

impl TurnDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnDirection::Left => "left",
            TurnDirection::Right => "right",
        }
    }
}

impl LedState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedState::On => "on",
            LedState::Off => "off",
        }
    }
}

impl MotorSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            MotorSide::Left => "left",
            MotorSide::Right => "right",
        }
    }
}

impl ComparisonOp {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "<" => Some(ComparisonOp::Less),
            ">" => Some(ComparisonOp::Greater),
            "==" => Some(ComparisonOp::Equal),
            "!=" => Some(ComparisonOp::NotEqual),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOp::Less => "<",
            ComparisonOp::Greater => ">",
            ComparisonOp::Equal => "==",
            ComparisonOp::NotEqual => "!=",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(MoveDirection, TurnDirection, LedState, MotorSide, ComparisonOp);

/// Single binary comparison, e.g. `sensor.distance < 30`.
///
/// Operands are kept as raw source text; there is no expression tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Condition")]
pub struct Condition {
    pub left: String,
    #[serde(rename = "operator")]
    pub op: ComparisonOp,
    pub right: String,
}

impl Condition {
    pub fn new(left: impl Into<String>, op: ComparisonOp, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            op,
            right: right.into(),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.op, self.right)
    }
}

/// Statement variants
///
/// The serde representation is the structural projection used for AST dumps
/// and golden tests: `{"type": <tag>, <fields>...}` with nested bodies as
/// arrays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Statement {
    RobotDeclaration {
        name: String,
    },
    Move {
        direction: MoveDirection,
        distance: u32,
    },
    Turn {
        direction: TurnDirection,
        angle: u32,
    },
    Stop,
    If {
        condition: Condition,
        #[serde(rename = "thenBody")]
        then_body: Vec<Statement>,
        #[serde(rename = "elseBody")]
        else_body: Vec<Statement>,
    },
    While {
        condition: Condition,
        body: Vec<Statement>,
    },
    Repeat {
        times: u32,
        body: Vec<Statement>,
    },
    #[serde(rename = "LED")]
    Led {
        state: LedState,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
    },
    Servo {
        name: String,
        angle: u32,
    },
    Motor {
        name: MotorSide,
        speed: u32,
    },
    Wait {
        duration: u32, // milliseconds
    },
    #[serde(rename = "Function")]
    FunctionDef {
        name: String,
        body: Vec<Statement>,
    },
    Call {
        name: String,
    },
    Send {
        message: String,
    },
}

impl Statement {
    /// The `type` tag this node carries in its projection.
    pub fn node_type(&self) -> &'static str {
        match self {
            Statement::RobotDeclaration { .. } => "RobotDeclaration",
            Statement::Move { .. } => "Move",
            Statement::Turn { .. } => "Turn",
            Statement::Stop => "Stop",
            Statement::If { .. } => "If",
            Statement::While { .. } => "While",
            Statement::Repeat { .. } => "Repeat",
            Statement::Led { .. } => "LED",
            Statement::Servo { .. } => "Servo",
            Statement::Motor { .. } => "Motor",
            Statement::Wait { .. } => "Wait",
            Statement::FunctionDef { .. } => "Function",
            Statement::Call { .. } => "Call",
            Statement::Send { .. } => "Send",
        }
    }

    /// Nested statement bodies, in source order (then before else).
    pub fn children(&self) -> impl Iterator<Item = &Statement> {
        const NONE: &[Statement] = &[];

        let (first, second) = match self {
            Statement::If {
                then_body,
                else_body,
                ..
            } => (then_body.as_slice(), else_body.as_slice()),
            Statement::While { body, .. }
            | Statement::Repeat { body, .. }
            | Statement::FunctionDef { body, .. } => (body.as_slice(), NONE),
            _ => (NONE, NONE),
        };
        first.iter().chain(second.iter())
    }
}

/// Complete program AST
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Program")]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    /// Visit every statement depth-first, parents before children.
    pub fn walk<'a>(&'a self, mut visit: impl FnMut(&'a Statement)) {
        fn go<'a>(stmt: &'a Statement, visit: &mut impl FnMut(&'a Statement)) {
            visit(stmt);
            for child in stmt.children() {
                go(child, &mut *visit);
            }
        }

        for stmt in &self.statements {
            go(stmt, &mut visit);
        }
    }

    /// Number of statements at every nesting depth.
    pub fn total_statements(&self) -> usize {
        let mut count = 0;
        self.walk(|_| count += 1);
        count
    }

    /// Structural projection as a JSON value, keys in field order.
    /// # Errors
    /// Only if serde_json fails to build the value.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Two-space indented JSON text of the projection.
    /// # Errors
    /// Only if serde_json fails to serialize.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Rebuild a program from its projection.
    ///
    /// Only the shape is checked. Motor speed ranges, function names and
    /// call resolution are parser checks and are not repeated here, so a
    /// hand-written projection can hold a tree the parser would reject.
    /// # Errors
    /// If the value is not a well-formed projection.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        Program::deserialize(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Program {
        Program::new(vec![
            Statement::RobotDeclaration {
                name: "rover".into(),
            },
            Statement::If {
                condition: Condition::new("sensor.distance", ComparisonOp::Less, "30"),
                then_body: vec![Statement::Stop],
                else_body: vec![Statement::Move {
                    direction: MoveDirection::Forward,
                    distance: 10,
                }],
            },
            Statement::Led {
                state: LedState::On,
                color: None,
            },
            Statement::FunctionDef {
                name: "blink".into(),
                body: vec![Statement::Repeat {
                    times: 2,
                    body: vec![Statement::Wait { duration: 5 }],
                }],
            },
        ])
    }

    #[test]
    fn projection_shape() {
        let value = sample().to_json().unwrap();
        assert_eq!(
            value,
            json!({
                "type": "Program",
                "statements": [
                    {"type": "RobotDeclaration", "name": "rover"},
                    {
                        "type": "If",
                        "condition": {
                            "type": "Condition",
                            "left": "sensor.distance",
                            "operator": "<",
                            "right": "30"
                        },
                        "thenBody": [{"type": "Stop"}],
                        "elseBody": [{"type": "Move", "direction": "forward", "distance": 10}]
                    },
                    {"type": "LED", "state": "on"},
                    {
                        "type": "Function",
                        "name": "blink",
                        "body": [{
                            "type": "Repeat",
                            "times": 2,
                            "body": [{"type": "Wait", "duration": 5}]
                        }]
                    }
                ]
            })
        );
    }

    #[test]
    fn projection_rebuilds_the_same_tree() {
        let program = sample();
        let rebuilt = Program::from_json(&program.to_json().unwrap()).unwrap();
        assert_eq!(rebuilt, program);
    }

    #[test]
    fn pretty_output_keeps_field_order() {
        let text = sample().to_json_pretty().unwrap();
        let type_at = text.find("\"type\": \"Program\"").unwrap();
        let stmts_at = text.find("\"statements\"").unwrap();
        assert!(type_at < stmts_at);
        assert!(text.contains("\n  \"statements\""));
    }

    #[test]
    fn projection_does_not_recheck_parser_rules() {
        let value = json!({
            "type": "Program",
            "statements": [
                {"type": "Motor", "name": "left", "speed": 150},
                {"type": "Call", "name": "missing"}
            ]
        });
        let program = Program::from_json(&value).unwrap();
        assert_eq!(
            program.statements[0],
            Statement::Motor {
                name: MotorSide::Left,
                speed: 150
            }
        );
    }

    #[test]
    fn walk_visits_nested_statements() {
        let program = sample();
        let mut seen = Vec::new();
        program.walk(|s| seen.push(s.node_type()));
        assert_eq!(
            seen,
            vec!["RobotDeclaration", "If", "Stop", "Move", "LED", "Function", "Repeat", "Wait"]
        );
        assert_eq!(program.total_statements(), 8);
    }
}
