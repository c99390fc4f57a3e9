use crate::lexer::Position;
use std::fmt;

/// Language keywords.
///
/// Besides the statement and block words this covers the small set of
/// literal words (directions, LED states, `sensor`, `message`). A word is only
/// a keyword when the whole identifier run matches; `forward_speed` stays an
/// identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Robot,
    Move,
    Turn,
    Stop,
    If,
    Then,
    Else,
    End,
    While,
    Do,
    Repeat,
    Times,
    Function,
    Call,
    Led,
    Servo,
    Motor,
    Speed,
    Wait,
    Send,
    To,
    Forward,
    Backward,
    Left,
    Right,
    On,
    Off,
    Sensor,
    Message,
}

impl Keyword {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ROBOT" => Some(Keyword::Robot),
            "MOVE" => Some(Keyword::Move),
            "TURN" => Some(Keyword::Turn),
            "STOP" => Some(Keyword::Stop),
            "IF" => Some(Keyword::If),
            "THEN" => Some(Keyword::Then),
            "ELSE" => Some(Keyword::Else),
            "END" => Some(Keyword::End),
            "WHILE" => Some(Keyword::While),
            "DO" => Some(Keyword::Do),
            "REPEAT" => Some(Keyword::Repeat),
            "TIMES" => Some(Keyword::Times),
            "FUNCTION" => Some(Keyword::Function),
            "CALL" => Some(Keyword::Call),
            "LED" => Some(Keyword::Led),
            "SERVO" => Some(Keyword::Servo),
            "MOTOR" => Some(Keyword::Motor),
            "SPEED" => Some(Keyword::Speed),
            "WAIT" => Some(Keyword::Wait),
            "SEND" => Some(Keyword::Send),
            "TO" => Some(Keyword::To),
            "forward" => Some(Keyword::Forward),
            "backward" => Some(Keyword::Backward),
            "left" => Some(Keyword::Left),
            "right" => Some(Keyword::Right),
            "on" => Some(Keyword::On),
            "off" => Some(Keyword::Off),
            "sensor" => Some(Keyword::Sensor),
            "message" => Some(Keyword::Message),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Robot => "ROBOT",
            Keyword::Move => "MOVE",
            Keyword::Turn => "TURN",
            Keyword::Stop => "STOP",
            Keyword::If => "IF",
            Keyword::Then => "THEN",
            Keyword::Else => "ELSE",
            Keyword::End => "END",
            Keyword::While => "WHILE",
            Keyword::Do => "DO",
            Keyword::Repeat => "REPEAT",
            Keyword::Times => "TIMES",
            Keyword::Function => "FUNCTION",
            Keyword::Call => "CALL",
            Keyword::Led => "LED",
            Keyword::Servo => "SERVO",
            Keyword::Motor => "MOTOR",
            Keyword::Speed => "SPEED",
            Keyword::Wait => "WAIT",
            Keyword::Send => "SEND",
            Keyword::To => "TO",
            Keyword::Forward => "forward",
            Keyword::Backward => "backward",
            Keyword::Left => "left",
            Keyword::Right => "right",
            Keyword::On => "on",
            Keyword::Off => "off",
            Keyword::Sensor => "sensor",
            Keyword::Message => "message",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword(Keyword),
    Identifier,
    Number,
    String,     // lexeme holds the decoded text, without quotes
    Operator,   // + - * / < > = !
    OpenParen,  // (
    CloseParen, // )
    Comma,      // ,
    Dot,        // .
    Eof,
}

impl TokenKind {
    /// Upper-case kind name used in diagnostics and token dumps.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Keyword(_) => "KEYWORD",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Number => "NUMBER",
            TokenKind::String => "STRING",
            TokenKind::Operator => "OPERATOR",
            TokenKind::OpenParen => "LPAREN",
            TokenKind::CloseParen => "RPAREN",
            TokenKind::Comma => "COMMA",
            TokenKind::Dot => "DOT",
            TokenKind::Eof => "EOF",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A token with position information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: Position,
    pub lexeme: String,
}

impl Token {
    pub fn new(kind: TokenKind, pos: Position, lexeme: String) -> Self {
        Self { kind, pos, lexeme }
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            TokenKind::String => write!(f, "\"{}\"", self.lexeme),
            TokenKind::Eof => write!(f, "EOF"),
            _ => write!(f, "{}", self.lexeme),
        }
    }
}
