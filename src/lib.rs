//! RoboScript compiler
//!
//! Compiles RoboScript, a small line-oriented robot-control language, into an
//! Arduino sketch. The pipeline runs the lexer, then the recursive-descent
//! parser with its semantic checks, then the code generator.

pub mod codegen;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod symbol;

pub use codegen::CodeGenerator;
pub use error::{CompileError, ErrorKind};
pub use lexer::{tokenize, LexerError, Position, Token, TokenKind};
pub use parser::{parse, ParserError, Program, Statement};
pub use symbol::FunctionRegistry;

use tracing::debug;

/// Everything produced by one successful compilation
#[derive(Debug, Clone)]
pub struct Compilation {
    /// Token stream, terminated by `Eof`
    pub tokens: Vec<Token>,
    pub program: Program,
    /// The generated sketch
    pub output: String,
}

impl Compilation {
    /// Statements at every nesting depth
    pub fn statement_count(&self) -> usize {
        self.program.total_statements()
    }
}

/// Run the whole pipeline on `source`.
///
/// # Errors
/// The first lexical, syntax or semantic error; later stages do not run.
pub fn compile(source: &str) -> Result<Compilation, CompileError> {
    let tokens = tokenize(source)?;
    let program = parse(tokens.clone())?;
    let output = CodeGenerator::new().generate(&program);

    debug!(
        tokens = tokens.len(),
        statements = program.statements.len(),
        bytes = output.len(),
        "compiled program"
    );

    Ok(Compilation {
        tokens,
        program,
        output,
    })
}
