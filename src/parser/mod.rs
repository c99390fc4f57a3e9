pub mod ast;
pub mod conditions;
pub mod errors;
pub mod parse;
pub mod statements;

pub use ast::*;
pub use errors::*;
pub use parse::{parse, Parser};
