pub mod generator;
pub mod pins;

pub use generator::*;
