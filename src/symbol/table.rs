use crate::lexer::Position;
use std::collections::BTreeMap;

/// A `FUNCTION` definition seen by the parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSymbol {
    pub name: String,
    pub pos: Position,
}

/// A `CALL` site seen by the parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub name: String,
    pub pos: Position,
}

/// Function names declared and called during one compilation.
///
/// Calls are only checked once the whole program has been read, so a call
/// may appear before the definition it refers to. Both maps are ordered so
/// diagnostics come out the same on every run.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    declared: BTreeMap<String, FunctionSymbol>,
    /// First call site per name
    called: BTreeMap<String, CallSite>,
}

impl FunctionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function definition
    /// # Errors
    /// If a function with the same name was already declared; the error
    /// carries the earlier declaration.
    pub fn add_function(&mut self, name: &str, pos: Position) -> Result<(), FunctionSymbol> {
        if let Some(existing) = self.declared.get(name) {
            return Err(existing.clone());
        }
        self.declared.insert(
            name.to_string(),
            FunctionSymbol {
                name: name.to_string(),
                pos,
            },
        );
        Ok(())
    }

    pub fn record_call(&mut self, name: &str, pos: Position) {
        self.called.entry(name.to_string()).or_insert_with(|| CallSite {
            name: name.to_string(),
            pos,
        });
    }

    /// Declared names in sorted order
    pub fn declared_names(&self) -> impl Iterator<Item = &str> {
        self.declared.keys().map(String::as_str)
    }

    /// Calls whose name was never declared, sorted by name
    pub fn undefined_calls(&self) -> impl Iterator<Item = &CallSite> {
        self.called
            .values()
            .filter(|call| !self.declared.contains_key(&call.name))
    }
}
