// File: src/interpreter/environment.rs
//
// Lexical scoping environment for variable storage.
// Implements a stack of scopes: the bottom scope is the global one and is
// never popped, each function call pushes exactly one scope on top.

use super::value::Value;
use std::collections::HashMap;

/// Variable storage using a scope stack.
///
/// Lookup searches from the innermost scope (end of the Vec) outward, so a
/// parameter shadows a global of the same name. Writes always land in the
/// innermost scope; there is no rebinding of outer variables from inside a
/// function.
#[derive(Clone, Debug)]
pub struct Environment {
    scopes: Vec<HashMap<String, Value>>,
}

impl Environment {
    /// Create a new environment with a single global scope
    pub fn new() -> Self {
        Environment { scopes: vec![HashMap::new()] }
    }

    /// Push a new scope onto the stack (entering a function)
    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Pop the innermost scope from the stack; the global scope stays.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Get a variable, searching from inner to outer scopes.
    /// Returns a cloned value if found.
    pub fn get(&self, name: &str) -> Option<Value> {
        for scope in self.scopes.iter().rev() {
            if let Some(value) = scope.get(name) {
                return Some(value.clone());
            }
        }
        None
    }

    /// Bind a variable in the current (innermost) scope, creating or
    /// overwriting it there regardless of outer bindings.
    pub fn define(&mut self, name: String, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, value);
        }
    }

    /// Number of scopes currently on the stack (always at least one).
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// The bindings of the bottom (global) scope.
    pub fn globals(&self) -> &HashMap<String, Value> {
        &self.scopes[0]
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
