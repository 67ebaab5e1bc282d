use std::collections::HashMap;
use std::rc::Rc;

use bfx_lexer::Span;

use crate::instr::Instr;

/// A function declaration: `function ret = name(a, b) { body }`.
#[derive(Debug)]
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    /// Named return variable; `None` for void functions.
    pub return_var: Option<String>,
    pub body: Instr,
    pub span: Span,
}

/// Declared functions and the chain of calls currently being expanded.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Rc<Function>>,
    call_stack: Vec<String>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function. Returns `false` if the name is taken.
    pub fn add(&mut self, function: Function) -> bool {
        if self.functions.contains_key(&function.name) {
            return false;
        }
        self.functions
            .insert(function.name.clone(), Rc::new(function));
        true
    }

    pub fn get(&self, name: &str) -> Option<Rc<Function>> {
        self.functions.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.call_stack.iter().any(|f| f == name)
    }

    pub fn enter(&mut self, name: &str) {
        assert!(!self.is_active(name), "recursive call to {} slipped through", name);
        self.call_stack.push(name.to_string());
    }

    pub fn leave(&mut self) -> String {
        self.call_stack.pop().expect("leave called with an empty call stack")
    }

    pub fn depth(&self) -> usize {
        self.call_stack.len()
    }

    /// Scope of the innermost active call; `""` (global) outside any call.
    pub fn current_scope(&self) -> &str {
        self.call_stack.last().map(String::as_str).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instr::Nop;

    fn function(name: &str) -> Function {
        Function {
            name: name.to_string(),
            params: Vec::new(),
            return_var: None,
            body: Box::new(Nop),
            span: Span::default(),
        }
    }

    #[test]
    fn redefinition_is_rejected() {
        let mut registry = FunctionRegistry::new();
        assert!(registry.add(function("f")));
        assert!(!registry.add(function("f")));
        assert!(registry.contains("f"));
    }

    #[test]
    fn call_stack_tracks_scope() {
        let mut registry = FunctionRegistry::new();
        assert_eq!(registry.current_scope(), "");
        registry.enter("main");
        registry.enter("f");
        assert_eq!(registry.current_scope(), "f");
        assert!(registry.is_active("main"));
        assert_eq!(registry.leave(), "f");
        assert!(!registry.is_active("f"));
        assert_eq!(registry.depth(), 1);
    }

    #[test]
    #[should_panic(expected = "recursive call")]
    fn entering_twice_panics() {
        let mut registry = FunctionRegistry::new();
        registry.enter("f");
        registry.enter("f");
    }
}
