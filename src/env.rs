// ABOUTME: Environment chain mapping symbol names to expression values

use crate::error::EvalError;
use crate::value::Expr;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// One frame of the environment chain. A frame owns its bindings and holds an
/// optional parent; `let` forms and function/macro activations each get a
/// child frame.
#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Expr>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// A root frame with no parent.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    /// Bind in THIS frame, shadowing any outer binding of the same name.
    pub fn define(&self, name: impl Into<String>, value: Expr) {
        self.bindings.borrow_mut().insert(name.into(), value);
    }

    /// Look up through the chain, nearest frame first.
    pub fn get(&self, name: &str) -> Option<Expr> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone());
        }
        match &self.parent {
            Some(parent) => parent.get(name),
            None => None,
        }
    }

    /// Rewrite the binding in whichever frame currently holds `name`. Never
    /// creates a binding; an unbound name is an error.
    pub fn set(&self, name: &str, value: Expr) -> Result<(), EvalError> {
        if self.bindings.borrow().contains_key(name) {
            self.bindings
                .borrow_mut()
                .insert(name.to_string(), value);
            return Ok(());
        }
        match &self.parent {
            Some(parent) => parent.set(name, value),
            None => Err(EvalError::UnboundSymbol(name.to_string())),
        }
    }
}
