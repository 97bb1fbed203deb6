//! # Primitive library
//!
//! The native primitives bound in the base environment, organized by family:
//!
//! - **[special]** - binding, definition, conditionals, iteration, quoting,
//!   non-local return: `defun`, `defmacro`, `defsym`, `set`, `let`, `if`,
//!   `progn`, `while`, `for-each`, `quote`, `eval`, `return`, `expand`
//! - **[math]** - arithmetic with int/float promotion and the integer bit
//!   operations: `+`, `-`, `*`, `/`, `%`, `&`, `|`, `^`, `bit-not`, `<<`, `>>`
//! - **[comparison]** - chained relations: `=`, `<`, `<=`, `>`, `>=`
//! - **[logic]** - short-circuiting `and`, `or`, and `not`
//! - **[sequences]** - `list`, `first`, `last`, `nth`, `pop`, `push`,
//!   `append`, `length`, `empty?`, `~`
//! - **[types]** - `type-of`, `type=`, `symbol=`, `string=`
//! - **[io]** - `print`, `get-int`, `load`
//! - **[help_builtins]** - the `help` primitive over the documentation registry
//!
//! Every primitive receives the unevaluated tail of its call list together
//! with the calling environment, and decides itself which arguments to
//! evaluate. Each family module has a `register` function that installs both
//! the bindings and their help entries.

use crate::env::Environment;
use crate::error::{EvalError, EvalResult, Signal};
use crate::eval::eval;
use crate::value::{Builtin, BuiltinFn, Expr, List};
use std::rc::Rc;

pub mod comparison;
#[path = "help.rs"]
pub mod help_builtins;
pub mod io;
pub mod logic;
pub mod math;
pub mod sequences;
pub mod special;
pub mod types;

/// Bind `name` to a native primitive in `env`.
pub fn create_builtin(env: &Rc<Environment>, name: &'static str, func: BuiltinFn) {
    env.define(name, Expr::Builtin(Builtin { name, func }));
}

/// Install every primitive and the two boolean singletons.
pub fn register_builtins(env: &Rc<Environment>) {
    env.define("true", Expr::Bool(true));
    env.define("false", Expr::Bool(false));

    special::register(env);
    math::register(env);
    comparison::register(env);
    logic::register(env);
    sequences::register(env);
    types::register(env);
    io::register(env);
    help_builtins::register(env);
}

// ============================================================================
// Shared argument plumbing
// ============================================================================

/// Check the argument count, then evaluate every argument left to right.
/// Most first-class primitives start here; special forms do not.
pub(crate) fn eval_exact_args(
    function: &str,
    args: &List,
    expected: usize,
    env: &Rc<Environment>,
) -> Result<Vec<Expr>, Signal> {
    let nargs = args.len();
    if nargs != expected {
        return Err(EvalError::arity(function, expected.to_string(), nargs).into());
    }
    eval_all(args, env)
}

/// Require at least `minimum` arguments, then evaluate them all.
pub(crate) fn eval_at_least_args(
    function: &str,
    args: &List,
    minimum: usize,
    env: &Rc<Environment>,
) -> Result<Vec<Expr>, Signal> {
    let nargs = args.len();
    if nargs < minimum {
        return Err(EvalError::arity(function, format!("{} or more", minimum), nargs).into());
    }
    eval_all(args, env)
}

pub(crate) fn eval_all(args: &List, env: &Rc<Environment>) -> Result<Vec<Expr>, Signal> {
    let mut values = Vec::new();
    for arg in args.iter() {
        values.push(eval(&arg, env)?);
    }
    Ok(values)
}

/// The boolean result convention used by predicates and comparisons.
pub(crate) fn boolean(b: bool) -> EvalResult {
    Ok(Expr::Bool(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::read_source;

    /// Evaluate `source` in a fresh base environment, returning the printed
    /// form of the last result. Shared by the family modules' tests.
    pub(crate) fn run(source: &str) -> String {
        let env = Environment::new();
        register_builtins(&env);
        run_in(&env, source)
    }

    pub(crate) fn run_in(env: &Rc<Environment>, source: &str) -> String {
        let mut result = Expr::nil();
        for form in read_source(source, "test").unwrap() {
            result = match eval(&form, env) {
                Ok(value) => value,
                Err(signal) => return format!("error: {}", signal.into_error()),
            };
        }
        format!("{}", result)
    }

    #[test]
    fn test_base_environment_has_singletons() {
        assert_eq!(run("true"), "true");
        assert_eq!(run("false"), "false");
    }

    #[test]
    fn test_builtins_print_as_functions() {
        assert_eq!(run("+"), "#'+");
        assert_eq!(run("first"), "#'first");
    }
}
