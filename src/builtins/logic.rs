//! Short-circuiting boolean operators: `and`, `or`, `not`.
//!
//! `and` returns false at the first false argument, true otherwise; `or`
//! returns true at the first true argument, false otherwise. Later arguments
//! are not evaluated once the result is decided. Every value except the
//! boolean false counts as true.

use crate::env::Environment;
use crate::error::{EvalError, EvalResult};
use crate::eval::eval;
use crate::value::List;
use std::rc::Rc;

use super::{boolean, create_builtin, eval_exact_args};

pub fn builtin_and(args: &List, env: &Rc<Environment>) -> EvalResult {
    for arg in args.iter() {
        if !eval(&arg, env)?.truth() {
            return boolean(false);
        }
    }
    boolean(true)
}

pub fn builtin_or(args: &List, env: &Rc<Environment>) -> EvalResult {
    for arg in args.iter() {
        if eval(&arg, env)?.truth() {
            return boolean(true);
        }
    }
    boolean(false)
}

pub fn builtin_not(args: &List, env: &Rc<Environment>) -> EvalResult {
    let values = eval_exact_args("not", args, 1, env)?;
    boolean(!values[0].truth())
}

pub fn register(env: &Rc<Environment>) {
    create_builtin(env, "and", builtin_and);
    create_builtin(env, "or", builtin_or);
    create_builtin(env, "not", builtin_not);

    crate::help_entry!(
        "and",
        "Logic",
        "(and expr ...)",
        "False at the first false argument, true otherwise. Later arguments are not evaluated.",
        ["(and true true) => true", "(and true false) => false", "(and) => true"]
    );
    crate::help_entry!(
        "or",
        "Logic",
        "(or expr ...)",
        "True at the first true argument, false otherwise. Later arguments are not evaluated.",
        ["(or false true) => true", "(or) => false"]
    );
    crate::help_entry!(
        "not",
        "Logic",
        "(not expr)",
        "Inverts a boolean; every non-false value counts as true.",
        ["(not false) => true", "(not 5) => false"]
    );
}

#[cfg(test)]
mod tests {
    use crate::builtins::tests::run;

    #[test]
    fn test_and_or_not() {
        assert_eq!(run("(and true true true)"), "true");
        assert_eq!(run("(and true false true)"), "false");
        assert_eq!(run("(and)"), "true");
        assert_eq!(run("(or false false true)"), "true");
        assert_eq!(run("(or false false)"), "false");
        assert_eq!(run("(or)"), "false");
        assert_eq!(run("(not false)"), "true");
        assert_eq!(run("(not true)"), "false");
    }

    #[test]
    fn test_non_booleans_are_truthy() {
        assert_eq!(run("(and 1 2)"), "true");
        assert_eq!(run("(not 5)"), "false");
        assert_eq!(run("(or ())"), "true");
    }

    #[test]
    fn test_and_short_circuits() {
        // The unbound symbol after the false argument is never evaluated
        assert_eq!(run("(and false ghost)"), "false");
        assert_eq!(run("(or true ghost)"), "true");
    }

    #[test]
    fn test_side_effects_stop_at_short_circuit() {
        assert_eq!(
            run("(progn (defsym n 0) (and false (progn (set n 1) true)) n)"),
            "0"
        );
        assert_eq!(
            run("(progn (defsym n 0) (or true (progn (set n 1) true)) n)"),
            "0"
        );
    }
}
