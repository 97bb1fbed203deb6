//! The `help` primitive over the documentation registry.

use crate::env::Environment;
use crate::error::{EvalError, EvalResult};
use crate::help;
use crate::value::{Expr, List};
use std::rc::Rc;

use super::create_builtin;

/// `(help)` prints the category index; `(help name)` prints one entry. The
/// argument is taken unevaluated, so primitives can be named directly.
pub fn builtin_help(args: &List, _env: &Rc<Environment>) -> EvalResult {
    let nargs = args.len();
    match args.head() {
        None => {
            print!("{}", help::format_index());
            Ok(Expr::nil())
        }
        Some(Expr::Symbol(name)) if nargs == 1 => match help::lookup(&name) {
            Some(entry) => {
                print!("{}", help::format_entry(&entry));
                Ok(Expr::nil())
            }
            None => Err(EvalError::runtime(
                "help",
                format!("no documentation for `{}`", name),
            )
            .into()),
        },
        Some(other) if nargs == 1 => {
            Err(EvalError::type_error("help", "a symbol", &other).into())
        }
        _ => Err(EvalError::arity("help", "0-1", nargs).into()),
    }
}

pub fn register(env: &Rc<Environment>) {
    create_builtin(env, "help", builtin_help);

    crate::help_entry!(
        "help",
        "I/O",
        "(help [name])",
        "Prints the primitive index, or the documentation for one primitive.",
        ["(help first)"]
    );
}

#[cfg(test)]
mod tests {
    use crate::builtins::tests::run;

    #[test]
    fn test_help_knows_registered_primitives() {
        assert_eq!(run("(help first)"), "()");
        assert_eq!(run("(help)"), "()");
    }

    #[test]
    fn test_help_unknown_name() {
        assert_eq!(
            run("(help frobnicate)"),
            "error: help: no documentation for `frobnicate`"
        );
    }
}
