//! I/O-shaped primitives: `print`, `get-int`, `load`.

use crate::env::Environment;
use crate::error::{EvalError, EvalResult};
use crate::eval::eval;
use crate::parser::read_source;
use crate::value::{Expr, List};
use std::io::BufRead;
use std::rc::Rc;

use super::{create_builtin, eval_at_least_args};

/// Print each evaluated argument on its own line; the last value is the
/// result.
pub fn builtin_print(args: &List, env: &Rc<Environment>) -> EvalResult {
    let values = eval_at_least_args("print", args, 1, env)?;
    for value in &values {
        println!("{}", value);
    }
    Ok(values[values.len() - 1].clone())
}

/// Read one integer from standard input and discard the rest of the line.
pub fn builtin_get_int(args: &List, _env: &Rc<Environment>) -> EvalResult {
    let nargs = args.len();
    if nargs != 0 {
        return Err(EvalError::arity("get-int", "0", nargs).into());
    }
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| EvalError::runtime("get-int", e.to_string()))?;
    let token = line.split_whitespace().next().unwrap_or("");
    match token.parse::<i64>() {
        Ok(i) => Ok(Expr::Int(i)),
        Err(_) => Err(EvalError::runtime("get-int", format!("`{}` is not an integer", token)).into()),
    }
}

/// Read and evaluate each named source file in order.
pub fn builtin_load(args: &List, env: &Rc<Environment>) -> EvalResult {
    let nargs = args.len();
    if nargs == 0 {
        return Err(EvalError::arity("load", "1 or more", nargs).into());
    }
    for arg in args.iter() {
        let path = match eval(&arg, env)? {
            Expr::Str(s) => s.borrow().clone(),
            other => return Err(EvalError::type_error("load", "a file name string", &other).into()),
        };
        let source = std::fs::read_to_string(&path)
            .map_err(|e| EvalError::runtime("load", format!("{}: {}", path, e)))?;
        let forms = read_source(&source, &path)
            .map_err(|e| EvalError::runtime("load", e.to_string()))?;
        for form in forms {
            eval(&form, env)?;
        }
    }
    Ok(Expr::Bool(true))
}

pub fn register(env: &Rc<Environment>) {
    create_builtin(env, "print", builtin_print);
    create_builtin(env, "get-int", builtin_get_int);
    create_builtin(env, "load", builtin_load);

    crate::help_entry!(
        "print",
        "I/O",
        "(print expr ...)",
        "Prints each value on its own line and returns the last.",
        ["(print 1 2) => 2"]
    );
    crate::help_entry!(
        "get-int",
        "I/O",
        "(get-int)",
        "Reads one integer from standard input, discarding the rest of the line.",
        []
    );
    crate::help_entry!(
        "load",
        "I/O",
        "(load file ...)",
        "Reads and evaluates each named source file in the current environment.",
        ["(load \"prelude.lisp\") => true"]
    );
}
