//! Type interrogation: `type-of`, `type=`, `symbol=`, `string=`.

use crate::env::Environment;
use crate::error::{EvalError, EvalResult};
use crate::value::{Expr, List, ListBuilder};
use std::rc::Rc;

use super::{boolean, create_builtin, eval_at_least_args};

/// With one argument, the symbol naming its kind; with several, a list of
/// those symbols.
pub fn builtin_type_of(args: &List, env: &Rc<Environment>) -> EvalResult {
    let values = eval_at_least_args("type-of", args, 1, env)?;
    if values.len() == 1 {
        return Ok(Expr::symbol(values[0].type_name()));
    }
    let mut builder = ListBuilder::new();
    for value in &values {
        builder.push(Expr::symbol(value.type_name()));
    }
    Ok(Expr::List(builder.finish()))
}

/// True iff every argument has the same kind and subkind.
pub fn builtin_type_eq(args: &List, env: &Rc<Environment>) -> EvalResult {
    let values = eval_at_least_args("type=", args, 2, env)?;
    let first = &values[0];
    boolean(values[1..].iter().all(|value| first.same_kind(value)))
}

pub fn builtin_symbol_eq(args: &List, env: &Rc<Environment>) -> EvalResult {
    let values = eval_at_least_args("symbol=", args, 2, env)?;
    let mut names = Vec::new();
    for value in &values {
        match value {
            Expr::Symbol(name) | Expr::Keyword(name) => names.push(name.clone()),
            other => return Err(EvalError::type_error("symbol=", "a symbol", other).into()),
        }
    }
    boolean(names[1..].iter().all(|name| *name == names[0]))
}

pub fn builtin_string_eq(args: &List, env: &Rc<Environment>) -> EvalResult {
    let values = eval_at_least_args("string=", args, 2, env)?;
    let mut contents = Vec::new();
    for value in &values {
        match value {
            Expr::Str(s) => contents.push(s.borrow().clone()),
            other => return Err(EvalError::type_error("string=", "a string", other).into()),
        }
    }
    boolean(contents[1..].iter().all(|s| *s == contents[0]))
}

pub fn register(env: &Rc<Environment>) {
    create_builtin(env, "type-of", builtin_type_of);
    create_builtin(env, "type=", builtin_type_eq);
    create_builtin(env, "symbol=", builtin_symbol_eq);
    create_builtin(env, "string=", builtin_string_eq);

    crate::help_entry!(
        "type-of",
        "Types",
        "(type-of expr ...)",
        "The symbol naming each argument's kind: integer, float, string, boolean, list, symbol, or function.",
        ["(type-of 1) => integer", "(type-of 1 2.0) => (integer float)"]
    );
    crate::help_entry!(
        "type=",
        "Types",
        "(type= expr expr ...)",
        "True iff all arguments share kind and subkind.",
        ["(type= 1 2) => true", "(type= 1 2.0) => false"]
    );
    crate::help_entry!(
        "symbol=",
        "Types",
        "(symbol= sym sym ...)",
        "True iff all arguments are symbols with the same name.",
        ["(symbol= 'a 'a) => true"]
    );
    crate::help_entry!(
        "string=",
        "Types",
        "(string= str str ...)",
        "True iff all arguments are strings with the same content.",
        ["(string= \"a\" \"a\") => true"]
    );
}

#[cfg(test)]
mod tests {
    use crate::builtins::tests::run;

    #[test]
    fn test_type_of_single() {
        assert_eq!(run("(type-of 1)"), "integer");
        assert_eq!(run("(type-of 1.5)"), "float");
        assert_eq!(run("(type-of \"s\")"), "string");
        assert_eq!(run("(type-of true)"), "boolean");
        assert_eq!(run("(type-of ())"), "list");
        assert_eq!(run("(type-of 'a)"), "symbol");
    }

    #[test]
    fn test_type_of_many_returns_list() {
        assert_eq!(run("(type-of 1 2.0 \"s\")"), "(integer float string)");
    }

    #[test]
    fn test_type_eq() {
        assert_eq!(run("(type= 1 2 3)"), "true");
        assert_eq!(run("(type= 1 2.0)"), "false");
        assert_eq!(run("(type= 'a 'b)"), "true");
        assert_eq!(run("(type= 'a :b)"), "false");
        assert_eq!(run("(type= () '(1 2))"), "true");
    }

    #[test]
    fn test_symbol_eq() {
        assert_eq!(run("(symbol= 'a 'a 'a)"), "true");
        assert_eq!(run("(symbol= 'a 'b)"), "false");
        assert_eq!(run("(symbol= :k :k)"), "true");
        assert_eq!(
            run("(symbol= 'a 1)"),
            "error: symbol=: expected a symbol, got integer `1`"
        );
    }

    #[test]
    fn test_string_eq() {
        assert_eq!(run("(string= \"x\" \"x\")"), "true");
        assert_eq!(run("(string= \"x\" \"y\")"), "false");
        assert_eq!(
            run("(string= \"x\" 'x)"),
            "error: string=: expected a string, got symbol `x`"
        );
    }
}
