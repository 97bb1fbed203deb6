//! Special forms: definition, binding, assignment, conditionals, iteration,
//! quoting, and non-local return.
//!
//! Like every primitive these receive their argument list unevaluated; what
//! makes them special forms is that they evaluate only the pieces their
//! semantics call for.

use crate::env::Environment;
use crate::error::{EvalError, EvalResult, Signal};
use crate::eval::{eval, eval_body, expand_macro, validate_params};
use crate::value::{Expr, Function, List, Macro};
use std::rc::Rc;

use super::create_builtin;
use super::sequences::{locate_first, locate_last, locate_nth, Place};

/// Shared definition path for `defun` and `defmacro`: validate the name and
/// parameter list, store the unevaluated body, bind the callable.
fn build_callable(args: &List, env: &Rc<Environment>, is_function: bool) -> EvalResult {
    let owner = if is_function { "defun" } else { "defmacro" };
    let nargs = args.len();
    if nargs < 2 {
        return Err(EvalError::arity(owner, "2 or more", nargs).into());
    }
    let name = match args.head() {
        Some(Expr::Symbol(name)) => name,
        Some(other) => return Err(EvalError::type_error(owner, "a symbol", &other).into()),
        None => return Err(EvalError::arity(owner, "2 or more", 0).into()),
    };
    let params = match args.tail().head() {
        Some(Expr::List(params)) => params,
        Some(other) => return Err(EvalError::type_error(owner, "a parameter list", &other).into()),
        None => return Err(EvalError::arity(owner, "2 or more", 1).into()),
    };
    validate_params(owner, &params).map_err(Signal::from)?;
    let body = args.tail().tail();

    let callable = if is_function {
        Expr::Function(Rc::new(Function {
            name: name.clone(),
            params,
            body,
            env: env.clone(),
        }))
    } else {
        Expr::Macro(Rc::new(Macro {
            name: name.clone(),
            params,
            body,
        }))
    };
    env.define(name.to_string(), callable.clone());
    Ok(callable)
}

pub fn builtin_defun(args: &List, env: &Rc<Environment>) -> EvalResult {
    build_callable(args, env, true)
}

pub fn builtin_defmacro(args: &List, env: &Rc<Environment>) -> EvalResult {
    build_callable(args, env, false)
}

/// `(defsym name expr)` - evaluate `expr` and bind it in the current frame.
pub fn builtin_defsym(args: &List, env: &Rc<Environment>) -> EvalResult {
    let nargs = args.len();
    if nargs != 2 {
        return Err(EvalError::arity("defsym", "2", nargs).into());
    }
    let name = match args.head() {
        Some(Expr::Symbol(name)) => name,
        Some(Expr::Keyword(name)) => {
            return Err(EvalError::ReadOnly(name.to_string()).into());
        }
        Some(other) => return Err(EvalError::type_error("defsym", "a symbol", &other).into()),
        None => return Err(EvalError::arity("defsym", "2", 0).into()),
    };
    let value = match args.tail().head() {
        Some(expr) => eval(&expr, env)?,
        None => Expr::nil(),
    };
    env.define(name.to_string(), value);
    Ok(Expr::Symbol(name))
}

/// `(set place expr)` - assign to a name or to a located accessor place.
pub fn builtin_set(args: &List, env: &Rc<Environment>) -> EvalResult {
    let nargs = args.len();
    if nargs != 2 {
        return Err(EvalError::arity("set", "2", nargs).into());
    }
    let place = match args.head() {
        Some(place) => place,
        None => return Err(EvalError::arity("set", "2", 0).into()),
    };
    let value = match args.tail().head() {
        Some(expr) => eval(&expr, env)?,
        None => Expr::nil(),
    };

    match &place {
        Expr::Symbol(name) => {
            env.set(name, value).map_err(Signal::from)?;
            Ok(Expr::Symbol(name.clone()))
        }
        Expr::Keyword(name) => Err(EvalError::ReadOnly(name.to_string()).into()),
        Expr::List(accessor) => set_place(accessor, value, env),
        other => Err(EvalError::type_error("set", "a symbol or accessor form", other).into()),
    }
}

fn set_place(accessor: &List, value: Expr, env: &Rc<Environment>) -> EvalResult {
    let name = match accessor.head() {
        Some(Expr::Symbol(name)) => name,
        Some(other) => return Err(EvalError::type_error("set", "an accessor symbol", &other).into()),
        None => return Err(EvalError::runtime("set", "empty accessor form").into()),
    };
    let rest = accessor.tail();
    let place = match &*name {
        "first" => locate_first(&rest, env)?,
        "last" => locate_last(&rest, env)?,
        "nth" => locate_nth(&rest, env)?,
        other => {
            return Err(EvalError::runtime(
                "set",
                format!("no set accessor named `{}`", other),
            )
            .into())
        }
    };

    match place {
        Place::Cell(cell) => {
            cell.set_head(value.clone());
            Ok(value)
        }
        Place::Char(target, index) => {
            let replacement = match &value {
                Expr::Str(s) => {
                    let content = s.borrow();
                    let mut chars = content.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => Some(c),
                        _ => None,
                    }
                }
                _ => None,
            };
            let replacement = match replacement {
                Some(c) => c,
                None => {
                    return Err(EvalError::type_error(
                        "set",
                        "a single-character string",
                        &value,
                    )
                    .into())
                }
            };
            let mut chars: Vec<char> = target.borrow().chars().collect();
            if index >= chars.len() {
                return Err(
                    EvalError::runtime("set", "cannot set a character of an empty string").into(),
                );
            }
            chars[index] = replacement;
            *target.borrow_mut() = chars.into_iter().collect();
            Ok(value)
        }
    }
}

/// `(let ((n v) ...) body ...)` - child frame; binding values are evaluated
/// sequentially in that frame, so later bindings see earlier ones.
pub fn builtin_let(args: &List, env: &Rc<Environment>) -> EvalResult {
    let bindings = match args.head() {
        Some(Expr::List(bindings)) => bindings,
        Some(other) => return Err(EvalError::type_error("let", "a binding list", &other).into()),
        None => return Err(EvalError::arity("let", "1 or more", 0).into()),
    };

    let frame = Environment::with_parent(env.clone());
    for binding in bindings.iter() {
        match &binding {
            Expr::Symbol(name) => frame.define(name.to_string(), Expr::nil()),
            Expr::List(pair) => {
                let name = match pair.head() {
                    Some(Expr::Symbol(name)) => name,
                    Some(other) => {
                        return Err(
                            EvalError::type_error("let", "a binding symbol", &other).into()
                        )
                    }
                    None => {
                        return Err(EvalError::runtime("let", "empty binding form").into());
                    }
                };
                let value = match pair.len() {
                    1 => Expr::nil(),
                    2 => match pair.tail().head() {
                        Some(expr) => eval(&expr, &frame)?,
                        None => Expr::nil(),
                    },
                    n => {
                        return Err(EvalError::runtime(
                            "let",
                            format!("binding `{}` has {} forms, expected 1 or 2", binding, n),
                        )
                        .into())
                    }
                };
                frame.define(name.to_string(), value);
            }
            other => {
                return Err(EvalError::type_error("let", "a binding form", other).into());
            }
        }
    }
    eval_body(&args.tail(), &frame)
}

/// `(if c t [e])` - the condition must evaluate to a boolean.
pub fn builtin_if(args: &List, env: &Rc<Environment>) -> EvalResult {
    let nargs = args.len();
    if nargs != 2 && nargs != 3 {
        return Err(EvalError::arity("if", "2-3", nargs).into());
    }
    let condition = match args.head() {
        Some(expr) => eval(&expr, env)?,
        None => Expr::nil(),
    };
    let truth = match condition {
        Expr::Bool(b) => b,
        other => return Err(EvalError::type_error("if", "a boolean", &other).into()),
    };
    if truth {
        match args.tail().head() {
            Some(expr) => eval(&expr, env),
            None => Ok(Expr::nil()),
        }
    } else {
        match args.tail().tail().head() {
            Some(expr) => eval(&expr, env),
            None => Ok(Expr::nil()),
        }
    }
}

/// `(progn body ...)` - evaluate in order, return the last value.
pub fn builtin_progn(args: &List, env: &Rc<Environment>) -> EvalResult {
    eval_body(args, env)
}

/// `(while c body ...)` - re-evaluate `c` before every pass; it must be a
/// boolean each time.
pub fn builtin_while(args: &List, env: &Rc<Environment>) -> EvalResult {
    let nargs = args.len();
    if nargs < 2 {
        return Err(EvalError::arity("while", "2 or more", nargs).into());
    }
    let condition = match args.head() {
        Some(expr) => expr,
        None => return Err(EvalError::arity("while", "2 or more", 0).into()),
    };
    let body = args.tail();

    let mut result = Expr::nil();
    loop {
        let test = eval(&condition, env)?;
        match test {
            Expr::Bool(true) => {}
            Expr::Bool(false) => return Ok(result),
            other => return Err(EvalError::type_error("while", "a boolean", &other).into()),
        }
        for form in body.iter() {
            result = eval(&form, env)?;
        }
    }
}

/// `(for-each (sym list) body ...)` - rebind `sym` over the evaluated list in
/// a child frame.
pub fn builtin_for_each(args: &List, env: &Rc<Environment>) -> EvalResult {
    let binding = match args.head() {
        Some(Expr::List(binding)) => binding,
        Some(other) => {
            return Err(EvalError::type_error("for-each", "a (symbol list) binding", &other).into())
        }
        None => return Err(EvalError::arity("for-each", "1 or more", 0).into()),
    };
    if binding.len() != 2 {
        return Err(EvalError::runtime(
            "for-each",
            format!("binding `{}` must be (symbol list)", binding),
        )
        .into());
    }
    let name = match binding.head() {
        Some(Expr::Symbol(name)) => name,
        Some(other) => {
            return Err(EvalError::type_error("for-each", "a binding symbol", &other).into())
        }
        None => return Err(EvalError::runtime("for-each", "empty binding form").into()),
    };
    let items = match binding.tail().head() {
        Some(expr) => match eval(&expr, env)? {
            Expr::List(items) => items,
            other => return Err(EvalError::type_error("for-each", "a list", &other).into()),
        },
        None => List::new(),
    };

    let frame = Environment::with_parent(env.clone());
    let body = args.tail();
    let mut result = Expr::nil();
    for item in items.iter() {
        frame.define(name.to_string(), item);
        for form in body.iter() {
            result = eval(&form, &frame)?;
        }
    }
    Ok(result)
}

/// `(quote x)` - the argument itself, unevaluated.
pub fn builtin_quote(args: &List, _env: &Rc<Environment>) -> EvalResult {
    let nargs = args.len();
    if nargs != 1 {
        return Err(EvalError::arity("quote", "1", nargs).into());
    }
    match args.head() {
        Some(expr) => Ok(expr),
        None => Ok(Expr::nil()),
    }
}

/// `(eval x)` - evaluate twice: once to obtain an expression, once to run it.
pub fn builtin_eval(args: &List, env: &Rc<Environment>) -> EvalResult {
    let nargs = args.len();
    if nargs != 1 {
        return Err(EvalError::arity("eval", "1", nargs).into());
    }
    let expr = match args.head() {
        Some(expr) => eval(&expr, env)?,
        None => Expr::nil(),
    };
    eval(&expr, env)
}

/// `(return x)` - raise the non-local return signal; caught at the nearest
/// user-function activation.
pub fn builtin_return(args: &List, env: &Rc<Environment>) -> EvalResult {
    let nargs = args.len();
    if nargs != 1 {
        return Err(EvalError::arity("return", "1", nargs).into());
    }
    let value = match args.head() {
        Some(expr) => eval(&expr, env)?,
        None => Expr::nil(),
    };
    Err(Signal::Return(value))
}

/// `(expand macro args ...)` - the macro's expansion, not evaluated.
pub fn builtin_expand(args: &List, env: &Rc<Environment>) -> EvalResult {
    let name = match args.head() {
        Some(Expr::Symbol(name)) => name,
        Some(other) => return Err(EvalError::type_error("expand", "a macro name", &other).into()),
        None => return Err(EvalError::arity("expand", "1 or more", 0).into()),
    };
    match env.get(&name) {
        Some(Expr::Macro(m)) => expand_macro(&m, &args.tail(), env),
        Some(other) => Err(EvalError::type_error("expand", "a macro", &other).into()),
        None => Err(EvalError::UnboundSymbol(name.to_string()).into()),
    }
}

pub fn register(env: &Rc<Environment>) {
    create_builtin(env, "defun", builtin_defun);
    create_builtin(env, "defmacro", builtin_defmacro);
    create_builtin(env, "defsym", builtin_defsym);
    create_builtin(env, "set", builtin_set);
    create_builtin(env, "let", builtin_let);
    create_builtin(env, "if", builtin_if);
    create_builtin(env, "progn", builtin_progn);
    create_builtin(env, "while", builtin_while);
    create_builtin(env, "for-each", builtin_for_each);
    create_builtin(env, "quote", builtin_quote);
    create_builtin(env, "eval", builtin_eval);
    create_builtin(env, "return", builtin_return);
    create_builtin(env, "expand", builtin_expand);

    crate::help_entry!(
        "defun",
        "Definition",
        "(defun name (params) body ...)",
        "Defines a function. The parameter list may use &optional/&opt and &rest.",
        ["(defun square (x) (* x x))"]
    );
    crate::help_entry!(
        "defmacro",
        "Definition",
        "(defmacro name (params) body ...)",
        "Defines a macro; arguments are bound unevaluated and the expansion is evaluated at the call site.",
        ["(defmacro when (c &rest body) `(if ,c (progn ,@body) ()))"]
    );
    crate::help_entry!(
        "defsym",
        "Definition",
        "(defsym name expr)",
        "Evaluates expr and binds it to name in the current frame.",
        ["(defsym x 10) => x"]
    );
    crate::help_entry!(
        "set",
        "Definition",
        "(set place expr)",
        "Assigns to a bound name, or through a (first ...), (last ...), or (nth ...) place.",
        ["(set x 1)", "(set (first xs) 9)"]
    );
    crate::help_entry!(
        "let",
        "Binding",
        "(let ((name value) ...) body ...)",
        "Child scope; bindings evaluate sequentially and bare names bind to ().",
        ["(let ((x 1) (y 2)) (+ x y)) => 3"]
    );
    crate::help_entry!(
        "if",
        "Control",
        "(if cond then [else])",
        "Two- or three-armed conditional; the condition must be a boolean.",
        ["(if (< 1 2) 'yes 'no) => yes"]
    );
    crate::help_entry!(
        "progn",
        "Control",
        "(progn body ...)",
        "Evaluates the body in order and returns the last value.",
        ["(progn 1 2 3) => 3"]
    );
    crate::help_entry!(
        "while",
        "Control",
        "(while cond body ...)",
        "Re-evaluates the body while the condition is true.",
        ["(while (< i 10) (set i (+ i 1)))"]
    );
    crate::help_entry!(
        "for-each",
        "Control",
        "(for-each (sym list) body ...)",
        "Evaluates the body once per element with sym bound to it.",
        ["(for-each (x '(1 2 3)) (print x))"]
    );
    crate::help_entry!(
        "quote",
        "Quoting",
        "(quote x)",
        "x, unevaluated. 'x is the reader shorthand.",
        ["(quote (1 2)) => (1 2)"]
    );
    crate::help_entry!(
        "eval",
        "Quoting",
        "(eval x)",
        "Evaluates x twice: once to obtain an expression, once to run it.",
        ["(eval '(+ 1 2)) => 3"]
    );
    crate::help_entry!(
        "return",
        "Control",
        "(return x)",
        "Unwinds to the nearest enclosing function call, which returns x.",
        ["(return 42)"]
    );
    crate::help_entry!(
        "expand",
        "Quoting",
        "(expand macro args ...)",
        "The macro's expansion as data, without evaluating it.",
        ["(expand when true 1) => (if true (progn 1) ())"]
    );
}

#[cfg(test)]
mod tests {
    use crate::builtins::tests::run;

    #[test]
    fn test_defsym_binds_and_returns_symbol() {
        assert_eq!(run("(defsym x 41)"), "x");
        assert_eq!(run("(progn (defsym x 41) (+ x 1))"), "42");
    }

    #[test]
    fn test_defsym_rejects_keywords() {
        assert_eq!(
            run("(defsym :k 1)"),
            "error: keyword `:k` cannot be rebound"
        );
    }

    #[test]
    fn test_defun_prints_as_function() {
        assert_eq!(run("(defun f (x) x)"), "#'f");
    }

    #[test]
    fn test_set_symbol_walks_chain() {
        assert_eq!(
            run("(progn (defsym x 1) (let ((y 0)) (set x 9)) x)"),
            "9"
        );
        assert_eq!(run("(set ghost 1)"), "error: unbound symbol `ghost`");
        assert_eq!(run("(set :k 1)"), "error: keyword `:k` cannot be rebound");
    }

    #[test]
    fn test_set_never_creates_bindings() {
        // A let-local set must not leak a new binding to the parent
        assert_eq!(
            run("(progn (defsym x 1) (let ((x 5)) (set x 6)) x)"),
            "1"
        );
    }

    #[test]
    fn test_set_first_place() {
        assert_eq!(
            run("(progn (defsym xs (list 1 2 3)) (set (first xs) 9) xs)"),
            "(9 2 3)"
        );
    }

    #[test]
    fn test_set_last_and_nth_places() {
        assert_eq!(
            run("(progn (defsym xs (list 1 2 3)) (set (last xs) 9) xs)"),
            "(1 2 9)"
        );
        assert_eq!(
            run("(progn (defsym xs (list 1 2 3)) (set (nth 2 xs) 9) xs)"),
            "(1 9 3)"
        );
    }

    #[test]
    fn test_set_string_place() {
        assert_eq!(
            run("(progn (defsym s \"abc\") (set (first s) \"x\") s)"),
            "xbc"
        );
        assert_eq!(
            run("(progn (defsym s \"abc\") (set (nth 2 s) \"x\") s)"),
            "axc"
        );
        assert_eq!(
            run("(progn (defsym s \"abc\") (set (last s) \"x\") s)"),
            "abx"
        );
    }

    #[test]
    fn test_set_string_place_requires_single_char() {
        assert_eq!(
            run("(progn (defsym s \"abc\") (set (first s) \"xy\"))"),
            "error: set: expected a single-character string, got string `xy`"
        );
    }

    #[test]
    fn test_set_unknown_accessor() {
        assert_eq!(
            run("(progn (defsym xs (list 1)) (set (pop xs) 9))"),
            "error: set: no set accessor named `pop`"
        );
    }

    #[test]
    fn test_let_scoping() {
        assert_eq!(run("(let ((x 1) (y 2)) (+ x y))"), "3");
        // Later bindings see earlier ones
        assert_eq!(run("(let ((x 1) (y (+ x 1))) y)"), "2");
        // Bare symbols and one-element lists bind to ()
        assert_eq!(run("(let (a (b)) (list a b))"), "(() ())");
        // Mutation inside does not touch the outer binding
        assert_eq!(run("(progn (defsym x 7) (let ((x 0)) (set x 1)) x)"), "7");
    }

    #[test]
    fn test_if_requires_boolean() {
        assert_eq!(run("(if true 1 2)"), "1");
        assert_eq!(run("(if false 1 2)"), "2");
        assert_eq!(run("(if false 1)"), "()");
        assert_eq!(
            run("(if 0 1 2)"),
            "error: if: expected a boolean, got integer `0`"
        );
    }

    #[test]
    fn test_progn_returns_last() {
        assert_eq!(run("(progn 1 2 3)"), "3");
        assert_eq!(run("(progn)"), "()");
    }

    #[test]
    fn test_while_loops_until_false() {
        assert_eq!(
            run("(progn (defsym i 0) (while (< i 5) (set i (+ i 1))) i)"),
            "5"
        );
        // A never-true condition yields the empty list
        assert_eq!(run("(while false 1)"), "()");
        assert_eq!(
            run("(while 1 2)"),
            "error: while: expected a boolean, got integer `1`"
        );
    }

    #[test]
    fn test_for_each_side_effects() {
        assert_eq!(
            run("(progn (defsym s 0) (for-each (x (list 1 2 3 4)) (set s (+ s x))) s)"),
            "10"
        );
        assert_eq!(run("(for-each (x ()) x)"), "()");
    }

    #[test]
    fn test_quote_round_trip() {
        assert_eq!(run("(quote x)"), "x");
        assert_eq!(run("(quote (1 2 3))"), "(1 2 3)");
    }

    #[test]
    fn test_eval_evaluates_twice() {
        assert_eq!(run("(eval '(+ 1 2))"), "3");
        assert_eq!(run("(progn (defsym form '(list 1 2)) (eval form))"), "(1 2)");
    }

    #[test]
    fn test_expand_returns_expansion_unevaluated() {
        assert_eq!(
            run("(progn (defmacro double (x) `(+ ,x ,x)) (expand double 3))"),
            "(+ 3 3)"
        );
        assert_eq!(
            run("(progn (defun f (x) x) (expand f 3))"),
            "error: expand: expected a macro, got function `#'f`"
        );
    }
}
