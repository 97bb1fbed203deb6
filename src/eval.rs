// ABOUTME: Evaluator core: dispatch, call-site splicing, quasiquote, application

use crate::env::Environment;
use crate::error::{EvalError, EvalResult, Signal};
use crate::value::{Expr, Function, List, ListBuilder, Macro};
use std::rc::Rc;

/// Evaluate one expression in `env`.
///
/// Literals, keywords, the empty list, and callable values are
/// self-evaluating. Symbols resolve through the environment chain. Non-empty
/// lists are calls.
pub fn eval(expr: &Expr, env: &Rc<Environment>) -> EvalResult {
    match expr {
        Expr::Int(_)
        | Expr::Float(_)
        | Expr::Str(_)
        | Expr::Bool(_)
        | Expr::Keyword(_)
        | Expr::Builtin(_)
        | Expr::Function(_)
        | Expr::Macro(_)
        | Expr::Error => Ok(expr.clone()),

        Expr::Symbol(name) => match env.get(name) {
            Some(value) => Ok(value),
            None => Err(EvalError::UnboundSymbol(name.to_string()).into()),
        },

        Expr::Quote(inner) => Ok((**inner).clone()),
        Expr::Backtick(inner) => eval_backtick(inner, env),
        Expr::Comma(_) => Err(EvalError::IllegalSyntaxPosition(",").into()),
        Expr::CommaAt(_) => Err(EvalError::IllegalSyntaxPosition(",@").into()),

        Expr::List(list) => {
            if list.is_empty() {
                Ok(expr.clone())
            } else {
                eval_call(list, env)
            }
        }
    }
}

/// Evaluate an expression for the host: errors are reported as the error
/// sentinel value rather than unwinding further.
pub fn eval_top_level(expr: &Expr, env: &Rc<Environment>) -> Result<Expr, EvalError> {
    eval(expr, env).map_err(Signal::into_error)
}

fn eval_call(form: &List, env: &Rc<Environment>) -> EvalResult {
    let form = expand_splices(form, env)?;

    let head = match form.head() {
        Some(head) => head,
        // Splicing empty lists can empty the call form; nil is self-evaluating
        None => return Ok(Expr::List(form)),
    };
    let name = match &head {
        Expr::Symbol(name) => name.clone(),
        other => return Err(EvalError::NotCallable(other.to_string()).into()),
    };
    let callee = match env.get(&name) {
        Some(value) => value,
        None => return Err(EvalError::UnboundSymbol(name.to_string()).into()),
    };

    let args = form.tail();
    match callee {
        Expr::Builtin(builtin) => (builtin.func)(&args, env),
        Expr::Function(function) => apply_function(&function, &args, env),
        Expr::Macro(m) => {
            let expansion = expand_macro(&m, &args, env)?;
            eval(&expansion, env)
        }
        other => Err(EvalError::NotCallable(format!("{} `{}`", other.type_name(), name)).into()),
    }
}

/// Replace every `,@x` among the immediate children with the cells of the
/// list `x` evaluates to. Always builds a fresh spine when a splice is
/// present; the input list is never relinked.
pub fn expand_splices(list: &List, env: &Rc<Environment>) -> Result<List, Signal> {
    if !list.iter().any(|item| matches!(item, Expr::CommaAt(_))) {
        return Ok(list.clone());
    }

    let mut builder = ListBuilder::new();
    for item in list.iter() {
        match item {
            Expr::CommaAt(inner) => {
                let spliced = eval(&inner, env)?;
                match spliced {
                    Expr::List(cells) => {
                        for cell in cells.iter() {
                            builder.push(cell);
                        }
                    }
                    other => {
                        return Err(EvalError::type_error(",@", "a list", &other).into());
                    }
                }
            }
            other => builder.push(other),
        }
    }
    Ok(builder.finish())
}

/// Quasiquote expansion. `,x` evaluates; lists expand splices and recurse;
/// everything else is returned verbatim. Backticks do not nest: an inner
/// backtick form passes through untouched.
fn eval_backtick(expr: &Expr, env: &Rc<Environment>) -> EvalResult {
    match expr {
        Expr::Comma(inner) => eval(inner, env),
        Expr::List(list) if !list.is_empty() => {
            let expanded = expand_splices(list, env)?;
            let mut builder = ListBuilder::new();
            for item in expanded.iter() {
                builder.push(eval_backtick(&item, env)?);
            }
            Ok(Expr::List(builder.finish()))
        }
        _ => Ok(expr.clone()),
    }
}

/// Apply a user-defined function: evaluate the arguments in the caller's
/// environment, bind them in a child of the captured defining environment,
/// run the body, and catch the `return` signal.
pub fn apply_function(function: &Function, args: &List, env: &Rc<Environment>) -> EvalResult {
    let activation = Environment::with_parent(function.env.clone());
    bind_params(&function.name, &function.params, args, env, &activation, true)?;
    match eval_body(&function.body, &activation) {
        Err(Signal::Return(value)) => Ok(value),
        other => other,
    }
}

/// Produce a macro's expansion: bind the arguments verbatim in a child of the
/// calling environment and evaluate the stored body. The caller decides
/// whether to evaluate the expansion. `return` is deliberately not caught
/// here.
pub fn expand_macro(m: &Macro, args: &List, env: &Rc<Environment>) -> EvalResult {
    let activation = Environment::with_parent(env.clone());
    bind_params(&m.name, &m.params, args, env, &activation, false)?;
    eval_body(&m.body, &activation)
}

/// Evaluate body forms in order, returning the last value; an empty body
/// yields the empty list.
pub fn eval_body(body: &List, env: &Rc<Environment>) -> EvalResult {
    let mut result = Expr::nil();
    for form in body.iter() {
        result = eval(&form, env)?;
    }
    Ok(result)
}

/// How many arguments a parameter list accepts.
struct ParamShape {
    required: usize,
    optional: usize,
    has_rest: bool,
}

impl ParamShape {
    fn of(params: &List) -> ParamShape {
        let mut shape = ParamShape {
            required: 0,
            optional: 0,
            has_rest: false,
        };
        let mut in_optional = false;
        for param in params.iter() {
            if let Expr::Symbol(name) = &param {
                match &**name {
                    "&rest" => {
                        shape.has_rest = true;
                        break;
                    }
                    "&opt" | "&optional" => {
                        in_optional = true;
                        continue;
                    }
                    _ => {}
                }
            }
            if in_optional {
                shape.optional += 1;
            } else {
                shape.required += 1;
            }
        }
        shape
    }

    fn describe(&self) -> String {
        if self.has_rest {
            format!("{} or more", self.required)
        } else if self.optional > 0 {
            format!("{}-{}", self.required, self.required + self.optional)
        } else {
            format!("{}", self.required)
        }
    }

    fn accepts(&self, nargs: usize) -> bool {
        if nargs < self.required {
            return false;
        }
        self.has_rest || nargs <= self.required + self.optional
    }
}

/// Check a `defun`/`defmacro` parameter list at definition time.
pub fn validate_params(owner: &str, params: &List) -> Result<(), EvalError> {
    let mut cur = params.clone();
    while let Some(param) = cur.head() {
        match &param {
            Expr::Symbol(name) if &**name == "&rest" => {
                cur = cur.tail();
                match cur.head() {
                    Some(Expr::Symbol(_)) => {}
                    Some(other) => {
                        return Err(EvalError::bad_params(
                            owner,
                            format!("`&rest` parameter `{}` is not a symbol", other),
                        ))
                    }
                    None => {
                        return Err(EvalError::bad_params(
                            owner,
                            "a parameter is required after `&rest`",
                        ))
                    }
                }
                cur = cur.tail();
                if !cur.is_empty() {
                    return Err(EvalError::bad_params(
                        owner,
                        "only one parameter may follow `&rest`",
                    ));
                }
                return Ok(());
            }
            Expr::Symbol(name) if &**name == "&opt" || &**name == "&optional" => {
                cur = cur.tail();
                if cur.is_empty() {
                    return Err(EvalError::bad_params(
                        owner,
                        "one or more parameters required after `&optional`",
                    ));
                }
                while let Some(opt) = cur.head() {
                    match &opt {
                        Expr::Symbol(_) => {}
                        Expr::List(pair) => {
                            if pair.len() != 2 {
                                return Err(EvalError::bad_params(
                                    owner,
                                    "optional defaults take the form (name default)",
                                ));
                            }
                            if !matches!(pair.head(), Some(Expr::Symbol(_))) {
                                return Err(EvalError::bad_params(
                                    owner,
                                    format!("optional parameter in `{}` is not a symbol", opt),
                                ));
                            }
                        }
                        other => {
                            return Err(EvalError::bad_params(
                                owner,
                                format!("parameter `{}` is not a symbol", other),
                            ))
                        }
                    }
                    cur = cur.tail();
                }
                return Ok(());
            }
            Expr::Symbol(_) => {}
            other => {
                return Err(EvalError::bad_params(
                    owner,
                    format!("parameter `{}` is not a symbol", other),
                ))
            }
        }
        cur = cur.tail();
    }
    Ok(())
}

/// Bind call arguments into `activation`. For functions the arguments are
/// evaluated left to right in the caller's environment; for macros they are
/// bound verbatim. Defaults for missing optionals are evaluated in the
/// caller's environment either way.
fn bind_params(
    name: &str,
    params: &List,
    args: &List,
    caller: &Rc<Environment>,
    activation: &Rc<Environment>,
    evaluate: bool,
) -> Result<(), Signal> {
    let shape = ParamShape::of(params);
    let nargs = args.len();
    if !shape.accepts(nargs) {
        return Err(EvalError::arity(name, shape.describe(), nargs).into());
    }

    let mut param_cur = params.clone();
    let mut arg_cur = args.clone();
    let mut in_optional = false;

    while let Some(param) = param_cur.head() {
        if let Expr::Symbol(pname) = &param {
            match &**pname {
                "&rest" => {
                    param_cur = param_cur.tail();
                    let rest_name = match param_cur.head() {
                        Some(Expr::Symbol(s)) => s,
                        // Ruled out by definition-time validation
                        _ => {
                            return Err(EvalError::bad_params(
                                name,
                                "a parameter is required after `&rest`",
                            )
                            .into())
                        }
                    };
                    let rest = if evaluate {
                        let mut builder = ListBuilder::new();
                        for arg in arg_cur.iter() {
                            builder.push(eval(&arg, caller)?);
                        }
                        builder.finish()
                    } else {
                        arg_cur.clone()
                    };
                    activation.define(rest_name.to_string(), Expr::List(rest));
                    return Ok(());
                }
                "&opt" | "&optional" => {
                    in_optional = true;
                    param_cur = param_cur.tail();
                    continue;
                }
                _ => {}
            }
        }

        let (param_name, default) = match &param {
            Expr::Symbol(s) => (s.clone(), None),
            Expr::List(pair) if in_optional => {
                let pname = match pair.head() {
                    Some(Expr::Symbol(s)) => s,
                    _ => {
                        return Err(EvalError::bad_params(
                            name,
                            format!("optional parameter in `{}` is not a symbol", param),
                        )
                        .into())
                    }
                };
                (pname, pair.tail().head())
            }
            other => {
                return Err(EvalError::bad_params(
                    name,
                    format!("parameter `{}` is not a symbol", other),
                )
                .into())
            }
        };

        let value = match arg_cur.head() {
            Some(arg) => {
                if evaluate {
                    eval(&arg, caller)?
                } else {
                    arg
                }
            }
            None => match default {
                // Defaults are evaluated in the calling environment
                Some(expr) => eval(&expr, caller)?,
                None => Expr::Bool(false),
            },
        };
        activation.define(param_name.to_string(), value);

        param_cur = param_cur.tail();
        arg_cur = arg_cur.tail();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::register_builtins;
    use crate::parser::read_source;

    fn setup() -> Rc<Environment> {
        let env = Environment::new();
        register_builtins(&env);
        env
    }

    fn run(env: &Rc<Environment>, source: &str) -> Result<Expr, Signal> {
        let mut result = Expr::nil();
        for form in read_source(source, "test").unwrap() {
            result = eval(&form, env)?;
        }
        Ok(result)
    }

    fn printed(env: &Rc<Environment>, source: &str) -> String {
        format!("{}", run(env, source).unwrap())
    }

    #[test]
    fn test_literals_self_evaluate() {
        let env = setup();
        assert_eq!(printed(&env, "42"), "42");
        assert_eq!(printed(&env, "2.5"), "2.500000");
        assert_eq!(printed(&env, "\"hi\""), "hi");
        assert_eq!(printed(&env, "()"), "()");
        assert_eq!(printed(&env, ":key"), ":key");
    }

    #[test]
    fn test_symbol_resolution() {
        let env = setup();
        env.define("x", Expr::Int(10));
        assert_eq!(printed(&env, "x"), "10");

        let err = run(&env, "ghost").unwrap_err();
        assert!(matches!(
            err,
            Signal::Error(EvalError::UnboundSymbol(name)) if name == "ghost"
        ));
    }

    #[test]
    fn test_quote_returns_inner_unevaluated() {
        let env = setup();
        assert_eq!(printed(&env, "'(1 2 3)"), "(1 2 3)");
        assert_eq!(printed(&env, "'ghost"), "ghost");
    }

    #[test]
    fn test_comma_outside_backtick_fails() {
        let env = setup();
        let err = run(&env, ",x").unwrap_err();
        assert!(matches!(
            err,
            Signal::Error(EvalError::IllegalSyntaxPosition(","))
        ));
    }

    #[test]
    fn test_head_must_be_symbol() {
        let env = setup();
        let err = run(&env, "(1 2 3)").unwrap_err();
        assert!(matches!(err, Signal::Error(EvalError::NotCallable(_))));
    }

    #[test]
    fn test_non_callable_binding() {
        let env = setup();
        env.define("n", Expr::Int(5));
        let err = run(&env, "(n 1)").unwrap_err();
        assert!(matches!(err, Signal::Error(EvalError::NotCallable(_))));
    }

    #[test]
    fn test_backtick_without_commas_copies_structure() {
        let env = setup();
        assert_eq!(printed(&env, "`(1 (2 3))"), "(1 (2 3))");
    }

    #[test]
    fn test_backtick_comma_evaluates() {
        let env = setup();
        env.define("x", Expr::Int(42));
        assert_eq!(printed(&env, "`(1 ,x 3)"), "(1 42 3)");
    }

    #[test]
    fn test_backtick_splice() {
        let env = setup();
        assert_eq!(
            printed(&env, "(progn (defsym xs '(2 3)) `(1 ,@xs 4))"),
            "(1 2 3 4)"
        );
    }

    #[test]
    fn test_splice_of_non_list_fails() {
        let env = setup();
        let err = run(&env, "`(1 ,@2)").unwrap_err();
        assert!(matches!(err, Signal::Error(EvalError::TypeMismatch { .. })));
    }

    #[test]
    fn test_call_site_splice() {
        let env = setup();
        assert_eq!(
            printed(&env, "(progn (defsym xs '(1 2 3)) (+ ,@xs))"),
            "6"
        );
    }

    #[test]
    fn test_call_site_splice_does_not_mutate_source_list() {
        let env = setup();
        run(&env, "(defsym xs '(1 2))").unwrap();
        run(&env, "(+ ,@xs 10)").unwrap();
        assert_eq!(printed(&env, "xs"), "(1 2)");
    }

    #[test]
    fn test_nested_backtick_left_alone() {
        let env = setup();
        assert_eq!(printed(&env, "``(1 ,x)"), "`(1 ,x)");
    }

    #[test]
    fn test_function_application_and_arity() {
        let env = setup();
        run(&env, "(defun add2 (a b) (+ a b))").unwrap();
        assert_eq!(printed(&env, "(add2 1 2)"), "3");

        let too_few = run(&env, "(add2 1)").unwrap_err();
        assert!(matches!(
            too_few,
            Signal::Error(EvalError::ArityMismatch { .. })
        ));
        let too_many = run(&env, "(add2 1 2 3)").unwrap_err();
        assert!(matches!(
            too_many,
            Signal::Error(EvalError::ArityMismatch { .. })
        ));
    }

    #[test]
    fn test_rest_parameter() {
        let env = setup();
        run(&env, "(defun grab (first &rest others) others)").unwrap();
        assert_eq!(printed(&env, "(grab 1 2 3)"), "(2 3)");
        assert_eq!(printed(&env, "(grab 1)"), "()");
    }

    #[test]
    fn test_optional_parameters_default_to_false() {
        let env = setup();
        run(&env, "(defun opt (a &optional b) (list a b))").unwrap();
        assert_eq!(printed(&env, "(opt 1 2)"), "(1 2)");
        assert_eq!(printed(&env, "(opt 1)"), "(1 false)");
    }

    #[test]
    fn test_optional_default_evaluated_in_caller_env() {
        let env = setup();
        run(&env, "(defun opt (a &opt (b (+ a a))) (list a b))").unwrap();
        // The default sees the caller's bindings, not the activation's
        let err = run(&env, "(opt 1)").unwrap_err();
        assert!(matches!(
            err,
            Signal::Error(EvalError::UnboundSymbol(name)) if name == "a"
        ));
        run(&env, "(defsym a 20)").unwrap();
        assert_eq!(printed(&env, "(opt 1)"), "(1 40)");
    }

    #[test]
    fn test_lexical_capture() {
        let env = setup();
        assert_eq!(
            printed(
                &env,
                "(progn (defsym x 10) (defun f () x) (let ((x 20)) (f)))"
            ),
            "10"
        );
    }

    #[test]
    fn test_function_args_evaluated_left_to_right() {
        let env = setup();
        run(&env, "(defsym trace ())").unwrap();
        run(&env, "(defun note (n) (progn (append n trace) n))").unwrap();
        run(&env, "(defun pair (a b) (list a b))").unwrap();
        run(&env, "(pair (note 1) (note 2))").unwrap();
        assert_eq!(printed(&env, "trace"), "(1 2)");
    }

    #[test]
    fn test_macro_receives_arguments_unevaluated() {
        let env = setup();
        run(&env, "(defmacro quoted (x) `(quote ,x))").unwrap();
        assert_eq!(printed(&env, "(quoted (+ 1 2))"), "(+ 1 2)");
    }

    #[test]
    fn test_macro_expand_then_eval() {
        let env = setup();
        run(
            &env,
            "(defmacro my-when (c &rest body) `(if ,c (progn ,@body) ()))",
        )
        .unwrap();
        assert_eq!(printed(&env, "(my-when (= 1 1) 41 42)"), "42");
        assert_eq!(printed(&env, "(my-when (= 1 2) 41 42)"), "()");
    }

    #[test]
    fn test_macro_body_is_reusable() {
        let env = setup();
        run(&env, "(defmacro twice (x) `(+ ,x ,x))").unwrap();
        assert_eq!(printed(&env, "(twice 3)"), "6");
        assert_eq!(printed(&env, "(twice 4)"), "8");
        assert_eq!(printed(&env, "(twice 3)"), "6");
    }

    #[test]
    fn test_return_unwinds_to_function_boundary() {
        let env = setup();
        run(
            &env,
            "(defun find-big (xs) (progn (for-each (x xs) (if (> x 10) (return x) ())) false))",
        )
        .unwrap();
        assert_eq!(printed(&env, "(find-big (list 1 20 3))"), "20");
        assert_eq!(printed(&env, "(find-big (list 1 2 3))"), "false");
    }

    #[test]
    fn test_stray_return_is_an_error() {
        let env = setup();
        let err = run(&env, "(return 1)").unwrap_err();
        assert!(matches!(&err, Signal::Return(_)));
        assert!(matches!(err.into_error(), EvalError::StrayReturn));
    }

    #[test]
    fn test_bad_param_list_at_definition_time() {
        let env = setup();
        let err = run(&env, "(defun broken (a 1) a)").unwrap_err();
        assert!(matches!(err, Signal::Error(EvalError::BadParamList { .. })));

        let err = run(&env, "(defun broken (&rest) ())").unwrap_err();
        assert!(matches!(err, Signal::Error(EvalError::BadParamList { .. })));

        let err = run(&env, "(defun broken (&rest a b) ())").unwrap_err();
        assert!(matches!(err, Signal::Error(EvalError::BadParamList { .. })));

        let err = run(&env, "(defmacro broken (&opt (a 1 2)) ())").unwrap_err();
        assert!(matches!(err, Signal::Error(EvalError::BadParamList { .. })));
    }

    #[test]
    fn test_recursion() {
        let env = setup();
        run(
            &env,
            "(defun fact (n) (if (<= n 1) 1 (* n (fact (- n 1)))))",
        )
        .unwrap();
        assert_eq!(printed(&env, "(fact 5)"), "120");
    }
}
