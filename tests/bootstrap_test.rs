// ABOUTME: Tests for the in-language bootstrap library

use rustic_lisp::builtins::register_builtins;
use rustic_lisp::env::Environment;
use rustic_lisp::eval::eval_top_level;
use rustic_lisp::parser::read_source;
use rustic_lisp::value::Expr;
use std::rc::Rc;

fn setup() -> Rc<Environment> {
    let env = Environment::new();
    register_builtins(&env);
    let bootstrap = include_str!("../src/bootstrap.lisp");
    for form in read_source(bootstrap, "bootstrap.lisp").expect("bootstrap must read") {
        eval_top_level(&form, &env).expect("bootstrap must evaluate");
    }
    env
}

fn run(env: &Rc<Environment>, source: &str) -> String {
    let mut result = Expr::nil();
    for form in read_source(source, "test").expect("source must read") {
        result = eval_top_level(&form, env)
            .unwrap_or_else(|e| panic!("evaluation failed on `{}`: {}", form, e));
    }
    format!("{}", result)
}

#[test]
fn test_when_and_unless() {
    let env = setup();
    assert_eq!(run(&env, "(when true 1 2)"), "2");
    assert_eq!(run(&env, "(when false 1 2)"), "()");
    assert_eq!(run(&env, "(unless false 'ran)"), "ran");
    assert_eq!(run(&env, "(unless true 'ran)"), "()");
}

#[test]
fn test_when_body_not_evaluated_on_false() {
    let env = setup();
    assert_eq!(
        run(&env, "(progn (defsym n 0) (when false (set n 1)) n)"),
        "0"
    );
}

#[test]
fn test_positional_accessors() {
    let env = setup();
    assert_eq!(run(&env, "(second '(1 2 3))"), "2");
    assert_eq!(run(&env, "(third '(1 2 3))"), "3");
}

#[test]
fn test_numeric_helpers() {
    let env = setup();
    assert_eq!(run(&env, "(inc 41)"), "42");
    assert_eq!(run(&env, "(dec 43)"), "42");
    assert_eq!(run(&env, "(min 2 5)"), "2");
    assert_eq!(run(&env, "(max 2 5)"), "5");
}

#[test]
fn test_list_helpers() {
    let env = setup();
    assert_eq!(run(&env, "(sum (list 1 2 3 4))"), "10");
    assert_eq!(run(&env, "(sum ())"), "0");
    assert_eq!(run(&env, "(reverse (list 1 2 3))"), "(3 2 1)");
    assert_eq!(run(&env, "(reverse ())"), "()");
}

#[test]
fn test_bootstrap_macros_expand_as_data() {
    let env = setup();
    assert_eq!(
        run(&env, "(expand when true 1)"),
        "(if true (progn 1) ())"
    );
}
