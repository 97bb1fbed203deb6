//! Chained numeric comparisons: `=`, `<`, `<=`, `>`, `>=`.
//!
//! Each relation holds iff it holds pairwise between consecutive arguments.
//! Arguments are evaluated left to right and evaluation stops at the first
//! failing pair. Mixed integers and floats compare by value.

use crate::env::Environment;
use crate::error::{EvalError, EvalResult};
use crate::eval::eval;
use crate::value::List;
use std::cmp::Ordering;
use std::rc::Rc;

use super::math::{number, Num};
use super::{boolean, create_builtin};

fn compare(a: Num, b: Num) -> Option<Ordering> {
    match (a, b) {
        (Num::Int(a), Num::Int(b)) => Some(a.cmp(&b)),
        (a, b) => a.to_f64().partial_cmp(&b.to_f64()),
    }
}

/// Evaluate and compare consecutive arguments, short-circuiting on the first
/// pair that fails `holds`.
fn chained(
    function: &'static str,
    args: &List,
    env: &Rc<Environment>,
    holds: fn(Ordering) -> bool,
) -> EvalResult {
    let mut cur = args.clone();
    let first = match cur.head() {
        Some(expr) => expr,
        None => return Err(EvalError::arity(function, "1 or more", 0).into()),
    };
    let mut prev = number(function, &eval(&first, env)?)?;
    cur = cur.tail();

    while let Some(arg) = cur.head() {
        let next = number(function, &eval(&arg, env)?)?;
        let ordered = match compare(prev, next) {
            Some(ordering) => holds(ordering),
            None => false,
        };
        if !ordered {
            return boolean(false);
        }
        prev = next;
        cur = cur.tail();
    }
    boolean(true)
}

pub fn builtin_eq(args: &List, env: &Rc<Environment>) -> EvalResult {
    chained("=", args, env, |o| o == Ordering::Equal)
}

pub fn builtin_lt(args: &List, env: &Rc<Environment>) -> EvalResult {
    chained("<", args, env, |o| o == Ordering::Less)
}

pub fn builtin_le(args: &List, env: &Rc<Environment>) -> EvalResult {
    chained("<=", args, env, |o| o != Ordering::Greater)
}

pub fn builtin_gt(args: &List, env: &Rc<Environment>) -> EvalResult {
    chained(">", args, env, |o| o == Ordering::Greater)
}

pub fn builtin_ge(args: &List, env: &Rc<Environment>) -> EvalResult {
    chained(">=", args, env, |o| o != Ordering::Less)
}

pub fn register(env: &Rc<Environment>) {
    create_builtin(env, "=", builtin_eq);
    create_builtin(env, "<", builtin_lt);
    create_builtin(env, "<=", builtin_le);
    create_builtin(env, ">", builtin_gt);
    create_builtin(env, ">=", builtin_ge);

    crate::help_entry!(
        "=",
        "Comparison",
        "(= num ...)",
        "True iff consecutive arguments are numerically equal.",
        ["(= 1 1 1) => true", "(= 1 1.0) => true"]
    );
    crate::help_entry!(
        "<",
        "Comparison",
        "(< num ...)",
        "True iff the arguments strictly increase.",
        ["(< 1 2 3) => true", "(< 1 3 2) => false"]
    );
    crate::help_entry!(
        "<=",
        "Comparison",
        "(<= num ...)",
        "True iff the arguments never decrease.",
        ["(<= 1 1 2) => true"]
    );
    crate::help_entry!(
        ">",
        "Comparison",
        "(> num ...)",
        "True iff the arguments strictly decrease.",
        ["(> 3 2 1) => true"]
    );
    crate::help_entry!(
        ">=",
        "Comparison",
        "(>= num ...)",
        "True iff the arguments never increase.",
        ["(>= 2 2 1) => true"]
    );
}
