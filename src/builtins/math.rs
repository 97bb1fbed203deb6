//! Arithmetic and bit operations.
//!
//! `+` and `*` are n-ary and return an integer exactly when every argument is
//! an integer; one float promotes the whole result. `-` and `/` subtract and
//! divide left to right (negation and reciprocal with one argument). Integer
//! arithmetic wraps on overflow. The bit operations work on integers only;
//! the shifts default to one bit.

use crate::env::Environment;
use crate::error::{EvalError, EvalResult, Signal};
use crate::value::{Expr, List};
use std::rc::Rc;

use super::{create_builtin, eval_all, eval_at_least_args, eval_exact_args};

/// A number with its subkind intact, so promotion decisions happen at the
/// operation, not at extraction.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    pub(crate) fn to_f64(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Float(x) => x,
        }
    }

    pub(crate) fn expr(self) -> Expr {
        match self {
            Num::Int(i) => Expr::Int(i),
            Num::Float(x) => Expr::Float(x),
        }
    }

    fn add(self, other: Num) -> Num {
        match (self, other) {
            (Num::Int(a), Num::Int(b)) => Num::Int(a.wrapping_add(b)),
            (a, b) => Num::Float(a.to_f64() + b.to_f64()),
        }
    }

    fn sub(self, other: Num) -> Num {
        match (self, other) {
            (Num::Int(a), Num::Int(b)) => Num::Int(a.wrapping_sub(b)),
            (a, b) => Num::Float(a.to_f64() - b.to_f64()),
        }
    }

    fn mul(self, other: Num) -> Num {
        match (self, other) {
            (Num::Int(a), Num::Int(b)) => Num::Int(a.wrapping_mul(b)),
            (a, b) => Num::Float(a.to_f64() * b.to_f64()),
        }
    }
}

/// Extract a number or fail with a type error naming the primitive.
pub(crate) fn number(function: &str, value: &Expr) -> Result<Num, Signal> {
    match value {
        Expr::Int(i) => Ok(Num::Int(*i)),
        Expr::Float(x) => Ok(Num::Float(*x)),
        other => Err(EvalError::type_error(function, "a number", other).into()),
    }
}

fn integer(function: &str, value: &Expr) -> Result<i64, Signal> {
    match value {
        Expr::Int(i) => Ok(*i),
        other => Err(EvalError::type_error(function, "an integer", other).into()),
    }
}

pub fn builtin_add(args: &List, env: &Rc<Environment>) -> EvalResult {
    let mut acc = Num::Int(0);
    for value in eval_all(args, env)? {
        acc = acc.add(number("+", &value)?);
    }
    Ok(acc.expr())
}

pub fn builtin_mul(args: &List, env: &Rc<Environment>) -> EvalResult {
    let mut acc = Num::Int(1);
    for value in eval_all(args, env)? {
        acc = acc.mul(number("*", &value)?);
    }
    Ok(acc.expr())
}

pub fn builtin_sub(args: &List, env: &Rc<Environment>) -> EvalResult {
    let values = eval_at_least_args("-", args, 1, env)?;
    let first = number("-", &values[0])?;
    if values.len() == 1 {
        return Ok(Num::Int(0).sub(first).expr());
    }
    let mut acc = first;
    for value in &values[1..] {
        acc = acc.sub(number("-", value)?);
    }
    Ok(acc.expr())
}

pub fn builtin_div(args: &List, env: &Rc<Environment>) -> EvalResult {
    let values = eval_at_least_args("/", args, 1, env)?;
    let first = number("/", &values[0])?;
    if values.len() == 1 {
        if first.to_f64() == 0.0 {
            return Err(EvalError::runtime("/", "division by zero").into());
        }
        return Ok(Expr::Float(1.0 / first.to_f64()));
    }
    let mut acc = first;
    for value in &values[1..] {
        let divisor = number("/", value)?;
        if divisor.to_f64() == 0.0 {
            return Err(EvalError::runtime("/", "division by zero").into());
        }
        acc = match (acc, divisor) {
            (Num::Int(a), Num::Int(b)) => Num::Int(a.wrapping_div(b)),
            (a, b) => Num::Float(a.to_f64() / b.to_f64()),
        };
    }
    Ok(acc.expr())
}

pub fn builtin_mod(args: &List, env: &Rc<Environment>) -> EvalResult {
    let values = eval_exact_args("%", args, 2, env)?;
    let a = number("%", &values[0])?;
    let b = number("%", &values[1])?;
    if b.to_f64() == 0.0 {
        return Err(EvalError::runtime("%", "division by zero").into());
    }
    match (a, b) {
        (Num::Int(a), Num::Int(b)) => Ok(Expr::Int(a.wrapping_rem(b))),
        (a, b) => Ok(Expr::Float(a.to_f64() % b.to_f64())),
    }
}

fn bit_fold(
    function: &'static str,
    args: &List,
    env: &Rc<Environment>,
    op: fn(i64, i64) -> i64,
) -> EvalResult {
    let values = eval_at_least_args(function, args, 2, env)?;
    let mut acc = integer(function, &values[0])?;
    for value in &values[1..] {
        acc = op(acc, integer(function, value)?);
    }
    Ok(Expr::Int(acc))
}

pub fn builtin_bitand(args: &List, env: &Rc<Environment>) -> EvalResult {
    bit_fold("&", args, env, |a, b| a & b)
}

pub fn builtin_bitor(args: &List, env: &Rc<Environment>) -> EvalResult {
    bit_fold("|", args, env, |a, b| a | b)
}

pub fn builtin_bitxor(args: &List, env: &Rc<Environment>) -> EvalResult {
    bit_fold("^", args, env, |a, b| a ^ b)
}

pub fn builtin_bitnot(args: &List, env: &Rc<Environment>) -> EvalResult {
    let values = eval_exact_args("bit-not", args, 1, env)?;
    Ok(Expr::Int(!integer("bit-not", &values[0])?))
}

fn shift(
    function: &'static str,
    args: &List,
    env: &Rc<Environment>,
    op: fn(i64, u32) -> i64,
) -> EvalResult {
    let nargs = args.len();
    if nargs == 0 || nargs > 2 {
        return Err(EvalError::arity(function, "1-2", nargs).into());
    }
    let values = eval_all(args, env)?;
    let value = integer(function, &values[0])?;
    let count = if nargs == 1 {
        1
    } else {
        integer(function, &values[1])?
    };
    // Shift counts are taken modulo the width, as wrapping_shl/shr do
    Ok(Expr::Int(op(value, count as u32)))
}

pub fn builtin_shift_left(args: &List, env: &Rc<Environment>) -> EvalResult {
    shift("<<", args, env, i64::wrapping_shl)
}

pub fn builtin_shift_right(args: &List, env: &Rc<Environment>) -> EvalResult {
    shift(">>", args, env, i64::wrapping_shr)
}

pub fn register(env: &Rc<Environment>) {
    create_builtin(env, "+", builtin_add);
    create_builtin(env, "-", builtin_sub);
    create_builtin(env, "*", builtin_mul);
    create_builtin(env, "/", builtin_div);
    create_builtin(env, "%", builtin_mod);
    create_builtin(env, "&", builtin_bitand);
    create_builtin(env, "|", builtin_bitor);
    create_builtin(env, "^", builtin_bitxor);
    create_builtin(env, "bit-not", builtin_bitnot);
    create_builtin(env, "<<", builtin_shift_left);
    create_builtin(env, ">>", builtin_shift_right);

    crate::help_entry!(
        "+",
        "Arithmetic",
        "(+ num ...)",
        "Sum of the arguments; integer unless a float appears. Empty sum is 0.",
        ["(+ 1 2 3) => 6", "(+ 1 2.0) => 3.000000", "(+) => 0"]
    );
    crate::help_entry!(
        "-",
        "Arithmetic",
        "(- num ...)",
        "Subtracts the rest from the first; negates a single argument.",
        ["(- 10 3 2) => 5", "(- 5) => -5"]
    );
    crate::help_entry!(
        "*",
        "Arithmetic",
        "(* num ...)",
        "Product of the arguments; integer unless a float appears. Empty product is 1.",
        ["(* 2 3 4) => 24", "(*) => 1"]
    );
    crate::help_entry!(
        "/",
        "Arithmetic",
        "(/ num ...)",
        "Divides the first by the rest; reciprocal of a single argument. Division by zero is an error.",
        ["(/ 20 4) => 5", "(/ 2.0) => 0.500000"]
    );
    crate::help_entry!(
        "%",
        "Arithmetic",
        "(% a b)",
        "Remainder of a divided by b.",
        ["(% 17 5) => 2"]
    );
    crate::help_entry!(
        "&",
        "Bits",
        "(& int int ...)",
        "Bitwise and.",
        ["(& 12 10) => 8"]
    );
    crate::help_entry!(
        "|",
        "Bits",
        "(| int int ...)",
        "Bitwise or.",
        ["(| 12 10) => 14"]
    );
    crate::help_entry!(
        "^",
        "Bits",
        "(^ int int ...)",
        "Bitwise exclusive or.",
        ["(^ 12 10) => 6"]
    );
    crate::help_entry!(
        "bit-not",
        "Bits",
        "(bit-not int)",
        "Bitwise complement.",
        ["(bit-not 0) => -1"]
    );
    crate::help_entry!(
        "<<",
        "Bits",
        "(<< int [count])",
        "Shift left; one bit when no count is given.",
        ["(<< 1 4) => 16", "(<< 3) => 6"]
    );
    crate::help_entry!(
        ">>",
        "Bits",
        "(>> int [count])",
        "Arithmetic shift right; one bit when no count is given.",
        ["(>> 16 2) => 4", "(>> 7) => 3"]
    );
}
