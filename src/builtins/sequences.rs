//! Sequence primitives: `list`, `first`, `last`, `nth`, `pop`, `push`,
//! `append`, `length`, `empty?`, `~`.
//!
//! `first`, `last`, and `nth` double as the accessors of generalised `set`;
//! their place-locating halves live here so reading and assignment agree on
//! which cell a place names. `nth` is 1-based. On strings the accessors
//! yield single-character strings.
//!
//! `list` and `push` build fresh cells around shared elements; `pop` shares
//! the tail of its argument; `append` is the one mutator, filling the
//! terminal cell of its second argument.

use crate::env::Environment;
use crate::error::{EvalError, EvalResult, Signal};
use crate::value::{Expr, List, ListBuilder};
use std::cell::RefCell;
use std::rc::Rc;

use super::{boolean, create_builtin, eval_all, eval_exact_args};

/// A located assignment target: either a list cell whose head is replaced, or
/// one character of a string.
pub(crate) enum Place {
    Cell(List),
    Char(Rc<RefCell<String>>, usize),
}

impl Place {
    /// Read the value currently at the place. Empty cells and out-of-range
    /// characters read as the empty list and the empty string respectively.
    fn read(&self) -> Expr {
        match self {
            Place::Cell(cell) => cell.head().unwrap_or_else(Expr::nil),
            Place::Char(s, index) => {
                let s = s.borrow();
                match s.chars().nth(*index) {
                    Some(c) => Expr::string(c.to_string()),
                    None => Expr::string(""),
                }
            }
        }
    }
}

/// Locate the place `(first seq)` names. `args` is the accessor's argument
/// list, unevaluated.
pub(crate) fn locate_first(args: &List, env: &Rc<Environment>) -> Result<Place, Signal> {
    let values = eval_exact_args("first", args, 1, env)?;
    match &values[0] {
        Expr::List(list) => Ok(Place::Cell(list.clone())),
        Expr::Str(s) => Ok(Place::Char(s.clone(), 0)),
        other => Err(EvalError::type_error("first", "a list or string", other).into()),
    }
}

pub(crate) fn locate_last(args: &List, env: &Rc<Environment>) -> Result<Place, Signal> {
    let values = eval_exact_args("last", args, 1, env)?;
    match &values[0] {
        Expr::List(list) => Ok(Place::Cell(list.last_cell())),
        Expr::Str(s) => {
            let len = s.borrow().chars().count();
            Ok(Place::Char(s.clone(), len.saturating_sub(1)))
        }
        other => Err(EvalError::type_error("last", "a list or string", other).into()),
    }
}

pub(crate) fn locate_nth(args: &List, env: &Rc<Environment>) -> Result<Place, Signal> {
    let values = eval_exact_args("nth", args, 2, env)?;
    let n = match &values[0] {
        Expr::Int(i) => *i,
        other => return Err(EvalError::type_error("nth", "an integer", other).into()),
    };
    match &values[1] {
        Expr::List(list) => Ok(Place::Cell(list.nth_cell(n))),
        Expr::Str(s) => {
            // 1-based like lists; clamped into range like the list cursor
            let len = s.borrow().chars().count() as i64;
            let index = (n - 1).clamp(0, (len - 1).max(0));
            Ok(Place::Char(s.clone(), index as usize))
        }
        other => Err(EvalError::type_error("nth", "a list or string", other).into()),
    }
}

pub fn builtin_list(args: &List, env: &Rc<Environment>) -> EvalResult {
    let mut builder = ListBuilder::new();
    for value in eval_all(args, env)? {
        builder.push(value);
    }
    Ok(Expr::List(builder.finish()))
}

pub fn builtin_first(args: &List, env: &Rc<Environment>) -> EvalResult {
    Ok(locate_first(args, env)?.read())
}

pub fn builtin_last(args: &List, env: &Rc<Environment>) -> EvalResult {
    Ok(locate_last(args, env)?.read())
}

pub fn builtin_nth(args: &List, env: &Rc<Environment>) -> EvalResult {
    Ok(locate_nth(args, env)?.read())
}

pub fn builtin_pop(args: &List, env: &Rc<Environment>) -> EvalResult {
    let values = eval_exact_args("pop", args, 1, env)?;
    match &values[0] {
        Expr::List(list) => Ok(Expr::List(list.tail())),
        other => Err(EvalError::type_error("pop", "a list", other).into()),
    }
}

pub fn builtin_push(args: &List, env: &Rc<Environment>) -> EvalResult {
    let values = eval_exact_args("push", args, 2, env)?;
    let tail = match &values[1] {
        Expr::List(list) => list.clone(),
        other => return Err(EvalError::type_error("push", "a list", other).into()),
    };
    Ok(Expr::List(List::cons(values[0].clone(), tail)))
}

pub fn builtin_append(args: &List, env: &Rc<Environment>) -> EvalResult {
    let values = eval_exact_args("append", args, 2, env)?;
    let list = match &values[1] {
        Expr::List(list) => list.clone(),
        other => return Err(EvalError::type_error("append", "a list", other).into()),
    };
    list.push_tail(values[0].clone());
    Ok(Expr::List(list))
}

pub fn builtin_length(args: &List, env: &Rc<Environment>) -> EvalResult {
    let values = eval_exact_args("length", args, 1, env)?;
    match &values[0] {
        Expr::List(list) => Ok(Expr::Int(list.len() as i64)),
        other => Err(EvalError::type_error("length", "a list", other).into()),
    }
}

pub fn builtin_empty_q(args: &List, env: &Rc<Environment>) -> EvalResult {
    let values = eval_exact_args("empty?", args, 1, env)?;
    match &values[0] {
        Expr::List(list) => boolean(list.is_empty()),
        _ => boolean(false),
    }
}

/// Concatenate the printed forms of the arguments; strings contribute their
/// content verbatim.
pub fn builtin_concat(args: &List, env: &Rc<Environment>) -> EvalResult {
    let mut out = String::new();
    for value in eval_all(args, env)? {
        out.push_str(&value.to_string());
    }
    Ok(Expr::string(out))
}

pub fn register(env: &Rc<Environment>) {
    create_builtin(env, "list", builtin_list);
    create_builtin(env, "first", builtin_first);
    create_builtin(env, "last", builtin_last);
    create_builtin(env, "nth", builtin_nth);
    create_builtin(env, "pop", builtin_pop);
    create_builtin(env, "push", builtin_push);
    create_builtin(env, "append", builtin_append);
    create_builtin(env, "length", builtin_length);
    create_builtin(env, "empty?", builtin_empty_q);
    create_builtin(env, "~", builtin_concat);

    crate::help_entry!(
        "list",
        "Sequences",
        "(list expr ...)",
        "Evaluates the arguments and returns them as a fresh list.",
        ["(list 1 2 3) => (1 2 3)", "(list) => ()"]
    );
    crate::help_entry!(
        "first",
        "Sequences",
        "(first seq)",
        "First element of a list, or the first character of a string. Usable as a set place.",
        ["(first '(1 2 3)) => 1", "(first \"abc\") => a"]
    );
    crate::help_entry!(
        "last",
        "Sequences",
        "(last seq)",
        "Last element of a list, or the last character of a string. Usable as a set place.",
        ["(last '(1 2 3)) => 3"]
    );
    crate::help_entry!(
        "nth",
        "Sequences",
        "(nth n seq)",
        "1-based element access on lists and strings. Usable as a set place.",
        ["(nth 2 '(a b c)) => b", "(nth 2 \"abc\") => b"]
    );
    crate::help_entry!(
        "pop",
        "Sequences",
        "(pop list)",
        "The list after its first element; shares structure with the argument.",
        ["(pop '(1 2 3)) => (2 3)"]
    );
    crate::help_entry!(
        "push",
        "Sequences",
        "(push x list)",
        "Prepends x; the result shares the argument as its tail.",
        ["(push 1 '(2 3)) => (1 2 3)"]
    );
    crate::help_entry!(
        "append",
        "Sequences",
        "(append x list)",
        "Appends x by mutating the terminal cell of list; returns the list.",
        ["(append 3 (list 1 2)) => (1 2 3)"]
    );
    crate::help_entry!(
        "length",
        "Sequences",
        "(length list)",
        "Number of elements.",
        ["(length '(1 2 3)) => 3", "(length ()) => 0"]
    );
    crate::help_entry!(
        "empty?",
        "Sequences",
        "(empty? expr)",
        "True for the empty list; false for anything else.",
        ["(empty? ()) => true", "(empty? '(1)) => false"]
    );
    crate::help_entry!(
        "~",
        "Sequences",
        "(~ expr ...)",
        "Concatenates the printed forms of the arguments into a string.",
        ["(~ \"n = \" 42) => n = 42"]
    );
}
