// ABOUTME: Expression values shared by the reader, the evaluator, and the primitives

use crate::env::Environment;
use crate::error::EvalResult;
use std::cell::RefCell;
use std::fmt;
use std::mem;
use std::rc::Rc;

/// Signature of a native primitive. Primitives receive the unevaluated tail of
/// the call list and decide themselves which arguments to evaluate.
pub type BuiltinFn = fn(&List, &Rc<Environment>) -> EvalResult;

/// The single value type exchanged between reader, evaluator, and primitives.
/// Syntax and runtime data share this representation; that is what makes
/// macros and `quote` work.
#[derive(Debug, Clone)]
pub enum Expr {
    List(List),
    Symbol(Rc<str>),
    /// A symbol whose name starts with `:`. Self-evaluating and read-only.
    /// The stored name includes the colon.
    Keyword(Rc<str>),
    Int(i64),
    Float(f64),
    /// Strings are shared and mutable in place: generalised `set` can replace
    /// a single character through any handle.
    Str(Rc<RefCell<String>>),
    Bool(bool),
    Builtin(Builtin),
    Function(Rc<Function>),
    Macro(Rc<Macro>),
    Quote(Rc<Expr>),
    Backtick(Rc<Expr>),
    Comma(Rc<Expr>),
    CommaAt(Rc<Expr>),
    /// Sentinel returned to the host after a failed top-level evaluation.
    Error,
}

/// A user-defined function. The parameter list and body are the subtrees the
/// reader produced; `env` is the defining environment (lexical capture).
#[derive(Debug)]
pub struct Function {
    pub name: Rc<str>,
    pub params: List,
    pub body: List,
    pub env: Rc<Environment>,
}

/// A macro definition. The body is stored unevaluated and every expansion
/// walks the same stored subtree.
#[derive(Debug)]
pub struct Macro {
    pub name: Rc<str>,
    pub params: List,
    pub body: List,
}

/// A native primitive bound in the base environment.
#[derive(Debug, Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

impl Expr {
    /// Build a string value.
    pub fn string(s: impl Into<String>) -> Expr {
        Expr::Str(Rc::new(RefCell::new(s.into())))
    }

    /// Build a symbol, classifying `:name` identifiers as keywords.
    pub fn symbol(name: &str) -> Expr {
        if name.starts_with(':') {
            Expr::Keyword(Rc::from(name))
        } else {
            Expr::Symbol(Rc::from(name))
        }
    }

    /// The empty list.
    pub fn nil() -> Expr {
        Expr::List(List::new())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Expr::List(_) => "list",
            Expr::Symbol(_) | Expr::Keyword(_) => "symbol",
            Expr::Int(_) => "integer",
            Expr::Float(_) => "float",
            Expr::Str(_) => "string",
            Expr::Bool(_) => "boolean",
            Expr::Builtin(_) | Expr::Function(_) | Expr::Macro(_) => "function",
            Expr::Quote(_) | Expr::Backtick(_) | Expr::Comma(_) | Expr::CommaAt(_) => "syntax",
            Expr::Error => "error",
        }
    }

    /// Everything is true except the boolean false itself.
    pub fn truth(&self) -> bool {
        !matches!(self, Expr::Bool(false))
    }

    /// Same kind and subkind: `type=` equality. Variant identity is exactly
    /// the (kind, subkind) pair of the data model.
    pub fn same_kind(&self, other: &Expr) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::List(list) => write!(f, "{}", list),
            Expr::Symbol(name) | Expr::Keyword(name) => write!(f, "{}", name),
            Expr::Int(i) => write!(f, "{}", i),
            // Fixed six decimal places, so floats never print like integers
            Expr::Float(x) => write!(f, "{:.6}", x),
            Expr::Str(s) => write!(f, "{}", s.borrow()),
            Expr::Bool(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Expr::Builtin(b) => write!(f, "#'{}", b.name),
            Expr::Function(fun) => write!(f, "#'{}", fun.name),
            Expr::Macro(m) => write!(f, "#'{}", m.name),
            Expr::Quote(inner) => write!(f, "'{}", inner),
            Expr::Backtick(inner) => write!(f, "`{}", inner),
            Expr::Comma(inner) => write!(f, ",{}", inner),
            Expr::CommaAt(inner) => write!(f, ",@{}", inner),
            Expr::Error => write!(f, "#<error>"),
        }
    }
}

/// A nil-terminated cons chain. Every cell holds an optional head and a
/// reference to the rest; the terminal cell has neither. Handles share cells,
/// so mutation through one handle (`append`, generalised `set`) is visible
/// through every other.
#[derive(Debug, Clone, Default)]
pub struct List {
    cell: Rc<RefCell<Cons>>,
}

#[derive(Debug, Default)]
struct Cons {
    head: Option<Expr>,
    rest: Option<List>,
}

impl List {
    /// A fresh empty list.
    pub fn new() -> List {
        List::default()
    }

    /// Prepend `head` to `tail`. The tail is shared, not copied.
    pub fn cons(head: Expr, tail: List) -> List {
        List {
            cell: Rc::new(RefCell::new(Cons {
                head: Some(head),
                rest: Some(tail),
            })),
        }
    }

    pub fn from_vec(items: Vec<Expr>) -> List {
        let mut builder = ListBuilder::new();
        for item in items {
            builder.push(item);
        }
        builder.finish()
    }

    pub fn is_empty(&self) -> bool {
        self.cell.borrow().head.is_none()
    }

    /// Number of non-empty cells.
    pub fn len(&self) -> usize {
        let mut len = 0;
        let mut cur = self.clone();
        while let Some(rest) = cur.rest() {
            len += 1;
            cur = rest;
        }
        len
    }

    pub fn head(&self) -> Option<Expr> {
        self.cell.borrow().head.clone()
    }

    fn rest(&self) -> Option<List> {
        let cell = self.cell.borrow();
        if cell.head.is_none() {
            return None;
        }
        cell.rest.clone()
    }

    /// The list after the first element. The tail of the empty list is the
    /// empty list itself, sharing the same cell.
    pub fn tail(&self) -> List {
        self.rest().unwrap_or_else(|| self.clone())
    }

    /// Replace the head of this cell. Filling the terminal cell extends the
    /// chain with a fresh terminal.
    pub fn set_head(&self, value: Expr) {
        let mut cell = self.cell.borrow_mut();
        if cell.rest.is_none() {
            cell.rest = Some(List::new());
        }
        cell.head = Some(value);
    }

    /// Fill the terminal cell of this list with `value`. This is the mutating
    /// tail write that `append` exposes to programs.
    pub fn push_tail(&self, value: Expr) {
        let mut cur = self.clone();
        while let Some(rest) = cur.rest() {
            cur = rest;
        }
        cur.set_head(value);
    }

    /// Last non-empty cell, or the terminal cell when the list is empty.
    pub fn last_cell(&self) -> List {
        let mut cur = self.clone();
        while let Some(rest) = cur.rest() {
            if rest.is_empty() {
                break;
            }
            cur = rest;
        }
        cur
    }

    /// The cell holding the 1-based `n`th element. Indexes below one locate
    /// the first cell; indexes past the end locate the terminal cell.
    pub fn nth_cell(&self, n: i64) -> List {
        let mut cur = self.clone();
        let mut i = 1;
        while i < n {
            match cur.rest() {
                Some(rest) => cur = rest,
                None => break,
            }
            i += 1;
        }
        cur
    }

    pub fn iter(&self) -> Iter {
        Iter { cur: self.clone() }
    }
}

impl fmt::Display for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, item) in self.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", item)?;
        }
        write!(f, ")")
    }
}

pub struct Iter {
    cur: List,
}

impl Iterator for Iter {
    type Item = Expr;

    fn next(&mut self) -> Option<Expr> {
        let head = self.cur.head()?;
        self.cur = self.cur.tail();
        Some(head)
    }
}

/// Builds a fresh list front to back by filling the terminal cell, the way
/// the reader and the list-producing primitives do.
pub struct ListBuilder {
    list: List,
    tail: List,
}

impl ListBuilder {
    pub fn new() -> ListBuilder {
        let list = List::new();
        ListBuilder {
            tail: list.clone(),
            list,
        }
    }

    pub fn push(&mut self, value: Expr) {
        self.tail.set_head(value);
        self.tail = self.tail.tail();
    }

    pub fn finish(self) -> List {
        self.list
    }
}

impl Default for ListBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> List {
        List::from_vec(values.iter().map(|i| Expr::Int(*i)).collect())
    }

    #[test]
    fn test_int_and_float_display() {
        assert_eq!(format!("{}", Expr::Int(42)), "42");
        assert_eq!(format!("{}", Expr::Float(6.0)), "6.000000");
        assert_eq!(format!("{}", Expr::Float(-2.5)), "-2.500000");
    }

    #[test]
    fn test_bool_and_string_display() {
        assert_eq!(format!("{}", Expr::Bool(true)), "true");
        assert_eq!(format!("{}", Expr::Bool(false)), "false");
        // Strings print verbatim, without surrounding quotes
        assert_eq!(format!("{}", Expr::string("hello")), "hello");
    }

    #[test]
    fn test_list_display() {
        assert_eq!(format!("{}", Expr::nil()), "()");
        assert_eq!(format!("{}", Expr::List(ints(&[1, 2, 3]))), "(1 2 3)");

        let nested = List::from_vec(vec![
            Expr::Int(1),
            Expr::List(ints(&[2, 3])),
            Expr::Int(4),
        ]);
        assert_eq!(format!("{}", Expr::List(nested)), "(1 (2 3) 4)");
    }

    #[test]
    fn test_syntax_display() {
        let quoted = Expr::Quote(Rc::new(Expr::symbol("x")));
        assert_eq!(format!("{}", quoted), "'x");

        let spliced = Expr::CommaAt(Rc::new(Expr::symbol("xs")));
        assert_eq!(format!("{}", spliced), ",@xs");
    }

    #[test]
    fn test_length_counts_non_empty_cells() {
        assert_eq!(List::new().len(), 0);
        assert_eq!(ints(&[1]).len(), 1);
        assert_eq!(ints(&[1, 2, 3]).len(), 3);
    }

    #[test]
    fn test_tail_of_empty_is_itself() {
        let empty = List::new();
        assert!(empty.tail().is_empty());
        assert_eq!(empty.tail().len(), 0);
    }

    #[test]
    fn test_push_tail_is_visible_through_shared_handle() {
        let xs = ints(&[1, 2]);
        let alias = xs.clone();
        xs.push_tail(Expr::Int(3));
        assert_eq!(format!("{}", alias), "(1 2 3)");
    }

    #[test]
    fn test_set_head_through_nth_cell() {
        let xs = ints(&[1, 2, 3]);
        xs.nth_cell(2).set_head(Expr::Int(9));
        assert_eq!(format!("{}", xs), "(1 9 3)");
        // Past-the-end indexes land on the terminal cell and extend the chain
        xs.nth_cell(10).set_head(Expr::Int(4));
        assert_eq!(format!("{}", xs), "(1 9 3 4)");
    }

    #[test]
    fn test_cons_shares_tail() {
        let tail = ints(&[2, 3]);
        let xs = List::cons(Expr::Int(1), tail.clone());
        assert_eq!(format!("{}", xs), "(1 2 3)");
        tail.nth_cell(1).set_head(Expr::Int(9));
        assert_eq!(format!("{}", xs), "(1 9 3)");
    }

    #[test]
    fn test_same_kind_distinguishes_subkinds() {
        assert!(Expr::Int(1).same_kind(&Expr::Int(2)));
        assert!(!Expr::Int(1).same_kind(&Expr::Float(1.0)));
        assert!(!Expr::symbol("a").same_kind(&Expr::symbol(":a")));
        assert!(Expr::nil().same_kind(&Expr::List(ints(&[1]))));
    }
}
