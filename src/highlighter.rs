// ABOUTME: rustyline helper: bracket-aware validation and highlighting for the REPL

use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline_derive::{Completer, Helper, Hinter};
use std::borrow::Cow;

const COLOR_RESET: &str = "\x1b[0m";
const COLOR_PARENS: &str = "\x1b[1;34m"; // bold blue
const COLOR_RESULT: &str = "\x1b[32m"; // green

#[derive(Completer, Helper, Hinter, Default)]
pub struct LispHelper;

impl LispHelper {
    pub fn new() -> Self {
        LispHelper
    }

    /// Wrap an evaluation result for display in the REPL.
    pub fn highlight_output(text: &str) -> String {
        format!("{}{}{}", COLOR_RESULT, text, COLOR_RESET)
    }
}

/// Paren balance of `line`, ignoring brackets inside strings and comments.
/// Negative means an unmatched `)` appeared.
fn bracket_balance(line: &str) -> i32 {
    let mut depth = 0;
    let mut in_string = false;
    let mut escaped = false;
    let mut in_comment = false;

    for c in line.chars() {
        if in_comment {
            if c == '\n' {
                in_comment = false;
            }
            continue;
        }
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            ';' => in_comment = true,
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
    }
    if in_string {
        // An open string keeps the form incomplete regardless of parens
        return i32::MAX;
    }
    depth
}

impl Validator for LispHelper {
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        let balance = bracket_balance(ctx.input());
        if balance > 0 {
            Ok(ValidationResult::Incomplete)
        } else {
            Ok(ValidationResult::Valid(None))
        }
    }
}

impl Highlighter for LispHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if !line.contains('(') && !line.contains(')') {
            return Cow::Borrowed(line);
        }
        let mut out = String::with_capacity(line.len());
        let mut in_string = false;
        let mut escaped = false;
        for c in line.chars() {
            if in_string {
                out.push(c);
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '"' {
                    in_string = false;
                }
                continue;
            }
            match c {
                '"' => {
                    in_string = true;
                    out.push(c);
                }
                '(' | ')' => {
                    out.push_str(COLOR_PARENS);
                    out.push(c);
                    out.push_str(COLOR_RESET);
                }
                _ => out.push(c),
            }
        }
        Cow::Owned(out)
    }

    fn highlight_char(&self, line: &str, _pos: usize, _kind: CmdKind) -> bool {
        line.contains('(') || line.contains(')')
    }
}
