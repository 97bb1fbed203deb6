// ABOUTME: Reader and evaluator error types, and the non-local control-flow signal

use crate::lexer::Position;
use crate::value::Expr;
use thiserror::Error;

/// Errors raised while turning source text into expressions. These are fatal
/// to the read in progress and carry the position of the offending token.
#[derive(Error, Debug, Clone)]
pub enum ReadError {
    #[error("{file}:{line}:{column}: unterminated string literal")]
    UnterminatedString { file: String, line: u32, column: u32 },

    #[error("{file}:{line}:{column}: malformed number `{text}`")]
    MalformedNumber {
        file: String,
        line: u32,
        column: u32,
        text: String,
    },

    #[error("{file}:{line}:{column}: unexpected `)`")]
    UnexpectedClose { file: String, line: u32, column: u32 },

    #[error("{file}:{line}:{column}: unmatched `(`")]
    UnmatchedOpen { file: String, line: u32, column: u32 },

    #[error("{file}:{line}:{column}: expected a form after `{abbrev}`")]
    DanglingAbbreviation {
        abbrev: &'static str,
        file: String,
        line: u32,
        column: u32,
    },
}

impl ReadError {
    pub fn unterminated_string(file: &str, at: Position) -> Self {
        ReadError::UnterminatedString {
            file: file.to_string(),
            line: at.line,
            column: at.column,
        }
    }

    pub fn malformed_number(file: &str, at: Position, text: &str) -> Self {
        ReadError::MalformedNumber {
            file: file.to_string(),
            line: at.line,
            column: at.column,
            text: text.to_string(),
        }
    }

    pub fn unexpected_close(file: &str, at: Position) -> Self {
        ReadError::UnexpectedClose {
            file: file.to_string(),
            line: at.line,
            column: at.column,
        }
    }

    pub fn unmatched_open(file: &str, at: Position) -> Self {
        ReadError::UnmatchedOpen {
            file: file.to_string(),
            line: at.line,
            column: at.column,
        }
    }

    pub fn dangling_abbreviation(file: &str, at: Position, abbrev: &'static str) -> Self {
        ReadError::DanglingAbbreviation {
            abbrev,
            file: file.to_string(),
            line: at.line,
            column: at.column,
        }
    }
}

/// Errors raised during evaluation. These unwind the current top-level
/// evaluation and surface to the host as an error value.
#[derive(Error, Debug, Clone)]
pub enum EvalError {
    #[error("unbound symbol `{0}`")]
    UnboundSymbol(String),

    #[error("`{0}` is not callable")]
    NotCallable(String),

    #[error("{function}: expected {expected}, got {actual}")]
    TypeMismatch {
        function: String,
        expected: &'static str,
        actual: String,
    },

    #[error("{function}: expected {expected} argument{}, got {actual}", if *.expected == "1" { "" } else { "s" })]
    ArityMismatch {
        function: String,
        expected: String,
        actual: usize,
    },

    #[error("{function}: bad parameter list: {message}")]
    BadParamList { function: String, message: String },

    #[error("`{0}` is only valid inside a backtick form")]
    IllegalSyntaxPosition(&'static str),

    #[error("keyword `{0}` cannot be rebound")]
    ReadOnly(String),

    #[error("return reached the top level without an enclosing function")]
    StrayReturn,

    #[error("{function}: {message}")]
    Runtime { function: String, message: String },
}

impl EvalError {
    /// A type mismatch, naming the primitive and describing the offending value.
    pub fn type_error(function: &str, expected: &'static str, actual: &Expr) -> Self {
        EvalError::TypeMismatch {
            function: function.to_string(),
            expected,
            actual: format!("{} `{}`", actual.type_name(), actual),
        }
    }

    /// An arity mismatch; `expected` reads like "2", "1-2", or "1 or more".
    pub fn arity(function: &str, expected: impl Into<String>, actual: usize) -> Self {
        EvalError::ArityMismatch {
            function: function.to_string(),
            expected: expected.into(),
            actual,
        }
    }

    pub fn runtime(function: &str, message: impl Into<String>) -> Self {
        EvalError::Runtime {
            function: function.to_string(),
            message: message.into(),
        }
    }

    pub fn bad_params(function: &str, message: impl Into<String>) -> Self {
        EvalError::BadParamList {
            function: function.to_string(),
            message: message.into(),
        }
    }
}

/// What unwinds out of an evaluation: either an error, or the non-local
/// `return` signal carrying its payload. `Return` is not an error; it is
/// caught at the nearest user-function activation and delivered as that
/// call's result.
#[derive(Debug, Clone)]
pub enum Signal {
    Error(EvalError),
    Return(Expr),
}

impl Signal {
    /// Collapse into an error for the host. A `Return` that reaches the host
    /// escaped every function activation, which is itself an error.
    pub fn into_error(self) -> EvalError {
        match self {
            Signal::Error(e) => e,
            Signal::Return(_) => EvalError::StrayReturn,
        }
    }
}

impl From<EvalError> for Signal {
    fn from(e: EvalError) -> Self {
        Signal::Error(e)
    }
}

pub type EvalResult = Result<Expr, Signal>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_message_pluralizes() {
        let one = EvalError::arity("not", "1", 3);
        assert_eq!(format!("{}", one), "not: expected 1 argument, got 3");

        let two = EvalError::arity("push", "2", 1);
        assert_eq!(format!("{}", two), "push: expected 2 arguments, got 1");
    }

    #[test]
    fn test_type_error_names_value() {
        let err = EvalError::type_error("+", "a number", &Expr::string("hi"));
        assert_eq!(format!("{}", err), "+: expected a number, got string `hi`");
    }

    #[test]
    fn test_return_collapses_to_stray_return() {
        let sig = Signal::Return(Expr::Int(1));
        assert!(matches!(sig.into_error(), EvalError::StrayReturn));
    }

    #[test]
    fn test_read_error_carries_position() {
        let err = ReadError::unexpected_close("demo.lisp", Position { line: 3, column: 7 });
        assert_eq!(format!("{}", err), "demo.lisp:3:7: unexpected `)`");
    }
}
