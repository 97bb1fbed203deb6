// ABOUTME: Version, banner, and REPL constants

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const WELCOME_MESSAGE: &str = "rustic-lisp";
pub const WELCOME_SUBTITLE: &str = "A small Lisp with unhygienic macros and quasiquotation";
pub const WELCOME_FOOTER: &str = "Type (help) for the primitive index, (quit) to leave.";

pub const PROMPT: &str = "lisp> ";
pub const HISTORY_FILE: &str = ".rustic_lisp_history";
