// ABOUTME: CLI entry point: script runner and interactive REPL

mod builtins;
mod config;
mod env;
mod error;
mod eval;
mod help;
mod highlighter;
mod lexer;
mod parser;
mod value;

use builtins::register_builtins;
use clap::Parser as ClapParser;
use env::Environment;
use eval::eval_top_level;
use highlighter::LispHelper;
use parser::read_source;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;
use value::Expr;

/// Interpreter for a small Lisp with unhygienic macros
#[derive(ClapParser, Debug)]
#[command(name = "rustic-lisp")]
#[command(version = config::VERSION)]
#[command(about = "A tree-walking Lisp interpreter")]
struct CliArgs {
    /// Script file to execute (starts a REPL when omitted)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,

    /// Print each top-level form and its value while running a script
    #[arg(long = "echo")]
    echo: bool,

    /// Skip loading the bootstrap library
    #[arg(long = "no-bootstrap")]
    no_bootstrap: bool,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let env = Environment::new();
    register_builtins(&env);

    if !args.no_bootstrap {
        let bootstrap = include_str!("bootstrap.lisp");
        if let Err(message) = run_forms(bootstrap, "bootstrap.lisp", &env, false) {
            eprintln!("warning: failed to load bootstrap library: {}", message);
        }
    }

    match args.script {
        Some(path) => run_script(&path, &env, args.echo),
        None => run_repl(&env),
    }
}

/// Parse `source` up front and evaluate each form in order. A reader error is
/// fatal and returned as a message; an evaluator error surfaces as the error
/// sentinel and evaluation continues with the next form. Returns whether
/// every form evaluated cleanly.
fn run_forms(
    source: &str,
    filename: &str,
    env: &Rc<Environment>,
    echo: bool,
) -> Result<bool, String> {
    let forms = read_source(source, filename).map_err(|e| e.to_string())?;
    let mut clean = true;
    for form in forms {
        if echo {
            println!("> {}", form);
        }
        let value = match eval_top_level(&form, env) {
            Ok(value) => value,
            Err(e) => {
                eprintln!("error: {}", e);
                clean = false;
                Expr::Error
            }
        };
        if echo {
            println!("{}", LispHelper::highlight_output(&value.to_string()));
        }
    }
    Ok(clean)
}

fn run_script(path: &PathBuf, env: &Rc<Environment>, echo: bool) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: cannot read {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    };
    match run_forms(&source, &path.display().to_string(), env, echo) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(message) => {
            eprintln!("error: {}", message);
            ExitCode::FAILURE
        }
    }
}

fn run_repl(env: &Rc<Environment>) -> ExitCode {
    let editor_config = Config::builder().auto_add_history(true).build();
    let mut editor: Editor<LispHelper, DefaultHistory> = match Editor::with_config(editor_config) {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("error: failed to initialize the REPL: {}", e);
            return ExitCode::FAILURE;
        }
    };
    editor.set_helper(Some(LispHelper::new()));
    let _ = editor.load_history(config::HISTORY_FILE);

    println!("{} v{}", config::WELCOME_MESSAGE, config::VERSION);
    println!("{}", config::WELCOME_SUBTITLE);
    println!("{}", config::WELCOME_FOOTER);

    loop {
        match editor.readline(config::PROMPT) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                match trimmed {
                    "(quit)" | "(exit)" => break,
                    "(clear)" => {
                        print!("\x1b[2J\x1b[H");
                        continue;
                    }
                    _ => {}
                }

                // Reader errors end the line, not the session
                let forms = match read_source(trimmed, "repl") {
                    Ok(forms) => forms,
                    Err(e) => {
                        eprintln!("read error: {}", e);
                        continue;
                    }
                };
                for form in forms {
                    match eval_top_level(&form, env) {
                        Ok(value) => {
                            println!("{}", LispHelper::highlight_output(&value.to_string()));
                        }
                        Err(e) => {
                            // Surface the error and keep the REPL alive
                            eprintln!("error: {}", e);
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("error: {}", e);
                break;
            }
        }
    }

    let _ = editor.save_history(config::HISTORY_FILE);
    println!("Goodbye!");
    ExitCode::SUCCESS
}
