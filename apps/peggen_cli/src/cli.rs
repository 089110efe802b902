//! Command-line interface for the peggen parser generator.
//!
//! This module provides the argument parsing and dispatch logic for the
//! `peggen` tool. It is built on [`clap`] with derive macros; each variant
//! in [`Commands`] maps to a handler function that performs the actual
//! work, so the handlers stay directly testable.
//!
//! # Examples
//!
//! ```bash
//! # Generate a parser module from a grammar
//! peggen build arithmetic.peg -o src/arithmetic.rs
//!
//! # Validate a grammar and nothing else
//! peggen check arithmetic.peg
//!
//! # Inspect the analyzed grammar tree
//! peggen ast arithmetic.peg
//!
//! # Match an input against the grammar without generating code
//! peggen run arithmetic.peg "1+2*3"
//! ```

use clap::{Parser, Subcommand};
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use peggen_compile::interpreter;

/// Top-level argument parser for `peggen`.
#[derive(Parser)]
#[command(name = "peggen", version, about = "PEG parser generator")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a parser from a grammar file
    Build {
        /// Grammar file to compile
        grammar: PathBuf,
        /// Write the generated parser here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a grammar without generating code
    Check {
        /// Grammar file to validate
        grammar: PathBuf,
    },
    /// Print the analyzed grammar tree as JSON
    Ast {
        /// Grammar file to inspect
        grammar: PathBuf,
    },
    /// Match an input string against a grammar
    Run {
        /// Grammar file to compile
        grammar: PathBuf,
        /// Input text to parse
        #[arg(required_unless_present = "input_file")]
        input: Option<String>,
        /// Read the input text from a file instead
        #[arg(short, long, conflicts_with = "input")]
        input_file: Option<PathBuf>,
    },
}

/// Parses arguments from the environment and dispatches to a handler.
pub fn run_cli() -> Result<(), String> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Build { grammar, output } => build(&grammar, output.as_deref()),
        Commands::Check { grammar } => check(&grammar),
        Commands::Ast { grammar } => ast(&grammar),
        Commands::Run { grammar, input, input_file } => {
            let input = match (input, input_file) {
                (Some(text), _) => text,
                (None, Some(path)) => read_file(&path)?,
                (None, None) => unreachable!("clap enforces one input source"),
            };
            run(&grammar, &input)
        }
    }
}

fn build(grammar_path: &Path, output: Option<&Path>) -> Result<(), String> {
    let source = read_file(grammar_path)?;
    let generated = peggen_compile::compile_to_source(&source)
        .map_err(|e| grammar_failure(grammar_path, &e.to_string()))?;
    match output {
        Some(path) => {
            fs::write(path, generated)
                .map_err(|e| format!("cannot write {}: {}", path.display(), e))?;
            eprintln!("{} {}", paint(GREEN, "generated"), path.display());
        }
        None => print!("{}", generated),
    }
    Ok(())
}

fn check(grammar_path: &Path) -> Result<(), String> {
    let source = read_file(grammar_path)?;
    let grammar = peggen_compile::check(&source)
        .map_err(|e| grammar_failure(grammar_path, &e.to_string()))?;
    println!(
        "{} {} ({} rules, start rule {})",
        paint(GREEN, "ok"),
        grammar_path.display(),
        grammar.rules.len(),
        paint(CYAN, &grammar.start_rule),
    );
    Ok(())
}

fn ast(grammar_path: &Path) -> Result<(), String> {
    let source = read_file(grammar_path)?;
    let grammar = peggen_compile::check(&source)
        .map_err(|e| grammar_failure(grammar_path, &e.to_string()))?;
    let json = serde_json::to_string_pretty(&grammar)
        .map_err(|e| format!("cannot serialize grammar tree: {}", e))?;
    println!("{}", json);
    Ok(())
}

fn run(grammar_path: &Path, input: &str) -> Result<(), String> {
    let source = read_file(grammar_path)?;
    let parser = peggen_compile::compile(&source)
        .map_err(|e| grammar_failure(grammar_path, &e.to_string()))?;
    match parser.parse(input) {
        Ok(value) => {
            println!("{}", render_value(&value));
            Ok(())
        }
        Err(e) => Err(format!("{}: {}", paint(BOLD_RED, "parse failed"), e)),
    }
}

fn render_value(value: &interpreter::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| format!("{:?}", value))
}

fn read_file(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("cannot read {}: {}", path.display(), e))
}

fn grammar_failure(path: &Path, message: &str) -> String {
    format!("{}: {}", path.display(), message)
}

// ============================================================================
// Output styling
// ============================================================================

const GREEN: &str = "32";
const CYAN: &str = "36";
const BOLD_RED: &str = "1;31";

/// Wraps `text` in an ANSI SGR sequence for interactive use.
///
/// Styling is dropped when `NO_COLOR` is set or when either output stream
/// is not a terminal, so redirected and piped output stays clean.
fn paint(sgr: &str, text: &str) -> String {
    if color_enabled() {
        format!("\x1b[{}m{}\x1b[0m", sgr, text)
    } else {
        text.to_string()
    }
}

fn color_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
        && std::io::stdout().is_terminal()
        && std::io::stderr().is_terminal()
}
