//! E2E test harness.
//!
//! Provides utilities for compiling a grammar to parser source and running
//! the generated Rust for real: the source is written into a temp Cargo
//! project together with a small driver binary, built with `cargo build`,
//! and the resulting binary is invoked once per input.

use std::path::PathBuf;
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use peggen_compile::compile_to_source;

static SHARED_TARGET_DIR: OnceLock<PathBuf> = OnceLock::new();
static COMPILE_COUNTER: AtomicU64 = AtomicU64::new(0);
static RUN_ID: OnceLock<u64> = OnceLock::new();

fn get_run_id() -> u64 {
    *RUN_ID.get_or_init(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos() as u64
    })
}

fn get_shared_target_dir() -> &'static PathBuf {
    SHARED_TARGET_DIR.get_or_init(|| {
        let dir = std::env::temp_dir().join("peggen_e2e_cache");
        std::fs::create_dir_all(&dir).expect("Failed to create shared target dir");
        dir
    })
}

/// Driver wrapped around the generated module: parses argv[1] and prints
/// one line, `ok <value>` or `err <line>:<column> <message>`.
const DRIVER: &str = r#"mod parser;

fn main() {
    let input = std::env::args().nth(1).unwrap_or_default();
    match parser::parse(&input) {
        Ok(value) => println!("ok {}", render(&value)),
        Err(e) => println!("err {}:{} {}", e.line, e.column, e.message),
    }
}

fn render(value: &parser::Value) -> String {
    match value {
        parser::Value::Str(text) => format!("{:?}", text),
        parser::Value::List(items) => {
            let items: Vec<String> = items.iter().map(render).collect();
            format!("[{}]", items.join(", "))
        }
    }
}
"#;

/// A generated parser compiled to a real binary.
///
/// Keeps its temp project alive for the lifetime of the value.
pub struct GeneratedParser {
    binary_path: PathBuf,
    pub parser_source: String,
    _temp_dir: tempfile::TempDir,
}

/// The driver's report for one input.
pub struct ParseOutcome {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

/// Compiles `grammar` to parser source, builds it inside a temp Cargo
/// project, and returns a handle for running inputs through the binary.
///
/// Panics with the generated source and cargo's stderr when the emitted
/// code fails to build, so a codegen regression shows the offending text.
pub fn build_generated_parser(grammar: &str) -> GeneratedParser {
    let parser_source = compile_to_source(grammar).expect("grammar should compile");

    let temp_dir = tempfile::tempdir().expect("temp dir");
    let project_dir = temp_dir.path();

    // Unique package name (includes run ID) so the shared target dir never
    // serves a stale binary.
    let pkg_id = COMPILE_COUNTER.fetch_add(1, Ordering::SeqCst);
    let pkg_name = format!("peggen_e2e_{}_{}", get_run_id(), pkg_id);
    let cargo_toml = format!(
        r#"[package]
name = "{}"
version = "0.1.0"
edition = "2021"
"#,
        pkg_name
    );

    std::fs::create_dir_all(project_dir.join("src")).unwrap();
    std::fs::write(project_dir.join("Cargo.toml"), cargo_toml).unwrap();
    std::fs::write(project_dir.join("src/main.rs"), DRIVER).unwrap();
    std::fs::write(project_dir.join("src/parser.rs"), &parser_source).unwrap();

    let output = Command::new("cargo")
        .args(["build", "--quiet"])
        .current_dir(project_dir)
        .env("CARGO_TARGET_DIR", get_shared_target_dir())
        .output()
        .expect("cargo build");
    assert!(
        output.status.success(),
        "Generated parser should build.\nGrammar:\n{}\n\nGenerated Rust:\n{}\n\nstderr: {}",
        grammar,
        parser_source,
        String::from_utf8_lossy(&output.stderr),
    );

    GeneratedParser {
        binary_path: get_shared_target_dir().join(format!("debug/{}", pkg_name)),
        parser_source,
        _temp_dir: temp_dir,
    }
}

impl GeneratedParser {
    /// Runs the compiled parser binary on one input.
    pub fn parse(&self, input: &str) -> ParseOutcome {
        let output = Command::new(&self.binary_path)
            .arg(input)
            .output()
            .expect("run generated parser");
        ParseOutcome {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
        }
    }

    /// Asserts that parsing `input` succeeds with exactly this rendered value.
    pub fn assert_value(&self, input: &str, expected: &str) {
        let outcome = self.parse(input);
        assert!(
            outcome.success,
            "Parser binary should run.\nstderr: {}\n\nGenerated Rust:\n{}",
            outcome.stderr, self.parser_source,
        );
        assert_eq!(
            outcome.stdout.trim(),
            format!("ok {}", expected),
            "\nGenerated Rust:\n{}",
            self.parser_source,
        );
    }

    /// Asserts that parsing `input` fails at `line:column` with `message`.
    pub fn assert_error(&self, input: &str, line: usize, column: usize, message: &str) {
        let outcome = self.parse(input);
        assert!(
            outcome.success,
            "Parser binary should run.\nstderr: {}\n\nGenerated Rust:\n{}",
            outcome.stderr, self.parser_source,
        );
        assert_eq!(
            outcome.stdout.trim(),
            format!("err {}:{} {}", line, column, message),
            "\nGenerated Rust:\n{}",
            self.parser_source,
        );
    }
}
