//! The end-to-end compilation pipeline.
//!
//! ```text
//! Grammar Source
//!       │
//!       ▼
//! ┌───────────────────┐
//! │  1. Parse         │ Meta-grammar → AGT
//! └─────────┬─────────┘
//!           ▼
//! ┌───────────────────┐
//! │  2. Analyze       │ References, left recursion, proxy elimination
//! └─────────┬─────────┘
//!           ▼
//! ┌───────────────────┐
//! │  3. Emit          │ AGT → generated parser source
//! └─────────┬─────────┘
//!           ▼
//!   Parser source / in-memory Parser
//! ```
//!
//! # Entry Points
//!
//! | Function | Output | Use Case |
//! |----------|--------|----------|
//! | [`check`] | normalized AGT | diagnostics, tooling |
//! | [`compile_to_source`] | generated Rust parser | build scripts, `peggen build` |
//! | [`compile`] | in-memory [`Parser`] | running inputs without a build step |
//!
//! Every path fails fast: the first syntax or grammar error aborts the
//! pipeline, and nothing is caught and retried.

use crate::analysis;
use crate::codegen;
use crate::interpreter::Parser;
use peggen_base::CompileError;
use peggen_syntax::{parse_grammar, Grammar};

/// Parses and validates a grammar, returning the normalized AGT.
///
/// After this succeeds, every rule reference resolves, no rule is
/// left-recursive along the leftmost-first relation, and proxy rules have
/// been eliminated.
pub fn check(source: &str) -> Result<Grammar, CompileError> {
    let mut grammar = parse_grammar(source)?;
    analysis::analyze(&mut grammar)?;
    Ok(grammar)
}

/// Compiles grammar source into the text of a standalone Rust parser.
///
/// The output is a complete module depending only on the standard library,
/// exposing `Parser::parse(&str) -> Result<Value, SyntaxError>`.
///
/// # Example
///
/// ```
/// let source = peggen_compile::compile_to_source("start = \"a\"+").unwrap();
/// assert!(source.contains("fn parse_start"));
/// ```
pub fn compile_to_source(source: &str) -> Result<String, CompileError> {
    let grammar = check(source)?;
    Ok(codegen::emit_grammar(&grammar))
}

/// Compiles grammar source into an in-memory [`Parser`].
///
/// The parser matches inputs by interpreting the grammar tree and carries
/// the generated source, retrievable via [`Parser::to_source`].
///
/// # Example
///
/// ```
/// let parser = peggen_compile::compile("start = \"a\" / \"b\"").unwrap();
/// assert!(parser.parse("a").is_ok());
/// assert!(parser.parse("c").is_err());
/// ```
pub fn compile(source: &str) -> Result<Parser, CompileError> {
    let grammar = check(source)?;
    let emitted = codegen::emit_grammar(&grammar);
    Ok(Parser::new(grammar, emitted))
}
