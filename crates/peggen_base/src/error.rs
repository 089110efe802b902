//! Error types for grammar compilation.
//!
//! Two user-visible failure kinds exist: [`SyntaxError`] (the grammar text
//! does not match the meta-grammar, or an input does not match a compiled
//! grammar) and [`GrammarError`] (the grammar parsed but is semantically
//! invalid — an undefined rule reference or left recursion). [`CompileError`]
//! is the sum of both, returned by the compilation facade.
//!
//! Template-expansion failures inside the emitter are not represented here:
//! they indicate bugs in the emitter itself and panic instead.

use crate::location::Location;
use std::fmt;

/// A match failure with its position in the input, in one-based lines and
/// columns.
///
/// Carries the same shape whether it was produced by the meta-grammar parser,
/// the grammar interpreter, or an emitted parser rejecting its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// Human-readable description, `"Expected ... but ... found."`.
    pub message: String,
    /// One-based line of the failure.
    pub line: usize,
    /// One-based column of the failure.
    pub column: usize,
}

impl SyntaxError {
    /// Creates an error at the given location.
    pub fn new(message: impl Into<String>, location: Location) -> Self {
        Self {
            message: message.into(),
            line: location.line,
            column: location.column,
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (line {}, column {})", self.message, self.line, self.column)
    }
}

impl std::error::Error for SyntaxError {}

/// A semantic defect in a structurally valid grammar.
///
/// Raised by the analyzer for undefined rule references and left recursion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarError {
    /// Human-readable description of the defect.
    pub message: String,
}

impl GrammarError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for GrammarError {}

/// Any failure the compilation facade can report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// The grammar text does not match the meta-grammar.
    Syntax(SyntaxError),
    /// The grammar is semantically invalid.
    Grammar(GrammarError),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Syntax(e) => write!(f, "{}", e),
            CompileError::Grammar(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::Syntax(e) => Some(e),
            CompileError::Grammar(e) => Some(e),
        }
    }
}

impl From<SyntaxError> for CompileError {
    fn from(e: SyntaxError) -> Self {
        CompileError::Syntax(e)
    }
}

impl From<GrammarError> for CompileError {
    fn from(e: GrammarError) -> Self {
        CompileError::Grammar(e)
    }
}
