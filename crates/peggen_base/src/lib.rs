//! # peggen-base
//!
//! Structural atoms for the peggen ecosystem.
//!
//! This crate provides the foundational types shared by the meta-grammar
//! parser, the grammar analyzer, the parser synthesizer, and the interpreter:
//!
//! - [`SyntaxError`]/[`GrammarError`]/[`CompileError`] — error types
//! - [`Location`] — line/column computation over character positions
//! - [`FailureTracker`] — rightmost-failure expectation tracking
//! - [`strings`] — quoting text as Rust string literals
//!
//! # Design Principles
//!
//! This crate has **no knowledge of grammars, code generation, or I/O**. It
//! provides only the generic infrastructure that higher-level crates build
//! upon.
//!
//! # Example
//!
//! ```
//! use peggen_base::{FailureTracker, Location};
//!
//! let input: Vec<char> = "ab\ncd".chars().collect();
//! let mut failures = FailureTracker::new();
//! failures.record(4, "\"x\"");
//!
//! let err = failures.syntax_error(&input, 0);
//! assert_eq!(err.message, "Expected \"x\" but \"d\" found.");
//! assert_eq!((err.line, err.column), (2, 2));
//! assert_eq!(Location::at(&input, 3), Location { line: 2, column: 1 });
//! ```

pub mod error;
pub mod failures;
pub mod location;
pub mod strings;

pub use error::{CompileError, GrammarError, SyntaxError};
pub use failures::FailureTracker;
pub use location::Location;
