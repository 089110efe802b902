//! # peggen-compile
//!
//! The compilation pipeline for peggen, transforming parsing expression
//! grammars into packrat parsers.
//!
//! ## Architecture
//!
//! ```text
//! Grammar Source
//!      │
//!      ▼
//! ┌──────────┐     ┌──────────┐
//! │  Parser  │ ──▶ │   AGT    │        (peggen-syntax)
//! └──────────┘     └──────────┘
//!                        │
//!      ┌─────────────────┘
//!      ▼
//! ┌─────────────────────────────────────────────┐
//! │               Analysis Passes               │
//! │  ┌────────────┐ ┌───────────┐ ┌──────────┐  │
//! │  │ References │ │ Left rec. │ │ Proxies  │  │
//! │  └────────────┘ └───────────┘ └──────────┘  │
//! └─────────────────────────────────────────────┘
//!      │
//!      ├──────────────────┐
//!      ▼                  ▼
//! ┌──────────┐     ┌─────────────┐
//! │ CodeGen  │     │ Interpreter │
//! └────┬─────┘     └──────┬──────┘
//!      ▼                  ▼
//! Parser source     in-memory Parser
//! ```
//!
//! ## Modules
//!
//! - [`compile`]: top-level compilation functions
//! - [`analysis`]: reference/left-recursion checks and proxy elimination
//! - [`codegen`]: AGT to Rust parser generation (template engine included)
//! - [`interpreter`]: tree-walking packrat evaluation
//!
//! ## Getting Started
//!
//! ```
//! use peggen_compile::compile;
//!
//! let parser = compile(r#"greeting = "hello" " "+ [a-z]+"#).unwrap();
//! assert!(parser.parse("hello world").is_ok());
//!
//! let err = parser.parse("goodbye").unwrap_err();
//! assert_eq!((err.line, err.column), (1, 1));
//! ```

pub mod analysis;
pub mod codegen;
pub mod compile;
pub mod interpreter;

pub use compile::{check, compile, compile_to_source};
pub use interpreter::{Parser, Value};
pub use peggen_base::{CompileError, GrammarError, SyntaxError};
