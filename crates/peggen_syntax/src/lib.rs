//! # peggen-syntax
//!
//! The grammar front end of peggen: the abstract grammar tree and the
//! meta-grammar parser that produces it.
//!
//! ```text
//! Grammar Source
//!       │
//!       ▼
//! ┌───────────────────┐
//! │ parse_grammar     │ Recursive descent over the PEG meta-grammar
//! └─────────┬─────────┘
//!           ▼
//!     Grammar (AGT)
//! ```
//!
//! The tree produced here is unchecked; `peggen-compile` validates and
//! normalizes it before generating a parser.
//!
//! # Example
//!
//! ```
//! use peggen_syntax::{parse_grammar, Expr};
//!
//! let grammar = parse_grammar("digit = [0-9]").unwrap();
//! assert_eq!(grammar.start_rule, "digit");
//! assert!(matches!(grammar.rules[0].expr, Expr::Class(_)));
//! ```

pub mod ast;
pub mod parser;

pub use ast::{CharClass, ClassPart, Expr, Grammar, Rule};
pub use parser::parse_grammar;
