//! Parser synthesis from the normalized abstract grammar tree.
//!
//! This module transforms an analyzed grammar into the source text of a
//! self-contained Rust packrat parser.
//!
//! # Pipeline Position
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │  Grammar Source → Parser → AGT → Analysis → HERE       │
//! └────────────────────────────────────────────────────────┘
//!                                                  ↓
//!                                     Generated Parser Source
//! ```
//!
//! # Emission Rules
//!
//! | AGT node | Generated form |
//! |----------|----------------|
//! | `rule` | `fn parse_<name>` with memo check/store around the body |
//! | `literal` / `any` / `class` | one `ParseState` matcher call |
//! | `sequence` | labeled block, rewinding on the first failed element |
//! | `choice` | labeled block, committing to the first success |
//! | `?` / `*` / `+` | `unwrap_or_else` / accumulation loops |
//! | `&e` / `!e` | position and report-flag save/restore |
//! | `&{..}` / `!{..}` / actions | immediately-invoked closures over the verbatim fragment |
//!
//! # Determinism
//!
//! Identical grammars emit identical text, and the [`NameGen`] counters
//! reset per rule so an edit to one rule regenerates only that rule's
//! function.

mod emit;
mod names;
mod runtime;
pub mod template;

pub use emit::emit_grammar;
pub use names::NameGen;
