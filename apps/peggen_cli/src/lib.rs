//! Library crate backing the `peggen` binary.
//!
//! All command logic lives here so handlers can be exercised in tests;
//! `main.rs` only forwards to [`run_cli`] and maps errors to exit codes.

pub mod cli;

pub use cli::run_cli;
