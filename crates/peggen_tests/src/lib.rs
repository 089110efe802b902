//! Integration test crate for peggen.
//!
//! Exists only to host the end-to-end suites under `tests/`; the library
//! itself is intentionally empty.
