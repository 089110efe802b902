//! Rightmost-failure expectation tracking.
//!
//! Packrat parsers report the *furthest* position at which any token-level
//! match failed, together with everything that would have been accepted
//! there. [`FailureTracker`] implements that policy:
//!
//! - a failure left of the rightmost recorded position is ignored,
//! - a failure right of it resets the expectation set,
//! - a failure at the same position adds to the set.
//!
//! [`FailureTracker::syntax_error`] turns the accumulated state into the
//! final `"Expected ... but ... found."` message with a line/column position.
//! Both the meta-grammar parser and the grammar interpreter use this type;
//! emitted parsers carry an equivalent inlined copy so they stay
//! self-contained.

use crate::error::SyntaxError;
use crate::location::Location;
use crate::strings::quote_char;
use std::collections::BTreeSet;

/// Accumulates match failures, keeping only the rightmost position.
#[derive(Debug, Default, Clone)]
pub struct FailureTracker {
    pos: usize,
    expected: BTreeSet<String>,
}

impl FailureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `expected` would have been accepted at `pos`.
    pub fn record(&mut self, pos: usize, expected: &str) {
        if pos < self.pos {
            return;
        }
        if pos > self.pos {
            self.pos = pos;
            self.expected.clear();
        }
        self.expected.insert(expected.to_string());
    }

    /// The rightmost position at which a failure was recorded.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Joins the expectation set as `"a, b or c"`, sorted lexicographically.
    ///
    /// Returns `"end of input"` when nothing was recorded.
    pub fn expected_description(&self) -> String {
        let expected: Vec<&str> = self.expected.iter().map(String::as_str).collect();
        match expected.as_slice() {
            [] => "end of input".to_string(),
            [only] => (*only).to_string(),
            [init @ .., last] => format!("{} or {}", init.join(", "), last),
        }
    }

    /// Builds the final error for a parse that stopped at `pos`.
    ///
    /// The reported position is the rightmost of `pos` and the recorded
    /// failure position; the "found" token is the character there, or
    /// `end of input` past the last character.
    pub fn syntax_error(&self, input: &[char], pos: usize) -> SyntaxError {
        let error_pos = pos.max(self.pos);
        let actual = match input.get(error_pos) {
            Some(&ch) => quote_char(ch),
            None => "end of input".to_string(),
        };
        let message = format!("Expected {} but {} found.", self.expected_description(), actual);
        SyntaxError::new(message, Location::at(input, error_pos))
    }
}
