//! Line/column computation over character positions.
//!
//! Positions throughout peggen are character offsets (indices into a
//! `Vec<char>` of the input), not byte offsets. [`Location::at`] converts an
//! offset to a one-based line/column pair by walking the input from the start,
//! recognizing all four Unicode line terminators.
//!
//! `"\r\n"` counts as a single line break: the `'\r'` advances the line and
//! the following `'\n'` is absorbed.

/// A one-based line/column position in source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    /// Computes the location of the character offset `pos` in `input`.
    ///
    /// Walks characters `0..pos`. Offsets past the end of the input resolve
    /// to the position just after the last character.
    pub fn at(input: &[char], pos: usize) -> Location {
        let mut line = 1;
        let mut column = 1;
        let mut seen_cr = false;

        for &ch in input.iter().take(pos) {
            match ch {
                '\n' => {
                    if !seen_cr {
                        line += 1;
                    }
                    column = 1;
                    seen_cr = false;
                }
                '\r' | '\u{2028}' | '\u{2029}' => {
                    line += 1;
                    column = 1;
                    seen_cr = ch == '\r';
                }
                _ => {
                    column += 1;
                    seen_cr = false;
                }
            }
        }

        Location { line, column }
    }
}
