//! Code template expansion with indent preservation.
//!
//! [`format`] assembles generated source from text fragments containing
//! `${name}` and `${name|filter}` interpolations:
//!
//! - `name` and `filter` match `[A-Za-z_][A-Za-z0-9_]*`;
//! - the only filter is `string`, which quotes the value as a Rust string
//!   literal;
//! - after substitution, every line of a multi-line part after the first is
//!   prefixed with the first line's leading whitespace, so a multi-line
//!   value spliced into an indented part stays visually aligned;
//! - parts are joined with a newline.
//!
//! Unknown variables and filters are emitter bugs, not user-visible
//! conditions, and panic.

use peggen_base::strings::quote;

/// Expands interpolations in each part, preserves indentation, and joins
/// the parts with newlines.
///
/// # Panics
///
/// Panics on an unknown variable, an unknown filter, or a malformed
/// interpolation; all three indicate a defective template.
pub fn format(parts: &[&str], vars: &[(&str, &str)]) -> String {
    parts
        .iter()
        .map(|part| preserve_indent(&substitute(part, vars)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn substitute(part: &str, vars: &[(&str, &str)]) -> String {
    let chars: Vec<char> = part.chars().collect();
    let mut out = String::with_capacity(part.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '$' && chars.get(i + 1) == Some(&'{') {
            let (name, after_name) = scan_word(&chars, i + 2);
            let name = name.unwrap_or_else(|| panic!("malformed interpolation in template part: {}", part));
            let (filter, end) = match chars.get(after_name) {
                Some('|') => {
                    let (filter, after_filter) = scan_word(&chars, after_name + 1);
                    let filter = filter
                        .unwrap_or_else(|| panic!("malformed interpolation in template part: {}", part));
                    (Some(filter), after_filter)
                }
                _ => (None, after_name),
            };
            if chars.get(end) != Some(&'}') {
                panic!("malformed interpolation in template part: {}", part);
            }

            let value = vars
                .iter()
                .find(|(var, _)| *var == name)
                .map(|(_, value)| *value)
                .unwrap_or_else(|| panic!("unknown template variable: {}", name));
            match filter.as_deref() {
                None => out.push_str(value),
                Some("string") => out.push_str(&quote(value)),
                Some(other) => panic!("unknown template filter: {}", other),
            }
            i = end + 1;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }

    out
}

/// Scans an identifier starting at `start`; returns the word and the index
/// just past it.
fn scan_word(chars: &[char], start: usize) -> (Option<String>, usize) {
    let mut end = start;
    if matches!(chars.get(end), Some(ch) if ch.is_ascii_alphabetic() || *ch == '_') {
        end += 1;
        while matches!(chars.get(end), Some(ch) if ch.is_ascii_alphanumeric() || *ch == '_') {
            end += 1;
        }
        (Some(chars[start..end].iter().collect()), end)
    } else {
        (None, end)
    }
}

/// Prefixes every line after the first with the first line's leading
/// whitespace.
fn preserve_indent(part: &str) -> String {
    let Some((first, rest)) = part.split_once('\n') else {
        return part.to_string();
    };
    let indent: String = first.chars().take_while(|ch| *ch == ' ' || *ch == '\t').collect();
    let mut out = String::with_capacity(part.len() + indent.len() * 4);
    out.push_str(first);
    for line in rest.split('\n') {
        out.push('\n');
        out.push_str(&indent);
        out.push_str(line);
    }
    out
}
