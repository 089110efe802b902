//! Recursive-descent parser for the PEG meta-grammar.
//!
//! Transforms grammar source text into an abstract grammar tree. The surface
//! syntax:
//!
//! ```text
//! Grammar     := __ Initializer? Rule+
//! Initializer := Action ';'?
//! Rule        := Identifier Literal? '=' Choice ';'?
//! Choice      := Sequence ('/' Sequence)*
//! Sequence    := Labeled* Action?
//! Labeled     := (Identifier ':')? Prefixed
//! Prefixed    := '&' Action | '&' Suffixed | '!' Action | '!' Suffixed | Suffixed
//! Suffixed    := Primary ('?' | '*' | '+')?
//! Primary     := Identifier !(Literal? '=') | Literal | '.' | Class
//!              | '(' Choice ')'
//! ```
//!
//! Whitespace and `//` / `/* */` comments are skipped between tokens; inside
//! literals, classes, and actions they are significant. The first rule
//! declared becomes the start rule.
//!
//! # Failure reporting
//!
//! The parser tracks the rightmost failing position and the set of tokens
//! that would have been accepted there ([`FailureTracker`]), so a rejected
//! grammar reports `Expected ... but ... found.` at the furthest point
//! reached, exactly as parsers generated by this tool report their own input
//! errors. Backtracking restores the position but never erases recorded
//! failures.
//!
//! One condition aborts immediately instead of backtracking: a class range
//! whose low end exceeds its high end (`[z-a]`).

use crate::ast::{CharClass, ClassPart, Expr, Grammar, Rule};
use peggen_base::strings::quote_char;
use peggen_base::{FailureTracker, Location, SyntaxError};

/// Parses grammar source text into an AGT.
///
/// The result is structurally valid but unchecked: rule references may
/// dangle and left recursion may be present until the analyzer runs.
pub fn parse_grammar(source: &str) -> Result<Grammar, SyntaxError> {
    MetaParser::new(source).grammar()
}

struct MetaParser {
    input: Vec<char>,
    pos: usize,
    failures: FailureTracker,
    report_failures: bool,
    /// Set by non-recoverable conditions (invalid class range); overrides
    /// the rightmost-failure error on exit.
    fatal: Option<SyntaxError>,
}

impl MetaParser {
    fn new(source: &str) -> Self {
        Self {
            input: source.chars().collect(),
            pos: 0,
            failures: FailureTracker::new(),
            report_failures: true,
            fatal: None,
        }
    }

    // ========================================================================
    // Grammar-level productions
    // ========================================================================

    fn grammar(mut self) -> Result<Grammar, SyntaxError> {
        self.skip_ws();

        let initializer = self.initializer();

        let mut rules: Vec<Rule> = Vec::new();
        while let Some(rule) = self.rule() {
            // Name-keyed storage: a redefinition overwrites the body but
            // keeps the original position.
            match rules.iter_mut().find(|r| r.name == rule.name) {
                Some(existing) => *existing = rule,
                None => rules.push(rule),
            }
        }

        if let Some(fatal) = self.fatal {
            return Err(fatal);
        }
        if rules.is_empty() || self.pos < self.input.len() {
            return Err(self.failures.syntax_error(&self.input, self.pos));
        }

        Ok(Grammar {
            initializer,
            start_rule: rules[0].name.clone(),
            rules,
        })
    }

    fn initializer(&mut self) -> Option<String> {
        let code = self.action()?;
        self.eat_token(';');
        Some(code)
    }

    fn rule(&mut self) -> Option<Rule> {
        let saved = self.pos;
        let name = self.identifier()?;
        let display_name = self.literal();
        if !self.eat_token('=') {
            self.pos = saved;
            return None;
        }
        let expr = self.choice();
        self.eat_token(';');
        Some(Rule { name, display_name, expr })
    }

    fn choice(&mut self) -> Expr {
        let mut alternatives = vec![self.sequence()];
        while self.eat_token('/') {
            alternatives.push(self.sequence());
        }
        if alternatives.len() == 1 {
            alternatives.pop().unwrap()
        } else {
            Expr::Choice { alternatives }
        }
    }

    fn sequence(&mut self) -> Expr {
        let mut elements = Vec::new();
        while let Some(element) = self.labeled() {
            elements.push(element);
        }
        let expr = if elements.len() == 1 {
            elements.pop().unwrap()
        } else {
            Expr::Sequence { elements }
        };
        match self.action() {
            Some(code) => Expr::Action { expr: Box::new(expr), code },
            None => expr,
        }
    }

    fn labeled(&mut self) -> Option<Expr> {
        let saved = self.pos;
        if let Some(label) = self.label() {
            match self.prefixed() {
                Some(expr) => return Some(Expr::Labeled { label, expr: Box::new(expr) }),
                None => {
                    self.pos = saved;
                    return None;
                }
            }
        }
        self.prefixed()
    }

    /// `Identifier ':'`, as one backtrackable unit.
    fn label(&mut self) -> Option<String> {
        let saved = self.pos;
        let name = self.identifier()?;
        if self.eat_token(':') {
            Some(name)
        } else {
            self.pos = saved;
            None
        }
    }

    fn prefixed(&mut self) -> Option<Expr> {
        let saved = self.pos;
        if let Some(op) = self.eat_prefix_op() {
            if let Some(code) = self.action() {
                return Some(match op {
                    '&' => Expr::SemanticAnd { code },
                    _ => Expr::SemanticNot { code },
                });
            }
            match self.suffixed() {
                Some(expr) => {
                    let expr = Box::new(expr);
                    Some(match op {
                        '&' => Expr::SimpleAnd { expr },
                        _ => Expr::SimpleNot { expr },
                    })
                }
                None => {
                    self.pos = saved;
                    None
                }
            }
        } else {
            self.suffixed()
        }
    }

    fn eat_prefix_op(&mut self) -> Option<char> {
        match self.peek() {
            Some(op @ ('&' | '!')) => {
                self.pos += 1;
                self.skip_ws();
                Some(op)
            }
            _ => None,
        }
    }

    fn suffixed(&mut self) -> Option<Expr> {
        let primary = self.primary()?;
        if self.eat_token('?') {
            Some(Expr::Optional { expr: Box::new(primary) })
        } else if self.eat_token('*') {
            Some(Expr::ZeroOrMore { expr: Box::new(primary) })
        } else if self.eat_token('+') {
            Some(Expr::OneOrMore { expr: Box::new(primary) })
        } else {
            Some(primary)
        }
    }

    fn primary(&mut self) -> Option<Expr> {
        if let Some(name) = self.rule_ref() {
            return Some(Expr::RuleRef { name });
        }
        if let Some(value) = self.literal() {
            return Some(Expr::Literal { value });
        }
        if self.eat_token('.') {
            return Some(Expr::Any);
        }
        if let Some(class) = self.class() {
            return Some(Expr::Class(class));
        }
        if self.peek() == Some('(') {
            let saved = self.pos;
            self.pos += 1;
            self.skip_ws();
            let expr = self.choice();
            if self.eat_token(')') {
                return Some(expr);
            }
            self.pos = saved;
        } else {
            self.fail("\"(\"");
        }
        None
    }

    /// An identifier that is not the start of the next rule definition.
    fn rule_ref(&mut self) -> Option<String> {
        let saved = self.pos;
        let name = self.identifier()?;

        // Lookahead for `Literal? '='`; failures inside are not reported.
        let probe = self.pos;
        let saved_report = self.report_failures;
        self.report_failures = false;
        let _ = self.literal();
        let starts_definition = self.peek() == Some('=');
        self.report_failures = saved_report;
        self.pos = probe;

        if starts_definition {
            self.pos = saved;
            None
        } else {
            Some(name)
        }
    }

    // ========================================================================
    // Lexical elements
    // ========================================================================

    fn identifier(&mut self) -> Option<String> {
        match self.peek() {
            Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => {
                let start = self.pos;
                self.pos += 1;
                while matches!(self.peek(), Some(ch) if ch.is_ascii_alphanumeric() || ch == '_') {
                    self.pos += 1;
                }
                let name: String = self.input[start..self.pos].iter().collect();
                self.skip_ws();
                Some(name)
            }
            _ => {
                self.fail("identifier");
                None
            }
        }
    }

    /// A single- or double-quoted string with escapes.
    fn literal(&mut self) -> Option<String> {
        let delimiter = match self.peek() {
            Some(ch @ ('"' | '\'')) => ch,
            _ => {
                self.fail("string");
                return None;
            }
        };

        let saved = self.pos;
        self.pos += 1;
        let mut value = String::new();
        loop {
            match self.peek() {
                None => {
                    self.fail(&quote_char(delimiter));
                    self.pos = saved;
                    return None;
                }
                Some(ch) if ch == delimiter => {
                    self.pos += 1;
                    self.skip_ws();
                    return Some(value);
                }
                Some('\\') => {
                    self.pos += 1;
                    match self.escape_sequence() {
                        Some(text) => value.push_str(&text),
                        None => {
                            self.pos = saved;
                            return None;
                        }
                    }
                }
                Some(ch) => {
                    value.push(ch);
                    self.pos += 1;
                }
            }
        }
    }

    /// The body of an escape, after the backslash has been consumed.
    ///
    /// Line continuations yield the terminator itself, which is why the
    /// result is a string: `\` before `\r\n` contributes both characters.
    fn escape_sequence(&mut self) -> Option<String> {
        let ch = match self.peek() {
            Some(ch) => ch,
            None => {
                self.fail("escape sequence");
                return None;
            }
        };
        match ch {
            'b' => self.simple_escape('\u{8}'),
            'f' => self.simple_escape('\u{c}'),
            'n' => self.simple_escape('\n'),
            'r' => self.simple_escape('\r'),
            't' => self.simple_escape('\t'),
            'v' => self.simple_escape('\u{b}'),
            '0' if !matches!(self.peek_at(1), Some(d) if d.is_ascii_digit()) => {
                self.simple_escape('\0')
            }
            'x' => self.hex_escape(2),
            'u' => self.hex_escape(4),
            '\n' | '\u{2028}' | '\u{2029}' => {
                self.pos += 1;
                Some(ch.to_string())
            }
            '\r' => {
                self.pos += 1;
                if self.peek() == Some('\n') {
                    self.pos += 1;
                    Some("\r\n".to_string())
                } else {
                    Some("\r".to_string())
                }
            }
            ch if ch.is_ascii_digit() => {
                self.fail("escape sequence");
                None
            }
            ch => {
                // Any other escaped character denotes itself.
                self.pos += 1;
                Some(ch.to_string())
            }
        }
    }

    fn simple_escape(&mut self, value: char) -> Option<String> {
        self.pos += 1;
        Some(value.to_string())
    }

    /// `\xHH` / `\uHHHH`; the marker character is at the current position.
    fn hex_escape(&mut self, digits: usize) -> Option<String> {
        let saved = self.pos;
        self.pos += 1;
        let mut code = 0u32;
        for _ in 0..digits {
            match self.peek().and_then(|ch| ch.to_digit(16)) {
                Some(digit) => {
                    code = code * 16 + digit;
                    self.pos += 1;
                }
                None => {
                    self.fail("escape sequence");
                    self.pos = saved;
                    return None;
                }
            }
        }
        match char::from_u32(code) {
            Some(ch) => Some(ch.to_string()),
            None => {
                self.fail("escape sequence");
                self.pos = saved;
                None
            }
        }
    }

    fn class(&mut self) -> Option<CharClass> {
        if self.peek() != Some('[') {
            self.fail("character class");
            return None;
        }

        let saved = self.pos;
        self.pos += 1;
        let inverted = if self.peek() == Some('^') {
            self.pos += 1;
            true
        } else {
            false
        };

        let mut parts = Vec::new();
        loop {
            match self.peek() {
                None => {
                    self.fail("\"]\"");
                    self.pos = saved;
                    return None;
                }
                Some(']') => {
                    self.pos += 1;
                    self.skip_ws();
                    return Some(CharClass::new(inverted, parts));
                }
                Some(_) => {
                    let range_start = self.pos;
                    let low = match self.class_char() {
                        Some(ch) => ch,
                        None => {
                            self.pos = saved;
                            return None;
                        }
                    };
                    // `x-y` is a range unless the `-` immediately precedes `]`.
                    if self.peek() == Some('-') && self.peek_at(1) != Some(']') && self.peek_at(1).is_some() {
                        self.pos += 1;
                        let high = match self.class_char() {
                            Some(ch) => ch,
                            None => {
                                self.pos = saved;
                                return None;
                            }
                        };
                        if low > high {
                            let text = CharClass::canonical_text(
                                false,
                                &[ClassPart::Range { low, high }],
                            );
                            let range_text = &text[1..text.len() - 1];
                            self.fatal = Some(SyntaxError::new(
                                format!("Invalid character range: {}.", range_text),
                                Location::at(&self.input, range_start),
                            ));
                            self.pos = saved;
                            return None;
                        }
                        parts.push(ClassPart::Range { low, high });
                    } else {
                        parts.push(ClassPart::Single(low));
                    }
                }
            }
        }
    }

    /// One class member character: an escape or any character except `]`.
    fn class_char(&mut self) -> Option<char> {
        match self.peek() {
            Some('\\') => {
                self.pos += 1;
                let text = self.escape_sequence()?;
                // Line continuations are multi-character; inside a class only
                // single characters are meaningful, so take the first.
                text.chars().next()
            }
            Some(ch) if ch != ']' => {
                self.pos += 1;
                Some(ch)
            }
            _ => {
                self.fail("character class character");
                None
            }
        }
    }

    /// A balanced-brace code block; the outer braces are stripped.
    fn action(&mut self) -> Option<String> {
        if self.peek() != Some('{') {
            self.fail("action");
            return None;
        }

        let saved = self.pos;
        self.pos += 1;
        let start = self.pos;
        let mut depth = 1usize;
        loop {
            match self.peek() {
                None => {
                    self.fail("\"}\"");
                    self.pos = saved;
                    return None;
                }
                Some('{') => {
                    depth += 1;
                    self.pos += 1;
                }
                Some('}') => {
                    depth -= 1;
                    self.pos += 1;
                    if depth == 0 {
                        let code: String = self.input[start..self.pos - 1].iter().collect();
                        self.skip_ws();
                        return Some(code);
                    }
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    // ========================================================================
    // Character-level machinery
    // ========================================================================

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }

    fn fail(&mut self, expected: &str) {
        if self.report_failures {
            self.failures.record(self.pos, expected);
        }
    }

    /// Consumes `ch` plus trailing whitespace, recording the expectation on
    /// a miss.
    fn eat_token(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.pos += 1;
            self.skip_ws();
            true
        } else {
            self.fail(&quote_char(ch));
            false
        }
    }

    /// Skips whitespace and comments. An unterminated `/*` is left in place
    /// for the next token match to report.
    fn skip_ws(&mut self) {
        loop {
            match self.peek() {
                Some(ch) if is_whitespace(ch) => self.pos += 1,
                Some('/') if self.peek_at(1) == Some('/') => {
                    self.pos += 2;
                    while matches!(self.peek(), Some(ch) if !is_line_terminator(ch)) {
                        self.pos += 1;
                    }
                }
                Some('/') if self.peek_at(1) == Some('*') => {
                    let saved = self.pos;
                    self.pos += 2;
                    loop {
                        match self.peek() {
                            None => {
                                self.pos = saved;
                                return;
                            }
                            Some('*') if self.peek_at(1) == Some('/') => {
                                self.pos += 2;
                                break;
                            }
                            Some(_) => self.pos += 1,
                        }
                    }
                }
                _ => return,
            }
        }
    }
}

fn is_whitespace(ch: char) -> bool {
    matches!(
        ch,
        ' ' | '\t' | '\u{b}' | '\u{c}' | '\u{a0}' | '\u{feff}' | '\n' | '\r' | '\u{2028}' | '\u{2029}'
    )
}

fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}
