//! Tree-walking packrat interpreter over the normalized grammar.
//!
//! [`Parser`] is the in-memory counterpart of an emitted parser: it matches
//! input against the AGT directly, with the same result convention (`None`
//! is the failure sentinel), the same memoization, the same prioritized
//! choice and lookahead behavior, and the same error construction.
//!
//! Host-language fragments cannot execute here — they are Rust source that
//! only exists as text until the emitted parser is compiled. Interpreted
//! parses therefore yield the *structural* value: action nodes pass their
//! sub-expression's value through unchanged, and semantic predicates succeed
//! vacuously. Everything else behaves exactly as in generated code.
//!
//! The cache is per-`parse` state, so a single `Parser` serves concurrent
//! calls without interference.

use std::collections::HashMap;

use serde::Serialize;

use peggen_base::{FailureTracker, SyntaxError};
use peggen_syntax::{Expr, Grammar};

/// A semantic value produced by a match.
///
/// Lookaheads and empty repetitions succeed with the empty string;
/// sequences and repetitions collect their element values into lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Str(String),
    List(Vec<Value>),
}

impl Value {
    /// The synthetic empty-string success value.
    pub fn empty() -> Value {
        Value::Str(String::new())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(text) => Some(text),
            Value::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::Str(_) => None,
            Value::List(items) => Some(items),
        }
    }

    /// Concatenates every matched string in this value, depth first.
    pub fn flatten_text(&self) -> String {
        match self {
            Value::Str(text) => text.clone(),
            Value::List(items) => items.iter().map(Value::flatten_text).collect(),
        }
    }
}

/// A compiled grammar, ready to match inputs.
///
/// Produced by the compilation facade; carries the generated parser source
/// for retrieval via [`Parser::to_source`].
#[derive(Debug)]
pub struct Parser {
    grammar: Grammar,
    source: String,
}

impl Parser {
    pub(crate) fn new(grammar: Grammar, source: String) -> Self {
        Self { grammar, source }
    }

    /// Matches `input` against the grammar's start rule.
    ///
    /// The entire input must be consumed; anything less fails with the
    /// rightmost failure recorded during the attempt.
    pub fn parse(&self, input: &str) -> Result<Value, SyntaxError> {
        Matcher::new(&self.grammar, input).run()
    }

    /// The generated parser source this grammar compiles to.
    pub fn to_source(&self) -> &str {
        &self.source
    }

    /// The analyzed grammar tree.
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }
}

#[derive(Clone)]
struct CacheEntry {
    next_pos: usize,
    result: Option<Value>,
}

/// Per-parse state: position, memo table, and failure bookkeeping.
struct Matcher<'g> {
    grammar: &'g Grammar,
    rule_index: HashMap<&'g str, usize>,
    input: Vec<char>,
    pos: usize,
    cache: HashMap<(usize, usize), CacheEntry>,
    failures: FailureTracker,
    report_failures: bool,
}

impl<'g> Matcher<'g> {
    fn new(grammar: &'g Grammar, input: &str) -> Self {
        let rule_index = grammar
            .rules
            .iter()
            .enumerate()
            .map(|(index, rule)| (rule.name.as_str(), index))
            .collect();
        Self {
            grammar,
            rule_index,
            input: input.chars().collect(),
            pos: 0,
            cache: HashMap::new(),
            failures: FailureTracker::new(),
            report_failures: true,
        }
    }

    fn run(&mut self) -> Result<Value, SyntaxError> {
        let start = self.rule_index[self.grammar.start_rule.as_str()];
        match self.rule(start) {
            Some(value) if self.pos == self.input.len() => Ok(value),
            _ => Err(self.failures.syntax_error(&self.input, self.pos)),
        }
    }

    fn rule(&mut self, index: usize) -> Option<Value> {
        let key = (index, self.pos);
        if let Some(entry) = self.cache.get(&key) {
            self.pos = entry.next_pos;
            return entry.result.clone();
        }

        let grammar = self.grammar;
        let rule = &grammar.rules[index];
        let result = match &rule.display_name {
            None => self.expr(&rule.expr),
            Some(display) => {
                let saved_report = self.report_failures;
                self.report_failures = false;
                let result = self.expr(&rule.expr);
                self.report_failures = saved_report;
                if result.is_none() {
                    self.fail(display);
                }
                result
            }
        };

        self.cache.insert(key, CacheEntry { next_pos: self.pos, result: result.clone() });
        result
    }

    fn expr(&mut self, expr: &'g Expr) -> Option<Value> {
        match expr {
            Expr::Literal { value } => self.literal(value),
            Expr::Any => self.any(),
            Expr::Class(class) => match self.input.get(self.pos) {
                Some(&ch) if class.matches(ch) => {
                    self.pos += 1;
                    Some(Value::Str(ch.to_string()))
                }
                _ => {
                    self.fail(&class.raw_text);
                    None
                }
            },
            Expr::RuleRef { name } => {
                let index = self.rule_index[name.as_str()];
                self.rule(index)
            }
            Expr::Sequence { elements } => {
                let saved = self.pos;
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    match self.expr(element) {
                        Some(value) => values.push(value),
                        None => {
                            self.pos = saved;
                            return None;
                        }
                    }
                }
                Some(Value::List(values))
            }
            Expr::Choice { alternatives } => {
                for alternative in alternatives {
                    if let Some(value) = self.expr(alternative) {
                        return Some(value);
                    }
                }
                None
            }
            Expr::Labeled { expr, .. } => self.expr(expr),
            Expr::Optional { expr } => Some(self.expr(expr).unwrap_or_else(Value::empty)),
            Expr::ZeroOrMore { expr } => {
                let mut values = Vec::new();
                while let Some(value) = self.expr(expr) {
                    values.push(value);
                }
                Some(Value::List(values))
            }
            Expr::OneOrMore { expr } => {
                let first = self.expr(expr)?;
                let mut values = vec![first];
                while let Some(value) = self.expr(expr) {
                    values.push(value);
                }
                Some(Value::List(values))
            }
            Expr::SimpleAnd { expr } => {
                self.lookahead(expr).map(|_| Value::empty())
            }
            Expr::SimpleNot { expr } => match self.lookahead(expr) {
                Some(_) => None,
                None => Some(Value::empty()),
            },
            // Host-language fragments are not executable against the tree;
            // predicates pass and actions are transparent. The emitted
            // parser runs both for real.
            Expr::SemanticAnd { .. } | Expr::SemanticNot { .. } => Some(Value::empty()),
            Expr::Action { expr, .. } => self.expr(expr),
        }
    }

    /// Runs `expr` without consuming input or reporting its failures.
    fn lookahead(&mut self, expr: &'g Expr) -> Option<Value> {
        let saved_pos = self.pos;
        let saved_report = self.report_failures;
        self.report_failures = false;
        let result = self.expr(expr);
        self.report_failures = saved_report;
        self.pos = saved_pos;
        result
    }

    fn literal(&mut self, text: &str) -> Option<Value> {
        let mut end = self.pos;
        for ch in text.chars() {
            if self.input.get(end) == Some(&ch) {
                end += 1;
            } else {
                let expected = peggen_base::strings::quote(text);
                self.fail(&expected);
                return None;
            }
        }
        self.pos = end;
        Some(Value::Str(text.to_string()))
    }

    fn any(&mut self) -> Option<Value> {
        match self.input.get(self.pos) {
            Some(&ch) => {
                self.pos += 1;
                Some(Value::Str(ch.to_string()))
            }
            None => {
                self.fail("any character");
                None
            }
        }
    }

    fn fail(&mut self, expected: &str) {
        if self.report_failures {
            self.failures.record(self.pos, expected);
        }
    }
}
