//! Abstract grammar tree types.
//!
//! The AGT is the intermediate representation between the meta-grammar parser
//! and the code generator: a tagged tree with one node kind per parsing
//! expression construct. Trees are finite, acyclic in ownership, and wholly
//! owned by the enclosing [`Grammar`]; rules cross-reference each other by
//! name ([`Expr::RuleRef`]), never by pointer.
//!
//! # Lifecycle
//!
//! The parser builds the tree, the analyzer mutates it in place (proxy-rule
//! elimination rewrites references and deletes rules), and the code generator
//! reads it without modification.
//!
//! # Walking
//!
//! Analysis passes traverse with exhaustive matches; the shallow
//! [`Expr::for_each_child`] / [`Expr::for_each_child_mut`] helpers cover the
//! common "visit every node" loops without each pass restating which node
//! kinds carry children.

use serde::{Deserialize, Serialize};

/// A complete parsed grammar: ordered rules, the start rule's name, and an
/// optional host-language initializer fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grammar {
    /// Host-language source spliced ahead of the generated rule functions.
    pub initializer: Option<String>,
    /// Name of the rule `parse` starts from; the first rule in the source.
    pub start_rule: String,
    /// Rules in declaration order. Names are unique.
    pub rules: Vec<Rule>,
}

impl Grammar {
    /// Looks up a rule by name.
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Returns `true` if a rule with this name exists.
    pub fn has_rule(&self, name: &str) -> bool {
        self.rules.iter().any(|r| r.name == name)
    }

    /// Removes the rule with this name, preserving the order of the rest.
    pub fn remove_rule(&mut self, name: &str) {
        self.rules.retain(|r| r.name != name);
    }
}

/// A named rule and its parsing expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    /// Human-readable name reported instead of the rule's internal failures.
    pub display_name: Option<String>,
    pub expr: Expr,
}

/// A parsing expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    /// Prioritized alternatives; the first that matches wins and commits.
    Choice { alternatives: Vec<Expr> },
    /// Elements matched one after another; empty matches the empty string.
    Sequence { elements: Vec<Expr> },
    /// Binds the sub-expression's value to a name for a trailing action.
    Labeled { label: String, expr: Box<Expr> },
    /// Positive lookahead: matches without consuming.
    SimpleAnd { expr: Box<Expr> },
    /// Negative lookahead: succeeds when the sub-expression fails.
    SimpleNot { expr: Box<Expr> },
    /// Host-language predicate; succeeds when it returns true.
    SemanticAnd { code: String },
    /// Host-language predicate; succeeds when it returns false.
    SemanticNot { code: String },
    Optional { expr: Box<Expr> },
    ZeroOrMore { expr: Box<Expr> },
    OneOrMore { expr: Box<Expr> },
    /// Runs a host-language fragment over the matched value.
    Action { expr: Box<Expr>, code: String },
    /// Reference to another rule by name.
    RuleRef { name: String },
    /// Exact string match.
    Literal { value: String },
    /// Any single character.
    Any,
    /// Character class, possibly inverted.
    Class(CharClass),
}

impl Expr {
    /// Calls `f` on each direct child expression.
    pub fn for_each_child<'a>(&'a self, mut f: impl FnMut(&'a Expr)) {
        match self {
            Expr::Choice { alternatives } => alternatives.iter().for_each(&mut f),
            Expr::Sequence { elements } => elements.iter().for_each(&mut f),
            Expr::Labeled { expr, .. }
            | Expr::SimpleAnd { expr }
            | Expr::SimpleNot { expr }
            | Expr::Optional { expr }
            | Expr::ZeroOrMore { expr }
            | Expr::OneOrMore { expr }
            | Expr::Action { expr, .. } => f(expr),
            Expr::SemanticAnd { .. }
            | Expr::SemanticNot { .. }
            | Expr::RuleRef { .. }
            | Expr::Literal { .. }
            | Expr::Any
            | Expr::Class(_) => {}
        }
    }

    /// Calls `f` on each direct child expression, mutably.
    pub fn for_each_child_mut(&mut self, mut f: impl FnMut(&mut Expr)) {
        match self {
            Expr::Choice { alternatives } => alternatives.iter_mut().for_each(&mut f),
            Expr::Sequence { elements } => elements.iter_mut().for_each(&mut f),
            Expr::Labeled { expr, .. }
            | Expr::SimpleAnd { expr }
            | Expr::SimpleNot { expr }
            | Expr::Optional { expr }
            | Expr::ZeroOrMore { expr }
            | Expr::OneOrMore { expr }
            | Expr::Action { expr, .. } => f(expr),
            Expr::SemanticAnd { .. }
            | Expr::SemanticNot { .. }
            | Expr::RuleRef { .. }
            | Expr::Literal { .. }
            | Expr::Any
            | Expr::Class(_) => {}
        }
    }
}

/// A character class: an ordered list of single characters and inclusive
/// ranges, optionally inverted.
///
/// An empty, non-inverted class matches no character; an empty inverted
/// class matches any character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharClass {
    pub inverted: bool,
    pub parts: Vec<ClassPart>,
    /// The textual form, `[a-z_]`, used as the expectation string in errors.
    pub raw_text: String,
}

/// One member of a character class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClassPart {
    Single(char),
    Range { low: char, high: char },
}

impl CharClass {
    /// Builds a class from parts, deriving the canonical `raw_text`.
    pub fn new(inverted: bool, parts: Vec<ClassPart>) -> Self {
        let raw_text = Self::canonical_text(inverted, &parts);
        Self { inverted, parts, raw_text }
    }

    /// Renders the bracketed textual form of a class.
    pub fn canonical_text(inverted: bool, parts: &[ClassPart]) -> String {
        use peggen_base::strings::escape_class_char;

        let mut text = String::from("[");
        if inverted {
            text.push('^');
        }
        for part in parts {
            match part {
                ClassPart::Single(ch) => text.push_str(&escape_class_char(*ch)),
                ClassPart::Range { low, high } => {
                    text.push_str(&escape_class_char(*low));
                    text.push('-');
                    text.push_str(&escape_class_char(*high));
                }
            }
        }
        text.push(']');
        text
    }

    /// Returns `true` if `ch` is accepted by this class.
    pub fn matches(&self, ch: char) -> bool {
        let listed = self.parts.iter().any(|part| match part {
            ClassPart::Single(c) => *c == ch,
            ClassPart::Range { low, high } => (*low..=*high).contains(&ch),
        });
        listed != self.inverted
    }
}
