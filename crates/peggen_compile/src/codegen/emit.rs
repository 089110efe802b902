//! Per-node emission of the generated parser.
//!
//! Walks the normalized AGT and renders one Rust function per rule, each in
//! the packrat shape: consult the `(rule, position)` cache, run the compiled
//! body, store the outcome. Every construct compiles to a statement list
//! that leaves its outcome in a fresh `Option<Value>` slot — `None` is the
//! failure sentinel, distinct from empty-string and empty-list successes.
//!
//! Host-language fragments are spliced verbatim: actions become
//! immediately-invoked closures returning `Value` (one parameter per
//! labeled element, bound by label name), semantic predicates become
//! immediately-invoked closures returning `bool`, and the grammar
//! initializer lands between the runtime prelude and the rule functions.
//!
//! The name counters reset at every rule boundary, so regenerating after an
//! edit to one rule reproduces every other rule byte for byte.

use peggen_syntax::{CharClass, ClassPart, Expr, Grammar, Rule};

use peggen_base::strings::quote;

use super::names::NameGen;
use super::runtime::RUNTIME;
use super::template;

const HEADER: &str = "\
// Parser generated by peggen. Edit the grammar, not this file.
#![allow(dead_code)]
#![allow(clippy::all)]";

/// Renders a complete, self-contained parser module for the grammar.
///
/// The grammar must already be analyzed: references resolve and no rule
/// body is a bare rule reference.
pub fn emit_grammar(grammar: &Grammar) -> String {
    Emitter { grammar, names: NameGen::new() }.emit()
}

struct Emitter<'g> {
    grammar: &'g Grammar,
    names: NameGen,
}

impl Emitter<'_> {
    fn emit(&mut self) -> String {
        let grammar = self.grammar;
        let mut sections = vec![HEADER.to_string(), RUNTIME.trim_end().to_string()];

        if let Some(initializer) = &grammar.initializer {
            sections.push(initializer.trim().to_string());
        }

        for (index, rule) in grammar.rules.iter().enumerate() {
            self.names.reset();
            sections.push(self.emit_rule(index as u32, rule));
        }

        sections.push(self.emit_parser_api());
        let mut out = sections.join("\n\n");
        out.push('\n');
        out
    }

    // ========================================================================
    // Rules
    // ========================================================================

    fn emit_rule(&mut self, id: u32, rule: &Rule) -> String {
        let (body, result) = self.emit_expr(&rule.expr);
        let id = id.to_string();
        let vars: &[(&str, &str)] = &[
            ("name", &rule.name),
            ("id", &id),
            ("body", &body),
            ("result", &result),
        ];

        match &rule.display_name {
            None => template::format(
                &[
                    "fn parse_${name}(state: &mut ParseState) -> Option<Value> {",
                    "    let key = (${id}u32, state.pos);",
                    "    if let Some(entry) = state.cache.get(&key) {",
                    "        state.pos = entry.next_pos;",
                    "        return entry.result.clone();",
                    "    }",
                    "    ${body}",
                    "    state.cache.insert(key, CacheEntry { next_pos: state.pos, result: ${result}.clone() });",
                    "    ${result}",
                    "}",
                ],
                vars,
            ),
            Some(display) => {
                let mut vars = vars.to_vec();
                vars.push(("display", display.as_str()));
                template::format(
                    &[
                        "fn parse_${name}(state: &mut ParseState) -> Option<Value> {",
                        "    let key = (${id}u32, state.pos);",
                        "    if let Some(entry) = state.cache.get(&key) {",
                        "        state.pos = entry.next_pos;",
                        "        return entry.result.clone();",
                        "    }",
                        "    let report_outer = state.report_failures;",
                        "    state.report_failures = false;",
                        "    ${body}",
                        "    state.report_failures = report_outer;",
                        "    if ${result}.is_none() {",
                        "        state.record_failure(${display|string});",
                        "    }",
                        "    state.cache.insert(key, CacheEntry { next_pos: state.pos, result: ${result}.clone() });",
                        "    ${result}",
                        "}",
                    ],
                    &vars,
                )
            }
        }
    }

    fn emit_parser_api(&mut self) -> String {
        template::format(
            &[
                "/// Packrat parser for the generated grammar.",
                "///",
                "/// The memoization cache lives in per-call state, so one `Parser` can",
                "/// serve any number of independent `parse` calls.",
                "pub struct Parser;",
                "",
                "impl Parser {",
                "    pub fn new() -> Parser {",
                "        Parser",
                "    }",
                "",
                "    /// Parses `input`, returning the start rule's semantic value.",
                "    ///",
                "    /// The entire input must be consumed; anything less fails with",
                "    /// the rightmost failure recorded during the attempt.",
                "    pub fn parse(&self, input: &str) -> Result<Value, SyntaxError> {",
                "        let mut state = ParseState::new(input);",
                "        let result = parse_${start}(&mut state);",
                "        match result {",
                "            Some(value) if state.pos == state.input.len() => Ok(value),",
                "            _ => Err(state.syntax_error()),",
                "        }",
                "    }",
                "}",
                "",
                "impl Default for Parser {",
                "    fn default() -> Parser {",
                "        Parser::new()",
                "    }",
                "}",
                "",
                "/// Parses `input` with a fresh [`Parser`].",
                "pub fn parse(input: &str) -> Result<Value, SyntaxError> {",
                "    Parser::new().parse(input)",
                "}",
            ],
            &[("start", &self.grammar.start_rule)],
        )
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Emits statements computing `expr`, returning them with the name of
    /// the `Option<Value>` slot holding the outcome.
    fn emit_expr(&mut self, expr: &Expr) -> (String, String) {
        match expr {
            Expr::Literal { value } => self.emit_literal(value),
            Expr::Any => self.emit_any(),
            Expr::Class(class) => self.emit_class(class),
            Expr::RuleRef { name } => self.emit_rule_ref(name),
            Expr::Sequence { elements } => self.emit_sequence(elements),
            Expr::Choice { alternatives } => self.emit_choice(alternatives),
            Expr::Labeled { expr, .. } => self.emit_expr(expr),
            Expr::Optional { expr } => self.emit_optional(expr),
            Expr::ZeroOrMore { expr } => self.emit_zero_or_more(expr),
            Expr::OneOrMore { expr } => self.emit_one_or_more(expr),
            Expr::SimpleAnd { expr } => self.emit_lookahead(expr, true),
            Expr::SimpleNot { expr } => self.emit_lookahead(expr, false),
            Expr::SemanticAnd { code } => self.emit_predicate(code, true),
            Expr::SemanticNot { code } => self.emit_predicate(code, false),
            Expr::Action { expr, code } => self.emit_action(expr, code),
        }
    }

    fn emit_literal(&mut self, value: &str) -> (String, String) {
        let result = self.names.fresh("result");
        let expected = quote(value);
        let code = template::format(
            &["let ${result} = state.match_literal(${text|string}, ${expected|string});"],
            &[("result", &result), ("text", value), ("expected", &expected)],
        );
        (code, result)
    }

    fn emit_any(&mut self) -> (String, String) {
        let result = self.names.fresh("result");
        let code = template::format(
            &["let ${result} = state.match_any();"],
            &[("result", &result)],
        );
        (code, result)
    }

    fn emit_class(&mut self, class: &CharClass) -> (String, String) {
        let result = self.names.fresh("result");
        let predicate = class_predicate(class);
        let code = template::format(
            &["let ${result} = state.match_class(${predicate}, ${expected|string});"],
            &[("result", &result), ("predicate", &predicate), ("expected", &class.raw_text)],
        );
        (code, result)
    }

    fn emit_rule_ref(&mut self, name: &str) -> (String, String) {
        let result = self.names.fresh("result");
        let code = template::format(
            &["let ${result} = parse_${rule}(state);"],
            &[("result", &result), ("rule", name)],
        );
        (code, result)
    }

    fn emit_sequence(&mut self, elements: &[Expr]) -> (String, String) {
        let result = self.names.fresh("result");
        if elements.is_empty() {
            let code = template::format(
                &["let ${result} = Some(Value::List(Vec::new()));"],
                &[("result", &result)],
            );
            return (code, result);
        }

        let label = self.names.fresh("seq");
        let saved = self.names.fresh("saved_pos");
        let mut inner = vec![template::format(
            &["let ${saved} = state.pos;"],
            &[("saved", &saved)],
        )];
        let mut element_slots = Vec::with_capacity(elements.len());
        for element in elements {
            let (code, element_result) = self.emit_expr(element);
            let slot = self.names.fresh("elem");
            inner.push(code);
            inner.push(template::format(
                &[
                    "let Some(${slot}) = ${res} else {",
                    "    state.pos = ${saved};",
                    "    break '${label} None;",
                    "};",
                ],
                &[("slot", &slot), ("res", &element_result), ("saved", &saved), ("label", &label)],
            ));
            element_slots.push(slot);
        }
        inner.push(format!("Some(Value::List(vec![{}]))", element_slots.join(", ")));

        let body = inner.join("\n");
        let code = template::format(
            &["let ${result} = '${label}: {", "    ${body}", "};"],
            &[("result", &result), ("label", &label), ("body", &body)],
        );
        (code, result)
    }

    fn emit_choice(&mut self, alternatives: &[Expr]) -> (String, String) {
        let result = self.names.fresh("result");
        let label = self.names.fresh("choice");
        let mut inner = Vec::with_capacity(alternatives.len() * 2 + 1);
        for alternative in alternatives {
            let (code, alternative_result) = self.emit_expr(alternative);
            inner.push(code);
            inner.push(template::format(
                &["if ${res}.is_some() {", "    break '${label} ${res};", "}"],
                &[("res", &alternative_result), ("label", &label)],
            ));
        }
        inner.push("None".to_string());

        let body = inner.join("\n");
        let code = template::format(
            &["let ${result} = '${label}: {", "    ${body}", "};"],
            &[("result", &result), ("label", &label), ("body", &body)],
        );
        (code, result)
    }

    fn emit_optional(&mut self, expr: &Expr) -> (String, String) {
        let (inner, inner_result) = self.emit_expr(expr);
        let result = self.names.fresh("result");
        let code = template::format(
            &["${inner}", "let ${result} = Some(${res}.unwrap_or_else(Value::empty));"],
            &[("inner", &inner), ("result", &result), ("res", &inner_result)],
        );
        (code, result)
    }

    fn emit_zero_or_more(&mut self, expr: &Expr) -> (String, String) {
        let result = self.names.fresh("result");
        let acc = self.names.fresh("repeat");
        let (inner, inner_result) = self.emit_expr(expr);
        let code = template::format(
            &[
                "let mut ${acc} = Vec::new();",
                "loop {",
                "    ${inner}",
                "    match ${res} {",
                "        Some(value) => ${acc}.push(value),",
                "        None => break,",
                "    }",
                "}",
                "let ${result} = Some(Value::List(${acc}));",
            ],
            &[("acc", &acc), ("inner", &inner), ("res", &inner_result), ("result", &result)],
        );
        (code, result)
    }

    fn emit_one_or_more(&mut self, expr: &Expr) -> (String, String) {
        let result = self.names.fresh("result");
        let first = self.names.fresh("first");
        let acc = self.names.fresh("repeat");
        // The sub-expression is instantiated twice: once for the required
        // first match, once inside the accumulation loop.
        let (first_code, first_result) = self.emit_expr(expr);
        let (more_code, more_result) = self.emit_expr(expr);
        let code = template::format(
            &[
                "${first_code}",
                "let ${result} = if let Some(${first}) = ${first_res} {",
                "    let mut ${acc} = vec![${first}];",
                "    loop {",
                "        ${more_code}",
                "        match ${more_res} {",
                "            Some(value) => ${acc}.push(value),",
                "            None => break,",
                "        }",
                "    }",
                "    Some(Value::List(${acc}))",
                "} else {",
                "    None",
                "};",
            ],
            &[
                ("first_code", &first_code),
                ("result", &result),
                ("first", &first),
                ("first_res", &first_result),
                ("acc", &acc),
                ("more_code", &more_code),
                ("more_res", &more_result),
            ],
        );
        (code, result)
    }

    fn emit_lookahead(&mut self, expr: &Expr, positive: bool) -> (String, String) {
        let saved_pos = self.names.fresh("saved_pos");
        let saved_report = self.names.fresh("saved_report");
        let (inner, inner_result) = self.emit_expr(expr);
        let result = self.names.fresh("result");
        let outcome = if positive {
            template::format(
                &["let ${result} = ${res}.map(|_| Value::empty());"],
                &[("result", &result), ("res", &inner_result)],
            )
        } else {
            template::format(
                &[
                    "let ${result} = match ${res} {",
                    "    Some(_) => None,",
                    "    None => Some(Value::empty()),",
                    "};",
                ],
                &[("result", &result), ("res", &inner_result)],
            )
        };
        let code = template::format(
            &[
                "let ${saved_pos} = state.pos;",
                "let ${saved_report} = state.report_failures;",
                "state.report_failures = false;",
                "${inner}",
                "state.report_failures = ${saved_report};",
                "state.pos = ${saved_pos};",
                "${outcome}",
            ],
            &[
                ("saved_pos", &saved_pos),
                ("saved_report", &saved_report),
                ("inner", &inner),
                ("outcome", &outcome),
            ],
        );
        (code, result)
    }

    fn emit_predicate(&mut self, predicate: &str, positive: bool) -> (String, String) {
        let result = self.names.fresh("result");
        let (when_true, when_false) = if positive {
            ("Some(Value::empty())", "None")
        } else {
            ("None", "Some(Value::empty())")
        };
        let code = template::format(
            &[
                "let ${result} = if (|| -> bool { ${predicate} })() {",
                "    ${when_true}",
                "} else {",
                "    ${when_false}",
                "};",
            ],
            &[
                ("result", &result),
                ("predicate", predicate),
                ("when_true", when_true),
                ("when_false", when_false),
            ],
        );
        (code, result)
    }

    fn emit_action(&mut self, expr: &Expr, action: &str) -> (String, String) {
        let (inner, inner_result) = self.emit_expr(expr);
        let result = self.names.fresh("result");

        let code = match splat_arguments(expr) {
            Splat::Sequence(params) if !params.is_empty() => {
                let elements = self.names.fresh("elements");
                let param_list = params
                    .iter()
                    .map(|(label, _)| format!("{}: Value", label))
                    .collect::<Vec<_>>()
                    .join(", ");
                let arguments = params
                    .iter()
                    .map(|(_, index)| format!("{}[{}].clone()", elements, index))
                    .collect::<Vec<_>>()
                    .join(", ");
                template::format(
                    &[
                        "${inner}",
                        "let ${result} = ${res}.map(|value| {",
                        "    let Value::List(${elements}) = value else { unreachable!() };",
                        "    (|${params}| -> Value { ${action} })(${args})",
                        "});",
                    ],
                    &[
                        ("inner", &inner),
                        ("result", &result),
                        ("res", &inner_result),
                        ("elements", &elements),
                        ("params", &param_list),
                        ("action", action),
                        ("args", &arguments),
                    ],
                )
            }
            Splat::Single(label) => template::format(
                &[
                    "${inner}",
                    "let ${result} = ${res}.map(|value| (|${label}: Value| -> Value { ${action} })(value));",
                ],
                &[
                    ("inner", &inner),
                    ("result", &result),
                    ("res", &inner_result),
                    ("label", &label),
                    ("action", action),
                ],
            ),
            _ => template::format(
                &[
                    "${inner}",
                    "let ${result} = ${res}.map(|_| (|| -> Value { ${action} })());",
                ],
                &[
                    ("inner", &inner),
                    ("result", &result),
                    ("res", &inner_result),
                    ("action", action),
                ],
            ),
        };
        (code, result)
    }
}

/// How an action receives its arguments, derived from the wrapped
/// expression: one parameter per labeled sequence element, one parameter
/// for a labeled expression, none otherwise.
enum Splat {
    Sequence(Vec<(String, usize)>),
    Single(String),
    None,
}

fn splat_arguments(expr: &Expr) -> Splat {
    match expr {
        Expr::Sequence { elements } => Splat::Sequence(
            elements
                .iter()
                .enumerate()
                .filter_map(|(index, element)| match element {
                    Expr::Labeled { label, .. } => Some((label.clone(), index)),
                    _ => None,
                })
                .collect(),
        ),
        Expr::Labeled { label, .. } => Splat::Single(label.clone()),
        _ => Splat::None,
    }
}

/// Renders the acceptance closure for a character class.
fn class_predicate(class: &CharClass) -> String {
    if class.parts.is_empty() {
        return if class.inverted { "|_| true" } else { "|_| false" }.to_string();
    }
    let patterns = class
        .parts
        .iter()
        .map(|part| match part {
            ClassPart::Single(ch) => char_lit(*ch),
            ClassPart::Range { low, high } => format!("{}..={}", char_lit(*low), char_lit(*high)),
        })
        .collect::<Vec<_>>()
        .join(" | ");
    if class.inverted {
        format!("|ch| !matches!(ch, {})", patterns)
    } else {
        format!("|ch| matches!(ch, {})", patterns)
    }
}

/// Renders a character as a Rust char literal.
fn char_lit(ch: char) -> String {
    match ch {
        '\'' => "'\\''".to_string(),
        '\\' => "'\\\\'".to_string(),
        '\n' => "'\\n'".to_string(),
        '\r' => "'\\r'".to_string(),
        '\t' => "'\\t'".to_string(),
        '\0' => "'\\0'".to_string(),
        ch if (ch as u32) < 0x20 || ch == '\u{7f}' || ch == '\u{2028}' || ch == '\u{2029}' => {
            format!("'\\u{{{:x}}}'", ch as u32)
        }
        ch => format!("'{}'", ch),
    }
}
