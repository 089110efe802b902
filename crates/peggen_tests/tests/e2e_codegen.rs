//! Textual properties of generated parser source.
//!
//! These tests pin down the shape of the emitted text: one function per
//! rule, verbatim fragment splicing, deterministic output, and per-rule
//! locality of regeneration. Runtime behavior of the same output is covered
//! by `e2e_generated_parser`, which builds and executes it.

use peggen_compile::{compile, compile_to_source};

fn emit(grammar: &str) -> String {
    compile_to_source(grammar).expect("grammar should compile")
}

/// Extracts the text of one generated rule function, delimited by the
/// following top-level item.
fn rule_fn<'a>(source: &'a str, name: &str) -> &'a str {
    let needle = format!("fn parse_{}(", name);
    let start = source.find(&needle).unwrap_or_else(|| panic!("missing {}", needle));
    let rest = &source[start..];
    let end = rest.find("\n\n").unwrap_or(rest.len());
    &rest[..end]
}

#[test]
fn emits_one_function_per_rule() {
    let source = emit("a = b\nb = \"x\"\nc = \"y\"");
    // `a` is a proxy and is eliminated before emission.
    assert!(!source.contains("fn parse_a("));
    assert!(source.contains("fn parse_b("));
    assert!(source.contains("fn parse_c("));
}

#[test]
fn parse_entry_targets_the_start_rule() {
    let source = emit("top = \"x\"\nother = \"y\"");
    assert!(source.contains("let result = parse_top(&mut state);"));
}

#[test]
fn emitted_module_is_self_contained() {
    let source = emit("start = \"a\"");
    assert!(source.starts_with("// Parser generated by peggen."));
    assert!(source.contains("pub struct SyntaxError"));
    assert!(source.contains("pub enum Value"));
    assert!(source.contains("struct ParseState"));
    assert!(source.contains("pub struct Parser;"));
    // Only std imports.
    assert!(source.contains("use std::collections::HashMap;"));
    assert!(!source.contains("extern crate"));
    assert!(!source.contains("use peggen"));
}

#[test]
fn every_rule_consults_and_fills_the_cache() {
    let source = emit("start = \"a\"");
    let body = rule_fn(&source, "start");
    assert!(body.contains("if let Some(entry) = state.cache.get(&key)"));
    assert!(body.contains("state.cache.insert(key, CacheEntry"));
}

#[test]
fn literals_are_quoted_for_matching_and_reporting() {
    let source = emit("start = \"a\\\"b\"");
    assert!(source.contains(r#"state.match_literal("a\"b", "\"a\\\"b\"")"#));
}

#[test]
fn classes_compile_to_direct_range_checks() {
    let source = emit("start = [a-z_]");
    assert!(source.contains(r#"state.match_class(|ch| matches!(ch, 'a'..='z' | '_'), "[a-z_]")"#));
}

#[test]
fn inverted_classes_negate_the_check() {
    let source = emit("start = [^0-9]");
    assert!(source.contains(r#"state.match_class(|ch| !matches!(ch, '0'..='9'), "[^0-9]")"#));
}

#[test]
fn action_code_is_spliced_verbatim_with_labeled_parameters() {
    let source = emit("start = a:\"x\" \"-\" b:\"y\" { combine(a, b) }");
    assert!(source.contains("(|a: Value, b: Value| -> Value {  combine(a, b)  })"));
    // Labeled elements sit at sequence positions 0 and 2.
    assert!(source.contains("[0].clone()"));
    assert!(source.contains("[2].clone()"));
    assert!(!source.contains("[1].clone()"));
}

#[test]
fn single_labeled_action_receives_one_argument() {
    let source = emit("start = v:\"x\" { v }");
    assert!(source.contains("(|v: Value| -> Value {  v  })(value)"));
}

#[test]
fn unlabeled_action_receives_no_arguments() {
    let source = emit("start = \"x\" { done() }");
    assert!(source.contains("(|| -> Value {  done()  })()"));
}

#[test]
fn semantic_predicates_become_bool_closures() {
    let source = emit("start = &{ is_ready() } \"x\"");
    assert!(source.contains("(|| -> bool {  is_ready()  })()"));
}

#[test]
fn initializer_lands_before_the_rule_functions() {
    let source = emit("{ use std::cmp::Ordering; }\nstart = \"a\"");
    let initializer = source.find("use std::cmp::Ordering;").expect("initializer spliced");
    let first_rule = source.find("fn parse_start").expect("rule function");
    assert!(initializer < first_rule);
}

#[test]
fn display_names_are_recorded_on_failure() {
    let source = emit("num \"number\" = [0-9]+");
    let body = rule_fn(&source, "num");
    assert!(body.contains("state.report_failures = false;"));
    assert!(body.contains(r#"state.record_failure("number");"#));
}

#[test]
fn lookaheads_save_and_restore_position_and_reporting() {
    let source = emit("start = !\"a\" .");
    let body = rule_fn(&source, "start");
    assert!(body.contains("state.report_failures = false;"));
    assert!(body.contains("state.pos = saved_pos"));
}

#[test]
fn emission_is_deterministic() {
    let grammar = "start = item (\",\" item)*\nitem = [a-z]+";
    assert_eq!(emit(grammar), emit(grammar));
}

#[test]
fn editing_one_rule_leaves_other_rules_untouched() {
    let before = emit("a = \"x\" \"y\"\nb = \"p\" / \"q\"");
    let after = emit("a = \"x\" \"y\" \"z\" (\"w\")?\nb = \"p\" / \"q\"");
    assert_ne!(rule_fn(&before, "a"), rule_fn(&after, "a"));
    assert_eq!(rule_fn(&before, "b"), rule_fn(&after, "b"));
}

#[test]
fn to_source_returns_exactly_the_emitted_text() {
    let grammar = "start = \"a\" / \"b\"";
    let parser = compile(grammar).expect("grammar should compile");
    assert_eq!(parser.to_source(), emit(grammar));
}
