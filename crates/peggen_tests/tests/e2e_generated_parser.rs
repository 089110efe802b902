//! Compile-and-run coverage for generated parsers.
//!
//! Each test emits parser source, builds it as a real binary through the
//! harness in `common`, and asserts what the binary prints. This is the
//! proof that the emitted Rust compiles and that actions and predicates,
//! inert in interpreted mode, execute for real in generated code.

mod common;

use common::build_generated_parser;

#[test]
fn labeled_action_concatenates_matches() {
    let parser = build_generated_parser(
        r#"start = a:"x" b:"y" { Value::Str(format!("{}{}", a.flatten_text(), b.flatten_text())) }"#,
    );
    parser.assert_value("xy", "\"xy\"");
    parser.assert_error("xz", 1, 2, "Expected \"y\" but \"z\" found.");
}

#[test]
fn action_over_labeled_repetition_counts_matches() {
    let parser = build_generated_parser(
        r#"start = items:"a"* { Value::Str(items.as_list().map(|list| list.len()).unwrap_or(0).to_string()) }"#,
    );
    parser.assert_value("aaaa", "\"4\"");
    parser.assert_value("", "\"0\"");
}

#[test]
fn choice_backtracks_and_yields_sequence_values() {
    let parser = build_generated_parser(r#"start = "a" "b" / "a" "c""#);
    parser.assert_value("ac", "[\"a\", \"c\"]");
    parser.assert_value("ab", "[\"a\", \"b\"]");
}

#[test]
fn lookaheads_match_without_consuming() {
    let positive = build_generated_parser(r#"start = &"a" ."#);
    positive.assert_value("a", "[\"\", \"a\"]");

    let negative = build_generated_parser(r#"start = !"a" ."#);
    negative.assert_value("b", "[\"\", \"b\"]");
    negative.assert_error("a", 1, 1, "Expected end of input but \"a\" found.");
}

#[test]
fn initializer_and_semantic_predicate_execute() {
    let grammar = "{ fn shout(value: &Value) -> Value { Value::Str(value.flatten_text().to_uppercase()) } }\n\
                   start = &{ 1 + 1 == 2 } word:[a-z]+ { shout(&word) }";
    let parser = build_generated_parser(grammar);
    parser.assert_value("abc", "\"ABC\"");
}

#[test]
fn display_name_shapes_runtime_errors() {
    let parser = build_generated_parser("int \"integer\" = [0-9]+");
    parser.assert_value("42", "[\"4\", \"2\"]");
    parser.assert_error("x", 1, 1, "Expected integer but \"x\" found.");
}
