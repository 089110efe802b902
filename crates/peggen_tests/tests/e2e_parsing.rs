//! End-to-end matching behavior of compiled grammars.
//!
//! Each test compiles a grammar through the full pipeline and drives the
//! in-memory parser, checking semantic values, positions, and error
//! construction.

use peggen_compile::{compile, Value};

fn str_value(text: &str) -> Value {
    Value::Str(text.to_string())
}

fn parse(grammar: &str, input: &str) -> Result<Value, peggen_compile::SyntaxError> {
    compile(grammar).expect("grammar should compile").parse(input)
}

// ============================================================================
// Atomic expressions
// ============================================================================

#[test]
fn literal_matches_exactly() {
    assert_eq!(parse("start = \"ab\"", "ab").unwrap(), str_value("ab"));
    assert!(parse("start = \"ab\"", "aB").is_err());
}

#[test]
fn any_consumes_one_character() {
    assert_eq!(parse("start = .", "x").unwrap(), str_value("x"));
    assert!(parse("start = .", "").is_err());
    assert!(parse("start = .", "xy").is_err());
}

#[test]
fn class_matches_listed_characters() {
    let grammar = "start = [a-c_]";
    assert_eq!(parse(grammar, "b").unwrap(), str_value("b"));
    assert_eq!(parse(grammar, "_").unwrap(), str_value("_"));
    assert!(parse(grammar, "d").is_err());
}

#[test]
fn inverted_class_matches_everything_else() {
    let grammar = "start = [^a-c]";
    assert!(parse(grammar, "a").is_err());
    assert_eq!(parse(grammar, "z").unwrap(), str_value("z"));
}

#[test]
fn empty_class_matches_no_character() {
    assert!(parse("start = []", "a").is_err());
    assert!(parse("start = []", "").is_err());
}

#[test]
fn empty_inverted_class_matches_any_character() {
    assert_eq!(parse("start = [^]", "a").unwrap(), str_value("a"));
    assert!(parse("start = [^]", "").is_err());
}

#[test]
fn unicode_input_is_matched_per_character() {
    assert_eq!(
        parse("start = . .", "hé").unwrap(),
        Value::List(vec![str_value("h"), str_value("é")])
    );
}

// ============================================================================
// Composite expressions
// ============================================================================

#[test]
fn sequence_collects_element_values() {
    assert_eq!(
        parse("start = \"a\" \"b\"", "ab").unwrap(),
        Value::List(vec![str_value("a"), str_value("b")])
    );
}

#[test]
fn choice_commits_to_first_success_and_rewinds_failed_alternatives() {
    let grammar = "start = \"a\" \"b\" / \"a\" \"c\"";
    assert_eq!(
        parse(grammar, "ac").unwrap(),
        Value::List(vec![str_value("a"), str_value("c")])
    );
    assert_eq!(
        parse(grammar, "ab").unwrap(),
        Value::List(vec![str_value("a"), str_value("b")])
    );
}

#[test]
fn optional_miss_yields_empty_string() {
    assert_eq!(parse("start = \"a\"?", "").unwrap(), str_value(""));
    assert_eq!(parse("start = \"a\"?", "a").unwrap(), str_value("a"));
}

#[test]
fn zero_or_more_accumulates() {
    assert_eq!(parse("start = \"a\"*", "").unwrap(), Value::List(vec![]));
    match parse("start = \"a\"*", "aaaa").unwrap() {
        Value::List(items) => assert_eq!(items.len(), 4),
        other => panic!("expected list, got {:?}", other),
    }
}

#[test]
fn one_or_more_requires_the_first_match() {
    assert!(parse("start = \"a\"+", "").is_err());
    match parse("start = \"a\"+", "aaa").unwrap() {
        Value::List(items) => assert_eq!(items.len(), 3),
        other => panic!("expected list, got {:?}", other),
    }
}

#[test]
fn positive_lookahead_matches_without_consuming() {
    assert_eq!(
        parse("start = &\"a\" .", "a").unwrap(),
        Value::List(vec![str_value(""), str_value("a")])
    );
    assert!(parse("start = &\"a\" .", "b").is_err());
}

#[test]
fn negative_lookahead_succeeds_when_inner_fails() {
    assert_eq!(
        parse("start = !\"a\" .", "b").unwrap(),
        Value::List(vec![str_value(""), str_value("b")])
    );
    let err = parse("start = !\"a\" .", "a").unwrap_err();
    assert_eq!((err.line, err.column), (1, 1));
}

#[test]
fn lookahead_failures_are_not_reported() {
    // The literal inside the lookahead must not surface in the expected set.
    let err = parse("start = !\"a\" .", "a").unwrap_err();
    assert_eq!(err.message, "Expected end of input but \"a\" found.");
}

#[test]
fn labels_do_not_change_values() {
    assert_eq!(
        parse("start = a:\"x\" b:\"y\"", "xy").unwrap(),
        Value::List(vec![str_value("x"), str_value("y")])
    );
}

#[test]
fn interpreted_actions_pass_the_structural_value_through() {
    // Action fragments only execute in generated code; the in-memory
    // parser yields the wrapped expression's value.
    match parse("start = \"a\"* { unused() }", "aaaa").unwrap() {
        Value::List(items) => assert_eq!(items.len(), 4),
        other => panic!("expected list, got {:?}", other),
    }
}

#[test]
fn interpreted_semantic_predicates_succeed_vacuously() {
    assert_eq!(
        parse("start = &{ check() } \"x\"", "x").unwrap(),
        Value::List(vec![str_value(""), str_value("x")])
    );
}

#[test]
fn rule_references_follow_into_other_rules() {
    let grammar = "pair = letter digit\nletter = [a-z]\ndigit = [0-9]";
    assert_eq!(
        parse(grammar, "a7").unwrap(),
        Value::List(vec![str_value("a"), str_value("7")])
    );
}

#[test]
fn repeated_rule_invocations_at_one_position_agree() {
    // The second alternative re-enters `atom` at position 0; the memoized
    // outcome must replay with the same value and position.
    let grammar = "start = atom \"+\" atom / atom \"-\" atom\natom = [a-z]+";
    assert_eq!(
        parse(grammar, "ab-c").unwrap(),
        Value::List(vec![
            Value::List(vec![str_value("a"), str_value("b")]),
            str_value("-"),
            Value::List(vec![str_value("c")]),
        ])
    );
}

#[test]
fn grammar_with_initializer_still_parses() {
    let grammar = "{ fn helper() {} }\nstart = \"a\"";
    assert_eq!(parse(grammar, "a").unwrap(), str_value("a"));
}

// ============================================================================
// Errors from the compiled parser
// ============================================================================

#[test]
fn empty_input_fails_at_line_one_column_one() {
    let err = parse("start = \"a\"", "").unwrap_err();
    assert_eq!(err.message, "Expected \"a\" but end of input found.");
    assert_eq!((err.line, err.column), (1, 1));
}

#[test]
fn unconsumed_input_is_a_failure() {
    let err = parse("start = \"a\"", "ab").unwrap_err();
    assert_eq!((err.line, err.column), (1, 2));
    assert!(err.message.ends_with("but \"b\" found."));
}

#[test]
fn expected_set_is_sorted_and_joined() {
    let err = parse("start = \"b\" / \"a\" / \"c\"", "z").unwrap_err();
    assert_eq!(err.message, "Expected \"a\", \"b\" or \"c\" but \"z\" found.");
}

#[test]
fn failure_position_is_the_rightmost_attempt() {
    let err = parse("start = \"ab\" \"cd\"", "abce").unwrap_err();
    assert_eq!((err.line, err.column), (1, 3));
    assert_eq!(err.message, "Expected \"cd\" but \"c\" found.");
}

#[test]
fn display_name_replaces_internal_expectations() {
    let grammar = "start = number\nnumber \"number\" = [0-9]+";
    let err = parse(grammar, "x").unwrap_err();
    assert_eq!(err.message, "Expected number but \"x\" found.");
}

#[test]
fn crlf_counts_as_one_line_break() {
    let err = parse("start = \"a\\r\\n\" \"b\"", "a\r\nc").unwrap_err();
    assert_eq!((err.line, err.column), (2, 1));
}

#[test]
fn unicode_line_separator_advances_the_line() {
    let err = parse("start = \"a\\u2028\" \"b\"", "a\u{2028}c").unwrap_err();
    assert_eq!((err.line, err.column), (2, 1));
}

#[test]
fn error_column_counts_characters_not_bytes() {
    let err = parse("start = \"é\" \"x\"", "éy").unwrap_err();
    assert_eq!((err.line, err.column), (1, 2));
}
