//! Line/column mapping and rendered diagnostics

use dslkit::dsl::testing::assert_parse_error;
use dslkit::dsl::{
    detailed_message, is_parse_error, Error, Grammar, GrammarError, ParseErrorKind,
};

/// doc -> LINE VALID, where both are keywords
fn two_keywords() -> Grammar {
    let mut grammar = Grammar::new();
    grammar.keyword("LINE", "line1").unwrap();
    grammar.keyword("VALID", "valid").unwrap();
    grammar.token("WORD", "[a-z]+").unwrap();
    grammar.rule("doc", &["LINE", "VALID"], "").unwrap();
    grammar
}

#[test]
fn test_error_on_second_line() {
    let err = two_keywords().parse("line1\ninvalid").unwrap_err();

    assert_parse_error(&err)
        .kind(ParseErrorKind::ExpectedToken {
            expected: "VALID".into(),
            found: Some("WORD".into()),
        })
        .at(2, 1)
        .position(6)
        .token("invalid");
    insta::assert_snapshot!(err.to_string(), @"line 2, column 1: expected token VALID, got WORD 'invalid'");
}

#[test]
fn test_detailed_rendering() {
    let err = two_keywords().parse("line1\ninvalid").unwrap_err();
    let detailed = err.detailed();
    let lines: Vec<&str> = detailed.lines().collect();

    assert_eq!(
        lines,
        vec![
            "error: expected token VALID, got WORD 'invalid'",
            " --> line 2, column 1",
            "      1 | line1",
            ">>    2 | invalid",
            "        | ^",
        ]
    );
}

#[test]
fn test_end_of_input_points_past_last_token() {
    let err = two_keywords().parse("line1   \n").unwrap_err();
    assert_parse_error(&err)
        .at(1, 6)
        .message_contains("got end of input")
        .token("");
}

#[test]
fn test_context_is_limited_to_two_lines() {
    let mut grammar = Grammar::new();
    grammar.token("A", "a").unwrap();
    grammar.zero_or_more("doc", "A").unwrap();

    let err = grammar.parse("a\na\na\na\nb").unwrap_err();
    let detailed = err.detailed();
    assert!(detailed.contains("      3 | a\n      4 | a\n>>    5 | b\n"));
    assert!(!detailed.contains("      2 | a"));
}

#[test]
fn test_columns_count_characters() {
    let mut grammar = Grammar::new();
    grammar.token("WORD", r"\w+").unwrap();
    grammar.rule("doc", &["WORD"], "").unwrap();

    let err = grammar.parse("éé ?").unwrap_err();
    assert_parse_error(&err)
        .kind(ParseErrorKind::Tokenize)
        .position(5)
        .at(1, 4)
        .detailed_contains("        |    ^");
}

#[test]
fn test_tabs_are_kept_in_caret_padding() {
    let mut grammar = Grammar::new();
    grammar.token("A", "a").unwrap();
    grammar.rule("doc", &["A"], "").unwrap();

    let err = grammar.parse("\t\t!").unwrap_err();
    assert_parse_error(&err)
        .at(1, 3)
        .detailed_contains("        | \t\t^");
}

#[test]
fn test_diagnostic_predicates() {
    let parse_failure = two_keywords().parse("valid").unwrap_err();

    let boxed: Box<dyn std::error::Error> = Box::new(parse_failure.clone());
    assert!(is_parse_error(boxed.as_ref()));
    assert!(detailed_message(boxed.as_ref())
        .unwrap()
        .starts_with("error: expected token LINE"));

    let wrapped: Box<dyn std::error::Error> = Box::new(Error::from(parse_failure));
    assert!(is_parse_error(wrapped.as_ref()));

    let grammar_failure: Box<dyn std::error::Error> =
        Box::new(Error::from(GrammarError::UnknownRule("x".into())));
    assert!(!is_parse_error(grammar_failure.as_ref()));
    assert_eq!(detailed_message(grammar_failure.as_ref()), None);
}
