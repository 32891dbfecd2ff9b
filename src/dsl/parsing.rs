//! Parsing
//!
//!     A parse call tokenizes the whole input first and then runs a memoizing
//!     recursive-descent matcher over the token array. Every call gets a fresh memo table
//!     and failure tracker; nothing about a parse survives it except what actions wrote
//!     into the context.
//!
//!     Modules:
//!     - [parser]: rule, alternative and symbol matching, action invocation
//!     - [left_recursion]: seed growing for directly left-recursive rules
//!     - [memo]: the (rule, position) memo table
//!     - [failure]: furthest-failure tracking and error selection

pub mod failure;
mod left_recursion;
pub mod memo;
mod parser;

use crate::dsl::actions::{Context, Functions};
use crate::dsl::config::ParserConfig;
use crate::dsl::diagnostics::ParseError;
use crate::dsl::grammar::Grammar;
use crate::dsl::lexing::tokenize;
use crate::dsl::value::Value;
use parser::Parser;

impl Grammar {
    /// Parse `input` from the start rule and return the value of its action.
    ///
    /// `context` is readable and writable by every action; writes made by alternatives
    /// that are later abandoned stay in place. `functions` are callable from actions.
    pub fn parse_with(
        &self,
        input: &str,
        context: &mut Context,
        functions: &Functions,
        config: &ParserConfig,
    ) -> Result<Value, ParseError> {
        let tokens = tokenize(self, input)?;
        Parser::new(self, input, &tokens, config, context, functions).run()
    }

    /// Parse with an empty context, no functions and the default configuration
    pub fn parse(&self, input: &str) -> Result<Value, ParseError> {
        self.parse_with(
            input,
            &mut Context::new(),
            &Functions::new(),
            &ParserConfig::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::actions::ActionError;
    use crate::dsl::diagnostics::ParseErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn list_grammar() -> Grammar {
        let mut grammar = Grammar::new();
        grammar.token("ID", "[a-z]+").unwrap();
        grammar.token("COMMA", ",").unwrap();
        grammar.rule("list", &["list", "COMMA", "ID"], "join").unwrap();
        grammar.rule("list", &["ID"], "").unwrap();
        grammar.action("join", |values, _scope| {
            let mut items = values[0].clone().into_list();
            items.push(values[2].clone());
            Ok(Value::List(items))
        });
        grammar
    }

    fn strs(items: &[&str]) -> Value {
        Value::List(items.iter().map(|s| Value::from(*s)).collect())
    }

    #[test]
    fn test_left_recursive_list() {
        let grammar = list_grammar();
        assert_eq!(grammar.parse("a, b, c").unwrap(), strs(&["a", "b", "c"]));
        assert_eq!(grammar.parse("a").unwrap(), Value::from("a"));
    }

    #[test]
    fn test_left_recursion_is_left_associative() {
        let mut grammar = Grammar::new();
        grammar.token("NUM", "[0-9]+").unwrap();
        grammar.token("MINUS", "-").unwrap();
        grammar.rule("expr", &["expr", "MINUS", "num"], "sub").unwrap();
        grammar.rule("expr", &["num"], "").unwrap();
        grammar.rule("num", &["NUM"], "int").unwrap();
        grammar.action("int", |values, _scope| {
            let text = values[0].as_str().unwrap_or_default();
            text.parse::<i64>()
                .map(Value::Int)
                .map_err(|e| ActionError::new(e.to_string()))
        });
        grammar.action("sub", |values, _scope| {
            match (values[0].as_int(), values[2].as_int()) {
                (Some(a), Some(b)) => Ok(Value::Int(a - b)),
                _ => Err(ActionError::new("operands must be integers")),
            }
        });

        assert_eq!(grammar.parse("10 - 3 - 2").unwrap(), Value::Int(5));
    }

    #[test]
    fn test_missing_separator_reports_expected_token() {
        let err = list_grammar().parse("a, b c").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::TrailingInput);
        assert_eq!(err.column, 6);

        let err = list_grammar().parse("a,").unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::ExpectedToken {
                expected: "ID".into(),
                found: None
            }
        );
        assert_eq!(err.position, 2);
    }

    #[test]
    fn test_empty_grammar() {
        let err = Grammar::new().parse("").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingStartRule);
    }

    #[test]
    fn test_memoized_rule_runs_action_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let mut grammar = Grammar::new();
        grammar.token("A", "a").unwrap();
        grammar.token("B", "b").unwrap();
        grammar.token("C", "c").unwrap();
        grammar.rule("top", &["item", "B"], "").unwrap();
        grammar.rule("top", &["item", "C"], "").unwrap();
        grammar.rule("item", &["A"], "count").unwrap();
        grammar.action("count", move |values, _scope| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(values[0].clone())
        });

        let value = grammar.parse("a c").unwrap();
        assert_eq!(value, strs(&["a", "c"]));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_undefined_symbol_is_fatal() {
        let mut grammar = Grammar::new();
        grammar.token("A", "a").unwrap();
        grammar.rule("top", &["A", "missing"], "").unwrap();
        grammar.rule("top", &["A"], "").unwrap();

        let err = grammar.parse("a").unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::UndefinedSymbol {
                symbol: "missing".into(),
                rule: "top".into()
            }
        );
    }

    #[test]
    fn test_indirect_left_recursion_uses_base_alternative() {
        let mut grammar = Grammar::new();
        grammar.token("X", "x").unwrap();
        grammar.token("Y", "y").unwrap();
        grammar.rule("a", &["b", "X"], "").unwrap();
        grammar.rule("b", &["a", "Y"], "").unwrap();
        grammar.rule("b", &["Y"], "").unwrap();

        assert_eq!(grammar.parse("y x").unwrap(), strs(&["y", "x"]));
    }
}
